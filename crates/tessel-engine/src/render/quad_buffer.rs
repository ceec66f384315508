use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::num::NonZeroU32;

use crate::backend::TextureId;
use crate::coords::Vec3;

/// Opaque handle to a group of quad slots. Never zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuadBufferHandle(NonZeroU32);

impl QuadBufferHandle {
    #[inline]
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for QuadBufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One compiled face: four corner positions, a normal, and an optional
/// texture that overrides the current binding while it is drawn.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuadRecord {
    pub texture: Option<TextureId>,
    pub normal: Vec3,
    pub vertices: [Vec3; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuadBufferError {
    UnknownHandle(QuadBufferHandle),
    IndexOutOfRange {
        handle: QuadBufferHandle,
        index: usize,
        count: usize,
    },
    NotCompiled {
        handle: QuadBufferHandle,
        index: usize,
    },
    CountMismatch {
        handle: QuadBufferHandle,
        expected: usize,
        actual: usize,
    },
    /// Every handle value is live or was handed out; nothing left to allocate.
    Exhausted,
}

impl fmt::Display for QuadBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownHandle(h) => write!(f, "unknown quad buffer {h}"),
            Self::IndexOutOfRange { handle, index, count } => {
                write!(f, "quad buffer {handle}: index {index} out of range (count {count})")
            }
            Self::NotCompiled { handle, index } => {
                write!(f, "quad buffer {handle}: slot {index} was never compiled")
            }
            Self::CountMismatch { handle, expected, actual } => write!(
                f,
                "quad buffer {handle}: deleting {actual} slots but {expected} were generated"
            ),
            Self::Exhausted => write!(f, "quad buffer handles exhausted"),
        }
    }
}

impl std::error::Error for QuadBufferError {}

impl Default for QuadBufferCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Write-once-per-slot geometry store keyed by opaque handles.
///
/// Slots start uncompiled. `compile` may overwrite a slot; `delete` releases
/// the whole group and the handle becomes reusable.
#[derive(Debug)]
pub struct QuadBufferCache {
    buffers: HashMap<QuadBufferHandle, Vec<Option<QuadRecord>>>,
    free: BTreeSet<QuadBufferHandle>,
    /// `None` once `u32::MAX` has been handed out.
    next: Option<NonZeroU32>,
}

impl QuadBufferCache {
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
            free: BTreeSet::new(),
            next: Some(NonZeroU32::MIN),
        }
    }

    /// Allocates `count` empty slots under a fresh handle. `count` may be 0.
    /// Freed handles are reused before new values are minted.
    pub fn generate(&mut self, count: usize) -> Result<QuadBufferHandle, QuadBufferError> {
        let handle = match self.free.pop_first() {
            Some(h) => h,
            None => {
                let next = self.next.ok_or(QuadBufferError::Exhausted)?;
                self.next = next.checked_add(1);
                QuadBufferHandle(next)
            }
        };

        self.buffers.insert(handle, vec![None; count]);
        log::trace!("quad buffer {handle}: generated {count} slots");
        Ok(handle)
    }

    pub fn compile(
        &mut self,
        handle: QuadBufferHandle,
        index: usize,
        record: QuadRecord,
    ) -> Result<(), QuadBufferError> {
        let slots = self
            .buffers
            .get_mut(&handle)
            .ok_or(QuadBufferError::UnknownHandle(handle))?;
        let count = slots.len();
        let slot = slots
            .get_mut(index)
            .ok_or(QuadBufferError::IndexOutOfRange { handle, index, count })?;
        *slot = Some(record);
        Ok(())
    }

    pub fn record(&self, handle: QuadBufferHandle, index: usize) -> Result<&QuadRecord, QuadBufferError> {
        let slots = self
            .buffers
            .get(&handle)
            .ok_or(QuadBufferError::UnknownHandle(handle))?;
        slots
            .get(index)
            .ok_or(QuadBufferError::IndexOutOfRange {
                handle,
                index,
                count: slots.len(),
            })?
            .as_ref()
            .ok_or(QuadBufferError::NotCompiled { handle, index })
    }

    /// Releases every slot of `handle`. `count` must match the generated count.
    pub fn delete(&mut self, handle: QuadBufferHandle, count: usize) -> Result<(), QuadBufferError> {
        let expected = self
            .buffers
            .get(&handle)
            .ok_or(QuadBufferError::UnknownHandle(handle))?
            .len();
        if expected != count {
            return Err(QuadBufferError::CountMismatch {
                handle,
                expected,
                actual: count,
            });
        }

        self.buffers.remove(&handle);
        self.free.insert(handle);
        log::trace!("quad buffer {handle}: deleted");
        Ok(())
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn slot_count(&self, handle: QuadBufferHandle) -> Option<usize> {
        self.buffers.get(&handle).map(Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(z: f32) -> QuadRecord {
        QuadRecord {
            texture: TextureId::new(3),
            normal: Vec3::Z,
            vertices: [
                Vec3::new(0.0, 0.0, z),
                Vec3::new(1.0, 0.0, z),
                Vec3::new(1.0, 1.0, z),
                Vec3::new(0.0, 1.0, z),
            ],
        }
    }

    impl QuadBufferCache {
        fn generate_ok(&mut self, count: usize) -> QuadBufferHandle {
            self.generate(count).unwrap()
        }
    }

    // ── handles ───────────────────────────────────────────────────────────

    #[test]
    fn handles_start_at_one_and_are_recycled_lowest_first() {
        let mut c = QuadBufferCache::new();
        let a = c.generate_ok(1);
        let b = c.generate_ok(1);
        let d = c.generate_ok(1);
        assert_eq!((a.get(), b.get(), d.get()), (1, 2, 3));

        c.delete(d, 1).unwrap();
        c.delete(a, 1).unwrap();
        assert_eq!(c.generate_ok(0).get(), 1);
        assert_eq!(c.generate_ok(0).get(), 3);
        assert_eq!(c.generate_ok(0).get(), 4);
    }

    #[test]
    fn exhausted_handles_fail_without_aliasing() {
        let mut c = QuadBufferCache::new();
        c.next = Some(NonZeroU32::MAX);
        let last = c.generate_ok(3);
        assert_eq!(last.get(), u32::MAX);

        assert_eq!(c.generate(1), Err(QuadBufferError::Exhausted));
        assert_eq!(c.slot_count(last), Some(3));
        assert_eq!(c.len(), 1);

        c.delete(last, 3).unwrap();
        assert_eq!(c.generate(1), Ok(last));
    }

    #[test]
    fn empty_buffer_generates_and_deletes() {
        let mut c = QuadBufferCache::new();
        let h = c.generate_ok(0);
        assert_eq!(c.slot_count(h), Some(0));
        assert_eq!(c.delete(h, 0), Ok(()));
        assert!(c.is_empty());
    }

    // ── slots ─────────────────────────────────────────────────────────────

    #[test]
    fn compile_then_read_returns_the_record() {
        let mut c = QuadBufferCache::new();
        let h = c.generate_ok(3);
        c.compile(h, 2, rec(1.0)).unwrap();
        c.compile(h, 0, rec(0.0)).unwrap();
        assert_eq!(c.record(h, 2), Ok(&rec(1.0)));
        assert_eq!(c.record(h, 0), Ok(&rec(0.0)));
    }

    #[test]
    fn recompile_overwrites() {
        let mut c = QuadBufferCache::new();
        let h = c.generate_ok(1);
        c.compile(h, 0, rec(0.0)).unwrap();
        c.compile(h, 0, rec(2.0)).unwrap();
        assert_eq!(c.record(h, 0), Ok(&rec(2.0)));
    }

    #[test]
    fn out_of_range_and_uncompiled_fail() {
        let mut c = QuadBufferCache::new();
        let h = c.generate_ok(2);
        assert_eq!(
            c.compile(h, 2, rec(0.0)),
            Err(QuadBufferError::IndexOutOfRange { handle: h, index: 2, count: 2 })
        );
        assert_eq!(
            c.record(h, 5),
            Err(QuadBufferError::IndexOutOfRange { handle: h, index: 5, count: 2 })
        );
        assert_eq!(c.record(h, 1), Err(QuadBufferError::NotCompiled { handle: h, index: 1 }));
    }

    #[test]
    fn deleted_handle_is_unknown() {
        let mut c = QuadBufferCache::new();
        let h = c.generate_ok(1);
        c.compile(h, 0, rec(0.0)).unwrap();
        c.delete(h, 1).unwrap();
        assert_eq!(c.record(h, 0), Err(QuadBufferError::UnknownHandle(h)));
        assert_eq!(c.delete(h, 1), Err(QuadBufferError::UnknownHandle(h)));
    }

    #[test]
    fn delete_with_wrong_count_fails_and_keeps_buffer() {
        let mut c = QuadBufferCache::new();
        let h = c.generate_ok(4);
        assert_eq!(
            c.delete(h, 3),
            Err(QuadBufferError::CountMismatch { handle: h, expected: 4, actual: 3 })
        );
        assert_eq!(c.slot_count(h), Some(4));
    }

    #[test]
    fn errors_render_readably() {
        let h = QuadBufferHandle::new(7).unwrap();
        let e = QuadBufferError::IndexOutOfRange { handle: h, index: 9, count: 2 };
        assert_eq!(e.to_string(), "quad buffer #7: index 9 out of range (count 2)");
    }
}
