use crate::backend::{BackendError, GfxBackend, TextureId};
use crate::coords::Size2;

use super::ImageRgba;

/// A texture living in a backend, with its pixel size.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Texture {
    pub id: TextureId,
    pub size: Size2,
}

impl Texture {
    pub fn upload<B: GfxBackend + ?Sized>(backend: &mut B, image: &ImageRgba) -> Result<Self, BackendError> {
        let id = backend.create_texture(image.size(), image.pixels())?;
        log::debug!("texture {} uploaded ({}x{})", id.get(), image.size().w, image.size().h);
        Ok(Self {
            id,
            size: image.size(),
        })
    }

    /// Releases the backend texture. Copies of this value become dangling.
    pub fn destroy<B: GfxBackend + ?Sized>(self, backend: &mut B) {
        backend.destroy_texture(self.id);
    }
}
