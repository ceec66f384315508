use std::fmt;

/// Error reported by a graphics backend.
///
/// `op` names the backend operation that failed (e.g. `"create_texture"`),
/// `message` carries the backend's own diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub op: &'static str,
    pub message: String,
}

impl BackendError {
    pub fn new(op: &'static str, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "backend error in {}: {}", self.op, self.message)
    }
}

impl std::error::Error for BackendError {}
