use crate::shared::Result;

/// OutputPresenter port for emitting the rendered scan report
///
/// Implemented for stdout and for files.
pub trait OutputPresenter {
    /// # Errors
    /// Returns an error if the destination cannot be written
    fn present(&self, content: &str) -> Result<()>;
}
