//! Rendering errors.

use thiserror::Error;

/// Any failure while producing invoice PDF bytes. No partial output is
/// ever returned alongside it.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to render PDF: {0}")]
    RenderFailed(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
