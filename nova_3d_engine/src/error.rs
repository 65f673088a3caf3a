//! Error types for the Nova3D rendering core
//!
//! Every failure in this core is synchronous, deterministic, and either a
//! caller-correctable precondition violation or a propagated lookup failure.
//! There are no retries anywhere.

use std::fmt;

/// Result type for Nova3D operations
pub type Result<T> = std::result::Result<T, Error>;

/// Nova3D core errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Structural precondition violation (destroying the root node,
    /// passing a node key the tree does not own, re-parenting the root).
    /// Fatal to the attempted operation, never retried.
    Structural(String),

    /// Lookup failure (unknown camera, entity, material, or sub-mesh)
    NotFound(String),

    /// Invalid resource or argument (duplicate name, mesh without sub-meshes)
    InvalidResource(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Structural(msg) => write!(f, "Structural violation: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an [`Error`] value, logging it first with file:line details.
///
/// # Example
///
/// ```ignore
/// entities.get(key)
///     .ok_or_else(|| engine_err!("nova3d::SceneManager", NotFound,
///         "entity '{}' does not exist", name))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $variant:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::nova3d::Error::$variant(message)
    }};
}

/// Return early with an [`Error`], logging it first.
///
/// # Example
///
/// ```ignore
/// if key == self.root {
///     engine_bail!("nova3d::SceneTree", Structural, "the root node cannot be destroyed");
/// }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $variant:ident, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $variant, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
