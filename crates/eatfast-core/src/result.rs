//! Convenience result type alias for Eat Fast.

use crate::error::AppError;

/// A specialized `Result` type for Eat Fast operations.
///
/// Every flow step returns this so failures propagate with `?` instead of
/// being intercepted at an outer boundary.
pub type AppResult<T> = Result<T, AppError>;
