//! Role domain entities.

pub mod model;
pub mod name;

pub use model::{Role, WILDCARD_PERMISSION};
pub use name::RoleName;
