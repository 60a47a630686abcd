//! Account domain entities.

pub mod model;
pub mod provider;
pub mod status;
pub mod view;

pub use model::{Account, GoogleLink, NewAccount};
pub use provider::AuthProvider;
pub use status::AccountStatus;
pub use view::AccountView;
