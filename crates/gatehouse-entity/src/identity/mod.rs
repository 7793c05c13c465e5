//! Identity aggregate root.

pub mod model;
pub mod state;

pub use model::Identity;
pub use state::IdentityState;
