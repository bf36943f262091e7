pub mod api;
pub mod auth;
pub mod event;
pub mod goal;
pub mod pagination;

pub use api::*;
pub use auth::*;
pub use event::*;
pub use goal::*;
pub use pagination::*;
