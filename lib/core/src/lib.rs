pub mod auth;
pub mod error;
pub mod module;
pub mod types;

pub use auth::{Principal, Role};
pub use error::ServiceError;
pub use module::Module;
pub use types::{Page, PageParams, new_id, now_rfc3339, success, today};
