//! Application services.
//!
//! Each operation is an async function taking the [`AppDependencies`]
//! container and the acting user. Services validate input, apply the
//! domain policy, call the repositories, and log state changes.
//!
//! [`AppDependencies`]: crate::infrastructure::AppDependencies

pub mod accounts;
pub mod error;
pub mod groups;
pub mod members;
pub mod security;
pub mod tasks;
pub mod validated;
pub mod validation;

pub use error::{ServiceError, ServiceResult};
pub use validated::Validated;
pub use validation::{FieldError, ValidationError};
