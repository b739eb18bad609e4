pub mod auth;
pub mod error;
pub mod media;
pub mod messages;
pub mod profile;
pub mod subscription;
pub mod unlock;

pub use error::{Error, Result};
