pub mod client;
pub mod error;

pub use client::{ApiClient, PlayRequest};
pub use error::{ApiError, ApiResult};
