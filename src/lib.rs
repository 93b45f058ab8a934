pub mod artwork;
pub mod cache;
pub mod error;
pub mod http;
pub mod source;

pub use error::ApiError;
