pub mod auth;
pub mod error;
pub mod json;
pub mod response;
