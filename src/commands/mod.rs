pub mod ask;
pub mod auth;
pub mod config;
pub mod dash;
