pub mod board;
pub mod config;
pub mod error;
pub mod session_store;
pub mod template;
