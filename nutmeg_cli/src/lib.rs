pub mod config;
pub mod config_file;
pub mod error;
