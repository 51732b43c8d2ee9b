pub mod config;
pub mod vision;
