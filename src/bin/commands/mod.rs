pub mod config;
pub mod export;
pub mod records;
pub mod status;
