pub mod alerts;
pub mod config;
pub mod error;
pub mod log_io;
pub mod matcher;
pub mod monitor;
pub mod scan;
