pub mod discovery;
pub mod error_log;
pub mod pool;
