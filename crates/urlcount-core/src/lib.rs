pub mod config;
pub mod logging;

pub mod consumer;
pub mod fetch;
pub mod pipeline;
pub mod pool;
pub mod source;
