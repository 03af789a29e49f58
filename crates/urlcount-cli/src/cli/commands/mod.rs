//! CLI command handlers. Each command is in its own file.

mod run;
mod show_config;

pub use run::run_count;
pub use show_config::run_show_config;

#[cfg(test)]
pub(crate) use run::{write_result, write_total};
