//! `urlcount show-config` – print the effective configuration.

use anyhow::Result;
use urlcount_core::config::UrlCountConfig;

pub fn run_show_config(cfg: &UrlCountConfig) -> Result<()> {
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
