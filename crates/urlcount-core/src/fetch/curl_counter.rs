//! Default fetch handler: HTTP GET via libcurl, full body read, word count.

use std::time::Duration;

use super::{count_occurrences, FetchError, WordCounter};
use crate::config::UrlCountConfig;

/// Per-request curl settings.
#[derive(Debug, Clone)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Total transfer timeout (None = no limit).
    pub timeout: Option<Duration>,
    pub follow_redirects: bool,
    pub max_redirections: u32,
    /// Fail with `FetchError::Http` on non-2xx instead of counting the body.
    pub require_success_status: bool,
    pub user_agent: Option<String>,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self::from(&UrlCountConfig::default())
    }
}

impl From<&UrlCountConfig> for CurlOptions {
    fn from(cfg: &UrlCountConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: cfg.timeout_secs.map(Duration::from_secs),
            follow_redirects: cfg.follow_redirects,
            max_redirections: cfg.max_redirections,
            require_success_status: cfg.require_success_status,
            user_agent: cfg.user_agent.clone(),
        }
    }
}

/// Fetches each URL with a fresh curl Easy handle and counts the word in the body.
/// Blocking; workers call it from their own threads.
#[derive(Debug, Clone, Default)]
pub struct CurlCounter {
    opts: CurlOptions,
}

impl CurlCounter {
    pub fn new(opts: CurlOptions) -> Self {
        Self { opts }
    }

    pub fn from_config(cfg: &UrlCountConfig) -> Self {
        Self::new(CurlOptions::from(cfg))
    }

    /// GET `url` and return the response code and the full body.
    pub fn fetch_body(&self, url: &str) -> Result<(u32, Vec<u8>), FetchError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(self.opts.follow_redirects)?;
        if self.opts.follow_redirects {
            easy.max_redirections(self.opts.max_redirections)?;
        }
        easy.connect_timeout(self.opts.connect_timeout)?;
        if let Some(timeout) = self.opts.timeout {
            easy.timeout(timeout)?;
        }
        if let Some(ua) = self.opts.user_agent.as_deref() {
            easy.useragent(ua)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        Ok((code, body))
    }
}

impl WordCounter for CurlCounter {
    fn count(&self, url: &str, word: &str) -> Result<u64, FetchError> {
        let (code, body) = self.fetch_body(url)?;
        if self.opts.require_success_status && !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        tracing::trace!(url, code, bytes = body.len(), "fetched body");
        Ok(count_occurrences(&body, word.as_bytes()))
    }
}
