//! Fetch handler boundary: given a URL and a word, return how often the word occurs.
//!
//! Workers only see the [`WordCounter`] trait, so tests can substitute a closure
//! for the libcurl-backed [`CurlCounter`].

mod curl_counter;

pub use curl_counter::{CurlCounter, CurlOptions};

/// Error returned by a single fetch-and-count call. Never fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (connect, resolve, timeout, read).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Response status was not 2xx and the counter was told to require success.
    #[error("HTTP {0}")]
    Http(u32),
    /// The handler panicked; only this job is affected.
    #[error("handler panicked: {0}")]
    Panicked(String),
    #[error("{0}")]
    Other(String),
}

/// Counts occurrences of `word` in the resource named by `url`.
pub trait WordCounter: Send + Sync {
    fn count(&self, url: &str, word: &str) -> Result<u64, FetchError>;
}

impl<F> WordCounter for F
where
    F: Fn(&str, &str) -> Result<u64, FetchError> + Send + Sync,
{
    fn count(&self, url: &str, word: &str) -> Result<u64, FetchError> {
        self(url, word)
    }
}

/// Number of non-overlapping occurrences of `needle` in `haystack`, scanning left to right.
/// An empty needle matches nothing.
pub fn count_occurrences(haystack: &[u8], needle: &[u8]) -> u64 {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0u64;
    let mut i = 0usize;
    while i + needle.len() <= haystack.len() {
        if &haystack[i..i + needle.len()] == needle {
            count += 1;
            i += needle.len();
        } else {
            i += 1;
        }
    }
    count
}
