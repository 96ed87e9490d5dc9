//! Pagination configuration.

use serde::{Deserialize, Serialize};

/// Pagination defaults and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Page size used when a caller does not specify one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Upper bound applied to caller-supplied page sizes.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

impl PagingConfig {
    /// Clamp a requested page number and page size to safe values.
    ///
    /// The page number is clamped to ≥ 1 and the page size to the
    /// `1..=max_page_size` range; a page size of zero falls back to
    /// `default_page_size`.
    pub fn normalize(&self, current_page: u64, page_size: u64) -> (u64, u64) {
        let page = current_page.max(1);
        let size = if page_size == 0 {
            self.default_page_size
        } else {
            page_size.min(self.max_page_size)
        };
        (page, size.max(1))
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_page_size() -> u64 {
    25
}

fn default_max_page_size() -> u64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_clamps_zero_page() {
        let cfg = PagingConfig::default();
        assert_eq!(cfg.normalize(0, 10), (1, 10));
    }

    #[test]
    fn test_normalize_zero_size_falls_back_to_default() {
        let cfg = PagingConfig::default();
        assert_eq!(cfg.normalize(3, 0), (3, 25));
    }

    #[test]
    fn test_normalize_caps_oversized_page() {
        let cfg = PagingConfig::default();
        assert_eq!(cfg.normalize(1, 5000), (1, 100));
    }
}
