//! # System Constants
//!
//! Fixed ports, cache key, tracked terms and user-facing messages shared by
//! the four pipeline services.

/// Default service ports
pub mod ports {
    pub const TEXT_SOURCE: u16 = 50051;
    pub const ANALYZER: u16 = 50052;
    pub const STORAGE: u16 = 50053;
    pub const PRESENTER: u16 = 50054;
    pub const PRESENTER_HTTP: u16 = 5000;
}

/// RPC method names, each exposed as `POST /rpc/<Method>`
pub mod methods {
    pub const READ_TEXT: &str = "ReadText";
    pub const ANALYZE_TEXT: &str = "AnalyzeText";
    pub const GET_DATA: &str = "GetData";
    pub const GET_DISPLAY_DATA: &str = "GetDisplayData";

    /// Route path for a method name
    pub fn route(method: &str) -> String {
        format!("/rpc/{method}")
    }
}

/// Service names used in logs and error details
pub mod services {
    pub const TEXT_SOURCE: &str = "text_source";
    pub const ANALYZER: &str = "analyzer";
    pub const STORAGE: &str = "storage";
    pub const PRESENTER: &str = "presenter";
}

/// Presenter messages
pub mod messages {
    pub const NO_DATA_FOUND: &str = "No data found.";
    pub const ERROR_OCCURRED: &str = "An error occurred.";
    pub const DISPLAY_ERROR: &str = "An error occurred while displaying data.";
}

/// The single cache slot holding the rendered analysis
pub const ANALYSIS_CACHE_KEY: &str = "analysis_data";

/// Error code carried by every failed RPC
pub const INTERNAL_ERROR_CODE: &str = "INTERNAL";

/// Number of corpus characters included in debug logs
pub const LOG_PREVIEW_CHARS: usize = 100;

/// Default bounded worker pool size per service
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 10;

/// Default deadlines per hop, growing outward so an inner hop fails first
pub mod deadlines {
    pub const TEXT_SOURCE_MS: u64 = 10_000;
    pub const ANALYZER_MS: u64 = 20_000;
    pub const STORAGE_MS: u64 = 30_000;
}

/// Archaic terms tracked by default
pub const DEFAULT_TRACKED_TERMS: &[&str] = &[
    "thou",
    "thee",
    "hast",
    "hath",
    "ye",
    "whilst",
    "wherefore",
    "betwixt",
    "hither",
    "thither",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(methods::route(methods::READ_TEXT), "/rpc/ReadText");
        assert_eq!(
            methods::route(methods::GET_DISPLAY_DATA),
            "/rpc/GetDisplayData"
        );
    }

    #[test]
    fn test_default_tracked_terms_are_lowercase() {
        assert!(DEFAULT_TRACKED_TERMS
            .iter()
            .all(|t| t.chars().all(|c| c.is_lowercase())));
    }
}
