use std::env;

/// Storage configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the single table (default: "clinical-canvas")
    pub table_name: String,
    /// Default cap on listing results (default: 100)
    pub query_limit: usize,
    /// Use the in-process backend instead of DynamoDB (default: false)
    pub use_local_storage: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CANVAS_TABLE_NAME` - table name (default: "clinical-canvas")
    /// - `CANVAS_QUERY_LIMIT` - listing result cap (default: 100)
    /// - `CANVAS_LOCAL_STORAGE` - set to "1" or "true" for in-process storage
    pub fn from_env() -> Self {
        Self {
            table_name: env::var("CANVAS_TABLE_NAME")
                .unwrap_or_else(|_| "clinical-canvas".to_string()),
            query_limit: env::var("CANVAS_QUERY_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            use_local_storage: env::var("CANVAS_LOCAL_STORAGE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        // Clear environment variables to test defaults
        env::remove_var("CANVAS_TABLE_NAME");
        env::remove_var("CANVAS_QUERY_LIMIT");
        env::remove_var("CANVAS_LOCAL_STORAGE");

        let config = Config::from_env();

        assert_eq!(config.table_name, "clinical-canvas");
        assert_eq!(config.query_limit, 100);
        assert!(!config.use_local_storage);
    }

    #[test]
    fn test_local_storage_flag_parsing() {
        env::set_var("CANVAS_LOCAL_STORAGE", "true");
        assert!(Config::from_env().use_local_storage);
        env::set_var("CANVAS_LOCAL_STORAGE", "0");
        assert!(!Config::from_env().use_local_storage);
        env::remove_var("CANVAS_LOCAL_STORAGE");
    }
}
