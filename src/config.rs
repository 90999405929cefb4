//! UI Configuration
//!
//! Loaded from the bundled `board.config.json`; every field has a default.

use serde::Deserialize;

const BUNDLED_CONFIG: &str = include_str!("../board.config.json");

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiConfig {
    pub api_base_url: String,
    /// Cached board data older than this is refetched
    pub stale_time_ms: u64,
    /// Records kept by the in-memory log ring
    pub log_capacity: usize,
    pub project_id: String,
    pub board_id: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3030".to_string(),
            stale_time_ms: 30_000,
            log_capacity: 256,
            project_id: "demo".to_string(),
            board_id: "demo-board".to_string(),
        }
    }
}

impl UiConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Configuration shipped with the build
    pub fn bundled() -> Result<Self, serde_json::Error> {
        Self::from_json(BUNDLED_CONFIG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_config_parses() {
        let config = UiConfig::bundled().unwrap();
        assert_eq!(config.board_id, "demo-board");
        assert_eq!(config.api_base_url, UiConfig::default().api_base_url);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = UiConfig::from_json(r#"{ "boardId": "other" }"#).unwrap();
        assert_eq!(config.board_id, "other");
        assert_eq!(config.stale_time_ms, 30_000);
        assert_eq!(config.project_id, "demo");
    }
}
