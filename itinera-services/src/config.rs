use serde::{Deserialize, Serialize};

/// Where the generation service lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Party size quoted in cost and transport requests.
    pub people: u32,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            people: 1,
            timeout_secs: 60,
        }
    }
}

impl ServiceConfig {
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let cfg = ServiceConfig {
            base_url: "http://planner.local/".into(),
            ..ServiceConfig::default()
        };
        assert_eq!(cfg.endpoint("/api/rebalance-budget"), "http://planner.local/api/rebalance-budget");
    }
}
