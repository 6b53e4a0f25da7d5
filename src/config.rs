// Store configuration
use serde::{Deserialize, Serialize};

/// Side length of the square map; valid coordinates are `0..DEFAULT_MAP_SIZE`
pub const DEFAULT_MAP_SIZE: i64 = 1000;

/// Two distances closer than this are considered equal
pub const DEFAULT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub map_size: i64,
    pub epsilon: f64,
}

impl AtlasConfig {
    pub fn with_map_size(mut self, map_size: i64) -> Self {
        self.map_size = map_size;
        self
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        (0..self.map_size).contains(&x) && (0..self.map_size).contains(&y)
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            map_size: DEFAULT_MAP_SIZE,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_half_open() {
        let config = AtlasConfig::default();
        assert!(config.in_bounds(0, 0));
        assert!(config.in_bounds(999, 999));
        assert!(!config.in_bounds(1000, 5));
        assert!(!config.in_bounds(5, -1));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AtlasConfig = serde_json::from_str(r#"{"map_size": 50}"#).unwrap();
        assert_eq!(config.map_size, 50);
        assert_eq!(config.epsilon, DEFAULT_EPSILON);
    }
}
