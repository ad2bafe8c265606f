use crate::error::KdTreeError;
use serde::{Deserialize, Serialize};

/// Tunables of the photon map radiance estimate.
///
/// Missing fields fall back to their defaults, so an empty TOML document is a
/// valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatherConfig {
    /// Number of nearest photons gathered per estimate.
    pub gather_count: usize,
    /// Photons farther than this from the shading point are ignored.
    pub max_radius: Option<f64>,
}

impl Default for GatherConfig {
    fn default() -> Self {
        Self {
            gather_count: 20,
            max_radius: None,
        }
    }
}

impl GatherConfig {
    pub fn new(gather_count: usize) -> Self {
        Self { gather_count, ..Self::default() }
    }

    pub fn with_max_radius(mut self, max_radius: f64) -> Self {
        self.max_radius = Some(max_radius);
        self
    }

    /// Parses a configuration from TOML text, e.g. `gather_count = 50`.
    pub fn from_toml_str(text: &str) -> Result<Self, KdTreeError> {
        toml::from_str(text).map_err(|e| KdTreeError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatherConfig::default();
        assert_eq!(config.gather_count, 20);
        assert_eq!(config.max_radius, None);
        assert_eq!(GatherConfig::from_toml_str("").unwrap(), config);
    }

    #[test]
    fn test_toml_overrides() {
        let config = GatherConfig::from_toml_str("gather_count = 50\nmax_radius = 0.25\n").unwrap();
        assert_eq!(config, GatherConfig::new(50).with_max_radius(0.25));
    }

    #[test]
    fn test_toml_rejects_bad_types() {
        let err = GatherConfig::from_toml_str("gather_count = \"many\"").unwrap_err();
        assert!(matches!(err, KdTreeError::Config(_)));
    }
}
