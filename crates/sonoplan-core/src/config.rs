//! Planner defaults configuration
//!
//! YAML-based defaults for delay computation, focus masking, and the
//! reference material, with a small search path:
//!
//! 1. Path in the `SONOPLAN_CONFIG` environment variable
//! 2. `./sonoplan.yaml` (current directory)
//! 3. `~/.config/sonoplan/config.yaml` (user config)
//! 4. `/etc/sonoplan/config.yaml` (system config)
//!
//! Missing files fall back to defaults; present files are validated after
//! parsing.
//!
//! ## Example configuration
//!
//! ```yaml
//! delay:
//!   c0: 1540.0
//!   interp_spacing: 1.0e-4
//!   interp_method: linear
//!
//! mask:
//!   aspect: [1.0, 1.0, 10.0]
//!
//! reference:
//!   sound_speed: 1500.0
//!   density: 1000.0
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::focus::DEFAULT_MASK_ASPECT;
use crate::materials::MaterialReference;
use crate::volume::InterpMethod;

/// Error type for configuration operations.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found
    NotFound(String),
    /// Failed to read configuration file
    ReadError(String),
    /// Failed to parse configuration
    ParseError(String),
    /// Invalid configuration value
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(msg) => write!(f, "config not found: {}", msg),
            ConfigError::ReadError(msg) => write!(f, "failed to read config: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "failed to parse config: {}", msg),
            ConfigError::ValidationError(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Delay-computation defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// Default homogeneous speed of sound, m/s
    pub c0: f64,
    /// Default ray-integration step, meters
    pub interp_spacing: f64,
    /// Default sampling kernel for ray integration
    pub interp_method: InterpMethod,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            c0: 1540.0,
            interp_spacing: crate::delays::DEFAULT_INTERP_SPACING,
            interp_method: InterpMethod::Linear,
        }
    }
}

/// Focus-mask defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    /// Distance aspect ratio (x, y, beam axis)
    pub aspect: [f64; 3],
    /// Lower z cut; `None` disables the cut
    pub zmin: Option<f64>,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            aspect: DEFAULT_MASK_ASPECT,
            zmin: None,
        }
    }
}

/// Top-level planner configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Delay-computation defaults
    pub delay: DelayConfig,
    /// Focus-mask defaults
    pub mask: MaskConfig,
    /// Reference (coupling) material
    pub reference: MaterialReference,
}

impl PlanConfig {
    /// Load configuration from the default search path, falling back to
    /// defaults when no file is found.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("SONOPLAN_CONFIG") {
            if Path::new(&path).exists() {
                return Self::load_from(Path::new(&path));
            }
        }
        for path in Self::config_search_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        tracing::debug!("no planner config found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delay.c0 <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "delay.c0 must be positive, got {}",
                self.delay.c0
            )));
        }
        if self.delay.interp_spacing <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "delay.interp_spacing must be positive, got {}",
                self.delay.interp_spacing
            )));
        }
        if self.mask.aspect.iter().any(|&a| a <= 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "mask.aspect components must be positive, got {:?}",
                self.mask.aspect
            )));
        }
        if self.reference.sound_speed <= 0.0 || self.reference.density <= 0.0 {
            return Err(ConfigError::ValidationError(
                "reference material needs positive sound_speed and density".into(),
            ));
        }
        Ok(())
    }

    /// Fixed configuration search paths.
    pub fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./sonoplan.yaml")];
        if let Ok(home) = std::env::var("HOME") {
            paths.push(
                PathBuf::from(home)
                    .join(".config")
                    .join("sonoplan")
                    .join("config.yaml"),
            );
        }
        paths.push(PathBuf::from("/etc/sonoplan/config.yaml"));
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PlanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delay.c0, 1540.0);
        assert_eq!(config.mask.aspect, [1.0, 1.0, 10.0]);
    }

    #[test]
    fn test_parse_partial_yaml() {
        let config = PlanConfig::parse("delay:\n  c0: 1480.0\n").unwrap();
        assert_eq!(config.delay.c0, 1480.0);
        // unspecified sections keep defaults
        assert_eq!(config.mask.aspect, [1.0, 1.0, 10.0]);
        assert_eq!(config.reference.sound_speed, 1500.0);
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(PlanConfig::parse("delay:\n  c0: -1.0\n").is_err());
        assert!(PlanConfig::parse("mask:\n  aspect: [1.0, 0.0, 10.0]\n").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_yaml() {
        assert!(matches!(
            PlanConfig::parse(": not yaml :"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = PlanConfig::default();
        config.delay.c0 = 1496.0;
        config.mask.zmin = Some(-0.01);
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back = PlanConfig::parse(&yaml).unwrap();
        assert_eq!(back, config);
    }
}
