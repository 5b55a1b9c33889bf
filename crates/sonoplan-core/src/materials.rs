//! Named material-property volumes
//!
//! Segmentation hands the planner a set of named property volumes
//! ("sound_speed", "density", "alpha_coeff"). The planner treats them as
//! opaque sampled fields; only "sound_speed" is read here, for ray-traced
//! time-of-flight and for the reference speed used by direct delays.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{PlanError, PlanResult};
use crate::volume::Volume;

/// Property name for the speed-of-sound volume
pub const SOUND_SPEED: &str = "sound_speed";
/// Property name for the density volume
pub const DENSITY: &str = "density";
/// Property name for the attenuation-coefficient volume
pub const ATTENUATION: &str = "alpha_coeff";

/// Bulk properties of the reference (coupling) material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialReference {
    /// Speed of sound, m/s
    pub sound_speed: f64,
    /// Density, kg/m^3
    pub density: f64,
    /// Attenuation coefficient, dB/cm/MHz
    pub attenuation: f64,
}

impl Default for MaterialReference {
    fn default() -> Self {
        // Water at body temperature
        Self {
            sound_speed: 1500.0,
            density: 1000.0,
            attenuation: 0.0,
        }
    }
}

/// A set of named property volumes plus the reference material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialMaps {
    volumes: HashMap<String, Volume>,
    /// Properties of the reference material the array couples through
    pub reference: MaterialReference,
}

impl Default for MaterialMaps {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialMaps {
    /// Empty map set with the default reference material
    pub fn new() -> Self {
        Self {
            volumes: HashMap::new(),
            reference: MaterialReference::default(),
        }
    }

    /// Override the reference material
    pub fn with_reference(mut self, reference: MaterialReference) -> Self {
        self.reference = reference;
        self
    }

    /// Insert (or replace) a property volume under `name`
    pub fn insert(&mut self, name: impl Into<String>, volume: Volume) {
        self.volumes.insert(name.into(), volume);
    }

    /// Look up a property volume; fails with `MaterialNotFound`
    pub fn get(&self, name: &str) -> PlanResult<&Volume> {
        self.volumes
            .get(name)
            .ok_or_else(|| PlanError::MaterialNotFound(name.to_string()))
    }

    /// True when a property volume named `name` is present
    pub fn contains(&self, name: &str) -> bool {
        self.volumes.contains_key(name)
    }

    /// Names of all held property volumes
    pub fn names(&self) -> Vec<&str> {
        self.volumes.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Axis;
    use crate::grid::Grid3;
    use crate::transform::Matrix4;
    use crate::units::LengthUnit;

    fn small_volume(value: f64) -> Volume {
        Volume::new(
            "c",
            Grid3::filled(2, 2, 2, value),
            [
                Axis::new("x", vec![0.0, 1.0], LengthUnit::Mm).unwrap(),
                Axis::new("y", vec![0.0, 1.0], LengthUnit::Mm).unwrap(),
                Axis::new("z", vec![0.0, 1.0], LengthUnit::Mm).unwrap(),
            ],
            Matrix4::identity(),
        )
        .unwrap()
    }

    #[test]
    fn test_lookup() {
        let mut maps = MaterialMaps::new();
        maps.insert(SOUND_SPEED, small_volume(1540.0));
        assert!(maps.contains(SOUND_SPEED));
        assert_eq!(maps.get(SOUND_SPEED).unwrap().get(0, 0, 0), 1540.0);
    }

    #[test]
    fn test_missing_material_is_typed_error() {
        let maps = MaterialMaps::new();
        assert_eq!(
            maps.get(SOUND_SPEED).unwrap_err(),
            PlanError::MaterialNotFound(SOUND_SPEED.to_string())
        );
    }

    #[test]
    fn test_default_reference_is_waterlike() {
        let r = MaterialReference::default();
        assert!(r.sound_speed > 1400.0 && r.sound_speed < 1600.0);
        assert_eq!(r.attenuation, 0.0);
    }
}
