use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One stored ambience setting. When `use_default_ambience` is set the stored
/// level is ignored and output mirrors the live environment default.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct AmbienceSetting {
    level: f32,
    use_default_ambience: bool,
}

impl AmbienceSetting {
    pub fn new(level: f32, use_default_ambience: bool) -> Self {
        Self {
            level: level.clamp(0.0, 1.0),
            use_default_ambience,
        }
    }

    /// A slot that tracks the live default, seeded at its grayscale level.
    pub fn following_default(environment_default: Vec3) -> Self {
        Self::new(grayscale(environment_default), true)
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn use_default_ambience(&self) -> bool {
        self.use_default_ambience
    }
}

// Manual impl so levels are clamped on the way in from disk as well.
impl<'de> Deserialize<'de> for AmbienceSetting {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            level: f32,
            use_default_ambience: bool,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(Self::new(raw.level, raw.use_default_ambience))
    }
}

/// Which of the two slots is active. Swapping flips the discriminant;
/// slot contents are never exchanged by identity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SlotId {
    Primary,
    Secondary,
}

impl SlotId {
    pub fn other(self) -> Self {
        match self {
            SlotId::Primary => SlotId::Secondary,
            SlotId::Secondary => SlotId::Primary,
        }
    }

    pub fn index(self) -> usize {
        match self {
            SlotId::Primary => 0,
            SlotId::Secondary => 1,
        }
    }
}

/// Reduce an RGB triple to a single intensity (Rec. 601 luma weights).
pub fn grayscale(color: Vec3) -> f32 {
    (0.299 * color.x + 0.587 * color.y + 0.114 * color.z).clamp(0.0, 1.0)
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NetworkConfig {
    pub use_multicast: bool,
    pub unicast_ip: String,
    pub universe: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            use_multicast: true,
            unicast_ip: "192.168.1.50".to_string(),
            universe: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_clamps_level() {
        assert_eq!(AmbienceSetting::new(1.5, false).level(), 1.0);
        assert_eq!(AmbienceSetting::new(-0.2, false).level(), 0.0);
        assert_eq!(AmbienceSetting::new(0.42, false).level(), 0.42);
    }

    #[test]
    fn test_deserialization_clamps_level() {
        let setting: AmbienceSetting =
            serde_json::from_str(r#"{"level": 7.0, "use_default_ambience": false}"#).unwrap();
        assert_eq!(setting.level(), 1.0, "out-of-range level should clamp on load");
    }

    #[test]
    fn test_deserialization_rejects_missing_field() {
        let result = serde_json::from_str::<AmbienceSetting>(r#"{"level": 0.5}"#);
        assert!(result.is_err(), "record without the flag should not parse");
    }

    #[test]
    fn test_grayscale_of_uniform_color_is_that_level() {
        let g = grayscale(Vec3::splat(0.4));
        assert!((g - 0.4).abs() < 1e-6, "luma weights should sum to one");
    }
}
