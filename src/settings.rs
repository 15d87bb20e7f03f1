//! View preferences
//!
//! Persisted as JSON next to the runner. None of these affect counting.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// User-facing heat map preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Show the heat map overlay
    pub heat_map_visible: bool,
    /// Heat map overlay opacity (0.0 - 1.0)
    pub heat_map_opacity: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            heat_map_visible: true,
            heat_map_opacity: 0.7,
        }
    }
}

impl Settings {
    /// Toggle heat map visibility, returns the new value
    pub fn toggle_heat_map(&mut self) -> bool {
        self.heat_map_visible = !self.heat_map_visible;
        self.heat_map_visible
    }

    /// Set heat map opacity (clamped to 0.0 - 1.0; NaN is ignored)
    pub fn set_heat_map_opacity(&mut self, opacity: f32) {
        if !opacity.is_nan() {
            self.heat_map_opacity = opacity.clamp(0.0, 1.0);
        }
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if let Ok(json) = std::fs::read_to_string(path) {
            match serde_json::from_str::<Settings>(&json) {
                Ok(mut settings) => {
                    let opacity = settings.heat_map_opacity;
                    settings.set_heat_map_opacity(opacity);
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Ignoring malformed settings {}: {}", path.display(), e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_is_clamped() {
        let mut settings = Settings::default();
        settings.set_heat_map_opacity(1.7);
        assert_eq!(settings.heat_map_opacity, 1.0);
        settings.set_heat_map_opacity(-0.2);
        assert_eq!(settings.heat_map_opacity, 0.0);
        settings.set_heat_map_opacity(f32::NAN);
        assert_eq!(settings.heat_map_opacity, 0.0);
    }

    #[test]
    fn test_toggle_heat_map() {
        let mut settings = Settings::default();
        assert!(settings.heat_map_visible);
        assert!(!settings.toggle_heat_map());
        assert!(settings.toggle_heat_map());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load("/nonexistent/plinko-settings.json");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("plinko-settings-{}.json", std::process::id()));
        let settings = Settings {
            heat_map_visible: false,
            heat_map_opacity: 0.25,
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
        let _ = std::fs::remove_file(&path);
    }
}
