use crate::color::ColorMode;
use crate::maze::MazeSettings;
use crate::params::SimParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Current config file format
pub const CONFIG_VERSION: u32 = 1;

/// Complete application configuration for export/import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version field for future compatibility
    pub version: u32,
    /// Physical and numerical parameters
    pub params: SimParams,
    /// Maze dimension and wall threshold
    pub maze: MazeSettings,
    /// Start with an open box instead of a maze
    #[serde(default)]
    pub open_box: bool,
    /// Rng seed; a fresh one is drawn when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Steps per frame (app-level)
    pub steps_per_frame: usize,
    /// Particle coloring (app-level)
    #[serde(default)]
    pub color_mode: ColorMode,
}

impl AppConfig {
    /// Export config to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        fs::write(path, json).map_err(|e| format!("Failed to write config file: {}", e))?;
        Ok(())
    }

    /// Import config from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;
        if config.version > CONFIG_VERSION {
            return Err(format!(
                "Config version {} is newer than supported version {}",
                config.version, CONFIG_VERSION
            ));
        }
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            params: SimParams::default(),
            maze: MazeSettings::default(),
            open_box: false,
            seed: None,
            steps_per_frame: 5,
            color_mode: ColorMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::NeighborSearch;
    use glam::Vec2;
    use tempfile::NamedTempFile;

    #[test]
    fn test_all_fields_preserved() {
        let original = AppConfig {
            version: 1,
            params: SimParams {
                gravity: Vec2::new(0.0, -12.5),
                viscosity: 350.0,
                gas_constant: 1500.0,
                force_search: NeighborSearch::Grid,
                max_particles: 1800,
                ..Default::default()
            },
            maze: MazeSettings::new(24, 0.62).unwrap(),
            open_box: true,
            seed: Some(0xDEAD_BEEF),
            steps_per_frame: 12,
            color_mode: ColorMode::Speed,
        };

        let json = serde_json::to_string(&original).unwrap();
        let restored: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, original);
        assert_eq!(restored.params.gravity, Vec2::new(0.0, -12.5));
        assert_eq!(restored.params.force_search, NeighborSearch::Grid);
        assert_eq!(restored.maze.length, 24);
        assert_eq!(restored.seed, Some(0xDEAD_BEEF));
    }

    #[test]
    fn test_config_file_save_and_load() {
        let config = AppConfig::default();

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        config.save_to_file(&path).unwrap();
        let loaded = AppConfig::load_from_file(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_optional_fields_default() {
        let json = serde_json::json!({
            "version": 1,
            "params": SimParams::default(),
            "maze": { "length": 8, "threshold": 0.4 },
            "steps_per_frame": 3
        });
        let parsed: AppConfig = serde_json::from_value(json).unwrap();
        assert!(!parsed.open_box);
        assert_eq!(parsed.seed, None);
        assert_eq!(parsed.color_mode, ColorMode::Palette);
        assert_eq!(parsed.maze.length, 8);
    }

    #[test]
    fn test_newer_version_rejected() {
        let config = AppConfig {
            version: CONFIG_VERSION + 1,
            ..Default::default()
        };
        let temp_file = NamedTempFile::new().unwrap();
        config.save_to_file(temp_file.path()).unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(result.unwrap_err().contains("newer"));
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not valid json").unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/path/config.json"));
        assert!(result.is_err());
    }
}
