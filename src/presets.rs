use crate::params::{NeighborSearch, SimParams};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A named set of simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub params: SimParams,
}

impl Preset {
    pub fn new(name: impl Into<String>, description: impl Into<String>, params: SimParams) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params,
        }
    }
}

/// Manager for loading and saving presets
pub struct PresetManager {
    /// Built-in presets that ship with the app
    pub builtin: Vec<Preset>,
    /// User-created presets loaded from disk
    pub user: Vec<Preset>,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a preset name into a safe file stem
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

impl PresetManager {
    /// Built-in presets plus any user presets found on disk
    pub fn new() -> Self {
        let user = Self::presets_dir()
            .map(|dir| Self::load_dir(&dir))
            .unwrap_or_default();
        Self {
            builtin: Self::builtin_presets(),
            user,
        }
    }

    fn builtin_presets() -> Vec<Preset> {
        vec![
            Preset::new("Water", "Default dam break through the maze", SimParams::default()),
            Preset::new(
                "Viscous",
                "Thick fluid that creeps through the corridors",
                SimParams {
                    viscosity: 600.0,
                    gas_constant: 1200.0,
                    ..Default::default()
                },
            ),
            Preset::new(
                "Splashy",
                "Stiff, thin fluid with lively walls",
                SimParams {
                    viscosity: 80.0,
                    gas_constant: 3000.0,
                    boundary_damping: -0.8,
                    ..Default::default()
                },
            ),
            Preset::new(
                "Heavy",
                "Double gravity for a faster plunge",
                SimParams {
                    gravity: Vec2::new(0.0, -20.0),
                    ..Default::default()
                },
            ),
            Preset::new(
                "Grid-search",
                "Force pass limited to the neighbor grid",
                SimParams {
                    force_search: NeighborSearch::Grid,
                    ..Default::default()
                },
            ),
        ]
    }

    /// Get the presets directory path
    pub fn presets_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sph-maze").join("presets"))
    }

    /// Read every `*.json` preset in `dir`, skipping unreadable files
    pub fn load_dir(dir: &Path) -> Vec<Preset> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut presets = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            match fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|content| serde_json::from_str::<Preset>(&content).map_err(|e| e.to_string()))
            {
                Ok(preset) => presets.push(preset),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable preset"),
            }
        }
        presets.sort_by(|a, b| a.name.cmp(&b.name));
        presets
    }

    /// Write `preset` into `dir` as `<name>.json`, returning the file path
    pub fn write_preset(dir: &Path, preset: &Preset) -> Result<PathBuf, String> {
        fs::create_dir_all(dir).map_err(|e| format!("Failed to create presets directory: {}", e))?;
        let path = dir.join(format!("{}.json", file_stem(&preset.name)));
        let json = serde_json::to_string_pretty(preset)
            .map_err(|e| format!("Failed to serialize preset: {}", e))?;
        fs::write(&path, json).map_err(|e| format!("Failed to write preset file: {}", e))?;
        Ok(path)
    }

    /// Save a preset to the user presets directory
    pub fn save_preset(&mut self, preset: Preset) -> Result<PathBuf, String> {
        let dir = Self::presets_dir().ok_or("Could not determine config directory")?;
        let path = Self::write_preset(&dir, &preset)?;
        match self.user.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.user.push(preset),
        }
        Ok(path)
    }

    /// Get all presets (builtin + user)
    pub fn all_presets(&self) -> impl Iterator<Item = &Preset> {
        self.builtin.iter().chain(self.user.iter())
    }

    /// Find a preset by name
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.all_presets().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Get preset names for display
    pub fn preset_names(&self) -> Vec<&str> {
        self.all_presets().map(|p| p.name.as_str()).collect()
    }
}
