use std::error::Error;
use std::path::Path;

use serde::Deserialize;
use voxfield_runtime::StreamConfig;

/// Contents of `voxfield.toml`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub sim: SimConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "default_height_chunks")]
    pub height_chunks: usize,
    #[serde(default = "default_blocks_path")]
    pub blocks: String,
    #[serde(default = "default_sea_level")]
    pub sea_level: i32,
    #[serde(default)]
    pub seed: u32,
}
fn default_height_chunks() -> usize {
    16
}
fn default_blocks_path() -> String {
    "assets/blocks.toml".into()
}
fn default_sea_level() -> i32 {
    28
}
impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            height_chunks: default_height_chunks(),
            blocks: default_blocks_path(),
            sea_level: default_sea_level(),
            seed: 0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SimConfig {
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Sleep between ticks; 0 runs flat out.
    #[serde(default)]
    pub tick_ms: u64,
    /// Observer speed in blocks per tick.
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_edit_interval")]
    pub edit_interval: u64,
    #[serde(default = "default_report_interval")]
    pub report_interval: u64,
}
fn default_ticks() -> u64 {
    600
}
fn default_speed() -> f32 {
    0.35
}
fn default_edit_interval() -> u64 {
    15
}
fn default_report_interval() -> u64 {
    60
}
impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            tick_ms: 0,
            speed: default_speed(),
            edit_interval: default_edit_interval(),
            report_interval: default_report_interval(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(s)?)
    }

    /// Reads `path`, or falls back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        if !path.exists() {
            log::info!("{} not found; using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text).map_err(|e| format!("{}: {e}", path.display()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.stream.render_distance, 8);
        assert_eq!(cfg.world.height_chunks, 16);
        assert_eq!(cfg.world.blocks, "assets/blocks.toml");
        assert_eq!(cfg.sim.edit_interval, 15);
    }

    #[test]
    fn tables_override_fields() {
        let cfg = AppConfig::from_toml_str(
            "[stream]\nrender_distance = 3\n[world]\nheight_chunks = 4\n[sim]\nticks = 10\n",
        )
        .unwrap();
        assert_eq!(cfg.stream.render_distance, 3);
        assert_eq!(cfg.stream.unload_distance(), 4);
        assert_eq!(cfg.world.height_chunks, 4);
        assert_eq!(cfg.sim.ticks, 10);
        assert_eq!(cfg.sim.speed, 0.35);
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(AppConfig::from_toml_str("[stream]\nrender_distance = \"far\"\n").is_err());
    }

    #[test]
    fn shipped_config_parses() {
        let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let cfg = AppConfig::load(&root.join("voxfield.toml")).unwrap();
        assert_eq!(cfg.world.height_chunks, 8);
        assert_eq!(cfg.world.seed, 1337);
    }
}
