use serde::{Deserialize, Serialize};
use std::path::Path;

const TERMINAL_MARKERS: [&str; 4] = ["final", "terminal", "end", "complete"];
const INITIAL_MARKERS: [&str; 3] = ["initial", "start", "begin"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub level_spacing: f64,
    pub node_spacing: f64,
    pub origin_x: f64,
    pub center_y: f64,
    pub jitter: f64,
    pub loop_push: f64,
    pub relax_passes: usize,
    pub min_distance: f64,
    pub preferred_distance: f64,
    pub attraction: f64,
    pub max_vertical_spread: f64,
    pub vertical_pullback: f64,
    pub terminal_min_level: usize,
    pub terminal_markers: Vec<String>,
    pub initial_markers: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            level_spacing: 300.0,
            node_spacing: 150.0,
            origin_x: 100.0,
            center_y: 300.0,
            jitter: 12.0,
            loop_push: 40.0,
            relax_passes: 5,
            min_distance: 180.0,
            preferred_distance: 320.0,
            attraction: 0.05,
            max_vertical_spread: 450.0,
            vertical_pullback: 0.5,
            terminal_min_level: 2,
            terminal_markers: TERMINAL_MARKERS.iter().map(|m| m.to_string()).collect(),
            initial_markers: INITIAL_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl LayoutConfig {
    pub fn looks_terminal(&self, state_id: &str) -> bool {
        contains_marker(state_id, &self.terminal_markers)
    }

    pub fn looks_initial(&self, state_id: &str) -> bool {
        contains_marker(state_id, &self.initial_markers)
    }
}

fn contains_marker(state_id: &str, markers: &[String]) -> bool {
    let lowered = state_id.to_lowercase();
    markers
        .iter()
        .any(|marker| !marker.is_empty() && lowered.contains(&marker.to_lowercase()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_entries: 50 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    level_spacing: Option<f64>,
    node_spacing: Option<f64>,
    origin_x: Option<f64>,
    center_y: Option<f64>,
    jitter: Option<f64>,
    loop_push: Option<f64>,
    relax_passes: Option<usize>,
    min_distance: Option<f64>,
    preferred_distance: Option<f64>,
    attraction: Option<f64>,
    max_vertical_spread: Option<f64>,
    vertical_pullback: Option<f64>,
    terminal_min_level: Option<usize>,
    terminal_markers: Option<Vec<String>>,
    initial_markers: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryConfigFile {
    max_entries: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    layout: Option<LayoutConfigFile>,
    history: Option<HistoryConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(strict_err) => json5::from_str(contents)
            .map_err(|_| anyhow::anyhow!("Invalid config file: {strict_err}"))?,
    };

    let mut config = Config::default();
    if let Some(file) = parsed.layout {
        apply_layout_overrides(&mut config.layout, file);
    }
    if let Some(file) = parsed.history {
        if let Some(v) = file.max_entries {
            config.history.max_entries = v.max(1);
        }
    }
    Ok(config)
}

fn apply_layout_overrides(layout: &mut LayoutConfig, file: LayoutConfigFile) {
    if let Some(v) = file.level_spacing {
        layout.level_spacing = v;
    }
    if let Some(v) = file.node_spacing {
        layout.node_spacing = v;
    }
    if let Some(v) = file.origin_x {
        layout.origin_x = v;
    }
    if let Some(v) = file.center_y {
        layout.center_y = v;
    }
    if let Some(v) = file.jitter {
        layout.jitter = v.max(0.0);
    }
    if let Some(v) = file.loop_push {
        layout.loop_push = v;
    }
    if let Some(v) = file.relax_passes {
        layout.relax_passes = v;
    }
    if let Some(v) = file.min_distance {
        layout.min_distance = v.max(0.0);
    }
    if let Some(v) = file.preferred_distance {
        layout.preferred_distance = v;
    }
    if let Some(v) = file.attraction {
        layout.attraction = v.clamp(0.0, 1.0);
    }
    if let Some(v) = file.max_vertical_spread {
        layout.max_vertical_spread = v.max(0.0);
    }
    if let Some(v) = file.vertical_pullback {
        layout.vertical_pullback = v.clamp(0.0, 1.0);
    }
    if let Some(v) = file.terminal_min_level {
        layout.terminal_min_level = v;
    }
    if let Some(v) = file.terminal_markers {
        layout.terminal_markers = v;
    }
    if let Some(v) = file.initial_markers {
        layout.initial_markers = v;
    }
    if layout.preferred_distance < layout.min_distance {
        layout.preferred_distance = layout.min_distance;
    }
}
