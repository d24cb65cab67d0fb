//! Run configuration
//!
//! A [`Settings`] file describes one placement run. Field names follow the
//! historical TOML layout:
//!
//! ```toml
//! temp = 23.0
//! rh = 0.6
//! xpos = 1.0
//! ypos = 1.0
//! zpos = 1.0
//! n = 4
//! cellsize = 0.1
//! lowpass = 250.0
//!
//! [dimensions]
//! length = 8.4
//! width = 6.1
//! height = 2.5
//! ```
//!
//! JSON files with the same structure are accepted as well.

use crate::environment::speed_of_sound_for;
use crate::error::{Result, RoomModesError};
use crate::modes::axial_mode_frequencies;
use crate::score::ScoringPolicy;
use crate::search::{search_with_options, SearchOptions, SearchResult, MAX_GRID_CANDIDATES};
use crate::types::{
    EnvironmentConditions, ModeFactors, Position, RoomDimensions, SimulationParameters,
};
use log::{info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete description of a placement run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Settings {
    /// Air temperature (°C)
    #[serde(default = "default_temp")]
    pub temp: f64,
    /// Relative humidity, 0 < rh < 1
    #[serde(default = "default_rh")]
    pub rh: f64,
    /// Interior room size (m)
    pub dimensions: RoomDimensions,
    /// Initial speaker position (m)
    pub xpos: f64,
    pub ypos: f64,
    pub zpos: f64,
    /// Highest mode index per axis
    #[serde(default = "default_n")]
    pub n: u32,
    /// Grid step (m)
    #[serde(default = "default_cellsize")]
    pub cellsize: f64,
    /// Modes above this frequency are ignored (Hz)
    #[serde(default = "default_lowpass")]
    pub lowpass: f64,
    #[serde(default)]
    pub mode_factors: ModeFactors,
    /// Minimum distance from any wall (m)
    #[serde(default)]
    pub clearance: f64,
    /// Optional fixed listening position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listener: Option<Position>,
    /// Number of candidates kept in the ranking
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Evaluate candidates in parallel
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default)]
    pub scoring: ScoringPolicy,
}

fn default_temp() -> f64 {
    20.0
}
fn default_rh() -> f64 {
    0.5
}
fn default_n() -> u32 {
    4
}
fn default_cellsize() -> f64 {
    0.1
}
fn default_lowpass() -> f64 {
    250.0
}
fn default_top_n() -> usize {
    5
}
fn default_parallel() -> bool {
    true
}

impl Settings {
    pub fn environment(&self) -> EnvironmentConditions {
        EnvironmentConditions {
            temperature: self.temp,
            humidity: self.rh,
        }
    }

    pub fn initial_position(&self) -> Position {
        Position::new(self.xpos, self.ypos, self.zpos)
    }

    pub fn parameters(&self) -> SimulationParameters {
        SimulationParameters {
            n: self.n,
            cellsize: self.cellsize,
            lowpass: self.lowpass,
        }
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            clearance: self.clearance,
            listener: self.listener,
            top_n: self.top_n,
            parallel: self.parallel,
            scoring: self.scoring,
            max_candidates: MAX_GRID_CANDIDATES,
        }
    }
}

/// Non-fatal findings of [`validate_settings`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Send every warning to the log
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}

/// Check every field, failing on the first hard error
///
/// Plausible but suspicious values end up as warnings in the report.
pub fn validate_settings(settings: &Settings) -> Result<ValidationReport> {
    let env = settings.environment();
    env.validate()?;
    let room = settings.dimensions;
    room.validate()?;
    settings.parameters().validate()?;
    settings.mode_factors.validate()?;
    settings.search_options().validate()?;
    settings.initial_position().ensure_inside(&room, "speaker")?;
    if let Some(listener) = &settings.listener {
        listener.ensure_inside(&room, "listener")?;
    }

    let mut report = ValidationReport::default();

    if !(0.0..=40.0).contains(&settings.temp) {
        report.add_warning(format!(
            "temp ({} °C) is outside the usual 0-40 °C range for rooms",
            settings.temp
        ));
    }

    if settings.n > 10 {
        report.add_warning(format!(
            "n = {} enumerates {} modes per candidate, the search may be slow",
            settings.n,
            (u64::from(settings.n) + 1).pow(3) - 1
        ));
    }

    if room.as_array().iter().all(|&d| settings.cellsize > d) {
        report.add_warning(format!(
            "cellsize ({} m) exceeds every room dimension, only the initial position is evaluated",
            settings.cellsize
        ));
    }

    let longest = room.length.max(room.width).max(room.height);
    let c = speed_of_sound_for(&env);
    if let Some(&lowest_axial) = axial_mode_frequencies(longest, 1, c, f64::INFINITY).first() {
        if settings.lowpass < lowest_axial {
            report.add_warning(format!(
                "lowpass ({} Hz) is below the lowest axial mode ({:.1} Hz), all scores are 0",
                settings.lowpass, lowest_axial
            ));
        }
    }

    Ok(report)
}

/// Parse settings from TOML or JSON text
pub fn parse_settings(text: &str, format: ConfigFormat) -> Result<Settings> {
    let settings: Settings = match format {
        ConfigFormat::Toml => toml::from_str(text)?,
        ConfigFormat::Json => serde_json::from_str(text)?,
    };
    Ok(settings)
}

/// Supported configuration syntaxes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            _ => Err(RoomModesError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }
}

/// Read settings from a `.toml` or `.json` file
pub fn load_settings(path: &Path) -> Result<Settings> {
    let format = ConfigFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    parse_settings(&text, format)
}

/// Validate `settings` and run the placement search
pub fn run_search(settings: &Settings) -> Result<SearchResult> {
    let report = validate_settings(settings)?;
    report.log_warnings();
    info!(
        "Room {} x {} x {} m, n = {}, cellsize = {} m, lowpass = {} Hz",
        settings.dimensions.length,
        settings.dimensions.width,
        settings.dimensions.height,
        settings.n,
        settings.cellsize,
        settings.lowpass
    );
    search_with_options(
        &settings.dimensions,
        &settings.environment(),
        &settings.parameters(),
        &settings.mode_factors,
        &settings.initial_position(),
        &settings.search_options(),
    )
}
