#![doc = include_str!("../README.md")]

/// Error types for roommodes operations.
pub mod error;
pub use error::{Result, RoomModesError};

/// Run configuration, validation and the settings-level entry point
pub mod config;
/// Mode excitation by a point source
pub mod coupling;
/// Speed of sound
pub mod environment;
/// Mode enumeration
pub mod modes;
/// Modal problem score
pub mod score;
/// Placement search over a grid
pub mod search;
/// Core value types
pub mod types;

// Re-export commonly used items
pub use config::{load_settings, run_search, validate_settings, Settings, ValidationReport};
pub use coupling::{coupling, node_proximity, NodeProximity};
pub use environment::speed_of_sound;
pub use modes::{axial_mode_frequencies, enumerate_modes, Mode, ModeCensus, ModeIter, ModeType};
pub use score::{score, ModeScorer, ScoreBreakdown, ScoringPolicy};
pub use search::{search, search_with_options, CoupledMode, SearchOptions, SearchResult};
pub use types::{EnvironmentConditions, ModeFactors, Position, RoomDimensions, SimulationParameters};
