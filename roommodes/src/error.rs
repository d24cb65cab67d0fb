//! Error types for the roommodes crate.
//!
//! Every failure in this crate is a deterministic input or configuration
//! error; nothing here is transient, so nothing is retried.

use thiserror::Error;

/// Error type for roommodes operations.
#[derive(Debug, Error)]
pub enum RoomModesError {
    /// Temperature or relative humidity outside the physical domain.
    #[error("invalid environment: {field} = {value} ({constraint})")]
    InvalidEnvironment {
        /// Name of the offending field (e.g., "rh").
        field: &'static str,
        /// Value that was supplied.
        value: f64,
        /// Constraint that was violated.
        constraint: &'static str,
    },

    /// A room dimension is not a strictly positive finite number.
    #[error("invalid room dimension: {field} = {value} (must be > 0)")]
    InvalidDimensions {
        /// Name of the offending dimension ("length", "width" or "height").
        field: &'static str,
        /// Value that was supplied.
        value: f64,
    },

    /// Harmonic bound, grid step, cutoff or clearance out of range.
    #[error("invalid simulation parameter: {field} = {value} ({constraint})")]
    InvalidSimulationParameters {
        /// Name of the offending parameter (e.g., "cellsize").
        field: &'static str,
        /// Value that was supplied.
        value: f64,
        /// Constraint that was violated.
        constraint: &'static str,
    },

    /// A mode-type weight is not a strictly positive finite number.
    #[error("invalid mode factor: {field} = {value} (must be > 0)")]
    InvalidModeFactors {
        /// Name of the offending weight ("axial", "tangential" or "oblique").
        field: &'static str,
        /// Value that was supplied.
        value: f64,
    },

    /// A position lies outside the room volume.
    #[error(
        "{what} position ({x}, {y}, {z}) is outside the room {length} x {width} x {height} m"
    )]
    PositionOutOfBounds {
        /// Which position was rejected ("speaker" or "listener").
        what: &'static str,
        /// x coordinate (m).
        x: f64,
        /// y coordinate (m).
        y: f64,
        /// z coordinate (m).
        z: f64,
        /// Room length (m).
        length: f64,
        /// Room width (m).
        width: f64,
        /// Room height (m).
        height: f64,
    },

    /// Grid generation produced no feasible candidate.
    #[error("empty search space: {reason}")]
    EmptySearchSpace {
        /// Why no candidate survived clipping.
        reason: String,
    },

    /// Grid generation would produce more candidates than allowed.
    #[error("search space too large: {candidates} candidates exceed the limit of {limit}")]
    SearchSpaceTooLarge {
        /// Number of candidates the grid would contain.
        candidates: u128,
        /// Maximum number of candidates accepted.
        limit: usize,
    },

    /// Unsupported configuration file format.
    #[error("unsupported configuration format for '{path}': expected .toml or .json")]
    UnsupportedFormat {
        /// Path to the configuration file.
        path: String,
    },

    /// I/O error wrapper.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for roommodes operations.
pub type Result<T> = std::result::Result<T, RoomModesError>;

impl RoomModesError {
    /// Returns true if this error was raised while validating inputs.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            RoomModesError::InvalidEnvironment { .. }
                | RoomModesError::InvalidDimensions { .. }
                | RoomModesError::InvalidSimulationParameters { .. }
                | RoomModesError::InvalidModeFactors { .. }
                | RoomModesError::PositionOutOfBounds { .. }
        )
    }

    /// Returns true if this error was raised while building the candidate grid.
    pub fn is_search_error(&self) -> bool {
        matches!(
            self,
            RoomModesError::EmptySearchSpace { .. } | RoomModesError::SearchSpaceTooLarge { .. }
        )
    }

    /// Returns true if this is a file/IO/parse error.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            RoomModesError::UnsupportedFormat { .. }
                | RoomModesError::Io(_)
                | RoomModesError::Json(_)
                | RoomModesError::Toml(_)
        )
    }
}
