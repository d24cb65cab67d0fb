//! Room Modes - core value types
//!
//! Copyright (C) 2025 Pierre Aubert pierre(at)spinorama(dot)org
//!
//! This program is free software: you can redistribute it and/or modify
//! it under the terms of the GNU General Public License as published by
//! the Free Software Foundation, either version 3 of the License, or
//! (at your option) any later version.
//!
//! This program is distributed in the hope that it will be useful,
//! but WITHOUT ANY WARRANTY; without even the implied warranty of
//! MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//! GNU General Public License for more details.
//!
//! You should have received a copy of the GNU General Public License
//! along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::error::{Result, RoomModesError};
use crate::modes::ModeType;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Largest accepted harmonic bound; (n+1)^3 modes are evaluated per candidate.
pub const MAX_HARMONIC: u32 = 100;

// ============================================================================
// Room and environment
// ============================================================================

/// Interior dimensions of a rectangular room, in metres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RoomDimensions {
    /// Length along x (m)
    pub length: f64,
    /// Width along y (m)
    pub width: f64,
    /// Height along z (m)
    pub height: f64,
}

impl RoomDimensions {
    /// Create validated room dimensions
    pub fn new(length: f64, width: f64, height: f64) -> Result<Self> {
        let dims = Self {
            length,
            width,
            height,
        };
        dims.validate()?;
        Ok(dims)
    }

    /// Check that every dimension is strictly positive and finite
    pub fn validate(&self) -> Result<()> {
        for (field, value) in self.named() {
            if !(value.is_finite() && value > 0.0) {
                return Err(RoomModesError::InvalidDimensions { field, value });
            }
        }
        Ok(())
    }

    /// Dimensions as `[length, width, height]`
    pub fn as_array(&self) -> [f64; 3] {
        [self.length, self.width, self.height]
    }

    /// Room volume (m³)
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    fn named(&self) -> [(&'static str, f64); 3] {
        [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
        ]
    }
}

/// Air conditions inside the room
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnvironmentConditions {
    /// Temperature (°C)
    pub temperature: f64,
    /// Relative humidity as a fraction, 0 < rh < 1
    pub humidity: f64,
}

impl EnvironmentConditions {
    /// Create validated environment conditions
    pub fn new(temperature: f64, humidity: f64) -> Result<Self> {
        let env = Self {
            temperature,
            humidity,
        };
        env.validate()?;
        Ok(env)
    }

    /// Check the temperature is physical and the humidity a proper fraction
    pub fn validate(&self) -> Result<()> {
        if !(self.temperature.is_finite() && self.temperature > -273.15) {
            return Err(RoomModesError::InvalidEnvironment {
                field: "temp",
                value: self.temperature,
                constraint: "must be finite and above absolute zero",
            });
        }
        if !(self.humidity > 0.0 && self.humidity < 1.0) {
            return Err(RoomModesError::InvalidEnvironment {
                field: "rh",
                value: self.humidity,
                constraint: "must satisfy 0 < rh < 1",
            });
        }
        Ok(())
    }
}

// ============================================================================
// Positions
// ============================================================================

/// A point inside the room, in metres from the origin corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Coordinates as `[x, y, z]`
    pub fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Whether the point lies in the closed room volume
    pub fn is_inside(&self, room: &RoomDimensions) -> bool {
        self.as_array()
            .iter()
            .zip(room.as_array())
            .all(|(&c, dim)| c.is_finite() && (0.0..=dim).contains(&c))
    }

    /// Fail with `PositionOutOfBounds` unless the point is inside the room
    pub fn ensure_inside(&self, room: &RoomDimensions, what: &'static str) -> Result<()> {
        if self.is_inside(room) {
            Ok(())
        } else {
            Err(RoomModesError::PositionOutOfBounds {
                what,
                x: self.x,
                y: self.y,
                z: self.z,
                length: room.length,
                width: room.width,
                height: room.height,
            })
        }
    }

    /// Lexicographic order on (x, y, z)
    pub fn lexicographic_cmp(&self, other: &Position) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then(self.y.total_cmp(&other.y))
            .then(self.z.total_cmp(&other.z))
    }
}

// ============================================================================
// Simulation inputs
// ============================================================================

/// Harmonic bound, grid step and cutoff used by the search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SimulationParameters {
    /// Highest mode index considered along each axis
    pub n: u32,
    /// Grid step (m)
    pub cellsize: f64,
    /// Frequencies above this are ignored when scoring (Hz)
    pub lowpass: f64,
}

impl SimulationParameters {
    /// Create validated simulation parameters
    pub fn new(n: u32, cellsize: f64, lowpass: f64) -> Result<Self> {
        let params = Self {
            n,
            cellsize,
            lowpass,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n < 1 || self.n > MAX_HARMONIC {
            return Err(RoomModesError::InvalidSimulationParameters {
                field: "n",
                value: f64::from(self.n),
                constraint: "must satisfy 1 <= n <= 100",
            });
        }
        if !(self.cellsize.is_finite() && self.cellsize > 0.0) {
            return Err(RoomModesError::InvalidSimulationParameters {
                field: "cellsize",
                value: self.cellsize,
                constraint: "must be > 0",
            });
        }
        if !(self.lowpass.is_finite() && self.lowpass > 0.0) {
            return Err(RoomModesError::InvalidSimulationParameters {
                field: "lowpass",
                value: self.lowpass,
                constraint: "must be > 0",
            });
        }
        Ok(())
    }
}

/// Relative weights of the three mode classes; only ratios matter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModeFactors {
    #[serde(default = "default_axial")]
    pub axial: f64,
    #[serde(default = "default_tangential")]
    pub tangential: f64,
    #[serde(default = "default_oblique")]
    pub oblique: f64,
}

// Tangential and oblique modes carry roughly -3 dB and -6 dB of the axial energy
fn default_axial() -> f64 {
    1.0
}
fn default_tangential() -> f64 {
    0.5
}
fn default_oblique() -> f64 {
    0.25
}

impl Default for ModeFactors {
    fn default() -> Self {
        Self {
            axial: default_axial(),
            tangential: default_tangential(),
            oblique: default_oblique(),
        }
    }
}

impl ModeFactors {
    /// Create validated mode factors
    pub fn new(axial: f64, tangential: f64, oblique: f64) -> Result<Self> {
        let factors = Self {
            axial,
            tangential,
            oblique,
        };
        factors.validate()?;
        Ok(factors)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("axial", self.axial),
            ("tangential", self.tangential),
            ("oblique", self.oblique),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(RoomModesError::InvalidModeFactors { field, value });
            }
        }
        Ok(())
    }

    /// Weight for a given mode class
    pub fn factor(&self, mode_type: ModeType) -> f64 {
        match mode_type {
            ModeType::Axial => self.axial,
            ModeType::Tangential => self.tangential,
            ModeType::Oblique => self.oblique,
        }
    }

    /// Every weight multiplied by `k`
    pub fn scaled(&self, k: f64) -> Self {
        Self {
            axial: self.axial * k,
            tangential: self.tangential * k,
            oblique: self.oblique * k,
        }
    }

    /// Weights rescaled so that axial is 1.0
    pub fn normalized(&self) -> Self {
        self.scaled(1.0 / self.axial)
    }
}
