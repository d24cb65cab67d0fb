//! Rectangular room modes
//!
//! Room modes occur at frequencies where standing waves form between parallel surfaces.
//! - Axial modes: Standing waves between one pair of parallel walls (n,0,0), (0,m,0), or (0,0,p)
//! - Tangential modes: Standing waves between two pairs of walls (n,m,0), (n,0,p), or (0,m,p)
//! - Oblique modes: Standing waves between all three pairs of walls (n,m,p)
//!
//! Formula: f = (c/2) * sqrt((n/Lx)² + (m/Ly)² + (p/Lz)²)
//!
//! Enumeration is lazy: [`ModeIter`] walks the index cube on demand, so large
//! harmonic bounds never materialise the full mode list unless asked to.

use crate::error::{Result, RoomModesError};
use crate::types::{RoomDimensions, MAX_HARMONIC};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mode class, from the number of nonzero indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ModeType {
    Axial,
    Tangential,
    Oblique,
}

impl ModeType {
    /// Classify an index triple; `None` for (0, 0, 0)
    pub fn from_indices(indices: [u32; 3]) -> Option<Self> {
        match indices.iter().filter(|&&i| i != 0).count() {
            1 => Some(ModeType::Axial),
            2 => Some(ModeType::Tangential),
            3 => Some(ModeType::Oblique),
            _ => None,
        }
    }
}

impl fmt::Display for ModeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeType::Axial => write!(f, "axial"),
            ModeType::Tangential => write!(f, "tangential"),
            ModeType::Oblique => write!(f, "oblique"),
        }
    }
}

/// A single room resonance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Mode {
    /// Mode indices (p, q, r) along length, width and height
    pub indices: [u32; 3],
    /// Axial, tangential or oblique
    pub mode_type: ModeType,
    /// Resonant frequency in Hz
    pub frequency: f64,
}

impl Mode {
    /// Human readable label, e.g. "1,0,0 - Length mode (X)"
    pub fn description(&self) -> String {
        match self.indices {
            [p, 0, 0] => format!("{},0,0 - Length mode (X)", p),
            [0, q, 0] => format!("0,{},0 - Width mode (Y)", q),
            [0, 0, r] => format!("0,0,{} - Height mode (Z)", r),
            [p, q, 0] => format!("{},{},0 - Floor tangential", p, q),
            [p, 0, r] => format!("{},0,{} - Side tangential", p, r),
            [0, q, r] => format!("0,{},{} - Front tangential", q, r),
            [p, q, r] => format!("{},{},{} - Oblique", p, q, r),
        }
    }
}

/// Frequency of mode (p, q, r)
pub fn mode_frequency(indices: [u32; 3], room: &RoomDimensions, speed_of_sound: f64) -> f64 {
    let nx = f64::from(indices[0]) / room.length;
    let my = f64::from(indices[1]) / room.width;
    let pz = f64::from(indices[2]) / room.height;
    (speed_of_sound / 2.0) * (nx * nx + my * my + pz * pz).sqrt()
}

/// Lazy iterator over every mode with indices in `0..=n`, (0,0,0) excluded
///
/// Order is increasing p, then q, then r. Clone the iterator (or call
/// [`enumerate_modes`] again) to restart.
#[derive(Debug, Clone)]
pub struct ModeIter {
    room: RoomDimensions,
    speed_of_sound: f64,
    side: u64,
    next: u64,
    end: u64,
}

impl Iterator for ModeIter {
    type Item = Mode;

    fn next(&mut self) -> Option<Mode> {
        if self.next >= self.end {
            return None;
        }
        let idx = self.next;
        self.next += 1;

        let side = self.side;
        // enumerate_modes caps side at MAX_HARMONIC + 1, the casts cannot truncate
        let indices = [
            (idx / (side * side)) as u32,
            ((idx / side) % side) as u32,
            (idx % side) as u32,
        ];
        let mode_type = ModeType::from_indices(indices)?;
        Some(Mode {
            indices,
            mode_type,
            frequency: mode_frequency(indices, &self.room, self.speed_of_sound),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ModeIter {}

impl std::iter::FusedIterator for ModeIter {}

/// Enumerate all `(n+1)^3 - 1` modes of a rectangular room
///
/// Degenerate modes (distinct indices, equal frequency) are all reported.
/// No cutoff is applied here.
///
/// # Errors
/// `InvalidSimulationParameters` unless `1 <= n <= MAX_HARMONIC`.
pub fn enumerate_modes(room: &RoomDimensions, speed_of_sound: f64, n: u32) -> Result<ModeIter> {
    if n < 1 || n > MAX_HARMONIC {
        return Err(RoomModesError::InvalidSimulationParameters {
            field: "n",
            value: f64::from(n),
            constraint: "must satisfy 1 <= n <= 100",
        });
    }
    let side = u64::from(n) + 1;
    Ok(ModeIter {
        room: *room,
        speed_of_sound,
        side,
        // index 0 is (0, 0, 0)
        next: 1,
        end: side * side * side,
    })
}

/// Axial harmonics `k * c / (2 * dimension)` for k = 1..=n, stopping at `cutoff`
pub fn axial_mode_frequencies(
    dimension: f64,
    n: u32,
    speed_of_sound: f64,
    cutoff: f64,
) -> Vec<f64> {
    (1..=n)
        .map(|k| speed_of_sound / 2.0 * f64::from(k) / dimension)
        .take_while(|&f| f <= cutoff)
        .collect()
}

/// Number of modes per class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ModeCensus {
    pub axial: usize,
    pub tangential: usize,
    pub oblique: usize,
}

impl ModeCensus {
    pub fn from_modes<'a>(modes: impl IntoIterator<Item = &'a Mode>) -> Self {
        let mut census = Self::default();
        for mode in modes {
            match mode.mode_type {
                ModeType::Axial => census.axial += 1,
                ModeType::Tangential => census.tangential += 1,
                ModeType::Oblique => census.oblique += 1,
            }
        }
        census
    }

    pub fn total(&self) -> usize {
        self.axial + self.tangential + self.oblique
    }
}
