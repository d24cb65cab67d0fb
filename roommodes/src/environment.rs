//! Speed of sound in room air
//!
//! The temperature term is the ideal-gas dependence `sqrt(1 + T/273.15)`; a
//! small linear correction accounts for the lighter, humid air.

use crate::error::Result;
use crate::types::EnvironmentConditions;

/// Speed of sound in dry air at 0 °C (m/s)
pub const SPEED_OF_SOUND_0C: f64 = 331.3;

/// 0 °C in kelvin
pub const ZERO_CELSIUS_K: f64 = 273.15;

/// Relative increase of the speed of sound per unit of relative humidity
pub const HUMIDITY_COEFFICIENT: f64 = 0.0124;

/// Speed of sound (m/s) for a temperature in °C and a relative humidity in (0, 1)
///
/// # Errors
/// `InvalidEnvironment` when `rh` is outside (0, 1) or the temperature is not
/// above absolute zero.
pub fn speed_of_sound(temp_c: f64, rh: f64) -> Result<f64> {
    EnvironmentConditions::new(temp_c, rh).map(|env| speed_of_sound_for(&env))
}

/// Speed of sound for already validated conditions
pub fn speed_of_sound_for(env: &EnvironmentConditions) -> f64 {
    SPEED_OF_SOUND_0C
        * (1.0 + env.temperature / ZERO_CELSIUS_K).sqrt()
        * (1.0 + HUMIDITY_COEFFICIENT * env.humidity)
}
