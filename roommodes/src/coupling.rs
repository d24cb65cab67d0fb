//! Source coupling: how strongly a point source drives each mode
//!
//! With rigid walls the pressure shape of mode (p, q, r) is
//! Ψ(r) = cos(pπx/Lx) * cos(qπy/Ly) * cos(rπz/Lz).
//! The energy a point source injects into the mode scales with Ψ(source)²,
//! so the coupling lies in [0, 1]: 1 in the corners, 0 on a pressure node.
//! When a listener position is fixed, the received level also scales with
//! Ψ(listener)², and both factors are multiplied.

use crate::modes::{Mode, ModeType};
use crate::types::{Position, RoomDimensions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Pressure mode shape Ψ at a point
pub fn mode_shape(indices: [u32; 3], position: &Position, room: &RoomDimensions) -> f64 {
    (f64::from(indices[0]) * PI * position.x / room.length).cos()
        * (f64::from(indices[1]) * PI * position.y / room.width).cos()
        * (f64::from(indices[2]) * PI * position.z / room.height).cos()
}

/// Excitation factor in [0, 1] of `mode` by a source at `source`, optionally
/// as heard at `listener`
pub fn coupling(
    mode: &Mode,
    source: &Position,
    listener: Option<&Position>,
    room: &RoomDimensions,
) -> f64 {
    let s = mode_shape(mode.indices, source, room);
    let mut c = s * s;
    if let Some(listener) = listener {
        let l = mode_shape(mode.indices, listener, room);
        c *= l * l;
    }
    c
}

/// Distance from `coordinate` to the nearest pressure node of the k-th axial
/// mode along an axis of length `dimension`
///
/// Nodes of cos(kπx/L) sit at x = (2j + 1) L / (2k), j = 0..k-1.
pub fn nearest_pressure_node(k: u32, dimension: f64, coordinate: f64) -> f64 {
    if k == 0 {
        return f64::INFINITY;
    }
    let k = f64::from(k);
    let spacing = dimension / k;
    // Shift so that nodes land on integer multiples of `spacing`
    let shifted = coordinate - spacing / 2.0;
    let j = (shifted / spacing).round().clamp(0.0, k - 1.0);
    let node = spacing / 2.0 + j * spacing;
    (coordinate - node).abs()
}

/// Axis of an axial mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

/// How close a position is to the pressure nodes of one axial mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NodeProximity {
    pub axis: Axis,
    /// Mode order along the axis
    pub order: u32,
    /// Mode frequency (Hz)
    pub frequency: f64,
    /// Distance to the nearest pressure node (m)
    pub distance: f64,
}

/// Node proximity for every axial mode in `modes`
pub fn node_proximity<'a>(
    modes: impl IntoIterator<Item = &'a Mode>,
    position: &Position,
    room: &RoomDimensions,
) -> Vec<NodeProximity> {
    modes
        .into_iter()
        .filter(|m| m.mode_type == ModeType::Axial)
        .map(|m| {
            let (axis, order, dimension, coordinate) = match m.indices {
                [p, 0, 0] => (Axis::X, p, room.length, position.x),
                [0, q, 0] => (Axis::Y, q, room.width, position.y),
                [_, _, r] => (Axis::Z, r, room.height, position.z),
            };
            NodeProximity {
                axis,
                order,
                frequency: m.frequency,
                distance: nearest_pressure_node(order, dimension, coordinate),
            }
        })
        .collect()
}
