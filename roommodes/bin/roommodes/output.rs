//! Report rendering for placement runs

use roommodes::coupling::Axis;
use roommodes::{SearchResult, Settings};
use serde::Serialize;
use std::fmt::{self, Write};

/// Settings and result of one run, as written by `--format json`
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub settings: &'a Settings,
    pub result: &'a SearchResult,
}

pub fn render_json(settings: &Settings, result: &SearchResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Report { settings, result })
}

fn axis_label(axis: Axis) -> &'static str {
    match axis {
        Axis::X => "x",
        Axis::Y => "y",
        Axis::Z => "z",
    }
}

/// Human readable report
pub fn render_text(settings: &Settings, result: &SearchResult) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let room = &settings.dimensions;

    writeln!(
        out,
        "Room: {:.2} x {:.2} x {:.2} m ({:.1} m³)",
        room.length,
        room.width,
        room.height,
        room.volume()
    )?;
    writeln!(
        out,
        "Air: {:.1} °C, rh {:.2}, speed of sound {:.2} m/s",
        settings.temp, settings.rh, result.speed_of_sound
    )?;
    writeln!(
        out,
        "Search: {} candidates, cellsize {} m, clearance {} m, cutoff {} Hz",
        result.candidates_evaluated, settings.cellsize, settings.clearance, settings.lowpass
    )?;
    writeln!(out)?;

    let p = &result.position;
    writeln!(out, "Best position: x = {:.3} m, y = {:.3} m, z = {:.3} m", p.x, p.y, p.z)?;
    writeln!(
        out,
        "Score: {:.4} (clustering {:.4}, holes {:.4})",
        result.score, result.breakdown.clustering, result.breakdown.holes
    )?;
    writeln!(
        out,
        "Modes below cutoff: {} ({} axial, {} tangential, {} oblique)",
        result.census.total(),
        result.census.axial,
        result.census.tangential,
        result.census.oblique
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "{:>10}  {:<11} {:<28} {:>8} {:>8}",
        "freq (Hz)", "type", "mode", "coupling", "weight"
    )?;
    for m in &result.modes {
        writeln!(
            out,
            "{:>10.2}  {:<11} {:<28} {:>8.3} {:>8.3}",
            m.mode.frequency,
            m.mode.mode_type.to_string(),
            m.mode.description(),
            m.coupling,
            m.weight
        )?;
    }

    if !result.node_proximity.is_empty() {
        writeln!(out)?;
        writeln!(out, "Distance to nearest pressure node (axial modes):")?;
        for np in &result.node_proximity {
            writeln!(
                out,
                "  {}{:<3} {:>8.2} Hz  {:.3} m",
                axis_label(np.axis),
                np.order,
                np.frequency,
                np.distance
            )?;
        }
    }

    if result.ranking.len() > 1 {
        writeln!(out)?;
        writeln!(out, "Ranking:")?;
        for (i, c) in result.ranking.iter().enumerate() {
            writeln!(
                out,
                "  {}. ({:.3}, {:.3}, {:.3}) score {:.4}, {:.3} m from start",
                i + 1,
                c.position.x,
                c.position.y,
                c.position.z,
                c.score,
                c.distance
            )?;
        }
    }

    Ok(out)
}
