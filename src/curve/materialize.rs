//! Parameter-to-argument conversion.
//!
//! A static parameter becomes an inline number. An automated parameter becomes a two-column
//! `time value` text file holding the envelope resampled onto the selected window, and the
//! argument is that file's path. Times in the file are seconds relative to the window start.

use std::path::Path;

use anyhow::Context;

use crate::{
    curve::naming::TempNamer,
    envelope::shape::apply_shape,
    foundation::{
        core::TimeRange,
        error::{CdpError, CdpResult},
    },
    params::{
        parameter::{ArgFormatter, CommandArg, Parameter, TimeScaling},
        processor::ProcessorDescriptor,
    },
};

/// Sub-steps generated between each adjacent breakpoint pair.
pub const DEFAULT_SUBDIVISIONS: usize = 15;

/// Curve times are written with `%f` precision; rows that collide at this precision are dropped.
const TIME_QUANTUM: f64 = 1e-6;

/// One `time value` row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveRow {
    pub time: f64,
    pub value: f64,
}

/// Produce the command-line argument for `param`.
///
/// Order of precedence: an explicit formatter, then the inline value for non-automated
/// parameters, then a generated curve file.
pub fn materialize_argument(
    param: &Parameter,
    processor: &ProcessorDescriptor,
    input_duration: f64,
    selection: TimeRange,
    subdivisions: usize,
    namer: &TempNamer,
) -> CdpResult<CommandArg> {
    match &param.formatter {
        Some(ArgFormatter::Custom(f)) => return (f.0)(param, namer),
        Some(ArgFormatter::ValueFile) => return write_value_file(param, namer),
        None => {}
    }
    if !param.is_automated() {
        return Ok(CommandArg::inline(param.prefixed(param.current_value)));
    }

    let time_scale = resolve_time_scale(param, processor);
    let rows = curve_rows(param, input_duration, selection, subdivisions, time_scale)?;
    let path = namer.unique(&param.name, "txt");
    std::fs::write(&path, format_rows(&rows))
        .with_context(|| format!("write curve file '{}'", path.display()))?;
    tracing::debug!(
        parameter = %param.name,
        rows = rows.len(),
        path = %path.display(),
        "curve file written"
    );
    Ok(CommandArg::file(param.prefixed(path.display()), path))
}

/// Seconds that one normalized envelope unit spans when the parameter carries its own
/// time base.
pub fn resolve_time_scale(param: &Parameter, processor: &ProcessorDescriptor) -> Option<f64> {
    match param.time_scaling? {
        TimeScaling::ParameterValue { index } => {
            processor.parameters.get(index).map(|p| p.current_value)
        }
        TimeScaling::Constant { seconds } => Some(seconds),
    }
}

/// Resample `param`'s envelope onto `selection`.
///
/// Without a time scale, envelope time `0..1` spans `input_duration` seconds, sub-step rows
/// outside the selection are dropped and the rest are re-based to the selection start. With a
/// time scale, envelope time is multiplied by it and rows are kept as-is. Scaled sub-step
/// times interpolate within the segment (`n0.time + dt * frac`), not `n0.time + frac`, which
/// would overrun the next node.
///
/// The returned times are strictly increasing at [`TIME_QUANTUM`] resolution.
pub fn curve_rows(
    param: &Parameter,
    input_duration: f64,
    selection: TimeRange,
    subdivisions: usize,
    time_scale: Option<f64>,
) -> CdpResult<Vec<CurveRow>> {
    if !(input_duration.is_finite() && input_duration > 0.0) {
        return Err(CdpError::input(format!(
            "cannot build a curve for input duration {input_duration}"
        )));
    }
    let subdivisions = subdivisions.max(1);
    let len = input_duration;
    let env = &param.envelope;
    let nodes = env.nodes();
    let value_at = |seconds: f64| param.scale(env.interpolated_value(seconds / len));

    let mut rows = Vec::with_capacity(nodes.len().saturating_sub(1) * subdivisions + 2);
    if selection.start > 0.0 || nodes.len() < 2 {
        push_row(&mut rows, 0.0, value_at(selection.start));
    }

    for pair in nodes.windows(2) {
        let (n0, n1) = (&pair[0], &pair[1]);
        if n1.time < 0.0 || n0.time > 1.0 {
            continue;
        }
        let dt = n1.time - n0.time;
        let dv = n1.value - n0.value;
        for j in 0..subdivisions {
            let frac = j as f64 / subdivisions as f64;
            let shaped = n0.value
                + dv * apply_shape(n0.shape_kind, frac, n0.shape_param_1, n0.shape_param_2);
            let value = param.scale(shaped);
            let env_time = n0.time + dt * frac;
            match time_scale {
                Some(scale) => push_row(&mut rows, env_time * scale, value),
                None => {
                    let abs = env_time * len;
                    if selection.contains(abs) {
                        push_row(&mut rows, abs - selection.start, value);
                    }
                }
            }
        }
    }

    let end_time = time_scale.unwrap_or(selection.length());
    let end_key = quantize(end_time);
    while rows.last().is_some_and(|r| quantize(r.time) >= end_key) {
        rows.pop();
    }
    rows.push(CurveRow {
        time: end_time,
        value: value_at(selection.end),
    });
    Ok(rows)
}

fn quantize(t: f64) -> i64 {
    (t / TIME_QUANTUM).round() as i64
}

fn push_row(rows: &mut Vec<CurveRow>, time: f64, value: f64) {
    if rows
        .last()
        .is_some_and(|last| quantize(time) <= quantize(last.time))
    {
        return;
    }
    rows.push(CurveRow { time, value });
}

/// `%f %f\n` per row; Rust float formatting is locale independent.
pub fn format_rows(rows: &[CurveRow]) -> String {
    let mut out = String::with_capacity(rows.len() * 20);
    for r in rows {
        out.push_str(&format!("{:.6} {:.6}\n", r.time, r.value));
    }
    out
}

/// Parse curve text written by [`format_rows`] (or by hand); blank lines are ignored.
pub fn parse_curve(text: &str) -> CdpResult<Vec<CurveRow>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let mut cols = line.split_whitespace().map(str::parse::<f64>);
            match (cols.next(), cols.next(), cols.next()) {
                (Some(Ok(time)), Some(Ok(value)), None) => Ok(CurveRow { time, value }),
                _ => Err(CdpError::validation(format!(
                    "curve line {}: expected two numbers, got '{}'",
                    i + 1,
                    line.trim()
                ))),
            }
        })
        .collect()
}

pub fn read_curve_file(path: &Path) -> CdpResult<Vec<CurveRow>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read curve file '{}'", path.display()))?;
    parse_curve(&text)
}

fn write_value_file(param: &Parameter, namer: &TempNamer) -> CdpResult<CommandArg> {
    let path = namer.unique(&param.name, "txt");
    std::fs::write(&path, format!("{:.6}\n", param.current_value))
        .with_context(|| format!("write value file '{}'", path.display()))?;
    Ok(CommandArg::file(param.prefixed(path.display()), path))
}

#[cfg(test)]
#[path = "../../tests/unit/curve/materialize.rs"]
mod tests;
