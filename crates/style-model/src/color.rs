//! CSS color and gradient descriptors.
//!
//! Background values arrive as CSS strings (`#667eea`, `rgba(0,0,0,0.5)`,
//! `linear-gradient(135deg, #667eea 0%, #764ba2 100%)`). This module parses
//! the subset the catalogs and the CLI use into typed values.

use serde::{Deserialize, Serialize};

/// A straight (non-premultiplied) 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with alpha scaled by `opacity` in `[0, 1]`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (self.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }
}

/// Errors produced while parsing CSS color or gradient strings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseColorError {
    #[error("Empty color value")]
    Empty,

    #[error("Invalid hex color: {0}")]
    InvalidHex(String),

    #[error("Invalid color function: {0}")]
    InvalidFunction(String),

    #[error("Unknown color: {0}")]
    Unknown(String),

    #[error("Invalid gradient: {0}")]
    InvalidGradient(String),
}

/// A color stop inside a linear gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient line in `[0, 1]`.
    pub position: f64,
    pub color: Rgba,
}

/// A CSS `linear-gradient(...)` descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearGradient {
    /// CSS angle in degrees (0 = towards top, 90 = towards right).
    pub angle_deg: f64,
    pub stops: Vec<GradientStop>,
}

impl LinearGradient {
    /// Start and end points of the gradient line for a `width x height` box,
    /// following the CSS gradient-line length rule so the corners receive
    /// the first and last stop colors.
    pub fn endpoints(&self, width: f64, height: f64) -> ((f64, f64), (f64, f64)) {
        let theta = self.angle_deg.to_radians();
        let (dx, dy) = (theta.sin(), -theta.cos());
        let length = (width * theta.sin()).abs() + (height * theta.cos()).abs();
        let (cx, cy) = (width / 2.0, height / 2.0);
        let half = length / 2.0;
        (
            (cx - dx * half, cy - dy * half),
            (cx + dx * half, cy + dy * half),
        )
    }

    /// First stop color; used when a flat approximation is needed.
    pub fn first_color(&self) -> Rgba {
        self.stops.first().map(|s| s.color).unwrap_or(Rgba::BLACK)
    }
}

/// Parse a CSS color: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`,
/// `rgba()`, and a few keywords.
pub fn parse_color(input: &str) -> Result<Rgba, ParseColorError> {
    let value = input.trim();
    if value.is_empty() {
        return Err(ParseColorError::Empty);
    }

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| ParseColorError::InvalidHex(value.to_string()));
    }

    let lower = value.to_ascii_lowercase();
    if let Some(args) = function_args(&lower, "rgba").or_else(|| function_args(&lower, "rgb")) {
        return parse_rgb_args(args)
            .ok_or_else(|| ParseColorError::InvalidFunction(value.to_string()));
    }

    match lower.as_str() {
        "white" => Ok(Rgba::WHITE),
        "black" => Ok(Rgba::BLACK),
        "transparent" => Ok(Rgba::TRANSPARENT),
        _ => Err(ParseColorError::Unknown(value.to_string())),
    }
}

/// Parse a CSS `linear-gradient(...)` descriptor.
///
/// Supports an optional leading angle (`135deg`, `0.5turn`) or side keyword
/// (`to right`, `to bottom left`), followed by two or more color stops with
/// optional percentage positions. Stops without positions are spread evenly
/// between their neighbours.
pub fn parse_linear_gradient(input: &str) -> Result<LinearGradient, ParseColorError> {
    let value = input.trim();
    let lower = value.to_ascii_lowercase();
    let args = function_args(&lower, "linear-gradient")
        .ok_or_else(|| ParseColorError::InvalidGradient(value.to_string()))?;

    let mut parts = split_top_level(args);
    if parts.is_empty() {
        return Err(ParseColorError::InvalidGradient(value.to_string()));
    }

    let angle_deg = match parse_direction(parts[0]) {
        Some(angle) => {
            parts.remove(0);
            angle
        }
        None => 180.0,
    };

    if parts.len() < 2 {
        return Err(ParseColorError::InvalidGradient(value.to_string()));
    }

    let mut raw: Vec<(Rgba, Option<f64>)> = Vec::with_capacity(parts.len());
    for part in parts {
        let (color_str, position) = split_stop(part);
        let color = parse_color(color_str)
            .map_err(|_| ParseColorError::InvalidGradient(value.to_string()))?;
        raw.push((color, position));
    }

    Ok(LinearGradient {
        angle_deg,
        stops: distribute_stops(&raw),
    })
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| -> Option<u8> {
        if let Some(pct) = s.strip_suffix('%') {
            let v: f64 = pct.parse().ok()?;
            Some((v.clamp(0.0, 100.0) * 2.55).round() as u8)
        } else {
            let v: f64 = s.parse().ok()?;
            Some(v.clamp(0.0, 255.0).round() as u8)
        }
    };
    let alpha = match parts.get(3) {
        Some(s) => {
            let v: f64 = match s.strip_suffix('%') {
                Some(pct) => pct.parse::<f64>().ok()? / 100.0,
                None => s.parse().ok()?,
            };
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Some(Rgba::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

/// Returns the text between `name(` and the matching final `)`.
fn function_args<'a>(value: &'a str, name: &str) -> Option<&'a str> {
    let rest = value.strip_prefix(name)?.trim_start();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner)
}

/// Split on commas that are not nested inside parentheses.
fn split_top_level(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in args.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let tail = args[start..].trim();
    if !tail.is_empty() {
        parts.push(tail);
    }
    parts
}

fn parse_direction(part: &str) -> Option<f64> {
    let part = part.trim();
    if let Some(deg) = part.strip_suffix("deg") {
        return deg.trim().parse().ok();
    }
    if let Some(turn) = part.strip_suffix("turn") {
        return turn.trim().parse::<f64>().ok().map(|t| t * 360.0);
    }
    let side = part.strip_prefix("to ")?;
    let mut words: Vec<&str> = side.split_whitespace().collect();
    words.sort_unstable();
    match words.as_slice() {
        ["top"] => Some(0.0),
        ["right"] => Some(90.0),
        ["bottom"] => Some(180.0),
        ["left"] => Some(270.0),
        ["right", "top"] => Some(45.0),
        ["bottom", "right"] => Some(135.0),
        ["bottom", "left"] => Some(225.0),
        ["left", "top"] => Some(315.0),
        _ => None,
    }
}

/// Split `#667eea 40%` into color and optional position fraction.
fn split_stop(part: &str) -> (&str, Option<f64>) {
    let part = part.trim();
    if let Some(idx) = part.rfind(|c: char| c.is_whitespace()) {
        let (color, pos) = part.split_at(idx);
        if let Some(pct) = pos.trim().strip_suffix('%') {
            if let Ok(v) = pct.parse::<f64>() {
                return (color.trim(), Some((v / 100.0).clamp(0.0, 1.0)));
            }
        }
    }
    (part, None)
}

fn distribute_stops(raw: &[(Rgba, Option<f64>)]) -> Vec<GradientStop> {
    let n = raw.len();
    let mut positions: Vec<Option<f64>> = raw.iter().map(|(_, p)| *p).collect();
    if positions[0].is_none() {
        positions[0] = Some(0.0);
    }
    if positions[n - 1].is_none() {
        positions[n - 1] = Some(1.0);
    }

    let mut i = 0;
    while i < n {
        if positions[i].is_some() {
            i += 1;
            continue;
        }
        let prev = i - 1;
        let mut next = i;
        while positions[next].is_none() {
            next += 1;
        }
        let (a, b) = (positions[prev].unwrap_or(0.0), positions[next].unwrap_or(1.0));
        let span = (next - prev) as f64;
        for (k, slot) in positions.iter_mut().enumerate().take(next).skip(i) {
            *slot = Some(a + (b - a) * (k - prev) as f64 / span);
        }
        i = next;
    }

    // CSS clamps each stop to be no earlier than the one before it.
    let mut last = 0.0f64;
    raw.iter()
        .zip(positions)
        .map(|((color, _), pos)| {
            let position = pos.unwrap_or(last).max(last);
            last = position;
            GradientStop {
                position,
                color: *color,
            }
        })
        .collect()
}
