//! Stable per-course colors derived from a hash of the course key.

use std::collections::HashMap;
use std::fmt;

// ─── HSL ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hsl {
    pub hue: u16,
    /// Percent, 0-100.
    pub saturation: u8,
    /// Percent, 0-100.
    pub lightness: u8,
}

impl Hsl {
    pub fn new(hue: u16, saturation: u8, lightness: u8) -> Self {
        Self {
            hue: hue % 360,
            saturation: saturation.min(100),
            lightness: lightness.min(100),
        }
    }

    /// Convert to 8-bit sRGB for terminals that take truecolor.
    pub fn to_rgb(self) -> (u8, u8, u8) {
        let h = self.hue as f64 / 360.0;
        let s = self.saturation as f64 / 100.0;
        let l = self.lightness as f64 / 100.0;

        if s == 0.0 {
            let v = channel(l);
            return (v, v, v);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
            channel(hue_to_rgb(p, q, h)),
            channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
        )
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.hue, self.saturation, self.lightness)
    }
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

// ─── Course colors ──────────────────────────────────────────────────────────

/// Pale background, slightly darker border and dark text, all in the same
/// teal/cyan hue family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseColor {
    pub background: Hsl,
    pub border: Hsl,
    pub text: Hsl,
}

/// 32-bit string hash over UTF-16 code units: `c + (h << 5) - h`, wrapping.
pub fn key_hash(key: &str) -> i32 {
    key.encode_utf16().fold(0i32, |hash, unit| {
        (unit as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    })
}

pub fn color_for(key: &str) -> CourseColor {
    let magnitude = key_hash(key).unsigned_abs();

    let hue = 160 + (magnitude % 40) as u16;
    let saturation = 60 + (magnitude % 20) as u8;
    let lightness = 80 + (magnitude % 10) as u8;

    CourseColor {
        background: Hsl::new(hue, saturation, lightness),
        border: Hsl::new(hue, saturation, lightness - 10),
        text: Hsl::new(hue, saturation + 10, 25),
    }
}

// ─── Cache ──────────────────────────────────────────────────────────────────

/// Memoizes [`color_for`]. Entries are never evicted or replaced since the
/// value is a pure function of the key.
#[derive(Debug, Default)]
pub struct ColorCache {
    entries: HashMap<String, CourseColor>,
}

impl ColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, key: &str) -> CourseColor {
        if let Some(color) = self.entries.get(key) {
            return *color;
        }
        let color = color_for(key);
        self.entries.insert(key.to_string(), color);
        color
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
