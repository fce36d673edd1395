/// Streak intensity and color ramp
///
/// Maps a streak length onto `[0, 1]` along the milestone breakpoints, then
/// onto three blended colors used for the streak gradient.

use std::fmt;

use serde::{Serialize, Serializer};

/// Day counts at which intensity reaches the matching level
const BREAKPOINT_DAYS: [i64; 6] = [0, 30, 150, 365, 730, 1095];
const BREAKPOINT_LEVELS: [f32; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

/// Primary palette, cool to warm
const PRIMARY_PALETTE: [Rgb; 9] = [
    Rgb::new(0x4f, 0x6d, 0x8f),
    Rgb::new(0x3f, 0x8e, 0xa8),
    Rgb::new(0x2f, 0xa8, 0x9a),
    Rgb::new(0x4c, 0xb5, 0x6f),
    Rgb::new(0x9b, 0xc1, 0x3c),
    Rgb::new(0xe3, 0xc0, 0x2e),
    Rgb::new(0xf2, 0x94, 0x2a),
    Rgb::new(0xe8, 0x5d, 0x2f),
    Rgb::new(0xd0, 0x2f, 0x4f),
];

/// Streak intensity in `[0, 1]` for a day count
///
/// Linear between breakpoints; negative counts clamp to 0 and anything past
/// the last breakpoint clamps to 1.
pub fn intensity(days: i64) -> f32 {
    if days <= BREAKPOINT_DAYS[0] {
        return BREAKPOINT_LEVELS[0];
    }

    for i in 1..BREAKPOINT_DAYS.len() {
        let (d0, d1) = (BREAKPOINT_DAYS[i - 1], BREAKPOINT_DAYS[i]);
        if days <= d1 {
            let t = (days - d0) as f32 / (d1 - d0) as f32;
            return lerp(BREAKPOINT_LEVELS[i - 1], BREAKPOINT_LEVELS[i], t);
        }
    }

    BREAKPOINT_LEVELS[BREAKPOINT_LEVELS.len() - 1]
}

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Component-wise linear blend, `t` clamped to `[0, 1]`
    pub fn blend(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| lerp(a as f32, b as f32, t).round().clamp(0.0, 255.0) as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Rotate hue by `hue_deg`, then scale saturation and offset lightness
    pub fn shift_hsl(self, hue_deg: f32, saturation_scale: f32, lightness_offset: f32) -> Rgb {
        let (h, s, l) = self.to_hsl();
        let h = (h + hue_deg).rem_euclid(360.0);
        let s = (s * saturation_scale).clamp(0.0, 1.0);
        let l = (l + lightness_offset).clamp(0.0, 1.0);
        Rgb::from_hsl(h, s, l)
    }

    fn to_hsl(self) -> (f32, f32, f32) {
        let r = self.r as f32 / 255.0;
        let g = self.g as f32 / 255.0;
        let b = self.b as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let delta = max - min;

        if delta == 0.0 {
            return (0.0, 0.0, l);
        }

        let s = delta / (1.0 - (2.0 * l - 1.0).abs());
        let h = if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        (h, s, l)
    }

    fn from_hsl(h: f32, s: f32, l: f32) -> Rgb {
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
        let m = l - c / 2.0;
        let (r, g, b) = match h {
            h if h < 60.0 => (c, x, 0.0),
            h if h < 120.0 => (x, c, 0.0),
            h if h < 180.0 => (0.0, c, x),
            h if h < 240.0 => (0.0, x, c),
            h if h < 300.0 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let to_byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgb::new(to_byte(r), to_byte(g), to_byte(b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Low, mid and high colors of a streak gradient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorStops {
    pub low: Rgb,
    pub mid: Rgb,
    pub high: Rgb,
}

/// The primary palette plus its lighter and darker variants
#[derive(Debug, Clone)]
pub struct IntensityPalette {
    light: Vec<Rgb>,
    primary: Vec<Rgb>,
    dark: Vec<Rgb>,
}

impl IntensityPalette {
    pub fn new(primary: Vec<Rgb>) -> Self {
        let light = primary.iter().map(|c| c.shift_hsl(-12.0, 0.85, 0.15)).collect();
        let dark = primary.iter().map(|c| c.shift_hsl(12.0, 1.1, -0.15)).collect();
        Self { light, primary, dark }
    }

    /// Colors for an intensity value (clamped to `[0, 1]`)
    pub fn color_stops(&self, intensity: f32) -> ColorStops {
        ColorStops {
            low: sample(&self.light, intensity),
            mid: sample(&self.primary, intensity),
            high: sample(&self.dark, intensity),
        }
    }
}

impl Default for IntensityPalette {
    fn default() -> Self {
        Self::new(PRIMARY_PALETTE.to_vec())
    }
}

/// Color stops from the default palette
pub fn color_stops(intensity: f32) -> ColorStops {
    IntensityPalette::default().color_stops(intensity)
}

/// Blend the two palette entries straddling `intensity * (len - 1)`
fn sample(palette: &[Rgb], intensity: f32) -> Rgb {
    match palette.len() {
        0 => Rgb::new(0, 0, 0),
        1 => palette[0],
        len => {
            let last = len - 1;
            let pos = intensity.clamp(0.0, 1.0) * last as f32;
            let lower = (pos.floor() as usize).min(last);
            let upper = (lower + 1).min(last);
            palette[lower].blend(palette[upper], pos - lower as f32)
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
