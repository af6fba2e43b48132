//! Color ramp sampling for status colors and comparison lines.

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse `#rrggbb` or `#rgb` (leading `#` optional).
    pub fn parse(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };
        let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8;
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

/// Sample `quantity` evenly spaced colors along a ramp, interpolating in RGB.
///
/// The first and last samples are the ramp's end colors. Unparseable entries
/// are skipped; an empty or fully invalid ramp yields no colors.
pub fn sample_ramp(ramp: &[String], quantity: usize) -> Vec<String> {
    let stops: Vec<Rgb> = ramp.iter().filter_map(|c| Rgb::parse(c)).collect();
    if stops.is_empty() || quantity == 0 {
        return Vec::new();
    }
    if stops.len() == 1 || quantity == 1 {
        return vec![stops[0].to_hex(); quantity];
    }

    let segments = (stops.len() - 1) as f64;
    (0..quantity)
        .map(|i| {
            let position = i as f64 / (quantity - 1) as f64 * segments;
            let idx = (position.floor() as usize).min(stops.len() - 2);
            let t = position - idx as f64;
            stops[idx].lerp(stops[idx + 1], t).to_hex()
        })
        .collect()
}

/// Color at `index` of a ramp, falling back to the last entry, then to
/// `fallback`.
pub fn ramp_color<'a>(ramp: &'a [String], index: usize, fallback: &'a str) -> &'a str {
    ramp.get(index)
        .or_else(|| ramp.last())
        .map(String::as_str)
        .unwrap_or(fallback)
}
