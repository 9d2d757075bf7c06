//! Hex color parsing and conversion to normalized GPU channels.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

/// An 8-bit-per-channel RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Black, used when a stored color cannot be parsed.
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    /// Channels as fractions in `[0, 1]`, each byte divided by 255.
    #[must_use]
    pub fn to_unit(self) -> [f32; 3] {
        [f32::from(self.r) / 255.0, f32::from(self.g) / 255.0, f32::from(self.b) / 255.0]
    }

    /// Canonical lowercase `#rrggbb` form.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Parse `#RGB` or `#RRGGBB` into channels.
#[must_use]
pub fn parse_hex_rgb(raw: &str) -> Option<Rgb> {
    let hex = raw.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => Some(Rgb {
            r: channel(&hex[0..1].repeat(2))?,
            g: channel(&hex[1..2].repeat(2))?,
            b: channel(&hex[2..3].repeat(2))?,
        }),
        6 => Some(Rgb { r: channel(&hex[0..2])?, g: channel(&hex[2..4])?, b: channel(&hex[4..6])? }),
        _ => None,
    }
}

fn channel(digits: &str) -> Option<u8> {
    match u8::from_str_radix(digits, 16) {
        Ok(v) => Some(v),
        Err(_) => None,
    }
}

/// Convert a stored hex color to GPU channels, falling back to black.
#[must_use]
pub fn hex_to_unit(raw: &str) -> [f32; 3] {
    parse_hex_rgb(raw).unwrap_or(Rgb::BLACK).to_unit()
}

/// Normalize to lowercase `#rrggbb`, or `None` when `raw` is not a hex color.
#[must_use]
pub fn normalize_hex(raw: &str) -> Option<String> {
    parse_hex_rgb(raw).map(Rgb::to_hex)
}
