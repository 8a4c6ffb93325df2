use serde::{Deserialize, Serialize};

/// An RGB color, serialized as a `#rrggbb` hex string so the render
/// adapter can pass it straight to SVG/CSS fill attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse a `#rrggbb` hex string.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Color, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Color::parse_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color '{}'", s)))
    }
}

// ── Categorical palette ──────────────────────────────────────────────────────

/// Twenty distinguishable categorical colors used for group coloring.
pub const GROUP_COLORS: &[Color] = &[
    Color::from_rgb(0x1f, 0x77, 0xb4),
    Color::from_rgb(0xae, 0xc7, 0xe8),
    Color::from_rgb(0xff, 0x7f, 0x0e),
    Color::from_rgb(0xff, 0xbb, 0x78),
    Color::from_rgb(0x2c, 0xa0, 0x2c),
    Color::from_rgb(0x98, 0xdf, 0x8a),
    Color::from_rgb(0xd6, 0x27, 0x28),
    Color::from_rgb(0xff, 0x98, 0x96),
    Color::from_rgb(0x94, 0x67, 0xbd),
    Color::from_rgb(0xc5, 0xb0, 0xd5),
    Color::from_rgb(0x8c, 0x56, 0x4b),
    Color::from_rgb(0xc4, 0x9c, 0x94),
    Color::from_rgb(0xe3, 0x77, 0xc2),
    Color::from_rgb(0xf7, 0xb6, 0xd2),
    Color::from_rgb(0x7f, 0x7f, 0x7f),
    Color::from_rgb(0xc7, 0xc7, 0xc7),
    Color::from_rgb(0xbc, 0xbd, 0x22),
    Color::from_rgb(0xdb, 0xdb, 0x8d),
    Color::from_rgb(0x17, 0xbe, 0xcf),
    Color::from_rgb(0x9e, 0xda, 0xe5),
];

/// Per-instance palette that assigns one color per group name, in the
/// order groups are first seen during parsing. The assignment is
/// deterministic for a given payload, so re-parsing the same document
/// always yields the same coloring.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    seen: Vec<String>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color for `group`, assigning the next palette slot on first sight.
    /// Wraps around after 20 groups.
    pub fn color_for(&mut self, group: &str) -> Color {
        let idx = match self.seen.iter().position(|g| g == group) {
            Some(idx) => idx,
            None => {
                self.seen.push(group.to_string());
                self.seen.len() - 1
            }
        };
        GROUP_COLORS[idx % GROUP_COLORS.len()]
    }
}

// ── Chart metrics ────────────────────────────────────────────────────────────

pub const BAR_HEIGHT: f32 = 20.0;
pub const ROW_GAP: f32 = 4.0;
/// Height of one row band (bar plus gap).
pub const ROW_BAND: f32 = BAR_HEIGHT + ROW_GAP;
pub const TOP_PADDING: f32 = 20.0;
/// Space reserved below the plot for the bottom axis labels.
pub const AXIS_HEIGHT: f32 = 20.0;
/// Fixed margin on the right edge of the plot.
pub const RIGHT_MARGIN: f32 = 15.0;
/// Gap between the widest group label and the plot area.
pub const LABEL_GAP: f32 = 15.0;
/// Estimated advance width of one label character at the 11 px label font.
pub const LABEL_CHAR_WIDTH: f32 = 6.6;

/// Estimated rendered width of a group label. The engine never touches a
/// font renderer, so this is a per-character estimate; an adapter that can
/// measure text may override the side padding through `LayoutOptions`.
pub fn estimate_label_width(label: &str) -> f32 {
    label.chars().count() as f32 * LABEL_CHAR_WIDTH
}
