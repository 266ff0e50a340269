use crossterm::style::Color;

/// Tint alpha, fixed at 0.8 and pre-composited against the solid backdrop
/// color (the terminal has no blending).
const TINT_ALPHA_NUM: u32 = 4;
const TINT_ALPHA_DEN: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    /// Virtual cell size in source pixels. Light mode runs a denser grid;
    /// dark mode trades density for a cheaper frame.
    pub fn cell_px(self) -> u32 {
        match self {
            Theme::Dark => 8,
            Theme::Light => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    /// Solid page background behind the glyph field.
    pub fn backdrop(self) -> Color {
        match self {
            Theme::Dark => Color::Rgb { r: 0, g: 0, b: 0 },
            Theme::Light => Color::Rgb { r: 255, g: 255, b: 255 },
        }
    }

    /// Glyph tint for a cell of the given brightness.
    ///
    /// Dark: brightness-proportional green-amber `(b, 0.8b, 0.6b)`.
    /// Light: inverted brightness toward blue-purple `(0.4i, 0.3i, 0.5i)`.
    /// Both palettes are fixed; there is no configuration hook.
    pub fn glyph_color(self, brightness: u8) -> Color {
        let b = u32::from(brightness);
        let (r, g, bl) = match self {
            Theme::Dark => (b, (b * 4 + 2) / 5, (b * 3 + 2) / 5),
            Theme::Light => {
                let inv = 255 - b;
                ((inv * 2 + 2) / 5, (inv * 3 + 5) / 10, (inv + 1) / 2)
            }
        };
        let composite = |channel: u32, base: u32| -> u8 {
            ((channel * TINT_ALPHA_NUM + base * (TINT_ALPHA_DEN - TINT_ALPHA_NUM))
                / TINT_ALPHA_DEN) as u8
        };
        let base = match self {
            Theme::Dark => 0,
            Theme::Light => 255,
        };
        Color::Rgb {
            r: composite(r, base),
            g: composite(g, base),
            b: composite(bl, base),
        }
    }

    /// Foreground for page text and the shell transcript.
    pub fn text(self) -> Color {
        match self {
            Theme::Dark => Color::Rgb { r: 0, g: 255, b: 0 },
            Theme::Light => Color::Rgb { r: 0, g: 0, b: 0 },
        }
    }

    /// Accent for prompts, titles and borders.
    pub fn accent(self) -> Color {
        match self {
            Theme::Dark => Color::Rgb { r: 0, g: 255, b: 0 },
            Theme::Light => Color::Rgb { r: 0, g: 0, b: 170 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Theme;
    use crossterm::style::Color;

    fn rgb(color: Color) -> (u8, u8, u8) {
        match color {
            Color::Rgb { r, g, b } => (r, g, b),
            _ => unreachable!("theme colors are always rgb"),
        }
    }

    #[test]
    fn cell_size_depends_on_theme() {
        assert_eq!(Theme::Dark.cell_px(), 8);
        assert_eq!(Theme::Light.cell_px(), 4);
    }

    #[test]
    fn dark_tint_brightens_with_input() {
        let (r0, g0, b0) = rgb(Theme::Dark.glyph_color(10));
        let (r1, g1, b1) = rgb(Theme::Dark.glyph_color(200));
        assert!(r1 > r0 && g1 > g0 && b1 > b0);
        // Green-amber ordering: red leads, blue trails.
        assert!(r1 >= g1 && g1 >= b1);
    }

    #[test]
    fn light_tint_inverts_brightness() {
        let bright = rgb(Theme::Light.glyph_color(250));
        let dark = rgb(Theme::Light.glyph_color(5));
        // A bright source cell fades into the white page; a dark one stands out.
        assert!(dark.0 > bright.0 && dark.1 > bright.1 && dark.2 > bright.2);
    }

    #[test]
    fn keyword_round_trip() {
        assert_eq!(Theme::from_keyword("dark"), Some(Theme::Dark));
        assert_eq!(Theme::from_keyword(" Light "), Some(Theme::Light));
        assert_eq!(Theme::from_keyword("sepia"), None);
    }
}
