//! Colors and themes.
//!
//! A [`Theme`] is a read-only set of named color tokens. It is passed by
//! value (or reference) into widget constructors; there is no global theme.

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red component (0-1).
    pub r: f32,
    /// Green component (0-1).
    pub g: f32,
    /// Blue component (0-1).
    pub b: f32,
    /// Alpha component (0-1).
    pub a: f32,
}

impl Color {
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    /// Solid black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Solid white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Timing green (personal best).
    pub const PERSONAL_BEST: Self = Self::rgba(0.2, 0.9, 0.3, 1.0);
    /// Timing purple (overall best).
    pub const OVERALL_BEST: Self = Self::rgba(0.6, 0.2, 1.0, 1.0);
    /// Loss red.
    pub const SLOWER: Self = Self::rgba(0.9, 0.2, 0.2, 1.0);
    /// Warning orange.
    pub const WARNING: Self = Self::rgba(1.0, 0.6, 0.1, 1.0);

    /// Creates a color from RGBA values (0-1).
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from RGB values (0-1) with full alpha.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Creates a color from hex value (0xRRGGBBAA).
    #[must_use]
    pub fn hex(hex: u32) -> Self {
        let r = ((hex >> 24) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let b = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let a = (hex & 0xFF) as f32 / 255.0;
        Self::rgba(r, g, b, a)
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
    #[must_use]
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        match digits.len() {
            6 => Some(Self::hex((value << 8) | 0xFF)),
            8 => Some(Self::hex(value)),
            _ => None,
        }
    }

    /// Returns a new color with different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Returns the color with its alpha multiplied by `factor`.
    #[must_use]
    pub fn fade(self, factor: f32) -> Self {
        self.with_alpha(self.a * factor)
    }

    /// Linearly interpolates between two colors.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Converts to array format.
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Names of every token a [`Theme`] carries.
pub const THEME_TOKENS: [&str; 11] = [
    "background",
    "surface",
    "primary",
    "secondary",
    "text",
    "text_muted",
    "border",
    "drop_target",
    "personal_best",
    "overall_best",
    "warning",
];

/// Complete theme for the timing screens.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Primary background color.
    pub background: Color,
    /// Surface color (cards, panels).
    pub surface: Color,
    /// Primary accent color.
    pub primary: Color,
    /// Secondary accent color.
    pub secondary: Color,
    /// Text color.
    pub text: Color,
    /// Muted text color.
    pub text_muted: Color,
    /// Border color.
    pub border: Color,
    /// Highlight for a slot that would accept the current drag.
    pub drop_target: Color,
    /// Personal best lap.
    pub personal_best: Color,
    /// Overall best lap.
    pub overall_best: Color,
    /// Warning color.
    pub warning: Color,
}

impl Theme {
    /// Dark broadcast theme.
    pub const DARK: Self = Self {
        background: Color::rgba(0.02, 0.02, 0.03, 1.0),
        surface: Color::rgba(0.05, 0.05, 0.08, 0.95),
        primary: Color::rgba(0.2, 0.9, 1.0, 1.0),
        secondary: Color::rgba(1.0, 0.2, 0.6, 1.0),
        text: Color::rgba(0.9, 0.9, 0.9, 1.0),
        text_muted: Color::rgba(0.5, 0.5, 0.5, 1.0),
        border: Color::rgba(0.15, 0.2, 0.15, 0.8),
        drop_target: Color::rgba(0.2, 0.9, 1.0, 0.35),
        personal_best: Color::PERSONAL_BEST,
        overall_best: Color::OVERALL_BEST,
        warning: Color::WARNING,
    };

    /// High-contrast theme for bright venues.
    pub const HIGH_CONTRAST: Self = Self {
        background: Color::WHITE,
        surface: Color::rgba(0.92, 0.92, 0.92, 1.0),
        primary: Color::rgba(0.0, 0.3, 0.8, 1.0),
        secondary: Color::rgba(0.8, 0.0, 0.4, 1.0),
        text: Color::BLACK,
        text_muted: Color::rgba(0.3, 0.3, 0.3, 1.0),
        border: Color::BLACK,
        drop_target: Color::rgba(0.0, 0.3, 0.8, 0.3),
        personal_best: Color::rgba(0.0, 0.55, 0.1, 1.0),
        overall_best: Color::rgba(0.45, 0.0, 0.75, 1.0),
        warning: Color::rgba(0.85, 0.4, 0.0, 1.0),
    };

    /// Looks up a built-in theme by name.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "dark" => Some(Self::DARK),
            "high_contrast" => Some(Self::HIGH_CONTRAST),
            _ => None,
        }
    }

    /// Returns a token by name.
    #[must_use]
    pub fn token(&self, name: &str) -> Option<Color> {
        self.slot(name).map(|c| *c)
    }

    /// Returns a copy with one token replaced, or None for an unknown token.
    #[must_use]
    pub fn with_token(mut self, name: &str, color: Color) -> Option<Self> {
        *self.slot_mut(name)? = color;
        Some(self)
    }

    fn slot(&self, name: &str) -> Option<&Color> {
        Some(match name {
            "background" => &self.background,
            "surface" => &self.surface,
            "primary" => &self.primary,
            "secondary" => &self.secondary,
            "text" => &self.text,
            "text_muted" => &self.text_muted,
            "border" => &self.border,
            "drop_target" => &self.drop_target,
            "personal_best" => &self.personal_best,
            "overall_best" => &self.overall_best,
            "warning" => &self.warning,
            _ => return None,
        })
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Color> {
        Some(match name {
            "background" => &mut self.background,
            "surface" => &mut self.surface,
            "primary" => &mut self.primary,
            "secondary" => &mut self.secondary,
            "text" => &mut self.text,
            "text_muted" => &mut self.text_muted,
            "border" => &mut self.border,
            "drop_target" => &mut self.drop_target,
            "personal_best" => &mut self.personal_best,
            "overall_best" => &mut self.overall_best,
            "warning" => &mut self.warning,
            _ => return None,
        })
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::DARK
    }
}
