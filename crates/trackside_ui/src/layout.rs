//! Layout system: bounds rectangles and the relative-bounds resolver.
//!
//! Every node carries a rectangle expressed as fractions of its parent's
//! absolute rectangle. [`resolve`] turns that into pixels:
//!
//! ```text
//! absolute = (P.x + r.x * P.w, P.y + r.y * P.h, r.w * P.w, r.h * P.h)
//! ```

/// A rectangle. Used both for fractional (relative) and pixel (absolute) bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// X position (left edge).
    pub x: f32,
    /// Y position (top edge).
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// A zero-sized rect at the origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// The whole parent, as relative bounds.
    pub const UNIT: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns the center point.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Returns true if the point is inside the rectangle.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Returns true if two rectangles intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Returns the intersection of two rectangles, or None if they don't intersect.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }

        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        Some(Self::new(x, y, right - x, bottom - y))
    }

    /// Returns true if the rectangle has no drawable area, or is not finite.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || !self.x.is_finite()
            || !self.y.is_finite()
            || !self.width.is_finite()
            || !self.height.is_finite()
    }

    /// Composes two relative rectangles: `inner` is relative to `self`,
    /// the result is relative to whatever `self` is relative to.
    ///
    /// `resolve(resolve(P, a), b) == resolve(P, a.compose(b))`.
    #[must_use]
    pub fn compose(&self, inner: Self) -> Self {
        Self::new(
            self.x + inner.x * self.width,
            self.y + inner.y * self.height,
            inner.width * self.width,
            inner.height * self.height,
        )
    }

    /// Shrinks (or grows) the rectangle by `sx`/`sy` about `anchor`.
    ///
    /// `scale(0.9, 0.9, Anchor::Center)` leaves a 5% inset on every side.
    #[must_use]
    pub fn scale(&self, sx: f32, sy: f32, anchor: Anchor) -> Self {
        let (ax, ay) = anchor.fractions();
        let width = self.width * sx;
        let height = self.height * sy;
        Self::new(
            self.x + (self.width - width) * ax,
            self.y + (self.height - height) * ay,
            width,
            height,
        )
    }

    /// Returns true if every component is within `epsilon` of `other`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.width - other.width).abs() <= epsilon
            && (self.height - other.height).abs() <= epsilon
    }
}

/// Point a [`Rect::scale`] is anchored at.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Anchor {
    /// Scale about the center.
    #[default]
    Center,
    /// Keep the top-left corner fixed.
    TopLeft,
    /// Keep the top-right corner fixed.
    TopRight,
    /// Keep the bottom-left corner fixed.
    BottomLeft,
    /// Keep the bottom-right corner fixed.
    BottomRight,
    /// Arbitrary point, as fractions of the rectangle.
    Fraction(f32, f32),
}

impl Anchor {
    /// Returns the anchor as fractions of the rectangle (0 = left/top).
    #[must_use]
    pub const fn fractions(self) -> (f32, f32) {
        match self {
            Self::Center => (0.5, 0.5),
            Self::TopLeft => (0.0, 0.0),
            Self::TopRight => (1.0, 0.0),
            Self::BottomLeft => (0.0, 1.0),
            Self::BottomRight => (1.0, 1.0),
            Self::Fraction(x, y) => (x, y),
        }
    }
}

/// How a node's size is derived from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Sizing {
    /// Width and height are fractions of the parent.
    #[default]
    Relative,
    /// Width and height are fixed pixels; position stays relative.
    Fixed {
        /// Width in pixels.
        width: f32,
        /// Height in pixels.
        height: f32,
    },
}

/// Resolves a relative rectangle against its parent's absolute rectangle.
///
/// A degenerate parent (zero, negative, or non-finite size) yields a
/// zero-area rectangle at the parent's origin instead of NaNs.
#[must_use]
pub fn resolve(parent: Rect, relative: Rect, sizing: Sizing) -> Rect {
    if parent.is_degenerate() {
        let x = if parent.x.is_finite() { parent.x } else { 0.0 };
        let y = if parent.y.is_finite() { parent.y } else { 0.0 };
        return Rect::new(x, y, 0.0, 0.0);
    }

    let x = parent.x + relative.x * parent.width;
    let y = parent.y + relative.y * parent.height;
    match sizing {
        Sizing::Relative => Rect::new(
            x,
            y,
            relative.width * parent.width,
            relative.height * parent.height,
        ),
        Sizing::Fixed { width, height } => Rect::new(x, y, width.max(0.0), height.max(0.0)),
    }
}

/// One slot of a distribution along an axis, in parent fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    /// Offset from the start of the axis.
    pub offset: f32,
    /// Extent along the axis.
    pub size: f32,
}

/// Partitions the unit axis into `count` equal slots separated by `spacing`.
///
/// Each slot is `(1 - spacing * (count - 1)) / count` wide. Spacing that
/// leaves no room yields zero-size slots rather than negative ones.
#[must_use]
pub fn distribute(spacing: f32, count: usize) -> Vec<Span> {
    if count == 0 {
        return Vec::new();
    }

    let n = count as f32;
    let spacing = if spacing.is_finite() { spacing.max(0.0) } else { 0.0 };
    let size = ((1.0 - spacing * (n - 1.0)) / n).max(0.0);

    (0..count)
        .map(|i| Span {
            offset: i as f32 * (size + spacing),
            size,
        })
        .collect()
}
