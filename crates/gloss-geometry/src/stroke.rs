//! Stroke properties for antialiased outlines.
//!
//! Defines how paths are stroked: thickness, color, caps and joins.

use gloss_core::Color;

/// Line cap style for open polyline ends.
///
/// Single segments and curves always get an extended end region; the shader
/// decides how it is shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Flat cap ending at the endpoint, with only the feather beyond it.
    #[default]
    Butt,
    /// Round cap extending half the width beyond the endpoint.
    Round,
    /// Square cap extending half the width beyond the endpoint.
    Square,
}

/// Line join style for polyline corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Miter join (sharp corner, unbounded length).
    #[default]
    Miter,
    /// Round join (rounded corner).
    Round,
    /// Bevel join (flat corner).
    Bevel,
}

/// Stroke properties for tessellation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    /// Stroke color
    pub color: Color,
    /// Stroke thickness in pixels, excluding the antialiasing feather
    pub thickness: f32,
    /// Line join style
    pub line_join: LineJoin,
    /// Line cap style
    pub line_cap: LineCap,
    /// Round line endpoints to pixel centers before extrusion
    pub pixel_snap: bool,
}

impl StrokeStyle {
    /// Create a solid stroke.
    pub fn new(color: Color, thickness: f32) -> Self {
        Self {
            color,
            thickness,
            line_join: LineJoin::default(),
            line_cap: LineCap::default(),
            pixel_snap: false,
        }
    }

    /// Set the line join style.
    pub fn with_line_join(mut self, join: LineJoin) -> Self {
        self.line_join = join;
        self
    }

    /// Set the line cap style.
    pub fn with_line_cap(mut self, cap: LineCap) -> Self {
        self.line_cap = cap;
        self
    }

    /// Enable or disable pixel snapping of line endpoints.
    pub fn with_pixel_snap(mut self, snap: bool) -> Self {
        self.pixel_snap = snap;
        self
    }

    /// Check if the stroke produces visible coverage.
    pub fn is_visible(&self) -> bool {
        self.thickness > 0.0 && self.color.a > 0.0
    }

    /// Resolve the extruded width for this style.
    pub fn width(&self) -> StrokeWidth {
        StrokeWidth::resolve(self.thickness, self.color)
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::new(Color::BLACK, 1.0)
    }
}

/// Geometry width of a stroke including its antialiasing feather.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeWidth {
    /// Thickness as requested.
    pub thickness: f32,
    /// Full extruded width, one pixel of feather on each side.
    pub width: f32,
    /// Texcoord value at the outer edge of the feather.
    pub feather: f32,
    /// Vertex color, with alpha reduced for hairlines.
    pub color: Color,
}

impl StrokeWidth {
    /// Strokes thinner than one pixel are drawn two pixels wide with alpha
    /// scaled by the thickness.
    pub fn resolve(thickness: f32, color: Color) -> Self {
        if thickness < 1.0 {
            let width = 2.0;
            Self {
                thickness,
                width,
                feather: (width + 2.0) / width,
                color: color.fade(thickness.max(0.0)),
            }
        } else {
            Self {
                thickness,
                width: thickness + 2.0,
                feather: (thickness + 2.0) / thickness,
                color,
            }
        }
    }

    /// Half of [`Self::width`].
    pub fn half(&self) -> f32 {
        self.width * 0.5
    }
}
