use crate::foundation::error::{FolioError, FolioResult};

pub use glam::Vec3;
pub use kurbo::{Point, Rect};

/// Visible viewport in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Create a validated viewport (all dimensions must be > 0).
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> FolioResult<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(FolioError::validation("viewport width/height must be > 0"));
        }
        if !(device_pixel_ratio > 0.0) {
            return Err(FolioError::validation("device pixel ratio must be > 0"));
        }
        Ok(Self {
            width,
            height,
            device_pixel_ratio,
        })
    }

    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn aspect(self) -> f64 {
        self.width / self.height
    }

    /// Device pixel ratio capped at 2.
    pub fn capped_pixel_ratio(self) -> f64 {
        self.device_pixel_ratio.min(2.0)
    }

    /// Map a client-space pointer position to `[-1, 1]` on both axes, y pointing up.
    pub fn normalize_pointer(self, client: Point) -> Point {
        Point::new(
            (client.x / self.width) * 2.0 - 1.0,
            -(client.y / self.height) * 2.0 + 1.0,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            device_pixel_ratio: 1.0,
        }
    }
}

/// One edge of a root margin, in pixels or percent of the root extent on that axis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum MarginEdge {
    Px(f64),
    Percent(f64),
}

impl MarginEdge {
    pub fn resolve(self, extent: f64) -> f64 {
        match self {
            Self::Px(v) => v,
            Self::Percent(p) => extent * p / 100.0,
        }
    }
}

/// CSS-style margin around an intersection root. Negative edges shrink the root.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RootMargin {
    pub top: MarginEdge,
    pub right: MarginEdge,
    pub bottom: MarginEdge,
    pub left: MarginEdge,
}

impl RootMargin {
    pub const ZERO: Self = Self {
        top: MarginEdge::Px(0.0),
        right: MarginEdge::Px(0.0),
        bottom: MarginEdge::Px(0.0),
        left: MarginEdge::Px(0.0),
    };

    /// Grow (or shrink) `root` by this margin. Vertical percentages resolve against the root
    /// height, horizontal ones against its width.
    pub fn apply(self, root: Rect) -> Rect {
        let w = root.width();
        let h = root.height();
        Rect::new(
            root.x0 - self.left.resolve(w),
            root.y0 - self.top.resolve(h),
            root.x1 + self.right.resolve(w),
            root.y1 + self.bottom.resolve(h),
        )
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::ZERO
    }
}
