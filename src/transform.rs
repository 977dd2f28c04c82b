use iced::{Point, Size, Vector};

/// Lower clamp for zoom; keeps the inverse transform away from a division
/// blow-up when hosts feed degenerate pinch values.
pub const MIN_ZOOM: f32 = 0.05;
pub const MAX_ZOOM: f32 = 4.0;

/// Pan/zoom state and the screen ⇄ local (world) coordinate mapping.
///
/// All gesture math and hit-testing run in local space; raw pointer input
/// arrives in screen space and goes through `to_local` first. The renderer
/// applies the forward mapping once per frame: scale by `zoom`, then
/// translate by `pan`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation applied after scaling, in world units.
    pub pan: Vector,
    zoom: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            pan: Vector::new(0.0, 0.0),
            zoom: 1.0,
        }
    }
}

impl Transform {
    pub fn new(pan: Vector, zoom: f32) -> Self {
        Self {
            pan,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn to_local(&self, p: Point) -> Point {
        Point::new(p.x / self.zoom - self.pan.x, p.y / self.zoom - self.pan.y)
    }

    pub fn to_local_size(&self, s: Size) -> Size {
        Size::new(s.width / self.zoom, s.height / self.zoom)
    }

    pub fn to_screen(&self, p: Point) -> Point {
        Point::new((p.x + self.pan.x) * self.zoom, (p.y + self.pan.y) * self.zoom)
    }

    /// Translates by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vector) {
        self.pan = self.pan + Vector::new(delta.x / self.zoom, delta.y / self.zoom);
    }

    /// Scales zoom by `1 + delta * 0.1`, keeping the world point under the
    /// screen-space `anchor` stationary.
    pub fn zoom_by(&mut self, delta: f32, anchor: Point) {
        let world = self.to_local(anchor);
        self.set_zoom(self.zoom * (1.0 + delta * 0.1));
        self.pan = Vector::new(
            anchor.x / self.zoom - world.x,
            anchor.y / self.zoom - world.y,
        );
    }
}
