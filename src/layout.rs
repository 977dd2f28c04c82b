use iced::{Font, Size};

/// Geometry of the node boxes and their ports.
///
/// Every geometric computation (node rects, port rects, hit-testing, the
/// background grid) reads these constants. The editor never mutates them;
/// hosts may swap in their own set per editor instance.
#[derive(Debug, Clone)]
pub struct LayoutConstants {
    pub port_size: Size,
    pub port_spacing: f32,
    /// Stroke width of the port outline.
    pub port_stroke_width: f32,
    pub node_width: f32,
    pub node_title_height: f32,
    /// Gap between stacked nodes in `Patch::stacked_layout`.
    pub node_spacing: f32,
    pub node_corner_radius: f32,
    /// Spacing of the background grid, in world units.
    pub grid_spacing: f32,
    pub title_font: Font,
    pub title_font_size: f32,
    pub port_name_font: Font,
    pub port_name_font_size: f32,
}

impl Default for LayoutConstants {
    fn default() -> Self {
        Self {
            port_size: Size::new(14.0, 14.0),
            port_spacing: 10.0,
            port_stroke_width: 2.0,
            node_width: 200.0,
            node_title_height: 40.0,
            node_spacing: 40.0,
            node_corner_radius: 8.0,
            grid_spacing: 80.0,
            title_font: Font::MONOSPACE,
            title_font_size: 16.0,
            port_name_font: Font::MONOSPACE,
            port_name_font_size: 12.0,
        }
    }
}
