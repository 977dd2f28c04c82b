use std::collections::HashSet;

use iced::{Color, Font, Point, Rectangle, Vector};

use crate::geometry;
use crate::gesture::DragState;
use crate::layout::LayoutConstants;
use crate::patch::{InputId, Node, NodeId, OutputId, Patch};
use crate::style::{Style, WireGradient};

const WIRE_WIDTH: f32 = 4.0;
const SHADOW_OFFSET: Vector = Vector::new(-6.0, 6.0);
const SELECTION_CORNER_RADIUS: f32 = 5.0;

/// One piece of text, anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    pub content: String,
    pub position: Point,
    pub size: f32,
    pub font: Font,
    pub color: Color,
}

/// Abstract immediate-mode drawing surface.
///
/// The pipeline issues all geometry in local (world) space; adapters are
/// expected to have the forward pan/zoom transform applied already. The
/// default adapter wraps an iced canvas `Frame`; tests record the calls.
pub trait Surface {
    fn fill_rounded_rect(&mut self, rect: Rectangle, radius: f32, color: Color);
    fn stroke_rounded_rect(&mut self, rect: Rectangle, radius: f32, color: Color, width: f32);
    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);
    fn stroke_circle(&mut self, center: Point, radius: f32, color: Color, width: f32);
    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f32);
    /// Cubic wire stroke with a two-color gradient from `from` to `to`.
    fn stroke_wire(
        &mut self,
        from: Point,
        control1: Point,
        control2: Point,
        to: Point,
        gradient: WireGradient,
        width: f32,
    );
    fn fill_text(&mut self, text: TextSpec);
}

/// Everything one frame reads: the document, committed selection, live
/// gesture state, pointer position and the visible region, all in local
/// coordinates.
pub struct Scene<'a> {
    pub patch: &'a Patch,
    pub selection: &'a HashSet<NodeId>,
    pub drag: &'a DragState,
    /// Pointer position in local space, for hover highlights.
    pub hover: Option<Point>,
    pub viewport: Rectangle,
    pub layout: &'a LayoutConstants,
    pub style: &'a Style,
}

impl Scene<'_> {
    /// Offset to apply to a node while a move gesture is live: the dragged
    /// node itself, plus every other selected node when the dragged node is
    /// part of the selection. Locked nodes never move.
    fn node_offset(&self, id: NodeId) -> Vector {
        if self.patch.node(id).is_none_or(|n| n.locked) {
            return Vector::new(0.0, 0.0);
        }
        if let DragState::MovingNode { node, offset } = self.drag {
            if *node == id || (self.selection.contains(node) && self.selection.contains(&id)) {
                return *offset;
            }
        }
        Vector::new(0.0, 0.0)
    }

    /// Selected either by the committed set or, during a live box-select, by
    /// intersecting the in-progress rectangle.
    fn node_selected(&self, id: NodeId, rect: &Rectangle) -> bool {
        match self.drag {
            DragState::Selecting { rect: live } => geometry::intersects(rect, live),
            _ => self.selection.contains(&id),
        }
    }

    fn wire_gradient(&self, output: OutputId) -> WireGradient {
        let tag = self
            .patch
            .node(output.node)
            .and_then(|n| n.outputs.get(output.port))
            .map(|p| p.tag.as_str());
        match tag {
            Some(tag) => self.style.wire_gradient(tag),
            None => self.style.default_wire,
        }
    }
}

/// Draws grid, wires and nodes. Pure: the same scene always produces the
/// same call sequence, so adapters may cache the resulting geometry.
pub fn draw_scene<S: Surface>(scene: &Scene<'_>, surface: &mut S) {
    draw_grid(scene, surface);
    draw_wires(scene, surface);
    for (id, node) in scene.patch.nodes() {
        draw_node(scene, surface, id, node);
    }
}

/// Draws the transient gesture feedback on top of the scene: the wire being
/// dragged and the live selection rectangle.
pub fn draw_overlay<S: Surface>(scene: &Scene<'_>, surface: &mut S) {
    match scene.drag {
        DragState::Wiring { output, offset, .. } => {
            if let Some(from) = scene.patch.output_center(*output, scene.layout) {
                let to = from + *offset;
                let (c1, c2) = geometry::wire_controls(from, to);
                let gradient = scene.wire_gradient(*output);
                surface.stroke_wire(from, c1, c2, to, gradient, WIRE_WIDTH);
                surface.fill_circle(to, WIRE_WIDTH, gradient.target);
            }
        }
        DragState::Selecting { rect } => {
            surface.fill_rounded_rect(*rect, SELECTION_CORNER_RADIUS, scene.style.selection_fill);
            surface.stroke_rounded_rect(
                *rect,
                SELECTION_CORNER_RADIUS,
                scene.style.selection_border,
                2.0,
            );
        }
        _ => {}
    }
}

/// Simulates an infinite grid by drawing only the lines whose index falls
/// inside the viewport, extended one spacing past each edge so panning never
/// shows a seam.
fn draw_grid<S: Surface>(scene: &Scene<'_>, surface: &mut S) {
    let spacing = scene.layout.grid_spacing;
    if spacing <= 0.0 {
        return;
    }
    let view = &scene.viewport;
    let x_start = (view.x / spacing).floor() as i32 - 1;
    let x_end = ((view.x + view.width) / spacing).ceil() as i32 + 1;
    let y_start = (view.y / spacing).floor() as i32 - 1;
    let y_end = ((view.y + view.height) / spacing).ceil() as i32 + 1;

    let top = y_start as f32 * spacing;
    let bottom = y_end as f32 * spacing;
    for i in x_start..=x_end {
        let x = i as f32 * spacing;
        surface.stroke_line(
            Point::new(x, top),
            Point::new(x, bottom),
            scene.style.grid,
            1.0,
        );
    }
    let left = x_start as f32 * spacing;
    let right = x_end as f32 * spacing;
    for i in y_start..=y_end {
        let y = i as f32 * spacing;
        surface.stroke_line(
            Point::new(left, y),
            Point::new(right, y),
            scene.style.grid,
            1.0,
        );
    }
}

fn draw_wires<S: Surface>(scene: &Scene<'_>, surface: &mut S) {
    let hidden = match scene.drag {
        DragState::Wiring { hidden, .. } => *hidden,
        _ => None,
    };

    for wire in scene.patch.wires() {
        if Some(*wire) == hidden {
            continue;
        }
        let (Some(from), Some(to)) = (
            scene.patch.output_center(wire.output, scene.layout),
            scene.patch.input_center(wire.input, scene.layout),
        ) else {
            continue;
        };
        let from = from + scene.node_offset(wire.output.node);
        let to = to + scene.node_offset(wire.input.node);

        // Inflate by the control-point reach so a curve bulging outside the
        // endpoint box is not culled while its endpoints are off-screen.
        let slack = 0.4 * (to.x - from.x).abs() + WIRE_WIDTH;
        let bounds = geometry::expand_rect(&geometry::rect_between(from, to), slack);
        if !geometry::intersects(&bounds, &scene.viewport) {
            continue;
        }

        let (c1, c2) = geometry::wire_controls(from, to);
        surface.stroke_wire(from, c1, c2, to, scene.wire_gradient(wire.output), WIRE_WIDTH);
    }
}

fn draw_node<S: Surface>(scene: &Scene<'_>, surface: &mut S, id: NodeId, node: &Node) {
    let layout = scene.layout;
    let style = scene.style;
    let offset = scene.node_offset(id);
    let rect = geometry::offset_rect(&node.rect(layout), offset);
    if !geometry::intersects(&rect, &scene.viewport) {
        return;
    }
    let radius = layout.node_corner_radius;
    let hovered = scene.hover.is_some_and(|p| geometry::contains(&rect, p));

    surface.fill_rounded_rect(geometry::offset_rect(&rect, SHADOW_OFFSET), radius, style.node_shadow);

    let body = if scene.node_selected(id, &rect) {
        style.node_selected
    } else {
        style.node
    };
    surface.fill_rounded_rect(rect, radius, body);

    // Title bar: rounded top corners, squared off against the body below.
    let title = Rectangle {
        height: layout.node_title_height,
        ..rect
    };
    surface.fill_rounded_rect(title, radius, style.title_bar);
    surface.fill_rounded_rect(
        Rectangle {
            y: title.y + title.height / 2.0,
            height: title.height / 2.0,
            ..title
        },
        0.0,
        style.title_bar,
    );

    surface.stroke_rounded_rect(rect, radius, style.node_border, 2.0);
    if hovered {
        surface.stroke_rounded_rect(rect, radius, style.node_hover, 2.0);
    }

    surface.fill_text(TextSpec {
        content: truncate_label(&node.name, 22),
        position: Point::new(
            rect.x + 12.0,
            rect.y + (layout.node_title_height - layout.title_font_size) / 2.0,
        ),
        size: layout.title_font_size,
        font: layout.title_font,
        color: style.title_text,
    });

    let connected_inputs: HashSet<InputId> = scene.patch.wires().map(|w| w.input).collect();
    let connected_outputs: HashSet<OutputId> = scene.patch.wires().map(|w| w.output).collect();

    for (index, port) in node.inputs.iter().enumerate() {
        let port_rect = geometry::offset_rect(&node.input_rect(index, layout), offset);
        draw_port(
            scene,
            surface,
            &port_rect,
            &port.tag,
            connected_inputs.contains(&InputId::new(id, index)),
        );
        surface.fill_text(TextSpec {
            content: truncate_label(&port.name, 12),
            position: Point::new(
                port_rect.x + port_rect.width + 6.0,
                geometry::center(&port_rect).y - layout.port_name_font_size / 2.0,
            ),
            size: layout.port_name_font_size,
            font: layout.port_name_font,
            color: style.port_label,
        });
    }

    for (index, port) in node.outputs.iter().enumerate() {
        let port_rect = geometry::offset_rect(&node.output_rect(index, layout), offset);
        draw_port(
            scene,
            surface,
            &port_rect,
            &port.tag,
            connected_outputs.contains(&OutputId::new(id, index)),
        );
        let label = truncate_label(&port.name, 12);
        let width = estimate_text_width(&label, layout.port_name_font_size);
        surface.fill_text(TextSpec {
            content: label,
            position: Point::new(
                port_rect.x - 6.0 - width,
                geometry::center(&port_rect).y - layout.port_name_font_size / 2.0,
            ),
            size: layout.port_name_font_size,
            font: layout.port_name_font,
            color: style.port_label,
        });
    }
}

fn draw_port<S: Surface>(
    scene: &Scene<'_>,
    surface: &mut S,
    rect: &Rectangle,
    tag: &str,
    connected: bool,
) {
    let style = scene.style;
    let center = geometry::center(rect);
    let radius = rect.width / 2.0;

    surface.fill_circle(center, radius, style.wire_gradient(tag).source);
    surface.stroke_circle(center, radius, style.port_outline, scene.layout.port_stroke_width);
    if !connected {
        surface.fill_circle(center, radius / 3.0, style.port_dot);
    }
    if scene.hover.is_some_and(|p| geometry::contains(rect, p)) {
        surface.stroke_circle(center, radius + 2.0, style.node_hover, 1.5);
    }
}

/// Char-safe truncation with an ellipsis.
fn truncate_label(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let mut out: String = name.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Rough monospace advance; good enough to right-justify output labels
/// against their port without renderer-side text measurement.
fn estimate_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.6
}
