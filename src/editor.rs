use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use iced::mouse;
use iced::widget::canvas::{self, Cache, Frame, Geometry, LineCap, Path, Stroke, Text};
use iced::{Color, Point, Rectangle, Vector, keyboard};

use crate::geometry;
use crate::gesture::DragState;
use crate::hit_test::HitTarget;
use crate::layout::LayoutConstants;
use crate::patch::{NodeId, Patch, Wire};
use crate::render::{self, Scene, Surface, TextSpec};
use crate::style::{Style, WireGradient};
use crate::transform::Transform;

/// Notification that a gesture committed a change to the document or view.
///
/// Returned from [`NodeEditor::update`] so hosts can persist positions, drive
/// an actual signal graph from wire changes, or mirror the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorEvent {
    NodeMoved { node: NodeId, position: Point },
    WireAdded { wire: Wire },
    WireRemoved { wire: Wire },
    TransformChanged { pan: Vector, zoom: f32 },
}

/// Pointer input, pre-classified by the canvas widget. All points are in
/// screen space relative to the canvas origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorMessage {
    DragStarted { point: Point },
    DragMoved { point: Point },
    DragEnded { point: Point, toggle: bool },
    CursorMoved { point: Point },
    Panned { delta: Vector },
    Zoomed { delta: f32, cursor: Point },
}

/// The node-graph editor: document, view state and the live gesture, plus
/// the cached canvas geometry.
///
/// Hosts embed it with `canvas(&editor)`, route the resulting
/// [`EditorMessage`]s back through [`NodeEditor::update`] and react to the
/// [`EditorEvent`]s it returns. The document fields are public; call
/// [`NodeEditor::invalidate`] after editing them directly.
pub struct NodeEditor {
    pub patch: Patch,
    pub selection: HashSet<NodeId>,
    pub transform: Transform,
    pub layout: LayoutConstants,
    pub style: Style,
    pub(crate) drag: DragState,
    /// Screen-space press point of the gesture in flight.
    pub(crate) drag_origin: Option<Point>,
    cursor: Option<Point>,
    hover: Option<HitTarget>,
    cache: Cache,
    texts: RefCell<TextCache>,
}

impl NodeEditor {
    pub fn new(patch: Patch) -> Self {
        Self {
            patch,
            selection: HashSet::new(),
            transform: Transform::default(),
            layout: LayoutConstants::default(),
            style: Style::default(),
            drag: DragState::Idle,
            drag_origin: None,
            cursor: None,
            hover: None,
            cache: Cache::new(),
            texts: RefCell::new(TextCache::default()),
        }
    }

    /// Applies one input message and returns the changes it committed.
    pub fn update(&mut self, message: EditorMessage) -> Vec<EditorEvent> {
        let mut events = Vec::new();
        match message {
            EditorMessage::DragStarted { point } => self.drag_started(point),
            EditorMessage::DragMoved { point } => self.drag_moved(point),
            EditorMessage::DragEnded { point, toggle } => {
                self.drag_ended(point, toggle, &mut events);
            }
            EditorMessage::CursorMoved { point } => self.cursor_moved(point),
            EditorMessage::Panned { delta } => {
                self.transform.pan_by(delta);
                events.push(self.transform_changed());
                self.invalidate();
            }
            EditorMessage::Zoomed { delta, cursor } => {
                self.transform.zoom_by(delta, cursor);
                events.push(self.transform_changed());
                self.invalidate();
            }
        }
        events
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// Drops the cached scene geometry; the next draw rebuilds it.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    fn cursor_moved(&mut self, point: Point) {
        self.cursor = Some(point);
        let hover = self
            .patch
            .hit_test(self.transform.to_local(point), &self.layout);
        // Hover highlights live in the cached layer; only a target change
        // warrants redrawing it.
        if hover != self.hover {
            self.hover = hover;
            self.invalidate();
        }
    }

    fn transform_changed(&self) -> EditorEvent {
        EditorEvent::TransformChanged {
            pan: self.transform.pan,
            zoom: self.transform.zoom(),
        }
    }

    fn scene(&self, bounds: Rectangle) -> Scene<'_> {
        Scene {
            patch: &self.patch,
            selection: &self.selection,
            drag: &self.drag,
            hover: self.cursor.map(|p| self.transform.to_local(p)),
            viewport: Rectangle::new(
                self.transform.to_local(Point::ORIGIN),
                self.transform.to_local_size(bounds.size()),
            ),
            layout: &self.layout,
            style: &self.style,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProgramState {
    interaction: Interaction,
    modifiers: keyboard::Modifiers,
}

#[derive(Debug, Clone, Copy, Default)]
enum Interaction {
    #[default]
    None,
    Dragging,
    Panning { last: Point },
}

impl canvas::Program<EditorMessage> for NodeEditor {
    type State = ProgramState;

    fn update(
        &self,
        state: &mut Self::State,
        event: &iced::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<EditorMessage>> {
        if let iced::Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) = event {
            state.modifiers = *modifiers;
            return None;
        }
        let cursor_position = cursor.position_in(bounds)?;

        match event {
            iced::Event::Mouse(mouse_event) => match mouse_event {
                mouse::Event::ButtonPressed(mouse::Button::Left) => {
                    state.interaction = Interaction::Dragging;
                    Some(canvas::Action::publish(EditorMessage::DragStarted {
                        point: cursor_position,
                    }))
                }
                mouse::Event::ButtonReleased(mouse::Button::Left) => {
                    match state.interaction {
                        Interaction::Dragging => {
                            state.interaction = Interaction::None;
                            Some(canvas::Action::publish(EditorMessage::DragEnded {
                                point: cursor_position,
                                toggle: state.modifiers.command(),
                            }))
                        }
                        _ => None,
                    }
                }
                mouse::Event::ButtonPressed(mouse::Button::Middle) => {
                    state.interaction = Interaction::Panning {
                        last: cursor_position,
                    };
                    Some(canvas::Action::request_redraw())
                }
                mouse::Event::ButtonReleased(mouse::Button::Middle) => {
                    if let Interaction::Panning { .. } = state.interaction {
                        state.interaction = Interaction::None;
                    }
                    Some(canvas::Action::request_redraw())
                }
                mouse::Event::CursorMoved { .. } => match state.interaction {
                    Interaction::Dragging => {
                        Some(canvas::Action::publish(EditorMessage::DragMoved {
                            point: cursor_position,
                        }))
                    }
                    Interaction::Panning { last } => {
                        let delta = Vector::new(
                            cursor_position.x - last.x,
                            cursor_position.y - last.y,
                        );
                        state.interaction = Interaction::Panning {
                            last: cursor_position,
                        };
                        Some(canvas::Action::publish(EditorMessage::Panned { delta }))
                    }
                    Interaction::None => {
                        Some(canvas::Action::publish(EditorMessage::CursorMoved {
                            point: cursor_position,
                        }))
                    }
                },
                mouse::Event::WheelScrolled { delta } => {
                    let scroll = match delta {
                        mouse::ScrollDelta::Lines { y, .. } => *y,
                        mouse::ScrollDelta::Pixels { y, .. } => *y / 100.0,
                    };
                    Some(canvas::Action::publish(EditorMessage::Zoomed {
                        delta: scroll,
                        cursor: cursor_position,
                    }))
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let scene = self.scene(bounds);

        let content = self.cache.draw(renderer, bounds.size(), |frame| {
            frame.scale(self.transform.zoom());
            frame.translate(self.transform.pan);
            let mut texts = self.texts.borrow_mut();
            let mut surface = FrameSurface {
                frame,
                texts: &mut *texts,
            };
            render::draw_scene(&scene, &mut surface);
        });

        // Gesture feedback follows the cursor; never cached.
        let mut overlay = Frame::new(renderer, bounds.size());
        overlay.scale(self.transform.zoom());
        overlay.translate(self.transform.pan);
        {
            let mut texts = self.texts.borrow_mut();
            let mut surface = FrameSurface {
                frame: &mut overlay,
                texts: &mut *texts,
            };
            render::draw_overlay(&scene, &mut surface);
        }

        vec![content, overlay.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if !cursor.is_over(bounds) {
            return mouse::Interaction::default();
        }
        match state.interaction {
            Interaction::Dragging | Interaction::Panning { .. } => mouse::Interaction::Grabbing,
            Interaction::None => match cursor
                .position_in(bounds)
                .and_then(|p| self.patch.hit_test(self.transform.to_local(p), &self.layout))
            {
                Some(HitTarget::Node(_)) => mouse::Interaction::Grab,
                Some(HitTarget::Input(_)) | Some(HitTarget::Output(_)) => {
                    mouse::Interaction::Crosshair
                }
                None => mouse::Interaction::default(),
            },
        }
    }
}

/// Resolved `canvas::Text` objects keyed by content, font and size, reused
/// across frames to avoid rebuilding them on every redraw.
#[derive(Default)]
struct TextCache {
    entries: HashMap<(String, iced::Font, u32), Text>,
}

impl TextCache {
    fn resolve(&mut self, spec: &TextSpec) -> Text {
        let key = (spec.content.clone(), spec.font, spec.size.to_bits());
        let entry = self.entries.entry(key).or_insert_with(|| Text {
            content: spec.content.clone(),
            size: iced::Pixels(spec.size),
            font: spec.font,
            ..Text::default()
        });
        let mut text = entry.clone();
        text.position = spec.position;
        text.color = spec.color;
        text
    }
}

/// [`Surface`] adapter over an iced canvas frame.
struct FrameSurface<'a> {
    frame: &'a mut Frame,
    texts: &'a mut TextCache,
}

/// Segment count for gradient wire strokes.
const WIRE_SEGMENTS: usize = 16;

impl Surface for FrameSurface<'_> {
    fn fill_rounded_rect(&mut self, rect: Rectangle, radius: f32, color: Color) {
        if radius < 0.5 {
            self.frame
                .fill_rectangle(rect.position(), geometry::rect_size(&rect), color);
        } else {
            self.frame.fill(&rounded_rect_path(rect, radius), color);
        }
    }

    fn stroke_rounded_rect(&mut self, rect: Rectangle, radius: f32, color: Color, width: f32) {
        self.frame.stroke(
            &rounded_rect_path(rect, radius),
            Stroke::default().with_color(color).with_width(width),
        );
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        self.frame.fill(&Path::circle(center, radius), color);
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, color: Color, width: f32) {
        self.frame.stroke(
            &Path::circle(center, radius),
            Stroke::default().with_color(color).with_width(width),
        );
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        self.frame.stroke(
            &Path::line(from, to),
            Stroke::default().with_color(color).with_width(width),
        );
    }

    fn stroke_wire(
        &mut self,
        from: Point,
        control1: Point,
        control2: Point,
        to: Point,
        gradient: WireGradient,
        width: f32,
    ) {
        if gradient.source == gradient.target {
            let path = Path::new(|builder| {
                builder.move_to(from);
                builder.bezier_curve_to(control1, control2, to);
            });
            self.frame.stroke(
                &path,
                Stroke::default()
                    .with_color(gradient.source)
                    .with_width(width)
                    .with_line_cap(LineCap::Round),
            );
            return;
        }

        // The canvas backend has no gradient strokes; approximate one by
        // sampling the cubic and stroking short solid segments.
        let mut prev = from;
        for i in 1..=WIRE_SEGMENTS {
            let t = i as f32 / WIRE_SEGMENTS as f32;
            let next = geometry::cubic_point(from, control1, control2, to, t);
            let mid = t - 0.5 / WIRE_SEGMENTS as f32;
            self.frame.stroke(
                &Path::line(prev, next),
                Stroke::default()
                    .with_color(mix(gradient.source, gradient.target, mid))
                    .with_width(width)
                    .with_line_cap(LineCap::Round),
            );
            prev = next;
        }
    }

    fn fill_text(&mut self, text: TextSpec) {
        let resolved = self.texts.resolve(&text);
        self.frame.fill_text(resolved);
    }
}

fn rounded_rect_path(rect: Rectangle, radius: f32) -> Path {
    Path::new(|builder| {
        let r = radius.min(rect.width / 2.0).min(rect.height / 2.0);
        let x = rect.x;
        let y = rect.y;
        let w = rect.width;
        let h = rect.height;

        builder.move_to(Point::new(x + r, y));
        builder.line_to(Point::new(x + w - r, y));
        builder.arc_to(Point::new(x + w, y), Point::new(x + w, y + r), r);
        builder.line_to(Point::new(x + w, y + h - r));
        builder.arc_to(Point::new(x + w, y + h), Point::new(x + w - r, y + h), r);
        builder.line_to(Point::new(x + r, y + h));
        builder.arc_to(Point::new(x, y + h), Point::new(x, y + h - r), r);
        builder.line_to(Point::new(x, y + r));
        builder.arc_to(Point::new(x, y), Point::new(x + r, y), r);
        builder.close();
    })
}

fn mix(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    Color::from_rgba(
        a.r + (b.r - a.r) * t,
        a.g + (b.g - a.g) * t,
        a.b + (b.b - a.b) * t,
        a.a + (b.a - a.a) * t,
    )
}
