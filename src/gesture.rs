use iced::{Point, Vector};

use crate::editor::{EditorEvent, NodeEditor};
use crate::geometry;
use crate::hit_test::HitTarget;
use crate::patch::{InputId, NodeId, OutputId, Wire};

/// Screen-space distance under which a press-release pair counts as a tap
/// rather than a drag, regardless of zoom.
pub const DRAG_THRESHOLD: f32 = 5.0;

/// The live drag gesture. Exactly one is active between a press and its
/// release; every pointer move rebuilds the payload from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Rubber-band box selection, rect in local space.
    Selecting { rect: iced::Rectangle },
    /// Moving a node (and, if it is selected, the rest of the selection).
    MovingNode { node: NodeId, offset: Vector },
    /// Dragging a wire out of `output`. The free end sits at the output
    /// center plus `offset`. When the gesture picked a wire up off an input,
    /// `hidden` holds it: still connected, just not drawn.
    Wiring {
        output: OutputId,
        offset: Vector,
        hidden: Option<Wire>,
    },
}

impl NodeEditor {
    /// Begins a gesture from a press at a screen-space point.
    pub fn drag_started(&mut self, point: Point) {
        self.drag_origin = Some(point);
        let start = self.transform.to_local(point);

        self.drag = match self.patch.hit_test(start, &self.layout) {
            None => DragState::Selecting {
                rect: geometry::rect_between(start, start),
            },
            Some(HitTarget::Node(node)) => {
                if self.patch.node(node).is_none_or(|n| n.locked) {
                    DragState::Idle
                } else {
                    DragState::MovingNode {
                        node,
                        offset: Vector::new(0.0, 0.0),
                    }
                }
            }
            Some(HitTarget::Output(output)) => DragState::Wiring {
                output,
                offset: Vector::new(0.0, 0.0),
                hidden: None,
            },
            // Pressing an occupied input picks its wire up; the free end
            // starts right where the input sits. An empty input starts
            // nothing.
            Some(HitTarget::Input(input)) => match self.patch.wire_to(input) {
                Some(wire) => DragState::Wiring {
                    output: wire.output,
                    offset: self.pickup_offset(&wire),
                    hidden: Some(wire),
                },
                None => DragState::Idle,
            },
        };
        self.invalidate();
    }

    /// Updates the live gesture for a pointer move. Payloads are replaced
    /// wholesale; nothing is committed to the patch yet.
    pub fn drag_moved(&mut self, point: Point) {
        let Some(origin) = self.drag_origin else {
            return;
        };
        let start = self.transform.to_local(origin);
        let current = self.transform.to_local(point);
        let translation = current - start;

        self.drag = match self.drag {
            DragState::Idle => DragState::Idle,
            DragState::Selecting { .. } => DragState::Selecting {
                rect: geometry::rect_between(start, current),
            },
            DragState::MovingNode { node, .. } => DragState::MovingNode {
                node,
                offset: translation,
            },
            DragState::Wiring { output, hidden, .. } => {
                let base = match hidden {
                    Some(wire) => self.pickup_offset(&wire),
                    None => Vector::new(0.0, 0.0),
                };
                DragState::Wiring {
                    output,
                    offset: base + translation,
                    hidden,
                }
            }
        };
        self.invalidate();
    }

    /// Ends the gesture at a release point and commits its result.
    ///
    /// A release within [`DRAG_THRESHOLD`] screen pixels of the press is a
    /// tap and edits the selection instead; `toggle` taps (modifier held)
    /// flip membership of the tapped node, plain taps replace the selection.
    pub fn drag_ended(&mut self, point: Point, toggle: bool, events: &mut Vec<EditorEvent>) {
        let Some(origin) = self.drag_origin.take() else {
            return;
        };
        let state = std::mem::take(&mut self.drag);
        let start = self.transform.to_local(origin);
        let end = self.transform.to_local(point);

        if geometry::distance(origin, point) <= DRAG_THRESHOLD {
            self.tap(start, toggle);
            self.invalidate();
            return;
        }

        match state {
            DragState::Idle => {}
            DragState::Selecting { .. } => {
                let rect = geometry::rect_between(start, end);
                self.selection = self.patch.selected_in(rect, &self.layout);
            }
            DragState::MovingNode { node, .. } => {
                let translation = end - start;
                self.commit_move(node, translation, events);
                if self.selection.contains(&node) {
                    let rest: Vec<NodeId> = self
                        .selection
                        .iter()
                        .copied()
                        .filter(|id| *id != node)
                        .collect();
                    for id in rest {
                        self.commit_move(id, translation, events);
                    }
                }
            }
            DragState::Wiring { output, hidden, .. } => {
                match self.patch.hit_test(end, &self.layout) {
                    Some(HitTarget::Input(input)) => {
                        if let Some(wire) = hidden {
                            // Re-dropping a picked-up wire on an input: the
                            // old attachment goes away even if it is about
                            // to be recreated in place.
                            if self.patch.disconnect(&wire) {
                                events.push(EditorEvent::WireRemoved { wire });
                            }
                        }
                        self.commit_connect(output, input, events);
                    }
                    // Dropped anywhere else: a fresh wire is abandoned and a
                    // picked-up wire snaps back, since it was never detached.
                    _ => {}
                }
            }
        }
        self.invalidate();
    }

    fn tap(&mut self, point: Point, toggle: bool) {
        match self.patch.hit_test(point, &self.layout) {
            Some(HitTarget::Node(node)) => {
                if toggle {
                    if !self.selection.remove(&node) {
                        self.selection.insert(node);
                    }
                } else {
                    self.selection.clear();
                    self.selection.insert(node);
                }
            }
            Some(_) => {}
            None => {
                if !toggle {
                    self.selection.clear();
                }
            }
        }
    }

    /// Vector from the wire's output center to its input center: the offset
    /// that parks the free end of a picked-up wire on the input it came from.
    fn pickup_offset(&self, wire: &Wire) -> Vector {
        match (
            self.patch.output_center(wire.output, &self.layout),
            self.patch.input_center(wire.input, &self.layout),
        ) {
            (Some(out), Some(inp)) => inp - out,
            _ => Vector::new(0.0, 0.0),
        }
    }

    fn commit_move(&mut self, node: NodeId, offset: Vector, events: &mut Vec<EditorEvent>) {
        if self.patch.move_node(node, offset) {
            if let Some(moved) = self.patch.node(node) {
                events.push(EditorEvent::NodeMoved {
                    node,
                    position: moved.position,
                });
            }
        }
    }

    fn commit_connect(&mut self, output: OutputId, input: InputId, events: &mut Vec<EditorEvent>) {
        if let Some(displaced) = self.patch.connect(output, input) {
            events.push(EditorEvent::WireRemoved { wire: displaced });
        }
        events.push(EditorEvent::WireAdded {
            wire: Wire::new(output, input),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::center;
    use crate::patch::{Node, Patch};

    fn editor_with(patch: Patch) -> NodeEditor {
        NodeEditor::new(patch)
    }

    fn source_and_sink() -> (NodeEditor, OutputId, InputId) {
        let mut patch = Patch::new();
        let a = patch.add_node(Node::new("src").output("out", "audio"));
        let b = patch.add_node(
            Node::new("dst")
                .input("in", "audio")
                .at(Point::new(400.0, 0.0)),
        );
        (editor_with(patch), OutputId::new(a, 0), InputId::new(b, 0))
    }

    #[test]
    fn press_on_output_starts_wiring() {
        let (mut editor, output, _) = source_and_sink();
        let at = editor
            .patch
            .output_center(output, &editor.layout)
            .expect("center");
        editor.drag_started(at);
        assert_eq!(
            *editor.drag_state(),
            DragState::Wiring {
                output,
                offset: Vector::new(0.0, 0.0),
                hidden: None,
            }
        );
    }

    #[test]
    fn press_on_empty_input_is_inert() {
        let (mut editor, _, input) = source_and_sink();
        let at = editor
            .patch
            .input_center(input, &editor.layout)
            .expect("center");
        editor.drag_started(at);
        assert_eq!(*editor.drag_state(), DragState::Idle);
    }

    #[test]
    fn press_on_occupied_input_picks_wire_up() {
        let (mut editor, output, input) = source_and_sink();
        editor.patch.connect(output, input);
        let out = editor
            .patch
            .output_center(output, &editor.layout)
            .expect("center");
        let inp = editor
            .patch
            .input_center(input, &editor.layout)
            .expect("center");

        editor.drag_started(inp);
        let expected = Wire::new(output, input);
        assert_eq!(
            *editor.drag_state(),
            DragState::Wiring {
                output,
                offset: inp - out,
                hidden: Some(expected),
            }
        );
        // Still connected until the gesture commits elsewhere.
        assert!(editor.patch.has_wire(&expected));
    }

    #[test]
    fn press_on_locked_node_stays_idle() {
        let mut patch = Patch::new();
        let id = patch.add_node(Node::new("anchor").locked());
        let mut editor = editor_with(patch);
        let rect = editor.patch.node(id).expect("node").rect(&editor.layout);

        editor.drag_started(center(&rect));
        assert_eq!(*editor.drag_state(), DragState::Idle);

        let mut events = Vec::new();
        editor.drag_moved(Point::new(200.0, 200.0));
        editor.drag_ended(Point::new(200.0, 200.0), false, &mut events);
        assert!(events.is_empty());
        assert_eq!(
            editor.patch.node(id).map(|n| n.position),
            Some(Point::ORIGIN)
        );
    }

    #[test]
    fn moves_are_previewed_then_committed_once() {
        let mut patch = Patch::new();
        let id = patch.add_node(Node::new("n").at(Point::new(100.0, 100.0)));
        let mut editor = editor_with(patch);
        let rect = editor.patch.node(id).expect("node").rect(&editor.layout);
        let grab = center(&rect);

        editor.drag_started(grab);
        editor.drag_moved(grab + Vector::new(30.0, 0.0));
        assert_eq!(
            *editor.drag_state(),
            DragState::MovingNode {
                node: id,
                offset: Vector::new(30.0, 0.0),
            }
        );
        // Preview only; the document has not changed.
        assert_eq!(
            editor.patch.node(id).map(|n| n.position),
            Some(Point::new(100.0, 100.0))
        );

        let mut events = Vec::new();
        editor.drag_ended(grab + Vector::new(30.0, 40.0), false, &mut events);
        assert_eq!(
            editor.patch.node(id).map(|n| n.position),
            Some(Point::new(130.0, 140.0))
        );
        assert_eq!(
            events,
            vec![EditorEvent::NodeMoved {
                node: id,
                position: Point::new(130.0, 140.0),
            }]
        );
        assert_eq!(*editor.drag_state(), DragState::Idle);
    }

    #[test]
    fn dragging_a_selected_node_moves_the_whole_selection() {
        let mut patch = Patch::new();
        let a = patch.add_node(Node::new("a").at(Point::new(0.0, 0.0)));
        let b = patch.add_node(Node::new("b").at(Point::new(300.0, 0.0)));
        let c = patch.add_node(Node::new("c").at(Point::new(600.0, 0.0)));
        let mut editor = editor_with(patch);
        editor.selection.extend([a, b]);

        let grab = center(&editor.patch.node(a).expect("node").rect(&editor.layout));
        let mut events = Vec::new();
        editor.drag_started(grab);
        editor.drag_ended(grab + Vector::new(50.0, 0.0), false, &mut events);

        assert_eq!(
            editor.patch.node(a).map(|n| n.position.x),
            Some(50.0)
        );
        assert_eq!(editor.patch.node(b).map(|n| n.position.x), Some(350.0));
        // Unselected bystander stays put.
        assert_eq!(editor.patch.node(c).map(|n| n.position.x), Some(600.0));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn sub_threshold_release_is_a_tap_not_a_move() {
        let mut patch = Patch::new();
        let id = patch.add_node(Node::new("n").at(Point::new(100.0, 100.0)));
        let mut editor = editor_with(patch);
        let grab = center(&editor.patch.node(id).expect("node").rect(&editor.layout));

        let mut events = Vec::new();
        editor.drag_started(grab);
        editor.drag_ended(grab + Vector::new(3.0, 3.0), false, &mut events);

        assert!(events.is_empty());
        assert_eq!(
            editor.patch.node(id).map(|n| n.position),
            Some(Point::new(100.0, 100.0))
        );
        assert!(editor.selection.contains(&id));
    }

    #[test]
    fn tap_threshold_is_screen_space() {
        // At zoom 0.25, a 4 px screen move spans 16 world units; it must
        // still be a tap.
        let mut patch = Patch::new();
        let id = patch.add_node(Node::new("n"));
        let mut editor = editor_with(patch);
        editor.transform.set_zoom(0.25);
        let local = center(&editor.patch.node(id).expect("node").rect(&editor.layout));
        let grab = editor.transform.to_screen(local);

        let mut events = Vec::new();
        editor.drag_started(grab);
        editor.drag_ended(grab + Vector::new(4.0, 0.0), false, &mut events);
        assert!(events.is_empty());
        assert!(editor.selection.contains(&id));
    }

    #[test]
    fn toggle_tap_flips_membership() {
        let mut patch = Patch::new();
        let a = patch.add_node(Node::new("a").at(Point::new(0.0, 0.0)));
        let b = patch.add_node(Node::new("b").at(Point::new(300.0, 0.0)));
        let mut editor = editor_with(patch);
        editor.selection.insert(a);

        let grab = center(&editor.patch.node(b).expect("node").rect(&editor.layout));
        let mut events = Vec::new();
        editor.drag_started(grab);
        editor.drag_ended(grab, true, &mut events);
        assert_eq!(editor.selection.len(), 2);

        editor.drag_started(grab);
        editor.drag_ended(grab, true, &mut events);
        assert!(editor.selection.contains(&a));
        assert!(!editor.selection.contains(&b));
    }

    #[test]
    fn box_select_replaces_selection() {
        let mut patch = Patch::new();
        let a = patch.add_node(Node::new("a").at(Point::new(0.0, 0.0)));
        let b = patch.add_node(Node::new("b").at(Point::new(1000.0, 1000.0)));
        let mut editor = editor_with(patch);
        editor.selection.insert(b);

        // Start well clear of both nodes, sweep over `a` only.
        let mut events = Vec::new();
        editor.drag_started(Point::new(-200.0, -200.0));
        editor.drag_moved(Point::new(150.0, 60.0));
        assert!(matches!(editor.drag_state(), DragState::Selecting { .. }));
        editor.drag_ended(Point::new(150.0, 60.0), false, &mut events);

        assert!(editor.selection.contains(&a));
        assert!(!editor.selection.contains(&b));
        assert!(events.is_empty());
    }

    #[test]
    fn wire_dropped_on_input_connects_and_displaces() {
        let (mut editor, output, input) = source_and_sink();
        let other = editor.patch.add_node(
            Node::new("other")
                .output("out", "audio")
                .at(Point::new(0.0, 300.0)),
        );
        let old_output = OutputId::new(other, 0);
        editor.patch.connect(old_output, input);

        let from = editor
            .patch
            .output_center(output, &editor.layout)
            .expect("center");
        let to = editor
            .patch
            .input_center(input, &editor.layout)
            .expect("center");

        let mut events = Vec::new();
        editor.drag_started(from);
        editor.drag_moved(to);
        editor.drag_ended(to, false, &mut events);

        let added = Wire::new(output, input);
        assert!(editor.patch.has_wire(&added));
        assert_eq!(editor.patch.wires().count(), 1);
        assert_eq!(
            events,
            vec![
                EditorEvent::WireRemoved {
                    wire: Wire::new(old_output, input),
                },
                EditorEvent::WireAdded { wire: added },
            ]
        );
    }

    #[test]
    fn wire_dropped_in_space_is_abandoned() {
        let (mut editor, output, _) = source_and_sink();
        let from = editor
            .patch
            .output_center(output, &editor.layout)
            .expect("center");

        let mut events = Vec::new();
        editor.drag_started(from);
        editor.drag_ended(from + Vector::new(150.0, 150.0), false, &mut events);
        assert_eq!(editor.patch.wires().count(), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn picked_up_wire_snaps_back_when_abandoned() {
        let (mut editor, output, input) = source_and_sink();
        editor.patch.connect(output, input);
        let inp = editor
            .patch
            .input_center(input, &editor.layout)
            .expect("center");

        let mut events = Vec::new();
        editor.drag_started(inp);
        editor.drag_moved(inp + Vector::new(80.0, 80.0));
        editor.drag_ended(inp + Vector::new(80.0, 80.0), false, &mut events);

        assert!(editor.patch.has_wire(&Wire::new(output, input)));
        assert!(events.is_empty());
    }

    #[test]
    fn picked_up_wire_moves_to_another_input() {
        let (mut editor, output, input) = source_and_sink();
        let third = editor.patch.add_node(
            Node::new("third")
                .input("in", "audio")
                .at(Point::new(400.0, 300.0)),
        );
        let new_input = InputId::new(third, 0);
        editor.patch.connect(output, input);

        let from = editor
            .patch
            .input_center(input, &editor.layout)
            .expect("center");
        let to = editor
            .patch
            .input_center(new_input, &editor.layout)
            .expect("center");

        let mut events = Vec::new();
        editor.drag_started(from);
        editor.drag_moved(to);
        editor.drag_ended(to, false, &mut events);

        assert!(!editor.patch.has_wire(&Wire::new(output, input)));
        assert!(editor.patch.has_wire(&Wire::new(output, new_input)));
        assert_eq!(
            events,
            vec![
                EditorEvent::WireRemoved {
                    wire: Wire::new(output, input),
                },
                EditorEvent::WireAdded {
                    wire: Wire::new(output, new_input),
                },
            ]
        );
    }
}
