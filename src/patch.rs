use std::collections::HashSet;

use iced::{Point, Rectangle, Vector};
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::geometry;
use crate::layout::LayoutConstants;

new_key_type! {
    /// Stable generational identifier for a node. Remains valid until the
    /// node is removed; never shifts when other nodes are added or removed.
    pub struct NodeId;
}

/// Address of an input port: owning node plus slot in `Node::inputs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputId {
    pub node: NodeId,
    pub port: usize,
}

impl InputId {
    pub fn new(node: NodeId, port: usize) -> Self {
        Self { node, port }
    }
}

/// Address of an output port: owning node plus slot in `Node::outputs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputId {
    pub node: NodeId,
    pub port: usize,
}

impl OutputId {
    pub fn new(node: NodeId, port: usize) -> Self {
        Self { node, port }
    }
}

/// A named connection point on a node.
///
/// The `tag` is opaque to the engine: it only selects a rendering color or
/// gradient through the `Style` and is never checked against connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub tag: String,
}

impl Port {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }
}

// iced's `Point` does not implement serde; bridge it field-for-field.
#[derive(Serialize, Deserialize)]
#[serde(remote = "Point")]
struct PointDef {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    /// Top-left corner, world space.
    #[serde(with = "PointDef")]
    pub position: Point,
    /// Locked nodes ignore move gestures entirely.
    pub locked: bool,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            position: Point::ORIGIN,
            locked: false,
        }
    }

    pub fn input(mut self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        self.inputs.push(Port::new(name, tag));
        self
    }

    pub fn output(mut self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        self.outputs.push(Port::new(name, tag));
        self
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Bounding rectangle of the node body. Height follows whichever side
    /// has more ports.
    pub fn rect(&self, layout: &LayoutConstants) -> Rectangle {
        let maxio = self.inputs.len().max(self.outputs.len()) as f32;
        Rectangle {
            x: self.position.x,
            y: self.position.y,
            width: layout.node_width,
            height: layout.node_title_height
                + layout.port_spacing
                + maxio * (layout.port_size.height + layout.port_spacing),
        }
    }

    fn port_y(&self, index: usize, layout: &LayoutConstants) -> f32 {
        self.position.y
            + layout.node_title_height
            + layout.port_spacing
            + index as f32 * (layout.port_size.height + layout.port_spacing)
    }

    /// Rectangle of input port `index`, not including its name label.
    pub fn input_rect(&self, index: usize, layout: &LayoutConstants) -> Rectangle {
        Rectangle {
            x: self.position.x + layout.port_spacing,
            y: self.port_y(index, layout),
            width: layout.port_size.width,
            height: layout.port_size.height,
        }
    }

    /// Rectangle of output port `index`, not including its name label.
    pub fn output_rect(&self, index: usize, layout: &LayoutConstants) -> Rectangle {
        Rectangle {
            x: self.position.x + layout.node_width - layout.port_spacing - layout.port_size.width,
            y: self.port_y(index, layout),
            width: layout.port_size.width,
            height: layout.port_size.height,
        }
    }
}

/// A directed connection from an output port to an input port.
///
/// Equality and hashing are by value; the wire set never holds duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wire {
    pub output: OutputId,
    pub input: InputId,
}

impl Wire {
    pub fn new(output: OutputId, input: InputId) -> Self {
        Self { output, input }
    }
}

/// The complete graph document: nodes plus wires.
///
/// This is the single source of truth. The gesture layer mutates it through
/// the primitives below; the render pipeline only reads it. Hosts may replace
/// it wholesale when loading new data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Patch {
    nodes: SlotMap<NodeId, Node>,
    /// Z-order: later entries draw on top and win hit-testing.
    draw_order: Vec<NodeId>,
    wires: HashSet<Wire>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = self.nodes.insert(node);
        self.draw_order.push(id);
        id
    }

    /// Retires a node id and drops every wire referencing it.
    ///
    /// Returns the removed node and wires, or `None` for a stale id.
    pub fn remove_node(&mut self, id: NodeId) -> Option<(Node, Vec<Wire>)> {
        let node = self.nodes.remove(id)?;
        self.draw_order.retain(|n| *n != id);
        let dropped: Vec<Wire> = self
            .wires
            .iter()
            .filter(|w| w.output.node == id || w.input.node == id)
            .copied()
            .collect();
        for wire in &dropped {
            self.wires.remove(wire);
        }
        Some((node, dropped))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes in draw order, back to front.
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = (NodeId, &Node)> {
        self.draw_order
            .iter()
            .filter_map(|id| self.nodes.get(*id).map(|n| (*id, n)))
    }

    pub fn wires(&self) -> impl Iterator<Item = &Wire> {
        self.wires.iter()
    }

    pub fn has_wire(&self, wire: &Wire) -> bool {
        self.wires.contains(wire)
    }

    /// The wire currently attached to an input, if any.
    pub fn wire_to(&self, input: InputId) -> Option<Wire> {
        self.wires.iter().find(|w| w.input == input).copied()
    }

    /// Moves a node by `offset`. Locked and missing nodes are left alone.
    pub fn move_node(&mut self, id: NodeId, offset: Vector) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) if !node.locked => {
                node.position = node.position + offset;
                true
            }
            _ => false,
        }
    }

    /// Connects `output` to `input`, displacing whatever wire already fed
    /// that input so the one-wire-per-input invariant holds.
    ///
    /// Returns the displaced wire, if there was one.
    pub fn connect(&mut self, output: OutputId, input: InputId) -> Option<Wire> {
        let displaced = self.wire_to(input);
        if let Some(old) = displaced {
            self.wires.remove(&old);
        }
        self.wires.insert(Wire::new(output, input));
        displaced
    }

    pub fn disconnect(&mut self, wire: &Wire) -> bool {
        self.wires.remove(wire)
    }

    /// Center of an output port, for wire endpoints.
    pub fn output_center(&self, output: OutputId, layout: &LayoutConstants) -> Option<Point> {
        let node = self.nodes.get(output.node)?;
        (output.port < node.outputs.len())
            .then(|| geometry::center(&node.output_rect(output.port, layout)))
    }

    /// Center of an input port, for wire endpoints.
    pub fn input_center(&self, input: InputId, layout: &LayoutConstants) -> Option<Point> {
        let node = self.nodes.get(input.node)?;
        (input.port < node.inputs.len())
            .then(|| geometry::center(&node.input_rect(input.port, layout)))
    }

    /// Node ids whose rect intersects `rect` (box selection).
    pub fn selected_in(&self, rect: Rectangle, layout: &LayoutConstants) -> HashSet<NodeId> {
        self.nodes()
            .filter(|(_, node)| geometry::intersects(&node.rect(layout), &rect))
            .map(|(id, _)| id)
            .collect()
    }

    /// Manual stacked grid layout: each column is a list of node ids placed
    /// top to bottom, columns advancing rightward by node width plus spacing.
    pub fn stacked_layout(&mut self, origin: Point, columns: &[Vec<NodeId>], layout: &LayoutConstants) {
        for (column, stack) in columns.iter().enumerate() {
            let x = origin.x + column as f32 * (layout.node_width + layout.node_spacing);
            let mut y = origin.y;
            for id in stack {
                let height = match self.nodes.get(*id) {
                    Some(node) => node.rect(layout).height,
                    None => continue,
                };
                if let Some(node) = self.nodes.get_mut(*id) {
                    node.position = Point::new(x, y);
                }
                y += height + layout.node_spacing;
            }
        }
    }
}
