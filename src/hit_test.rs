use iced::Point;

use crate::geometry;
use crate::layout::LayoutConstants;
use crate::patch::{InputId, NodeId, OutputId, Patch};

/// Classification of a point against the patch geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Node(NodeId),
    Input(InputId),
    Output(OutputId),
}

impl Patch {
    /// Classifies a local-space point against node and port rectangles.
    ///
    /// Nodes are tested topmost-first (reverse draw order) so overlapping
    /// nodes resolve to the one drawn on top. Within a node, ports win over
    /// the body since their rects sit inside it.
    pub fn hit_test(&self, point: Point, layout: &LayoutConstants) -> Option<HitTarget> {
        for (id, node) in self.nodes().rev() {
            for index in 0..node.inputs.len() {
                if geometry::contains(&node.input_rect(index, layout), point) {
                    return Some(HitTarget::Input(InputId::new(id, index)));
                }
            }
            for index in 0..node.outputs.len() {
                if geometry::contains(&node.output_rect(index, layout), point) {
                    return Some(HitTarget::Output(OutputId::new(id, index)));
                }
            }
            if geometry::contains(&node.rect(layout), point) {
                return Some(HitTarget::Node(id));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::center;
    use crate::patch::Node;

    fn layout() -> LayoutConstants {
        LayoutConstants::default()
    }

    #[test]
    fn empty_space_misses() {
        let patch = Patch::new();
        assert_eq!(patch.hit_test(Point::new(10.0, 10.0), &layout()), None);
    }

    #[test]
    fn ports_win_over_body() {
        let layout = layout();
        let mut patch = Patch::new();
        let id = patch.add_node(
            Node::new("n")
                .input("in", "x")
                .output("out", "x")
                .at(Point::new(0.0, 0.0)),
        );
        let node = patch.node(id).expect("node").clone();

        let on_input = center(&node.input_rect(0, &layout));
        let on_output = center(&node.output_rect(0, &layout));
        let on_body = Point::new(node.position.x + layout.node_width / 2.0, node.position.y + 5.0);

        assert_eq!(
            patch.hit_test(on_input, &layout),
            Some(HitTarget::Input(InputId::new(id, 0)))
        );
        assert_eq!(
            patch.hit_test(on_output, &layout),
            Some(HitTarget::Output(OutputId::new(id, 0)))
        );
        assert_eq!(patch.hit_test(on_body, &layout), Some(HitTarget::Node(id)));
    }

    #[test]
    fn hit_test_matches_rect_functions() {
        let layout = layout();
        let mut patch = Patch::new();
        let id = patch.add_node(
            Node::new("n")
                .input("a", "x")
                .input("b", "x")
                .at(Point::new(40.0, 60.0)),
        );
        let node = patch.node(id).expect("node").clone();

        for index in 0..node.inputs.len() {
            let p = center(&node.input_rect(index, &layout));
            assert_eq!(
                patch.hit_test(p, &layout),
                Some(HitTarget::Input(InputId::new(id, index)))
            );
        }
    }

    #[test]
    fn topmost_node_wins_when_overlapping() {
        let layout = layout();
        let mut patch = Patch::new();
        let below = patch.add_node(Node::new("below").at(Point::new(0.0, 0.0)));
        let above = patch.add_node(Node::new("above").at(Point::new(20.0, 10.0)));
        let _ = below;

        // Point inside both bodies, clear of the topmost node's port columns.
        let p = Point::new(60.0, 30.0);
        assert_eq!(patch.hit_test(p, &layout), Some(HitTarget::Node(above)));
    }
}
