//! Ready-made patches for examples and tests.

use iced::Point;

use crate::layout::LayoutConstants;
use crate::patch::{InputId, Node, OutputId, Patch};

/// A small signal chain: two generator → processor branches feeding a mixer
/// that drives the output node. Laid out in columns left to right.
pub fn simple_patch() -> Patch {
    let mut patch = Patch::new();

    let generator_a = patch.add_node(Node::new("generator").output("out", "audio"));
    let generator_b = patch.add_node(Node::new("generator").output("out", "audio"));
    let processor_a = patch.add_node(
        Node::new("processor")
            .input("in", "audio")
            .input("cutoff", "control")
            .output("out", "audio"),
    );
    let processor_b = patch.add_node(
        Node::new("processor")
            .input("in", "audio")
            .input("cutoff", "control")
            .output("out", "audio"),
    );
    let mixer = patch.add_node(
        Node::new("mixer")
            .input("in1", "audio")
            .input("in2", "audio")
            .output("out", "audio"),
    );
    let output = patch.add_node(Node::new("output").input("in", "audio"));

    patch.connect(OutputId::new(generator_a, 0), InputId::new(processor_a, 0));
    patch.connect(OutputId::new(generator_b, 0), InputId::new(processor_b, 0));
    patch.connect(OutputId::new(processor_a, 0), InputId::new(mixer, 0));
    patch.connect(OutputId::new(processor_b, 0), InputId::new(mixer, 1));
    patch.connect(OutputId::new(mixer, 0), InputId::new(output, 0));

    patch.stacked_layout(
        Point::new(40.0, 40.0),
        &[
            vec![generator_a, generator_b],
            vec![processor_a, processor_b],
            vec![mixer],
            vec![output],
        ],
        &LayoutConstants::default(),
    );
    patch
}
