//! A node-graph editor engine for iced canvases.
//!
//! The document is a [`Patch`]: nodes with named input/output ports, joined
//! by wires from outputs to inputs (one wire per input, fan-out from
//! outputs). [`NodeEditor`] wraps a patch with selection, pan/zoom and a
//! drag gesture state machine, and implements `canvas::Program` so it can be
//! embedded directly in an iced view:
//!
//! ```no_run
//! use patchbay::{EditorMessage, NodeEditor, demo};
//!
//! let mut editor = NodeEditor::new(demo::simple_patch());
//! // Route canvas messages back in; react to what the gesture committed.
//! for event in editor.update(EditorMessage::Panned {
//!     delta: iced::Vector::new(24.0, 0.0),
//! }) {
//!     println!("{event:?}");
//! }
//! ```
//!
//! Rendering goes through the [`Surface`] trait, so the scene pipeline in
//! [`render`] is a pure function of the document and view state; the iced
//! frame adapter lives in [`editor`].

pub mod demo;
pub mod editor;
pub mod geometry;
pub mod gesture;
pub mod hit_test;
pub mod layout;
pub mod patch;
pub mod render;
pub mod style;
pub mod transform;

pub use editor::{EditorEvent, EditorMessage, NodeEditor};
pub use gesture::{DRAG_THRESHOLD, DragState};
pub use hit_test::HitTarget;
pub use layout::LayoutConstants;
pub use patch::{InputId, Node, NodeId, OutputId, Patch, Port, Wire};
pub use render::{Scene, Surface, TextSpec, draw_overlay, draw_scene};
pub use style::{Style, WireGradient};
pub use transform::{MAX_ZOOM, MIN_ZOOM, Transform};
