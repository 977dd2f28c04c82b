use std::collections::HashMap;

use iced::Color;

/// Two-color gradient for a wire, from the output end to the input end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireGradient {
    pub source: Color,
    pub target: Color,
}

impl WireGradient {
    pub fn solid(color: Color) -> Self {
        Self {
            source: color,
            target: color,
        }
    }
}

/// Resolved rendering colors, passed into every render call.
///
/// Rendering is a pure function of its inputs; there are no global color
/// statics. Port-type tags map to wire gradients through `wires`, with
/// `default_wire` as the gray fallback for unmapped tags. Port circles use
/// their gradient's `source` color.
#[derive(Debug, Clone)]
pub struct Style {
    pub node: Color,
    pub node_selected: Color,
    pub node_shadow: Color,
    pub node_border: Color,
    pub node_hover: Color,
    pub title_bar: Color,
    pub title_text: Color,
    pub port_outline: Color,
    pub port_label: Color,
    /// Center dot drawn on ports with no wire attached.
    pub port_dot: Color,
    pub grid: Color,
    pub selection_fill: Color,
    pub selection_border: Color,
    pub wires: HashMap<String, WireGradient>,
    pub default_wire: WireGradient,
}

impl Default for Style {
    fn default() -> Self {
        let mut wires = HashMap::new();
        wires.insert(
            "audio".to_string(),
            WireGradient {
                source: Color::from_rgb(0.35, 0.75, 0.45),
                target: Color::from_rgb(0.30, 0.75, 0.85),
            },
        );
        wires.insert(
            "midi".to_string(),
            WireGradient {
                source: Color::from_rgb(0.85, 0.35, 0.35),
                target: Color::from_rgb(0.92, 0.65, 0.25),
            },
        );
        wires.insert(
            "control".to_string(),
            WireGradient {
                source: Color::from_rgb(0.35, 0.55, 0.85),
                target: Color::from_rgb(0.59, 0.47, 0.98),
            },
        );

        Self {
            node: Color::from_rgb(0.11, 0.11, 0.13),
            node_selected: Color::from_rgb(0.22, 0.27, 0.38),
            node_shadow: Color::from_rgba(0.0, 0.0, 0.0, 0.4),
            node_border: Color::BLACK,
            node_hover: Color::WHITE,
            title_bar: Color::from_rgb(0.15, 0.15, 0.18),
            title_text: Color::from_rgb(0.92, 0.92, 0.94),
            port_outline: Color::BLACK,
            port_label: Color::from_rgb(0.55, 0.55, 0.60),
            port_dot: Color::from_rgba(0.0, 0.0, 0.0, 0.6),
            grid: Color::from_rgba(1.0, 1.0, 1.0, 0.05),
            selection_fill: Color::from_rgba(1.0, 0.15, 0.18, 0.1),
            selection_border: Color::BLACK,
            wires,
            default_wire: WireGradient::solid(Color::from_rgb(0.5, 0.5, 0.5)),
        }
    }
}

impl Style {
    /// Gradient for a port-type tag, falling back to the default gray.
    pub fn wire_gradient(&self, tag: &str) -> WireGradient {
        self.wires.get(tag).copied().unwrap_or(self.default_wire)
    }
}
