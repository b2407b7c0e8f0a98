//! Host document seam.
//!
//! The core never talks to a browser directly. Scenes, pins, indicators and
//! the controller read and mutate the document through [`Dom`], with an
//! opaque, cheaply clonable [`Dom::Node`] handle. The wasm adapter backs it
//! with `web-sys`; [`crate::mock::MockDom`] backs it with an in-memory tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker attribute set on every pin spacer element.
pub const PIN_SPACER_ATTRIBUTE: &str = "data-scrollmagic-pin-spacer";

/// Top/left pair in CSS pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub top: f64,
    pub left: f64,
}

impl Offset {
    /// Component along the scroll axis.
    #[inline]
    pub fn along(&self, vertical: bool) -> f64 {
        if vertical {
            self.top
        } else {
            self.left
        }
    }

    #[inline]
    pub fn along_mut(&mut self, vertical: bool) -> &mut f64 {
        if vertical {
            &mut self.top
        } else {
            &mut self.left
        }
    }
}

/// Scroll container: the document viewport or a scrollable element.
#[derive(Clone, Debug, PartialEq)]
pub enum Container<N> {
    Window,
    Element(N),
}

impl<N> Container<N> {
    #[inline]
    pub fn is_document(&self) -> bool {
        matches!(self, Container::Window)
    }

    #[inline]
    pub fn element(&self) -> Option<&N> {
        match self {
            Container::Window => None,
            Container::Element(node) => Some(node),
        }
    }
}

/// Caller-side reference to one or more elements.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementTarget<N> {
    Node(N),
    Nodes(Vec<N>),
    Selector(String),
}

impl<N: Clone> ElementTarget<N> {
    /// Every element the target refers to, in document order for selectors.
    pub fn resolve_all<D: Dom<Node = N>>(&self, dom: &D) -> Vec<N> {
        match self {
            ElementTarget::Node(node) => vec![node.clone()],
            ElementTarget::Nodes(nodes) => nodes.clone(),
            ElementTarget::Selector(selector) => dom.query(selector),
        }
    }

    pub fn resolve_first<D: Dom<Node = N>>(&self, dom: &D) -> Option<N> {
        match self {
            ElementTarget::Node(node) => Some(node.clone()),
            ElementTarget::Nodes(nodes) => nodes.first().cloned(),
            ElementTarget::Selector(selector) => dom.query(selector).into_iter().next(),
        }
    }
}

impl<N: fmt::Debug> fmt::Display for ElementTarget<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementTarget::Node(node) => write!(f, "{node:?}"),
            ElementTarget::Nodes(nodes) => write!(f, "{nodes:?}"),
            ElementTarget::Selector(selector) => write!(f, "\"{selector}\""),
        }
    }
}

impl<N> From<&str> for ElementTarget<N> {
    fn from(selector: &str) -> Self {
        ElementTarget::Selector(selector.to_string())
    }
}

/// Document operations the engine needs. Implementations use interior
/// mutability; handles are shared by every scene of a controller.
pub trait Dom: Clone + fmt::Debug {
    type Node: Clone + PartialEq + fmt::Debug;

    // Resolution and tree navigation
    fn query(&self, selector: &str) -> Vec<Self::Node>;
    /// True when the node has a parent node.
    fn is_attached(&self, node: &Self::Node) -> bool;
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    fn first_child(&self, node: &Self::Node) -> Option<Self::Node>;
    /// Inclusive: a node contains itself.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;
    fn body(&self) -> Option<Self::Node>;

    // Tree mutation
    fn create_div(&self) -> Self::Node;
    fn insert_before(&self, parent: &Self::Node, node: &Self::Node, reference: &Self::Node);
    fn append_child(&self, parent: &Self::Node, child: &Self::Node);
    fn remove_child(&self, parent: &Self::Node, child: &Self::Node);

    // Attributes, classes, text
    fn has_attribute(&self, node: &Self::Node, name: &str) -> bool;
    fn get_attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    fn remove_attribute(&self, node: &Self::Node, name: &str);
    /// `classes` is a space-separated list.
    fn add_class(&self, node: &Self::Node, classes: &str);
    fn remove_class(&self, node: &Self::Node, classes: &str);
    fn set_text(&self, node: &Self::Node, text: &str);

    // Styles. Property names are CSS (kebab-case); an empty value removes
    // the inline declaration.
    fn computed_style(&self, node: &Self::Node, property: &str) -> String;
    fn inline_style(&self, node: &Self::Node, property: &str) -> String;
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);

    // Measurement
    /// Document-relative offset, or viewport-relative when requested.
    fn offset(&self, node: &Self::Node, relative_to_viewport: bool) -> Offset;
    /// Client width, or offset width when `outer`; margins added on request.
    fn width(&self, node: &Self::Node, outer: bool, include_margin: bool) -> f64;
    fn height(&self, node: &Self::Node, outer: bool, include_margin: bool) -> f64;
    /// (inner width, inner height) of the browser window.
    fn window_size(&self) -> (f64, f64);

    // Scroll container
    fn viewport_size(&self, container: &Container<Self::Node>, vertical: bool) -> f64;
    fn scroll_pos(&self, container: &Container<Self::Node>, vertical: bool) -> f64;
    fn set_scroll_pos(&self, container: &Container<Self::Node>, vertical: bool, pos: f64);

    /// Document offset of the container; zero for the window.
    fn container_offset(&self, container: &Container<Self::Node>) -> Offset {
        match container {
            Container::Window => Offset::default(),
            Container::Element(node) => self.offset(node, false),
        }
    }

    fn set_styles(&self, node: &Self::Node, declarations: &[(&str, String)]) {
        for (property, value) in declarations {
            self.set_style(node, property, value);
        }
    }
}

/// CSS pixel value.
#[inline]
pub fn px(value: f64) -> String {
    format!("{value}px")
}

/// Leading-number parse in the manner of JavaScript's `parseFloat`:
/// `"12.5px"` is `12.5`, `"abc"` is `None`.
pub fn parse_float(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return s[..end + "Infinity".len()].replace("Infinity", "inf").parse().ok();
    }
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        let exp_digits = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits {
            end = exp;
        }
    }
    s[..end].parse().ok()
}

/// `parse_float` with unparsable values treated as zero (CSS lengths).
#[inline]
pub fn float_val(text: &str) -> f64 {
    parse_float(text).unwrap_or(0.0)
}

/// Display types whose vertical margins collapse with neighbours.
#[inline]
pub fn is_margin_collapse_type(display: &str) -> bool {
    matches!(display, "block" | "flex" | "list-item" | "table" | "-webkit-box")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_float_matches_leading_number_rules() {
        assert_eq!(parse_float("12.5px"), Some(12.5));
        assert_eq!(parse_float("  -3"), Some(-3.0));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("1e3and"), Some(1000.0));
        assert_eq!(parse_float("2e"), Some(2.0));
        assert_eq!(parse_float("abc"), None);
        assert_eq!(parse_float("-"), None);
        assert_eq!(parse_float(""), None);
        assert_eq!(parse_float("Infinity"), Some(f64::INFINITY));
    }

    #[test]
    fn float_val_defaults_to_zero() {
        assert_eq!(float_val("auto"), 0.0);
        assert_eq!(float_val("120px"), 120.0);
    }

    #[test]
    fn px_formats_integers_without_fraction() {
        assert_eq!(px(120.0), "120px");
        assert_eq!(px(0.5), "0.5px");
    }

    #[test]
    fn offset_axis_selection() {
        let mut o = Offset {
            top: 10.0,
            left: 20.0,
        };
        assert_eq!(o.along(true), 10.0);
        assert_eq!(o.along(false), 20.0);
        *o.along_mut(false) += 5.0;
        assert_eq!(o.left, 25.0);
    }
}
