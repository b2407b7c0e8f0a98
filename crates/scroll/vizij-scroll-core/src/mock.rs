//! In-memory host doubles: a document tree, a recording timeline and a
//! virtual scrollbar. Used by the crate's tests and by headless hosts that
//! want to drive scenes without a browser.
//!
//! Layout is not computed. Elements get explicit document rectangles via
//! [`MockDom::set_rect`]; an element without one measures as its first
//! child (so a pin spacer measures as the pinned element) or, failing that,
//! sits at its parent's offset.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::dom::{float_val, px, Container, Dom, Offset};
use crate::scrollbar::VirtualScrollbar;
use crate::tween::{ChildTween, Easing, Timeline};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MockNode(pub usize);

/// Document-space box of an element, in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }
}

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    id: Option<String>,
    parent: Option<usize>,
    children: Vec<usize>,
    classes: Vec<String>,
    attributes: HashMap<String, String>,
    inline: HashMap<String, String>,
    computed: HashMap<String, String>,
    rect: Option<Rect>,
    text: String,
    scroll: (f64, f64),
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<NodeData>,
    root: usize,
    body: usize,
    window: (f64, f64),
    window_scroll: (f64, f64),
}

impl Tree {
    fn node(&self, n: MockNode) -> &NodeData {
        &self.nodes[n.0]
    }

    fn node_mut(&mut self, n: MockNode) -> &mut NodeData {
        &mut self.nodes[n.0]
    }

    fn detach(&mut self, child: usize) {
        if let Some(parent) = self.nodes[child].parent.take() {
            self.nodes[parent].children.retain(|&c| c != child);
        }
    }

    fn is_connected(&self, mut idx: usize) -> bool {
        loop {
            if idx == self.root {
                return true;
            }
            match self.nodes[idx].parent {
                Some(p) => idx = p,
                None => return false,
            }
        }
    }

    fn walk(&self, idx: usize, out: &mut Vec<usize>) {
        out.push(idx);
        for &child in &self.nodes[idx].children {
            self.walk(child, out);
        }
    }

    fn rect_of(&self, idx: usize) -> Option<Rect> {
        let node = &self.nodes[idx];
        node.rect
            .or_else(|| node.children.first().and_then(|&c| self.rect_of(c)))
    }

    /// Offset ignoring scroll of ancestor containers.
    fn layout_offset(&self, idx: usize) -> Offset {
        if let Some(rect) = self.rect_of(idx) {
            return Offset {
                top: rect.top,
                left: rect.left,
            };
        }
        match self.nodes[idx].parent {
            Some(p) => self.layout_offset(p),
            None => Offset::default(),
        }
    }

    fn margin(&self, idx: usize, side: &str) -> f64 {
        self.nodes[idx]
            .computed
            .get(&format!("margin-{side}"))
            .map_or(0.0, |v| float_val(v))
    }
}

/// Shared handle to an in-memory document with `html` root and `body`.
#[derive(Clone, Debug)]
pub struct MockDom {
    tree: Rc<RefCell<Tree>>,
}

impl Default for MockDom {
    fn default() -> Self {
        Self::new(1024.0, 768.0)
    }
}

impl MockDom {
    /// Document with a window of `width` x `height`.
    pub fn new(width: f64, height: f64) -> Self {
        let html = NodeData {
            tag: "html".into(),
            children: vec![1],
            ..Default::default()
        };
        let body = NodeData {
            tag: "body".into(),
            parent: Some(0),
            ..Default::default()
        };
        Self {
            tree: Rc::new(RefCell::new(Tree {
                nodes: vec![html, body],
                root: 0,
                body: 1,
                window: (width, height),
                window_scroll: (0.0, 0.0),
            })),
        }
    }

    pub fn body_node(&self) -> MockNode {
        MockNode(self.tree.borrow().body)
    }

    /// Detached element.
    pub fn create_element(&self, tag: &str) -> MockNode {
        let mut tree = self.tree.borrow_mut();
        tree.nodes.push(NodeData {
            tag: tag.to_string(),
            ..Default::default()
        });
        MockNode(tree.nodes.len() - 1)
    }

    /// Creates `<tag id=..>` as the last child of `parent`.
    pub fn append(&self, parent: MockNode, tag: &str, id: Option<&str>) -> MockNode {
        let node = self.create_element(tag);
        {
            let mut tree = self.tree.borrow_mut();
            tree.node_mut(node).id = id.map(str::to_string);
        }
        self.append_child(&parent, &node);
        node
    }

    pub fn set_rect(&self, node: MockNode, rect: Rect) {
        self.tree.borrow_mut().node_mut(node).rect = Some(rect);
    }

    /// Computed (stylesheet) value, visible when no inline value overrides it.
    pub fn set_computed(&self, node: MockNode, property: &str, value: &str) {
        self.tree
            .borrow_mut()
            .node_mut(node)
            .computed
            .insert(property.to_string(), value.to_string());
    }

    pub fn set_window_size(&self, width: f64, height: f64) {
        self.tree.borrow_mut().window = (width, height);
    }

    pub fn children(&self, node: MockNode) -> Vec<MockNode> {
        self.tree
            .borrow()
            .node(node)
            .children
            .iter()
            .map(|&c| MockNode(c))
            .collect()
    }

    pub fn index_in_parent(&self, node: MockNode) -> Option<usize> {
        let tree = self.tree.borrow();
        let parent = tree.node(node).parent?;
        tree.nodes[parent].children.iter().position(|&c| c == node.0)
    }

    pub fn detach(&self, node: MockNode) {
        self.tree.borrow_mut().detach(node.0);
    }

    pub fn classes(&self, node: MockNode) -> Vec<String> {
        self.tree.borrow().node(node).classes.clone()
    }

    pub fn has_class(&self, node: MockNode, class: &str) -> bool {
        self.tree
            .borrow()
            .node(node)
            .classes
            .iter()
            .any(|c| c == class)
    }

    /// Inline style value, empty when unset.
    pub fn style(&self, node: MockNode, property: &str) -> String {
        self.inline_style(&node, property)
    }

    /// All inline declarations, sorted by property.
    pub fn inline_styles(&self, node: MockNode) -> Vec<(String, String)> {
        let tree = self.tree.borrow();
        let mut styles: Vec<_> = tree
            .node(node)
            .inline
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        styles.sort();
        styles
    }

    pub fn text(&self, node: MockNode) -> String {
        self.tree.borrow().node(node).text.clone()
    }

    pub fn attribute(&self, node: MockNode, name: &str) -> Option<String> {
        self.tree.borrow().node(node).attributes.get(name).cloned()
    }

    pub fn tag(&self, node: MockNode) -> String {
        self.tree.borrow().node(node).tag.clone()
    }

    pub fn node_count(&self) -> usize {
        self.tree.borrow().nodes.len()
    }
}

impl Dom for MockDom {
    type Node = MockNode;

    fn query(&self, selector: &str) -> Vec<MockNode> {
        let tree = self.tree.borrow();
        let mut order = Vec::new();
        tree.walk(tree.root, &mut order);
        let selector = selector.trim();
        order
            .into_iter()
            .filter(|&idx| {
                let node = &tree.nodes[idx];
                if let Some(id) = selector.strip_prefix('#') {
                    node.id.as_deref() == Some(id)
                } else if let Some(class) = selector.strip_prefix('.') {
                    node.classes.iter().any(|c| c == class)
                } else {
                    node.tag == selector
                }
            })
            .map(MockNode)
            .collect()
    }

    fn is_attached(&self, node: &MockNode) -> bool {
        self.tree.borrow().is_connected(node.0)
    }

    fn parent(&self, node: &MockNode) -> Option<MockNode> {
        self.tree.borrow().node(*node).parent.map(MockNode)
    }

    fn first_child(&self, node: &MockNode) -> Option<MockNode> {
        self.tree
            .borrow()
            .node(*node)
            .children
            .first()
            .map(|&c| MockNode(c))
    }

    fn contains(&self, ancestor: &MockNode, node: &MockNode) -> bool {
        let tree = self.tree.borrow();
        let mut current = Some(node.0);
        while let Some(idx) = current {
            if idx == ancestor.0 {
                return true;
            }
            current = tree.nodes[idx].parent;
        }
        false
    }

    fn body(&self) -> Option<MockNode> {
        Some(self.body_node())
    }

    fn create_div(&self) -> MockNode {
        self.create_element("div")
    }

    fn insert_before(&self, parent: &MockNode, node: &MockNode, reference: &MockNode) {
        let mut tree = self.tree.borrow_mut();
        tree.detach(node.0);
        let siblings = &tree.nodes[parent.0].children;
        let at = siblings
            .iter()
            .position(|&c| c == reference.0)
            .unwrap_or(siblings.len());
        tree.nodes[parent.0].children.insert(at, node.0);
        tree.nodes[node.0].parent = Some(parent.0);
    }

    fn append_child(&self, parent: &MockNode, child: &MockNode) {
        let mut tree = self.tree.borrow_mut();
        tree.detach(child.0);
        tree.nodes[parent.0].children.push(child.0);
        tree.nodes[child.0].parent = Some(parent.0);
    }

    fn remove_child(&self, parent: &MockNode, child: &MockNode) {
        let mut tree = self.tree.borrow_mut();
        if tree.nodes[child.0].parent == Some(parent.0) {
            tree.detach(child.0);
        }
    }

    fn has_attribute(&self, node: &MockNode, name: &str) -> bool {
        self.tree.borrow().node(*node).attributes.contains_key(name)
    }

    fn get_attribute(&self, node: &MockNode, name: &str) -> Option<String> {
        self.attribute(*node, name)
    }

    fn remove_attribute(&self, node: &MockNode, name: &str) {
        self.tree.borrow_mut().node_mut(*node).attributes.remove(name);
    }

    fn set_attribute(&self, node: &MockNode, name: &str, value: &str) {
        self.tree
            .borrow_mut()
            .node_mut(*node)
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn add_class(&self, node: &MockNode, classes: &str) {
        let mut tree = self.tree.borrow_mut();
        let data = tree.node_mut(*node);
        for class in classes.split_whitespace() {
            if !data.classes.iter().any(|c| c == class) {
                data.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&self, node: &MockNode, classes: &str) {
        let mut tree = self.tree.borrow_mut();
        let data = tree.node_mut(*node);
        for class in classes.split_whitespace() {
            data.classes.retain(|c| c != class);
        }
    }

    fn set_text(&self, node: &MockNode, text: &str) {
        self.tree.borrow_mut().node_mut(*node).text = text.to_string();
    }

    fn computed_style(&self, node: &MockNode, property: &str) -> String {
        let tree = self.tree.borrow();
        let data = tree.node(*node);
        if let Some(v) = data.inline.get(property) {
            return v.clone();
        }
        if let Some(v) = data.computed.get(property) {
            return v.clone();
        }
        let rect = tree.rect_of(node.0);
        match property {
            "position" => "static".into(),
            "display" => "block".into(),
            "box-sizing" => "content-box".into(),
            "width" => rect.map_or_else(|| "auto".into(), |r| px(r.width)),
            "height" => rect.map_or_else(|| "auto".into(), |r| px(r.height)),
            "top" | "left" | "bottom" | "right" => "auto".into(),
            p if p.starts_with("margin") || p.starts_with("padding") => "0px".into(),
            _ => String::new(),
        }
    }

    fn inline_style(&self, node: &MockNode, property: &str) -> String {
        self.tree
            .borrow()
            .node(*node)
            .inline
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    fn set_style(&self, node: &MockNode, property: &str, value: &str) {
        let mut tree = self.tree.borrow_mut();
        let inline = &mut tree.node_mut(*node).inline;
        if value.is_empty() {
            inline.remove(property);
        } else {
            inline.insert(property.to_string(), value.to_string());
        }
    }

    fn offset(&self, node: &MockNode, relative_to_viewport: bool) -> Offset {
        let tree = self.tree.borrow();
        let mut offset = tree.layout_offset(node.0);
        // scrolled element containers move their content
        let mut ancestor = tree.nodes[node.0].parent;
        while let Some(idx) = ancestor {
            let (x, y) = tree.nodes[idx].scroll;
            offset.top -= y;
            offset.left -= x;
            ancestor = tree.nodes[idx].parent;
        }
        if relative_to_viewport {
            offset.top -= tree.window_scroll.1;
            offset.left -= tree.window_scroll.0;
        }
        offset
    }

    fn width(&self, node: &MockNode, _outer: bool, include_margin: bool) -> f64 {
        let tree = self.tree.borrow();
        let base = tree.rect_of(node.0).map_or(0.0, |r| r.width);
        if include_margin {
            base + tree.margin(node.0, "left") + tree.margin(node.0, "right")
        } else {
            base
        }
    }

    fn height(&self, node: &MockNode, _outer: bool, include_margin: bool) -> f64 {
        let tree = self.tree.borrow();
        let base = tree.rect_of(node.0).map_or(0.0, |r| r.height);
        if include_margin {
            base + tree.margin(node.0, "top") + tree.margin(node.0, "bottom")
        } else {
            base
        }
    }

    fn window_size(&self) -> (f64, f64) {
        self.tree.borrow().window
    }

    fn viewport_size(&self, container: &Container<MockNode>, vertical: bool) -> f64 {
        match container {
            Container::Window => {
                let (w, h) = self.window_size();
                if vertical {
                    h
                } else {
                    w
                }
            }
            Container::Element(node) => {
                if vertical {
                    self.height(node, false, false)
                } else {
                    self.width(node, false, false)
                }
            }
        }
    }

    fn scroll_pos(&self, container: &Container<MockNode>, vertical: bool) -> f64 {
        let tree = self.tree.borrow();
        let (x, y) = match container {
            Container::Window => tree.window_scroll,
            Container::Element(node) => tree.node(*node).scroll,
        };
        if vertical {
            y
        } else {
            x
        }
    }

    fn set_scroll_pos(&self, container: &Container<MockNode>, vertical: bool, pos: f64) {
        let mut tree = self.tree.borrow_mut();
        let scroll = match container {
            Container::Window => &mut tree.window_scroll,
            Container::Element(node) => &mut tree.node_mut(*node).scroll,
        };
        if vertical {
            scroll.1 = pos;
        } else {
            scroll.0 = pos;
        }
    }
}

// ---------- timeline ----------

/// Calls observed by a [`MockTimeline`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineCall {
    Play,
    Pause,
    Reverse,
    SetProgress(f64),
    TweenTo(f64),
    EaseChild {
        index: usize,
        progress: f64,
        momentum: f64,
        ease: String,
    },
    SetRepeat(i32),
    SetYoyo(bool),
    Kill,
}

#[derive(Debug, Default)]
struct TimelineState {
    progress: f64,
    paused: bool,
    duration: f64,
    repeat: i32,
    yoyo: bool,
    can_tween_to: bool,
    killed: bool,
    children: Vec<ChildTween>,
    calls: Vec<TimelineCall>,
}

/// Recording timeline. `play` jumps to the end and `reverse` to the start,
/// like a zero-length tween would.
#[derive(Clone, Debug)]
pub struct MockTimeline {
    state: Rc<RefCell<TimelineState>>,
}

impl MockTimeline {
    pub fn new(duration: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(TimelineState {
                duration,
                ..Default::default()
            })),
        }
    }

    pub fn with_tween_to(self) -> Self {
        self.state.borrow_mut().can_tween_to = true;
        self
    }

    pub fn with_children(self, children: Vec<ChildTween>) -> Self {
        self.state.borrow_mut().children = children;
        self
    }

    pub fn with_repeat(self, repeat: i32) -> Self {
        self.state.borrow_mut().repeat = repeat;
        self
    }

    pub fn calls(&self) -> Vec<TimelineCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn progress_now(&self) -> f64 {
        self.state.borrow().progress
    }

    pub fn is_paused_now(&self) -> bool {
        self.state.borrow().paused
    }

    pub fn is_killed(&self) -> bool {
        self.state.borrow().killed
    }

    fn record(&self, call: TimelineCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl Timeline for MockTimeline {
    fn play(&mut self) {
        self.record(TimelineCall::Play);
        let mut s = self.state.borrow_mut();
        s.paused = false;
        if s.repeat != -1 {
            s.progress = 1.0;
        }
    }

    fn pause(&mut self) {
        self.record(TimelineCall::Pause);
        self.state.borrow_mut().paused = true;
    }

    fn reverse(&mut self) {
        self.record(TimelineCall::Reverse);
        let mut s = self.state.borrow_mut();
        s.paused = false;
        s.progress = 0.0;
    }

    fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn progress(&self) -> f64 {
        self.state.borrow().progress
    }

    fn set_progress(&mut self, progress: f64) {
        self.record(TimelineCall::SetProgress(progress));
        self.state.borrow_mut().progress = progress;
    }

    fn duration(&self) -> f64 {
        self.state.borrow().duration
    }

    fn repeat(&self) -> i32 {
        self.state.borrow().repeat
    }

    fn set_repeat(&mut self, repeat: i32) {
        self.record(TimelineCall::SetRepeat(repeat));
        self.state.borrow_mut().repeat = repeat;
    }

    fn yoyo(&self) -> bool {
        self.state.borrow().yoyo
    }

    fn set_yoyo(&mut self, yoyo: bool) {
        self.record(TimelineCall::SetYoyo(yoyo));
        self.state.borrow_mut().yoyo = yoyo;
    }

    fn can_tween_to(&self) -> bool {
        self.state.borrow().can_tween_to
    }

    fn tween_to(&mut self, time: f64) {
        self.record(TimelineCall::TweenTo(time));
        let mut s = self.state.borrow_mut();
        if s.duration > 0.0 {
            s.progress = time / s.duration;
        }
    }

    fn children(&self) -> Vec<ChildTween> {
        self.state.borrow().children.clone()
    }

    fn ease_child_to(&mut self, index: usize, progress: f64, easing: &Easing) {
        self.record(TimelineCall::EaseChild {
            index,
            progress,
            momentum: easing.momentum,
            ease: easing.ease.clone(),
        });
    }

    fn kill(&mut self) {
        self.record(TimelineCall::Kill);
        self.state.borrow_mut().killed = true;
    }
}

// ---------- scrollbar ----------

#[derive(Debug, Default)]
struct ScrollbarState {
    offset: (f64, f64),
    destroyed: bool,
}

#[derive(Clone, Debug, Default)]
pub struct MockScrollbar {
    state: Rc<RefCell<ScrollbarState>>,
}

impl MockScrollbar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the virtual scroll offset the way user input would.
    pub fn scroll_to(&self, x: f64, y: f64) {
        self.state.borrow_mut().offset = (x, y);
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }
}

impl VirtualScrollbar for MockScrollbar {
    fn offset(&self) -> (f64, f64) {
        self.state.borrow().offset
    }

    fn set_position(&mut self, x: f64, y: f64) {
        self.state.borrow_mut().offset = (x, y);
    }

    fn destroy(&mut self) {
        self.state.borrow_mut().destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_finds_attached_nodes_only() {
        let dom = MockDom::new(800.0, 600.0);
        let body = dom.body_node();
        let a = dom.append(body, "section", Some("a"));
        let detached = dom.create_element("section");
        dom.add_class(&a, "hero big");
        dom.add_class(&detached, "hero");
        assert_eq!(dom.query("#a"), vec![a]);
        assert_eq!(dom.query(".hero"), vec![a]);
        assert_eq!(dom.query("section"), vec![a]);
        assert!(!dom.is_attached(&detached));
    }

    #[test]
    fn insert_before_moves_nodes() {
        let dom = MockDom::default();
        let body = dom.body_node();
        let a = dom.append(body, "div", Some("a"));
        let b = dom.append(body, "div", Some("b"));
        dom.insert_before(&body, &b, &a);
        assert_eq!(dom.children(body), vec![b, a]);
        dom.append_child(&b, &a);
        assert_eq!(dom.children(body), vec![b]);
        assert_eq!(dom.parent(&a), Some(b));
        assert!(dom.contains(&body, &a));
    }

    #[test]
    fn offsets_follow_rects_and_scroll() {
        let dom = MockDom::default();
        let body = dom.body_node();
        let wrapper = dom.append(body, "div", None);
        let el = dom.append(wrapper, "div", None);
        dom.set_rect(el, Rect::new(500.0, 10.0, 100.0, 50.0));
        assert_eq!(dom.offset(&wrapper, false).top, 500.0);
        dom.set_scroll_pos(&Container::Window, true, 120.0);
        assert_eq!(dom.offset(&el, true).top, 380.0);
        assert_eq!(dom.offset(&el, false).top, 500.0);
        assert_eq!(dom.height(&wrapper, true, false), 50.0);
    }

    #[test]
    fn inline_styles_shadow_computed_values() {
        let dom = MockDom::default();
        let el = dom.append(dom.body_node(), "div", None);
        assert_eq!(dom.computed_style(&el, "position"), "static");
        dom.set_style(&el, "position", "relative");
        assert_eq!(dom.computed_style(&el, "position"), "relative");
        dom.set_style(&el, "position", "");
        assert_eq!(dom.inline_style(&el, "position"), "");
    }
}
