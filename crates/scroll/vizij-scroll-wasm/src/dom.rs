//! `web-sys` backed document adapter.

use wasm_bindgen::{JsCast, JsError, JsValue, UnwrapThrowExt};
use web_sys::{CssStyleDeclaration, Document, Element, HtmlElement, Window};

use vizij_scroll_core::dom::float_val;
use vizij_scroll_core::{Container, Dom, Offset};

const LOG_TARGET: &str = "vizij_scroll::dom";

#[derive(Clone, Debug)]
pub struct WebDom {
    window: Window,
    document: Document,
}

fn warn_on_err<T>(op: &str, result: Result<T, JsValue>) {
    if let Err(err) = result {
        log::warn!(target: LOG_TARGET, "{op} failed: {err:?}");
    }
}

impl WebDom {
    pub fn new() -> Result<Self, JsError> {
        let window = web_sys::window().ok_or_else(|| JsError::new("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsError::new("window has no document"))?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn computed(&self, node: &Element) -> Option<CssStyleDeclaration> {
        self.window.get_computed_style(node).ok().flatten()
    }

    fn margins(&self, node: &Element, vertical: bool) -> f64 {
        let Some(style) = self.computed(node) else {
            return 0.0;
        };
        let (a, b) = if vertical {
            ("margin-top", "margin-bottom")
        } else {
            ("margin-left", "margin-right")
        };
        let side = |p: &str| float_val(&style.get_property_value(p).unwrap_or_default());
        side(a) + side(b)
    }

    fn dimension(&self, node: &Element, vertical: bool, outer: bool, include_margin: bool) -> f64 {
        let base = if outer {
            match node.dyn_ref::<HtmlElement>() {
                Some(html) if vertical => html.offset_height(),
                Some(html) => html.offset_width(),
                None => 0,
            }
        } else if vertical {
            node.client_height()
        } else {
            node.client_width()
        };
        let mut value = f64::from(base);
        if outer && include_margin {
            value += self.margins(node, vertical);
        }
        value
    }

    fn window_scroll(&self) -> (f64, f64) {
        (
            self.window.scroll_x().unwrap_or(0.0),
            self.window.scroll_y().unwrap_or(0.0),
        )
    }
}

impl Dom for WebDom {
    type Node = Element;

    fn query(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            log::warn!(target: LOG_TARGET, "invalid selector {selector:?}");
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn is_attached(&self, node: &Element) -> bool {
        node.parent_node().is_some()
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn first_child(&self, node: &Element) -> Option<Element> {
        node.first_element_child()
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        ancestor.contains(Some(node.as_ref()))
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn create_div(&self) -> Element {
        self.document.create_element("div").unwrap_throw()
    }

    fn insert_before(&self, parent: &Element, node: &Element, reference: &Element) {
        warn_on_err("insertBefore", parent.insert_before(node, Some(reference.as_ref())));
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        warn_on_err("appendChild", parent.append_child(child));
    }

    fn remove_child(&self, parent: &Element, child: &Element) {
        warn_on_err("removeChild", parent.remove_child(child));
    }

    fn has_attribute(&self, node: &Element, name: &str) -> bool {
        node.has_attribute(name)
    }

    fn get_attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        warn_on_err("setAttribute", node.set_attribute(name, value));
    }

    fn remove_attribute(&self, node: &Element, name: &str) {
        warn_on_err("removeAttribute", node.remove_attribute(name));
    }

    fn add_class(&self, node: &Element, classes: &str) {
        let list = node.class_list();
        for class in classes.split_whitespace() {
            warn_on_err("classList.add", list.add_1(class));
        }
    }

    fn remove_class(&self, node: &Element, classes: &str) {
        let list = node.class_list();
        for class in classes.split_whitespace() {
            warn_on_err("classList.remove", list.remove_1(class));
        }
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn computed_style(&self, node: &Element, property: &str) -> String {
        self.computed(node)
            .and_then(|style| style.get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn inline_style(&self, node: &Element, property: &str) -> String {
        node.dyn_ref::<HtmlElement>()
            .and_then(|html| html.style().get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) {
        let Some(html) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = html.style();
        if value.is_empty() {
            warn_on_err("style.removeProperty", style.remove_property(property));
        } else {
            warn_on_err("style.setProperty", style.set_property(property, value));
        }
    }

    fn offset(&self, node: &Element, relative_to_viewport: bool) -> Offset {
        let rect = node.get_bounding_client_rect();
        let mut offset = Offset {
            top: rect.top(),
            left: rect.left(),
        };
        if !relative_to_viewport {
            let (x, y) = self.window_scroll();
            let (client_left, client_top) = self
                .document
                .document_element()
                .map_or((0, 0), |root| (root.client_left(), root.client_top()));
            offset.top += y - f64::from(client_top);
            offset.left += x - f64::from(client_left);
        }
        offset
    }

    fn width(&self, node: &Element, outer: bool, include_margin: bool) -> f64 {
        self.dimension(node, false, outer, include_margin)
    }

    fn height(&self, node: &Element, outer: bool, include_margin: bool) -> f64 {
        self.dimension(node, true, outer, include_margin)
    }

    fn window_size(&self) -> (f64, f64) {
        let read = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        (
            read(self.window.inner_width()),
            read(self.window.inner_height()),
        )
    }

    fn viewport_size(&self, container: &Container<Element>, vertical: bool) -> f64 {
        match container {
            Container::Window => {
                let (width, height) = self.window_size();
                if vertical {
                    height
                } else {
                    width
                }
            }
            Container::Element(node) => self.dimension(node, vertical, false, false),
        }
    }

    fn scroll_pos(&self, container: &Container<Element>, vertical: bool) -> f64 {
        match container {
            Container::Window => {
                let (x, y) = self.window_scroll();
                if vertical {
                    y
                } else {
                    x
                }
            }
            Container::Element(node) if vertical => f64::from(node.scroll_top()),
            Container::Element(node) => f64::from(node.scroll_left()),
        }
    }

    fn set_scroll_pos(&self, container: &Container<Element>, vertical: bool, pos: f64) {
        match container {
            Container::Window => {
                let (x, y) = self.window_scroll();
                if vertical {
                    self.window.scroll_to_with_x_and_y(x, pos);
                } else {
                    self.window.scroll_to_with_x_and_y(pos, y);
                }
            }
            Container::Element(node) if vertical => node.set_scroll_top(pos.round() as i32),
            Container::Element(node) => node.set_scroll_left(pos.round() as i32),
        }
    }
}
