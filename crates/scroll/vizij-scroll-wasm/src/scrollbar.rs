use js_sys::{Function, Reflect};
use wasm_bindgen::{JsError, JsValue};

use vizij_scroll_core::VirtualScrollbar;

use crate::convert::{get_f64, has_method, invoke};

/// smooth-scrollbar style instance: `offset.{x,y}`, `setPosition`,
/// `addListener` / `removeListener` and `destroy`.
#[derive(Debug)]
pub struct JsScrollbar {
    inner: JsValue,
    listener: Option<Function>,
}

impl JsScrollbar {
    pub fn new(inner: JsValue) -> Result<Self, JsError> {
        if !has_method(&inner, "setPosition") || !has_method(&inner, "addListener") {
            return Err(JsError::new("smoothScrolling: object is not a scrollbar"));
        }
        Ok(Self {
            inner,
            listener: None,
        })
    }

    /// Registers `listener` for scroll notifications; removed on destroy.
    pub(crate) fn listen(&mut self, listener: Function) {
        invoke(&self.inner, "addListener", &[listener.clone().into()]);
        self.listener = Some(listener);
    }
}

impl VirtualScrollbar for JsScrollbar {
    fn offset(&self) -> (f64, f64) {
        let Ok(offset) = Reflect::get(&self.inner, &JsValue::from_str("offset")) else {
            return (0.0, 0.0);
        };
        (
            get_f64(&offset, "x").unwrap_or(0.0),
            get_f64(&offset, "y").unwrap_or(0.0),
        )
    }

    fn set_position(&mut self, x: f64, y: f64) {
        invoke(&self.inner, "setPosition", &[x.into(), y.into()]);
    }

    fn destroy(&mut self) {
        if let Some(listener) = self.listener.take() {
            invoke(&self.inner, "removeListener", &[listener.into()]);
        }
        invoke(&self.inner, "destroy", &[]);
    }
}
