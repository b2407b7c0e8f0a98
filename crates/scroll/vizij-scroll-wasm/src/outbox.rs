//! Deferred JS callbacks.
//!
//! Core listeners run while a controller is mutably borrowed. JS callbacks
//! may call back into the same controller, so they are queued here and the
//! exported entry points deliver them once the borrow is released.

use std::cell::RefCell;

use js_sys::Function;
use serde_wasm_bindgen as swb;
use wasm_bindgen::JsValue;

use vizij_scroll_core::SceneEvent;

const LOG_TARGET: &str = "vizij_scroll::js";

pub(crate) enum Deferred {
    Event { callback: Function, event: SceneEvent },
    Scroll { handler: Function, pos: f64 },
}

thread_local! {
    static OUTBOX: RefCell<Vec<Deferred>> = const { RefCell::new(Vec::new()) };
}

pub(crate) fn post(item: Deferred) {
    OUTBOX.with(|outbox| outbox.borrow_mut().push(item));
}

/// Delivers everything queued, including what the callbacks queue.
pub(crate) fn flush() {
    loop {
        let batch = OUTBOX.with(|outbox| std::mem::take(&mut *outbox.borrow_mut()));
        if batch.is_empty() {
            return;
        }
        for item in batch {
            item.deliver();
        }
    }
}

impl Deferred {
    fn deliver(self) {
        let result = match self {
            Deferred::Event { callback, event } => match swb::to_value(&event) {
                Ok(value) => callback.call1(&JsValue::UNDEFINED, &value),
                Err(err) => {
                    log::error!(target: LOG_TARGET, "event serialization failed: {err}");
                    return;
                }
            },
            Deferred::Scroll { handler, pos } => handler.call1(&JsValue::UNDEFINED, &pos.into()),
        };
        if let Err(err) = result {
            log::error!(target: LOG_TARGET, "callback threw: {err:?}");
        }
    }
}
