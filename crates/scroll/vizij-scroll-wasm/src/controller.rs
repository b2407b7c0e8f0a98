//! Exported `ScrollController`: browser scheduling around the core
//! controller.
//!
//! The core never schedules anything itself. This wrapper owns the
//! animation-frame request, the refresh timer and the DOM listeners, and
//! forwards each of them into [`Controller`] calls.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Function;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget, WheelEvent};

use vizij_scroll_core::{
    Container, ContainerEvent, Controller, ControllerOptions, LogLevel, ScrollTarget, WindowEvent,
};

use crate::convert::{config_error, element_target, from_js_or_default, split_field, to_js};
use crate::dom::WebDom;
use crate::outbox::{self, Deferred};
use crate::scene::ScrollScene;
use crate::scrollbar::JsScrollbar;

const LOG_TARGET: &str = "vizij_scroll::wasm";

type EventHandler = fn(&mut Controller<WebDom>, &Event);

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

pub(crate) struct Shared {
    pub(crate) core: Controller<WebDom>,
    frame: Option<i32>,
    timer: Option<i32>,
    on_frame: Option<Closure<dyn FnMut(f64)>>,
    on_timer: Option<Closure<dyn FnMut()>>,
    listeners: Vec<Listener>,
    on_scrollbar: Option<Closure<dyn FnMut(JsValue)>>,
}

pub(crate) type SharedRef = Rc<RefCell<Shared>>;

impl Shared {
    fn teardown(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(handle) = self.frame.take() {
            let _ = window.cancel_animation_frame(handle);
        }
        if let Some(handle) = self.timer.take() {
            window.clear_timeout_with_handle(handle);
        }
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.kind,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
    }
}

/// Delivers queued JS callbacks, then asks for a frame if the core has
/// pending work. Every exported entry point ends here.
pub(crate) fn after_call(shared: &SharedRef) {
    outbox::flush();
    request_frame(shared);
}

fn request_frame(shared: &SharedRef) {
    let mut guard = shared.borrow_mut();
    let s = &mut *guard;
    if s.frame.is_some() || !s.core.needs_frame() {
        return;
    }
    let callback = s.on_frame.get_or_insert_with(|| {
        let weak = Rc::downgrade(shared);
        Closure::new(move |_ts: f64| {
            if let Some(shared) = weak.upgrade() {
                run_frame(&shared);
            }
        })
    });
    match s
        .core
        .dom()
        .window()
        .request_animation_frame(callback.as_ref().unchecked_ref())
    {
        Ok(handle) => s.frame = Some(handle),
        Err(err) => log::error!(target: LOG_TARGET, "requestAnimationFrame failed: {err:?}"),
    }
}

fn run_frame(shared: &SharedRef) {
    {
        let mut s = shared.borrow_mut();
        s.frame = None;
        s.core.on_animation_frame();
    }
    after_call(shared);
}

fn schedule_refresh(shared: &SharedRef) {
    let mut guard = shared.borrow_mut();
    let s = &mut *guard;
    let Some(interval) = s.core.refresh_interval() else {
        return;
    };
    if s.timer.is_some() {
        return;
    }
    let callback = s.on_timer.get_or_insert_with(|| {
        let weak = Rc::downgrade(shared);
        Closure::new(move || {
            if let Some(shared) = weak.upgrade() {
                run_refresh(&shared);
            }
        })
    });
    match s
        .core
        .dom()
        .window()
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            interval.round() as i32,
        ) {
        Ok(handle) => s.timer = Some(handle),
        Err(err) => log::error!(target: LOG_TARGET, "setTimeout failed: {err:?}"),
    }
}

fn run_refresh(shared: &SharedRef) {
    {
        let mut s = shared.borrow_mut();
        s.timer = None;
        s.core.refresh();
    }
    after_call(shared);
    schedule_refresh(shared);
}

/// Runs `f` against the core unless the controller is already borrowed
/// further up the stack.
fn dispatch(shared: &SharedRef, f: impl FnOnce(&mut Controller<WebDom>)) {
    match shared.try_borrow_mut() {
        Ok(mut s) => f(&mut s.core),
        Err(_) => {
            log::debug!(target: LOG_TARGET, "controller busy; event dropped");
            return;
        }
    }
    after_call(shared);
}

fn listen(shared: &SharedRef, target: EventTarget, kind: &'static str, handler: EventHandler) {
    let weak: Weak<RefCell<Shared>> = Rc::downgrade(shared);
    let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Some(shared) = weak.upgrade() {
            dispatch(&shared, |core| handler(core, &event));
        }
    });
    if let Err(err) =
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
    {
        log::error!(target: LOG_TARGET, "addEventListener({kind}) failed: {err:?}");
        return;
    }
    shared.borrow_mut().listeners.push(Listener {
        target,
        kind,
        callback,
    });
}

fn on_container_scroll(core: &mut Controller<WebDom>, _event: &Event) {
    core.handle_container_event(ContainerEvent::Scroll);
}

fn on_container_resize(core: &mut Controller<WebDom>, _event: &Event) {
    core.handle_container_event(ContainerEvent::Resize);
}

fn on_window_scroll(core: &mut Controller<WebDom>, _event: &Event) {
    core.handle_window_event(WindowEvent::Scroll);
}

fn on_window_resize(core: &mut Controller<WebDom>, _event: &Event) {
    core.handle_window_event(WindowEvent::Resize);
}

// Pinned elements sit outside an element container while fixed; their
// wheel input is forwarded to the container.
fn on_wheel(core: &mut Controller<WebDom>, event: &Event) {
    let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
        return;
    };
    let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return;
    };
    let delta = if core.vertical() {
        wheel.delta_y()
    } else {
        wheel.delta_x()
    };
    if core.handle_pin_wheel(&target, delta) {
        event.prevent_default();
    }
}

#[wasm_bindgen]
pub struct ScrollController {
    shared: SharedRef,
}

impl ScrollController {
    fn with_core<R>(&self, f: impl FnOnce(&mut Controller<WebDom>) -> R) -> R {
        let out = f(&mut self.shared.borrow_mut().core);
        after_call(&self.shared);
        out
    }
}

#[wasm_bindgen]
impl ScrollController {
    /// Create a controller. `options` matches `ControllerOptions`; its
    /// `container` may be a selector or an element. Example:
    ///   new ScrollController({ container: "#scroller", refreshInterval: 0 })
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<ScrollController, JsError> {
        crate::install_hooks();

        let (rest, container) = split_field(&options, "container");
        let mut opts: ControllerOptions = from_js_or_default(rest, "controller options")?;
        let dom = WebDom::new()?;
        let window = dom.window().clone();
        let core = match container.dyn_into::<Element>() {
            Ok(element) => Controller::new(dom, Container::Element(element), opts),
            Err(other) => {
                opts.container = other.as_string();
                Controller::from_options(dom, opts)
            }
        }
        .map_err(config_error)?;

        let container = core.container().clone();
        let shared = Rc::new(RefCell::new(Shared {
            core,
            frame: None,
            timer: None,
            on_frame: None,
            on_timer: None,
            listeners: Vec::new(),
            on_scrollbar: None,
        }));
        match container {
            Container::Window => {
                listen(&shared, window.clone().into(), "scroll", on_container_scroll);
                listen(&shared, window.into(), "resize", on_container_resize);
            }
            Container::Element(element) => {
                listen(&shared, element.clone().into(), "scroll", on_container_scroll);
                listen(&shared, element.clone().into(), "resize", on_container_resize);
                listen(&shared, element.into(), "wheel", on_wheel);
                listen(&shared, window.clone().into(), "scroll", on_window_scroll);
                listen(&shared, window.into(), "resize", on_window_resize);
            }
        }
        schedule_refresh(&shared);
        after_call(&shared);
        Ok(ScrollController { shared })
    }

    /// Attach a scene. A scene owned by another controller moves here.
    #[wasm_bindgen(js_name = add_scene)]
    pub fn add_scene(&self, scene: &ScrollScene) -> bool {
        let added = scene.attach_to(&self.shared);
        after_call(&self.shared);
        added
    }

    /// Detach a scene owned by this controller. It keeps its state and can
    /// be added again.
    #[wasm_bindgen(js_name = remove_scene)]
    pub fn remove_scene(&self, scene: &ScrollScene) -> bool {
        let removed = scene.detach_from(&self.shared);
        after_call(&self.shared);
        removed
    }

    #[wasm_bindgen(js_name = update_scene)]
    pub fn update_scene(&self, scene: &ScrollScene, immediately: bool) {
        self.with_core(|core| core.update_scene(scene.id_inner(), immediately));
    }

    /// Update every scene on the next frame, or now when `immediately`.
    #[wasm_bindgen(js_name = update)]
    pub fn update(&self, immediately: bool) {
        self.with_core(|core| core.update(immediately));
    }

    /// Scroll to a position (number), an element (selector or element) or
    /// install a function that performs every later scroll itself.
    #[wasm_bindgen(js_name = scroll_to)]
    pub fn scroll_to(&self, target: JsValue) -> bool {
        let target: ScrollTarget<Element> = if let Some(f) = target.dyn_ref::<Function>() {
            let handler = f.clone();
            ScrollTarget::Handler(Box::new(move |pos: f64| {
                outbox::post(Deferred::Scroll {
                    handler: handler.clone(),
                    pos,
                });
            }))
        } else if let Some(pos) = target.as_f64() {
            ScrollTarget::Offset(pos)
        } else if let Some(target) = element_target(&target) {
            ScrollTarget::Element(target)
        } else {
            log::error!(target: LOG_TARGET, "scroll_to: unsupported target {target:?}");
            return false;
        };
        self.with_core(|core| core.scroll_to(target))
    }

    /// Scroll to the start of a scene owned by this controller.
    #[wasm_bindgen(js_name = scroll_to_scene)]
    pub fn scroll_to_scene(&self, scene: &ScrollScene) -> bool {
        self.with_core(|core| core.scroll_to(scene.id_inner()))
    }

    #[wasm_bindgen(js_name = scroll_pos)]
    pub fn scroll_pos(&self) -> f64 {
        self.shared.borrow().core.scroll_pos()
    }

    /// Replace how the scroll position is read; `undefined` restores the
    /// container's own position.
    #[wasm_bindgen(js_name = set_scroll_pos_fn)]
    pub fn set_scroll_pos_fn(&self, getter: Option<Function>) {
        let getter = getter.map(|f| {
            Box::new(move || {
                f.call0(&JsValue::UNDEFINED)
                    .ok()
                    .and_then(|v| v.as_f64())
                    .unwrap_or(0.0)
            }) as Box<dyn Fn() -> f64>
        });
        self.with_core(|core| core.set_scroll_pos_fn(getter));
    }

    /// Snapshot as `{ size, vertical, scrollPos, scrollDirection,
    /// isDocument, enabled, sceneCount }`.
    #[wasm_bindgen(js_name = info)]
    pub fn info(&self) -> Result<JsValue, JsError> {
        to_js(&self.shared.borrow().core.info(), "info")
    }

    #[wasm_bindgen(js_name = enabled)]
    pub fn enabled(&self) -> bool {
        self.shared.borrow().core.enabled()
    }

    #[wasm_bindgen(js_name = set_enabled)]
    pub fn set_enabled(&self, enabled: bool) {
        self.with_core(|core| core.set_enabled(enabled));
    }

    #[wasm_bindgen(js_name = log_level)]
    pub fn log_level(&self) -> u8 {
        i64::from(self.shared.borrow().core.log_level()) as u8
    }

    #[wasm_bindgen(js_name = set_log_level)]
    pub fn set_log_level(&self, level: i32) -> Result<(), JsError> {
        let level = LogLevel::try_from(i64::from(level)).map_err(config_error)?;
        self.with_core(|core| core.set_log_level(level));
        Ok(())
    }

    /// Route scrolling through a smooth-scrollbar style instance.
    #[wasm_bindgen(js_name = attach_scrollbar)]
    pub fn attach_scrollbar(&self, instance: JsValue) -> Result<(), JsError> {
        let mut scrollbar = JsScrollbar::new(instance)?;
        let weak = Rc::downgrade(&self.shared);
        let callback = Closure::<dyn FnMut(JsValue)>::new(move |_status: JsValue| {
            if let Some(shared) = weak.upgrade() {
                dispatch(&shared, |core| {
                    core.handle_container_event(ContainerEvent::Scroll)
                });
            }
        });
        scrollbar.listen(callback.as_ref().unchecked_ref::<Function>().clone());
        {
            let mut s = self.shared.borrow_mut();
            s.core.attach_scrollbar(Box::new(scrollbar));
            s.on_scrollbar = Some(callback);
        }
        after_call(&self.shared);
        Ok(())
    }

    /// Destroy every scene (resetting them when `reset`), remove all
    /// listeners and stop scheduling.
    #[wasm_bindgen(js_name = destroy)]
    pub fn destroy(&self, reset: bool) {
        {
            let mut guard = self.shared.borrow_mut();
            let s = &mut *guard;
            s.core.destroy(reset);
            s.teardown();
        }
        outbox::flush();
    }
}

impl Drop for ScrollController {
    fn drop(&mut self) {
        // Registered closures must not outlive the controller they call into.
        if let Ok(mut s) = self.shared.try_borrow_mut() {
            s.teardown();
        }
    }
}
