//! Exported `ScrollScene`.
//!
//! A scene lives in its JS wrapper until it is added to a controller; from
//! then on the controller owns it and the wrapper only keeps its id.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use vizij_scroll_core::{
    ConfigError, Easing, IndicatorOptions, ListenerId, LogLevel, PinSettings, Scene,
    SceneDescriptor, SceneId,
};

use crate::controller::{after_call, Shared, SharedRef};
use crate::convert::{
    config_error, duration_from_js, element_target, from_js_or_default, hook_from_js,
    is_nullish, split_field, to_js,
};
use crate::dom::WebDom;
use crate::outbox::{self, Deferred};
use crate::timeline::JsTimeline;

enum Slot {
    Detached(Scene<WebDom>),
    Attached {
        controller: Weak<RefCell<Shared>>,
        id: SceneId,
    },
    /// Destroyed while attached, or its controller was freed.
    Gone,
}

#[wasm_bindgen]
pub struct ScrollScene {
    id: SceneId,
    slot: RefCell<Slot>,
}

fn owned_by(controller: &Weak<RefCell<Shared>>, shared: &SharedRef) -> bool {
    std::ptr::eq(controller.as_ptr(), Rc::as_ptr(shared))
}

impl ScrollScene {
    pub(crate) fn id_inner(&self) -> SceneId {
        self.id
    }

    /// Runs `f` on the scene wherever it lives. `None` once it is gone.
    fn with_scene<R>(&self, f: impl FnOnce(&mut Scene<WebDom>) -> R) -> Option<R> {
        let mut slot = self.slot.borrow_mut();
        let mut owner = None;
        let out = match &mut *slot {
            Slot::Detached(scene) => Some(f(scene)),
            Slot::Attached { controller, id } => match controller.upgrade() {
                Some(shared) => {
                    let out = {
                        let mut s = shared.borrow_mut();
                        let out = s.core.scene_mut(*id).map(|mut scene| f(&mut scene));
                        out
                    };
                    owner = Some(shared);
                    out
                }
                None => None,
            },
            Slot::Gone => None,
        };
        if let Slot::Attached { id, .. } = &*slot {
            let alive = owner
                .as_ref()
                .is_some_and(|shared| shared.borrow().core.scene(*id).is_some());
            if !alive {
                *slot = Slot::Gone;
            }
        }
        drop(slot);
        match owner {
            Some(shared) => after_call(&shared),
            None => outbox::flush(),
        }
        out
    }

    fn try_with(
        &self,
        f: impl FnOnce(&mut Scene<WebDom>) -> Result<(), ConfigError>,
    ) -> Result<(), JsError> {
        self.with_scene(f)
            .unwrap_or(Ok(()))
            .map_err(config_error)
    }

    /// Moves the scene into `shared`, taking it from a previous controller
    /// if needed. Adding it to its current controller does nothing.
    pub(crate) fn attach_to(&self, shared: &SharedRef) -> bool {
        let mut slot = self.slot.borrow_mut();
        let scene = match std::mem::replace(&mut *slot, Slot::Gone) {
            Slot::Detached(scene) => scene,
            Slot::Attached { controller, id } => {
                if owned_by(&controller, shared) {
                    *slot = Slot::Attached { controller, id };
                    return true;
                }
                let Some(previous) = controller.upgrade() else {
                    return false;
                };
                let removed = previous.borrow_mut().core.remove_scene(id);
                match removed {
                    Some(scene) => scene,
                    None => return false,
                }
            }
            Slot::Gone => return false,
        };
        if scene.is_destroyed() {
            log::warn!(target: "vizij_scroll::wasm", "add_scene: scene {:?} was destroyed", self.id);
            return false;
        }
        let id = shared.borrow_mut().core.add_scene(scene);
        *slot = Slot::Attached {
            controller: Rc::downgrade(shared),
            id,
        };
        true
    }

    /// Takes the scene back out of `shared`; false if `shared` does not own
    /// it.
    pub(crate) fn detach_from(&self, shared: &SharedRef) -> bool {
        let mut slot = self.slot.borrow_mut();
        let id = match &*slot {
            Slot::Attached { controller, id } if owned_by(controller, shared) => *id,
            _ => return false,
        };
        let removed = shared.borrow_mut().core.remove_scene(id);
        match removed {
            Some(scene) => {
                *slot = Slot::Detached(scene);
                true
            }
            None => {
                *slot = Slot::Gone;
                false
            }
        }
    }

    fn controller(&self) -> Option<SharedRef> {
        match &*self.slot.borrow() {
            Slot::Attached { controller, .. } => controller.upgrade(),
            _ => None,
        }
    }
}

#[wasm_bindgen]
impl ScrollScene {
    /// Create a detached scene. `options` matches `SceneDescriptor`;
    /// `triggerElement` may also be an element and `duration` a function
    /// returning pixels. Example:
    ///   new ScrollScene({ triggerElement: "#hero", duration: "50%" })
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<ScrollScene, JsError> {
        crate::install_hooks();

        let (rest, duration) = split_field(&options, "duration");
        let (rest, trigger) = split_field(&rest, "triggerElement");
        let mut descriptor: SceneDescriptor = from_js_or_default(rest, "scene options")?;
        descriptor.trigger_element = trigger.as_string();
        let mut scene =
            Scene::from_descriptor(WebDom::new()?, &descriptor).map_err(config_error)?;
        if !is_nullish(&duration) {
            scene
                .set_duration(duration_from_js(&duration)?)
                .map_err(config_error)?;
        }
        if trigger.as_string().is_none() && !is_nullish(&trigger) {
            let target = element_target(&trigger)
                .ok_or_else(|| JsError::new("triggerElement: unsupported value"))?;
            scene
                .set_trigger_element(Some(target))
                .map_err(config_error)?;
        }
        Ok(ScrollScene {
            id: scene.id(),
            slot: RefCell::new(Slot::Detached(scene)),
        })
    }

    #[wasm_bindgen(js_name = id)]
    pub fn id(&self) -> u32 {
        self.id.0
    }

    /// Apply a partial options object; stops at the first invalid value.
    #[wasm_bindgen(js_name = apply)]
    pub fn apply(&self, options: JsValue) -> Result<(), JsError> {
        let descriptor: SceneDescriptor = from_js_or_default(options, "scene options")?;
        self.try_with(|scene| scene.apply_descriptor(&descriptor))
    }

    #[wasm_bindgen(js_name = name)]
    pub fn name(&self) -> Option<String> {
        self.with_scene(|scene| scene.name().map(str::to_owned))
            .flatten()
    }

    #[wasm_bindgen(js_name = is_attached)]
    pub fn is_attached(&self) -> bool {
        self.with_scene(|scene| scene.is_attached())
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = is_destroyed)]
    pub fn is_destroyed(&self) -> bool {
        self.with_scene(|scene| scene.is_destroyed())
            .unwrap_or(true)
    }

    #[wasm_bindgen(js_name = progress)]
    pub fn progress(&self) -> f64 {
        self.with_scene(|scene| scene.progress()).unwrap_or(0.0)
    }

    /// Drive the scene by hand, e.g. while its controller is disabled.
    #[wasm_bindgen(js_name = set_progress)]
    pub fn set_progress(&self, progress: f64) {
        self.with_scene(|scene| scene.set_progress(progress));
    }

    /// "BEFORE", "DURING" or "AFTER".
    #[wasm_bindgen(js_name = state)]
    pub fn state(&self) -> String {
        self.with_scene(|scene| scene.state().name())
            .unwrap_or("BEFORE")
            .to_owned()
    }

    /// `{ start, end }` in container scroll coordinates.
    #[wasm_bindgen(js_name = scroll_offset)]
    pub fn scroll_offset(&self) -> Result<JsValue, JsError> {
        let offset = self.with_scene(|scene| scene.scroll_offset()).unwrap_or_default();
        to_js(&offset, "scroll_offset")
    }

    #[wasm_bindgen(js_name = trigger_position)]
    pub fn trigger_position(&self) -> f64 {
        self.with_scene(|scene| scene.trigger_position())
            .unwrap_or(0.0)
    }

    #[wasm_bindgen(js_name = duration)]
    pub fn duration(&self) -> f64 {
        self.with_scene(|scene| scene.duration()).unwrap_or(0.0)
    }

    /// Pixels, `"NN%"` of the viewport or a function returning pixels.
    #[wasm_bindgen(js_name = set_duration)]
    pub fn set_duration(&self, duration: JsValue) -> Result<(), JsError> {
        let duration = duration_from_js(&duration)?;
        self.try_with(|scene| scene.set_duration(duration))
    }

    #[wasm_bindgen(js_name = offset)]
    pub fn offset(&self) -> f64 {
        self.with_scene(|scene| scene.offset()).unwrap_or(0.0)
    }

    #[wasm_bindgen(js_name = set_offset)]
    pub fn set_offset(&self, offset: f64) -> Result<(), JsError> {
        self.try_with(|scene| scene.set_offset(offset))
    }

    #[wasm_bindgen(js_name = trigger_hook)]
    pub fn trigger_hook(&self) -> f64 {
        self.with_scene(|scene| scene.trigger_hook()).unwrap_or(0.5)
    }

    /// A number in [0, 1] or "onEnter" / "onCenter" / "onLeave".
    #[wasm_bindgen(js_name = set_trigger_hook)]
    pub fn set_trigger_hook(&self, hook: JsValue) -> Result<(), JsError> {
        let hook = hook_from_js(&hook)?;
        self.try_with(|scene| scene.set_trigger_hook(hook))
    }

    #[wasm_bindgen(js_name = trigger_element)]
    pub fn trigger_element(&self) -> Option<Element> {
        self.with_scene(|scene| scene.trigger_element().cloned())
            .flatten()
    }

    /// Selector or element; `null` clears it.
    #[wasm_bindgen(js_name = set_trigger_element)]
    pub fn set_trigger_element(&self, target: JsValue) -> Result<(), JsError> {
        let target = if is_nullish(&target) {
            None
        } else {
            Some(element_target(&target).ok_or_else(|| {
                JsError::new("triggerElement: unsupported value")
            })?)
        };
        self.try_with(|scene| scene.set_trigger_element(target))
    }

    #[wasm_bindgen(js_name = reverse)]
    pub fn reverse(&self) -> bool {
        self.with_scene(|scene| scene.reverse()).unwrap_or(true)
    }

    #[wasm_bindgen(js_name = set_reverse)]
    pub fn set_reverse(&self, reverse: bool) {
        self.with_scene(|scene| scene.set_reverse(reverse));
    }

    #[wasm_bindgen(js_name = tween_changes)]
    pub fn tween_changes(&self) -> bool {
        self.with_scene(|scene| scene.tween_changes())
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = set_tween_changes)]
    pub fn set_tween_changes(&self, tween_changes: bool) {
        self.with_scene(|scene| scene.set_tween_changes(tween_changes));
    }

    #[wasm_bindgen(js_name = enabled)]
    pub fn enabled(&self) -> bool {
        self.with_scene(|scene| scene.enabled()).unwrap_or(false)
    }

    #[wasm_bindgen(js_name = set_enabled)]
    pub fn set_enabled(&self, enabled: bool) {
        self.with_scene(|scene| scene.set_enabled(enabled));
    }

    #[wasm_bindgen(js_name = log_level)]
    pub fn log_level(&self) -> u8 {
        self.with_scene(|scene| i64::from(scene.log_level()) as u8)
            .unwrap_or(0)
    }

    #[wasm_bindgen(js_name = set_log_level)]
    pub fn set_log_level(&self, level: i32) -> Result<(), JsError> {
        let level = LogLevel::try_from(i64::from(level)).map_err(config_error)?;
        self.with_scene(|scene| scene.set_log_level(level));
        Ok(())
    }

    /// Re-evaluate progress; on the next frame unless `immediately`.
    #[wasm_bindgen(js_name = update)]
    pub fn update(&self, immediately: bool) {
        self.with_scene(|scene| scene.update(immediately));
    }

    /// Re-read the dynamic duration and trigger position.
    #[wasm_bindgen(js_name = refresh)]
    pub fn refresh(&self) {
        self.with_scene(|scene| scene.refresh());
    }

    /// Detach from the current controller; the scene stays usable.
    #[wasm_bindgen(js_name = remove)]
    pub fn remove(&self) -> bool {
        let Some(shared) = self.controller() else {
            return false;
        };
        let removed = self.detach_from(&shared);
        after_call(&shared);
        removed
    }

    #[wasm_bindgen(js_name = destroy)]
    pub fn destroy(&self, reset: bool) {
        self.with_scene(|scene| scene.destroy(reset));
    }

    /// Pin `target` for the scene's duration. `settings` matches
    /// `PinSettings`, e.g. `{ pushFollowers: false, spacerClass: "spacer" }`.
    #[wasm_bindgen(js_name = set_pin)]
    pub fn set_pin(&self, target: JsValue, settings: JsValue) -> Result<bool, JsError> {
        let target =
            element_target(&target).ok_or_else(|| JsError::new("setPin: unsupported target"))?;
        let settings: PinSettings = from_js_or_default(settings, "pin settings")?;
        Ok(self
            .with_scene(|scene| scene.set_pin(target, settings))
            .unwrap_or(false))
    }

    #[wasm_bindgen(js_name = remove_pin)]
    pub fn remove_pin(&self, reset: bool) {
        self.with_scene(|scene| scene.remove_pin(reset));
    }

    /// Bind a GSAP-style timeline. `easing` is optional
    /// `{ momentum, ease }` for eased child catch-up.
    #[wasm_bindgen(js_name = set_tween)]
    pub fn set_tween(&self, timeline: JsValue, easing: JsValue) -> Result<(), JsError> {
        let timeline = JsTimeline::new(timeline)?;
        let easing: Option<Easing> = from_js_or_default(easing, "easing")?;
        self.with_scene(|scene| scene.set_tween(Box::new(timeline), easing));
        Ok(())
    }

    #[wasm_bindgen(js_name = remove_tween)]
    pub fn remove_tween(&self, reset: bool) {
        self.with_scene(|scene| scene.remove_tween(reset));
    }

    /// Add space-separated `classes` to `target` while the scene is active.
    #[wasm_bindgen(js_name = set_class_toggle)]
    pub fn set_class_toggle(&self, target: JsValue, classes: &str) -> Result<bool, JsError> {
        let target = element_target(&target)
            .ok_or_else(|| JsError::new("setClassToggle: unsupported target"))?;
        Ok(self
            .with_scene(|scene| scene.set_class_toggle(target, classes))
            .unwrap_or(false))
    }

    #[wasm_bindgen(js_name = remove_class_toggle)]
    pub fn remove_class_toggle(&self, reset: bool) {
        self.with_scene(|scene| scene.remove_class_toggle(reset));
    }

    #[wasm_bindgen(js_name = add_indicators)]
    pub fn add_indicators(&self, options: JsValue) -> Result<(), JsError> {
        let options: IndicatorOptions = from_js_or_default(options, "indicator options")?;
        self.with_scene(|scene| scene.add_indicators(options));
        Ok(())
    }

    #[wasm_bindgen(js_name = remove_indicators)]
    pub fn remove_indicators(&self) {
        self.with_scene(|scene| scene.remove_indicators());
    }

    /// Listen for space-separated events (`"enter leave.myns"`). The
    /// callback receives `{ scene, kind, payload }`. Returns listener ids.
    #[wasm_bindgen(js_name = on)]
    pub fn on(&self, names: &str, callback: Function) -> Vec<u32> {
        self.with_scene(move |scene| {
            scene.on_named(names, move |event| {
                outbox::post(Deferred::Event {
                    callback: callback.clone(),
                    event: event.clone(),
                });
            })
        })
        .unwrap_or_default()
        .into_iter()
        .map(|id| id.0)
        .collect()
    }

    /// Remove listeners by `"name"`, `"name.ns"`, `"*.ns"` or `"*.*"`.
    #[wasm_bindgen(js_name = off)]
    pub fn off(&self, names: &str) -> u32 {
        self.with_scene(|scene| scene.off_named(names))
            .unwrap_or(0) as u32
    }

    #[wasm_bindgen(js_name = off_listener)]
    pub fn off_listener(&self, id: u32) -> bool {
        self.with_scene(|scene| scene.off(ListenerId(id)))
            .unwrap_or(false)
    }
}
