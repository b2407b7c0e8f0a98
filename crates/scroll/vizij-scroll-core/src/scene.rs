//! Scene: one scroll-triggered interval and its progress state machine.
//!
//! A scene turns the controller's scroll position into a progress value in
//! `[0, 1]`, derives its [`SceneState`] from it and fires lifecycle events
//! when either changes. Bindings (pin, tween, class toggle, indicators) react
//! to those events before user listeners see them.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::class_toggle::ClassToggle;
use crate::controller::ControllerContext;
use crate::dom::{Dom, ElementTarget, PIN_SPACER_ATTRIBUTE};
use crate::duration::Duration;
use crate::error::ConfigError;
use crate::events::{
    EventFilter, EventPayload, EventSelector, Listeners, OptionName, OptionValue, SceneEvent,
    SceneEventKind, ShiftReason,
};
use crate::ids::{ControllerId, ListenerId, SceneId};
use crate::indicators::Indicators;
use crate::log_level::{self, LogLevel};
use crate::options::{resolve_trigger_hook, HookValue, SceneDescriptor, SceneOptions};
use crate::pin::PinBinding;
use crate::state::{SceneState, ScrollDirection};
use crate::tween::{Easing, Timeline, TweenBinding};

const LOG_TARGET: &str = "vizij_scroll::scene";

/// Absolute scroll coordinates at which a scene starts and ends.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollOffset {
    pub start: f64,
    pub end: f64,
}

#[derive(Debug)]
pub struct Scene<D: Dom> {
    pub(crate) id: SceneId,
    pub(crate) dom: D,
    pub(crate) name: Option<String>,

    // options
    pub(crate) duration_setting: Duration,
    pub(crate) duration: f64,
    pub(crate) offset: f64,
    pub(crate) trigger_element: Option<D::Node>,
    pub(crate) trigger_hook: f64,
    pub(crate) reverse: bool,
    pub(crate) tween_changes: bool,
    pub(crate) log_level: LogLevel,
    pub(crate) enabled: bool,

    // derived
    pub(crate) trigger_pos: f64,
    pub(crate) scroll_offset: ScrollOffset,
    pub(crate) progress: f64,
    pub(crate) state: SceneState,

    pub(crate) ctx: Option<ControllerContext<D::Node>>,
    pending_update: bool,
    shifted: bool,
    destroyed: bool,

    pub(crate) pin: Option<PinBinding<D::Node>>,
    pub(crate) tween: Option<TweenBinding>,
    pub(crate) class_toggle: Option<ClassToggle<D::Node>>,
    pub(crate) indicators: Option<Indicators<D::Node>>,
    listeners: Listeners,
}

impl<D: Dom> Scene<D> {
    pub fn new(dom: D, options: SceneOptions<D::Node>) -> Result<Self, ConfigError> {
        let duration = options.duration.resolve(None)?;
        let trigger_hook = resolve_trigger_hook(&options.trigger_hook)?;
        if !options.offset.is_finite() {
            return Err(ConfigError::InvalidOffset {
                value: options.offset.to_string(),
            });
        }
        let trigger_element = match &options.trigger_element {
            Some(target) => Some(resolve_trigger_element(&dom, target, options.log_level)?),
            None => None,
        };
        let mut scene = Self {
            id: SceneId::next(),
            dom,
            name: options.name,
            duration_setting: options.duration,
            duration,
            offset: options.offset,
            trigger_element,
            trigger_hook,
            reverse: options.reverse,
            tween_changes: options.tween_changes,
            log_level: options.log_level,
            enabled: options.enabled,
            trigger_pos: 0.0,
            scroll_offset: ScrollOffset::default(),
            progress: 0.0,
            state: SceneState::Before,
            ctx: None,
            pending_update: false,
            shifted: false,
            destroyed: false,
            pin: None,
            tween: None,
            class_toggle: None,
            indicators: None,
            listeners: Listeners::new(),
        };
        scene.update_scroll_offset();
        Ok(scene)
    }

    /// Scene from a JSON-shaped descriptor, including its pin, class toggle
    /// and indicator bindings.
    pub fn from_descriptor(dom: D, descriptor: &SceneDescriptor) -> Result<Self, ConfigError> {
        let mut scene = Self::new(dom, descriptor.to_options()?)?;
        scene.apply_bindings(descriptor);
        Ok(scene)
    }

    /// Applies every option present in `descriptor` through the validating
    /// setters, then its bindings. Stops at the first invalid option.
    pub fn apply_descriptor(&mut self, descriptor: &SceneDescriptor) -> Result<(), ConfigError> {
        if let Some(name) = &descriptor.name {
            self.name = Some(name.clone());
        }
        if let Some(duration) = &descriptor.duration {
            self.set_duration(duration.to_duration()?)?;
        }
        if let Some(offset) = &descriptor.offset {
            self.set_offset(offset.to_offset()?)?;
        }
        if let Some(selector) = &descriptor.trigger_element {
            self.set_trigger_element(Some(ElementTarget::Selector(selector.clone())))?;
        }
        if let Some(hook) = &descriptor.trigger_hook {
            self.set_trigger_hook(hook.clone())?;
        }
        if let Some(reverse) = &descriptor.reverse {
            self.set_reverse(reverse.to_bool());
        }
        if let Some(tween_changes) = &descriptor.tween_changes {
            self.set_tween_changes(tween_changes.to_bool());
        }
        if let Some(level) = descriptor.log_level {
            self.set_log_level(LogLevel::try_from(level)?);
        }
        if let Some(enabled) = &descriptor.enabled {
            self.set_enabled(enabled.to_bool());
        }
        self.apply_bindings(descriptor);
        Ok(())
    }

    fn apply_bindings(&mut self, descriptor: &SceneDescriptor) {
        if let Some(pin) = &descriptor.pin {
            self.set_pin(ElementTarget::Selector(pin.element.clone()), pin.settings());
        }
        if let Some(toggle) = &descriptor.class_toggle {
            self.set_class_toggle(
                ElementTarget::Selector(toggle.element.clone()),
                &toggle.classes,
            );
        }
        if let Some(indicators) = &descriptor.indicators {
            self.add_indicators(indicators.clone());
        }
    }

    // ---------- getters ----------

    #[inline]
    pub fn id(&self) -> SceneId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn controller_id(&self) -> Option<ControllerId> {
        self.ctx.as_ref().map(|ctx| ctx.controller)
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.ctx.is_some()
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Resolved duration in pixels.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn duration_setting(&self) -> &Duration {
        &self.duration_setting
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn trigger_element(&self) -> Option<&D::Node> {
        self.trigger_element.as_ref()
    }

    #[inline]
    pub fn trigger_hook(&self) -> f64 {
        self.trigger_hook
    }

    #[inline]
    pub fn reverse(&self) -> bool {
        self.reverse
    }

    #[inline]
    pub fn tween_changes(&self) -> bool {
        self.tween_changes
    }

    #[inline]
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[inline]
    pub fn state(&self) -> SceneState {
        self.state
    }

    #[inline]
    pub fn scroll_offset(&self) -> ScrollOffset {
        self.scroll_offset
    }

    /// Trigger element position inside the scroll content, 0 without one.
    #[inline]
    pub fn trigger_position(&self) -> f64 {
        self.trigger_pos
    }

    pub fn has_pin(&self) -> bool {
        self.pin.is_some()
    }

    pub fn pin_element(&self) -> Option<&D::Node> {
        self.pin.as_ref().map(|pin| &pin.element)
    }

    pub fn pin_spacer(&self) -> Option<&D::Node> {
        self.pin.as_ref().map(|pin| &pin.spacer)
    }

    pub fn has_tween(&self) -> bool {
        self.tween.is_some()
    }

    // ---------- option setters ----------

    pub fn set_duration(&mut self, duration: Duration) -> Result<(), ConfigError> {
        let value = duration.resolve(self.viewport_size())?;
        let changed = value != self.duration;
        self.duration_setting = duration;
        self.duration = value;
        if changed {
            self.option_changed(OptionName::Duration, OptionValue::Number(value));
        }
        Ok(())
    }

    pub fn set_offset(&mut self, offset: f64) -> Result<(), ConfigError> {
        if !offset.is_finite() {
            return Err(ConfigError::InvalidOffset {
                value: offset.to_string(),
            });
        }
        if offset != self.offset {
            self.offset = offset;
            self.option_changed(OptionName::Offset, OptionValue::Number(offset));
        }
        Ok(())
    }

    /// `None` clears the trigger element. A target must resolve to an
    /// element that is attached to the document. When a selector or list
    /// matches several elements the first one in document order is used.
    pub fn set_trigger_element(
        &mut self,
        target: Option<ElementTarget<D::Node>>,
    ) -> Result<(), ConfigError> {
        let node = match &target {
            Some(target) => Some(resolve_trigger_element(&self.dom, target, self.log_level)?),
            None => None,
        };
        if node != self.trigger_element {
            let value = node
                .as_ref()
                .map_or(OptionValue::Null, |n| OptionValue::Text(format!("{n:?}")));
            self.trigger_element = node;
            self.option_changed(OptionName::TriggerElement, value);
        }
        Ok(())
    }

    pub fn set_trigger_hook(&mut self, hook: impl Into<HookValue>) -> Result<(), ConfigError> {
        let value = resolve_trigger_hook(&hook.into())?;
        if value != self.trigger_hook {
            self.trigger_hook = value;
            self.option_changed(OptionName::TriggerHook, OptionValue::Number(value));
        }
        Ok(())
    }

    pub fn set_reverse(&mut self, reverse: bool) {
        if reverse != self.reverse {
            self.reverse = reverse;
            self.option_changed(OptionName::Reverse, OptionValue::Bool(reverse));
        }
    }

    pub fn set_tween_changes(&mut self, tween_changes: bool) {
        if tween_changes != self.tween_changes {
            self.tween_changes = tween_changes;
            self.option_changed(OptionName::TweenChanges, OptionValue::Bool(tween_changes));
        }
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        if level != self.log_level {
            self.log_level = level;
            self.option_changed(
                OptionName::LogLevel,
                OptionValue::Number(i64::from(level) as f64),
            );
        }
    }

    /// Disabled scenes keep their progress; a pinned scene is released in
    /// place.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled != self.enabled {
            self.enabled = enabled;
            self.update(true);
        }
    }

    fn option_changed(&mut self, what: OptionName, new_value: OptionValue) {
        self.trigger(
            SceneEventKind::Change,
            EventPayload::Change { what, new_value },
        );
        if let Some(reason) = what.shift_reason() {
            self.shift(reason);
        }
    }

    fn shift(&mut self, reason: ShiftReason) {
        self.trigger(SceneEventKind::Shift, EventPayload::Shift { reason });
    }

    // ---------- progress ----------

    /// Drives the state machine directly. Values outside `[0, 1]` clamp to
    /// the Before/After states.
    pub fn set_progress(&mut self, value: f64) {
        let old_state = self.state;
        let scroll_direction = self
            .ctx
            .as_ref()
            .map_or(ScrollDirection::Paused, |ctx| ctx.scroll_direction);
        let reverse_or_forward = self.reverse || value >= self.progress;
        let mut do_update = false;

        if self.duration == 0.0 {
            do_update = self.progress != value;
            self.progress = if value < 1.0 && reverse_or_forward {
                0.0
            } else {
                1.0
            };
            self.state = if self.progress == 0.0 {
                SceneState::Before
            } else {
                SceneState::During
            };
        } else if value < 0.0 && self.state != SceneState::Before && reverse_or_forward {
            self.progress = 0.0;
            self.state = SceneState::Before;
            do_update = true;
        } else if (0.0..1.0).contains(&value) && reverse_or_forward {
            self.progress = value;
            self.state = SceneState::During;
            do_update = true;
        } else if value >= 1.0 && self.state != SceneState::After {
            self.progress = 1.0;
            self.state = SceneState::After;
            do_update = true;
        } else if self.state == SceneState::During && !reverse_or_forward {
            // reverse disabled and scrolling back: hold the pin where it is
            self.update_pin_state(false);
        }

        if !do_update {
            return;
        }
        let payload = EventPayload::Progress {
            progress: self.progress,
            state: self.state,
            scroll_direction,
        };
        let state_changed = self.state != old_state;
        if state_changed && old_state != SceneState::During {
            self.trigger(SceneEventKind::Enter, payload.clone());
            let boundary = if old_state == SceneState::Before {
                SceneEventKind::Start
            } else {
                SceneEventKind::End
            };
            self.trigger(boundary, payload.clone());
        }
        self.trigger(SceneEventKind::Progress, payload.clone());
        if state_changed && self.state != SceneState::During {
            let boundary = if self.state == SceneState::Before {
                SceneEventKind::Start
            } else {
                SceneEventKind::End
            };
            self.trigger(boundary, payload.clone());
            self.trigger(SceneEventKind::Leave, payload);
        }
    }

    /// With `immediately` the scene recomputes its progress from the
    /// controller's scroll position now; otherwise it is queued for the
    /// controller's next update cycle. No-op while detached.
    pub fn update(&mut self, immediately: bool) {
        let Some(ctx) = &self.ctx else {
            return;
        };
        if !immediately {
            self.pending_update = true;
            return;
        }
        if ctx.enabled && self.enabled {
            let scroll_pos = ctx.scroll_pos;
            let ScrollOffset { start, end } = self.scroll_offset;
            let new_progress = if self.duration > 0.0 {
                (scroll_pos - start) / (end - start)
            } else if scroll_pos >= start {
                1.0
            } else {
                0.0
            };
            self.trigger(
                SceneEventKind::Update,
                EventPayload::Update {
                    start_pos: start,
                    end_pos: end,
                    scroll_pos,
                },
            );
            self.set_progress(new_progress);
        } else if self.pin.is_some() && self.state == SceneState::During {
            self.update_pin_state(true);
        }
    }

    /// Re-evaluates dynamic durations and the trigger element position.
    pub fn refresh(&mut self) {
        self.update_duration(false);
        self.update_trigger_element_position(false);
    }

    fn viewport_size(&self) -> Option<f64> {
        self.ctx.as_ref().map(|ctx| ctx.viewport_size)
    }

    pub(crate) fn update_scroll_offset(&mut self) {
        let mut start = self.trigger_pos + self.offset;
        if let (Some(ctx), Some(_)) = (&self.ctx, &self.trigger_element) {
            start -= ctx.viewport_size * self.trigger_hook;
        }
        self.scroll_offset = ScrollOffset {
            start,
            end: start + self.duration,
        };
    }

    fn update_duration(&mut self, suppress_events: bool) {
        if !self.duration_setting.is_dynamic() {
            return;
        }
        match self.duration_setting.resolve(self.viewport_size()) {
            Ok(value) => {
                if value != self.duration {
                    self.duration = value;
                    if !suppress_events {
                        self.option_changed(OptionName::Duration, OptionValue::Number(value));
                    }
                }
            }
            Err(err) => {
                self.log(LogLevel::Error, format_args!("{err}"));
                self.duration_setting = Duration::Fixed(self.duration);
            }
        }
    }

    fn update_trigger_element_position(&mut self, suppress_events: bool) {
        let Some(ctx) = &self.ctx else {
            return;
        };
        if self.trigger_element.is_none() && self.trigger_pos <= 0.0 {
            return;
        }
        let mut element_pos = 0.0;
        if let Some(element) = self.trigger_element.clone() {
            if self.dom.is_attached(&element) {
                let vertical = ctx.vertical;
                let mut container_offset = self.dom.container_offset(&ctx.container);
                let mut anchor = element;
                while let Some(parent) = self.dom.parent(&anchor) {
                    if !self.dom.has_attribute(&parent, PIN_SPACER_ATTRIBUTE) {
                        break;
                    }
                    anchor = parent;
                }
                let element_offset = self.dom.offset(&anchor, false);
                if !ctx.container.is_document() {
                    *container_offset.along_mut(vertical) -= ctx.live_scroll_pos;
                }
                element_pos = element_offset.along(vertical) - container_offset.along(vertical);
            } else {
                self.log(
                    LogLevel::Warn,
                    format_args!("WARNING: triggerElement was removed from DOM and will be reset"),
                );
                // clearing fires a change event, which re-enters this method
                self.trigger_element = None;
                self.option_changed(OptionName::TriggerElement, OptionValue::Null);
            }
        }
        let changed = element_pos != self.trigger_pos;
        self.trigger_pos = element_pos;
        if changed && !suppress_events {
            self.shift(ShiftReason::TriggerElementPosition);
        }
    }

    pub(crate) fn on_container_resize(&mut self) {
        if self.trigger_hook > 0.0 {
            self.shift(ShiftReason::ContainerResize);
        }
    }

    // ---------- controller lifecycle ----------

    pub(crate) fn attach(&mut self, ctx: ControllerContext<D::Node>) {
        self.ctx = Some(ctx);
        self.update_duration(true);
        self.update_trigger_element_position(true);
        self.update_scroll_offset();
    }

    /// Second half of attaching, after the controller has stored and sorted
    /// the scene.
    pub(crate) fn announce_added(&mut self) {
        let Some(controller) = self.controller_id() else {
            return;
        };
        self.trigger(SceneEventKind::Add, EventPayload::Add { controller });
        self.log(LogLevel::Debug, format_args!("added to controller"));
        self.update(false);
    }

    pub(crate) fn set_context(&mut self, ctx: ControllerContext<D::Node>) {
        if self.ctx.is_some() {
            self.ctx = Some(ctx);
        }
    }

    pub(crate) fn detach(&mut self) -> bool {
        if self.ctx.take().is_none() {
            return false;
        }
        self.pending_update = false;
        self.trigger(SceneEventKind::Remove, EventPayload::Remove);
        true
    }

    pub(crate) fn take_pending_update(&mut self) -> bool {
        std::mem::take(&mut self.pending_update)
    }

    pub(crate) fn take_shifted(&mut self) -> bool {
        std::mem::take(&mut self.shifted)
    }

    /// Fires `destroy`, detaches from the controller and drops every
    /// listener. Repeated calls do nothing.
    pub fn destroy(&mut self, reset: bool) {
        if self.destroyed {
            return;
        }
        self.trigger(SceneEventKind::Destroy, EventPayload::Destroy { reset });
        self.detach();
        self.listeners.clear();
        self.destroyed = true;
        self.log(LogLevel::Debug, format_args!("destroyed (reset: {reset})"));
    }

    // ---------- listeners ----------

    pub fn on(
        &mut self,
        selector: impl Into<EventSelector>,
        callback: impl FnMut(&SceneEvent) + 'static,
    ) -> ListenerId {
        self.listeners.add(selector.into(), Box::new(callback))
    }

    /// Space-separated names such as `"enter leave.ns"`. Unknown names are
    /// logged and skipped.
    pub fn on_named(
        &mut self,
        names: &str,
        callback: impl FnMut(&SceneEvent) + 'static,
    ) -> Vec<ListenerId> {
        let shared: Rc<RefCell<dyn FnMut(&SceneEvent)>> = Rc::new(RefCell::new(callback));
        let mut ids = Vec::new();
        for name in names.split_whitespace() {
            match name.parse::<EventSelector>() {
                Ok(selector) => {
                    let cb = shared.clone();
                    ids.push(
                        self.listeners
                            .add(selector, Box::new(move |e| (&mut *cb.borrow_mut())(e))),
                    );
                }
                Err(err) => self.log(
                    LogLevel::Error,
                    format_args!("ERROR calling method 'on()': {err}"),
                ),
            }
        }
        ids
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Removes listeners matching `"name"`, `"name.ns"`, `"*.ns"` or `"*.*"`
    /// (space-separated). Returns how many were removed.
    pub fn off_named(&mut self, names: &str) -> usize {
        let mut removed = 0;
        for name in names.split_whitespace() {
            match name.parse::<EventFilter>() {
                Ok(filter) => removed += self.listeners.remove_matching(&filter),
                Err(err) => self.log(
                    LogLevel::Error,
                    format_args!("ERROR calling method 'off()': {err}"),
                ),
            }
        }
        removed
    }

    pub fn off_matching(&mut self, filter: &EventFilter) -> usize {
        self.listeners.remove_matching(filter)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn trigger(&mut self, kind: SceneEventKind, payload: EventPayload) {
        let event = SceneEvent {
            scene: self.id,
            kind,
            payload,
        };
        self.react(&event);
        self.listeners.dispatch(&event);
    }

    /// Built-in reactions, run before user listeners.
    fn react(&mut self, event: &SceneEvent) {
        match (&event.kind, &event.payload) {
            (SceneEventKind::Change, EventPayload::Change { what, .. }) => match what {
                OptionName::TriggerElement => self.update_trigger_element_position(false),
                OptionName::Reverse => self.update(false),
                OptionName::TriggerHook => self.update_indicator_trigger(),
                _ => {}
            },
            (SceneEventKind::Shift, EventPayload::Shift { reason }) => {
                self.update_scroll_offset();
                self.update(false);
                self.pin_on_shift(*reason);
                self.update_indicator_bounds();
                self.shifted = true;
            }
            (SceneEventKind::Progress, _) => {
                self.update_pin_state(false);
                self.update_tween_progress();
            }
            (SceneEventKind::Enter, _) => self.apply_class_toggle(true),
            (SceneEventKind::Leave, _) => self.apply_class_toggle(false),
            (SceneEventKind::Add, _) => {
                self.update_pin_dimensions();
                self.mount_indicators();
            }
            (SceneEventKind::Remove, _) => self.unmount_indicators(),
            (SceneEventKind::Destroy, EventPayload::Destroy { reset }) => {
                let reset = *reset;
                self.remove_pin(reset);
                self.remove_tween(reset);
                self.remove_class_toggle(reset);
                self.remove_indicators();
            }
            _ => {}
        }
    }

    // ---------- tween ----------

    /// Binds `timeline`, replacing (and killing) any previous one. With
    /// `easing`, positive-duration progress changes are eased per child
    /// tween instead of jumping.
    pub fn set_tween(&mut self, timeline: Box<dyn Timeline>, easing: Option<Easing>) {
        self.remove_tween(false);
        self.tween = Some(TweenBinding::new(timeline, easing));
        self.log(LogLevel::Debug, format_args!("added tween"));
        self.update_tween_progress();
    }

    pub fn remove_tween(&mut self, reset: bool) {
        if let Some(tween) = self.tween.take() {
            tween.remove(reset);
            self.log(LogLevel::Debug, format_args!("removed tween (reset: {reset})"));
        }
    }

    fn update_tween_progress(&mut self) {
        let (progress, state, duration, tween_changes) =
            (self.progress, self.state, self.duration, self.tween_changes);
        if let Some(tween) = &mut self.tween {
            tween.sync(progress, state, duration, tween_changes);
        }
    }

    // ---------- logging ----------

    pub(crate) fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("Scene \"{name}\""),
            None => format!("Scene {}", self.id.0),
        }
    }

    pub(crate) fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        log_level::emit(
            self.log_level,
            level,
            LOG_TARGET,
            format_args!("({}) -> {}", self.label(), args),
        );
    }
}

fn resolve_trigger_element<D: Dom>(
    dom: &D,
    target: &ElementTarget<D::Node>,
    log_level: LogLevel,
) -> Result<D::Node, ConfigError> {
    let matches = target.resolve_all(dom);
    if matches.len() > 1 {
        log_level::emit(
            log_level,
            LogLevel::Debug,
            LOG_TARGET,
            format_args!(
                "triggerElement {target} matched {} elements, using the first",
                matches.len()
            ),
        );
    }
    match matches.into_iter().next() {
        Some(node) if dom.is_attached(&node) => Ok(node),
        _ => Err(ConfigError::TriggerElementNotFound {
            target: target.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDom;

    fn scene(options: SceneOptions<crate::mock::MockNode>) -> Scene<MockDom> {
        Scene::new(MockDom::default(), options).unwrap()
    }

    #[test]
    fn detached_scene_uses_offset_as_start() {
        let s = scene(
            SceneOptions::default()
                .offset(150.0)
                .duration(Duration::Fixed(100.0)),
        );
        assert_eq!(
            s.scroll_offset(),
            ScrollOffset {
                start: 150.0,
                end: 250.0
            }
        );
    }

    #[test]
    fn setters_leave_state_unchanged_on_error() {
        let mut s = scene(SceneOptions::default().duration(Duration::Fixed(100.0)));
        assert!(s.set_trigger_hook("onTop").is_err());
        assert_eq!(s.trigger_hook(), 0.5);
        assert!(s.set_offset(f64::NAN).is_err());
        assert_eq!(s.offset(), 0.0);
        assert!(s.set_duration(Duration::dynamic(|| -1.0)).is_err());
        assert_eq!(s.duration(), 100.0);
        assert_eq!(*s.duration_setting(), Duration::Fixed(100.0));
    }

    #[test]
    fn change_and_shift_fire_only_on_real_changes() {
        let mut s = scene(SceneOptions::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        s.on_named("change shift", move |e| log.borrow_mut().push(e.kind));
        s.set_offset(0.0).unwrap();
        assert!(seen.borrow().is_empty());
        s.set_offset(10.0).unwrap();
        s.set_reverse(false);
        assert_eq!(
            *seen.borrow(),
            vec![
                SceneEventKind::Change,
                SceneEventKind::Shift,
                SceneEventKind::Change
            ]
        );
        assert_eq!(s.scroll_offset().start, 10.0);
    }

    #[test]
    fn unknown_event_names_are_skipped() {
        let mut s = scene(SceneOptions::default());
        let ids = s.on_named("enter scroll leave", |_| {});
        assert_eq!(ids.len(), 2);
        assert_eq!(s.off_named("*.*"), 2);
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut s = scene(SceneOptions::default());
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        s.on(SceneEventKind::Destroy, move |_| *c.borrow_mut() += 1);
        s.destroy(true);
        s.destroy(true);
        assert_eq!(*count.borrow(), 1);
        assert!(s.is_destroyed());
        assert_eq!(s.listener_count(), 0);
    }

    #[test]
    fn trigger_selector_with_several_matches_uses_the_first() {
        let dom = MockDom::default();
        let first = dom.append(dom.body_node(), "div", None);
        let second = dom.append(dom.body_node(), "div", None);
        dom.add_class(&first, "card");
        dom.add_class(&second, "card");
        let mut s = Scene::new(dom.clone(), SceneOptions::default()).unwrap();
        s.set_trigger_element(Some(".card".into())).unwrap();
        assert_eq!(s.trigger_element(), Some(&first));
        assert!(s.set_trigger_element(Some(".missing".into())).is_err());
        assert_eq!(s.trigger_element(), Some(&first));
    }
}
