//! Controller: owns one scroll container and the scenes attached to it.
//!
//! The controller never schedules anything itself. Hosts forward container
//! and window events, ask [`Controller::needs_frame`] whether to request an
//! animation frame, call [`Controller::on_animation_frame`] when it fires,
//! and call [`Controller::refresh`] every [`Controller::refresh_interval`]
//! milliseconds.

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::dom::{Container, Dom, ElementTarget, PIN_SPACER_ATTRIBUTE};
use crate::error::ConfigError;
use crate::ids::{ControllerId, SceneId};
use crate::indicators::IndicatorOptions;
use crate::log_level::{self, LogLevel};
use crate::options::{ControllerOptions, SceneDescriptor};
use crate::scene::Scene;
use crate::scrollbar::VirtualScrollbar;
use crate::state::ScrollDirection;

const LOG_TARGET: &str = "vizij_scroll::controller";

/// Snapshot of the controller a scene sees while attached.
#[derive(Debug, Clone)]
pub(crate) struct ControllerContext<N> {
    pub controller: ControllerId,
    pub container: Container<N>,
    pub vertical: bool,
    pub enabled: bool,
    pub viewport_size: f64,
    /// Position of the last update cycle.
    pub scroll_pos: f64,
    /// Position read from the container when the context was built.
    pub live_scroll_pos: f64,
    pub scroll_direction: ScrollDirection,
}

/// Events of the scroll container (or of the virtual scrollbar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerEvent {
    Scroll,
    Resize,
}

/// Events of the browser window. Relevant when the container is an element:
/// pins and trigger markers are fixed relative to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowEvent {
    Scroll,
    Resize,
}

pub enum ScrollTarget<N> {
    /// Absolute scroll position.
    Offset(f64),
    /// Start of a scene owned by this controller.
    Scene(SceneId),
    /// First element of the target, measured against the container.
    Element(ElementTarget<N>),
    /// Replaces the scroll setter for every later scroll, e.g. to animate it.
    Handler(Box<dyn FnMut(f64)>),
}

impl<N: fmt::Debug> fmt::Debug for ScrollTarget<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollTarget::Offset(pos) => f.debug_tuple("Offset").field(pos).finish(),
            ScrollTarget::Scene(id) => f.debug_tuple("Scene").field(id).finish(),
            ScrollTarget::Element(target) => f.debug_tuple("Element").field(target).finish(),
            ScrollTarget::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

impl<N> From<f64> for ScrollTarget<N> {
    fn from(pos: f64) -> Self {
        ScrollTarget::Offset(pos)
    }
}

impl<N> From<SceneId> for ScrollTarget<N> {
    fn from(id: SceneId) -> Self {
        ScrollTarget::Scene(id)
    }
}

impl<N> From<&str> for ScrollTarget<N> {
    fn from(selector: &str) -> Self {
        ScrollTarget::Element(ElementTarget::from(selector))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerInfo {
    /// Viewport size along the scroll axis.
    pub size: f64,
    pub vertical: bool,
    pub scroll_pos: f64,
    pub scroll_direction: ScrollDirection,
    pub is_document: bool,
    pub enabled: bool,
    pub scene_count: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
enum PendingUpdate {
    #[default]
    Idle,
    All,
    /// Explicitly requested scenes, updated in scene order.
    Scenes(Vec<SceneId>),
}

pub struct Controller<D: Dom> {
    id: ControllerId,
    dom: D,
    container: Container<D::Node>,
    vertical: bool,
    refresh_interval: f64,
    log_level: LogLevel,
    smooth_scrolling: bool,
    add_indicators: bool,
    global_scene_options: Option<SceneDescriptor>,
    enabled: bool,
    destroyed: bool,

    viewport_size: f64,
    scroll_pos: f64,
    scroll_direction: ScrollDirection,
    pending: PendingUpdate,

    scenes: Vec<Scene<D>>,
    scroll_pos_fn: Option<Box<dyn Fn() -> f64>>,
    scroll_to_fn: Option<Box<dyn FnMut(f64)>>,
    scrollbar: Option<Box<dyn VirtualScrollbar>>,
}

impl<D: Dom> fmt::Debug for Controller<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("id", &self.id)
            .field("container", &self.container)
            .field("vertical", &self.vertical)
            .field("enabled", &self.enabled)
            .field("viewport_size", &self.viewport_size)
            .field("scroll_pos", &self.scroll_pos)
            .field("scroll_direction", &self.scroll_direction)
            .field("pending", &self.pending)
            .field("scenes", &self.scenes.len())
            .field("scrollbar", &self.scrollbar)
            .finish_non_exhaustive()
    }
}

impl<D: Dom> Controller<D> {
    /// Controller over `container`. An element container that is the body,
    /// or not inside it, is treated as the window. `options.container` is
    /// ignored here; see [`Controller::from_options`].
    pub fn new(
        dom: D,
        container: Container<D::Node>,
        options: ControllerOptions,
    ) -> Result<Self, ConfigError> {
        let refresh_interval = options.validated_refresh_interval()?;
        let container = normalize_container(&dom, container);
        let viewport_size = dom.viewport_size(&container, options.vertical);
        let controller = Self {
            id: ControllerId::next(),
            dom,
            container,
            vertical: options.vertical,
            refresh_interval,
            log_level: options.log_level,
            smooth_scrolling: options.smooth_scrolling,
            add_indicators: options.add_indicators,
            global_scene_options: options.global_scene_options,
            enabled: true,
            destroyed: false,
            viewport_size,
            scroll_pos: 0.0,
            scroll_direction: ScrollDirection::Paused,
            pending: PendingUpdate::Idle,
            scenes: Vec::new(),
            scroll_pos_fn: None,
            scroll_to_fn: None,
            scrollbar: None,
        };
        controller.log(
            LogLevel::Debug,
            format_args!(
                "added new controller (container: {:?}, refresh interval: {})",
                controller.container, controller.refresh_interval
            ),
        );
        Ok(controller)
    }

    /// Resolves `options.container` as a selector (`None` is the window).
    pub fn from_options(dom: D, options: ControllerOptions) -> Result<Self, ConfigError> {
        let container = match &options.container {
            None => Container::Window,
            Some(selector) => match dom.query(selector).into_iter().next() {
                Some(node) => Container::Element(node),
                None => {
                    log_level::emit(
                        options.log_level,
                        LogLevel::Error,
                        LOG_TARGET,
                        format_args!(
                            "(Controller) -> ERROR creating object: No valid scroll container supplied"
                        ),
                    );
                    return Err(ConfigError::InvalidContainer {
                        target: selector.clone(),
                    });
                }
            },
        };
        Self::new(dom, container, options)
    }

    // ---------- accessors ----------

    #[inline]
    pub fn id(&self) -> ControllerId {
        self.id
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn container(&self) -> &Container<D::Node> {
        &self.container
    }

    #[inline]
    pub fn is_document(&self) -> bool {
        self.container.is_document()
    }

    #[inline]
    pub fn vertical(&self) -> bool {
        self.vertical
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    #[inline]
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }

    pub fn info(&self) -> ControllerInfo {
        ControllerInfo {
            size: self.viewport_size,
            vertical: self.vertical,
            scroll_pos: self.scroll_pos,
            scroll_direction: self.scroll_direction,
            is_document: self.container.is_document(),
            enabled: self.enabled,
            scene_count: self.scenes.len(),
        }
    }

    // ---------- scenes ----------

    /// Takes ownership of `scene`, attaches it and keeps the scene list
    /// sorted by start offset. A destroyed scene is logged and dropped.
    pub fn add_scene(&mut self, mut scene: Scene<D>) -> SceneId {
        let id = scene.id();
        if scene.is_destroyed() {
            self.log(
                LogLevel::Error,
                format_args!("ERROR: cannot add destroyed {}", scene.label()),
            );
            return id;
        }
        if self.destroyed {
            self.log(
                LogLevel::Error,
                format_args!("ERROR: cannot add {} to a destroyed controller", scene.label()),
            );
            return id;
        }
        scene.attach(self.context());
        if let Some(global) = &self.global_scene_options {
            if let Err(err) = scene.apply_descriptor(global) {
                self.log(
                    LogLevel::Error,
                    format_args!("ERROR applying global scene options: {err}"),
                );
            }
        }
        if self.add_indicators && !scene.has_indicators() {
            scene.add_indicators(IndicatorOptions::default());
        }
        self.scenes.push(scene);
        self.sort_scenes();
        self.log(
            LogLevel::Debug,
            format_args!("adding Scene (now {} total)", self.scenes.len()),
        );
        if let Some(mut scene) = self.scene_mut(id) {
            scene.announce_added();
        }
        id
    }

    /// Detaches and returns the scene. Its pin and bindings stay as they are.
    pub fn remove_scene(&mut self, id: SceneId) -> Option<Scene<D>> {
        let index = self.index_of(id)?;
        let mut scene = self.scenes.remove(index);
        self.forget_pending(id);
        scene.detach();
        scene.log(LogLevel::Debug, format_args!("removed from controller"));
        self.log(
            LogLevel::Debug,
            format_args!("removing Scene (now {} left)", self.scenes.len()),
        );
        Some(scene)
    }

    /// Destroys and drops the scene.
    pub fn destroy_scene(&mut self, id: SceneId, reset: bool) -> bool {
        match self.scene_mut(id) {
            Some(mut scene) => {
                scene.destroy(reset);
                true
            }
            None => false,
        }
    }

    pub fn scene(&self, id: SceneId) -> Option<&Scene<D>> {
        self.scenes.iter().find(|s| s.id() == id)
    }

    /// Mutable access to an attached scene. Changes that move the scene or
    /// request a deferred update are picked up when the guard drops.
    pub fn scene_mut(&mut self, id: SceneId) -> Option<SceneMut<'_, D>> {
        let index = self.index_of(id)?;
        let ctx = self.context();
        self.scenes[index].set_context(ctx);
        Some(SceneMut {
            controller: self,
            index,
        })
    }

    /// Scene ids in ascending start-offset order.
    pub fn scene_ids(&self) -> Vec<SceneId> {
        self.scenes.iter().map(Scene::id).collect()
    }

    pub fn scenes(&self) -> impl Iterator<Item = &Scene<D>> {
        self.scenes.iter()
    }

    #[inline]
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    fn index_of(&self, id: SceneId) -> Option<usize> {
        self.scenes.iter().position(|s| s.id() == id)
    }

    fn sort_scenes(&mut self) {
        self.scenes.sort_by(|a, b| {
            a.scroll_offset()
                .start
                .total_cmp(&b.scroll_offset().start)
        });
    }

    fn sync_scene(&mut self, index: usize) {
        let Some(scene) = self.scenes.get_mut(index) else {
            return;
        };
        if scene.is_destroyed() || !scene.is_attached() {
            let id = scene.id();
            self.scenes.remove(index);
            self.forget_pending(id);
            return;
        }
        let shifted = scene.take_shifted();
        let pending = scene.take_pending_update();
        let id = scene.id();
        if shifted {
            self.sort_scenes();
        }
        if pending {
            self.queue_scene(id);
        }
    }

    fn context(&self) -> ControllerContext<D::Node> {
        ControllerContext {
            controller: self.id,
            container: self.container.clone(),
            vertical: self.vertical,
            enabled: self.enabled,
            viewport_size: self.viewport_size,
            scroll_pos: self.scroll_pos,
            live_scroll_pos: self.scroll_pos(),
            scroll_direction: self.scroll_direction,
        }
    }

    /// Runs `f` on every scene in order with a fresh context.
    fn for_each_scene(&mut self, mut f: impl FnMut(&mut Scene<D>)) {
        for id in self.scene_ids() {
            if let Some(mut scene) = self.scene_mut(id) {
                f(&mut scene);
            }
        }
    }

    // ---------- update cycle ----------

    fn queue_scene(&mut self, id: SceneId) {
        match &mut self.pending {
            PendingUpdate::All => {}
            PendingUpdate::Idle => self.pending = PendingUpdate::Scenes(vec![id]),
            PendingUpdate::Scenes(ids) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
    }

    fn forget_pending(&mut self, id: SceneId) {
        if let PendingUpdate::Scenes(ids) = &mut self.pending {
            ids.retain(|&queued| queued != id);
            if ids.is_empty() {
                self.pending = PendingUpdate::Idle;
            }
        }
    }

    /// Updates one scene now, or queues it for the next cycle.
    pub fn update_scene(&mut self, id: SceneId, immediately: bool) {
        if immediately {
            if let Some(mut scene) = self.scene_mut(id) {
                scene.update(true);
            }
        } else if self.index_of(id).is_some() {
            self.queue_scene(id);
        }
    }

    /// Re-measures the container and schedules every scene; with
    /// `immediately` the cycle runs now.
    pub fn update(&mut self, immediately: bool) {
        self.on_container_change(ContainerEvent::Resize);
        if immediately {
            self.update_scenes();
        }
    }

    /// Whether the host should request an animation frame.
    pub fn needs_frame(&self) -> bool {
        self.enabled && !self.destroyed && self.pending != PendingUpdate::Idle
    }

    pub fn on_animation_frame(&mut self) {
        self.update_scenes();
    }

    fn update_scenes(&mut self) {
        if !self.enabled || self.destroyed {
            return;
        }
        let mut ids = match std::mem::take(&mut self.pending) {
            PendingUpdate::Idle => return,
            PendingUpdate::All => self.scene_ids(),
            PendingUpdate::Scenes(queued) => self
                .scenes
                .iter()
                .map(Scene::id)
                .filter(|id| queued.contains(id))
                .collect(),
        };
        let previous = self.scroll_pos;
        self.scroll_pos = self.scroll_pos();
        if let Some(direction) = ScrollDirection::from_delta(self.scroll_pos - previous) {
            self.scroll_direction = direction;
        }
        // reverse scrolling visits scenes last to first
        if self.scroll_direction == ScrollDirection::Reverse {
            ids.reverse();
        }
        if ids.is_empty() {
            self.log(
                LogLevel::Debug,
                format_args!("updating 0 Scenes (nothing added to controller)"),
            );
        }
        for id in ids {
            if let Some(mut scene) = self.scene_mut(id) {
                scene.update(true);
            }
        }
    }

    /// Milliseconds until the next [`Controller::refresh`]; `None` when
    /// refreshing is disabled or the controller is destroyed.
    pub fn refresh_interval(&self) -> Option<f64> {
        (self.refresh_interval > 0.0 && !self.destroyed).then_some(self.refresh_interval)
    }

    /// Catches container size changes no event reported, then re-measures
    /// dynamic durations and trigger positions of every scene.
    pub fn refresh(&mut self) {
        if self.destroyed {
            return;
        }
        if !self.container.is_document() {
            let size = self.dom.viewport_size(&self.container, self.vertical);
            if size != self.viewport_size {
                self.handle_container_event(ContainerEvent::Resize);
            }
        }
        self.for_each_scene(|scene| scene.refresh());
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        self.for_each_scene(|scene| scene.update(true));
    }

    // ---------- host events ----------

    /// Scroll or resize of the container. Every scene is scheduled; resizes
    /// also shift scenes whose trigger hook depends on the viewport.
    pub fn handle_container_event(&mut self, event: ContainerEvent) {
        if self.destroyed {
            return;
        }
        self.on_container_change(event);
        if event == ContainerEvent::Resize {
            self.for_each_scene(|scene| {
                scene.on_container_resize();
                scene.update_indicator_trigger();
            });
        }
    }

    fn on_container_change(&mut self, event: ContainerEvent) {
        if event == ContainerEvent::Resize {
            self.viewport_size = self.dom.viewport_size(&self.container, self.vertical);
            self.scroll_direction = ScrollDirection::Paused;
        }
        self.pending = PendingUpdate::All;
    }

    pub fn handle_window_event(&mut self, event: WindowEvent) {
        if self.destroyed || self.container.is_document() {
            return;
        }
        self.for_each_scene(|scene| {
            scene.update_pin_in_container();
            if event == WindowEvent::Resize {
                scene.update_relative_pin_spacer();
            }
            scene.update_indicator_trigger();
        });
    }

    /// Wheel input over `node` by `delta` pixels along the scroll axis. A
    /// fixed pin inside an element container swallows wheel events, so the
    /// container is scrolled instead. Returns whether the event was used
    /// (the host should then prevent its default action).
    pub fn handle_pin_wheel(&mut self, node: &D::Node, delta: f64) -> bool {
        if self.destroyed || self.container.is_document() {
            return false;
        }
        let ctx = self.context();
        let captured = self.scenes.iter_mut().any(|scene| {
            scene.set_context(ctx.clone());
            scene.pin_captures_wheel(node)
        });
        if captured {
            let target = self.scroll_pos() + delta;
            self.set_scroll(target);
        }
        captured
    }

    // ---------- scroll position ----------

    /// Current scroll position of the container, read now.
    pub fn scroll_pos(&self) -> f64 {
        if let Some(get) = &self.scroll_pos_fn {
            return get();
        }
        if self.smooth_scrolling {
            if let Some(scrollbar) = &self.scrollbar {
                return scrollbar.offset_along(self.vertical);
            }
        }
        self.dom.scroll_pos(&self.container, self.vertical)
    }

    /// Replaces (or with `None` restores) the scroll position getter.
    pub fn set_scroll_pos_fn(&mut self, get: Option<Box<dyn Fn() -> f64>>) {
        self.scroll_pos_fn = get;
    }

    /// Uses `scrollbar` as the position source and scroll setter in smooth
    /// scrolling mode. A previous scrollbar is destroyed.
    pub fn attach_scrollbar(&mut self, scrollbar: Box<dyn VirtualScrollbar>) {
        if let Some(mut old) = self.scrollbar.replace(scrollbar) {
            old.destroy();
        }
        self.log(LogLevel::Debug, format_args!("attached virtual scrollbar"));
    }

    pub fn detach_scrollbar(&mut self) -> Option<Box<dyn VirtualScrollbar>> {
        self.scrollbar.take()
    }

    #[inline]
    pub fn smooth_scrolling(&self) -> bool {
        self.smooth_scrolling
    }

    /// Scrolls to `target`. Returns `false` (and logs) when the target does
    /// not resolve.
    pub fn scroll_to(&mut self, target: impl Into<ScrollTarget<D::Node>>) -> bool {
        match target.into() {
            ScrollTarget::Offset(pos) => {
                self.set_scroll(pos);
                true
            }
            ScrollTarget::Scene(id) => match self.scene(id) {
                Some(scene) => {
                    let pos = scene.scroll_offset().start;
                    self.set_scroll(pos);
                    true
                }
                None => {
                    self.log(
                        LogLevel::Warn,
                        format_args!(
                            "scrollTo(): The supplied scene does not belong to this controller. Scroll cancelled."
                        ),
                    );
                    false
                }
            },
            ScrollTarget::Handler(handler) => {
                self.scroll_to_fn = Some(handler);
                true
            }
            ScrollTarget::Element(target) => {
                let Some(mut element) = target.resolve_first(&self.dom) else {
                    self.log(
                        LogLevel::Warn,
                        format_args!(
                            "scrollTo(): The supplied argument is invalid. Scroll cancelled. ({target})"
                        ),
                    );
                    return false;
                };
                // scroll to the spacer, the pinned element itself may be fixed
                while let Some(parent) = self.dom.parent(&element) {
                    if !self.dom.has_attribute(&parent, PIN_SPACER_ATTRIBUTE) {
                        break;
                    }
                    element = parent;
                }
                let mut container_pos = self.dom.container_offset(&self.container).along(self.vertical);
                if !self.container.is_document() {
                    container_pos -= self.scroll_pos();
                }
                let element_pos = self.dom.offset(&element, false).along(self.vertical);
                self.set_scroll(element_pos - container_pos);
                true
            }
        }
    }

    fn set_scroll(&mut self, pos: f64) {
        if let Some(handler) = &mut self.scroll_to_fn {
            handler(pos);
            return;
        }
        if self.smooth_scrolling {
            if let Some(scrollbar) = &mut self.scrollbar {
                scrollbar.set_position_along(self.vertical, pos);
                return;
            }
        }
        self.dom.set_scroll_pos(&self.container, self.vertical, pos);
    }

    // ---------- teardown ----------

    /// Destroys every scene (last to first) and the virtual scrollbar.
    /// Repeated calls do nothing.
    pub fn destroy(&mut self, reset_scenes: bool) {
        if self.destroyed {
            return;
        }
        while let Some(mut scene) = self.scenes.pop() {
            let ctx = self.context();
            scene.set_context(ctx);
            scene.destroy(reset_scenes);
        }
        if let Some(mut scrollbar) = self.scrollbar.take() {
            scrollbar.destroy();
        }
        self.pending = PendingUpdate::Idle;
        self.destroyed = true;
        self.log(
            LogLevel::Debug,
            format_args!("destroyed controller (reset: {reset_scenes})"),
        );
    }

    fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        log_level::emit(
            self.log_level,
            level,
            LOG_TARGET,
            format_args!("(Controller {}) -> {}", self.id.0, args),
        );
    }
}

fn normalize_container<D: Dom>(dom: &D, container: Container<D::Node>) -> Container<D::Node> {
    match container {
        Container::Element(node) => match dom.body() {
            Some(body) if body != node && dom.contains(&body, &node) => Container::Element(node),
            _ => Container::Window,
        },
        Container::Window => Container::Window,
    }
}

/// Mutable scene borrowed from its controller. See [`Controller::scene_mut`].
pub struct SceneMut<'a, D: Dom> {
    controller: &'a mut Controller<D>,
    index: usize,
}

impl<D: Dom> Deref for SceneMut<'_, D> {
    type Target = Scene<D>;

    fn deref(&self) -> &Scene<D> {
        &self.controller.scenes[self.index]
    }
}

impl<D: Dom> DerefMut for SceneMut<'_, D> {
    fn deref_mut(&mut self) -> &mut Scene<D> {
        &mut self.controller.scenes[self.index]
    }
}

impl<D: Dom> Drop for SceneMut<'_, D> {
    fn drop(&mut self) {
        self.controller.sync_scene(self.index);
    }
}
