//! Vizij Scroll Core (host-agnostic)
//!
//! Scroll-driven scenes: a [`Controller`] owns one scroll container and the
//! [`Scene`]s attached to it, converts scroll position into per-scene
//! progress, and fires lifecycle events that drive pins, tweens, class
//! toggles and debug indicators. Every DOM read or write goes through the
//! [`Dom`] trait, so hosts (the wasm adapter, [`mock::MockDom`]) plug in
//! their own document.

pub mod class_toggle;
pub mod controller;
pub mod dom;
pub mod duration;
pub mod error;
pub mod events;
pub mod ids;
pub mod indicators;
pub mod log_level;
pub mod mock;
pub mod options;
pub mod pin;
pub mod scene;
pub mod scrollbar;
pub mod state;
pub mod tween;

// Re-exports for consumers (adapters)
pub use controller::{
    ContainerEvent, Controller, ControllerInfo, SceneMut, ScrollTarget, WindowEvent,
};
pub use dom::{Container, Dom, ElementTarget, Offset, PIN_SPACER_ATTRIBUTE};
pub use duration::Duration;
pub use error::ConfigError;
pub use events::{
    Callback, EventFilter, EventPayload, EventSelector, NamespaceFilter, OptionName, OptionValue,
    SceneEvent, SceneEventKind, ShiftReason, UnknownEvent,
};
pub use ids::{ControllerId, ListenerId, SceneId};
pub use indicators::IndicatorOptions;
pub use log_level::LogLevel;
pub use options::{
    BoolLike, ClassToggleDescriptor, ControllerOptions, DurationValue, HookValue, NumberOrText,
    PinDescriptor, SceneDescriptor, SceneOptions,
};
pub use pin::{PinSettings, DEFAULT_SPACER_CLASS};
pub use scene::{Scene, ScrollOffset};
pub use scrollbar::VirtualScrollbar;
pub use state::{SceneState, ScrollDirection};
pub use tween::{ChildTween, Easing, Timeline};
