//! Scene lifecycle events and the per-scene listener registry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ids::{ControllerId, IdAllocator, ListenerId, SceneId};
use crate::state::{SceneState, ScrollDirection};

/// Kinds of events a scene emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneEventKind {
    /// Scene entered the During state (from either side)
    Enter,
    /// Scene left the During state
    Leave,
    /// Scroll position crossed the start boundary
    Start,
    /// Scroll position crossed the end boundary
    End,
    /// Progress changed
    Progress,
    /// Scene was updated by its controller (fires even without a change)
    Update,
    /// An option changed
    Change,
    /// Start or end scroll offset moved
    Shift,
    /// Scene was added to a controller
    Add,
    /// Scene was removed from its controller
    Remove,
    /// Scene is being destroyed
    Destroy,
}

impl SceneEventKind {
    pub const ALL: [SceneEventKind; 11] = [
        Self::Enter,
        Self::Leave,
        Self::Start,
        Self::End,
        Self::Progress,
        Self::Update,
        Self::Change,
        Self::Shift,
        Self::Add,
        Self::Remove,
        Self::Destroy,
    ];

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Leave => "leave",
            Self::Start => "start",
            Self::End => "end",
            Self::Progress => "progress",
            Self::Update => "update",
            Self::Change => "change",
            Self::Shift => "shift",
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for SceneEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Event name that is not one of [`SceneEventKind`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown event name: \"{0}\"")]
pub struct UnknownEvent(pub String);

impl FromStr for SceneEventKind {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

/// `"enter"` or `"enter.namespace"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSelector {
    pub kind: SceneEventKind,
    pub namespace: Option<String>,
}

impl EventSelector {
    pub fn new(kind: SceneEventKind) -> Self {
        Self {
            kind,
            namespace: None,
        }
    }

    pub fn namespaced(kind: SceneEventKind, namespace: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: Some(namespace.into()),
        }
    }
}

impl From<SceneEventKind> for EventSelector {
    fn from(kind: SceneEventKind) -> Self {
        Self::new(kind)
    }
}

fn split_name(s: &str) -> (&str, Option<&str>) {
    match s.split_once('.') {
        Some((name, ns)) if !ns.is_empty() => (name, Some(ns)),
        Some((name, _)) => (name, None),
        None => (s, None),
    }
}

impl FromStr for EventSelector {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, namespace) = split_name(s.trim());
        let kind = name.parse::<SceneEventKind>()?;
        Ok(Self {
            kind,
            namespace: namespace.map(str::to_string),
        })
    }
}

/// Namespace part of a removal filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceFilter {
    /// Only listeners registered without a namespace.
    Unnamespaced,
    /// `*`: every namespace.
    Any,
    Named(String),
}

impl NamespaceFilter {
    fn matches(&self, namespace: Option<&str>) -> bool {
        match self {
            NamespaceFilter::Unnamespaced => namespace.is_none(),
            NamespaceFilter::Any => true,
            NamespaceFilter::Named(name) => namespace == Some(name.as_str()),
        }
    }
}

/// Removal filter: `"enter"`, `"enter.ns"`, `"*.ns"`, `"enter.*"`, `"*.*"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// `None` is `*`.
    pub kind: Option<SceneEventKind>,
    pub namespace: NamespaceFilter,
}

impl FromStr for EventFilter {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, namespace) = split_name(s.trim());
        let kind = match name {
            "*" => None,
            other => Some(other.parse::<SceneEventKind>()?),
        };
        let namespace = match namespace {
            None => NamespaceFilter::Unnamespaced,
            Some("*") => NamespaceFilter::Any,
            Some(ns) => NamespaceFilter::Named(ns.to_string()),
        };
        Ok(Self { kind, namespace })
    }
}

/// Scene options that report changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionName {
    Duration,
    Offset,
    TriggerElement,
    TriggerHook,
    Reverse,
    TweenChanges,
    LogLevel,
}

impl OptionName {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Duration => "duration",
            Self::Offset => "offset",
            Self::TriggerElement => "triggerElement",
            Self::TriggerHook => "triggerHook",
            Self::Reverse => "reverse",
            Self::TweenChanges => "tweenChanges",
            Self::LogLevel => "loglevel",
        }
    }

    /// Options whose change moves the scene's scroll offsets.
    pub fn shift_reason(&self) -> Option<ShiftReason> {
        match self {
            Self::Duration => Some(ShiftReason::Duration),
            Self::Offset => Some(ShiftReason::Offset),
            Self::TriggerHook => Some(ShiftReason::TriggerHook),
            _ => None,
        }
    }
}

/// New value carried by a `change` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShiftReason {
    Duration,
    Offset,
    TriggerHook,
    TriggerElementPosition,
    ContainerResize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventPayload {
    /// Shared by enter, leave, start, end and progress.
    #[serde(rename_all = "camelCase")]
    Progress {
        progress: f64,
        state: SceneState,
        scroll_direction: ScrollDirection,
    },
    #[serde(rename_all = "camelCase")]
    Update {
        start_pos: f64,
        end_pos: f64,
        scroll_pos: f64,
    },
    #[serde(rename_all = "camelCase")]
    Change {
        what: OptionName,
        new_value: OptionValue,
    },
    Shift {
        reason: ShiftReason,
    },
    Add {
        controller: ControllerId,
    },
    Remove,
    Destroy {
        reset: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEvent {
    pub scene: SceneId,
    pub kind: SceneEventKind,
    pub payload: EventPayload,
}

pub type Callback = Box<dyn FnMut(&SceneEvent)>;

struct Listener {
    id: ListenerId,
    kind: SceneEventKind,
    namespace: Option<String>,
    callback: Callback,
}

/// User listeners of one scene, called in registration order.
#[derive(Default)]
pub struct Listeners {
    ids: IdAllocator,
    entries: Vec<Listener>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, selector: EventSelector, callback: Callback) -> ListenerId {
        let id = self.ids.alloc_listener();
        self.entries.push(Listener {
            id,
            kind: selector.kind,
            namespace: selector.namespace,
            callback,
        });
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|l| l.id != id);
        self.entries.len() != before
    }

    /// Returns how many listeners were dropped.
    pub fn remove_matching(&mut self, filter: &EventFilter) -> usize {
        let before = self.entries.len();
        self.entries.retain(|l| {
            let kind_hit = filter.kind.map_or(true, |k| k == l.kind);
            !(kind_hit && filter.namespace.matches(l.namespace.as_deref()))
        });
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dispatch(&mut self, event: &SceneEvent) {
        for listener in self.entries.iter_mut().filter(|l| l.kind == event.kind) {
            (listener.callback)(event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|l| (l.id, l.kind, l.namespace.as_deref())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn event(kind: SceneEventKind) -> SceneEvent {
        SceneEvent {
            scene: SceneId(0),
            kind,
            payload: EventPayload::Remove,
        }
    }

    #[test]
    fn parses_names_and_namespaces() {
        let sel: EventSelector = "enter.plugin_x".parse().unwrap();
        assert_eq!(sel.kind, SceneEventKind::Enter);
        assert_eq!(sel.namespace.as_deref(), Some("plugin_x"));
        let sel: EventSelector = "progress".parse().unwrap();
        assert_eq!(sel.namespace, None);
        assert!("scroll".parse::<EventSelector>().is_err());
        assert!("*.ns".parse::<EventSelector>().is_err());

        let filter: EventFilter = "*.ns".parse().unwrap();
        assert_eq!(filter.kind, None);
        assert_eq!(filter.namespace, NamespaceFilter::Named("ns".into()));
    }

    #[test]
    fn dispatch_by_kind_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();
        for tag in ["a", "b"] {
            let log = log.clone();
            listeners.add(
                SceneEventKind::Enter.into(),
                Box::new(move |e| log.borrow_mut().push(format!("{tag}:{}", e.kind))),
            );
        }
        let l = log.clone();
        listeners.add(
            SceneEventKind::Leave.into(),
            Box::new(move |e| l.borrow_mut().push(format!("c:{}", e.kind))),
        );
        listeners.dispatch(&event(SceneEventKind::Enter));
        assert_eq!(*log.borrow(), vec!["a:enter", "b:enter"]);
    }

    #[test]
    fn remove_matching_respects_namespaces() {
        let mut listeners = Listeners::new();
        listeners.add("enter".parse().unwrap(), Box::new(|_| {}));
        listeners.add("enter.ns".parse().unwrap(), Box::new(|_| {}));
        listeners.add("leave.ns".parse().unwrap(), Box::new(|_| {}));
        let keep = listeners.add("leave.other".parse().unwrap(), Box::new(|_| {}));

        assert_eq!(listeners.remove_matching(&"enter".parse().unwrap()), 1);
        assert_eq!(listeners.remove_matching(&"*.ns".parse().unwrap()), 2);
        assert_eq!(listeners.len(), 1);
        assert!(listeners.remove(keep));
        assert!(!listeners.remove(keep));
        assert!(listeners.is_empty());
    }

    #[test]
    fn payload_serializes_camel_case() {
        let payload = EventPayload::Update {
            start_pos: 1.0,
            end_pos: 2.0,
            scroll_pos: 1.5,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "update");
        assert_eq!(json["startPos"], 1.0);
    }
}
