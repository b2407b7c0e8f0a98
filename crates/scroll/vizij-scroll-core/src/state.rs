use serde::{Deserialize, Serialize};

/// Where the current scroll position lies relative to a scene's interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SceneState {
    #[default]
    Before,
    During,
    After,
}

impl SceneState {
    pub fn name(&self) -> &'static str {
        match self {
            SceneState::Before => "BEFORE",
            SceneState::During => "DURING",
            SceneState::After => "AFTER",
        }
    }
}

/// Direction of the last scroll delta seen by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScrollDirection {
    Forward,
    Reverse,
    #[default]
    Paused,
}

impl ScrollDirection {
    pub fn name(&self) -> &'static str {
        match self {
            ScrollDirection::Forward => "FORWARD",
            ScrollDirection::Reverse => "REVERSE",
            ScrollDirection::Paused => "PAUSED",
        }
    }

    /// Direction implied by a scroll delta; `None` when nothing moved.
    pub fn from_delta(delta: f64) -> Option<Self> {
        if delta > 0.0 {
            Some(ScrollDirection::Forward)
        } else if delta < 0.0 {
            Some(ScrollDirection::Reverse)
        } else {
            None
        }
    }
}
