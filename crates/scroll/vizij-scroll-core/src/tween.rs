//! Tween binding: maps scene progress onto an external timeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::SceneState;

/// Child tween introspection used by the eased path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChildTween {
    pub repeat: i32,
    pub yoyo: bool,
    /// Per-child catch-up time in seconds, overriding [`Easing::momentum`].
    pub momentum: Option<f64>,
    /// Per-child ease name, overriding [`Easing::ease`].
    pub ease: Option<String>,
}

/// Timeline engine surface (GSAP-style). `progress` is total progress in
/// `[0, 1]` across repeats.
pub trait Timeline: fmt::Debug {
    fn play(&mut self);
    fn pause(&mut self);
    fn reverse(&mut self);
    fn is_paused(&self) -> bool;
    fn progress(&self) -> f64;
    fn set_progress(&mut self, progress: f64);
    /// Seconds.
    fn duration(&self) -> f64;
    /// `-1` repeats forever.
    fn repeat(&self) -> i32;
    fn set_repeat(&mut self, repeat: i32);
    fn yoyo(&self) -> bool;
    fn set_yoyo(&mut self, yoyo: bool);

    /// Whether [`Timeline::tween_to`] animates rather than jumps.
    fn can_tween_to(&self) -> bool {
        false
    }

    /// Animate the playhead to `time` seconds.
    fn tween_to(&mut self, time: f64) {
        let duration = self.duration();
        if duration > 0.0 {
            self.set_progress(time / duration);
        }
        self.pause();
    }

    fn children(&self) -> Vec<ChildTween> {
        Vec::new()
    }

    /// Tween child `index` to `progress` over `easing.momentum` seconds.
    fn ease_child_to(&mut self, index: usize, progress: f64, easing: &Easing) {
        let _ = (index, easing);
        self.set_progress(progress);
        self.pause();
    }

    fn kill(&mut self);
}

/// Momentum parameters for eased progress catch-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Easing {
    /// Seconds.
    pub momentum: f64,
    pub ease: String,
}

impl Default for Easing {
    fn default() -> Self {
        Self {
            momentum: 0.5,
            ease: "Power3.easeOut".to_string(),
        }
    }
}

impl Easing {
    fn for_child(&self, child: &ChildTween) -> Easing {
        Easing {
            momentum: child.momentum.unwrap_or(self.momentum),
            ease: child.ease.clone().unwrap_or_else(|| self.ease.clone()),
        }
    }
}

#[derive(Debug)]
pub(crate) struct TweenBinding {
    timeline: Box<dyn Timeline>,
    easing: Option<Easing>,
}

impl TweenBinding {
    /// Pauses the timeline and carries an infinitely repeating child's
    /// repeat/yoyo onto it.
    pub(crate) fn new(mut timeline: Box<dyn Timeline>, easing: Option<Easing>) -> Self {
        timeline.pause();
        if timeline.repeat() != -1 {
            if let Some(child) = timeline.children().into_iter().find(|c| c.repeat == -1) {
                timeline.set_repeat(-1);
                timeline.set_yoyo(child.yoyo);
            }
        }
        Self { timeline, easing }
    }

    pub(crate) fn sync(&mut self, progress: f64, state: SceneState, duration: f64, tween_changes: bool) {
        let tl = &mut self.timeline;
        if tl.repeat() == -1 {
            // local time is unrelated to scroll progress
            let during = state == SceneState::During;
            if during && tl.is_paused() {
                tl.play();
            } else if !during && !tl.is_paused() {
                tl.pause();
            }
            return;
        }
        if progress == tl.progress() {
            return;
        }
        if duration == 0.0 {
            if progress > 0.0 {
                tl.play();
            } else {
                tl.reverse();
            }
            return;
        }
        if let Some(easing) = &self.easing {
            let children = tl.children();
            if !children.is_empty() {
                for (index, child) in children.iter().enumerate() {
                    tl.ease_child_to(index, progress, &easing.for_child(child));
                }
                return;
            }
        }
        if tween_changes && tl.can_tween_to() {
            let target = progress * tl.duration();
            tl.tween_to(target);
        } else {
            tl.set_progress(progress);
            tl.pause();
        }
    }

    /// Rewinds when `reset`, then kills the timeline.
    pub(crate) fn remove(mut self, reset: bool) {
        if reset {
            self.timeline.set_progress(0.0);
            self.timeline.pause();
        }
        self.timeline.kill();
    }
}
