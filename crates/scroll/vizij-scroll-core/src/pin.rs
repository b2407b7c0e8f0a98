//! Pinning: holds an element fixed in the viewport while its scene is in
//! the During state.
//!
//! The element is wrapped in a spacer `div` that keeps its original slot in
//! the document flow. While pinned the element is `position: fixed`; outside
//! the scene it returns to `relative` (or `absolute`) inside the spacer. With
//! `push_followers` the spacer grows by the scene duration so content after
//! it is pushed down for as long as the pin lasts.

use serde::{Deserialize, Serialize};

use crate::dom::{
    is_margin_collapse_type, parse_float, px, Dom, ElementTarget, PIN_SPACER_ATTRIBUTE,
};
use crate::events::ShiftReason;
use crate::log_level::LogLevel;
use crate::scene::Scene;
use crate::state::SceneState;

pub const DEFAULT_SPACER_CLASS: &str = "scrollmagic-pin-spacer";

/// Original inline style of a pinned element, kept on the element itself so
/// nested pins of the same element share one copy.
pub(crate) const ORIG_STYLE_ATTRIBUTE: &str = "data-scrollmagic-orig-style";

const BOUNDS_PARAMS: [&str; 9] = [
    "top",
    "left",
    "bottom",
    "right",
    "margin",
    "margin-left",
    "margin-right",
    "margin-top",
    "margin-bottom",
];

const EXTRA_COPY_STYLES: [&str; 4] = ["width", "height", "position", "box-sizing"];

const SPACER_MARGINS: [&str; 5] = [
    "margin",
    "margin-left",
    "margin-right",
    "margin-top",
    "margin-bottom",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PinSettings {
    /// Reserve scroll distance in the spacer so following content is pushed
    /// down. `None` means the default (true).
    pub push_followers: Option<bool>,
    pub spacer_class: String,
}

impl Default for PinSettings {
    fn default() -> Self {
        Self {
            push_followers: None,
            spacer_class: DEFAULT_SPACER_CLASS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct RelSize {
    pub width: bool,
    pub height: bool,
    pub auto_full_width: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct PinBinding<N> {
    pub element: N,
    pub spacer: N,
    pub in_flow: bool,
    pub push_followers: bool,
    pub rel_size: RelSize,
}

impl<D: Dom> Scene<D> {
    /// Pins `target` for the scene's duration. Returns `false` (and logs)
    /// when the element cannot be pinned. Pinning the current pin element
    /// again is a no-op; a different element replaces the current pin.
    pub fn set_pin(&mut self, target: ElementTarget<D::Node>, settings: PinSettings) -> bool {
        let dom = self.dom.clone();
        let Some(element) = target.resolve_first(&dom) else {
            self.log(
                LogLevel::Error,
                format_args!("ERROR calling method 'setPin()': Invalid pin element supplied."),
            );
            return false;
        };
        if dom.computed_style(&element, "position") == "fixed" {
            self.log(
                LogLevel::Error,
                format_args!(
                    "ERROR calling method 'setPin()': Pin does not work with elements that are positioned 'fixed'."
                ),
            );
            return false;
        }
        match self.pin.as_ref().map(|pin| pin.element == element) {
            Some(true) => return true,
            Some(false) => self.remove_pin(false),
            None => {}
        }
        let Some(parent) = dom.parent(&element) else {
            self.log(
                LogLevel::Error,
                format_args!("ERROR calling method 'setPin()': Pin element is not in the document."),
            );
            return false;
        };

        // hide the parent so computed values come from the stylesheet rather
        // than from layout
        let parent_display = dom.inline_style(&parent, "display");
        dom.set_style(&parent, "display", "none");
        let in_flow = dom.computed_style(&element, "position") != "absolute";
        let mut spacer_css: Vec<(&str, String)> = BOUNDS_PARAMS
            .iter()
            .map(|&p| (p, dom.computed_style(&element, p)))
            .collect();
        let display = dom.computed_style(&element, "display");
        let width = dom.computed_style(&element, "width");
        let height = dom.computed_style(&element, "height");
        dom.set_style(&parent, "display", &parent_display);

        let mut push_followers = settings.push_followers.unwrap_or(true);
        if !in_flow && push_followers {
            self.log(
                LogLevel::Warn,
                format_args!(
                    "WARNING: If the pinned element is positioned absolutely pushFollowers will be disabled."
                ),
            );
            push_followers = false;
        }
        if self.duration == 0.0 && settings.push_followers == Some(true) && push_followers {
            self.log(
                LogLevel::Warn,
                format_args!("WARNING: pushFollowers = true has no effect, when scene duration is 0."),
            );
        }

        let spacer = dom.create_div();
        dom.insert_before(&parent, &spacer, &element);
        spacer_css.push(("display", display.clone()));
        spacer_css.push((
            "position",
            if in_flow { "relative" } else { "absolute" }.to_string(),
        ));
        spacer_css.push(("box-sizing", "content-box".to_string()));
        if !in_flow {
            spacer_css.push(("width", dom.computed_style(&element, "width")));
            spacer_css.push(("height", dom.computed_style(&element, "height")));
        }
        dom.set_styles(&spacer, &spacer_css);
        dom.set_attribute(&spacer, PIN_SPACER_ATTRIBUTE, "");
        dom.add_class(&spacer, &settings.spacer_class);

        let rel_size = RelSize {
            width: width.ends_with('%'),
            height: height.ends_with('%'),
            auto_full_width: width == "auto" && in_flow && is_margin_collapse_type(&display),
        };

        if !dom.has_attribute(&element, ORIG_STYLE_ATTRIBUTE) {
            let original: Vec<(String, String)> = BOUNDS_PARAMS
                .iter()
                .chain(EXTRA_COPY_STYLES.iter())
                .map(|&p| (p.to_string(), dom.inline_style(&element, p)))
                .collect();
            match serde_json::to_string(&original) {
                Ok(json) => dom.set_attribute(&element, ORIG_STYLE_ATTRIBUTE, &json),
                Err(err) => self.log(
                    LogLevel::Warn,
                    format_args!("WARNING: could not store original pin style: {err}"),
                ),
            }
        }

        // percentages now resolve against the spacer
        if rel_size.width {
            dom.set_style(&spacer, "width", &width);
        }
        if rel_size.height {
            dom.set_style(&spacer, "height", &height);
        }

        dom.append_child(&spacer, &element);
        dom.set_styles(
            &element,
            &[
                (
                    "position",
                    if in_flow { "relative" } else { "absolute" }.to_string(),
                ),
                ("margin", "auto".to_string()),
                ("top", "auto".to_string()),
                ("left", "auto".to_string()),
                ("bottom", "auto".to_string()),
                ("right", "auto".to_string()),
            ],
        );
        if rel_size.width || rel_size.auto_full_width {
            dom.set_style(&element, "box-sizing", "border-box");
        }

        self.pin = Some(PinBinding {
            element,
            spacer,
            in_flow,
            push_followers,
            rel_size,
        });
        self.log(LogLevel::Debug, format_args!("added pin"));
        self.update_pin_state(false);
        true
    }

    /// Releases the pin. With `reset` (or while detached) the element is
    /// moved back to its original slot and its inline style restored;
    /// otherwise it stays inside the spacer at its current position.
    pub fn remove_pin(&mut self, reset: bool) {
        if self.pin.is_none() {
            return;
        }
        if self.state == SceneState::During {
            self.update_pin_state(true);
        }
        let Some(pin) = self.pin.take() else {
            return;
        };
        if reset || self.ctx.is_none() {
            let dom = &self.dom;
            // usually the pin element, but may be another scene's spacer
            if let Some(target) = dom.first_child(&pin.spacer) {
                if dom.has_attribute(&target, PIN_SPACER_ATTRIBUTE) {
                    for margin in SPACER_MARGINS {
                        dom.set_style(&target, margin, &dom.inline_style(&pin.spacer, margin));
                    }
                }
                if let Some(parent) = dom.parent(&pin.spacer) {
                    dom.insert_before(&parent, &target, &pin.spacer);
                    dom.remove_child(&parent, &pin.spacer);
                }
            }
            let still_nested = dom
                .parent(&pin.element)
                .is_some_and(|p| dom.has_attribute(&p, PIN_SPACER_ATTRIBUTE));
            if !still_nested {
                self.restore_original_style(&pin.element);
            }
        }
        self.log(LogLevel::Debug, format_args!("removed pin (reset: {reset})"));
    }

    fn restore_original_style(&self, element: &D::Node) {
        let Some(json) = self.dom.get_attribute(element, ORIG_STYLE_ATTRIBUTE) else {
            return;
        };
        match serde_json::from_str::<Vec<(String, String)>>(&json) {
            Ok(original) => {
                for (property, value) in &original {
                    self.dom.set_style(element, property, value);
                }
            }
            Err(err) => self.log(
                LogLevel::Warn,
                format_args!("WARNING: could not restore original pin style: {err}"),
            ),
        }
        self.dom.remove_attribute(element, ORIG_STYLE_ATTRIBUTE);
    }

    /// Fixes the pin while During (unless `force_unpin`), otherwise returns
    /// it to the flow.
    pub(crate) fn update_pin_state(&self, force_unpin: bool) {
        let (Some(pin), Some(ctx)) = (&self.pin, &self.ctx) else {
            return;
        };
        let dom = &self.dom;
        let Some(target) = dom.first_child(&pin.spacer) else {
            return;
        };
        if !force_unpin && self.state == SceneState::During {
            if dom.computed_style(&target, "position") != "fixed" {
                // switch first: collapsing to fixed may move the spacer
                dom.set_style(&target, "position", "fixed");
                self.update_pin_dimensions();
            }
            let mut fixed_pos = dom.offset(&pin.spacer, true);
            let scroll_distance = if self.reverse || self.duration == 0.0 {
                ctx.scroll_pos - self.scroll_offset.start
            } else {
                // forward-only scenes replay from progress, not scroll position
                (self.progress * self.duration * 10.0).round() / 10.0
            };
            *fixed_pos.along_mut(ctx.vertical) += scroll_distance;
            dom.set_style(&target, "top", &px(fixed_pos.top));
            dom.set_style(&target, "left", &px(fixed_pos.left));
        } else {
            let position = if pin.in_flow { "relative" } else { "absolute" };
            let mut change = dom.computed_style(&target, "position") != position;
            let mut top = 0.0;
            let mut left = 0.0;
            if !pin.push_followers {
                let shift = self.duration * self.progress;
                if ctx.vertical {
                    top = shift;
                } else {
                    left = shift;
                }
            } else if self.duration > 0.0 {
                let zero = |side: &str| {
                    parse_float(&dom.computed_style(&pin.spacer, side)) == Some(0.0)
                };
                // jumped past the pin without an intermediate update
                if self.state == SceneState::After && zero("padding-top") {
                    change = true;
                } else if self.state == SceneState::Before && zero("padding-bottom") {
                    change = true;
                }
            }
            dom.set_style(&target, "position", position);
            dom.set_style(&target, "top", &px(top));
            dom.set_style(&target, "left", &px(left));
            if change {
                self.update_pin_dimensions();
            }
        }
    }

    /// Resizes the spacer to the pinned element and, with push_followers,
    /// reserves `duration * progress` before and `duration * (1 - progress)`
    /// after it.
    pub(crate) fn update_pin_dimensions(&self) {
        let (Some(pin), Some(ctx)) = (&self.pin, &self.ctx) else {
            return;
        };
        if !pin.in_flow {
            return;
        }
        let dom = &self.dom;
        let Some(target) = dom.first_child(&pin.spacer) else {
            return;
        };
        let during = self.state == SceneState::During;
        let vertical = ctx.vertical;
        let margin_collapse = is_margin_collapse_type(&dom.computed_style(&pin.spacer, "display"));
        let mut css: Vec<(&str, String)> = Vec::with_capacity(6);

        if pin.rel_size.width || pin.rel_size.auto_full_width {
            let width = if during {
                px(dom.width(&pin.spacer, false, false))
            } else {
                "100%".to_string()
            };
            dom.set_style(&pin.element, "width", &width);
        } else {
            // min-width keeps cascaded pins from collapsing
            let measured = if vertical { &pin.element } else { &target };
            let min_width = px(dom.width(measured, true, true));
            css.push((
                "width",
                if during {
                    min_width.clone()
                } else {
                    "auto".to_string()
                },
            ));
            css.push(("min-width", min_width));
        }

        if pin.rel_size.height {
            let height = if during {
                let reserved = if pin.push_followers { self.duration } else { 0.0 };
                px(dom.height(&pin.spacer, false, false) - reserved)
            } else {
                "100%".to_string()
            };
            dom.set_style(&pin.element, "height", &height);
        } else {
            let measured = if vertical { &target } else { &pin.element };
            let min_height = px(dom.height(measured, true, !margin_collapse));
            css.push((
                "height",
                if during {
                    min_height.clone()
                } else {
                    "auto".to_string()
                },
            ));
            css.push(("min-height", min_height));
        }

        if pin.push_followers {
            let (lead, trail) = if vertical {
                ("padding-top", "padding-bottom")
            } else {
                ("padding-left", "padding-right")
            };
            css.push((lead, px(self.duration * self.progress)));
            css.push((trail, px(self.duration * (1.0 - self.progress))));
        }
        dom.set_styles(&pin.spacer, &css);
    }

    pub(crate) fn pin_on_shift(&self, reason: ShiftReason) {
        if self.pin.is_none() {
            return;
        }
        let duration_changed = reason == ShiftReason::Duration;
        if (self.state == SceneState::After && duration_changed)
            || (self.state == SceneState::During && self.duration == 0.0)
        {
            self.update_pin_state(false);
        }
        if duration_changed {
            self.update_pin_dimensions();
        }
    }

    /// Window scroll or resize while the container is an element: the fixed
    /// position is relative to the window, so it must follow.
    pub(crate) fn update_pin_in_container(&self) {
        let Some(ctx) = &self.ctx else {
            return;
        };
        if self.pin.is_some() && self.state == SceneState::During && !ctx.container.is_document() {
            self.update_pin_state(false);
        }
    }

    /// Window resize: relatively sized pins re-measure when their spacer's
    /// parent is not the full window.
    pub(crate) fn update_relative_pin_spacer(&self) {
        let (Some(pin), Some(_)) = (&self.pin, &self.ctx) else {
            return;
        };
        if self.state != SceneState::During {
            return;
        }
        let dom = &self.dom;
        let Some(parent) = dom.parent(&pin.spacer) else {
            return;
        };
        let (window_width, window_height) = dom.window_size();
        let width_mismatch = (pin.rel_size.width || pin.rel_size.auto_full_width)
            && window_width != dom.width(&parent, false, false);
        let height_mismatch =
            pin.rel_size.height && window_height != dom.height(&parent, false, false);
        if width_mismatch || height_mismatch {
            self.update_pin_dimensions();
        }
    }

    /// Whether a wheel event on `node` happened over this scene's active pin
    /// inside an element container.
    pub(crate) fn pin_captures_wheel(&self, node: &D::Node) -> bool {
        let (Some(pin), Some(ctx)) = (&self.pin, &self.ctx) else {
            return false;
        };
        self.state == SceneState::During
            && !ctx.container.is_document()
            && self.dom.contains(&pin.element, node)
    }
}
