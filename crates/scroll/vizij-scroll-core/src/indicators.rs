//! Debug indicators: start/end markers inside the scroll content and a
//! trigger marker fixed in the viewport.

use serde::{Deserialize, Serialize};

use crate::dom::{px, Dom};
use crate::log_level::LogLevel;
use crate::scene::Scene;

const FONT_SIZE: &str = "0.85em";
const LABEL_PADDING: &str = "0 8px";
const Z_INDEX: &str = "9999";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndicatorOptions {
    /// Label suffix; the scene name (or id) when absent.
    pub name: Option<String>,
    pub color_start: String,
    pub color_end: String,
    pub color_trigger: String,
    /// Distance from the container edge, in pixels.
    pub indent: f64,
}

impl Default for IndicatorOptions {
    fn default() -> Self {
        Self {
            name: None,
            color_start: "green".to_string(),
            color_end: "red".to_string(),
            color_trigger: "blue".to_string(),
            indent: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Mounted<N> {
    bounds: N,
    start: N,
    end: N,
    trigger: N,
}

#[derive(Debug, Clone)]
pub(crate) struct Indicators<N> {
    options: IndicatorOptions,
    mounted: Option<Mounted<N>>,
}

impl<D: Dom> Scene<D> {
    /// Replaces any existing indicators. They appear once the scene is
    /// attached to a controller.
    pub fn add_indicators(&mut self, options: IndicatorOptions) {
        self.remove_indicators();
        self.indicators = Some(Indicators {
            options,
            mounted: None,
        });
        self.mount_indicators();
    }

    pub fn remove_indicators(&mut self) {
        self.unmount_indicators();
        self.indicators = None;
    }

    pub fn has_indicators(&self) -> bool {
        self.indicators.is_some()
    }

    /// Start, end and trigger marker nodes while mounted.
    pub fn indicator_nodes(&self) -> Option<(D::Node, D::Node, D::Node)> {
        let mounted = self.indicators.as_ref()?.mounted.as_ref()?;
        Some((
            mounted.start.clone(),
            mounted.end.clone(),
            mounted.trigger.clone(),
        ))
    }

    pub(crate) fn mount_indicators(&mut self) {
        let Some(ctx) = &self.ctx else {
            return;
        };
        let Some(indicators) = &self.indicators else {
            return;
        };
        if indicators.mounted.is_some() {
            return;
        }
        let dom = &self.dom;
        let host = match ctx.container.element() {
            Some(element) => {
                if dom.computed_style(element, "position") == "static" {
                    dom.set_style(element, "position", "relative");
                }
                element.clone()
            }
            None => match dom.body() {
                Some(body) => body,
                None => {
                    self.log(
                        LogLevel::Warn,
                        format_args!("WARNING: no document body for indicators"),
                    );
                    return;
                }
            },
        };
        let opts = indicators.options.clone();
        let name = opts.name.clone().unwrap_or_else(|| self.default_indicator_name());
        let vertical = ctx.vertical;
        let edge = if vertical { "right" } else { "bottom" };
        let border = if vertical { "border-top" } else { "border-left" };

        let label = |text: String, color: &str| {
            let node = dom.create_div();
            dom.set_text(&node, &text);
            dom.set_styles(
                &node,
                &[
                    ("color", color.to_string()),
                    (border, format!("1px solid {color}")),
                    ("font-size", FONT_SIZE.to_string()),
                    ("padding", LABEL_PADDING.to_string()),
                    ("white-space", "nowrap".to_string()),
                    ("pointer-events", "none".to_string()),
                ],
            );
            node
        };

        let bounds = dom.create_div();
        dom.set_styles(
            &bounds,
            &[
                ("position", "absolute".to_string()),
                ("overflow", "visible".to_string()),
                ("z-index", Z_INDEX.to_string()),
                (edge, px(opts.indent)),
            ],
        );
        let start = label(format!("start {name}"), &opts.color_start);
        let end = label(format!("end {name}"), &opts.color_end);
        dom.set_style(&end, "position", "absolute");
        dom.append_child(&bounds, &start);
        dom.append_child(&bounds, &end);
        dom.append_child(&host, &bounds);

        let trigger = label(format!("trigger {name}"), &opts.color_trigger);
        dom.set_styles(
            &trigger,
            &[
                ("position", "fixed".to_string()),
                ("z-index", Z_INDEX.to_string()),
                (edge, px(opts.indent)),
            ],
        );
        dom.append_child(&host, &trigger);

        if let Some(indicators) = &mut self.indicators {
            indicators.mounted = Some(Mounted {
                bounds,
                start,
                end,
                trigger,
            });
        }
        self.update_indicator_bounds();
        self.update_indicator_trigger();
    }

    pub(crate) fn unmount_indicators(&mut self) {
        let Some(mounted) = self.indicators.as_mut().and_then(|i| i.mounted.take()) else {
            return;
        };
        for node in [&mounted.bounds, &mounted.trigger] {
            if let Some(parent) = self.dom.parent(node) {
                self.dom.remove_child(&parent, node);
            }
        }
    }

    /// Start marker at the trigger point in scroll content, end marker one
    /// duration further. The end marker is hidden for zero-duration scenes.
    pub(crate) fn update_indicator_bounds(&self) {
        let (Some(ctx), Some(mounted)) = (
            &self.ctx,
            self.indicators.as_ref().and_then(|i| i.mounted.as_ref()),
        ) else {
            return;
        };
        let dom = &self.dom;
        let along = if ctx.vertical { "top" } else { "left" };
        let position = self.scroll_offset.start + self.trigger_hook * ctx.viewport_size;
        dom.set_style(&mounted.bounds, along, &px(position));
        dom.set_style(&mounted.end, along, &px(self.duration));
        let display = if self.duration > 0.0 { "" } else { "none" };
        dom.set_style(&mounted.end, "display", display);
    }

    /// Keeps the trigger marker at `trigger_hook` of the container's
    /// viewport.
    pub(crate) fn update_indicator_trigger(&self) {
        let (Some(ctx), Some(mounted)) = (
            &self.ctx,
            self.indicators.as_ref().and_then(|i| i.mounted.as_ref()),
        ) else {
            return;
        };
        let dom = &self.dom;
        let container_pos = match ctx.container.element() {
            Some(element) => dom.offset(element, true).along(ctx.vertical),
            None => 0.0,
        };
        let along = if ctx.vertical { "top" } else { "left" };
        let position = container_pos + self.trigger_hook * ctx.viewport_size;
        dom.set_style(&mounted.trigger, along, &px(position));
    }

    fn default_indicator_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.id.0.to_string(),
        }
    }
}
