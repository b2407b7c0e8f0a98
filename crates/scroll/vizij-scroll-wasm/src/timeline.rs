//! GSAP-style timeline over a JS object.

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::{JsError, JsValue};

use vizij_scroll_core::{ChildTween, Easing, Timeline};

use crate::convert::{get_f64, has_method, invoke};

#[derive(Debug, Clone)]
pub struct JsTimeline {
    inner: JsValue,
}

impl JsTimeline {
    /// Accepts any object with at least `pause`, `progress`/`totalProgress`
    /// and `kill` methods.
    pub fn new(inner: JsValue) -> Result<Self, JsError> {
        let usable = has_method(&inner, "pause")
            && has_method(&inner, "kill")
            && (has_method(&inner, "totalProgress") || has_method(&inner, "progress"));
        if !usable {
            return Err(JsError::new("setTween: object is not a timeline"));
        }
        Ok(Self { inner })
    }

    fn progress_method(&self) -> &'static str {
        if has_method(&self.inner, "totalProgress") {
            "totalProgress"
        } else {
            "progress"
        }
    }

    fn child_at(&self, index: usize) -> Option<JsValue> {
        let children = self.children_array()?;
        let child = children.get(index as u32);
        (!child.is_undefined()).then_some(child)
    }

    fn children_array(&self) -> Option<Array> {
        if !has_method(&self.inner, "getChildren") {
            return None;
        }
        let list = invoke(
            &self.inner,
            "getChildren",
            &[JsValue::TRUE, JsValue::TRUE, JsValue::FALSE],
        );
        Array::is_array(&list).then(|| Array::from(&list))
    }
}

fn global(name: &str) -> Option<JsValue> {
    Reflect::get(&js_sys::global(), &JsValue::from_str(name))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn child_data(child: &JsValue) -> (Option<f64>, Option<String>) {
    let Some(data) = Reflect::get(child, &JsValue::from_str("data"))
        .ok()
        .filter(|d| d.is_object())
    else {
        return (None, None);
    };
    let ease = Reflect::get(&data, &JsValue::from_str("ease"))
        .ok()
        .and_then(|v| v.as_string());
    (get_f64(&data, "momentum"), ease)
}

impl Timeline for JsTimeline {
    fn play(&mut self) {
        invoke(&self.inner, "play", &[]);
    }

    fn pause(&mut self) {
        invoke(&self.inner, "pause", &[]);
    }

    fn reverse(&mut self) {
        invoke(&self.inner, "reverse", &[]);
    }

    fn is_paused(&self) -> bool {
        invoke(&self.inner, "paused", &[]).as_bool().unwrap_or(true)
    }

    fn progress(&self) -> f64 {
        invoke(&self.inner, self.progress_method(), &[])
            .as_f64()
            .unwrap_or(0.0)
    }

    fn set_progress(&mut self, progress: f64) {
        invoke(&self.inner, self.progress_method(), &[progress.into()]);
    }

    fn duration(&self) -> f64 {
        invoke(&self.inner, "duration", &[]).as_f64().unwrap_or(0.0)
    }

    fn repeat(&self) -> i32 {
        invoke(&self.inner, "repeat", &[])
            .as_f64()
            .map_or(0, |v| v as i32)
    }

    fn set_repeat(&mut self, repeat: i32) {
        invoke(&self.inner, "repeat", &[repeat.into()]);
    }

    fn yoyo(&self) -> bool {
        invoke(&self.inner, "yoyo", &[]).as_bool().unwrap_or(false)
    }

    fn set_yoyo(&mut self, yoyo: bool) {
        invoke(&self.inner, "yoyo", &[yoyo.into()]);
    }

    fn can_tween_to(&self) -> bool {
        has_method(&self.inner, "tweenTo")
    }

    fn tween_to(&mut self, time: f64) {
        invoke(&self.inner, "tweenTo", &[time.into()]);
    }

    fn children(&self) -> Vec<ChildTween> {
        let Some(children) = self.children_array() else {
            return Vec::new();
        };
        children
            .iter()
            .map(|child| {
                let (momentum, ease) = child_data(&child);
                ChildTween {
                    repeat: invoke(&child, "repeat", &[]).as_f64().map_or(0, |v| v as i32),
                    yoyo: invoke(&child, "yoyo", &[]).as_bool().unwrap_or(false),
                    momentum,
                    ease,
                }
            })
            .collect()
    }

    fn ease_child_to(&mut self, index: usize, progress: f64, easing: &Easing) {
        let Some(child) = self.child_at(index) else {
            return;
        };
        let vars = Object::new();
        let set = |key: &str, value: JsValue| {
            let _ = Reflect::set(&vars, &JsValue::from_str(key), &value);
        };
        set("progress", progress.into());
        set("ease", JsValue::from_str(&easing.ease));
        if let Some(gsap) = global("gsap") {
            set("duration", easing.momentum.into());
            invoke(&gsap, "to", &[child, vars.into()]);
        } else if let Some(tween_max) = global("TweenMax") {
            invoke(&tween_max, "to", &[child, easing.momentum.into(), vars.into()]);
        } else {
            invoke(&child, "progress", &[progress.into()]);
            invoke(&child, "pause", &[]);
        }
    }

    fn kill(&mut self) {
        invoke(&self.inner, "kill", &[]);
    }
}
