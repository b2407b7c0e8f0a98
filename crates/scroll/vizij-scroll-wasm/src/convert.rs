//! JsValue <-> core type conversions shared by the exported classes.

use js_sys::{Array, Function, Object, Reflect};
use serde::de::DeserializeOwned;
use serde_wasm_bindgen as swb;
use wasm_bindgen::{JsCast, JsError, JsValue};
use web_sys::Element;

use vizij_scroll_core::{ConfigError, Duration, ElementTarget, HookValue};

pub(crate) fn is_nullish(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

pub(crate) fn config_error(err: ConfigError) -> JsError {
    JsError::new(&err.to_string())
}

/// Deserializes `value`, or returns the default for undefined/null.
pub(crate) fn from_js_or_default<T: DeserializeOwned + Default>(
    value: JsValue,
    what: &str,
) -> Result<T, JsError> {
    if is_nullish(&value) {
        return Ok(T::default());
    }
    swb::from_value(value).map_err(|e| JsError::new(&format!("{what} error: {e}")))
}

pub(crate) fn to_js<T: serde::Serialize>(value: &T, what: &str) -> Result<JsValue, JsError> {
    swb::to_value(value).map_err(|e| JsError::new(&format!("{what} error: {e}")))
}

/// Splits `key` off a plain options object so the rest can go through
/// serde. Returns the options unchanged when the field is absent.
pub(crate) fn split_field(options: &JsValue, key: &str) -> (JsValue, JsValue) {
    if !options.is_object() {
        return (options.clone(), JsValue::UNDEFINED);
    }
    let key = JsValue::from_str(key);
    let field = Reflect::get(options, &key).unwrap_or(JsValue::UNDEFINED);
    if is_nullish(&field) {
        return (options.clone(), field);
    }
    let rest = Object::assign(&Object::new(), options.unchecked_ref());
    let _ = Reflect::delete_property(&rest, &key);
    (rest.into(), field)
}

/// Selector string, single element or array-like of elements.
pub(crate) fn element_target(value: &JsValue) -> Option<ElementTarget<Element>> {
    if let Some(selector) = value.as_string() {
        return Some(ElementTarget::Selector(selector));
    }
    if let Some(element) = value.dyn_ref::<Element>() {
        return Some(ElementTarget::Node(element.clone()));
    }
    if value.is_object() && Reflect::has(value, &JsValue::from_str("length")).unwrap_or(false) {
        let nodes: Vec<Element> = Array::from(value)
            .iter()
            .filter_map(|v| v.dyn_into::<Element>().ok())
            .collect();
        return Some(ElementTarget::Nodes(nodes));
    }
    None
}

/// Number of pixels, `"NN%"` of the viewport, or a function returning
/// pixels that is re-evaluated on every refresh.
pub(crate) fn duration_from_js(value: &JsValue) -> Result<Duration, JsError> {
    if let Some(f) = value.dyn_ref::<Function>() {
        let f = f.clone();
        return Ok(Duration::dynamic(move || {
            f.call0(&JsValue::UNDEFINED)
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(f64::NAN)
        }));
    }
    if let Some(v) = value.as_f64() {
        return Duration::fixed(v).map_err(config_error);
    }
    if let Some(text) = value.as_string() {
        return Duration::parse(&text).map_err(config_error);
    }
    Err(config_error(ConfigError::InvalidDuration {
        value: format!("{value:?}"),
    }))
}

pub(crate) fn hook_from_js(value: &JsValue) -> Result<HookValue, JsError> {
    if let Some(v) = value.as_f64() {
        return Ok(HookValue::Number(v));
    }
    if let Some(name) = value.as_string() {
        return Ok(HookValue::Name(name));
    }
    Err(config_error(ConfigError::InvalidTriggerHook {
        value: format!("{value:?}"),
    }))
}

/// Calls `target[name](...args)`. Missing methods and thrown exceptions
/// yield `undefined`; the latter are logged.
pub(crate) fn invoke(target: &JsValue, name: &str, args: &[JsValue]) -> JsValue {
    let Some(method) = Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|m| m.dyn_into::<Function>().ok())
    else {
        return JsValue::UNDEFINED;
    };
    let args: Array = args.iter().collect();
    method.apply(target, &args).unwrap_or_else(|err| {
        log::warn!(target: "vizij_scroll::js", "{name}() threw: {err:?}");
        JsValue::UNDEFINED
    })
}

pub(crate) fn has_method(target: &JsValue, name: &str) -> bool {
    Reflect::get(target, &JsValue::from_str(name))
        .map(|m| m.is_function())
        .unwrap_or(false)
}

pub(crate) fn get_f64(target: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_f64())
}
