pub mod overlay;
pub mod year_selector;

use relief_core::ReliefError;
use wasm_bindgen::JsValue;

/// Wrap a failed DOM call.
pub(crate) fn dom_error(context: &str) -> impl Fn(JsValue) -> ReliefError + '_ {
    move |e| ReliefError::Browser(format!("{context}: {e:?}"))
}
