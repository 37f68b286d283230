use futures::future::{FutureExt, LocalBoxFuture};
use relief_data::Fetcher;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// [`Fetcher`] over `window.fetch`. Non-2xx responses are failures.
pub struct WebFetcher;

impl Fetcher for WebFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>, String>> {
        fetch_bytes(url).boxed_local()
    }
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
    let window = web_sys::window().ok_or_else(|| "no global window".to_string())?;

    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(js_message)?;
    let response: web_sys::Response = response.dyn_into().map_err(js_message)?;
    if !response.ok() {
        return Err(format!("HTTP {} {}", response.status(), response.status_text()));
    }

    let buffer = JsFuture::from(response.array_buffer().map_err(js_message)?)
        .await
        .map_err(js_message)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

fn js_message(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
