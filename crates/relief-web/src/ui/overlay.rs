use relief_core::ReliefError;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use super::dom_error;

/// Single-line text box showing the region under the pointer.
pub struct Overlay {
    element: HtmlElement,
    text: String,
}

impl Overlay {
    /// Use the element with `id`, creating it at the end of the body if the
    /// page does not have one.
    pub fn attach(document: &Document, id: &str) -> Result<Self, ReliefError> {
        let element = match document.get_element_by_id(id) {
            Some(element) => element,
            None => {
                let element = document
                    .create_element("div")
                    .map_err(dom_error("create overlay"))?;
                element.set_id(id);
                let body = document
                    .body()
                    .ok_or_else(|| ReliefError::MissingElement("body".into()))?;
                body.append_child(&element)
                    .map_err(dom_error("append overlay"))?;
                element
            }
        };
        let element = element
            .dyn_into::<HtmlElement>()
            .map_err(dom_error("overlay element"))?;
        element.set_text_content(None);

        Ok(Self {
            element,
            text: String::new(),
        })
    }

    /// Replace the text. The DOM is only touched when it changes.
    pub fn set_text(&mut self, text: &str) {
        if self.text == text {
            return;
        }
        self.text.clear();
        self.text.push_str(text);
        self.element
            .set_text_content((!text.is_empty()).then_some(text));
    }
}
