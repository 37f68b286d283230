use std::rc::Rc;

use relief_core::{ReliefError, Year};
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlButtonElement};

use super::dom_error;

const BUTTON_CLASS: &str = "btn btn-default";
const ACTIVE_CLASS: &str = "active";

/// One button per census year, in ascending order, inside an existing
/// container element.
pub struct YearSelector {
    buttons: Vec<(Year, HtmlButtonElement)>,
}

impl YearSelector {
    pub fn build(
        document: &Document,
        container_id: &str,
        years: &[Year],
    ) -> Result<Self, ReliefError> {
        let container = document
            .get_element_by_id(container_id)
            .ok_or_else(|| ReliefError::MissingElement(format!("#{container_id}")))?;

        let mut buttons = Vec::with_capacity(years.len());
        for &year in years {
            let button = document
                .create_element("button")
                .map_err(dom_error("create year button"))?
                .dyn_into::<HtmlButtonElement>()
                .map_err(dom_error("year button"))?;
            button.set_type("button");
            button.set_class_name(BUTTON_CLASS);
            button.set_text_content(Some(&year.to_string()));
            container
                .append_child(&button)
                .map_err(dom_error("append year button"))?;
            buttons.push((year, button));
        }

        Ok(Self { buttons })
    }

    /// Call `on_select` with the button's year on every click.
    pub fn connect(&self, on_select: Rc<dyn Fn(Year)>) {
        for (year, button) in &self.buttons {
            let year = *year;
            let on_select = on_select.clone();
            let closure =
                Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_e: web_sys::MouseEvent| {
                    on_select(year);
                });
            button
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
                .expect("failed to add year button listener");
            closure.forget();
        }
    }

    /// Mark `year`'s button active and every other one inactive.
    pub fn set_active(&self, year: Year) {
        for (button_year, button) in &self.buttons {
            if let Err(e) = button
                .class_list()
                .toggle_with_force(ACTIVE_CLASS, *button_year == year)
            {
                log::warn!("Could not update year button {button_year}: {e:?}");
            }
        }
    }
}
