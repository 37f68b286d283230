use wasm_bindgen::JsValue;

/// Canvas size in CSS and physical pixels. The canvas fills the window.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub css_width: f32,
    pub css_height: f32,
    pub physical_width: u32,
    pub physical_height: u32,
}

impl Viewport {
    pub fn of_window(window: &web_sys::Window) -> Self {
        let dpi_scale = window.device_pixel_ratio() as f32;
        let css_width = js_number(window.inner_width());
        let css_height = js_number(window.inner_height());
        Self {
            css_width,
            css_height,
            physical_width: ((css_width * dpi_scale) as u32).max(1),
            physical_height: ((css_height * dpi_scale) as u32).max(1),
        }
    }

    /// Size the canvas backing store and its CSS box.
    pub fn apply_to(&self, canvas: &web_sys::HtmlCanvasElement) {
        canvas.set_width(self.physical_width);
        canvas.set_height(self.physical_height);
        let style = canvas.style();
        let _ = style.set_property("width", &format!("{}px", self.css_width));
        let _ = style.set_property("height", &format!("{}px", self.css_height));
    }
}

fn js_number(value: Result<JsValue, JsValue>) -> f32 {
    value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
}
