//! Browser shell: canvas, DOM controls, event wiring and the frame loop.
//!
//! Everything except hash routing only exists on `wasm32`.

pub mod routing;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod fetch;
#[cfg(target_arch = "wasm32")]
mod gpu;
#[cfg(target_arch = "wasm32")]
mod input;
#[cfg(target_arch = "wasm32")]
mod storage;
#[cfg(target_arch = "wasm32")]
pub mod ui;
#[cfg(target_arch = "wasm32")]
mod viewport;

#[cfg(target_arch = "wasm32")]
pub use shell::main;

#[cfg(target_arch = "wasm32")]
mod shell {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use relief_core::route::year_route;
    use relief_core::{MapConfig, ReliefError, Year};
    use relief_data::{assemble_dataset, load_all, standard_sources};
    use wasm_bindgen::prelude::*;

    use crate::app::{Application, Page};
    use crate::fetch::WebFetcher;
    use crate::input::{self, InputState};
    use crate::routing;
    use crate::ui::overlay::Overlay;
    use crate::ui::year_selector::YearSelector;
    use crate::viewport::Viewport;
    use crate::gpu;

    const CANVAS_ID: &str = "relief-canvas";
    const YEAR_SELECTOR_ID: &str = "current-year";
    const OVERLAY_ID: &str = "overlay";

    /// WASM entry point. Sets the panic hook and initializes logging.
    #[wasm_bindgen(start)]
    pub fn main() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("logger init failed");
        log::info!("Census relief starting...");

        wasm_bindgen_futures::spawn_local(async {
            if let Err(e) = run().await {
                show_error_to_user(&format!("{e}"));
            }
        });
    }

    /// Async initialization: canvas and GPU, then the data load, then the
    /// application context and its listeners.
    async fn run() -> Result<(), ReliefError> {
        let window = web_sys::window().expect("no global window");
        let document = window.document().expect("no document");

        let config = MapConfig::from_ron_str(include_str!("../../../data/map.ron"))?;

        let canvas = canvas_element(&document)?;
        let viewport = Viewport::of_window(&window);
        viewport.apply_to(&canvas);
        log::info!(
            "Canvas: {}x{} CSS, {}x{} physical",
            viewport.css_width,
            viewport.css_height,
            viewport.physical_width,
            viewport.physical_height
        );

        let input_state = Rc::new(RefCell::new(InputState::new()));
        input::register_input_listeners(&window, &canvas, input_state.clone());

        let gpu_ctx =
            gpu::init_gpu(canvas.clone(), viewport.physical_width, viewport.physical_height)
                .await?;

        let resources = load_all(&WebFetcher, &standard_sources(&config))
            .await
            .map_err(|e| ReliefError::DataLoad(e.to_string()))?;
        let dataset =
            assemble_dataset(resources, &config).map_err(|e| ReliefError::DataLoad(e.to_string()))?;

        let page = Page {
            canvas,
            viewport,
            year_selector: YearSelector::build(&document, YEAR_SELECTOR_ID, dataset.years())?,
            overlay: Overlay::attach(&document, OVERLAY_ID)?,
        };
        let application = Application::new(gpu_ctx, &config, dataset, input_state, page);
        let initial = routing::initial_year(application.years(), &location_hash(&window));
        let app_rc = Rc::new(RefCell::new(application));

        connect_year_selector(&app_rc);
        register_window_listeners(&window, Rc::downgrade(&app_rc));

        if let Some(year) = initial {
            app_rc.borrow_mut().select_year(year);
        }
        Application::start_loop(app_rc);

        Ok(())
    }

    /// The page's canvas, or a new one appended to the body.
    fn canvas_element(
        document: &web_sys::Document,
    ) -> Result<web_sys::HtmlCanvasElement, ReliefError> {
        let element = match document.get_element_by_id(CANVAS_ID) {
            Some(element) => element,
            None => {
                let element = document
                    .create_element("canvas")
                    .map_err(|e| ReliefError::Browser(format!("create canvas: {e:?}")))?;
                element.set_id(CANVAS_ID);
                document
                    .body()
                    .ok_or_else(|| ReliefError::MissingElement("body".into()))?
                    .append_child(&element)
                    .map_err(|e| ReliefError::Browser(format!("append canvas: {e:?}")))?;
                element
            }
        };
        element
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| ReliefError::MissingElement(format!("#{CANVAS_ID} is not a canvas")))
    }

    fn location_hash(window: &web_sys::Window) -> String {
        window.location().hash().unwrap_or_default()
    }

    /// A click selects the year and records it in the URL hash. The
    /// resulting `hashchange` is skipped.
    fn connect_year_selector(app: &Rc<RefCell<Application>>) {
        let weak = Rc::downgrade(app);
        let on_select = Rc::new(move |year: Year| {
            let Some(app_rc) = weak.upgrade() else { return };
            let mut app = app_rc.borrow_mut();
            app.select_year(year);

            let window = web_sys::window().expect("no global window");
            let route = year_route(year);
            if location_hash(&window) == route {
                return;
            }
            app.record_own_route(route.clone());
            if let Err(e) = window.location().set_hash(&route) {
                log::warn!("Could not update location hash: {e:?}");
            }
        });
        app.borrow().year_selector().connect(on_select);
    }

    fn register_window_listeners(window: &web_sys::Window, app: Weak<RefCell<Application>>) {
        // hashchange: follow #/an/<year>
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_e: web_sys::Event| {
                let Some(app) = app.upgrade() else { return };
                let window = web_sys::window().expect("no global window");
                app.borrow_mut().handle_route(&location_hash(&window));
            });
            window
                .add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref())
                .expect("failed to add hashchange listener");
            closure.forget();
        }

        // beforeunload: persist the camera for the rest of the session
        {
            let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_e: web_sys::Event| {
                if let Some(app) = app.upgrade() {
                    app.borrow_mut().save_camera();
                }
            });
            window
                .add_event_listener_with_callback("beforeunload", closure.as_ref().unchecked_ref())
                .expect("failed to add beforeunload listener");
            closure.forget();
        }
    }

    /// Show a user-visible error, not just a console line.
    fn show_error_to_user(msg: &str) {
        log::error!("{msg}");
        let window = web_sys::window().expect("no global window");
        let _ = window.alert_with_message(&format!("Census relief error: {msg}"));
    }
}
