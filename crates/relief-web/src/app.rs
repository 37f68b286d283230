use std::cell::RefCell;
use std::rc::Rc;

use relief_core::{MapConfig, Year};
use relief_data::CensusDataset;
use relief_persist::CameraStateStore;
use relief_render::Renderer;
use relief_scene::{Camera, PickingService, PointerState, Scene, SceneManager};
use wasm_bindgen::prelude::*;

use crate::gpu::GpuContext;
use crate::input::{InputState, PointerUpdate};
use crate::routing;
use crate::storage::SessionStore;
use crate::ui::overlay::Overlay;
use crate::ui::year_selector::YearSelector;
use crate::viewport::Viewport;

type RafClosure = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

const ORBIT_RADIANS_PER_PIXEL: f32 = 0.005;
const ZOOM_PER_SCROLL_UNIT: f32 = 0.995;

/// Application context. Owns the loaded dataset and every collaborator of the
/// frame loop; DOM callbacks reach it through the shared handle only.
pub struct Application {
    gpu: GpuContext,
    renderer: Renderer,
    dataset: CensusDataset,
    scene: Scene,
    scene_manager: SceneManager,
    camera: Camera,
    picking: PickingService,
    camera_store: CameraStateStore<SessionStore>,
    input: Rc<RefCell<InputState>>,
    year_selector: YearSelector,
    overlay: Overlay,
    canvas: web_sys::HtmlCanvasElement,
    viewport: Viewport,
    /// Last pointer position in CSS pixels, re-normalized after a resize.
    pointer_css: Option<(f32, f32)>,
    own_routes: routing::OwnRoutes,
}

/// DOM pieces the application takes over at startup.
pub struct Page {
    pub canvas: web_sys::HtmlCanvasElement,
    pub viewport: Viewport,
    pub year_selector: YearSelector,
    pub overlay: Overlay,
}

impl Application {
    pub fn new(
        gpu: GpuContext,
        config: &MapConfig,
        dataset: CensusDataset,
        input: Rc<RefCell<InputState>>,
        page: Page,
    ) -> Self {
        let renderer = Renderer::new(
            &gpu.device,
            gpu.surface_format,
            gpu.surface_config.width,
            gpu.surface_config.height,
        );

        let mut camera = Camera::new(&config.camera, 1.0);
        camera.set_viewport(page.viewport.physical_width, page.viewport.physical_height);
        let camera_store = CameraStateStore::new(SessionStore::open(), &config.camera.persisted);
        let restored = camera_store.restore(&mut camera);
        log::info!("Restored {restored} camera attribute(s) from the session");

        Self {
            gpu,
            renderer,
            dataset,
            scene: Scene::new(),
            scene_manager: SceneManager::new(config),
            camera,
            picking: PickingService::new(config.picking),
            camera_store,
            input,
            year_selector: page.year_selector,
            overlay: page.overlay,
            canvas: page.canvas,
            viewport: page.viewport,
            pointer_css: None,
            own_routes: routing::OwnRoutes::default(),
        }
    }

    pub fn years(&self) -> &[Year] {
        self.dataset.years()
    }

    pub fn year_selector(&self) -> &YearSelector {
        &self.year_selector
    }

    /// Show `year`. The scene is rebuilt even when the year is already shown.
    pub fn select_year(&mut self, year: Year) {
        match self
            .scene_manager
            .select_year(&mut self.scene, &self.dataset, year)
        {
            Ok(_) => {
                self.year_selector.set_active(year);
                self.picking.invalidate();
            }
            Err(e) => log::warn!("Cannot show year {year}: {e}"),
        }
    }

    /// Note a hash the shell is about to write, so its echo is ignored.
    pub fn record_own_route(&mut self, hash: String) {
        self.own_routes.record(hash);
    }

    /// React to a URL hash change. Unknown years are ignored.
    pub fn handle_route(&mut self, hash: &str) {
        if self.own_routes.take_echo(hash) {
            return;
        }
        if let Some(year) = routing::routed_year(self.dataset.years(), hash) {
            self.select_year(year);
        }
    }

    /// Persist the configured camera attributes for the rest of the session.
    pub fn save_camera(&mut self) {
        match self.camera_store.save(&self.camera) {
            Ok(()) => log::info!("Camera state saved"),
            Err(e) => log::warn!("Camera state not saved: {e}"),
        }
    }

    /// Start the requestAnimationFrame loop. The closure is created once.
    pub fn start_loop(app: Rc<RefCell<Self>>) {
        let closure: RafClosure = Rc::new(RefCell::new(None));
        let closure_clone = closure.clone();

        let window = web_sys::window().expect("no global window");

        *closure.borrow_mut() = Some(Closure::wrap(Box::new(move |_timestamp: f64| {
            app.borrow_mut().render_frame();

            let window = web_sys::window().expect("no global window");
            window
                .request_animation_frame(
                    closure_clone
                        .borrow()
                        .as_ref()
                        .expect("rAF closure missing")
                        .as_ref()
                        .unchecked_ref(),
                )
                .expect("rAF registration failed");
        }) as Box<dyn FnMut(f64)>));

        window
            .request_animation_frame(
                closure
                    .borrow()
                    .as_ref()
                    .expect("rAF closure missing")
                    .as_ref()
                    .unchecked_ref(),
            )
            .expect("rAF registration failed");
    }

    /// Drain the input accumulated since the last frame.
    fn apply_input(&mut self) {
        let frame = self.input.borrow_mut().take_frame();

        if frame.resized {
            self.resize();
        }
        if frame.drag_dx != 0.0 || frame.drag_dy != 0.0 {
            self.camera.orbit(
                frame.drag_dx * ORBIT_RADIANS_PER_PIXEL,
                frame.drag_dy * ORBIT_RADIANS_PER_PIXEL,
            );
        }
        if frame.scroll_delta != 0.0 {
            self.camera.zoom(ZOOM_PER_SCROLL_UNIT.powf(frame.scroll_delta));
        }
        match frame.pointer {
            PointerUpdate::Unchanged => {}
            PointerUpdate::Moved(x, y) => {
                self.pointer_css = Some((x, y));
                self.update_pointer();
            }
            PointerUpdate::Left => {
                self.pointer_css = None;
                self.picking.pointer_left();
            }
        }
    }

    fn update_pointer(&mut self) {
        if let Some((x, y)) = self.pointer_css {
            self.picking.pointer_moved(PointerState::from_client(
                x,
                y,
                self.viewport.css_width,
                self.viewport.css_height,
            ));
        }
    }

    fn resize(&mut self) {
        let window = web_sys::window().expect("no global window");
        self.viewport = Viewport::of_window(&window);
        self.viewport.apply_to(&self.canvas);

        let (width, height) = (self.viewport.physical_width, self.viewport.physical_height);
        self.gpu.resize(width, height);
        self.renderer.resize(&self.gpu.device, width, height);
        self.camera.set_viewport(width, height);
        self.update_pointer();
        log::debug!("Resized to {width}x{height}");
    }

    /// Render a single frame.
    fn render_frame(&mut self) {
        self.apply_input();

        let Application {
            gpu,
            renderer,
            dataset,
            scene,
            scene_manager,
            camera,
            picking,
            overlay,
            ..
        } = self;

        renderer.sync(&gpu.device, scene);
        renderer.update_frame(&gpu.queue, camera.view_proj());

        let text = picking.recompute(camera, scene, dataset, scene_manager.current_year());
        overlay.set_text(text);

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) => {
                gpu.surface.configure(&gpu.device, &gpu.surface_config);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                return;
            }
            Err(e) => {
                log::error!("Surface error: {e:?}");
                return;
            }
        };
        let view = output.texture.create_view(&Default::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });
        renderer.render(&mut encoder, &view);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}
