use relief_core::ReliefError;
use wgpu::{
    Device, DeviceDescriptor, Instance, InstanceDescriptor, InstanceFlags, PowerPreference, Queue,
    RequestAdapterOptions, Surface, SurfaceConfiguration, TextureFormat, TextureUsages,
};

/// WebGPU resources created at startup.
pub struct GpuContext {
    pub device: Device,
    pub queue: Queue,
    pub surface: Surface<'static>,
    pub surface_config: SurfaceConfiguration,
    pub surface_format: TextureFormat,
}

impl GpuContext {
    /// Reconfigure the surface for a new physical size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
    }
}

/// Initialize WebGPU on `canvas`. No WebGL fallback.
pub async fn init_gpu(
    canvas: web_sys::HtmlCanvasElement,
    width: u32,
    height: u32,
) -> Result<GpuContext, ReliefError> {
    let instance = Instance::new(&InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU,
        flags: InstanceFlags::default(),
        ..Default::default()
    });

    let surface: Surface<'static> = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
        .map_err(|e| ReliefError::SurfaceConfigFailed(format!("{e}")))?;

    let adapter = instance
        .request_adapter(&RequestAdapterOptions {
            power_preference: PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| {
            ReliefError::AdapterNotFound(
                "No WebGPU adapter found. Your browser may not support WebGPU.".into(),
            )
        })?;

    let info = adapter.get_info();
    log::info!("Adapter: {} ({:?})", info.name, info.backend);

    let (device, queue) = adapter
        .request_device(
            &DeviceDescriptor {
                label: Some("relief-device"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                ..Default::default()
            },
            None,
        )
        .await
        .map_err(|e| ReliefError::DeviceRequestFailed(format!("{e}")))?;

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| surface_caps.formats.first())
        .copied()
        .ok_or_else(|| ReliefError::SurfaceConfigFailed("surface reports no formats".into()))?;
    let alpha_mode = surface_caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

    let surface_config = SurfaceConfiguration {
        usage: TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: width.max(1),
        height: height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        desired_maximum_frame_latency: 2,
        alpha_mode,
        view_formats: vec![],
    };
    surface.configure(&device, &surface_config);

    log::info!("Surface format: {surface_format:?}, size: {width}x{height}");

    Ok(GpuContext {
        device,
        queue,
        surface,
        surface_config,
        surface_format,
    })
}
