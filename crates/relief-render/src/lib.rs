pub mod renderer;
pub mod uniforms;

pub use renderer::Renderer;
pub use uniforms::{FrameUniforms, SolidUniforms, SolidVertex};
