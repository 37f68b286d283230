use glam::Mat4;
use relief_core::constants::{AMBIENT_LIGHT, LIGHT_POSITION};
use relief_scene::{MeshData, Solid};

/// Vertex layout of solid meshes. Must match VertexInput in solid.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SolidVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl SolidVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SolidVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Interleave a mesh into vertex buffer contents.
pub fn solid_vertices(mesh: &MeshData) -> Vec<SolidVertex> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .map(|(position, normal)| SolidVertex {
            position: *position,
            normal: *normal,
        })
        .collect()
}

/// Per-frame uniforms. Must match FrameUniforms in solid.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub light_position: [f32; 4],
    pub ambient: [f32; 4],
}

impl FrameUniforms {
    pub fn new(view_proj: Mat4) -> Self {
        let [lx, ly, lz] = LIGHT_POSITION;
        let [ar, ag, ab] = AMBIENT_LIGHT;
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_position: [lx, ly, lz, 1.0],
            ambient: [ar, ag, ab, 1.0],
        }
    }
}

/// Per-solid uniforms, written once when the solid is uploaded.
/// Must match SolidUniforms in solid.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SolidUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl SolidUniforms {
    /// `linear_output` is set for sRGB surfaces, which expect linear color
    /// from the shader.
    pub fn new(solid: &Solid, linear_output: bool) -> Self {
        let [r, g, b] = if linear_output {
            solid.color.map(srgb_to_linear)
        } else {
            solid.color
        };
        Self {
            model: solid.transform.to_cols_array_2d(),
            normal_matrix: solid.transform.inverse().transpose().to_cols_array_2d(),
            color: [r, g, b, 1.0],
        }
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
