/// A surface texture acquired for one frame, plus the encoder recording into it.
///
/// Must be submitted promptly: holding the surface texture blocks acquisition
/// of the next one.
pub(crate) struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
