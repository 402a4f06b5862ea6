#![allow(dead_code)]

use bytemuck::{Pod, Zeroable};
use slotgfx::*;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Null-backend device whose validation failures are logged, not fatal.
pub fn device() -> Device<NullBackend> {
    device_with(Desc::default(), NullBackend::new())
}

pub fn device_with(desc: Desc, backend: NullBackend) -> Device<NullBackend> {
    init_logging();
    Device::new(
        &Desc {
            non_fatal_validation: true,
            ..desc
        },
        backend,
    )
    .expect("device setup")
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub pos: glam::Vec3,
    pub uv: glam::Vec2,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Params {
    pub mvp: glam::Mat4,
}

pub fn triangle() -> [Vertex; 3] {
    [
        Vertex {
            pos: glam::vec3(-0.5, -0.5, 0.0),
            uv: glam::vec2(0.0, 0.0),
        },
        Vertex {
            pos: glam::vec3(0.5, -0.5, 0.0),
            uv: glam::vec2(1.0, 0.0),
        },
        Vertex {
            pos: glam::vec3(0.0, 0.5, 0.0),
            uv: glam::vec2(0.5, 1.0),
        },
    ]
}

pub fn vertex_buffer(dev: &mut Device<NullBackend>) -> Handle<Buffer> {
    let verts = triangle();
    dev.make_buffer(&BufferInfo {
        debug_name: "triangle",
        data: Some(bytemuck::cast_slice(&verts)),
        ..Default::default()
    })
}

pub fn stream_buffer(dev: &mut Device<NullBackend>, size: usize) -> Handle<Buffer> {
    dev.make_buffer(&BufferInfo {
        debug_name: "stream",
        size,
        usage: Usage::Stream,
        ..Default::default()
    })
}

pub fn rgba_pixels(width: u32, height: u32, value: u8) -> Vec<u8> {
    vec![value; (width * height * 4) as usize]
}

pub fn texture(dev: &mut Device<NullBackend>, pixels: &[u8], width: u32, height: u32) -> Handle<Image> {
    dev.make_image(&ImageInfo {
        debug_name: "texture",
        width,
        height,
        data: ImageData::single(pixels),
        ..Default::default()
    })
}

/// Vertex stage with one mat4 uniform block, fragment stage with one 2D
/// texture.
pub fn shader_info() -> ShaderInfo<'static> {
    let mut info = ShaderInfo {
        debug_name: "textured",
        ..Default::default()
    };
    info.vs.source = Some("void main() {}");
    info.vs.uniform_blocks[0].size = std::mem::size_of::<Params>();
    info.vs.uniform_blocks[0].uniforms[0] = ShaderUniformInfo {
        name: "mvp",
        uniform_type: Some(UniformType::Mat4),
        array_count: 1,
    };
    info.fs.source = Some("void main() {}");
    info.fs.images[0] = ShaderImageInfo {
        name: "tex",
        image_type: Some(ImageType::Dim2),
        sampler_type: SamplerType::Float,
    };
    info
}

pub fn pipeline_info(shader: Handle<Shader>) -> PipelineInfo<'static> {
    let mut info = PipelineInfo {
        debug_name: "textured",
        shader,
        ..Default::default()
    };
    info.layout.attrs[0].format = Some(VertexFormat::Float3);
    info.layout.attrs[1].format = Some(VertexFormat::Float2);
    info
}

/// Everything needed to issue a textured draw into the default pass.
pub struct Scene {
    pub shader: Handle<Shader>,
    pub pipeline: Handle<Pipeline>,
    pub texture: Handle<Image>,
}

pub fn scene(dev: &mut Device<NullBackend>) -> Scene {
    let shader = dev.make_shader(&shader_info());
    let pipeline = dev.make_pipeline(&pipeline_info(shader));
    let pixels = rgba_pixels(4, 4, 0xff);
    let texture = texture(dev, &pixels, 4, 4);
    Scene {
        shader,
        pipeline,
        texture,
    }
}

pub fn bindings(vb: Handle<Buffer>, texture: Handle<Image>) -> Bindings {
    let mut bind = Bindings::default();
    bind.vertex_buffers[0] = vb;
    bind.fs_images[0] = texture;
    bind
}
