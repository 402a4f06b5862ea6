mod common;

use common::*;
use slotgfx::*;

#[test]
fn device_starts_with_an_active_default_context() {
    let dev = device();
    let ctx = dev.default_context();
    assert!(ctx.valid());
    assert_eq!(dev.active_context(), ctx);
    assert_eq!(dev.query_context_state(ctx), ResourceState::Valid);
    assert_eq!(dev.backend().active_context(), Some(ctx.raw()));
    assert_eq!(dev.frame_index(), 1);
}

#[test]
fn resources_remember_their_context() {
    let mut dev = device();
    let a = dev.default_context();
    let in_a = vertex_buffer(&mut dev);
    let b = dev.setup_context().unwrap();
    assert_eq!(dev.active_context(), b);
    let in_b = vertex_buffer(&mut dev);

    assert_eq!(dev.query_buffer_info(in_a).unwrap().slot.ctx_id, a.raw());
    assert_eq!(dev.query_buffer_info(in_b).unwrap().slot.ctx_id, b.raw());
}

#[test]
fn destroying_under_a_foreign_context_is_refused() {
    let mut dev = device();
    let a = dev.default_context();
    let buf = vertex_buffer(&mut dev);
    let b = dev.setup_context().unwrap();

    assert_eq!(
        dev.destroy_buffer(buf),
        Err(GPUError::ContextMismatch {
            owner: a.raw(),
            active: b.raw()
        })
    );
    assert_eq!(dev.query_buffer_state(buf), ResourceState::Valid);
    assert_eq!(dev.backend().num_buffers(), 1);

    dev.activate_context(a).unwrap();
    dev.destroy_buffer(buf).unwrap();
    assert_eq!(dev.query_buffer_state(buf), ResourceState::Invalid);
}

#[test]
fn discarding_a_context_destroys_what_it_owns() {
    let mut dev = device();
    let keep = vertex_buffer(&mut dev);

    let ctx = dev.setup_context().unwrap();
    let scene = scene(&mut dev);
    let vb = vertex_buffer(&mut dev);
    let rt = dev.make_image(&ImageInfo {
        render_target: true,
        width: 16,
        height: 16,
        ..Default::default()
    });
    let mut info = PassInfo::default();
    info.color_attachments[0].image = rt;
    let pass = dev.make_pass(&info);
    assert_eq!(dev.backend().num_images(), 2);

    dev.discard_context(ctx).unwrap();
    assert_eq!(dev.query_context_state(ctx), ResourceState::Invalid);
    assert_eq!(dev.query_pass_state(pass), ResourceState::Invalid);
    assert_eq!(dev.query_pipeline_state(scene.pipeline), ResourceState::Invalid);
    assert_eq!(dev.query_shader_state(scene.shader), ResourceState::Invalid);
    assert_eq!(dev.query_image_state(scene.texture), ResourceState::Invalid);
    assert_eq!(dev.query_image_state(rt), ResourceState::Invalid);
    assert_eq!(dev.query_buffer_state(vb), ResourceState::Invalid);
    assert_eq!(dev.backend().num_images(), 0);

    assert_eq!(dev.query_buffer_state(keep), ResourceState::Valid);
    assert_eq!(dev.backend().num_buffers(), 1);
    assert!(!dev.active_context().valid());
    assert_eq!(dev.backend().active_context(), None);

    assert_eq!(dev.activate_context(ctx), Err(GPUError::InvalidHandle));
    dev.activate_context(dev.default_context()).unwrap();
    dev.destroy_buffer(keep).unwrap();
}

#[test]
fn context_pool_is_bounded() {
    let mut dev = device_with(
        Desc {
            context_pool_size: 2,
            ..Default::default()
        },
        NullBackend::new(),
    );
    assert!(dev.setup_context().is_ok());
    assert_eq!(dev.setup_context(), Err(GPUError::SlotError));
}

#[test]
fn shutdown_releases_everything() {
    let mut dev = device();
    let _scene = scene(&mut dev);
    let _vb = vertex_buffer(&mut dev);
    dev.setup_context().unwrap();
    let _other = stream_buffer(&mut dev, 64);

    let backend = dev.shutdown();
    assert_eq!(backend.num_buffers(), 0);
    assert_eq!(backend.num_images(), 0);
    assert_eq!(backend.num_samplers(), 0);
    assert_eq!(backend.pending_releases(), 0);
    assert_eq!(backend.active_context(), None);
}
