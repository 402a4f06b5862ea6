mod common;

use common::*;
use slotgfx::*;

#[test]
fn textured_triangle_reaches_the_backend() {
    let mut dev = device();
    let scene = scene(&mut dev);
    let vb = vertex_buffer(&mut dev);

    dev.push_debug_group("triangle");
    dev.begin_default_pass(&PassAction::default(), 800, 600);
    dev.apply_viewport(0, 0, 800, 600, true);
    dev.apply_scissor_rect(0, 0, 400, 300, true);
    dev.apply_pipeline(scene.pipeline);
    dev.apply_bindings(&bindings(vb, scene.texture));
    dev.apply_uniforms_typed(
        ShaderStage::Vertex,
        0,
        &Params {
            mvp: glam::Mat4::IDENTITY,
        },
    );
    dev.draw(0, 3, 1);
    dev.draw(0, 3, 4);
    dev.end_pass();
    dev.pop_debug_group();
    dev.commit();

    let stats = dev.backend().stats();
    assert_eq!(stats.passes, 1);
    assert_eq!(stats.pipelines, 1);
    assert_eq!(stats.bindings, 1);
    assert_eq!(stats.uniforms, 1);
    assert_eq!(stats.draws, 2);
    assert_eq!(stats.elements, 15);
    assert_eq!(stats.commits, 1);
    assert_eq!(dev.frame_index(), 2);
    assert_eq!(dev.last_validation_error(), None);
}

#[test]
fn uniform_data_is_forwarded_verbatim() {
    let mut dev = device();
    let scene = scene(&mut dev);
    let vb = vertex_buffer(&mut dev);
    let params = Params {
        mvp: glam::Mat4::from_translation(glam::vec3(1.0, 2.0, 3.0)),
    };

    dev.begin_default_pass(&PassAction::default(), 64, 64);
    dev.apply_pipeline(scene.pipeline);
    dev.apply_bindings(&bindings(vb, scene.texture));
    dev.apply_uniforms_typed(ShaderStage::Vertex, 0, &params);
    assert_eq!(
        dev.backend().uniform_contents(ShaderStage::Vertex, 0),
        Some(bytemuck::bytes_of(&params))
    );
    dev.end_pass();
}

#[test]
fn draw_without_bindings_is_dropped() {
    let mut dev = device();
    let scene = scene(&mut dev);
    dev.begin_default_pass(&PassAction::default(), 64, 64);
    dev.apply_pipeline(scene.pipeline);
    dev.draw(0, 3, 1);
    dev.end_pass();
    assert_eq!(dev.backend().stats().draws, 0);
}

#[test]
fn empty_draws_are_skipped() {
    let mut dev = device();
    let scene = scene(&mut dev);
    let vb = vertex_buffer(&mut dev);
    dev.begin_default_pass(&PassAction::default(), 64, 64);
    dev.apply_pipeline(scene.pipeline);
    dev.apply_bindings(&bindings(vb, scene.texture));
    dev.draw(0, 0, 1);
    dev.draw(0, 3, 0);
    dev.end_pass();
    assert_eq!(dev.backend().stats().draws, 0);
}

#[test]
fn indexed_pipeline_takes_an_index_buffer() {
    let mut dev = device();
    let shader = dev.make_shader(&shader_info());
    let pip = dev.make_pipeline(&PipelineInfo {
        index_type: IndexType::U16,
        ..pipeline_info(shader)
    });
    let vb = vertex_buffer(&mut dev);
    let indices = [0u16, 1, 2, 0];
    let ib = dev.make_buffer(&BufferInfo {
        buffer_type: BufferType::IndexBuffer,
        data: Some(bytemuck::cast_slice(&indices)),
        ..Default::default()
    });
    let pixels = rgba_pixels(2, 2, 1);
    let tex = texture(&mut dev, &pixels, 2, 2);

    let mut bind = bindings(vb, tex);
    bind.index_buffer = ib;
    dev.begin_default_pass(&PassAction::default(), 64, 64);
    dev.apply_pipeline(pip);
    dev.apply_bindings(&bind);
    dev.draw(0, 3, 1);
    dev.end_pass();
    assert_eq!(dev.backend().stats().draws, 1);
    assert_eq!(dev.last_validation_error(), None);
}

#[test]
fn offscreen_pass_renders_at_attachment_size() {
    let mut dev = device();
    let scene = scene(&mut dev);
    let vb = vertex_buffer(&mut dev);
    let color = dev.make_image(&ImageInfo {
        render_target: true,
        width: 128,
        height: 32,
        ..Default::default()
    });
    let depth = dev.make_image(&ImageInfo {
        render_target: true,
        width: 128,
        height: 32,
        pixel_format: Some(PixelFormat::DepthStencil),
        ..Default::default()
    });
    let mut info = PassInfo::default();
    info.color_attachments[0].image = color;
    info.depth_stencil_attachment.image = depth;
    let pass = dev.make_pass(&info);
    assert_eq!(dev.query_pass_state(pass), ResourceState::Valid);

    let mut action = PassAction::default();
    action.colors[0].value = Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    dev.begin_pass(pass, &action);
    dev.apply_pipeline(scene.pipeline);
    dev.apply_bindings(&bindings(vb, scene.texture));
    dev.draw(0, 3, 1);
    dev.end_pass();

    assert_eq!(dev.backend().stats().passes, 1);
    assert_eq!(dev.backend().stats().draws, 1);
    assert_eq!(dev.last_validation_error(), None);
}

#[test]
#[cfg_attr(not(debug_assertions), ignore)]
fn pipeline_must_match_the_pass_attachments() {
    let mut dev = device();
    let scene = scene(&mut dev);
    let vb = vertex_buffer(&mut dev);
    let color = dev.make_image(&ImageInfo {
        render_target: true,
        width: 32,
        height: 32,
        ..Default::default()
    });
    let mut info = PassInfo::default();
    info.color_attachments[0].image = color;
    let pass = dev.make_pass(&info);

    // scene.pipeline expects the context's depth-stencil buffer
    dev.begin_pass(pass, &PassAction::default());
    dev.apply_pipeline(scene.pipeline);
    assert_eq!(
        dev.last_validation_error(),
        Some(ValidateError::ApplyPipelineDepthFormat)
    );
    dev.apply_bindings(&bindings(vb, scene.texture));
    dev.draw(0, 3, 1);
    dev.end_pass();
    assert_eq!(dev.backend().stats().draws, 0);

    let mut no_depth = pipeline_info(scene.shader);
    no_depth.depth.pixel_format = Some(PixelFormat::None);
    let pip = dev.make_pipeline(&no_depth);
    dev.begin_pass(pass, &PassAction::default());
    dev.apply_pipeline(pip);
    dev.apply_bindings(&bindings(vb, scene.texture));
    dev.draw(0, 3, 1);
    dev.end_pass();
    assert_eq!(dev.backend().stats().draws, 1);
}

#[test]
#[cfg_attr(not(debug_assertions), ignore)]
fn destroyed_texture_drops_draws() {
    let mut dev = device();
    let scene = scene(&mut dev);
    let vb = vertex_buffer(&mut dev);
    dev.destroy_image(scene.texture).unwrap();

    dev.begin_default_pass(&PassAction::default(), 64, 64);
    dev.apply_pipeline(scene.pipeline);
    dev.apply_bindings(&bindings(vb, scene.texture));
    dev.draw(0, 3, 1);
    dev.end_pass();
    assert_eq!(
        dev.last_validation_error(),
        Some(ValidateError::ApplyBindingsImageNotValid {
            stage: ShaderStage::Fragment,
            index: 0
        })
    );
    assert_eq!(dev.backend().stats().draws, 0);
}

#[test]
#[cfg_attr(not(debug_assertions), ignore)]
fn wrong_uniform_size_drops_draws() {
    let mut dev = device();
    let scene = scene(&mut dev);
    let vb = vertex_buffer(&mut dev);
    dev.begin_default_pass(&PassAction::default(), 64, 64);
    dev.apply_pipeline(scene.pipeline);
    dev.apply_bindings(&bindings(vb, scene.texture));
    dev.apply_uniforms(ShaderStage::Vertex, 0, &[0u8; 16]);
    dev.draw(0, 3, 1);
    dev.end_pass();
    assert_eq!(
        dev.last_validation_error(),
        Some(ValidateError::ApplyUniformsSize {
            expected: 64,
            actual: 16
        })
    );
    assert_eq!(dev.backend().stats().uniforms, 0);
    assert_eq!(dev.backend().stats().draws, 0);
}

#[test]
#[cfg_attr(not(debug_assertions), ignore)]
fn commit_inside_a_pass_is_rejected() {
    let mut dev = device();
    dev.begin_default_pass(&PassAction::default(), 64, 64);
    dev.commit();
    assert_eq!(dev.last_validation_error(), Some(ValidateError::CommitInPass));
    assert_eq!(dev.frame_index(), 1);
    dev.end_pass();
    dev.commit();
    assert_eq!(dev.frame_index(), 2);
}

#[test]
#[cfg_attr(not(debug_assertions), ignore)]
fn draw_outside_a_pass_is_rejected() {
    let mut dev = device();
    dev.draw(0, 3, 1);
    assert_eq!(
        dev.last_validation_error(),
        Some(ValidateError::NotInPass("draw"))
    );
    assert_eq!(dev.backend().stats().draws, 0);
}

#[test]
#[cfg_attr(not(debug_assertions), ignore)]
fn nested_begin_keeps_the_open_pass() {
    let mut dev = device();
    let scene = scene(&mut dev);
    let vb = vertex_buffer(&mut dev);

    dev.begin_default_pass(&PassAction::default(), 64, 64);
    dev.begin_default_pass(&PassAction::default(), 64, 64);
    assert_eq!(
        dev.last_validation_error(),
        Some(ValidateError::PassAlreadyActive)
    );
    dev.apply_pipeline(scene.pipeline);
    dev.apply_bindings(&bindings(vb, scene.texture));
    dev.draw(0, 3, 1);
    dev.end_pass();
    dev.commit();

    dev.begin_default_pass(&PassAction::default(), 64, 64);
    dev.apply_pipeline(scene.pipeline);
    dev.apply_bindings(&bindings(vb, scene.texture));
    dev.draw(0, 3, 1);
    dev.end_pass();
    dev.commit();

    let stats = dev.backend().stats();
    assert_eq!(stats.passes, 2);
    assert_eq!(stats.draws, 2);
    assert_eq!(stats.commits, 2);
}
