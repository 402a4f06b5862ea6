mod common;

use common::*;
use serial_test::serial;
use slotgfx::*;

#[test]
#[serial]
#[cfg_attr(not(debug_assertions), ignore)]
#[should_panic(expected = "validation layer")]
fn fatal_mode_aborts_on_first_error() {
    init_logging();
    std::env::remove_var(NON_FATAL_VALIDATION_ENV);
    let mut dev = Device::new(&Desc::default(), NullBackend::new()).unwrap();
    dev.make_buffer(&BufferInfo::default());
}

#[test]
#[serial]
#[cfg_attr(not(debug_assertions), ignore)]
fn environment_switches_to_non_fatal_mode() {
    init_logging();
    std::env::set_var(NON_FATAL_VALIDATION_ENV, "1");
    let dev = Device::new(&Desc::default(), NullBackend::new());
    std::env::remove_var(NON_FATAL_VALIDATION_ENV);

    let mut dev = dev.unwrap();
    assert!(dev.query_desc().non_fatal_validation);
    let h = dev.make_buffer(&BufferInfo::default());
    assert_eq!(dev.query_buffer_state(h), ResourceState::Failed);
    assert_eq!(dev.last_validation_error(), Some(ValidateError::BufferSizeZero));
}

#[test]
#[cfg_attr(not(debug_assertions), ignore)]
fn failed_creation_keeps_the_first_error() {
    let mut dev = device();
    let h = dev.make_image(&ImageInfo {
        width: 0,
        height: 0,
        ..Default::default()
    });
    assert_eq!(dev.query_image_state(h), ResourceState::Failed);
    assert_eq!(dev.last_validation_error(), Some(ValidateError::ImageWidthZero));
    assert_eq!(dev.backend().num_images(), 0);
}

#[test]
#[cfg_attr(not(debug_assertions), ignore)]
fn buffer_descriptions_are_checked() {
    let mut dev = device();
    let cases: [(BufferInfo, ValidateError); 3] = [
        (BufferInfo::default(), ValidateError::BufferSizeZero),
        (
            BufferInfo {
                size: 16,
                ..Default::default()
            },
            ValidateError::BufferImmutableNeedsData,
        ),
        (
            BufferInfo {
                size: 16,
                usage: Usage::Stream,
                data: Some(&[0u8; 16][..]),
                ..Default::default()
            },
            ValidateError::BufferDynamicWithData,
        ),
    ];
    for (info, err) in cases {
        let h = dev.make_buffer(&info);
        assert_eq!(dev.query_buffer_state(h), ResourceState::Failed);
        assert_eq!(dev.last_validation_error(), Some(err));
    }
}

#[test]
#[cfg_attr(not(debug_assertions), ignore)]
fn image_data_must_cover_every_subimage() {
    let mut dev = device();
    let short = vec![0u8; 60];
    let h = texture(&mut dev, &short, 4, 4);
    assert_eq!(dev.query_image_state(h), ResourceState::Failed);
    assert_eq!(
        dev.last_validation_error(),
        Some(ValidateError::ImageDataSize {
            face: 0,
            mip: 0,
            expected: 64,
            actual: 60
        })
    );

    let h = dev.make_image(&ImageInfo {
        width: 4,
        height: 4,
        ..Default::default()
    });
    assert_eq!(dev.query_image_state(h), ResourceState::Failed);
    assert_eq!(
        dev.last_validation_error(),
        Some(ValidateError::ImageDataMissing { face: 0, mip: 0 })
    );
}

#[test]
#[cfg_attr(not(debug_assertions), ignore)]
fn shaders_need_source_for_each_stage() {
    let mut dev = device();
    let mut info = shader_info();
    info.fs.source = None;
    let h = dev.make_shader(&info);
    assert_eq!(dev.query_shader_state(h), ResourceState::Failed);
    assert_eq!(
        dev.last_validation_error(),
        Some(ValidateError::ShaderSourceMissing(ShaderStage::Fragment))
    );
}

#[test]
#[cfg_attr(not(debug_assertions), ignore)]
fn pipelines_need_vertex_attributes() {
    let mut dev = device();
    let shader = dev.make_shader(&shader_info());
    let h = dev.make_pipeline(&PipelineInfo {
        shader,
        ..Default::default()
    });
    assert_eq!(dev.query_pipeline_state(h), ResourceState::Failed);
    assert_eq!(dev.last_validation_error(), Some(ValidateError::PipelineNoAttrs));
}

#[test]
#[cfg_attr(not(debug_assertions), ignore)]
fn passes_need_render_target_attachments() {
    let mut dev = device();
    let pixels = rgba_pixels(4, 4, 0);
    let tex = texture(&mut dev, &pixels, 4, 4);
    let mut info = PassInfo::default();
    info.color_attachments[0].image = tex;
    let h = dev.make_pass(&info);
    assert_eq!(dev.query_pass_state(h), ResourceState::Failed);
    assert_eq!(
        dev.last_validation_error(),
        Some(ValidateError::PassImageNotRenderTarget)
    );
}

#[test]
#[cfg_attr(not(debug_assertions), ignore)]
fn image_types_follow_backend_features() {
    let backend = NullBackend::new();
    let features = Features {
        imagetype_3d: false,
        imagetype_array: false,
        ..backend.features()
    };
    let mut dev = device_with(Desc::default(), backend.with_features(features));
    assert!(!dev.query_features().imagetype_3d);

    let cases = [
        (ImageType::Dim3, ValidateError::Image3dUnsupported),
        (ImageType::Array, ValidateError::ImageArrayUnsupported),
    ];
    for (image_type, err) in cases {
        let h = dev.make_image(&ImageInfo {
            image_type,
            render_target: true,
            width: 8,
            height: 8,
            num_slices: 4,
            ..Default::default()
        });
        assert_eq!(dev.query_image_state(h), ResourceState::Failed);
        assert_eq!(dev.last_validation_error(), Some(err));
    }
}
