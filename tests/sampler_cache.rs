mod common;

use common::*;
use slotgfx::*;

fn sampled_image<'a>(pixels: &'a [u8], fmt: PixelFormat, wrap: Wrap) -> ImageInfo<'a> {
    ImageInfo {
        width: 4,
        height: 4,
        pixel_format: Some(fmt),
        wrap_u: wrap,
        wrap_v: wrap,
        min_filter: Filter::Linear,
        mag_filter: Filter::Linear,
        data: ImageData::single(pixels),
        ..Default::default()
    }
}

#[test]
fn images_with_equal_sampling_share_a_sampler() {
    let mut dev = device();
    let rgba = rgba_pixels(4, 4, 1);
    let red = vec![1u8; 16];
    let a = dev.make_image(&sampled_image(&rgba, PixelFormat::Rgba8, Wrap::Repeat));
    let b = dev.make_image(&sampled_image(&red, PixelFormat::R8, Wrap::Repeat));
    assert_eq!(dev.query_image_state(a), ResourceState::Valid);
    assert_eq!(dev.query_image_state(b), ResourceState::Valid);

    let sa = dev.query_image_info(a).unwrap().sampler;
    let sb = dev.query_image_info(b).unwrap().sampler;
    assert!(sa.valid());
    assert_eq!(sa, sb);
    assert_eq!(dev.num_cached_samplers(), 1);
    assert_eq!(dev.backend().num_samplers(), 1);
}

#[test]
fn differing_wrap_mode_gets_its_own_sampler() {
    let mut dev = device();
    let pixels = rgba_pixels(4, 4, 1);
    let a = dev.make_image(&sampled_image(&pixels, PixelFormat::Rgba8, Wrap::Repeat));
    let b = dev.make_image(&sampled_image(&pixels, PixelFormat::Rgba8, Wrap::ClampToEdge));
    assert_ne!(
        dev.query_image_info(a).unwrap().sampler,
        dev.query_image_info(b).unwrap().sampler
    );
    assert_eq!(dev.num_cached_samplers(), 2);
}

#[test]
fn cached_samplers_outlive_their_images() {
    let mut dev = device();
    let pixels = rgba_pixels(4, 4, 1);
    let a = dev.make_image(&sampled_image(&pixels, PixelFormat::Rgba8, Wrap::Repeat));
    let sampler = dev.query_image_info(a).unwrap().sampler;
    dev.destroy_image(a).unwrap();
    assert_eq!(dev.num_cached_samplers(), 1);

    let b = dev.make_image(&sampled_image(&pixels, PixelFormat::Rgba8, Wrap::Repeat));
    assert_eq!(dev.query_image_info(b).unwrap().sampler, sampler);
    assert_eq!(dev.backend().num_samplers(), 1);

    dev.destroy_image(b).unwrap();
    let backend = dev.shutdown();
    assert_eq!(backend.num_samplers(), 0);
}

#[test]
fn full_cache_fails_images_needing_a_new_sampler() {
    let mut dev = device_with(
        Desc {
            sampler_cache_size: 1,
            ..Default::default()
        },
        NullBackend::new(),
    );
    let pixels = rgba_pixels(4, 4, 1);
    let a = dev.make_image(&sampled_image(&pixels, PixelFormat::Rgba8, Wrap::Repeat));
    let b = dev.make_image(&sampled_image(&pixels, PixelFormat::Rgba8, Wrap::MirroredRepeat));
    let c = dev.make_image(&sampled_image(&pixels, PixelFormat::Rgba8, Wrap::Repeat));
    assert_eq!(dev.query_image_state(a), ResourceState::Valid);
    assert_eq!(dev.query_image_state(b), ResourceState::Failed);
    assert_eq!(dev.query_image_state(c), ResourceState::Valid);
    assert_eq!(dev.num_cached_samplers(), 1);
    assert_eq!(dev.last_validation_error(), None);
}
