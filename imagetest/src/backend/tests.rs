use std::path::PathBuf;

use common::test_utils::{test_output_path, test_resource};

use super::*;

fn rgb_fixture() -> PathBuf {
    test_resource("test_image.png")
}

fn gray_fixture() -> PathBuf {
    test_resource("test_image_gray.png")
}

fn rgb16_fixture() -> PathBuf {
    test_resource("test_image_rgb16.png")
}

fn corrupt_file(name: &str) -> PathBuf {
    let path = test_output_path(name);
    std::fs::write(&path, b"definitely not an image").unwrap();
    path
}

fn available_backends() -> Vec<(BuiltinBackend, SharedBackend)> {
    BuiltinBackend::all()
        .filter_map(|kind| kind.create().ok().map(|backend| (kind, backend)))
        .collect()
}

// =============================================================================
// Native values
// =============================================================================

#[test]
fn native_type_equality_ignores_name() {
    assert_eq!(NativeType::of::<Vec<u8>>(), NativeType::of::<Vec<u8>>());
    assert_ne!(NativeType::of::<Vec<u8>>(), NativeType::of::<Vec<u16>>());
    assert!(NativeType::of::<Vec<u8>>().name().contains("Vec<u8>"));
}

#[test]
fn native_type_sees_through_native_image() {
    let tag = NativeType::of::<Vec<u8>>();
    let image = NativeImage::new(vec![1u8, 2, 3]);

    assert!(tag.matches(&vec![0u8]));
    assert!(tag.matches(&image));
    assert!(!tag.matches(&42i32));
}

#[test]
fn native_image_downcast() {
    let image = NativeImage::new(vec![1u8, 2, 3]);
    assert!(image.is::<Vec<u8>>());
    assert_eq!(image.downcast_ref::<Vec<u8>>(), Some(&vec![1, 2, 3]));
    assert!(image.downcast_ref::<String>().is_none());

    let image = image.downcast::<String>().unwrap_err();
    assert!(image.type_name().contains("Vec<u8>"));
    assert_eq!(image.downcast::<Vec<u8>>().unwrap(), vec![1, 2, 3]);
}

#[test]
fn downcast_native_reports_mismatch() {
    let result = downcast_native::<String>(&42i32);
    assert!(matches!(result, Err(Error::TypeMismatch { .. })));

    let image = NativeImage::new("text".to_string());
    assert_eq!(downcast_native::<String>(&image).unwrap(), "text");
}

#[test]
fn backend_ref_conversions() {
    assert!(matches!(BackendRef::from("image"), BackendRef::Name(name) if name == "image"));
    assert!(matches!(BackendRef::from("a".to_string()), BackendRef::Name(_)));

    if let Some((_, backend)) = available_backends().into_iter().next() {
        assert!(matches!(BackendRef::from(&backend), BackendRef::Instance(_)));
    }
}

#[test]
fn shared_backend_debug_names_native_type() {
    for (kind, backend) in available_backends() {
        let text = format!("{backend:?}");
        assert!(text.contains(backend.native_type().name()), "{kind}: {text}");

        let missing: Result<SharedBackend> = Err(Error::BackendNotFound(kind.to_string()));
        assert!(missing.unwrap_err().is_not_found());
        assert!(format!("{:?}", Ok::<_, Error>(backend)).contains("ImageBackend"));
    }
}

// =============================================================================
// Builtin kinds
// =============================================================================

#[test]
fn builtin_kinds_in_discovery_order() {
    let names: Vec<&str> = BuiltinBackend::all().map(BuiltinBackend::name).collect();
    assert_eq!(names, ["array", "image", "tensor"]);

    assert_eq!(BuiltinBackend::from_name("tensor"), Some(BuiltinBackend::Tensor));
    assert_eq!(BuiltinBackend::from_name("PIL"), None);
    assert_eq!(BuiltinBackend::Image.to_string(), "image");
}

#[test]
fn builtin_availability_follows_features() {
    assert_eq!(BuiltinBackend::Array.create().is_ok(), cfg!(feature = "png"));
    assert_eq!(BuiltinBackend::Image.create().is_ok(), cfg!(feature = "image"));
    assert_eq!(BuiltinBackend::Tensor.create().is_ok(), cfg!(feature = "tensor"));
}

#[test]
fn builtin_native_types_are_distinct() {
    let backends = available_backends();
    for (i, (_, a)) in backends.iter().enumerate() {
        for (_, b) in backends.iter().skip(i + 1) {
            assert_ne!(a.native_type(), b.native_type());
        }
    }
}

// =============================================================================
// Properties shared by all builtin backends
// =============================================================================

#[test]
fn import_then_export_is_canonical() {
    for (kind, backend) in available_backends() {
        for file in [rgb_fixture(), gray_fixture(), rgb16_fixture()] {
            let image = backend.import_image(&file).unwrap();
            let canonical = backend.export_image(&image).unwrap();

            assert_eq!(canonical.ndim(), 3, "{kind} {}", file.display());
            assert!(
                crate::canonical::is_normalized(&canonical.view()),
                "{kind} {}",
                file.display()
            );
        }
    }
}

#[test]
fn export_is_repeatable() {
    for (kind, backend) in available_backends() {
        let image = backend.import_image(&rgb_fixture()).unwrap();

        let first = backend.export_image(&image).unwrap();
        let second = backend.export_image(&image).unwrap();

        assert_eq!(first.dim(), second.dim(), "{kind}");
        assert_eq!(first, second, "{kind}");
    }
}

#[test]
fn backend_owns_what_it_imports() {
    for (kind, backend) in available_backends() {
        let image = backend.import_image(&gray_fixture()).unwrap();

        assert!(backend.contains(&image), "{kind}");
        assert!(backend.native_type().matches(image.as_any()), "{kind}");
        assert!(!backend.contains(&42i32), "{kind}");
    }
}

#[test]
fn missing_file_is_not_found() {
    for (kind, backend) in available_backends() {
        let err = backend
            .import_image(Path::new("/nonexistent/does_not_exist.png"))
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)), "{kind}: {err}");
        assert!(err.is_not_found());
    }
}

#[test]
fn missing_file_is_not_found_whatever_the_extension() {
    for (kind, backend) in available_backends() {
        for name in ["missing_photo.jpg", "missing_scan.tiff", "missing"] {
            let path = Path::new("/nonexistent").join(name);
            let err = backend.import_image(&path).unwrap_err();
            assert!(matches!(err, Error::FileNotFound(_)), "{kind} {name}: {err}");
        }
    }
}

#[test]
fn corrupt_file_is_a_decode_error() {
    for (kind, backend) in available_backends() {
        let path = corrupt_file(&format!("corrupt_{kind}.png"));
        let err = backend.import_image(&path).unwrap_err();
        assert!(err.is_decode(), "{kind}: {err}");
    }
}

#[test]
fn foreign_value_is_a_type_mismatch() {
    for (kind, backend) in available_backends() {
        let err = backend.export_image(&"not an image").unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }), "{kind}: {err}");
    }
}

// =============================================================================
// Array backend
// =============================================================================

#[cfg(feature = "png")]
mod array_backend {
    use ndarray::Array3;

    use super::*;

    #[test]
    fn rgb_fixture_dimensions_and_pixels() {
        let image = ArrayBackend::new().decode(&rgb_fixture()).unwrap();

        assert_eq!(image.dim(), (512, 768, 3));
        assert_eq!(image[[0, 0, 0]], 0);
        assert_eq!(image[[0, 0, 1]], 0);
        assert_eq!(image[[0, 0, 2]], 127);
        assert_eq!(image[[511, 767, 0]], 255);
        assert_eq!(image[[511, 767, 1]], 255);
    }

    #[test]
    fn gray_fixture_keeps_a_channel_axis() {
        let image = ArrayBackend::new().decode(&gray_fixture()).unwrap();

        assert_eq!(image.dim(), (48, 64, 1));
        assert_eq!(image[[0, 1, 0]], 4);
        assert_eq!(image[[1, 0, 0]], 3);
    }

    #[test]
    fn sixteen_bit_samples_are_stripped() {
        let image = ArrayBackend::new().decode(&rgb16_fixture()).unwrap();

        assert_eq!(image.dim(), (48, 64, 3));
        // 30859 = 0x788B
        assert_eq!(image[[0, 0, 1]], 0x78);
    }

    #[test]
    fn export_divides_by_255() {
        let image = Array3::from_shape_vec((1, 2, 1), vec![0u8, 255]).unwrap();
        let canonical = ArrayBackend::new().export_image(&image).unwrap();

        assert_eq!(canonical.dim(), (1, 2, 1));
        assert_eq!(canonical[[0, 0, 0]], 0.0);
        assert_eq!(canonical[[0, 1, 0]], 1.0);
    }

    #[test]
    fn non_png_extension_is_unsupported() {
        let path = corrupt_file("not_a_png.jpg");
        let err = ArrayBackend::new().import_image(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ref ext) if ext == "jpg"));
    }
}

// =============================================================================
// DynamicImage backend
// =============================================================================

#[cfg(feature = "image")]
mod dynamic_backend {
    use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

    use super::*;

    #[test]
    fn rgb_fixture_is_rgb8() {
        let image = DynamicImageBackend::new().decode(&rgb_fixture()).unwrap();

        assert_eq!((image.width(), image.height()), (768, 512));
        assert_eq!(image.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn export_rgb8() {
        let mut buf = RgbImage::new(2, 1);
        buf.put_pixel(0, 0, Rgb([0, 51, 255]));
        buf.put_pixel(1, 0, Rgb([102, 153, 204]));
        let image = DynamicImage::ImageRgb8(buf);

        let canonical = DynamicImageBackend::new().export_image(&image).unwrap();

        assert_eq!(canonical.dim(), (1, 2, 3));
        assert_eq!(canonical[[0, 0, 1]], 51.0 / 255.0);
        assert_eq!(canonical[[0, 0, 2]], 1.0);
        assert_eq!(canonical[[0, 1, 0]], 102.0 / 255.0);
    }

    #[test]
    fn export_gray_gets_trailing_channel() {
        let buf = GrayImage::from_pixel(3, 2, Luma([255]));
        let image = DynamicImage::ImageLuma8(buf);

        let canonical = DynamicImageBackend::new().export_image(&image).unwrap();

        assert_eq!(canonical.dim(), (2, 3, 1));
        assert!(canonical.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn export_sixteen_bit_divides_by_65535() {
        let image = DynamicImageBackend::new().decode(&rgb16_fixture()).unwrap();
        assert_eq!(image.color(), image::ColorType::Rgb16);

        let canonical = DynamicImageBackend::new().export_image(&image).unwrap();
        assert_eq!(canonical.dim(), (48, 64, 3));
        assert_eq!(canonical[[0, 0, 1]], 30859.0 / 65535.0);
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let path = corrupt_file("unknown_extension.xyz");
        let err = DynamicImageBackend::new().import_image(&path).unwrap_err();
        assert!(err.is_decode(), "{err}");
    }
}

// =============================================================================
// Tensor backend
// =============================================================================

#[cfg(feature = "tensor")]
mod tensor_backend {
    use ndarray::{ArrayD, IxDyn};

    use super::*;

    #[test]
    fn import_is_channel_first() {
        let tensor = TensorBackend::new().decode(&rgb_fixture()).unwrap();
        assert_eq!(tensor.shape(), &[3, 512, 768]);
        assert_eq!(tensor[&[2, 0, 0][..]], 127.0 / 255.0);

        let tensor = TensorBackend::new().decode(&gray_fixture()).unwrap();
        assert_eq!(tensor.shape(), &[1, 48, 64]);
    }

    #[test]
    fn export_moves_channels_last() {
        let values: Vec<f32> = (0..6).map(|v| v as f32 / 10.0).collect();
        let tensor = ArrayD::from_shape_vec(IxDyn(&[2, 1, 3]), values).unwrap();

        let canonical = TensorBackend::new().export_image(&tensor).unwrap();

        assert_eq!(canonical.dim(), (1, 3, 2));
        for c in 0..2 {
            for x in 0..3 {
                assert_eq!(canonical[[0, x, c]], tensor[&[c, 0, x][..]]);
            }
        }
    }

    #[test]
    fn export_rejects_wrong_rank() {
        let tensor = ArrayD::<f32>::zeros(IxDyn(&[4, 4]));
        let err = TensorBackend::new().export_image(&tensor).unwrap_err();
        assert!(matches!(err, Error::InvalidShape(_)), "{err}");
    }
}
