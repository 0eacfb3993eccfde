use std::any::Any;
use std::path::Path;

use image::DynamicImage;
use ndarray::Array3;

use super::{downcast_native, ensure_file_exists, ImageBackend, NativeImage, NativeType};
use crate::canonical::CanonicalImage;
use crate::error::{Error, Result};

/// Backend for `image::DynamicImage`, an image object tagged with its color type.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicImageBackend;

impl DynamicImageBackend {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&self, path: &Path) -> Result<DynamicImage> {
        ensure_file_exists(path)?;

        image::open(path).map_err(|e| match e {
            image::ImageError::IoError(source) => Error::Io {
                path: path.to_path_buf(),
                source,
            },
            image::ImageError::Unsupported(unsupported) => {
                Error::UnsupportedFormat(unsupported.to_string())
            }
            other => Error::Decode {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })
    }
}

/// Denormalizes a `DynamicImage` by its color type: 8-bit samples are divided
/// by 255, 16-bit by 65535 and float samples are taken as they are.
pub(crate) fn dynamic_to_canonical(image: &DynamicImage) -> Result<CanonicalImage> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let channels = image.color().channel_count() as usize;

    let samples: Vec<f32> = match image {
        DynamicImage::ImageLuma8(buf) => scale_u8(buf.as_raw()),
        DynamicImage::ImageLumaA8(buf) => scale_u8(buf.as_raw()),
        DynamicImage::ImageRgb8(buf) => scale_u8(buf.as_raw()),
        DynamicImage::ImageRgba8(buf) => scale_u8(buf.as_raw()),
        DynamicImage::ImageLuma16(buf) => scale_u16(buf.as_raw()),
        DynamicImage::ImageLumaA16(buf) => scale_u16(buf.as_raw()),
        DynamicImage::ImageRgb16(buf) => scale_u16(buf.as_raw()),
        DynamicImage::ImageRgba16(buf) => scale_u16(buf.as_raw()),
        DynamicImage::ImageRgb32F(buf) => buf.as_raw().clone(),
        DynamicImage::ImageRgba32F(buf) => buf.as_raw().clone(),
        other => {
            return Err(Error::UnsupportedColorType(format!("{:?}", other.color())));
        }
    };

    Ok(Array3::from_shape_vec((height, width, channels), samples)?)
}

fn scale_u8(samples: &[u8]) -> Vec<f32> {
    samples
        .iter()
        .map(|&v| v as f32 / u8::MAX as f32)
        .collect()
}

fn scale_u16(samples: &[u16]) -> Vec<f32> {
    samples
        .iter()
        .map(|&v| v as f32 / u16::MAX as f32)
        .collect()
}

impl ImageBackend for DynamicImageBackend {
    fn native_type(&self) -> NativeType {
        NativeType::of::<DynamicImage>()
    }

    fn import_image(&self, path: &Path) -> Result<NativeImage> {
        let image = self.decode(path)?;
        tracing::debug!(
            "Decoded {} as {}x{} {:?}",
            path.display(),
            image.width(),
            image.height(),
            image.color()
        );
        Ok(NativeImage::new(image))
    }

    fn export_image(&self, image: &dyn Any) -> Result<CanonicalImage> {
        dynamic_to_canonical(downcast_native::<DynamicImage>(image)?)
    }
}
