use std::any::Any;
use std::path::Path;

use ndarray::{ArrayD, Ix3};

use super::dynamic::{dynamic_to_canonical, DynamicImageBackend};
use super::{downcast_native, ImageBackend, NativeImage, NativeType};
use crate::canonical::CanonicalImage;
use crate::error::{Error, Result};

/// Channel-first float tensor backend.
///
/// Native images are `ArrayD<f32>` of rank 3 laid out as channels x height x
/// width with values already in [0, 1]. Files are decoded through the
/// `image` crate and converted, the way tensor libraries build tensors from a
/// decoded image object.
#[derive(Debug, Default, Clone, Copy)]
pub struct TensorBackend {
    decoder: DynamicImageBackend,
}

impl TensorBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&self, path: &Path) -> Result<ArrayD<f32>> {
        let image = self.decoder.decode(path)?;
        let hwc = dynamic_to_canonical(&image)?;

        Ok(hwc
            .permuted_axes([2, 0, 1])
            .as_standard_layout()
            .into_owned()
            .into_dyn())
    }
}

impl ImageBackend for TensorBackend {
    fn native_type(&self) -> NativeType {
        NativeType::of::<ArrayD<f32>>()
    }

    fn import_image(&self, path: &Path) -> Result<NativeImage> {
        let tensor = self.decode(path)?;
        tracing::debug!("Decoded {} into a {:?} tensor", path.display(), tensor.shape());
        Ok(NativeImage::new(tensor))
    }

    fn export_image(&self, image: &dyn Any) -> Result<CanonicalImage> {
        let tensor = downcast_native::<ArrayD<f32>>(image)?;

        let chw = tensor.view().into_dimensionality::<Ix3>().map_err(|_| {
            Error::InvalidShape(format!(
                "expected a channels x height x width tensor, got shape {:?}",
                tensor.shape()
            ))
        })?;

        Ok(chw.permuted_axes([1, 2, 0]).as_standard_layout().into_owned())
    }
}
