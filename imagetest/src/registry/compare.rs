use std::any::Any;
use std::sync::Arc;

use super::BackendRegistry;
use crate::backend::{BackendRef, SharedBackend};
use crate::canonical::{image_diff, CanonicalImage, ImageDiff};
use crate::error::Result;

impl BackendRegistry {
    /// Backend for one side of a comparison: the explicit one when given,
    /// otherwise the one inferred from the image itself.
    pub fn backend_for(
        &self,
        image: &dyn Any,
        backend: Option<&BackendRef>,
    ) -> Result<SharedBackend> {
        match backend {
            Some(backend) => self.resolve(Some(backend)),
            None => self.infer(image).map(|entry| Arc::clone(entry.backend())),
        }
    }

    /// Exports `image` into its canonical array.
    pub fn export(&self, image: &dyn Any, backend: Option<&BackendRef>) -> Result<CanonicalImage> {
        self.backend_for(image, backend)?.export_image(image)
    }

    /// Exports both images and measures how far apart they are.
    pub fn compare_images(
        &self,
        image1: &dyn Any,
        image2: &dyn Any,
        backend1: Option<&BackendRef>,
        backend2: Option<&BackendRef>,
    ) -> Result<ImageDiff> {
        let canonical1 = self.export(image1, backend1)?;
        let canonical2 = self.export(image2, backend2)?;

        let diff = image_diff(&canonical1.view(), &canonical2.view())?;
        tracing::debug!(
            "Compared {:?} images: mean abs diff {:.6}, max abs diff {:.6}",
            diff.shape,
            diff.mean_abs,
            diff.max_abs
        );

        Ok(diff)
    }

    /// Passes when the mean absolute difference of the two canonical images
    /// is at most `mean_abs_tolerance`; fails with `NotAlmostEqual` otherwise.
    pub fn assert_images_almost_equal(
        &self,
        image1: &dyn Any,
        image2: &dyn Any,
        mean_abs_tolerance: f64,
        backend1: Option<&BackendRef>,
        backend2: Option<&BackendRef>,
    ) -> Result<()> {
        self.compare_images(image1, image2, backend1, backend2)?
            .check(mean_abs_tolerance)
    }
}
