//! Approximate image equality for unit tests, across image backends.
//!
//! Each backend imports files into its own native representation and exports
//! it to a [`CanonicalImage`] (height x width x channel `f32` in [0, 1]).
//! Two images from any backends are compared by the mean absolute difference
//! of their canonical forms.

mod backend;
mod canonical;
mod config;
mod error;
mod registry;
mod test_case;

pub mod prelude;

use std::any::Any;
use std::sync::OnceLock;

pub use prelude::*;

// Backends
#[cfg(feature = "png")]
pub use crate::backend::ArrayBackend;
#[cfg(feature = "image")]
pub use crate::backend::DynamicImageBackend;
#[cfg(feature = "tensor")]
pub use crate::backend::TensorBackend;
pub use crate::backend::{downcast_native, unwrap_native};

// Canonical form
pub use crate::canonical::{image_diff, is_normalized};

/// Process-wide registry of every available builtin backend.
///
/// Discovered on first use and never modified afterwards. Tests that need to
/// add or remove backends should own a [`BackendRegistry`] instead.
pub fn image_backends() -> &'static BackendRegistry {
    static REGISTRY: OnceLock<BackendRegistry> = OnceLock::new();
    REGISTRY.get_or_init(BackendRegistry::discover)
}

/// Checks two images against [`DEFAULT_MEAN_ABS_TOLERANCE`] using
/// [`image_backends`], inferring both backends.
pub fn assert_images_almost_equal(image1: &dyn Any, image2: &dyn Any) -> Result<()> {
    image_backends().assert_images_almost_equal(
        image1,
        image2,
        DEFAULT_MEAN_ABS_TOLERANCE,
        None,
        None,
    )
}
