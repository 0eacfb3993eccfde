use std::str::FromStr;
#[cfg(any(feature = "png", feature = "image"))]
use std::sync::Arc;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use super::SharedBackend;
use crate::error::{Error, Result};

/// Backend kinds shipped with the crate. Declaration order is discovery order.
#[derive(Debug, Display, EnumIter, EnumString, IntoStaticStr, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum BuiltinBackend {
    /// `Array3<u8>` decoded by the `png` crate.
    Array,
    /// `image::DynamicImage`.
    Image,
    /// Channel-first `ArrayD<f32>`.
    Tensor,
}

impl BuiltinBackend {
    pub fn all() -> impl Iterator<Item = BuiltinBackend> {
        Self::iter()
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::from_str(name).ok()
    }

    pub fn required_feature(self) -> &'static str {
        match self {
            BuiltinBackend::Array => "png",
            BuiltinBackend::Image => "image",
            BuiltinBackend::Tensor => "tensor",
        }
    }

    /// Builds the backend, or fails with `BackendUnavailable` when its
    /// decoder was not compiled in.
    pub fn create(self) -> Result<SharedBackend> {
        match self {
            BuiltinBackend::Array => create_array(),
            BuiltinBackend::Image => create_image(),
            BuiltinBackend::Tensor => create_tensor(),
        }
    }

    fn unavailable(self) -> Error {
        Error::BackendUnavailable {
            backend: self.name(),
            feature: self.required_feature(),
        }
    }
}

#[cfg(feature = "png")]
fn create_array() -> Result<SharedBackend> {
    Ok(Arc::new(super::ArrayBackend::new()))
}

#[cfg(not(feature = "png"))]
fn create_array() -> Result<SharedBackend> {
    Err(BuiltinBackend::Array.unavailable())
}

#[cfg(feature = "image")]
fn create_image() -> Result<SharedBackend> {
    Ok(Arc::new(super::DynamicImageBackend::new()))
}

#[cfg(not(feature = "image"))]
fn create_image() -> Result<SharedBackend> {
    Err(BuiltinBackend::Image.unavailable())
}

#[cfg(feature = "tensor")]
fn create_tensor() -> Result<SharedBackend> {
    Ok(Arc::new(super::TensorBackend::new()))
}

#[cfg(not(feature = "tensor"))]
fn create_tensor() -> Result<SharedBackend> {
    Err(BuiltinBackend::Tensor.unavailable())
}
