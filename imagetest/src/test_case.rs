//! Adapter between the backend registry and a test fixture.

use std::any::Any;
use std::path::{Path, PathBuf};

use crate::backend::{BackendRef, NativeImage, SharedBackend};
use crate::canonical::DEFAULT_MEAN_ABS_TOLERANCE;
use crate::config::ImageTestConfig;
use crate::error::{Error, Result};
use crate::registry::{BackendRegistry, RegisteredBackend};

/// Image helpers for a test fixture that owns a [`BackendRegistry`].
///
/// Implementors provide the registry and may override the default hooks;
/// every other method is provided.
pub trait ImageTestCase {
    fn registry(&self) -> &BackendRegistry;

    fn registry_mut(&mut self) -> &mut BackendRegistry;

    /// File loaded by [`load_image`](Self::load_image) when none is given.
    fn default_image_file(&self) -> Option<PathBuf> {
        None
    }

    /// Backend used by [`load_image`](Self::load_image) when none is given.
    fn default_image_backend(&self) -> Option<BackendRef> {
        self.registry().default_backend().cloned()
    }

    fn mean_abs_tolerance(&self) -> f64 {
        DEFAULT_MEAN_ABS_TOLERANCE
    }

    fn add_image_backend(
        &mut self,
        name: &str,
        backend: SharedBackend,
        allow_duplicate_type: bool,
    ) -> Result<()> {
        self.registry_mut()
            .register(name, backend, allow_duplicate_type)
    }

    fn remove_image_backend(&mut self, name: &str) -> Result<SharedBackend> {
        self.registry_mut().unregister(name)
    }

    /// Imports `file` (or the default image file) with `backend` (or the
    /// default backend).
    fn load_image(&self, file: Option<&Path>, backend: Option<&BackendRef>) -> Result<NativeImage> {
        let file = match file {
            Some(file) => file.to_path_buf(),
            None => self.default_image_file().ok_or_else(|| {
                Error::Configuration(
                    "no image file given and no default image file configured".to_string(),
                )
            })?,
        };

        let backend = self
            .registry()
            .resolve_with(backend, || self.default_image_backend())?;

        backend.import_image(&file)
    }

    fn infer_image_backend(&self, image: &dyn Any) -> Result<&RegisteredBackend> {
        self.registry().infer(image)
    }

    /// Non-panicking form of [`assert_images_almost_equal`](Self::assert_images_almost_equal).
    fn check_images_almost_equal(
        &self,
        image1: &dyn Any,
        image2: &dyn Any,
        backend1: Option<&BackendRef>,
        backend2: Option<&BackendRef>,
    ) -> Result<()> {
        self.registry().assert_images_almost_equal(
            image1,
            image2,
            self.mean_abs_tolerance(),
            backend1,
            backend2,
        )
    }

    /// Panics unless the two images are almost equal under
    /// [`mean_abs_tolerance`](Self::mean_abs_tolerance).
    ///
    /// Backends are inferred from the images when not given.
    #[track_caller]
    fn assert_images_almost_equal(
        &self,
        image1: &dyn Any,
        image2: &dyn Any,
        backend1: Option<&BackendRef>,
        backend2: Option<&BackendRef>,
    ) {
        if let Err(err) = self.check_images_almost_equal(image1, image2, backend1, backend2) {
            panic!("{err}");
        }
    }
}

/// Stock [`ImageTestCase`] driven by an [`ImageTestConfig`].
#[derive(Debug, Clone)]
pub struct ImageTester {
    registry: BackendRegistry,
    default_image_file: Option<PathBuf>,
    mean_abs_tolerance: f64,
}

impl Default for ImageTester {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageTester {
    /// All available builtin backends, no defaults, default tolerance.
    pub fn new() -> Self {
        Self {
            registry: BackendRegistry::discover(),
            default_image_file: None,
            mean_abs_tolerance: DEFAULT_MEAN_ABS_TOLERANCE,
        }
    }

    pub fn from_config(config: ImageTestConfig) -> Result<Self> {
        let mut registry = if config.backends.is_empty() {
            BackendRegistry::discover()
        } else {
            BackendRegistry::discover_only(&config.backends)?
        };

        if let Some(name) = config.default_backend {
            if !registry.contains_name(&name) {
                return Err(Error::Configuration(format!(
                    "default image backend '{name}' is not available"
                )));
            }
            registry.set_default_backend(name);
        }

        Ok(Self {
            registry,
            default_image_file: config.default_image_file,
            mean_abs_tolerance: config.mean_abs_tolerance,
        })
    }

    pub fn with_registry(mut self, registry: BackendRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_default_image_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.default_image_file = Some(file.into());
        self
    }

    pub fn with_default_backend(mut self, backend: impl Into<BackendRef>) -> Self {
        self.registry.set_default_backend(backend);
        self
    }

    pub fn with_mean_abs_tolerance(mut self, tolerance: f64) -> Self {
        self.mean_abs_tolerance = tolerance;
        self
    }
}

impl ImageTestCase for ImageTester {
    fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut BackendRegistry {
        &mut self.registry
    }

    fn default_image_file(&self) -> Option<PathBuf> {
        self.default_image_file.clone()
    }

    fn mean_abs_tolerance(&self) -> f64 {
        self.mean_abs_tolerance
    }
}
