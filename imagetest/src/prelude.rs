// Backends
pub use crate::backend::{
    BackendRef, BuiltinBackend, ImageBackend, NativeImage, NativeType, SharedBackend,
};

// Canonical form and comparison
pub use crate::canonical::{CanonicalImage, ImageDiff, DEFAULT_MEAN_ABS_TOLERANCE};

// Error handling
pub use crate::error::{Error, Result};

// Registry
pub use crate::registry::{BackendRegistry, RegisteredBackend};

// Test harness
pub use crate::config::ImageTestConfig;
pub use crate::test_case::{ImageTestCase, ImageTester};
