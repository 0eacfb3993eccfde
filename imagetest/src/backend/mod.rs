//! Backend capability interface and the type-erased native image values it works on.

#[cfg(feature = "png")]
mod array;
mod builtin;
#[cfg(feature = "image")]
mod dynamic;
#[cfg(feature = "tensor")]
mod tensor;

#[cfg(test)]
mod tests;

use std::any::{Any, TypeId};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::canonical::CanonicalImage;
use crate::error::{Error, Result};

#[cfg(feature = "png")]
pub use array::ArrayBackend;
pub use builtin::BuiltinBackend;
#[cfg(feature = "image")]
pub use dynamic::DynamicImageBackend;
#[cfg(feature = "tensor")]
pub use tensor::TensorBackend;

/// Membership tag of a backend: the concrete Rust type of the images it owns.
///
/// Two tags are equal when their `TypeId`s are; the name is for messages only.
#[derive(Clone, Copy, Debug)]
pub struct NativeType {
    type_id: TypeId,
    name: &'static str,
}

impl NativeType {
    pub fn of<T: Any>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True if `image` (or the value inside a [`NativeImage`]) is of this type.
    pub fn matches(&self, image: &dyn Any) -> bool {
        unwrap_native(image).type_id() == self.type_id
    }
}

impl PartialEq for NativeType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for NativeType {}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Owned image of whatever type a backend's decoder produced.
pub struct NativeImage {
    inner: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl NativeImage {
    pub fn new<T: Any + Send>(image: T) -> Self {
        Self {
            inner: Box::new(image),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn as_any(&self) -> &dyn Any {
        self.inner.as_ref()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Takes the concrete value out, or gives the image back on a type mismatch.
    pub fn downcast<T: Any>(self) -> std::result::Result<T, Self> {
        let type_name = self.type_name;
        match self.inner.downcast::<T>() {
            Ok(image) => Ok(*image),
            Err(inner) => Err(Self { inner, type_name }),
        }
    }
}

impl fmt::Debug for NativeImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeImage {{ type: {} }}", self.type_name)
    }
}

/// Sees through a [`NativeImage`] passed as `&dyn Any` to the value it holds.
pub fn unwrap_native(image: &dyn Any) -> &dyn Any {
    match image.downcast_ref::<NativeImage>() {
        Some(native) => native.as_any(),
        None => image,
    }
}

/// Downcasts `image` to the backend's native type or reports a type mismatch.
pub fn downcast_native<T: Any>(image: &dyn Any) -> Result<&T> {
    let image = unwrap_native(image);
    image.downcast_ref::<T>().ok_or_else(|| Error::TypeMismatch {
        expected: std::any::type_name::<T>(),
        actual: image.type_id(),
    })
}

/// Adapter for one native image representation.
///
/// Implementations are stateless after construction; all methods take `&self`.
pub trait ImageBackend: Send + Sync {
    fn native_type(&self) -> NativeType;

    /// True if this backend owns `image`.
    fn contains(&self, image: &dyn Any) -> bool {
        self.native_type().matches(image)
    }

    /// Reads and decodes `path` into the backend's native representation.
    fn import_image(&self, path: &Path) -> Result<NativeImage>;

    /// Converts a native image into its [`CanonicalImage`] form. Performs no I/O.
    fn export_image(&self, image: &dyn Any) -> Result<CanonicalImage>;
}

impl fmt::Debug for dyn ImageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageBackend {{ native_type: {} }}", self.native_type())
    }
}

pub type SharedBackend = Arc<dyn ImageBackend>;

/// Identifies a backend either directly or by its registered name.
#[derive(Clone)]
pub enum BackendRef {
    Name(String),
    Instance(SharedBackend),
}

impl fmt::Debug for BackendRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendRef::Name(name) => f.debug_tuple("Name").field(name).finish(),
            BackendRef::Instance(backend) => f
                .debug_tuple("Instance")
                .field(&backend.native_type().name())
                .finish(),
        }
    }
}

impl From<&str> for BackendRef {
    fn from(name: &str) -> Self {
        BackendRef::Name(name.to_string())
    }
}

impl From<String> for BackendRef {
    fn from(name: String) -> Self {
        BackendRef::Name(name)
    }
}

impl From<SharedBackend> for BackendRef {
    fn from(backend: SharedBackend) -> Self {
        BackendRef::Instance(backend)
    }
}

impl From<&SharedBackend> for BackendRef {
    fn from(backend: &SharedBackend) -> Self {
        BackendRef::Instance(Arc::clone(backend))
    }
}

/// Fails with `FileNotFound` before any decoder gets to see a missing path.
pub(crate) fn ensure_file_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::FileNotFound(path.to_path_buf()))
    }
}
