//! Ordered set of active image backends, keyed by name.

mod compare;
mod inference;


use std::sync::Arc;

use common::{KeyIndexKey, KeyIndexVec};

use crate::backend::{BackendRef, BuiltinBackend, NativeType, SharedBackend};
use crate::error::{Error, Result};

/// A backend together with the name it was registered under.
#[derive(Clone)]
pub struct RegisteredBackend {
    name: String,
    backend: SharedBackend,
}

impl RegisteredBackend {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    pub fn native_type(&self) -> NativeType {
        self.backend.native_type()
    }
}

impl KeyIndexKey<String> for RegisteredBackend {
    fn key(&self) -> &String {
        &self.name
    }
}

impl std::fmt::Debug for RegisteredBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredBackend")
            .field("name", &self.name)
            .field("native_type", &self.native_type().name())
            .finish()
    }
}

/// Registration order is kept and decides which backend wins inference.
///
/// Owned by a single test case or harness; not meant to be shared for mutation.
#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
    backends: KeyIndexVec<String, RegisteredBackend>,
    default_backend: Option<BackendRef>,
}

impl BackendRegistry {
    /// Creates a registry with no backends.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every builtin backend whose decoder is available.
    pub fn discover() -> Self {
        let mut registry = Self::new();
        for kind in BuiltinBackend::all() {
            registry.register_builtin(kind);
        }
        registry
    }

    /// Like [`discover`](Self::discover), limited to the named builtin kinds.
    /// Builtin order is kept regardless of the order of `names`.
    pub fn discover_only<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut kinds = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let kind = BuiltinBackend::from_name(name)
                .ok_or_else(|| Error::BackendNotFound(name.to_string()))?;
            kinds.push(kind);
        }

        let mut registry = Self::new();
        for kind in BuiltinBackend::all().filter(|kind| kinds.contains(kind)) {
            registry.register_builtin(kind);
        }
        Ok(registry)
    }

    fn register_builtin(&mut self, kind: BuiltinBackend) {
        // Unavailable decoders are expected here; every other failure is a bug.
        match kind.create() {
            Ok(backend) => {
                tracing::debug!("Image backend '{}' is available", kind.name());
                if let Err(err) = self.register(kind.name(), backend, false) {
                    tracing::warn!("Skipping builtin backend '{}': {}", kind.name(), err);
                }
            }
            Err(err) => {
                tracing::debug!("Image backend '{}' skipped: {}", kind.name(), err);
            }
        }
    }

    /// Adds `backend` under `name`.
    ///
    /// Unless `allow_duplicate_type` is set, fails with `Conflict` when another
    /// registered backend already owns the same native type. Registering an
    /// existing name replaces that backend and keeps its position.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        backend: SharedBackend,
        allow_duplicate_type: bool,
    ) -> Result<()> {
        let name = name.into();
        let native_type = backend.native_type();

        if !allow_duplicate_type {
            let existing = self
                .backends
                .iter()
                .find(|entry| entry.name != name && entry.native_type() == native_type);
            if let Some(existing) = existing {
                return Err(Error::Conflict {
                    name,
                    existing: existing.name.clone(),
                    native_type: native_type.name(),
                });
            }
        }

        tracing::debug!("Registering image backend '{}' for {}", name, native_type);
        self.backends.push(RegisteredBackend { name, backend });

        Ok(())
    }

    /// Removes and returns the backend registered under `name`.
    pub fn unregister(&mut self, name: &str) -> Result<SharedBackend> {
        let removed = self
            .backends
            .remove_by_key(&name.to_string())
            .ok_or_else(|| Error::BackendNotFound(name.to_string()))?;
        tracing::debug!("Removed image backend '{}'", name);

        Ok(removed.backend)
    }

    pub fn get(&self, name: &str) -> Result<&SharedBackend> {
        self.backends
            .by_key(&name.to_string())
            .map(RegisteredBackend::backend)
            .ok_or_else(|| Error::BackendNotFound(name.to_string()))
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.backends.contains_key(&name.to_string())
    }

    /// Backend names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.backends.iter().map(RegisteredBackend::name)
    }

    /// Registered backends in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredBackend> {
        self.backends.iter()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn default_backend(&self) -> Option<&BackendRef> {
        self.default_backend.as_ref()
    }

    pub fn set_default_backend(&mut self, backend: impl Into<BackendRef>) {
        self.default_backend = Some(backend.into());
    }

    pub fn clear_default_backend(&mut self) {
        self.default_backend = None;
    }

    /// Resolves `backend`, falling back to the registry's default backend.
    pub fn resolve(&self, backend: Option<&BackendRef>) -> Result<SharedBackend> {
        self.resolve_with(backend, || self.default_backend.clone())
    }

    /// Resolves `backend`; when it is `None`, the backend returned by
    /// `default` is used instead.
    ///
    /// Instances are returned as they are, names are looked up. With neither
    /// a backend nor a default the result is a `Configuration` error.
    pub fn resolve_with(
        &self,
        backend: Option<&BackendRef>,
        default: impl FnOnce() -> Option<BackendRef>,
    ) -> Result<SharedBackend> {
        match backend {
            Some(backend) => self.resolve_ref(backend),
            None => match default() {
                Some(backend) => self.resolve_ref(&backend),
                None => Err(Error::Configuration(
                    "no image backend given and no default image backend configured"
                        .to_string(),
                )),
            },
        }
    }

    fn resolve_ref(&self, backend: &BackendRef) -> Result<SharedBackend> {
        match backend {
            BackendRef::Instance(backend) => Ok(Arc::clone(backend)),
            BackendRef::Name(name) => self.get(name).cloned(),
        }
    }
}
