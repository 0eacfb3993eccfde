use std::any::Any;

use super::{BackendRegistry, RegisteredBackend};
use crate::backend::unwrap_native;
use crate::error::{Error, Result};

impl BackendRegistry {
    /// Finds the backend that owns `image`.
    ///
    /// Backends are scanned in registration order and the first whose native
    /// type matches wins. This is unambiguous as long as duplicate native
    /// types were not explicitly allowed at registration.
    pub fn infer(&self, image: &dyn Any) -> Result<&RegisteredBackend> {
        let found = self.iter().find(|entry| entry.backend().contains(image));

        match found {
            Some(entry) => {
                tracing::trace!("Inferred image backend '{}'", entry.name());
                Ok(entry)
            }
            None => Err(Error::UnknownBackend {
                type_id: unwrap_native(image).type_id(),
            }),
        }
    }

    /// Every backend that claims `image`, in registration order.
    pub fn candidates<'a>(
        &'a self,
        image: &'a dyn Any,
    ) -> impl Iterator<Item = &'a RegisteredBackend> + 'a {
        self.iter().filter(move |entry| entry.backend().contains(image))
    }
}
