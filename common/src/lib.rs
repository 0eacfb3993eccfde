use std::path::Path;

pub mod key_index_vec;
pub mod log_setup;
pub mod test_utils;

pub use key_index_vec::{KeyIndexKey, KeyIndexVec};

pub fn get_file_extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|os_str| os_str.to_str())
}

pub fn is_debug() -> bool {
    cfg!(debug_assertions)
}
