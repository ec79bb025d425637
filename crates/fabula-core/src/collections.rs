//! Hash collections used across the workspace.
//!
//! FxHash is faster than SipHash for the short string and integer keys
//! we index by, and none of these maps are exposed to untrusted input.

pub use rustc_hash::{FxHashMap, FxHashSet};
