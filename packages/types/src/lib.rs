//! Shared primitives for the Cartella workspace.
//!
//! Everything here is deliberately small: error/result re-exports, JSON
//! helpers, and id generation. Crates depend on this instead of spelling
//! out `anyhow`/`serde_json` paths themselves.

pub use anyhow::{Context, Error, Result, anyhow, bail};
pub use serde_json::Value;

pub mod json {
    pub use serde_json::{
        Map, Number, Value, from_slice, from_str, from_value, json, to_string, to_string_pretty,
        to_value, to_vec,
    };
}

/// Collision-resistant id used for every surrogate key in the data model.
pub fn create_id() -> String {
    cuid2::create_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_url_safe() {
        let a = create_id();
        let b = create_id();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
