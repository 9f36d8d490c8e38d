//! The type factory: the fixed catalog of built-in primitive codecs.
//!
//! A `TypeFactory` is instantiated once per compilation; the codec
//! instances it hands out are immutable for the lifetime of that
//! compilation and may be shared freely.

pub mod buffers;
pub mod containers;
pub mod int;
pub mod time;

use std::collections::HashMap;

use serde_json::Value as JsonValue;
use tracing::trace;

use crate::codec::CodecRef;
use crate::config::FactoryConfig;
use crate::error::CodecError;

pub use buffers::{bytes, fixed_bytes, fixed_string, string};
pub use containers::{map, optional, set, vector};
pub use int::{
    int16, int32, int64, int8, uint16, uint32, uint64, uint8, varint32, varuint32,
};
pub use time::time;

/// Fixed-width byte sizes registered by name (`fixed_bytes16`, ...). These
/// cover the common digest, key, and signature widths.
pub const FIXED_BYTES_SIZES: &[usize] = &[16, 20, 28, 32, 33, 48, 64, 65];

/// Fixed-width string sizes registered by name (`fixed_string16`, ...).
pub const FIXED_STRING_SIZES: &[usize] = &[16, 32, 64];

/// Reject absent or `null` input for a required codec.
pub(crate) fn require<'a>(
    name: &str,
    input: Option<&'a JsonValue>,
) -> Result<&'a JsonValue, CodecError> {
    match input {
        Some(v) if !v.is_null() => Ok(v),
        _ => Err(CodecError::Required { path: name.into() }),
    }
}

/// The built-in primitive catalog, keyed by schema name.
pub struct TypeFactory {
    codecs: HashMap<&'static str, CodecRef>,
    fixed: HashMap<String, CodecRef>,
}

impl TypeFactory {
    pub fn new(config: &FactoryConfig) -> Self {
        let mut codecs: HashMap<&'static str, CodecRef> = HashMap::new();
        codecs.insert("uint8", uint8());
        codecs.insert("uint16", uint16());
        codecs.insert("uint32", uint32());
        codecs.insert("uint64", uint64());
        codecs.insert("int8", int8());
        codecs.insert("int16", int16());
        codecs.insert("int32", int32());
        codecs.insert("int64", int64());
        codecs.insert("varuint32", varuint32());
        codecs.insert("varint32", varint32());
        codecs.insert("bytes", bytes());
        codecs.insert("string", string());
        codecs.insert("time", time());

        let mut fixed: HashMap<String, CodecRef> = HashMap::new();
        for &size in FIXED_BYTES_SIZES {
            let codec = fixed_bytes(size);
            fixed.insert(codec.name().to_string(), codec);
        }
        for &size in FIXED_STRING_SIZES {
            let codec = fixed_string(size);
            fixed.insert(codec.name().to_string(), codec);
        }

        if config.debug {
            trace!(
                builtins = codecs.len() + fixed.len(),
                "type factory catalog built"
            );
        }

        TypeFactory { codecs, fixed }
    }

    /// Look up a primitive by schema name.
    pub fn get(&self, name: &str) -> Option<CodecRef> {
        self.codecs
            .get(name)
            .cloned()
            .or_else(|| self.fixed.get(name).cloned())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name) || self.fixed.contains_key(name)
    }
}
