//! The codec abstraction every type implements, plus the whole-buffer
//! conversion entry points.

pub mod cursor;

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::error::CodecError;
use crate::value::Value;

pub use cursor::{ByteReader, ByteWriter};

/// Options for `to_object`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToObjectOptions {
    /// When set, `to_object(None, ..)` produces a representative default
    /// specimen instead of failing with `Required`.
    pub defaults: bool,
}

impl ToObjectOptions {
    pub fn defaults() -> Self {
        ToObjectOptions { defaults: true }
    }
}

/// The universal four-operation interface. Every built-in primitive, struct,
/// and custom type is a `Codec`.
///
/// `None` and JSON `null` inputs are treated identically as "not present":
/// required codecs reject both, optional wrappers map them to the absent
/// encoding.
pub trait Codec: Send + Sync {
    /// Diagnostic name, e.g. `uint8` or `Person`.
    fn name(&self) -> &str;

    /// Whether absent input is rejected at `from_object`. Optional-wrapped
    /// codecs report `false`.
    fn required(&self) -> bool {
        true
    }

    /// Canonicalize a JSON-interchange value into the internal form.
    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError>;

    /// Inverse of `from_object`. With `opts.defaults` and no value, produces
    /// a representative default.
    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError>;

    /// Write the canonical byte encoding.
    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError>;

    /// Read from the cursor, advancing exactly by the bytes consumed.
    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError>;
}

/// Shared handle to a codec. Compiled codec graphs are immutable, so handles
/// are safe to clone across threads.
pub type CodecRef = Arc<dyn Codec>;

/// Serialize an object-form value to a fresh byte buffer.
pub fn to_buffer(codec: &dyn Codec, object: &JsonValue) -> Result<Vec<u8>, CodecError> {
    let value = codec.from_object(Some(object))?;
    let mut out = ByteWriter::new();
    codec.append_bytes(&mut out, &value)?;
    Ok(out.into_vec())
}

/// Deserialize a byte buffer back to the object form.
pub fn from_buffer(codec: &dyn Codec, data: &[u8]) -> Result<JsonValue, CodecError> {
    let mut cur = ByteReader::new(data);
    let value = codec.from_bytes(&mut cur)?;
    codec.to_object(Some(&value), &ToObjectOptions::default())
}

/// Short kind name of a JSON value for mismatch diagnostics.
pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
