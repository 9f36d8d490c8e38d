//! Byte and string primitives: length-prefixed `bytes`/`string` and the
//! fixed-width `fixed_bytesN`/`fixed_stringN` family.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::codec::{json_kind, ByteReader, ByteWriter, Codec, CodecRef, ToObjectOptions};
use crate::error::CodecError;
use crate::value::Value;

use super::require;

fn expect_hex(name: &str, input: &JsonValue) -> Result<Vec<u8>, CodecError> {
    match input {
        JsonValue::String(s) => hex::decode(s).map_err(|e| CodecError::Format {
            type_name: name.into(),
            message: format!("invalid hex: {}", e),
        }),
        other => Err(CodecError::TypeMismatch {
            type_name: name.into(),
            expected: "hex string".into(),
            actual: json_kind(other).into(),
        }),
    }
}

fn expect_str<'a>(name: &str, input: &'a JsonValue) -> Result<&'a str, CodecError> {
    match input {
        JsonValue::String(s) => Ok(s),
        other => Err(CodecError::TypeMismatch {
            type_name: name.into(),
            expected: "string".into(),
            actual: json_kind(other).into(),
        }),
    }
}

/// Length-prefixed raw byte sequence; object form is a hex string.
struct BytesCodec;

impl Codec for BytesCodec {
    fn name(&self) -> &str {
        "bytes"
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        let input = require("bytes", input)?;
        Ok(Value::Bytes(expect_hex("bytes", input)?))
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        match value {
            Some(Value::Bytes(b)) => Ok(JsonValue::String(hex::encode(b))),
            Some(other) => Err(CodecError::TypeMismatch {
                type_name: "bytes".into(),
                expected: "bytes".into(),
                actual: other.kind().into(),
            }),
            None if opts.defaults => Ok(JsonValue::String(String::new())),
            None => Err(CodecError::Required {
                path: "bytes".into(),
            }),
        }
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Bytes(b) => {
                out.write_bytes(b);
                Ok(())
            }
            other => Err(CodecError::TypeMismatch {
                type_name: "bytes".into(),
                expected: "bytes".into(),
                actual: other.kind().into(),
            }),
        }
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        Ok(Value::Bytes(cur.read_bytes()?.to_vec()))
    }
}

/// Length-prefixed UTF-8 text. Empty strings are allowed.
struct StringCodec;

impl Codec for StringCodec {
    fn name(&self) -> &str {
        "string"
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        let input = require("string", input)?;
        Ok(Value::Str(expect_str("string", input)?.to_string()))
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        match value {
            Some(Value::Str(s)) => Ok(JsonValue::String(s.clone())),
            Some(other) => Err(CodecError::TypeMismatch {
                type_name: "string".into(),
                expected: "string".into(),
                actual: other.kind().into(),
            }),
            None if opts.defaults => Ok(JsonValue::String(String::new())),
            None => Err(CodecError::Required {
                path: "string".into(),
            }),
        }
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Str(s) => {
                out.write_str(s);
                Ok(())
            }
            other => Err(CodecError::TypeMismatch {
                type_name: "string".into(),
                expected: "string".into(),
                actual: other.kind().into(),
            }),
        }
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        Ok(Value::Str(cur.read_str()?))
    }
}

/// Exactly `size` bytes on the wire, no length prefix. Object form is a hex
/// string of length `2 * size`.
struct FixedBytesCodec {
    name: String,
    size: usize,
}

impl Codec for FixedBytesCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        let input = require(&self.name, input)?;
        let bytes = expect_hex(&self.name, input)?;
        if bytes.len() != self.size {
            return Err(CodecError::LengthMismatch {
                type_name: self.name.clone(),
                len: bytes.len(),
                expected: self.size,
            });
        }
        Ok(Value::Bytes(bytes))
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        match value {
            Some(Value::Bytes(b)) => Ok(JsonValue::String(hex::encode(b))),
            Some(other) => Err(CodecError::TypeMismatch {
                type_name: self.name.clone(),
                expected: "bytes".into(),
                actual: other.kind().into(),
            }),
            None if opts.defaults => Ok(JsonValue::String(hex::encode(vec![0u8; self.size]))),
            None => Err(CodecError::Required {
                path: self.name.clone(),
            }),
        }
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Bytes(b) if b.len() == self.size => {
                out.write_raw(b);
                Ok(())
            }
            Value::Bytes(b) => Err(CodecError::LengthMismatch {
                type_name: self.name.clone(),
                len: b.len(),
                expected: self.size,
            }),
            other => Err(CodecError::TypeMismatch {
                type_name: self.name.clone(),
                expected: "bytes".into(),
                actual: other.kind().into(),
            }),
        }
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        Ok(Value::Bytes(cur.read_exact(self.size)?.to_vec()))
    }
}

/// Up to `size` UTF-8 bytes, zero-padded to `size` on the wire.
struct FixedStringCodec {
    name: String,
    size: usize,
}

impl Codec for FixedStringCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        let input = require(&self.name, input)?;
        let s = expect_str(&self.name, input)?;
        if s.len() > self.size {
            return Err(CodecError::ExceedsMaxLen {
                type_name: self.name.clone(),
                max: self.size,
                len: s.len(),
            });
        }
        Ok(Value::Str(s.to_string()))
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        match value {
            Some(Value::Str(s)) => Ok(JsonValue::String(s.clone())),
            Some(other) => Err(CodecError::TypeMismatch {
                type_name: self.name.clone(),
                expected: "string".into(),
                actual: other.kind().into(),
            }),
            None if opts.defaults => Ok(JsonValue::String(String::new())),
            None => Err(CodecError::Required {
                path: self.name.clone(),
            }),
        }
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Str(s) if s.len() <= self.size => {
                out.write_raw(s.as_bytes());
                for _ in s.len()..self.size {
                    out.write_u8(0);
                }
                Ok(())
            }
            Value::Str(s) => Err(CodecError::ExceedsMaxLen {
                type_name: self.name.clone(),
                max: self.size,
                len: s.len(),
            }),
            other => Err(CodecError::TypeMismatch {
                type_name: self.name.clone(),
                expected: "string".into(),
                actual: other.kind().into(),
            }),
        }
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        let raw = cur.read_exact(self.size)?;
        let end = raw
            .iter()
            .rposition(|&b| b != 0)
            .map(|p| p + 1)
            .unwrap_or(0);
        String::from_utf8(raw[..end].to_vec())
            .map(Value::Str)
            .map_err(|source| CodecError::InvalidUtf8 {
                type_name: self.name.clone(),
                source,
            })
    }
}

pub fn bytes() -> CodecRef {
    Arc::new(BytesCodec)
}

pub fn string() -> CodecRef {
    Arc::new(StringCodec)
}

pub fn fixed_bytes(size: usize) -> CodecRef {
    Arc::new(FixedBytesCodec {
        name: format!("fixed_bytes{}", size),
        size,
    })
}

pub fn fixed_string(size: usize) -> CodecRef {
    Arc::new(FixedStringCodec {
        name: format!("fixed_string{}", size),
        size,
    })
}
