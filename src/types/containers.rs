//! Composite primitives: `optional`, `vector`, `set`, and `map`. Each wraps
//! inner codecs and composes their four operations.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::codec::{json_kind, ByteReader, ByteWriter, Codec, CodecRef, ToObjectOptions};
use crate::error::CodecError;
use crate::value::Value;

/// One flag byte, then the inner encoding iff the flag is 1. Absent and
/// JSON `null` are both "not present".
struct OptionalCodec {
    name: String,
    inner: CodecRef,
}

impl Codec for OptionalCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn required(&self) -> bool {
        false
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        match input {
            None | Some(JsonValue::Null) => Ok(Value::Optional(None)),
            Some(v) => Ok(Value::Optional(Some(Box::new(
                self.inner.from_object(Some(v))?,
            )))),
        }
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        match value {
            None | Some(Value::Optional(None)) => Ok(JsonValue::Null),
            Some(Value::Optional(Some(inner))) => self.inner.to_object(Some(inner), opts),
            // Unwrapped inner values are accepted for convenience.
            Some(other) => self.inner.to_object(Some(other), opts),
        }
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Optional(None) => {
                out.write_u8(0);
                Ok(())
            }
            Value::Optional(Some(inner)) => {
                out.write_u8(1);
                self.inner.append_bytes(out, inner)
            }
            other => {
                out.write_u8(1);
                self.inner.append_bytes(out, other)
            }
        }
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        let flag = cur.read_u8()?;
        if flag == 0 {
            Ok(Value::Optional(None))
        } else {
            Ok(Value::Optional(Some(Box::new(self.inner.from_bytes(cur)?))))
        }
    }
}

/// varuint32 count then homogeneous elements. The sorted variant re-sorts
/// on `from_object` and emits in element order; duplicates are preserved.
struct VectorCodec {
    name: String,
    inner: CodecRef,
    sorted: bool,
}

impl VectorCodec {
    fn expect_array<'a>(&self, input: &'a JsonValue) -> Result<&'a Vec<JsonValue>, CodecError> {
        match input {
            JsonValue::Array(items) => Ok(items),
            other => Err(CodecError::TypeMismatch {
                type_name: self.name.clone(),
                expected: "array".into(),
                actual: json_kind(other).into(),
            }),
        }
    }
}

impl Codec for VectorCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        let input = match input {
            Some(v) if !v.is_null() => v,
            _ => {
                return Err(CodecError::Required {
                    path: self.name.clone(),
                })
            }
        };
        let items = self.expect_array(input)?;
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            values.push(self.inner.from_object(Some(item))?);
        }
        if self.sorted {
            values.sort();
        }
        Ok(Value::Array(values))
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        match value {
            Some(Value::Array(values)) => {
                let mut out = Vec::with_capacity(values.len());
                for v in values {
                    out.push(self.inner.to_object(Some(v), opts)?);
                }
                Ok(JsonValue::Array(out))
            }
            Some(other) => Err(CodecError::TypeMismatch {
                type_name: self.name.clone(),
                expected: "array".into(),
                actual: other.kind().into(),
            }),
            None if opts.defaults => Ok(JsonValue::Array(Vec::new())),
            None => Err(CodecError::Required {
                path: self.name.clone(),
            }),
        }
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        let values = match value {
            Value::Array(values) => values,
            other => {
                return Err(CodecError::TypeMismatch {
                    type_name: self.name.clone(),
                    expected: "array".into(),
                    actual: other.kind().into(),
                })
            }
        };
        out.write_varuint32(values.len() as u32);
        if self.sorted && !values.windows(2).all(|w| w[0] <= w[1]) {
            let mut ordered: Vec<&Value> = values.iter().collect();
            ordered.sort();
            for v in ordered {
                self.inner.append_bytes(out, v)?;
            }
        } else {
            for v in values {
                self.inner.append_bytes(out, v)?;
            }
        }
        Ok(())
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        let count = cur.read_varuint32()? as usize;
        let mut values = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            values.push(self.inner.from_bytes(cur)?);
        }
        Ok(Value::Array(values))
    }
}

/// As an unsorted vector, but `from_object` rejects duplicate elements.
struct SetCodec {
    name: String,
    vector: VectorCodec,
}

impl Codec for SetCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        let value = self.vector.from_object(input)?;
        if let Value::Array(values) = &value {
            let mut seen: Vec<&Value> = values.iter().collect();
            seen.sort();
            if seen.windows(2).any(|w| w[0] == w[1]) {
                return Err(CodecError::Duplicate {
                    type_name: self.name.clone(),
                });
            }
        }
        Ok(value)
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        self.vector.to_object(value, opts)
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        self.vector.append_bytes(out, value)
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        self.vector.from_bytes(cur)
    }
}

/// varuint32 count then (key, value) pairs. Object form is an array of
/// two-element arrays; a JSON object is accepted when keys parse through
/// the key codec.
struct MapCodec {
    name: String,
    key: CodecRef,
    value: CodecRef,
}

impl Codec for MapCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        let input = match input {
            Some(v) if !v.is_null() => v,
            _ => {
                return Err(CodecError::Required {
                    path: self.name.clone(),
                })
            }
        };
        let mut pairs = Vec::new();
        match input {
            JsonValue::Array(entries) => {
                for entry in entries {
                    let pair = match entry {
                        JsonValue::Array(kv) if kv.len() == 2 => kv,
                        other => {
                            return Err(CodecError::Format {
                                type_name: self.name.clone(),
                                message: format!(
                                    "map entry must be a [key, value] pair, got {}",
                                    json_kind(other)
                                ),
                            })
                        }
                    };
                    pairs.push((
                        self.key.from_object(Some(&pair[0]))?,
                        self.value.from_object(Some(&pair[1]))?,
                    ));
                }
            }
            JsonValue::Object(entries) => {
                for (k, v) in entries {
                    let key_json = JsonValue::String(k.clone());
                    pairs.push((
                        self.key.from_object(Some(&key_json))?,
                        self.value.from_object(Some(v))?,
                    ));
                }
            }
            other => {
                return Err(CodecError::TypeMismatch {
                    type_name: self.name.clone(),
                    expected: "array of pairs or object".into(),
                    actual: json_kind(other).into(),
                })
            }
        }
        Ok(Value::Pairs(pairs))
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        match value {
            Some(Value::Pairs(pairs)) => {
                let mut out = Vec::with_capacity(pairs.len());
                for (k, v) in pairs {
                    out.push(JsonValue::Array(vec![
                        self.key.to_object(Some(k), opts)?,
                        self.value.to_object(Some(v), opts)?,
                    ]));
                }
                Ok(JsonValue::Array(out))
            }
            Some(other) => Err(CodecError::TypeMismatch {
                type_name: self.name.clone(),
                expected: "map".into(),
                actual: other.kind().into(),
            }),
            None if opts.defaults => Ok(JsonValue::Array(Vec::new())),
            None => Err(CodecError::Required {
                path: self.name.clone(),
            }),
        }
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        let pairs = match value {
            Value::Pairs(pairs) => pairs,
            other => {
                return Err(CodecError::TypeMismatch {
                    type_name: self.name.clone(),
                    expected: "map".into(),
                    actual: other.kind().into(),
                })
            }
        };
        out.write_varuint32(pairs.len() as u32);
        for (k, v) in pairs {
            self.key.append_bytes(out, k)?;
            self.value.append_bytes(out, v)?;
        }
        Ok(())
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        let count = cur.read_varuint32()? as usize;
        let mut pairs = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            let k = self.key.from_bytes(cur)?;
            let v = self.value.from_bytes(cur)?;
            pairs.push((k, v));
        }
        Ok(Value::Pairs(pairs))
    }
}

pub fn optional(inner: CodecRef) -> CodecRef {
    Arc::new(OptionalCodec {
        name: format!("{}?", inner.name()),
        inner,
    })
}

pub fn vector(inner: CodecRef, sorted: bool) -> CodecRef {
    Arc::new(VectorCodec {
        name: format!("{}[]", inner.name()),
        inner,
        sorted,
    })
}

pub fn set(inner: CodecRef) -> CodecRef {
    let name = format!("set[{}]", inner.name());
    Arc::new(SetCodec {
        name: name.clone(),
        vector: VectorCodec {
            name,
            inner,
            sorted: false,
        },
    })
}

pub fn map(key: CodecRef, value: CodecRef) -> CodecRef {
    Arc::new(MapCodec {
        name: format!("map[{},{}]", key.name(), value.name()),
        key,
        value,
    })
}
