//! Integer primitives: fixed-width 8/16/32/64 signed and unsigned, plus
//! LEB128 varints.
//!
//! Widths up to 32 bits use JSON numbers in the object form; 64-bit widths
//! use decimal strings so values survive hosts without native 64-bit
//! integers. Decimal strings are accepted everywhere.

use std::num::IntErrorKind;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::codec::{json_kind, ByteReader, ByteWriter, Codec, CodecRef, ToObjectOptions};
use crate::error::CodecError;
use crate::value::Value;

use super::require;

fn parse_uint(name: &str, max: u64, input: &JsonValue) -> Result<u64, CodecError> {
    match input {
        JsonValue::Number(n) => {
            if let Some(u) = n.as_u64() {
                if u > max {
                    return Err(CodecError::Overflow {
                        type_name: name.into(),
                        value: u.to_string(),
                    });
                }
                Ok(u)
            } else if n.as_i64().is_some() || n.as_f64().is_some_and(|f| f < 0.0) {
                Err(CodecError::Format {
                    type_name: name.into(),
                    message: format!("negative value {} for unsigned type", n),
                })
            } else {
                Err(CodecError::Format {
                    type_name: name.into(),
                    message: format!("{} is not an integer", n),
                })
            }
        }
        JsonValue::String(s) => {
            let t = s.trim();
            if t.starts_with('-') {
                return Err(CodecError::Format {
                    type_name: name.into(),
                    message: format!("negative value {} for unsigned type", t),
                });
            }
            match t.parse::<u64>() {
                Ok(u) if u > max => Err(CodecError::Overflow {
                    type_name: name.into(),
                    value: t.into(),
                }),
                Ok(u) => Ok(u),
                Err(e) if *e.kind() == IntErrorKind::PosOverflow => Err(CodecError::Overflow {
                    type_name: name.into(),
                    value: t.into(),
                }),
                Err(_) => Err(CodecError::Format {
                    type_name: name.into(),
                    message: format!("'{}' is not a decimal integer", t),
                }),
            }
        }
        other => Err(CodecError::TypeMismatch {
            type_name: name.into(),
            expected: "number or decimal string".into(),
            actual: json_kind(other).into(),
        }),
    }
}

fn parse_int(name: &str, min: i64, max: i64, input: &JsonValue) -> Result<i64, CodecError> {
    let check = |v: i64, shown: &str| {
        if v < min || v > max {
            Err(CodecError::Overflow {
                type_name: name.into(),
                value: shown.into(),
            })
        } else {
            Ok(v)
        }
    };
    match input {
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                check(i, &i.to_string())
            } else if n.as_u64().is_some() {
                Err(CodecError::Overflow {
                    type_name: name.into(),
                    value: n.to_string(),
                })
            } else {
                Err(CodecError::Format {
                    type_name: name.into(),
                    message: format!("{} is not an integer", n),
                })
            }
        }
        JsonValue::String(s) => {
            let t = s.trim();
            match t.parse::<i64>() {
                Ok(i) => check(i, t),
                Err(e)
                    if matches!(
                        e.kind(),
                        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow
                    ) =>
                {
                    Err(CodecError::Overflow {
                        type_name: name.into(),
                        value: t.into(),
                    })
                }
                Err(_) => Err(CodecError::Format {
                    type_name: name.into(),
                    message: format!("'{}' is not a decimal integer", t),
                }),
            }
        }
        other => Err(CodecError::TypeMismatch {
            type_name: name.into(),
            expected: "number or decimal string".into(),
            actual: json_kind(other).into(),
        }),
    }
}

/// Fixed-width unsigned integer, 8 to 64 bits.
struct UIntCodec {
    name: &'static str,
    bits: u32,
}

impl UIntCodec {
    fn max(&self) -> u64 {
        if self.bits == 64 {
            u64::MAX
        } else {
            (1u64 << self.bits) - 1
        }
    }

    fn unwrap_value(&self, value: &Value) -> Result<u64, CodecError> {
        let v = match value {
            Value::UInt(u) => *u,
            Value::Int(i) if *i >= 0 => *i as u64,
            other => {
                return Err(CodecError::TypeMismatch {
                    type_name: self.name.into(),
                    expected: "uint".into(),
                    actual: other.kind().into(),
                })
            }
        };
        if v > self.max() {
            return Err(CodecError::Overflow {
                type_name: self.name.into(),
                value: v.to_string(),
            });
        }
        Ok(v)
    }
}

impl Codec for UIntCodec {
    fn name(&self) -> &str {
        self.name
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        let input = require(self.name, input)?;
        Ok(Value::UInt(parse_uint(self.name, self.max(), input)?))
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        let v = match value {
            Some(v) => self.unwrap_value(v)?,
            None if opts.defaults => 0,
            None => {
                return Err(CodecError::Required {
                    path: self.name.into(),
                })
            }
        };
        if self.bits <= 32 {
            Ok(JsonValue::from(v))
        } else {
            Ok(JsonValue::String(v.to_string()))
        }
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        let v = self.unwrap_value(value)?;
        match self.bits {
            8 => out.write_u8(v as u8),
            16 => out.write_u16(v as u16),
            32 => out.write_u32(v as u32),
            _ => out.write_u64(v),
        }
        Ok(())
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        let v = match self.bits {
            8 => cur.read_u8()? as u64,
            16 => cur.read_u16()? as u64,
            32 => cur.read_u32()? as u64,
            _ => cur.read_u64()?,
        };
        Ok(Value::UInt(v))
    }
}

/// Fixed-width signed integer, 8 to 64 bits.
struct IntCodec {
    name: &'static str,
    bits: u32,
}

impl IntCodec {
    fn min(&self) -> i64 {
        if self.bits == 64 {
            i64::MIN
        } else {
            -(1i64 << (self.bits - 1))
        }
    }

    fn max(&self) -> i64 {
        if self.bits == 64 {
            i64::MAX
        } else {
            (1i64 << (self.bits - 1)) - 1
        }
    }

    fn unwrap_value(&self, value: &Value) -> Result<i64, CodecError> {
        let v = match value {
            Value::Int(i) => *i,
            Value::UInt(u) if *u <= i64::MAX as u64 => *u as i64,
            Value::UInt(u) => {
                return Err(CodecError::Overflow {
                    type_name: self.name.into(),
                    value: u.to_string(),
                })
            }
            other => {
                return Err(CodecError::TypeMismatch {
                    type_name: self.name.into(),
                    expected: "int".into(),
                    actual: other.kind().into(),
                })
            }
        };
        if v < self.min() || v > self.max() {
            return Err(CodecError::Overflow {
                type_name: self.name.into(),
                value: v.to_string(),
            });
        }
        Ok(v)
    }
}

impl Codec for IntCodec {
    fn name(&self) -> &str {
        self.name
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        let input = require(self.name, input)?;
        Ok(Value::Int(parse_int(
            self.name,
            self.min(),
            self.max(),
            input,
        )?))
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        let v = match value {
            Some(v) => self.unwrap_value(v)?,
            None if opts.defaults => 0,
            None => {
                return Err(CodecError::Required {
                    path: self.name.into(),
                })
            }
        };
        if self.bits <= 32 {
            Ok(JsonValue::from(v))
        } else {
            Ok(JsonValue::String(v.to_string()))
        }
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        let v = self.unwrap_value(value)?;
        match self.bits {
            8 => out.write_i8(v as i8),
            16 => out.write_i16(v as i16),
            32 => out.write_i32(v as i32),
            _ => out.write_i64(v),
        }
        Ok(())
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        let v = match self.bits {
            8 => cur.read_i8()? as i64,
            16 => cur.read_i16()? as i64,
            32 => cur.read_i32()? as i64,
            _ => cur.read_i64()?,
        };
        Ok(Value::Int(v))
    }
}

/// LEB128 unsigned varint, 32-bit range.
struct VarUint32Codec;

impl Codec for VarUint32Codec {
    fn name(&self) -> &str {
        "varuint32"
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        let input = require("varuint32", input)?;
        Ok(Value::UInt(parse_uint(
            "varuint32",
            u32::MAX as u64,
            input,
        )?))
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        match value {
            Some(Value::UInt(u)) => Ok(JsonValue::from(*u)),
            Some(other) => Err(CodecError::TypeMismatch {
                type_name: "varuint32".into(),
                expected: "uint".into(),
                actual: other.kind().into(),
            }),
            None if opts.defaults => Ok(JsonValue::from(0u64)),
            None => Err(CodecError::Required {
                path: "varuint32".into(),
            }),
        }
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::UInt(u) if *u <= u32::MAX as u64 => {
                out.write_varuint32(*u as u32);
                Ok(())
            }
            Value::UInt(u) => Err(CodecError::Overflow {
                type_name: "varuint32".into(),
                value: u.to_string(),
            }),
            other => Err(CodecError::TypeMismatch {
                type_name: "varuint32".into(),
                expected: "uint".into(),
                actual: other.kind().into(),
            }),
        }
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        Ok(Value::UInt(cur.read_varuint32()? as u64))
    }
}

/// Zig-zag encoded signed varint, 32-bit range.
struct VarInt32Codec;

impl Codec for VarInt32Codec {
    fn name(&self) -> &str {
        "varint32"
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        let input = require("varint32", input)?;
        Ok(Value::Int(parse_int(
            "varint32",
            i32::MIN as i64,
            i32::MAX as i64,
            input,
        )?))
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        match value {
            Some(Value::Int(i)) => Ok(JsonValue::from(*i)),
            Some(other) => Err(CodecError::TypeMismatch {
                type_name: "varint32".into(),
                expected: "int".into(),
                actual: other.kind().into(),
            }),
            None if opts.defaults => Ok(JsonValue::from(0i64)),
            None => Err(CodecError::Required {
                path: "varint32".into(),
            }),
        }
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Int(i) if *i >= i32::MIN as i64 && *i <= i32::MAX as i64 => {
                out.write_varint32(*i as i32);
                Ok(())
            }
            Value::Int(i) => Err(CodecError::Overflow {
                type_name: "varint32".into(),
                value: i.to_string(),
            }),
            other => Err(CodecError::TypeMismatch {
                type_name: "varint32".into(),
                expected: "int".into(),
                actual: other.kind().into(),
            }),
        }
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        Ok(Value::Int(cur.read_varint32()? as i64))
    }
}

pub fn uint8() -> CodecRef {
    Arc::new(UIntCodec {
        name: "uint8",
        bits: 8,
    })
}

pub fn uint16() -> CodecRef {
    Arc::new(UIntCodec {
        name: "uint16",
        bits: 16,
    })
}

pub fn uint32() -> CodecRef {
    Arc::new(UIntCodec {
        name: "uint32",
        bits: 32,
    })
}

pub fn uint64() -> CodecRef {
    Arc::new(UIntCodec {
        name: "uint64",
        bits: 64,
    })
}

pub fn int8() -> CodecRef {
    Arc::new(IntCodec {
        name: "int8",
        bits: 8,
    })
}

pub fn int16() -> CodecRef {
    Arc::new(IntCodec {
        name: "int16",
        bits: 16,
    })
}

pub fn int32() -> CodecRef {
    Arc::new(IntCodec {
        name: "int32",
        bits: 32,
    })
}

pub fn int64() -> CodecRef {
    Arc::new(IntCodec {
        name: "int64",
        bits: 64,
    })
}

pub fn varuint32() -> CodecRef {
    Arc::new(VarUint32Codec)
}

pub fn varint32() -> CodecRef {
    Arc::new(VarInt32Codec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_uint8_range() {
        let c = uint8();
        assert_eq!(c.from_object(Some(&json!(255))).unwrap(), Value::UInt(255));
        assert!(matches!(
            c.from_object(Some(&json!(256))),
            Err(CodecError::Overflow { .. })
        ));
        assert!(matches!(
            c.from_object(Some(&json!(-1))),
            Err(CodecError::Format { .. })
        ));
    }

    #[test]
    fn test_uint64_string_form() {
        let c = uint64();
        let v = c
            .from_object(Some(&json!("18446744073709551615")))
            .unwrap();
        assert_eq!(v, Value::UInt(u64::MAX));
        assert_eq!(
            c.to_object(Some(&v), &ToObjectOptions::default()).unwrap(),
            json!("18446744073709551615")
        );
        assert!(matches!(
            c.from_object(Some(&json!("18446744073709551616"))),
            Err(CodecError::Overflow { .. })
        ));
        assert!(matches!(
            c.from_object(Some(&json!("pork"))),
            Err(CodecError::Format { .. })
        ));
    }

    #[test]
    fn test_int64_bounds() {
        let c = int64();
        assert_eq!(
            c.from_object(Some(&json!("-9223372036854775808"))).unwrap(),
            Value::Int(i64::MIN)
        );
        assert!(matches!(
            c.from_object(Some(&json!("-9223372036854775809"))),
            Err(CodecError::Overflow { .. })
        ));
    }

    #[test]
    fn test_varint_wire() {
        let c = varint32();
        let mut w = ByteWriter::new();
        c.append_bytes(&mut w, &Value::Int(-1)).unwrap();
        assert_eq!(w.as_slice(), &[0x01]);
        let data = w.into_vec();
        let mut r = ByteReader::new(&data);
        assert_eq!(c.from_bytes(&mut r).unwrap(), Value::Int(-1));
    }

    #[test]
    fn test_required() {
        let c = uint32();
        assert!(matches!(
            c.from_object(None),
            Err(CodecError::Required { .. })
        ));
        assert!(matches!(
            c.from_object(Some(&JsonValue::Null)),
            Err(CodecError::Required { .. })
        ));
    }
}
