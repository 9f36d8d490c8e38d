//! Ordered named-field aggregates with single-base inheritance.
//!
//! A `StructCodec` accumulates fields in insertion order; constructing with
//! a base copies the base's fields in front, so the wire encoding of a
//! derived struct is the base's fields followed by its own. Struct codecs
//! are frozen by `Arc`-wrapping once compilation finishes.

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::codec::{json_kind, ByteReader, ByteWriter, Codec, CodecRef, ToObjectOptions};
use crate::error::CodecError;
use crate::overrides::{DecodeCx, EncodeCx, FieldMap, FieldOverrides, ObjectCx, ToObjectCx};
use crate::value::Value;

/// One named field of a struct: its codec plus any stage overrides.
#[derive(Clone)]
pub struct StructField {
    pub name: String,
    pub codec: CodecRef,
    pub overrides: FieldOverrides,
}

pub struct StructCodec {
    name: String,
    fields: Vec<StructField>,
    /// Sibling codec map handed to field-level overrides.
    field_map: FieldMap,
    defaults: bool,
}

impl StructCodec {
    pub fn new(name: impl Into<String>) -> Self {
        StructCodec {
            name: name.into(),
            fields: Vec::new(),
            field_map: FieldMap::new(),
            defaults: false,
        }
    }

    /// Construct a derived struct. The base's fields (with their overrides)
    /// come first, in the base's declaration order.
    pub fn with_base(name: impl Into<String>, base: &StructCodec) -> Self {
        StructCodec {
            name: name.into(),
            fields: base.fields.clone(),
            field_map: base.field_map.clone(),
            defaults: base.defaults,
        }
    }

    /// Set whether `to_object` of missing required fields yields defaults.
    pub fn set_defaults(&mut self, defaults: bool) {
        self.defaults = defaults;
    }

    /// Append a field. Re-adding an existing name replaces its codec.
    pub fn add(&mut self, field_name: impl Into<String>, codec: CodecRef) {
        self.add_with_overrides(field_name, codec, FieldOverrides::default());
    }

    pub fn add_with_overrides(
        &mut self,
        field_name: impl Into<String>,
        codec: CodecRef,
        overrides: FieldOverrides,
    ) {
        let name = field_name.into();
        self.field_map.insert(name.clone(), codec.clone());
        if let Some(existing) = self.fields.iter_mut().find(|f| f.name == name) {
            existing.codec = codec;
            existing.overrides = overrides;
        } else {
            self.fields.push(StructField {
                name,
                codec,
                overrides,
            });
        }
    }

    /// Declared fields in order, base fields first.
    pub fn fields(&self) -> &[StructField] {
        &self.fields
    }

    /// Look up one field's codec by name.
    pub fn field(&self, name: &str) -> Option<&CodecRef> {
        self.field_map.get(name)
    }

    fn path(&self, field: &str) -> String {
        format!("{}.{}", self.name, field)
    }
}

impl Codec for StructCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        let object = match input {
            Some(JsonValue::Object(map)) => map,
            Some(JsonValue::Null) | None => {
                return Err(CodecError::Required {
                    path: self.name.clone(),
                })
            }
            Some(other) => {
                return Err(CodecError::TypeMismatch {
                    type_name: self.name.clone(),
                    expected: "object".into(),
                    actual: json_kind(other).into(),
                })
            }
        };

        let opts = ToObjectOptions {
            defaults: self.defaults,
        };
        let mut result: Vec<(String, Value)> = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if let Some(f) = &field.overrides.from_object {
                let mut cx = ObjectCx {
                    fields: &self.field_map,
                    object,
                    result: &mut result,
                    opts: &opts,
                };
                f(&mut cx).map_err(|e| e.at(self.path(&field.name)))?;
                continue;
            }

            let prop = object.get(&field.name).filter(|v| !v.is_null());
            if prop.is_none() && field.codec.required() {
                return Err(CodecError::Required {
                    path: self.path(&field.name),
                });
            }
            let value = field
                .codec
                .from_object(prop)
                .map_err(|e| e.at(self.path(&field.name)))?;
            result.push((field.name.clone(), value));
        }
        Ok(Value::Struct(result))
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        let entries: &[(String, Value)] = match value {
            Some(Value::Struct(entries)) => entries,
            Some(other) => {
                return Err(CodecError::TypeMismatch {
                    type_name: self.name.clone(),
                    expected: "struct".into(),
                    actual: other.kind().into(),
                })
            }
            None if opts.defaults => &[],
            None => {
                return Err(CodecError::Required {
                    path: self.name.clone(),
                })
            }
        };

        let mut result = JsonMap::new();
        for field in &self.fields {
            if let Some(f) = &field.overrides.to_object {
                let mut cx = ToObjectCx {
                    fields: &self.field_map,
                    object: entries,
                    result: &mut result,
                    opts,
                };
                f(&mut cx).map_err(|e| e.at(self.path(&field.name)))?;
                continue;
            }

            let entry = entries
                .iter()
                .find(|(n, _)| n == &field.name)
                .map(|(_, v)| v);
            let rendered = match entry {
                Some(v) => field
                    .codec
                    .to_object(Some(v), opts)
                    .map_err(|e| e.at(self.path(&field.name)))?,
                None if !field.codec.required() || opts.defaults => field
                    .codec
                    .to_object(None, opts)
                    .map_err(|e| e.at(self.path(&field.name)))?,
                None => {
                    return Err(CodecError::Required {
                        path: self.path(&field.name),
                    })
                }
            };
            result.insert(field.name.clone(), rendered);
        }
        Ok(JsonValue::Object(result))
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        let entries = match value {
            Value::Struct(entries) => entries,
            other => {
                return Err(CodecError::TypeMismatch {
                    type_name: self.name.clone(),
                    expected: "struct".into(),
                    actual: other.kind().into(),
                })
            }
        };

        for field in &self.fields {
            if let Some(f) = &field.overrides.append_bytes {
                let mut cx = EncodeCx {
                    fields: &self.field_map,
                    object: entries,
                    writer: out,
                };
                f(&mut cx).map_err(|e| e.at(self.path(&field.name)))?;
                continue;
            }

            let entry = entries
                .iter()
                .find(|(n, _)| n == &field.name)
                .map(|(_, v)| v);
            match entry {
                Some(v) => field
                    .codec
                    .append_bytes(out, v)
                    .map_err(|e| e.at(self.path(&field.name)))?,
                None if !field.codec.required() => field
                    .codec
                    .append_bytes(out, &Value::Optional(None))
                    .map_err(|e| e.at(self.path(&field.name)))?,
                None => {
                    return Err(CodecError::Required {
                        path: self.path(&field.name),
                    })
                }
            }
        }
        Ok(())
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        let mut result: Vec<(String, Value)> = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if let Some(f) = &field.overrides.from_bytes {
                let mut cx = DecodeCx {
                    fields: &self.field_map,
                    reader: cur,
                    result: &mut result,
                };
                f(&mut cx).map_err(|e| e.at(self.path(&field.name)))?;
                continue;
            }

            let value = field
                .codec
                .from_bytes(cur)
                .map_err(|e| e.at(self.path(&field.name)))?;
            result.push((field.name.clone(), value));
        }
        Ok(Value::Struct(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{optional, string, uint32};
    use serde_json::json;

    #[test]
    fn test_field_order_preserved() {
        let mut s = StructCodec::new("Account");
        s.add("name", string());
        s.add("balance", uint32());
        let v = s
            .from_object(Some(&json!({"balance": 10, "name": "sam"})))
            .unwrap();
        let fields = v.as_struct().unwrap();
        assert_eq!(fields[0].0, "name");
        assert_eq!(fields[1].0, "balance");
    }

    #[test]
    fn test_missing_required_field() {
        let mut s = StructCodec::new("Account");
        s.add("name", string());
        let err = s.from_object(Some(&json!({}))).unwrap_err();
        assert_eq!(err.to_string(), "Required Account.name");
    }

    #[test]
    fn test_optional_field_absent() {
        let mut s = StructCodec::new("Account");
        s.add("note", optional(string()));
        let v = s.from_object(Some(&json!({}))).unwrap();
        assert_eq!(v.get("note"), Some(&Value::Optional(None)));
    }

    #[test]
    fn test_base_fields_come_first() {
        let mut base = StructCodec::new("Human");
        base.add("name", string());
        let mut derived = StructCodec::with_base("Person", &base);
        derived.add("age", uint32());
        let names: Vec<&str> = derived.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "age"]);
    }
}
