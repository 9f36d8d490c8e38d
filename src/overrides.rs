//! Caller-supplied replacements for individual pipeline stages.
//!
//! An override can target a whole type (`("time", Stage::FromObject)`) or a
//! single field of a struct (`("message", "data", Stage::AppendBytes)`).
//! Type-level overrides replace the named codec's operation wholesale;
//! field-level overrides run instead of the struct's default action for
//! that field and receive a typed context with the sibling codecs, the
//! value being walked, the accumulating result or cursor, and the active
//! options.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::codec::{ByteReader, ByteWriter, Codec, CodecRef, ToObjectOptions};
use crate::error::CodecError;
use crate::value::Value;

/// Pipeline stage an override attaches to. `FromBytes`/`AppendBytes` are
/// the byte-buffer stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    FromObject,
    ToObject,
    FromBytes,
    AppendBytes,
}

/// Sibling field codecs of a struct, in declaration order.
pub type FieldMap = IndexMap<String, CodecRef>;

/// Context for a field-level `from_object` override.
pub struct ObjectCx<'a> {
    pub fields: &'a FieldMap,
    /// The input object the enclosing struct is reading.
    pub object: &'a JsonMap<String, JsonValue>,
    /// The struct fields accumulated so far; the override pushes its own.
    pub result: &'a mut Vec<(String, Value)>,
    pub opts: &'a ToObjectOptions,
}

/// Context for a field-level `to_object` override.
pub struct ToObjectCx<'a> {
    pub fields: &'a FieldMap,
    /// The internal struct value being rendered.
    pub object: &'a [(String, Value)],
    pub result: &'a mut JsonMap<String, JsonValue>,
    pub opts: &'a ToObjectOptions,
}

/// Context for a field-level `append_bytes` override.
pub struct EncodeCx<'a> {
    pub fields: &'a FieldMap,
    pub object: &'a [(String, Value)],
    pub writer: &'a mut ByteWriter,
}

/// Context for a field-level `from_bytes` override.
pub struct DecodeCx<'a, 'b> {
    pub fields: &'a FieldMap,
    pub reader: &'a mut ByteReader<'b>,
    pub result: &'a mut Vec<(String, Value)>,
}

pub type FieldFromObjectFn = dyn Fn(&mut ObjectCx<'_>) -> Result<(), CodecError> + Send + Sync;
pub type FieldToObjectFn = dyn Fn(&mut ToObjectCx<'_>) -> Result<(), CodecError> + Send + Sync;
pub type FieldAppendBytesFn = dyn Fn(&mut EncodeCx<'_>) -> Result<(), CodecError> + Send + Sync;
pub type FieldFromBytesFn =
    dyn Fn(&mut DecodeCx<'_, '_>) -> Result<(), CodecError> + Send + Sync;

pub type TypeFromObjectFn =
    dyn Fn(Option<&JsonValue>) -> Result<Value, CodecError> + Send + Sync;
pub type TypeToObjectFn =
    dyn Fn(Option<&Value>, &ToObjectOptions) -> Result<JsonValue, CodecError> + Send + Sync;
pub type TypeAppendBytesFn =
    dyn Fn(&mut ByteWriter, &Value) -> Result<(), CodecError> + Send + Sync;
pub type TypeFromBytesFn =
    dyn Fn(&mut ByteReader<'_>) -> Result<Value, CodecError> + Send + Sync;

/// The overrides active for one field of one struct.
#[derive(Clone, Default)]
pub struct FieldOverrides {
    pub from_object: Option<Arc<FieldFromObjectFn>>,
    pub to_object: Option<Arc<FieldToObjectFn>>,
    pub append_bytes: Option<Arc<FieldAppendBytesFn>>,
    pub from_bytes: Option<Arc<FieldFromBytesFn>>,
}

impl FieldOverrides {
    pub fn is_empty(&self) -> bool {
        self.from_object.is_none()
            && self.to_object.is_none()
            && self.append_bytes.is_none()
            && self.from_bytes.is_none()
    }
}

impl fmt::Debug for FieldOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOverrides")
            .field("from_object", &self.from_object.is_some())
            .field("to_object", &self.to_object.is_some())
            .field("append_bytes", &self.append_bytes.is_some())
            .field("from_bytes", &self.from_bytes.is_some())
            .finish()
    }
}

/// Registered overrides, keyed by `(type)` or `(struct, field)` per stage.
#[derive(Clone, Default)]
pub struct OverrideSet {
    type_from_object: HashMap<String, Arc<TypeFromObjectFn>>,
    type_to_object: HashMap<String, Arc<TypeToObjectFn>>,
    type_append_bytes: HashMap<String, Arc<TypeAppendBytesFn>>,
    type_from_bytes: HashMap<String, Arc<TypeFromBytesFn>>,
    field_from_object: HashMap<(String, String), Arc<FieldFromObjectFn>>,
    field_to_object: HashMap<(String, String), Arc<FieldToObjectFn>>,
    field_append_bytes: HashMap<(String, String), Arc<FieldAppendBytesFn>>,
    field_from_bytes: HashMap<(String, String), Arc<FieldFromBytesFn>>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.type_from_object.is_empty()
            && self.type_to_object.is_empty()
            && self.type_append_bytes.is_empty()
            && self.type_from_bytes.is_empty()
            && self.field_from_object.is_empty()
            && self.field_to_object.is_empty()
            && self.field_append_bytes.is_empty()
            && self.field_from_bytes.is_empty()
    }

    pub fn on_type_from_object<F>(&mut self, type_name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Option<&JsonValue>) -> Result<Value, CodecError> + Send + Sync + 'static,
    {
        self.type_from_object.insert(type_name.into(), Arc::new(f));
        self
    }

    pub fn on_type_to_object<F>(&mut self, type_name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Option<&Value>, &ToObjectOptions) -> Result<JsonValue, CodecError>
            + Send
            + Sync
            + 'static,
    {
        self.type_to_object.insert(type_name.into(), Arc::new(f));
        self
    }

    pub fn on_type_append_bytes<F>(&mut self, type_name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&mut ByteWriter, &Value) -> Result<(), CodecError> + Send + Sync + 'static,
    {
        self.type_append_bytes.insert(type_name.into(), Arc::new(f));
        self
    }

    pub fn on_type_from_bytes<F>(&mut self, type_name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&mut ByteReader<'_>) -> Result<Value, CodecError> + Send + Sync + 'static,
    {
        self.type_from_bytes.insert(type_name.into(), Arc::new(f));
        self
    }

    pub fn on_field_from_object<F>(
        &mut self,
        struct_name: impl Into<String>,
        field: impl Into<String>,
        f: F,
    ) -> &mut Self
    where
        F: Fn(&mut ObjectCx<'_>) -> Result<(), CodecError> + Send + Sync + 'static,
    {
        self.field_from_object
            .insert((struct_name.into(), field.into()), Arc::new(f));
        self
    }

    pub fn on_field_to_object<F>(
        &mut self,
        struct_name: impl Into<String>,
        field: impl Into<String>,
        f: F,
    ) -> &mut Self
    where
        F: Fn(&mut ToObjectCx<'_>) -> Result<(), CodecError> + Send + Sync + 'static,
    {
        self.field_to_object
            .insert((struct_name.into(), field.into()), Arc::new(f));
        self
    }

    pub fn on_field_append_bytes<F>(
        &mut self,
        struct_name: impl Into<String>,
        field: impl Into<String>,
        f: F,
    ) -> &mut Self
    where
        F: Fn(&mut EncodeCx<'_>) -> Result<(), CodecError> + Send + Sync + 'static,
    {
        self.field_append_bytes
            .insert((struct_name.into(), field.into()), Arc::new(f));
        self
    }

    pub fn on_field_from_bytes<F>(
        &mut self,
        struct_name: impl Into<String>,
        field: impl Into<String>,
        f: F,
    ) -> &mut Self
    where
        F: Fn(&mut DecodeCx<'_, '_>) -> Result<(), CodecError> + Send + Sync + 'static,
    {
        self.field_from_bytes
            .insert((struct_name.into(), field.into()), Arc::new(f));
        self
    }

    /// Whether a type-level override is registered for `(name, stage)`.
    pub fn has_type(&self, name: &str, stage: Stage) -> bool {
        match stage {
            Stage::FromObject => self.type_from_object.contains_key(name),
            Stage::ToObject => self.type_to_object.contains_key(name),
            Stage::AppendBytes => self.type_append_bytes.contains_key(name),
            Stage::FromBytes => self.type_from_bytes.contains_key(name),
        }
    }

    /// Whether a field-level override is registered for
    /// `(struct, field, stage)`.
    pub fn has_field(&self, struct_name: &str, field: &str, stage: Stage) -> bool {
        let key = (struct_name.to_string(), field.to_string());
        match stage {
            Stage::FromObject => self.field_from_object.contains_key(&key),
            Stage::ToObject => self.field_to_object.contains_key(&key),
            Stage::AppendBytes => self.field_append_bytes.contains_key(&key),
            Stage::FromBytes => self.field_from_bytes.contains_key(&key),
        }
    }

    /// The field-level overrides registered for one field, if any.
    pub fn for_field(&self, struct_name: &str, field: &str) -> FieldOverrides {
        let key = (struct_name.to_string(), field.to_string());
        FieldOverrides {
            from_object: self.field_from_object.get(&key).cloned(),
            to_object: self.field_to_object.get(&key).cloned(),
            append_bytes: self.field_append_bytes.get(&key).cloned(),
            from_bytes: self.field_from_bytes.get(&key).cloned(),
        }
    }

    fn has_type_override(&self, name: &str) -> bool {
        self.type_from_object.contains_key(name)
            || self.type_to_object.contains_key(name)
            || self.type_append_bytes.contains_key(name)
            || self.type_from_bytes.contains_key(name)
    }

    /// Wrap `codec` so that any type-level overrides registered for `name`
    /// replace the corresponding operations. Returns the codec unchanged
    /// when nothing is registered.
    pub fn wrap(&self, name: &str, codec: CodecRef) -> CodecRef {
        if !self.has_type_override(name) {
            return codec;
        }
        Arc::new(Overridden {
            inner: codec,
            from_object: self.type_from_object.get(name).cloned(),
            to_object: self.type_to_object.get(name).cloned(),
            append_bytes: self.type_append_bytes.get(name).cloned(),
            from_bytes: self.type_from_bytes.get(name).cloned(),
        })
    }
}

impl fmt::Debug for OverrideSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideSet")
            .field("type_overrides", &self.type_from_object.len())
            .field("field_overrides", &self.field_from_object.len())
            .finish_non_exhaustive()
    }
}

/// A codec with one or more operations replaced by type-level overrides.
struct Overridden {
    inner: CodecRef,
    from_object: Option<Arc<TypeFromObjectFn>>,
    to_object: Option<Arc<TypeToObjectFn>>,
    append_bytes: Option<Arc<TypeAppendBytesFn>>,
    from_bytes: Option<Arc<TypeFromBytesFn>>,
}

impl Codec for Overridden {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn required(&self) -> bool {
        self.inner.required()
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        match &self.from_object {
            Some(f) => f(input),
            None => self.inner.from_object(input),
        }
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        match &self.to_object {
            Some(f) => f(value, opts),
            None => self.inner.to_object(value, opts),
        }
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        match &self.append_bytes {
            Some(f) => f(out, value),
            None => self.inner.append_bytes(out, value),
        }
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        match &self.from_bytes {
            Some(f) => f(cur),
            None => self.inner.from_bytes(cur),
        }
    }
}
