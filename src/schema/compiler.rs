//! Schema compilation: shape validation, reference resolution, and struct
//! construction.
//!
//! Compilation never fails fast: every problem is pushed onto the error
//! list and the compiler keeps going, so callers can present all schema
//! problems at once. Structs that did compile are usable even when other
//! entries had errors.
//!
//! Forward and mutually recursive struct references are handled with a
//! two-phase slot arena: every struct gets a placeholder slot up front,
//! field references resolve to weak links into the arena, and slots are
//! filled in base-topological order. The returned handles hold the arena
//! strongly; the internal links hold it weakly so recursive schemas do not
//! leak.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock, Weak};

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::debug;

use crate::codec::{ByteReader, ByteWriter, Codec, CodecRef, ToObjectOptions};
use crate::config::FactoryConfig;
use crate::error::{CodecError, SchemaError};
use crate::structs::StructCodec;
use crate::types::{self, TypeFactory};
use crate::value::Value;

use super::expr::{self, TypeExpr};
use super::{Schema, TypeDef};

/// Outcome of a compilation: the named struct codecs that were built and
/// every error encountered. Errors accumulate; nothing is thrown.
pub struct CompileResult {
    pub structs: IndexMap<String, CodecRef>,
    pub errors: Vec<SchemaError>,
}

impl CompileResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CodecRef> {
        self.structs.get(name)
    }
}

/// A schema entry after shape validation.
enum RawEntry {
    Alias(String),
    Struct {
        base: Option<String>,
        fields: Vec<(String, String)>,
    },
}

/// Compile a raw JSON schema mapping.
pub fn compile(schema: &JsonValue, config: FactoryConfig) -> CompileResult {
    let mut errors = Vec::new();
    let entries = match schema {
        JsonValue::Object(map) => validate_entries(map, &mut errors),
        _ => {
            errors.push(SchemaError::ExpectingSchema);
            IndexMap::new()
        }
    };
    build(entries, config, errors)
}

/// Compile a typed schema.
pub fn compile_defs(schema: &Schema, config: FactoryConfig) -> CompileResult {
    let mut errors = Vec::new();
    let mut entries = IndexMap::new();
    for (name, def) in schema {
        match def {
            TypeDef::Alias(target) => {
                entries.insert(name.clone(), RawEntry::Alias(target.clone()));
            }
            TypeDef::Struct(sd) => {
                if sd.base.is_none() && sd.fields.is_empty() {
                    errors.push(SchemaError::ExpectingFields { name: name.clone() });
                    continue;
                }
                entries.insert(
                    name.clone(),
                    RawEntry::Struct {
                        base: sd.base.clone(),
                        fields: sd
                            .fields
                            .iter()
                            .map(|(k, v)| (k.clone(), v.clone()))
                            .collect(),
                    },
                );
            }
        }
    }
    build(entries, config, errors)
}

/// Compile a schema from JSON text.
pub fn compile_str(text: &str, config: FactoryConfig) -> CompileResult {
    match serde_json::from_str::<JsonValue>(text) {
        Ok(v) => compile(&v, config),
        Err(e) => CompileResult {
            structs: IndexMap::new(),
            errors: vec![SchemaError::Json(e.to_string())],
        },
    }
}

fn validate_entries(
    map: &JsonMap<String, JsonValue>,
    errors: &mut Vec<SchemaError>,
) -> IndexMap<String, RawEntry> {
    let mut entries = IndexMap::new();
    for (name, value) in map {
        match value {
            JsonValue::String(target) => {
                entries.insert(name.clone(), RawEntry::Alias(target.clone()));
            }
            JsonValue::Object(obj) => {
                let base = match obj.get("base") {
                    None | Some(JsonValue::Null) => None,
                    Some(JsonValue::String(b)) => Some(b.clone()),
                    Some(_) => {
                        errors.push(SchemaError::ExpectingBase { name: name.clone() });
                        continue;
                    }
                };
                let fields = match obj.get("fields") {
                    None | Some(JsonValue::Null) => None,
                    Some(JsonValue::Object(fobj)) => {
                        let mut fields = Vec::with_capacity(fobj.len());
                        for (fname, fval) in fobj {
                            match fval {
                                JsonValue::String(expr) => {
                                    fields.push((fname.clone(), expr.clone()))
                                }
                                _ => errors.push(SchemaError::ExpectingFieldType {
                                    name: name.clone(),
                                    field: fname.clone(),
                                }),
                            }
                        }
                        Some(fields)
                    }
                    Some(_) => {
                        errors.push(SchemaError::ExpectingFieldMap { name: name.clone() });
                        continue;
                    }
                };
                if base.is_none() && fields.is_none() {
                    errors.push(SchemaError::ExpectingFields { name: name.clone() });
                    continue;
                }
                entries.insert(
                    name.clone(),
                    RawEntry::Struct {
                        base,
                        fields: fields.unwrap_or_default(),
                    },
                );
            }
            _ => errors.push(SchemaError::ExpectingEntry { name: name.clone() }),
        }
    }
    entries
}

/// Arena of struct codecs, filled in base-topological order.
struct Registry {
    by_name: HashMap<String, usize>,
    slots: Vec<OnceLock<StructCodec>>,
}

impl Registry {
    fn get(&self, index: usize) -> Option<&StructCodec> {
        self.slots.get(index)?.get()
    }
}

/// Weak reference into the arena, used for field references between
/// structs. Weakness breaks the ownership cycle of recursive schemas.
struct StructLink {
    registry: Weak<Registry>,
    index: usize,
    name: String,
}

impl StructLink {
    fn registry(&self) -> Result<Arc<Registry>, CodecError> {
        self.registry.upgrade().ok_or_else(|| CodecError::Unresolved {
            name: self.name.clone(),
        })
    }
}

impl Codec for StructLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        let reg = self.registry()?;
        let s = reg.get(self.index).ok_or_else(|| CodecError::Unresolved {
            name: self.name.clone(),
        })?;
        s.from_object(input)
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        let reg = self.registry()?;
        let s = reg.get(self.index).ok_or_else(|| CodecError::Unresolved {
            name: self.name.clone(),
        })?;
        s.to_object(value, opts)
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        let reg = self.registry()?;
        let s = reg.get(self.index).ok_or_else(|| CodecError::Unresolved {
            name: self.name.clone(),
        })?;
        s.append_bytes(out, value)
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        let reg = self.registry()?;
        let s = reg.get(self.index).ok_or_else(|| CodecError::Unresolved {
            name: self.name.clone(),
        })?;
        s.from_bytes(cur)
    }
}

/// Strong handle returned to callers; keeps the arena alive.
struct StructHandle {
    registry: Arc<Registry>,
    index: usize,
    name: String,
}

impl StructHandle {
    fn resolve(&self) -> Result<&StructCodec, CodecError> {
        self.registry
            .get(self.index)
            .ok_or_else(|| CodecError::Unresolved {
                name: self.name.clone(),
            })
    }
}

impl Codec for StructHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        self.resolve()?.from_object(input)
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        self.resolve()?.to_object(value, opts)
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        self.resolve()?.append_bytes(out, value)
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        self.resolve()?.from_bytes(cur)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum BuildState {
    NotBuilt,
    Built,
    Failed,
}

struct Compiler<'a> {
    config: &'a FactoryConfig,
    factory: TypeFactory,
    aliases: IndexMap<String, String>,
    registry: Arc<Registry>,
}

impl<'a> Compiler<'a> {
    /// Resolve a name against custom types, primitives, and structs, in
    /// that order. Custom names shadow primitives.
    fn resolve_direct(&self, name: &str) -> Result<Option<CodecRef>, SchemaError> {
        if let Some(factory) = self.config.custom_types.get(name) {
            let codec = factory(self.config)?;
            return Ok(Some(self.config.overrides.wrap(name, codec)));
        }
        if let Some(codec) = self.factory.get(name) {
            return Ok(Some(self.config.overrides.wrap(name, codec)));
        }
        if let Some(&index) = self.registry.by_name.get(name) {
            let link: CodecRef = Arc::new(StructLink {
                registry: Arc::downgrade(&self.registry),
                index,
                name: name.to_string(),
            });
            return Ok(Some(self.config.overrides.wrap(name, link)));
        }
        Ok(None)
    }

    /// Follow an alias chain to its final, non-alias name.
    fn resolve_alias_chain<'n>(&'n self, start: &'n str) -> Result<&'n str, SchemaError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = start;
        while let Some(next) = self.aliases.get(current) {
            if !seen.insert(current) {
                return Err(SchemaError::CircularAlias {
                    name: start.to_string(),
                });
            }
            current = next;
        }
        Ok(current)
    }

    fn resolve_leaf(&self, name: &str, context: &str) -> Result<CodecRef, SchemaError> {
        // Bare container names take a parameter and are not serializers
        // themselves.
        match name {
            "vector" => {
                return Err(SchemaError::VectorType {
                    name: context.to_string(),
                })
            }
            "optional" => {
                return Err(SchemaError::OptionalParameter {
                    name: context.to_string(),
                })
            }
            _ => {}
        }
        if let Some(codec) = self.resolve_direct(name)? {
            return Ok(codec);
        }
        if self.aliases.contains_key(name) {
            let target = self.resolve_alias_chain(name)?;
            if let Some(codec) = self.resolve_direct(target)? {
                return Ok(codec);
            }
            return Err(SchemaError::Missing {
                name: target.to_string(),
            });
        }
        Err(SchemaError::Missing {
            name: name.to_string(),
        })
    }

    fn resolve_expr(&self, expr: &TypeExpr, context: &str) -> Result<CodecRef, SchemaError> {
        match expr {
            TypeExpr::Name(name) => self.resolve_leaf(name, context),
            TypeExpr::Optional(inner) => {
                Ok(types::optional(self.resolve_expr(inner, context)?))
            }
            TypeExpr::Vector(inner) => {
                Ok(types::vector(self.resolve_expr(inner, context)?, false))
            }
            TypeExpr::Set(inner) => Ok(types::set(self.resolve_expr(inner, context)?)),
        }
    }

    fn build_struct(
        &self,
        name: &str,
        base: Option<&str>,
        fields: &[(String, String)],
        errors: &mut Vec<SchemaError>,
    ) {
        let mut sc = match base {
            Some(b) => {
                let Some(base_codec) = self
                    .registry
                    .by_name
                    .get(b)
                    .and_then(|&i| self.registry.get(i))
                else {
                    // Base construction failed earlier; the root cause is
                    // already on the error list.
                    return;
                };
                StructCodec::with_base(name, base_codec)
            }
            None => StructCodec::new(name),
        };
        sc.set_defaults(self.config.defaults);

        for (fname, fexpr) in fields {
            let parsed = match expr::parse(fexpr) {
                Ok(t) => t,
                Err(message) => {
                    errors.push(SchemaError::BadTypeExpression {
                        name: format!("{}.{}", name, fname),
                        expr: fexpr.clone(),
                        message,
                    });
                    continue;
                }
            };
            let codec = match self.resolve_expr(&parsed, name) {
                Ok(c) => c,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };
            let overrides = self.config.overrides.for_field(name, fname);
            sc.add_with_overrides(fname, codec, overrides);
        }

        if self.config.debug {
            debug!(name, fields = sc.fields().len(), "struct built");
        }
        if let Some(&index) = self.registry.by_name.get(name) {
            let _ = self.registry.slots[index].set(sc);
        }
    }
}

fn build(
    entries: IndexMap<String, RawEntry>,
    config: FactoryConfig,
    mut errors: Vec<SchemaError>,
) -> CompileResult {
    let factory = TypeFactory::new(&config);

    let mut aliases: IndexMap<String, String> = IndexMap::new();
    let mut struct_defs: IndexMap<String, (Option<String>, Vec<(String, String)>)> =
        IndexMap::new();
    for (name, entry) in entries {
        match entry {
            RawEntry::Alias(target) => {
                aliases.insert(name, target);
            }
            RawEntry::Struct { base, fields } => {
                struct_defs.insert(name, (base, fields));
            }
        }
    }

    let by_name: HashMap<String, usize> = struct_defs
        .keys()
        .enumerate()
        .map(|(i, n)| (n.clone(), i))
        .collect();
    let registry = Arc::new(Registry {
        by_name,
        slots: (0..struct_defs.len()).map(|_| OnceLock::new()).collect(),
    });

    let compiler = Compiler {
        config: &config,
        factory,
        aliases,
        registry: registry.clone(),
    };

    // Bases must name structs directly; aliases and primitives are not
    // acceptable inheritance roots.
    for (name, (base, _)) in &struct_defs {
        if let Some(b) = base {
            if !struct_defs.contains_key(b) {
                errors.push(SchemaError::MissingBase {
                    name: name.clone(),
                    base: b.clone(),
                });
            }
        }
    }

    // Construct in base-topological order; anything left unbuilt when no
    // further progress is possible sits on a base cycle.
    let names: Vec<String> = struct_defs.keys().cloned().collect();
    let mut state: HashMap<String, BuildState> = names
        .iter()
        .map(|n| (n.clone(), BuildState::NotBuilt))
        .collect();
    loop {
        let mut progressed = false;
        for name in &names {
            if state[name] != BuildState::NotBuilt {
                continue;
            }
            let (base, fields) = &struct_defs[name];
            let next = match base.as_deref() {
                None => {
                    compiler.build_struct(name, None, fields, &mut errors);
                    BuildState::Built
                }
                Some(b) if !struct_defs.contains_key(b) => BuildState::Failed,
                Some(b) => match state[b] {
                    BuildState::Built => {
                        compiler.build_struct(name, Some(b), fields, &mut errors);
                        BuildState::Built
                    }
                    BuildState::Failed => BuildState::Failed,
                    BuildState::NotBuilt => continue,
                },
            };
            state.insert(name.clone(), next);
            progressed = true;
        }
        if !progressed {
            break;
        }
    }
    for name in &names {
        if state[name] == BuildState::NotBuilt {
            errors.push(SchemaError::CircularBase { name: name.clone() });
        }
    }

    // Output handles for every built struct, plus aliases that land on one.
    let mut structs: IndexMap<String, CodecRef> = IndexMap::new();
    for name in &names {
        if state[name] != BuildState::Built {
            continue;
        }
        let index = compiler.registry.by_name[name];
        let handle: CodecRef = Arc::new(StructHandle {
            registry: registry.clone(),
            index,
            name: name.clone(),
        });
        structs.insert(name.clone(), config.overrides.wrap(name, handle));
    }
    let alias_names: Vec<String> = compiler.aliases.keys().cloned().collect();
    for alias in &alias_names {
        match compiler.resolve_alias_chain(alias) {
            Err(e) => errors.push(e),
            Ok(target) => {
                let target = target.to_string();
                let existing = structs.get(&target).cloned();
                if let Some(handle) = existing {
                    structs.insert(alias.clone(), handle);
                } else if !compiler.factory.contains(&target)
                    && !config.custom_types.contains(&target)
                    && !compiler.registry.by_name.contains_key(&target)
                {
                    errors.push(SchemaError::Unrecognized { name: target });
                }
            }
        }
    }

    if config.debug {
        debug!(
            structs = structs.len(),
            errors = errors.len(),
            "schema compiled"
        );
    }

    CompileResult { structs, errors }
}
