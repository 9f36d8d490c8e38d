//! Compilation configuration: defaults mode, debug logging, overrides, and
//! user-defined custom types.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::codec::CodecRef;
use crate::error::SchemaError;
use crate::overrides::OverrideSet;

/// Factory for a user-defined custom type. Called once per compilation with
/// the active configuration; returns the codec the schema name resolves to.
pub type CustomFactory =
    Arc<dyn Fn(&FactoryConfig) -> Result<CodecRef, SchemaError> + Send + Sync>;

/// Named custom type factories. Names registered here shadow the built-in
/// primitives and become referenceable from schemas.
#[derive(Clone, Default)]
pub struct CustomTypes {
    map: HashMap<String, CustomFactory>,
}

impl CustomTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&FactoryConfig) -> Result<CodecRef, SchemaError> + Send + Sync + 'static,
    {
        self.map.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn get(&self, name: &str) -> Option<&CustomFactory> {
        self.map.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(|s| s.as_str())
    }
}

impl fmt::Debug for CustomTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.map.keys()).finish()
    }
}

/// Configuration recognized by the type factory and schema compiler.
#[derive(Clone, Debug, Default)]
pub struct FactoryConfig {
    /// `to_object()` without a value returns a default specimen.
    pub defaults: bool,
    /// Emit extra `tracing` events during compile. Never affects the wire
    /// format.
    pub debug: bool,
    /// Stage overrides, per type or per struct field.
    pub overrides: OverrideSet,
    /// User-defined types; names shadow primitives.
    pub custom_types: CustomTypes,
}

impl FactoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(mut self, defaults: bool) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
