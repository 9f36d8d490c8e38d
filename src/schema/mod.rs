//! Declarative schema input and the compile entry points.
//!
//! A schema maps type names to either an alias (a string renaming an
//! existing type) or a struct spec with an optional `base` and ordered
//! `fields`. Schemas arrive either as raw JSON ([`compile`]) or as the
//! typed [`Schema`] mapping ([`compile_defs`]).

pub mod expr;

mod compiler;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use compiler::{compile, compile_defs, compile_str, CompileResult};

/// One schema entry: an alias or a struct spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDef {
    Alias(String),
    Struct(StructDef),
}

/// A struct spec: ordered field-name to type-expression mapping, with an
/// optional single base struct whose fields come first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default)]
    pub fields: IndexMap<String, String>,
}

/// A complete declarative schema in declaration order.
pub type Schema = IndexMap<String, TypeDef>;

impl TypeDef {
    /// Convenience constructor for a fields-only struct spec.
    pub fn fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        TypeDef::Struct(StructDef {
            base: None,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        })
    }

    /// Convenience constructor for a derived struct spec.
    pub fn derived<I, K, V>(base: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        TypeDef::Struct(StructDef {
            base: Some(base.into()),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        })
    }

    /// Convenience constructor for an alias entry.
    pub fn alias(target: impl Into<String>) -> Self {
        TypeDef::Alias(target.into())
    }
}
