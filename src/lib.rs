//! Wireform: a schema-driven binary serialization engine.
//!
//! A declarative set of type definitions (primitives, vectors, optionals,
//! fixed-width buffers, maps, structs with inheritance, and user-defined
//! custom types) compiles into a family of codecs that convert between a
//! JSON-interchange object form, a canonical internal value, and a
//! little-endian byte stream.
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use wireform::{compile, from_buffer, to_buffer, FactoryConfig};
//!
//! let schema = json!({
//!     "Person": {
//!         "fields": {
//!             "name": "string",
//!             "friends": "string[]"
//!         }
//!     }
//! });
//!
//! let result = compile(&schema, FactoryConfig::default());
//! assert!(result.errors.is_empty());
//!
//! let person = result.structs.get("Person").unwrap();
//! let object = json!({ "name": "Dan", "friends": ["Jane", "Dawn"] });
//! let bytes = to_buffer(person.as_ref(), &object).unwrap();
//! let decoded = from_buffer(person.as_ref(), &bytes).unwrap();
//! assert_eq!(decoded, object);
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod overrides;
pub mod schema;
pub mod structs;
pub mod types;
pub mod value;

pub use codec::{
    from_buffer, to_buffer, ByteReader, ByteWriter, Codec, CodecRef, ToObjectOptions,
};
pub use config::{CustomTypes, FactoryConfig};
pub use error::{CodecError, Result, SchemaError, WireformError};
pub use overrides::{OverrideSet, Stage};
pub use schema::{compile, compile_defs, compile_str, CompileResult, Schema, StructDef, TypeDef};
pub use structs::StructCodec;
pub use value::Value;
