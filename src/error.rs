/// Errors produced while compiling a schema. These are accumulated in
/// [`CompileResult::errors`](crate::schema::CompileResult) rather than
/// returned one at a time, so callers can report every problem at once.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Expecting object at schema root")]
    ExpectingSchema,

    #[error("Expecting object or string in {name}")]
    ExpectingEntry { name: String },

    #[error("Expecting {name}.fields or {name}.base")]
    ExpectingFields { name: String },

    #[error("Expecting object in {name}.fields")]
    ExpectingFieldMap { name: String },

    #[error("Expecting string in {name}.fields.{field}")]
    ExpectingFieldType { name: String, field: String },

    #[error("Expecting string in {name}.base")]
    ExpectingBase { name: String },

    #[error("Missing {name}")]
    Missing { name: String },

    #[error("Missing {base} in {name}.base")]
    MissingBase { name: String, base: String },

    #[error("Unrecognized type {name}")]
    Unrecognized { name: String },

    #[error("Circular base reference in {name}")]
    CircularBase { name: String },

    #[error("Circular alias reference in {name}")]
    CircularAlias { name: String },

    #[error("optional parameter should be a serializer in {name}")]
    OptionalParameter { name: String },

    #[error("vector type should be a serializer in {name}")]
    VectorType { name: String },

    #[error("invalid type expression '{expr}' in {name}: {message}")]
    BadTypeExpression {
        name: String,
        expr: String,
        message: String,
    },

    #[error("custom type {name}: {message}")]
    CustomType { name: String, message: String },

    #[error("invalid schema JSON: {0}")]
    Json(String),
}

/// Errors raised while converting or encoding a value. Unlike schema errors
/// these propagate immediately and abort the enclosing operation.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Required {path}")]
    Required { path: String },

    #[error("Overflow: {value} out of range for {type_name}")]
    Overflow { type_name: String, value: String },

    #[error("format error in {type_name}: {message}")]
    Format { type_name: String, message: String },

    #[error("{type_name} length {len} does not equal {expected}")]
    LengthMismatch {
        type_name: String,
        len: usize,
        expected: usize,
    },

    #[error("{type_name} value exceeds maxLen {max}: byte length {len}")]
    ExceedsMaxLen {
        type_name: String,
        max: usize,
        len: usize,
    },

    #[error("Illegal offset {offset}, buffer length {len}")]
    IllegalOffset { offset: usize, len: usize },

    #[error("invalid utf-8 in {type_name}: {source}")]
    InvalidUtf8 {
        type_name: String,
        source: std::string::FromUtf8Error,
    },

    #[error("duplicate element in {type_name}")]
    Duplicate { type_name: String },

    #[error("type mismatch for {type_name}: expected {expected}, got {actual}")]
    TypeMismatch {
        type_name: String,
        expected: String,
        actual: String,
    },

    #[error("unresolved type {name}")]
    Unresolved { name: String },

    #[error("{path}: {source}")]
    Field {
        path: String,
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Wrap this error with a `Struct.field` path for diagnostics.
    pub fn at(self, path: impl Into<String>) -> Self {
        CodecError::Field {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

/// Top-level error type that wraps all sub-errors.
#[derive(Debug, thiserror::Error)]
pub enum WireformError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Result type alias for wireform operations.
pub type Result<T> = std::result::Result<T, WireformError>;
