use std::fmt;

/// Canonical in-memory value produced by `from_object`/`from_bytes`.
///
/// Every codec converts between this representation, the JSON-interchange
/// object form (`serde_json::Value`), and the wire encoding. The derived
/// `Ord` is the natural ordering used by sorted vectors and set duplicate
/// detection: variants compare by kind first, then element-wise.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Value {
    /// Unsigned integer, any width up to 64 bits.
    UInt(u64),
    /// Signed integer, any width up to 64 bits.
    Int(i64),
    /// Raw byte sequence (object form is a hex string).
    Bytes(Vec<u8>),
    /// UTF-8 string.
    Str(String),
    /// Seconds since the Unix epoch.
    Time(u32),
    /// Optional wrapper; `None` encodes as an absent flag byte.
    Optional(Option<Box<Value>>),
    /// Homogeneous sequence.
    Array(Vec<Value>),
    /// Map entries in insertion order.
    Pairs(Vec<(Value, Value)>),
    /// Struct fields in declaration order.
    Struct(Vec<(String, Value)>),
}

impl Value {
    /// Look up a struct field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) => {
                fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// Get as u64.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as i64.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Get as byte slice.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// Get as epoch seconds.
    pub fn as_time(&self) -> Option<u32> {
        match self {
            Value::Time(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Get as struct fields.
    pub fn as_struct(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Struct(v) => Some(v),
            _ => None,
        }
    }

    /// Get as map entries.
    pub fn as_pairs(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Pairs(v) => Some(v),
            _ => None,
        }
    }

    /// Returns a short type description string.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::UInt(_) => "uint",
            Value::Int(_) => "int",
            Value::Bytes(_) => "bytes",
            Value::Str(_) => "string",
            Value::Time(_) => "time",
            Value::Optional(_) => "optional",
            Value::Array(_) => "array",
            Value::Pairs(_) => "map",
            Value::Struct(_) => "struct",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::UInt(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "<bytes {}>", v.len()),
            Value::Str(v) => write!(f, "\"{}\"", v),
            Value::Time(v) => write!(f, "@{}", v),
            Value::Optional(None) => write!(f, "null"),
            Value::Optional(Some(v)) => write!(f, "{}", v),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Pairs(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Struct(fields) => {
                write!(f, "{{ ")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, " }}")
            }
        }
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(v as u64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Option<Value>> for Value {
    fn from(v: Option<Value>) -> Self {
        Value::Optional(v.map(Box::new))
    }
}
