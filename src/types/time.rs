//! Calendar time as 32-bit unsigned seconds since the Unix epoch.
//!
//! The object form is ISO-8601 without a timezone (`YYYY-MM-DDTHH:MM:SS`);
//! a trailing `Z` is tolerated on input. Integers are interpreted as
//! milliseconds since the epoch. The representable window is
//! 1970-01-01T00:00:00 through 2106-02-07T06:28:15 inclusive.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;

use crate::codec::{json_kind, ByteReader, ByteWriter, Codec, CodecRef, ToObjectOptions};
use crate::error::CodecError;
use crate::value::Value;

use super::require;

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

struct TimeCodec;

fn seconds_in_range(name: &str, secs: i64, shown: &str) -> Result<u32, CodecError> {
    if secs < 0 {
        return Err(CodecError::Format {
            type_name: name.into(),
            message: format!("{} is before 1970-01-01T00:00:00", shown),
        });
    }
    if secs > u32::MAX as i64 {
        return Err(CodecError::Overflow {
            type_name: name.into(),
            value: shown.into(),
        });
    }
    Ok(secs as u32)
}

impl Codec for TimeCodec {
    fn name(&self) -> &str {
        "time"
    }

    fn from_object(&self, input: Option<&JsonValue>) -> Result<Value, CodecError> {
        let input = require("time", input)?;
        match input {
            JsonValue::String(s) => {
                let trimmed = s.trim().trim_end_matches('Z');
                let dt = NaiveDateTime::parse_from_str(trimmed, ISO_FORMAT).map_err(|e| {
                    CodecError::Format {
                        type_name: "time".into(),
                        message: format!("'{}' is not a valid timestamp: {}", s, e),
                    }
                })?;
                let secs = dt.and_utc().timestamp();
                Ok(Value::Time(seconds_in_range("time", secs, s)?))
            }
            JsonValue::Number(n) => {
                let millis = n.as_i64().ok_or_else(|| CodecError::Format {
                    type_name: "time".into(),
                    message: format!("{} is not an integer millisecond count", n),
                })?;
                if millis < 0 {
                    return Err(CodecError::Format {
                        type_name: "time".into(),
                        message: format!("{} is before 1970-01-01T00:00:00", millis),
                    });
                }
                Ok(Value::Time(seconds_in_range(
                    "time",
                    millis / 1000,
                    &n.to_string(),
                )?))
            }
            other => Err(CodecError::TypeMismatch {
                type_name: "time".into(),
                expected: "timestamp string or milliseconds".into(),
                actual: json_kind(other).into(),
            }),
        }
    }

    fn to_object(
        &self,
        value: Option<&Value>,
        opts: &ToObjectOptions,
    ) -> Result<JsonValue, CodecError> {
        let secs = match value {
            Some(Value::Time(s)) => *s,
            Some(other) => {
                return Err(CodecError::TypeMismatch {
                    type_name: "time".into(),
                    expected: "time".into(),
                    actual: other.kind().into(),
                })
            }
            None if opts.defaults => 0,
            None => {
                return Err(CodecError::Required {
                    path: "time".into(),
                })
            }
        };
        let dt = DateTime::<Utc>::from_timestamp(secs as i64, 0).ok_or_else(|| CodecError::Format {
            type_name: "time".into(),
            message: format!("{} is not representable", secs),
        })?;
        Ok(JsonValue::String(
            dt.naive_utc().format(ISO_FORMAT).to_string(),
        ))
    }

    fn append_bytes(&self, out: &mut ByteWriter, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Time(s) => {
                out.write_u32(*s);
                Ok(())
            }
            other => Err(CodecError::TypeMismatch {
                type_name: "time".into(),
                expected: "time".into(),
                actual: other.kind().into(),
            }),
        }
    }

    fn from_bytes(&self, cur: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        Ok(Value::Time(cur.read_u32()?))
    }
}

pub fn time() -> CodecRef {
    Arc::new(TimeCodec)
}
