//! Property tests for the codec invariants: object-form identity,
//! byte round-trips, and vector ordering.

use proptest::prelude::*;
use serde_json::json;
use wireform::types::{bytes, int64, string, uint32, uint64, vector};
use wireform::{from_buffer, to_buffer, Codec, ToObjectOptions, Value};

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn uint32_object_identity(v in any::<u32>()) {
        let c = uint32();
        let internal = c.from_object(Some(&json!(v))).unwrap();
        let rendered = c.to_object(Some(&internal), &ToObjectOptions::default()).unwrap();
        prop_assert_eq!(rendered, json!(v));
    }

    #[test]
    fn uint32_byte_roundtrip(v in any::<u32>()) {
        let c = uint32();
        let data = to_buffer(c.as_ref(), &json!(v)).unwrap();
        prop_assert_eq!(data.len(), 4);
        prop_assert_eq!(from_buffer(c.as_ref(), &data).unwrap(), json!(v));
    }

    #[test]
    fn uint64_decimal_string_roundtrip(v in any::<u64>()) {
        let c = uint64();
        let object = json!(v.to_string());
        let data = to_buffer(c.as_ref(), &object).unwrap();
        prop_assert_eq!(from_buffer(c.as_ref(), &data).unwrap(), object);
    }

    #[test]
    fn int64_decimal_string_roundtrip(v in any::<i64>()) {
        let c = int64();
        let object = json!(v.to_string());
        let data = to_buffer(c.as_ref(), &object).unwrap();
        prop_assert_eq!(from_buffer(c.as_ref(), &data).unwrap(), object);
    }

    #[test]
    fn bytes_hex_roundtrip(raw in proptest::collection::vec(any::<u8>(), 0..64)) {
        let c = bytes();
        let object = json!(hex::encode(&raw));
        let data = to_buffer(c.as_ref(), &object).unwrap();
        prop_assert_eq!(from_buffer(c.as_ref(), &data).unwrap(), object);
    }

    #[test]
    fn string_roundtrip(s in "\\PC{0,32}") {
        let c = string();
        let object = json!(s);
        let data = to_buffer(c.as_ref(), &object).unwrap();
        prop_assert_eq!(from_buffer(c.as_ref(), &data).unwrap(), object);
    }

    #[test]
    fn sorted_vector_is_non_decreasing(items in proptest::collection::vec(any::<u32>(), 0..32)) {
        let c = vector(uint32(), true);
        let object = json!(items);
        let internal = c.from_object(Some(&object)).unwrap();
        let Value::Array(values) = internal else {
            return Err(TestCaseError::fail("expected array value"));
        };
        prop_assert!(values.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(values.len(), items.len());
    }

    #[test]
    fn unsorted_vector_preserves_input(items in proptest::collection::vec(any::<u32>(), 0..32)) {
        let c = vector(uint32(), false);
        let object = json!(items);
        let data = to_buffer(c.as_ref(), &object).unwrap();
        prop_assert_eq!(from_buffer(c.as_ref(), &data).unwrap(), object);
    }
}
