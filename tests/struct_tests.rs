//! Struct codec tests: field order, inheritance, required paths, and
//! decode failure on truncated buffers.

use serde_json::json;
use wireform::{compile, from_buffer, to_buffer, Codec, CodecError, FactoryConfig, ToObjectOptions};

fn compile_ok(schema: serde_json::Value) -> wireform::CompileResult {
    let result = compile(&schema, FactoryConfig::default());
    assert!(
        result.errors.is_empty(),
        "unexpected schema errors: {:?}",
        result.errors
    );
    result
}

#[test]
fn test_person_with_friends_roundtrip() {
    let result = compile_ok(json!({
        "Person": { "fields": { "friends": "string[]" } }
    }));
    let person = result.get("Person").unwrap();
    let object = json!({ "friends": ["Dan", "Jane"] });
    let data = to_buffer(person.as_ref(), &object).unwrap();
    assert_eq!(from_buffer(person.as_ref(), &data).unwrap(), object);
}

#[test]
fn test_fields_encode_in_declaration_order() {
    let result = compile_ok(json!({
        "Pair": { "fields": { "a": "uint8", "b": "uint16" } }
    }));
    let pair = result.get("Pair").unwrap();
    let data = to_buffer(pair.as_ref(), &json!({ "b": 515, "a": 1 })).unwrap();
    // a first, then b as little-endian u16
    assert_eq!(data, vec![0x01, 0x03, 0x02]);
}

#[test]
fn test_missing_required_field_names_the_path() {
    let result = compile_ok(json!({
        "Account": { "fields": { "owner": "string", "balance": "uint32" } }
    }));
    let account = result.get("Account").unwrap();
    let err = to_buffer(account.as_ref(), &json!({ "owner": "sam" })).unwrap_err();
    assert_eq!(err.to_string(), "Required Account.balance");
}

#[test]
fn test_inherited_fields_precede_own_fields() {
    let result = compile_ok(json!({
        "Human": { "fields": { "name": "string" } },
        "Person": { "base": "Human", "fields": { "age": "uint8" } }
    }));
    let human = result.get("Human").unwrap();
    let person = result.get("Person").unwrap();

    let base_bytes = to_buffer(human.as_ref(), &json!({ "name": "Ada" })).unwrap();
    let own_bytes = to_buffer(uint8_codec().as_ref(), &json!(36)).unwrap();
    let derived_bytes =
        to_buffer(person.as_ref(), &json!({ "name": "Ada", "age": 36 })).unwrap();

    let mut expected = base_bytes.clone();
    expected.extend_from_slice(&own_bytes);
    assert_eq!(derived_bytes, expected);

    let decoded = from_buffer(person.as_ref(), &derived_bytes).unwrap();
    assert_eq!(decoded, json!({ "name": "Ada", "age": 36 }));
    // base fields come first in the object form too
    let keys: Vec<&String> = decoded.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["name", "age"]);
}

fn uint8_codec() -> wireform::CodecRef {
    wireform::types::uint8()
}

#[test]
fn test_base_of_base() {
    let result = compile_ok(json!({
        "A": { "fields": { "a": "uint8" } },
        "B": { "base": "A", "fields": { "b": "uint8" } },
        "C": { "base": "B", "fields": { "c": "uint8" } }
    }));
    let c = result.get("C").unwrap();
    let data = to_buffer(c.as_ref(), &json!({ "a": 1, "b": 2, "c": 3 })).unwrap();
    assert_eq!(data, vec![1, 2, 3]);
}

#[test]
fn test_optional_struct_field() {
    let result = compile_ok(json!({
        "Note": { "fields": { "text": "string", "tag": "string?" } }
    }));
    let note = result.get("Note").unwrap();

    let object = json!({ "text": "hi" });
    let data = to_buffer(note.as_ref(), &object).unwrap();
    assert_eq!(
        from_buffer(note.as_ref(), &data).unwrap(),
        json!({ "text": "hi", "tag": null })
    );

    let object = json!({ "text": "hi", "tag": "keep" });
    let data = to_buffer(note.as_ref(), &object).unwrap();
    assert_eq!(from_buffer(note.as_ref(), &data).unwrap(), object);
}

#[test]
fn test_nested_struct_vector() {
    let result = compile_ok(json!({
        "Point": { "fields": { "x": "uint16", "y": "uint16" } },
        "Path": { "fields": { "points": "Point[]" } }
    }));
    let path = result.get("Path").unwrap();
    let object = json!({ "points": [{ "x": 1, "y": 2 }, { "x": 3, "y": 4 }] });
    let data = to_buffer(path.as_ref(), &object).unwrap();
    assert_eq!(from_buffer(path.as_ref(), &data).unwrap(), object);
}

#[test]
fn test_empty_buffer_is_illegal_offset() {
    let result = compile_ok(json!({
        "Person": { "fields": { "name": "string" } }
    }));
    let person = result.get("Person").unwrap();
    let err = from_buffer(person.as_ref(), &[]).unwrap_err();
    assert!(err.to_string().contains("Illegal offset"));
}

#[test]
fn test_defaults_produce_a_specimen() {
    let result = compile_ok(json!({
        "Account": {
            "fields": { "owner": "string", "balance": "uint32", "memo": "string?" }
        }
    }));
    let account = result.get("Account").unwrap();
    let specimen = account
        .to_object(None, &ToObjectOptions::defaults())
        .unwrap();
    assert_eq!(
        specimen,
        json!({ "owner": "", "balance": 0, "memo": null })
    );
}

#[test]
fn test_non_object_input_is_rejected() {
    let result = compile_ok(json!({
        "Person": { "fields": { "name": "string" } }
    }));
    let person = result.get("Person").unwrap();
    assert!(matches!(
        to_buffer(person.as_ref(), &json!([1, 2])),
        Err(CodecError::TypeMismatch { .. })
    ));
    assert!(matches!(
        person.from_object(None),
        Err(CodecError::Required { .. })
    ));
}

#[test]
fn test_field_error_carries_struct_path() {
    let result = compile_ok(json!({
        "Block": { "fields": { "checksum": "fixed_bytes32" } }
    }));
    let block = result.get("Block").unwrap();
    let err = to_buffer(block.as_ref(), &json!({ "checksum": "abcd" })).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Block.checksum"), "got: {}", msg);
    assert!(
        msg.contains("fixed_bytes32 length 2 does not equal 32"),
        "got: {}",
        msg
    );
}
