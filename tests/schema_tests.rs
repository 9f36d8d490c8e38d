//! Schema compiler tests: shape validation, reference resolution, aliases,
//! inheritance rules, forward references, and custom types.

use serde_json::json;
use wireform::types::{self, TypeFactory};
use wireform::{
    compile, compile_defs, compile_str, from_buffer, to_buffer, FactoryConfig, Schema,
    SchemaError, TypeDef,
};

fn error_strings(result: &wireform::CompileResult) -> Vec<String> {
    result.errors.iter().map(|e| e.to_string()).collect()
}

#[test]
fn test_well_formed_struct_compiles_clean() {
    let result = compile(
        &json!({ "Struct": { "fields": { "checksum": "fixed_bytes32" } } }),
        FactoryConfig::default(),
    );
    assert!(result.errors.is_empty());
    assert!(result.get("Struct").is_some());
}

#[test]
fn test_empty_struct_spec_is_an_error() {
    let result = compile(&json!({ "Struct": {} }), FactoryConfig::default());
    assert_eq!(
        error_strings(&result),
        vec!["Expecting Struct.fields or Struct.base"]
    );
    assert!(result.get("Struct").is_none());
}

#[test]
fn test_missing_base_is_reported() {
    let result = compile(
        &json!({ "Person": { "base": "Human", "fields": { "name": "string" } } }),
        FactoryConfig::default(),
    );
    let errors = error_strings(&result);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Missing Human"), "got: {}", errors[0]);
}

#[test]
fn test_shape_errors_accumulate() {
    let result = compile(
        &json!({
            "A": 5,
            "B": { "fields": 5 },
            "C": { "base": 5 },
            "D": { "fields": { "x": 5, "y": "uint8" } }
        }),
        FactoryConfig::default(),
    );
    let errors = error_strings(&result);
    assert!(errors.contains(&"Expecting object or string in A".to_string()));
    assert!(errors.contains(&"Expecting object in B.fields".to_string()));
    assert!(errors.contains(&"Expecting string in C.base".to_string()));
    assert!(errors.contains(&"Expecting string in D.fields.x".to_string()));
    // D still compiles with its good field
    assert!(result.get("D").is_some());
}

#[test]
fn test_unresolved_field_reference() {
    let result = compile(
        &json!({ "Account": { "fields": { "owner": "account_name" } } }),
        FactoryConfig::default(),
    );
    assert_eq!(error_strings(&result), vec!["Missing account_name"]);
}

#[test]
fn test_alias_renames_a_primitive() {
    let result = compile(
        &json!({
            "account_name": "string",
            "Account": { "fields": { "owner": "account_name" } }
        }),
        FactoryConfig::default(),
    );
    assert!(result.errors.is_empty());
    let account = result.get("Account").unwrap();
    let object = json!({ "owner": "sam" });
    let data = to_buffer(account.as_ref(), &object).unwrap();
    assert_eq!(from_buffer(account.as_ref(), &data).unwrap(), object);
}

#[test]
fn test_alias_to_struct_is_usable() {
    let result = compile(
        &json!({
            "Human": { "fields": { "name": "string" } },
            "Being": "Human",
            "Family": { "fields": { "members": "Being[]" } }
        }),
        FactoryConfig::default(),
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    // the alias itself resolves to the struct codec
    assert!(result.get("Being").is_some());
    let family = result.get("Family").unwrap();
    let object = json!({ "members": [{ "name": "Ada" }] });
    let data = to_buffer(family.as_ref(), &object).unwrap();
    assert_eq!(from_buffer(family.as_ref(), &data).unwrap(), object);
}

#[test]
fn test_alias_chain_resolves_transitively() {
    let result = compile(
        &json!({
            "a": "b",
            "b": "c",
            "c": "uint8",
            "T": { "fields": { "v": "a" } }
        }),
        FactoryConfig::default(),
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn test_alias_cycle_is_detected() {
    let result = compile(&json!({ "a": "b", "b": "a" }), FactoryConfig::default());
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e, SchemaError::CircularAlias { .. })));
}

#[test]
fn test_alias_to_nothing_is_unrecognized() {
    let result = compile(&json!({ "Thing": "nonexistent" }), FactoryConfig::default());
    assert_eq!(error_strings(&result), vec!["Unrecognized type nonexistent"]);
}

#[test]
fn test_alias_cannot_be_a_base() {
    let result = compile(
        &json!({
            "Human": { "fields": { "name": "string" } },
            "HumanAlias": "Human",
            "Person": { "base": "HumanAlias", "fields": { "age": "uint8" } }
        }),
        FactoryConfig::default(),
    );
    let errors = error_strings(&result);
    assert_eq!(errors, vec!["Missing HumanAlias in Person.base"]);
}

#[test]
fn test_base_cycle_is_detected() {
    let result = compile(
        &json!({
            "A": { "base": "B", "fields": { "a": "uint8" } },
            "B": { "base": "A", "fields": { "b": "uint8" } }
        }),
        FactoryConfig::default(),
    );
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e, SchemaError::CircularBase { .. })));
    assert!(result.get("A").is_none());
    assert!(result.get("B").is_none());
}

#[test]
fn test_forward_references_are_fine() {
    let result = compile(
        &json!({
            "Outer": { "fields": { "inner": "Inner" } },
            "Inner": { "fields": { "x": "uint8" } }
        }),
        FactoryConfig::default(),
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let outer = result.get("Outer").unwrap();
    let object = json!({ "inner": { "x": 5 } });
    let data = to_buffer(outer.as_ref(), &object).unwrap();
    assert_eq!(from_buffer(outer.as_ref(), &data).unwrap(), object);
}

#[test]
fn test_recursive_struct_through_optional() {
    let result = compile(
        &json!({
            "Node": { "fields": { "value": "uint8", "next": "Node?" } }
        }),
        FactoryConfig::default(),
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let node = result.get("Node").unwrap();
    let object = json!({
        "value": 1,
        "next": { "value": 2, "next": { "value": 3, "next": null } }
    });
    let data = to_buffer(node.as_ref(), &object).unwrap();
    assert_eq!(from_buffer(node.as_ref(), &data).unwrap(), object);
}

#[test]
fn test_vector_forms_are_equivalent() {
    let result = compile(
        &json!({
            "A": { "fields": { "v": "string[]" } },
            "B": { "fields": { "v": "vector[string]" } }
        }),
        FactoryConfig::default(),
    );
    assert!(result.errors.is_empty());
    let object = json!({ "v": ["x", "y"] });
    let a = to_buffer(result.get("A").unwrap().as_ref(), &object).unwrap();
    let b = to_buffer(result.get("B").unwrap().as_ref(), &object).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_set_form_compiles() {
    let result = compile(
        &json!({ "Tags": { "fields": { "names": "set[string]" } } }),
        FactoryConfig::default(),
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let tags = result.get("Tags").unwrap();
    assert!(to_buffer(tags.as_ref(), &json!({ "names": ["a", "a"] })).is_err());
}

#[test]
fn test_optional_vector_nesting() {
    let result = compile(
        &json!({ "T": { "fields": { "maybe_names": "string[]?" } } }),
        FactoryConfig::default(),
    );
    assert!(result.errors.is_empty());
    let t = result.get("T").unwrap();
    for object in [json!({ "maybe_names": null }), json!({ "maybe_names": ["a"] })] {
        let data = to_buffer(t.as_ref(), &object).unwrap();
        assert_eq!(from_buffer(t.as_ref(), &data).unwrap(), object);
    }
}

#[test]
fn test_bare_vector_is_not_a_serializer() {
    let result = compile(
        &json!({ "T": { "fields": { "v": "vector" } } }),
        FactoryConfig::default(),
    );
    let errors = error_strings(&result);
    assert_eq!(errors.len(), 1);
    assert!(
        errors[0].starts_with("vector type should be a serializer"),
        "got: {}",
        errors[0]
    );
}

#[test]
fn test_bare_optional_is_not_a_serializer() {
    let result = compile(
        &json!({ "T": { "fields": { "v": "optional" } } }),
        FactoryConfig::default(),
    );
    let errors = error_strings(&result);
    assert!(
        errors[0].starts_with("optional parameter should be a serializer"),
        "got: {}",
        errors[0]
    );
}

#[test]
fn test_custom_types_resolve() {
    let mut config = FactoryConfig::default();
    config
        .custom_types
        .insert("account_name", |_cfg| Ok(types::fixed_string(12)));
    let result = compile(
        &json!({ "Account": { "fields": { "owner": "account_name" } } }),
        config,
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let account = result.get("Account").unwrap();
    let err = to_buffer(account.as_ref(), &json!({ "owner": "far-too-long-name" })).unwrap_err();
    assert!(err.to_string().contains("exceeds maxLen 12"));
}

#[test]
fn test_custom_types_shadow_primitives() {
    let mut config = FactoryConfig::default();
    // replace `string` with a fixed-width rendition
    config
        .custom_types
        .insert("string", |_cfg| Ok(types::fixed_string(4)));
    let result = compile(
        &json!({ "T": { "fields": { "s": "string" } } }),
        config,
    );
    assert!(result.errors.is_empty());
    let t = result.get("T").unwrap();
    let data = to_buffer(t.as_ref(), &json!({ "s": "ab" })).unwrap();
    // fixed_string4: exactly four bytes, no length prefix
    assert_eq!(data, vec![b'a', b'b', 0, 0]);
}

#[test]
fn test_custom_type_factory_failure_is_reported() {
    let mut config = FactoryConfig::default();
    config.custom_types.insert("broken", |_cfg| {
        Err(SchemaError::CustomType {
            name: "broken".into(),
            message: "no implementation".into(),
        })
    });
    let result = compile(
        &json!({ "T": { "fields": { "x": "broken" } } }),
        config,
    );
    assert!(error_strings(&result)[0].contains("custom type broken"));
}

#[test]
fn test_compile_defs_typed_input() {
    let mut schema = Schema::new();
    schema.insert("asset".into(), TypeDef::alias("uint64"));
    schema.insert(
        "Balance".into(),
        TypeDef::fields([("owner", "string"), ("amount", "asset")]),
    );
    schema.insert(
        "Tagged".into(),
        TypeDef::derived("Balance", [("tag", "uint8")]),
    );
    let result = compile_defs(&schema, FactoryConfig::default());
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let tagged = result.get("Tagged").unwrap();
    let object = json!({ "owner": "sam", "amount": "42", "tag": 7 });
    let data = to_buffer(tagged.as_ref(), &object).unwrap();
    assert_eq!(from_buffer(tagged.as_ref(), &data).unwrap(), object);
}

#[test]
fn test_compile_str_reports_bad_json() {
    let result = compile_str("{ not json", FactoryConfig::default());
    assert!(matches!(result.errors[0], SchemaError::Json(_)));
}

#[test]
fn test_non_object_schema_root() {
    let result = compile(&json!([1, 2, 3]), FactoryConfig::default());
    assert!(matches!(result.errors[0], SchemaError::ExpectingSchema));
}

#[test]
fn test_factory_catalog_is_reachable() {
    let factory = TypeFactory::new(&FactoryConfig::default());
    assert!(factory.contains("uint8"));
    assert!(factory.contains("fixed_bytes33"));
    assert!(!factory.contains("Person"));
}
