//! Body schema classification and type derivation
//!
//! A body schema is first simplified (`allOf` merged), then tried as a JSON:API
//! resource document. Any mismatch falls back to a generic structure that
//! mirrors the schema's properties. The generic derivation never fails; schema
//! shapes it cannot express become `serde_json::Value`.

use super::frameworks::codegen;
use super::types::*;
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Schema or media type extension that opts a body out of resource classification
pub const NOT_JSON_API: &str = "x-not-json-api";

const DOCUMENT_MEMBERS: &[&str] = &["data", "included", "meta", "links", "jsonapi"];
const RESOURCE_MEMBERS: &[&str] = &["type", "id", "lid", "attributes", "relationships", "links", "meta"];

/// Failure to simplify a schema before classification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimplifyError {
    #[error("allOf combines conflicting types '{0}' and '{1}'")]
    TypeConflict(String, String),

    #[error("allOf member is not a schema object")]
    NotAnObject,
}

/// Why a schema is not a resource document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Mismatch(String);

fn mismatch<T>(reason: impl Into<String>) -> Result<T, Mismatch> {
    Err(Mismatch(reason.into()))
}

/// Derived type plus the reason the resource attempt was abandoned, if it was
#[derive(Debug, Clone)]
pub struct Classification {
    pub derived: DerivedType,
    pub fallback_reason: Option<String>,
}

/// Whether the resource attempt should run for this body
pub fn expects_resource_schema(schema: &Value, media_type_opt_out: bool) -> bool {
    let schema_opt_out = schema.get(NOT_JSON_API).and_then(Value::as_bool).unwrap_or(false);
    !(media_type_opt_out || schema_opt_out)
}

/// Classify one body schema, claiming type names from `names`
pub fn classify(schema: &Value, base_name: &str, expect_resource: bool, names: &mut NameSet) -> Classification {
    let simplified = simplify(schema);

    if expect_resource {
        let attempt = match &simplified {
            Ok(simplified) => {
                let mut scratch = names.clone();
                let result = Deriver::new(&mut scratch).resource(simplified, base_name);
                result.map(|derived| (derived, scratch))
            }
            Err(e) => Err(Mismatch(e.to_string())),
        };

        match attempt {
            Ok((derived, scratch)) => {
                *names = scratch;
                return Classification { derived, fallback_reason: None };
            }
            Err(reason) => {
                debug!("{} is not a resource document: {}", base_name, reason);
                let target = simplified.as_ref().unwrap_or(schema);
                let derived = Deriver::new(names).generic(target, base_name);
                return Classification { derived, fallback_reason: Some(reason.0) };
            }
        }
    }

    let target = simplified.as_ref().unwrap_or(schema);
    Classification { derived: Deriver::new(names).generic(target, base_name), fallback_reason: None }
}

/// Merge `allOf` members into a single schema, recursively
pub fn simplify(schema: &Value) -> Result<Value, SimplifyError> {
    let Value::Object(map) = schema else {
        return Ok(schema.clone());
    };

    let mut simplified = Map::with_capacity(map.len());
    for (key, value) in map {
        let value = match key.as_str() {
            "properties" => match value {
                Value::Object(props) => {
                    let mut out = Map::with_capacity(props.len());
                    for (name, prop) in props {
                        out.insert(name.clone(), simplify(prop)?);
                    }
                    Value::Object(out)
                }
                other => other.clone(),
            },
            "items" | "additionalProperties" | "not" => simplify(value)?,
            "oneOf" | "anyOf" => match value {
                Value::Array(members) => Value::Array(members.iter().map(simplify).collect::<Result<_, _>>()?),
                other => other.clone(),
            },
            _ => value.clone(),
        };
        simplified.insert(key.clone(), value);
    }

    let Some(all_of) = simplified.remove("allOf") else {
        return Ok(Value::Object(simplified));
    };

    let members = match all_of {
        Value::Array(members) => members,
        _ => return Err(SimplifyError::NotAnObject),
    };

    let mut merged = simplified;
    for member in members {
        match simplify(&member)? {
            Value::Object(member) => merge_into(&mut merged, member)?,
            _ => return Err(SimplifyError::NotAnObject),
        }
    }
    Ok(Value::Object(merged))
}

fn merge_into(target: &mut Map<String, Value>, source: Map<String, Value>) -> Result<(), SimplifyError> {
    for (key, value) in source {
        match key.as_str() {
            "type" => {
                if let Some(existing) = target.get("type") {
                    if existing != &value {
                        return Err(SimplifyError::TypeConflict(type_label(existing), type_label(&value)));
                    }
                }
                target.insert(key, value);
            }
            "properties" => {
                let Value::Object(incoming) = value else { continue };
                let entry = target.entry("properties").or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(existing) = entry {
                    for (name, prop) in incoming {
                        if let (Some(Value::Object(current)), Value::Object(incoming)) = (existing.get_mut(&name), &prop) {
                            merge_into(current, incoming.clone())?;
                            continue;
                        }
                        existing.insert(name, prop);
                    }
                }
            }
            "required" => {
                let Value::Array(incoming) = value else { continue };
                let entry = target.entry("required").or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(existing) = entry {
                    for name in incoming {
                        if !existing.contains(&name) {
                            existing.push(name);
                        }
                    }
                }
            }
            _ => {
                target.entry(key).or_insert(value);
            }
        }
    }

    // a merged schema with properties is an object even if no member said so
    if target.contains_key("properties") && !target.contains_key("type") {
        target.insert("type".to_string(), Value::String("object".to_string()));
    }
    Ok(())
}

fn type_label(value: &Value) -> String {
    value.as_str().map(String::from).unwrap_or_else(|| value.to_string())
}

fn type_of(schema: &Value) -> Option<&str> {
    schema.get("type").and_then(Value::as_str)
}

fn properties(schema: &Value) -> Option<&Map<String, Value>> {
    schema.get("properties").and_then(Value::as_object)
}

fn required(schema: &Value) -> HashSet<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn is_nullable(schema: &Value) -> bool {
    schema.get("nullable").and_then(Value::as_bool).unwrap_or(false)
}

fn is_object_schema(schema: &Value) -> bool {
    match type_of(schema) {
        Some("object") => true,
        None => properties(schema).is_some(),
        _ => false,
    }
}

fn is_combinator(schema: &Value) -> bool {
    ["oneOf", "anyOf", "allOf", "not"].iter().any(|k| schema.get(k).is_some())
}

struct Deriver<'a> {
    names: &'a mut NameSet,
    decls: Vec<TypeDecl>,
}

impl<'a> Deriver<'a> {
    fn new(names: &'a mut NameSet) -> Self {
        Self { names, decls: Vec::new() }
    }

    // ---- resource documents ----

    fn resource(mut self, schema: &Value, base: &str) -> Result<DerivedType, Mismatch> {
        if !is_object_schema(schema) {
            return mismatch("document is not an object");
        }
        let Some(props) = properties(schema) else {
            return mismatch("document declares no members");
        };
        let Some(data) = props.get("data") else {
            return mismatch("document has no data member");
        };
        if let Some(extra) = props.keys().find(|k| !DOCUMENT_MEMBERS.contains(&k.as_str())) {
            return mismatch(format!("unexpected top-level member '{}'", extra));
        }

        let name = self.names.claim(base);
        let data_name = format!("{}Data", name);
        let data_ty = if type_of(data) == Some("array") {
            let Some(items) = data.get("items") else {
                return mismatch("data array has no item schema");
            };
            TypeRef::Vec(Box::new(self.resource_object(items, &data_name)?))
        } else {
            self.resource_object(data, &data_name)?
        };

        let required = required(schema);
        let mut fields = vec![Field {
            wire: "data".to_string(),
            ident: "data".to_string(),
            ty: data_ty,
            required: required.contains("data"),
            nullable: is_nullable(data),
        }];
        for (member, ty) in [
            ("included", TypeRef::Vec(Box::new(TypeRef::Value))),
            ("meta", TypeRef::JsonMap),
            ("links", TypeRef::Value),
            ("jsonapi", TypeRef::Value),
        ] {
            if props.contains_key(member) {
                fields.push(Field {
                    wire: member.to_string(),
                    ident: member.to_string(),
                    ty,
                    required: required.contains(member),
                    nullable: false,
                });
            }
        }

        self.decls.push(TypeDecl::Struct { name: name.clone(), fields, deny_unknown_fields: false });
        Ok(DerivedType { strategy: Strategy::JsonApiResource, type_name: name, field_spec: self.decls })
    }

    fn resource_object(&mut self, schema: &Value, base: &str) -> Result<TypeRef, Mismatch> {
        if !is_object_schema(schema) {
            return mismatch("resource is not an object");
        }
        let Some(props) = properties(schema) else {
            return mismatch("resource declares no members");
        };
        if let Some(extra) = props.keys().find(|k| !RESOURCE_MEMBERS.contains(&k.as_str())) {
            return mismatch(format!("unexpected resource member '{}'", extra));
        }

        let name = self.names.claim(base);
        let required = required(schema);
        let mut fields = Vec::new();

        let Some(type_schema) = props.get("type") else {
            return mismatch("resource has no type member");
        };
        fields.push(Field {
            wire: "type".to_string(),
            ident: "r#type".to_string(),
            ty: self.resource_type(type_schema, &name)?,
            required: true,
            nullable: false,
        });

        for member in ["id", "lid"] {
            if let Some(id) = props.get(member) {
                if !matches!(type_of(id), None | Some("string")) {
                    return mismatch(format!("resource {} must be a string", member));
                }
                fields.push(Field {
                    wire: member.to_string(),
                    ident: member.to_string(),
                    ty: TypeRef::String,
                    required: required.contains(member),
                    nullable: false,
                });
            }
        }

        if let Some(attributes) = props.get("attributes") {
            if !is_object_schema(attributes) {
                return mismatch("resource attributes must be an object");
            }
            let ty = self.generic_ref(attributes, &format!("{}Attributes", name));
            fields.push(Field {
                wire: "attributes".to_string(),
                ident: "attributes".to_string(),
                ty,
                required: required.contains("attributes"),
                nullable: false,
            });
        }

        if let Some(relationships) = props.get("relationships") {
            let ty = self.relationships(relationships, &format!("{}Relationships", name))?;
            fields.push(Field {
                wire: "relationships".to_string(),
                ident: "relationships".to_string(),
                ty,
                required: required.contains("relationships"),
                nullable: false,
            });
        }

        for (member, ty) in [("links", TypeRef::Value), ("meta", TypeRef::JsonMap)] {
            if props.contains_key(member) {
                fields.push(Field {
                    wire: member.to_string(),
                    ident: member.to_string(),
                    ty,
                    required: required.contains(member),
                    nullable: false,
                });
            }
        }

        self.decls.push(TypeDecl::Struct { name: name.clone(), fields, deny_unknown_fields: false });
        Ok(TypeRef::Named(name))
    }

    fn resource_type(&mut self, schema: &Value, resource: &str) -> Result<TypeRef, Mismatch> {
        if !matches!(type_of(schema), None | Some("string")) {
            return mismatch("resource type must be a string");
        }

        let values: Vec<&str> = schema
            .get("enum")
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        match values.as_slice() {
            [single] => {
                let name = self.names.claim(&format!("{}Type", resource));
                self.decls.push(TypeDecl::Enum {
                    name: name.clone(),
                    variants: vec![Variant {
                        ident: codegen::type_name(single, "Type"),
                        wire: single.to_string(),
                    }],
                });
                Ok(TypeRef::Named(name))
            }
            _ => Ok(TypeRef::String),
        }
    }

    fn relationships(&mut self, schema: &Value, name: &str) -> Result<TypeRef, Mismatch> {
        if !is_object_schema(schema) {
            return mismatch("resource relationships must be an object");
        }
        let Some(props) = properties(schema) else {
            return Ok(TypeRef::JsonMap);
        };

        let required = required(schema);
        let mut fields = Vec::with_capacity(props.len());
        let mut idents = HashSet::new();
        for (position, (wire, member)) in props.iter().enumerate() {
            let ty = relationship(wire, member)?;
            fields.push(Field {
                wire: wire.clone(),
                ident: unique_ident(&mut idents, codegen::field_ident(wire, position)),
                ty,
                required: required.contains(wire.as_str()),
                nullable: false,
            });
        }

        let name = self.names.claim(name);
        self.decls.push(TypeDecl::Struct { name: name.clone(), fields, deny_unknown_fields: false });
        Ok(TypeRef::Named(name))
    }

    // ---- generic structures ----

    fn generic(mut self, schema: &Value, base: &str) -> DerivedType {
        let root = self.generic_ref(schema, base);
        let type_name = match &root {
            TypeRef::Named(name) if self.decls.iter().any(|d| d.name() == name) => name.clone(),
            _ => {
                let name = self.names.claim(base);
                let target = if is_nullable(schema) { TypeRef::Option(Box::new(root)) } else { root };
                self.decls.push(TypeDecl::Alias { name: name.clone(), target });
                name
            }
        };
        DerivedType { strategy: Strategy::GenericStructure, type_name, field_spec: self.decls }
    }

    fn generic_ref(&mut self, schema: &Value, name: &str) -> TypeRef {
        if !schema.is_object() || is_combinator(schema) {
            return TypeRef::Value;
        }

        match type_of(schema) {
            Some("string") => self.string_enum(schema, name).unwrap_or(TypeRef::String),
            Some("integer") => TypeRef::Integer,
            Some("number") => TypeRef::Number,
            Some("boolean") => TypeRef::Boolean,
            Some("array") => {
                let item = match schema.get("items") {
                    Some(items) => {
                        let item = self.generic_ref(items, &format!("{}Item", name));
                        if is_nullable(items) { TypeRef::Option(Box::new(item)) } else { item }
                    }
                    None => TypeRef::Value,
                };
                TypeRef::Vec(Box::new(item))
            }
            Some("object") | None => self.object(schema, name),
            Some(_) => TypeRef::Value,
        }
    }

    fn object(&mut self, schema: &Value, name: &str) -> TypeRef {
        let props = properties(schema).filter(|props| !props.is_empty());
        let additional = schema.get("additionalProperties");

        let Some(props) = props else {
            return match additional {
                Some(Value::Object(value_schema)) if !value_schema.is_empty() => {
                    let value_schema = Value::Object(value_schema.clone());
                    TypeRef::Map(Box::new(self.generic_ref(&value_schema, &format!("{}Value", name))))
                }
                _ if type_of(schema).is_some() || additional.is_some() => TypeRef::JsonMap,
                _ => TypeRef::Value,
            };
        };

        let name = self.names.claim(name);
        let required = required(schema);
        let mut fields = Vec::with_capacity(props.len());
        let mut idents = HashSet::new();
        for (position, (wire, prop)) in props.iter().enumerate() {
            let child = format!("{}{}", name, codegen::type_name(wire, "Field"));
            fields.push(Field {
                wire: wire.clone(),
                ident: unique_ident(&mut idents, codegen::field_ident(wire, position)),
                ty: self.generic_ref(prop, &child),
                required: required.contains(wire.as_str()),
                nullable: is_nullable(prop),
            });
        }

        let deny_unknown_fields = additional == Some(&Value::Bool(false));
        self.decls.push(TypeDecl::Struct { name: name.clone(), fields, deny_unknown_fields });
        TypeRef::Named(name)
    }

    fn string_enum(&mut self, schema: &Value, name: &str) -> Option<TypeRef> {
        let values = schema.get("enum")?.as_array()?;
        let wires: Vec<&str> = values.iter().filter_map(Value::as_str).collect();
        if wires.is_empty() || wires.len() != values.len() {
            return None;
        }

        let mut seen = HashSet::new();
        let mut variants = Vec::with_capacity(wires.len());
        for wire in wires {
            let ident = codegen::type_name(wire, "V");
            if !seen.insert(ident.clone()) {
                return None;
            }
            variants.push(Variant { ident, wire: wire.to_string() });
        }

        let name = self.names.claim(name);
        self.decls.push(TypeDecl::Enum { name: name.clone(), variants });
        Some(TypeRef::Named(name))
    }
}

fn relationship(wire: &str, member: &Value) -> Result<TypeRef, Mismatch> {
    let Some(data) = properties(member).and_then(|props| props.get("data")) else {
        return mismatch(format!("relationship '{}' has no data member", wire));
    };

    if type_of(data) == Some("array") {
        match data.get("items") {
            Some(items) if is_identifier(items) => Ok(TypeRef::ToMany),
            _ => mismatch(format!("relationship '{}' is not an array of resource identifiers", wire)),
        }
    } else if is_identifier(data) {
        Ok(if is_nullable(data) { TypeRef::NullableToOne } else { TypeRef::ToOne })
    } else {
        mismatch(format!("relationship '{}' does not point at a resource identifier", wire))
    }
}

fn is_identifier(schema: &Value) -> bool {
    is_object_schema(schema)
        && properties(schema).is_some_and(|props| props.contains_key("type") && props.contains_key("id"))
}

fn unique_ident(taken: &mut HashSet<String>, ident: String) -> String {
    if taken.insert(ident.clone()) {
        return ident;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", ident.trim_start_matches("r#"), n);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article_document() -> Value {
        json!({
            "type": "object",
            "required": ["data"],
            "properties": {
                "data": {
                    "type": "object",
                    "required": ["type", "id"],
                    "properties": {
                        "type": { "type": "string", "enum": ["articles"] },
                        "id": { "type": "string" },
                        "attributes": {
                            "type": "object",
                            "properties": { "title": { "type": "string" } }
                        },
                        "relationships": {
                            "type": "object",
                            "properties": {
                                "author": {
                                    "type": "object",
                                    "properties": {
                                        "data": {
                                            "type": "object",
                                            "nullable": true,
                                            "properties": {
                                                "type": { "type": "string" },
                                                "id": { "type": "string" }
                                            }
                                        }
                                    }
                                },
                                "tags": {
                                    "type": "object",
                                    "properties": {
                                        "data": {
                                            "type": "array",
                                            "items": {
                                                "type": "object",
                                                "properties": {
                                                    "type": { "type": "string" },
                                                    "id": { "type": "string" }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "meta": { "type": "object" }
            }
        })
    }

    fn find<'a>(derived: &'a DerivedType, name: &str) -> &'a TypeDecl {
        derived.field_spec.iter().find(|d| d.name() == name).unwrap()
    }

    #[test]
    fn test_resource_document() {
        let mut names = NameSet::new();
        let result = classify(&article_document(), "Response200", true, &mut names);

        assert!(result.fallback_reason.is_none());
        assert_eq!(result.derived.strategy, Strategy::JsonApiResource);
        assert_eq!(result.derived.type_name, "Response200");

        match find(&result.derived, "Response200DataType") {
            TypeDecl::Enum { variants, .. } => {
                assert_eq!(variants.len(), 1);
                assert_eq!(variants[0].wire, "articles");
            }
            other => panic!("unexpected {:?}", other),
        }

        match find(&result.derived, "Response200DataRelationships") {
            TypeDecl::Struct { fields, .. } => {
                assert_eq!(fields[0].ty, TypeRef::NullableToOne);
                assert_eq!(fields[1].ty, TypeRef::ToMany);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_fallback_always_produces_a_type() {
        let schema = json!({
            "type": "object",
            "properties": { "name": { "type": "string" }, "count": { "type": "integer" } }
        });
        let mut names = NameSet::new();
        let result = classify(&schema, "Response200", true, &mut names);

        assert_eq!(result.derived.strategy, Strategy::GenericStructure);
        assert_eq!(result.fallback_reason.as_deref(), Some("document has no data member"));
        assert_eq!(result.derived.type_name, "Response200");
    }

    #[test]
    fn test_opt_out_skips_resource_attempt() {
        let mut schema = article_document();
        schema[NOT_JSON_API] = json!(true);
        assert!(!expects_resource_schema(&schema, false));

        let mut names = NameSet::new();
        let result = classify(&schema, "Request", expects_resource_schema(&schema, false), &mut names);
        assert_eq!(result.derived.strategy, Strategy::GenericStructure);
        assert!(result.fallback_reason.is_none());
    }

    #[test]
    fn test_media_type_opt_out() {
        assert!(!expects_resource_schema(&article_document(), true));
        assert!(expects_resource_schema(&article_document(), false));
    }

    #[test]
    fn test_failed_attempt_does_not_leak_names() {
        let schema = json!({
            "type": "object",
            "properties": {
                "data": { "type": "object", "properties": { "type": { "type": "integer" } } }
            }
        });
        let mut names = NameSet::new();
        let result = classify(&schema, "Response200", true, &mut names);

        assert_eq!(result.fallback_reason.as_deref(), Some("resource type must be a string"));
        assert_eq!(result.derived.type_name, "Response200");
        assert!(result.derived.field_spec.iter().any(|d| d.name() == "Response200Data"));
    }

    #[test]
    fn test_all_of_is_merged() {
        let schema = json!({
            "allOf": [
                { "type": "object", "required": ["a"], "properties": { "a": { "type": "string" } } },
                { "required": ["b"], "properties": { "b": { "type": "integer" } } }
            ]
        });
        let simplified = simplify(&schema).unwrap();
        assert_eq!(simplified["type"], "object");
        assert_eq!(simplified["required"], json!(["a", "b"]));
        assert_eq!(simplified["properties"]["b"]["type"], "integer");
    }

    #[test]
    fn test_all_of_conflict_falls_back() {
        let schema = json!({ "allOf": [ { "type": "object" }, { "type": "string" } ] });
        assert_eq!(
            simplify(&schema),
            Err(SimplifyError::TypeConflict("object".to_string(), "string".to_string()))
        );

        let mut names = NameSet::new();
        let result = classify(&schema, "Request", true, &mut names);
        assert!(result.fallback_reason.unwrap().contains("conflicting types"));
        match find(&result.derived, "Request") {
            TypeDecl::Alias { target, .. } => assert_eq!(target, &TypeRef::Value),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_generic_shapes() {
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["id"],
            "properties": {
                "id": { "type": "integer" },
                "labels": { "type": "object", "additionalProperties": { "type": "string" } },
                "extra": { "type": "object" },
                "choice": { "oneOf": [ { "type": "string" }, { "type": "integer" } ] },
                "scores": { "type": "array", "items": { "type": "number", "nullable": true } },
                "state": { "type": "string", "enum": ["on", "off"] },
                "note": { "type": "string", "nullable": true }
            }
        });
        let mut names = NameSet::new();
        let derived = classify(&schema, "Response200", false, &mut names).derived;

        let TypeDecl::Struct { fields, deny_unknown_fields, .. } = find(&derived, "Response200") else {
            panic!("root is not a struct");
        };
        assert!(deny_unknown_fields);
        let ty = |wire: &str| fields.iter().find(|f| f.wire == wire).unwrap().ty.clone();
        assert_eq!(ty("id"), TypeRef::Integer);
        assert_eq!(ty("labels"), TypeRef::Map(Box::new(TypeRef::String)));
        assert_eq!(ty("extra"), TypeRef::JsonMap);
        assert_eq!(ty("choice"), TypeRef::Value);
        assert_eq!(ty("scores"), TypeRef::Vec(Box::new(TypeRef::Option(Box::new(TypeRef::Number)))));
        assert_eq!(ty("state"), TypeRef::Named("Response200State".to_string()));
        assert!(fields.iter().find(|f| f.wire == "note").unwrap().nullable);
    }

    #[test]
    fn test_top_level_array_becomes_alias() {
        let schema = json!({ "type": "array", "items": { "type": "object", "properties": { "n": { "type": "string" } } } });
        let mut names = NameSet::new();
        let derived = classify(&schema, "Response200", false, &mut names).derived;
        assert_eq!(derived.type_name, "Response200");
        match find(&derived, "Response200") {
            TypeDecl::Alias { target, .. } => {
                assert_eq!(target, &TypeRef::Vec(Box::new(TypeRef::Named("Response200Item".to_string()))))
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
