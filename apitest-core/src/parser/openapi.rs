//! OpenAPI document resolver
//!
//! Walks an [`OpenAPI`] document and produces the [`ResolvedDocument`] the
//! synthesizer consumes: parameters merged, component references looked up and
//! body schemas inlined into plain JSON trees.

use openapiv3::{
    Components, Example, MediaType, OpenAPI, Operation, Parameter, PathItem, ReferenceOr,
    RequestBody, Response,
};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::model::*;
use super::{ResolveError, Resolution, ResolverWarning, SchemaResolver};

const MAX_REFERENCE_DEPTH: usize = 16;
const NOT_JSON_API: &str = "x-not-json-api";
const TEST_PARAMETERS: &str = "x-tests";

/// Resolver for OpenAPI 3.0 documents
#[derive(Debug, Default)]
pub struct OpenApiResolver {}

impl OpenApiResolver {
    /// Create a new OpenAPI resolver
    pub fn new() -> Self {
        Self {}
    }
}

impl SchemaResolver for OpenApiResolver {
    fn resolve(&self, document: &OpenAPI) -> Result<Resolution, ResolveError> {
        if !document.openapi.starts_with("3.") {
            return Err(ResolveError::UnsupportedVersion(document.openapi.clone()));
        }

        let mut walker = Walker::new(document)?;
        let mut resolved = ResolvedDocument {
            servers: document.servers.iter().map(|s| s.url.clone()).collect(),
            operations: Vec::new(),
        };

        for (path, item) in &document.paths.paths {
            let item = match item {
                ReferenceOr::Item(item) => item,
                ReferenceOr::Reference { reference } => {
                    walker.warn(Some(path), format!("path item reference '{}' is not supported", reference));
                    continue;
                }
            };

            for (method, operation) in operations_of(item) {
                debug!("Resolving {} {}", method, path);
                let resolved_op = walker.resolve_operation(path, method, item, operation);
                resolved.operations.push(resolved_op);
            }
        }

        Ok(Resolution { document: resolved, warnings: walker.warnings })
    }
}

fn operations_of(item: &PathItem) -> Vec<(HttpMethod, &Operation)> {
    [
        (HttpMethod::Get, &item.get),
        (HttpMethod::Post, &item.post),
        (HttpMethod::Put, &item.put),
        (HttpMethod::Patch, &item.patch),
        (HttpMethod::Delete, &item.delete),
        (HttpMethod::Head, &item.head),
        (HttpMethod::Options, &item.options),
        (HttpMethod::Trace, &item.trace),
    ]
    .into_iter()
    .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    .collect()
}

/// Per-document traversal state
struct Walker<'a> {
    components: Option<&'a Components>,
    schemas: Map<String, Value>,
    warnings: Vec<ResolverWarning>,
}

impl<'a> Walker<'a> {
    fn new(document: &'a OpenAPI) -> Result<Self, ResolveError> {
        let schemas = match &document.components {
            Some(components) => match serde_json::to_value(&components.schemas)? {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            None => Map::new(),
        };

        Ok(Self { components: document.components.as_ref(), schemas, warnings: Vec::new() })
    }

    fn warn(&mut self, path: Option<&str>, message: String) {
        warn!("{}", message);
        self.warnings.push(ResolverWarning { path: path.map(String::from), message });
    }

    fn resolve_operation(
        &mut self,
        path: &str,
        method: HttpMethod,
        item: &'a PathItem,
        operation: &'a Operation,
    ) -> ResolvedOperation {
        let mut resolved = ResolvedOperation::new(path, method);
        let context = format!("{} {}", method, path);

        // operation-level parameters override path-level ones with the same name and location
        for param_ref in item.parameters.iter().chain(operation.parameters.iter()) {
            let Some(param) = self.deref(param_ref, "parameters", |c, n| c.parameters.get(n), &context)
            else {
                continue;
            };
            let param = convert_parameter(param);
            resolved.parameters.retain(|p| !(p.name == param.name && p.location == param.location));
            resolved.parameters.push(param);
        }

        if let Some(body_ref) = &operation.request_body {
            if let Some(body) =
                self.deref(body_ref, "requestBodies", |c, n| c.request_bodies.get(n), &context)
            {
                let body: &RequestBody = body;
                resolved.request_body = Some(self.resolve_body(body.content.iter(), &context));
            }
        }

        let default = operation.responses.default.as_ref().map(|r| (StatusCode::Default, r));
        let coded = operation.responses.responses.iter().filter_map(|(status, r)| {
            match status.to_string().parse::<StatusCode>() {
                Ok(status) => Some((status, r)),
                Err(_) => None,
            }
        });

        for (status, response_ref) in coded.chain(default) {
            let Some(response) =
                self.deref(response_ref, "responses", |c, n| c.responses.get(n), &context)
            else {
                continue;
            };
            let response: &Response = response;
            let body = self.resolve_body(response.content.iter(), &context);
            let test_parameters = response.extensions.get(TEST_PARAMETERS).cloned();
            resolved.responses.insert(status, ResolvedResponse { body, test_parameters });
        }

        resolved
    }

    fn resolve_body<I>(&mut self, content: I, context: &str) -> ResolvedBody
    where
        I: Iterator<Item = (&'a String, &'a MediaType)>,
    {
        let mut body = ResolvedBody::default();
        for (media_type, media) in content {
            let resolved = self.resolve_media(media, context);
            body.content.insert(media_type.clone(), resolved);
        }
        body
    }

    fn resolve_media(&mut self, media: &'a MediaType, context: &str) -> ResolvedContent {
        let schema = match &media.schema {
            Some(schema_ref) => match serde_json::to_value(schema_ref) {
                Ok(value) => {
                    let mut stack = Vec::new();
                    Some(self.inline_schema(&value, &mut stack, context))
                }
                Err(e) => {
                    self.warn(Some(context), format!("could not read schema: {}", e));
                    None
                }
            },
            None => None,
        };

        let mut examples = BTreeMap::new();
        if let Some(example) = &media.example {
            examples.insert("example".to_string(), example.clone());
        }
        for (name, example_ref) in &media.examples {
            let Some(example) = self.deref(example_ref, "examples", |c, n| c.examples.get(n), context)
            else {
                continue;
            };
            let example: &Example = example;
            match (&example.value, &example.external_value) {
                (Some(value), _) => {
                    examples.insert(name.clone(), value.clone());
                }
                (None, Some(external)) => self.warn(
                    Some(context),
                    format!("example '{}' only has an external value ({}); skipped", name, external),
                ),
                (None, None) => {
                    self.warn(Some(context), format!("example '{}' has no value; skipped", name))
                }
            }
        }

        let not_json_api =
            media.extensions.get(NOT_JSON_API).and_then(Value::as_bool).unwrap_or(false);

        ResolvedContent { schema, examples, not_json_api }
    }

    /// Follow component references until an item is found
    fn deref<T, F>(
        &mut self,
        mut current: &'a ReferenceOr<T>,
        section: &str,
        lookup: F,
        context: &str,
    ) -> Option<&'a T>
    where
        F: Fn(&'a Components, &str) -> Option<&'a ReferenceOr<T>>,
    {
        for _ in 0..MAX_REFERENCE_DEPTH {
            match current {
                ReferenceOr::Item(item) => return Some(item),
                ReferenceOr::Reference { reference } => {
                    let prefix = format!("#/components/{}/", section);
                    let next = reference
                        .strip_prefix(&prefix)
                        .and_then(|name| self.components.and_then(|c| lookup(c, name)));
                    match next {
                        Some(next) => current = next,
                        None => {
                            self.warn(
                                Some(context),
                                format!("unresolvable reference '{}'; skipped", reference),
                            );
                            return None;
                        }
                    }
                }
            }
        }

        self.warn(Some(context), format!("reference chain in '{}' is too deep; skipped", section));
        None
    }

    /// Replace every `#/components/schemas/...` reference with its target
    fn inline_schema(&mut self, value: &Value, stack: &mut Vec<String>, context: &str) -> Value {
        match value {
            Value::Object(map) => {
                if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                    return self.inline_reference(reference, stack, context);
                }

                let mut inlined = Map::with_capacity(map.len());
                for (key, child) in map {
                    // example payloads are data, not schemas
                    let child = if key == "example" || key == "examples" || key == "enum" {
                        child.clone()
                    } else {
                        self.inline_schema(child, stack, context)
                    };
                    inlined.insert(key.clone(), child);
                }
                Value::Object(inlined)
            }
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.inline_schema(item, stack, context)).collect())
            }
            other => other.clone(),
        }
    }

    fn inline_reference(&mut self, reference: &str, stack: &mut Vec<String>, context: &str) -> Value {
        let Some(name) = reference.strip_prefix("#/components/schemas/") else {
            self.warn(Some(context), format!("schema reference '{}' is not local; left unconstrained", reference));
            return json!({});
        };

        if stack.iter().any(|seen| seen == name) {
            self.warn(
                Some(context),
                format!("schema '{}' refers to itself; the recursive member is left unconstrained", name),
            );
            return json!({});
        }

        let Some(target) = self.schemas.get(name).cloned() else {
            self.warn(Some(context), format!("schema '{}' does not exist; left unconstrained", name));
            return json!({});
        };

        stack.push(name.to_string());
        let inlined = self.inline_schema(&target, stack, context);
        stack.pop();
        inlined
    }
}

fn convert_parameter(param: &Parameter) -> ResolvedParameter {
    let (data, location) = match param {
        Parameter::Query { parameter_data, .. } => (parameter_data, ParameterLocation::Query),
        Parameter::Path { parameter_data, .. } => (parameter_data, ParameterLocation::Path),
        Parameter::Header { parameter_data, .. } => (parameter_data, ParameterLocation::Header),
        Parameter::Cookie { parameter_data, .. } => (parameter_data, ParameterLocation::Cookie),
    };

    ResolvedParameter { name: data.name.clone(), location, required: data.required }
}
