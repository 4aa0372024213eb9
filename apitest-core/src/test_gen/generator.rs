//! Source tree synthesizer
//!
//! Operations are planned one at a time; a body that cannot be classified or a
//! live test that cannot be resolved becomes a warning and only that piece is
//! skipped. The plans are then arranged into a namespace tree keyed by the
//! sanitized path segments and rendered by the Rust emitter.

use super::classifier;
use super::frameworks::codegen;
use super::frameworks::rust::{RustEmitter, TEST_TARGET};
use super::live;
use super::naming::{self, Direction, Identifier, TestFunctionName};
use super::plan::{Constant, OperationPlan, PlannedTest, TestBody};
use super::types::NameSet;
use super::{GeneratedArtifact, Synthesis, SynthesisWarning, TestSuiteConfig};
use crate::parser::{HttpMethod, ResolvedBody, ResolvedDocument, ResolvedOperation, StatusCode};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Highest numeric suffix tried when example names collide
const MAX_NAME_SUFFIX: usize = 100;

/// Turns resolved operations into a generated test package
pub struct Synthesizer {
    config: TestSuiteConfig,
    emitter: RustEmitter,
}

/// Outcome of planning one body
#[derive(Debug, Default)]
struct BodyPlan {
    type_name: Option<String>,
    /// Example name to the constant holding its payload
    examples: BTreeMap<String, String>,
}

impl Synthesizer {
    pub fn new(config: TestSuiteConfig) -> Self {
        let emitter = RustEmitter::new(&config);
        Self { config, emitter }
    }

    pub fn config(&self) -> &TestSuiteConfig {
        &self.config
    }

    /// Plan and render the whole package
    pub fn synthesize(&self, document: &ResolvedDocument) -> Synthesis {
        let mut warnings = Vec::new();
        let mut root = NamespaceNode::default();
        let mut test_count = 0;
        let mut live_requests = false;

        let default_host = self.config.api_host_override.as_deref().or(document.servers.first().map(String::as_str));

        for operation in &document.operations {
            let operation_name = operation.display_name();
            for (status, response) in &operation.responses {
                if response.body.is_empty() && status.expects_content_for(operation.method) {
                    push_warning(
                        &mut warnings,
                        &operation_name,
                        &format!("{} response has no content; this is unusual", status),
                    );
                }
            }

            if !operation.has_json_content() {
                push_warning(&mut warnings, &operation_name, "no JSON request or response content; no tests generated");
                continue;
            }

            let plan = self.plan_operation(operation, default_host, &mut warnings);
            if plan.types.is_empty() && plan.tests.is_empty() {
                push_warning(&mut warnings, &operation_name, "no schemas to derive types from; no tests generated");
                continue;
            }

            let tests = plan.tests.len();
            let has_live = plan.tests.iter().any(|t| matches!(t.body, TestBody::LiveRequest { .. }));
            if let Err(existing) = root.insert(plan) {
                push_warning(
                    &mut warnings,
                    &operation_name,
                    &format!("shares its generated module with {}; skipped", existing),
                );
                continue;
            }

            debug!("Planned {} tests for {}", tests, operation_name);
            test_count += tests;
            live_requests |= has_live;
        }

        let mut artifacts = vec![
            GeneratedArtifact { path: PathBuf::from("Cargo.toml"), contents: self.emitter.manifest(live_requests) },
            GeneratedArtifact { path: PathBuf::from("src/lib.rs"), contents: self.emitter.lib_rs() },
            GeneratedArtifact {
                path: PathBuf::from("src/support.rs"),
                contents: self.emitter.support_rs(live_requests),
            },
            GeneratedArtifact {
                path: PathBuf::from(format!("tests/{}.rs", TEST_TARGET)),
                contents: self.emitter.harness_rs(),
            },
        ];
        root.render(&self.emitter, Path::new("src/paths"), "/", &mut artifacts);

        info!("Synthesized {} tests in {} files ({} warnings)", test_count, artifacts.len(), warnings.len());
        Synthesis { artifacts, test_count, warnings }
    }

    fn plan_operation(
        &self,
        operation: &ResolvedOperation,
        default_host: Option<&str>,
        warnings: &mut Vec<SynthesisWarning>,
    ) -> OperationPlan {
        let mut plan = OperationPlan::new(&operation.path, operation.method);
        let mut names = NameSet::new();
        let mut taken = HashSet::new();

        if let Some(body) = &operation.request_body {
            self.plan_body(operation, Direction::Request, body, &mut plan, &mut names, &mut taken, warnings);
        }

        for (status, response) in &operation.responses {
            let direction = Direction::Response(*status);
            let body = self.plan_body(operation, direction, &response.body, &mut plan, &mut names, &mut taken, warnings);

            if let Some(raw) = &response.test_parameters {
                self.plan_live_tests(operation, *status, raw, &body, default_host, &mut plan, &mut taken, warnings);
            }
        }

        plan
    }

    #[allow(clippy::too_many_arguments)]
    fn plan_body(
        &self,
        operation: &ResolvedOperation,
        direction: Direction,
        body: &ResolvedBody,
        plan: &mut OperationPlan,
        names: &mut NameSet,
        taken: &mut HashSet<String>,
        warnings: &mut Vec<SynthesisWarning>,
    ) -> BodyPlan {
        let operation_name = operation.display_name();
        let label = body_label(direction);

        let Some((media_type, content)) = body.json_content() else {
            return BodyPlan::default();
        };
        let Some(schema) = &content.schema else {
            if !content.examples.is_empty() {
                push_warning(warnings, &operation_name, &format!("{} ({}) has examples but no schema; skipped", label, media_type));
            }
            return BodyPlan::default();
        };

        let expect_resource = classifier::expects_resource_schema(schema, content.not_json_api);
        let classification = classifier::classify(schema, &type_base(direction), expect_resource, names);
        if let Some(reason) = &classification.fallback_reason {
            push_warning(
                warnings,
                &operation_name,
                &format!("{} is not a JSON:API resource document ({}); decoding it as a generic structure", label, reason),
            );
        }

        let type_name = classification.derived.type_name.clone();
        plan.types.push(classification.derived);

        let prefix = const_prefix(direction);
        let schema_const = if self.config.validate_schema {
            let name = format!("{}_SCHEMA", prefix);
            plan.constants.push(Constant { name: name.clone(), json: to_json_schema(schema).to_string() });
            Some(name)
        } else {
            None
        };

        let mut examples = BTreeMap::new();
        for (position, (example_name, payload)) in content.examples.iter().enumerate() {
            let context = match naming::example_context(example_name) {
                Some(context) => context,
                None => {
                    push_warning(
                        warnings,
                        &operation_name,
                        &format!("example '{}' of {} has no usable name; numbered instead", example_name, label),
                    );
                    match Identifier::parse(&format!("example_{}", position + 1)) {
                        Some(context) => context,
                        None => continue,
                    }
                }
            };

            let Some((name, context)) = claim_test_name(operation, direction, context, taken) else {
                continue;
            };

            let const_name =
                unique_const_name(plan, format!("{}_EXAMPLE_{}", prefix, context.as_str().to_ascii_uppercase()));
            plan.constants.push(Constant { name: const_name.clone(), json: payload.to_string() });
            plan.tests.push(PlannedTest {
                name,
                body: TestBody::DecodeExample {
                    type_name: type_name.clone(),
                    example: const_name.clone(),
                    schema: schema_const.clone(),
                },
            });
            examples.insert(example_name.clone(), const_name);
        }

        BodyPlan { type_name: Some(type_name), examples }
    }

    #[allow(clippy::too_many_arguments)]
    fn plan_live_tests(
        &self,
        operation: &ResolvedOperation,
        status: StatusCode,
        raw: &Value,
        body: &BodyPlan,
        default_host: Option<&str>,
        plan: &mut OperationPlan,
        taken: &mut HashSet<String>,
        warnings: &mut Vec<SynthesisWarning>,
    ) {
        let operation_name = operation.display_name();
        let specs = match live::parse_entries(raw) {
            Ok(specs) => specs,
            Err(reason) => {
                push_warning(warnings, &operation_name, &format!("{} response: {}", status, reason));
                return;
            }
        };

        for spec in specs {
            let context = naming::request_context(spec.slug.as_deref());
            let skip = |warnings: &mut Vec<SynthesisWarning>, reason: String| {
                push_warning(warnings, &operation_name, &format!("skipping live test {} for {}: {}", context, status, reason));
            };

            let request = match live::plan_request(operation, &spec.entry, default_host) {
                Ok(request) => request,
                Err(reason) => {
                    skip(warnings, reason);
                    continue;
                }
            };

            let example = match (&spec.entry.example, spec.entry.skip_example) {
                (Some(name), false) => match body.examples.get(name) {
                    Some(constant) => Some(constant.clone()),
                    None => {
                        skip(warnings, format!("example '{}' is not declared on this response", name));
                        continue;
                    }
                },
                _ => None,
            };

            let name = TestFunctionName::new(&operation.path, operation.method, Direction::Response(status), context.clone());
            if !taken.insert(name.encode()) {
                skip(warnings, "another live test has the same name".to_string());
                continue;
            }

            plan.tests.push(PlannedTest {
                name,
                body: TestBody::LiveRequest {
                    method: operation.method,
                    url: request.url,
                    query: request.query,
                    expected: status,
                    type_name: body.type_name.clone(),
                    example,
                },
            });
        }
    }
}

/// Give an example test a name no other test in the operation uses
fn claim_test_name(
    operation: &ResolvedOperation,
    direction: Direction,
    context: Identifier,
    taken: &mut HashSet<String>,
) -> Option<(TestFunctionName, Identifier)> {
    for n in 1..=MAX_NAME_SUFFIX {
        let candidate = match n {
            1 => context.clone(),
            n => Identifier::parse(&format!("{}_{}", context, n))?,
        };
        let name = TestFunctionName::new(&operation.path, operation.method, direction, candidate.clone());
        if taken.insert(name.encode()) {
            return Some((name, candidate));
        }
    }
    warn!("Could not find a free test name for {} in {}", context, operation.display_name());
    None
}

/// Constant name not yet declared in the operation's module
fn unique_const_name(plan: &OperationPlan, base: String) -> String {
    let declared = |name: &str| plan.constants.iter().any(|c| c.name == name);
    let mut name = base.clone();
    let mut n = 2;
    while declared(&name) {
        name = format!("{}_{}", base, n);
        n += 1;
    }
    name
}

fn push_warning(warnings: &mut Vec<SynthesisWarning>, path: &str, message: &str) {
    debug!("{}: {}", path, message);
    warnings.push(SynthesisWarning { path: Some(path.to_string()), message: message.to_string() });
}

fn body_label(direction: Direction) -> String {
    match direction {
        Direction::Request => "request body".to_string(),
        Direction::Response(status) => format!("{} response body", status),
    }
}

/// `Request`, `Response200`, `Response2XX`, `ResponseDefault`
fn type_base(direction: Direction) -> String {
    match direction {
        Direction::Request => "Request".to_string(),
        Direction::Response(StatusCode::Default) => "ResponseDefault".to_string(),
        Direction::Response(status) => format!("Response{}", status),
    }
}

fn const_prefix(direction: Direction) -> String {
    codegen::const_name(&[&type_base(direction).replace("Response", "response_")])
}

/// Rewrite OpenAPI 3.0 schema dialect into plain JSON Schema
pub fn to_json_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                let value = match (key.as_str(), value) {
                    ("example" | "examples" | "enum" | "default" | "const", _) => value.clone(),
                    // member names are data, each member is a schema
                    ("properties", Value::Object(props)) => Value::Object(
                        props.iter().map(|(name, prop)| (name.clone(), to_json_schema(prop))).collect(),
                    ),
                    _ if key.starts_with("x-") => continue,
                    _ => to_json_schema(value),
                };
                out.insert(key.clone(), value);
            }

            if out.remove("nullable") == Some(Value::Bool(true)) {
                if let Some(Value::String(ty)) = out.get("type").cloned() {
                    out.insert("type".to_string(), Value::Array(vec![Value::String(ty), Value::from("null")]));
                }
                if let Some(Value::Array(values)) = out.get_mut("enum") {
                    if !values.contains(&Value::Null) {
                        values.push(Value::Null);
                    }
                }
            }

            for (exclusive, bound) in [("exclusiveMinimum", "minimum"), ("exclusiveMaximum", "maximum")] {
                if let Some(Value::Bool(flag)) = out.get(exclusive).cloned() {
                    out.remove(exclusive);
                    if flag {
                        if let Some(limit) = out.remove(bound) {
                            out.insert(exclusive.to_string(), limit);
                        }
                    }
                }
            }

            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(to_json_schema).collect()),
        other => other.clone(),
    }
}

/// One level of the generated module tree
#[derive(Debug, Default)]
struct NamespaceNode {
    children: BTreeMap<Identifier, NamespaceNode>,
    operations: BTreeMap<HttpMethod, OperationPlan>,
}

impl NamespaceNode {
    /// File the plan under its path; returns the clashing operation if the slot is taken
    fn insert(&mut self, plan: OperationPlan) -> Result<(), String> {
        let mut node = self;
        for segment in naming::path_segments(&plan.path) {
            node = node.children.entry(segment).or_default();
        }
        if let Some(existing) = node.operations.get(&plan.method) {
            return Err(format!("{} {}", existing.method, existing.path));
        }
        node.operations.insert(plan.method, plan);
        Ok(())
    }

    fn render(&self, emitter: &RustEmitter, dir: &Path, title: &str, artifacts: &mut Vec<GeneratedArtifact>) {
        let children: Vec<(String, &Identifier)> =
            self.children.keys().map(|segment| (module_ident(segment), segment)).collect();
        let child_modules: Vec<String> = children.iter().map(|(module, _)| module.clone()).collect();
        let operation_modules: Vec<String> = self.operations.keys().map(|m| m.to_string()).collect();

        artifacts.push(GeneratedArtifact {
            path: dir.join("mod.rs"),
            contents: emitter.namespace_module(title, &child_modules, &operation_modules),
        });

        for (method, plan) in &self.operations {
            artifacts.push(GeneratedArtifact {
                path: dir.join(format!("{}.rs", method)),
                contents: emitter.operation_module(plan),
            });
        }

        for (module, segment) in children {
            if let Some(child) = self.children.get(segment) {
                let child_title = format!("{}/{}", title.trim_end_matches('/'), segment);
                child.render(emitter, &dir.join(module.trim_start_matches("r#")), &child_title, artifacts);
            }
        }
    }
}

/// Module name for a path segment; never collides with the operation modules beside it
fn module_ident(segment: &Identifier) -> String {
    if segment.as_str().parse::<HttpMethod>().is_ok() {
        format!("{}_path", segment)
    } else {
        codegen::ident(segment.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParameterLocation, ResolvedContent, ResolvedParameter, ResolvedResponse};
    use crate::test_gen::ParserMode;
    use serde_json::json;

    fn json_body(schema: Value, examples: &[(&str, Value)]) -> ResolvedBody {
        let content = ResolvedContent {
            schema: Some(schema),
            examples: examples.iter().map(|(n, v)| (n.to_string(), v.clone())).collect(),
            not_json_api: false,
        };
        ResolvedBody { content: BTreeMap::from([("application/json".to_string(), content)]) }
    }

    fn widget_schema() -> Value {
        json!({
            "type": "object",
            "required": ["name"],
            "properties": { "name": { "type": "string" } }
        })
    }

    fn widgets_document() -> ResolvedDocument {
        let mut op = ResolvedOperation::new("/widgets", HttpMethod::Get);
        op.responses.insert(
            StatusCode::Code(200),
            ResolvedResponse {
                body: json_body(widget_schema(), &[("basic", json!({ "name": "sprocket" }))]),
                test_parameters: None,
            },
        );
        ResolvedDocument { servers: vec!["https://api.example.com".into()], operations: vec![op] }
    }

    #[test]
    fn test_single_example_yields_one_named_test() {
        let synthesis = Synthesizer::new(TestSuiteConfig::default()).synthesize(&widgets_document());

        assert_eq!(synthesis.test_count, 1);
        let module = synthesis.artifact("src/paths/widgets/GET.rs").unwrap();
        assert!(module.contents.contains("pub fn test_widgets__GET__response__200__basic() -> TestResult"));
        assert!(module.contents.contains("pub struct Response200 {"));

        let root = synthesis.artifact("src/paths/mod.rs").unwrap();
        assert!(root.contents.contains("pub mod widgets;"));
        let node = synthesis.artifact("src/paths/widgets/mod.rs").unwrap();
        assert!(node.contents.contains("pub mod GET;"));

        assert!(synthesis.artifact("Cargo.toml").is_some());
        assert!(synthesis.artifact("tests/api_tests.rs").is_some());
        // plain object bodies fall back with a warning
        assert_eq!(synthesis.warnings.len(), 1);
    }

    #[test]
    fn test_operation_without_json_content_is_skipped_with_warning() {
        let mut document = widgets_document();
        let mut delete = ResolvedOperation::new("/widgets/{id}", HttpMethod::Delete);
        delete.responses.insert(StatusCode::Code(204), ResolvedResponse::default());
        document.operations.push(delete);

        let synthesis = Synthesizer::new(TestSuiteConfig::default()).synthesize(&document);
        assert_eq!(synthesis.test_count, 1);
        assert!(synthesis.artifact("src/paths/widgets/id/DELETE.rs").is_none());
        assert!(synthesis
            .warnings
            .iter()
            .any(|w| w.path.as_deref() == Some("DELETE /widgets/{id}") && w.message.contains("no JSON")));
    }

    #[test]
    fn test_missing_content_on_get_200_warns() {
        let mut document = widgets_document();
        let mut empty = ResolvedOperation::new("/gadgets", HttpMethod::Get);
        empty.responses.insert(StatusCode::Code(200), ResolvedResponse::default());
        empty.request_body = Some(json_body(json!({ "type": "object", "x-not-json-api": true }), &[]));
        document.operations.push(empty);

        let synthesis = Synthesizer::new(TestSuiteConfig::default()).synthesize(&document);
        assert!(synthesis.warnings.iter().any(|w| w.message.contains("200 response has no content")));
    }

    #[test]
    fn test_content_less_get_200_is_unusual_not_just_skipped() {
        let mut op = ResolvedOperation::new("/gadgets", HttpMethod::Get);
        op.responses.insert(StatusCode::Code(200), ResolvedResponse::default());
        let document = ResolvedDocument { servers: vec![], operations: vec![op] };

        let synthesis = Synthesizer::new(TestSuiteConfig::default()).synthesize(&document);
        assert_eq!(synthesis.test_count, 0);
        let unusual: Vec<_> = synthesis
            .warnings
            .iter()
            .filter(|w| w.path.as_deref() == Some("GET /gadgets") && w.message.contains("this is unusual"))
            .collect();
        assert_eq!(unusual.len(), 1);
        assert_eq!(unusual[0].message, "200 response has no content; this is unusual");
    }

    #[test]
    fn test_shared_namespaces() {
        let mut document = widgets_document();
        let mut post = ResolvedOperation::new("/widgets", HttpMethod::Post);
        post.request_body = Some(json_body(widget_schema(), &[("new", json!({ "name": "a" }))]));
        document.operations.push(post);
        let mut nested = ResolvedOperation::new("/widgets/{id}/parts", HttpMethod::Get);
        nested.responses.insert(
            StatusCode::Code(200),
            ResolvedResponse { body: json_body(json!({ "type": "array" }), &[("none", json!([]))]), test_parameters: None },
        );
        document.operations.push(nested);

        let synthesis = Synthesizer::new(TestSuiteConfig::default()).synthesize(&document);
        assert_eq!(synthesis.test_count, 3);

        let node = synthesis.artifact("src/paths/widgets/mod.rs").unwrap();
        assert!(node.contents.contains("pub mod id;\npub mod GET;\npub mod POST;\n"));
        assert!(synthesis.artifact("src/paths/widgets/id/parts/GET.rs").is_some());
        assert!(synthesis
            .artifact("src/paths/widgets/POST.rs")
            .unwrap()
            .contents
            .contains("test_widgets__POST__request__new"));
    }

    #[test]
    fn test_undeclared_live_parameter_skips_only_that_test() {
        let mut op = ResolvedOperation::new("/widgets/{id}", HttpMethod::Get);
        op.parameters.push(ResolvedParameter { name: "id".into(), location: ParameterLocation::Path, required: true });
        op.responses.insert(
            StatusCode::Code(200),
            ResolvedResponse {
                body: json_body(widget_schema(), &[("basic", json!({ "name": "a" }))]),
                test_parameters: Some(json!({
                    "good": { "parameters": { "id": "1" }, "example": "basic" },
                    "bad": { "parameters": { "id": "1", "shop": "2" } }
                })),
            },
        );
        op.responses.insert(
            StatusCode::Code(404),
            ResolvedResponse {
                body: json_body(json!({ "type": "object", "x-not-json-api": true }), &[("missing", json!({}))]),
                test_parameters: None,
            },
        );
        let document = ResolvedDocument { servers: vec!["https://api.example.com".into()], operations: vec![op] };

        let synthesis = Synthesizer::new(TestSuiteConfig::default()).synthesize(&document);
        let module = &synthesis.artifact("src/paths/widgets/id/GET.rs").unwrap().contents;

        assert!(module.contains("test_widgets__id__GET__response__200__basic"));
        assert!(module.contains("test_widgets__id__GET__response__200__request_test_good"));
        assert!(!module.contains("request_test_bad"));
        assert!(module.contains("test_widgets__id__GET__response__404__missing"));
        assert!(module.contains("\"https://api.example.com/widgets/1\""));
        assert!(module.contains("support::assert_same_json(&body, RESPONSE_200_EXAMPLE_BASIC)?;"));
        assert_eq!(synthesis.test_count, 3);
        assert!(synthesis.warnings.iter().any(|w| w.message.contains("skipping live test request_test_bad")));

        let manifest = &synthesis.artifact("Cargo.toml").unwrap().contents;
        assert!(manifest.contains("reqwest"));
    }

    #[test]
    fn test_host_override_and_parser_mode() {
        let mut document = widgets_document();
        document.operations[0].responses.get_mut(&StatusCode::Code(200)).unwrap().test_parameters =
            Some(json!({ "skip_example": true }));
        let config = TestSuiteConfig {
            api_host_override: Some("http://localhost:3000".into()),
            parser_mode: ParserMode::Stable,
            validate_schema: true,
            ..Default::default()
        };

        let synthesis = Synthesizer::new(config).synthesize(&document);
        let module = &synthesis.artifact("src/paths/widgets/GET.rs").unwrap().contents;
        assert!(module.contains("\"http://localhost:3000/widgets\""));
        assert!(module.contains("test_widgets__GET__response__200__request_test()"));
        assert!(module.contains("support::decode_stable::<Response200>"));
        assert!(module.contains("support::validate(RESPONSE_200_EXAMPLE_BASIC, RESPONSE_200_SCHEMA)?;"));
    }

    #[test]
    fn test_duplicate_example_contexts_get_suffixes() {
        let mut document = widgets_document();
        document.operations[0].responses.get_mut(&StatusCode::Code(200)).unwrap().body = json_body(
            widget_schema(),
            &[("a b", json!({ "name": "x" })), ("a-b", json!({ "name": "y" }))],
        );

        let synthesis = Synthesizer::new(TestSuiteConfig::default()).synthesize(&document);
        let module = &synthesis.artifact("src/paths/widgets/GET.rs").unwrap().contents;
        assert!(module.contains("fn test_widgets__GET__response__200__a_b()"));
        assert!(module.contains("fn test_widgets__GET__response__200__a_b_2()"));
    }

    #[test]
    fn test_examples_differing_only_in_case_get_distinct_constants() {
        let mut document = widgets_document();
        document.operations[0].responses.get_mut(&StatusCode::Code(200)).unwrap().body = json_body(
            widget_schema(),
            &[("Basic", json!({ "name": "x" })), ("basic", json!({ "name": "y" }))],
        );

        let synthesis = Synthesizer::new(TestSuiteConfig::default()).synthesize(&document);
        assert_eq!(synthesis.test_count, 2);
        let module = &synthesis.artifact("src/paths/widgets/GET.rs").unwrap().contents;
        assert_eq!(module.matches("const RESPONSE_200_EXAMPLE_BASIC: &str").count(), 1);
        assert_eq!(module.matches("const RESPONSE_200_EXAMPLE_BASIC_2: &str").count(), 1);
        assert!(module.contains("RESPONSE_200_EXAMPLE_BASIC)"));
        assert!(module.contains("RESPONSE_200_EXAMPLE_BASIC_2)"));
    }

    #[test]
    fn test_last_name_suffix_is_tried() {
        let op = ResolvedOperation::new("/widgets", HttpMethod::Get);
        let direction = Direction::Response(StatusCode::Code(200));
        let context = Identifier::parse("basic").unwrap();
        let mut taken = HashSet::new();
        for n in 1..MAX_NAME_SUFFIX {
            let candidate = match n {
                1 => context.clone(),
                n => Identifier::parse(&format!("basic_{}", n)).unwrap(),
            };
            taken.insert(TestFunctionName::new(&op.path, op.method, direction, candidate).encode());
        }

        let (_, claimed) = claim_test_name(&op, direction, context.clone(), &mut taken).unwrap();
        assert_eq!(claimed.as_str(), format!("basic_{}", MAX_NAME_SUFFIX));
        assert!(claim_test_name(&op, direction, context, &mut taken).is_none());
    }

    #[test]
    fn test_json_schema_rewrite() {
        let schema = json!({
            "type": "object",
            "x-not-json-api": true,
            "properties": {
                "note": { "type": "string", "nullable": true },
                "state": { "type": "string", "enum": ["a"], "nullable": true },
                "count": { "type": "integer", "minimum": 0, "exclusiveMinimum": true }
            }
        });
        let rewritten = to_json_schema(&schema);
        assert!(rewritten.get("x-not-json-api").is_none());
        assert_eq!(rewritten["properties"]["note"]["type"], json!(["string", "null"]));
        assert_eq!(rewritten["properties"]["state"]["enum"], json!(["a", null]));
        assert_eq!(rewritten["properties"]["count"]["exclusiveMinimum"], json!(0));
        assert!(rewritten["properties"]["count"].get("minimum").is_none());
    }

    #[test]
    fn test_segment_named_like_a_method() {
        assert_eq!(module_ident(&Identifier::parse("GET").unwrap()), "GET_path");
        assert_eq!(module_ident(&Identifier::parse("type").unwrap()), "r#type");
    }
}
