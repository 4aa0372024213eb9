//! Rust source emitter for the generated test package

use super::codegen;
use crate::parser::StatusCode;
use crate::test_gen::plan::{OperationPlan, PlannedTest, TestBody};
use crate::test_gen::types::{Field, TypeDecl, TypeRef, Variant};
use crate::test_gen::{ParserMode, TestSuiteConfig};

/// Name of the generated package
pub const PACKAGE_NAME: &str = "api-test-suite";

/// Name of the generated test target
pub const TEST_TARGET: &str = "api_tests";

const SUPPORT: &str = include_str!("../../../templates/support.rs");
const SUPPORT_VALIDATE: &str = include_str!("../../../templates/support_validate.rs");
const SUPPORT_LIVE: &str = include_str!("../../../templates/support_live.rs");

/// Emitter for generating Rust sources
pub struct RustEmitter {
    parser_mode: ParserMode,
    validate_schema: bool,
}

impl RustEmitter {
    pub fn new(config: &TestSuiteConfig) -> Self {
        Self { parser_mode: config.parser_mode, validate_schema: config.validate_schema }
    }

    /// `Cargo.toml` of the generated package
    pub fn manifest(&self, live_requests: bool) -> String {
        let mut manifest = String::new();
        manifest.push_str("[package]\n");
        manifest.push_str(&format!("name = \"{}\"\n", PACKAGE_NAME));
        manifest.push_str("version = \"0.1.0\"\n");
        manifest.push_str("edition = \"2021\"\n");
        manifest.push_str("publish = false\n\n");
        // keeps the package out of any enclosing workspace
        manifest.push_str("[workspace]\n\n");
        manifest.push_str("[dependencies]\n");
        manifest.push_str("serde = { version = \"1\", features = [\"derive\"] }\n");
        manifest.push_str("serde_json = \"1\"\n");
        if self.validate_schema {
            manifest.push_str("jsonschema = { version = \"0.30\", default-features = false }\n");
        }
        if live_requests {
            manifest.push_str(
                "reqwest = { version = \"0.12\", default-features = false, features = [\"blocking\", \"rustls-tls\"] }\n",
            );
        }
        manifest.push_str("\n[[test]]\n");
        manifest.push_str(&format!("name = \"{}\"\n", TEST_TARGET));
        manifest.push_str(&format!("path = \"tests/{}.rs\"\n", TEST_TARGET));
        manifest.push_str("harness = false\n");
        manifest
    }

    pub fn lib_rs(&self) -> String {
        let mut code = String::new();
        code.push_str("//! Generated API conformance tests\n\n");
        code.push_str("#![allow(non_snake_case, non_camel_case_types, dead_code, unused_imports)]\n\n");
        code.push_str("pub mod paths;\n");
        code.push_str("pub mod support;\n");
        code
    }

    pub fn support_rs(&self, live_requests: bool) -> String {
        let mut code = SUPPORT.to_string();
        if self.validate_schema {
            code.push('\n');
            code.push_str(SUPPORT_VALIDATE);
        }
        if live_requests {
            code.push('\n');
            code.push_str(SUPPORT_LIVE);
        }
        code
    }

    /// Entry point of the `harness = false` test target
    pub fn harness_rs(&self) -> String {
        let krate = PACKAGE_NAME.replace('-', "_");
        format!("fn main() {{\n    {krate}::support::run_all({krate}::paths::tests());\n}}\n")
    }

    /// `mod.rs` of a namespace node
    pub fn namespace_module(&self, title: &str, children: &[String], operations: &[String]) -> String {
        let mut code = String::new();
        code.push_str(&format!("//! {}\n\n", title));

        for module in children.iter().chain(operations) {
            code.push_str(&format!("pub mod {};\n", module));
        }
        if !children.is_empty() || !operations.is_empty() {
            code.push('\n');
        }

        code.push_str("use crate::support::TestCase;\n\n");
        code.push_str("pub fn tests() -> Vec<TestCase> {\n");
        if children.is_empty() && operations.is_empty() {
            code.push_str("    Vec::new()\n");
        } else {
            code.push_str("    let mut tests = Vec::new();\n");
            for module in children.iter().chain(operations) {
                code.push_str(&format!("    tests.extend({}::tests());\n", module));
            }
            code.push_str("    tests\n");
        }
        code.push_str("}\n");
        code
    }

    /// `<METHOD>.rs` for one operation
    pub fn operation_module(&self, plan: &OperationPlan) -> String {
        let mut code = String::new();
        code.push_str(&format!("//! {} {}\n\n", plan.method, plan.path));
        code.push_str("use crate::support::{self, TestCase, TestResult};\n");
        code.push_str("use serde::{Deserialize, Serialize};\n");

        for derived in &plan.types {
            for decl in &derived.field_spec {
                code.push('\n');
                code.push_str(&self.type_decl(decl));
            }
        }

        if !plan.constants.is_empty() {
            code.push('\n');
        }
        for constant in &plan.constants {
            code.push_str(&format!(
                "const {}: &str = \"{}\";\n",
                constant.name,
                codegen::escape_string(&constant.json)
            ));
        }

        for test in &plan.tests {
            code.push('\n');
            code.push_str(&self.test_function(test));
        }

        code.push_str("\npub fn tests() -> Vec<TestCase> {\n");
        code.push_str("    vec![\n");
        for test in &plan.tests {
            let name = test.name.encode();
            code.push_str(&format!("        TestCase::new(module_path!(), \"{}\", {}),\n", name, name));
        }
        code.push_str("    ]\n");
        code.push_str("}\n");
        code
    }

    pub fn type_decl(&self, decl: &TypeDecl) -> String {
        match decl {
            TypeDecl::Struct { name, fields, deny_unknown_fields } => {
                let mut code = String::new();
                code.push_str("#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]\n");
                if *deny_unknown_fields {
                    code.push_str("#[serde(deny_unknown_fields)]\n");
                }
                code.push_str(&format!("pub struct {} {{\n", name));
                for field in fields {
                    code.push_str(&codegen::indent(&self.field(field), 4));
                    code.push('\n');
                }
                code.push_str("}\n");
                code
            }
            TypeDecl::Enum { name, variants } => {
                let mut code = String::new();
                code.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]\n");
                code.push_str(&format!("pub enum {} {{\n", name));
                for Variant { ident, wire } in variants {
                    code.push_str(&format!("    #[serde(rename = \"{}\")]\n", codegen::escape_string(wire)));
                    code.push_str(&format!("    {},\n", ident));
                }
                code.push_str("}\n");
                code
            }
            TypeDecl::Alias { name, target } => format!("pub type {} = {};\n", name, type_ref(target)),
        }
    }

    fn field(&self, field: &Field) -> String {
        let mut attrs = Vec::new();
        if field.ident.trim_start_matches("r#") != field.wire {
            attrs.push(format!("rename = \"{}\"", codegen::escape_string(&field.wire)));
        }

        let ty = type_ref(&field.ty);
        let ty = match (field.required, field.nullable) {
            (true, false) => ty,
            (true, true) => {
                attrs.push("deserialize_with = \"support::nullable\"".to_string());
                format!("Option<{}>", ty)
            }
            (false, _) => {
                attrs.push("default".to_string());
                attrs.push("skip_serializing_if = \"Option::is_none\"".to_string());
                format!("Option<{}>", ty)
            }
        };

        let mut code = String::new();
        if !attrs.is_empty() {
            code.push_str(&format!("#[serde({})]\n", attrs.join(", ")));
        }
        code.push_str(&format!("pub {}: {},", field.ident, ty));
        code
    }

    fn test_function(&self, test: &PlannedTest) -> String {
        let mut code = String::new();
        code.push_str(&format!("pub fn {}() -> TestResult {{\n", test.name.encode()));

        match &test.body {
            TestBody::DecodeExample { type_name, example, schema } => {
                code.push_str(&format!("    {}::<{}>({})?;\n", self.decoder(), type_name, example));
                if let Some(schema) = schema {
                    code.push_str(&format!("    support::validate({}, {})?;\n", example, schema));
                }
            }
            TestBody::LiveRequest { method, url, query, expected, type_name, example } => {
                let query = query
                    .iter()
                    .map(|(name, value)| {
                        format!("(\"{}\", \"{}\")", codegen::escape_string(name), codegen::escape_string(value))
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                code.push_str("    let body = support::send(\n");
                code.push_str(&format!("        \"{}\",\n", method));
                code.push_str(&format!("        \"{}\",\n", codegen::escape_string(url)));
                code.push_str(&format!("        &[{}],\n", query));
                code.push_str(&format!("        {},\n", expected_status(expected)));
                code.push_str("    )?;\n");
                if let Some(type_name) = type_name {
                    code.push_str(&format!("    {}::<{}>(&body)?;\n", self.decoder(), type_name));
                }
                if let Some(example) = example {
                    code.push_str(&format!("    support::assert_same_json(&body, {})?;\n", example));
                }
            }
        }

        code.push_str("    Ok(())\n");
        code.push_str("}\n");
        code
    }

    fn decoder(&self) -> &'static str {
        match self.parser_mode {
            ParserMode::Fast => "support::decode_fast",
            ParserMode::Stable => "support::decode_stable",
        }
    }
}

fn expected_status(status: &StatusCode) -> String {
    match status {
        StatusCode::Code(code) => format!("support::Expected::Code({})", code),
        StatusCode::Range(class) => format!("support::Expected::Class({})", class),
        StatusCode::Default => "support::Expected::Any".to_string(),
    }
}

/// Rust spelling of a type expression
pub fn type_ref(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Named(name) => name.clone(),
        TypeRef::String => "String".to_string(),
        TypeRef::Integer => "i64".to_string(),
        TypeRef::Number => "f64".to_string(),
        TypeRef::Boolean => "bool".to_string(),
        TypeRef::Value => "serde_json::Value".to_string(),
        TypeRef::JsonMap => "serde_json::Map<String, serde_json::Value>".to_string(),
        TypeRef::Vec(inner) => format!("Vec<{}>", type_ref(inner)),
        TypeRef::Map(inner) => format!("std::collections::BTreeMap<String, {}>", type_ref(inner)),
        TypeRef::Option(inner) => format!("Option<{}>", type_ref(inner)),
        TypeRef::ToOne => "support::ToOne".to_string(),
        TypeRef::NullableToOne => "support::NullableToOne".to_string(),
        TypeRef::ToMany => "support::ToMany".to_string(),
    }
}
