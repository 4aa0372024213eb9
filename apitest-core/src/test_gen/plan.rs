//! What the synthesizer decided to generate for one operation, before rendering

use super::naming::TestFunctionName;
use super::types::DerivedType;
use crate::parser::{HttpMethod, StatusCode};

/// Everything that goes into one `<METHOD>.rs` module
#[derive(Debug, Clone)]
pub struct OperationPlan {
    pub path: String,
    pub method: HttpMethod,
    pub types: Vec<DerivedType>,
    pub constants: Vec<Constant>,
    pub tests: Vec<PlannedTest>,
}

impl OperationPlan {
    pub fn new(path: &str, method: HttpMethod) -> Self {
        Self { path: path.to_string(), method, types: Vec::new(), constants: Vec::new(), tests: Vec::new() }
    }
}

/// A `&str` constant holding JSON text (an example payload or a schema)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    pub name: String,
    pub json: String,
}

#[derive(Debug, Clone)]
pub struct PlannedTest {
    pub name: TestFunctionName,
    pub body: TestBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestBody {
    /// Decode a named example into the body type
    DecodeExample {
        type_name: String,
        example: String,
        schema: Option<String>,
    },
    /// Send a request and check the status, then the body
    LiveRequest {
        method: HttpMethod,
        url: String,
        query: Vec<(String, String)>,
        expected: StatusCode,
        type_name: Option<String>,
        example: Option<String>,
    },
}
