//! Derived type descriptions
//!
//! The classifier turns a body schema into a [`DerivedType`]: a root type name
//! plus the flat list of declarations needed to decode that body. The Rust
//! emitter renders these declarations into the generated package.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a body is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Resource document with typed attributes and relationship pointers
    JsonApiResource,
    /// Plain structure mirroring the schema's properties
    GenericStructure,
}

/// Result of classifying one request or response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedType {
    pub strategy: Strategy,
    pub type_name: String,
    /// Declarations in dependency-free order; the root is among them
    pub field_spec: Vec<TypeDecl>,
}

/// A named declaration in the generated source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeDecl {
    Struct {
        name: String,
        fields: Vec<Field>,
        deny_unknown_fields: bool,
    },
    /// String enum; each variant keeps its wire value
    Enum {
        name: String,
        variants: Vec<Variant>,
    },
    /// `pub type Name = Target;`
    Alias {
        name: String,
        target: TypeRef,
    },
}

impl TypeDecl {
    pub fn name(&self) -> &str {
        match self {
            Self::Struct { name, .. } | Self::Enum { name, .. } | Self::Alias { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub ident: String,
    pub wire: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Name on the wire
    pub wire: String,
    /// Rust field identifier (may be a raw identifier)
    pub ident: String,
    pub ty: TypeRef,
    pub required: bool,
    pub nullable: bool,
}

/// Type expression used by fields, aliases and containers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRef {
    Named(String),
    String,
    Integer,
    Number,
    Boolean,
    /// Any JSON value
    Value,
    /// JSON object with unconstrained members
    JsonMap,
    Vec(Box<TypeRef>),
    Map(Box<TypeRef>),
    Option(Box<TypeRef>),
    /// Relationship helpers from the generated support module
    ToOne,
    NullableToOne,
    ToMany,
}

/// Type names already taken inside one generated module
#[derive(Debug, Clone, Default)]
pub struct NameSet {
    taken: HashSet<String>,
}

impl NameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `base`, or the first free `base2`, `base3`, ...
    pub fn claim(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}{}", base, n);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
