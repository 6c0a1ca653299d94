//! Declarative attribute schemas exposed by resource adapters
//!
//! Describes the shape of a resource's configuration and computed attributes:
//! required/optional/computed/force-new flags per attribute. Validation
//! happens once at the adapter boundary into typed config structs; the schema
//! is the contract a host can introspect.

use serde::Serialize;

/// Value kind of a schema attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrKind {
    /// Single string value
    String,
    /// Unordered, deduplicated set of strings
    StringSet,
    /// Nested block with its own attributes
    Block,
}

/// One attribute in a resource schema
#[derive(Debug, Clone, Serialize)]
pub struct AttributeSchema {
    pub name: &'static str,
    pub kind: AttrKind,
    /// Must be supplied in configuration
    pub required: bool,
    /// Populated from remote state, never supplied
    pub computed: bool,
    /// Changing this attribute forces replacement of the resource
    pub force_new: bool,
    /// Nested attributes (only for `AttrKind::Block`)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<AttributeSchema>,
}

impl AttributeSchema {
    /// A required configuration attribute.
    pub fn required(name: &'static str, kind: AttrKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            computed: false,
            force_new: false,
            nested: Vec::new(),
        }
    }

    /// An optional configuration attribute.
    pub fn optional(name: &'static str, kind: AttrKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind)
        }
    }

    /// A read-only attribute populated from remote state.
    pub fn computed(name: &'static str, kind: AttrKind) -> Self {
        Self {
            required: false,
            computed: true,
            ..Self::required(name, kind)
        }
    }

    /// Mark changes to this attribute as forcing replacement.
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Attach nested attributes (for blocks).
    pub fn with_nested(mut self, nested: Vec<AttributeSchema>) -> Self {
        self.nested = nested;
        self
    }
}

/// Full attribute schema for one resource type
#[derive(Debug, Clone, Serialize)]
pub struct ResourceSchema {
    pub attributes: Vec<AttributeSchema>,
}

impl ResourceSchema {
    pub fn new(attributes: Vec<AttributeSchema>) -> Self {
        Self { attributes }
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }
}
