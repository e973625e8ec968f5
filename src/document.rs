//! The Swagger 2.0 document built by a traversal.
//!
//! [`SwaggerDocument`] doubles as the assembler: the walker attaches operations and
//! registers models and tags on it as it goes. Every collection is ordered so the same
//! input always serializes to the same output.

use crate::reader::{HttpMethod, TypeInfo};
use crate::schema_generator::Schema;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Operations of one path, keyed by verb
pub type PathItem = BTreeMap<HttpMethod, Operation>;

/// Swagger Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            title: "Generated API".to_string(),
            version: "1.0.0".to_string(),
            description: Some("API documentation generated from Rust code".to_string()),
        }
    }
}

/// A tag registered with the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// Security scheme name mapped to the scopes an operation needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityRequirement(pub BTreeMap<String, Vec<String>>);

impl SecurityRequirement {
    pub fn new(scheme: impl Into<String>, scopes: Vec<String>) -> Self {
        let mut requirement = BTreeMap::new();
        requirement.insert(scheme.into(), scopes);
        Self(requirement)
    }
}

/// Where a parameter is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterLocation {
    #[serde(rename = "path")]
    Path,
    #[serde(rename = "query")]
    Query,
    #[serde(rename = "header")]
    Header,
    #[serde(rename = "formData")]
    FormData,
    #[serde(rename = "body")]
    Body,
}

/// Swagger Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query, header, formData, body)
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    /// Type of a non-body parameter
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(rename = "collectionFormat", skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Regex constraint from the path template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Schema of a body parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// The declared Rust type, used to fill in the schema
    #[serde(skip)]
    pub declared_type: Option<TypeInfo>,
    /// Whether the declared type is a sequence
    #[serde(skip)]
    pub array: bool,
}

impl Parameter {
    pub fn new(location: ParameterLocation, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location,
            description: None,
            required: location == ParameterLocation::Path,
            param_type: None,
            format: None,
            items: None,
            collection_format: None,
            default: None,
            pattern: None,
            enum_values: None,
            schema: None,
            declared_type: None,
            array: false,
        }
    }

    /// A parameter with a declared type; `Option<T>` makes it optional.
    pub fn typed(location: ParameterLocation, name: impl Into<String>, type_info: TypeInfo) -> Self {
        let mut parameter = Self::new(location, name);
        parameter.array = type_info.without_option().is_array_like();
        if location != ParameterLocation::Path && !type_info.is_option() {
            parameter.required = location == ParameterLocation::Body;
        }
        parameter.declared_type = Some(type_info);
        parameter
    }

    pub fn is_body(&self) -> bool {
        self.location == ParameterLocation::Body
    }
}

/// Swagger Response object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Schema>,
}

impl Response {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }
}

/// Swagger Operation object - represents a single API operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Operation summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation ID
    #[serde(rename = "operationId")]
    pub operation_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub consumes: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub produces: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Responses keyed by status code, `default` for the catch-all
    pub responses: BTreeMap<String, Response>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

impl Operation {
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            ..Default::default()
        }
    }

    /// Set the response for a status code; code 0 is the default response.
    pub fn set_response(&mut self, code: u16, response: Response) {
        let key = if code == 0 {
            "default".to_string()
        } else {
            code.to_string()
        };
        self.responses.insert(key, response);
    }
}

/// Complete Swagger document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerDocument {
    /// Swagger version
    pub swagger: String,
    /// API info
    pub info: Info,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(rename = "basePath", skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Registered tags, in registration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// API paths
    pub paths: BTreeMap<String, PathItem>,
    /// Named models
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, Schema>,
}

impl Default for SwaggerDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SwaggerDocument {
    pub fn new() -> Self {
        Self {
            swagger: "2.0".to_string(),
            info: Info::default(),
            host: None,
            base_path: None,
            tags: Vec::new(),
            paths: BTreeMap::new(),
            definitions: BTreeMap::new(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            version,
            description,
        };
        self
    }

    pub fn with_host(mut self, host: Option<String>, base_path: Option<String>) -> Self {
        self.host = host;
        self.base_path = base_path;
        self
    }

    /// Attach an operation under `path` and `method`, replacing any previous one.
    pub fn attach(&mut self, path: &str, method: HttpMethod, operation: Operation) {
        debug!("Attaching {} {} ({})", method, path, operation.operation_id);
        let path_item = self.paths.entry(path.to_string()).or_default();
        if path_item.insert(method, operation).is_some() {
            debug!("Replaced existing operation {} {}", method, path);
        }
    }

    pub fn register_model(&mut self, name: &str, schema: Schema) {
        self.definitions.insert(name.to_string(), schema);
    }

    pub fn register_tag(&mut self, tag: Tag) {
        match self.tags.iter_mut().find(|existing| existing.name == tag.name) {
            Some(existing) => {
                if tag.description.is_some() {
                    existing.description = tag.description;
                }
            }
            None => self.tags.push(tag),
        }
    }

    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path).and_then(|path_item| path_item.get(&method))
    }

    /// Total number of attached operations
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(BTreeMap::len).sum()
    }
}
