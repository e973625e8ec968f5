//! Resource metadata model and the reader interface that produces it.
//!
//! A [`MetadataReader`] answers questions about annotated resource types: the class-level
//! [`ApiInfo`], the class path, declared media types and the [`MethodMetadata`] of every
//! method. Absent metadata is always expressed as `None`, an empty list or a default value,
//! never as an error.
//!
//! The crate ships one implementation, [`source::SourceMetadataReader`], which reads the
//! attribute vocabulary from Rust source files parsed with `syn`.

pub mod attributes;
pub mod source;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Read access to resource metadata.
pub trait MetadataReader {
    /// Class-level metadata and methods for the named type, if the type is known.
    fn resource(&self, name: &str) -> Option<&ResourceMetadata>;

    /// Fields of the named struct, described like method arguments.
    fn struct_fields(&self, name: &str) -> Option<Vec<ArgumentMetadata>>;

    /// Names of all types carrying `#[api]`, in declaration order.
    fn resource_names(&self) -> Vec<String>;

    /// Whether the type is an annotated resource.
    fn is_resource(&self, type_info: &TypeInfo) -> bool {
        self.resource(&type_info.name)
            .map_or(false, |resource| resource.api.is_some())
    }
}

/// HTTP methods an operation can be bound to.
///
/// Declaration order is the order operations appear under a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

impl HttpMethod {
    /// Parse a verb name case-insensitively. Unknown verbs yield `None`.
    pub fn parse(method: &str) -> Option<Self> {
        match method.trim().to_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "put" => Some(HttpMethod::Put),
            "post" => Some(HttpMethod::Post),
            "delete" => Some(HttpMethod::Delete),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            "patch" => Some(HttpMethod::Patch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared Rust type, reduced to the last path segment of each component.
///
/// `Vec<Pet>` is `TypeInfo { name: "Vec", generic_args: [Pet] }`. Arrays and slices are
/// normalized to `Vec`, references to their referent, tuples to `Tuple` and `()` to a unit
/// type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// The base type name (e.g. "String", "Pet", "Vec")
    pub name: String,
    /// Generic type arguments in declaration order
    pub generic_args: Vec<TypeInfo>,
}

const UNIT: &str = "()";
const TUPLE: &str = "Tuple";

impl TypeInfo {
    /// Create a TypeInfo for a simple type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generic_args: Vec::new(),
        }
    }

    /// Create a TypeInfo with generic arguments
    pub fn with_args(name: impl Into<String>, generic_args: Vec<TypeInfo>) -> Self {
        Self {
            name: name.into(),
            generic_args,
        }
    }

    /// Create a TypeInfo for an `Option<T>` type
    pub fn option(inner: TypeInfo) -> Self {
        Self::with_args("Option", vec![inner])
    }

    /// Create a TypeInfo for a `Vec<T>` type
    pub fn vec(inner: TypeInfo) -> Self {
        Self::with_args("Vec", vec![inner])
    }

    pub fn unit() -> Self {
        Self::new(UNIT)
    }

    pub fn tuple(elements: Vec<TypeInfo>) -> Self {
        Self::with_args(TUPLE, elements)
    }

    pub fn is_option(&self) -> bool {
        self.name == "Option" && self.generic_args.len() == 1
    }

    pub fn is_unit(&self) -> bool {
        self.name == UNIT
    }

    pub fn is_tuple(&self) -> bool {
        self.name == TUPLE
    }

    /// Sequence-like containers rendered as arrays.
    pub fn is_array_like(&self) -> bool {
        matches!(
            self.name.as_str(),
            "Vec" | "VecDeque" | "LinkedList" | "HashSet" | "BTreeSet" | "IndexSet"
        ) && self.generic_args.len() == 1
    }

    /// Key/value containers rendered as maps.
    pub fn is_map(&self) -> bool {
        matches!(self.name.as_str(), "HashMap" | "BTreeMap" | "IndexMap")
            && self.generic_args.len() == 2
    }

    /// First generic argument, if any.
    pub fn inner(&self) -> Option<&TypeInfo> {
        self.generic_args.first()
    }

    /// Strip any number of `Option` layers.
    pub fn without_option(&self) -> &TypeInfo {
        let mut current = self;
        while current.is_option() {
            current = &current.generic_args[0];
        }
        current
    }

    /// Parse a type written as a string, e.g. `"Vec<Pet>"`.
    pub fn parse(text: &str) -> crate::error::Result<Self> {
        let ty: syn::Type = syn::parse_str(text)?;
        Ok(Self::from_syn(&ty))
    }

    /// Extract TypeInfo from a `syn::Type`
    pub fn from_syn(ty: &syn::Type) -> Self {
        match ty {
            syn::Type::Path(type_path) => Self::from_path(&type_path.path),
            syn::Type::Reference(reference) => Self::from_syn(&reference.elem),
            syn::Type::Paren(paren) => Self::from_syn(&paren.elem),
            syn::Type::Group(group) => Self::from_syn(&group.elem),
            syn::Type::Array(array) => Self::vec(Self::from_syn(&array.elem)),
            syn::Type::Slice(slice) => Self::vec(Self::from_syn(&slice.elem)),
            syn::Type::Never(_) => Self::unit(),
            syn::Type::Tuple(tuple) => {
                if tuple.elems.is_empty() {
                    Self::unit()
                } else {
                    Self::tuple(tuple.elems.iter().map(Self::from_syn).collect())
                }
            }
            syn::Type::ImplTrait(impl_trait) => {
                let bound = impl_trait.bounds.iter().find_map(|bound| match bound {
                    syn::TypeParamBound::Trait(trait_bound) => trait_bound
                        .path
                        .segments
                        .last()
                        .map(|segment| segment.ident.to_string()),
                    _ => None,
                });
                Self::new(format!("impl {}", bound.unwrap_or_default()).trim_end().to_string())
            }
            _ => Self::new("Unknown"),
        }
    }

    fn from_path(path: &syn::Path) -> Self {
        let Some(segment) = path.segments.last() else {
            return Self::new("Unknown");
        };

        let mut generic_args = Vec::new();
        if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
            for arg in &args.args {
                if let syn::GenericArgument::Type(inner_ty) = arg {
                    generic_args.push(Self::from_syn(inner_ty));
                }
            }
        }

        Self::with_args(segment.ident.to_string(), generic_args)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_tuple() {
            write!(f, "(")?;
        } else {
            write!(f, "{}", self.name)?;
            if self.generic_args.is_empty() {
                return Ok(());
            }
            write!(f, "<")?;
        }
        for (idx, arg) in self.generic_args.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        if self.is_tuple() {
            write!(f, ")")
        } else {
            write!(f, ">")
        }
    }
}

/// Class-level metadata of a resource type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceMetadata {
    /// The type name
    pub name: String,
    /// `#[api]` metadata; `None` means the type is not a resource
    pub api: Option<ApiInfo>,
    /// Class-level path (`#[path]` or `#[scope]`)
    pub path: Option<String>,
    pub consumes: Option<Vec<String>>,
    pub produces: Option<Vec<String>>,
    /// Methods from every impl block of the type, in source order
    pub methods: Vec<MethodMetadata>,
}

/// The `#[api]` resource marker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiInfo {
    /// Base path used to derive a tag when no explicit tags are given
    pub value: String,
    pub tags: Vec<String>,
    pub hidden: bool,
    pub description: Option<String>,
    pub authorizations: Vec<Authorization>,
}

/// A named security scheme with the scopes it requires.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Authorization {
    pub value: String,
    pub scopes: Vec<String>,
}

/// Method-level metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodMetadata {
    pub name: String,
    /// Method path suffix
    pub path: Option<String>,
    /// Verbs from `#[get]`, `#[post]`, ...
    pub verbs: Vec<HttpMethod>,
    /// Verb from `#[http_method("...")]`
    pub custom_verb: Option<String>,
    /// Verbs listed in `#[route(..., method = "...")]`
    pub route_verbs: Vec<String>,
    pub operation: Option<ApiOperation>,
    pub responses: Vec<ApiResponse>,
    pub implicit_params: Vec<ImplicitParam>,
    pub consumes: Option<Vec<String>>,
    pub produces: Option<Vec<String>>,
    pub deprecated: bool,
    /// Declared arguments, receiver excluded
    pub arguments: Vec<ArgumentMetadata>,
    /// Declared return type; `None` for `-> ()` written implicitly
    pub return_type: Option<TypeInfo>,
}

/// The `#[api_operation]` attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiOperation {
    pub summary: String,
    pub notes: String,
    pub nickname: String,
    pub http_method: String,
    pub response: Option<TypeInfo>,
    pub response_container: Option<String>,
    pub tags: Vec<String>,
    pub hidden: bool,
    pub protocols: String,
    pub authorizations: Vec<Authorization>,
    pub response_headers: Vec<ResponseHeader>,
}

/// A declared response header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseHeader {
    pub name: String,
    pub description: String,
    pub response: Option<TypeInfo>,
    pub response_container: Option<String>,
}

/// One entry of `#[api_responses]`. Code 0 is the default response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    pub code: u16,
    pub message: String,
    pub response: Option<TypeInfo>,
    pub response_headers: Vec<ResponseHeader>,
}

/// One entry of `#[api_implicit_params]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImplicitParam {
    pub name: String,
    /// header, path, query, body or form
    pub param_type: String,
    pub data_type: String,
    pub required: bool,
    pub default_value: Option<String>,
    pub allow_multiple: bool,
}

/// A method argument or struct field together with its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentMetadata {
    /// Argument name (first pattern binding) or field name
    pub name: String,
    /// Every identifier bound by the argument pattern, in order
    pub bindings: Vec<String>,
    /// Placeholder names of the declaring method's path, in order
    pub route_placeholders: Vec<String>,
    pub type_info: TypeInfo,
    pub annotations: Vec<ParamAnnotation>,
    pub doc: Option<ApiParam>,
}

impl ArgumentMetadata {
    pub fn new(name: impl Into<String>, type_info: TypeInfo) -> Self {
        let name = name.into();
        Self {
            bindings: vec![name.clone()],
            route_placeholders: Vec::new(),
            name,
            type_info,
            annotations: Vec::new(),
            doc: None,
        }
    }

    pub fn has(&self, annotation: &ParamAnnotation) -> bool {
        self.annotations.contains(annotation)
    }

    pub fn default_value(&self) -> Option<&str> {
        self.annotations.iter().find_map(|annotation| match annotation {
            ParamAnnotation::DefaultValue(value) => Some(value.as_str()),
            _ => None,
        })
    }
}

/// Parameter attributes recognized on arguments and fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamAnnotation {
    Path(String),
    Query(String),
    Header(String),
    Form(String),
    /// Multipart form field
    FormData(String),
    /// Struct whose annotated fields are parameters
    Bean,
    /// Injected by the framework, never documented
    Context,
    DefaultValue(String),
}

/// The `#[api_param]` documentation attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiParam {
    pub description: Option<String>,
    pub name: Option<String>,
    pub required: bool,
    pub default_value: Option<String>,
    pub allowable_values: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_method() {
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse(" patch "), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse("LOCK"), None);
        assert_eq!(HttpMethod::parse(""), None);
    }

    #[test]
    fn test_type_info_from_nested_generics() {
        let type_info = TypeInfo::parse("Result<Json<Vec<Pet>>, ApiError>").unwrap();
        assert_eq!(type_info.name, "Result");
        assert_eq!(type_info.generic_args.len(), 2);
        assert_eq!(type_info.to_string(), "Result<Json<Vec<Pet>>, ApiError>");
    }

    #[test]
    fn test_type_info_normalizes_arrays_and_references() {
        assert_eq!(TypeInfo::parse("&[u8]").unwrap(), TypeInfo::vec(TypeInfo::new("u8")));
        assert_eq!(TypeInfo::parse("[i32; 4]").unwrap(), TypeInfo::vec(TypeInfo::new("i32")));
        assert_eq!(TypeInfo::parse("&'static str").unwrap(), TypeInfo::new("str"));
        assert!(TypeInfo::parse("()").unwrap().is_unit());
    }

    #[test]
    fn test_type_info_tuples_and_impl_trait() {
        let tuple = TypeInfo::parse("(u32, String)").unwrap();
        assert!(tuple.is_tuple());
        assert_eq!(tuple.to_string(), "(u32, String)");

        let responder = TypeInfo::parse("impl Responder").unwrap();
        assert_eq!(responder.name, "impl Responder");
    }

    #[test]
    fn test_container_predicates() {
        let list = TypeInfo::parse("std::collections::HashSet<String>").unwrap();
        assert!(list.is_array_like());
        assert!(!list.is_map());

        let map = TypeInfo::parse("BTreeMap<String, Pet>").unwrap();
        assert!(map.is_map());

        let nested = TypeInfo::parse("Option<Option<Pet>>").unwrap();
        assert_eq!(nested.without_option(), &TypeInfo::new("Pet"));
    }
}
