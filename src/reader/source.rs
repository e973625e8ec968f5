use crate::parser::ParsedFile;
use crate::path_template;
use crate::reader::attributes::{attr_name, AttrArgs};
use crate::reader::{
    ApiInfo, ApiOperation, ApiParam, ApiResponse, ArgumentMetadata, Authorization, HttpMethod,
    ImplicitParam, MetadataReader, MethodMetadata, ParamAnnotation, ResourceMetadata,
    ResponseHeader, TypeInfo,
};
use log::{debug, warn};
use std::collections::HashMap;
use syn::visit::Visit;
use syn::{Attribute, FnArg, Pat};

/// Metadata reader over parsed Rust source.
///
/// Resources are structs carrying `#[api]`; their methods are collected from every `impl`
/// block whose self type has the same name, across all files. Types are matched by their
/// last path segment.
pub struct SourceMetadataReader {
    resources: HashMap<String, ResourceMetadata>,
    fields: HashMap<String, Vec<ArgumentMetadata>>,
    order: Vec<String>,
}

impl SourceMetadataReader {
    pub fn new(parsed_files: &[ParsedFile]) -> Self {
        let mut visitor = ResourceVisitor::default();
        for parsed_file in parsed_files {
            debug!("Reading resource metadata from {}", parsed_file.path.display());
            visitor.visit_file(&parsed_file.syntax_tree);
        }

        let ResourceVisitor {
            mut resources,
            fields,
            mut methods,
            order,
        } = visitor;

        for (name, resource) in resources.iter_mut() {
            if let Some(declared) = methods.remove(name) {
                resource.methods = declared;
            }
        }
        for name in methods.keys() {
            debug!("Ignoring impl block for {} without a struct definition", name);
        }

        let order: Vec<String> = order
            .into_iter()
            .filter(|name| resources.get(name).map_or(false, |r| r.api.is_some()))
            .collect();
        debug!("Found {} #[api] resources", order.len());

        Self {
            resources,
            fields,
            order,
        }
    }
}

impl MetadataReader for SourceMetadataReader {
    fn resource(&self, name: &str) -> Option<&ResourceMetadata> {
        self.resources.get(name)
    }

    fn struct_fields(&self, name: &str) -> Option<Vec<ArgumentMetadata>> {
        self.fields.get(name).cloned()
    }

    fn resource_names(&self) -> Vec<String> {
        self.order.clone()
    }
}

#[derive(Default)]
struct ResourceVisitor {
    resources: HashMap<String, ResourceMetadata>,
    fields: HashMap<String, Vec<ArgumentMetadata>>,
    methods: HashMap<String, Vec<MethodMetadata>>,
    order: Vec<String>,
}

impl<'ast> Visit<'ast> for ResourceVisitor {
    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        let name = node.ident.to_string();
        if self.resources.contains_key(&name) {
            debug!("Duplicate struct {}, keeping the first definition", name);
        } else {
            self.resources
                .insert(name.clone(), read_resource(&name, &node.attrs));
            self.fields.insert(name.clone(), read_fields(&node.fields));
            self.order.push(name);
        }

        syn::visit::visit_item_struct(self, node);
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let self_ty = TypeInfo::from_syn(&node.self_ty);
        let methods = self.methods.entry(self_ty.name).or_default();

        for item in &node.items {
            if let syn::ImplItem::Fn(method) = item {
                methods.push(read_method(method));
            }
        }

        syn::visit::visit_item_impl(self, node);
    }
}

/// Parse the arguments of a recognized attribute, logging and dropping malformed ones.
fn args_of(attr: &Attribute) -> Option<AttrArgs> {
    match AttrArgs::parse(attr) {
        Ok(args) => Some(args),
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

fn parse_type(text: &str) -> Option<TypeInfo> {
    if text.trim().is_empty() {
        return None;
    }
    match TypeInfo::parse(text) {
        Ok(type_info) => Some(type_info),
        Err(e) => {
            warn!("Ignoring unparsable type `{}`: {}", text, e);
            None
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|text| !text.is_empty()).map(str::to_string)
}

fn media_types(args: &AttrArgs) -> Vec<String> {
    let mut values = args.positional.clone();
    values.extend(args.strings("value"));
    values
}

fn read_resource(name: &str, attrs: &[Attribute]) -> ResourceMetadata {
    let mut resource = ResourceMetadata {
        name: name.to_string(),
        ..Default::default()
    };

    for attr in attrs {
        match attr_name(attr).as_str() {
            "api" => {
                if let Some(args) = args_of(attr) {
                    resource.api = Some(read_api(&args));
                }
            }
            "path" | "scope" => {
                if let Some(args) = args_of(attr) {
                    resource.path = args.value().map(str::to_string);
                }
            }
            "consumes" => resource.consumes = args_of(attr).map(|args| media_types(&args)),
            "produces" => resource.produces = args_of(attr).map(|args| media_types(&args)),
            _ => {}
        }
    }

    resource
}

fn read_api(args: &AttrArgs) -> ApiInfo {
    ApiInfo {
        value: args.value().unwrap_or_default().to_string(),
        tags: args
            .strings("tags")
            .into_iter()
            .filter(|tag| !tag.is_empty())
            .collect(),
        hidden: args.flag("hidden"),
        description: non_empty(args.get_str("description")),
        authorizations: read_authorizations(args),
    }
}

fn read_authorizations(args: &AttrArgs) -> Vec<Authorization> {
    args.nested("authorizations")
        .flat_map(|list| list.nested("authorization"))
        .filter_map(|auth| {
            let value = non_empty(auth.value())?;
            let scopes = auth
                .strings("scopes")
                .into_iter()
                .filter(|scope| !scope.is_empty())
                .collect();
            Some(Authorization { value, scopes })
        })
        .collect()
}

fn read_method(method: &syn::ImplItemFn) -> MethodMetadata {
    let mut metadata = MethodMetadata {
        name: method.sig.ident.to_string(),
        ..Default::default()
    };
    let mut verb_path = None;
    let mut route_path = None;

    for attr in &method.attrs {
        let name = attr_name(attr);
        if let Some(verb) = HttpMethod::parse(&name) {
            metadata.verbs.push(verb);
            if let Some(args) = args_of(attr) {
                verb_path = verb_path.or_else(|| args.first_positional().map(str::to_string));
            }
            continue;
        }

        match name.as_str() {
            "deprecated" => metadata.deprecated = true,
            _ => {
                let Some(args) = args_of(attr) else {
                    continue;
                };
                match name.as_str() {
                    "path" => metadata.path = args.value().map(str::to_string),
                    "http_method" => metadata.custom_verb = non_empty(args.value()),
                    "route" => {
                        route_path = args.first_positional().map(str::to_string);
                        metadata.route_verbs.extend(args.strings("method"));
                    }
                    "api_operation" => metadata.operation = Some(read_api_operation(&args)),
                    "api_responses" => metadata
                        .responses
                        .extend(args.nested("response").map(read_api_response)),
                    "api_response" => metadata.responses.push(read_api_response(&args)),
                    "api_implicit_params" => metadata
                        .implicit_params
                        .extend(args.nested("param").map(read_implicit_param)),
                    "api_implicit_param" => {
                        metadata.implicit_params.push(read_implicit_param(&args))
                    }
                    "consumes" => metadata.consumes = Some(media_types(&args)),
                    "produces" => metadata.produces = Some(media_types(&args)),
                    _ => {}
                }
            }
        }
    }

    metadata.path = metadata.path.or(verb_path).or(route_path);
    let route_placeholders = metadata
        .path
        .as_deref()
        .map(path_template::placeholders)
        .unwrap_or_default();

    for (idx, input) in method.sig.inputs.iter().enumerate() {
        if let FnArg::Typed(pat_type) = input {
            let bindings = collect_bindings(&pat_type.pat);
            let name = bindings
                .first()
                .cloned()
                .unwrap_or_else(|| format!("arg{}", idx));
            let mut argument = read_argument(name, TypeInfo::from_syn(&pat_type.ty), &pat_type.attrs);
            argument.bindings = bindings;
            argument.route_placeholders = route_placeholders.clone();
            metadata.arguments.push(argument);
        }
    }

    metadata.return_type = match &method.sig.output {
        syn::ReturnType::Default => None,
        syn::ReturnType::Type(_, ty) => response_type(ty),
    };

    metadata
}

fn read_api_operation(args: &AttrArgs) -> ApiOperation {
    ApiOperation {
        summary: args.value().unwrap_or_default().to_string(),
        notes: args.get_str("notes").unwrap_or_default().to_string(),
        nickname: args.get_str("nickname").unwrap_or_default().to_string(),
        http_method: args.get_str("http_method").unwrap_or_default().to_string(),
        response: args.get_str("response").and_then(parse_type),
        response_container: non_empty(args.get_str("response_container")),
        tags: args.strings("tags"),
        hidden: args.flag("hidden"),
        protocols: args.get_str("protocols").unwrap_or_default().to_string(),
        authorizations: read_authorizations(args),
        response_headers: read_response_headers(args),
    }
}

fn read_response_headers(args: &AttrArgs) -> Vec<ResponseHeader> {
    args.nested("response_headers")
        .flat_map(|list| list.nested("header"))
        .map(|header| ResponseHeader {
            name: header.get_str("name").unwrap_or_default().to_string(),
            description: header.get_str("description").unwrap_or_default().to_string(),
            response: header.get_str("response").and_then(parse_type),
            response_container: non_empty(header.get_str("response_container")),
        })
        .collect()
}

fn read_api_response(args: &AttrArgs) -> ApiResponse {
    let code = args.get_str("code").unwrap_or("0");
    ApiResponse {
        code: code.parse().unwrap_or_else(|_| {
            warn!("Invalid response code `{}`, using the default response", code);
            0
        }),
        message: args.get_str("message").unwrap_or_default().to_string(),
        response: args.get_str("response").and_then(parse_type),
        response_headers: read_response_headers(args),
    }
}

fn read_implicit_param(args: &AttrArgs) -> ImplicitParam {
    ImplicitParam {
        name: args.get_str("name").unwrap_or_default().to_string(),
        param_type: args.get_str("param_type").unwrap_or_default().to_string(),
        data_type: args.get_str("data_type").unwrap_or_default().to_string(),
        required: args.flag("required"),
        default_value: non_empty(args.get_str("default_value")),
        allow_multiple: args.flag("allow_multiple"),
    }
}

fn read_api_param(args: &AttrArgs) -> ApiParam {
    ApiParam {
        description: non_empty(args.value()),
        name: non_empty(args.get_str("name")),
        required: args.flag("required"),
        default_value: non_empty(args.get_str("default_value")),
        allowable_values: non_empty(args.get_str("allowable_values")),
    }
}

/// Read parameter attributes; `name` is the default for attributes without an explicit name.
fn read_argument(name: String, type_info: TypeInfo, attrs: &[Attribute]) -> ArgumentMetadata {
    let mut argument = ArgumentMetadata::new(name, type_info);

    for attr in attrs {
        let kind = attr_name(attr);
        let annotation = match kind.as_str() {
            "bean_param" => Some(ParamAnnotation::Bean),
            "context" => Some(ParamAnnotation::Context),
            "path_param" | "query_param" | "header_param" | "form_param" | "form_data_param"
            | "default_value" => {
                let Some(args) = args_of(attr) else {
                    continue;
                };
                let value = args.value().unwrap_or(&argument.name).to_string();
                match kind.as_str() {
                    "path_param" => Some(ParamAnnotation::Path(value)),
                    "query_param" => Some(ParamAnnotation::Query(value)),
                    "header_param" => Some(ParamAnnotation::Header(value)),
                    "form_param" => Some(ParamAnnotation::Form(value)),
                    "form_data_param" => Some(ParamAnnotation::FormData(value)),
                    _ => args
                        .value()
                        .map(|default| ParamAnnotation::DefaultValue(default.to_string())),
                }
            }
            "api_param" => {
                argument.doc = args_of(attr).map(|args| read_api_param(&args));
                None
            }
            _ => None,
        };

        if let Some(annotation) = annotation {
            argument.annotations.push(annotation);
        }
    }

    argument
}

fn read_fields(fields: &syn::Fields) -> Vec<ArgumentMetadata> {
    let syn::Fields::Named(named) = fields else {
        return Vec::new();
    };

    named
        .named
        .iter()
        .filter_map(|field| {
            let ident = field.ident.as_ref()?.to_string();
            let name = serde_rename(&field.attrs).unwrap_or(ident);
            Some(read_argument(name, TypeInfo::from_syn(&field.ty), &field.attrs))
        })
        .collect()
}

/// `#[serde(rename = "...")]` on a field.
pub(crate) fn serde_rename(attrs: &[Attribute]) -> Option<String> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("serde"))
        .filter_map(|attr| AttrArgs::parse(attr).ok())
        .find_map(|args| args.get_str("rename").map(str::to_string))
}

fn collect_bindings(pat: &Pat) -> Vec<String> {
    let mut bindings = Vec::new();
    collect_into(pat, &mut bindings);
    bindings
}

fn collect_into(pat: &Pat, bindings: &mut Vec<String>) {
    match pat {
        Pat::Ident(ident) => bindings.push(ident.ident.to_string()),
        Pat::TupleStruct(tuple_struct) => {
            for elem in &tuple_struct.elems {
                collect_into(elem, bindings);
            }
        }
        Pat::Tuple(tuple) => {
            for elem in &tuple.elems {
                collect_into(elem, bindings);
            }
        }
        Pat::Struct(pat_struct) => {
            for field in &pat_struct.fields {
                collect_into(&field.pat, bindings);
            }
        }
        Pat::Reference(reference) => collect_into(&reference.pat, bindings),
        Pat::Type(pat_type) => collect_into(&pat_type.pat, bindings),
        Pat::Paren(paren) => collect_into(&paren.pat, bindings),
        _ => {}
    }
}

/// The type a method responds with, looking through `Result<T, E>`, `Json<T>` and
/// `(StatusCode, Json<T>)`.
fn response_type(ty: &syn::Type) -> Option<TypeInfo> {
    match ty {
        syn::Type::ImplTrait(_) => None,
        syn::Type::Reference(type_ref) => response_type(&type_ref.elem),
        syn::Type::Path(type_path) => {
            let segment = type_path.path.segments.last()?;
            if segment.ident == "Json" || segment.ident == "Result" {
                if let Some(inner_ty) = first_type_argument(segment) {
                    return response_type(inner_ty);
                }
            }
            Some(TypeInfo::from_syn(ty))
        }
        syn::Type::Tuple(tuple) if !tuple.elems.is_empty() => {
            tuple.elems.iter().find_map(json_inner)
        }
        _ => Some(TypeInfo::from_syn(ty)),
    }
}

fn json_inner(ty: &syn::Type) -> Option<TypeInfo> {
    if let syn::Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident == "Json" {
            return first_type_argument(segment).map(TypeInfo::from_syn);
        }
    }
    None
}

fn first_type_argument(segment: &syn::PathSegment) -> Option<&syn::Type> {
    if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
        args.args.iter().find_map(|arg| match arg {
            syn::GenericArgument::Type(inner_ty) => Some(inner_ty),
            _ => None,
        })
    } else {
        None
    }
}
