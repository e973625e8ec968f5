//! Building one [`Operation`] from a resource method.

use crate::document::{
    Operation, Parameter, ParameterLocation, Response, SecurityRequirement, SwaggerDocument,
};
use crate::extension::{ExtensionChain, Extraction};
use crate::reader::{
    ApiOperation, ArgumentMetadata, Authorization, HttpMethod, ImplicitParam, MetadataReader,
    MethodMetadata, ResponseHeader, TypeInfo,
};
use crate::schema_generator::{ModelConverter, ModelSet, Schema};
use log::{debug, warn};
use std::collections::BTreeMap;

pub const SUCCESSFUL_OPERATION: &str = "successful operation";

/// Return types that say nothing about the response body.
const OPAQUE_RESPONSES: &[&str] = &["HttpResponse", "Response", "StatusCode"];

/// An operation together with the verb its method declares.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOperation {
    pub operation: Operation,
    /// `None` for sub-resource locators and methods without a verb
    pub verb: Option<HttpMethod>,
}

/// Resolves methods into operations, registering the models they reference.
pub struct OperationResolver<'a> {
    pub reader: &'a dyn MetadataReader,
    pub converter: &'a mut dyn ModelConverter,
    pub chain: &'a ExtensionChain,
    pub document: &'a mut SwaggerDocument,
}

impl<'a> OperationResolver<'a> {
    /// Resolve a method into an operation.
    ///
    /// Returns `None` for methods without `#[api_operation]` and for hidden operations.
    /// Parent parameters, path constraints, tags and media types are left to the caller.
    pub fn resolve(&mut self, method: &MethodMetadata) -> Option<ResolvedOperation> {
        let api_operation = method.operation.as_ref()?;
        if api_operation.hidden {
            debug!("Skipping hidden operation {}", method.name);
            return None;
        }

        let verb = self.resolve_verb(method, api_operation);
        let operation_id = if api_operation.nickname.is_empty() {
            method.name.clone()
        } else {
            api_operation.nickname.clone()
        };

        let mut operation = Operation::new(operation_id);
        operation.summary = non_empty(&api_operation.summary);
        operation.description = non_empty(&api_operation.notes);
        operation.deprecated = method.deprecated;
        operation.schemes = api_operation
            .protocols
            .split(',')
            .map(str::trim)
            .filter(|scheme| !scheme.is_empty())
            .map(str::to_string)
            .collect();
        operation.security = security_requirements(&api_operation.authorizations);

        self.resolve_responses(&mut operation, method, api_operation);

        for argument in &method.arguments {
            let parameters = self.argument_parameters(argument);
            operation.parameters.extend(parameters);
        }
        for implicit in &method.implicit_params {
            if let Some(parameter) = self.implicit_parameter(implicit) {
                operation.parameters.push(parameter);
            }
        }

        Some(ResolvedOperation { operation, verb })
    }

    /// Verb attributes first, then the operation's own verb, then the extension chain.
    fn resolve_verb(
        &self,
        method: &MethodMetadata,
        api_operation: &ApiOperation,
    ) -> Option<HttpMethod> {
        method
            .verbs
            .first()
            .copied()
            .or_else(|| method.custom_verb.as_deref().and_then(parse_verb))
            .or_else(|| {
                Some(api_operation.http_method.as_str())
                    .filter(|verb| !verb.is_empty())
                    .and_then(parse_verb)
            })
            .or_else(|| self.chain.extract_operation_method(method))
    }

    fn resolve_responses(
        &mut self,
        operation: &mut Operation,
        method: &MethodMetadata,
        api_operation: &ApiOperation,
    ) {
        let response_type = match &api_operation.response {
            Some(declared) => Some(declared.clone()),
            None => method
                .return_type
                .clone()
                .filter(|declared| self.infers_response(declared)),
        };

        if let Some(response_type) = response_type {
            if let Some(schema) = self.response_schema(&response_type) {
                let mut response = Response::new(SUCCESSFUL_OPERATION);
                response.schema = Some(wrap_container(
                    api_operation.response_container.as_deref(),
                    schema,
                ));
                response.headers = self.response_headers(&api_operation.response_headers);
                operation.set_response(200, response);
            }
        }

        for declared in &method.responses {
            let mut response = Response::new(declared.message.clone());
            if let Some(response_type) = &declared.response {
                response.schema = self.response_schema(response_type);
            }
            response.headers = self.response_headers(&declared.response_headers);
            operation.set_response(declared.code, response);
        }

        if operation.responses.is_empty() {
            operation.set_response(0, Response::new(SUCCESSFUL_OPERATION));
        }
    }

    fn infers_response(&self, declared: &TypeInfo) -> bool {
        !(declared.is_unit()
            || declared.name.starts_with("impl ")
            || OPAQUE_RESPONSES.contains(&declared.name.as_str())
            || self.reader.is_resource(declared))
    }

    /// Schema for a response or body type: inline when embeddable, otherwise a reference
    /// to its root model. Every reachable model is registered.
    fn response_schema(&mut self, type_info: &TypeInfo) -> Option<Schema> {
        let models = self.register_models(type_info);
        let property = self.converter.read_as_property(type_info)?;

        if property.is_embeddable() {
            return Some(property);
        }
        match models.root {
            Some(root) => Some(Schema::reference(&root)),
            None => Some(property),
        }
    }

    fn register_models(&mut self, type_info: &TypeInfo) -> ModelSet {
        let models = self.converter.read_models(type_info);
        for (name, schema) in &models.models {
            self.document.register_model(name, schema.clone());
        }
        models
    }

    fn response_headers(&mut self, headers: &[ResponseHeader]) -> BTreeMap<String, Schema> {
        let mut resolved = BTreeMap::new();
        for header in headers.iter().filter(|header| !header.name.is_empty()) {
            let Some(response_type) = &header.response else {
                continue;
            };
            if let Some(property) = self.converter.read_as_property(response_type) {
                let mut schema = wrap_container(header.response_container.as_deref(), property);
                schema.description = non_empty(&header.description);
                resolved.insert(header.name.clone(), schema);
            }
        }
        resolved
    }

    fn argument_parameters(&mut self, argument: &ArgumentMetadata) -> Vec<Parameter> {
        let mut parameters = match self.chain.extract_parameters(argument, self.reader) {
            Extraction::Handled(parameters) => parameters,
            Extraction::Skip => return Vec::new(),
            Extraction::Defer => {
                if argument.type_info.is_unit() {
                    return Vec::new();
                }
                vec![body_parameter(argument)]
            }
        };

        for parameter in &mut parameters {
            self.apply_schema(parameter);
        }
        parameters
    }

    fn implicit_parameter(&mut self, implicit: &ImplicitParam) -> Option<Parameter> {
        let location = match implicit.param_type.as_str() {
            "header" => ParameterLocation::Header,
            "path" => ParameterLocation::Path,
            "query" => ParameterLocation::Query,
            "body" => ParameterLocation::Body,
            "form" | "formData" => ParameterLocation::FormData,
            other => {
                warn!(
                    "Ignoring implicit parameter {} with unknown kind `{}`",
                    implicit.name, other
                );
                return None;
            }
        };

        let mut parameter = Parameter::new(location, implicit.name.clone());
        parameter.required |= implicit.required;
        parameter.default = implicit.default_value.clone();

        if implicit.allow_multiple && location != ParameterLocation::Path && location != ParameterLocation::Body {
            parameter.param_type = Some("array".to_string());
            parameter.items = Some(Box::new(Schema::of_type("string")));
            parameter.collection_format = Some("multi".to_string());
            parameter.array = true;
            return Some(parameter);
        }

        match swagger_type(&implicit.data_type) {
            Some(schema) if location != ParameterLocation::Body => {
                parameter.param_type = schema.schema_type;
                parameter.format = schema.format;
            }
            _ => {
                let data_type = if implicit.data_type.is_empty() {
                    "String"
                } else {
                    implicit.data_type.as_str()
                };
                match TypeInfo::parse(data_type) {
                    Ok(declared) => {
                        parameter.array = declared.is_array_like();
                        parameter.declared_type = Some(declared);
                    }
                    Err(e) => warn!("Implicit parameter {}: {}", implicit.name, e),
                }
                self.apply_schema(&mut parameter);
            }
        }

        Some(parameter)
    }

    /// Fill in `type`/`format`/`items` of a non-body parameter, or the schema of a body.
    fn apply_schema(&mut self, parameter: &mut Parameter) {
        if parameter.param_type.is_some() || parameter.schema.is_some() {
            return;
        }
        let Some(declared) = parameter.declared_type.clone() else {
            if !parameter.is_body() {
                parameter.param_type = Some("string".to_string());
            }
            return;
        };

        if parameter.is_body() {
            if let Some(schema) = self.response_schema(&declared) {
                let wrap = parameter.array && !declared.without_option().is_array_like();
                parameter.schema = Some(if wrap { Schema::array(schema) } else { schema });
            }
            return;
        }

        let models = self.converter.read_models(&declared);
        let Some(property) = self.converter.read_as_property(&declared) else {
            return;
        };
        let simple = inline_for_parameter(property, &models);

        if simple.schema_type.as_deref() == Some("array") {
            parameter.param_type = Some("array".to_string());
            parameter.items = simple
                .items
                .map(|items| Box::new(inline_for_parameter(*items, &models)));
        } else {
            parameter.param_type = simple.schema_type.or_else(|| Some("string".to_string()));
            parameter.format = simple.format;
            if parameter.enum_values.is_none() {
                parameter.enum_values = simple.enum_values;
            }
        }
    }
}

/// A body parameter for an argument no extension claimed.
///
/// A wrapper with a single type argument (`Json<T>`, `Vec<T>`, `Option<T>`) is unwrapped;
/// the array flag of the declared type is kept.
fn body_parameter(argument: &ArgumentMetadata) -> Parameter {
    let declared = &argument.type_info;
    let inner = match declared.generic_args.as_slice() {
        [only] => only.clone(),
        _ => declared.clone(),
    };

    let mut parameter = Parameter::typed(ParameterLocation::Body, "body", inner);
    parameter.array = declared.is_array_like();
    parameter.required = !declared.is_option();

    if let Some(doc) = &argument.doc {
        if let Some(name) = &doc.name {
            parameter.name = name.clone();
        }
        parameter.description = doc.description.clone();
        parameter.required |= doc.required;
    }
    parameter
}

/// Non-body parameters cannot reference models: enums are inlined, other models become
/// strings.
fn inline_for_parameter(schema: Schema, models: &ModelSet) -> Schema {
    let Some(model) = schema.referenced_model() else {
        return schema;
    };
    match models.models.get(model).and_then(|model| model.enum_values.clone()) {
        Some(values) => Schema {
            enum_values: Some(values),
            ..Schema::of_type("string")
        },
        None => Schema::of_type("string"),
    }
}

/// Wrap a schema in the container named by `response_container`.
pub fn wrap_container(container: Option<&str>, schema: Schema) -> Schema {
    match container.map(str::to_lowercase).as_deref() {
        Some("list") => Schema::array(schema),
        Some("map") => Schema::map(schema),
        _ => schema,
    }
}

pub fn security_requirements(authorizations: &[Authorization]) -> Vec<SecurityRequirement> {
    authorizations
        .iter()
        .map(|auth| SecurityRequirement::new(auth.value.clone(), auth.scopes.clone()))
        .collect()
}

/// Swagger names accepted as implicit parameter data types.
fn swagger_type(data_type: &str) -> Option<Schema> {
    let schema = match data_type.to_lowercase().as_str() {
        "" | "string" => Schema::of_type("string"),
        "int" | "integer" => Schema::with_format("integer", "int32"),
        "long" => Schema::with_format("integer", "int64"),
        "float" => Schema::with_format("number", "float"),
        "double" | "number" => Schema::with_format("number", "double"),
        "boolean" => Schema::of_type("boolean"),
        "date" => Schema::with_format("string", "date"),
        "date-time" | "datetime" => Schema::with_format("string", "date-time"),
        "file" => Schema::of_type("file"),
        _ => return None,
    };
    Some(schema)
}

fn parse_verb(verb: &str) -> Option<HttpMethod> {
    let parsed = HttpMethod::parse(verb);
    if parsed.is_none() {
        warn!("Unknown HTTP method `{}`", verb);
    }
    parsed
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}
