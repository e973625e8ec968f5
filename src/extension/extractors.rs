//! Extension for resources written with framework extractors (actix-web / axum style).
//!
//! - `Path<T>`, `Query<T>` and `Form<T>` become path, query and form parameters. A struct
//!   `T` contributes one parameter per field, a tuple one per element, anything else a
//!   single parameter.
//! - Path values bind to the route placeholders by position, so they take the placeholder
//!   names whenever the counts agree. Other values are named after the pattern bindings.
//! - `Json<T>` is the request body.
//! - Request, state and connection extractors are not documented.

use super::{documented_parameter, Extraction, ParameterExtension, Remaining};
use crate::document::{Parameter, ParameterLocation};
use crate::reader::{ArgumentMetadata, HttpMethod, MetadataReader, MethodMetadata};
use log::debug;

const SKIPPED_EXTRACTORS: &[&str] = &[
    "HttpRequest",
    "Request",
    "HeaderMap",
    "State",
    "Data",
    "Extension",
    "Payload",
    "Multipart",
];

pub struct ExtractorExtension;

impl ParameterExtension for ExtractorExtension {
    fn name(&self) -> &'static str {
        "extractor"
    }

    fn extract_parameters(
        &self,
        argument: &ArgumentMetadata,
        reader: &dyn MetadataReader,
        _remaining: Remaining<'_>,
    ) -> Extraction {
        let extractor = argument.type_info.name.as_str();
        if SKIPPED_EXTRACTORS.contains(&extractor) {
            return Extraction::Skip;
        }

        let location = match extractor {
            "Path" => ParameterLocation::Path,
            "Query" => ParameterLocation::Query,
            "Form" => ParameterLocation::FormData,
            _ => return Extraction::Defer,
        };
        let Some(inner) = argument.type_info.inner() else {
            return Extraction::Defer;
        };

        let parameters = if let Some(fields) = reader.struct_fields(&inner.name) {
            debug!("Expanding {} fields of {}", extractor, inner.name);
            fields
                .iter()
                .map(|field| documented_parameter(location, &field.name, field))
                .collect()
        } else if inner.is_tuple() {
            let names = value_names(argument, location, inner.generic_args.len());
            inner
                .generic_args
                .iter()
                .zip(names)
                .map(|(element, name)| Parameter::typed(location, name, element.clone()))
                .collect()
        } else {
            let mut single = argument.clone();
            single.type_info = inner.clone();
            let name = value_names(argument, location, 1)
                .pop()
                .unwrap_or_else(|| argument.name.clone());
            vec![documented_parameter(location, &name, &single)]
        };

        if parameters.is_empty() {
            Extraction::Skip
        } else {
            Extraction::Handled(parameters)
        }
    }

    fn extract_operation_method(&self, method: &MethodMetadata) -> Option<HttpMethod> {
        method
            .route_verbs
            .iter()
            .find_map(|verb| HttpMethod::parse(verb))
    }
}

/// Names for the `count` values carried by one extractor argument.
fn value_names(argument: &ArgumentMetadata, location: ParameterLocation, count: usize) -> Vec<String> {
    let placeholders = &argument.route_placeholders;
    if location == ParameterLocation::Path && placeholders.len() == count {
        return placeholders.clone();
    }
    if argument.bindings.len() == count {
        return argument.bindings.clone();
    }
    if count == 1 {
        return vec![argument.name.clone()];
    }

    debug!(
        "{} binds {} values but the route declares {} placeholders",
        argument.name,
        count,
        placeholders.len()
    );
    (0..count)
        .map(|idx| match placeholders.get(idx) {
            Some(name) if location == ParameterLocation::Path => name.clone(),
            _ => format!("{}{}", argument.name, idx),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::AstParser;
    use crate::reader::source::SourceMetadataReader;
    use crate::reader::TypeInfo;

    const SOURCE: &str = r#"
        use actix_web::{web, HttpRequest, HttpResponse};

        #[derive(Deserialize)]
        pub struct Pagination {
            pub page: Option<u32>,
            #[serde(rename = "perPage")]
            pub per_page: u32,
        }

        #[api("/users")]
        #[scope("/users")]
        pub struct UserResource;

        impl UserResource {
            #[route("/{user_id}/posts/{post_id}", method = "GET")]
            #[api_operation("Find post")]
            pub async fn post(
                path: web::Path<(u32, String)>,
                query: web::Query<Pagination>,
                web::Path(id): web::Path<u64>,
                body: web::Json<Post>,
                req: HttpRequest,
                state: web::Data<AppState>,
                raw: String,
            ) -> HttpResponse {
                unimplemented!()
            }
        }
    "#;

    fn method() -> (SourceMetadataReader, MethodMetadata) {
        let parsed = AstParser::parse_source("users.rs", SOURCE).unwrap();
        let reader = SourceMetadataReader::new(&[parsed]);
        let method = reader.resource("UserResource").unwrap().methods[0].clone();
        (reader, method)
    }

    fn extract(argument: &ArgumentMetadata, reader: &SourceMetadataReader) -> Extraction {
        ExtractorExtension.extract_parameters(argument, reader, &[])
    }

    #[test]
    fn test_tuple_path_pairs_with_bindings() {
        let (reader, mut method) = method();
        let argument = &mut method.arguments[0];
        argument.bindings = vec!["user_id".to_string(), "post_id".to_string()];

        let Extraction::Handled(parameters) = extract(argument, &reader) else {
            panic!("Expected path parameters");
        };
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].name, "user_id");
        assert_eq!(parameters[0].declared_type, Some(TypeInfo::new("u32")));
        assert_eq!(parameters[1].name, "post_id");
        assert!(parameters.iter().all(|p| p.location == ParameterLocation::Path && p.required));
    }

    #[test]
    fn test_tuple_path_takes_route_placeholders() {
        let (reader, method) = method();
        let argument = &method.arguments[0];
        assert_eq!(argument.bindings, vec!["path"]);

        let Extraction::Handled(parameters) = extract(argument, &reader) else {
            panic!("Expected path parameters");
        };
        let names: Vec<_> = parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["user_id", "post_id"]);
        assert_eq!(parameters[0].declared_type, Some(TypeInfo::new("u32")));
        assert_eq!(parameters[1].declared_type, Some(TypeInfo::new("String")));
    }

    #[test]
    fn test_scalar_path_takes_route_placeholder() {
        let parsed = AstParser::parse_source(
            "items.rs",
            r#"
            #[api("/items")]
            #[scope("/items")]
            pub struct ItemResource;

            impl ItemResource {
                #[get("/{id:[0-9]+}")]
                #[api_operation("Find item")]
                pub async fn find(path: web::Path<u32>) -> HttpResponse {
                    unimplemented!()
                }
            }
            "#,
        )
        .unwrap();
        let reader = SourceMetadataReader::new(&[parsed]);
        let argument = &reader.resource("ItemResource").unwrap().methods[0].arguments[0];

        let Extraction::Handled(parameters) = extract(argument, &reader) else {
            panic!("Expected path parameter");
        };
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters[0].name, "id");
        assert_eq!(parameters[0].declared_type, Some(TypeInfo::new("u32")));
    }

    #[test]
    fn test_unmatched_tuple_falls_back_to_indexed_names() {
        let mut argument = ArgumentMetadata::new(
            "pair",
            TypeInfo::with_args(
                "Query",
                vec![TypeInfo::tuple(vec![TypeInfo::new("u32"), TypeInfo::new("bool")])],
            ),
        );
        argument.route_placeholders = vec!["ignored".to_string()];

        let Extraction::Handled(parameters) = extract(&argument, &SourceMetadataReader::new(&[])) else {
            panic!("Expected query parameters");
        };
        let names: Vec<_> = parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["pair0", "pair1"]);
    }

    #[test]
    fn test_query_struct_expands_fields() {
        let (reader, method) = method();
        let Extraction::Handled(parameters) = extract(&method.arguments[1], &reader) else {
            panic!("Expected query parameters");
        };

        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].name, "page");
        assert!(!parameters[0].required);
        assert_eq!(parameters[1].name, "perPage");
        assert_eq!(parameters[1].location, ParameterLocation::Query);
    }

    #[test]
    fn test_single_path_value_uses_binding() {
        let (reader, method) = method();
        let Extraction::Handled(parameters) = extract(&method.arguments[2], &reader) else {
            panic!("Expected path parameter");
        };
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters[0].name, "id");
        assert_eq!(parameters[0].declared_type, Some(TypeInfo::new("u64")));
    }

    #[test]
    fn test_json_and_plain_arguments_defer() {
        let (reader, method) = method();
        assert_eq!(extract(&method.arguments[3], &reader), Extraction::Defer);
        assert_eq!(extract(&method.arguments[6], &reader), Extraction::Defer);
    }

    #[test]
    fn test_framework_types_are_skipped() {
        let (reader, method) = method();
        assert_eq!(extract(&method.arguments[4], &reader), Extraction::Skip);
        assert_eq!(extract(&method.arguments[5], &reader), Extraction::Skip);
    }

    #[test]
    fn test_verb_from_route_attribute() {
        let (_, method) = method();
        assert_eq!(
            ExtractorExtension.extract_operation_method(&method),
            Some(HttpMethod::Get)
        );
        assert_eq!(
            ExtractorExtension.extract_operation_method(&MethodMetadata::default()),
            None
        );
    }
}
