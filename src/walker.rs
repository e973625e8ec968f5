//! Depth-first traversal of resources and their sub-resources.
//!
//! A root resource is read with an empty [`MergeContext`]. Each method becomes an operation
//! under the composed path; a method whose return type is itself a resource is a
//! sub-resource locator, and the walker descends into that resource with a context
//! carrying the locator's path, verb, media types, tags and parameters.

use crate::document::{Parameter, SwaggerDocument, Tag};
use crate::extension::{Convention, ExtensionChain};
use crate::operation::{security_requirements, OperationResolver, ResolvedOperation};
use crate::path_template;
use crate::reader::{HttpMethod, MetadataReader, ResourceMetadata};
use crate::schema_generator::ModelConverter;
use log::{debug, warn};
use std::collections::BTreeSet;

/// What a resource inherits from the locator that led to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeContext {
    pub path: Option<String>,
    pub verb: Option<HttpMethod>,
    pub consumes: BTreeSet<String>,
    pub produces: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    pub parameters: Vec<Parameter>,
    /// Read resources even when they are hidden
    pub read_hidden: bool,
    /// Resources on the current branch, outermost first
    pub ancestry: Vec<String>,
}

pub struct ResourceWalker<'a> {
    reader: &'a dyn MetadataReader,
    converter: Box<dyn ModelConverter + 'a>,
    chain: ExtensionChain,
    document: SwaggerDocument,
}

/// Resources read when no roots are named: every `#[api]` type with a class path.
pub fn root_resources(reader: &dyn MetadataReader) -> Vec<String> {
    reader
        .resource_names()
        .into_iter()
        .filter(|name| {
            reader
                .resource(name)
                .map_or(false, |resource| resource.path.is_some())
        })
        .collect()
}

impl<'a> ResourceWalker<'a> {
    pub fn new(
        reader: &'a dyn MetadataReader,
        converter: Box<dyn ModelConverter + 'a>,
        convention: Convention,
    ) -> Self {
        debug!("Walking resources with the {} convention", convention);
        Self {
            reader,
            converter,
            chain: ExtensionChain::for_convention(convention),
            document: SwaggerDocument::new(),
        }
    }

    /// Start from an existing document instead of an empty one.
    pub fn with_document(mut self, document: SwaggerDocument) -> Self {
        self.document = document;
        self
    }

    /// Read each root in order, each with a fresh context.
    pub fn read_all(&mut self, roots: &[String]) {
        for root in roots {
            self.read(root, &MergeContext::default());
        }
    }

    pub fn read(&mut self, name: &str, context: &MergeContext) {
        let reader = self.reader;
        let Some(resource) = reader.resource(name) else {
            warn!("Unknown resource {}", name);
            return;
        };
        let Some(api) = &resource.api else {
            debug!("{} is not an #[api] resource", name);
            return;
        };
        if api.hidden && !context.read_hidden {
            debug!("Skipping hidden resource {}", name);
            return;
        }
        if context.ancestry.iter().any(|ancestor| ancestor == name) {
            warn!(
                "Sub-resource cycle: {} -> {}, not descending again",
                context.ancestry.join(" -> "),
                name
            );
            return;
        }
        debug!("Reading resource {}", name);

        let tags = self.resource_tags(resource, context);

        let class_security = security_requirements(&api.authorizations);
        if !class_security.is_empty() {
            debug!(
                "{} declares {} class-level security requirements",
                name,
                class_security.len()
            );
        }

        let mut ancestry = context.ancestry.clone();
        ancestry.push(name.to_string());

        for method in &resource.methods {
            let Some(template) = path_template::resolve(
                resource.path.as_deref(),
                method.path.as_deref(),
                context.path.as_deref(),
            ) else {
                continue;
            };

            let mut resolver = OperationResolver {
                reader,
                converter: self.converter.as_mut(),
                chain: &self.chain,
                document: &mut self.document,
            };
            let Some(ResolvedOperation {
                mut operation,
                verb,
            }) = resolver.resolve(method)
            else {
                continue;
            };

            operation.parameters.extend(context.parameters.iter().cloned());
            for parameter in &mut operation.parameters {
                if let Some(regex) = template.constraints.get(&parameter.name) {
                    parameter.pattern = Some(regex.clone());
                }
            }

            let consumes = merge_media(&context.consumes, &resource.consumes, &method.consumes);
            let produces = merge_media(&context.produces, &resource.produces, &method.produces);
            operation.consumes = own_or_merged(&method.consumes, &consumes);
            operation.produces = own_or_merged(&method.produces, &produces);

            if let Some(return_type) = &method.return_type {
                if reader.is_resource(return_type) {
                    debug!(
                        "{}::{} locates sub-resource {}",
                        name, method.name, return_type.name
                    );
                    let child = MergeContext {
                        path: Some(template.path.clone()),
                        verb,
                        consumes: consumes.clone(),
                        produces: produces.clone(),
                        tags: tags.clone(),
                        parameters: operation.parameters.clone(),
                        read_hidden: true,
                        ancestry: ancestry.clone(),
                    };
                    self.read(&return_type.name, &child);
                }
            }

            let Some(verb) = verb.or(context.verb) else {
                debug!("{}::{} has no HTTP method, not attached", name, method.name);
                continue;
            };

            if let Some(api_operation) = &method.operation {
                for tag in &api_operation.tags {
                    if !tag.is_empty() {
                        self.document.register_tag(Tag::new(tag.clone()));
                        operation.tags.insert(tag.clone());
                    }
                }
            }
            operation.tags.extend(tags.iter().cloned());

            self.document.attach(&template.path, verb, operation);
        }
    }

    /// Explicit tags, or one derived from the `api` value; parent tags are added and
    /// everything is registered.
    fn resource_tags(&mut self, resource: &ResourceMetadata, context: &MergeContext) -> BTreeSet<String> {
        let mut tags = BTreeSet::new();
        if let Some(api) = &resource.api {
            if api.tags.is_empty() {
                let derived = api.value.replace('/', "");
                if !derived.is_empty() {
                    tags.insert(derived);
                }
            } else {
                tags.extend(api.tags.iter().cloned());
            }

            for tag in &tags {
                self.document.register_tag(Tag {
                    name: tag.clone(),
                    description: api.description.clone(),
                });
            }
        }

        for tag in &context.tags {
            self.document.register_tag(Tag::new(tag.clone()));
        }
        tags.extend(context.tags.iter().cloned());
        tags
    }

    pub fn document(&self) -> &SwaggerDocument {
        &self.document
    }

    pub fn into_document(self) -> SwaggerDocument {
        self.document
    }
}

fn merge_media(
    parent: &BTreeSet<String>,
    class: &Option<Vec<String>>,
    method: &Option<Vec<String>>,
) -> BTreeSet<String> {
    let mut merged = parent.clone();
    merged.extend(class.iter().flatten().cloned());
    merged.extend(method.iter().flatten().cloned());
    merged
}

fn own_or_merged(method: &Option<Vec<String>>, merged: &BTreeSet<String>) -> BTreeSet<String> {
    match method {
        Some(own) if !own.is_empty() => own.iter().cloned().collect(),
        _ => merged.clone(),
    }
}
