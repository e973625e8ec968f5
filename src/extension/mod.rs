//! Parameter extraction from method arguments.
//!
//! Each argument of an operation method is offered to an ordered chain of
//! [`ParameterExtension`]s. The first extension that claims the argument decides its
//! parameters; an argument nobody claims becomes the request body.
//!
//! Which chain runs depends on how the resources are written, see [`Convention`]:
//!
//! - **Attributes**: arguments carry `#[path_param]`, `#[query_param]`, `#[bean_param]`, ...
//!   (see [`attributes`])
//! - **Extractors**: arguments are framework extractors such as `Path<T>` and `Query<T>`
//!   (see [`extractors`])

pub mod attributes;
pub mod extractors;

use crate::document::{Parameter, ParameterLocation};
use crate::reader::{ArgumentMetadata, HttpMethod, MetadataReader, MethodMetadata};
use log::debug;
use std::fmt;

/// Outcome of offering one argument to an extension.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The argument maps to these parameters
    Handled(Vec<Parameter>),
    /// The argument is consumed without producing parameters and is not a body
    Skip,
    /// Not recognized; ask the next extension
    Defer,
}

/// The extensions after the current one.
pub type Remaining<'a> = &'a [Box<dyn ParameterExtension>];

/// One step of the parameter extraction chain.
pub trait ParameterExtension {
    fn name(&self) -> &'static str;

    /// Map an argument to parameters. `remaining` lets container extensions resolve their
    /// fields through the rest of the chain.
    fn extract_parameters(
        &self,
        argument: &ArgumentMetadata,
        reader: &dyn MetadataReader,
        remaining: Remaining<'_>,
    ) -> Extraction;

    /// Infer the verb of a method that declares none through the verb attributes.
    fn extract_operation_method(&self, _method: &MethodMetadata) -> Option<HttpMethod> {
        None
    }
}

/// Run `chain` over an argument. An empty `Handled` counts as `Defer`.
pub fn run_chain(
    chain: Remaining<'_>,
    argument: &ArgumentMetadata,
    reader: &dyn MetadataReader,
) -> Extraction {
    for (idx, extension) in chain.iter().enumerate() {
        match extension.extract_parameters(argument, reader, &chain[idx + 1..]) {
            Extraction::Handled(parameters) if !parameters.is_empty() => {
                debug!("{} handled argument {}", extension.name(), argument.name);
                return Extraction::Handled(parameters);
            }
            Extraction::Skip => {
                debug!("{} skipped argument {}", extension.name(), argument.name);
                return Extraction::Skip;
            }
            _ => {}
        }
    }
    Extraction::Defer
}

/// How parameters are declared on resource methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Convention {
    /// Parameter attributes on plain arguments
    #[default]
    Attributes,
    /// Framework extractor types (`Path<T>`, `Query<T>`, `Json<T>`, ...)
    Extractors,
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Convention::Attributes => write!(f, "attributes"),
            Convention::Extractors => write!(f, "extractors"),
        }
    }
}

/// The ordered extension chain used for one traversal.
pub struct ExtensionChain {
    extensions: Vec<Box<dyn ParameterExtension>>,
}

impl ExtensionChain {
    pub fn new(extensions: Vec<Box<dyn ParameterExtension>>) -> Self {
        Self { extensions }
    }

    pub fn for_convention(convention: Convention) -> Self {
        match convention {
            Convention::Attributes => Self::new(vec![
                Box::new(attributes::BeanParamExtension),
                Box::new(attributes::MultipartExtension),
                Box::new(attributes::ParamAttributeExtension),
            ]),
            Convention::Extractors => Self::new(vec![Box::new(extractors::ExtractorExtension)]),
        }
    }

    pub fn extract_parameters(
        &self,
        argument: &ArgumentMetadata,
        reader: &dyn MetadataReader,
    ) -> Extraction {
        run_chain(&self.extensions, argument, reader)
    }

    /// The first verb any extension infers.
    pub fn extract_operation_method(&self, method: &MethodMetadata) -> Option<HttpMethod> {
        self.extensions
            .iter()
            .find_map(|extension| extension.extract_operation_method(method))
    }
}

/// A parameter for `argument` with its declared default and `#[api_param]` documentation.
pub(crate) fn documented_parameter(
    location: ParameterLocation,
    name: &str,
    argument: &ArgumentMetadata,
) -> Parameter {
    let mut parameter = Parameter::typed(location, name, argument.type_info.clone());
    parameter.default = argument.default_value().map(str::to_string);

    if let Some(doc) = &argument.doc {
        if let Some(doc_name) = &doc.name {
            parameter.name = doc_name.clone();
        }
        if doc.description.is_some() {
            parameter.description = doc.description.clone();
        }
        parameter.required |= doc.required;
        if doc.default_value.is_some() {
            parameter.default = doc.default_value.clone();
        }
        if let Some(allowable) = &doc.allowable_values {
            let values: Vec<String> = allowable
                .split(',')
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .collect();
            if !values.is_empty() {
                parameter.enum_values = Some(values);
            }
        }
    }

    if location == ParameterLocation::Path {
        parameter.required = true;
    }
    parameter
}
