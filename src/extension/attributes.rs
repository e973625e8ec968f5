//! Extensions for the attribute convention.

use super::{documented_parameter, run_chain, Extraction, ParameterExtension, Remaining};
use crate::document::ParameterLocation;
use crate::reader::{ArgumentMetadata, MetadataReader, ParamAnnotation};
use log::debug;

/// Expands a `#[bean_param]` struct into the parameters declared on its fields.
pub struct BeanParamExtension;

impl ParameterExtension for BeanParamExtension {
    fn name(&self) -> &'static str {
        "bean_param"
    }

    fn extract_parameters(
        &self,
        argument: &ArgumentMetadata,
        reader: &dyn MetadataReader,
        remaining: Remaining<'_>,
    ) -> Extraction {
        if !argument.has(&ParamAnnotation::Bean) {
            return Extraction::Defer;
        }

        let bean = &argument.type_info.without_option().name;
        let Some(fields) = reader.struct_fields(bean) else {
            debug!("No fields known for bean parameter {}", bean);
            return Extraction::Skip;
        };

        let parameters: Vec<_> = fields
            .iter()
            .flat_map(|field| match run_chain(remaining, field, reader) {
                Extraction::Handled(parameters) => parameters,
                _ => Vec::new(),
            })
            .collect();

        if parameters.is_empty() {
            Extraction::Skip
        } else {
            Extraction::Handled(parameters)
        }
    }
}

/// Multipart fields declared with `#[form_data_param("name")]`.
pub struct MultipartExtension;

impl ParameterExtension for MultipartExtension {
    fn name(&self) -> &'static str {
        "multipart"
    }

    fn extract_parameters(
        &self,
        argument: &ArgumentMetadata,
        _reader: &dyn MetadataReader,
        _remaining: Remaining<'_>,
    ) -> Extraction {
        let field = argument.annotations.iter().find_map(|annotation| match annotation {
            ParamAnnotation::FormData(name) => Some(name),
            _ => None,
        });

        match field {
            Some(name) => Extraction::Handled(vec![documented_parameter(
                ParameterLocation::FormData,
                name,
                argument,
            )]),
            None => Extraction::Defer,
        }
    }
}

/// `#[path_param]`, `#[query_param]`, `#[header_param]` and `#[form_param]` arguments.
/// `#[context]` arguments are injected by the framework and skipped.
pub struct ParamAttributeExtension;

impl ParameterExtension for ParamAttributeExtension {
    fn name(&self) -> &'static str {
        "param_attribute"
    }

    fn extract_parameters(
        &self,
        argument: &ArgumentMetadata,
        _reader: &dyn MetadataReader,
        _remaining: Remaining<'_>,
    ) -> Extraction {
        if argument.has(&ParamAnnotation::Context) {
            return Extraction::Skip;
        }

        let parameters: Vec<_> = argument
            .annotations
            .iter()
            .filter_map(|annotation| match annotation {
                ParamAnnotation::Path(name) => Some((ParameterLocation::Path, name)),
                ParamAnnotation::Query(name) => Some((ParameterLocation::Query, name)),
                ParamAnnotation::Header(name) => Some((ParameterLocation::Header, name)),
                ParamAnnotation::Form(name) => Some((ParameterLocation::FormData, name)),
                _ => None,
            })
            .map(|(location, name)| documented_parameter(location, name, argument))
            .collect();

        if parameters.is_empty() {
            Extraction::Defer
        } else {
            Extraction::Handled(parameters)
        }
    }
}
