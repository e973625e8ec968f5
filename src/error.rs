/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Debug)]
pub enum Error {
    /// Source text (a type in an attribute, for instance) that is not valid Rust
    ParseError(String),
    /// An attribute whose arguments do not follow the expected shape
    AttributeError { attribute: String, message: String },
    NoResourcesFound,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::ParseError(message) => write!(f, "Parse error: {}", message),
            Error::AttributeError { attribute, message } => {
                write!(f, "Malformed #[{}] attribute: {}", attribute, message)
            }
            Error::NoResourcesFound => write!(f, "No #[api] resources found"),
        }
    }
}

impl std::error::Error for Error {}

impl From<syn::Error> for Error {
    fn from(err: syn::Error) -> Self {
        Error::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_attribute_error() {
        let err = Error::AttributeError {
            attribute: "api_operation".to_string(),
            message: "expected `,`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed #[api_operation] attribute: expected `,`"
        );
    }

    #[test]
    fn test_syn_error_conversion() {
        let syn_err = syn::parse_str::<syn::Type>("Vec<").unwrap_err();
        let err: Error = syn_err.into();
        assert!(matches!(err, Error::ParseError(_)));
        assert!(err.to_string().starts_with("Parse error"));
    }

    #[test]
    fn test_no_resources_message() {
        assert_eq!(Error::NoResourcesFound.to_string(), "No #[api] resources found");
    }
}
