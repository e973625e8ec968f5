//! Generic parsing of attribute arguments.
//!
//! Resource attributes mix positional literals, flags, `key = value` pairs and nested lists:
//!
//! ```text
//! #[api_operation("Find pets", nickname = "findPets", tags("pet"), hidden,
//!                 authorizations(authorization(value = "oauth", scopes("read"))))]
//! ```
//!
//! [`AttrArgs::parse`] turns any such attribute into a small tree that the source reader
//! queries by key.

use crate::error::{Error, Result};
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, Lit, Meta, MetaList, Token};

/// Parsed arguments of one attribute (or of one nested list).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttrArgs {
    /// Bare literals, in order
    pub positional: Vec<String>,
    /// Keyed entries, in order; keys may repeat
    pub named: Vec<(String, ArgValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// A bare key such as `hidden`
    Flag,
    /// `key = literal`, rendered as a string
    Literal(String),
    /// `key(...)`
    List(AttrArgs),
}

enum ArgItem {
    Lit(Lit),
    Meta(Meta),
}

impl Parse for ArgItem {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(Lit) {
            Ok(ArgItem::Lit(input.parse()?))
        } else {
            Ok(ArgItem::Meta(input.parse()?))
        }
    }
}

/// The last path segment of an attribute, so `#[actix_web::get]` reads as `get`.
pub fn attr_name(attr: &Attribute) -> String {
    attr.path()
        .segments
        .last()
        .map(|segment| segment.ident.to_string())
        .unwrap_or_default()
}

impl AttrArgs {
    /// Parse the arguments of an attribute.
    pub fn parse(attr: &Attribute) -> Result<Self> {
        let parsed = match &attr.meta {
            Meta::Path(_) => Ok(AttrArgs::default()),
            Meta::List(list) => Self::from_list(list),
            Meta::NameValue(name_value) => expr_to_string(&name_value.value).map(|value| AttrArgs {
                positional: vec![value],
                named: Vec::new(),
            }),
        };

        parsed.map_err(|err| Error::AttributeError {
            attribute: attr_name(attr),
            message: err.to_string(),
        })
    }

    fn from_list(list: &MetaList) -> syn::Result<Self> {
        let items = list.parse_args_with(Punctuated::<ArgItem, Token![,]>::parse_terminated)?;
        let mut args = AttrArgs::default();

        for item in items {
            match item {
                ArgItem::Lit(lit) => args.positional.push(lit_to_string(&lit)),
                ArgItem::Meta(Meta::Path(path)) => {
                    args.named.push((path_to_string(&path), ArgValue::Flag));
                }
                ArgItem::Meta(Meta::NameValue(name_value)) => {
                    let value = expr_to_string(&name_value.value)?;
                    args.named
                        .push((path_to_string(&name_value.path), ArgValue::Literal(value)));
                }
                ArgItem::Meta(Meta::List(inner)) => {
                    let nested = Self::from_list(&inner)?;
                    args.named
                        .push((path_to_string(&inner.path), ArgValue::List(nested)));
                }
            }
        }

        Ok(args)
    }

    pub fn first_positional(&self) -> Option<&str> {
        self.positional.first().map(String::as_str)
    }

    /// All values stored under `key`.
    pub fn all<'a, 'k>(&'a self, key: &'k str) -> impl Iterator<Item = &'a ArgValue> + 'k
    where
        'a: 'k,
    {
        self.named
            .iter()
            .filter(move |(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// The first literal stored under `key`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.all(key).find_map(|value| match value {
            ArgValue::Literal(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// The first positional literal, or the `value` key.
    pub fn value(&self) -> Option<&str> {
        self.first_positional().or_else(|| self.get_str("value"))
    }

    /// `key` or `key = true`.
    pub fn flag(&self, key: &str) -> bool {
        self.all(key).any(|value| match value {
            ArgValue::Flag => true,
            ArgValue::Literal(text) => text == "true",
            ArgValue::List(_) => false,
        })
    }

    /// Strings under `key`, whether written as `key("a", "b")` or repeated `key = "a"`.
    pub fn strings(&self, key: &str) -> Vec<String> {
        let mut values = Vec::new();
        for value in self.all(key) {
            match value {
                ArgValue::Literal(text) => values.push(text.clone()),
                ArgValue::List(list) => values.extend(list.positional.iter().cloned()),
                ArgValue::Flag => {}
            }
        }
        values
    }

    /// Nested lists under `key`, e.g. every `param(...)` inside `api_implicit_params`.
    pub fn nested<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a AttrArgs> + 'a {
        self.all(key).filter_map(|value| match value {
            ArgValue::List(list) => Some(list),
            _ => None,
        })
    }
}

fn path_to_string(path: &syn::Path) -> String {
    path.segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

fn lit_to_string(lit: &Lit) -> String {
    match lit {
        Lit::Str(text) => text.value(),
        Lit::Int(int) => int.base10_digits().to_string(),
        Lit::Float(float) => float.base10_digits().to_string(),
        Lit::Bool(boolean) => boolean.value.to_string(),
        Lit::Char(ch) => ch.value().to_string(),
        Lit::ByteStr(bytes) => String::from_utf8_lossy(&bytes.value()).into_owned(),
        Lit::Byte(byte) => char::from(byte.value()).to_string(),
        _ => String::new(),
    }
}

fn expr_to_string(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(expr_lit) => Ok(lit_to_string(&expr_lit.lit)),
        Expr::Path(expr_path) => Ok(path_to_string(&expr_path.path)),
        Expr::Group(group) => expr_to_string(&group.expr),
        Expr::Paren(paren) => expr_to_string(&paren.expr),
        other => Err(syn::Error::new_spanned(other, "expected a literal or a path")),
    }
}
