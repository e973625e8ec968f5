use crate::parser::ParsedFile;
use crate::reader::attributes::AttrArgs;
use crate::reader::TypeInfo;
use log::{debug, warn};
use std::collections::HashMap;
use syn::visit::Visit;

/// Type resolver - resolves Rust type definitions to structured type information
pub struct TypeResolver {
    /// Struct definitions indexed by name
    structs: HashMap<String, syn::ItemStruct>,
    /// Enum definitions indexed by name
    enums: HashMap<String, syn::ItemEnum>,
    /// Cache of resolved types to avoid redundant parsing
    type_cache: HashMap<String, ResolvedType>,
}

/// Resolved type information
#[derive(Debug, Clone)]
pub struct ResolvedType {
    /// The type name
    pub name: String,
    /// The kind of type (struct, enum, primitive, etc.)
    pub kind: TypeKind,
}

/// Type kind - represents different categories of types
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// A struct type with fields
    Struct(StructDef),
    /// An enum type with variants
    Enum(EnumDef),
    /// A primitive type (String, i32, etc.)
    Primitive(PrimitiveType),
    /// Uploaded or streamed binary content
    File,
}

/// Struct definition with fields
#[derive(Debug, Clone)]
pub struct StructDef {
    /// The fields of the struct
    pub fields: Vec<FieldDef>,
    /// First line of the doc comment
    pub description: Option<String>,
}

/// Field definition in a struct
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Type information for the field
    pub type_info: TypeInfo,
    /// Whether the field is optional (wrapped in `Option<T>`)
    pub optional: bool,
    /// Serde attributes applied to this field
    pub serde_attrs: SerdeAttributes,
}

/// Enum definition with variants
#[derive(Debug, Clone)]
pub struct EnumDef {
    /// The serialized names of the variants
    pub variants: Vec<String>,
}

/// Primitive types supported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    I8,
    I16,
    I32,
    I64,
    I128,
    U8,
    U16,
    U32,
    U64,
    U128,
    F32,
    F64,
    Bool,
    Char,
    Uuid,
    Date,
    DateTime,
}

/// Serde attributes for a field
#[derive(Debug, Clone, Default)]
pub struct SerdeAttributes {
    /// Renamed field name
    pub rename: Option<String>,
    /// Whether to skip this field during serialization
    pub skip: bool,
    /// Whether to flatten this field
    pub flatten: bool,
}

#[derive(Default)]
struct DefinitionIndex {
    structs: HashMap<String, syn::ItemStruct>,
    enums: HashMap<String, syn::ItemEnum>,
}

impl<'ast> Visit<'ast> for DefinitionIndex {
    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        self.structs
            .entry(node.ident.to_string())
            .or_insert_with(|| node.clone());
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.enums
            .entry(node.ident.to_string())
            .or_insert_with(|| node.clone());
    }
}

impl TypeResolver {
    /// Create a new TypeResolver indexing every struct and enum in the parsed files
    pub fn new(parsed_files: &[ParsedFile]) -> Self {
        debug!("Initializing TypeResolver with {} files", parsed_files.len());

        let mut index = DefinitionIndex::default();
        for parsed_file in parsed_files {
            index.visit_file(&parsed_file.syntax_tree);
        }
        debug!(
            "Indexed {} structs and {} enums",
            index.structs.len(),
            index.enums.len()
        );

        Self {
            structs: index.structs,
            enums: index.enums,
            type_cache: HashMap::new(),
        }
    }

    /// Resolve a type by name
    pub fn resolve_type(&mut self, type_name: &str) -> Option<ResolvedType> {
        if let Some(cached) = self.type_cache.get(type_name) {
            return Some(cached.clone());
        }

        let kind = if let Some(primitive) = Self::parse_primitive_type(type_name) {
            TypeKind::Primitive(primitive)
        } else if Self::is_file_type(type_name) {
            TypeKind::File
        } else if let Some(item_struct) = self.structs.get(type_name) {
            debug!("Parsing struct definition: {}", type_name);
            TypeKind::Struct(Self::parse_struct_definition(item_struct))
        } else if let Some(item_enum) = self.enums.get(type_name) {
            debug!("Parsing enum definition: {}", type_name);
            TypeKind::Enum(Self::parse_enum_definition(item_enum))
        } else {
            warn!("Could not resolve type: {}", type_name);
            return None;
        };

        let resolved = ResolvedType {
            name: type_name.to_string(),
            kind,
        };
        self.type_cache
            .insert(type_name.to_string(), resolved.clone());
        Some(resolved)
    }

    fn parse_struct_definition(item_struct: &syn::ItemStruct) -> StructDef {
        let mut fields = Vec::new();
        if let syn::Fields::Named(named_fields) = &item_struct.fields {
            for field in &named_fields.named {
                if let Some(field_def) = Self::parse_field(field) {
                    fields.push(field_def);
                }
            }
        }

        StructDef {
            fields,
            description: doc_summary(&item_struct.attrs),
        }
    }

    fn parse_enum_definition(item_enum: &syn::ItemEnum) -> EnumDef {
        let variants = item_enum
            .variants
            .iter()
            .filter_map(|variant| {
                let serde_attrs = Self::parse_serde_attributes(&variant.attrs);
                if serde_attrs.skip {
                    return None;
                }
                Some(serde_attrs.rename.unwrap_or_else(|| variant.ident.to_string()))
            })
            .collect();

        EnumDef { variants }
    }

    fn parse_field(field: &syn::Field) -> Option<FieldDef> {
        let field_name = field.ident.as_ref()?.to_string();
        let type_info = TypeInfo::from_syn(&field.ty);

        Some(FieldDef {
            name: field_name,
            optional: type_info.is_option(),
            type_info,
            serde_attrs: Self::parse_serde_attributes(&field.attrs),
        })
    }

    /// Parse Serde attributes from field or variant attributes
    fn parse_serde_attributes(attrs: &[syn::Attribute]) -> SerdeAttributes {
        let mut serde_attrs = SerdeAttributes::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            let args = match AttrArgs::parse(attr) {
                Ok(args) => args,
                Err(e) => {
                    debug!("Ignoring serde attribute: {}", e);
                    continue;
                }
            };

            if let Some(rename) = args.get_str("rename") {
                serde_attrs.rename = Some(rename.to_string());
            }
            serde_attrs.skip |= args.flag("skip") || args.flag("skip_serializing");
            serde_attrs.flatten |= args.flag("flatten");
        }

        serde_attrs
    }

    fn is_file_type(type_name: &str) -> bool {
        matches!(type_name, "Bytes" | "File" | "NamedFile" | "TempFile")
    }

    /// Parse a primitive type name
    fn parse_primitive_type(type_name: &str) -> Option<PrimitiveType> {
        match type_name {
            "String" | "str" => Some(PrimitiveType::String),
            "i8" => Some(PrimitiveType::I8),
            "i16" => Some(PrimitiveType::I16),
            "i32" => Some(PrimitiveType::I32),
            "i64" | "isize" => Some(PrimitiveType::I64),
            "i128" => Some(PrimitiveType::I128),
            "u8" => Some(PrimitiveType::U8),
            "u16" => Some(PrimitiveType::U16),
            "u32" => Some(PrimitiveType::U32),
            "u64" | "usize" => Some(PrimitiveType::U64),
            "u128" => Some(PrimitiveType::U128),
            "f32" => Some(PrimitiveType::F32),
            "f64" => Some(PrimitiveType::F64),
            "bool" => Some(PrimitiveType::Bool),
            "char" => Some(PrimitiveType::Char),
            "Uuid" => Some(PrimitiveType::Uuid),
            "NaiveDate" => Some(PrimitiveType::Date),
            "DateTime" | "NaiveDateTime" | "SystemTime" => Some(PrimitiveType::DateTime),
            _ => None,
        }
    }
}

fn doc_summary(attrs: &[syn::Attribute]) -> Option<String> {
    attrs.iter().find_map(|attr| {
        if !attr.path().is_ident("doc") {
            return None;
        }
        let syn::Meta::NameValue(name_value) = &attr.meta else {
            return None;
        };
        match &name_value.value {
            syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(text),
                ..
            }) => {
                let line = text.value().trim().to_string();
                (!line.is_empty()).then_some(line)
            }
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::AstParser;

    /// Helper function to parse code and create a TypeResolver
    fn create_resolver_from_code(code: &str) -> TypeResolver {
        let parsed = AstParser::parse_source("test.rs", code).unwrap();
        TypeResolver::new(&[parsed])
    }

    #[test]
    fn test_resolve_primitive_types() {
        let mut resolver = create_resolver_from_code("");

        let primitives = vec![
            ("String", PrimitiveType::String),
            ("i32", PrimitiveType::I32),
            ("u64", PrimitiveType::U64),
            ("usize", PrimitiveType::U64),
            ("f32", PrimitiveType::F32),
            ("bool", PrimitiveType::Bool),
            ("Uuid", PrimitiveType::Uuid),
            ("NaiveDateTime", PrimitiveType::DateTime),
        ];

        for (type_name, expected) in primitives {
            let resolved = resolver.resolve_type(type_name).unwrap();
            match resolved.kind {
                TypeKind::Primitive(prim) => assert_eq!(prim, expected, "for {}", type_name),
                other => panic!("Expected primitive for {}, got {:?}", type_name, other),
            }
        }
    }

    #[test]
    fn test_resolve_file_types() {
        let mut resolver = create_resolver_from_code("");
        for type_name in ["Bytes", "NamedFile", "TempFile"] {
            let resolved = resolver.resolve_type(type_name).unwrap();
            assert!(matches!(resolved.kind, TypeKind::File));
        }
    }

    #[test]
    fn test_resolve_struct_in_nested_module() {
        let code = r#"
            pub mod model {
                /// A pet in the store.
                ///
                /// More text.
                pub struct Pet {
                    pub id: u64,
                    pub name: String,
                    pub tag: Option<String>,
                    pub photos: Vec<String>,
                }
            }
        "#;

        let mut resolver = create_resolver_from_code(code);
        let resolved = resolver.resolve_type("Pet").unwrap();

        let TypeKind::Struct(struct_def) = resolved.kind else {
            panic!("Expected struct");
        };
        assert_eq!(struct_def.description.as_deref(), Some("A pet in the store."));
        assert_eq!(struct_def.fields.len(), 4);
        assert_eq!(struct_def.fields[0].name, "id");
        assert!(!struct_def.fields[0].optional);
        assert!(struct_def.fields[2].optional);
        assert!(struct_def.fields[3].type_info.is_array_like());
    }

    #[test]
    fn test_parse_serde_attributes() {
        let code = r#"
            pub struct Account {
                #[serde(rename = "accountId")]
                pub id: u32,
                #[serde(skip)]
                pub password: String,
                #[serde(flatten)]
                pub extra: Extra,
                #[serde(skip_serializing_if = "Option::is_none")]
                pub nickname: Option<String>,
            }
        "#;

        let mut resolver = create_resolver_from_code(code);
        let TypeKind::Struct(struct_def) = resolver.resolve_type("Account").unwrap().kind else {
            panic!("Expected struct");
        };

        assert_eq!(struct_def.fields[0].serde_attrs.rename.as_deref(), Some("accountId"));
        assert!(struct_def.fields[1].serde_attrs.skip);
        assert!(struct_def.fields[2].serde_attrs.flatten);
        assert!(!struct_def.fields[3].serde_attrs.skip);
    }

    #[test]
    fn test_resolve_enum_variants() {
        let code = r#"
            pub enum Status {
                Available,
                #[serde(rename = "on-hold")]
                Pending,
                #[serde(skip)]
                Internal,
                Sold,
            }
        "#;

        let mut resolver = create_resolver_from_code(code);
        let TypeKind::Enum(enum_def) = resolver.resolve_type("Status").unwrap().kind else {
            panic!("Expected enum");
        };
        assert_eq!(enum_def.variants, vec!["Available", "on-hold", "Sold"]);
    }

    #[test]
    fn test_type_caching() {
        let mut resolver = create_resolver_from_code("pub struct Cached { pub id: u32 }");

        assert!(resolver.resolve_type("Cached").is_some());
        assert!(resolver.type_cache.contains_key("Cached"));
        assert!(resolver.resolve_type("Cached").is_some());
    }

    #[test]
    fn test_resolve_nonexistent_type() {
        let mut resolver = create_resolver_from_code("");
        assert!(resolver.resolve_type("NonExistent").is_none());
        assert!(!resolver.type_cache.contains_key("NonExistent"));
    }
}
