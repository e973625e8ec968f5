use crate::reader::TypeInfo;
use crate::type_resolver::{PrimitiveType, StructDef, TypeKind, TypeResolver};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Swagger Schema definition, used both for named models and inline properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to a named model
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "int32", "int64", "float", "double")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Required field names for object types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Properties for object types
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Value schema for map types
    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Box<Schema>>,
    /// Enum values for enum types
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl Schema {
    pub fn of_type(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Default::default()
        }
    }

    pub fn with_format(schema_type: &str, format: &str) -> Self {
        Self {
            format: Some(format.to_string()),
            ..Self::of_type(schema_type)
        }
    }

    /// A reference to the named model under `#/definitions/`
    pub fn reference(model: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", DEFINITIONS_PREFIX, model)),
            ..Default::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of_type("array")
        }
    }

    /// An object whose values all follow `values`
    pub fn map(values: Schema) -> Self {
        Self {
            additional_properties: Some(Box::new(values)),
            ..Self::of_type("object")
        }
    }

    /// Name of the referenced model, if this is a reference
    pub fn referenced_model(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|reference| reference.strip_prefix(DEFINITIONS_PREFIX))
    }

    /// Whether the schema can be written inline instead of as a named model.
    pub fn is_embeddable(&self) -> bool {
        self.reference.is_none()
            && matches!(
                self.schema_type.as_deref(),
                Some("integer" | "string" | "number" | "boolean" | "array" | "file")
            )
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(model) = self.referenced_model() {
            out.push(model);
        }
        for property in self.properties.values() {
            property.collect_references(out);
        }
        if let Some(items) = &self.items {
            items.collect_references(out);
        }
        if let Some(values) = &self.additional_properties {
            values.collect_references(out);
        }
    }
}

/// Named models reachable from one type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSet {
    /// The model the type itself maps to, when it is a named model
    pub root: Option<String>,
    pub models: BTreeMap<String, Schema>,
}

/// Converts declared types into schemas.
pub trait ModelConverter {
    /// Inline schema for a type; `None` only for the unit type.
    fn read_as_property(&mut self, type_info: &TypeInfo) -> Option<Schema>;

    /// Every named model reachable from the type.
    fn read_models(&mut self, type_info: &TypeInfo) -> ModelSet;
}

/// Schema generator - converts Rust types to Swagger schemas
pub struct SchemaGenerator {
    /// Type resolver for looking up type definitions
    type_resolver: TypeResolver,
    /// Cache of generated models to avoid duplication
    schemas: BTreeMap<String, Schema>,
}

impl SchemaGenerator {
    /// Create a new SchemaGenerator with a TypeResolver
    pub fn new(type_resolver: TypeResolver) -> Self {
        debug!("Initializing SchemaGenerator");
        Self {
            type_resolver,
            schemas: BTreeMap::new(),
        }
    }

    /// Generate a schema for a TypeInfo, registering any models it needs
    pub fn generate_schema(&mut self, type_info: &TypeInfo) -> Schema {
        if type_info.is_option() || is_transparent_wrapper(type_info) {
            if let Some(inner) = type_info.inner() {
                return self.generate_schema(inner);
            }
        }

        if type_info.is_array_like() {
            if let Some(inner) = type_info.inner() {
                return Schema::array(self.generate_schema(inner));
            }
        }

        if type_info.is_map() {
            return Schema::map(self.generate_schema(&type_info.generic_args[1]));
        }

        if type_info.is_tuple() {
            return Schema::array(Schema::of_type("object"));
        }

        if let Some(resolved) = self.type_resolver.resolve_type(&type_info.name) {
            match resolved.kind {
                TypeKind::Primitive(prim) => return primitive_to_schema(&prim),
                TypeKind::File => return Schema::of_type("file"),
                TypeKind::Struct(struct_def) => {
                    self.generate_struct_schema(&resolved.name, struct_def);
                    return Schema::reference(&resolved.name);
                }
                TypeKind::Enum(enum_def) => {
                    if !self.schemas.contains_key(&resolved.name) {
                        debug!("Generating enum schema for: {}", resolved.name);
                        let schema = Schema {
                            enum_values: Some(enum_def.variants),
                            ..Schema::of_type("string")
                        };
                        self.schemas.insert(resolved.name.clone(), schema);
                    }
                    return Schema::reference(&resolved.name);
                }
            }
        }

        debug!("Unknown type: {}, using object placeholder", type_info.name);
        Schema::of_type("object")
    }

    /// Generate a schema for a struct type and add it to the schemas collection
    fn generate_struct_schema(&mut self, type_name: &str, struct_def: StructDef) {
        if self.schemas.contains_key(type_name) {
            return;
        }
        debug!("Generating struct schema for: {}", type_name);

        // Placeholder so self-referencing fields resolve to a reference.
        self.schemas
            .insert(type_name.to_string(), Schema::of_type("object"));

        let mut schema = Schema {
            description: struct_def.description.clone(),
            ..Schema::of_type("object")
        };
        self.fill_properties(&mut schema, &struct_def);

        self.schemas.insert(type_name.to_string(), schema);
    }

    fn fill_properties(&mut self, schema: &mut Schema, struct_def: &StructDef) {
        for field in &struct_def.fields {
            if field.serde_attrs.skip {
                continue;
            }

            if field.serde_attrs.flatten {
                let inner_name = &field.type_info.without_option().name;
                if let Some(resolved) = self.type_resolver.resolve_type(inner_name) {
                    if let TypeKind::Struct(inner_def) = resolved.kind {
                        self.fill_properties(schema, &inner_def);
                        continue;
                    }
                }
            }

            let field_name = field
                .serde_attrs
                .rename
                .clone()
                .unwrap_or_else(|| field.name.clone());

            let property = self.generate_schema(&field.type_info);
            schema.properties.insert(field_name.clone(), property);

            if !field.optional {
                schema.required.push(field_name);
            }
        }
    }

    /// Get all generated schemas
    pub fn get_schemas(&self) -> &BTreeMap<String, Schema> {
        &self.schemas
    }

    fn reachable_models(&self, schema: &Schema) -> BTreeMap<String, Schema> {
        let mut models = BTreeMap::new();
        let mut seen = BTreeSet::new();
        let mut pending = Vec::new();
        schema.collect_references(&mut pending);

        while let Some(name) = pending.pop() {
            if !seen.insert(name) {
                continue;
            }
            if let Some(model) = self.schemas.get(name) {
                model.collect_references(&mut pending);
                models.insert(name.to_string(), model.clone());
            }
        }

        models
    }
}

impl ModelConverter for SchemaGenerator {
    fn read_as_property(&mut self, type_info: &TypeInfo) -> Option<Schema> {
        if type_info.without_option().is_unit() {
            return None;
        }
        Some(self.generate_schema(type_info))
    }

    fn read_models(&mut self, type_info: &TypeInfo) -> ModelSet {
        if type_info.without_option().is_unit() {
            return ModelSet::default();
        }

        let schema = self.generate_schema(type_info);
        ModelSet {
            root: schema.referenced_model().map(str::to_string),
            models: self.reachable_models(&schema),
        }
    }
}

fn is_transparent_wrapper(type_info: &TypeInfo) -> bool {
    matches!(type_info.name.as_str(), "Box" | "Rc" | "Arc" | "Cow")
        && type_info.generic_args.len() == 1
}

/// Convert a primitive type to a schema
fn primitive_to_schema(primitive: &PrimitiveType) -> Schema {
    match primitive {
        PrimitiveType::String | PrimitiveType::Char => Schema::of_type("string"),
        PrimitiveType::I8
        | PrimitiveType::I16
        | PrimitiveType::I32
        | PrimitiveType::U8
        | PrimitiveType::U16
        | PrimitiveType::U32 => Schema::with_format("integer", "int32"),
        PrimitiveType::I64 | PrimitiveType::I128 | PrimitiveType::U64 | PrimitiveType::U128 => {
            Schema::with_format("integer", "int64")
        }
        PrimitiveType::F32 => Schema::with_format("number", "float"),
        PrimitiveType::F64 => Schema::with_format("number", "double"),
        PrimitiveType::Bool => Schema::of_type("boolean"),
        PrimitiveType::Uuid => Schema::with_format("string", "uuid"),
        PrimitiveType::Date => Schema::with_format("string", "date"),
        PrimitiveType::DateTime => Schema::with_format("string", "date-time"),
    }
}
