// Resources, their methods and their models may live in different files
use pretty_assertions::assert_eq;
use resource_openapi::document::ParameterLocation;
use resource_openapi::extension::Convention;
use resource_openapi::parser::{AstParser, ParsedFile};
use resource_openapi::reader::source::SourceMetadataReader;
use resource_openapi::reader::{HttpMethod, MetadataReader};
use resource_openapi::scanner::FileScanner;
use resource_openapi::schema_generator::{Schema, SchemaGenerator};
use resource_openapi::type_resolver::TypeResolver;
use resource_openapi::walker::{root_resources, ResourceWalker};
use tempfile::TempDir;

const STORE: &str = r#"
    #[api("/store")]
    #[path("/store")]
    pub struct StoreResource;

    impl StoreResource {
        #[path("/orders/{orderId}")]
        #[api_operation("Order")]
        pub fn order(&self, #[path_param("orderId")] id: i64) -> crate::orders::OrderResource {
            crate::orders::OrderResource
        }
    }
"#;

const ORDERS: &str = r#"
    #[api(value = "/orders", tags("orders"))]
    pub struct OrderResource;
"#;

const ORDER_METHODS: &str = r#"
    use crate::models::Order;

    impl OrderResource {
        #[get]
        #[path("/")]
        #[api_operation("Find an order")]
        pub fn find(&self) -> Order {
            unimplemented!()
        }

        #[delete]
        #[path("/")]
        #[api_operation("Cancel an order")]
        pub fn cancel(&self) {}
    }
"#;

const MODELS: &str = r#"
    pub mod models {
        pub struct Order {
            pub id: i64,
            pub status: Status,
            pub lines: Vec<OrderLine>,
        }

        pub struct OrderLine {
            pub sku: String,
            pub quantity: u32,
        }

        pub enum Status {
            Placed,
            Delivered,
        }
    }
"#;

fn parse(files: &[(&str, &str)]) -> Vec<ParsedFile> {
    files
        .iter()
        .map(|(path, source)| AstParser::parse_source(path, source).expect("Failed to parse"))
        .collect()
}

fn walk(parsed_files: &[ParsedFile]) -> resource_openapi::document::SwaggerDocument {
    let reader = SourceMetadataReader::new(parsed_files);
    let converter = SchemaGenerator::new(TypeResolver::new(parsed_files));
    let mut walker = ResourceWalker::new(&reader, Box::new(converter), Convention::Attributes);
    walker.read_all(&root_resources(&reader));
    walker.into_document()
}

#[test]
fn test_methods_are_joined_with_their_struct() {
    let parsed_files = parse(&[("orders.rs", ORDERS), ("order_methods.rs", ORDER_METHODS)]);
    let reader = SourceMetadataReader::new(&parsed_files);

    let resource = reader.resource("OrderResource").expect("Should find OrderResource");
    let methods: Vec<_> = resource.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(methods, vec!["find", "cancel"]);

    // No class path: reachable only as a sub-resource.
    assert!(root_resources(&reader).is_empty());
}

#[test]
fn test_sub_resource_across_files() {
    let parsed_files = parse(&[
        ("store.rs", STORE),
        ("orders.rs", ORDERS),
        ("order_methods.rs", ORDER_METHODS),
        ("models.rs", MODELS),
    ]);
    let document = walk(&parsed_files);

    assert_eq!(document.operation_count(), 2);
    let find = document
        .operation("/store/orders/{orderId}", HttpMethod::Get)
        .expect("Should find the composed GET operation");
    assert!(document
        .operation("/store/orders/{orderId}", HttpMethod::Delete)
        .is_some());

    assert_eq!(find.parameters.len(), 1);
    assert_eq!(find.parameters[0].name, "orderId");
    assert_eq!(find.parameters[0].location, ParameterLocation::Path);
    assert_eq!(find.responses["200"].schema, Some(Schema::reference("Order")));

    let tags: Vec<_> = find.tags.iter().cloned().collect();
    assert_eq!(tags, vec!["orders", "store"]);

    let models: Vec<_> = document.definitions.keys().cloned().collect();
    assert_eq!(models, vec!["Order", "OrderLine", "Status"]);
    assert_eq!(
        document.definitions["Order"].properties["lines"],
        Schema::array(Schema::reference("OrderLine"))
    );
}

#[test]
fn test_file_order_does_not_change_the_document() {
    let forward = walk(&parse(&[
        ("store.rs", STORE),
        ("orders.rs", ORDERS),
        ("order_methods.rs", ORDER_METHODS),
        ("models.rs", MODELS),
    ]));
    let backward = walk(&parse(&[
        ("models.rs", MODELS),
        ("order_methods.rs", ORDER_METHODS),
        ("orders.rs", ORDERS),
        ("store.rs", STORE),
    ]));

    assert_eq!(forward, backward);
}

#[test]
fn test_scanned_project_spanning_directories() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    for (path, source) in [
        ("src/api/store.rs", STORE),
        ("src/api/orders.rs", ORDERS),
        ("src/api/orders/methods.rs", ORDER_METHODS),
        ("src/models.rs", MODELS),
        ("target/debug/generated.rs", "#[api(\"/ghost\")] #[path(\"/ghost\")] pub struct Ghost;"),
    ] {
        let file_path = root.join(path);
        std::fs::create_dir_all(file_path.parent().unwrap()).unwrap();
        std::fs::write(&file_path, source).unwrap();
    }

    let scan_result = FileScanner::new(root.to_path_buf()).scan().unwrap();
    assert_eq!(scan_result.rust_files.len(), 4);

    let parsed_files: Vec<_> = AstParser::parse_files(&scan_result.rust_files)
        .into_iter()
        .filter_map(Result::ok)
        .collect();
    let document = walk(&parsed_files);

    let paths: Vec<_> = document.paths.keys().cloned().collect();
    assert_eq!(paths, vec!["/store/orders/{orderId}"]);
}
