use metacrawl::catalog::{BaseTypeRef, Nullability, PropertyValue};
use metacrawl::config::Config;
use metacrawl::metadata::FixtureMetadata;
use metacrawl::{crawl, CrawlScope};

const DERBY: &str = r#"{
    "answers": {
        "getDatabaseProductName": "Apache Derby",
        "getDatabaseProductVersion": "10.4.2.0",
        "getDriverName": "Apache Derby Embedded JDBC Driver",
        "getMaxColumnsInTable": 1012,
        "supportsUnion": true,
        "supportsFullOuterJoins": false,
        "getNumericFunctions": "ABS,ACOS,ASIN,ATAN",
        "getSQLKeywords": null,
        "getIdentifierQuoteString": "\"",
        "getURL": { "unsupported": "driver predates this call" },
        "getTableTypes": { "rows": ["SYNONYM", "SYSTEM TABLE", "TABLE", "VIEW"] },
        "getSchemas": { "rows": ["APP", null, "SYS"] },
        "supportsResultSetType": {
            "probe": {
                "TypeForwardOnly": true,
                "TypeScrollInsensitive": true,
                "TypeScrollSensitive": false
            }
        }
    },
    "type_info": {
        "columns": [
            "TYPE_NAME", "DATA_TYPE", "PRECISION", "NULLABLE", "CASE_SENSITIVE", "SEARCHABLE"
        ],
        "rows": [
            ["BIGINT", -5, 19, 1, false, 2],
            ["INTEGER", 4, 10, 1, false, 2],
            ["VARCHAR", 12, 32672, 1, true, 3]
        ]
    },
    "user_defined_types": {
        "columns": ["TYPE_SCHEM", "TYPE_NAME", "CLASS_NAME", "DATA_TYPE", "REMARKS", "BASE_TYPE"],
        "rows": [
            ["APP", "PRICE", "java.math.BigDecimal", 2001, "money", 3],
            ["APP", "QUANTITY", "java.lang.Integer", 2001, null, 4]
        ]
    }
}"#;

#[test]
fn test_crawl_lifecycle() {
    let fixture = FixtureMetadata::from_json(DERBY).unwrap();
    let config = Config::parse("catalog=\nschemaPattern=APP\n").unwrap();
    let scope = CrawlScope::from_config(&config);

    let catalog = crawl(&fixture, &scope).unwrap();

    // Header
    assert_eq!(catalog.info().product_name.as_deref(), Some("Apache Derby"));
    assert_eq!(catalog.info().product_version.as_deref(), Some("10.4.2.0"));
    assert_eq!(catalog.info().catalog, None);
    assert_eq!(catalog.info().schema_pattern.as_deref(), Some("APP"));

    // Scalars
    assert_eq!(
        catalog.get_property("MaxColumnsInTable"),
        Some(&PropertyValue::Integer(1012))
    );
    assert_eq!(
        catalog.get_property("SupportsFullOuterJoins"),
        Some(&PropertyValue::Boolean(false))
    );
    assert_eq!(
        catalog.get_property("NumericFunctions"),
        Some(&PropertyValue::List(vec![
            "ABS".into(),
            "ACOS".into(),
            "ASIN".into(),
            "ATAN".into()
        ]))
    );
    assert_eq!(
        catalog.get_property("IdentifierQuoteString"),
        Some(&PropertyValue::String("\"".into()))
    );
    assert_eq!(catalog.get_property("SQLKeywords"), Some(&PropertyValue::Null));
    assert!(catalog.get_property("URL").is_none());

    // Listings
    assert_eq!(
        catalog.get_property("Schemas"),
        Some(&PropertyValue::List(vec!["APP".into(), "SYS".into()]))
    );
    assert_eq!(
        catalog
            .get_property("TableTypes")
            .and_then(|v| v.as_list())
            .map(|l| l.len()),
        Some(4)
    );

    // Probes
    for (label, expected) in [
        ("TypeForwardOnly", true),
        ("TypeScrollInsensitive", true),
        ("TypeScrollSensitive", false),
    ] {
        let key = format!("SupportsResultSetTypeResultSet{}", label);
        assert_eq!(
            catalog.get_property(&key),
            Some(&PropertyValue::Boolean(expected)),
            "{}",
            key
        );
    }

    // Types
    let names: Vec<&str> = catalog.types().map(|t| t.name()).collect();
    assert_eq!(names, vec!["BIGINT", "INTEGER", "VARCHAR", "PRICE", "QUANTITY"]);
    assert_eq!(catalog.lookup_type_by_code(4).unwrap().name(), "INTEGER");
    assert_eq!(
        catalog.get_type("VARCHAR").unwrap().nullable,
        Nullability::Nullable
    );

    let quantity = catalog.get_type("QUANTITY").unwrap();
    assert_eq!(catalog.resolve_base_type(quantity).unwrap().name(), "INTEGER");

    let price = catalog.get_type("PRICE").unwrap();
    assert_eq!(price.base_type, BaseTypeRef::Unresolved { type_code: 3 });
    assert_eq!(price.remarks.as_deref(), Some("money"));

    // Every row source handed out was released: two listings, two type queries.
    assert_eq!(fixture.releases(), 4);

    let json = catalog.to_json().unwrap();
    assert!(json.contains("\"Apache Derby\""));
}
