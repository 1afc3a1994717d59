//! End-to-end scenarios exercising `IndexDirectory` and `QueryPlanner`
//! through the public facade, one per concrete case named in SPEC_FULL.md.

use ahash::AHashMap;
use facetdex::{
    AvlPredicate, BkdPredicate, DirectoryConfig, DocumentId, FlatPredicate, IndexDirectory,
    InsertOptions, InternalIdStore, Predicate, QueryPlanner, RadixPredicate, Schema,
    SearchableType, SequentialIdStore, Value, WhitespaceTokenizer,
};
use facetdex::geo::{DistanceUnit, GeoPoint};
use facetdex::index::flat::FlatOp;

#[test]
fn s1_avl_range() {
    let schema = Schema::new().with_field("age", SearchableType::Number);
    let mut store = SequentialIdStore::new();
    let mut dir = IndexDirectory::create(&schema, &store, DirectoryConfig::default()).unwrap();

    for (doc, age) in [("1", 10.0), ("2", 20.0), ("3", 30.0), ("4", 40.0)] {
        let id = store.intern(DocumentId::from(doc));
        dir.insert(
            "age",
            DocumentId::from(doc),
            id,
            Value::Number(age),
            None,
            &WhitespaceTokenizer,
            1,
            InsertOptions::default(),
        )
        .unwrap();
    }

    let filters = vec![("age".to_string(), Predicate::Avl(AvlPredicate::Between(15.0, 35.0)))];
    let result = QueryPlanner::search_by_where_clause(&dir, &filters, &WhitespaceTokenizer, None).unwrap();
    let mut ids: Vec<u32> = result.iter().collect();
    ids.sort();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn s2_radix_exact_vs_fuzzy() {
    let schema = Schema::new().with_field("title", SearchableType::String);
    let mut store = SequentialIdStore::new();
    let mut dir = IndexDirectory::create(&schema, &store, DirectoryConfig::default()).unwrap();

    let id1 = store.intern(DocumentId::from("1"));
    dir.insert(
        "title",
        DocumentId::from("1"),
        id1,
        Value::Text("hello world".into()),
        None,
        &WhitespaceTokenizer,
        1,
        InsertOptions::default(),
    )
    .unwrap();
    let id2 = store.intern(DocumentId::from("2"));
    dir.insert(
        "title",
        DocumentId::from("2"),
        id2,
        Value::Text("help".into()),
        None,
        &WhitespaceTokenizer,
        2,
        InsertOptions::default(),
    )
    .unwrap();

    let boost = AHashMap::default();
    let fuzzy = QueryPlanner::search(
        &dir,
        "helo",
        &WhitespaceTokenizer,
        None,
        &["title".to_string()],
        false,
        1,
        &boost,
    )
    .unwrap();
    assert_eq!(fuzzy.len(), 2);
    assert!(fuzzy.iter().all(|(_, score)| *score > 0.0));

    let exact = QueryPlanner::search(
        &dir,
        "helo",
        &WhitespaceTokenizer,
        None,
        &["title".to_string()],
        true,
        0,
        &boost,
    )
    .unwrap();
    assert!(exact.is_empty());
}

#[test]
fn s3_flat_enum_intersection() {
    let schema = Schema::new()
        .with_field("color", SearchableType::Enum)
        .with_field("size", SearchableType::Enum);
    let mut store = SequentialIdStore::new();
    let mut dir = IndexDirectory::create(&schema, &store, DirectoryConfig::default()).unwrap();

    for (doc, color, size) in [("1", "red", "M"), ("2", "red", "L"), ("3", "blue", "M")] {
        let id = store.intern(DocumentId::from(doc));
        dir.insert(
            "color",
            DocumentId::from(doc),
            id,
            Value::Enum(color.into()),
            None,
            &WhitespaceTokenizer,
            1,
            InsertOptions::default(),
        )
        .unwrap();
        dir.insert(
            "size",
            DocumentId::from(doc),
            id,
            Value::Enum(size.into()),
            None,
            &WhitespaceTokenizer,
            1,
            InsertOptions::default(),
        )
        .unwrap();
    }

    let filters = vec![
        ("color".to_string(), Predicate::Flat(FlatPredicate::Scalar(FlatOp::Eq("red".into())))),
        ("size".to_string(), Predicate::Flat(FlatPredicate::Scalar(FlatOp::Eq("M".into())))),
    ];
    let result = QueryPlanner::search_by_where_clause(&dir, &filters, &WhitespaceTokenizer, None).unwrap();
    assert_eq!(result.iter().collect::<Vec<u32>>(), vec![0]);
}

#[test]
fn s4_geo_radius() {
    let schema = Schema::new().with_field("loc", SearchableType::GeoPoint);
    let mut store = SequentialIdStore::new();
    let mut dir = IndexDirectory::create(&schema, &store, DirectoryConfig::default()).unwrap();

    for (doc, lat, lon) in [("1", 45.0, 9.0), ("2", 45.001, 9.001), ("3", 46.0, 10.0)] {
        let id = store.intern(DocumentId::from(doc));
        dir.insert(
            "loc",
            DocumentId::from(doc),
            id,
            Value::GeoPoint(GeoPoint::new(lat, lon)),
            None,
            &WhitespaceTokenizer,
            1,
            InsertOptions::default(),
        )
        .unwrap();
    }

    let filters = vec![(
        "loc".to_string(),
        Predicate::Bkd(BkdPredicate::Radius {
            coordinates: GeoPoint::new(45.0, 9.0),
            value: 200.0,
            unit: DistanceUnit::Meters,
            inside: true,
            high_precision: true,
        }),
    )];
    let result = QueryPlanner::search_by_where_clause(&dir, &filters, &WhitespaceTokenizer, None).unwrap();
    let mut ids: Vec<u32> = result.iter().collect();
    ids.sort();
    assert_eq!(ids, vec![0, 1]);
}

#[test]
fn s5_array_of_numbers_then_removal() {
    let schema = Schema::new().with_field("tags", SearchableType::NumberArray);
    let mut store = SequentialIdStore::new();
    let mut dir = IndexDirectory::create(&schema, &store, DirectoryConfig::default()).unwrap();

    let id1 = store.intern(DocumentId::from("1"));
    dir.insert(
        "tags",
        DocumentId::from("1"),
        id1,
        Value::NumberArray(vec![1.0, 2.0, 3.0]),
        None,
        &WhitespaceTokenizer,
        1,
        InsertOptions::default(),
    )
    .unwrap();
    let id2 = store.intern(DocumentId::from("2"));
    dir.insert(
        "tags",
        DocumentId::from("2"),
        id2,
        Value::NumberArray(vec![3.0, 4.0]),
        None,
        &WhitespaceTokenizer,
        1,
        InsertOptions::default(),
    )
    .unwrap();

    let filters = vec![("tags".to_string(), Predicate::Avl(AvlPredicate::Eq(3.0)))];
    let result = QueryPlanner::search_by_where_clause(&dir, &filters, &WhitespaceTokenizer, None).unwrap();
    let mut ids: Vec<u32> = result.iter().collect();
    ids.sort();
    assert_eq!(ids, vec![0, 1]);

    dir.remove(
        "tags",
        &DocumentId::from("1"),
        Value::NumberArray(vec![1.0, 2.0, 3.0]),
        None,
        &WhitespaceTokenizer,
    )
    .unwrap();

    let result = QueryPlanner::search_by_where_clause(&dir, &filters, &WhitespaceTokenizer, None).unwrap();
    assert_eq!(result.iter().collect::<Vec<u32>>(), vec![1]);
}

#[test]
fn s6_save_load_parity() {
    let schema = Schema::new()
        .with_field("title", SearchableType::String)
        .with_field("age", SearchableType::Number)
        .with_field("color", SearchableType::Enum)
        .with_field("loc", SearchableType::GeoPoint)
        .with_field("active", SearchableType::Boolean)
        .with_field("embedding", SearchableType::Vector(4));

    let mut store = SequentialIdStore::new();
    let mut dir = IndexDirectory::create(&schema, &store, DirectoryConfig::default()).unwrap();

    let id = store.intern(DocumentId::from("1"));
    dir.insert(
        "title",
        DocumentId::from("1"),
        id,
        Value::Text("hello world".into()),
        None,
        &WhitespaceTokenizer,
        1,
        InsertOptions::default(),
    )
    .unwrap();
    dir.insert(
        "age",
        DocumentId::from("1"),
        id,
        Value::Number(25.0),
        None,
        &WhitespaceTokenizer,
        1,
        InsertOptions::default(),
    )
    .unwrap();
    dir.insert(
        "color",
        DocumentId::from("1"),
        id,
        Value::Enum("red".into()),
        None,
        &WhitespaceTokenizer,
        1,
        InsertOptions::default(),
    )
    .unwrap();
    dir.insert(
        "loc",
        DocumentId::from("1"),
        id,
        Value::GeoPoint(GeoPoint::new(45.0, 9.0)),
        None,
        &WhitespaceTokenizer,
        1,
        InsertOptions::default(),
    )
    .unwrap();
    dir.insert(
        "active",
        DocumentId::from("1"),
        id,
        Value::Boolean(true),
        None,
        &WhitespaceTokenizer,
        1,
        InsertOptions::default(),
    )
    .unwrap();
    dir.insert(
        "embedding",
        DocumentId::from("1"),
        id,
        Value::Vector(vec![1.0, 0.0, 0.0, 0.0]),
        None,
        &WhitespaceTokenizer,
        1,
        InsertOptions::default(),
    )
    .unwrap();

    let json = serde_json::to_string(&dir.save()).unwrap();
    let record = serde_json::from_str(&json).unwrap();
    let reloaded = IndexDirectory::load(&store, record);

    let boost = AHashMap::default();
    let original_search = QueryPlanner::search(&dir, "hello", &WhitespaceTokenizer, None, &["title".to_string()], false, 0, &boost).unwrap();
    let reloaded_search = QueryPlanner::search(&reloaded, "hello", &WhitespaceTokenizer, None, &["title".to_string()], false, 0, &boost).unwrap();
    assert_eq!(original_search, reloaded_search);

    let filters = vec![
        ("age".to_string(), Predicate::Avl(AvlPredicate::Gte(20.0))),
        ("color".to_string(), Predicate::Flat(FlatPredicate::Scalar(FlatOp::Eq("red".into())))),
    ];
    let original_filter = QueryPlanner::search_by_where_clause(&dir, &filters, &WhitespaceTokenizer, None).unwrap();
    let reloaded_filter = QueryPlanner::search_by_where_clause(&reloaded, &filters, &WhitespaceTokenizer, None).unwrap();
    assert_eq!(original_filter, reloaded_filter);

    let radix_filters = vec![("title".to_string(), Predicate::Radix(RadixPredicate::Term("hello".into())))];
    let original_radix = QueryPlanner::search_by_where_clause(&dir, &radix_filters, &WhitespaceTokenizer, None).unwrap();
    let reloaded_radix = QueryPlanner::search_by_where_clause(&reloaded, &radix_filters, &WhitespaceTokenizer, None).unwrap();
    assert_eq!(original_radix, reloaded_radix);

    assert_eq!(reloaded.searchable_properties(), dir.searchable_properties());
}
