use super::*;
use crate::pool::StoreConnector;
use serde_json::json;

fn docs() -> Vec<Value> {
    vec![
        json!({ "_id": "a1", "tokenid": 1, "name": "Alien Ape", "character": "Alien", "rarityscore": 12.5, "isvirgin": true, "traits": { "hat": "Bow & Arrow" }, "tags": ["rare", "green"] }),
        json!({ "_id": "a2", "tokenid": 2, "name": "Zombie", "character": "Zombie", "rarityscore": 8.0, "isvirgin": false, "traits": { "hat": "Cap" }, "tags": ["common"] }),
        json!({ "_id": "a3", "tokenid": 3, "name": "Ape Lord", "character": "Ape", "rarityscore": 20, "isvirgin": true }),
        json!({ "_id": "a4", "tokenid": 4, "name": "Robot", "character": "Robot", "isvirgin": false }),
    ]
}

fn filter(value: Value) -> Predicate {
    match value {
        Value::Object(map) => Predicate::from(map),
        other => panic!("not an object: {}", other),
    }
}

fn token_ids(results: &[Value]) -> Vec<i64> {
    results
        .iter()
        .map(|doc| doc["tokenid"].as_i64().unwrap())
        .collect()
}

fn run(filter_value: Value) -> Vec<i64> {
    token_ids(&MemoryStore::execute(
        &docs(),
        &filter(filter_value),
        &FindOptions::default(),
    ))
}

#[test]
fn test_empty_filter_matches_everything() {
    assert_eq!(run(json!({})), vec![1, 2, 3, 4]);
}

#[test]
fn test_literal_equality() {
    assert_eq!(run(json!({ "character": "Ape" })), vec![3]);
    assert_eq!(run(json!({ "isvirgin": true })), vec![1, 3]);
    assert_eq!(run(json!({ "character": "Nobody" })), Vec::<i64>::new());
}

#[test]
fn test_equality_is_type_strict_except_numbers() {
    assert_eq!(run(json!({ "tokenid": "1" })), Vec::<i64>::new());
    assert_eq!(run(json!({ "tokenid": 1.0 })), vec![1]);
}

#[test]
fn test_comparisons() {
    assert_eq!(run(json!({ "rarityscore": { "$gte": 12.5 } })), vec![1, 3]);
    assert_eq!(run(json!({ "rarityscore": { "$gt": 12.5 } })), vec![3]);
    assert_eq!(run(json!({ "rarityscore": { "$lt": 12.5 } })), vec![2]);
    assert_eq!(run(json!({ "rarityscore": { "$lte": 12.5 } })), vec![1, 2]);
    assert_eq!(
        run(json!({ "rarityscore": { "$gte": 8.0, "$lt": 20.0 } })),
        vec![1, 2]
    );
}

#[test]
fn test_missing_field_never_matches_comparison() {
    assert!(!run(json!({ "rarityscore": { "$lt": 100.0 } })).contains(&4));
}

#[test]
fn test_mixed_types_do_not_compare() {
    assert_eq!(run(json!({ "name": { "$gt": 1.0 } })), Vec::<i64>::new());
}

#[test]
fn test_or_and_and() {
    assert_eq!(
        run(json!({ "$or": [{ "character": "Alien" }, { "character": "Robot" }] })),
        vec![1, 4]
    );
    assert_eq!(
        run(json!({ "$and": [{ "isvirgin": true }, { "rarityscore": { "$gt": 15.0 } }] })),
        vec![3]
    );
    assert_eq!(
        run(json!({ "$or": [{ "character": "Alien" }, { "character": "Ape" }], "isvirgin": true })),
        vec![1, 3]
    );
}

#[test]
fn test_in_operator() {
    assert_eq!(run(json!({ "tokenid": { "$in": [2, 4, 9] } })), vec![2, 4]);
    assert_eq!(run(json!({ "tokenid": { "$in": [] } })), Vec::<i64>::new());
}

#[test]
fn test_regex_operator() {
    assert_eq!(
        run(json!({ "name": { "$regex": "ape", "$options": "i" } })),
        vec![1, 3]
    );
    assert_eq!(run(json!({ "name": { "$regex": "ape" } })), Vec::<i64>::new());
    assert_eq!(run(json!({ "name": { "$regex": "(" } })), Vec::<i64>::new());
}

#[test]
fn test_dotted_path_and_arrays() {
    assert_eq!(run(json!({ "traits.hat": "Bow & Arrow" })), vec![1]);
    assert_eq!(run(json!({ "tags": "common" })), vec![2]);
}

#[test]
fn test_unknown_operator_never_matches() {
    assert_eq!(run(json!({ "tokenid": { "$near": 1 } })), Vec::<i64>::new());
}

#[test]
fn test_compiled_filter_executes() {
    let predicate = filter_query::compile("rarityscore_gte_10;isvirgin_eq_true");
    let results = MemoryStore::execute(&docs(), &predicate, &FindOptions::default());
    assert_eq!(token_ids(&results), vec![1, 3]);

    let predicate = filter_query::compile("character_eq_Zombie_Robot");
    let results = MemoryStore::execute(&docs(), &predicate, &FindOptions::default());
    assert_eq!(token_ids(&results), vec![2, 4]);
}

#[test]
fn test_sort_skip_limit() {
    let options = FindOptions {
        limit: Some(2),
        skip: 1,
        sort: vec![SortKey::new("tokenid", SortDirection::Descending)],
        exclude: Vec::new(),
    };
    let results = MemoryStore::execute(&docs(), &Predicate::new(), &options);
    assert_eq!(token_ids(&results), vec![3, 2]);
}

#[test]
fn test_sort_missing_values_first_with_tie_breaker() {
    let options = FindOptions {
        sort: vec![
            SortKey::new("rarityscore", SortDirection::Ascending),
            SortKey::new("tokenid", SortDirection::Ascending),
        ],
        ..Default::default()
    };
    let results = MemoryStore::execute(&docs(), &Predicate::new(), &options);
    assert_eq!(token_ids(&results), vec![4, 2, 1, 3]);

    let options = FindOptions {
        sort: vec![
            SortKey::new("isvirgin", SortDirection::Descending),
            SortKey::new("tokenid", SortDirection::Ascending),
        ],
        ..Default::default()
    };
    let results = MemoryStore::execute(&docs(), &Predicate::new(), &options);
    assert_eq!(token_ids(&results), vec![1, 3, 2, 4]);
}

#[test]
fn test_projection_removes_private_fields() {
    let options = FindOptions {
        exclude: vec!["_id".to_string(), "traits".to_string()],
        ..Default::default()
    };
    let results = MemoryStore::execute(&docs(), &Predicate::new(), &options);
    assert!(results
        .iter()
        .all(|doc| doc.get("_id").is_none() && doc.get("traits").is_none()));
    assert_eq!(results[0]["name"], json!("Alien Ape"));
}

#[tokio::test]
async fn test_find_unknown_collection_is_empty() {
    let store = MemoryStore::new().with_collection("documents", docs());
    let results = store
        .find("missing", &Predicate::new(), &FindOptions::default())
        .await
        .unwrap();
    assert!(results.is_empty());
    assert!(store.ping().await.is_ok());
    assert_eq!(store.name(), "memory");
}

#[test]
fn test_load_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs_err::write(
        dir.path().join("documents.json"),
        serde_json::to_string(&docs()).unwrap(),
    )
    .unwrap();
    fs_err::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let store = MemoryStore::load_dir(dir.path()).unwrap();
    assert_eq!(store.collection_names(), vec!["documents"]);
}

#[test]
fn test_load_dir_rejects_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    fs_err::write(dir.path().join("broken.json"), "{ not json").unwrap();

    let err = MemoryStore::load_dir(dir.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("broken.json"));
}

#[tokio::test]
async fn test_memory_connector_loads_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs_err::write(
        dir.path().join("documents.json"),
        serde_json::to_string(&docs()).unwrap(),
    )
    .unwrap();

    let connector = MemoryConnector::new(dir.path());
    assert!(connector.describe().starts_with("memory:"));
    let store = connector.connect().await.unwrap();
    let results = store
        .find("documents", &Predicate::new(), &FindOptions::default())
        .await
        .unwrap();
    assert_eq!(results.len(), 4);
}
