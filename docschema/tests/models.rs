use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use docschema::{
    document,
    memory::InMemoryAdapter,
    prelude::*,
    serde_json::json,
};
use serde::{Deserialize, Serialize};

fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

fn posts_schema() -> SchemaDescriptor {
    SchemaDescriptor::from_json(json!({
        "title": "string",
        "views": { "type": "number", "required": true },
        "status": { "type": "string", "default": "draft" },
        "tags": "array",
        "publishedAt": { "type": "date", "nullable": true },
        "author": { "type": "string", "ref": "users" },
    }))
    .unwrap()
}

fn registry(adapter: InMemoryAdapter) -> Registry<InMemoryAdapter> {
    Registry::builder()
        .adapter(adapter)
        .build()
        .unwrap()
}

#[tokio::test]
async fn omitted_required_field_is_rejected() {
    init_logger();
    let adapter = InMemoryAdapter::new();
    let posts = registry(adapter.clone())
        .model("post", posts_schema())
        .unwrap();

    let err = posts
        .add(document! { "title" => "hi" }, None)
        .await
        .unwrap_err();

    assert_eq!(err, ModelError::Validation("views is required.".to_string()));
    assert_eq!(adapter.len("posts").await, 0);
}

#[tokio::test]
async fn legacy_policy_lets_omitted_required_fields_through() {
    init_logger();
    let adapter = InMemoryAdapter::new();
    let registry = Registry::builder()
        .adapter(adapter.clone())
        .options(ModelOptions {
            missing_required: MissingRequired::Ignore,
            ..ModelOptions::default()
        })
        .build()
        .unwrap();
    let posts = registry
        .model("post", posts_schema())
        .unwrap();

    let id = posts
        .add(document! { "title" => "hi" }, None)
        .await
        .unwrap();

    assert_eq!(
        posts.get_one(&id).await.unwrap().fields,
        document! { "title" => "hi", "status" => "draft" }
    );
}

#[tokio::test]
async fn unknown_fields_are_rejected() {
    init_logger();
    let schema = SchemaDescriptor::from_json(json!({ "title": "string" })).unwrap();
    let posts = registry(InMemoryAdapter::new())
        .model("post", schema)
        .unwrap();

    let err = posts
        .add(document! { "title" => "hi", "extra" => 1 }, None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Field not found in schema.");
}

#[tokio::test]
async fn json_queries_filter_and_sort() {
    init_logger();
    let posts = registry(InMemoryAdapter::new())
        .model("post", posts_schema())
        .unwrap();

    for (id, views, created) in [("a", 5, 1), ("b", 20, 2), ("c", 50, 3), ("d", 15, 4)] {
        let data = document_from_json(json!({
            "title": id,
            "views": views,
            "publishedAt": { "$date": format!("2024-01-0{created}T00:00:00Z") },
        }))
        .unwrap();
        posts.add(data, Some(id)).await.unwrap();
    }

    let query = Query::from_json(json!([
        { "views": { "condition": "gt", "value": 10 } },
        { "publishedAt": -1 },
    ]))
    .unwrap();

    assert_eq!(
        query.translate().unwrap(),
        vec![
            Constraint::where_("views", Operator::Gt, 10),
            Constraint::order_by("publishedAt", SortDirection::Desc),
        ]
    );

    let found = posts.get(query).await.unwrap();
    let ids: Vec<&str> = found.iter().map(|doc| doc.id.as_str()).collect();

    assert_eq!(ids, vec!["d", "c", "b"]);
}

#[tokio::test]
async fn missing_documents_are_not_found() {
    init_logger();
    let posts = registry(InMemoryAdapter::new())
        .model("post", posts_schema())
        .unwrap();

    let err = posts.get_one("missing-id").await.unwrap_err();

    assert_eq!(err, ModelError::NotFound("missing-id".to_string(), "posts".to_string()));
}

#[tokio::test]
async fn crud_lifecycle() {
    init_logger();
    let posts = registry(InMemoryAdapter::new())
        .model("post", posts_schema())
        .unwrap();

    // "tags" is declared with a type token the validator does not support
    let err = posts
        .add(document! { "title" => "hi", "views" => 1, "tags" => vec!["rust"] }, None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Unsupported type array and/or field tags.");

    let id = posts
        .add(document! { "title" => "hi", "views" => 1 }, None)
        .await
        .unwrap();

    posts
        .edit(document! { "views" => 2, "publishedAt" => Value::Null }, &id)
        .await
        .unwrap();

    let stored = posts.get_one(&id).await.unwrap();
    assert_eq!(stored.get("views"), Some(&Value::Number(2.0)));
    assert_eq!(stored.get("status"), Some(&Value::from("draft")));
    assert!(stored.get("publishedAt").is_some_and(Value::is_null));

    let err = posts
        .edit(document! { "views" => "many" }, &id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "views should be type of Number.");

    posts.delete(&id).await.unwrap();
    posts.delete(&id).await.unwrap();

    assert!(posts.get_one(&id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn explicit_ids_overwrite() {
    init_logger();
    let posts = registry(InMemoryAdapter::new())
        .model("post", posts_schema())
        .unwrap();

    posts
        .add(document! { "title" => "first", "views" => 1 }, Some("p1"))
        .await
        .unwrap();
    posts
        .add(document! { "title" => "second", "views" => 2 }, Some("p1"))
        .await
        .unwrap();

    let all = posts.get(Query::new()).await.unwrap();

    assert_eq!(all.len(), 1);
    assert_eq!(all[0].get("title"), Some(&Value::from("second")));
}

#[tokio::test]
async fn typed_documents_round_trip() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Post {
        #[serde(skip_serializing)]
        id: String,
        title: String,
        views: u32,
        #[serde(with = "docschema::value::extended_date")]
        published_at: DateTime<Utc>,
    }

    init_logger();
    let schema = SchemaDescriptor::builder()
        .field("title", FieldType::String)
        .field("views", FieldSpec::new(FieldType::Number).required())
        .field("publishedAt", FieldType::Date)
        .build();
    let posts = registry(InMemoryAdapter::new())
        .model("post", schema)
        .unwrap();
    let published_at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();

    let id = posts
        .add_typed(
            &Post {
                id: String::new(),
                title: "typed".to_string(),
                views: 3,
                published_at,
            },
            None,
        )
        .await
        .unwrap();

    let post: Post = posts.get_one_typed(&id).await.unwrap();
    let listed: Vec<Post> = posts
        .get_typed(Query::builder().filter(Filter::equals("title", "typed")).build())
        .await
        .unwrap();

    assert_eq!(post.id, id);
    assert_eq!(post.published_at, published_at);
    assert_eq!(listed, vec![post]);
}

#[tokio::test]
async fn models_share_one_adapter_and_schema() {
    init_logger();
    let adapter = InMemoryAdapter::new();
    let registry = registry(adapter.clone());
    let schema = Arc::new(posts_schema());

    let first = registry.model("post", Arc::clone(&schema)).unwrap();
    let second = registry.model("post", Arc::clone(&schema)).unwrap();
    let people = registry.model("person", Arc::clone(&schema)).unwrap();

    first
        .add(document! { "views" => 1 }, Some("p1"))
        .await
        .unwrap();

    assert!(second.get_one("p1").await.is_ok());
    assert!(people.get_one("p1").await.unwrap_err().is_not_found());
    assert_eq!(adapter.collections().await, vec!["posts".to_string()]);
}

#[tokio::test]
async fn registration_needs_a_name_and_schema() {
    let registry = registry(InMemoryAdapter::new());

    assert_eq!(
        registry.model("", posts_schema()).unwrap_err(),
        ModelError::Configuration("Model name is required".to_string())
    );
    assert_eq!(
        registry.register("post", None).unwrap_err(),
        ModelError::Configuration("Schema is required".to_string())
    );
}

#[tokio::test]
async fn dyn_adapters_work_through_the_registry() {
    init_logger();
    let adapter: SharedAdapter = Arc::new(InMemoryAdapter::new());
    let registry = Registry::builder()
        .shared_adapter(adapter)
        .build()
        .unwrap();
    let tags = registry
        .model("tag", SchemaDescriptor::builder().field("name", FieldType::String).build())
        .unwrap();

    tags.add(document! { "name" => "rust" }, Some("t1"))
        .await
        .unwrap();

    assert_eq!(tags.get_one("t1").await.unwrap().get("name"), Some(&Value::from("rust")));
}
