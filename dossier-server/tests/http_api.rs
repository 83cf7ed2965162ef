//! End-to-end tests driving the router with in-process requests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use dossier_fields::{FieldDefinition, FieldKind, Validators};
use dossier_records::{Directory, DirectoryCatalog, RecordContext, RecordStore};
use dossier_server::app::{build_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use ulid::Ulid;

async fn setup() -> (TempDir, Router) {
    let temp = TempDir::new().unwrap();
    let context = RecordContext::new(temp.path());

    let directory = Directory::new("dir-contacts", "contacts", "Contacts");
    let fields = vec![
        FieldDefinition::new("dir-contacts", "name", FieldKind::Primitive, "text")
            .with_required(true),
        FieldDefinition::new("dir-contacts", "age", FieldKind::Primitive, "number")
            .with_validators(Validators {
                max: Some(150.0),
                ..Validators::default()
            }),
        FieldDefinition::new("dir-contacts", "email", FieldKind::Primitive, "email"),
    ];
    let catalog = DirectoryCatalog::new();
    catalog.register(directory, fields).await.unwrap();

    let state = AppState {
        store: Arc::new(RecordStore::new(context)),
        catalog: Arc::new(catalog),
        app_id: "testapp".to_string(),
    };
    (temp, build_router(state))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_contact(router: &Router, props: Value) -> Value {
    let response = router
        .clone()
        .oneshot(json_request("POST", "/contacts", json!({ "props": props })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (_temp, router) = setup().await;

    let response = router.oneshot(get_request("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn create_returns_201_with_the_transformed_record() {
    let (_temp, router) = setup().await;

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/contacts")
                .header("content-type", "application/json")
                .header("x-user-id", "user-7")
                .body(Body::from(
                    json!({ "props": { "name": "  Ada  ", "age": "30" } }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["name"], json!("Ada"));
    assert_eq!(body["data"]["age"], json!(30));
    assert_eq!(body["data"]["version"], json!(1));
    assert!(Ulid::from_string(body["data"]["id"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn create_validation_failure_is_400_with_per_field_details() {
    let (_temp, router) = setup().await;

    let response = router
        .oneshot(json_request(
            "POST",
            "/contacts",
            json!({ "props": { "age": 200 } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["details"]["name"], json!("该字段为必填项"));
    assert_eq!(body["details"]["age"], json!("数值不能大于150"));
}

#[tokio::test]
async fn unknown_directory_is_404() {
    let (_temp, router) = setup().await;

    let response = router.oneshot(get_request("/nonexistent")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn get_fetches_by_id_and_directory_resolves_by_slug_or_id() {
    let (_temp, router) = setup().await;

    let created = create_contact(&router, json!({ "name": "Grace" })).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let by_slug = router
        .clone()
        .oneshot(get_request(&format!("/contacts/{id}")))
        .await
        .unwrap();
    assert_eq!(by_slug.status(), StatusCode::OK);
    assert_eq!(response_json(by_slug).await["data"]["name"], json!("Grace"));

    // Same record through the directory id instead of the slug.
    let by_id = router
        .clone()
        .oneshot(get_request(&format!("/dir-contacts/{id}")))
        .await
        .unwrap();
    assert_eq!(by_id.status(), StatusCode::OK);

    let missing = router
        .clone()
        .oneshot(get_request(&format!("/contacts/{}", Ulid::new())))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let garbage = router
        .oneshot(get_request("/contacts/not-a-record-id"))
        .await
        .unwrap();
    assert_eq!(garbage.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_merges_submitted_props_and_bumps_version() {
    let (_temp, router) = setup().await;

    let created = create_contact(&router, json!({ "name": "Grace", "age": 30 })).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = router
        .oneshot(json_request(
            "PATCH",
            &format!("/contacts/{id}"),
            json!({ "props": { "age": 31 }, "version": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"]["age"], json!(31));
    assert_eq!(body["data"]["name"], json!("Grace"));
    assert_eq!(body["data"]["version"], json!(2));
}

#[tokio::test]
async fn patch_with_stale_version_is_409() {
    let (_temp, router) = setup().await;

    let created = create_contact(&router, json!({ "name": "Grace" })).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let first = router
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/contacts/{id}"),
            json!({ "props": { "age": 31 }, "version": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let stale = router
        .oneshot(json_request(
            "PATCH",
            &format!("/contacts/{id}"),
            json!({ "props": { "age": 99 }, "version": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(stale.status(), StatusCode::CONFLICT);

    let body = response_json(stale).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn patch_validates_only_the_submitted_keys() {
    let (_temp, router) = setup().await;

    let created = create_contact(&router, json!({ "name": "Grace" })).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    // "name" is required but absent from the patch; that must not fail.
    let response = router
        .oneshot(json_request(
            "PATCH",
            &format!("/contacts/{id}"),
            json!({ "props": { "age": 40 } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn delete_hides_the_record_and_repeat_delete_is_404() {
    let (_temp, router) = setup().await;

    let created = create_contact(&router, json!({ "name": "Grace" })).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let deleted = router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/contacts/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(response_json(deleted).await, json!({ "success": true }));

    let gone = router
        .clone()
        .oneshot(get_request(&format!("/contacts/{id}")))
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    let again = router
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/contacts/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn batch_delete_reports_per_id_outcomes() {
    let (_temp, router) = setup().await;

    let first = create_contact(&router, json!({ "name": "One" })).await;
    let second = create_contact(&router, json!({ "name": "Two" })).await;
    let first_id = first["data"]["id"].as_str().unwrap().to_string();
    let second_id = second["data"]["id"].as_str().unwrap().to_string();

    let response = router
        .oneshot(json_request(
            "DELETE",
            "/contacts/batch",
            json!({ "recordIds": [first_id, second_id, "not-a-record-id"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["deletedCount"], json!(2));
    assert_eq!(body["data"]["failedCount"], json!(1));

    let results = body["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["success"], json!(true));
    assert_eq!(results[2]["success"], json!(false));
    assert!(results[2]["error"].is_string());
}

#[tokio::test]
async fn list_paginates_with_the_envelope() {
    let (_temp, router) = setup().await;

    for n in 0..5 {
        create_contact(&router, json!({ "name": format!("Contact {n}") })).await;
    }

    let response = router
        .clone()
        .oneshot(get_request("/contacts?page=1&limit=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["page"], json!(1));
    assert_eq!(body["pagination"]["limit"], json!(2));
    assert_eq!(body["pagination"]["total"], json!(5));
    assert_eq!(body["pagination"]["totalPages"], json!(3));

    let beyond = router
        .oneshot(get_request("/contacts?page=9&limit=2"))
        .await
        .unwrap();
    let body = response_json(beyond).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    assert_eq!(body["pagination"]["total"], json!(5));
}

#[tokio::test]
async fn list_searches_filters_and_sorts() {
    let (_temp, router) = setup().await;

    create_contact(&router, json!({ "name": "Ada Lovelace", "age": 36 })).await;
    create_contact(&router, json!({ "name": "Grace Hopper", "age": 85 })).await;
    create_contact(&router, json!({ "name": "Alan Turing", "age": 41 })).await;

    let searched = router
        .clone()
        .oneshot(get_request("/contacts?search=lovelace"))
        .await
        .unwrap();
    let body = response_json(searched).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], json!("Ada Lovelace"));

    // filter={"age":85}
    let filtered = router
        .clone()
        .oneshot(get_request("/contacts?filter=%7B%22age%22%3A85%7D"))
        .await
        .unwrap();
    let body = response_json(filtered).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], json!("Grace Hopper"));

    let sorted = router
        .clone()
        .oneshot(get_request("/contacts?sort=age&order=asc"))
        .await
        .unwrap();
    let body = response_json(sorted).await;
    let ages: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["age"].as_i64().unwrap())
        .collect();
    assert_eq!(ages, vec![36, 41, 85]);

    let bad_filter = router
        .oneshot(get_request("/contacts?filter=not-json"))
        .await
        .unwrap();
    assert_eq!(bad_filter.status(), StatusCode::BAD_REQUEST);
}
