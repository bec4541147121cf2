//! In-process API tests over the memory store

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use library_catalog_server::{
    api::create_router, models, repository::MemoryStore, services::Services, AppConfig, AppState,
};

fn app() -> Router {
    let store = Arc::new(MemoryStore::new(models::SCHEMAS));
    create_router(AppState::new(AppConfig::default(), Services::new(store)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

async fn seed_readers(app: &Router) -> Vec<Value> {
    let mut readers = Vec::new();
    for (name, email) in [
        ("Elizabeth Bennet", "future_ms_darcy@gmail.com"),
        ("Arya Stark", "vmorgul@me.com"),
        ("Lyra Belacqua", "darknorth123@msn.org"),
    ] {
        let (status, body) = post(
            app,
            "/readers",
            json!({ "name": name, "email": email, "password": "password123" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        readers.push(body);
    }
    readers
}

#[tokio::test]
async fn test_create_author_example() {
    let app = app();
    let (status, created) = post(&app, "/authors", json!({ "author": "J.K. Rowling" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created, json!({ "id": id, "author": "J.K. Rowling" }));

    let (status, fetched) = get(&app, &format!("/authors/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_author_and_genre_names_are_required_and_unique() {
    let app = app();

    let (status, body) = post(&app, "/authors", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "errors": ["We need an author in so that we can create one"] })
    );

    let (status, body) = post(&app, "/genres", json!({ "genre": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "errors": ["We need a genre in so that we can create one"] })
    );

    post(&app, "/genres", json!({ "genre": "Fantasy" })).await;
    let (status, body) = post(&app, "/genres", json!({ "genre": "Fantasy" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "errors": ["genre must be unique"] }));

    let (_, genres) = get(&app, "/genres").await;
    assert_eq!(genres.as_array().unwrap().len(), 1);
    let (_, authors) = get(&app, "/authors").await;
    assert_eq!(authors, json!([]));
}

#[tokio::test]
async fn test_readers_never_expose_passwords() {
    let app = app();
    let readers = seed_readers(&app).await;
    assert!(readers.iter().all(|r| r.get("password").is_none()));

    let (status, list) = get(&app, "/readers").await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 3);
    for reader in list {
        assert!(reader.get("password").is_none());
        let expected = readers.iter().find(|r| r["id"] == reader["id"]).unwrap();
        assert_eq!(reader["name"], expected["name"]);
        assert_eq!(reader["email"], expected["email"]);
    }

    let (status, reader) = get(&app, &format!("/readers/{}", readers[0]["id"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        reader,
        json!({ "id": readers[0]["id"], "name": "Elizabeth Bennet", "email": "future_ms_darcy@gmail.com" })
    );
}

#[tokio::test]
async fn test_reader_rules() {
    let app = app();
    seed_readers(&app).await;

    let (status, body) = post(
        &app,
        "/readers",
        json!({ "name": "Arya Stark", "email": "vmorgul@me.com", "password": "pw" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"],
        json!(["Password must be at least 8 characters", "email must be unique"])
    );

    let (status, body) = post(
        &app,
        "/readers",
        json!({ "name": "Sansa Stark", "email": "not an email", "password": "lemoncakes" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["Invalid email format"]));

    let (_, list) = get(&app, "/readers").await;
    assert_eq!(list.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_patch_reader_email() {
    let app = app();
    let readers = seed_readers(&app).await;
    let uri = format!("/readers/{}", readers[0]["id"]);

    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "email": "miss_e_bennet@gmail.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "miss_e_bennet@gmail.com");
    assert_eq!(body["name"], "Elizabeth Bennet");
    assert!(body.get("password").is_none());

    let (_, fetched) = get(&app, &uri).await;
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn test_unknown_ids_return_404_for_every_resource() {
    let app = app();
    for (resource, entity) in [
        ("readers", "reader"),
        ("books", "book"),
        ("authors", "author"),
        ("genres", "genre"),
    ] {
        let uri = format!("/{}/12345", resource);
        let expected = json!({ "error": format!("The {} could not be found.", entity) });

        assert_eq!(get(&app, &uri).await, (StatusCode::NOT_FOUND, expected.clone()));
        assert_eq!(
            send(&app, "PATCH", &uri, Some(json!({}))).await,
            (StatusCode::NOT_FOUND, expected.clone())
        );
        assert_eq!(
            send(&app, "DELETE", &uri, None).await,
            (StatusCode::NOT_FOUND, expected)
        );
    }
}

#[tokio::test]
async fn test_book_lifecycle() {
    let app = app();
    let (_, author) = post(&app, "/authors", json!({ "author": "David Xiang" })).await;
    let (_, genre) = post(&app, "/genres", json!({ "genre": "Computer" })).await;

    let (status, book) = post(
        &app,
        "/books",
        json!({
            "title": "Software Developer Life",
            "ISBN": "978-1-7323459-0-4",
            "author_id": author["id"],
            "genre_id": genre["id"]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["title"], "Software Developer Life");
    assert_eq!(book["author_id"], author["id"]);

    let uri = format!("/books/{}", book["id"]);
    let (status, updated) =
        send(&app, "PATCH", &uri, Some(json!({ "ISBN": "978-1-473-23106-1B" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["ISBN"], "978-1-473-23106-1B");
    assert_eq!(updated["title"], book["title"]);
    assert_eq!(updated["genre_id"], genre["id"]);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_book_requires_title_and_known_references() {
    let app = app();
    let (status, body) = post(&app, "/books", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);

    let (status, body) = post(&app, "/books", json!({ "title": "Dune", "genre_id": 7 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "errors": ["genre_id must reference an existing genre"] })
    );

    let (_, books) = get(&app, "/books").await;
    assert_eq!(books, json!([]));
}

#[tokio::test]
async fn test_deleting_an_author_detaches_its_books() {
    let app = app();
    let (_, author) = post(&app, "/authors", json!({ "author": "Frank Herbert" })).await;
    let (_, book) = post(
        &app,
        "/books",
        json!({ "title": "Dune", "author_id": author["id"] }),
    )
    .await;

    let (status, _) = send(&app, "DELETE", &format!("/authors/{}", author["id"]), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, book) = get(&app, &format!("/books/{}", book["id"])).await;
    assert_eq!(book["author_id"], Value::Null);
}

#[tokio::test]
async fn test_malformed_body_is_a_bad_request() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/authors")
        .header("content-type", "application/json")
        .body(Body::from("{\"author\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_patch_on_missing_record_is_404_whatever_the_body() {
    let app = app();
    post(&app, "/authors", json!({ "author": "Taken" })).await;
    seed_readers(&app).await;
    let author_missing = json!({ "error": "The author could not be found." });

    for body in [json!({ "author": "" }), json!({ "author": "Taken" })] {
        assert_eq!(
            send(&app, "PATCH", "/authors/999", Some(body)).await,
            (StatusCode::NOT_FOUND, author_missing.clone())
        );
    }
    assert_eq!(
        send(&app, "PATCH", "/readers/999", Some(json!({ "email": "bad" }))).await,
        (
            StatusCode::NOT_FOUND,
            json!({ "error": "The reader could not be found." })
        )
    );
}

#[tokio::test]
async fn test_patch_rules_leave_the_record_unchanged() {
    let app = app();
    let readers = seed_readers(&app).await;
    let uri = format!("/readers/{}", readers[0]["id"]);

    for (body, expected) in [
        (json!({ "email": "bad" }), "Invalid email format"),
        (json!({ "password": "pw" }), "Password must be at least 8 characters"),
        (json!({ "email": "vmorgul@me.com" }), "email must be unique"),
    ] {
        let (status, errors) = send(&app, "PATCH", &uri, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(errors, json!({ "errors": [expected] }));
    }
    assert_eq!(get(&app, &uri).await, (StatusCode::OK, readers[0].clone()));

    let (_, book) = post(&app, "/books", json!({ "title": "Persuasion" })).await;
    let book_uri = format!("/books/{}", book["id"]);
    let (status, _) = send(&app, "PATCH", &book_uri, Some(json!({ "title": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(get(&app, &book_uri).await, (StatusCode::OK, book));
}

#[tokio::test]
async fn test_deleting_a_reader_releases_their_books() {
    let app = app();
    let readers = seed_readers(&app).await;
    let (status, book) = post(
        &app,
        "/books",
        json!({ "title": "Pride and Prejudice", "reader_id": readers[0]["id"] }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["reader_id"], readers[0]["id"]);

    let (status, _) = send(&app, "DELETE", &format!("/readers/{}", readers[0]["id"]), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, book) = get(&app, &format!("/books/{}", book["id"])).await;
    assert_eq!(book["reader_id"], Value::Null);
}
