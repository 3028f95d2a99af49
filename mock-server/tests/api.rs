use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- health ---

#[tokio::test]
async fn health_reports_ok() {
    let resp = app().oneshot(get_request("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

// --- auth ---

#[tokio::test]
async fn signup_returns_201_with_user() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            r#"{"email":"ada@example.com","password":"pw","name":"Ada"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user = body_json(resp).await;
    assert_eq!(user["id"], 1);
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["name"], "Ada");
}

#[tokio::test]
async fn signup_rejects_empty_password() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            r#"{"email":"ada@example.com","password":""}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Email and password are required");
}

#[tokio::test]
async fn login_unknown_user_is_unauthorized() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            r#"{"email":"ghost@example.com","password":"pw"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn me_without_token_is_unauthorized() {
    let resp = app().oneshot(get_request("/auth/me")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_user_lookup_is_404() {
    let resp = app()
        .oneshot(get_request("/auth/users/ghost@example.com"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "User not found");
}

// --- databases ---

#[tokio::test]
async fn list_databases_empty() {
    let resp = app().oneshot(get_request("/databases")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "databases": [] }));
}

#[tokio::test]
async fn delete_missing_database_is_404_with_error_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/databases/mydb")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "error": "Database not found" }));
}

#[tokio::test]
async fn tables_of_missing_database_is_404() {
    let resp = app()
        .oneshot(get_request("/databases/mydb/tables"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn key_of_missing_database_is_404() {
    let resp = app()
        .oneshot(get_request("/databases/mydb/keys"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full lifecycle ---

#[tokio::test]
async fn account_database_table_record_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // sign up and log in
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/auth/signup",
            r#"{"email":"ada@example.com","password":"pw"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/auth/login",
            r#"{"email":"ada@example.com","password":"pw"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let token = body_json(resp).await["token"].as_str().unwrap().to_string();

    // profile via session token
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .uri("/auth/me")
                .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let me = body_json(resp).await;
    assert_eq!(me["email"], "ada@example.com");

    // database and access key
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/databases", r#"{"name":"mydb"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/databases", r#"{"name":"mydb"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("POST")
                .uri("/databases/mydb/keys")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let key = body_json(resp).await["key"].as_str().unwrap().to_string();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/databases/mydb/keys"))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["key"], key.as_str());

    // table
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/databases/mydb/tables",
            r#"{"name":"people","columns":[{"name":"name","type":"text"},{"name":"age","type":"integer"}]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/databases/mydb/tables"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "tables": ["people"] }));

    // records
    for (name, age) in [("Ada", 36), ("Grace", 45), ("Edsger", 72)] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request(
                "POST",
                "/databases/mydb/tables/people/records",
                &format!(r#"{{"name":"{name}","age":{age}}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // filter
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(
            "/databases/mydb/tables/people/records?name=Grace",
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["age"], 45);

    // sort desc with limit and projection
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(
            "/databases/mydb/tables/people/records?sort=age&order=desc&limit=2&fields=name",
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "Edsger");
    assert_eq!(records[1]["name"], "Grace");
    assert!(records[0].get("age").is_none());
    assert!(records[0].get("id").is_some());

    // update then fetch
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PATCH",
            "/databases/mydb/tables/people/records/1",
            r#"{"age":37}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["name"], "Ada");
    assert_eq!(updated["age"], 37);

    // delete record then confirm 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri("/databases/mydb/tables/people/records/1")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let body = body_bytes(resp).await;
    assert!(body.is_empty());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/databases/mydb/tables/people/records/1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // drop the database and confirm tables are gone with it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri("/databases/mydb")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/databases/mydb/tables"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
