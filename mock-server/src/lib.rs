//! In-memory Strata backend used by handler tests and the client's
//! integration tests.
//!
//! Implements the full surface the client talks to: accounts and sessions,
//! databases with access keys, table schemas, and records with filtering,
//! sorting, pagination, and field selection. Error responses carry the wire
//! shape `{"error": string, "details"?: string|object}`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug)]
struct Account {
    user: User,
    password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

#[derive(Debug, Default)]
struct Table {
    columns: Vec<Column>,
    next_record_id: u64,
    records: BTreeMap<u64, Map<String, Value>>,
}

#[derive(Debug, Default)]
struct Database {
    access_key: Option<String>,
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Default)]
struct AppState {
    next_user_id: u64,
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, String>,
    databases: BTreeMap<String, Database>,
}

pub type Db = Arc<RwLock<AppState>>;

/// Error response in the backend's wire shape.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

struct ApiFailure {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiFailure {
    fn new(status: StatusCode, error: impl Into<String>) -> ApiFailure {
        ApiFailure {
            status,
            body: ErrorBody {
                error: error.into(),
                details: None,
            },
        }
    }

    fn with_details(mut self, details: Value) -> ApiFailure {
        self.body.details = Some(details);
        self
    }

    fn bad_request(error: impl Into<String>) -> ApiFailure {
        ApiFailure::new(StatusCode::BAD_REQUEST, error)
    }

    fn unauthorized(error: impl Into<String>) -> ApiFailure {
        ApiFailure::new(StatusCode::UNAUTHORIZED, error)
    }

    fn not_found(error: impl Into<String>) -> ApiFailure {
        ApiFailure::new(StatusCode::NOT_FOUND, error)
    }

    fn conflict(error: impl Into<String>) -> ApiFailure {
        ApiFailure::new(StatusCode::CONFLICT, error)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(AppState::default()));
    Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me).put(update_me))
        .route("/auth/users/{ident}", get(lookup_user))
        .route("/databases", get(list_databases).post(create_database))
        .route("/databases/{db}", delete(delete_database))
        .route(
            "/databases/{db}/keys",
            post(create_key).get(get_key).delete(delete_key),
        )
        .route(
            "/databases/{db}/tables",
            get(list_tables).post(create_table),
        )
        .route(
            "/databases/{db}/tables/{table}",
            get(get_table).delete(delete_table),
        )
        .route(
            "/databases/{db}/tables/{table}/records",
            get(list_records).post(create_record),
        )
        .route(
            "/databases/{db}/tables/{table}/records/{id}",
            get(get_record).patch(update_record).delete(delete_record),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Extract the credential from `Authorization: Bearer <t>` or
/// `Authorization: ApiKey <t>`.
fn credential(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("ApiKey "))?;
    (!token.is_empty()).then(|| token.to_string())
}

async fn session_email(db: &Db, headers: &HeaderMap) -> Result<String, ApiFailure> {
    let token =
        credential(headers).ok_or_else(|| ApiFailure::unauthorized("Missing credentials"))?;
    let state = db.read().await;
    state
        .sessions
        .get(&token)
        .cloned()
        .ok_or_else(|| ApiFailure::unauthorized("Invalid or expired token"))
}

// --- auth ---

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Deserialize)]
struct SignupInput {
    email: String,
    password: String,
    name: Option<String>,
}

async fn signup(
    State(db): State<Db>,
    Json(input): Json<SignupInput>,
) -> Result<(StatusCode, Json<User>), ApiFailure> {
    if input.email.trim().is_empty() || input.password.is_empty() {
        return Err(ApiFailure::bad_request("Email and password are required"));
    }
    let mut state = db.write().await;
    if state.accounts.contains_key(&input.email) {
        return Err(ApiFailure::conflict("User already exists"));
    }
    state.next_user_id += 1;
    let user = User {
        id: state.next_user_id,
        email: input.email.clone(),
        name: input.name,
    };
    state.accounts.insert(
        input.email,
        Account {
            user: user.clone(),
            password: input.password,
        },
    );
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Deserialize)]
struct LoginInput {
    email: String,
    password: String,
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginInput>,
) -> Result<Json<Value>, ApiFailure> {
    let mut state = db.write().await;
    let account = state
        .accounts
        .get(&input.email)
        .filter(|account| account.password == input.password)
        .cloned()
        .ok_or_else(|| ApiFailure::unauthorized("Invalid credentials"))?;
    let token = Uuid::new_v4().to_string();
    state.sessions.insert(token.clone(), account.user.email);
    Ok(Json(serde_json::json!({ "token": token })))
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Result<Json<User>, ApiFailure> {
    let email = session_email(&db, &headers).await?;
    let state = db.read().await;
    let account = state
        .accounts
        .get(&email)
        .ok_or_else(|| ApiFailure::not_found("User not found"))?;
    Ok(Json(account.user.clone()))
}

#[derive(Deserialize)]
struct UserUpdateInput {
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
}

async fn update_me(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<UserUpdateInput>,
) -> Result<Json<User>, ApiFailure> {
    let email = session_email(&db, &headers).await?;
    let mut state = db.write().await;
    let mut account = state
        .accounts
        .remove(&email)
        .ok_or_else(|| ApiFailure::not_found("User not found"))?;
    if let Some(new_email) = input.email {
        account.user.email = new_email;
    }
    if let Some(password) = input.password {
        account.password = password;
    }
    if let Some(name) = input.name {
        account.user.name = Some(name);
    }
    let user = account.user.clone();
    let new_email = account.user.email.clone();
    state.accounts.insert(new_email.clone(), account);
    // Sessions follow the account rename.
    for owner in state.sessions.values_mut() {
        if *owner == email {
            *owner = new_email.clone();
        }
    }
    Ok(Json(user))
}

async fn lookup_user(
    State(db): State<Db>,
    Path(ident): Path<String>,
) -> Result<Json<User>, ApiFailure> {
    let state = db.read().await;
    let by_email = state.accounts.get(&ident).map(|a| a.user.clone());
    let user = by_email
        .or_else(|| {
            ident.parse::<u64>().ok().and_then(|id| {
                state
                    .accounts
                    .values()
                    .find(|a| a.user.id == id)
                    .map(|a| a.user.clone())
            })
        })
        .ok_or_else(|| ApiFailure::not_found("User not found"))?;
    Ok(Json(user))
}

// --- databases ---

async fn list_databases(State(db): State<Db>) -> Json<Value> {
    let state = db.read().await;
    let names: Vec<&String> = state.databases.keys().collect();
    Json(serde_json::json!({ "databases": names }))
}

#[derive(Deserialize)]
struct CreateDatabaseInput {
    name: String,
}

async fn create_database(
    State(db): State<Db>,
    Json(input): Json<CreateDatabaseInput>,
) -> Result<(StatusCode, Json<Value>), ApiFailure> {
    if input.name.trim().is_empty() {
        return Err(ApiFailure::bad_request("Database name must not be empty"));
    }
    let mut state = db.write().await;
    if state.databases.contains_key(&input.name) {
        return Err(ApiFailure::conflict("Database already exists"));
    }
    state
        .databases
        .insert(input.name.clone(), Database::default());
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "name": input.name })),
    ))
}

async fn delete_database(
    State(db): State<Db>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    let mut state = db.write().await;
    state
        .databases
        .remove(&name)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| ApiFailure::not_found("Database not found"))
}

// --- access keys ---

async fn create_key(
    State(db): State<Db>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<Value>), ApiFailure> {
    let mut state = db.write().await;
    let database = state
        .databases
        .get_mut(&name)
        .ok_or_else(|| ApiFailure::not_found("Database not found"))?;
    let key = Uuid::new_v4().to_string();
    database.access_key = Some(key.clone());
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "key": key }))))
}

async fn get_key(
    State(db): State<Db>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiFailure> {
    let state = db.read().await;
    let database = state
        .databases
        .get(&name)
        .ok_or_else(|| ApiFailure::not_found("Database not found"))?;
    let key = database
        .access_key
        .as_ref()
        .ok_or_else(|| ApiFailure::not_found("Access key not found"))?;
    Ok(Json(serde_json::json!({ "key": key })))
}

async fn delete_key(
    State(db): State<Db>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    let mut state = db.write().await;
    let database = state
        .databases
        .get_mut(&name)
        .ok_or_else(|| ApiFailure::not_found("Database not found"))?;
    database
        .access_key
        .take()
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| ApiFailure::not_found("Access key not found"))
}

// --- tables ---

async fn list_tables(
    State(db): State<Db>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiFailure> {
    let state = db.read().await;
    let database = state
        .databases
        .get(&name)
        .ok_or_else(|| ApiFailure::not_found("Database not found"))?;
    let tables: Vec<&String> = database.tables.keys().collect();
    Ok(Json(serde_json::json!({ "tables": tables })))
}

#[derive(Deserialize)]
struct CreateTableInput {
    name: String,
    columns: Vec<Column>,
}

async fn create_table(
    State(db): State<Db>,
    Path(db_name): Path<String>,
    Json(input): Json<CreateTableInput>,
) -> Result<(StatusCode, Json<Value>), ApiFailure> {
    if input.name.trim().is_empty() {
        return Err(ApiFailure::bad_request("Table name must not be empty"));
    }
    if input.columns.is_empty() {
        return Err(
            ApiFailure::bad_request("Table must have at least one column")
                .with_details(serde_json::json!({ "table": input.name })),
        );
    }
    let mut state = db.write().await;
    let database = state
        .databases
        .get_mut(&db_name)
        .ok_or_else(|| ApiFailure::not_found("Database not found"))?;
    if database.tables.contains_key(&input.name) {
        return Err(ApiFailure::conflict("Table already exists"));
    }
    database.tables.insert(
        input.name.clone(),
        Table {
            columns: input.columns.clone(),
            ..Table::default()
        },
    );
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "name": input.name, "columns": input.columns })),
    ))
}

async fn get_table(
    State(db): State<Db>,
    Path((db_name, table_name)): Path<(String, String)>,
) -> Result<Json<Value>, ApiFailure> {
    let state = db.read().await;
    let table = find_table(&state, &db_name, &table_name)?;
    Ok(Json(
        serde_json::json!({ "name": table_name, "columns": table.columns }),
    ))
}

async fn delete_table(
    State(db): State<Db>,
    Path((db_name, table_name)): Path<(String, String)>,
) -> Result<StatusCode, ApiFailure> {
    let mut state = db.write().await;
    let database = state
        .databases
        .get_mut(&db_name)
        .ok_or_else(|| ApiFailure::not_found("Database not found"))?;
    database
        .tables
        .remove(&table_name)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| ApiFailure::not_found("Table not found"))
}

fn find_table<'a>(
    state: &'a AppState,
    db_name: &str,
    table_name: &str,
) -> Result<&'a Table, ApiFailure> {
    let database = state
        .databases
        .get(db_name)
        .ok_or_else(|| ApiFailure::not_found("Database not found"))?;
    database
        .tables
        .get(table_name)
        .ok_or_else(|| ApiFailure::not_found("Table not found"))
}

fn find_table_mut<'a>(
    state: &'a mut AppState,
    db_name: &str,
    table_name: &str,
) -> Result<&'a mut Table, ApiFailure> {
    let database = state
        .databases
        .get_mut(db_name)
        .ok_or_else(|| ApiFailure::not_found("Database not found"))?;
    database
        .tables
        .get_mut(table_name)
        .ok_or_else(|| ApiFailure::not_found("Table not found"))
}

// --- records ---

async fn create_record(
    State(db): State<Db>,
    Path((db_name, table_name)): Path<(String, String)>,
    Json(fields): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Value>), ApiFailure> {
    if fields.is_empty() {
        return Err(ApiFailure::bad_request("Record must not be empty"));
    }
    let mut state = db.write().await;
    let table = find_table_mut(&mut state, &db_name, &table_name)?;
    table.next_record_id += 1;
    let id = table.next_record_id;
    let mut record = fields;
    record.insert("id".to_string(), Value::from(id));
    table.records.insert(id, record.clone());
    Ok((StatusCode::CREATED, Json(Value::Object(record))))
}

const RESERVED_PARAMS: [&str; 5] = ["limit", "offset", "sort", "order", "fields"];

async fn list_records(
    State(db): State<Db>,
    Path((db_name, table_name)): Path<(String, String)>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiFailure> {
    let state = db.read().await;
    let table = find_table(&state, &db_name, &table_name)?;

    let filters: Vec<&(String, String)> = params
        .iter()
        .filter(|(key, _)| !RESERVED_PARAMS.contains(&key.as_str()))
        .collect();
    let param = |name: &str| {
        params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    };

    let mut records: Vec<Map<String, Value>> = table
        .records
        .values()
        .filter(|record| {
            filters.iter().all(|(column, needle)| {
                record
                    .get(column)
                    .is_some_and(|value| value_matches(value, needle))
            })
        })
        .cloned()
        .collect();

    if let Some(column) = param("sort") {
        records.sort_by(|a, b| value_cmp(a.get(column), b.get(column)));
        if param("order") == Some("desc") {
            records.reverse();
        }
    }

    let offset = param("offset")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let limit = param("limit")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    let selected: Vec<&str> = param("fields")
        .map(|v| v.split(',').collect())
        .unwrap_or_default();

    let page: Vec<Map<String, Value>> = records
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|record| project(record, &selected))
        .collect();
    Ok(Json(serde_json::json!({ "records": page })))
}

/// Keep only the selected fields; `id` always survives projection.
fn project(record: Map<String, Value>, selected: &[&str]) -> Map<String, Value> {
    if selected.is_empty() {
        return record;
    }
    record
        .into_iter()
        .filter(|(key, _)| key == "id" || selected.contains(&key.as_str()))
        .collect()
}

fn value_matches(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s == needle,
        Value::Number(n) => n.to_string() == needle,
        Value::Bool(b) => b.to_string() == needle,
        _ => false,
    }
}

fn value_cmp(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .zip(y.as_f64())
            .map(|(x, y)| x.partial_cmp(&y).unwrap_or(Ordering::Equal))
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

async fn get_record(
    State(db): State<Db>,
    Path((db_name, table_name, id)): Path<(String, String, u64)>,
) -> Result<Json<Value>, ApiFailure> {
    let state = db.read().await;
    let table = find_table(&state, &db_name, &table_name)?;
    let record = table
        .records
        .get(&id)
        .ok_or_else(|| ApiFailure::not_found("Record not found"))?;
    Ok(Json(Value::Object(record.clone())))
}

async fn update_record(
    State(db): State<Db>,
    Path((db_name, table_name, id)): Path<(String, String, u64)>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiFailure> {
    let mut state = db.write().await;
    let table = find_table_mut(&mut state, &db_name, &table_name)?;
    let record = table
        .records
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found("Record not found"))?;
    for (key, value) in patch {
        if key == "id" {
            continue;
        }
        record.insert(key, value);
    }
    Ok(Json(Value::Object(record.clone())))
}

async fn delete_record(
    State(db): State<Db>,
    Path((db_name, table_name, id)): Path<(String, String, u64)>,
) -> Result<StatusCode, ApiFailure> {
    let mut state = db.write().await;
    let table = find_table_mut(&mut state, &db_name, &table_name)?;
    table
        .records
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| ApiFailure::not_found("Record not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_skips_absent_details() {
        let body = ErrorBody {
            error: "Database not found".to_string(),
            details: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Database not found" }));
    }

    #[test]
    fn error_body_keeps_details() {
        let body = ErrorBody {
            error: "bad".to_string(),
            details: Some(serde_json::json!({ "column": "age" })),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["details"]["column"], "age");
    }

    #[test]
    fn value_matches_compares_scalars_as_strings() {
        assert!(value_matches(&Value::from("Ada"), "Ada"));
        assert!(value_matches(&Value::from(42), "42"));
        assert!(value_matches(&Value::from(true), "true"));
        assert!(!value_matches(&Value::from("Ada"), "ada"));
        assert!(!value_matches(&Value::Null, "null"));
    }

    #[test]
    fn projection_always_keeps_id() {
        let record: Map<String, Value> = serde_json::from_str(
            r#"{"id": 1, "name": "Ada", "age": 36}"#,
        )
        .unwrap();
        let projected = project(record, &["name"]);
        assert_eq!(projected.len(), 2);
        assert!(projected.contains_key("id"));
        assert!(projected.contains_key("name"));
    }

    #[test]
    fn value_cmp_orders_numbers_and_strings() {
        use std::cmp::Ordering;
        assert_eq!(
            value_cmp(Some(&Value::from(1)), Some(&Value::from(2))),
            Ordering::Less
        );
        assert_eq!(
            value_cmp(Some(&Value::from("b")), Some(&Value::from("a"))),
            Ordering::Greater
        );
        assert_eq!(value_cmp(None, Some(&Value::from(1))), Ordering::Less);
    }

    #[test]
    fn credential_strips_both_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(credential(&headers), Some("abc".to_string()));

        headers.insert(header::AUTHORIZATION, "ApiKey xyz".parse().unwrap());
        assert_eq!(credential(&headers), Some("xyz".to_string()));

        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(credential(&headers), None);
    }
}
