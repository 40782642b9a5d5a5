//! End-to-end tests against an in-process axum backend speaking the same
//! REST conventions as the real server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use threadline_client::config::ApiSettings;
use threadline_client::{
    ApiClient, AuthService, ClientConfig, ClientError, CrudController, RemoteCollection, Resource,
    SessionHandle,
};
use threadline_core::entities::{CustomerForm, LookupKind, ProductSchema, RegistrationForm};
use threadline_core::{Money, Ref, Role};

// =============================================================================
// Fake backend
// =============================================================================

const TOKEN: &str = "tok-1";

#[derive(Default)]
struct Backend {
    products: Vec<Value>,
    next_id: i64,
    requests: usize,
    registrations: Vec<Value>,
    password_changes: Vec<Value>,
}

type Shared = Arc<Mutex<Backend>>;
type Reply = (StatusCode, Json<Value>);

fn authorized(headers: &HeaderMap) -> Result<(), Reply> {
    let expected = format!("Bearer {TOKEN}");
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Authentication required" })),
        )),
    }
}

async fn login(Json(body): Json<Value>) -> Reply {
    if body["username"] == "ceo" && body["password"] == "secret123" {
        (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "token": TOKEN,
                "user": { "id": 1, "username": "ceo", "role": "CEO" }
            })),
        )
    } else {
        (
            StatusCode::OK,
            Json(json!({ "success": false, "message": "Invalid username or password" })),
        )
    }
}

async fn register(State(db): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut db = db.lock().unwrap();
    db.requests += 1;
    let taken = db
        .registrations
        .iter()
        .any(|r| r["username"] == body["username"]);
    if taken {
        return (
            StatusCode::OK,
            Json(json!({ "success": false, "message": "Username is already taken" })),
        );
    }
    db.registrations.push(body);
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Registration successful" })),
    )
}

async fn change_password(
    State(db): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }
    let mut db = db.lock().unwrap();
    db.requests += 1;
    db.password_changes.push(body.clone());
    if body["currentPassword"] != "secret123" {
        return (
            StatusCode::OK,
            Json(json!({ "success": false, "message": "Current password is incorrect" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Password updated" })),
    )
}

async fn list_products(State(db): State<Shared>, headers: HeaderMap) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }
    let mut db = db.lock().unwrap();
    db.requests += 1;
    (StatusCode::OK, Json(Value::Array(db.products.clone())))
}

async fn search_products(
    State(db): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let term = params.get("name").cloned().unwrap_or_default().to_lowercase();
    let db = db.lock().unwrap();
    let hits: Vec<Value> = db
        .products
        .iter()
        .filter(|p| {
            p["name"]
                .as_str()
                .map(|n| n.to_lowercase().contains(&term))
                .unwrap_or(false)
        })
        .cloned()
        .collect();
    (StatusCode::OK, Json(Value::Array(hits)))
}

async fn create_product(
    State(db): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }
    let mut db = db.lock().unwrap();
    db.requests += 1;
    let duplicate = db
        .products
        .iter()
        .any(|p| p["productNo"] == body["productNo"]);
    if duplicate {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "success": false, "message": "Product number already exists" })),
        );
    }
    db.next_id += 1;
    body["id"] = json!(db.next_id);
    let category_id = body["category"]["id"].clone();
    body["category"] = json!({ "id": category_id, "categoryName": "Tops" });
    db.products.push(body.clone());
    (StatusCode::CREATED, Json(body))
}

async fn update_product(
    State(db): State<Shared>,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.requests += 1;
    match db.products.iter_mut().find(|p| p["id"] == id) {
        Some(row) => {
            body["id"] = json!(id);
            *row = body;
            (StatusCode::OK, Json(json!({ "success": true, "message": "Product updated" })))
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Product not found" }))),
    }
}

async fn delete_product(State(db): State<Shared>, Path(id): Path<i64>) -> StatusCode {
    let mut db = db.lock().unwrap();
    db.requests += 1;
    db.products.retain(|p| p["id"] != id);
    StatusCode::NO_CONTENT
}

async fn categories() -> Json<Value> {
    Json(json!([
        { "id": 1, "categoryName": "Tops" },
        { "id": 2, "categoryName": "Bottoms" }
    ]))
}

async fn spawn_backend() -> (SocketAddr, Shared) {
    let db: Shared = Arc::new(Mutex::new(Backend::default()));
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/change-password", put(change_password))
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/search", get(search_products))
        .route("/api/products/{id}", put(update_product).delete(delete_product))
        .route("/api/categories", get(categories))
        .with_state(db.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    (addr, db)
}

fn client_for(addr: SocketAddr) -> ApiClient {
    let config = ClientConfig {
        api: ApiSettings {
            base_url: format!("http://{addr}/api"),
            timeout_secs: 5,
        },
        ..ClientConfig::default()
    };
    ApiClient::new(&config, SessionHandle::in_memory()).unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_login_then_manage_products() {
    let (addr, db) = spawn_backend().await;
    let api = client_for(addr);
    let auth = AuthService::new(api.clone());

    let err = auth.login("ceo", "wrong-password").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid username or password");

    let user = auth.login("ceo", "secret123").await.unwrap();
    assert_eq!(user.role, Role::Ceo);

    let mut products = CrudController::new(Resource::<ProductSchema>::new(api.clone()));
    products.load().await.unwrap();
    assert!(products.records().is_empty());

    let form = products.open_create();
    form.name = "Linen Shirt".into();
    form.category = Some(Ref::new(1));
    form.supplier = Some(Ref::new(3));
    form.quantity_in_stock = 12;
    form.set_prices(Money::from_major(100.0), Money::from_major(120.0));
    products.submit().await.unwrap();

    let created = &products.records()[0];
    assert_eq!(created.name, "Linen Shirt");
    assert_eq!(created.selling_price, Money::from_major(120.0));
    assert_eq!(created.profit_percentage, Some(20.0));
    assert_eq!(created.category.as_ref().map(|c| c.name.as_str()), Some("Tops"));
    let id = created.id;

    let form = products.open_edit_by_id(id).unwrap();
    form.set_selling_price(Money::from_major(150.0));
    products.submit().await.unwrap();
    assert_eq!(products.find(id).unwrap().profit_percentage, Some(50.0));

    let pending = products.request_remove(id);
    products.confirm_remove(pending).await.unwrap();
    assert!(products.records().is_empty());
    assert!(db.lock().unwrap().products.is_empty());
}

#[tokio::test]
async fn test_validation_failure_never_reaches_server() {
    let (addr, db) = spawn_backend().await;
    let api = client_for(addr);
    AuthService::new(api.clone()).login("ceo", "secret123").await.unwrap();

    let mut products = CrudController::new(Resource::<ProductSchema>::new(api));
    let form = products.open_create();
    form.name = "Linen Shirt".into();
    form.category = Some(Ref::new(1));
    form.supplier = Some(Ref::new(3));
    form.set_prices(Money::from_major(100.0), Money::from_major(90.0));

    let err = products.submit().await.unwrap_err();
    assert_eq!(err.to_string(), "Selling price must exceed cost price");
    assert_eq!(db.lock().unwrap().requests, 0);
}

#[tokio::test]
async fn test_server_rejection_is_shown_verbatim() {
    let (addr, _db) = spawn_backend().await;
    let api = client_for(addr);
    AuthService::new(api.clone()).login("ceo", "secret123").await.unwrap();

    let mut products = CrudController::new(Resource::<ProductSchema>::new(api));
    for _ in 0..2 {
        let form = products.open_create();
        form.product_no = "PRD-FIXED".into();
        form.name = "Batik Sarong".into();
        form.category = Some(Ref::new(1));
        form.supplier = Some(Ref::new(3));
        form.set_prices(Money::from_major(10.0), Money::from_major(15.0));
        let _ = products.submit().await;
    }

    let open = products.open_form().unwrap();
    assert_eq!(open.error.as_deref(), Some("Product number already exists"));
    assert_eq!(products.records().len(), 1);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (addr, _db) = spawn_backend().await;
    let mut products = CrudController::new(Resource::<ProductSchema>::new(client_for(addr)));

    let err = products.load().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Authentication required");
}

#[tokio::test]
async fn test_search_and_lookups() {
    let (addr, db) = spawn_backend().await;
    db.lock().unwrap().products = vec![
        json!({ "id": 1, "productNo": "PRD1", "name": "Linen Shirt", "costPrice": 10.0, "sellingPrice": 15.0 }),
        json!({ "id": 2, "productNo": "PRD2", "name": "Chinos", "costPrice": 20.0, "sellingPrice": 30.0 }),
    ];
    let api = client_for(addr);

    let hits = Resource::<ProductSchema>::new(api.clone())
        .search("shirt")
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].product_no, "PRD1");

    let categories = api.lookup(LookupKind::Categories).await.unwrap();
    assert_eq!(categories[1].name, "Bottoms");
}

#[tokio::test]
async fn test_unreachable_backend_reports_load_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut products = CrudController::new(Resource::<ProductSchema>::new(client_for(addr)));
    let err = products.load().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(products.last_error(), Some("Failed to load products"));
}

fn registration(username: &str) -> RegistrationForm {
    RegistrationForm {
        customer: CustomerForm {
            full_name: "Amaya Perera".into(),
            email: "amaya@example.lk".into(),
            nic_no: "199012345678".into(),
            mobile_number: "0771234567".into(),
            address: "12 Galle Road, Colombo".into(),
            zip_code: "00300".into(),
            province: Some(Ref::new(1)),
            ..CustomerForm::default()
        },
        username: username.into(),
        password: "cotton-42".into(),
        confirm_password: "cotton-42".into(),
    }
}

#[tokio::test]
async fn test_register_posts_profile_and_credentials() {
    let (addr, db) = spawn_backend().await;
    let auth = AuthService::new(client_for(addr));

    let message = auth.register(registration("amaya")).await.unwrap();
    assert_eq!(message.as_deref(), Some("Registration successful"));
    assert!(auth.current_user().await.is_none());

    let err = auth.register(registration("amaya")).await.unwrap_err();
    assert!(err.is_rejection());
    assert_eq!(err.to_string(), "Username is already taken");

    let db = db.lock().unwrap();
    let body = &db.registrations[0];
    assert_eq!(body["fullName"], "Amaya Perera");
    assert_eq!(body["nicNo"], "199012345678");
    assert_eq!(body["province"], json!({ "id": 1 }));
    assert_eq!(body["username"], "amaya");
    assert_eq!(body["password"], "cotton-42");
    assert!(body["customerNo"].as_str().unwrap().starts_with("CUS"));
    assert!(body.get("confirmPassword").is_none());
}

#[tokio::test]
async fn test_invalid_registration_is_not_sent() {
    let (addr, db) = spawn_backend().await;
    let auth = AuthService::new(client_for(addr));

    let mut form = registration("amaya");
    form.confirm_password = "cotton-43".into();
    form.customer.mobile_number = "12345".into();

    let err = auth.register(form).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Mobile number must be exactly 10 digits; Password confirmation does not match password"
    );
    assert_eq!(db.lock().unwrap().requests, 0);
}

#[tokio::test]
async fn test_change_password() {
    let (addr, db) = spawn_backend().await;
    let auth = AuthService::new(client_for(addr));

    let err = auth
        .change_password("secret123", "linen-2026", "linen-2026")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotLoggedIn));

    auth.login("ceo", "secret123").await.unwrap();

    let err = auth
        .change_password("secret123", "secret123", "secret123")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "New password must be different from current password");
    assert!(db.lock().unwrap().password_changes.is_empty());

    let err = auth
        .change_password("not-it-at-all", "linen-2026", "linen-2026")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Current password is incorrect");

    let message = auth
        .change_password("secret123", "linen-2026", "linen-2026")
        .await
        .unwrap();
    assert_eq!(message.as_deref(), Some("Password updated"));

    let db = db.lock().unwrap();
    let body = &db.password_changes[1];
    assert_eq!(
        *body,
        json!({ "currentPassword": "secret123", "newPassword": "linen-2026" })
    );
}
