//! In-process stand-in for the marketplace API.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use venta_libre::model::{NewUser, User, UserUpdate};

#[derive(Clone, Default)]
pub struct Store {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl Store {
    pub fn seeded() -> Self {
        let store = Self::default();
        store.users.lock().unwrap().extend([
            user(1, "Ana Mamani", "ana@ventalibre.bo"),
            user(2, "Luis Quispe", "luis@ventalibre.bo"),
        ]);
        store
    }

    pub fn names(&self) -> Vec<String> {
        self.users.lock().unwrap().iter().map(|u| u.name.clone()).collect()
    }
}

pub fn user(id: i64, name: &str, email: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        is_admin: id == 1,
        is_active: true,
        created_at: Some("2024-05-01T10:00:00Z".to_string()),
    }
}

async fn list_users(State(store): State<Store>) -> Json<Vec<User>> {
    Json(store.users.lock().unwrap().clone())
}

async fn get_user(State(store): State<Store>, Path(id): Path<i64>) -> impl IntoResponse {
    match store.users.lock().unwrap().iter().find(|u| u.id == id) {
        Some(user) => Json(user.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn create_user(State(store): State<Store>, Json(new): Json<NewUser>) -> impl IntoResponse {
    let mut users = store.users.lock().unwrap();
    let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
    users.push(user(id, &new.name, &new.email));
    (StatusCode::CREATED, Json(json!({ "id": id, "message": "User created" })))
}

async fn update_user(
    State(store): State<Store>,
    Path(id): Path<i64>,
    Json(update): Json<UserUpdate>,
) -> impl IntoResponse {
    let mut users = store.users.lock().unwrap();
    let Some(user) = users.iter_mut().find(|u| u.id == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Some(name) = update.name {
        user.name = name;
    }
    if let Some(email) = update.email {
        user.email = email;
    }
    Json(user.clone()).into_response()
}

async fn delete_user(State(store): State<Store>, Path(id): Path<i64>) -> StatusCode {
    let mut users = store.users.lock().unwrap();
    let before = users.len();
    users.retain(|u| u.id != id);
    if users.len() < before {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn list_products() -> impl IntoResponse {
    Json(venta_libre::mock::generate_products(5, 99))
}

async fn echo_headers(headers: HeaderMap) -> Json<serde_json::Value> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    Json(json!({
        "content_type": header("content-type"),
        "request_id": header("x-request-id"),
    }))
}

pub fn router(store: Store) -> Router {
    let api = Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/products", get(list_products))
        .route("/headers", get(echo_headers))
        .route("/empty", get(|| async { StatusCode::OK }))
        .route("/plain", get(|| async { "hola" }))
        .route("/boom", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .with_state(store);
    Router::new().nest("/api/v1", api)
}

/// Serves `store` on an ephemeral port and returns the API base URL.
pub async fn serve(store: Store) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(store)).await.unwrap();
    });
    format!("http://{addr}/api/v1")
}

/// A base URL nothing listens on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/api/v1")
}
