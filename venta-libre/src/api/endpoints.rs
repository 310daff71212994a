use super::{ApiError, HttpClient, RequestOptions};
use crate::model::{NewUser, Product, User, UserUpdate};
use reqwest::Method;
use serde::Deserialize;

/// What `POST /users` answers with.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Created {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl HttpClient {
    /// GET /users
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.request_as(Method::GET, "/users", RequestOptions::default()).await
    }

    /// GET /users/:id
    pub async fn get_user(&self, id: i64) -> Result<User, ApiError> {
        self.request_as(Method::GET, &format!("/users/{id}"), RequestOptions::default())
            .await
    }

    /// POST /users
    pub async fn create_user(&self, user: &NewUser) -> Result<Created, ApiError> {
        let created: Option<Created> = self
            .request_as(Method::POST, "/users", RequestOptions::json(user)?)
            .await?;
        Ok(created.unwrap_or_default())
    }

    /// PUT /users/:id. The response body is returned as-is.
    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<serde_json::Value, ApiError> {
        self.request(Method::PUT, &format!("/users/{id}"), RequestOptions::json(update)?)
            .await
    }

    /// DELETE /users/:id
    pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        self.request(Method::DELETE, &format!("/users/{id}"), RequestOptions::default())
            .await
            .map(|_| ())
    }

    /// GET /products
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.request_as(Method::GET, "/products", RequestOptions::default()).await
    }
}
