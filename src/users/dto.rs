use serde::{Deserialize, Serialize};

use crate::users::repo::User;

/// Body for `POST /users`. Presence is checked by the handler, so every
/// field rides in as an `Option`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Body for `PUT /users/:id`; any subset of the mutable fields.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Response for `DELETE /users/:id`: a confirmation plus the removed row.
#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub message: String,
    pub user: User,
}
