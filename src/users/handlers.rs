use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::state::AppState;
use crate::users::dto::{CreateUserRequest, DeleteUserResponse, UpdateUserRequest};
use crate::users::password::hash_password;
use crate::users::repo::{NewUser, User, UserChanges};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), (StatusCode, String)> {
    let (Some(name), Some(email), Some(username), Some(password)) = (
        present(payload.name),
        present(payload.email),
        present(payload.username),
        present(payload.password),
    ) else {
        warn!("create user rejected: required field missing");
        return Err((
            StatusCode::BAD_REQUEST,
            "Name, email, username and password are required".into(),
        ));
    };

    let new = NewUser {
        name,
        email,
        address: present(payload.address),
        username,
        password: hash_password(&password).map_err(internal)?,
    };

    let user = User::create(&state.db, &new).await.map_err(internal)?;

    info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, (StatusCode, String)> {
    let users = User::list_all(&state.db).await.map_err(internal)?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, (StatusCode, String)> {
    match User::find_by_id(&state.db, id).await.map_err(internal)? {
        Some(user) => Ok(Json(user)),
        None => {
            warn!(user_id = %id, "user not found");
            Err((StatusCode::NOT_FOUND, "User not found".into()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, (StatusCode, String)> {
    let mut changes = UserChanges {
        name: present(payload.name),
        email: present(payload.email),
        address: present(payload.address),
        username: present(payload.username),
        password: None,
    };
    if let Some(plain) = present(payload.password) {
        changes.password = Some(hash_password(&plain).map_err(internal)?);
    }

    if changes.is_empty() {
        warn!(user_id = %id, "update rejected: no fields supplied");
        return Err((
            StatusCode::BAD_REQUEST,
            "At least one of name, email, address, username or password is required".into(),
        ));
    }

    match User::update(&state.db, id, &changes).await.map_err(internal)? {
        Some(user) => {
            info!(user_id = %user.id, "user updated");
            Ok(Json(user))
        }
        None => {
            warn!(user_id = %id, "user not found");
            Err((StatusCode::NOT_FOUND, "User not found".into()))
        }
    }
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteUserResponse>, (StatusCode, String)> {
    match User::delete_by_id(&state.db, id).await.map_err(internal)? {
        Some(user) => {
            info!(user_id = %user.id, "user deleted");
            Ok(Json(DeleteUserResponse {
                message: "User deleted successfully".into(),
                user,
            }))
        }
        None => {
            warn!(user_id = %id, "user not found");
            Err((StatusCode::NOT_FOUND, "User not found".into()))
        }
    }
}

/// Absent and empty values count the same, mirroring the service's falsy
/// rule for request fields.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Mask any hashing or store failure as an opaque 500; the detail goes to
/// the log only.
fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_filters_empty_strings() {
        assert_eq!(present(Some("Ann".into())), Some("Ann".to_string()));
        assert_eq!(present(Some(String::new())), None);
        assert_eq!(present(None), None);
    }

    #[test]
    fn create_request_tolerates_missing_fields() {
        let payload: CreateUserRequest = serde_json::from_str(r#"{"name":"Ann"}"#).unwrap();
        assert_eq!(payload.name.as_deref(), Some("Ann"));
        assert!(payload.email.is_none());
        assert!(payload.username.is_none());
        assert!(payload.password.is_none());
        assert!(payload.address.is_none());
    }

    #[test]
    fn user_row_serializes_every_column() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ann".into(),
            email: "a@x.com".into(),
            address: None,
            username: "ann1".into(),
            password: "$argon2id$fake".into(),
        };

        let json = serde_json::to_value(&user).unwrap();
        for key in ["id", "name", "email", "address", "username", "password"] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["password"], "$argon2id$fake");
        assert!(json["address"].is_null());
    }

    #[test]
    fn delete_response_carries_message_and_prior_row() {
        let response = DeleteUserResponse {
            message: "User deleted successfully".into(),
            user: User {
                id: Uuid::new_v4(),
                name: "Ann".into(),
                email: "a@x.com".into(),
                address: Some("1 Main St".into()),
                username: "ann1".into(),
                password: "$argon2id$fake".into(),
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["message"], "User deleted successfully");
        assert_eq!(json["user"]["email"], "a@x.com");
        assert_eq!(json["user"]["address"], "1 Main St");
    }
}
