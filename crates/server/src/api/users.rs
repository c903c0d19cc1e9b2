use axum::extract::{Multipart, Path, RawQuery, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use inkwell_core::{
    ChangePasswordRequest, LoginRequest, RegisterUserRequest, UpdateUserRequest, UserProfile,
};
use inkwell_service::Actor;

use super::AppState;
use super::multipart::read_avatar_form;
use super::query::{ListParams, list_query};
use super::schemas::{
    AvatarForm, CreatedResponse, ErrorResponse, ListResponse, LoginResponse, MessageResponse,
    UserList,
};
use crate::auth::TOKEN_COOKIE;
use crate::error::ServerError;

fn session_cookie(token: &str, max_age: u64, secure: bool) -> String {
    let mut cookie =
        format!("{TOKEN_COOKIE}={token}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `POST /v1/users/register`
#[utoipa::path(
    post,
    path = "/v1/users/register",
    tag = "Users",
    summary = "Register an account",
    description = "Creates a pending account with the basic role.",
    request_body(content = RegisterUserRequest, description = "Account details"),
    responses(
        (status = 201, description = "Account created", body = CreatedResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let id = state.users.register(req).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// `POST /v1/users/login`
#[utoipa::path(
    post,
    path = "/v1/users/login",
    tag = "Users",
    summary = "Sign in",
    description = "Checks email and password and returns a session token. The token is also set as an HttpOnly `inkwell_token` cookie.",
    request_body(content = LoginRequest, description = "Credentials"),
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid credentials or inactive account", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let profile = state.users.authenticate(&req.email, &req.password).await?;
    let (token, expires_in) = state
        .jwt
        .issue_token(&profile)
        .map_err(ServerError::Config)?;

    let cookie = session_cookie(&token, expires_in, state.settings.cookie_secure);
    let body = LoginResponse {
        token,
        expires_in,
        user_id: profile.id,
        role: profile.role,
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)))
}

/// `PUT /v1/users/{id}/change-password`
#[utoipa::path(
    put,
    path = "/v1/users/{id}/change-password",
    tag = "Users",
    summary = "Change password",
    description = "Replaces the password after verifying the old one. Self or admin.",
    params(("id" = String, Path, description = "User ID")),
    request_body(content = ChangePasswordRequest, description = "Old and new password"),
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Old password does not match", body = ErrorResponse),
        (status = 403, description = "Not allowed to manage this account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ServerError> {
    state.users.change_password(&actor, &id, req).await?;
    Ok(Json(MessageResponse {
        message: "password changed".into(),
    }))
}

/// `GET /v1/users/{id}`
#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    tag = "Users",
    summary = "Get a user",
    description = "Returns the public profile of an account. Self or admin.",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserProfile),
        (status = 403, description = "Not allowed to manage this account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    Ok(Json(state.users.get(&actor, &id).await?))
}

/// `PUT /v1/users/{id}`
#[utoipa::path(
    put,
    path = "/v1/users/{id}",
    tag = "Users",
    summary = "Update a profile",
    description = "Updates the given name fields. Self or admin.",
    params(("id" = String, Path, description = "User ID")),
    request_body(content = UpdateUserRequest, description = "Fields to change"),
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 403, description = "Not allowed to manage this account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ServerError> {
    Ok(Json(state.users.update_profile(&actor, &id, req).await?))
}

/// `PUT /v1/users/{id}/avatar`
#[utoipa::path(
    put,
    path = "/v1/users/{id}/avatar",
    tag = "Users",
    summary = "Upload an avatar",
    description = "Stores the `file` part in the avatars folder and points the account at it. Self or admin.",
    params(("id" = String, Path, description = "User ID")),
    request_body(content = AvatarForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Missing or empty file", body = ErrorResponse),
        (status = 403, description = "Not allowed to manage this account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Upload failed", body = ErrorResponse),
    )
)]
pub async fn update_avatar(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServerError> {
    let (filename, data) = read_avatar_form(multipart).await?;
    let profile = state
        .users
        .update_avatar(&actor, &id, &filename, data)
        .await?;
    Ok(Json(profile))
}

/// `DELETE /v1/users/{id}`
#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    tag = "Users",
    summary = "Delete an account",
    description = "Marks the account as deleted. Self or admin.",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 403, description = "Not allowed to manage this account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    state.users.soft_delete(&actor, &id).await?;
    Ok(Json(MessageResponse {
        message: "account deleted".into(),
    }))
}

/// `GET /v1/users`
#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "Users",
    summary = "List users",
    description = "Runs a filter/sort/projection query over every account. Admin only.",
    params(ListParams),
    responses(
        (status = 200, description = "A page of profiles", body = UserList),
        (status = 400, description = "Malformed query", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, ServerError> {
    let query = list_query(raw.as_deref())?;
    let users = state.users.find(&actor, &query).await?;
    Ok(Json(ListResponse::new(users, query.pagination)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only() {
        let cookie = session_cookie("abc", 60, false);
        assert_eq!(
            cookie,
            "inkwell_token=abc; Path=/; Max-Age=60; HttpOnly; SameSite=Lax"
        );
        assert!(session_cookie("abc", 60, true).ends_with("; Secure"));
    }
}
