//! HTTP routes.
//!
//! Every resource endpoint runs the same sequence: resolve the action from
//! the method, run the view-level check, load the resource, run the
//! object-level check, then act.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use warden_acl::{Action, Principal, PrincipalId, ResourceKind, Role};
use warden_auth::AuthError;
use warden_auth_jwt::{IssuedToken, RefreshedToken, hash_password, verify_password};

use crate::error::ApiError;
use crate::extract::{CurrentAdmin, CurrentPrincipal, CurrentUser};
use crate::guard::{action_for, check_object, check_view};
use crate::notify::{OrderConfirmation, spawn_confirmation};
use crate::state::AppState;
use crate::store::{Account, UpdateMode};

/// Shortest password accepted at registration or on a password change.
pub const MIN_PASSWORD_LEN: usize = 8;

/// All routes, without the auth layer.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/register", post(register))
        .route("/token", post(issue_token))
        .route("/token/refresh", post(refresh_token))
        .route("/me", get(me))
        .route("/users", get(users))
        .route("/api/{kind}", get(collection).post(collection))
        .route(
            "/api/{kind}/{id}",
            get(instance).put(instance).patch(instance).delete(instance),
        )
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Registration body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name; defaults to the local part of the email.
    #[serde(default)]
    pub username: Option<String>,
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Login body. `username` is accepted as an alias for `email`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    #[serde(alias = "username")]
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Refresh body.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token from a login response.
    #[serde(alias = "refresh_token")]
    pub refresh: String,
}

/// Author update body. `PATCH` changes only the fields present; `PUT`
/// requires `username`.
#[derive(Debug, Default, Deserialize)]
pub struct AuthorUpdate {
    /// New display name.
    #[serde(default)]
    pub username: Option<String>,
    /// New plain-text password.
    #[serde(default)]
    pub password: Option<String>,
}

/// Public view of an author.
#[derive(Debug, Serialize)]
pub struct AuthorView {
    /// Principal id.
    pub id: PrincipalId,
    /// Display name.
    pub username: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AuthorView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            created_at: account.created_at,
        }
    }
}

async fn register(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    body: Bytes,
) -> Result<Response, ApiError> {
    check_view(&principal, Action::Register, ResourceKind::Author)?;
    let req: RegisterRequest = parse_body(&body)?;
    let account = create_account(&state, req, Role::User).await?;
    log::info!("Registered account {} ({})", account.id, account.email);

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "User registered successfully", "user": account})),
    )
        .into_response())
}

async fn issue_token(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    body: Bytes,
) -> Result<Json<IssuedToken>, ApiError> {
    check_view(&principal, Action::IssueToken, ResourceKind::Author)?;
    let req: LoginRequest = parse_body(&body)?;

    let account = {
        let store = state.store.read().await;
        store
            .account_by_email(&req.email)
            .filter(|a| verify_password(&req.password, &a.password_hash))
            .cloned()
    };
    let Some(account) = account else {
        log::warn!("Failed login for {}", req.email);
        return Err(ApiError::Unauthenticated(
            "Incorrect email or password".to_string(),
        ));
    };

    Ok(Json(state.authority.issue(&account.user(), &account.username)?))
}

async fn refresh_token(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    body: Bytes,
) -> Result<Json<RefreshedToken>, ApiError> {
    check_view(&principal, Action::IssueToken, ResourceKind::Author)?;
    let req: RefreshRequest = parse_body(&body)?;

    let claimed = state.authority.validate_refresh_token(&req.refresh, "")?;
    let user = state
        .store
        .read()
        .await
        .account_for(&claimed)
        .map(Account::user)
        .ok_or_else(|| AuthError::UnknownPrincipal(claimed.email.clone()))?;

    Ok(Json(state.authority.refresh(&user)?))
}

async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Account>, ApiError> {
    let store = state.store.read().await;
    store
        .account(user.id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound {
            kind: ResourceKind::Author,
            id: user.id.get(),
        })
}

async fn users(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
) -> Json<Vec<Account>> {
    Json(state.store.read().await.accounts())
}

async fn collection(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    method: Method,
    CurrentPrincipal(principal): CurrentPrincipal,
    body: Bytes,
) -> Result<Response, ApiError> {
    let kind: ResourceKind = kind.parse()?;
    let action = action_for(&method, false).ok_or_else(unsupported)?;
    check_view(&principal, action, kind)?;

    match (action, kind) {
        (Action::List, ResourceKind::Author) => {
            let store = state.store.read().await;
            let authors: Vec<AuthorView> =
                store.accounts().iter().map(AuthorView::from).collect();
            Ok(Json(authors).into_response())
        }
        (Action::List, _) => Ok(Json(state.store.read().await.list(kind)).into_response()),
        (Action::Create, ResourceKind::Author) => {
            let req: RegisterRequest = parse_body(&body)?;
            let account = create_account(&state, req, Role::User).await?;
            Ok((StatusCode::CREATED, Json(AuthorView::from(&account))).into_response())
        }
        (Action::Create, _) => {
            let data: Map<String, Value> = parse_body(&body)?;
            create_record(&state, &principal, kind, data).await
        }
        _ => Err(unsupported()),
    }
}

async fn instance(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, u64)>,
    method: Method,
    CurrentPrincipal(principal): CurrentPrincipal,
    body: Bytes,
) -> Result<Response, ApiError> {
    let kind: ResourceKind = kind.parse()?;
    let action = action_for(&method, true).ok_or_else(unsupported)?;
    check_view(&principal, action, kind)?;

    let mode = if method == Method::PATCH {
        UpdateMode::Merge
    } else {
        UpdateMode::Replace
    };

    if kind == ResourceKind::Author {
        let id = PrincipalId::new(id);
        return author_instance(&state, &principal, action, mode, id, &body).await;
    }

    if action == Action::Retrieve {
        let store = state.store.read().await;
        let record = store.get(kind, id)?;
        check_object(&principal, action, kind, record)?;
        return Ok(Json(record.clone()).into_response());
    }

    let mut store = state.store.write().await;
    let record = store.get(kind, id)?;
    check_object(&principal, action, kind, record)?;

    match action {
        Action::Update => {
            let data: Map<String, Value> = parse_body(&body)?;
            let updated = store.update(kind, id, data, mode)?;
            log::debug!("Updated {kind} {id}");
            Ok(Json(updated).into_response())
        }
        Action::Delete => {
            store.delete(kind, id)?;
            log::debug!("Deleted {kind} {id}");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        _ => Err(unsupported()),
    }
}

async fn author_instance(
    state: &AppState,
    principal: &Principal,
    action: Action,
    mode: UpdateMode,
    id: PrincipalId,
    body: &[u8],
) -> Result<Response, ApiError> {
    // An account always owns itself, so the check holds after the read lock
    // is released.
    {
        let store = state.store.read().await;
        let account = store.account(id).ok_or(ApiError::NotFound {
            kind: ResourceKind::Author,
            id: id.get(),
        })?;
        check_object(principal, action, ResourceKind::Author, account)?;
        if action == Action::Retrieve {
            return Ok(Json(AuthorView::from(account)).into_response());
        }
    }

    match action {
        Action::Update => {
            let changes: AuthorUpdate = parse_body(body)?;
            let account = update_account(state, id, changes, mode).await?;
            Ok(Json(AuthorView::from(&account)).into_response())
        }
        Action::Delete => {
            let account = state.store.write().await.delete_account(id)?;
            log::info!("Deleted account {} ({})", account.id, account.email);
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        _ => Err(unsupported()),
    }
}

async fn update_account(
    state: &AppState,
    id: PrincipalId,
    changes: AuthorUpdate,
    mode: UpdateMode,
) -> Result<Account, ApiError> {
    let username = match (changes.username, mode) {
        (Some(name), _) if name.trim().is_empty() => {
            return Err(ApiError::bad_request("username must not be empty"));
        }
        (None, UpdateMode::Replace) => return Err(ApiError::bad_request("username is required")),
        (username, _) => username,
    };
    let password_hash = match changes.password {
        Some(password) => {
            check_password(&password)?;
            Some(hash_password(&password)?)
        }
        None => None,
    };

    let mut store = state.store.write().await;
    let mut account = store
        .account(id)
        .cloned()
        .ok_or(ApiError::NotFound {
            kind: ResourceKind::Author,
            id: id.get(),
        })?;
    if let Some(username) = username {
        account = store.rename_account(id, &username)?;
    }
    if let Some(hash) = password_hash {
        account = store.set_password_hash(id, hash)?;
        log::info!("Changed password for account {}", account.id);
    }
    Ok(account)
}

async fn create_record(
    state: &AppState,
    principal: &Principal,
    kind: ResourceKind,
    data: Map<String, Value>,
) -> Result<Response, ApiError> {
    let caller = principal.id();
    let owner = match kind {
        ResourceKind::Category | ResourceKind::Product => None,
        _ => caller,
    };

    let (record, account_email) = {
        let mut store = state.store.write().await;
        let record = store.insert(kind, owner, data);
        let email = caller
            .and_then(|id| store.account(id))
            .map(|a| a.email.clone())
            .unwrap_or_default();
        (record, email)
    };
    log::debug!("Created {kind} {} for {principal}", record.id);

    if kind == ResourceKind::Order {
        spawn_confirmation(
            state.notifier.clone(),
            OrderConfirmation::for_order(&record, &account_email),
        );
    }

    Ok((StatusCode::CREATED, Json(record)).into_response())
}

async fn create_account(
    state: &AppState,
    req: RegisterRequest,
    role: Role,
) -> Result<Account, ApiError> {
    let email = req.email.trim();
    if !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    check_password(&req.password)?;
    let username = req
        .username
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());

    let hash = hash_password(&req.password)?;
    let account = state
        .store
        .write()
        .await
        .create_account(&username, email, hash, role)?;
    Ok(account)
}

fn check_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn unsupported() -> ApiError {
    ApiError::bad_request("unsupported method")
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))
}
