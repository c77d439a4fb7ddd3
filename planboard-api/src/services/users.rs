/// Account management
///
/// Sign-up, the caller's own account, and account updates. Usernames and
/// email addresses are stored lower-cased and must be unique ignoring case.

use std::sync::Arc;

use planboard_shared::{
    auth::password::HashCost,
    models::{NewUser, User},
    store::{PlannerStore, EMAIL_TAKEN, USERNAME_TAKEN},
};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::{hash, patch};
use crate::{
    error::{ApiError, ApiResult},
    sanitize::{clean, clean_opt, Sanitize},
};

pub const USER_NOT_FOUND: &str = "User not found";

/// Sign-up request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl Sanitize for CreateUserRequest {
    fn sanitize(&mut self) {
        clean(&mut self.first_name);
        clean(&mut self.last_name);
        clean(&mut self.email);
        clean(&mut self.username);
    }
}

/// Account update; every field is optional and nothing else is accepted
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: Option<String>,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: Option<String>,
}

impl Sanitize for UpdateUserRequest {
    fn sanitize(&mut self) {
        clean_opt(&mut self.first_name);
        clean_opt(&mut self.last_name);
        clean_opt(&mut self.email);
        clean_opt(&mut self.username);
    }
}

/// Upper-cases the first character and lower-cases the rest
pub fn capitalize(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn PlannerStore>,
    cost: HashCost,
}

impl UserService {
    pub fn new(store: Arc<dyn PlannerStore>, cost: HashCost) -> Self {
        Self { store, cost }
    }

    pub(crate) fn cost(&self) -> HashCost {
        self.cost
    }

    /// Registers a new account
    ///
    /// # Errors
    ///
    /// `Conflict` when the username or email is already in use.
    pub async fn create(&self, request: CreateUserRequest) -> ApiResult<User> {
        let username = normalize(&request.username);
        let email = normalize(&request.email);

        self.ensure_available(&username, &email, None).await?;

        let password_hash = hash(request.password, self.cost).await?;
        let user = self
            .store
            .insert_user(NewUser {
                first_name: request.first_name,
                last_name: request.last_name,
                username,
                email,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Loads an account by id
    pub async fn account(&self, user_id: Uuid) -> ApiResult<User> {
        self.store
            .user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::bad_request(USER_NOT_FOUND))
    }

    pub async fn find_by_username(&self, username: &str) -> ApiResult<Option<User>> {
        debug!(username = %username, "Looking up user by username");
        Ok(self.store.user_by_username(&normalize(username)).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        Ok(self.store.user_by_email(&normalize(email)).await?)
    }

    /// Applies the fields present in `request` to the caller's account
    ///
    /// # Errors
    ///
    /// `Conflict` when the new username or email belongs to another user.
    pub async fn update(&self, user_id: Uuid, request: UpdateUserRequest) -> ApiResult<User> {
        let mut user = self.account(user_id).await?;

        let username = request.username.as_deref().map(normalize);
        let email = request.email.as_deref().map(normalize);
        self.ensure_available(
            username.as_deref().unwrap_or_default(),
            email.as_deref().unwrap_or_default(),
            Some(user.id),
        )
        .await?;

        patch(&mut user.first_name, request.first_name.as_deref().map(capitalize));
        patch(&mut user.last_name, request.last_name.as_deref().map(capitalize));
        patch(&mut user.username, username);
        patch(&mut user.email, email);
        if let Some(password) = request.password {
            user.password_hash = hash(password, self.cost).await?;
        }

        let user = self.store.save_user(&user).await?;
        info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    /// Persists a user as-is
    pub async fn save(&self, user: &User) -> ApiResult<User> {
        Ok(self.store.save_user(user).await?)
    }

    /// Fails with `Conflict` if another account uses `username` or `email`
    ///
    /// Empty values are skipped.
    async fn ensure_available(
        &self,
        username: &str,
        email: &str,
        current: Option<Uuid>,
    ) -> ApiResult<()> {
        let is_other = |user: &User| Some(user.id) != current;

        if !username.is_empty() {
            if let Some(existing) = self.store.user_by_username(username).await? {
                if is_other(&existing) {
                    return Err(ApiError::Conflict(USERNAME_TAKEN.to_string()));
                }
            }
        }

        if !email.is_empty() {
            if let Some(existing) = self.store.user_by_email(email).await? {
                if is_other(&existing) {
                    return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
                }
            }
        }

        Ok(())
    }
}
