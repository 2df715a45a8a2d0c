use argon2::{Argon2, PasswordHasher};
use chrono::Utc;
use log::{info, warn};
use serde_json::{json, Value};
use shared::datasource::{CollectionNames, Connector};
use shared::{
    CreateUserRequest, DeleteResponse, Page, PageQuery, Result, SharedError, UpdateUserRequest,
    UserRecord,
};
use validator::Validate;

use super::repository::UsersRepository;
use crate::datasource::Gateway;

fn user_not_found(id: &str) -> SharedError {
    SharedError::NotFound(format!("User {} not found", id))
}

/// Argon2 PHC string with a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = argon2::password_hash::SaltString::generate(
        &mut argon2::password_hash::rand_core::OsRng,
    );
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| SharedError::Internal(format!("Failed to hash password: {}", e)))
}

/// Row content for a new user: hashed password and creation time
pub fn new_user_document(request: &CreateUserRequest) -> Result<Value> {
    let mut document = serde_json::to_value(request)?;
    document["password"] = json!(hash_password(&request.password)?);
    document["created_at"] = json!(Utc::now().to_rfc3339());
    Ok(document)
}

/// Patch for an update. The password is replaced by its hash, or dropped
/// when none was supplied.
pub fn user_patch(request: &UpdateUserRequest) -> Result<Value> {
    let mut patch = serde_json::to_value(request)?;
    if let Some(fields) = patch.as_object_mut() {
        fields.remove("password");
        if let Some(password) = request.new_password() {
            fields.insert("password".to_string(), json!(hash_password(password)?));
        }
        fields.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));
    }
    Ok(patch)
}

pub struct UsersUseCase<'a, C: Connector> {
    gateway: &'a Gateway<C>,
}

impl<'a, C: Connector> UsersUseCase<'a, C> {
    pub fn new(gateway: &'a Gateway<C>) -> Self {
        Self { gateway }
    }

    fn collections(&self) -> CollectionNames {
        self.gateway.collections().clone()
    }

    pub async fn list(&self, page: PageQuery) -> Result<Page<UserRecord>> {
        page.validate()?;
        let collections = self.collections();
        self.gateway
            .run(move |db| {
                Box::pin(async move {
                    let repo = UsersRepository::new(db, &collections);
                    let total = repo.count().await?;
                    let items = repo.page(&page).await?;
                    Ok(Page::new(items, total, &page))
                })
            })
            .await
    }

    pub async fn list_or_empty(&self, page: PageQuery) -> Result<Page<UserRecord>> {
        page.validate()?;
        match self.list(page).await {
            Ok(users) => Ok(users),
            Err(e) => {
                warn!("Failed to fetch users: {}", e);
                Ok(Page::empty(&page))
            }
        }
    }

    pub async fn create(&self, request: CreateUserRequest) -> Result<UserRecord> {
        request.validate()?;
        let document = new_user_document(&request)?;
        let collections = self.collections();
        let user = self
            .gateway
            .run(move |db| {
                Box::pin(async move { UsersRepository::new(db, &collections).create(document).await })
            })
            .await?;
        info!("Created user {} ({:?})", user.username, user.role);
        Ok(user)
    }

    pub async fn update(&self, id: &str, request: UpdateUserRequest) -> Result<UserRecord> {
        request.validate()?;
        let patch = user_patch(&request)?;
        let collections = self.collections();
        let id = id.to_string();
        self.gateway
            .run(move |db| {
                Box::pin(async move {
                    let repo = UsersRepository::new(db, &collections);
                    if !repo.exists(&id).await? {
                        return Err(user_not_found(&id));
                    }
                    repo.merge(&id, patch).await
                })
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteResponse> {
        let collections = self.collections();
        let id = id.to_string();
        self.gateway
            .run(move |db| {
                Box::pin(async move {
                    if UsersRepository::new(db, &collections).delete(&id).await? {
                        info!("Deleted user {}", id);
                        Ok(DeleteResponse { success: true })
                    } else {
                        Err(user_not_found(&id))
                    }
                })
            })
            .await
    }
}
