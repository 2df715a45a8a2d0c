use chrono::{Local, Utc};
use log::{debug, info, warn};
use serde_json::{json, Value};
use shared::datasource::{CollectionNames, Connector};
use shared::{
    Achievement, AddAchievementRequest, CreatePlayerRequest, DeleteResponse, Page, PageQuery,
    PlayerMatchView, PlayerRecord, Result, SharedError, UpdatePlayerRequest,
    UpdatePlayerStatsRequest,
};
use validator::Validate;

use super::repository::PlayersRepository;
use crate::datasource::Gateway;

fn player_not_found(id: &str) -> SharedError {
    SharedError::NotFound(format!("Player {} not found", id))
}

fn to_document<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(SharedError::from)
}

/// Row content for a new player, stamped with its creation time
pub fn new_player_document(request: &CreatePlayerRequest) -> Result<Value> {
    let mut document = to_document(request)?;
    document["created_at"] = json!(Utc::now().to_rfc3339());
    Ok(document)
}

/// Achievement with a time-based id; dated today when the request has no date
pub fn new_achievement(request: AddAchievementRequest) -> Achievement {
    let now = Utc::now();
    Achievement {
        id: format!("achievement:{}", now.timestamp_millis()),
        title: request.title,
        description: request.description,
        date: request
            .date
            .unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string()),
        icon: request.icon,
    }
}

pub struct PlayersUseCase<'a, C: Connector> {
    gateway: &'a Gateway<C>,
}

impl<'a, C: Connector> PlayersUseCase<'a, C> {
    pub fn new(gateway: &'a Gateway<C>) -> Self {
        Self { gateway }
    }

    fn collections(&self) -> CollectionNames {
        self.gateway.collections().clone()
    }

    pub async fn list(&self, page: PageQuery) -> Result<Page<PlayerRecord>> {
        page.validate()?;
        let collections = self.collections();
        self.gateway
            .run(move |db| {
                Box::pin(async move {
                    let repo = PlayersRepository::new(db, &collections);
                    let total = repo.count().await?;
                    let items = repo.page(&page).await?;
                    Ok(Page::new(items, total, &page))
                })
            })
            .await
    }

    /// Like [`PlayersUseCase::list`], but a data source failure yields an empty page
    pub async fn list_or_empty(&self, page: PageQuery) -> Result<Page<PlayerRecord>> {
        page.validate()?;
        match self.list(page).await {
            Ok(players) => Ok(players),
            Err(e) => {
                warn!("Failed to fetch players: {}", e);
                Ok(Page::empty(&page))
            }
        }
    }

    pub async fn get(&self, id: &str) -> Result<PlayerRecord> {
        let collections = self.collections();
        let id = id.to_string();
        self.gateway
            .run(move |db| {
                Box::pin(async move {
                    PlayersRepository::new(db, &collections)
                        .find(&id)
                        .await?
                        .ok_or_else(|| player_not_found(&id))
                })
            })
            .await
    }

    pub async fn create(&self, request: CreatePlayerRequest) -> Result<PlayerRecord> {
        request.validate()?;
        let document = new_player_document(&request)?;
        let collections = self.collections();
        let player = self
            .gateway
            .run(move |db| {
                Box::pin(async move { PlayersRepository::new(db, &collections).create(document).await })
            })
            .await?;
        info!("Created player {} ({})", player.id, player.name);
        Ok(player)
    }

    /// Merges the given profile fields and stamps `updated_at`
    pub async fn update(&self, id: &str, request: UpdatePlayerRequest) -> Result<PlayerRecord> {
        request.validate()?;
        let mut patch = to_document(&request)?;
        patch["updated_at"] = json!(Utc::now().to_rfc3339());
        self.merge_existing(id, patch).await
    }

    /// Merges counters into the stats block, leaving the others untouched
    pub async fn update_stats(&self, id: &str, request: UpdatePlayerStatsRequest) -> Result<PlayerRecord> {
        if request.is_empty() {
            return Err(SharedError::BadRequest("No stats to update".to_string()));
        }
        let patch = json!({
            "stats": to_document(&request)?,
            "updated_at": Utc::now().to_rfc3339(),
        });
        self.merge_existing(id, patch).await
    }

    /// Appends to the player's achievement list
    pub async fn add_achievement(&self, id: &str, request: AddAchievementRequest) -> Result<PlayerRecord> {
        request.validate()?;
        let achievement = new_achievement(request);
        let collections = self.collections();
        let id = id.to_string();
        self.gateway
            .run(move |db| {
                Box::pin(async move {
                    let repo = PlayersRepository::new(db, &collections);
                    let player = repo.find(&id).await?.ok_or_else(|| player_not_found(&id))?;

                    let mut achievements = player.stats.achievements;
                    debug!("Adding achievement {} to {}", achievement.id, id);
                    achievements.push(achievement);
                    let patch = json!({
                        "stats": { "achievements": to_document(&achievements)? },
                        "updated_at": Utc::now().to_rfc3339(),
                    });
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
                    if PlayersRepository::new(db, &collections).delete(&id).await? {
                        info!("Deleted player {}", id);
                        Ok(DeleteResponse { success: true })
                    } else {
                        Err(player_not_found(&id))
                    }
                })
            })
            .await
    }

    /// The player's matches, newest first, each with the player's result
    pub async fn matches(&self, id: &str) -> Result<Vec<PlayerMatchView>> {
        let collections = self.collections();
        let id = id.to_string();
        self.gateway
            .run(move |db| {
                Box::pin(async move {
                    let repo = PlayersRepository::new(db, &collections);
                    if repo.find(&id).await?.is_none() {
                        return Err(player_not_found(&id));
                    }
                    let matches = repo.matches_of(&id).await?;
                    Ok(matches.into_iter().map(|m| m.view_for(&id)).collect())
                })
            })
            .await
    }

    async fn merge_existing(&self, id: &str, patch: Value) -> Result<PlayerRecord> {
        let collections = self.collections();
        let id = id.to_string();
        self.gateway
            .run(move |db| {
                Box::pin(async move {
                    let repo = PlayersRepository::new(db, &collections);
                    if repo.find(&id).await?.is_none() {
                        return Err(player_not_found(&id));
                    }
                    repo.merge(&id, patch).await
                })
            })
            .await
    }
}
