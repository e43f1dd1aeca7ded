use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOptions, ReplaceOptions},
    Collection, Database,
};

use crate::models::game::Game;
use crate::utils::retry::{retry_async_with_config, RetryConfig};

/// Persistence collaborator for game records. One read plus one write per
/// operation; concurrent edits to the same game are not coordinated here,
/// so the last writer wins.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn load(&self, id: &str) -> Result<Option<Game>>;
    async fn save(&self, game: &Game) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Game>>;
    async fn list_by_template(&self, slug: &str, creator_id: Option<&str>) -> Result<Vec<Game>>;
    async fn ping(&self) -> Result<()>;
}

pub struct MongoGameStore {
    mongo: Database,
    collection: Collection<Game>,
}

impl MongoGameStore {
    pub fn new(mongo: Database) -> Self {
        let collection = mongo.collection("games");
        Self { mongo, collection }
    }
}

#[async_trait]
impl GameStore for MongoGameStore {
    async fn load(&self, id: &str) -> Result<Option<Game>> {
        retry_async_with_config(RetryConfig::default(), || async {
            self.collection
                .find_one(doc! { "_id": id })
                .await
                .context("Failed to load game")
        })
        .await
    }

    async fn save(&self, game: &Game) -> Result<()> {
        // Upsert: create and update flows share one write path.
        retry_async_with_config(RetryConfig::aggressive(), || async {
            self.collection
                .replace_one(doc! { "_id": &game.id }, game)
                .with_options(ReplaceOptions::builder().upsert(true).build())
                .await
                .map(|_| ())
                .context("Failed to save game")
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        retry_async_with_config(RetryConfig::aggressive(), || async {
            self.collection
                .delete_one(doc! { "_id": id })
                .await
                .map(|_| ())
                .context("Failed to delete game")
        })
        .await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Game>> {
        retry_async_with_config(RetryConfig::default(), || async {
            self.collection
                .find_one(doc! { "name": name })
                .await
                .context("Failed to look up game by name")
        })
        .await
    }

    async fn list_by_template(&self, slug: &str, creator_id: Option<&str>) -> Result<Vec<Game>> {
        let mut filter = doc! { "template_slug": slug };
        if let Some(creator_id) = creator_id {
            filter.insert("creator_id", creator_id);
        }

        let find_options = FindOptions::builder()
            .sort(doc! { "updated_at": -1 })
            .build();

        let cursor = self
            .collection
            .find(filter)
            .with_options(find_options)
            .await
            .context("Failed to list games")?;

        cursor
            .try_collect()
            .await
            .context("Failed to collect game records")
    }

    async fn ping(&self) -> Result<()> {
        self.mongo
            .run_command(doc! { "ping": 1 })
            .await
            .context("MongoDB ping failed")?;
        Ok(())
    }
}

/// In-memory store. Backs local development without a MongoDB instance and
/// doubles as the integration-test store.
#[derive(Default)]
pub struct InMemoryGameStore {
    games: Mutex<HashMap<String, Game>>,
}

impl InMemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameStore for InMemoryGameStore {
    async fn load(&self, id: &str) -> Result<Option<Game>> {
        Ok(self.games.lock().unwrap().get(id).cloned())
    }

    async fn save(&self, game: &Game) -> Result<()> {
        self.games
            .lock()
            .unwrap()
            .insert(game.id.clone(), game.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.games.lock().unwrap().remove(id);
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Game>> {
        Ok(self
            .games
            .lock()
            .unwrap()
            .values()
            .find(|g| g.name == name)
            .cloned())
    }

    async fn list_by_template(&self, slug: &str, creator_id: Option<&str>) -> Result<Vec<Game>> {
        let games = self.games.lock().unwrap();
        let mut matches: Vec<Game> = games
            .values()
            .filter(|g| g.template_slug == slug)
            .filter(|g| creator_id.map_or(true, |c| g.creator_id == c))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(matches)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn game(id: &str, name: &str, creator: &str) -> Game {
        let now = Utc::now();
        Game {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            thumbnail_image: String::new(),
            is_published: false,
            creator_id: creator.to_string(),
            template_slug: "math-generator".to_string(),
            game_json: json!({}),
            total_played: 0,
            liked_by_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn in_memory_store_round_trips() {
        let store = InMemoryGameStore::new();
        store.save(&game("g1", "Sums", "u1")).await.unwrap();

        assert!(store.load("g1").await.unwrap().is_some());
        assert!(store.find_by_name("Sums").await.unwrap().is_some());
        assert!(store.find_by_name("Other").await.unwrap().is_none());

        store.delete("g1").await.unwrap();
        assert!(store.load("g1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_by_creator() {
        let store = InMemoryGameStore::new();
        store.save(&game("g1", "A", "u1")).await.unwrap();
        store.save(&game("g2", "B", "u2")).await.unwrap();

        let all = store.list_by_template("math-generator", None).await.unwrap();
        assert_eq!(all.len(), 2);

        let mine = store
            .list_by_template("math-generator", Some("u1"))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "g1");
    }

    #[tokio::test]
    async fn save_overwrites_by_id_last_writer_wins() {
        let store = InMemoryGameStore::new();
        store.save(&game("g1", "First", "u1")).await.unwrap();
        store.save(&game("g1", "Second", "u1")).await.unwrap();

        let loaded = store.load("g1").await.unwrap().unwrap();
        assert_eq!(loaded.name, "Second");
    }
}
