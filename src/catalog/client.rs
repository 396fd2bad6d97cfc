//! Fetching catalog documents from upstream

use super::{aggregate, AggregatedCatalog, Champion, CourseDump, Game};
use crate::config::CatalogConfig;
use crate::error::{RelayError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct ChampionDocument {
    data: Vec<Champion>,
}

/// Upstream catalog access. The champion list is fetched once per process.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    champions_url: String,
    course_urls: BTreeMap<String, String>,
    champion_cache: Arc<RwLock<Option<Vec<Champion>>>>,
}

impl CatalogClient {
    pub fn new(client: Client, config: &CatalogConfig) -> Self {
        Self {
            client,
            champions_url: config.champions_url.clone(),
            course_urls: config.course_urls.clone(),
            champion_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Fetch and aggregate the course dump for `game`
    pub async fn courses(&self, game: Game) -> Result<AggregatedCatalog> {
        let url = self
            .course_urls
            .get(game.as_str())
            .ok_or_else(|| RelayError::InvalidGame(game.to_string()))?;

        info!("📚 Fetching course dump for {}", game);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(RelayError::Catalog(format!(
                "course dump for {} returned {}",
                game,
                response.status()
            )));
        }

        let dump: CourseDump = response.json().await?;
        debug!(
            "Course dump for {}: {} courses, {} videos",
            game,
            dump.courses.len(),
            dump.videos.len()
        );
        Ok(aggregate(dump))
    }

    /// Champion list, served from cache after the first successful fetch
    pub async fn champions(&self) -> Result<Vec<Champion>> {
        if let Some(cached) = self.champion_cache.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let mut cache = self.champion_cache.write().await;
        if let Some(cached) = cache.as_ref() {
            return Ok(cached.clone());
        }

        info!("🏆 Fetching champion list");
        let response = self.client.get(&self.champions_url).send().await?;
        if !response.status().is_success() {
            return Err(RelayError::Catalog(format!(
                "champion list returned {}",
                response.status()
            )));
        }

        let document: ChampionDocument = response.json().await?;
        *cache = Some(document.data.clone());
        Ok(document.data)
    }
}
