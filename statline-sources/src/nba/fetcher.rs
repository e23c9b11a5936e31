//! NBA fetcher.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use statline_fetch::{FetchClient, FetchContext, PipelineError, RequestOptions};

use super::api::{NbaGame, NbaPlayer, NbaStanding, NbaTeam, Page, Single};
use super::descriptor::nba_descriptor;
use crate::descriptor::SourceDescriptor;
use crate::fetcher::{SourceFetcher, to_value, to_values, unsupported_entity};

/// Records requested per page.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Hard stop for cursor pagination.
pub const DEFAULT_MAX_PAGES: usize = 500;

// ============================================================================
// Fetcher
// ============================================================================

/// Fetches NBA entities over REST.
#[derive(Debug, Clone)]
pub struct NbaFetcher {
    descriptor: SourceDescriptor,
    client: FetchClient,
    ctx: FetchContext,
    per_page: u32,
    max_pages: usize,
}

impl NbaFetcher {
    /// Creates a fetcher over a configured client.
    pub fn new(client: FetchClient, ctx: FetchContext) -> Self {
        Self {
            descriptor: nba_descriptor(),
            client,
            ctx,
            per_page: DEFAULT_PER_PAGE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Sets the most pages one listing may span.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Fetches every page of a listing endpoint.
    ///
    /// A listing that still has a next cursor after `max_pages` pages is an
    /// error; a partial set is never returned.
    async fn list_all<T>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Vec<Value>, PipelineError>
    where
        T: DeserializeOwned + Serialize + Send,
    {
        let url = self.client.url_for(endpoint);
        let mut records: Vec<T> = Vec::new();
        let mut cursor: Option<u64> = None;

        for page_number in 1..=self.max_pages {
            let mut page_options = options.clone().query("per_page", self.per_page);
            if let Some(cursor) = cursor {
                page_options = page_options.query("cursor", cursor);
            }

            let page: Page<T> = self
                .ctx
                .call(|| self.client.get(endpoint, &page_options))
                .await?;
            debug!(endpoint, page = page_number, records = page.data.len(), "Page fetched");
            records.extend(page.data);

            match page.meta.and_then(|meta| meta.next_cursor) {
                None => return to_values(&url, &records),
                Some(next) if Some(next) == cursor => {
                    warn!(endpoint, cursor = next, "Cursor did not advance, stopping pagination");
                    return to_values(&url, &records);
                }
                Some(next) => cursor = Some(next),
            }
        }

        warn!(endpoint, pages = self.max_pages, records = records.len(), "Page limit reached");
        Err(PipelineError::Parse {
            url,
            cause: format!("listing exceeds {} pages", self.max_pages),
        })
    }
}

#[async_trait]
impl SourceFetcher for NbaFetcher {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    #[instrument(skip(self), fields(source = "nba"))]
    async fn fetch_entity(&self, season: &str, entity: &str) -> Result<Vec<Value>, PipelineError> {
        match entity {
            "teams" => self.list_all::<NbaTeam>("teams", RequestOptions::new()).await,
            "players" => {
                let options = RequestOptions::new().query("seasons[]", season);
                self.list_all::<NbaPlayer>("players", options).await
            }
            "games" => {
                let options = RequestOptions::new().query("seasons[]", season);
                self.list_all::<NbaGame>("games", options).await
            }
            "standings" => {
                let options = RequestOptions::new().query("season", season);
                self.list_all::<NbaStanding>("standings", options).await
            }
            other => Err(unsupported_entity(self.kind(), other)),
        }
    }

    #[instrument(skip(self), fields(source = "nba"))]
    async fn fetch_item(&self, _season: &str, entity: &str, id: &str) -> Result<Value, PipelineError> {
        match entity {
            "team_details" => {
                let endpoint = format!("teams/{id}");
                let options = RequestOptions::new();
                let team: Single<NbaTeam> = self
                    .ctx
                    .call(|| self.client.get(&endpoint, &options))
                    .await?;
                to_value(&self.client.url_for(&endpoint), &team.data)
            }
            other => Err(unsupported_entity(self.kind(), other)),
        }
    }
}
