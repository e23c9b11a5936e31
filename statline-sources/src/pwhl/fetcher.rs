//! PWHL fetcher.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use statline_fetch::{FetchContext, GraphQlClient, PipelineError};

use super::api::{
    PLAYERS_QUERY, PwhlGame, PwhlPlayer, PwhlRoster, PwhlStanding, PwhlTeam, ROSTER_QUERY,
    SCHEDULE_QUERY, STANDINGS_QUERY, TEAMS_QUERY,
};
use super::descriptor::pwhl_descriptor;
use crate::descriptor::SourceDescriptor;
use crate::fetcher::{SourceFetcher, to_value, to_values, unsupported_entity};

/// Fetches PWHL entities over GraphQL.
#[derive(Debug, Clone)]
pub struct PwhlFetcher {
    descriptor: SourceDescriptor,
    graphql: GraphQlClient,
    ctx: FetchContext,
}

impl PwhlFetcher {
    /// Creates a fetcher over a GraphQL client.
    pub fn new(graphql: GraphQlClient, ctx: FetchContext) -> Self {
        Self {
            descriptor: pwhl_descriptor(),
            graphql,
            ctx,
        }
    }

    /// Runs a query and returns the named top-level field.
    async fn query_field(&self, query: &str, field: &str, variables: Value) -> Result<Value, PipelineError> {
        let mut data: Value = self
            .ctx
            .call(|| self.graphql.query(query, variables.clone()))
            .await?;

        match data.get_mut(field).map(Value::take) {
            Some(value) => Ok(value),
            None => Err(PipelineError::Parse {
                url: self.graphql.url(),
                cause: format!("response data has no '{field}' field"),
            }),
        }
    }

    /// Runs a season listing query and validates its records as `T`.
    async fn list<T>(&self, query: &str, field: &str, season: &str) -> Result<Vec<Value>, PipelineError>
    where
        T: DeserializeOwned + Serialize + Send,
    {
        let url = self.graphql.url();
        let variables = json!({ "season": season_year(&url, season)? });
        let value = self.query_field(query, field, variables).await?;

        // A season without published data answers null.
        let records: Vec<T> = match value {
            Value::Null => Vec::new(),
            value => serde_json::from_value(value).map_err(|e| PipelineError::Parse {
                url: url.clone(),
                cause: format!("{field}: {e}"),
            })?,
        };
        debug!(field, records = records.len(), "Listing fetched");
        to_values(&url, &records)
    }
}

/// Parses a season key into the `Int` the API expects.
fn season_year(url: &str, season: &str) -> Result<i64, PipelineError> {
    season.trim().parse().map_err(|_| PipelineError::Parse {
        url: url.to_string(),
        cause: format!("season key '{season}' is not a year"),
    })
}

#[async_trait]
impl SourceFetcher for PwhlFetcher {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    #[instrument(skip(self), fields(source = "pwhl"))]
    async fn fetch_entity(&self, season: &str, entity: &str) -> Result<Vec<Value>, PipelineError> {
        match entity {
            "teams" => self.list::<PwhlTeam>(TEAMS_QUERY, "teams", season).await,
            "players" => self.list::<PwhlPlayer>(PLAYERS_QUERY, "players", season).await,
            "schedule" => self.list::<PwhlGame>(SCHEDULE_QUERY, "schedule", season).await,
            "standings" => {
                self.list::<PwhlStanding>(STANDINGS_QUERY, "standings", season)
                    .await
            }
            other => Err(unsupported_entity(self.kind(), other)),
        }
    }

    #[instrument(skip(self), fields(source = "pwhl"))]
    async fn fetch_item(&self, season: &str, entity: &str, id: &str) -> Result<Value, PipelineError> {
        match entity {
            "rosters" => {
                let url = self.graphql.url();
                let variables = json!({ "season": season_year(&url, season)?, "teamId": id });
                let value = self.query_field(ROSTER_QUERY, "roster", variables).await?;
                let roster: PwhlRoster =
                    serde_json::from_value(value).map_err(|e| PipelineError::Parse {
                        url: url.clone(),
                        cause: format!("roster {id}: {e}"),
                    })?;
                to_value(&url, &roster)
            }
            other => Err(unsupported_entity(self.kind(), other)),
        }
    }
}
