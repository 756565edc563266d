use std::collections::BTreeSet;
use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use url::Url;

use crate::errors::QueryError;
use crate::model::{Entry, FilterSpec, Table, ALL};

use super::QueryBackend;

/// Credentialed client for the backend's tabular REST surface
///
/// Bound to one bearer token for its whole lifetime: when the session token
/// changes, the client is rebuilt rather than mutated, so a stale token can
/// never be sent again. Every call is a single bounded request; failures
/// propagate to the caller without retry.
#[derive(Debug)]
pub struct RestClient {
    /// HTTP client for REST requests
    client: Client,
    /// Base URL of the backend project
    base_url: Url,
    /// Anonymous project API key
    anon_key: String,
    /// Bearer token of the acting session
    access_token: String,
}

impl RestClient {
    /// Create a new client bound to `access_token`
    pub fn new(
        base_url: Url,
        anon_key: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url,
            anon_key: anon_key.into(),
            access_token: access_token.into(),
        }
    }

    /// The token this client is bound to
    pub fn token(&self) -> &str {
        &self.access_token
    }

    /// Build the REST endpoint for `table`
    fn table_url(&self, table: Table) -> Result<Url, QueryError> {
        self.base_url
            .join(&format!("rest/v1/{}", table.as_str()))
            .map_err(|e| QueryError::RequestFailed(format!("Invalid table endpoint: {}", e)))
    }

    /// Issue a GET against `url` and return the response body on success
    async fn get(&self, url: Url) -> Result<reqwest::Response, QueryError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QueryError::Timeout(e.to_string())
                } else {
                    QueryError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Backend error ({}): {}", status, message);

            return Err(match status.as_u16() {
                401 | 403 => QueryError::Unauthorized(message),
                code => QueryError::BackendRejected {
                    status_code: code,
                    message,
                },
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl QueryBackend for RestClient {
    async fn list_distinct_values(&self, table: Table, column: &str) -> Result<Vec<String>, QueryError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("select", column);

        let rows = self
            .get(url)
            .await?
            .json::<Vec<serde_json::Map<String, serde_json::Value>>>()
            .await
            .map_err(|e| QueryError::ParseError(e.to_string()))?;

        // The backend has no distinct push-down for this shape; dedup and
        // sort client-side from the single-column select.
        let distinct: BTreeSet<String> = rows
            .iter()
            .filter_map(|row| row.get(column))
            .filter_map(|value| value.as_str())
            .map(|value| value.to_string())
            .collect();

        let mut values = Vec::with_capacity(distinct.len() + 1);
        values.push(ALL.to_string());
        values.extend(distinct);
        Ok(values)
    }

    async fn query_entries(&self, table: Table, filter: &FilterSpec) -> Result<Vec<Entry>, QueryError> {
        let mut url = self.table_url(table)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            pairs.append_pair("order", "section_num.asc,entry_num.asc");
            if filter.country != ALL {
                pairs.append_pair("country", &format!("eq.{}", filter.country));
            }
            if filter.period != ALL {
                pairs.append_pair("period", &format!("eq.{}", filter.period));
            }
            if filter.section != ALL {
                pairs.append_pair("section", &format!("eq.{}", filter.section));
            }
            if !filter.search.is_empty() {
                pairs.append_pair("entry", &format!("ilike.%{}%", filter.search));
            }
        }

        let entries = self
            .get(url)
            .await?
            .json::<Vec<Entry>>()
            .await
            .map_err(|e| QueryError::ParseError(e.to_string()))?;

        debug!("{} rows from {} for [{}]", entries.len(), table, filter);
        Ok(entries)
    }
}
