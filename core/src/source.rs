use crate::{
    range::StatsWindow,
    stats::StatRecord,
};
use eyre::{
    bail,
    Context as _,
    OptionExt as _,
    Result,
};
use lens_apps_stats_config::{
    AppId,
    Config,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    future::Future,
    pin::Pin,
    time::Duration,
};
use url::Url;

pub type StatsFuture<'a> = Pin<Box<dyn Future<Output = Result<StatRecord>> + Send + 'a>>;

/// Where per-app statistics come from.
pub trait StatsSource: Send + Sync {
    /// Fetch the stats of exactly one app for the given window.
    fn fetch(&self, app: AppId, window: StatsWindow) -> StatsFuture<'_>;

    /// Get the name of this source
    fn name(&self) -> &'static str;
}

const GLOBAL_PROTOCOL_STATS: &str = "\
query globalProtocolStats($request: GlobalProtocolStatsRequest) {
  globalProtocolStats(request: $request) {
    totalPosts
    totalMirrors
    totalComments
  }
}";

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'static str,
    variables: Variables<'a>,
}

#[derive(Debug, Serialize)]
struct Variables<'a> {
    request: GlobalProtocolStatsRequest<'a>,
}

#[derive(Debug, Serialize)]
struct GlobalProtocolStatsRequest<'a> {
    sources: [&'a str; 1],
    #[serde(flatten)]
    window: StatsWindow,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<GlobalProtocolStatsData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GlobalProtocolStatsData {
    global_protocol_stats: StatRecord,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Client for the Lens GraphQL API.
#[derive(Debug, Clone)]
pub struct LensClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl LensClient {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, endpoint })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.endpoint.clone(), config.request_timeout())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[instrument(level = "debug", skip(self), fields(app = %app))]
    async fn global_protocol_stats(&self, app: AppId, window: StatsWindow) -> Result<StatRecord> {
        let body = GraphQlRequest {
            query: GLOBAL_PROTOCOL_STATS,
            variables: Variables {
                request: GlobalProtocolStatsRequest {
                    sources: [app.as_str()],
                    window,
                },
            },
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .wrap_err_with(|| format!("Request for {app} failed"))?
            .error_for_status()
            .wrap_err_with(|| format!("Lens API rejected the request for {app}"))?;

        let response: GraphQlResponse = response
            .json()
            .await
            .wrap_err_with(|| format!("Failed to decode the response for {app}"))?;

        if !response.errors.is_empty() {
            let messages = response
                .errors
                .iter()
                .map(|error| error.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            bail!("Lens API returned errors for {app}: {messages}");
        }

        let data = response.data.ok_or_eyre("Lens API response has no data")?;
        trace!(?data, "Received stats");
        Ok(data.global_protocol_stats)
    }
}

impl StatsSource for LensClient {
    fn fetch(&self, app: AppId, window: StatsWindow) -> StatsFuture<'_> {
        Box::pin(self.global_protocol_stats(app, window))
    }

    fn name(&self) -> &'static str {
        "Lens API"
    }
}
