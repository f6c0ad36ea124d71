//! [NED](https://ned.nl) «utilizations» client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{
    Client, Url,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{
    core::{source_type::SourceType, window::Window},
    prelude::*,
};

pub const DEFAULT_BASE_URL: &str = "https://api.ned.nl/v1";

/// Source of raw utilization observations.
///
/// The mix computation is driven through this seam so that it can be exercised
/// without the network.
#[async_trait]
pub trait UtilizationSource: Sync {
    async fn get_utilizations(
        &self,
        source_type: SourceType,
        window: Window,
    ) -> Result<Vec<Utilization>>;
}

pub struct Api {
    client: Client,
    base_url: Url,
}

impl Api {
    /// Build the client.
    ///
    /// Fails on a blank API key before any network call is made.
    pub fn new(
        api_key: &str,
        base_url: Url,
        timeout: Duration,
        accept_invalid_certs: bool,
    ) -> Result<Self> {
        ensure!(!api_key.trim().is_empty(), "the NED API key must not be empty");
        if accept_invalid_certs {
            warn!("certificate verification towards the NED API is disabled");
        }
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-AUTH-TOKEN",
            HeaderValue::from_str(api_key).context("the API key is not a valid header value")?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/ld+json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;
        Ok(Self { client, base_url })
    }

    fn utilizations_url(&self) -> String {
        format!("{}/utilizations", self.base_url.as_str().trim_end_matches('/'))
    }
}

#[async_trait]
impl UtilizationSource for Api {
    /// Fetch the utilizations of a single source type over the window.
    ///
    /// A single GET suffices: at hourly granularity the provider's page cap of
    /// 200 items covers more than a week.
    #[instrument(skip_all, fields(source_type = %source_type, window = %window))]
    async fn get_utilizations(
        &self,
        source_type: SourceType,
        window: Window,
    ) -> Result<Vec<Utilization>> {
        info!("fetching…");
        let collection: Collection = self
            .client
            .get(self.utilizations_url())
            .query(&Query::new(source_type, window))
            .send()
            .await
            .context("failed to call the utilizations endpoint")?
            .error_for_status()
            .context("the utilizations request failed")?
            .json()
            .await
            .context("failed to deserialize the utilizations response")?;
        debug!(n_utilizations = collection.members.len());
        Ok(collection.members)
    }
}

/// One measured production volume over a time bucket.
#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct Utilization {
    /// Start of the bucket as reported by the provider.
    ///
    /// Kept opaque: the provider's ISO-8601 instants compare correctly as
    /// strings, and no timezone normalization is applied on top.
    #[serde(rename = "validfrom")]
    pub valid_from: String,

    /// Volume in the provider's units; NED encodes it as either a number or a
    /// decimal string, and omits it for missing measurements.
    #[serde_as(as = "serde_with::PickFirst<(_, serde_with::DisplayFromStr)>")]
    #[serde(default)]
    pub volume: f64,
}

/// JSON-LD collection envelope; everything except the member list is ignored.
#[derive(Deserialize)]
struct Collection {
    #[serde(rename = "hydra:member", alias = "member", default)]
    members: Vec<Utilization>,
}

#[derive(Serialize)]
struct Query {
    #[serde(rename = "itemsPerPage")]
    items_per_page: u16,

    point: u8,

    #[serde(rename = "type")]
    type_code: u8,

    classification: u8,

    granularity: u8,

    #[serde(rename = "granularitytimezone")]
    granularity_timezone: u8,

    activity: u8,

    #[serde(rename = "validfrom[after]")]
    valid_from_after: NaiveDate,

    #[serde(rename = "validfrom[strictly_before]")]
    valid_from_strictly_before: NaiveDate,
}

impl Query {
    /// Pinned to national production volumes per hour: point 0 is the whole of
    /// the Netherlands, classification 2 is current data, granularity 5 is
    /// hourly in the local granularity timezone, activity 1 is production.
    const fn new(source_type: SourceType, window: Window) -> Self {
        Self {
            items_per_page: 200,
            point: 0,
            type_code: source_type.code(),
            classification: 2,
            granularity: 5,
            granularity_timezone: 1,
            activity: 1,
            valid_from_after: window.start,
            valid_from_strictly_before: window.end,
        }
    }
}
