//! CRM list calls
//!
//! Three sequential GETs (contacts, companies, deals), one page each. A
//! failure on any endpoint aborts the whole load; no partial results are
//! returned.

use reqwest::Url;
use reqwest::header::{ACCEPT, HeaderValue};
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::item::{CrmObject, IntegrationItem, ItemType, ListResponse};
use crate::normalize::normalize;

/// Public HubSpot API host.
pub const DEFAULT_API_BASE: &str = "https://api.hubapi.com";

/// Records requested per list call.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Pull the bearer token out of a serialized credential record.
pub fn access_token_from_json(credentials: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(credentials)
        .map_err(|e| Error::CredentialsFormat(e.to_string()))?;
    if !value.is_object() {
        return Err(Error::CredentialsFormat("expected a JSON object".into()));
    }

    value
        .get("access_token")
        .and_then(serde_json::Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or(Error::MissingAccessToken)
}

/// Bearer-authenticated client for the CRM objects API.
#[derive(Clone)]
pub struct CrmClient {
    http: reqwest::Client,
    api_base: Url,
    page_size: u32,
}

impl CrmClient {
    pub fn new(http: reqwest::Client, api_base: &str, page_size: u32) -> Result<Self> {
        let api_base = Url::parse(api_base).map_err(|e| Error::Config(e.to_string()))?;
        if api_base.cannot_be_a_base() {
            return Err(Error::Config(format!("{api_base} cannot be a base URL")));
        }
        Ok(Self {
            http,
            api_base,
            page_size,
        })
    }

    /// Load items for a serialized credential record.
    pub async fn load_items(&self, credentials: &str) -> Result<Vec<IntegrationItem>> {
        let access_token = access_token_from_json(credentials)?;
        self.fetch_items(&access_token).await
    }

    /// Contacts, then companies, then deals, normalized.
    #[instrument(skip_all)]
    pub async fn fetch_items(&self, access_token: &str) -> Result<Vec<IntegrationItem>> {
        let mut items = Vec::new();
        for item_type in ItemType::ALL {
            let objects = self.list_objects(access_token, item_type).await?;
            items.extend(objects.iter().map(|object| normalize(object, item_type)));
        }
        info!(items = items.len(), "loaded HubSpot items");
        Ok(items)
    }

    /// First page of one object type.
    pub async fn list_objects(
        &self,
        access_token: &str,
        item_type: ItemType,
    ) -> Result<Vec<CrmObject>> {
        let url = self.list_url(item_type)?;

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(|e| fetch_error(item_type, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(fetch_error(
                item_type,
                format!("{} returned {status}: {body}", item_type.object_path()),
            ));
        }

        let page = response
            .json::<ListResponse>()
            .await
            .map_err(|e| fetch_error(item_type, format!("invalid list response: {e}")))?;

        if page.paging.is_some() {
            debug!(
                item_type = item_type.as_str(),
                page_size = self.page_size,
                "more records available beyond first page"
            );
        }
        Ok(page.results)
    }

    /// `{api_base}/crm/v3/objects/{type}?limit=N`, keeping any path prefix on the base.
    fn list_url(&self, item_type: ItemType) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("{} cannot be a base URL", self.api_base)))?
            .pop_if_empty()
            .extend(["crm", "v3", "objects", item_type.object_path()]);
        url.query_pairs_mut()
            .append_pair("limit", &self.page_size.to_string());
        Ok(url)
    }
}

fn fetch_error(item_type: ItemType, message: String) -> Error {
    warn!(item_type = item_type.as_str(), error = %message, "HubSpot list call failed");
    metrics::counter!(
        "integration_upstream_errors_total",
        "operation" => format!("list_{}", item_type.object_path())
    )
    .increment(1);
    Error::Fetch(message)
}
