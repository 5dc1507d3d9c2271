use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{Listing, ListingsService};

const REALTY_API: &str = "https://zylalabs.com/api/1476/australia+realty+api/1221/get+properties+list";

/// Australian realty listings API (buy channel, region search).
#[derive(Clone)]
pub struct RealtyListings {
    client: Client,
    token: String,
    url: String,
}

impl RealtyListings {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_url(token, REALTY_API)
    }

    pub fn with_url(token: impl Into<String>, url: impl Into<String>) -> Self {
        Self { client: Client::new(), token: token.into(), url: url.into() }
    }
}

#[async_trait]
impl ListingsService for RealtyListings {
    async fn listings(&self, region: &str) -> Result<Vec<Listing>> {
        let response = self.client.get(&self.url)
            .query(&[
                ("channel", "buy"),
                ("searchLocation", region),
                ("searchLocationSubtext", "Region"),
                ("type", "region"),
            ])
            .bearer_auth(&self.token)
            .send().await
            .with_context(|| format!("GET {} for {region:?}", self.url))?;
        let status = response.status();
        if !status.is_success() {
            bail!("listings service returned {status} for {region:?}");
        }
        let value = response.json::<Value>().await.context("Invalid JSON from listings service")?;
        parse_listings(&value)
    }
}

/// Read the first result tier. Coordinates are kept optional; callers decide
/// what to do with listings that cannot be placed.
pub(crate) fn parse_listings(value: &Value) -> Result<Vec<Listing>> {
    let tiers = value["tieredResults"].as_array()
        .ok_or_else(|| anyhow!("Listings response has no \"tieredResults\" array"))?;
    let Some(first) = tiers.first() else { return Ok(Vec::new()) };

    Ok(first["results"].as_array()
        .map(|results| results.iter().map(|property| {
            let address = &property["address"];
            Listing {
                street_address: address["streetAddress"].as_str().map(str::to_string),
                longitude: address["location"]["longitude"].as_f64(),
                latitude: address["location"]["latitude"].as_f64(),
            }
        }).collect())
        .unwrap_or_default())
}
