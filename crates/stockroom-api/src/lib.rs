// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use stockroom_app::{InventoryId, InventoryRecord, InventoryService, NewInventory, Product};
use url::Url;

/// Blocking client for the inventory REST backend.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let parsed = Url::parse(&base_url)
            .with_context(|| format!("api.base_url {base_url:?} is not a valid URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "api.base_url must use http or https, got {:?} -- e.g. http://localhost:8080",
                parsed.scheme()
            );
        }
        if timeout.is_zero() {
            bail!("api.timeout must be positive");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn inventory_url(&self) -> String {
        format!("{}/inventory", self.base_url)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let body = self
            .send(request)?
            .text()
            .with_context(|| format!("read {what} response"))?;
        serde_json::from_str(&body).with_context(|| format!("decode {what} response"))
    }
}

impl InventoryService for Client {
    fn fetch_inventory(&self) -> Result<Vec<InventoryRecord>> {
        let records: Vec<InventoryRecord> =
            self.send_json(self.http.get(self.inventory_url()), "inventory list")?;
        tracing::debug!(count = records.len(), "fetched inventory");
        Ok(records)
    }

    fn fetch_products(&self) -> Result<Vec<Product>> {
        let products: Vec<Product> = self.send_json(
            self.http.get(format!("{}/products", self.base_url)),
            "product list",
        )?;
        tracing::debug!(count = products.len(), "fetched products");
        Ok(products)
    }

    fn create_inventory(&self, draft: &NewInventory) -> Result<InventoryRecord> {
        let created: Option<InventoryRecord> = self.send_json(
            self.http.post(self.inventory_url()).json(draft),
            "create inventory",
        )?;
        created.ok_or_else(|| anyhow!("server returned no record for {:?}", draft.name))
    }

    fn update_inventory(&self, record: &InventoryRecord) -> Result<InventoryRecord> {
        let updated: Option<InventoryRecord> = self.send_json(
            self.http.put(self.inventory_url()).json(record),
            "update inventory",
        )?;
        updated.ok_or_else(|| anyhow!("inventory {} not found", record.id))
    }

    fn delete_inventory(&self, ids: &[InventoryId]) -> Result<()> {
        self.send(self.http.delete(self.inventory_url()).json(ids))?;
        tracing::debug!(count = ids.len(), "deleted inventory");
        Ok(())
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!(
            "request to {} timed out -- raise [api].timeout or check the server ({})",
            base_url,
            error
        );
    }
    anyhow!(
        "cannot reach {} -- check [api].base_url or start the inventory server ({})",
        base_url,
        error
    )
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body) {
        let detail = [parsed.message, parsed.error]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty());
        if let Some(detail) = detail {
            return anyhow!("server error ({}): {}", status.as_u16(), detail.trim());
        }
    }

    let body = body.trim();
    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow!("server returned {}", status.as_u16())
}
