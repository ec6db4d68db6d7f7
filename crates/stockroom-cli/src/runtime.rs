// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use stockroom_app::{
    InventoryId, InventoryRecord, InventoryService, MemoryInventoryService, NewInventory, Product,
};
use time::Date;

use crate::config::Config;

const DEMO_SEED: u64 = 7;

/// The service the binary talks to: the REST backend, or an in-memory store
/// seeded with demo data.
pub enum Backend {
    Http(stockroom_api::Client),
    Memory(MemoryInventoryService),
}

impl Backend {
    pub fn from_config(config: &Config, demo: bool, today: Date) -> Result<Self> {
        if demo {
            return Ok(Self::Memory(stockroom_testkit::demo_service(DEMO_SEED, today)));
        }
        let client = stockroom_api::Client::new(config.api_base_url(), config.api_timeout()?)
            .context("invalid [api] config; fix base_url/timeout values")?;
        Ok(Self::Http(client))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Http(client) => format!("{} (timeout {:?})", client.base_url(), client.timeout()),
            Self::Memory(_) => "in-memory demo data".to_owned(),
        }
    }

    fn service(&self) -> &dyn InventoryService {
        match self {
            Self::Http(client) => client,
            Self::Memory(memory) => memory,
        }
    }
}

impl InventoryService for Backend {
    fn fetch_inventory(&self) -> Result<Vec<InventoryRecord>> {
        self.service().fetch_inventory()
    }

    fn fetch_products(&self) -> Result<Vec<Product>> {
        self.service().fetch_products()
    }

    fn create_inventory(&self, draft: &NewInventory) -> Result<InventoryRecord> {
        self.service().create_inventory(draft)
    }

    fn update_inventory(&self, record: &InventoryRecord) -> Result<InventoryRecord> {
        self.service().update_inventory(record)
    }

    fn delete_inventory(&self, ids: &[InventoryId]) -> Result<()> {
        self.service().delete_inventory(ids)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckReport {
    pub records: usize,
    pub products: usize,
}

/// One synchronous round trip against both read endpoints.
pub fn check(backend: &Backend) -> Result<CheckReport> {
    let records = backend
        .fetch_inventory()
        .with_context(|| format!("fetch inventory from {}", backend.describe()))?;
    let products = backend
        .fetch_products()
        .with_context(|| format!("fetch products from {}", backend.describe()))?;
    tracing::info!(
        records = records.len(),
        products = products.len(),
        "startup check passed"
    );
    Ok(CheckReport {
        records: records.len(),
        products: products.len(),
    })
}
