// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow, bail};

use crate::{InventoryId, InventoryRecord, NewInventory, Product};

/// Backend the list view talks to. Implementations block; callers decide
/// which thread they run on.
pub trait InventoryService: Send + Sync {
    fn fetch_inventory(&self) -> Result<Vec<InventoryRecord>>;
    fn fetch_products(&self) -> Result<Vec<Product>>;
    fn create_inventory(&self, draft: &NewInventory) -> Result<InventoryRecord>;
    fn update_inventory(&self, record: &InventoryRecord) -> Result<InventoryRecord>;
    fn delete_inventory(&self, ids: &[InventoryId]) -> Result<()>;
}

/// Correlates a queued call with its completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    FetchInventory,
    FetchProducts,
    Create(NewInventory),
    Update(InventoryRecord),
    Delete(Vec<InventoryId>),
}

impl ServiceCall {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FetchInventory => "fetch_inventory",
            Self::FetchProducts => "fetch_products",
            Self::Create(_) => "create_inventory",
            Self::Update(_) => "update_inventory",
            Self::Delete(_) => "delete_inventory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
    pub id: RequestId,
    pub call: ServiceCall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceReply {
    Inventory(Vec<InventoryRecord>),
    Products(Vec<Product>),
    Created(InventoryRecord),
    Updated(InventoryRecord),
    Deleted,
}

/// Result of one request. Errors are flattened to their display chain so
/// completions can cross threads and be compared in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub id: RequestId,
    pub result: Result<ServiceReply, String>,
}

pub fn perform<S>(service: &S, request: ServiceRequest) -> Completion
where
    S: InventoryService + ?Sized,
{
    let ServiceRequest { id, call } = request;
    let result = match call {
        ServiceCall::FetchInventory => service.fetch_inventory().map(ServiceReply::Inventory),
        ServiceCall::FetchProducts => service.fetch_products().map(ServiceReply::Products),
        ServiceCall::Create(draft) => service.create_inventory(&draft).map(ServiceReply::Created),
        ServiceCall::Update(record) => {
            service.update_inventory(&record).map(ServiceReply::Updated)
        }
        ServiceCall::Delete(ids) => service.delete_inventory(&ids).map(|()| ServiceReply::Deleted),
    };
    Completion {
        id,
        result: result.map_err(|error| format!("{error:#}")),
    }
}

/// Process-local backend used by `--demo` and tests.
#[derive(Debug, Default)]
pub struct MemoryInventoryService {
    inner: Mutex<MemoryStore>,
}

#[derive(Debug, Default)]
struct MemoryStore {
    records: Vec<InventoryRecord>,
    products: Vec<Product>,
    next_id: u64,
}

impl MemoryInventoryService {
    pub fn new(records: Vec<InventoryRecord>, products: Vec<Product>) -> Self {
        let next_id = records.len() as u64 + 1;
        Self {
            inner: Mutex::new(MemoryStore {
                records,
                products,
                next_id,
            }),
        }
    }

    pub fn snapshot(&self) -> Result<Vec<InventoryRecord>> {
        Ok(self.lock()?.records.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryStore>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("inventory store lock poisoned"))
    }
}

impl InventoryService for MemoryInventoryService {
    fn fetch_inventory(&self) -> Result<Vec<InventoryRecord>> {
        self.snapshot()
    }

    fn fetch_products(&self) -> Result<Vec<Product>> {
        Ok(self.lock()?.products.clone())
    }

    fn create_inventory(&self, draft: &NewInventory) -> Result<InventoryRecord> {
        let mut store = self.lock()?;
        let mut id = InventoryId::new(format!("inv-{}", store.next_id));
        while store.records.iter().any(|record| record.id == id) {
            store.next_id += 1;
            id = InventoryId::new(format!("inv-{}", store.next_id));
        }
        store.next_id += 1;
        let record = draft.clone().with_id(id);
        store.records.push(record.clone());
        Ok(record)
    }

    fn update_inventory(&self, record: &InventoryRecord) -> Result<InventoryRecord> {
        let mut store = self.lock()?;
        let Some(slot) = store.records.iter_mut().find(|row| row.id == record.id) else {
            bail!("inventory {} not found", record.id);
        };
        *slot = record.clone();
        Ok(record.clone())
    }

    fn delete_inventory(&self, ids: &[InventoryId]) -> Result<()> {
        let mut store = self.lock()?;
        store.records.retain(|record| !ids.contains(&record.id));
        Ok(())
    }
}
