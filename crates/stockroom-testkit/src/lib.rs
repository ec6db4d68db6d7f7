// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow, bail};
use stockroom_app::{
    InventoryId, InventoryRecord, InventoryService, MemoryInventoryService, NewInventory, Product,
    ProductId, STANDARD_UNITS, ServiceCall,
};
use time::{Date, Duration, Month};

const PRODUCT_TYPES: [&str; 8] = [
    "Baking",
    "Beverages",
    "Canned Goods",
    "Dairy",
    "Grain",
    "Produce",
    "Spices",
    "Cleaning",
];

const ITEM_NAMES: [&str; 24] = [
    "Flour",
    "Sugar",
    "Rice",
    "Oats",
    "Coffee Beans",
    "Black Tea",
    "Olive Oil",
    "Tomato Paste",
    "Chickpeas",
    "Lentils",
    "Butter",
    "Milk",
    "Cheddar",
    "Potatoes",
    "Onions",
    "Garlic",
    "Cinnamon",
    "Paprika",
    "Sea Salt",
    "Baking Soda",
    "Dish Soap",
    "Vinegar",
    "Honey",
    "Pasta",
];

const DESCRIPTIONS: [&str; 8] = [
    "bulk bag",
    "back shelf",
    "opened",
    "restock monthly",
    "walk-in cooler",
    "supplier sample",
    "",
    "",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn chance(&mut self, one_in: u64) -> bool {
        one_in > 0 && self.next_u64() % one_in == 0
    }
}

/// Seeded generator for believable pantry stock.
#[derive(Debug, Clone)]
pub struct PantryFaker {
    rng: DeterministicRng,
    today: Date,
    issued: usize,
}

impl PantryFaker {
    pub fn new(seed: u64, today: Date) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            today,
            issued: 0,
        }
    }

    pub fn products(&self) -> Vec<Product> {
        PRODUCT_TYPES
            .iter()
            .enumerate()
            .map(|(index, name)| Product {
                id: ProductId::new(format!("prod-{}", index + 1)),
                name: (*name).to_owned(),
            })
            .collect()
    }

    pub fn draft(&mut self) -> NewInventory {
        let name = self.pick(&ITEM_NAMES).to_owned();
        let product_type = self.pick(&PRODUCT_TYPES).to_owned();
        let description = Some(self.pick(&DESCRIPTIONS))
            .filter(|text| !text.is_empty())
            .map(str::to_owned);
        let unit = STANDARD_UNITS[self.rng.int_n(STANDARD_UNITS.len())].key;
        let never_expires = self.rng.chance(5);
        let best_before_date = if never_expires || self.rng.chance(8) {
            None
        } else {
            let offset = self.rng.int_n(400) as i64 - 30;
            Some(self.today + Duration::days(offset))
        };

        NewInventory {
            name,
            product_type,
            description,
            average_price_cents: 25 + self.rng.int_n(4_975) as i64,
            amount: self.rng.int_n(60) as i64,
            unit_of_measurement: unit.to_owned(),
            best_before_date,
            never_expires,
        }
    }

    pub fn record(&mut self) -> InventoryRecord {
        self.issued += 1;
        let id = InventoryId::new(format!("inv-{}", self.issued));
        self.draft().with_id(id)
    }

    pub fn records(&mut self, count: usize) -> Vec<InventoryRecord> {
        (0..count).map(|_| self.record()).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

/// In-memory backend seeded with generated stock for `--demo`.
pub fn demo_service(seed: u64, today: Date) -> MemoryInventoryService {
    let mut faker = PantryFaker::new(seed, today);
    let products = faker.products();
    let records = faker.records(24);
    MemoryInventoryService::new(records, products)
}

pub fn fixture_date() -> Date {
    Date::from_calendar_date(2026, Month::March, 14).unwrap_or(Date::MIN)
}

pub fn sample_products() -> Vec<Product> {
    ["Grain", "Dairy", "Produce"]
        .iter()
        .enumerate()
        .map(|(index, name)| Product {
            id: ProductId::new(format!("prod-{}", index + 1)),
            name: (*name).to_owned(),
        })
        .collect()
}

pub fn flour_record() -> InventoryRecord {
    InventoryRecord {
        id: InventoryId::new("inv-1"),
        name: "Flour".to_owned(),
        product_type: "Grain".to_owned(),
        description: Some("bulk bag".to_owned()),
        average_price_cents: 450,
        amount: 10,
        unit_of_measurement: "kg".to_owned(),
        best_before_date: None,
        never_expires: true,
    }
}

/// Three records covering a dated item, a never-expiring item and an unknown
/// unit key.
pub fn sample_records() -> Vec<InventoryRecord> {
    vec![
        flour_record(),
        InventoryRecord {
            id: InventoryId::new("inv-2"),
            name: "Milk".to_owned(),
            product_type: "Dairy".to_owned(),
            description: None,
            average_price_cents: 129,
            amount: 4,
            unit_of_measurement: "l".to_owned(),
            best_before_date: Some(fixture_date()),
            never_expires: false,
        },
        InventoryRecord {
            id: InventoryId::new("inv-3"),
            name: "Apples".to_owned(),
            product_type: "Produce".to_owned(),
            description: None,
            average_price_cents: 75,
            amount: 30,
            unit_of_measurement: "bushel".to_owned(),
            best_before_date: Some(fixture_date() + Duration::days(21)),
            never_expires: false,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchInventory,
    FetchProducts,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn of(call: &ServiceCall) -> Self {
        match call {
            ServiceCall::FetchInventory => Self::FetchInventory,
            ServiceCall::FetchProducts => Self::FetchProducts,
            ServiceCall::Create(_) => Self::Create,
            ServiceCall::Update(_) => Self::Update,
            ServiceCall::Delete(_) => Self::Delete,
        }
    }
}

/// Service double: records every call and fails queued operations on demand.
/// Successful calls fall through to an in-memory store.
#[derive(Debug, Default)]
pub struct ScriptedService {
    store: MemoryInventoryService,
    calls: Mutex<Vec<ServiceCall>>,
    failures: Mutex<VecDeque<(Operation, String)>>,
}

impl ScriptedService {
    pub fn new(records: Vec<InventoryRecord>, products: Vec<Product>) -> Self {
        Self {
            store: MemoryInventoryService::new(records, products),
            calls: Mutex::default(),
            failures: Mutex::default(),
        }
    }

    pub fn with_samples() -> Self {
        Self::new(sample_records(), sample_products())
    }

    /// The next call of `operation` fails with `message`.
    pub fn fail_next(&self, operation: Operation, message: impl Into<String>) -> Result<()> {
        lock(&self.failures)?.push_back((operation, message.into()));
        Ok(())
    }

    pub fn calls(&self) -> Result<Vec<ServiceCall>> {
        Ok(lock(&self.calls)?.clone())
    }

    pub fn calls_of(&self, operation: Operation) -> Result<Vec<ServiceCall>> {
        Ok(self
            .calls()?
            .into_iter()
            .filter(|call| Operation::of(call) == operation)
            .collect())
    }

    pub fn records(&self) -> Result<Vec<InventoryRecord>> {
        self.store.snapshot()
    }

    fn record(&self, call: ServiceCall) -> Result<()> {
        let operation = Operation::of(&call);
        lock(&self.calls)?.push(call);

        let mut failures = lock(&self.failures)?;
        if let Some(index) = failures.iter().position(|(queued, _)| *queued == operation)
            && let Some((_, message)) = failures.remove(index)
        {
            bail!(message);
        }
        Ok(())
    }
}

impl InventoryService for ScriptedService {
    fn fetch_inventory(&self) -> Result<Vec<InventoryRecord>> {
        self.record(ServiceCall::FetchInventory)?;
        self.store.fetch_inventory()
    }

    fn fetch_products(&self) -> Result<Vec<Product>> {
        self.record(ServiceCall::FetchProducts)?;
        self.store.fetch_products()
    }

    fn create_inventory(&self, draft: &NewInventory) -> Result<InventoryRecord> {
        self.record(ServiceCall::Create(draft.clone()))?;
        self.store.create_inventory(draft)
    }

    fn update_inventory(&self, record: &InventoryRecord) -> Result<InventoryRecord> {
        self.record(ServiceCall::Update(record.clone()))?;
        self.store.update_inventory(record)
    }

    fn delete_inventory(&self, ids: &[InventoryId]) -> Result<()> {
        self.record(ServiceCall::Delete(ids.to_vec()))?;
        self.store.delete_inventory(ids)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| anyhow!("scripted service lock poisoned"))
}
