// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::values::{format_display_date, format_price_cents};
use crate::{InventoryColumn, InventoryId, InventoryRecord, UnitCatalog};

pub const NEVER_EXPIRES_LABEL: &str = "never";
pub const MISSING_DATE_LABEL: &str = "-";

/// A record with every reference resolved into what the table shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRecord {
    pub id: InventoryId,
    pub name: String,
    pub product_type: String,
    pub description: Option<String>,
    pub average_price_cents: i64,
    pub amount: i64,
    pub unit: String,
    pub unit_known: bool,
    pub best_before: Option<String>,
    pub never_expires: bool,
}

/// Borrowed value used by the sort comparator. `Missing` orders below
/// everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortValue<'a> {
    Missing,
    Integer(i64),
    Text(&'a str),
}

pub fn normalize(record: &InventoryRecord, units: &UnitCatalog) -> DisplayRecord {
    let (unit, unit_known) = match units.get(&record.unit_of_measurement) {
        Some(unit) => (unit.name.to_owned(), true),
        None => {
            tracing::warn!(
                id = %record.id,
                unit = %record.unit_of_measurement,
                "unit of measurement missing from catalog; showing raw key"
            );
            (record.unit_of_measurement.clone(), false)
        }
    };

    let best_before = if record.never_expires {
        None
    } else {
        record.best_before_date.map(format_display_date)
    };

    DisplayRecord {
        id: record.id.clone(),
        name: record.name.clone(),
        product_type: record.product_type.clone(),
        description: record
            .description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned),
        average_price_cents: record.average_price_cents,
        amount: record.amount,
        unit,
        unit_known,
        best_before,
        never_expires: record.never_expires,
    }
}

pub fn normalize_all(records: &[InventoryRecord], units: &UnitCatalog) -> Vec<DisplayRecord> {
    records
        .iter()
        .map(|record| normalize(record, units))
        .collect()
}

impl DisplayRecord {
    pub fn cell(&self, column: InventoryColumn) -> String {
        match column {
            InventoryColumn::Name => self.name.clone(),
            InventoryColumn::ProductType => self.product_type.clone(),
            InventoryColumn::Description => self.description.clone().unwrap_or_default(),
            InventoryColumn::AveragePrice => format_price_cents(self.average_price_cents),
            InventoryColumn::Amount => self.amount.to_string(),
            InventoryColumn::UnitOfMeasurement => self.unit.clone(),
            InventoryColumn::BestBeforeDate => match (&self.best_before, self.never_expires) {
                (_, true) => NEVER_EXPIRES_LABEL.to_owned(),
                (Some(date), false) => date.clone(),
                (None, false) => MISSING_DATE_LABEL.to_owned(),
            },
        }
    }

    pub fn sort_value(&self, column: InventoryColumn) -> SortValue<'_> {
        match column {
            InventoryColumn::Name => SortValue::Text(&self.name),
            InventoryColumn::ProductType => SortValue::Text(&self.product_type),
            InventoryColumn::Description => self
                .description
                .as_deref()
                .map_or(SortValue::Missing, SortValue::Text),
            InventoryColumn::AveragePrice => SortValue::Integer(self.average_price_cents),
            InventoryColumn::Amount => SortValue::Integer(self.amount),
            InventoryColumn::UnitOfMeasurement => SortValue::Text(&self.unit),
            InventoryColumn::BestBeforeDate => self
                .best_before
                .as_deref()
                .map_or(SortValue::Missing, SortValue::Text),
        }
    }
}
