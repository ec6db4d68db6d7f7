// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::Date;

use crate::ids::*;

/// One inventory line item as the backend stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub id: InventoryId,
    pub name: String,
    pub product_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "averagePrice", default, with = "wire::price")]
    pub average_price_cents: i64,
    #[serde(default)]
    pub amount: i64,
    pub unit_of_measurement: String,
    #[serde(default, with = "wire::date")]
    pub best_before_date: Option<Date>,
    #[serde(default)]
    pub never_expires: bool,
}

/// A record that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInventory {
    pub name: String,
    pub product_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "averagePrice", default, with = "wire::price")]
    pub average_price_cents: i64,
    #[serde(default)]
    pub amount: i64,
    pub unit_of_measurement: String,
    #[serde(default, with = "wire::date")]
    pub best_before_date: Option<Date>,
    #[serde(default)]
    pub never_expires: bool,
}

impl NewInventory {
    pub fn with_id(self, id: InventoryId) -> InventoryRecord {
        InventoryRecord {
            id,
            name: self.name,
            product_type: self.product_type,
            description: self.description,
            average_price_cents: self.average_price_cents,
            amount: self.amount,
            unit_of_measurement: self.unit_of_measurement,
            best_before_date: self.best_before_date,
            never_expires: self.never_expires,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Table columns, which double as sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InventoryColumn {
    Name,
    ProductType,
    Description,
    AveragePrice,
    Amount,
    UnitOfMeasurement,
    BestBeforeDate,
}

impl InventoryColumn {
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::ProductType,
        Self::Description,
        Self::AveragePrice,
        Self::Amount,
        Self::UnitOfMeasurement,
        Self::BestBeforeDate,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::ProductType => "Product",
            Self::Description => "Description",
            Self::AveragePrice => "Average Price",
            Self::Amount => "Amount",
            Self::UnitOfMeasurement => "Unit of Measurement",
            Self::BestBeforeDate => "Best Before Date",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::ProductType => "productType",
            Self::Description => "description",
            Self::AveragePrice => "averagePrice",
            Self::Amount => "amount",
            Self::UnitOfMeasurement => "unitOfMeasurement",
            Self::BestBeforeDate => "bestBeforeDate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|column| column.as_str().eq_ignore_ascii_case(value))
    }

    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::AveragePrice | Self::Amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormIntent {
    Create,
    Edit,
}

impl FormIntent {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Create => "Create Inventory",
            Self::Edit => "Edit Inventory",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModalKind {
    Create,
    Edit,
    Delete,
}

impl ModalKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

impl From<FormIntent> for ModalKind {
    fn from(intent: FormIntent) -> Self {
        match intent {
            FormIntent::Create => Self::Create,
            FormIntent::Edit => Self::Edit,
        }
    }
}

mod wire {
    pub mod price {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_f64(*cents as f64 / 100.0)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
            let value = Option::<f64>::deserialize(deserializer)?;
            Ok(value.map_or(0, |units| (units * 100.0).round() as i64))
        }
    }

    pub mod date {
        use serde::{Deserialize, Deserializer, Serializer};
        use time::Date;

        use crate::values::{format_input_date, parse_wire_date};

        pub fn serialize<S: Serializer>(
            value: &Option<Date>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(date) => serializer.serialize_str(&format_input_date(*date)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Date>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            Ok(raw.and_then(|raw| {
                let parsed = parse_wire_date(&raw);
                if parsed.is_none() && !raw.trim().is_empty() {
                    tracing::warn!(value = %raw, "dropping unparseable bestBeforeDate");
                }
                parsed
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InventoryColumn, InventoryRecord, NewInventory, SortDirection};
    use crate::InventoryId;
    use anyhow::Result;
    use time::{Date, Month};

    #[test]
    fn record_decodes_backend_json() -> Result<()> {
        let record: InventoryRecord = serde_json::from_str(
            r#"{
                "id": "64b1",
                "name": "Flour",
                "productType": "Grain",
                "description": null,
                "averagePrice": 2.5,
                "amount": 10,
                "unitOfMeasurement": "kg",
                "bestBeforeDate": "2026-05-01T00:00:00.000+00:00",
                "neverExpires": false
            }"#,
        )?;
        assert_eq!(record.id, InventoryId::new("64b1"));
        assert_eq!(record.average_price_cents, 250);
        assert_eq!(
            record.best_before_date,
            Some(Date::from_calendar_date(2026, Month::May, 1)?)
        );
        Ok(())
    }

    #[test]
    fn record_tolerates_missing_optional_fields_and_bad_dates() -> Result<()> {
        let record: InventoryRecord = serde_json::from_str(
            r#"{"id":"1","name":"Salt","productType":"Spice","unitOfMeasurement":"g","bestBeforeDate":"soon"}"#,
        )?;
        assert_eq!(record.description, None);
        assert_eq!(record.average_price_cents, 0);
        assert_eq!(record.amount, 0);
        assert_eq!(record.best_before_date, None);
        assert!(!record.never_expires);
        Ok(())
    }

    #[test]
    fn new_inventory_encodes_camel_case_without_id() -> Result<()> {
        let draft = NewInventory {
            name: "Flour".to_owned(),
            product_type: "Grain".to_owned(),
            description: None,
            average_price_cents: 199,
            amount: 10,
            unit_of_measurement: "kg".to_owned(),
            best_before_date: None,
            never_expires: true,
        };
        let value = serde_json::to_value(&draft)?;
        assert_eq!(value["productType"], "Grain");
        assert_eq!(value["averagePrice"], 1.99);
        assert!(value["bestBeforeDate"].is_null());
        assert!(value.get("id").is_none());
        Ok(())
    }

    #[test]
    fn column_keys_parse_case_insensitively() {
        assert_eq!(
            InventoryColumn::parse("bestbeforedate"),
            Some(InventoryColumn::BestBeforeDate)
        );
        assert_eq!(InventoryColumn::parse("calories"), None);
        assert_eq!(SortDirection::parse("desc"), Some(SortDirection::Desc));
    }
}
