// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! The inventory form's field-constraint table and the validator that reads it.
//!
//! Both the create and the edit session validate through [`validate`], so the
//! rules live in exactly one place: [`INVENTORY_SCHEMA`].

use std::collections::BTreeMap;
use std::fmt;

use crate::forms::FormValues;
use crate::values::{parse_input_date, parse_price_cents, parse_whole_number};
use crate::{NewInventory, Product, UnitCatalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InventoryField {
    Name,
    ProductType,
    Description,
    AveragePrice,
    Amount,
    UnitOfMeasurement,
    BestBeforeDate,
    NeverExpires,
}

impl InventoryField {
    pub const ALL: [Self; 8] = [
        Self::Name,
        Self::ProductType,
        Self::Description,
        Self::AveragePrice,
        Self::Amount,
        Self::UnitOfMeasurement,
        Self::BestBeforeDate,
        Self::NeverExpires,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::ProductType => "Product",
            Self::Description => "Description",
            Self::AveragePrice => "Average price",
            Self::Amount => "Amount",
            Self::UnitOfMeasurement => "Unit of measurement",
            Self::BestBeforeDate => "Best before date",
            Self::NeverExpires => "Never expires",
        }
    }

    pub fn constraint(self) -> &'static FieldConstraint {
        INVENTORY_SCHEMA
            .iter()
            .find(|constraint| constraint.field == self)
            .unwrap_or(&INVENTORY_SCHEMA[0])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    ProductChoice,
    UnitChoice,
    Price,
    WholeNumber,
    Date,
    Flag,
}

/// One row of the constraint table. `min`/`max` bound the parsed value for
/// numeric kinds (cents for prices) and the character count for text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldConstraint {
    pub field: InventoryField,
    pub kind: FieldKind,
    pub required: bool,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

pub static INVENTORY_SCHEMA: [FieldConstraint; 8] = [
    FieldConstraint {
        field: InventoryField::Name,
        kind: FieldKind::Text,
        required: true,
        min: None,
        max: Some(120),
    },
    FieldConstraint {
        field: InventoryField::ProductType,
        kind: FieldKind::ProductChoice,
        required: true,
        min: None,
        max: None,
    },
    FieldConstraint {
        field: InventoryField::Description,
        kind: FieldKind::Text,
        required: false,
        min: None,
        max: Some(1_000),
    },
    FieldConstraint {
        field: InventoryField::AveragePrice,
        kind: FieldKind::Price,
        required: false,
        min: Some(0),
        max: None,
    },
    FieldConstraint {
        field: InventoryField::Amount,
        kind: FieldKind::WholeNumber,
        required: false,
        min: Some(0),
        max: None,
    },
    FieldConstraint {
        field: InventoryField::UnitOfMeasurement,
        kind: FieldKind::UnitChoice,
        required: true,
        min: None,
        max: None,
    },
    FieldConstraint {
        field: InventoryField::BestBeforeDate,
        kind: FieldKind::Date,
        required: false,
        min: None,
        max: None,
    },
    FieldConstraint {
        field: InventoryField::NeverExpires,
        kind: FieldKind::Flag,
        required: false,
        min: None,
        max: None,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Required,
    InvalidNumber,
    InvalidDate,
    BelowMinimum(i64),
    AboveMaximum(i64),
    TooLong(i64),
    UnknownProduct(String),
    UnknownUnit(String),
    DateRequiredUnlessNeverExpires,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("required"),
            Self::InvalidNumber => f.write_str("enter a number"),
            Self::InvalidDate => f.write_str("enter a date as YYYY-MM-DD"),
            Self::BelowMinimum(min) => write!(f, "must be at least {min}"),
            Self::AboveMaximum(max) => write!(f, "must be at most {max}"),
            Self::TooLong(max) => write!(f, "must be at most {max} characters"),
            Self::UnknownProduct(name) => write!(f, "unknown product {name:?}"),
            Self::UnknownUnit(key) => write!(f, "unknown unit {key:?}"),
            Self::DateRequiredUnlessNeverExpires => {
                f.write_str("required unless the item never expires")
            }
        }
    }
}

impl std::error::Error for FieldError {}

/// Per-field errors, at most one per field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors {
    errors: BTreeMap<InventoryField, FieldError>,
}

impl FieldErrors {
    pub fn get(&self, field: InventoryField) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (InventoryField, &FieldError)> {
        self.errors.iter().map(|(field, error)| (*field, error))
    }

    pub fn clear_field(&mut self, field: InventoryField) {
        self.errors.remove(&field);
    }

    fn insert(&mut self, field: InventoryField, error: FieldError) {
        self.errors.entry(field).or_insert(error);
    }

    fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .iter()
            .map(|(field, error)| format!("{}: {error}", field.label().to_lowercase()))
            .collect::<Vec<_>>();
        f.write_str(&parts.join("; "))
    }
}

/// Reference data the validator checks choice fields against.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub products: &'a [Product],
    pub units: &'a UnitCatalog,
}

/// Runs every table rule plus the expiration cross-field rule and, when all
/// pass, builds the canonical payload. Reference data is not consulted.
pub fn check_structure(values: &FormValues) -> Result<NewInventory, FieldErrors> {
    let mut errors = FieldErrors::default();
    let mut price_cents = 0;
    let mut amount = 0;
    let mut best_before_date = None;

    for constraint in &INVENTORY_SCHEMA {
        let Some(raw) = values.text(constraint.field) else {
            continue;
        };
        let raw = raw.trim();
        if raw.is_empty() {
            if constraint.required {
                errors.insert(constraint.field, FieldError::Required);
            }
            continue;
        }

        match constraint.kind {
            FieldKind::Text | FieldKind::ProductChoice | FieldKind::UnitChoice => {
                let length = raw.chars().count() as i64;
                if let Some(max) = constraint.max
                    && length > max
                {
                    errors.insert(constraint.field, FieldError::TooLong(max));
                }
            }
            FieldKind::Price => match parse_price_cents(raw) {
                Ok(cents) => match check_bounds(constraint, cents) {
                    Ok(()) => price_cents = cents,
                    Err(error) => errors.insert(constraint.field, error),
                },
                Err(_) => errors.insert(constraint.field, FieldError::InvalidNumber),
            },
            FieldKind::WholeNumber => match parse_whole_number(raw) {
                Ok(value) => match check_bounds(constraint, value) {
                    Ok(()) => amount = value,
                    Err(error) => errors.insert(constraint.field, error),
                },
                Err(_) => errors.insert(constraint.field, FieldError::InvalidNumber),
            },
            FieldKind::Date => match parse_input_date(raw) {
                Ok(date) => best_before_date = Some(date),
                Err(_) => errors.insert(constraint.field, FieldError::InvalidDate),
            },
            FieldKind::Flag => {}
        }
    }

    if values.never_expires {
        best_before_date = None;
        errors.clear_field(InventoryField::BestBeforeDate);
    } else if best_before_date.is_none() && errors.get(InventoryField::BestBeforeDate).is_none()
    {
        errors.insert(
            InventoryField::BestBeforeDate,
            FieldError::DateRequiredUnlessNeverExpires,
        );
    }

    let description = values.description.trim();
    errors.into_result(NewInventory {
        name: values.name.trim().to_owned(),
        product_type: values.product_type.trim().to_owned(),
        description: (!description.is_empty()).then(|| description.to_owned()),
        average_price_cents: price_cents,
        amount,
        unit_of_measurement: values.unit_of_measurement.trim().to_owned(),
        best_before_date,
        never_expires: values.never_expires,
    })
}

/// Full validation: structure first, then choice fields against reference data.
pub fn validate(
    values: &FormValues,
    context: ValidationContext<'_>,
) -> Result<NewInventory, FieldErrors> {
    let structural = check_structure(values);
    let mut errors = match &structural {
        Ok(_) => FieldErrors::default(),
        Err(errors) => errors.clone(),
    };

    let product = values.product_type.trim();
    if !product.is_empty() && !context.products.iter().any(|known| known.name == product) {
        errors.insert(
            InventoryField::ProductType,
            FieldError::UnknownProduct(product.to_owned()),
        );
    }

    let unit = values.unit_of_measurement.trim();
    if !unit.is_empty() && !context.units.contains(unit) {
        errors.insert(
            InventoryField::UnitOfMeasurement,
            FieldError::UnknownUnit(unit.to_owned()),
        );
    }

    match structural {
        Ok(draft) => errors.into_result(draft),
        Err(_) => Err(errors),
    }
}

fn check_bounds(constraint: &FieldConstraint, value: i64) -> Result<(), FieldError> {
    if let Some(min) = constraint.min
        && value < min
    {
        return Err(FieldError::BelowMinimum(min));
    }
    if let Some(max) = constraint.max
        && value > max
    {
        return Err(FieldError::AboveMaximum(max));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        FieldError, INVENTORY_SCHEMA, InventoryField, ValidationContext, check_structure, validate,
    };
    use crate::forms::FormValues;
    use crate::{Product, ProductId, UnitCatalog};
    use time::{Date, Month};

    fn products() -> Vec<Product> {
        vec![Product {
            id: ProductId::new("p1"),
            name: "Grain".to_owned(),
        }]
    }

    fn flour() -> FormValues {
        FormValues {
            name: "Flour".to_owned(),
            product_type: "Grain".to_owned(),
            description: String::new(),
            average_price: "0".to_owned(),
            amount: "10".to_owned(),
            unit_of_measurement: "kg".to_owned(),
            best_before_date: String::new(),
            never_expires: true,
        }
    }

    #[test]
    fn every_field_has_exactly_one_constraint() {
        for field in InventoryField::ALL {
            let count = INVENTORY_SCHEMA
                .iter()
                .filter(|constraint| constraint.field == field)
                .count();
            assert_eq!(count, 1, "{field:?}");
            assert_eq!(field.constraint().field, field);
        }
    }

    #[test]
    fn required_fields_are_reported_individually() {
        let values = FormValues {
            name: "  ".to_owned(),
            product_type: String::new(),
            unit_of_measurement: String::new(),
            ..flour()
        };
        let errors = check_structure(&values).expect_err("blank required fields should fail");
        assert_eq!(errors.get(InventoryField::Name), Some(&FieldError::Required));
        assert_eq!(
            errors.get(InventoryField::ProductType),
            Some(&FieldError::Required)
        );
        assert_eq!(
            errors.get(InventoryField::UnitOfMeasurement),
            Some(&FieldError::Required)
        );
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn negative_numbers_violate_minimums() {
        let values = FormValues {
            average_price: "-0.01".to_owned(),
            amount: "-1".to_owned(),
            ..flour()
        };
        let errors = check_structure(&values).expect_err("negatives should fail");
        assert_eq!(
            errors.get(InventoryField::AveragePrice),
            Some(&FieldError::BelowMinimum(0))
        );
        assert_eq!(
            errors.get(InventoryField::Amount),
            Some(&FieldError::BelowMinimum(0))
        );
    }

    #[test]
    fn zero_price_and_amount_are_allowed() {
        let draft = check_structure(&FormValues {
            amount: "0".to_owned(),
            ..flour()
        })
        .expect("zero values are valid");
        assert_eq!(draft.average_price_cents, 0);
        assert_eq!(draft.amount, 0);
    }

    #[test]
    fn non_numeric_input_is_rejected() {
        let values = FormValues {
            amount: "ten".to_owned(),
            ..flour()
        };
        let errors = check_structure(&values).expect_err("text amount should fail");
        assert_eq!(
            errors.get(InventoryField::Amount),
            Some(&FieldError::InvalidNumber)
        );
    }

    #[test]
    fn expiring_items_need_a_date() {
        let values = FormValues {
            never_expires: false,
            ..flour()
        };
        let errors = check_structure(&values).expect_err("missing date should fail");
        assert_eq!(
            errors.get(InventoryField::BestBeforeDate),
            Some(&FieldError::DateRequiredUnlessNeverExpires)
        );

        let dated = FormValues {
            best_before_date: "2026-02-01".to_owned(),
            ..values
        };
        let draft = check_structure(&dated).expect("dated item is valid");
        assert_eq!(
            draft.best_before_date,
            Some(Date::from_calendar_date(2026, Month::February, 1).expect("valid date"))
        );
    }

    #[test]
    fn never_expiring_items_drop_any_date() {
        let values = FormValues {
            best_before_date: "not-a-date".to_owned(),
            ..flour()
        };
        let draft = check_structure(&values).expect("date is ignored when never expiring");
        assert_eq!(draft.best_before_date, None);
        assert!(draft.never_expires);
    }

    #[test]
    fn overlong_name_is_rejected() {
        let values = FormValues {
            name: "x".repeat(121),
            ..flour()
        };
        let errors = check_structure(&values).expect_err("long name should fail");
        assert_eq!(
            errors.get(InventoryField::Name),
            Some(&FieldError::TooLong(120))
        );
    }

    #[test]
    fn references_are_checked_against_context() {
        let products = products();
        let units = UnitCatalog::standard();
        let context = ValidationContext {
            products: &products,
            units: &units,
        };

        assert!(validate(&flour(), context).is_ok());

        let values = FormValues {
            product_type: "Dairy".to_owned(),
            unit_of_measurement: "bushel".to_owned(),
            ..flour()
        };
        let errors = validate(&values, context).expect_err("unknown references should fail");
        assert_eq!(
            errors.get(InventoryField::ProductType),
            Some(&FieldError::UnknownProduct("Dairy".to_owned()))
        );
        assert_eq!(
            errors.get(InventoryField::UnitOfMeasurement),
            Some(&FieldError::UnknownUnit("bushel".to_owned()))
        );
    }

    #[test]
    fn errors_render_as_a_single_line() {
        let values = FormValues {
            name: String::new(),
            ..flour()
        };
        let errors = check_structure(&values).expect_err("blank name should fail");
        assert_eq!(errors.to_string(), "name: required");
    }
}
