// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementUnit {
    pub key: &'static str,
    pub name: &'static str,
    pub abbreviation: &'static str,
}

pub const STANDARD_UNITS: [MeasurementUnit; 13] = [
    unit("kg", "Kilograms", "kg"),
    unit("g", "Grams", "g"),
    unit("lb", "Pounds", "lb"),
    unit("oz", "Ounces", "oz"),
    unit("l", "Liters", "L"),
    unit("ml", "Milliliters", "mL"),
    unit("gal", "Gallons", "gal"),
    unit("qt", "Quarts", "qt"),
    unit("pt", "Pints", "pt"),
    unit("cup", "Cups", "c"),
    unit("tbsp", "Tablespoons", "tbsp"),
    unit("tsp", "Teaspoons", "tsp"),
    unit("ea", "Each", "ea"),
];

const fn unit(key: &'static str, name: &'static str, abbreviation: &'static str) -> MeasurementUnit {
    MeasurementUnit {
        key,
        name,
        abbreviation,
    }
}

/// Read-only lookup over the measurement units known to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitCatalog {
    units: &'static [MeasurementUnit],
}

impl Default for UnitCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl UnitCatalog {
    pub const fn standard() -> Self {
        Self {
            units: &STANDARD_UNITS,
        }
    }

    pub const fn from_static(units: &'static [MeasurementUnit]) -> Self {
        Self { units }
    }

    pub fn get(&self, key: &str) -> Option<&'static MeasurementUnit> {
        self.units.iter().find(|unit| unit.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'static, MeasurementUnit> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
