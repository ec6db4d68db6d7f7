// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::normalize::{DisplayRecord, SortValue};
use crate::{InventoryColumn, SortDirection};

/// Current table ordering. `order_by == None` keeps the fetch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub order_by: Option<InventoryColumn>,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            order_by: None,
            direction: SortDirection::Asc,
        }
    }
}

impl SortState {
    pub const fn by(column: InventoryColumn, direction: SortDirection) -> Self {
        Self {
            order_by: Some(column),
            direction,
        }
    }

    /// Header click: the active ascending column flips to descending, any
    /// other request sorts ascending on the requested column.
    #[must_use]
    pub fn request(self, column: InventoryColumn) -> Self {
        let ascending_on_column =
            self.order_by == Some(column) && self.direction == SortDirection::Asc;
        Self {
            order_by: Some(column),
            direction: if ascending_on_column {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            },
        }
    }

    pub fn compare(self, left: &DisplayRecord, right: &DisplayRecord) -> Ordering {
        match self.order_by {
            Some(column) => compare(left, right, column, self.direction),
            None => Ordering::Equal,
        }
    }

    pub fn apply<'a>(self, records: &'a [DisplayRecord]) -> Vec<&'a DisplayRecord> {
        stable_sort(records, |left, right| self.compare(left, right))
    }
}

pub fn compare(
    left: &DisplayRecord,
    right: &DisplayRecord,
    column: InventoryColumn,
    direction: SortDirection,
) -> Ordering {
    let base = compare_values(left.sort_value(column), right.sort_value(column));
    match direction {
        SortDirection::Asc => base,
        SortDirection::Desc => base.reverse(),
    }
}

pub fn compare_values(left: SortValue<'_>, right: SortValue<'_>) -> Ordering {
    match (left, right) {
        (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
        (SortValue::Missing, _) => Ordering::Less,
        (_, SortValue::Missing) => Ordering::Greater,
        (SortValue::Integer(left), SortValue::Integer(right)) => left.cmp(&right),
        (SortValue::Text(left), SortValue::Text(right)) => compare_text(left, right),
        (SortValue::Integer(left), SortValue::Text(right)) => {
            compare_text(&left.to_string(), right)
        }
        (SortValue::Text(left), SortValue::Integer(right)) => {
            compare_text(left, &right.to_string())
        }
    }
}

fn compare_text(left: &str, right: &str) -> Ordering {
    left.chars()
        .map(|ch| ch.to_ascii_lowercase())
        .cmp(right.chars().map(|ch| ch.to_ascii_lowercase()))
}

/// Orders `records` without moving equal elements past each other.
pub fn stable_sort<T, F>(records: &[T], mut compare: F) -> Vec<&T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut ordered = records.iter().collect::<Vec<_>>();
    ordered.sort_by(|left, right| compare(left, right));
    ordered
}

#[cfg(test)]
mod tests {
    use super::{SortState, compare, stable_sort};
    use crate::normalize::DisplayRecord;
    use crate::{InventoryColumn, InventoryId, SortDirection};
    use std::cmp::Ordering;

    fn row(id: &str, name: &str, amount: i64, best_before: Option<&str>) -> DisplayRecord {
        DisplayRecord {
            id: InventoryId::new(id),
            name: name.to_owned(),
            product_type: "Grain".to_owned(),
            description: None,
            average_price_cents: 0,
            amount,
            unit: "Kilograms".to_owned(),
            unit_known: true,
            best_before: best_before.map(str::to_owned),
            never_expires: false,
        }
    }

    fn ids(rows: &[&DisplayRecord]) -> Vec<String> {
        rows.iter().map(|row| row.id.to_string()).collect()
    }

    #[test]
    fn request_cycles_between_ascending_and_descending() {
        let state = SortState::default().request(InventoryColumn::Name);
        assert_eq!(state, SortState::by(InventoryColumn::Name, SortDirection::Asc));

        let state = state.request(InventoryColumn::Name);
        assert_eq!(state, SortState::by(InventoryColumn::Name, SortDirection::Desc));

        let state = state.request(InventoryColumn::Name);
        assert_eq!(state, SortState::by(InventoryColumn::Name, SortDirection::Asc));

        let state = state
            .request(InventoryColumn::Name)
            .request(InventoryColumn::Amount);
        assert_eq!(
            state,
            SortState::by(InventoryColumn::Amount, SortDirection::Asc)
        );
    }

    #[test]
    fn numeric_columns_compare_numerically() {
        let small = row("a", "x", 9, None);
        let large = row("b", "x", 10, None);
        assert_eq!(
            compare(&small, &large, InventoryColumn::Amount, SortDirection::Asc),
            Ordering::Less
        );
        assert_eq!(
            compare(&small, &large, InventoryColumn::Amount, SortDirection::Desc),
            Ordering::Greater
        );
    }

    #[test]
    fn ties_keep_input_order_in_both_directions() {
        let rows = vec![
            row("1", "beans", 5, None),
            row("2", "apples", 1, None),
            row("3", "beans", 5, None),
            row("4", "corn", 5, None),
        ];

        let asc = SortState::by(InventoryColumn::Amount, SortDirection::Asc).apply(&rows);
        assert_eq!(ids(&asc), vec!["2", "1", "3", "4"]);

        let desc = SortState::by(InventoryColumn::Amount, SortDirection::Desc).apply(&rows);
        assert_eq!(ids(&desc), vec!["1", "3", "4", "2"]);
    }

    #[test]
    fn descending_is_reverse_of_ascending_without_ties() {
        let rows = vec![
            row("1", "beans", 3, None),
            row("2", "apples", 1, None),
            row("3", "corn", 2, None),
        ];
        let asc = SortState::by(InventoryColumn::Name, SortDirection::Asc).apply(&rows);
        let mut reversed = ids(&asc);
        reversed.reverse();
        let desc = SortState::by(InventoryColumn::Name, SortDirection::Desc).apply(&rows);
        assert_eq!(ids(&desc), reversed);
    }

    #[test]
    fn missing_values_sort_lowest_without_panicking() {
        let rows = vec![
            row("1", "a", 0, Some("02/01/2026")),
            row("2", "b", 0, None),
            row("3", "c", 0, Some("01/15/2026")),
        ];
        let asc = SortState::by(InventoryColumn::BestBeforeDate, SortDirection::Asc).apply(&rows);
        assert_eq!(ids(&asc), vec!["2", "3", "1"]);
    }

    #[test]
    fn text_comparison_ignores_ascii_case() {
        let rows = vec![row("1", "banana", 0, None), row("2", "Apple", 0, None)];
        let asc = SortState::by(InventoryColumn::Name, SortDirection::Asc).apply(&rows);
        assert_eq!(ids(&asc), vec!["2", "1"]);
    }

    #[test]
    fn unsorted_state_preserves_fetch_order() {
        let rows = vec![row("b", "z", 1, None), row("a", "y", 2, None)];
        assert_eq!(ids(&SortState::default().apply(&rows)), vec!["b", "a"]);
        assert_eq!(
            ids(&stable_sort(&rows, |_, _| Ordering::Equal)),
            vec!["b", "a"]
        );
    }
}
