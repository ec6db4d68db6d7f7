// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::InventoryId;

/// Checked rows. Every transition returns a new set and leaves `self` alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSet {
    ids: BTreeSet<InventoryId>,
}

/// Header checkbox state derived from how many rows are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAllState {
    None,
    Some,
    All,
}

impl SelectionSet {
    #[must_use]
    pub fn toggle(&self, id: &InventoryId) -> Self {
        let mut ids = self.ids.clone();
        if !ids.remove(id) {
            ids.insert(id.clone());
        }
        Self { ids }
    }

    #[must_use]
    pub fn select_all<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = InventoryId>,
    {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn clear(&self) -> Self {
        Self::default()
    }

    /// Drops ids that no longer appear in `present`.
    #[must_use]
    pub fn retain_present<'a, I>(&self, present: I) -> Self
    where
        I: IntoIterator<Item = &'a InventoryId>,
    {
        let present = present.into_iter().collect::<BTreeSet<_>>();
        Self {
            ids: self
                .ids
                .iter()
                .filter(|id| present.contains(id))
                .cloned()
                .collect(),
        }
    }

    #[must_use]
    pub fn without(&self, id: &InventoryId) -> Self {
        let mut ids = self.ids.clone();
        ids.remove(id);
        Self { ids }
    }

    pub fn is_selected(&self, id: &InventoryId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InventoryId> {
        self.ids.iter()
    }

    pub fn to_vec(&self) -> Vec<InventoryId> {
        self.ids.iter().cloned().collect()
    }

    /// The id when exactly one row is checked.
    pub fn single(&self) -> Option<&InventoryId> {
        if self.ids.len() == 1 {
            self.ids.first()
        } else {
            None
        }
    }

    pub fn select_all_state(&self, row_count: usize) -> SelectAllState {
        match self.ids.len() {
            0 => SelectAllState::None,
            count if count >= row_count => SelectAllState::All,
            _ => SelectAllState::Some,
        }
    }
}
