// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::Date;

use crate::schema::{FieldErrors, InventoryField, ValidationContext, check_structure, validate};
use crate::service::RequestId;
use crate::values::{format_input_date, format_price_input};
use crate::{FormIntent, InventoryId, InventoryRecord, NewInventory};

/// Raw form inputs exactly as the user typed them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormValues {
    pub name: String,
    pub product_type: String,
    pub description: String,
    pub average_price: String,
    pub amount: String,
    pub unit_of_measurement: String,
    pub best_before_date: String,
    pub never_expires: bool,
}

impl FormValues {
    pub fn create_defaults(today: Date) -> Self {
        Self {
            name: String::new(),
            product_type: String::new(),
            description: String::new(),
            average_price: "0".to_owned(),
            amount: "0".to_owned(),
            unit_of_measurement: String::new(),
            best_before_date: format_input_date(today),
            never_expires: false,
        }
    }

    /// Seeds an edit form; dates use the input layout, not the table layout.
    pub fn from_record(record: &InventoryRecord) -> Self {
        Self {
            name: record.name.clone(),
            product_type: record.product_type.clone(),
            description: record.description.clone().unwrap_or_default(),
            average_price: format_price_input(record.average_price_cents),
            amount: record.amount.to_string(),
            unit_of_measurement: record.unit_of_measurement.clone(),
            best_before_date: record
                .best_before_date
                .map(format_input_date)
                .unwrap_or_default(),
            never_expires: record.never_expires,
        }
    }

    /// Text content of a field; `None` for the checkbox.
    pub fn text(&self, field: InventoryField) -> Option<&str> {
        match field {
            InventoryField::Name => Some(&self.name),
            InventoryField::ProductType => Some(&self.product_type),
            InventoryField::Description => Some(&self.description),
            InventoryField::AveragePrice => Some(&self.average_price),
            InventoryField::Amount => Some(&self.amount),
            InventoryField::UnitOfMeasurement => Some(&self.unit_of_measurement),
            InventoryField::BestBeforeDate => Some(&self.best_before_date),
            InventoryField::NeverExpires => None,
        }
    }

    fn apply(&mut self, field: InventoryField, value: FieldValue) -> bool {
        let slot = match field {
            InventoryField::Name => &mut self.name,
            InventoryField::ProductType => &mut self.product_type,
            InventoryField::Description => &mut self.description,
            InventoryField::AveragePrice => &mut self.average_price,
            InventoryField::Amount => &mut self.amount,
            InventoryField::UnitOfMeasurement => &mut self.unit_of_measurement,
            InventoryField::BestBeforeDate => &mut self.best_before_date,
            InventoryField::NeverExpires => {
                return match value {
                    FieldValue::Flag(flag) => {
                        self.never_expires = flag;
                        true
                    }
                    FieldValue::Text(_) => false,
                };
            }
        };
        match value {
            FieldValue::Text(text) => {
                *slot = text;
                true
            }
            FieldValue::Flag(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

/// When the save button is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPolicy {
    /// Enabled as soon as any field differs from its initial value.
    #[default]
    Dirty,
    /// Additionally requires the values to pass the structural checks.
    DirtyAndSubmittable,
}

impl SubmitPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dirty => "dirty",
            Self::DirtyAndSubmittable => "dirty-and-valid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dirty" => Some(Self::Dirty),
            "dirty-and-valid" => Some(Self::DirtyAndSubmittable),
            _ => None,
        }
    }
}

/// Observable session state. Validation runs inside [`FormSession::begin_submit`]
/// and resolves to either `Invalid` or `Submitting` before it returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    Pristine,
    Dirty,
    Invalid,
    Submitting(RequestId),
    Submitted,
    SubmitFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRefusal {
    NotDirty,
    AlreadySubmitting,
}

impl SubmitRefusal {
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotDirty => "nothing to save",
            Self::AlreadySubmitting => "save already in progress",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Refused(SubmitRefusal),
    Invalid(FieldErrors),
    Ready(NewInventory),
}

/// One create or edit interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSession {
    intent: FormIntent,
    policy: SubmitPolicy,
    target: Option<InventoryId>,
    initial: FormValues,
    values: FormValues,
    phase: FormPhase,
    errors: FieldErrors,
    submit_error: Option<String>,
}

impl FormSession {
    pub fn new(intent: FormIntent, policy: SubmitPolicy) -> Self {
        Self {
            intent,
            policy,
            target: None,
            initial: FormValues::default(),
            values: FormValues::default(),
            phase: FormPhase::Pristine,
            errors: FieldErrors::default(),
            submit_error: None,
        }
    }

    pub fn intent(&self) -> FormIntent {
        self.intent
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn initial_values(&self) -> &FormValues {
        &self.initial
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Record the edit session writes back to.
    pub fn target(&self) -> Option<&InventoryId> {
        self.target.as_ref()
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        match self.phase {
            FormPhase::Submitting(request) => Some(request),
            _ => None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.values != self.initial
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight().is_some()
    }

    pub fn submit_enabled(&self) -> bool {
        if self.is_submitting() || !self.is_dirty() {
            return false;
        }
        match self.policy {
            SubmitPolicy::Dirty => true,
            SubmitPolicy::DirtyAndSubmittable => check_structure(&self.values).is_ok(),
        }
    }

    /// Starts a fresh interaction from `initial`.
    pub fn open(&mut self, initial: FormValues, target: Option<InventoryId>) {
        self.target = target;
        self.initial = initial.clone();
        self.values = initial;
        self.reset_state();
    }

    /// Returns false when the edit is refused: while saving, or when the value
    /// kind does not match the field.
    pub fn set_field(&mut self, field: InventoryField, value: FieldValue) -> bool {
        if self.is_submitting() {
            return false;
        }
        if !self.values.apply(field, value) {
            return false;
        }
        self.errors.clear_field(field);
        self.submit_error = None;
        self.phase = if self.is_dirty() {
            FormPhase::Dirty
        } else {
            FormPhase::Pristine
        };
        true
    }

    pub fn begin_submit(
        &mut self,
        context: ValidationContext<'_>,
        request: RequestId,
    ) -> SubmitOutcome {
        if self.is_submitting() {
            return SubmitOutcome::Refused(SubmitRefusal::AlreadySubmitting);
        }
        if !self.is_dirty() {
            return SubmitOutcome::Refused(SubmitRefusal::NotDirty);
        }

        match validate(&self.values, context) {
            Ok(draft) => {
                self.errors = FieldErrors::default();
                self.submit_error = None;
                self.phase = FormPhase::Submitting(request);
                SubmitOutcome::Ready(draft)
            }
            Err(errors) => {
                self.errors = errors.clone();
                self.phase = FormPhase::Invalid;
                SubmitOutcome::Invalid(errors)
            }
        }
    }

    /// Applies the persistence result. Returns false when `request` is not the
    /// one in flight, in which case nothing changes.
    pub fn finish_submit(&mut self, request: RequestId, result: Result<(), String>) -> bool {
        if self.in_flight() != Some(request) {
            return false;
        }
        match result {
            Ok(()) => {
                self.phase = FormPhase::Submitted;
            }
            Err(message) => {
                self.submit_error = Some(message);
                self.phase = FormPhase::SubmitFailed;
            }
        }
        true
    }

    /// The cancel button: discards edits. Refused while saving.
    pub fn cancel(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.values = self.initial.clone();
        self.reset_state();
        true
    }

    /// Dialog dismissed or view torn down: drops everything, including an
    /// in-flight save whose result will then be ignored.
    pub fn abandon(&mut self) {
        self.values = self.initial.clone();
        self.reset_state();
    }

    fn reset_state(&mut self) {
        self.phase = FormPhase::Pristine;
        self.errors = FieldErrors::default();
        self.submit_error = None;
    }
}
