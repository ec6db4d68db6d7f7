// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! The inventory list view controller.
//!
//! [`ListView`] owns the fetched snapshots plus the sort, selection and modal
//! slices. It never talks to the backend directly: commands queue
//! [`ServiceRequest`]s which the runtime drains, performs and feeds back as
//! [`Completion`]s. A completion whose id is no longer tracked is dropped,
//! which covers refresh races, dismissed dialogs and unmounting.

use time::Date;

use crate::forms::{FieldValue, FormSession, FormValues, SubmitOutcome, SubmitPolicy};
use crate::normalize::{DisplayRecord, normalize_all};
use crate::schema::{InventoryField, ValidationContext};
use crate::selection::{SelectAllState, SelectionSet};
use crate::service::{
    Completion, InventoryService, RequestId, ServiceCall, ServiceReply, ServiceRequest, perform,
};
use crate::sort::SortState;
use crate::{
    FormIntent, InventoryColumn, InventoryId, InventoryRecord, ModalKind, Product, UnitCatalog,
};

pub const EDIT_NEEDS_ONE: &str = "select exactly one item to edit";
pub const DELETE_NEEDS_SELECTION: &str = "select items to delete";
pub const DIALOG_ALREADY_OPEN: &str = "close the open dialog first";
pub const RECORD_GONE: &str = "selected item is no longer available";
pub const DELETE_IN_PROGRESS: &str = "delete already in progress";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModalFlags {
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
}

impl ModalFlags {
    pub const fn is_open(self, kind: ModalKind) -> bool {
        match kind {
            ModalKind::Create => self.create,
            ModalKind::Edit => self.edit,
            ModalKind::Delete => self.delete,
        }
    }

    pub const fn any(self) -> bool {
        self.create || self.edit || self.delete
    }

    #[must_use]
    pub const fn open(self, kind: ModalKind) -> Self {
        self.with(kind, true)
    }

    #[must_use]
    pub const fn close(self, kind: ModalKind) -> Self {
        self.with(kind, false)
    }

    #[must_use]
    pub const fn close_all(self) -> Self {
        Self {
            create: false,
            edit: false,
            delete: false,
        }
    }

    pub fn open_kinds(self) -> Vec<ModalKind> {
        [ModalKind::Create, ModalKind::Edit, ModalKind::Delete]
            .into_iter()
            .filter(|kind| self.is_open(*kind))
            .collect()
    }

    const fn with(self, kind: ModalKind, open: bool) -> Self {
        match kind {
            ModalKind::Create => Self {
                create: open,
                ..self
            },
            ModalKind::Edit => Self { edit: open, ..self },
            ModalKind::Delete => Self {
                delete: open,
                ..self
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListViewOptions {
    pub sort: SortState,
    pub submit_policy: SubmitPolicy,
    pub units: UnitCatalog,
    /// Seeds the create form's best-before date.
    pub today: Date,
}

impl ListViewOptions {
    pub fn new(today: Date) -> Self {
        Self {
            sort: SortState::default(),
            submit_policy: SubmitPolicy::default(),
            units: UnitCatalog::standard(),
            today,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    Mount,
    Unmount,
    Refresh,
    RequestSort(InventoryColumn),
    ToggleRow(InventoryId),
    SetAllSelected(bool),
    OpenCreate,
    OpenEdit,
    OpenDelete,
    /// Dismisses every open dialog, abandoning in-flight saves.
    CloseModals {
        reset_selection: bool,
    },
    EditField {
        intent: FormIntent,
        field: InventoryField,
        value: FieldValue,
    },
    SubmitForm(FormIntent),
    CancelForm(FormIntent),
    ConfirmDelete,
    CancelDelete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    RequestQueued(RequestId),
    InventoryLoaded(usize),
    ProductsLoaded(usize),
    FetchFailed(String),
    SortChanged(SortState),
    SelectionChanged(usize),
    ModalOpened(ModalKind),
    ModalClosed(ModalKind),
    FormChanged(FormIntent),
    FormInvalid(FormIntent),
    SubmitStarted(FormIntent),
    SubmitFailed(FormIntent, String),
    Saved(FormIntent),
    DeleteStarted(usize),
    Deleted(usize),
    DeleteFailed(String),
    Refused(String),
}

/// One table row in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListRow<'a> {
    pub record: &'a DisplayRecord,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    units: UnitCatalog,
    today: Date,
    mounted: bool,
    records: Vec<InventoryRecord>,
    display: Vec<DisplayRecord>,
    products: Vec<Product>,
    inventory_fetched: bool,
    products_fetched: bool,
    inventory_request: Option<RequestId>,
    products_request: Option<RequestId>,
    sort: SortState,
    selection: SelectionSet,
    modals: ModalFlags,
    create_form: FormSession,
    edit_form: FormSession,
    delete_targets: Vec<InventoryId>,
    delete_request: Option<RequestId>,
    delete_error: Option<String>,
    status: Option<String>,
    next_request: u64,
    outbox: Vec<ServiceRequest>,
}

impl ListView {
    pub fn new(options: ListViewOptions) -> Self {
        Self {
            units: options.units,
            today: options.today,
            mounted: false,
            records: Vec::new(),
            display: Vec::new(),
            products: Vec::new(),
            inventory_fetched: false,
            products_fetched: false,
            inventory_request: None,
            products_request: None,
            sort: options.sort,
            selection: SelectionSet::default(),
            modals: ModalFlags::default(),
            create_form: FormSession::new(FormIntent::Create, options.submit_policy),
            edit_form: FormSession::new(FormIntent::Edit, options.submit_policy),
            delete_targets: Vec::new(),
            delete_request: None,
            delete_error: None,
            status: None,
            next_request: 0,
            outbox: Vec::new(),
        }
    }

    pub fn dispatch(&mut self, command: ListCommand) -> Vec<ListEvent> {
        match command {
            ListCommand::Mount => {
                self.mounted = true;
                self.fetch_missing()
            }
            ListCommand::Unmount => self.unmount(),
            ListCommand::Refresh => {
                let mut events = self.fetch_inventory();
                if !self.products_fetched && self.products_request.is_none() {
                    events.extend(self.fetch_products());
                }
                events
            }
            ListCommand::RequestSort(column) => {
                self.sort = self.sort.request(column);
                vec![ListEvent::SortChanged(self.sort)]
            }
            ListCommand::ToggleRow(id) => {
                if !self.display.iter().any(|row| row.id == id) {
                    return Vec::new();
                }
                self.selection = self.selection.toggle(&id);
                vec![ListEvent::SelectionChanged(self.selection.len())]
            }
            ListCommand::SetAllSelected(all) => {
                self.selection = if all {
                    SelectionSet::select_all(self.display.iter().map(|row| row.id.clone()))
                } else {
                    self.selection.clear()
                };
                vec![ListEvent::SelectionChanged(self.selection.len())]
            }
            ListCommand::OpenCreate => self.open_create(),
            ListCommand::OpenEdit => self.open_edit(),
            ListCommand::OpenDelete => self.open_delete(),
            ListCommand::CloseModals { reset_selection } => self.close_modals(reset_selection),
            ListCommand::EditField {
                intent,
                field,
                value,
            } => {
                if !self.modals.is_open(intent.into()) {
                    return Vec::new();
                }
                if self.form_mut(intent).set_field(field, value) {
                    vec![ListEvent::FormChanged(intent)]
                } else {
                    Vec::new()
                }
            }
            ListCommand::SubmitForm(intent) => self.submit(intent),
            ListCommand::CancelForm(intent) => {
                if !self.modals.is_open(intent.into()) {
                    return Vec::new();
                }
                if !self.form_mut(intent).cancel() {
                    return vec![self.refuse("save in progress")];
                }
                self.modals = self.modals.close(intent.into());
                vec![ListEvent::ModalClosed(intent.into())]
            }
            ListCommand::ConfirmDelete => self.confirm_delete(),
            ListCommand::CancelDelete => {
                if !self.modals.delete {
                    return Vec::new();
                }
                if self.delete_request.is_some() {
                    return vec![self.refuse(DELETE_IN_PROGRESS)];
                }
                self.modals = self.modals.close(ModalKind::Delete);
                self.delete_targets.clear();
                self.delete_error = None;
                vec![ListEvent::ModalClosed(ModalKind::Delete)]
            }
        }
    }

    /// Feeds back the result of a request taken from [`Self::drain_requests`].
    pub fn complete(&mut self, completion: Completion) -> Vec<ListEvent> {
        let Completion { id, result } = completion;
        match &result {
            Ok(_) => tracing::debug!(request = %id, "service request completed"),
            Err(error) => tracing::debug!(request = %id, %error, "service request failed"),
        }

        if self.inventory_request == Some(id) {
            self.inventory_request = None;
            return self.finish_inventory_fetch(result);
        }
        if self.products_request == Some(id) {
            self.products_request = None;
            return self.finish_products_fetch(result);
        }
        if self.create_form.in_flight() == Some(id) {
            return self.finish_save(FormIntent::Create, id, result);
        }
        if self.edit_form.in_flight() == Some(id) {
            return self.finish_save(FormIntent::Edit, id, result);
        }
        if self.delete_request == Some(id) {
            self.delete_request = None;
            return self.finish_delete(result);
        }

        tracing::debug!(request = %id, "dropping stale completion");
        Vec::new()
    }

    pub fn drain_requests(&mut self) -> Vec<ServiceRequest> {
        std::mem::take(&mut self.outbox)
    }

    pub fn pending_requests(&self) -> &[ServiceRequest] {
        &self.outbox
    }

    /// Performs queued requests inline until none remain.
    pub fn run_pending<S>(&mut self, service: &S) -> Vec<ListEvent>
    where
        S: InventoryService + ?Sized,
    {
        let mut events = Vec::new();
        loop {
            let requests = self.drain_requests();
            if requests.is_empty() {
                return events;
            }
            for request in requests {
                let completion = perform(service, request);
                events.extend(self.complete(completion));
            }
        }
    }

    pub fn rows(&self) -> Vec<ListRow<'_>> {
        self.sort
            .apply(&self.display)
            .into_iter()
            .map(|record| ListRow {
                record,
                selected: self.selection.is_selected(&record.id),
            })
            .collect()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn units(&self) -> &UnitCatalog {
        &self.units
    }

    pub fn inventory_fetched(&self) -> bool {
        self.inventory_fetched
    }

    pub fn products_fetched(&self) -> bool {
        self.products_fetched
    }

    pub fn is_loading(&self) -> bool {
        self.inventory_request.is_some() || self.products_request.is_some()
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn select_all_state(&self) -> SelectAllState {
        self.selection.select_all_state(self.display.len())
    }

    pub fn modals(&self) -> ModalFlags {
        self.modals
    }

    pub fn form(&self, intent: FormIntent) -> &FormSession {
        match intent {
            FormIntent::Create => &self.create_form,
            FormIntent::Edit => &self.edit_form,
        }
    }

    /// The form behind whichever create or edit dialog is open.
    pub fn active_form(&self) -> Option<&FormSession> {
        if self.modals.create {
            Some(&self.create_form)
        } else if self.modals.edit {
            Some(&self.edit_form)
        } else {
            None
        }
    }

    pub fn delete_targets(&self) -> &[InventoryId] {
        &self.delete_targets
    }

    pub fn delete_error(&self) -> Option<&str> {
        self.delete_error.as_deref()
    }

    pub fn is_deleting(&self) -> bool {
        self.delete_request.is_some()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Product select options; the stored value is the product name.
    pub fn product_choices(&self) -> Vec<&str> {
        self.products
            .iter()
            .map(|product| product.name.as_str())
            .collect()
    }

    fn form_mut(&mut self, intent: FormIntent) -> &mut FormSession {
        match intent {
            FormIntent::Create => &mut self.create_form,
            FormIntent::Edit => &mut self.edit_form,
        }
    }

    fn fetch_missing(&mut self) -> Vec<ListEvent> {
        let mut events = Vec::new();
        if !self.inventory_fetched && self.inventory_request.is_none() {
            events.extend(self.fetch_inventory());
        }
        if !self.products_fetched && self.products_request.is_none() {
            events.extend(self.fetch_products());
        }
        events
    }

    fn fetch_inventory(&mut self) -> Vec<ListEvent> {
        let id = self.queue(ServiceCall::FetchInventory);
        self.inventory_request = Some(id);
        vec![ListEvent::RequestQueued(id)]
    }

    fn fetch_products(&mut self) -> Vec<ListEvent> {
        let id = self.queue(ServiceCall::FetchProducts);
        self.products_request = Some(id);
        vec![ListEvent::RequestQueued(id)]
    }

    fn queue(&mut self, call: ServiceCall) -> RequestId {
        let id = self.next_request_id();
        tracing::debug!(request = %id, call = call.name(), "queued service request");
        self.outbox.push(ServiceRequest { id, call });
        id
    }

    fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId::new(self.next_request)
    }

    fn unmount(&mut self) -> Vec<ListEvent> {
        let closed = self.modals.open_kinds();
        self.mounted = false;
        self.inventory_request = None;
        self.products_request = None;
        self.delete_request = None;
        self.delete_targets.clear();
        self.delete_error = None;
        self.create_form.abandon();
        self.edit_form.abandon();
        self.modals = self.modals.close_all();
        self.outbox.clear();
        closed.into_iter().map(ListEvent::ModalClosed).collect()
    }

    fn open_create(&mut self) -> Vec<ListEvent> {
        if self.modals.any() {
            return vec![self.refuse(DIALOG_ALREADY_OPEN)];
        }
        self.create_form
            .open(FormValues::create_defaults(self.today), None);
        self.modals = self.modals.open(ModalKind::Create);
        vec![ListEvent::ModalOpened(ModalKind::Create)]
    }

    fn open_edit(&mut self) -> Vec<ListEvent> {
        if self.modals.any() {
            return vec![self.refuse(DIALOG_ALREADY_OPEN)];
        }
        let Some(id) = self.selection.single().cloned() else {
            return vec![self.refuse(EDIT_NEEDS_ONE)];
        };
        let Some(record) = self.records.iter().find(|record| record.id == id) else {
            return vec![self.refuse(RECORD_GONE)];
        };
        let initial = FormValues::from_record(record);
        self.edit_form.open(initial, Some(id));
        self.modals = self.modals.open(ModalKind::Edit);
        vec![ListEvent::ModalOpened(ModalKind::Edit)]
    }

    fn open_delete(&mut self) -> Vec<ListEvent> {
        if self.modals.any() {
            return vec![self.refuse(DIALOG_ALREADY_OPEN)];
        }
        if self.selection.is_empty() {
            return vec![self.refuse(DELETE_NEEDS_SELECTION)];
        }
        self.delete_targets = self.selection.to_vec();
        self.delete_error = None;
        self.modals = self.modals.open(ModalKind::Delete);
        vec![ListEvent::ModalOpened(ModalKind::Delete)]
    }

    fn close_modals(&mut self, reset_selection: bool) -> Vec<ListEvent> {
        let mut events = self
            .modals
            .open_kinds()
            .into_iter()
            .map(ListEvent::ModalClosed)
            .collect::<Vec<_>>();
        self.create_form.abandon();
        self.edit_form.abandon();
        self.delete_request = None;
        self.delete_targets.clear();
        self.delete_error = None;
        self.modals = self.modals.close_all();
        if reset_selection {
            self.selection = self.selection.clear();
            events.push(ListEvent::SelectionChanged(0));
        }
        events
    }

    fn submit(&mut self, intent: FormIntent) -> Vec<ListEvent> {
        if !self.modals.is_open(intent.into()) {
            return Vec::new();
        }
        let id = self.next_request_id();
        let context = ValidationContext {
            products: &self.products,
            units: &self.units,
        };
        let session = match intent {
            FormIntent::Create => &mut self.create_form,
            FormIntent::Edit => &mut self.edit_form,
        };
        match session.begin_submit(context, id) {
            SubmitOutcome::Refused(reason) => vec![self.refuse(reason.message())],
            SubmitOutcome::Invalid(errors) => {
                tracing::debug!(intent = intent.title(), %errors, "form rejected");
                vec![ListEvent::FormInvalid(intent)]
            }
            SubmitOutcome::Ready(draft) => {
                let call = match (intent, session.target()) {
                    (FormIntent::Create, _) => ServiceCall::Create(draft),
                    (FormIntent::Edit, Some(target)) => {
                        ServiceCall::Update(draft.with_id(target.clone()))
                    }
                    (FormIntent::Edit, None) => {
                        session.abandon();
                        return vec![self.refuse(RECORD_GONE)];
                    }
                };
                tracing::debug!(request = %id, call = call.name(), "queued service request");
                self.outbox.push(ServiceRequest { id, call });
                vec![ListEvent::SubmitStarted(intent), ListEvent::RequestQueued(id)]
            }
        }
    }

    fn confirm_delete(&mut self) -> Vec<ListEvent> {
        if !self.modals.delete {
            return Vec::new();
        }
        if self.delete_request.is_some() {
            return vec![self.refuse(DELETE_IN_PROGRESS)];
        }
        if self.delete_targets.is_empty() {
            return vec![self.refuse(DELETE_NEEDS_SELECTION)];
        }
        self.delete_error = None;
        let count = self.delete_targets.len();
        let id = self.queue(ServiceCall::Delete(self.delete_targets.clone()));
        self.delete_request = Some(id);
        vec![ListEvent::DeleteStarted(count), ListEvent::RequestQueued(id)]
    }

    fn finish_inventory_fetch(&mut self, result: Result<ServiceReply, String>) -> Vec<ListEvent> {
        let records = match result {
            Ok(ServiceReply::Inventory(records)) => records,
            Ok(other) => return self.fetch_failed("inventory", unexpected_reply(&other)),
            Err(error) => return self.fetch_failed("inventory", error),
        };

        let count = records.len();
        self.display = normalize_all(&records, &self.units);
        self.records = records;
        self.inventory_fetched = true;
        self.warn_product_drift();

        let mut events = vec![ListEvent::InventoryLoaded(count)];
        let reconciled = self
            .selection
            .retain_present(self.display.iter().map(|row| &row.id));
        if reconciled != self.selection {
            self.selection = reconciled;
            events.push(ListEvent::SelectionChanged(self.selection.len()));
        }
        events
    }

    fn finish_products_fetch(&mut self, result: Result<ServiceReply, String>) -> Vec<ListEvent> {
        match result {
            Ok(ServiceReply::Products(products)) => {
                let count = products.len();
                self.products = products;
                self.products_fetched = true;
                self.warn_product_drift();
                vec![ListEvent::ProductsLoaded(count)]
            }
            Ok(other) => self.fetch_failed("products", unexpected_reply(&other)),
            Err(error) => self.fetch_failed("products", error),
        }
    }

    /// Records naming a product type the product list does not carry still
    /// render, the edit form just has no matching choice for them.
    fn warn_product_drift(&self) {
        if !self.inventory_fetched || !self.products_fetched {
            return;
        }
        for record in &self.records {
            let known = self
                .products
                .iter()
                .any(|product| product.name == record.product_type);
            if !known {
                tracing::warn!(
                    id = %record.id,
                    product_type = %record.product_type,
                    "product type missing from product list"
                );
            }
        }
    }

    fn fetch_failed(&mut self, what: &str, error: String) -> Vec<ListEvent> {
        tracing::warn!(what, %error, "fetch failed");
        self.status = Some(format!("could not load {what}: {error}"));
        vec![ListEvent::FetchFailed(error)]
    }

    fn finish_save(
        &mut self,
        intent: FormIntent,
        id: RequestId,
        result: Result<ServiceReply, String>,
    ) -> Vec<ListEvent> {
        let result = match result {
            Ok(ServiceReply::Created(record) | ServiceReply::Updated(record)) => Ok(record),
            Ok(other) => Err(unexpected_reply(&other)),
            Err(error) => Err(error),
        };

        match result {
            Ok(record) => {
                let target = self.form(intent).target().cloned();
                self.form_mut(intent).finish_submit(id, Ok(()));
                self.form_mut(intent).abandon();
                self.modals = self.modals.close(intent.into());
                self.status = Some(format!("saved {}", record.name));

                let mut events = vec![
                    ListEvent::Saved(intent),
                    ListEvent::ModalClosed(intent.into()),
                ];
                if intent == FormIntent::Edit
                    && let Some(target) = target
                    && self.selection.is_selected(&target)
                {
                    self.selection = self.selection.without(&target);
                    events.push(ListEvent::SelectionChanged(self.selection.len()));
                }
                events.extend(self.fetch_inventory());
                events
            }
            Err(error) => {
                tracing::warn!(intent = intent.title(), %error, "save failed");
                self.form_mut(intent).finish_submit(id, Err(error.clone()));
                self.status = Some(format!("save failed: {error}"));
                vec![ListEvent::SubmitFailed(intent, error)]
            }
        }
    }

    fn finish_delete(&mut self, result: Result<ServiceReply, String>) -> Vec<ListEvent> {
        match result {
            Ok(ServiceReply::Deleted) => {
                let count = self.delete_targets.len();
                self.delete_targets.clear();
                self.selection = self.selection.clear();
                self.modals = self.modals.close(ModalKind::Delete);
                self.status = Some(format!(
                    "deleted {count} {}",
                    if count == 1 { "item" } else { "items" }
                ));
                let mut events = vec![
                    ListEvent::Deleted(count),
                    ListEvent::SelectionChanged(0),
                    ListEvent::ModalClosed(ModalKind::Delete),
                ];
                events.extend(self.fetch_inventory());
                events
            }
            other => {
                let error = match other {
                    Ok(reply) => unexpected_reply(&reply),
                    Err(error) => error,
                };
                tracing::warn!(%error, "delete failed");
                self.delete_error = Some(error.clone());
                self.status = Some(format!("delete failed: {error}"));
                vec![ListEvent::DeleteFailed(error)]
            }
        }
    }

    fn refuse(&mut self, message: &str) -> ListEvent {
        self.status = Some(message.to_owned());
        ListEvent::Refused(message.to_owned())
    }
}

fn unexpected_reply(reply: &ServiceReply) -> String {
    let kind = match reply {
        ServiceReply::Inventory(_) => "inventory list",
        ServiceReply::Products(_) => "product list",
        ServiceReply::Created(_) => "created record",
        ServiceReply::Updated(_) => "updated record",
        ServiceReply::Deleted => "delete acknowledgement",
    };
    format!("unexpected {kind} in reply")
}

#[cfg(test)]
mod tests {
    use super::{
        DELETE_NEEDS_SELECTION, EDIT_NEEDS_ONE, ListCommand, ListEvent, ListView,
        ListViewOptions, ModalFlags,
    };
    use crate::forms::{FieldValue, FormPhase};
    use crate::schema::InventoryField;
    use crate::service::{
        Completion, MemoryInventoryService, RequestId, ServiceCall, ServiceReply,
    };
    use crate::sort::SortState;
    use crate::{
        FormIntent, InventoryColumn, InventoryId, InventoryRecord, ModalKind, Product, ProductId,
        SortDirection,
    };
    use time::{Date, Month};

    fn today() -> Date {
        Date::from_calendar_date(2026, Month::October, 18).expect("valid date")
    }

    fn record(id: &str, name: &str, amount: i64) -> InventoryRecord {
        InventoryRecord {
            id: InventoryId::new(id),
            name: name.to_owned(),
            product_type: "Grain".to_owned(),
            description: None,
            average_price_cents: 100,
            amount,
            unit_of_measurement: "kg".to_owned(),
            best_before_date: Some(today()),
            never_expires: false,
        }
    }

    fn service() -> MemoryInventoryService {
        MemoryInventoryService::new(
            vec![record("a", "Rice", 3), record("b", "Beans", 1), record("c", "Corn", 2)],
            vec![Product {
                id: ProductId::new("p1"),
                name: "Grain".to_owned(),
            }],
        )
    }

    fn mounted(service: &MemoryInventoryService) -> ListView {
        let mut view = ListView::new(ListViewOptions::new(today()));
        view.dispatch(ListCommand::Mount);
        view.run_pending(service);
        view
    }

    fn fill_salt(view: &mut ListView) {
        for (field, value) in [
            (InventoryField::Name, "Salt"),
            (InventoryField::ProductType, "Grain"),
            (InventoryField::UnitOfMeasurement, "g"),
        ] {
            view.dispatch(ListCommand::EditField {
                intent: FormIntent::Create,
                field,
                value: FieldValue::Text(value.to_owned()),
            });
        }
    }

    fn row_ids(view: &ListView) -> Vec<String> {
        view.rows()
            .iter()
            .map(|row| row.record.id.to_string())
            .collect()
    }

    #[test]
    fn modal_flags_update_without_touching_the_source() {
        let closed = ModalFlags::default();
        let open = closed.open(ModalKind::Delete);
        assert!(!closed.any());
        assert!(open.is_open(ModalKind::Delete));
        assert!(!open.is_open(ModalKind::Create));
        assert_eq!(open.open_kinds(), vec![ModalKind::Delete]);
        assert_eq!(open.close(ModalKind::Delete), closed);
    }

    #[test]
    fn mount_fetches_both_snapshots_once() {
        let mut view = ListView::new(ListViewOptions::new(today()));
        let events = view.dispatch(ListCommand::Mount);
        assert_eq!(events.len(), 2);
        assert_eq!(view.pending_requests().len(), 2);

        assert!(view.dispatch(ListCommand::Mount).is_empty());

        view.run_pending(&service());
        assert!(view.inventory_fetched());
        assert!(view.products_fetched());
        assert_eq!(view.rows().len(), 3);
        assert!(view.dispatch(ListCommand::Mount).is_empty());
    }

    #[test]
    fn sort_request_orders_rows_and_flips_direction() {
        let service = service();
        let mut view = mounted(&service);
        assert_eq!(row_ids(&view), vec!["a", "b", "c"]);

        view.dispatch(ListCommand::RequestSort(InventoryColumn::Amount));
        assert_eq!(row_ids(&view), vec!["b", "c", "a"]);

        let events = view.dispatch(ListCommand::RequestSort(InventoryColumn::Amount));
        assert_eq!(
            events,
            vec![ListEvent::SortChanged(SortState::by(
                InventoryColumn::Amount,
                SortDirection::Desc
            ))]
        );
        assert_eq!(row_ids(&view), vec!["a", "c", "b"]);
    }

    #[test]
    fn late_fetch_keeps_sort_and_prunes_selection() {
        let service = service();
        let mut view = mounted(&service);
        view.dispatch(ListCommand::RequestSort(InventoryColumn::Name));
        view.dispatch(ListCommand::ToggleRow(InventoryId::new("a")));
        view.dispatch(ListCommand::ToggleRow(InventoryId::new("b")));

        view.dispatch(ListCommand::Refresh);
        let request = view.drain_requests().remove(0);
        let events = view.complete(Completion {
            id: request.id,
            result: Ok(ServiceReply::Inventory(vec![
                record("b", "Beans", 1),
                record("d", "Dates", 4),
            ])),
        });

        assert_eq!(
            events,
            vec![ListEvent::InventoryLoaded(2), ListEvent::SelectionChanged(1)]
        );
        assert_eq!(view.sort().order_by, Some(InventoryColumn::Name));
        assert_eq!(view.selection().to_vec(), vec![InventoryId::new("b")]);
    }

    #[test]
    fn only_the_latest_refresh_is_applied() {
        let service = service();
        let mut view = mounted(&service);
        view.dispatch(ListCommand::Refresh);
        view.dispatch(ListCommand::Refresh);
        let requests = view.drain_requests();
        assert_eq!(requests.len(), 2);

        let stale = view.complete(Completion {
            id: requests[0].id,
            result: Ok(ServiceReply::Inventory(Vec::new())),
        });
        assert!(stale.is_empty());
        assert_eq!(view.rows().len(), 3);
    }

    #[test]
    fn fetch_failure_stays_retryable() {
        let mut view = ListView::new(ListViewOptions::new(today()));
        view.dispatch(ListCommand::Mount);
        let requests = view.drain_requests();
        let inventory = requests
            .iter()
            .find(|request| request.call == ServiceCall::FetchInventory)
            .expect("inventory fetch queued");

        let events = view.complete(Completion {
            id: inventory.id,
            result: Err("connection refused".to_owned()),
        });
        assert_eq!(
            events,
            vec![ListEvent::FetchFailed("connection refused".to_owned())]
        );
        assert!(!view.inventory_fetched());
        assert!(view.rows().is_empty());
        assert_eq!(
            view.status(),
            Some("could not load inventory: connection refused")
        );

        view.dispatch(ListCommand::Mount);
        assert!(
            view.pending_requests()
                .iter()
                .any(|request| request.call == ServiceCall::FetchInventory)
        );
    }

    #[test]
    fn edit_requires_exactly_one_selected_row() {
        let service = service();
        let mut view = mounted(&service);

        let events = view.dispatch(ListCommand::OpenEdit);
        assert_eq!(events, vec![ListEvent::Refused(EDIT_NEEDS_ONE.to_owned())]);

        view.dispatch(ListCommand::SetAllSelected(true));
        let events = view.dispatch(ListCommand::OpenEdit);
        assert_eq!(events, vec![ListEvent::Refused(EDIT_NEEDS_ONE.to_owned())]);
        assert!(!view.modals().edit);
    }

    #[test]
    fn edit_seeds_form_from_selected_record() {
        let service = service();
        let mut view = mounted(&service);
        view.dispatch(ListCommand::ToggleRow(InventoryId::new("c")));

        let events = view.dispatch(ListCommand::OpenEdit);
        assert_eq!(events, vec![ListEvent::ModalOpened(ModalKind::Edit)]);
        let form = view.form(FormIntent::Edit);
        assert_eq!(form.values().name, "Corn");
        assert_eq!(form.values().best_before_date, "2026-10-18");
        assert_eq!(form.target(), Some(&InventoryId::new("c")));
    }

    #[test]
    fn successful_edit_deselects_the_record_and_refreshes() {
        let service = service();
        let mut view = mounted(&service);
        view.dispatch(ListCommand::ToggleRow(InventoryId::new("c")));
        view.dispatch(ListCommand::OpenEdit);
        view.dispatch(ListCommand::EditField {
            intent: FormIntent::Edit,
            field: InventoryField::Amount,
            value: FieldValue::Text("12".to_owned()),
        });
        view.dispatch(ListCommand::SubmitForm(FormIntent::Edit));
        let events = view.run_pending(&service);

        assert!(events.contains(&ListEvent::Saved(FormIntent::Edit)));
        assert!(!view.modals().edit);
        assert!(view.selection().is_empty());
        let updated = view
            .records()
            .iter()
            .find(|record| record.id == InventoryId::new("c"))
            .expect("edited record still listed");
        assert_eq!(updated.amount, 12);
    }

    #[test]
    fn delete_requires_a_selection() {
        let service = service();
        let mut view = mounted(&service);
        let events = view.dispatch(ListCommand::OpenDelete);
        assert_eq!(
            events,
            vec![ListEvent::Refused(DELETE_NEEDS_SELECTION.to_owned())]
        );
    }

    #[test]
    fn failed_delete_keeps_modal_and_selection() {
        let service = service();
        let mut view = mounted(&service);
        view.dispatch(ListCommand::ToggleRow(InventoryId::new("a")));
        view.dispatch(ListCommand::OpenDelete);
        view.dispatch(ListCommand::ConfirmDelete);
        let request = view.drain_requests().remove(0);
        assert_eq!(
            request.call,
            ServiceCall::Delete(vec![InventoryId::new("a")])
        );

        let events = view.complete(Completion {
            id: request.id,
            result: Err("server error (500)".to_owned()),
        });
        assert_eq!(
            events,
            vec![ListEvent::DeleteFailed("server error (500)".to_owned())]
        );
        assert!(view.modals().delete);
        assert_eq!(view.selection().len(), 1);
        assert_eq!(view.delete_error(), Some("server error (500)"));
    }

    #[test]
    fn dismissed_dialog_ignores_late_save() {
        let service = service();
        let mut view = mounted(&service);
        view.dispatch(ListCommand::OpenCreate);
        fill_salt(&mut view);
        view.dispatch(ListCommand::SubmitForm(FormIntent::Create));
        let request = view.drain_requests().remove(0);

        view.dispatch(ListCommand::CloseModals {
            reset_selection: false,
        });
        let events = view.complete(Completion {
            id: request.id,
            result: Err("late".to_owned()),
        });
        assert!(events.is_empty());
        assert_eq!(view.form(FormIntent::Create).phase(), &FormPhase::Pristine);
    }

    #[test]
    fn cancel_is_refused_while_saving() {
        let service = service();
        let mut view = mounted(&service);
        view.dispatch(ListCommand::OpenCreate);
        fill_salt(&mut view);
        let events = view.dispatch(ListCommand::SubmitForm(FormIntent::Create));
        assert_eq!(events[0], ListEvent::SubmitStarted(FormIntent::Create));

        let events = view.dispatch(ListCommand::CancelForm(FormIntent::Create));
        assert!(matches!(events.as_slice(), [ListEvent::Refused(_)]));
        assert!(view.modals().create);
    }

    #[test]
    fn close_modals_can_reset_selection() {
        let service = service();
        let mut view = mounted(&service);
        view.dispatch(ListCommand::ToggleRow(InventoryId::new("a")));
        view.dispatch(ListCommand::OpenDelete);

        let events = view.dispatch(ListCommand::CloseModals {
            reset_selection: true,
        });
        assert_eq!(
            events,
            vec![
                ListEvent::ModalClosed(ModalKind::Delete),
                ListEvent::SelectionChanged(0)
            ]
        );
        assert!(view.selection().is_empty());
    }

    #[test]
    fn unmount_drops_in_flight_work() {
        let service = service();
        let mut view = mounted(&service);
        view.dispatch(ListCommand::Refresh);
        let request = view.drain_requests().remove(0);

        view.dispatch(ListCommand::Unmount);
        assert!(!view.is_mounted());
        let events = view.complete(Completion {
            id: request.id,
            result: Ok(ServiceReply::Inventory(Vec::new())),
        });
        assert!(events.is_empty());
        assert_eq!(view.rows().len(), 3);
    }

    #[test]
    fn unknown_completion_ids_are_ignored() {
        let service = service();
        let mut view = mounted(&service);
        let events = view.complete(Completion {
            id: RequestId::new(999),
            result: Ok(ServiceReply::Deleted),
        });
        assert!(events.is_empty());
    }
}
