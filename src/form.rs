//! Form session: the current record, its validation and persistence

use crate::error::Result;
use crate::fields::{FieldName, PaymentFields};
use crate::payload::{BuildOutcome, build_payload};
use crate::render::{QrRenderer, RenderedQr};
use crate::storage::FormStore;

/// Editing session over a persisted payment record
///
/// Each edit replaces the record wholesale, saves it, and rebuilds the
/// payload.
pub struct PaymentForm<S: FormStore> {
    store: S,
    fields: PaymentFields,
    outcome: BuildOutcome,
}

impl<S: FormStore> PaymentForm<S> {
    /// Open a session from stored state, or defaults when nothing is stored.
    pub fn open(store: S) -> Result<Self> {
        let fields = match store.load()? {
            Some(fields) => fields,
            None => {
                tracing::debug!("No stored form record, starting from defaults");
                PaymentFields::default()
            }
        };
        let outcome = build_payload(&fields);

        Ok(Self {
            store,
            fields,
            outcome,
        })
    }

    /// Current record.
    pub fn fields(&self) -> &PaymentFields {
        &self.fields
    }

    /// Validation and payload of the current record.
    pub fn outcome(&self) -> &BuildOutcome {
        &self.outcome
    }

    /// Set one field, persist the new record and revalidate.
    pub fn edit(&mut self, field: FieldName, value: impl Into<String>) -> Result<&BuildOutcome> {
        let next = self.fields.with(field, value);
        self.replace(next)
    }

    /// Replace the whole record, persist it and revalidate.
    pub fn replace(&mut self, fields: PaymentFields) -> Result<&BuildOutcome> {
        self.store.save(&fields)?;
        self.outcome = build_payload(&fields);
        self.fields = fields;
        Ok(&self.outcome)
    }

    /// Clear stored state and return to defaults.
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear()?;
        self.fields = PaymentFields::default();
        self.outcome = build_payload(&self.fields);
        Ok(())
    }

    /// Render the QR graphic, or `None` while the record is invalid.
    pub fn render(&self, renderer: &QrRenderer) -> Result<Option<RenderedQr>> {
        if !self.outcome.is_valid() {
            return Ok(None);
        }
        renderer.render(&self.outcome.payload).map(Some)
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
