//! Installment-term assembly.
//!
//! Updates are partial: a field the client did not send is not sent to the
//! gateway either, so it keeps its current value there.

use paygate_core::{NumericInput, ReferenceId, TermReferenceId, ValidationError, parse_quantity};
use serde::Deserialize;

use super::{non_blank, optional_amount, required};
use crate::gateway::{TermCreate, TermDelete, TermRefund, TermUpdate};

/// `POST /api/term/create` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermCreateInput {
    /// Order the term belongs to.
    #[serde(alias = "order_id")]
    pub reference_id: Option<String>,
    pub term_reference_id: Option<String>,
    pub amount: Option<NumericInput>,
    pub due_date: Option<String>,
    pub term_sequence: Option<NumericInput>,
    pub required: Option<bool>,
}

/// `POST /api/term/update` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermUpdateInput {
    pub term_reference_id: Option<String>,
    pub amount: Option<NumericInput>,
    pub due_date: Option<String>,
    pub paid_date: Option<String>,
    pub status: Option<String>,
    pub term_sequence: Option<NumericInput>,
    pub required: Option<bool>,
}

/// `POST /api/term/refund` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermRefundInput {
    #[serde(alias = "term_id")]
    pub term_reference_id: Option<String>,
    pub amount: Option<NumericInput>,
}

/// `POST /api/term/delete` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermDeleteInput {
    #[serde(alias = "reference_id")]
    pub order_id: Option<String>,
    pub term_reference_id: Option<String>,
}

fn optional_sequence(value: Option<&NumericInput>) -> Result<Option<u32>, ValidationError> {
    value
        .map(|sequence| parse_quantity("term_sequence", sequence))
        .transpose()
}

impl TermCreateInput {
    /// Validate into a gateway term creation.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the order reference, amount or due
    /// date is missing, or a numeric field is malformed.
    pub fn assemble(self) -> Result<TermCreate, ValidationError> {
        let order_id = ReferenceId::new(required("reference_id", self.reference_id)?);
        let amount = optional_amount("amount", self.amount.as_ref())?
            .ok_or_else(|| ValidationError::missing("amount"))?;
        let due_date = required("due_date", self.due_date)?;

        Ok(TermCreate {
            order_id,
            term_reference_id: non_blank(self.term_reference_id).map(TermReferenceId::new),
            amount,
            due_date,
            term_sequence: optional_sequence(self.term_sequence.as_ref())?,
            required: self.required,
        })
    }
}

impl TermUpdateInput {
    /// Validate into a partial gateway term update.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the term reference is missing, no
    /// field to change was supplied, or a numeric field is malformed.
    pub fn assemble(self) -> Result<TermUpdate, ValidationError> {
        let term_reference_id =
            TermReferenceId::new(required("term_reference_id", self.term_reference_id)?);

        let update = TermUpdate {
            term_reference_id,
            amount: optional_amount("amount", self.amount.as_ref())?,
            due_date: non_blank(self.due_date),
            paid_date: non_blank(self.paid_date),
            status: non_blank(self.status),
            term_sequence: optional_sequence(self.term_sequence.as_ref())?,
            required: self.required,
        };

        let changes_something = update.amount.is_some()
            || update.due_date.is_some()
            || update.paid_date.is_some()
            || update.status.is_some()
            || update.term_sequence.is_some()
            || update.required.is_some();
        if !changes_something {
            return Err(ValidationError::InvalidField {
                field: "term".to_string(),
                reason: "no fields to update".to_string(),
            });
        }

        Ok(update)
    }
}

impl TermRefundInput {
    /// Validate into a gateway term refund.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the term reference is missing or the
    /// amount is malformed.
    pub fn assemble(self) -> Result<TermRefund, ValidationError> {
        Ok(TermRefund {
            term_id: TermReferenceId::new(required("term_reference_id", self.term_reference_id)?),
            amount: optional_amount("amount", self.amount.as_ref())?,
        })
    }
}

impl TermDeleteInput {
    /// Validate into a gateway term deletion.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if either reference is missing.
    pub fn assemble(self) -> Result<TermDelete, ValidationError> {
        Ok(TermDelete {
            order_id: ReferenceId::new(required("order_id", self.order_id)?),
            term_reference_id: TermReferenceId::new(required(
                "term_reference_id",
                self.term_reference_id,
            )?),
        })
    }
}
