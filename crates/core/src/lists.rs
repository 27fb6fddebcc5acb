//! Mailing list constants, validation, and subscription table naming.

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Unsubscription modes
// ---------------------------------------------------------------------------

/// How a subscriber leaves a list.
///
/// The numeric values are persisted in `lists.unsubscription_mode` and must
/// stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum UnsubscriptionMode {
    /// One click, no confirmation.
    OneStep = 0,
    /// One click through the unsubscription form.
    OneStepWithForm = 1,
    /// Confirmation email required.
    TwoStep = 2,
    /// Form followed by a confirmation email.
    TwoStepWithForm = 3,
    /// Only an administrator can unsubscribe the address.
    Manual = 4,
}

/// Exclusive upper bound of valid unsubscription mode values.
pub const UNSUBSCRIPTION_MODE_MAX: i32 = 5;

impl UnsubscriptionMode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for UnsubscriptionMode {
    type Error = CoreError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::OneStep),
            1 => Ok(Self::OneStepWithForm),
            2 => Ok(Self::TwoStep),
            3 => Ok(Self::TwoStepWithForm),
            4 => Ok(Self::Manual),
            other => Err(CoreError::Validation(format!(
                "Unknown unsubscription mode: {other}. Valid range: 0..{UNSUBSCRIPTION_MODE_MAX}"
            ))),
        }
    }
}

/// Validate that a raw unsubscription mode lies in `[0, MAX)`.
pub fn validate_unsubscription_mode(mode: i32) -> Result<UnsubscriptionMode, CoreError> {
    UnsubscriptionMode::try_from(mode)
}

// ---------------------------------------------------------------------------
// Subscription tables
// ---------------------------------------------------------------------------

/// Template table every per-list subscription table is cloned from.
pub const SUBSCRIPTION_TEMPLATE_TABLE: &str = "subscription";

/// Name of the subscription table owned by list `list_id`.
///
/// The id is a database-generated integer, so the result is always a safe
/// SQL identifier.
pub fn subscription_table_name(list_id: DbId) -> String {
    format!("{SUBSCRIPTION_TEMPLATE_TABLE}__{list_id}")
}
