//! Reply Types
//!
//! The services' response structs are not known to this client beyond a
//! couple of fields it needs to chain calls together. A [`Reply`] wraps the
//! decoded success value and exposes those fields by id.

use super::value::Value;

/// Field id of `accountId` in `CreateAccountResponse`.
pub const ACCOUNT_ID_FIELD: i16 = 1;

/// Field id of `volumeId` in `CreateVolumeResponse`.
pub const VOLUME_ID_FIELD: i16 = 1;

/// The success value returned by a remote method.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Method that produced this reply.
    pub method: String,
    /// Decoded success value (usually a struct).
    pub value: Value,
}

impl Reply {
    pub fn new(method: impl Into<String>, value: Value) -> Self {
        Reply {
            method: method.into(),
            value,
        }
    }

    /// `accountId` of a `createAccount` reply.
    pub fn account_id(&self) -> Option<i64> {
        self.value.field(ACCOUNT_ID_FIELD).and_then(Value::as_i64)
    }

    /// `volumeId` of a `createVolume` reply.
    pub fn volume_id(&self) -> Option<i64> {
        self.value.field(VOLUME_ID_FIELD).and_then(Value::as_i64)
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.value.to_json()
    }
}
