//! Request Shapes
//!
//! One flat struct per remote operation. Each request knows its struct name
//! and how to lay itself out as a [`Value::Struct`] with fixed field ids; the
//! codec takes it from there. Requests also derive `Serialize` so the CLI can
//! echo exactly what it is about to send.

use serde::Serialize;

use super::error::{CenterError, Result};
use super::value::{StructBuilder, Value};

/// One mebibyte, the unit callers use for volume sizes.
pub const MIB: i64 = 1024 * 1024;

/// Segment size sent with every volume reservation (16 MiB).
pub const SEGMENT_SIZE_BYTES: i64 = 16 * MIB;

/// Converts a caller-supplied megabyte count to bytes.
///
/// # Errors
///
/// Returns `InvalidArgument` if the byte count does not fit in an `i64`.
pub fn mib_to_bytes(size_mb: i64) -> Result<i64> {
    size_mb
        .checked_mul(MIB)
        .ok_or_else(|| CenterError::InvalidArgument(format!("volume size {}MB is too large", size_mb)))
}

/// Account privilege tiers understood by the Information Center.
///
/// The client never validates an account type; the CLI passes whatever
/// integer it was given. These values exist for callers that build accounts
/// programmatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    SuperAdmin,
    Admin,
    Regular,
}

impl AccountType {
    pub fn code(self) -> i32 {
        match self {
            AccountType::SuperAdmin => 1,
            AccountType::Admin => 2,
            AccountType::Regular => 3,
        }
    }
}

/// A request struct that can be put on the wire.
pub trait WireStruct: Serialize {
    /// Struct name, as declared by the service interface.
    const STRUCT_NAME: &'static str;

    /// Lays the request out by field id.
    fn to_value(&self) -> Value;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub account_name: String,
    pub password: String,
    pub account_type: i32,
}

impl WireStruct for CreateAccountRequest {
    const STRUCT_NAME: &'static str = "CreateAccountRequest";

    fn to_value(&self) -> Value {
        StructBuilder::new()
            .string(1, &self.account_name)
            .string(2, &self.password)
            .i32(3, self.account_type)
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountRequest {
    pub deleting_account_id: i64,
    pub account_id: i64,
}

impl WireStruct for DeleteAccountRequest {
    const STRUCT_NAME: &'static str = "DeleteAccountRequest";

    fn to_value(&self) -> Value {
        StructBuilder::new()
            .i64(1, self.deleting_account_id)
            .i64(2, self.account_id)
            .build()
    }
}

/// Lists accounts visible to `account_id`; only admins see everyone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAccountsRequest {
    pub account_id: i64,
}

impl WireStruct for ListAccountsRequest {
    const STRUCT_NAME: &'static str = "ListAccountsRequest";

    fn to_value(&self) -> Value {
        StructBuilder::new().i64(1, self.account_id).build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateAccountRequest {
    pub account_name: String,
    pub password: String,
}

impl WireStruct for AuthenticateAccountRequest {
    const STRUCT_NAME: &'static str = "AuthenticateAccountRequest";

    fn to_value(&self) -> Value {
        StructBuilder::new()
            .string(1, &self.account_name)
            .string(2, &self.password)
            .build()
    }
}

/// Changes an account's password.
///
/// `old_password` is required when the owner updates their own account. An
/// admin acting on someone else's account leaves it unset, and the field is
/// then omitted from the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub account_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_password: Option<String>,
    pub new_password: String,
    pub account_id: i64,
}

impl WireStruct for UpdateAccountRequest {
    const STRUCT_NAME: &'static str = "UpdateAccountRequest";

    fn to_value(&self) -> Value {
        StructBuilder::new()
            .string(1, &self.account_name)
            .opt_string(2, self.old_password.as_deref())
            .string(3, &self.new_password)
            .i64(4, self.account_id)
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveVolumeRequest {
    pub volume_id: i64,
    pub name: String,
    /// Bytes.
    pub volume_size: i64,
    /// Bytes; always [`SEGMENT_SIZE_BYTES`] when built with [`Self::with_size_mb`].
    pub segment_size: i64,
    pub volume_type: i32,
    pub account_id: i64,
}

impl ReserveVolumeRequest {
    pub fn with_size_mb(
        volume_id: i64,
        name: impl Into<String>,
        size_mb: i64,
        volume_type: i32,
        account_id: i64,
    ) -> Result<Self> {
        Ok(Self {
            volume_id,
            name: name.into(),
            volume_size: mib_to_bytes(size_mb)?,
            segment_size: SEGMENT_SIZE_BYTES,
            volume_type,
            account_id,
        })
    }
}

impl WireStruct for ReserveVolumeRequest {
    const STRUCT_NAME: &'static str = "ReserveVolumeRequest";

    fn to_value(&self) -> Value {
        StructBuilder::new()
            .i64(1, self.volume_id)
            .string(2, &self.name)
            .i64(3, self.volume_size)
            .i64(4, self.segment_size)
            .i32(5, self.volume_type)
            .i64(6, self.account_id)
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVolumeRequest {
    pub name: String,
    /// Bytes.
    pub volume_size: i64,
    pub volume_type: i32,
    pub account_id: i64,
}

impl CreateVolumeRequest {
    pub fn with_size_mb(
        name: impl Into<String>,
        size_mb: i64,
        volume_type: i32,
        account_id: i64,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            volume_size: mib_to_bytes(size_mb)?,
            volume_type,
            account_id,
        })
    }
}

impl WireStruct for CreateVolumeRequest {
    const STRUCT_NAME: &'static str = "CreateVolumeRequest";

    fn to_value(&self) -> Value {
        StructBuilder::new()
            .string(1, &self.name)
            .i64(2, self.volume_size)
            .i32(3, self.volume_type)
            .i64(4, self.account_id)
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteVolumeRequest {
    pub volume_id: i64,
    pub account_id: i64,
}

impl WireStruct for DeleteVolumeRequest {
    const STRUCT_NAME: &'static str = "DeleteVolumeRequest";

    fn to_value(&self) -> Value {
        StructBuilder::new()
            .i64(1, self.volume_id)
            .i64(2, self.account_id)
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVolumeRequest {
    pub volume_id: i64,
    pub account_id: i64,
}

impl WireStruct for GetVolumeRequest {
    const STRUCT_NAME: &'static str = "GetVolumeRequest";

    fn to_value(&self) -> Value {
        StructBuilder::new()
            .i64(1, self.volume_id)
            .i64(2, self.account_id)
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVolumesRequest {
    pub account_id: i64,
}

impl WireStruct for ListVolumesRequest {
    const STRUCT_NAME: &'static str = "ListVolumesRequest";

    fn to_value(&self) -> Value {
        StructBuilder::new().i64(1, self.account_id).build()
    }
}
