//! One-shot commands.
//!
//! Each subcommand turns its positional arguments into an [`Invocation`]:
//! the target endpoint plus a fully typed [`Operation`]. Numeric arguments
//! are parsed here so a typo is reported as invalid input before any
//! connection is opened.

use std::io::Write;
use std::time::Duration;

use centerctl_client::{ControlCenterClient, InformationCenterClient};
use centerctl_common::protocol::{
    AuthenticateAccountRequest, CenterError, CreateAccountRequest, CreateVolumeRequest,
    DeleteAccountRequest, DeleteVolumeRequest, GetVolumeRequest, ListAccountsRequest,
    ListVolumesRequest, Reply, ReserveVolumeRequest, Result, UpdateAccountRequest,
};
use centerctl_common::Endpoint;
use tracing::debug;

use crate::output::Printer;

/// A remote operation with its request, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    CreateAccount(CreateAccountRequest),
    DeleteAccount(DeleteAccountRequest),
    ListAccounts(ListAccountsRequest),
    AuthenticateAccount(AuthenticateAccountRequest),
    UpdateAccount(UpdateAccountRequest),
    ReserveVolume(ReserveVolumeRequest),
    CreateVolume(CreateVolumeRequest),
    DeleteVolume(DeleteVolumeRequest),
    GetVolume(GetVolumeRequest),
    ListVolumes(ListVolumesRequest),
}

impl Operation {
    /// Remote method name.
    pub fn method(&self) -> &'static str {
        match self {
            Operation::CreateAccount(_) => "createAccount",
            Operation::DeleteAccount(_) => "deleteAccount",
            Operation::ListAccounts(_) => "listAccounts",
            Operation::AuthenticateAccount(_) => "authenticateAccount",
            Operation::UpdateAccount(_) => "updateAccount",
            Operation::ReserveVolume(_) => "reserveVolume",
            Operation::CreateVolume(_) => "createVolume",
            Operation::DeleteVolume(_) => "deleteVolume",
            Operation::GetVolume(_) => "getVolume",
            Operation::ListVolumes(_) => "listVolumes",
        }
    }

    /// The request as it is echoed before sending.
    pub fn request_json(&self) -> Result<serde_json::Value> {
        let json = match self {
            Operation::CreateAccount(r) => serde_json::to_value(r),
            Operation::DeleteAccount(r) => serde_json::to_value(r),
            Operation::ListAccounts(r) => serde_json::to_value(r),
            Operation::AuthenticateAccount(r) => serde_json::to_value(r),
            Operation::UpdateAccount(r) => serde_json::to_value(r),
            Operation::ReserveVolume(r) => serde_json::to_value(r),
            Operation::CreateVolume(r) => serde_json::to_value(r),
            Operation::DeleteVolume(r) => serde_json::to_value(r),
            Operation::GetVolume(r) => serde_json::to_value(r),
            Operation::ListVolumes(r) => serde_json::to_value(r),
        }?;
        Ok(json)
    }

    /// Sends the request over a fresh connection to `endpoint`.
    pub fn send(&self, endpoint: &Endpoint, timeout: Option<Duration>) -> Result<Reply> {
        let ic = || InformationCenterClient::new(endpoint.clone()).with_timeout(timeout);
        let cc = || ControlCenterClient::new(endpoint.clone()).with_timeout(timeout);

        match self {
            Operation::CreateAccount(r) => ic().create_account(r),
            Operation::DeleteAccount(r) => ic().delete_account(r),
            Operation::ListAccounts(r) => ic().list_accounts(r),
            Operation::AuthenticateAccount(r) => ic().authenticate_account(r),
            Operation::UpdateAccount(r) => ic().update_account(r),
            Operation::ReserveVolume(r) => ic().reserve_volume(r),
            Operation::CreateVolume(r) => cc().create_volume(r),
            Operation::DeleteVolume(r) => cc().delete_volume(r),
            Operation::GetVolume(r) => cc().get_volume(r),
            Operation::ListVolumes(r) => cc().list_volumes(r),
        }
    }
}

/// Where to send an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub endpoint: Endpoint,
    pub operation: Operation,
}

impl Invocation {
    /// Echoes the request, sends it and prints the reply.
    ///
    /// Nothing is printed for the reply when the call fails; the error is
    /// handed back to the caller untouched.
    pub fn run<W: Write>(&self, timeout: Option<Duration>, printer: &mut Printer<W>) -> Result<Reply> {
        let method = self.operation.method();
        printer.request(method, &self.operation.request_json()?)?;

        debug!("Sending {} to {}", method, self.endpoint);
        let reply = self.operation.send(&self.endpoint, timeout)?;

        printer.reply(&reply)?;
        Ok(reply)
    }
}

// ============================================================================
// Argument parsing
// ============================================================================

pub fn parse_endpoint(arg: &str) -> Result<Endpoint> {
    arg.parse()
}

/// Parses an `i64` argument (ids, sizes).
pub fn parse_i64(name: &str, arg: &str) -> Result<i64> {
    arg.trim().parse::<i64>().map_err(|_| {
        CenterError::InvalidArgument(format!("{} must be an integer, got '{}'", name, arg))
    })
}

/// Parses an `i32` argument (account and volume types).
pub fn parse_i32(name: &str, arg: &str) -> Result<i32> {
    arg.trim().parse::<i32>().map_err(|_| {
        CenterError::InvalidArgument(format!("{} must be a 32-bit integer, got '{}'", name, arg))
    })
}

/// Turns `--timeout-ms` into a socket timeout. Zero is refused; omitting the
/// option means no timeout.
pub fn timeout_from_ms(timeout_ms: Option<u64>) -> Result<Option<Duration>> {
    match timeout_ms {
        Some(0) => Err(CenterError::InvalidArgument(
            "--timeout-ms must be greater than 0 (omit it to wait indefinitely)".to_string(),
        )),
        ms => Ok(ms.map(Duration::from_millis)),
    }
}

fn invocation(endpoint: &str, operation: Operation) -> Result<Invocation> {
    Ok(Invocation {
        endpoint: parse_endpoint(endpoint)?,
        operation,
    })
}

pub fn create_account(
    endpoint: &str,
    account_name: &str,
    password: &str,
    account_type: &str,
) -> Result<Invocation> {
    invocation(
        endpoint,
        Operation::CreateAccount(CreateAccountRequest {
            account_name: account_name.to_string(),
            password: password.to_string(),
            account_type: parse_i32("account-type", account_type)?,
        }),
    )
}

pub fn delete_account(endpoint: &str, deleting_account_id: &str, account_id: &str) -> Result<Invocation> {
    invocation(
        endpoint,
        Operation::DeleteAccount(DeleteAccountRequest {
            deleting_account_id: parse_i64("deleting-account-id", deleting_account_id)?,
            account_id: parse_i64("account-id", account_id)?,
        }),
    )
}

pub fn list_accounts(endpoint: &str, account_id: &str) -> Result<Invocation> {
    invocation(
        endpoint,
        Operation::ListAccounts(ListAccountsRequest {
            account_id: parse_i64("account-id", account_id)?,
        }),
    )
}

pub fn authenticate_account(endpoint: &str, account_name: &str, password: &str) -> Result<Invocation> {
    invocation(
        endpoint,
        Operation::AuthenticateAccount(AuthenticateAccountRequest {
            account_name: account_name.to_string(),
            password: password.to_string(),
        }),
    )
}

/// `update-account` takes `endpoint name [old-password] new-password account-id`.
///
/// With four arguments the old password is left out of the request, which is
/// how an administrator resets another account's password.
pub fn update_account(args: &[String]) -> Result<Invocation> {
    let (endpoint, account_name, old_password, new_password, account_id) = match args {
        [endpoint, name, new_password, account_id] => (endpoint, name, None, new_password, account_id),
        [endpoint, name, old_password, new_password, account_id] => {
            (endpoint, name, Some(old_password.clone()), new_password, account_id)
        }
        _ => {
            return Err(CenterError::InvalidArgument(format!(
                "update-account expects 4 or 5 arguments \
                 (endpoint account-name [old-password] new-password account-id), got {}",
                args.len()
            )))
        }
    };

    invocation(
        endpoint,
        Operation::UpdateAccount(UpdateAccountRequest {
            account_name: account_name.clone(),
            old_password,
            new_password: new_password.clone(),
            account_id: parse_i64("account-id", account_id)?,
        }),
    )
}

pub fn reserve_volume(
    endpoint: &str,
    volume_id: &str,
    name: &str,
    size_mb: &str,
    volume_type: &str,
    account_id: &str,
) -> Result<Invocation> {
    let request = ReserveVolumeRequest::with_size_mb(
        parse_i64("volume-id", volume_id)?,
        name,
        parse_i64("size-mb", size_mb)?,
        parse_i32("volume-type", volume_type)?,
        parse_i64("account-id", account_id)?,
    )?;
    invocation(endpoint, Operation::ReserveVolume(request))
}

pub fn create_volume(
    endpoint: &str,
    name: &str,
    size_mb: &str,
    volume_type: &str,
    account_id: &str,
) -> Result<Invocation> {
    let request = CreateVolumeRequest::with_size_mb(
        name,
        parse_i64("size-mb", size_mb)?,
        parse_i32("volume-type", volume_type)?,
        parse_i64("account-id", account_id)?,
    )?;
    invocation(endpoint, Operation::CreateVolume(request))
}

pub fn delete_volume(endpoint: &str, volume_id: &str, account_id: &str) -> Result<Invocation> {
    invocation(
        endpoint,
        Operation::DeleteVolume(DeleteVolumeRequest {
            volume_id: parse_i64("volume-id", volume_id)?,
            account_id: parse_i64("account-id", account_id)?,
        }),
    )
}

pub fn get_volume(endpoint: &str, volume_id: &str, account_id: &str) -> Result<Invocation> {
    invocation(
        endpoint,
        Operation::GetVolume(GetVolumeRequest {
            volume_id: parse_i64("volume-id", volume_id)?,
            account_id: parse_i64("account-id", account_id)?,
        }),
    )
}

pub fn list_volumes(endpoint: &str, account_id: &str) -> Result<Invocation> {
    invocation(
        endpoint,
        Operation::ListVolumes(ListVolumesRequest {
            account_id: parse_i64("account-id", account_id)?,
        }),
    )
}
