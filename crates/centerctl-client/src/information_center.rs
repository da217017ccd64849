//! Information Center client: accounts, authentication and volume reservation.

use std::time::Duration;

use centerctl_common::protocol::error::Result;
use centerctl_common::protocol::{
    AuthenticateAccountRequest, CreateAccountRequest, DeleteAccountRequest, ListAccountsRequest,
    Reply, ReserveVolumeRequest, UpdateAccountRequest,
};
use centerctl_common::Endpoint;

use crate::client::ServiceClient;

pub const SERVICE_NAME: &str = "InformationCenter";

#[derive(Debug, Clone)]
pub struct InformationCenterClient {
    inner: ServiceClient,
}

impl InformationCenterClient {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            inner: ServiceClient::new(SERVICE_NAME, endpoint),
        }
    }

    pub fn with_timeout(self, timeout: Option<Duration>) -> Self {
        Self {
            inner: self.inner.with_timeout(timeout),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.inner.endpoint()
    }

    pub fn create_account(&self, request: &CreateAccountRequest) -> Result<Reply> {
        self.inner.call("createAccount", request)
    }

    pub fn delete_account(&self, request: &DeleteAccountRequest) -> Result<Reply> {
        self.inner.call("deleteAccount", request)
    }

    pub fn list_accounts(&self, request: &ListAccountsRequest) -> Result<Reply> {
        self.inner.call("listAccounts", request)
    }

    pub fn authenticate_account(&self, request: &AuthenticateAccountRequest) -> Result<Reply> {
        self.inner.call("authenticateAccount", request)
    }

    pub fn update_account(&self, request: &UpdateAccountRequest) -> Result<Reply> {
        self.inner.call("updateAccount", request)
    }

    pub fn reserve_volume(&self, request: &ReserveVolumeRequest) -> Result<Reply> {
        self.inner.call("reserveVolume", request)
    }
}
