//! Control Center client: volume lifecycle.

use std::time::Duration;

use centerctl_common::protocol::error::Result;
use centerctl_common::protocol::{
    CreateVolumeRequest, DeleteVolumeRequest, GetVolumeRequest, ListVolumesRequest, Reply,
};
use centerctl_common::Endpoint;

use crate::client::ServiceClient;

pub const SERVICE_NAME: &str = "ControlCenter";

#[derive(Debug, Clone)]
pub struct ControlCenterClient {
    inner: ServiceClient,
}

impl ControlCenterClient {
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

    /// Creation is asynchronous on the service side; the reply carries the
    /// new volume's id before its segments exist.
    pub fn create_volume(&self, request: &CreateVolumeRequest) -> Result<Reply> {
        self.inner.call("createVolume", request)
    }

    pub fn delete_volume(&self, request: &DeleteVolumeRequest) -> Result<Reply> {
        self.inner.call("deleteVolume", request)
    }

    pub fn get_volume(&self, request: &GetVolumeRequest) -> Result<Reply> {
        self.inner.call("getVolume", request)
    }

    pub fn list_volumes(&self, request: &ListVolumesRequest) -> Result<Reply> {
        self.inner.call("listVolumes", request)
    }
}
