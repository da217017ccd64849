use std::time::Duration;

use centerctl_common::protocol::error::Result;
use centerctl_common::protocol::{Reply, WireStruct};
use centerctl_common::transport::TcpTransport;
use centerctl_common::Endpoint;
use tracing::debug;

use crate::connection::Connection;

/// Generic client for one service endpoint.
///
/// Opens a fresh connection for each call and closes it once the reply (or
/// error) is in. There is no pooling and no retry: a failed call is reported
/// to the caller exactly once.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    service: &'static str,
    endpoint: Endpoint,
    transport: TcpTransport,
}

impl ServiceClient {
    pub fn new(service: &'static str, endpoint: Endpoint) -> Self {
        Self {
            service,
            endpoint,
            transport: TcpTransport::new(),
        }
    }

    /// Applies `timeout` to connect, send and receive. `None` blocks indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.transport = match timeout {
            Some(timeout) => TcpTransport::with_timeout(timeout),
            None => TcpTransport::new(),
        };
        self
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.transport.timeout()
    }

    /// Calls `method` with `request` over a fresh connection.
    pub fn call<R: WireStruct>(&self, method: &str, request: &R) -> Result<Reply> {
        debug!("{} {} -> {}", self.service, method, self.endpoint);
        let mut connection = Connection::open(&self.endpoint, self.transport)?;
        connection.call(method, request)
        // connection is closed here when it is dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ServiceClient::new("ControlCenter", Endpoint::new("localhost", 8010));
        // Will create successfully even if server doesn't exist
        assert_eq!(client.service(), "ControlCenter");
        assert_eq!(client.endpoint().to_string(), "localhost:8010");
        assert!(client.timeout().is_none());
    }

    #[test]
    fn test_client_timeout() {
        let client = ServiceClient::new("ControlCenter", Endpoint::new("localhost", 8010))
            .with_timeout(Some(Duration::from_millis(250)));
        assert_eq!(client.timeout(), Some(Duration::from_millis(250)));

        let client = client.with_timeout(None);
        assert!(client.timeout().is_none());
    }

    #[test]
    fn test_client_is_clonable() {
        let client = ServiceClient::new("InformationCenter", Endpoint::new("localhost", 8020));
        let client2 = client.clone();
        assert_eq!(client.endpoint(), client2.endpoint());
    }
}
