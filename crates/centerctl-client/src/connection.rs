use std::net::{Shutdown, TcpStream};

use centerctl_common::protocol::error::Result;
use centerctl_common::protocol::{Reply, WireStruct};
use centerctl_common::transport::TcpTransport;
use centerctl_common::Endpoint;
use tracing::debug;

/// One open connection to a service.
///
/// The socket is shut down and closed when the `Connection` is dropped, so
/// every exit path releases it: a successful reply, a service exception, a
/// transport failure half-way through, or a panic unwinding past the caller.
pub struct Connection {
    endpoint: Endpoint,
    transport: TcpTransport,
    stream: TcpStream,
}

impl Connection {
    pub fn open(endpoint: &Endpoint, transport: TcpTransport) -> Result<Self> {
        let stream = transport.connect(endpoint)?;
        Ok(Self {
            endpoint: endpoint.clone(),
            transport,
            stream,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Sends one call on this connection and waits for its reply.
    pub fn call<R: WireStruct>(&mut self, method: &str, request: &R) -> Result<Reply> {
        self.transport.call(&mut self.stream, method, request)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // the peer may already be gone; closing is best effort
        let _ = self.stream.shutdown(Shutdown::Both);
        debug!("closed connection to {}", self.endpoint);
    }
}
