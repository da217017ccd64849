use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::endpoint::Endpoint;
use crate::protocol::error::{CenterError, Result};
use crate::protocol::message::MessageHeader;
use crate::protocol::requests::WireStruct;
use crate::protocol::responses::Reply;
use crate::transport::codec::BinaryCodec;

/// Largest frame accepted from a peer (16 MiB).
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Framed TCP transport (synchronous).
///
/// Provides blocking I/O with an optional timeout. Without a timeout every
/// operation blocks for as long as the operating system lets it, which is the
/// behavior operators of these services expect from the command-line tools.
///
/// # Wire Protocol
///
/// Messages are sent with a 4-byte length prefix (big-endian) followed by
/// the binary-encoded message:
///
/// ```text
/// [4-byte length] [message]
/// ```
///
/// # Example
///
/// ```no_run
/// use centerctl_common::endpoint::Endpoint;
/// use centerctl_common::protocol::ListVolumesRequest;
/// use centerctl_common::transport::TcpTransport;
///
/// let transport = TcpTransport::new();
/// let mut stream = transport.connect(&Endpoint::new("localhost", 8010)).unwrap();
///
/// let request = ListVolumesRequest { account_id: 42 };
/// let reply = transport.call(&mut stream, "listVolumes", &request).unwrap();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransport {
    timeout: Option<Duration>,
}

impl TcpTransport {
    /// Creates a transport with no timeout.
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Creates a transport applying `timeout` to connect, reads and writes.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Connects to a remote endpoint.
    ///
    /// This method resolves the address (which may resolve to multiple addresses)
    /// and attempts to connect to each until one succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The address cannot be resolved
    /// - Connection fails to all resolved addresses
    /// - Timeouts cannot be set on the stream
    pub fn connect(&self, endpoint: &Endpoint) -> Result<TcpStream> {
        let addr = endpoint.to_string();
        let socket_addrs = addr
            .to_socket_addrs()
            .map_err(|e| CenterError::Connection(format!("Invalid address '{}': {}", addr, e)))?;

        let mut last_err = None;
        for socket_addr in socket_addrs {
            let attempt = match self.timeout {
                Some(timeout) => TcpStream::connect_timeout(&socket_addr, timeout),
                None => TcpStream::connect(socket_addr),
            };
            match attempt {
                Ok(stream) => {
                    stream
                        .set_read_timeout(self.timeout)
                        .map_err(|e| CenterError::Connection(format!("Failed to set read timeout: {}", e)))?;
                    stream
                        .set_write_timeout(self.timeout)
                        .map_err(|e| CenterError::Connection(format!("Failed to set write timeout: {}", e)))?;
                    debug!("connected to {} ({})", addr, socket_addr);
                    return Ok(stream);
                }
                Err(e) => {
                    debug!("connect to {} failed: {}", socket_addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(CenterError::Connection(format!(
            "Failed to connect to {}: {}",
            addr,
            last_err.map(|e| e.to_string()).unwrap_or_else(|| "no addresses resolved".to_string())
        )))
    }

    /// Sends one call and waits for its reply.
    ///
    /// Combines `send_message` and `receive_message` with binary
    /// encoding/decoding. The reply must answer this exact call.
    pub fn call<R: WireStruct>(&self, stream: &mut TcpStream, method: &str, request: &R) -> Result<Reply> {
        let header = MessageHeader::call(method);
        let encoded = BinaryCodec::encode_call(&header, request)?;
        debug!("sending {} (seq {}, {} bytes)", method, header.seq_id, encoded.len());

        self.send_message(stream, &encoded)?;
        let reply_data = self.receive_message(stream)?;
        debug!("received reply to {} ({} bytes)", method, reply_data.len());

        BinaryCodec::decode_reply(&reply_data, &header)
    }

    /// Sends a message with length prefix.
    ///
    /// Wire format: `[4-byte length, big-endian] + [data]`
    pub fn send_message<W: Write>(&self, stream: &mut W, data: &[u8]) -> Result<()> {
        if data.len() > MAX_FRAME_SIZE {
            return Err(CenterError::FrameTooLarge {
                size: data.len(),
                max: MAX_FRAME_SIZE,
            });
        }
        let len = data.len() as u32;

        stream
            .write_all(&len.to_be_bytes())
            .map_err(|e| self.map_io_error(e, "writing length prefix"))?;
        stream
            .write_all(data)
            .map_err(|e| self.map_io_error(e, "writing data"))?;
        stream
            .flush()
            .map_err(|e| self.map_io_error(e, "flushing stream"))?;

        Ok(())
    }

    /// Receives a message with length prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Reading the length prefix fails
    /// - The frame exceeds [`MAX_FRAME_SIZE`]
    /// - Reading the data fails
    pub fn receive_message<R: Read>(&self, stream: &mut R) -> Result<Vec<u8>> {
        let mut len_buf = [0u8; 4];
        stream
            .read_exact(&mut len_buf)
            .map_err(|e| self.map_io_error(e, "reading length prefix"))?;

        let len = u32::from_be_bytes(len_buf) as usize;
        if len > MAX_FRAME_SIZE {
            return Err(CenterError::FrameTooLarge {
                size: len,
                max: MAX_FRAME_SIZE,
            });
        }

        let mut buf = vec![0u8; len];
        stream
            .read_exact(&mut buf)
            .map_err(|e| self.map_io_error(e, "reading data"))?;

        Ok(buf)
    }

    /// Map IO errors to appropriate CenterError variants
    ///
    /// - Timeouts/would block -> `Timeout`
    /// - Connection errors and early EOF -> `Connection`
    /// - Other IO errors -> `Io`
    fn map_io_error(&self, err: std::io::Error, context: &str) -> CenterError {
        match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                CenterError::Timeout(self.timeout.map(|t| t.as_millis() as u64).unwrap_or(0))
            }
            std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::NotConnected
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof => {
                CenterError::Connection(format!("{}: Connection lost", context))
            }
            _ => CenterError::Io(err),
        }
    }
}
