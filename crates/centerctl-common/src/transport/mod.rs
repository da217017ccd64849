//! centerctl Transport Layer
//!
//! This module provides the framed TCP transport and the binary codec used
//! to talk to the Control Center and Information Center.
//!
//! # Architecture
//!
//! - **Transport**: one TCP connection per call, closed afterwards
//! - **Codec**: strict binary protocol (message header + field-tagged structs)
//! - **Wire Format**: `[4-byte length prefix, big-endian] + [binary message]`
//!
//! # Components
//!
//! - **[`BinaryCodec`]**: Encode/decode call, reply and exception messages
//! - **[`TcpTransport`]**: Synchronous framed TCP transport
//!
//! # Frame Size Limits
//!
//! Frames larger than [`MAX_FRAME_SIZE`] are refused in both directions.

pub mod codec;
pub mod tcp;

pub use codec::BinaryCodec;
pub use tcp::{TcpTransport, MAX_FRAME_SIZE};
