//! centerctl Common Types and Transport
//!
//! This crate provides the protocol definitions, binary codec and framed TCP
//! transport used to talk to the two storage management services:
//!
//! - **Information Center**: account lifecycle and authentication, plus
//!   volume reservation
//! - **Control Center**: volume lifecycle (create, get, list, delete)
//!
//! # Architecture
//!
//! - **Protocol Layer**: request structs, the generic reply value tree, the
//!   message envelope and error types
//! - **Transport Layer**: framed TCP with a strict binary codec
//! - **Message Format**: `[4-byte length prefix, big-endian] + [binary message]`
//!
//! # Example
//!
//! ```
//! use centerctl_common::protocol::{CreateVolumeRequest, WireStruct};
//!
//! // 16 MB volume of type 1 owned by account 42
//! let request = CreateVolumeRequest::with_size_mb("vol123", 16, 1, 42).unwrap();
//! assert_eq!(request.volume_size, 16 * 1024 * 1024);
//! assert_eq!(CreateVolumeRequest::STRUCT_NAME, "CreateVolumeRequest");
//! ```

pub mod endpoint;
pub mod protocol;
pub mod transport;

pub use endpoint::Endpoint;
pub use protocol::*;
