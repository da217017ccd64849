pub mod error;
pub mod message;
pub mod requests;
pub mod responses;
pub mod value;


pub use error::{CenterError, ErrorKind, Result};
pub use message::{MessageHeader, MessageType, SeqId};
pub use requests::{
    mib_to_bytes, AccountType, AuthenticateAccountRequest, CreateAccountRequest,
    CreateVolumeRequest, DeleteAccountRequest, DeleteVolumeRequest, GetVolumeRequest,
    ListAccountsRequest, ListVolumesRequest, ReserveVolumeRequest, UpdateAccountRequest,
    WireStruct, MIB, SEGMENT_SIZE_BYTES,
};
pub use responses::Reply;
pub use value::{StructBuilder, TType, Value};
