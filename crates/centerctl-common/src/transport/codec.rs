use bytes::{Buf, BufMut, BytesMut};

use crate::protocol::error::{CenterError, Result};
use crate::protocol::message::{MessageHeader, MessageType, VERSION_1, VERSION_MASK};
use crate::protocol::requests::WireStruct;
use crate::protocol::responses::Reply;
use crate::protocol::value::{StructBuilder, TType, Value};

/// Nesting limit when decoding, so a hostile peer cannot blow the stack.
const MAX_DEPTH: usize = 64;

/// Field id of the success value inside a `<method>_result` struct.
const SUCCESS_FIELD: i16 = 0;

/// Field id of the request inside a `<method>_args` struct.
const ARGS_REQUEST_FIELD: i16 = 1;

/// Binary codec for RPC messages.
///
/// Encodes and decodes whole messages (header + body struct) in the strict
/// binary protocol. Framing is the transport's job; the codec only ever sees
/// complete frame payloads.
///
/// The call/reply conventions are the usual ones for this protocol:
///
/// - a call carries a `<method>_args` struct whose field 1 is the request;
/// - a reply carries a `<method>_result` struct whose field 0 is the
///   success value, and any other field is a declared service exception;
/// - an exception message carries an application exception struct with the
///   message in field 1 and its kind in field 2.
///
/// # Example
///
/// ```
/// use centerctl_common::protocol::{ListVolumesRequest, MessageHeader, StructBuilder};
/// use centerctl_common::transport::BinaryCodec;
///
/// let header = MessageHeader::call("listVolumes");
/// let request = ListVolumesRequest { account_id: 42 };
///
/// let encoded = BinaryCodec::encode_call(&header, &request).unwrap();
/// let (decoded_header, body) = BinaryCodec::decode_call(&encoded).unwrap();
/// assert_eq!(decoded_header, header);
/// assert_eq!(body.field(1).and_then(|v| v.as_i64()), Some(42));
///
/// let reply = BinaryCodec::encode_reply(&header, &StructBuilder::new().build()).unwrap();
/// assert!(BinaryCodec::decode_reply(&reply, &header).is_ok());
/// ```
pub struct BinaryCodec;

impl BinaryCodec {
    /// Encodes a call message carrying `request`.
    pub fn encode_call<R: WireStruct>(header: &MessageHeader, request: &R) -> Result<Vec<u8>> {
        let args = StructBuilder::new()
            .value(ARGS_REQUEST_FIELD, request.to_value())
            .build();
        Self::encode_message(header, &args)
    }

    /// Decodes a call message, returning its header and the request struct.
    pub fn decode_call(data: &[u8]) -> Result<(MessageHeader, Value)> {
        let (header, args) = Self::decode_message(data)?;
        if header.message_type != MessageType::Call && header.message_type != MessageType::Oneway {
            return Err(CenterError::Protocol(format!(
                "expected a call, got {:?}",
                header.message_type
            )));
        }
        let request = match args {
            Value::Struct(mut fields) => fields.remove(&ARGS_REQUEST_FIELD),
            _ => None,
        }
        .ok_or_else(|| {
            CenterError::Protocol(format!("call to {} carries no request struct", header.name))
        })?;
        Ok((header, request))
    }

    /// Encodes a successful reply to `call`.
    pub fn encode_reply(call: &MessageHeader, success: &Value) -> Result<Vec<u8>> {
        let result = StructBuilder::new()
            .value(SUCCESS_FIELD, success.clone())
            .build();
        Self::encode_message(&call.reply_to(MessageType::Reply), &result)
    }

    /// Encodes a reply to `call` carrying a declared service exception.
    pub fn encode_service_exception(
        call: &MessageHeader,
        field_id: i16,
        exception: &Value,
    ) -> Result<Vec<u8>> {
        if field_id == SUCCESS_FIELD {
            return Err(CenterError::Protocol(
                "service exceptions cannot use the success field".to_string(),
            ));
        }
        let result = StructBuilder::new().value(field_id, exception.clone()).build();
        Self::encode_message(&call.reply_to(MessageType::Reply), &result)
    }

    /// Encodes an application exception message answering `call`.
    pub fn encode_application_exception(
        call: &MessageHeader,
        code: i32,
        message: &str,
    ) -> Result<Vec<u8>> {
        let body = StructBuilder::new().string(1, message).i32(2, code).build();
        Self::encode_message(&call.reply_to(MessageType::Exception), &body)
    }

    /// Decodes the reply to `call`.
    ///
    /// # Errors
    ///
    /// - `Protocol` if the reply does not answer `call` (method name or
    ///   sequence id mismatch) or is malformed
    /// - `Application` if the service answered with an application exception
    /// - `Service` if the service raised one of its declared exceptions
    pub fn decode_reply(data: &[u8], call: &MessageHeader) -> Result<Reply> {
        let (header, body) = Self::decode_message(data)?;

        if header.name != call.name {
            return Err(CenterError::Protocol(format!(
                "reply is for method {}, expected {}",
                header.name, call.name
            )));
        }
        if header.seq_id != call.seq_id {
            return Err(CenterError::Protocol(format!(
                "reply sequence id {} does not match call {}",
                header.seq_id, call.seq_id
            )));
        }

        match header.message_type {
            MessageType::Reply => {}
            MessageType::Exception => {
                return Err(CenterError::Application {
                    method: call.name.clone(),
                    code: body.field(2).and_then(Value::as_i64).unwrap_or(0) as i32,
                    message: body
                        .field(1)
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error")
                        .to_string(),
                });
            }
            other => {
                return Err(CenterError::Protocol(format!(
                    "expected a reply, got {:?}",
                    other
                )));
            }
        }

        let Value::Struct(mut fields) = body else {
            return Err(CenterError::Protocol("reply body is not a struct".to_string()));
        };

        if let Some(success) = fields.remove(&SUCCESS_FIELD) {
            return Ok(Reply::new(call.name.clone(), success));
        }

        match fields.into_iter().next() {
            Some((field_id, exception)) => Err(CenterError::Service {
                method: call.name.clone(),
                field_id,
                detail: exception
                    .first_string()
                    .map(str::to_string)
                    .unwrap_or_else(|| exception.to_json().to_string()),
            }),
            None => Err(CenterError::Protocol(format!(
                "{} reply carries neither a result nor an exception",
                call.name
            ))),
        }
    }

    /// Encodes a header followed by a body struct.
    pub fn encode_message(header: &MessageHeader, body: &Value) -> Result<Vec<u8>> {
        if body.ttype() != TType::Struct {
            return Err(CenterError::Protocol("message body must be a struct".to_string()));
        }
        let mut buf = BytesMut::with_capacity(128);
        write_message_header(&mut buf, header)?;
        write_value(&mut buf, body)?;
        Ok(buf.to_vec())
    }

    /// Decodes a header followed by a body struct.
    ///
    /// Accepts both the strict (versioned) and the legacy header layout.
    pub fn decode_message(data: &[u8]) -> Result<(MessageHeader, Value)> {
        let mut buf = data;
        let header = read_message_header(&mut buf)?;
        let body = read_value(&mut buf, TType::Struct, 0)?;
        if buf.has_remaining() {
            return Err(CenterError::Protocol(format!(
                "{} trailing bytes after message body",
                buf.remaining()
            )));
        }
        Ok((header, body))
    }
}

fn write_message_header(buf: &mut BytesMut, header: &MessageHeader) -> Result<()> {
    buf.put_u32(VERSION_1 | u32::from(header.message_type.as_u8()));
    write_bytes(buf, header.name.as_bytes())?;
    buf.put_i32(header.seq_id);
    Ok(())
}

fn write_bytes(buf: &mut BytesMut, bytes: &[u8]) -> Result<()> {
    buf.put_i32(checked_len(bytes.len())?);
    buf.put_slice(bytes);
    Ok(())
}

fn checked_len(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| CenterError::Protocol(format!("length {} exceeds i32", len)))
}

fn write_value(buf: &mut BytesMut, value: &Value) -> Result<()> {
    match value {
        Value::Bool(v) => buf.put_u8(u8::from(*v)),
        Value::Byte(v) => buf.put_i8(*v),
        Value::I16(v) => buf.put_i16(*v),
        Value::I32(v) => buf.put_i32(*v),
        Value::I64(v) => buf.put_i64(*v),
        Value::Double(v) => buf.put_f64(*v),
        Value::String(v) => write_bytes(buf, v.as_bytes())?,
        Value::Binary(v) => write_bytes(buf, v)?,
        Value::Struct(fields) => {
            for (id, field) in fields {
                buf.put_u8(field.ttype().as_u8());
                buf.put_i16(*id);
                write_value(buf, field)?;
            }
            buf.put_u8(TType::Stop.as_u8());
        }
        Value::List(elem, items) | Value::Set(elem, items) => {
            buf.put_u8(elem.as_u8());
            buf.put_i32(checked_len(items.len())?);
            for item in items {
                expect_type(item, *elem)?;
                write_value(buf, item)?;
            }
        }
        Value::Map(key_type, value_type, entries) => {
            buf.put_u8(key_type.as_u8());
            buf.put_u8(value_type.as_u8());
            buf.put_i32(checked_len(entries.len())?);
            for (k, v) in entries {
                expect_type(k, *key_type)?;
                expect_type(v, *value_type)?;
                write_value(buf, k)?;
                write_value(buf, v)?;
            }
        }
    }
    Ok(())
}

fn expect_type(value: &Value, expected: TType) -> Result<()> {
    if value.ttype() == expected {
        Ok(())
    } else {
        Err(CenterError::Protocol(format!(
            "container element of type {:?} where {:?} was declared",
            value.ttype(),
            expected
        )))
    }
}

fn ensure(buf: &&[u8], needed: usize, what: &str) -> Result<()> {
    if buf.remaining() < needed {
        Err(CenterError::Protocol(format!(
            "truncated message reading {}: need {} bytes, have {}",
            what,
            needed,
            buf.remaining()
        )))
    } else {
        Ok(())
    }
}

fn read_message_header(buf: &mut &[u8]) -> Result<MessageHeader> {
    ensure(buf, 4, "message header")?;
    let word = buf.get_u32();

    if word & 0x8000_0000 != 0 {
        if word & VERSION_MASK != VERSION_1 {
            return Err(CenterError::Protocol(format!(
                "bad protocol version {:#010x}",
                word & VERSION_MASK
            )));
        }
        let message_type = MessageType::from_u8((word & 0xff) as u8)?;
        let name = read_string(buf)?;
        ensure(buf, 4, "sequence id")?;
        let seq_id = buf.get_i32();
        Ok(MessageHeader {
            name,
            message_type,
            seq_id,
        })
    } else {
        // legacy layout: the first word is the name length
        let name = read_string_of_len(buf, word as usize)?;
        ensure(buf, 5, "message type and sequence id")?;
        let message_type = MessageType::from_u8(buf.get_u8())?;
        let seq_id = buf.get_i32();
        Ok(MessageHeader {
            name,
            message_type,
            seq_id,
        })
    }
}

fn read_len(buf: &mut &[u8], what: &str) -> Result<usize> {
    ensure(buf, 4, what)?;
    let len = buf.get_i32();
    usize::try_from(len).map_err(|_| CenterError::Protocol(format!("negative {} length {}", what, len)))
}

fn read_string(buf: &mut &[u8]) -> Result<String> {
    let len = read_len(buf, "string")?;
    read_string_of_len(buf, len)
}

fn read_string_of_len(buf: &mut &[u8], len: usize) -> Result<String> {
    ensure(buf, len, "string")?;
    let bytes = buf.copy_to_bytes(len);
    String::from_utf8(bytes.to_vec())
        .map_err(|e| CenterError::Protocol(format!("invalid UTF-8 in method name: {}", e)))
}

fn read_ttype(buf: &mut &[u8]) -> Result<TType> {
    ensure(buf, 1, "type code")?;
    let code = buf.get_u8();
    TType::from_u8(code).ok_or_else(|| CenterError::Protocol(format!("unknown type code {}", code)))
}

/// Smallest number of bytes a value of `ttype` can occupy on the wire.
fn min_encoded_size(ttype: TType) -> usize {
    match ttype {
        TType::Stop | TType::Void | TType::Bool | TType::Byte | TType::Struct => 1,
        TType::I16 => 2,
        TType::I32 | TType::String => 4,
        TType::Double | TType::I64 => 8,
        TType::Set | TType::List => 5,
        TType::Map => 6,
    }
}

/// Elements to reserve for a container that declares `len` entries.
///
/// The declared size is untrusted: never reserve more entries than the
/// remaining bytes could possibly encode.
fn preallocation(len: usize, remaining: usize, entry: &[TType]) -> usize {
    let entry_size: usize = entry.iter().map(|t| min_encoded_size(*t)).sum();
    len.min(remaining / entry_size.max(1))
}

fn read_value(buf: &mut &[u8], ttype: TType, depth: usize) -> Result<Value> {
    if depth > MAX_DEPTH {
        return Err(CenterError::Protocol(format!(
            "values nested deeper than {} levels",
            MAX_DEPTH
        )));
    }

    let value = match ttype {
        TType::Stop | TType::Void => {
            return Err(CenterError::Protocol(format!("unexpected {:?} value", ttype)));
        }
        TType::Bool => {
            ensure(buf, 1, "bool")?;
            Value::Bool(buf.get_u8() != 0)
        }
        TType::Byte => {
            ensure(buf, 1, "byte")?;
            Value::Byte(buf.get_i8())
        }
        TType::I16 => {
            ensure(buf, 2, "i16")?;
            Value::I16(buf.get_i16())
        }
        TType::I32 => {
            ensure(buf, 4, "i32")?;
            Value::I32(buf.get_i32())
        }
        TType::I64 => {
            ensure(buf, 8, "i64")?;
            Value::I64(buf.get_i64())
        }
        TType::Double => {
            ensure(buf, 8, "double")?;
            Value::Double(buf.get_f64())
        }
        TType::String => {
            let len = read_len(buf, "string")?;
            ensure(buf, len, "string")?;
            let bytes = buf.copy_to_bytes(len).to_vec();
            match String::from_utf8(bytes) {
                Ok(s) => Value::String(s),
                Err(e) => Value::Binary(e.into_bytes()),
            }
        }
        TType::Struct => {
            let mut builder = StructBuilder::new();
            loop {
                let field_type = read_ttype(buf)?;
                if field_type == TType::Stop {
                    break;
                }
                ensure(buf, 2, "field id")?;
                let id = buf.get_i16();
                builder = builder.value(id, read_value(buf, field_type, depth + 1)?);
            }
            builder.build()
        }
        TType::List | TType::Set => {
            let elem = read_ttype(buf)?;
            let len = read_len(buf, "list")?;
            let mut items = Vec::with_capacity(preallocation(len, buf.remaining(), &[elem]));
            for _ in 0..len {
                items.push(read_value(buf, elem, depth + 1)?);
            }
            if ttype == TType::List {
                Value::List(elem, items)
            } else {
                Value::Set(elem, items)
            }
        }
        TType::Map => {
            let key_type = read_ttype(buf)?;
            let value_type = read_ttype(buf)?;
            let len = read_len(buf, "map")?;
            let mut entries =
                Vec::with_capacity(preallocation(len, buf.remaining(), &[key_type, value_type]));
            for _ in 0..len {
                let k = read_value(buf, key_type, depth + 1)?;
                let v = read_value(buf, value_type, depth + 1)?;
                entries.push((k, v));
            }
            Value::Map(key_type, value_type, entries)
        }
    };
    Ok(value)
}
