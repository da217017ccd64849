//! In-process stand-in for the Control Center and Information Center.
//!
//! Accepts a fixed number of connections on a loopback port, decodes one
//! call per connection with the workspace codec, answers it, and records
//! what it saw, including whether the client closed the connection
//! afterwards.

#![allow(dead_code)]

use std::io::Read;
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use centerctl_common::protocol::{MessageHeader, Value};
use centerctl_common::transport::{BinaryCodec, TcpTransport};
use centerctl_common::Endpoint;

/// How the fake service answers a call.
pub enum Answer {
    Reply(Value),
    ServiceException(i16, Value),
    ApplicationException(i32, String),
    /// Send these bytes as the reply frame, valid message or not.
    Raw(Vec<u8>),
    /// Close the connection without answering.
    HangUp,
}

#[derive(Debug)]
pub struct RecordedCall {
    pub method: String,
    pub request: Value,
    /// The client shut the connection down after the exchange.
    pub closed_by_client: bool,
}

pub struct FakeService {
    pub endpoint: Endpoint,
    handle: thread::JoinHandle<Vec<RecordedCall>>,
}

impl FakeService {
    /// Serves `calls` connections, answering each with `handler`.
    pub fn spawn<F>(calls: usize, mut handler: F) -> Self
    where
        F: FnMut(&str, &Value) -> Answer + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = thread::spawn(move || {
            let transport = TcpTransport::new();
            let mut recorded = Vec::with_capacity(calls);
            for _ in 0..calls {
                let (mut stream, _) = listener.accept().unwrap();
                stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();

                let data = transport.receive_message(&mut stream).unwrap();
                let (header, request) = BinaryCodec::decode_call(&data).unwrap();

                match handler(&header.name, &request) {
                    Answer::HangUp => {
                        recorded.push(RecordedCall {
                            method: header.name,
                            request,
                            closed_by_client: false,
                        });
                        continue;
                    }
                    answer => {
                        let reply = encode(&header, answer);
                        transport.send_message(&mut stream, &reply).unwrap();
                    }
                }

                recorded.push(RecordedCall {
                    method: header.name,
                    request,
                    closed_by_client: wait_for_close(&mut stream),
                });
            }
            recorded
        });

        FakeService {
            endpoint: Endpoint::new("127.0.0.1", port),
            handle,
        }
    }

    /// Waits for every expected call and returns what was seen.
    pub fn join(self) -> Vec<RecordedCall> {
        self.handle.join().unwrap()
    }
}

fn encode(header: &MessageHeader, answer: Answer) -> Vec<u8> {
    match answer {
        Answer::Reply(value) => BinaryCodec::encode_reply(header, &value).unwrap(),
        Answer::ServiceException(field_id, value) => {
            BinaryCodec::encode_service_exception(header, field_id, &value).unwrap()
        }
        Answer::ApplicationException(code, message) => {
            BinaryCodec::encode_application_exception(header, code, &message).unwrap()
        }
        Answer::Raw(bytes) => bytes,
        Answer::HangUp => unreachable!("hang-ups are not encoded"),
    }
}

/// True once the client has closed its end (read returns EOF).
fn wait_for_close(stream: &mut TcpStream) -> bool {
    let mut buf = [0u8; 64];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => return true,
            Ok(_) => continue,
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionReset => return true,
            Err(_) => return false,
        }
    }
}
