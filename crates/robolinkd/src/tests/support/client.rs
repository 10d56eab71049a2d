//! Socket clients used to talk to a live daemon in scenarios.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use robolink_config::WireProtocol;
use serde_json::Value;
use tungstenite::{Message, WebSocket};

use crate::framer::MessageFramer;

const READ_SLICE: Duration = Duration::from_millis(50);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Client speaking either raw concatenated JSON or WebSocket text frames.
pub enum TestClient {
    Raw {
        stream: TcpStream,
        framer: MessageFramer,
    },
    WebSocket(Box<WebSocket<TcpStream>>),
}

impl TestClient {
    /// Connects to `addr` using the daemon's configured protocol.
    pub fn connect(addr: SocketAddr, protocol: WireProtocol) -> Self {
        let stream = TcpStream::connect(addr).expect("connect to daemon");
        stream
            .set_read_timeout(Some(READ_SLICE))
            .expect("set read timeout");
        match protocol {
            WireProtocol::Raw => Self::Raw {
                stream,
                framer: MessageFramer::new(),
            },
            WireProtocol::WebSocket => {
                let (socket, _response) = tungstenite::client(format!("ws://{addr}/"), stream)
                    .expect("websocket handshake");
                Self::WebSocket(Box::new(socket))
            }
        }
    }

    /// Sends `text` as one write or one text message.
    pub fn send(&mut self, text: &str) {
        match self {
            Self::Raw { stream, .. } => {
                stream.write_all(text.as_bytes()).expect("write request");
                stream.flush().expect("flush request");
            }
            Self::WebSocket(socket) => {
                socket
                    .send(Message::text(text.to_owned()))
                    .expect("send websocket message");
            }
        }
    }

    /// Collects up to `count` responses, giving up after two seconds.
    pub fn receive(&mut self, count: usize) -> Vec<Value> {
        let deadline = Instant::now() + RESPONSE_TIMEOUT;
        let mut responses = Vec::new();
        while responses.len() < count && Instant::now() < deadline {
            match self.read_chunk() {
                Chunk::Frames(frames) => responses.extend(frames),
                Chunk::Idle => {}
                Chunk::Closed => break,
            }
        }
        responses
    }

    /// Closes the sending side, collecting any responses still in flight.
    /// The flag reports whether the daemon then closed the connection.
    pub fn finish(&mut self) -> (Vec<Value>, bool) {
        match self {
            Self::Raw { stream, .. } => {
                let _ = stream.shutdown(Shutdown::Write);
            }
            Self::WebSocket(socket) => {
                let _ = socket.close(None);
            }
        }
        let deadline = Instant::now() + RESPONSE_TIMEOUT;
        let mut responses = Vec::new();
        while Instant::now() < deadline {
            match self.read_chunk() {
                Chunk::Frames(frames) => responses.extend(frames),
                Chunk::Idle => {}
                Chunk::Closed => return (responses, true),
            }
        }
        (responses, false)
    }

    fn read_chunk(&mut self) -> Chunk {
        match self {
            Self::Raw { stream, framer } => {
                let mut buffer = [0_u8; 4096];
                match stream.read(&mut buffer) {
                    Ok(0) => Chunk::Closed,
                    Ok(read) => {
                        framer.push(&buffer[..read]);
                        Chunk::Frames(
                            framer
                                .drain_frames()
                                .iter()
                                .map(|frame| {
                                    serde_json::from_slice(frame).expect("response json")
                                })
                                .collect(),
                        )
                    }
                    Err(error) if is_timeout(&error) => Chunk::Idle,
                    Err(_) => Chunk::Closed,
                }
            }
            Self::WebSocket(socket) => match socket.read() {
                Ok(Message::Text(text)) => Chunk::Frames(vec![
                    serde_json::from_str(text.as_str()).expect("response json"),
                ]),
                Ok(Message::Close(_)) => Chunk::Closed,
                Ok(_) => Chunk::Idle,
                Err(tungstenite::Error::Io(error)) if is_timeout(&error) => Chunk::Idle,
                Err(_) => Chunk::Closed,
            },
        }
    }
}

enum Chunk {
    Frames(Vec<Value>),
    Idle,
    Closed,
}

fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
