//! WebSocket protocol: opening handshake (RFC 6455 §1.3), frame codec
//! (§5.2) and the interactive session loop over a raw stream.

mod frame;
mod handshake;
mod session;

pub use frame::{
    Frame, MAX_PAYLOAD, OPCODE_BINARY, OPCODE_CLOSE, OPCODE_PING, OPCODE_PONG, OPCODE_TEXT,
};
pub use handshake::{Handshake, ACCEPT_GUID};
pub use session::{run_session, upgrade, WsReader, WsWriter};
