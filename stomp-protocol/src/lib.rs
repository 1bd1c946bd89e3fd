//! Frame model, header escaping and wire codec for STOMP 1.0/1.1/1.2.
mod codec;
mod command;
mod error;
mod frame;
pub mod headers;

pub use codec::{decode, encode, scan, Limits, Scan};
pub use command::{Command, UnknownCommand};
pub use error::{CodecError, SerializeError};
pub use frame::{Frame, Transmission};
pub use headers::HeaderList;
