mod connection;
mod dispatch;
mod error;
mod event;
mod login;
pub mod numeric;
mod send_queue;
mod stream;

pub use cirrus_parser::{Message, MessageBuilder, Origin, ParsingError};
pub use connection::{Client, ConnectionState, DEFAULT_PORT};
pub use dispatch::{DEFAULT_HANDLER, DispatchTable, Handler, HandlerSet};
pub use error::{ClientError, DispatchError};
pub use event::{Event, EventSink};
pub use login::Login;
