use std::{fmt, sync::Arc};

use parking_lot::Mutex;
use tokio::{io::AsyncReadExt, net::TcpStream, sync::oneshot};

use cirrus_parser::{LendingIterator, Message, StreamParser};

use crate::{
    dispatch::DispatchTable,
    error::ClientError,
    event::{Event, EventSink, EventSource},
    login::Login,
    numeric,
    send_queue::SendQueue,
    stream::{BoxedWriter, ReadStream},
};

pub const DEFAULT_PORT: u16 = 6667;

const READ_BUFFER_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug)]
struct Link {
    state: ConnectionState,
    /// Bumped by every connect, so that tasks of a previous connection can tell they
    /// are stale.
    generation: u64,
    /// Wakes the read loop up when the connection is closed locally.
    shutdown: Option<oneshot::Sender<()>>,
}

struct Shared {
    link: Mutex<Link>,
    send_queue: SendQueue,
    dispatch: DispatchTable<Client>,
    events: EventSource,
}

/// One connection to a server.
///
/// Handlers of the dispatch table run on the read loop and get the client back, so
/// they can reply through it. Cloning gives another handle on the same connection.
#[derive(Clone)]
pub struct Client {
    shared: Arc<Shared>,
}

impl Client {
    pub fn new(dispatch: DispatchTable<Client>) -> (Self, EventSink) {
        let (events, event_sink) = EventSource::new();
        let shared = Shared {
            link: Mutex::new(Link {
                state: ConnectionState::Disconnected,
                generation: 0,
                shutdown: None,
            }),
            send_queue: SendQueue::default(),
            dispatch,
            events,
        };
        let client = Self {
            shared: Arc::new(shared),
        };
        (client, event_sink)
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.link.lock().state
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Start connecting in the background, the outcome comes as [`Event::Connected`] or
    /// [`Event::ConnectFailed`]. Must be called from within a tokio runtime.
    pub fn connect(&self, host: &str, port: u16) -> Result<(), ClientError> {
        let generation = self.begin_connect()?;

        log::info!("connecting to {host}:{port}");
        let client = self.clone();
        let host = host.to_string();
        tokio::spawn(async move {
            match TcpStream::connect((host.as_str(), port)).await {
                Ok(stream) => {
                    if let Err(err) = stream.set_nodelay(true) {
                        log::debug!("cannot set TCP_NODELAY: {err}");
                    }
                    log::info!("connected to {host}:{port}");
                    let (reader, writer) = stream.into_split();
                    client.start_session(generation, reader, Box::new(writer));
                }
                Err(err) => client.connect_failed(generation, err),
            }
        });
        Ok(())
    }

    /// Close the connection. Does nothing unless connected.
    pub fn disconnect(&self) {
        let shutdown = {
            let mut link = self.shared.link.lock();
            if link.state != ConnectionState::Connected {
                return;
            }
            link.state = ConnectionState::Disconnected;
            self.shared.send_queue.detach();
            link.shutdown.take()
        };
        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(());
        }

        log::info!("disconnected from the server");
        self.shared.events.raise(Event::Disconnected);
    }

    pub fn send(&self, message: &Message) -> Result<(), ClientError> {
        self.shared.send_queue.enqueue(message)
    }

    /// Send a line as is, CRLF is added.
    pub fn send_raw(&self, line: &str) -> Result<(), ClientError> {
        if line.contains(['\r', '\n']) {
            return Err(ClientError::LineBreakInRaw);
        }
        self.shared.send_queue.enqueue_line(line.as_bytes())
    }

    /// Send the `PASS`, `NICK` and `USER` registration sequence.
    pub fn login(&self, login: &Login) -> Result<(), ClientError> {
        for message in login.messages()? {
            self.send(&message)?;
        }
        Ok(())
    }

    fn begin_connect(&self) -> Result<u64, ClientError> {
        let mut link = self.shared.link.lock();
        if link.state != ConnectionState::Disconnected {
            return Err(ClientError::AlreadyConnected);
        }
        link.state = ConnectionState::Connecting;
        link.generation += 1;
        Ok(link.generation)
    }

    fn connect_failed(&self, generation: u64, err: std::io::Error) {
        {
            let mut link = self.shared.link.lock();
            if link.generation != generation || link.state != ConnectionState::Connecting {
                return;
            }
            link.state = ConnectionState::Disconnected;
        }

        log::warn!("could not connect: {err}");
        self.shared.events.raise(Event::ConnectFailed(err));
    }

    pub(crate) fn start_session<R>(&self, generation: u64, reader: R, writer: BoxedWriter)
    where
        R: ReadStream,
    {
        let (shutdown, shutdown_receiver) = oneshot::channel();
        {
            let mut link = self.shared.link.lock();
            if link.generation != generation || link.state != ConnectionState::Connecting {
                return;
            }
            link.state = ConnectionState::Connected;
            link.shutdown = Some(shutdown);
            self.shared.send_queue.attach(writer);
        }
        self.shared.events.raise(Event::Connected);

        let client = self.clone();
        tokio::spawn(async move {
            client
                .run_read_loop(generation, reader, shutdown_receiver)
                .await;
        });
    }

    async fn run_read_loop<R>(
        self,
        generation: u64,
        mut reader: R,
        mut shutdown: oneshot::Receiver<()>,
    ) where
        R: ReadStream,
    {
        // a new parser per connection, nothing left over from the previous one
        let mut stream_parser = StreamParser::default();
        let mut chunk = [0_u8; READ_BUFFER_SIZE];

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    // closed locally, disconnect() already did the rest
                    return;
                },
                result = reader.read(&mut chunk) => {
                    let received = match result {
                        Ok(0) => {
                            log::info!("connection closed by the server");
                            break;
                        }
                        Ok(received) => received,
                        Err(err) => {
                            log::warn!("error when reading from the server: {err}");
                            break;
                        }
                    };

                    stream_parser.feed_from_slice(&chunk[..received]);
                    if !self.dispatch_all(generation, &mut stream_parser) {
                        return;
                    }
                },
            }
        }

        self.close(generation);
    }

    /// Returns false when the connection went away while dispatching.
    fn dispatch_all(&self, generation: u64, stream_parser: &mut StreamParser) -> bool {
        let mut iter = stream_parser.consume_iter();
        while let Some(line) = iter.next() {
            if !self.is_current(generation) {
                return false;
            }

            let message = match Message::parse_bytes(line) {
                Ok(m) => m,
                Err(err) => {
                    log::warn!("error when parsing message: {err:#}");
                    continue;
                }
            };
            log::trace!("<- {message}");

            if message.numeric().is_some() && !self.shared.dispatch.handles(message.command()) {
                let name = numeric::name(message.command()).unwrap_or("unknown reply");
                log::debug!("{} ({name}) goes to the default handler", message.command());
            }
            self.shared.dispatch.dispatch(self, &message);
        }
        true
    }

    fn is_current(&self, generation: u64) -> bool {
        let link = self.shared.link.lock();
        link.generation == generation && link.state == ConnectionState::Connected
    }

    /// The server went away: same as disconnect(), for the connection it was about.
    fn close(&self, generation: u64) {
        {
            let mut link = self.shared.link.lock();
            if link.generation != generation || link.state != ConnectionState::Connected {
                return;
            }
            link.state = ConnectionState::Disconnected;
            link.shutdown = None;
            self.shared.send_queue.detach();
        }
        self.shared.events.raise(Event::Disconnected);
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("state", &self.state())
            .field("dispatch", &self.shared.dispatch)
            .finish_non_exhaustive()
    }
}
