use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use cirrus_client::{
    Client, ClientError, DispatchError, DispatchTable, HandlerSet, Message, ParsingError,
    numeric,
};

const VERSION: &str = concat!("cirrus ", env!("CARGO_PKG_VERSION"));

/// What the handlers need to know about the session.
#[derive(Debug)]
pub struct Host {
    nickname: String,
    channels: Vec<String>,
    nick_retries: AtomicU32,
}

impl Host {
    pub fn new(nickname: impl Into<String>, channels: Vec<String>) -> Self {
        Self {
            nickname: nickname.into(),
            channels,
            nick_retries: AtomicU32::new(0),
        }
    }

    /// Forget the session state, on each new connection.
    pub fn reset(&self) {
        self.nick_retries.store(0, Ordering::Relaxed);
    }

    fn next_nickname(&self) -> String {
        let retry = self.nick_retries.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{retry}", self.nickname)
    }
}

fn send(client: &Client, message: Result<Message, ParsingError>) {
    let result = message
        .map_err(ClientError::from)
        .and_then(|message| client.send(&message));
    if let Err(err) = result {
        log::warn!("cannot send: {err}");
    }
}

fn sender(message: &Message) -> &str {
    message
        .origin()
        .map(|origin| origin.nickname().unwrap_or(origin.host()))
        .unwrap_or("*")
}

fn on_ping(client: &Client, message: &Message) {
    let token = message
        .trailing()
        .or_else(|| message.first_parameter())
        .unwrap_or_default();
    send(client, Message::pong(token));
}

fn on_join(_: &Client, message: &Message) {
    let channel = message
        .first_parameter()
        .or_else(|| message.trailing())
        .unwrap_or_default();
    log::info!("{} joined {channel}", sender(message));
}

fn on_notice(_: &Client, message: &Message) {
    let text = message.trailing().unwrap_or_default();
    log::info!("-{}- {text}", sender(message));
}

fn on_privmsg(client: &Client, message: &Message) {
    let from = sender(message);
    let target = message.first_parameter().unwrap_or_default();

    match message.ctcp_body() {
        Some("VERSION") => {
            log::info!("{from} asked for our version");
            send(client, Message::ctcp_reply(from, &format!("VERSION {VERSION}")));
        }
        Some(body) => match body.strip_prefix("ACTION ") {
            Some(action) => log::info!("{target}: * {from} {action}"),
            None => log::debug!("ignoring CTCP {body:?} from {from}"),
        },
        None => {
            let text = message.trailing().unwrap_or_default();
            log::info!("{target}: <{from}> {text}");
        }
    }
}

fn on_default(_: &Client, message: &Message) {
    log::info!("{message}");
}

pub fn build(host: Arc<Host>) -> Result<DispatchTable<Client>, DispatchError> {
    let welcome_host = Arc::clone(&host);
    let nick_host = host;

    HandlerSet::new()
        .on("PING", on_ping)
        .on("JOIN", on_join)
        .on("NOTICE", on_notice)
        .on("PRIVMSG", on_privmsg)
        .on(numeric::RPL_WELCOME, move |client: &Client, message: &Message| {
            on_default(client, message);
            for channel in &welcome_host.channels {
                send(client, Message::join(channel.as_str()));
            }
        })
        .on_each(
            &[
                numeric::ERR_ERRONEUSNICKNAME,
                numeric::ERR_NICKNAMEINUSE,
                numeric::ERR_NICKCOLLISION,
            ],
            move |client: &Client, message: &Message| {
                let nickname = nick_host.next_nickname();
                log::warn!(
                    "nickname refused ({}), trying {nickname}",
                    message.trailing().unwrap_or(message.command())
                );
                send(client, Message::nick(nickname));
            },
        )
        .on_default(on_default)
        .build()
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
        net::{TcpListener, tcp::OwnedWriteHalf},
    };

    use cirrus_client::{Client, Event};

    use super::{Host, VERSION, build};

    const TIMEOUT: Duration = Duration::from_secs(5);

    struct Server {
        lines: tokio::io::Lines<BufReader<tokio::net::tcp::OwnedReadHalf>>,
        writer: OwnedWriteHalf,
    }

    impl Server {
        async fn send(&mut self, line: &str) {
            self.writer.write_all(line.as_bytes()).await.unwrap();
            self.writer.write_all(b"\r\n").await.unwrap();
        }

        async fn expect(&mut self, expected: &str) {
            let line = tokio::time::timeout(TIMEOUT, self.lines.next_line())
                .await
                .unwrap()
                .unwrap()
                .unwrap();
            assert_eq!(line, expected);
        }
    }

    async fn connect(channels: &[&str]) -> (Client, Server) {
        let channels = channels.iter().map(|c| c.to_string()).collect();
        let host = Arc::new(Host::new("guest", channels));
        let (client, mut events) = Client::new(build(host).unwrap());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        client.connect("127.0.0.1", port).unwrap();
        let (stream, _) = listener.accept().await.unwrap();
        let event = tokio::time::timeout(TIMEOUT, events.recv()).await.unwrap();
        assert!(matches!(event, Some(Event::Connected)));

        let (reader, writer) = stream.into_split();
        let server = Server {
            lines: BufReader::new(reader).lines(),
            writer,
        };
        (client, server)
    }

    #[tokio::test]
    async fn test_ping() {
        let (_client, mut server) = connect(&[]).await;
        server.send("PING :irc.example.net").await;
        server.expect("PONG :irc.example.net").await;
    }

    #[tokio::test]
    async fn test_welcome_joins_channels() {
        let (_client, mut server) = connect(&["#rust", "#irc"]).await;
        server.send(":srv 001 guest :Welcome").await;
        server.expect("JOIN #rust").await;
        server.expect("JOIN #irc").await;
    }

    #[tokio::test]
    async fn test_nickname_retries() {
        let (_client, mut server) = connect(&[]).await;
        server.send(":srv 433 * guest :Nickname is already in use").await;
        server.expect("NICK guest1").await;
        server.send(":srv 436 * guest1 :Nickname collision").await;
        server.expect("NICK guest2").await;
    }

    #[tokio::test]
    async fn test_ctcp_version() {
        let (_client, mut server) = connect(&[]).await;
        server.send(":alice!a@host PRIVMSG guest :\x01VERSION\x01").await;
        server
            .expect(&format!("NOTICE alice :\x01VERSION {VERSION}\x01"))
            .await;
    }

    #[tokio::test]
    async fn test_plain_messages_get_no_reply() {
        let (_client, mut server) = connect(&[]).await;
        server.send(":alice!a@host PRIVMSG #rust :hello").await;
        server.send(":alice!a@host JOIN #rust").await;
        server.send(":srv NOTICE * :hello").await;
        server.send(":srv 372 guest :- motd").await;
        server.send("PING :sync").await;
        server.expect("PONG :sync").await;
    }

    #[test]
    fn test_reset() {
        let host = Host::new("guest", vec![]);
        assert_eq!(host.next_nickname(), "guest1");
        assert_eq!(host.next_nickname(), "guest2");
        host.reset();
        assert_eq!(host.next_nickname(), "guest1");
    }
}
