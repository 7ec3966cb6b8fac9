use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::Instant,
};
use tracing_subscriber::EnvFilter;

use cirrus_client::{Client, Event, EventSink, Message};

mod config;
mod handlers;

use crate::config::Config;
use crate::handlers::Host;

const QUIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Terminal IRC client: lines typed on stdin are sent as is
#[derive(Parser, Debug)]
struct Args {
    #[arg(short, long, default_value = "cirrus.yml")]
    config: PathBuf,

    /// Overrides the address of the config file
    #[arg(short, long)]
    address: Option<String>,

    /// Overrides the port of the config file
    #[arg(short, long)]
    port: Option<u16>,
}

struct Reconnect {
    failures: u32,
    at: Option<Instant>,
}

impl Reconnect {
    /// Schedule the next attempt, or return false when the policy gives up.
    fn schedule(&mut self, config: &Config) -> bool {
        let Some(policy) = &config.reconnect else {
            return false;
        };
        if self.failures >= policy.attempts {
            log::error!("giving up after {} attempts", self.failures);
            return false;
        }
        self.failures += 1;
        log::info!(
            "reconnecting in {}s (attempt {}/{})",
            policy.delay.as_secs(),
            self.failures,
            policy.attempts
        );
        self.at = Some(Instant::now() + policy.delay);
        true
    }
}

async fn quit(client: &Client, events: &mut EventSink) -> anyhow::Result<()> {
    if client.is_connected() {
        client.send(&Message::quit(Some("leaving"))?)?;
        // let the server close the link after the QUIT
        let closed = async {
            while let Some(event) = events.recv().await {
                if matches!(event, Event::Disconnected) {
                    break;
                }
            }
        };
        let _ = tokio::time::timeout(QUIT_TIMEOUT, closed).await;
    }
    client.disconnect();
    Ok(())
}

async fn run(config: Config) -> anyhow::Result<()> {
    let host = Arc::new(Host::new(config.nickname.as_str(), config.channels.clone()));
    let dispatch = handlers::build(Arc::clone(&host))?;
    let (client, mut events) = Client::new(dispatch);
    client.connect(&config.address, config.port)?;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut reconnect = Reconnect {
        failures: 0,
        at: None,
    };

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                match event {
                    Event::Connected => {
                        reconnect.failures = 0;
                        host.reset();
                        client.login(&config.login()).context("sending login")?;
                    }
                    Event::ConnectFailed(_) | Event::Disconnected => {
                        if !reconnect.schedule(&config) {
                            break;
                        }
                    }
                }
            },
            _ = tokio::time::sleep_until(reconnect.at.unwrap_or_else(Instant::now)), if reconnect.at.is_some() => {
                reconnect.at = None;
                client.connect(&config.address, config.port)?;
            },
            line = stdin.next_line(), if stdin_open => {
                match line.context("reading from stdin")? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => {
                        if let Err(err) = client.send_raw(&line) {
                            log::warn!("cannot send {line:?}: {err}");
                        }
                    }
                    None => stdin_open = false,
                }
            },
            result = tokio::signal::ctrl_c() => {
                result.context("waiting for ctrl-c")?;
                log::info!("quitting");
                quit(&client, &mut events).await?;
                break;
            },
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let mut config = Config::load_from_path(&args.config)?;
    if let Some(address) = args.address {
        config.address = address;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    run(config).await
}
