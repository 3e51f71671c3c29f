// Waiting for the dev server to come up
use crate::config::{DevConfig, Readiness};
use crate::dev::cancel::CancellationToken;
use anyhow::{Context, Result};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};
use url::Url;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessProbe {
    /// Sleep and assume the server bound its port; nothing is verified
    FixedDelay(Duration),
    /// Retry a TCP connect until it succeeds or `timeout` passes
    PortPoll {
        host: String,
        port: u16,
        timeout: Duration,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Fixed delay elapsed
    Assumed,
    /// Port accepted a connection
    Ready,
    TimedOut,
    Cancelled,
}

impl ReadinessProbe {
    pub fn from_config(dev: &DevConfig) -> Result<Self> {
        match dev.readiness {
            Readiness::Fixed => Ok(Self::FixedDelay(Duration::from_secs(dev.wait_seconds))),
            Readiness::Poll => {
                let (host, port) = host_and_port(&dev.url)?;
                Ok(Self::PortPoll {
                    host,
                    port,
                    timeout: Duration::from_secs(dev.poll_timeout_seconds),
                })
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::FixedDelay(delay) => format!("waiting {}s", delay.as_secs()),
            Self::PortPoll { host, port, timeout } => {
                format!("polling {}:{} for up to {}s", host, port, timeout.as_secs())
            }
        }
    }

    pub fn wait(&self, cancel: &CancellationToken) -> WaitOutcome {
        match self {
            Self::FixedDelay(delay) => {
                if cancel.sleep(*delay) {
                    WaitOutcome::Assumed
                } else {
                    WaitOutcome::Cancelled
                }
            }
            Self::PortPoll {
                host,
                port,
                timeout,
            } => poll_port(host, *port, *timeout, cancel),
        }
    }
}

pub fn host_and_port(raw_url: &str) -> Result<(String, u16)> {
    let url = Url::parse(raw_url).with_context(|| format!("Invalid dev server URL: {}", raw_url))?;
    let host = url
        .host_str()
        .with_context(|| format!("Dev server URL has no host: {}", raw_url))?
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_string();
    let port = url
        .port_or_known_default()
        .with_context(|| format!("Dev server URL has no port: {}", raw_url))?;
    Ok((host, port))
}

fn poll_port(host: &str, port: u16, timeout: Duration, cancel: &CancellationToken) -> WaitOutcome {
    let deadline = Instant::now() + timeout;
    loop {
        if cancel.is_cancelled() {
            return WaitOutcome::Cancelled;
        }
        if accepts_connections(host, port) {
            return WaitOutcome::Ready;
        }
        if Instant::now() >= deadline {
            return WaitOutcome::TimedOut;
        }
        if !cancel.sleep(POLL_INTERVAL) {
            return WaitOutcome::Cancelled;
        }
    }
}

fn accepts_connections(host: &str, port: u16) -> bool {
    let Ok(mut addrs) = (host, port).to_socket_addrs() else {
        return false;
    };
    addrs.any(|addr| TcpStream::connect_timeout(&addr, POLL_INTERVAL).is_ok())
}
