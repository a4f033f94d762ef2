use std::{
    io::{ErrorKind, Read, Write},
    net::{Shutdown as SocketShutdown, TcpStream, ToSocketAddrs},
    time::{Duration, Instant},
};

use tracing::*;

use super::error::{ConnectionError, ProtocolError};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 4711;

/// Marks the end of every FTL answer.
pub const SENTINEL: &str = "---EOM---";

const MAX_RESPONSE_SIZE: usize = 64 * 1024;
const READ_CHUNK_SIZE: usize = 1024;

/// Commands understood by the FTL telnet API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Version,
    Stats,
}

impl Command {
    pub fn token(&self) -> &'static str {
        match self {
            Self::Version => ">version",
            Self::Stats => ">stats",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// The single socket to the FTL service.
///
/// Requests take `&mut self`, so a second request can't be issued while an answer is
/// still being read. The socket is shut down by [`ConnectionHandle::close`] or, at the
/// latest, when the handle is dropped.
#[derive(Debug)]
pub struct ConnectionHandle {
    address: String,
    stream: Option<TcpStream>,
    read_timeout: Duration,
}

impl ConnectionHandle {
    #[instrument(level = "debug")]
    pub fn connect(
        host: &str,
        port: u16,
        read_timeout: Duration,
    ) -> Result<Self, ConnectionError> {
        let address = format!("{host}:{port}");

        let socket_address = (host, port)
            .to_socket_addrs()
            .map_err(|source| ConnectionError::Resolve {
                address: address.clone(),
                source,
            })?
            .next()
            .ok_or_else(|| ConnectionError::NoAddress(address.clone()))?;

        let stream = TcpStream::connect_timeout(&socket_address, read_timeout).map_err(
            |source| ConnectionError::Connect {
                address: address.clone(),
                source,
            },
        )?;

        stream
            .set_read_timeout(Some(read_timeout))
            .and_then(|_| stream.set_nodelay(true))
            .map_err(|source| ConnectionError::Configure {
                address: address.clone(),
                source,
            })?;

        info!("Connected to FTL at {address}");

        Ok(Self {
            address,
            stream: Some(stream),
            read_timeout,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Sends one command and waits for its complete answer, sentinel stripped.
    #[instrument(level = "debug", skip(self), fields(address = %self.address))]
    pub fn request(&mut self, command: Command) -> Result<String, ProtocolError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(ProtocolError::NotConnected);
        };

        stream
            .write_all(command.token().as_bytes())
            .and_then(|_| stream.flush())
            .map_err(|source| ProtocolError::Send { command, source })?;

        let response = read_response(stream, self.read_timeout)?;
        debug!("{command} answered with {} bytes", response.len());

        Ok(response)
    }

    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(stream) = self.stream.take() else {
            return;
        };

        if let Err(error) = stream.shutdown(SocketShutdown::Both) {
            debug!("Socket to {} was already gone: {error}", self.address);
        }

        info!("Closed connection to FTL at {}", self.address);
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A reader whose next read can be bounded in time.
pub trait DeadlineRead: Read {
    /// `remaining` is never zero.
    fn limit_next_read(&mut self, remaining: Duration) -> std::io::Result<()>;
}

impl DeadlineRead for TcpStream {
    fn limit_next_read(&mut self, remaining: Duration) -> std::io::Result<()> {
        self.set_read_timeout(Some(remaining))
    }
}

/// Reads from `reader` until [`SENTINEL`] shows up, returning the text before it.
///
/// The sentinel may arrive split over several reads. `timeout` bounds the whole
/// exchange: every read is limited to what is left of it. A reader that reports
/// `WouldBlock`/`TimedOut` also counts as a timeout.
pub fn read_response<R: DeadlineRead>(
    reader: &mut R,
    timeout: Duration,
) -> Result<String, ProtocolError> {
    let started = Instant::now();
    let mut buffer: Vec<u8> = Vec::with_capacity(READ_CHUNK_SIZE);
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        let remaining = timeout.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return Err(ProtocolError::Timeout(timeout));
        }
        reader.limit_next_read(remaining)?;

        let received = match reader.read(&mut chunk) {
            Ok(0) => {
                return Err(ProtocolError::Closed {
                    received: buffer.len(),
                })
            }
            Ok(received) => received,
            Err(error) if error.kind() == ErrorKind::Interrupted => continue,
            Err(error) if matches!(error.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Err(ProtocolError::Timeout(timeout))
            }
            Err(error) => return Err(ProtocolError::Io(error)),
        };

        // Rescan the tail of what we had, the marker may straddle two reads
        let search_from = buffer.len().saturating_sub(SENTINEL.len() - 1);
        buffer.extend_from_slice(&chunk[..received]);

        if let Some(position) = find_sentinel(&buffer[search_from..]) {
            let text = std::str::from_utf8(&buffer[..search_from + position])?;
            trace!("Response complete after {:?}", started.elapsed());
            return Ok(strip_sentinel(text).to_string());
        }

        if buffer.len() > MAX_RESPONSE_SIZE {
            return Err(ProtocolError::ResponseTooLarge {
                limit: MAX_RESPONSE_SIZE,
            });
        }
    }
}

/// Cuts `text` at the first [`SENTINEL`] and trims surrounding whitespace.
pub fn strip_sentinel(text: &str) -> &str {
    let text = match text.find(SENTINEL) {
        Some(position) => &text[..position],
        None => text,
    };

    text.trim()
}

fn find_sentinel(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(SENTINEL.len())
        .position(|window| window == SENTINEL.as_bytes())
}
