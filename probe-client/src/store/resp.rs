//! RESP2 store client for Redis and Redis Cluster.
//!
//! Talks to a single seed node and learns the rest of the cluster from the
//! redirections it receives:
//! - `-MOVED <slot> <addr>` records `slot → addr` and retries there
//! - `-ASK <slot> <addr>` retries once on `addr`, preceded by `ASKING`,
//!   without touching the route cache
//!
//! Against a standalone Redis no redirection ever happens and every request
//! goes to the seed.
//!
//! Each request, including any connect it needs, must finish within the
//! configured timeout. A connection that errors or times out is dropped and
//! reopened by the next request to that node. Nothing is retried here
//! except redirections.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::codec::{encode_command, parse_reply, ParseResult, Reply};
use super::slot::key_hash_slot;
use super::{Store, StoreError};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

/// Default limit on redirections followed by one request.
pub const DEFAULT_MAX_REDIRECTS: usize = 16;

/// Read chunk size for replies.
const READ_CHUNK: usize = 4096;

/// Configuration for [`RespStore`].
#[derive(Debug, Clone)]
pub struct RespStoreConfig {
    /// Time budget for one request, connect included.
    pub timeout: Duration,
    /// Redirections followed before giving up on a request.
    pub max_redirects: usize,
}

impl Default for RespStoreConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl RespStoreConfig {
    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the redirect limit.
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }
}

/// A cluster redirection parsed from an error reply.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Redirect {
    Moved { slot: u16, addr: String },
    Ask { addr: String },
}

impl Redirect {
    fn parse(message: &str) -> Option<Self> {
        let mut parts = message.split_whitespace();
        let kind = parts.next()?;
        let slot: u16 = parts.next()?.parse().ok()?;
        let addr = connect_addr(parts.next()?)?;
        match kind {
            "MOVED" => Some(Redirect::Moved { slot, addr }),
            "ASK" => Some(Redirect::Ask { addr }),
            _ => None,
        }
    }
}

/// Turn a redirect target into a connectable address.
///
/// Redis writes IPv6 targets without brackets (`::1:7000`).
fn connect_addr(target: &str) -> Option<String> {
    let (host, port) = target.rsplit_once(':')?;
    if host.contains(':') && !host.starts_with('[') {
        Some(format!("[{}]:{}", host, port))
    } else {
        Some(target.to_string())
    }
}

/// One TCP connection to one node.
#[derive(Debug)]
struct Connection {
    stream: TcpStream,
    buf: Vec<u8>,
}

impl Connection {
    async fn open(addr: &str) -> Result<Self, StoreError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| StoreError::Connect {
                addr: addr.to_string(),
                reason: e.to_string(),
            })?;
        // Requests are tiny and strictly sequential.
        let _ = stream.set_nodelay(true);
        Ok(Self {
            stream,
            buf: Vec::with_capacity(READ_CHUNK),
        })
    }

    async fn request(&mut self, command: &[u8]) -> Result<Reply, StoreError> {
        self.stream
            .write_all(command)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;

        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match parse_reply(&self.buf) {
                ParseResult::Ok(reply, consumed) => {
                    self.buf.drain(..consumed);
                    return Ok(reply);
                }
                ParseResult::Error(e) => return Err(StoreError::Protocol(e)),
                ParseResult::Incomplete => {}
            }

            let n = self
                .stream
                .read(&mut chunk)
                .await
                .map_err(|e| StoreError::Io(e.to_string()))?;
            if n == 0 {
                return Err(StoreError::Io("connection closed by peer".to_string()));
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }
}

/// Store client speaking RESP2 over TCP, following cluster redirections.
#[derive(Debug)]
pub struct RespStore {
    seed: String,
    config: RespStoreConfig,
    connections: HashMap<String, Connection>,
    routes: HashMap<u16, String>,
}

impl RespStore {
    /// Create a client for the node at `seed` (`host:port`).
    ///
    /// No connection is made until the first request.
    pub fn new(seed: impl Into<String>, config: RespStoreConfig) -> Self {
        Self {
            seed: seed.into(),
            config,
            connections: HashMap::new(),
            routes: HashMap::new(),
        }
    }

    /// The seed node address.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// The node a request for `key` would be sent to first.
    pub fn route(&self, key: &str) -> &str {
        self.routes
            .get(&key_hash_slot(key.as_bytes()))
            .map(String::as_str)
            .unwrap_or(self.seed.as_str())
    }

    /// Number of open connections.
    pub fn open_connections(&self) -> usize {
        self.connections.len()
    }

    /// Send a command about `key`, following redirections.
    async fn call(&mut self, key: &str, args: &[&[u8]]) -> Result<Reply, StoreError> {
        let command = encode_command(args);
        let mut addr = self.route(key).to_string();
        let mut asking = false;

        for _ in 0..=self.config.max_redirects {
            let message = match self.send(&addr, &command, asking).await? {
                Reply::Error(message) => message,
                reply => return Ok(reply),
            };
            match Redirect::parse(&message) {
                Some(Redirect::Moved { slot, addr: target }) => {
                    tracing::debug!("MOVED slot {} to {}", slot, target);
                    self.routes.insert(slot, target.clone());
                    addr = target;
                    asking = false;
                }
                Some(Redirect::Ask { addr: target }) => {
                    tracing::debug!("ASK redirect for {} to {}", key, target);
                    addr = target;
                    asking = true;
                }
                None => return Err(StoreError::Server(message)),
            }
        }

        Err(StoreError::TooManyRedirects {
            limit: self.config.max_redirects,
        })
    }

    /// Send one command to one node within the timeout.
    async fn send(&mut self, addr: &str, command: &[u8], asking: bool) -> Result<Reply, StoreError> {
        let result =
            tokio::time::timeout(self.config.timeout, self.exchange(addr, command, asking)).await;
        let error = match result {
            Ok(Ok(reply)) => return Ok(reply),
            Ok(Err(e)) => e,
            Err(_) => StoreError::Timeout,
        };
        // The connection may hold a half-read reply; never reuse it.
        if self.connections.remove(addr).is_some() {
            tracing::debug!("Dropped connection to {}: {}", addr, error);
        }
        Err(error)
    }

    async fn exchange(
        &mut self,
        addr: &str,
        command: &[u8],
        asking: bool,
    ) -> Result<Reply, StoreError> {
        if !self.connections.contains_key(addr) {
            let conn = Connection::open(addr).await?;
            tracing::debug!("Connected to {}", addr);
            self.connections.insert(addr.to_string(), conn);
        }
        let conn = self
            .connections
            .get_mut(addr)
            .ok_or_else(|| StoreError::Io(format!("no connection to {}", addr)))?;

        if asking {
            match conn.request(&encode_command(&[&b"ASKING"[..]])).await? {
                Reply::Simple(_) => {}
                Reply::Error(message) => return Err(StoreError::Server(message)),
                other => {
                    return Err(StoreError::Protocol(format!(
                        "unexpected reply to ASKING: {:?}",
                        other
                    )))
                }
            }
        }
        conn.request(command).await
    }
}

#[async_trait]
impl Store for RespStore {
    async fn get(&mut self, key: &str) -> Result<Option<String>, StoreError> {
        match self.call(key, &[&b"GET"[..], key.as_bytes()]).await? {
            Reply::Bulk(value) => Ok(value.map(|v| String::from_utf8_lossy(&v).into_owned())),
            Reply::Integer(n) => Ok(Some(n.to_string())),
            Reply::Simple(s) => Ok(Some(s)),
            other => Err(StoreError::Protocol(format!(
                "unexpected reply to GET: {:?}",
                other
            ))),
        }
    }

    async fn incr(&mut self, key: &str) -> Result<i64, StoreError> {
        match self.call(key, &[&b"INCR"[..], key.as_bytes()]).await? {
            Reply::Integer(n) => Ok(n),
            other => Err(StoreError::Protocol(format!(
                "unexpected reply to INCR: {:?}",
                other
            ))),
        }
    }
}
