use std::time::Duration;
use async_trait::async_trait;
use tokio::net::TcpStream;

/// Decides whether a host and port currently accept TCP connections.
#[async_trait]
pub trait ReachabilityChecker: Send + Sync {
    /// `true` only when a connection was established. Every failure,
    /// whatever its cause, is `false`.
    async fn check(&self, host: &str, port: u16) -> bool;
}

/// Single connect attempt bounded by a timeout. The stream is dropped as soon
/// as it is established; nothing is written or read.
#[derive(Debug, Clone)]
pub struct TcpChecker {
    timeout: Duration,
}

impl TcpChecker {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ReachabilityChecker for TcpChecker {
    async fn check(&self, host: &str, port: u16) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                tracing::debug!("Connect to {}:{} failed: {}", host, port, e);
                false
            }
            Err(_) => {
                tracing::debug!("Connect to {}:{} timed out after {:?}", host, port, self.timeout);
                false
            }
        }
    }
}
