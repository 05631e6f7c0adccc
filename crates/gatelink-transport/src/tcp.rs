//! TCP implementation of the single-shot exchange.

use crate::DeviceTransport;
use gatelink_core::constants::{EXCHANGE_TIMEOUT_MS, RESPONSE_BUFFER_SIZE};
use gatelink_core::{Device, Error, Result};
use gatelink_protocol::{ProtocolHandler, ProtocolMessage};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace, warn};

/// Timeouts of one exchange.
///
/// The defaults are the protocol constants; production code never overrides
/// them, tests shorten them to keep timeout cases fast.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Budget for establishing the TCP connection.
    pub connect_timeout: Duration,

    /// Budget for the single response read.
    pub read_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(EXCHANGE_TIMEOUT_MS),
            read_timeout: Duration::from_millis(EXCHANGE_TIMEOUT_MS),
        }
    }
}

/// Plain-TCP transport: dial, write the handler-encoded command, read one
/// buffer, drop the socket.
#[derive(Debug, Clone, Default)]
pub struct TcpDeviceTransport {
    config: TransportConfig,
}

impl TcpDeviceTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TransportConfig::default())
    }

    #[must_use]
    pub fn with_config(config: TransportConfig) -> Self {
        TcpDeviceTransport { config }
    }
}

impl DeviceTransport for TcpDeviceTransport {
    async fn exchange(
        &self,
        device: &Device,
        command: &ProtocolMessage,
        handler: &dyn ProtocolHandler,
    ) -> Result<Vec<u8>> {
        // Endpoint precondition comes before anything that could dial.
        if !device.has_endpoint() {
            return Err(Error::ConfigurationMissing {
                device_id: device.id.clone(),
                detail: "no network endpoint (address/port)".to_string(),
            });
        }

        let payload = handler
            .encode_command(command)
            .map_err(|e| Error::CommandBuild(e.to_string()))?;

        let endpoint = device.endpoint();
        trace!(
            device_id = %device.id,
            endpoint = %endpoint,
            command = %command.message_type,
            payload_len = payload.len(),
            "Opening device connection"
        );

        let connect_ms = self.config.connect_timeout.as_millis() as u64;
        let mut stream = match tokio::time::timeout(
            self.config.connect_timeout,
            TcpStream::connect(&endpoint),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                warn!(device_id = %device.id, endpoint = %endpoint, error = %e, "Connect failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(device_id = %device.id, endpoint = %endpoint, "Connect timeout after {connect_ms}ms");
                return Err(Error::ConnectTimeout(connect_ms));
            }
        };

        // Terminals answer small commands; waiting on Nagle only adds latency.
        if let Err(e) = stream.set_nodelay(true) {
            warn!(device_id = %device.id, error = %e, "Failed to set TCP_NODELAY");
        }

        stream.write_all(&payload).await?;
        stream.flush().await?;

        // Half-close the write side so terminals that read to EOF know the
        // command is complete. Best effort: the read below decides the call.
        if let Err(e) = stream.shutdown().await {
            warn!(device_id = %device.id, error = %e, "Failed to half-close write side");
        }

        let read_ms = self.config.read_timeout.as_millis() as u64;
        let mut buf = vec![0u8; RESPONSE_BUFFER_SIZE];
        let n = match tokio::time::timeout(self.config.read_timeout, stream.read(&mut buf)).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                warn!(device_id = %device.id, endpoint = %endpoint, error = %e, "Read failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(device_id = %device.id, endpoint = %endpoint, "Read timeout after {read_ms}ms");
                return Err(Error::ReadTimeout(read_ms));
            }
        };
        // Stream drops here on every path; no session survives the call.

        if n == 0 {
            debug!(device_id = %device.id, endpoint = %endpoint, "Device closed without responding");
            return Err(Error::ResponseEmpty);
        }

        buf.truncate(n);
        trace!(device_id = %device.id, response_len = n, "Device responded");
        Ok(buf)
    }
}
