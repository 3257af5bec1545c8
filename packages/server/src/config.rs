//! Server configuration.

/// Default listen port, overridable with `PORT`
pub const DEFAULT_PORT: u16 = 5000;

/// Default capacity of each connection's outbound queue
pub const DEFAULT_OUTBOUND_BUFFER: usize = 256;

/// Default upper bound for a decoded file attachment (5 MiB)
pub const DEFAULT_MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

/// Runtime configuration of the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port number to bind to
    pub port: u16,
    /// Frames queued per connection before deliveries to it are dropped
    pub outbound_buffer: usize,
    /// Maximum decoded size of a file attachment in bytes
    pub max_attachment_bytes: usize,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Largest WebSocket frame accepted from a client.
    ///
    /// Attachments travel as base64 (4 bytes per 3) inside a JSON envelope.
    pub fn max_frame_bytes(&self) -> usize {
        self.max_attachment_bytes.div_ceil(3) * 4 + 64 * 1024
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
        }
    }
}
