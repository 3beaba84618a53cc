//! Transport-neutral socket frames.

/// One frame read from or written to a realtime socket.
///
/// The HTTP layer adapts its WebSocket type to a `Sink<Frame>` and a
/// `Stream<Item = Result<Frame, E>>` so connection logic never depends on a
/// particular server framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text frame.
    Text(String),
    /// Binary frame.
    Binary(Vec<u8>),
    /// Ping control frame.
    Ping(Vec<u8>),
    /// Pong control frame.
    Pong(Vec<u8>),
    /// Close frame.
    Close,
}
