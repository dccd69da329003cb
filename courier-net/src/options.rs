//! Configuration shared by connections and servers.

use courier_protocol::{Mode, DEFAULT_MAX_FRAME_LEN};
use std::time::Duration;

/// Connection/server configuration
#[derive(Debug, Clone)]
pub struct Options {
    /// Bound on each network operation (connect, accept, send, recv)
    pub timeout: Duration,
    /// How received payloads are decoded
    pub mode: Mode,
    /// Largest payload accepted from or sent to a peer
    pub max_frame_len: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            mode: Mode::Text,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();

        assert_eq!(options.timeout, Duration::from_secs(20));
        assert_eq!(options.mode, Mode::Text);
        assert_eq!(options.max_frame_len, DEFAULT_MAX_FRAME_LEN);
    }
}
