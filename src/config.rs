//! Runtime configuration knobs that the teacher hard-wired behind `cfg`
//! attributes or magic constants.

use std::time::Duration;

/// Controls whether a concrete [`crate::transport::HidTransport`] backend
/// must prepend an extra `0x00` HID report-number byte ahead of the
/// 64-byte report before handing it to the OS write primitive. This is
/// §9's "length byte" ambiguity: numerically the value is always `0x3F`
/// (63) either way — what differs across platform HID stacks is whether
/// that extra leading byte is needed at all. The `Framer` itself is
/// unaffected; only a backend like [`crate::transport::hidapi_backend`]
/// consumes this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPrefixMode {
    /// Prepend an extra `0x00` report-number byte (the historical Windows
    /// hidapi convention for devices that don't use numbered reports).
    Explicit,
    /// Send the 64-byte report as-is.
    Implicit,
}

impl Default for LengthPrefixMode {
    #[cfg(windows)]
    fn default() -> Self {
        LengthPrefixMode::Explicit
    }

    #[cfg(not(windows))]
    fn default() -> Self {
        LengthPrefixMode::Implicit
    }
}

/// Transport-level parameters. None of these are protocol timeouts (§5
/// says there are none intrinsic to the protocol) — they bound the
/// transport's own liveness, not how long a human may sit at a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    pub length_prefix: LengthPrefixMode,
    /// Per-report read timeout passed to the underlying HID backend.
    pub read_timeout: Duration,
    /// Upper bound on reassembled message size before `MalformedFrame`.
    pub max_message_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            length_prefix: LengthPrefixMode::default(),
            read_timeout: Duration::from_secs(10),
            max_message_size: 32 * 1024,
        }
    }
}
