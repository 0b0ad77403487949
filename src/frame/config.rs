//! Limits applied by the [`FrameReassembler`](crate::frame::FrameReassembler).

use std::num::NonZeroUsize;

/// Default cap on the incomplete trailing candidate: 1 MiB.
pub const DEFAULT_MAX_PENDING_BYTES: NonZeroUsize = match NonZeroUsize::new(1024 * 1024) {
    Some(value) => value,
    None => unreachable!(),
};

/// Default number of decode diagnostics retained between drains.
pub const DEFAULT_MAX_DIAGNOSTICS: usize = 256;

/// Tunables for inbound record reassembly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReassemblerConfig {
    max_pending_bytes: NonZeroUsize,
    max_diagnostics: usize,
}

impl ReassemblerConfig {
    /// Build a configuration with default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_pending_bytes: DEFAULT_MAX_PENDING_BYTES,
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
        }
    }

    /// Largest incomplete candidate held while waiting for a boundary.
    ///
    /// A candidate that grows beyond this is discarded and input is skipped
    /// up to the next newline.
    #[must_use]
    pub const fn with_max_pending_bytes(mut self, limit: NonZeroUsize) -> Self {
        self.max_pending_bytes = limit;
        self
    }

    /// Number of [`FrameDecodeError`](crate::frame::FrameDecodeError)s kept
    /// for [`take_diagnostics`](crate::frame::FrameReassembler::take_diagnostics).
    ///
    /// Zero disables retention; failures are still logged and counted.
    #[must_use]
    pub const fn with_max_diagnostics(mut self, limit: usize) -> Self {
        self.max_diagnostics = limit;
        self
    }

    /// Configured pending-buffer cap.
    #[must_use]
    pub const fn max_pending_bytes(&self) -> NonZeroUsize { self.max_pending_bytes }

    /// Configured diagnostics capacity.
    #[must_use]
    pub const fn max_diagnostics(&self) -> usize { self.max_diagnostics }
}

impl Default for ReassemblerConfig {
    fn default() -> Self { Self::new() }
}
