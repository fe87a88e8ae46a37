/// Identifies one issued request. Tokens from the same [`RequestEpoch`] increase monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Tracks the latest issued request so that only its response is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestEpoch {
    latest: u64,
    // Set when the latest request no longer matters (dismissed popup, pan back, teardown).
    retired: bool,
}

impl RequestEpoch {
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        self.retired = false;
        RequestToken(self.latest)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        !self.retired && token.0 == self.latest
    }

    /// Make every outstanding token stale without issuing a new one.
    pub fn retire(&mut self) {
        self.retired = true;
    }
}
