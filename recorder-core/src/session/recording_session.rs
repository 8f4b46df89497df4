/// Per-recording counters: sequence assignment, the timestamp watermark and
/// the stop/flush flags.
///
/// Only the pipeline mutates a session, always under its lock, so index
/// assignment and watermark updates happen together.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSession {
    pub id: String,
    /// Index the next accepted fragment will be persisted under.
    pub next_sequence_index: u64,
    /// Ordering timestamp of the latest accepted fragment.
    pub last_accepted_timestamp: f64,
    /// Stop was requested; waiting for the source's flush fragment.
    pub finishing: bool,
    /// A fragment arrived after stop was requested.
    pub last_fragment_seen: bool,
    pub bytes_persisted: u64,
    pub chunks_dropped: u64,
    has_accepted: bool,
}

/// Ordering decision for one fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    Accept,
    Drop { watermark: f64 },
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            next_sequence_index: 0,
            last_accepted_timestamp: 0.0,
            finishing: false,
            last_fragment_seen: false,
            bytes_persisted: 0,
            chunks_dropped: 0,
            has_accepted: false,
        }
    }

    /// Check `timestamp` against the watermark.
    ///
    /// The first fragment of a session is always accepted. Later fragments
    /// are dropped only when strictly older than the watermark; accepting
    /// one advances the watermark.
    pub fn admit(&mut self, timestamp: f64) -> Admission {
        if self.has_accepted && timestamp < self.last_accepted_timestamp {
            self.chunks_dropped += 1;
            return Admission::Drop {
                watermark: self.last_accepted_timestamp,
            };
        }
        self.has_accepted = true;
        self.last_accepted_timestamp = timestamp;
        Admission::Accept
    }

    /// Advance the counter after a successful write.
    pub fn record_persisted(&mut self, bytes: usize) {
        self.next_sequence_index += 1;
        self.bytes_persisted += bytes as u64;
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_fragment_always_accepted() {
        let mut session = RecordingSession::new();
        assert_eq!(session.admit(-5.0), Admission::Accept);
        assert_eq!(session.last_accepted_timestamp, -5.0);
    }

    #[test]
    fn older_fragment_dropped() {
        let mut session = RecordingSession::new();
        session.admit(100.0);
        assert_eq!(session.admit(50.0), Admission::Drop { watermark: 100.0 });
        assert_eq!(session.last_accepted_timestamp, 100.0);
        assert_eq!(session.chunks_dropped, 1);
    }

    #[test]
    fn equal_timestamp_accepted() {
        let mut session = RecordingSession::new();
        session.admit(100.0);
        assert_eq!(session.admit(100.0), Admission::Accept);
    }

    #[test]
    fn new_sessions_start_at_zero() {
        let mut session = RecordingSession::new();
        session.admit(1.0);
        session.record_persisted(10);
        assert_eq!(session.next_sequence_index, 1);

        let fresh = RecordingSession::new();
        assert_eq!(fresh.next_sequence_index, 0);
        assert_eq!(fresh.last_accepted_timestamp, 0.0);
        assert!(!fresh.finishing && !fresh.last_fragment_seen);
        assert_ne!(fresh.id, session.id);
    }
}
