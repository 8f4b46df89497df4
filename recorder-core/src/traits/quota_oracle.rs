/// Snapshot of storage quota as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageEstimate {
    pub quota_bytes: u64,
    pub used_bytes: u64,
}

impl StorageEstimate {
    pub fn available_bytes(&self) -> u64 {
        self.quota_bytes.saturating_sub(self.used_bytes)
    }
}

/// Reports available storage for chunk persistence.
pub trait QuotaOracle: Send + Sync {
    /// Current estimate, or `None` when the host cannot report one.
    ///
    /// A missing estimate never aborts a session.
    fn estimate(&self) -> Option<StorageEstimate>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_saturates_at_zero() {
        let estimate = StorageEstimate {
            quota_bytes: 10,
            used_bytes: 25,
        };
        assert_eq!(estimate.available_bytes(), 0);
    }

    #[test]
    fn available_is_quota_minus_used() {
        let estimate = StorageEstimate {
            quota_bytes: 100,
            used_bytes: 40,
        };
        assert_eq!(estimate.available_bytes(), 60);
    }
}
