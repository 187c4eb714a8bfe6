//! Utility functions and helpers

pub mod random {
    //! Key material drawn from the OS entropy source. Failures are returned, never retried.
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use rand::distributions::Alphanumeric;
    use rand::rngs::{OsRng, StdRng};
    use rand::{Rng, RngCore, SeedableRng};

    use crate::error::{AutomationError, AutomationResult};

    /// Fill `len` bytes from the OS random source
    pub fn random_bytes(len: usize, stage: &'static str) -> AutomationResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| AutomationError::entropy(stage, e))?;
        Ok(buf)
    }

    /// Random alphanumeric string, e.g. agent usernames and passwords
    pub fn random_alphanumeric(len: usize, stage: &'static str) -> AutomationResult<String> {
        let rng = StdRng::from_rng(OsRng).map_err(|e| AutomationError::entropy(stage, e))?;
        Ok(rng
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect())
    }

    /// base64 of `len` random bytes
    pub fn random_base64(len: usize, stage: &'static str) -> AutomationResult<String> {
        Ok(STANDARD.encode(random_bytes(len, stage)?))
    }
}

use chrono::{DateTime, SecondsFormat, Utc};

/// RFC 3339 in UTC with second precision, e.g. `2024-01-15T12:00:00Z`
pub fn rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The given instant, or now
pub fn timestamp(at: Option<DateTime<Utc>>) -> String {
    rfc3339(at.unwrap_or_else(Utc::now))
}

/// Format a process address the way filters spell it
pub fn host_port(hostname: &str, port: u16) -> String {
    format!("{}:{}", hostname, port)
}
