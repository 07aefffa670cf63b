use crate::{entities::contact::ContactFormInput, errors::ContactError};

/// Cheap heuristics run before any validation or network I/O.
#[derive(Debug, Clone, Copy)]
pub struct BotFilter {
    min_elapsed_ms: u64,
}

impl BotFilter {
    pub fn new(min_elapsed_ms: u64) -> Self {
        BotFilter { min_elapsed_ms }
    }

    /// Rejects forms submitted faster than a human could fill them in.
    ///
    /// An absent measurement is let through: the public form body does not carry
    /// `elapsed_ms`, so older clients would otherwise be rejected outright.
    pub fn check_timing(&self, elapsed_ms: Option<u64>) -> Result<(), ContactError> {
        match elapsed_ms {
            Some(elapsed_ms) if elapsed_ms < self.min_elapsed_ms => {
                Err(ContactError::TooFast { elapsed_ms })
            }
            _ => Ok(()),
        }
    }

    /// Any non-blank honeypot value marks the submission as automated.
    pub fn check_honeypot(&self, honeypot: Option<&str>) -> Result<(), ContactError> {
        if honeypot.is_some_and(|value| !value.trim().is_empty()) {
            Err(ContactError::SpamDetected)
        } else {
            Ok(())
        }
    }

    pub fn inspect(&self, input: &ContactFormInput) -> Result<(), ContactError> {
        self.check_timing(input.elapsed_ms)?;
        self.check_honeypot(input.company_website.as_deref())
    }
}
