//! Teacher access gate: one shared passcode, no cryptography.

use thiserror::Error;

use telephone_engine::Participant;

pub const DEFAULT_PASSCODE: &str = "2025";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("incorrect passcode")]
    IncorrectPasscode,
}

#[derive(Debug, Clone)]
pub struct AccessGate {
    passcode: String,
}

impl AccessGate {
    pub fn new(passcode: impl Into<String>) -> Self {
        Self {
            passcode: passcode.into(),
        }
    }

    pub fn check(&self, attempt: &str) -> Result<(), AccessError> {
        if attempt == self.passcode {
            Ok(())
        } else {
            Err(AccessError::IncorrectPasscode)
        }
    }

    /// Groups pass freely; the teacher needs the passcode.
    pub fn select_role(
        &self,
        participant: Participant,
        attempt: Option<&str>,
    ) -> Result<Participant, AccessError> {
        if participant.is_teacher() {
            self.check(attempt.unwrap_or_default())?;
        }
        Ok(participant)
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new(DEFAULT_PASSCODE)
    }
}
