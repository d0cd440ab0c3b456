//! Onboarding workflow: a finite sequence of named steps with validation
//! gates. Progress is persisted on the employee row; each step save applies
//! its payload to the corresponding child resource.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Ordered wizard steps. `Review` is always last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    BasicInfo,
    Employment,
    Compensation,
    BankAccount,
    Documents,
    Review,
}

impl OnboardingStep {
    pub const SEQUENCE: [OnboardingStep; 6] = [
        OnboardingStep::BasicInfo,
        OnboardingStep::Employment,
        OnboardingStep::Compensation,
        OnboardingStep::BankAccount,
        OnboardingStep::Documents,
        OnboardingStep::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStep::BasicInfo => "basic_info",
            OnboardingStep::Employment => "employment",
            OnboardingStep::Compensation => "compensation",
            OnboardingStep::BankAccount => "bank_account",
            OnboardingStep::Documents => "documents",
            OnboardingStep::Review => "review",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::SEQUENCE.iter().copied().find(|step| step.as_str() == s)
    }

    /// The step after this one, or None for `Review`.
    pub fn next(&self) -> Option<Self> {
        let idx = Self::SEQUENCE.iter().position(|s| s == self)?;
        Self::SEQUENCE.get(idx + 1).copied()
    }
}

#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("unknown step: {0}")]
    UnknownStep(String),

    #[error("step '{requested}' not reached; current step is '{current}'")]
    StepNotReached { requested: String, current: String },

    #[error("validation gate failed for '{step}': {detail}")]
    GateFailed { step: String, detail: String },

    #[error("onboarding already complete")]
    AlreadyComplete,
}

/// Wizard position for one employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OnboardingState {
    /// Next step awaiting completion.
    pub current: OnboardingStep,
    pub complete: bool,
}

impl OnboardingState {
    pub fn new() -> Self {
        Self {
            current: OnboardingStep::BasicInfo,
            complete: false,
        }
    }

    /// Rebuild from the persisted columns.
    pub fn from_row(step: Option<&str>, complete: bool) -> Result<Self, OnboardingError> {
        let current = match step {
            Some(s) => {
                OnboardingStep::parse(s).ok_or_else(|| OnboardingError::UnknownStep(s.to_string()))?
            }
            None => OnboardingStep::BasicInfo,
        };
        Ok(Self { current, complete })
    }

    /// Save a step. The step must not be ahead of the current position
    /// (earlier steps may be revisited), and its validation gate must pass.
    /// On success the position advances past the saved step if it was the
    /// frontier.
    pub fn save_step(
        &self,
        step: OnboardingStep,
        payload: &Value,
    ) -> Result<Self, OnboardingError> {
        if self.complete {
            return Err(OnboardingError::AlreadyComplete);
        }
        if step > self.current {
            return Err(OnboardingError::StepNotReached {
                requested: step.as_str().to_string(),
                current: self.current.as_str().to_string(),
            });
        }

        validate_gate(step, payload)?;

        let current = if step == self.current {
            step.next().unwrap_or(OnboardingStep::Review)
        } else {
            self.current
        };

        Ok(Self {
            current,
            complete: false,
        })
    }

    /// Jump straight to the review step. Allowed once basic info has been
    /// accepted (i.e., the wizard has moved past the first step).
    pub fn skip_to_review(&self) -> Result<Self, OnboardingError> {
        if self.complete {
            return Err(OnboardingError::AlreadyComplete);
        }
        if self.current == OnboardingStep::BasicInfo {
            return Err(OnboardingError::StepNotReached {
                requested: OnboardingStep::Review.as_str().to_string(),
                current: OnboardingStep::BasicInfo.as_str().to_string(),
            });
        }
        Ok(Self {
            current: OnboardingStep::Review,
            complete: false,
        })
    }

    /// Finish onboarding. Only valid from the review step.
    pub fn complete(&self) -> Result<Self, OnboardingError> {
        if self.complete {
            return Err(OnboardingError::AlreadyComplete);
        }
        if self.current != OnboardingStep::Review {
            return Err(OnboardingError::StepNotReached {
                requested: OnboardingStep::Review.as_str().to_string(),
                current: self.current.as_str().to_string(),
            });
        }
        Ok(Self {
            current: OnboardingStep::Review,
            complete: true,
        })
    }
}

impl Default for OnboardingState {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-step validation gate over the submitted payload.
fn validate_gate(step: OnboardingStep, payload: &Value) -> Result<(), OnboardingError> {
    let gate_failed = |detail: &str| OnboardingError::GateFailed {
        step: step.as_str().to_string(),
        detail: detail.to_string(),
    };

    let require_str = |field: &str| -> Result<(), OnboardingError> {
        match payload.get(field).and_then(Value::as_str) {
            Some(s) if !s.trim().is_empty() => Ok(()),
            _ => Err(gate_failed(&format!("'{}' is required", field))),
        }
    };

    match step {
        OnboardingStep::BasicInfo => {
            require_str("first_name")?;
            require_str("last_name")?;
            require_str("email")?;
        }
        OnboardingStep::Employment => {
            require_str("designation")?;
            require_str("department")?;
            require_str("employment_type")?;
            require_str("joined_at")?;
        }
        OnboardingStep::Compensation => {
            if payload.get("basic").map_or(true, Value::is_null) {
                return Err(gate_failed("'basic' is required"));
            }
            require_str("currency")?;
            require_str("effective_from")?;
        }
        OnboardingStep::BankAccount => {
            require_str("account_holder")?;
            require_str("account_number")?;
            require_str("ifsc_code")?;
            require_str("bank_name")?;
        }
        OnboardingStep::Documents => {
            // Documents may be empty but the field itself must be a list
            match payload.get("documents") {
                Some(Value::Array(_)) => {}
                _ => return Err(gate_failed("'documents' must be a list")),
            }
        }
        OnboardingStep::Review => {
            if payload.get("confirmed") != Some(&Value::Bool(true)) {
                return Err(gate_failed("'confirmed' must be true"));
            }
        }
    }

    Ok(())
}
