// Join flow state machine: pure `(state, event) -> (state, effect)` decisions.
// Effects describe the I/O the driver must perform; nothing here touches the network.

use crate::domain::errors::JoinError;
use crate::domain::identity::{Identity, validate_display_name};
use crate::domain::join::JoinResult;
use crate::domain::room_code::RoomCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinState {
    Unknown,
    Checking,
    NoIdentity,
    GuestIdentity {
        display_name: Option<String>,
    },
    RegisteredIdentity {
        display_name: Option<String>,
    },
    Bootstrapping {
        code: RoomCode,
        display_name: String,
        reuse_session: bool,
    },
    Joining {
        code: RoomCode,
        display_name: Option<String>,
        // Idle state to return to when the exchange fails.
        fallback: Box<JoinState>,
    },
    Success(JoinResult),
    Error {
        error: JoinError,
        resume: Box<JoinState>,
    },
}

impl JoinState {
    pub fn name(&self) -> &'static str {
        match self {
            JoinState::Unknown => "unknown",
            JoinState::Checking => "checking",
            JoinState::NoIdentity => "no_identity",
            JoinState::GuestIdentity { .. } => "guest_identity",
            JoinState::RegisteredIdentity { .. } => "registered_identity",
            JoinState::Bootstrapping { .. } => "bootstrapping",
            JoinState::Joining { .. } => "joining",
            JoinState::Success(_) => "success",
            JoinState::Error { .. } => "error",
        }
    }

    // A network step of the current attempt is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            JoinState::Checking | JoinState::Bootstrapping { .. } | JoinState::Joining { .. }
        )
    }

    pub fn prompts_for_display_name(&self) -> bool {
        match self {
            JoinState::NoIdentity | JoinState::GuestIdentity { .. } => true,
            JoinState::Error { resume, .. } => resume.prompts_for_display_name(),
            _ => false,
        }
    }

    fn from_identity(identity: Identity) -> Self {
        match identity {
            Identity::None => JoinState::NoIdentity,
            Identity::Guest { display_name, .. } => JoinState::GuestIdentity { display_name },
            Identity::Registered { display_name, .. } => {
                JoinState::RegisteredIdentity { display_name }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinEvent {
    Mounted,
    // Lookup failures arrive here as `Identity::None`.
    IdentityResolved(Identity),
    Submitted {
        code: String,
        display_name: Option<String>,
    },
    Bootstrapped,
    BootstrapFailed(JoinError),
    Joined(JoinResult),
    JoinFailed(JoinError),
    Retry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CheckSession,
    SignInAnonymously { display_name: String },
    ReuseGuestSession { display_name: String },
    ExchangeToken {
        code: RoomCode,
        display_name: Option<String>,
    },
    Navigate(JoinResult),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: JoinState,
    pub effect: Option<Effect>,
}

impl Transition {
    fn to(state: JoinState) -> Self {
        Self {
            state,
            effect: None,
        }
    }

    fn with(state: JoinState, effect: Effect) -> Self {
        Self {
            state,
            effect: Some(effect),
        }
    }

    fn fail(error: JoinError, resume: JoinState) -> Self {
        Self::to(JoinState::Error {
            error,
            resume: Box::new(resume),
        })
    }
}

/// Applies one event. Events that do not fit the current state leave it
/// unchanged with no effect; this is what swallows re-entrant submits while a
/// bootstrap or exchange is in flight, and submits before the identity check
/// has finished.
pub fn transition(state: JoinState, event: JoinEvent) -> Transition {
    match (state, event) {
        (JoinState::Unknown, JoinEvent::Mounted) => {
            Transition::with(JoinState::Checking, Effect::CheckSession)
        }
        (JoinState::Checking, JoinEvent::IdentityResolved(identity)) => {
            Transition::to(JoinState::from_identity(identity))
        }

        (JoinState::NoIdentity, JoinEvent::Submitted { code, display_name }) => {
            let resume = JoinState::NoIdentity;
            let code = match RoomCode::parse(&code) {
                Ok(code) => code,
                Err(err) => return Transition::fail(err.into(), resume),
            };
            match validate_display_name(display_name.as_deref().unwrap_or_default()) {
                Ok(display_name) => Transition::with(
                    JoinState::Bootstrapping {
                        code,
                        display_name: display_name.clone(),
                        reuse_session: false,
                    },
                    Effect::SignInAnonymously { display_name },
                ),
                Err(err) => Transition::fail(err.into(), resume),
            }
        }
        (
            JoinState::GuestIdentity {
                display_name: current,
            },
            JoinEvent::Submitted { code, display_name },
        ) => {
            let resume = JoinState::GuestIdentity {
                display_name: current.clone(),
            };
            let code = match RoomCode::parse(&code) {
                Ok(code) => code,
                Err(err) => return Transition::fail(err.into(), resume),
            };
            // Guests confirm their existing name by submitting without one.
            let candidate = display_name.or(current).unwrap_or_default();
            match validate_display_name(&candidate) {
                Ok(display_name) => Transition::with(
                    JoinState::Bootstrapping {
                        code,
                        display_name: display_name.clone(),
                        reuse_session: true,
                    },
                    Effect::ReuseGuestSession { display_name },
                ),
                Err(err) => Transition::fail(err.into(), resume),
            }
        }
        (
            JoinState::RegisteredIdentity { display_name },
            JoinEvent::Submitted { code, .. },
        ) => {
            let resume = JoinState::RegisteredIdentity { display_name };
            match RoomCode::parse(&code) {
                Ok(code) => Transition::with(
                    JoinState::Joining {
                        code: code.clone(),
                        display_name: None,
                        fallback: Box::new(resume),
                    },
                    Effect::ExchangeToken {
                        code,
                        display_name: None,
                    },
                ),
                Err(err) => Transition::fail(err.into(), resume),
            }
        }

        (
            JoinState::Bootstrapping {
                code, display_name, ..
            },
            JoinEvent::Bootstrapped,
        ) => Transition::with(
            JoinState::Joining {
                code: code.clone(),
                display_name: Some(display_name.clone()),
                fallback: Box::new(JoinState::GuestIdentity {
                    display_name: Some(display_name.clone()),
                }),
            },
            Effect::ExchangeToken {
                code,
                display_name: Some(display_name),
            },
        ),
        (
            JoinState::Bootstrapping {
                display_name,
                reuse_session,
                ..
            },
            JoinEvent::BootstrapFailed(error),
        ) => {
            let resume = if reuse_session {
                JoinState::GuestIdentity {
                    display_name: Some(display_name),
                }
            } else {
                JoinState::NoIdentity
            };
            Transition::fail(error, resume)
        }

        (JoinState::Joining { .. }, JoinEvent::Joined(result)) => {
            Transition::with(JoinState::Success(result.clone()), Effect::Navigate(result))
        }
        // A rejected session cannot be reused; the retry starts from a fresh sign-in.
        (JoinState::Joining { .. }, JoinEvent::JoinFailed(JoinError::SessionRejected)) => {
            Transition::fail(JoinError::SessionRejected, JoinState::NoIdentity)
        }
        (JoinState::Joining { fallback, .. }, JoinEvent::JoinFailed(error)) => {
            Transition::fail(error, *fallback)
        }

        (JoinState::Error { resume, .. }, JoinEvent::Retry) => Transition::to(*resume),
        // Resubmitting from the error screen is a retry followed by a submit.
        (JoinState::Error { resume, .. }, event @ JoinEvent::Submitted { .. }) => {
            transition(*resume, event)
        }

        (state, _) => Transition::to(state),
    }
}
