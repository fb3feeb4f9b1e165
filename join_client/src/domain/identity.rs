use serde::{Deserialize, Serialize};

const DISPLAY_NAME_MAX_LEN: usize = 32;

// Authenticated backend session as held by this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub access_token: String,
    pub is_anonymous: bool,
    // Metadata captured at sign-in; guests always carry one.
    pub display_name: Option<String>,
    pub expires_at: u64,
}

impl Session {
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at <= now
    }
}

// Profile record used to branch the join flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub is_anonymous: bool,
    pub converted_user_id: Option<String>,
}

/// Who is acting in the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    None,
    Guest {
        user_id: String,
        display_name: Option<String>,
    },
    Registered {
        user_id: String,
        display_name: Option<String>,
        email: Option<String>,
        avatar_url: Option<String>,
    },
}

impl Identity {
    pub fn from_profile(profile: &Profile) -> Self {
        if profile.is_anonymous {
            Identity::Guest {
                user_id: profile.user_id.clone(),
                display_name: profile.display_name.clone(),
            }
        } else {
            Identity::Registered {
                user_id: profile.user_id.clone(),
                display_name: profile.display_name.clone(),
                email: profile.email.clone(),
                avatar_url: profile.avatar_url.clone(),
            }
        }
    }

    // Only registered identities skip the display-name prompt.
    pub fn requires_display_name(&self) -> bool {
        !matches!(self, Identity::Registered { .. })
    }
}

// Merge that could not reach the backend and must be replayed later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpgrade {
    pub guest_user_id: String,
    pub display_name: Option<String>,
}

// Guest that a sign-in should absorb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorGuest {
    pub user_id: String,
    pub display_name: Option<String>,
}

/// Session state handed explicitly to every stage of the join flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub session: Option<Session>,
    pub profile: Option<Profile>,
    pub pending_upgrade: Option<PendingUpgrade>,
    // Guest whose stored session expired. Never a live identity; only merged.
    pub lapsed_guest: Option<PriorGuest>,
}

impl SessionContext {
    pub fn identity(&self) -> Identity {
        match (&self.session, &self.profile) {
            (Some(session), Some(profile)) if session.user_id == profile.user_id => {
                Identity::from_profile(profile)
            }
            _ => Identity::None,
        }
    }

    /// The live guest if there is one, else a guest whose session lapsed.
    pub fn prior_guest(&self) -> Option<PriorGuest> {
        match self.identity() {
            Identity::Guest {
                user_id,
                display_name,
            } => Some(PriorGuest {
                user_id,
                display_name,
            }),
            _ => self.lapsed_guest.clone(),
        }
    }

    pub fn guest_display_name(&self) -> Option<&str> {
        match &self.profile {
            Some(profile) if profile.is_anonymous => profile.display_name.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayNameError {
    #[error("display name is empty")]
    Empty,
    #[error("display name is longer than 32 characters")]
    TooLong,
    #[error("display name contains control characters")]
    ControlCharacter,
}

impl DisplayNameError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DisplayNameError::Empty => "Please enter a display name",
            DisplayNameError::TooLong => "Display name must be 32 characters or fewer",
            DisplayNameError::ControlCharacter => "Display name contains invalid characters",
        }
    }
}

// Names are shown to other participants, so keep them short and printable.
pub fn validate_display_name(value: &str) -> Result<String, DisplayNameError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();

    if len == 0 {
        return Err(DisplayNameError::Empty);
    }
    if len > DISPLAY_NAME_MAX_LEN {
        return Err(DisplayNameError::TooLong);
    }
    if trimmed.chars().any(char::is_control) {
        return Err(DisplayNameError::ControlCharacter);
    }

    Ok(trimmed.to_string())
}
