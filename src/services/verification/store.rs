//! In-memory registration state.
//!
//! One map from user id to [`RegistrationState`] stands in for both the
//! pending set (key present) and the issued-token map (state carries a
//! token). Every transition is a compare-and-set under a single lock, so
//! concurrent direct messages from the same user cannot issue two tokens or
//! grant roles twice. Nothing is persisted; a restart forgets everyone.

use parking_lot::Mutex;
use serenity::model::id::UserId;
use std::collections::HashMap;

/// Where a pending user is in the verification flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    /// Prompted for an institutional email address.
    AwaitingEmail,
    /// Verification email in flight.
    SendingEmail,
    /// Token issued; waiting for the user to echo it back.
    AwaitingToken { token: String },
    /// Token matched; roles being granted.
    GrantingRoles { token: String },
}

impl RegistrationState {
    /// The issued token, if one exists.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::AwaitingToken { token } | Self::GrantingRoles { token } => Some(token),
            Self::AwaitingEmail | Self::SendingEmail => None,
        }
    }
}

/// Outcome of checking a submitted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    /// Exact match; the user is now in `GrantingRoles`.
    Matched,
    /// Wrong token; state unchanged.
    Mismatch,
    /// The user is not waiting for a token.
    NotAwaiting,
}

/// Registration state for every user currently verifying.
#[derive(Debug, Default)]
pub struct VerificationStore {
    entries: Mutex<HashMap<UserId, RegistrationState>>,
}

impl VerificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user as `AwaitingEmail`. Returns `false` if already pending.
    pub fn begin(&self, user: UserId) -> bool {
        let mut entries = self.entries.lock();
        if entries.contains_key(&user) {
            return false;
        }
        entries.insert(user, RegistrationState::AwaitingEmail);
        true
    }

    /// Drop a user who never got past `AwaitingEmail`.
    pub fn cancel(&self, user: UserId) {
        let mut entries = self.entries.lock();
        if entries.get(&user) == Some(&RegistrationState::AwaitingEmail) {
            entries.remove(&user);
        }
    }

    /// Current state, if the user is pending.
    pub fn get(&self, user: UserId) -> Option<RegistrationState> {
        self.entries.lock().get(&user).cloned()
    }

    #[cfg(test)]
    pub fn is_pending(&self, user: UserId) -> bool {
        self.entries.lock().contains_key(&user)
    }

    /// The token issued to a user, if any.
    #[cfg(test)]
    pub fn token(&self, user: UserId) -> Option<String> {
        self.entries
            .lock()
            .get(&user)
            .and_then(|s| s.token().map(str::to_string))
    }

    /// `AwaitingEmail` -> `SendingEmail`.
    pub fn start_dispatch(&self, user: UserId) -> bool {
        self.transition(user, |state| match state {
            RegistrationState::AwaitingEmail => Some(RegistrationState::SendingEmail),
            _ => None,
        })
    }

    /// `SendingEmail` -> `AwaitingToken`, recording the token.
    pub fn issue_token(&self, user: UserId, token: String) -> bool {
        self.transition(user, move |state| match state {
            RegistrationState::SendingEmail => Some(RegistrationState::AwaitingToken { token }),
            _ => None,
        })
    }

    /// `SendingEmail` -> `AwaitingEmail` after the mail provider failed.
    pub fn abort_dispatch(&self, user: UserId) -> bool {
        self.transition(user, |state| match state {
            RegistrationState::SendingEmail => Some(RegistrationState::AwaitingEmail),
            _ => None,
        })
    }

    /// Compare a submitted token; on an exact match move to `GrantingRoles`.
    pub fn check_token(&self, user: UserId, submitted: &str) -> TokenCheck {
        let mut entries = self.entries.lock();
        let Some(state) = entries.get_mut(&user) else {
            return TokenCheck::NotAwaiting;
        };
        match state {
            RegistrationState::AwaitingToken { token } if token.as_str() == submitted => {
                let token = std::mem::take(token);
                *state = RegistrationState::GrantingRoles { token };
                TokenCheck::Matched
            }
            RegistrationState::AwaitingToken { .. } => TokenCheck::Mismatch,
            _ => TokenCheck::NotAwaiting,
        }
    }

    /// `GrantingRoles` -> `AwaitingToken`, keeping the same token.
    pub fn abort_grant(&self, user: UserId) -> bool {
        self.transition(user, |state| match state {
            RegistrationState::GrantingRoles { token } => {
                Some(RegistrationState::AwaitingToken { token })
            }
            _ => None,
        })
    }

    /// Remove a user whose roles were granted. Verified users are not tracked.
    pub fn complete(&self, user: UserId) -> bool {
        let mut entries = self.entries.lock();
        if matches!(entries.get(&user), Some(RegistrationState::GrantingRoles { .. })) {
            entries.remove(&user);
            return true;
        }
        false
    }

    /// Number of users mid-registration.
    pub fn pending_count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Apply `step` to the user's current state; `None` leaves it untouched.
    fn transition<F>(&self, user: UserId, step: F) -> bool
    where
        F: FnOnce(RegistrationState) -> Option<RegistrationState>,
    {
        let mut entries = self.entries.lock();
        let Some(current) = entries.get(&user).cloned() else {
            return false;
        };
        match step(current) {
            Some(next) => {
                entries.insert(user, next);
                true
            }
            None => false,
        }
    }
}
