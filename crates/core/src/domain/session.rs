use serde::{Deserialize, Serialize};

use crate::domain::preferences::PreferenceSet;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub const DEFAULT: &'static str = "default";
}

impl Default for ConversationId {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Booking negotiation state for one conversation.
///
/// Fields are private so the only way to deactivate is [`Session::reset`], which also
/// clears preferences: an inactive session never carries preferences.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    active: bool,
    preferences: PreferenceSet,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn preferences(&self) -> &PreferenceSet {
        &self.preferences
    }

    /// Starts a negotiation seeded with `preferences`, replacing whatever was there.
    pub fn activate(&mut self, preferences: PreferenceSet) {
        self.active = true;
        self.preferences = preferences;
    }

    /// Folds newly extracted preferences into an active negotiation. Ignored while inactive.
    pub fn absorb(&mut self, preferences: &PreferenceSet) {
        if self.active {
            self.preferences.merge(preferences);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::domain::preferences::PreferenceSet;

    fn blue() -> PreferenceSet {
        PreferenceSet { color: Some("blue".to_string()), ..PreferenceSet::default() }
    }

    #[test]
    fn new_session_is_inactive_and_empty() {
        let session = Session::new();
        assert!(!session.is_active());
        assert!(session.preferences().is_empty());
    }

    #[test]
    fn absorb_is_ignored_while_inactive() {
        let mut session = Session::new();
        session.absorb(&blue());
        assert!(session.preferences().is_empty());
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut session = Session::new();
        session.activate(blue());
        session.absorb(&PreferenceSet { year: Some(2021), ..PreferenceSet::default() });
        assert_eq!(session.preferences().year, Some(2021));

        session.reset();
        assert_eq!(session, Session::new());
    }
}
