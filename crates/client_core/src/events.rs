//! Explicit UI wiring: every event source and the action it triggers, in one
//! enumerable table registered at startup.

use tracing::debug;

use crate::controller::{Controller, MessengerView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    RegisterForm,
    SharedKeyForm,
    ComposeForm,
    InboxForm,
    Bootstrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Submit,
    Startup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    RegisterUser,
    RefreshRoster,
    DeriveSharedKey,
    SendMessage,
    CheckInbox,
}

pub struct Subscription {
    pub source: EventSource,
    pub kind: EventKind,
    pub action: UiAction,
}

/// The complete wiring. Startup refreshes the identity selectors once; every
/// other action is form-driven.
pub const SUBSCRIPTIONS: &[Subscription] = &[
    Subscription {
        source: EventSource::Bootstrap,
        kind: EventKind::Startup,
        action: UiAction::RefreshRoster,
    },
    Subscription {
        source: EventSource::RegisterForm,
        kind: EventKind::Submit,
        action: UiAction::RegisterUser,
    },
    Subscription {
        source: EventSource::SharedKeyForm,
        kind: EventKind::Submit,
        action: UiAction::DeriveSharedKey,
    },
    Subscription {
        source: EventSource::ComposeForm,
        kind: EventKind::Submit,
        action: UiAction::SendMessage,
    },
    Subscription {
        source: EventSource::InboxForm,
        kind: EventKind::Submit,
        action: UiAction::CheckInbox,
    },
];

pub fn action_for(source: EventSource, kind: EventKind) -> Option<UiAction> {
    SUBSCRIPTIONS
        .iter()
        .find(|s| s.source == source && s.kind == kind)
        .map(|s| s.action)
}

fn action_name(action: UiAction) -> &'static str {
    match action {
        UiAction::RegisterUser => "register_user",
        UiAction::RefreshRoster => "refresh_roster",
        UiAction::DeriveSharedKey => "derive_shared_key",
        UiAction::SendMessage => "send_message",
        UiAction::CheckInbox => "check_inbox",
    }
}

impl<V: MessengerView> Controller<V> {
    /// Runs the action subscribed for `(source, kind)`. Returns false when no
    /// subscription matches.
    pub async fn fire(&mut self, source: EventSource, kind: EventKind) -> bool {
        let Some(action) = action_for(source, kind) else {
            return false;
        };
        self.handle(action).await;
        true
    }

    /// Executes one UI action, reading its inputs from the bound view fields.
    pub async fn handle(&mut self, action: UiAction) {
        debug!(action = action_name(action), "dispatching ui action");
        match action {
            UiAction::RegisterUser => {
                let name = self.view().register_name();
                self.register_user(&name).await;
            }
            UiAction::RefreshRoster => self.refresh_client_options().await,
            UiAction::DeriveSharedKey => {
                let (a, b) = self.view().key_pair_selection();
                self.derive_shared_key(&a, &b).await;
            }
            UiAction::SendMessage => {
                let fields = self.view().compose_fields();
                self.send_message(&fields.sender, &fields.receiver, &fields.message)
                    .await;
            }
            UiAction::CheckInbox => {
                let user = self.view().inbox_user();
                self.check_inbox(&user).await;
            }
        }
    }

    /// One-time startup hook: fires the bootstrap subscription.
    pub async fn bootstrap(&mut self) {
        self.fire(EventSource::Bootstrap, EventKind::Startup).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_form_resolves_to_its_action() {
        assert_eq!(
            action_for(EventSource::RegisterForm, EventKind::Submit),
            Some(UiAction::RegisterUser)
        );
        assert_eq!(
            action_for(EventSource::Bootstrap, EventKind::Startup),
            Some(UiAction::RefreshRoster)
        );
        assert_eq!(action_for(EventSource::Bootstrap, EventKind::Submit), None);
        assert_eq!(
            action_for(EventSource::RegisterForm, EventKind::Startup),
            None
        );
    }

    #[test]
    fn subscriptions_have_no_duplicate_bindings() {
        for (i, a) in SUBSCRIPTIONS.iter().enumerate() {
            for b in &SUBSCRIPTIONS[i + 1..] {
                assert!(
                    !(a.source == b.source && a.kind == b.kind),
                    "duplicate binding for {:?}/{:?}",
                    a.source,
                    a.kind
                );
            }
        }
    }
}
