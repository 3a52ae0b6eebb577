use tokio::sync::watch;

use crate::entities::UserProfile;

/// what the rest of the app knows about who is signed in.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user_data: Option<UserProfile>,
    /// true until the first resolution.
    pub loading: bool,
    /// false while no current-user check has ever finished.
    pub resolved: bool,
    /// a current-user check is in flight.
    pub checking: bool,
    epoch: u64,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            is_authenticated: false,
            user_data: None,
            loading: true,
            resolved: false,
            checking: false,
            epoch: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unknown,
    Checking,
    Authenticated,
    AuthenticatedUnverified,
    Unauthenticated,
}

impl AuthState {
    pub fn guard_state(&self) -> GuardState {
        match (self.resolved, self.checking, &self.user_data) {
            (false, false, _) => GuardState::Unknown,
            (false, true, _) => GuardState::Checking,
            (true, _, Some(p)) if self.is_authenticated => match p.email_verified {
                true => GuardState::Authenticated,
                false => GuardState::AuthenticatedUnverified,
            },
            (true, ..) => GuardState::Unauthenticated,
        }
    }
}

/// an in-flight current-user check, tagged with the epoch it started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckTicket(u64);

/// owner of the auth state; readers hold a `watch::Receiver`.
pub struct SessionStore {
    tx: watch::Sender<AuthState>,
}

impl Default for SessionStore {
    fn default() -> Self { Self::new() }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AuthState::default());

        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> { self.tx.subscribe() }

    pub fn current(&self) -> AuthState { self.tx.borrow().clone() }

    pub fn guard_state(&self) -> GuardState { self.tx.borrow().guard_state() }

    pub fn user(&self) -> Option<UserProfile> {
        let state = self.tx.borrow();

        match state.is_authenticated {
            true => state.user_data.clone(),
            false => None,
        }
    }

    pub fn begin_check(&self) -> CheckTicket {
        let mut ticket = CheckTicket(0);

        self.tx.send_modify(|s| {
            s.checking = true;
            ticket = CheckTicket(s.epoch);
        });

        ticket
    }

    /// applies a check result; `false` when a login/logout happened meanwhile.
    pub fn resolve(&self, ticket: CheckTicket, user: Option<UserProfile>) -> bool {
        self.tx.send_if_modified(|s| {
            if s.epoch != ticket.0 {
                tracing::debug!(
                    "dropping stale check result (epoch {} != {})",
                    ticket.0,
                    s.epoch
                );
                return false;
            }

            s.is_authenticated = user.is_some();
            s.user_data = user;
            s.loading = false;
            s.resolved = true;
            s.checking = false;

            true
        })
    }

    pub fn login(&self, user: UserProfile) {
        self.tx.send_modify(|s| {
            s.epoch += 1;
            s.is_authenticated = true;
            s.user_data = Some(user);
            s.loading = false;
            s.resolved = true;
            s.checking = false;
        });
    }

    pub fn logout(&self) {
        self.tx.send_modify(|s| {
            s.epoch += 1;
            s.is_authenticated = false;
            s.user_data = None;
            s.loading = false;
            s.resolved = true;
            s.checking = false;
        });
    }

    /// replaces the cached profile of the signed-in user, if any.
    pub fn refresh_profile(&self, user: UserProfile) {
        self.tx.send_if_modified(|s| match &s.user_data {
            Some(p) if s.is_authenticated && p.user_id == user.user_id => {
                s.user_data = Some(user);
                true
            },
            _ => false,
        });
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::entities::Provider;

    fn profile(verified: bool) -> UserProfile {
        UserProfile {
            user_id: "u1".into(),
            username: "alovelace1843".to_string(),
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            email_verified: verified,
            avatar_url: None,
            provider: Provider::Email,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn starts_unknown_and_loading() {
        let store = SessionStore::new();

        assert_eq!(store.guard_state(), GuardState::Unknown);
        assert!(store.current().loading);
    }

    #[test]
    fn check_resolves_by_verification() {
        let store = SessionStore::new();

        let t = store.begin_check();
        assert_eq!(store.guard_state(), GuardState::Checking);

        assert!(store.resolve(t, Some(profile(false))));
        assert_eq!(store.guard_state(), GuardState::AuthenticatedUnverified);
        assert!(!store.current().loading);

        let t = store.begin_check();
        assert!(store.resolve(t, Some(profile(true))));
        assert_eq!(store.guard_state(), GuardState::Authenticated);
    }

    #[test]
    fn failed_check_is_unauthenticated() {
        let store = SessionStore::new();

        let t = store.begin_check();
        store.resolve(t, None);

        assert_eq!(store.guard_state(), GuardState::Unauthenticated);
        assert_eq!(store.user(), None);
    }

    #[test]
    fn logout_during_check_wins() {
        let store = SessionStore::new();

        let t = store.begin_check();
        store.logout();

        assert!(!store.resolve(t, Some(profile(true))));
        assert_eq!(store.guard_state(), GuardState::Unauthenticated);
    }

    #[test]
    fn recheck_does_not_flash_loading() {
        let store = SessionStore::new();
        store.login(profile(true));

        let _ = store.begin_check();

        assert_eq!(store.guard_state(), GuardState::Authenticated);
    }

    #[tokio::test]
    async fn subscribers_see_login() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();

        store.login(profile(true));

        rx.changed().await.unwrap();
        assert!(rx.borrow().is_authenticated);
    }

    #[test]
    fn refresh_only_touches_same_user() {
        let store = SessionStore::new();
        store.login(profile(false));

        let mut other = profile(true);
        other.user_id = "u2".into();
        store.refresh_profile(other);
        assert_eq!(store.guard_state(), GuardState::AuthenticatedUnverified);

        store.refresh_profile(profile(true));
        assert_eq!(store.guard_state(), GuardState::Authenticated);
    }
}
