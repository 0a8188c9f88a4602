use serde::{Deserialize, Serialize};

use crate::auth::{dto::PublicUser, repo::Role};

/// Snapshot of an authenticated session as persisted by a
/// [`TokenStore`](crate::client::store::TokenStore).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Option<PublicUser>,
}

/// In-memory session state of an [`ApiClient`](crate::client::ApiClient).
#[derive(Debug, Clone, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        access_token: String,
        refresh_token: String,
        /// Profile as returned at login time. Absent when the session was
        /// resumed from a store that predates the profile snapshot.
        user: Option<PublicUser>,
    },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    pub fn is_admin(&self) -> bool {
        match self {
            Session::Authenticated {
                user: Some(user), ..
            } => user.role == Role::Admin,
            _ => false,
        }
    }

    pub fn user(&self) -> Option<&PublicUser> {
        match self {
            Session::Authenticated { user, .. } => user.as_ref(),
            Session::Anonymous => None,
        }
    }

    /// Replace the access token in place, keeping the refresh token and
    /// profile. No-op when anonymous.
    pub fn set_access_token(&mut self, token: String) {
        if let Session::Authenticated { access_token, .. } = self {
            *access_token = token;
        }
    }

    pub fn snapshot(&self) -> Option<StoredSession> {
        match self {
            Session::Authenticated {
                access_token,
                refresh_token,
                user,
            } => Some(StoredSession {
                access_token: access_token.clone(),
                refresh_token: refresh_token.clone(),
                user: user.clone(),
            }),
            Session::Anonymous => None,
        }
    }
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Session::Authenticated {
            access_token: stored.access_token,
            refresh_token: stored.refresh_token,
            user: stored.user,
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn user_with_role(role: Role) -> PublicUser {
        PublicUser {
            id: Uuid::new_v4(),
            name: "Dana".into(),
            email: "dana@example.com".into(),
            role,
            is_active: true,
        }
    }

    #[test]
    fn anonymous_is_neither_authenticated_nor_admin() {
        let session = Session::Anonymous;
        assert!(!session.is_authenticated());
        assert!(!session.is_admin());
        assert!(session.user().is_none());
        assert!(session.snapshot().is_none());
    }

    #[test]
    fn is_admin_requires_the_admin_role() {
        let admin = Session::Authenticated {
            access_token: "a".into(),
            refresh_token: "r".into(),
            user: Some(user_with_role(Role::Admin)),
        };
        assert!(admin.is_admin());

        let plain = Session::Authenticated {
            access_token: "a".into(),
            refresh_token: "r".into(),
            user: Some(user_with_role(Role::User)),
        };
        assert!(plain.is_authenticated());
        assert!(!plain.is_admin());

        // A resumed session without a profile cannot claim admin.
        let resumed = Session::Authenticated {
            access_token: "a".into(),
            refresh_token: "r".into(),
            user: None,
        };
        assert!(!resumed.is_admin());
    }

    #[test]
    fn snapshot_round_trips_through_stored_session() {
        let session = Session::Authenticated {
            access_token: "a1".into(),
            refresh_token: "r1".into(),
            user: Some(user_with_role(Role::User)),
        };

        let stored = session.snapshot().unwrap();
        let restored = Session::from(stored);
        assert!(restored.is_authenticated());
        match restored {
            Session::Authenticated {
                access_token,
                refresh_token,
                user,
            } => {
                assert_eq!(access_token, "a1");
                assert_eq!(refresh_token, "r1");
                assert_eq!(user.unwrap().email, "dana@example.com");
            }
            Session::Anonymous => unreachable!(),
        }
    }

    #[test]
    fn set_access_token_keeps_the_refresh_token() {
        let mut session = Session::Authenticated {
            access_token: "old".into(),
            refresh_token: "r1".into(),
            user: None,
        };
        session.set_access_token("new".into());
        match &session {
            Session::Authenticated {
                access_token,
                refresh_token,
                ..
            } => {
                assert_eq!(access_token, "new");
                assert_eq!(refresh_token, "r1");
            }
            Session::Anonymous => unreachable!(),
        }
    }
}
