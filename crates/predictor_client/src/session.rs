use predictor_structs::TokenResponse;

/// Observable authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum AuthStatus {
    Unauthenticated,
    Authenticated,
}

/// In-memory credentials of the current user. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    expires_minutes: Option<u32>,
    scopes: Vec<String>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the credentials returned by a successful login.
    pub fn establish(&mut self, token: TokenResponse) {
        self.token = Some(token.access_token).filter(|t| !t.is_empty());
        self.expires_minutes = token.expires_minutes;
        self.scopes = token.scopes;
    }

    /// Forgets token, expiry and scopes.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub const fn expires_minutes(&self) -> Option<u32> {
        self.expires_minutes
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub const fn status(&self) -> AuthStatus {
        if self.is_authenticated() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Unauthenticated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(access_token: &str) -> TokenResponse {
        TokenResponse {
            access_token: access_token.to_owned(),
            token_type: "bearer".to_owned(),
            expires_minutes: Some(15),
            scopes: vec!["client".to_owned()],
        }
    }

    #[test]
    fn test_new_session_is_unauthenticated() {
        let session = Session::new();
        assert_eq!(session.status(), AuthStatus::Unauthenticated);
        assert!(session.token().is_none());
    }

    #[test]
    fn test_establish_then_clear() {
        let mut session = Session::new();
        session.establish(token("abc"));
        assert_eq!(session.status(), AuthStatus::Authenticated);
        assert_eq!(session.token(), Some("abc"));
        assert_eq!(session.expires_minutes(), Some(15));
        assert_eq!(session.scopes(), ["client".to_owned()]);

        session.clear();
        assert_eq!(session, Session::default());
    }

    #[test]
    fn test_empty_token_is_not_authenticated() {
        let mut session = Session::new();
        session.establish(token(""));
        assert!(!session.is_authenticated());
    }
}
