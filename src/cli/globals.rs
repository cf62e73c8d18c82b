use secrecy::SecretString;

/// Secrets resolved at startup and shared with the server.
#[derive(Clone)]
pub struct GlobalArgs {
    pub db_password: SecretString,
    pub session_secret: SecretString,
    pub jwt_secret: Option<SecretString>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(session_secret: SecretString) -> Self {
        Self {
            db_password: SecretString::default(),
            session_secret,
            jwt_secret: None,
        }
    }

    pub fn set_db_password(&mut self, password: SecretString) {
        self.db_password = password;
    }

    pub fn set_jwt_secret(&mut self, secret: Option<SecretString>) {
        self.jwt_secret = secret;
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("db_password", &"***")
            .field("session_secret", &"***")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "***"))
            .finish()
    }
}
