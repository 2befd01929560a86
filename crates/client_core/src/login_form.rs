use std::{sync::LazyLock, time::Duration};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{
    validation::{FieldErrors, FieldSource, FieldValue, Rule, Schema},
    with_timeout, Authenticator, Credentials, Navigator,
};

pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";

pub const AUTH_FAILED_MESSAGE: &str = "Invalid username or password";

static LOGIN_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .field(
            USERNAME,
            [Rule::min_length(3, "Username must be at least 3 characters")],
        )
        .field(
            PASSWORD,
            [Rule::min_length(8, "Password must be at least 8 characters")],
        )
});

/// Stand-in for the authentication endpoint: accepts anything after a fixed delay.
pub struct SimulatedAuthenticator {
    delay: Duration,
}

impl SimulatedAuthenticator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Authenticator for SimulatedAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> anyhow::Result<()> {
        debug!(username = %credentials.username, "simulated login attempt");
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// At least one field failed validation. No authentication call was made.
    Invalid,
    /// Authentication failed; see [`LoginForm::server_error`].
    Failed,
    SignedIn { destination: String },
}

pub struct LoginForm {
    username: String,
    password: String,
    show_password: bool,
    errors: FieldErrors,
    server_error: Option<String>,
    destination: String,
    timeout: Duration,
}

impl FieldSource for LoginForm {
    fn field_value(&self, field: &str) -> Option<FieldValue<'_>> {
        match field {
            USERNAME => Some(FieldValue::Text(&self.username)),
            PASSWORD => Some(FieldValue::Text(&self.password)),
            _ => None,
        }
    }
}

impl LoginForm {
    pub fn new(destination: impl Into<String>, timeout: Duration) -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            show_password: false,
            errors: FieldErrors::default(),
            server_error: None,
            destination: destination.into(),
            timeout,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn set_username(&mut self, value: impl Into<String>) {
        self.username = value.into();
        self.errors.clear(USERNAME);
    }

    pub fn set_password(&mut self, value: impl Into<String>) {
        self.password = value.into();
        self.errors.clear(PASSWORD);
    }

    pub fn toggle_password_visibility(&mut self) {
        self.show_password = !self.show_password;
    }

    pub fn password_visible(&self) -> bool {
        self.show_password
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn server_error(&self) -> Option<&str> {
        self.server_error.as_deref()
    }

    pub async fn submit(
        &mut self,
        authenticator: &dyn Authenticator,
        navigator: &dyn Navigator,
    ) -> LoginOutcome {
        self.server_error = None;

        self.errors = LOGIN_SCHEMA.validate(&*self);
        if !self.errors.is_empty() {
            debug!(invalid_fields = self.errors.len(), "login form rejected");
            return LoginOutcome::Invalid;
        }

        let credentials = Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        };
        let result = with_timeout(
            "authentication",
            self.timeout,
            authenticator.authenticate(&credentials),
        )
        .await;

        match result {
            Ok(()) => {
                info!(username = %self.username, destination = %self.destination, "signed in");
                navigator.navigate(&self.destination);
                LoginOutcome::SignedIn {
                    destination: self.destination.clone(),
                }
            }
            Err(err) => {
                warn!(username = %self.username, "login failed: {err:#}");
                self.server_error = Some(AUTH_FAILED_MESSAGE.to_string());
                LoginOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/login_form_tests.rs"]
mod tests;
