use serde::{Deserialize, Serialize};

use crate::error::{Result, ScopeError};

/// Where the browser went after a sign-in without an explicit redirect.
pub const DEFAULT_REDIRECT: &str = "/";

#[derive(Debug, Clone, Default, Serialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

impl SignInForm {
    pub fn validate(&self) -> Result<()> {
        require(&self.email, "Email is required")?;
        require(&self.password, "Password is required")
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<()> {
        require(&self.full_name, "Full name is required")?;
        require(&self.email, "Email is required")?;
        require(&self.password, "Password is required")?;
        if self.password != self.confirm_password {
            return Err(ScopeError::validation("Passwords do not match"));
        }
        Ok(())
    }
}

fn require(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScopeError::validation(message));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

impl AuthResponse {
    pub fn redirect_target(&self) -> &str {
        self.redirect_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_REDIRECT)
    }
}
