//! Admin session: login state and the editable social links.

use crate::config::AdminCredentials;
use crate::error::AuthError;
use crate::model::SocialLinks;
use crate::notify::Notifier;
use crate::routes::Route;

/// Authentication context for one visitor.
///
/// Starts logged out. Nothing is persisted; a new session is a new visitor.
#[derive(Debug, Clone)]
pub struct Session {
    authenticated: bool,
    social_links: SocialLinks,
    credentials: AdminCredentials,
    notifier: Notifier,
}

impl Session {
    /// Logged-out session checking logins against `credentials`.
    pub fn new(credentials: AdminCredentials, notifier: Notifier) -> Self {
        Self {
            authenticated: false,
            social_links: SocialLinks::default(),
            credentials,
            notifier,
        }
    }

    /// Whether the admin is logged in.
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Check credentials and, on success, return where to go next.
    #[tracing::instrument(skip(self, password))]
    pub fn login(&mut self, username: &str, password: &str) -> Result<Route, AuthError> {
        if username == self.credentials.username && password == self.credentials.password {
            self.authenticated = true;
            tracing::info!("admin logged in");
            self.notifier.success("Welcome back!");
            Ok(Route::AdminDashboard)
        } else {
            tracing::warn!("rejected login");
            self.notifier.error(AuthError::InvalidCredentials.to_string());
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Return to the initial state and send the visitor to the login page.
    pub fn logout(&mut self) -> Route {
        self.authenticated = false;
        self.social_links = SocialLinks::default();
        self.notifier.success("Logged out successfully");
        Route::AdminLogin
    }

    /// Fail with [`AuthError::Unauthenticated`] unless logged in.
    pub const fn require_admin(&self) -> Result<(), AuthError> {
        if self.authenticated {
            Ok(())
        } else {
            Err(AuthError::Unauthenticated)
        }
    }

    /// Current social links.
    pub const fn social_links(&self) -> &SocialLinks {
        &self.social_links
    }

    /// Replace the social links.
    pub fn update_social_links(&mut self, links: SocialLinks) {
        self.social_links = links;
        self.notifier.success("Social links updated successfully");
    }
}
