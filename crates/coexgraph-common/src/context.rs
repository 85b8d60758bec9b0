//! Explicit session context handed to the engine, store and pipeline.

use std::sync::Arc;

use crate::settings::CoexSettings;

/// Who is using the client and with which settings.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Logged-in user, `None` for anonymous sessions.
    pub user: Option<String>,
    pub settings: Arc<CoexSettings>,
}

impl SessionContext {
    pub fn new(settings: CoexSettings) -> Self {
        Self { user: None, settings: Arc::new(settings) }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Namespace for per-user persisted data.
    pub fn namespace(&self) -> &str {
        self.user.as_deref().unwrap_or("anonymous")
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(CoexSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_namespace() {
        assert_eq!(SessionContext::default().namespace(), "anonymous");
        assert_eq!(SessionContext::default().with_user("ada").namespace(), "ada");
    }
}
