/// Source of the signed-in user's bearer credential.
#[async_trait::async_trait]
pub trait SessionProvider: Send + Sync {
    /// Returns `None` when nobody is signed in.
    async fn access_token(&self) -> Option<String>;
}

/// Credential fixed at construction, e.g. from a flag or environment variable.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    token: Option<String>,
}

impl StaticSession {
    pub fn new(token: Option<String>) -> Self {
        let token = token.filter(|token| !token.trim().is_empty());
        Self { token }
    }
}

#[async_trait::async_trait]
impl SessionProvider for StaticSession {
    async fn access_token(&self) -> Option<String> {
        self.token.clone()
    }
}
