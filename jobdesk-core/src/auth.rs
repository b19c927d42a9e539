pub trait Auth: Send + Sync {
    /// Resolve the credential set carried by a request's bearer token, if any.
    fn credentials(&self, bearer: Option<&str>) -> Vec<String>;
    fn is_admin(&self, credentials: &[String]) -> bool;
}

/// Grants everything. Intended for tests and local development.
pub struct NoAuth;

impl Auth for NoAuth {
    fn credentials(&self, _bearer: Option<&str>) -> Vec<String> {
        vec!["*".to_string()]
    }

    fn is_admin(&self, _credentials: &[String]) -> bool {
        true
    }
}

/// Gates mutations behind a single pre-shared admin token. Token issuance
/// happens elsewhere; this only recognizes the configured value.
pub struct BearerAuth {
    admin_token: String,
}

impl BearerAuth {
    pub fn new(admin_token: impl Into<String>) -> Self {
        Self {
            admin_token: admin_token.into(),
        }
    }
}

impl Auth for BearerAuth {
    fn credentials(&self, bearer: Option<&str>) -> Vec<String> {
        match bearer {
            Some(token) if token == self.admin_token => vec!["admin".to_string()],
            // An unknown token carries no credentials, same as no token.
            _ => vec![],
        }
    }

    fn is_admin(&self, credentials: &[String]) -> bool {
        credentials.iter().any(|c| c == "admin")
    }
}
