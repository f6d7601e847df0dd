use std::collections::HashSet;

/// Allow-list of page tokens. Built once at startup, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct AccessTokens {
    tokens: HashSet<String>,
}

impl AccessTokens {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
