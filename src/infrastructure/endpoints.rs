//! URLs of the notes API

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(api_url: &str) -> Self {
        Endpoints {
            base: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn token(&self) -> String {
        format!("{}/api/token/", self.base)
    }

    pub fn token_refresh(&self) -> String {
        format!("{}/api/token/refresh/", self.base)
    }

    pub fn register(&self) -> String {
        format!("{}/api/register/", self.base)
    }

    pub fn notes(&self) -> String {
        format!("{}/api/notes/", self.base)
    }

    pub fn note(&self, id: i64) -> String {
        format!("{}/api/notes/{}/", self.base, id)
    }
}
