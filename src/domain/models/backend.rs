#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BackendName {
    Simulated,
}

impl BackendName {
    pub fn parse(text: String) -> Option<BackendName> {
        return BackendName::iter().find(|e| return e.to_string() == text);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendPrompt {
    pub text: String,
}

impl BackendPrompt {
    pub fn new(text: &str) -> BackendPrompt {
        return BackendPrompt {
            text: text.to_string(),
        };
    }
}

#[async_trait]
pub trait Backend {
    /// Returns the name of the backend.
    fn name(&self) -> BackendName;

    /// Used at startup to verify the backend is able to answer prompts.
    async fn health_check(&self) -> Result<()>;

    /// Requests a full reply for the prompt. Replies are not streamed, the
    /// future resolves once the whole text is available.
    async fn get_completion(&self, prompt: BackendPrompt) -> Result<String>;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;
