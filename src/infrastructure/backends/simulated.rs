#[cfg(test)]
#[path = "simulated_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use rand::Rng;
use tokio::time;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::BackendPrompt;

pub const RESPONSE_PREFIXES: [&str; 5] = [
    "That's an interesting question! Let me help you with that.",
    "I understand what you're asking. Here's my perspective:",
    "Great question! Based on what you've mentioned:",
    "I can definitely help with that. Here's what I think:",
    "That's a thoughtful inquiry. Let me break it down:",
];

pub const DISCLAIMER: &str = "This is a simulated response for demonstration purposes.";

const DEFAULT_DELAY_MIN: u64 = 1000;
const DEFAULT_DELAY_MAX: u64 = 3000;

/// Answers locally after a short random pause by echoing the prompt back
/// reversed behind a canned opener.
pub struct Simulated {
    delay_min: u64,
    delay_max: u64,
}

impl Default for Simulated {
    fn default() -> Simulated {
        let delay_min = Config::get(ConfigKey::ResponseDelayMin)
            .parse::<u64>()
            .unwrap_or(DEFAULT_DELAY_MIN);
        let delay_max = Config::get(ConfigKey::ResponseDelayMax)
            .parse::<u64>()
            .unwrap_or(DEFAULT_DELAY_MAX);

        return Simulated::new(delay_min, delay_max);
    }
}

impl Simulated {
    pub fn new(delay_min: u64, delay_max: u64) -> Simulated {
        return Simulated {
            delay_min,
            delay_max,
        };
    }

    pub fn reply(prefix: &str, text: &str) -> String {
        let reversed = text.chars().rev().collect::<String>();
        return format!("{prefix} {reversed}. {DISCLAIMER}");
    }

    /// Pause in `[delay_min, delay_max)` milliseconds.
    fn random_delay(&self) -> Duration {
        if self.delay_max <= self.delay_min {
            return Duration::from_millis(self.delay_min);
        }

        let millis = rand::rng().random_range(self.delay_min..self.delay_max);
        return Duration::from_millis(millis);
    }

    fn random_prefix() -> &'static str {
        return RESPONSE_PREFIXES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(RESPONSE_PREFIXES[0]);
    }
}

#[async_trait]
impl Backend for Simulated {
    fn name(&self) -> BackendName {
        return BackendName::Simulated;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.delay_min > self.delay_max {
            bail!(format!(
                "Response delay minimum {}ms is larger than the maximum {}ms",
                self.delay_min, self.delay_max
            ));
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion(&self, prompt: BackendPrompt) -> Result<String> {
        let delay = self.random_delay();
        tracing::debug!(delay_ms = delay.as_millis() as u64, "Simulating response");
        time::sleep(delay).await;

        return Ok(Simulated::reply(Simulated::random_prefix(), &prompt.text));
    }
}
