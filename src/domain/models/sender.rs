use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Name shown next to a message in the chat loop.
    pub fn display_name(&self) -> String {
        match self {
            Sender::User => {
                let username = Config::get(ConfigKey::Username);
                if username.is_empty() {
                    return String::from("You");
                }
                return username;
            }
            Sender::Assistant => return String::from("Assistant"),
        }
    }
}
