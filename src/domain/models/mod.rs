mod attachment;
mod backend;
mod event;
mod message;
mod sender;
mod session;
mod slash_commands;
mod storage;

pub use attachment::*;
pub use backend::*;
pub use event::*;
pub use message::*;
pub use sender::*;
pub use session::*;
pub use slash_commands::*;
pub use storage::*;
