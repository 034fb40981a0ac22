mod conversation;
mod ids;
mod session_store;

pub use conversation::*;
pub use ids::*;
pub use session_store::*;
