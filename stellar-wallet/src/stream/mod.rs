//! Payment streaming
//!
//! Follows the payments of one account by polling Horizon after the last
//! seen paging token. Tokens can be persisted so a restarted watcher picks
//! up where the previous one stopped.

mod cursor;
mod watcher;

pub use cursor::CursorStore;
pub use watcher::PaymentWatcher;
