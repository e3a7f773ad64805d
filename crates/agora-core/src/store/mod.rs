pub mod cache;
pub mod feed;
pub mod fetch;
pub mod merge;
pub mod moderation;
pub mod thread;

pub use cache::QueryCache;
pub use feed::build_feed;
pub use merge::merged_query;
pub use moderation::{is_authoritative, ModerationState};
pub use thread::{resolve_thread, thread_reply_count, ThreadView};
