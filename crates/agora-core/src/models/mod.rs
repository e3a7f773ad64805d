pub mod community;
pub mod post;
pub mod reaction;
pub mod reply;
pub mod tag_utils;

pub use community::{CommunityId, RefConvention};
pub use post::Post;
pub use reaction::{reaction_tags, ReactionKind, ReactionSummary, UserReaction};
pub use reply::Reply;
