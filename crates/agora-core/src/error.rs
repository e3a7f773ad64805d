/// Errors surfaced to callers.
///
/// Data-shape problems (malformed tags, unauthoritative list events, relay
/// timeouts) are deliberately absent: resolution code degrades to empty
/// values and logs instead of failing. Only user-action preconditions and
/// publish rejections reach this enum.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("not logged in")]
    NotLoggedIn,

    #[error("malformed community id: {0}")]
    MalformedCommunityId(String),

    #[error("fetch cancelled")]
    Cancelled,

    #[error("publish failed: {0}")]
    Publish(String),

    #[error("member is already in the {0} list")]
    MemberAlreadyListed(&'static str),

    #[error("member is not in the {0} list")]
    MemberNotListed(&'static str),
}
