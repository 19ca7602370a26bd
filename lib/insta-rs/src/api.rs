use crate::{
    ChildCommentList,
    CommentCursor,
    CommentList,
    CredentialSet,
    Error,
    MediaInfo,
    UserFeed,
    WebProfileInfo,
};

/// The remote instagram api.
///
/// Request and response shapes belong to instagram and change without notice,
/// so the fetcher only ever talks to this trait.
#[allow(async_fn_in_trait)]
pub trait Api {
    /// The credentials requests are made with, if any.
    fn credentials(&self) -> Option<&CredentialSet>;

    /// Look up a profile by username.
    async fn get_web_profile_info(&self, username: &str) -> Result<WebProfileInfo, Error>;

    /// Get one page of a user's posts, newest first.
    async fn get_user_feed(&self, user_id: &str, max_id: Option<&str>)
        -> Result<UserFeed, Error>;

    /// Get the media info for a media id
    async fn get_media_info(&self, media_id: u64) -> Result<MediaInfo, Error>;

    /// Get one page of comments for a media id
    async fn get_comments(
        &self,
        media_id: u64,
        cursor: Option<&CommentCursor>,
    ) -> Result<CommentList, Error>;

    /// Get one page of replies to a comment
    async fn get_child_comments(
        &self,
        media_id: u64,
        comment_id: &str,
        cursor: Option<&str>,
    ) -> Result<ChildCommentList, Error>;

    /// Whether requests carry a session
    fn is_authenticated(&self) -> bool {
        self.credentials().is_some()
    }
}
