/// One page of top-level comments
#[derive(Debug, Default, serde::Deserialize)]
pub struct CommentList {
    /// Comments, in the order the service ranks them
    #[serde(default)]
    pub comments: Vec<Comment>,

    /// The total # of comments on the post
    #[serde(default)]
    pub comment_count: Option<u64>,

    /// Whether older comments exist
    #[serde(default)]
    pub has_more_comments: bool,

    /// Whether newer comments exist
    #[serde(default)]
    pub has_more_headload_comments: bool,

    /// Cursor for older comments
    #[serde(default)]
    pub next_max_id: Option<String>,

    /// Cursor for newer comments
    #[serde(default)]
    pub next_min_id: Option<String>,
}

impl CommentList {
    /// Get the cursor for the next page, if there is one.
    pub fn next_cursor(&self) -> Option<CommentCursor> {
        if self.has_more_headload_comments {
            if let Some(cursor) = self.next_min_id.as_ref() {
                return Some(CommentCursor::Min(cursor.clone()));
            }
        }

        if self.has_more_comments {
            return self.next_max_id.clone().map(CommentCursor::Max);
        }

        None
    }
}

/// A position in a comment listing.
///
/// Each kind must be sent back under its own query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommentCursor {
    /// Newer comments, sent as `min_id`
    Min(String),

    /// Older comments, sent as `max_id`
    Max(String),
}

impl CommentCursor {
    /// The query parameter name
    pub fn param(&self) -> &'static str {
        match self {
            Self::Min(_) => "min_id",
            Self::Max(_) => "max_id",
        }
    }

    /// The cursor value
    pub fn value(&self) -> &str {
        match self {
            Self::Min(value) | Self::Max(value) => value,
        }
    }
}

/// One page of replies to a comment
#[derive(Debug, Default, serde::Deserialize)]
pub struct ChildCommentList {
    /// Replies
    #[serde(default)]
    pub child_comments: Vec<Comment>,

    /// Whether more replies exist
    #[serde(default)]
    pub has_more_tail_child_comments: bool,

    /// Cursor for the next page
    #[serde(default)]
    pub next_max_child_cursor: Option<String>,
}

impl ChildCommentList {
    /// Get the cursor for the next page, if there is one.
    pub fn next_cursor(&self) -> Option<&str> {
        if !self.has_more_tail_child_comments {
            return None;
        }

        self.next_max_child_cursor.as_deref()
    }
}

/// A comment or a reply
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Comment {
    /// The comment id
    #[serde(with = "crate::types::id")]
    pub pk: String,

    /// The text
    #[serde(default)]
    pub text: String,

    /// When this was posted, as a unix timestamp.
    #[serde(default)]
    pub created_at: Option<i64>,

    /// # of likes
    #[serde(default)]
    pub comment_like_count: u64,

    /// # of replies.
    ///
    /// Replies never report this.
    #[serde(default)]
    pub child_comment_count: u64,

    /// The author
    pub user: CommentUser,
}

/// The author of a comment
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CommentUser {
    /// The user id
    #[serde(with = "crate::types::id")]
    pub pk: String,

    /// The username
    pub username: String,

    /// The avatar
    #[serde(default)]
    pub profile_pic_url: Option<String>,

    /// Whether this user is verified
    #[serde(default)]
    pub is_verified: bool,
}
