//! Normalized output records.
//!
//! These are the shapes printed by the cli.
//! Every field is always populated, with zero or empty defaults where instagram omitted a value.

use crate::{
    shortcode::post_url,
    types::{
        Comment,
        Item,
        WebProfileUser,
    },
    Error,
};
use time::OffsetDateTime;

/// The max # of characters in a display caption
pub const CAPTION_MAX_CHARS: usize = 100;

/// The max # of characters in a full caption
pub const CAPTION_FULL_MAX_CHARS: usize = 500;

/// The display caption of a post with no caption at all
pub const UNTITLED_CAPTION: &str = "Untitled";

/// Make the display caption: the first line, cut to [`CAPTION_MAX_CHARS`].
pub fn display_caption(caption: &str) -> String {
    if caption.is_empty() {
        return UNTITLED_CAPTION.to_string();
    }

    caption
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(CAPTION_MAX_CHARS)
        .collect()
}

/// Make the full caption: cut to [`CAPTION_FULL_MAX_CHARS`].
pub fn full_caption(caption: &str) -> String {
    caption.chars().take(CAPTION_FULL_MAX_CHARS).collect()
}

fn unix_to_datetime(timestamp: Option<i64>) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(timestamp?).ok()
}

/// The kind of video
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoKind {
    /// A regular feed video
    Post,

    /// Short-form video
    Reel,
}

/// A profile and its videos
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProfileRecord {
    pub username: String,
    pub full_name: String,
    pub profile_pic: Option<String>,
    pub followers: u64,
    pub following: u64,
    pub posts_count: u64,
    pub bio: String,
    pub is_private: bool,

    /// Videos, newest first
    pub videos: Vec<VideoRecord>,

    #[serde(with = "time::serde::rfc3339")]
    pub fetched_at: OffsetDateTime,

    /// Whether a session was used
    pub logged_in: bool,

    /// Whether the feed may hold more matching videos than were returned
    pub may_have_more: bool,
}

impl ProfileRecord {
    /// Make a record from a profile, with no videos yet.
    pub(crate) fn from_user(user: &WebProfileUser, logged_in: bool) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            profile_pic: user.best_profile_pic_url().map(ToString::to_string),
            followers: user.edge_followed_by.count,
            following: user.edge_follow.count,
            posts_count: user.edge_owner_to_timeline_media.count,
            bio: user.biography.clone(),
            is_private: user.is_private,
            videos: Vec::new(),
            fetched_at: OffsetDateTime::now_utc(),
            logged_in,
            may_have_more: false,
        }
    }
}

/// A video post
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct VideoRecord {
    pub shortcode: String,
    pub thumbnail: Option<String>,

    /// First line of the caption, at most 100 characters
    pub caption: String,

    /// The caption, at most 500 characters
    pub caption_full: String,

    pub views: u64,
    pub likes: u64,
    pub comments: u64,

    /// Length in seconds
    pub duration: f64,

    #[serde(with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,

    #[serde(rename = "type")]
    pub kind: VideoKind,

    pub url: String,
    pub video_url: Option<String>,

    /// The owner's username.
    ///
    /// Only set on single post lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl VideoRecord {
    /// Make a record from a video item.
    ///
    /// # Errors
    /// Returns [`Error::NotAVideo`] if the item is not a video.
    pub fn from_item(item: &Item) -> Result<Self, Error> {
        if !item.is_video() {
            return Err(Error::NotAVideo);
        }

        let caption = item.caption_text();

        Ok(Self {
            shortcode: item.code.clone(),
            thumbnail: item
                .get_best_image_versions2_candidate()
                .map(|candidate| candidate.url.to_string()),
            caption: display_caption(caption),
            caption_full: full_caption(caption),
            views: item.play_count.or(item.view_count).unwrap_or(0),
            likes: item.like_count.unwrap_or(0),
            comments: item.comment_count.unwrap_or(0),
            duration: item.video_duration.unwrap_or(0.0),
            timestamp: unix_to_datetime(item.taken_at),
            kind: if item.is_reel() {
                VideoKind::Reel
            } else {
                VideoKind::Post
            },
            url: post_url(&item.code),
            video_url: item
                .get_best_video_version()
                .map(|video_version| video_version.url.to_string()),
            owner: None,
        })
    }
}

/// The fields shared by comments and replies
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ReplyRecord {
    pub id: String,
    pub text: String,
    pub author: String,
    pub author_id: String,
    pub author_profile_pic: Option<String>,
    pub author_verified: bool,
    pub likes: u64,

    #[serde(with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

impl From<&Comment> for ReplyRecord {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.pk.clone(),
            text: comment.text.clone(),
            author: comment.user.username.clone(),
            author_id: comment.user.pk.clone(),
            author_profile_pic: comment.user.profile_pic_url.clone(),
            author_verified: comment.user.is_verified,
            likes: comment.comment_like_count,
            timestamp: unix_to_datetime(comment.created_at),
        }
    }
}

/// A top-level comment with its first replies
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CommentRecord {
    #[serde(flatten)]
    pub comment: ReplyRecord,

    /// # of replies reported by instagram
    pub answers_count: u64,

    /// At most 10 replies
    pub replies: Vec<ReplyRecord>,
}

impl From<&Comment> for CommentRecord {
    fn from(comment: &Comment) -> Self {
        Self {
            comment: ReplyRecord::from(comment),
            answers_count: comment.child_comment_count,
            replies: Vec::new(),
        }
    }
}

/// The comments of a post
#[derive(Debug, Clone, serde::Serialize)]
pub struct CommentPage {
    pub shortcode: String,
    pub post_caption: String,
    pub post_url: String,
    pub total_comments_on_post: u64,
    pub fetched_comments: usize,
    pub comments: Vec<CommentRecord>,

    #[serde(with = "time::serde::rfc3339")]
    pub fetched_at: OffsetDateTime,

    pub logged_in: bool,
    pub may_have_more: bool,
}

/// The kind of a fetch error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ErrorKind {
    NotFound,
    PrivateProfile,
    NotAVideo,
    RateLimited,
    NoSessionAvailable,
    MalformedCredentials,
    TransportError,
}

impl ErrorKind {
    /// Get this kind as a str
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::PrivateProfile => "PrivateProfile",
            Self::NotAVideo => "NotAVideo",
            Self::RateLimited => "RateLimited",
            Self::NoSessionAvailable => "NoSessionAvailable",
            Self::MalformedCredentials => "MalformedCredentials",
            Self::TransportError => "TransportError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The key a fetch was requested with
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKey {
    Username(String),
    Shortcode(String),
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Username(username) => write!(f, "@{username}"),
            Self::Shortcode(shortcode) => write!(f, "{shortcode}"),
        }
    }
}

/// A failed fetch.
///
/// Serializes as `{"error": kind, "username" | "shortcode": key}`,
/// with a `message` only for transport errors.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, thiserror::Error)]
#[error("{kind} for {key}")]
pub struct FetchError {
    #[serde(rename = "error")]
    pub kind: ErrorKind,

    #[serde(flatten)]
    pub key: RequestKey,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FetchError {
    /// Make a new error without a message.
    pub fn new(kind: ErrorKind, key: RequestKey) -> Self {
        Self {
            kind,
            key,
            message: None,
        }
    }

    /// Make an error for a request from a library error.
    pub fn from_error(error: &Error, key: RequestKey) -> Self {
        let kind = error.kind();
        let message = match kind {
            ErrorKind::TransportError => Some(error.to_string()),
            _ => None,
        };

        Self { kind, key, message }
    }
}
