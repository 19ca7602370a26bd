use crate::{
    record::display_caption,
    shortcode::post_url,
    shortcode_to_media_id,
    Api,
    CommentCursor,
    CommentPage,
    CommentRecord,
    Error,
    ErrorKind,
    FetchError,
    ProfileRecord,
    ReplyRecord,
    RequestKey,
    VideoRecord,
};
use std::str::FromStr;
use time::OffsetDateTime;
use tracing::{
    debug,
    info,
    warn,
};

/// The max # of replies fetched per comment
pub const MAX_REPLIES: usize = 10;

/// Comment progress is logged every time this many comments are processed
const PROGRESS_INTERVAL: usize = 50;

/// Which videos of a profile to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaKind {
    /// Feed videos that are not reels
    Posts,

    /// Only reels
    Reels,

    /// Every video
    #[default]
    All,
}

impl MediaKind {
    /// Get this kind as a str
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Reels => "reels",
            Self::All => "all",
        }
    }

    /// Returns true if a video with the given reel-ness passes this filter.
    pub fn matches(self, is_reel: bool) -> bool {
        match self {
            Self::Posts => !is_reel,
            Self::Reels => is_reel,
            Self::All => true,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failed to parse a [`MediaKind`]
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid media kind `{0}`, expected one of `posts`, `reels`, `all`")]
pub struct ParseMediaKindError(String);

impl FromStr for MediaKind {
    type Err = ParseMediaKindError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_ascii_lowercase().as_str() {
            "posts" => Ok(Self::Posts),
            "reels" => Ok(Self::Reels),
            "all" => Ok(Self::All),
            _ => Err(ParseMediaKindError(input.into())),
        }
    }
}

/// Fetches profiles, posts, and comments, normalizing them into records.
///
/// Every operation converts failures into a [`FetchError`] at its boundary.
/// Multi-item fetches keep what they collected if a later page fails.
#[derive(Debug)]
pub struct Fetcher<A> {
    api: A,
}

impl<A> Fetcher<A>
where
    A: Api,
{
    /// Make a new [`Fetcher`].
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Get the inner api
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Returns true if the given user id is the logged in account.
    fn is_viewer(&self, user_id: &str) -> bool {
        self.api
            .credentials()
            .and_then(|credentials| credentials.user_id())
            .map_or(false, |viewer_id| viewer_id == user_id)
    }

    /// Fetch a profile and up to `limit` of its videos, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_profile(
        &self,
        username: &str,
        kind: MediaKind,
        limit: usize,
    ) -> Result<ProfileRecord, FetchError> {
        let key = || RequestKey::Username(username.to_string());

        let user = self
            .api
            .get_web_profile_info(username)
            .await
            .map_err(|error| FetchError::from_error(&error, key()))?
            .into_user()
            .ok_or_else(|| FetchError::new(ErrorKind::NotFound, key()))?;

        if user.is_private && !user.followed_by_viewer && !self.is_viewer(&user.id) {
            return Err(FetchError::new(ErrorKind::PrivateProfile, key()));
        }

        let mut record = ProfileRecord::from_user(&user, self.api.is_authenticated());
        if limit == 0 {
            record.may_have_more = user.edge_owner_to_timeline_media.count > 0;
            return Ok(record);
        }

        let mut cursor: Option<String> = None;
        'pages: loop {
            let feed = match self.api.get_user_feed(&user.id, cursor.as_deref()).await {
                Ok(feed) => feed,
                Err(error) if record.videos.is_empty() => {
                    return Err(FetchError::from_error(&error, key()));
                }
                Err(error) => {
                    warn!(
                        "feed for @{username} failed after {} videos: {error}",
                        record.videos.len()
                    );
                    record.may_have_more = true;
                    break;
                }
            };

            let matching = feed
                .items
                .iter()
                .filter(|item| item.is_video() && kind.matches(item.is_reel()));
            for item in matching {
                if record.videos.len() >= limit {
                    record.may_have_more = true;
                    break 'pages;
                }

                match VideoRecord::from_item(item) {
                    Ok(video) => record.videos.push(video),
                    Err(error) => debug!("skipping item `{}`: {error}", item.code),
                }
            }

            match feed.next_cursor() {
                Some(next) if cursor.as_deref() != Some(next) => {
                    if record.videos.len() >= limit {
                        record.may_have_more = true;
                        break;
                    }
                    cursor = Some(next.to_string());
                }
                _ => break,
            }
        }

        record.fetched_at = OffsetDateTime::now_utc();
        Ok(record)
    }

    /// Fetch a single video post by shortcode.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_single_post(&self, shortcode: &str) -> Result<VideoRecord, FetchError> {
        let key = || RequestKey::Shortcode(shortcode.to_string());
        let into_fetch_error = |error: Error| FetchError::from_error(&error, key());

        let media_id = shortcode_to_media_id(shortcode).map_err(into_fetch_error)?;
        let item = self
            .api
            .get_media_info(media_id)
            .await
            .map_err(into_fetch_error)?
            .items
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::new(ErrorKind::NotFound, key()))?;

        let mut record = VideoRecord::from_item(&item).map_err(into_fetch_error)?;
        record.owner = item.user.map(|user| user.username);

        Ok(record)
    }

    /// Fetch up to `limit` comments of a post, each with its first replies.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_comments(
        &self,
        shortcode: &str,
        limit: usize,
    ) -> Result<CommentPage, FetchError> {
        let key = || RequestKey::Shortcode(shortcode.to_string());
        let into_fetch_error = |error: Error| FetchError::from_error(&error, key());

        let media_id = shortcode_to_media_id(shortcode).map_err(into_fetch_error)?;
        let item = self
            .api
            .get_media_info(media_id)
            .await
            .map_err(into_fetch_error)?
            .items
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::new(ErrorKind::NotFound, key()))?;

        let mut page = CommentPage {
            shortcode: shortcode.to_string(),
            post_caption: display_caption(item.caption_text()),
            post_url: post_url(shortcode),
            total_comments_on_post: item.comment_count.unwrap_or(0),
            fetched_comments: 0,
            comments: Vec::new(),
            fetched_at: OffsetDateTime::now_utc(),
            logged_in: self.api.is_authenticated(),
            may_have_more: false,
        };

        if limit == 0 {
            page.may_have_more = page.total_comments_on_post > 0;
            return Ok(page);
        }

        let mut cursor: Option<CommentCursor> = None;
        'pages: loop {
            let list = match self.api.get_comments(media_id, cursor.as_ref()).await {
                Ok(list) => list,
                Err(error) if page.comments.is_empty() => {
                    return Err(into_fetch_error(error));
                }
                Err(error) => {
                    warn!(
                        "comments for `{shortcode}` failed after {} comments: {error}",
                        page.comments.len()
                    );
                    page.may_have_more = true;
                    break;
                }
            };

            if page.total_comments_on_post == 0 {
                page.total_comments_on_post = list.comment_count.unwrap_or(0);
            }

            for comment in list.comments.iter() {
                if page.comments.len() >= limit {
                    page.may_have_more = true;
                    break 'pages;
                }

                let mut record = CommentRecord::from(comment);
                if comment.child_comment_count > 0 {
                    record.replies = self.fetch_replies(media_id, &comment.pk).await;
                }
                page.comments.push(record);

                let processed = page.comments.len();
                if progress_due(processed) {
                    info!("{processed} comments processed for `{shortcode}`");
                }
            }

            match list.next_cursor() {
                Some(next) if cursor.as_ref() != Some(&next) => {
                    if page.comments.len() >= limit {
                        page.may_have_more = true;
                        break;
                    }
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        page.fetched_comments = page.comments.len();
        page.fetched_at = OffsetDateTime::now_utc();
        Ok(page)
    }

    /// Fetch up to [`MAX_REPLIES`] replies to a comment.
    ///
    /// Errors end the listing early and are not reported.
    async fn fetch_replies(&self, media_id: u64, comment_id: &str) -> Vec<ReplyRecord> {
        let mut replies = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let list = match self
                .api
                .get_child_comments(media_id, comment_id, cursor.as_deref())
                .await
            {
                Ok(list) => list,
                Err(error) => {
                    debug!("replies for comment `{comment_id}` failed: {error}");
                    break;
                }
            };

            let remaining = MAX_REPLIES - replies.len();
            replies.extend(
                list.child_comments
                    .iter()
                    .take(remaining)
                    .map(ReplyRecord::from),
            );

            if replies.len() >= MAX_REPLIES {
                break;
            }

            match list.next_cursor() {
                Some(next) if cursor.as_deref() != Some(next) => cursor = Some(next.to_string()),
                _ => break,
            }
        }

        replies
    }
}

/// Whether a progress line is due after `processed` comments
fn progress_due(processed: usize) -> bool {
    processed > 0 && processed % PROGRESS_INTERVAL == 0
}
