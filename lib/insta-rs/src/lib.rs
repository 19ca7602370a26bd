/// The remote api seam
mod api;
/// Browser cookie sources
pub mod browser;
/// The client
mod client;
/// Credential sets
mod credentials;
/// The resource fetcher
mod fetcher;
/// Output records
pub mod record;
/// Sessions
mod session;
/// Persisted sessions
mod session_store;
/// Shortcode helpers
mod shortcode;
/// API Types
pub mod types;
/// The session validator
mod validator;

pub use self::{
    api::Api,
    browser::{
        Browser,
        CookieSource,
    },
    client::{
        Client,
        DEFAULT_TIMEOUT,
    },
    credentials::CredentialSet,
    fetcher::{
        Fetcher,
        MediaKind,
        ParseMediaKindError,
    },
    record::{
        CommentPage,
        CommentRecord,
        ErrorKind,
        FetchError,
        ProfileRecord,
        ReplyRecord,
        RequestKey,
        VideoKind,
        VideoRecord,
    },
    session::Session,
    session_store::{
        AcquiredSession,
        SessionSource,
        SessionStore,
    },
    shortcode::{
        looks_like_shortcode,
        shortcode_to_media_id,
    },
    types::{
        ChildCommentList,
        CommentCursor,
        CommentList,
        MediaInfo,
        MediaType,
        UserFeed,
        WebProfileInfo,
    },
    validator::validate_session,
};
pub use cookie_store::CookieStore;
pub use reqwest_cookie_store::CookieStoreMutex;

/// The domain all session cookies are scoped to.
pub const COOKIE_DOMAIN: &str = "instagram.com";

/// The environment variable holding a base64 encoded session.
pub const SESSION_ENV_VAR: &str = "INSTAGRAM_SESSION";

/// The web app id sent with every api request.
pub const IG_APP_ID: &str = "936619743392459";

const USER_AGENT_STR: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reqwest Error
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    /// Instagram is forcing a log-in
    #[error("login required")]
    LoginRequired,

    /// The requested resource does not exist
    #[error("not found")]
    NotFound,

    /// Instagram is throttling requests
    #[error("rate limited")]
    RateLimited,

    /// The profile is private and not followed by the viewer
    #[error("private profile")]
    PrivateProfile,

    /// The post is not a video
    #[error("not a video")]
    NotAVideo,

    /// A status code that is not otherwise classified
    #[error("unexpected status `{0}`")]
    UnexpectedStatus(reqwest::StatusCode),

    /// Invalid Url
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// Json
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Io Error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Invalid base64
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    /// Sqlite error from a browser cookie database
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// A credential set is missing essential cookies
    #[error("missing cookies: {}", .0.join(", "))]
    MissingCookies(Vec<&'static str>),

    /// A cookie could not be placed in the cookie jar
    #[error("invalid cookie `{0}`")]
    InvalidCookie(String),

    /// A shortcode contains invalid characters or is too large
    #[error("invalid shortcode `{0}`")]
    InvalidShortcode(String),

    /// The browser has no cookie store on this machine
    #[error("no cookie store found for `{0}`")]
    MissingCookieStore(&'static str),

    /// Every matching cookie was encrypted
    #[error("cookies for `{0}` are encrypted")]
    EncryptedCookies(&'static str),

    /// A Safari binary cookies file is malformed
    #[error("invalid binary cookies: {0}")]
    InvalidBinaryCookies(&'static str),

    /// No session source yielded a usable credential set
    #[error("no session available")]
    NoSessionAvailable,
}

impl Error {
    /// Classify this error into the kind reported to callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::PrivateProfile => ErrorKind::PrivateProfile,
            Self::NotAVideo => ErrorKind::NotAVideo,
            Self::RateLimited => ErrorKind::RateLimited,
            Self::LoginRequired | Self::NoSessionAvailable => ErrorKind::NoSessionAvailable,
            Self::MissingCookies(_)
            | Self::InvalidCookie(_)
            | Self::Base64(_)
            | Self::EncryptedCookies(_)
            | Self::InvalidBinaryCookies(_) => ErrorKind::MalformedCredentials,
            Self::InvalidShortcode(_) => ErrorKind::NotFound,
            Self::Reqwest(error) => match error.status() {
                Some(reqwest::StatusCode::NOT_FOUND) => ErrorKind::NotFound,
                Some(reqwest::StatusCode::TOO_MANY_REQUESTS) => ErrorKind::RateLimited,
                _ => ErrorKind::TransportError,
            },
            Self::UnexpectedStatus(_)
            | Self::Url(_)
            | Self::Json(_)
            | Self::Io(_)
            | Self::Sqlite(_)
            | Self::MissingCookieStore(_) => ErrorKind::TransportError,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn error_kinds() {
        assert_eq!(Error::LoginRequired.kind(), ErrorKind::NoSessionAvailable);
        assert_eq!(
            Error::MissingCookies(vec!["sessionid"]).kind(),
            ErrorKind::MalformedCredentials
        );
        assert_eq!(
            Error::UnexpectedStatus(reqwest::StatusCode::BAD_GATEWAY).kind(),
            ErrorKind::TransportError
        );
        assert_eq!(
            Error::InvalidShortcode("!!".into()).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn missing_cookies_message() {
        let error = Error::MissingCookies(vec!["sessionid", "ds_user_id"]);
        assert_eq!(error.to_string(), "missing cookies: sessionid, ds_user_id");
    }
}
