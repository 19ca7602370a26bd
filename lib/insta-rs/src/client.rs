use crate::{
    Api,
    ChildCommentList,
    CommentCursor,
    CommentList,
    CredentialSet,
    Error,
    MediaInfo,
    Session,
    UserFeed,
    WebProfileInfo,
    IG_APP_ID,
    USER_AGENT_STR,
};
use reqwest::{
    header::{
        HeaderMap,
        HeaderName,
        HeaderValue,
    },
    StatusCode,
};
use reqwest_cookie_store::CookieStoreMutex;
use std::{
    sync::Arc,
    time::Duration,
};
use tracing::debug;
use url::Url;

const API_BASE: &str = "https://www.instagram.com/api/v1";

/// The default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A Client
#[derive(Debug, Clone)]
pub struct Client {
    /// The inner http client.
    ///
    /// This probably shouldn't be used by you.
    pub client: reqwest::Client,

    /// The inner cookie store.
    ///
    /// This probably shouldn't be used by you.
    pub cookie_store: Arc<CookieStoreMutex>,

    session: Option<Session>,
}

impl Client {
    /// Make a new [`Client`] without a session.
    ///
    /// Instagram only serves a public subset of data to these.
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let cookie_store = Arc::new(CookieStoreMutex::new(Default::default()));
        Self::build(cookie_store, None, timeout)
    }

    /// Make a new [`Client`] from a [`Session`].
    pub fn with_session(session: Session, timeout: Duration) -> Result<Self, Error> {
        let cookie_store = session.cookie_store().clone();
        Self::build(cookie_store, Some(session), timeout)
    }

    fn build(
        cookie_store: Arc<CookieStoreMutex>,
        session: Option<Session>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(reqwest::header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            reqwest::header::REFERER,
            HeaderValue::from_static("https://www.instagram.com/"),
        );
        headers.insert(
            HeaderName::from_static("x-ig-app-id"),
            HeaderValue::from_static(IG_APP_ID),
        );
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );
        if let Some(csrf_token) = session
            .as_ref()
            .and_then(|session| session.credentials().csrf_token())
        {
            let value = HeaderValue::from_str(csrf_token)
                .map_err(|_| Error::InvalidCookie(crate::credentials::CSRF_TOKEN.into()))?;
            headers.insert(HeaderName::from_static("x-csrftoken"), value);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT_STR)
            .default_headers(headers)
            .cookie_provider(cookie_store.clone())
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()?;

        Ok(Client {
            client,
            cookie_store,
            session,
        })
    }

    /// The session this client was built with, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Send a GET to a url and parse the json response.
    ///
    /// This returns an error if instagram forces the user to log in.
    async fn get_json<T>(&self, url: Url) -> Result<T, Error>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;

        if response.url().path() == "/accounts/login/" {
            return Err(Error::LoginRequired);
        }

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, &body))
    }
}

/// The body of a failed api request
#[derive(Debug, Default, serde::Deserialize)]
struct FailureBody {
    #[serde(default)]
    message: String,
}

/// Turn a failed response into an error.
fn classify_failure(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<FailureBody>(body)
        .unwrap_or_default()
        .message
        .to_lowercase();

    match status {
        StatusCode::NOT_FOUND => Error::NotFound,
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited,
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
            if message.contains("wait a few minutes") =>
        {
            Error::RateLimited
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::LoginRequired,
        StatusCode::BAD_REQUEST if message.contains("login_required") => Error::LoginRequired,
        status => Error::UnexpectedStatus(status),
    }
}

/// Build the url for a page of comments.
fn comments_url(media_id: u64, cursor: Option<&CommentCursor>) -> Result<Url, Error> {
    let mut url = Url::parse_with_params(
        &format!("{API_BASE}/media/{media_id}/comments/"),
        &[
            ("can_support_threading", "true"),
            ("permalink_enabled", "false"),
        ],
    )?;
    if let Some(cursor) = cursor {
        url.query_pairs_mut()
            .append_pair(cursor.param(), cursor.value());
    }

    Ok(url)
}

impl Api for Client {
    fn credentials(&self) -> Option<&CredentialSet> {
        self.session.as_ref().map(Session::credentials)
    }

    async fn get_web_profile_info(&self, username: &str) -> Result<WebProfileInfo, Error> {
        let url = Url::parse_with_params(
            &format!("{API_BASE}/users/web_profile_info/"),
            &[("username", username)],
        )?;
        self.get_json(url).await
    }

    async fn get_user_feed(
        &self,
        user_id: &str,
        max_id: Option<&str>,
    ) -> Result<UserFeed, Error> {
        let mut url = Url::parse_with_params(
            &format!("{API_BASE}/feed/user/{user_id}/"),
            &[("count", "12")],
        )?;
        if let Some(max_id) = max_id {
            url.query_pairs_mut().append_pair("max_id", max_id);
        }
        self.get_json(url).await
    }

    async fn get_media_info(&self, media_id: u64) -> Result<MediaInfo, Error> {
        let url = Url::parse(&format!("{API_BASE}/media/{media_id}/info/"))?;
        self.get_json(url).await
    }

    async fn get_comments(
        &self,
        media_id: u64,
        cursor: Option<&CommentCursor>,
    ) -> Result<CommentList, Error> {
        self.get_json(comments_url(media_id, cursor)?).await
    }

    async fn get_child_comments(
        &self,
        media_id: u64,
        comment_id: &str,
        cursor: Option<&str>,
    ) -> Result<ChildCommentList, Error> {
        let mut url = Url::parse(&format!(
            "{API_BASE}/media/{media_id}/comments/{comment_id}/child_comments/"
        ))?;
        if let Some(cursor) = cursor {
            url.query_pairs_mut().append_pair("max_id", cursor);
        }
        self.get_json(url).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn failure_classification() {
        let rate_limited = classify_failure(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Please wait a few minutes before you try again.","status":"fail"}"#,
        );
        assert_eq!(rate_limited.kind(), ErrorKind::RateLimited);

        let login = classify_failure(
            StatusCode::BAD_REQUEST,
            r#"{"message":"login_required","status":"fail"}"#,
        );
        assert!(matches!(login, Error::LoginRequired));

        assert!(matches!(
            classify_failure(StatusCode::NOT_FOUND, "<html></html>"),
            Error::NotFound
        ));
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, ""),
            Error::RateLimited
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_GATEWAY, ""),
            Error::UnexpectedStatus(StatusCode::BAD_GATEWAY)
        ));
    }

    #[test]
    fn comment_cursors_use_their_own_param() {
        let first = comments_url(3195531937042353461, None).unwrap();
        assert!(!first.query_pairs().any(|(key, _)| key == "min_id" || key == "max_id"));

        let older = comments_url(
            3195531937042353461,
            Some(&CommentCursor::Max("older".into())),
        )
        .unwrap();
        let pairs: Vec<(String, String)> = older.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("max_id".into(), "older".into())));
        assert!(!pairs.iter().any(|(key, _)| key == "min_id"));

        let newer = comments_url(
            3195531937042353461,
            Some(&CommentCursor::Min("newer".into())),
        )
        .unwrap();
        let pairs: Vec<(String, String)> = newer.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("min_id".into(), "newer".into())));
        assert!(!pairs.iter().any(|(key, _)| key == "max_id"));
    }

    #[test]
    fn anonymous_client_has_no_credentials() {
        let client = Client::new(DEFAULT_TIMEOUT).expect("failed to build client");
        assert!(client.credentials().is_none());
        assert!(!client.is_authenticated());
    }

    #[test]
    fn session_client_has_credentials() {
        let credentials: CredentialSet = [
            ("sessionid", "abc"),
            ("csrftoken", "tok"),
            ("ds_user_id", "1"),
        ]
        .into_iter()
        .collect();
        let session = Session::new(credentials.clone()).expect("failed to make session");
        let client =
            Client::with_session(session, DEFAULT_TIMEOUT).expect("failed to build client");

        assert_eq!(client.credentials(), Some(&credentials));
        assert!(client.is_authenticated());
    }
}
