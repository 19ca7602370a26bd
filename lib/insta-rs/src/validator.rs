use crate::Api;
use tracing::{
    debug,
    warn,
};

/// Check whether the api's credentials are accepted by instagram.
///
/// Incomplete credentials fail without a request.
/// Otherwise, one profile lookup of `probe_account` is made.
/// The session is valid only if that lookup returns a user.
pub async fn validate_session<A>(api: &A, probe_account: &str) -> bool
where
    A: Api + ?Sized,
{
    let credentials = match api.credentials() {
        Some(credentials) => credentials,
        None => {
            debug!("no credentials to validate");
            return false;
        }
    };

    let missing = credentials.missing();
    if !missing.is_empty() {
        warn!("session is missing cookies: {}", missing.join(", "));
        return false;
    }

    match api.get_web_profile_info(probe_account).await {
        Ok(info) => info.user().is_some(),
        Err(error) => {
            warn!("session validation failed: {error}");
            false
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        ChildCommentList,
        CommentList,
        CredentialSet,
        Error,
        MediaInfo,
        UserFeed,
        WebProfileInfo,
    };
    use std::sync::atomic::{
        AtomicUsize,
        Ordering,
    };

    const WEB_PROFILE_INFO: &str = include_str!("../test_data/web_profile_info.json");

    /// An api that counts profile lookups
    struct ProbeApi {
        credentials: Option<CredentialSet>,
        response: fn() -> Result<WebProfileInfo, Error>,
        calls: AtomicUsize,
    }

    impl ProbeApi {
        fn new(
            credentials: Option<CredentialSet>,
            response: fn() -> Result<WebProfileInfo, Error>,
        ) -> Self {
            Self {
                credentials,
                response,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Api for ProbeApi {
        fn credentials(&self) -> Option<&CredentialSet> {
            self.credentials.as_ref()
        }

        async fn get_web_profile_info(&self, _username: &str) -> Result<WebProfileInfo, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.response)()
        }

        async fn get_user_feed(
            &self,
            _user_id: &str,
            _max_id: Option<&str>,
        ) -> Result<UserFeed, Error> {
            unimplemented!()
        }

        async fn get_media_info(&self, _media_id: u64) -> Result<MediaInfo, Error> {
            unimplemented!()
        }

        async fn get_comments(
            &self,
            _media_id: u64,
            _cursor: Option<&crate::CommentCursor>,
        ) -> Result<CommentList, Error> {
            unimplemented!()
        }

        async fn get_child_comments(
            &self,
            _media_id: u64,
            _comment_id: &str,
            _cursor: Option<&str>,
        ) -> Result<ChildCommentList, Error> {
            unimplemented!()
        }
    }

    fn found() -> Result<WebProfileInfo, Error> {
        Ok(serde_json::from_str(WEB_PROFILE_INFO).unwrap())
    }

    fn login_required() -> Result<WebProfileInfo, Error> {
        Err(Error::LoginRequired)
    }

    fn complete() -> CredentialSet {
        [
            ("sessionid", "abc"),
            ("csrftoken", "tok"),
            ("ds_user_id", "1"),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn incomplete_credentials_make_no_request() {
        let incomplete = [
            vec![("csrftoken", "tok"), ("ds_user_id", "1")],
            vec![("sessionid", "abc"), ("ds_user_id", "1")],
            vec![("sessionid", "abc"), ("csrftoken", "tok")],
            vec![("sessionid", ""), ("csrftoken", "tok"), ("ds_user_id", "1")],
        ];

        for cookies in incomplete {
            let api = ProbeApi::new(Some(cookies.into_iter().collect()), found);
            assert!(!validate_session(&api, "instagram").await);
            assert_eq!(api.calls(), 0);
        }

        let api = ProbeApi::new(None, found);
        assert!(!validate_session(&api, "instagram").await);
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn complete_credentials_are_probed() {
        let api = ProbeApi::new(Some(complete()), found);
        assert!(validate_session(&api, "instagram").await);
        assert_eq!(api.calls(), 1);

        let api = ProbeApi::new(Some(complete()), login_required);
        assert!(!validate_session(&api, "instagram").await);
        assert_eq!(api.calls(), 1);
    }
}
