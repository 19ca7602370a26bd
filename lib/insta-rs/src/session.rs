use crate::{
    CredentialSet,
    Error,
    COOKIE_DOMAIN,
};
use cookie_store::{
    CookieStore,
    RawCookie,
};
use reqwest_cookie_store::CookieStoreMutex;
use std::sync::Arc;
use url::Url;

/// A credential set bound to a cookie jar.
#[derive(Debug, Clone)]
pub struct Session {
    credentials: CredentialSet,
    cookie_store: Arc<CookieStoreMutex>,
}

impl Session {
    /// Make a new [`Session`] from a credential set.
    ///
    /// Every cookie is scoped to the instagram domain.
    pub fn new(credentials: CredentialSet) -> Result<Self, Error> {
        let url = Url::parse(&format!("https://www.{COOKIE_DOMAIN}/"))?;
        let mut cookie_store = CookieStore::default();

        for (name, value) in credentials.iter() {
            let mut cookie = RawCookie::new(name.to_string(), value.to_string());
            cookie.set_domain(COOKIE_DOMAIN);
            cookie.set_path("/");
            cookie.set_secure(true);

            cookie_store
                .insert_raw(&cookie, &url)
                .map_err(|_| Error::InvalidCookie(name.to_string()))?;
        }

        Ok(Self {
            credentials,
            cookie_store: Arc::new(CookieStoreMutex::new(cookie_store)),
        })
    }

    /// The credential set this session was built from.
    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    /// The cookie jar
    pub fn cookie_store(&self) -> &Arc<CookieStoreMutex> {
        &self.cookie_store
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cookies_are_scoped_to_domain() {
        let credentials: CredentialSet = [
            ("sessionid", "abc"),
            ("csrftoken", "tok"),
            ("ds_user_id", "1"),
        ]
        .into_iter()
        .collect();
        let session = Session::new(credentials).expect("failed to make session");

        let cookie_store = session.cookie_store().lock().expect("cookie store poisoned");
        let url = Url::parse("https://www.instagram.com/api/v1/").unwrap();
        let mut names: Vec<_> = cookie_store
            .get_request_values(&url)
            .map(|(name, _value)| name.to_string())
            .collect();
        names.sort();
        assert_eq!(names, ["csrftoken", "ds_user_id", "sessionid"]);

        let other = Url::parse("https://example.com/").unwrap();
        assert_eq!(cookie_store.get_request_values(&other).count(), 0);
    }
}
