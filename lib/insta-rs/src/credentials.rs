use crate::Error;
use std::collections::BTreeMap;

/// The session id cookie name
pub(crate) const SESSION_ID: &str = "sessionid";

/// The csrf token cookie name
pub(crate) const CSRF_TOKEN: &str = "csrftoken";

/// The user id cookie name
pub(crate) const USER_ID: &str = "ds_user_id";

/// Cookies that must be present for a credential set to be usable.
pub const ESSENTIAL_COOKIES: [&str; 3] = [SESSION_ID, CSRF_TOKEN, USER_ID];

/// The cookies proving an authenticated session for one account.
///
/// This is never mutated after creation.
/// A re-import replaces it as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CredentialSet(BTreeMap<String, String>);

impl CredentialSet {
    /// Get a cookie value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// The session id, if present
    pub fn session_id(&self) -> Option<&str> {
        self.get(SESSION_ID)
    }

    /// The csrf token, if present
    pub fn csrf_token(&self) -> Option<&str> {
        self.get(CSRF_TOKEN)
    }

    /// The user id, if present
    pub fn user_id(&self) -> Option<&str> {
        self.get(USER_ID)
    }

    /// Get the names of essential cookies that are missing or empty.
    pub fn missing(&self) -> Vec<&'static str> {
        ESSENTIAL_COOKIES
            .into_iter()
            .filter(|name| self.get(name).map_or(true, str::is_empty))
            .collect()
    }

    /// Returns true if every essential cookie is present.
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Make sure every essential cookie is present.
    pub fn ensure_complete(&self) -> Result<(), Error> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(Error::MissingCookies(missing));
        }

        Ok(())
    }

    /// Iterate over all cookie name/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// The number of cookies
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no cookies.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a credential set from json bytes.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Serialize this credential set as pretty json.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

impl<N, V> FromIterator<(N, V)> for CredentialSet
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
    {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}
