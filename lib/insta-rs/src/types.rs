/// Comment listings
pub mod comments;
/// Media info
pub mod media_info;
/// A user's post feed
pub mod user_feed;
/// Profile info
pub mod web_profile_info;

pub use self::{
    comments::{
        ChildCommentList,
        Comment,
        CommentCursor,
        CommentList,
        CommentUser,
    },
    media_info::{
        ImageVersions2,
        ImageVersions2Candidate,
        Item,
        MediaInfo,
        MediaType,
        VideoVersion,
    },
    user_feed::UserFeed,
    web_profile_info::{
        WebProfileInfo,
        WebProfileUser,
    },
};

/// Ids are sent as either json strings or json numbers depending on the endpoint.
pub(crate) mod id {
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(value) => value,
            StringOrNumber::Number(value) => value.to_string(),
        })
    }
}

/// A list of entries where entries that fail to parse are dropped.
pub(crate) mod lenient_vec {
    use serde::{
        de::DeserializeOwned,
        Deserialize,
    };
    use tracing::debug;

    pub(crate) fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: serde::Deserializer<'de>,
        T: DeserializeOwned,
    {
        let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
        Ok(values
            .unwrap_or_default()
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(error) => {
                    debug!("skipping unparsable entry: {error}");
                    None
                }
            })
            .collect())
    }
}

/// A `{ "count": n }` wrapper used by profile edges
#[derive(Debug, Default, Clone, Copy, serde::Deserialize)]
pub struct EdgeCount {
    /// The count
    #[serde(default)]
    pub count: u64,
}
