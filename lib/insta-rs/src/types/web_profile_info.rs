use super::EdgeCount;

/// The response of a profile info lookup
#[derive(Debug, serde::Deserialize)]
pub struct WebProfileInfo {
    /// The payload
    #[serde(default)]
    pub data: Option<WebProfileInfoData>,

    /// `ok` on success
    #[serde(default)]
    pub status: Option<String>,
}

impl WebProfileInfo {
    /// Get the user, if the response contained one.
    pub fn user(&self) -> Option<&WebProfileUser> {
        self.data.as_ref()?.user.as_ref()
    }

    /// Take the user, if the response contained one.
    pub fn into_user(self) -> Option<WebProfileUser> {
        self.data?.user
    }
}

/// The `data` field of a profile lookup
#[derive(Debug, serde::Deserialize)]
pub struct WebProfileInfoData {
    /// The user
    #[serde(default)]
    pub user: Option<WebProfileUser>,
}

/// A user profile
#[derive(Debug, Clone, serde::Deserialize)]
pub struct WebProfileUser {
    /// The user id
    #[serde(with = "crate::types::id")]
    pub id: String,

    /// The username
    pub username: String,

    /// The display name
    #[serde(default)]
    pub full_name: String,

    /// The bio
    #[serde(default)]
    pub biography: String,

    /// The avatar
    #[serde(default)]
    pub profile_pic_url: Option<String>,

    /// The high resolution avatar
    #[serde(default)]
    pub profile_pic_url_hd: Option<String>,

    /// Whether the profile is private
    #[serde(default)]
    pub is_private: bool,

    /// Whether the profile is verified
    #[serde(default)]
    pub is_verified: bool,

    /// Whether the logged-in viewer follows this profile
    #[serde(default)]
    pub followed_by_viewer: bool,

    /// Followers
    #[serde(default)]
    pub edge_followed_by: EdgeCount,

    /// Following
    #[serde(default)]
    pub edge_follow: EdgeCount,

    /// Posts
    #[serde(default)]
    pub edge_owner_to_timeline_media: EdgeCount,
}

impl WebProfileUser {
    /// The best avatar url
    pub fn best_profile_pic_url(&self) -> Option<&str> {
        self.profile_pic_url_hd
            .as_deref()
            .or(self.profile_pic_url.as_deref())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const WEB_PROFILE_INFO: &str = include_str!("../../test_data/web_profile_info.json");

    #[test]
    fn parse_web_profile_info() {
        let info: WebProfileInfo =
            serde_json::from_str(WEB_PROFILE_INFO).expect("failed to parse");
        let user = info.user().expect("missing user");

        assert_eq!(user.id, "4242");
        assert_eq!(user.username, "demoacct");
        assert_eq!(user.edge_followed_by.count, 15320);
        assert_eq!(user.edge_follow.count, 311);
        assert_eq!(user.edge_owner_to_timeline_media.count, 87);
        assert!(!user.is_private);
        assert_eq!(
            user.best_profile_pic_url(),
            Some("https://scontent.cdninstagram.com/v/demoacct_hd.jpg")
        );
    }

    #[test]
    fn missing_user() {
        let info: WebProfileInfo =
            serde_json::from_str(r#"{"data":{"user":null},"status":"ok"}"#)
                .expect("failed to parse");
        assert!(info.user().is_none());
    }
}
