use url::Url;

/// Media Info
#[derive(Debug, serde::Deserialize)]
pub struct MediaInfo {
    /// ?
    #[serde(default)]
    pub num_results: u32,

    /// Items
    #[serde(default)]
    pub items: Vec<Item>,

    /// ?
    #[serde(default)]
    pub more_available: bool,
}

/// A media item.
///
/// Feed listings and media info lookups share this shape.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Item {
    /// The media type
    pub media_type: MediaType,

    /// The product type.
    ///
    /// `clips` marks a reel.
    #[serde(default)]
    pub product_type: Option<String>,

    /// The post code
    pub code: String,

    /// When this was posted, as a unix timestamp.
    #[serde(default)]
    pub taken_at: Option<i64>,

    /// The caption
    #[serde(default)]
    pub caption: Option<Caption>,

    /// # of likes
    #[serde(default)]
    pub like_count: Option<u64>,

    /// # of comments
    #[serde(default)]
    pub comment_count: Option<u64>,

    /// # of plays.
    ///
    /// Only present on video posts
    #[serde(default)]
    pub play_count: Option<u64>,

    /// # of views.
    ///
    /// Older video posts only report this.
    #[serde(default)]
    pub view_count: Option<u64>,

    /// Video length in seconds
    #[serde(default)]
    pub video_duration: Option<f64>,

    /// Versions of a video post.
    ///
    /// Only present on video posts
    #[serde(default)]
    pub video_versions: Option<Vec<VideoVersion>>,

    /// Versions of an image post
    #[serde(default)]
    pub image_versions2: Option<ImageVersions2>,

    /// The owner
    #[serde(default)]
    pub user: Option<ItemUser>,
}

impl Item {
    /// Returns `true` if this is a video.
    pub fn is_video(&self) -> bool {
        self.media_type == MediaType::Video
    }

    /// Returns `true` if this is a reel.
    pub fn is_reel(&self) -> bool {
        self.product_type.as_deref() == Some("clips")
    }

    /// Get the caption text
    pub fn caption_text(&self) -> &str {
        self.caption
            .as_ref()
            .map_or("", |caption| caption.text.as_str())
    }

    /// Get the best image_versions2 candidate
    pub fn get_best_image_versions2_candidate(&self) -> Option<&ImageVersions2Candidate> {
        self.image_versions2.as_ref()?.get_best()
    }

    /// Get the best video version
    pub fn get_best_video_version(&self) -> Option<&VideoVersion> {
        self.video_versions
            .as_ref()?
            .iter()
            .max_by_key(|video_version| video_version.height)
    }
}

/// A caption
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Caption {
    /// The caption text
    #[serde(default)]
    pub text: String,
}

/// The owner of an item
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ItemUser {
    /// The user id
    #[serde(with = "crate::types::id")]
    pub pk: String,

    /// The username
    pub username: String,

    /// The full name
    #[serde(default)]
    pub full_name: String,
}

/// The kind of a media item
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, serde::Deserialize)]
#[serde(from = "u8")]
pub enum MediaType {
    /// A Photo
    Photo,

    /// A video
    Video,

    /// A carousel
    Carousel,

    /// A media type this crate does not know about
    Other(u8),
}

impl From<u8> for MediaType {
    fn from(n: u8) -> Self {
        match n {
            1 => Self::Photo,
            2 => Self::Video,
            8 => Self::Carousel,
            n => Self::Other(n),
        }
    }
}

/// A video version
#[derive(Debug, Clone, serde::Deserialize)]
pub struct VideoVersion {
    /// Height
    #[serde(default)]
    pub height: u32,

    /// Width
    #[serde(default)]
    pub width: u32,

    /// Url
    pub url: Url,
}

/// The image_versions2 field
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ImageVersions2 {
    /// Candidate images
    #[serde(default)]
    pub candidates: Vec<ImageVersions2Candidate>,
}

impl ImageVersions2 {
    /// Get the best candidate
    pub fn get_best(&self) -> Option<&ImageVersions2Candidate> {
        self.candidates
            .iter()
            .max_by_key(|image_versions2_candidate| image_versions2_candidate.height)
    }
}

/// A ImageVersions2 candidate
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ImageVersions2Candidate {
    /// The image height
    #[serde(default)]
    pub height: u32,

    /// The image width
    #[serde(default)]
    pub width: u32,

    /// The image url
    pub url: Url,
}

#[cfg(test)]
mod test {
    use super::*;

    const VIDEO_MEDIA_INFO: &str = include_str!("../../test_data/media_info_video.json");
    const PHOTO_MEDIA_INFO: &str = include_str!("../../test_data/media_info_photo.json");

    #[test]
    fn parse_video_media_info() {
        let media_info: MediaInfo =
            serde_json::from_str(VIDEO_MEDIA_INFO).expect("failed to parse");
        let item = media_info.items.first().expect("missing item");

        assert!(item.is_video());
        assert!(item.is_reel());
        assert_eq!(item.code, "CxYz1230001");
        assert_eq!(item.play_count, Some(48213));
        assert_eq!(
            item.user.as_ref().map(|user| user.username.as_str()),
            Some("demoacct")
        );

        let video_version = item
            .get_best_video_version()
            .expect("missing video version");
        assert_eq!(video_version.height, 1280);
    }

    #[test]
    fn parse_photo_media_info() {
        let media_info: MediaInfo =
            serde_json::from_str(PHOTO_MEDIA_INFO).expect("failed to parse");
        let item = media_info.items.first().expect("missing item");

        assert_eq!(item.media_type, MediaType::Photo);
        assert!(!item.is_video());
        assert!(item.get_best_video_version().is_none());
        assert_eq!(
            item.get_best_image_versions2_candidate()
                .map(|candidate| candidate.width),
            Some(1080)
        );
    }

    #[test]
    fn unknown_media_type() {
        let item: Item = serde_json::from_str(r#"{"code":"CxYz1230009","media_type":11}"#)
            .expect("failed to parse");
        assert_eq!(item.media_type, MediaType::Other(11));
        assert!(!item.is_video());
    }

    #[test]
    fn candidates_without_dimensions() {
        let item: Item = serde_json::from_str(
            r#"{
                "code": "CxYz1230008",
                "media_type": 1,
                "image_versions2": {
                    "candidates": [{ "url": "https://scontent.cdninstagram.com/v/photo.jpg" }]
                }
            }"#,
        )
        .expect("failed to parse");

        let candidate = item
            .get_best_image_versions2_candidate()
            .expect("missing candidate");
        assert_eq!(candidate.height, 0);
    }
}
