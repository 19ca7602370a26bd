use super::Item;

/// One page of a user's post feed, newest first.
#[derive(Debug, Default, serde::Deserialize)]
pub struct UserFeed {
    /// Items.
    ///
    /// Items that fail to parse are skipped.
    #[serde(default, with = "crate::types::lenient_vec")]
    pub items: Vec<Item>,

    /// Whether another page exists
    #[serde(default)]
    pub more_available: bool,

    /// The cursor for the next page
    #[serde(default)]
    pub next_max_id: Option<String>,
}

impl UserFeed {
    /// Get the cursor for the next page, if there is one.
    pub fn next_cursor(&self) -> Option<&str> {
        if !self.more_available {
            return None;
        }

        self.next_max_id.as_deref()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const USER_FEED: &str = include_str!("../../test_data/user_feed.json");

    #[test]
    fn parse_user_feed() {
        let feed: UserFeed = serde_json::from_str(USER_FEED).expect("failed to parse");

        assert_eq!(feed.items.len(), 3);
        assert_eq!(feed.next_cursor(), Some("3195531937042353459_4242"));

        let reels = feed.items.iter().filter(|item| item.is_reel()).count();
        let videos = feed.items.iter().filter(|item| item.is_video()).count();
        assert_eq!(reels, 1);
        assert_eq!(videos, 2);
    }

    #[test]
    fn odd_items_do_not_fail_the_page() {
        let feed: UserFeed = serde_json::from_str(
            r#"{
                "items": [
                    {
                        "code": "CxYz1230001",
                        "media_type": 2,
                        "product_type": "clips",
                        "play_count": 10
                    },
                    { "code": "CxYz1230002", "media_type": 11 },
                    {
                        "code": "CxYz1230003",
                        "media_type": 1,
                        "image_versions2": {
                            "candidates": [{ "url": "https://scontent.cdninstagram.com/v/photo.jpg" }]
                        }
                    },
                    { "media_type": "unexpected" }
                ],
                "more_available": false,
                "status": "ok"
            }"#,
        )
        .expect("failed to parse");

        let codes: Vec<&str> = feed.items.iter().map(|item| item.code.as_str()).collect();
        assert_eq!(codes, ["CxYz1230001", "CxYz1230002", "CxYz1230003"]);

        let videos = feed.items.iter().filter(|item| item.is_video()).count();
        assert_eq!(videos, 1);
    }

    #[test]
    fn last_page_has_no_cursor() {
        let feed: UserFeed = serde_json::from_str(
            r#"{"items":[],"more_available":false,"next_max_id":"ignored","status":"ok"}"#,
        )
        .expect("failed to parse");
        assert!(feed.next_cursor().is_none());
    }
}
