use crate::Error;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// The length of a public post shortcode
const SHORTCODE_LEN: usize = 11;

/// Returns true if the given input should be treated as a post shortcode instead of a username.
///
/// Shortcodes are 11 ascii alphanumeric characters.
pub fn looks_like_shortcode(input: &str) -> bool {
    input.len() == SHORTCODE_LEN && input.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Convert a post shortcode into its numeric media id.
pub fn shortcode_to_media_id(shortcode: &str) -> Result<u64, Error> {
    if shortcode.is_empty() {
        return Err(Error::InvalidShortcode(shortcode.into()));
    }

    shortcode.bytes().try_fold(0_u64, |id, b| {
        let digit = ALPHABET
            .iter()
            .position(|&c| c == b)
            .ok_or_else(|| Error::InvalidShortcode(shortcode.into()))?;

        id.checked_mul(64)
            .and_then(|id| id.checked_add(digit as u64))
            .ok_or_else(|| Error::InvalidShortcode(shortcode.into()))
    })
}

/// Make the canonical url for a post.
pub(crate) fn post_url(shortcode: &str) -> String {
    format!("https://www.instagram.com/p/{shortcode}/")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shortcode_detection() {
        assert!(looks_like_shortcode("CxYz1230000"));
        assert!(!looks_like_shortcode("demoacct"));
        assert!(!looks_like_shortcode("CxYz123-000"));
        assert!(!looks_like_shortcode("demo_acct12"));
        assert!(!looks_like_shortcode("CxYz12300000"));
    }

    #[test]
    fn media_ids() {
        assert_eq!(shortcode_to_media_id("B").unwrap(), 1);
        assert_eq!(shortcode_to_media_id("BA").unwrap(), 64);
        assert_eq!(
            shortcode_to_media_id("CxYz1230000").unwrap(),
            3195531937042353460
        );
        assert_eq!(
            shortcode_to_media_id("CIlZpXKFfNt").unwrap(),
            2460485564954440557
        );
    }

    #[test]
    fn invalid_shortcodes() {
        assert!(shortcode_to_media_id("").is_err());
        assert!(shortcode_to_media_id("Cx!z").is_err());
        // 13 characters overflow a u64
        assert!(shortcode_to_media_id("_____________").is_err());
    }
}
