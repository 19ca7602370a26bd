//! Extracting instagram cookies from locally installed browsers.
//!
//! Each browser is a [`CookieSource`].
//! Session acquisition tries a list of them in order and keeps the first complete result.
//!
//! Chromium-family browsers store most cookie values encrypted with an os keyring secret.
//! Those values are skipped, not decrypted.

use crate::{
    CredentialSet,
    Error,
};
use rusqlite::{
    Connection,
    OpenFlags,
};
use std::{
    path::{
        Path,
        PathBuf,
    },
    str::FromStr,
};
use tracing::debug;
use url::Url;

/// A named strategy for pulling cookies out of somewhere.
pub trait CookieSource: Send + Sync {
    /// The name of this source, used in logs
    fn name(&self) -> &str;

    /// Extract every cookie for `domain` and its subdomains.
    ///
    /// The result may be missing essential cookies.
    fn extract(&self, domain: &str) -> Result<CredentialSet, Error>;
}

/// A browser with a readable cookie store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    Chrome,
    Chromium,
    Brave,
    Edge,
    Firefox,
    Safari,
}

impl Browser {
    /// Every supported browser
    pub const ALL: [Browser; 6] = [
        Self::Chrome,
        Self::Chromium,
        Self::Brave,
        Self::Edge,
        Self::Firefox,
        Self::Safari,
    ];

    /// The order browsers are tried in when none are configured
    pub const DEFAULT_ORDER: [Browser; 4] = [Self::Chrome, Self::Safari, Self::Firefox, Self::Edge];

    /// Get the name of this browser
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Chromium => "chromium",
            Self::Brave => "brave",
            Self::Edge => "edge",
            Self::Firefox => "firefox",
            Self::Safari => "safari",
        }
    }

    /// Find this browser's cookie store on this machine.
    pub fn cookie_store_path(self) -> Option<PathBuf> {
        match self {
            Self::Chrome | Self::Chromium | Self::Brave | Self::Edge => {
                let user_data = chromium_user_data_dir(self)?;
                let default_profile = user_data.join("Default");

                // Newer versions moved the db into a `Network` subdirectory
                [
                    default_profile.join("Network").join("Cookies"),
                    default_profile.join("Cookies"),
                ]
                .into_iter()
                .find(|path| path.exists())
            }
            Self::Firefox => firefox_profile_dir().map(|dir| dir.join("cookies.sqlite")),
            Self::Safari => safari_cookies_path(),
        }
    }

}

impl std::fmt::Display for Browser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failed to parse a [`Browser`]
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown browser `{0}`")]
pub struct ParseBrowserError(String);

impl FromStr for Browser {
    type Err = ParseBrowserError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|browser| browser.as_str().eq_ignore_ascii_case(input))
            .ok_or_else(|| ParseBrowserError(input.into()))
    }
}

impl CookieSource for Browser {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn extract(&self, domain: &str) -> Result<CredentialSet, Error> {
        let path = self
            .cookie_store_path()
            .filter(|path| path.exists())
            .ok_or(Error::MissingCookieStore(self.as_str()))?;
        debug!("reading {} cookies from `{}`", self, path.display());

        match self {
            Self::Chrome | Self::Chromium | Self::Brave | Self::Edge => {
                read_chromium_cookies(&path, self.as_str(), domain)
            }
            Self::Firefox => read_firefox_cookies(&path, domain),
            Self::Safari => {
                let data = std::fs::read(&path)?;
                let cookies = parse_binary_cookies(&data)?;
                Ok(cookies
                    .into_iter()
                    .filter(|cookie| host_matches(&cookie.domain, domain))
                    .map(|cookie| (cookie.name, cookie.value))
                    .collect())
            }
        }
    }
}

/// Returns true if a cookie host belongs to `domain`.
fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.trim_start_matches('.');
    host == domain
        || host
            .strip_suffix(domain)
            .map_or(false, |prefix| prefix.ends_with('.'))
}

/// Open an sqlite db without locking it or touching its journal.
///
/// Browsers hold their cookie dbs open, so a normal open may fail while they run.
fn open_immutable(path: &Path, browser: &'static str) -> Result<Connection, Error> {
    let mut url = Url::from_file_path(path).map_err(|_| Error::MissingCookieStore(browser))?;
    url.set_query(Some("immutable=1"));

    let connection = Connection::open_with_flags(
        url.as_str(),
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
    )?;

    Ok(connection)
}

fn read_chromium_cookies(
    path: &Path,
    browser: &'static str,
    domain: &str,
) -> Result<CredentialSet, Error> {
    let connection = open_immutable(path, browser)?;
    let mut statement = connection.prepare(
        "SELECT name, value, length(encrypted_value) FROM cookies \
         WHERE host_key = ?1 OR host_key LIKE ?2 \
         ORDER BY length(host_key)",
    )?;

    let rows = statement.query_map((domain, format!("%.{domain}")), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<i64>>(2)?.unwrap_or(0),
        ))
    })?;

    let mut cookies = Vec::new();
    let mut encrypted = 0;
    for row in rows {
        let (name, value, encrypted_len) = row?;
        if !value.is_empty() {
            cookies.push((name, value));
        } else if encrypted_len > 0 {
            encrypted += 1;
        }
    }

    if cookies.is_empty() && encrypted > 0 {
        return Err(Error::EncryptedCookies(browser));
    }

    if encrypted > 0 {
        debug!("skipped {encrypted} encrypted {browser} cookies");
    }

    Ok(cookies.into_iter().collect())
}

fn read_firefox_cookies(path: &Path, domain: &str) -> Result<CredentialSet, Error> {
    let connection = open_immutable(path, Browser::Firefox.as_str())?;
    let mut statement = connection.prepare(
        "SELECT name, value FROM moz_cookies \
         WHERE host = ?1 OR host LIKE ?2 \
         ORDER BY length(host)",
    )?;

    let rows = statement.query_map((domain, format!("%.{domain}")), |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut cookies = Vec::new();
    for row in rows {
        cookies.push(row?);
    }

    Ok(cookies.into_iter().collect())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

fn chromium_user_data_dir(browser: Browser) -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let config = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| home_dir().map(|home| home.join(".config")))?;
        let dir = match browser {
            Browser::Chrome => "google-chrome",
            Browser::Chromium => "chromium",
            Browser::Brave => "BraveSoftware/Brave-Browser",
            Browser::Edge => "microsoft-edge",
            Browser::Firefox | Browser::Safari => return None,
        };
        Some(config.join(dir))
    }

    #[cfg(target_os = "macos")]
    {
        let support = home_dir()?.join("Library/Application Support");
        let dir = match browser {
            Browser::Chrome => "Google/Chrome",
            Browser::Chromium => "Chromium",
            Browser::Brave => "BraveSoftware/Brave-Browser",
            Browser::Edge => "Microsoft Edge",
            Browser::Firefox | Browser::Safari => return None,
        };
        Some(support.join(dir))
    }

    #[cfg(target_os = "windows")]
    {
        let local_app_data = PathBuf::from(std::env::var_os("LOCALAPPDATA")?);
        let dir = match browser {
            Browser::Chrome => "Google/Chrome",
            Browser::Chromium => "Chromium",
            Browser::Brave => "BraveSoftware/Brave-Browser",
            Browser::Edge => "Microsoft/Edge",
            Browser::Firefox | Browser::Safari => return None,
        };
        Some(local_app_data.join(dir).join("User Data"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        let _ = browser;
        None
    }
}

fn firefox_profiles_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        Some(home_dir()?.join(".mozilla/firefox"))
    }

    #[cfg(target_os = "macos")]
    {
        Some(home_dir()?.join("Library/Application Support/Firefox/Profiles"))
    }

    #[cfg(target_os = "windows")]
    {
        Some(PathBuf::from(std::env::var_os("APPDATA")?).join("Mozilla/Firefox/Profiles"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        None
    }
}

/// Find the default firefox profile.
fn firefox_profile_dir() -> Option<PathBuf> {
    let mut profiles: Vec<PathBuf> = std::fs::read_dir(firefox_profiles_dir()?)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.join("cookies.sqlite").exists())
        .collect();

    // Prefer the release profile, then any default profile
    profiles.sort_by_key(|path| {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.ends_with(".default-release") {
            0
        } else if name.ends_with(".default") {
            1
        } else {
            2
        }
    });

    profiles.into_iter().next()
}

fn safari_cookies_path() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        let home = home_dir()?;
        [
            home.join("Library/Containers/com.apple.Safari/Data/Library/Cookies/Cookies.binarycookies"),
            home.join("Library/Cookies/Cookies.binarycookies"),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    #[cfg(not(target_os = "macos"))]
    {
        None
    }
}

/// Magic bytes at the start of a safari cookie file
const BINARY_COOKIES_MAGIC: &[u8; 4] = b"cook";

/// The fixed-size header of a safari cookie record
const COOKIE_RECORD_HEADER_LEN: usize = 56;

/// A cookie from a safari cookie file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryCookie {
    pub domain: String,
    pub name: String,
    pub path: String,
    pub value: String,
}

fn read_u32_be(data: &[u8], at: usize) -> Result<u32, Error> {
    data.get(at..at + 4)
        .and_then(|bytes| bytes.try_into().ok())
        .map(u32::from_be_bytes)
        .ok_or(Error::InvalidBinaryCookies("unexpected end of data"))
}

fn read_u32_le(data: &[u8], at: usize) -> Result<u32, Error> {
    data.get(at..at + 4)
        .and_then(|bytes| bytes.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or(Error::InvalidBinaryCookies("unexpected end of data"))
}

fn read_c_string(data: &[u8], at: usize) -> Result<String, Error> {
    let bytes = data
        .get(at..)
        .ok_or(Error::InvalidBinaryCookies("string offset out of bounds"))?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());

    String::from_utf8(bytes[..end].to_vec())
        .map_err(|_| Error::InvalidBinaryCookies("string is not utf8"))
}

/// Parse a safari `Cookies.binarycookies` file.
///
/// The header holds a big-endian page count and page sizes.
/// Each page holds little-endian offsets to cookie records.
pub fn parse_binary_cookies(data: &[u8]) -> Result<Vec<BinaryCookie>, Error> {
    if data.get(..4) != Some(BINARY_COOKIES_MAGIC.as_slice()) {
        return Err(Error::InvalidBinaryCookies("missing magic"));
    }

    let num_pages = read_u32_be(data, 4)? as usize;
    let mut page_sizes = Vec::with_capacity(num_pages.min(1024));
    for i in 0..num_pages {
        page_sizes.push(read_u32_be(data, 8 + i * 4)? as usize);
    }

    let mut cookies = Vec::new();
    let mut page_start = 8 + num_pages * 4;
    for page_size in page_sizes {
        let page = data
            .get(page_start..page_start + page_size)
            .ok_or(Error::InvalidBinaryCookies("page extends past end of file"))?;
        cookies.extend(parse_page(page)?);
        page_start += page_size;
    }

    Ok(cookies)
}

fn parse_page(page: &[u8]) -> Result<Vec<BinaryCookie>, Error> {
    let num_cookies = read_u32_le(page, 4)? as usize;

    let mut cookies = Vec::with_capacity(num_cookies.min(1024));
    for i in 0..num_cookies {
        let offset = read_u32_le(page, 8 + i * 4)? as usize;
        let record = page
            .get(offset..)
            .ok_or(Error::InvalidBinaryCookies("cookie offset out of bounds"))?;
        cookies.push(parse_cookie_record(record)?);
    }

    Ok(cookies)
}

fn parse_cookie_record(data: &[u8]) -> Result<BinaryCookie, Error> {
    let size = read_u32_le(data, 0)? as usize;
    if size < COOKIE_RECORD_HEADER_LEN {
        return Err(Error::InvalidBinaryCookies("cookie record too small"));
    }
    let record = data
        .get(..size)
        .ok_or(Error::InvalidBinaryCookies("cookie record extends past page"))?;

    Ok(BinaryCookie {
        domain: read_c_string(record, read_u32_le(record, 16)? as usize)?,
        name: read_c_string(record, read_u32_le(record, 20)? as usize)?,
        path: read_c_string(record, read_u32_le(record, 24)? as usize)?,
        value: read_c_string(record, read_u32_le(record, 28)? as usize)?,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    /// Encode one safari cookie record
    fn cookie_record(domain: &str, name: &str, path: &str, value: &str) -> Vec<u8> {
        let mut strings = Vec::new();
        let mut offsets = Vec::new();
        for field in [domain, name, path, value] {
            offsets.push((COOKIE_RECORD_HEADER_LEN + strings.len()) as u32);
            strings.extend_from_slice(field.as_bytes());
            strings.push(0);
        }
        let size = (COOKIE_RECORD_HEADER_LEN + strings.len()) as u32;

        let mut record = Vec::new();
        record.extend_from_slice(&size.to_le_bytes());
        record.extend_from_slice(&0_u32.to_le_bytes());
        record.extend_from_slice(&1_u32.to_le_bytes());
        record.extend_from_slice(&0_u32.to_le_bytes());
        for offset in offsets {
            record.extend_from_slice(&offset.to_le_bytes());
        }
        record.extend_from_slice(&0_u32.to_le_bytes());
        record.extend_from_slice(&0_u32.to_le_bytes());
        record.extend_from_slice(&0_f64.to_le_bytes());
        record.extend_from_slice(&0_f64.to_le_bytes());
        assert_eq!(record.len(), COOKIE_RECORD_HEADER_LEN);
        record.extend_from_slice(&strings);
        record
    }

    /// Encode a safari cookie file with one page
    fn binary_cookies(records: &[Vec<u8>]) -> Vec<u8> {
        let mut page = Vec::new();
        page.extend_from_slice(&0x0000_0100_u32.to_be_bytes());
        page.extend_from_slice(&(records.len() as u32).to_le_bytes());
        let mut offset = 8 + records.len() * 4 + 4;
        for record in records {
            page.extend_from_slice(&(offset as u32).to_le_bytes());
            offset += record.len();
        }
        page.extend_from_slice(&0_u32.to_le_bytes());
        for record in records {
            page.extend_from_slice(record);
        }

        let mut file = Vec::new();
        file.extend_from_slice(BINARY_COOKIES_MAGIC);
        file.extend_from_slice(&1_u32.to_be_bytes());
        file.extend_from_slice(&(page.len() as u32).to_be_bytes());
        file.extend_from_slice(&page);
        file
    }

    #[test]
    fn parse_safari_cookies() {
        let data = binary_cookies(&[
            cookie_record(".instagram.com", "sessionid", "/", "abc"),
            cookie_record(".example.com", "other", "/", "xyz"),
        ]);

        let cookies = parse_binary_cookies(&data).expect("failed to parse");
        assert_eq!(cookies.len(), 2);
        assert_eq!(
            cookies[0],
            BinaryCookie {
                domain: ".instagram.com".into(),
                name: "sessionid".into(),
                path: "/".into(),
                value: "abc".into(),
            }
        );
        assert_eq!(cookies[1].name, "other");
    }

    #[test]
    fn invalid_safari_cookies() {
        assert!(parse_binary_cookies(b"badm\x00\x00\x00\x00").is_err());
        assert!(parse_binary_cookies(b"cook").is_err());

        let mut truncated = binary_cookies(&[cookie_record(".instagram.com", "a", "/", "b")]);
        truncated.truncate(truncated.len() - 10);
        assert!(parse_binary_cookies(&truncated).is_err());

        let empty = [BINARY_COOKIES_MAGIC.as_slice(), 0_u32.to_be_bytes().as_slice()].concat();
        assert!(parse_binary_cookies(&empty).expect("failed to parse").is_empty());
    }

    #[test]
    fn host_matching() {
        assert!(host_matches(".instagram.com", "instagram.com"));
        assert!(host_matches("www.instagram.com", "instagram.com"));
        assert!(host_matches("instagram.com", "instagram.com"));
        assert!(!host_matches("notinstagram.com", "instagram.com"));
        assert!(!host_matches("instagram.com.evil", "instagram.com"));
    }

    #[test]
    fn parse_browser() {
        assert_eq!("Chrome".parse::<Browser>().unwrap(), Browser::Chrome);
        assert_eq!("edge".parse::<Browser>().unwrap(), Browser::Edge);
        assert!("netscape".parse::<Browser>().is_err());
        assert_eq!(
            Browser::DEFAULT_ORDER.map(Browser::as_str),
            ["chrome", "safari", "firefox", "edge"]
        );
    }

    fn chromium_db(dir: &Path, rows: &[(&str, &str, &str, &[u8])]) -> PathBuf {
        let path = dir.join("Cookies");
        let connection = Connection::open(&path).unwrap();
        connection
            .execute(
                "CREATE TABLE cookies (host_key TEXT, name TEXT, value TEXT, encrypted_value BLOB)",
                (),
            )
            .unwrap();
        for (host_key, name, value, encrypted_value) in rows {
            connection
                .execute(
                    "INSERT INTO cookies VALUES (?1, ?2, ?3, ?4)",
                    (host_key, name, value, encrypted_value),
                )
                .unwrap();
        }
        path
    }

    #[test]
    fn chromium_cookies() {
        let dir = tempfile::tempdir().unwrap();
        let path = chromium_db(
            dir.path(),
            &[
                (".instagram.com", "sessionid", "abc", b"".as_slice()),
                (".instagram.com", "csrftoken", "tok", b"".as_slice()),
                ("www.instagram.com", "ds_user_id", "1", b"".as_slice()),
                (".instagram.com", "rur", "", b"v10secret".as_slice()),
                (".example.com", "sessionid", "other", b"".as_slice()),
            ],
        );

        let credentials =
            read_chromium_cookies(&path, "chrome", "instagram.com").expect("failed to read");
        assert_eq!(credentials.len(), 3);
        assert_eq!(credentials.session_id(), Some("abc"));
        assert!(credentials.is_complete());
    }

    #[test]
    fn encrypted_chromium_cookies() {
        let dir = tempfile::tempdir().unwrap();
        let path = chromium_db(
            dir.path(),
            &[
                (".instagram.com", "sessionid", "", b"v10secret".as_slice()),
                (".instagram.com", "csrftoken", "", b"v10secret".as_slice()),
            ],
        );

        let error = read_chromium_cookies(&path, "chrome", "instagram.com")
            .expect_err("encrypted cookies were read");
        assert!(matches!(error, Error::EncryptedCookies("chrome")));
    }

    #[test]
    fn firefox_cookies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.sqlite");
        let connection = Connection::open(&path).unwrap();
        connection
            .execute(
                "CREATE TABLE moz_cookies (host TEXT, name TEXT, value TEXT)",
                (),
            )
            .unwrap();
        for (host, name, value) in [
            (".instagram.com", "sessionid", "abc"),
            (".instagram.com", "csrftoken", "tok"),
            ("notinstagram.com", "ds_user_id", "2"),
        ] {
            connection
                .execute("INSERT INTO moz_cookies VALUES (?1, ?2, ?3)", (host, name, value))
                .unwrap();
        }
        drop(connection);

        let credentials = read_firefox_cookies(&path, "instagram.com").expect("failed to read");
        assert_eq!(credentials.len(), 2);
        assert_eq!(credentials.missing(), ["ds_user_id"]);
    }
}
