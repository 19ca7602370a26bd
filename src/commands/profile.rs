use super::{
    print_result,
    InvalidArguments,
};
use crate::client_data::ClientData;
use insta::{
    looks_like_shortcode,
    Fetcher,
    MediaKind,
};
use tracing::info;

/// The max # of videos when no limit is given
const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, argh::FromArgs)]
#[argh(
    subcommand,
    name = "profile",
    description = "get the videos of a profile, or a single post by shortcode"
)]
pub struct Options {
    #[argh(positional, description = "a username, or a post shortcode")]
    pub target: String,

    #[argh(
        positional,
        description = "optional: the videos to keep (posts, reels, or all; default all), then the max number of videos (default 100)"
    )]
    pub args: Vec<String>,
}

impl Options {
    /// Get the media kind and limit from the trailing arguments.
    pub fn selection(&self) -> Result<(MediaKind, usize), InvalidArguments> {
        let (kind, limit) = match self.args.as_slice() {
            [] => (None, None),
            [kind] => (Some(kind), None),
            [kind, limit] => (Some(kind), Some(limit)),
            [_, _, extra, ..] => {
                return Err(InvalidArguments(format!(
                    "unexpected argument `{extra}`, expected at most a media kind and a limit"
                )));
            }
        };

        let kind = match kind {
            Some(kind) => kind
                .parse::<MediaKind>()
                .map_err(|error| InvalidArguments(error.to_string()))?,
            None => MediaKind::All,
        };
        let limit = match limit {
            Some(limit) => limit.parse::<usize>().map_err(|error| {
                InvalidArguments(format!("invalid limit `{limit}`: {error}"))
            })?,
            None => DEFAULT_LIMIT,
        };

        Ok((kind, limit))
    }
}

pub async fn exec(client_data: &ClientData, options: Options) -> anyhow::Result<()> {
    let (kind, limit) = options.selection()?;
    let fetcher = Fetcher::new(client_data.client().await?);

    if looks_like_shortcode(&options.target) {
        info!("fetching post `{}`", options.target);
        let result = fetcher.fetch_single_post(&options.target).await;
        return print_result(&result);
    }

    let username = options.target.trim_start_matches('@');
    info!("fetching up to {limit} {kind} videos from @{username}");
    let result = fetcher.fetch_profile(username, kind, limit).await;
    print_result(&result)
}
