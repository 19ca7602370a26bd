use super::print_result;
use crate::client_data::ClientData;
use insta::Fetcher;

#[derive(Debug, argh::FromArgs)]
#[argh(
    subcommand,
    name = "comments",
    description = "get the comments of a post, with some replies"
)]
pub struct Options {
    #[argh(positional, description = "the post shortcode")]
    pub shortcode: String,

    #[argh(
        positional,
        default = "500",
        description = "the max number of top-level comments"
    )]
    pub limit: usize,
}

pub async fn exec(client_data: &ClientData, options: Options) -> anyhow::Result<()> {
    let fetcher = Fetcher::new(client_data.client().await?);
    let result = fetcher
        .fetch_comments(&options.shortcode, options.limit)
        .await;
    print_result(&result)
}
