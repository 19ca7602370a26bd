use crate::commands::SubCommand;
use argh::FromArgs;
use camino::Utf8PathBuf;

/// CLI Options
#[derive(Debug, argh::FromArgs)]
#[argh(description = "Fetch instagram profiles, videos, and comments as json")]
pub struct CliOptions {
    #[argh(option, description = "the path to the config")]
    pub config: Option<Utf8PathBuf>,

    #[argh(
        option,
        description = "the account whose session is used, overriding the config"
    )]
    pub account: Option<String>,

    #[argh(subcommand)]
    pub subcommand: SubCommand,
}

impl CliOptions {
    /// Parse options from a full argument list, including the program name.
    pub fn parse<S>(args: &[S]) -> Result<Self, argh::EarlyExit>
    where
        S: AsRef<str>,
    {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        let (command, rest) = match args.split_first() {
            Some((command, rest)) => (*command, rest),
            None => ("insta-analyzer", &[][..]),
        };

        Self::from_args(&[command], rest)
    }

    /// Parse options from the process arguments.
    pub fn parse_env() -> Result<Self, argh::EarlyExit> {
        let args: Vec<String> = std::env::args_os()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();

        Self::parse(&args)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use insta::MediaKind;

    #[test]
    fn profile_defaults() {
        let options = CliOptions::parse(&["insta-analyzer", "profile", "demoacct"])
            .expect("failed to parse");
        assert!(options.config.is_none());
        assert!(options.account.is_none());

        match options.subcommand {
            SubCommand::Profile(options) => {
                assert_eq!(options.target, "demoacct");
                assert!(options.args.is_empty());
                assert_eq!(options.selection().unwrap(), (MediaKind::All, 100));
            }
            subcommand => panic!("unexpected subcommand {subcommand:?}"),
        }
    }

    #[test]
    fn profile_positionals() {
        let options = CliOptions::parse(&[
            "insta-analyzer",
            "--account",
            "me",
            "profile",
            "@demoacct",
            "reels",
            "5",
        ])
        .expect("failed to parse");
        assert_eq!(options.account.as_deref(), Some("me"));

        match options.subcommand {
            SubCommand::Profile(options) => {
                assert_eq!(options.target, "@demoacct");
                assert_eq!(options.selection().unwrap(), (MediaKind::Reels, 5));
            }
            subcommand => panic!("unexpected subcommand {subcommand:?}"),
        }
    }

    #[test]
    fn comments_defaults() {
        let options = CliOptions::parse(&["insta-analyzer", "comments", "CxYz1230000"])
            .expect("failed to parse");

        match options.subcommand {
            SubCommand::Comments(options) => {
                assert_eq!(options.shortcode, "CxYz1230000");
                assert_eq!(options.limit, 500);
            }
            subcommand => panic!("unexpected subcommand {subcommand:?}"),
        }
    }

    #[test]
    fn import_session_browsers() {
        let options = CliOptions::parse(&[
            "insta-analyzer",
            "import-session",
            "--browser",
            "firefox",
            "--browser",
            "safari",
        ])
        .expect("failed to parse");

        match options.subcommand {
            SubCommand::ImportSession(options) => {
                assert_eq!(
                    options.browsers,
                    [insta::Browser::Firefox, insta::Browser::Safari]
                );
            }
            subcommand => panic!("unexpected subcommand {subcommand:?}"),
        }
    }

    #[test]
    fn invalid_arguments() {
        for args in [
            &["insta-analyzer"][..],
            &["insta-analyzer", "profile"][..],
            &["insta-analyzer", "comments"][..],
            &["insta-analyzer", "import-session", "--browser", "netscape"][..],
        ] {
            let early_exit = CliOptions::parse(args).expect_err("parsed invalid arguments");
            assert!(early_exit.status.is_err(), "{args:?} was not an error");
        }
    }

    #[test]
    fn profile_kind_only() {
        let options = CliOptions::parse(&["insta-analyzer", "profile", "demoacct", "POSTS"])
            .expect("failed to parse");

        match options.subcommand {
            SubCommand::Profile(options) => {
                assert_eq!(options.selection().unwrap(), (MediaKind::Posts, 100));
            }
            subcommand => panic!("unexpected subcommand {subcommand:?}"),
        }
    }

    #[test]
    fn invalid_profile_selection() {
        for args in [
            &["insta-analyzer", "profile", "demoacct", "stories"][..],
            &["insta-analyzer", "profile", "demoacct", "all", "many"][..],
            &["insta-analyzer", "profile", "demoacct", "all", "5", "extra"][..],
        ] {
            let options = CliOptions::parse(args).expect("failed to parse");
            match options.subcommand {
                SubCommand::Profile(options) => {
                    assert!(options.selection().is_err(), "{args:?} was accepted");
                }
                subcommand => panic!("unexpected subcommand {subcommand:?}"),
            }
        }
    }

    #[test]
    fn help_is_not_an_error() {
        let early_exit =
            CliOptions::parse(&["insta-analyzer", "--help"]).expect_err("help was not printed");
        assert!(early_exit.status.is_ok());
        assert!(early_exit.output.contains("profile"));
    }
}
