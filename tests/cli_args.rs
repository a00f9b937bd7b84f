//! CLI argument parsing tests.

use clap::Parser;
use pagefetch::cli::{Cli, Command, PageArgs};
use pagefetch::PagingModel;

#[test]
fn test_cli_parses_interesting_subcommand() {
    let cli = Cli::parse_from(["pagefetch", "interesting", "--date", "2018-05-01"]);

    assert!(!cli.json);
    match cli.command {
        Command::Interesting {
            date,
            pages,
            detailed,
        } => {
            assert_eq!(date.map(|d| d.to_string()), Some("2018-05-01".to_string()));
            assert_eq!(pages, PageArgs::default());
            assert!(!detailed);
        }
        _ => panic!("Expected Interesting command"),
    }
}

#[test]
fn test_cli_parses_page_range() {
    let cli = Cli::parse_from([
        "pagefetch",
        "interesting",
        "--page",
        "2",
        "--last",
        "4",
        "--per",
        "50",
    ]);

    match cli.command {
        Command::Interesting { pages, .. } => {
            assert_eq!(pages.paging(), Some(PagingModel::new(2, 4, 50)));
        }
        _ => panic!("Expected Interesting command"),
    }
}

#[test]
fn test_cli_parses_fetch_subcommand() {
    let cli = Cli::parse_from([
        "pagefetch",
        "fetch",
        "https://api.github.com/orgs/rust-lang/repos",
        "--param",
        "sort=updated",
        "--param",
        "type=public",
        "--header",
        "Accept=application/vnd.github+json",
        "--per",
        "30",
    ]);

    match cli.command {
        Command::Fetch {
            url,
            pages,
            params,
            headers,
            discover,
        } => {
            assert_eq!(url, "https://api.github.com/orgs/rust-lang/repos");
            assert_eq!(pages.paging(), Some(PagingModel::new(1, 1, 30)));
            assert_eq!(
                params,
                vec![
                    ("sort".to_string(), "updated".to_string()),
                    ("type".to_string(), "public".to_string()),
                ]
            );
            assert_eq!(
                headers,
                vec![("Accept".to_string(), "application/vnd.github+json".to_string())]
            );
            assert!(!discover);
        }
        _ => panic!("Expected Fetch command"),
    }
}

#[test]
fn test_cli_json_flag_is_global() {
    let cli = Cli::parse_from(["pagefetch", "fetch", "https://x.test/items", "--json"]);
    assert!(cli.json);

    let cli = Cli::parse_from(["pagefetch", "--json", "interesting"]);
    assert!(cli.json);
}

#[test]
fn test_cli_rejects_malformed_param() {
    let result = Cli::try_parse_from(["pagefetch", "fetch", "https://x.test", "--param", "oops"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_discover_conflicts_with_page() {
    let result = Cli::try_parse_from([
        "pagefetch",
        "fetch",
        "https://x.test",
        "--discover",
        "--page",
        "2",
    ]);
    assert!(result.is_err());

    let cli = Cli::parse_from(["pagefetch", "fetch", "https://x.test", "--discover", "--per", "20"]);
    assert!(matches!(cli.command, Command::Fetch { discover: true, .. }));
}

#[test]
fn test_cli_rejects_bad_date() {
    let result = Cli::try_parse_from(["pagefetch", "interesting", "--date", "yesterday"]);
    assert!(result.is_err());
}
