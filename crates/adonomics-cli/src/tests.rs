use clap::Parser;
use uuid::Uuid;

use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["adonomics-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["adonomics-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["adonomics-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_ads_show_with_uuid() {
    let id = Uuid::new_v4();
    let cli = Cli::try_parse_from(["adonomics-cli", "ads", "show", &id.to_string()])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Ads {
            command: AdsCommands::Show { id: parsed, json: false }
        }) if parsed == id
    ));
}

#[test]
fn ads_show_rejects_non_uuid() {
    let result = Cli::try_parse_from(["adonomics-cli", "ads", "show", "not-a-uuid"]);
    assert!(result.is_err());
}

#[test]
fn parses_ads_analyze() {
    let id = Uuid::new_v4();
    let cli = Cli::try_parse_from(["adonomics-cli", "ads", "analyze", &id.to_string()])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Ads {
            command: AdsCommands::Analyze { id: parsed }
        }) if parsed == id
    ));
}

#[test]
fn ads_list_defaults_limit() {
    let cli = Cli::try_parse_from(["adonomics-cli", "ads", "list", "--user", "u1"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Ads {
            command: AdsCommands::List { ref user, limit: 20 }
        }) if user == "u1"
    ));
}

#[test]
fn parses_videos_search_with_limit() {
    let cli = Cli::try_parse_from([
        "adonomics-cli",
        "videos",
        "search",
        "summer sneakers",
        "--limit",
        "3",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Videos {
            command: VideosCommands::Search { ref query, limit: 3 }
        }) if query == "summer sneakers"
    ));
}
