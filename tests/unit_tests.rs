use clap::Parser;
use sqlsource::ConnectionOpts;
use sync_core::Config;

#[derive(Parser)]
struct TestCli {
    #[command(flatten)]
    connection: ConnectionOpts,
}

fn parse(args: &[&str]) -> Config {
    let cli = TestCli::try_parse_from(std::iter::once("sqlsource").chain(args.iter().copied()))
        .expect("arguments should parse");
    cli.connection.into()
}

#[test]
fn test_connection_opts_defaults() {
    let config = parse(&["--database", "shop"]);

    assert_eq!(config.hostname, "localhost");
    assert_eq!(config.port, 3306);
    assert_eq!(config.username, "root");
    assert_eq!(config.password, "");
    assert_eq!(config.database, "shop");
    assert!(config.options.is_empty());
}

#[test]
fn test_connection_opts_scenario() {
    let config = parse(&[
        "--hostname",
        "db.internal",
        "--port",
        "3306",
        "--username",
        "svc",
        "--password",
        "x",
        "--database",
        "shop",
        "--option",
        "charset=utf8mb4",
        "--option",
        "bogus",
    ]);

    assert_eq!(config.target(), "db.internal:3306/shop");
    assert_eq!(config.options, vec!["charset=utf8mb4", "bogus"]);
    assert_eq!(
        config.parsed_options(),
        vec![("charset".to_string(), "utf8mb4".to_string())]
    );
}

#[test]
fn test_options_accept_comma_separated_list() {
    let config = parse(&["--database", "shop", "--option", "a=1,b=2"]);
    assert_eq!(config.options, vec!["a=1", "b=2"]);
}

#[test]
fn test_database_is_required() {
    if std::env::var("SQLSOURCE_DATABASE").is_err() {
        assert!(TestCli::try_parse_from(["sqlsource", "--hostname", "db.internal"]).is_err());
    }
}

#[test]
fn test_invalid_port_is_rejected() {
    let result = TestCli::try_parse_from(["sqlsource", "--database", "shop", "--port", "70000"]);
    assert!(result.is_err());
}

#[test]
fn test_config_debug_hides_password() {
    let config = parse(&["--database", "shop", "--password", "hunter2"]);
    let debug = format!("{config:?}");
    assert!(!debug.contains("hunter2"));
    assert!(debug.contains("shop"));
}
