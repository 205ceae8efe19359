use super::*;
use prodimg_core::{AppConfig, Environment, ResolverSettings};
use prodimg_resolver::ResolverError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::resolve::{run_resolve, ResolveArgs};

fn config(search_url: String, default_site: &str) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().expect("valid addr"),
        log_level: "info".to_string(),
        default_site: default_site.to_string(),
        cache_max_age_secs: 604_800,
        resolver: ResolverSettings {
            search_url,
            request_timeout_secs: 5,
            ..ResolverSettings::default()
        },
    }
}

fn args(subcode: Option<&str>, name: Option<&str>, debug: bool) -> ResolveArgs {
    ResolveArgs {
        site: None,
        subcode: subcode.map(String::from),
        ean: None,
        name: name.map(String::from),
        debug,
    }
}

#[test]
fn parses_resolve_with_all_identifiers() {
    let cli = Cli::try_parse_from([
        "prodimg-cli",
        "resolve",
        "--site",
        "bringo.ma",
        "--subcode",
        "694062",
        "--ean",
        "3616479540274",
        "--name",
        "Salon Bas Lanka",
        "--debug",
    ])
    .expect("expected valid cli args");

    let Commands::Resolve(args) = cli.command;
    assert_eq!(args.site.as_deref(), Some("bringo.ma"));
    assert_eq!(args.subcode.as_deref(), Some("694062"));
    assert_eq!(args.ean.as_deref(), Some("3616479540274"));
    assert_eq!(args.name.as_deref(), Some("Salon Bas Lanka"));
    assert!(args.debug);
}

#[test]
fn resolve_flags_are_optional() {
    let cli = Cli::try_parse_from(["prodimg-cli", "resolve"]).expect("expected valid cli args");
    let Commands::Resolve(args) = cli.command;
    assert!(args.site.is_none());
    assert!(args.subcode.is_none());
    assert!(!args.debug);
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["prodimg-cli"]).is_err());
}

#[tokio::test]
async fn run_resolve_without_identifiers_is_an_error() {
    let cfg = config("http://127.0.0.1:9/html/".to_string(), "bringo.ma");
    let err = run_resolve(&cfg, &args(None, Some("   "), false))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ResolverError>(),
        Some(ResolverError::MissingIdentifier)
    ));
}

#[tokio::test]
async fn run_resolve_prints_match_on_default_site() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/html/"))
        .and(query_param("q", "site:127.0.0.1 694062"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<a class="result__a" href="{uri}/p/1">One</a>"#
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<meta property="og:image" content="https://cdn.example.com/1.jpg"> 694062"#,
        ))
        .mount(&server)
        .await;

    let cfg = config(format!("{uri}/html/"), "127.0.0.1");
    let report = run_resolve(&cfg, &args(Some("694062"), None, true))
        .await
        .expect("resolution runs");

    assert!(report.matched);
    let json: serde_json::Value = serde_json::from_str(&report.json).expect("json parse");
    assert_eq!(json["imageUrl"].as_str(), Some("https://cdn.example.com/1.jpg"));
    assert_eq!(json["matchedBy"].as_str(), Some("subcode/ean"));
    assert_eq!(json["tried"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn run_resolve_reports_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>no results</p>"))
        .mount(&server)
        .await;

    let cfg = config(format!("{}/html/", server.uri()), "127.0.0.1");
    let report = run_resolve(&cfg, &args(None, Some("Salon Bas Lanka"), false))
        .await
        .expect("resolution runs");

    assert!(!report.matched);
    let json: serde_json::Value = serde_json::from_str(&report.json).expect("json parse");
    assert!(json["imageUrl"].is_null());
    assert_eq!(json["tried"].as_array().map(Vec::len), Some(0));
}
