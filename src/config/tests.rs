use super::*;
use config::{FileFormat, Map};

fn layered(file: &str, env: &[(&str, &str)]) -> ConfigBuilder<DefaultState> {
    let env: Map<String, String> = env
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

    Config::builder()
        .add_source(File::from_str(file, FileFormat::Toml))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .source(Some(env)),
        )
}

#[test]
fn defaults_apply_without_sources() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr, "127.0.0.1:3001".parse::<SocketAddr>().expect("addr"));
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert!(settings.database.url.is_none());
    assert_eq!(settings.database.max_connections.get(), 8);
    assert_eq!(settings.auth.tenant_header, "x-authenticated-tenant");
}

#[test]
fn sources_layer_file_then_env_then_cli() {
    let builder = layered(
        "[server]\nport = 4000\nhost = \"0.0.0.0\"\n\n[logging]\nlevel = \"warn\"\n\n[database]\nmax_connections = 4\nurl = \"postgres://file\"\n",
        &[
            ("KEYDASH__SERVER__PORT", "4100"),
            ("KEYDASH__DATABASE__MAX_CONNECTIONS", "6"),
            ("KEYDASH__DATABASE__URL", "postgres://env"),
        ],
    );
    let cli = CliArgs::parse_from(["keydash", "serve", "--server-port", "4200"]);

    let settings = load_from(builder, &cli).expect("valid settings");

    assert_eq!(settings.server.addr, "0.0.0.0:4200".parse::<SocketAddr>().expect("addr"));
    assert_eq!(settings.logging.level, LevelFilter::WARN);
    assert_eq!(settings.database.max_connections.get(), 6);
    assert_eq!(settings.database.url.as_deref(), Some("postgres://env"));
}

#[test]
fn invalid_values_name_their_key() {
    let builder = layered("", &[("KEYDASH__DATABASE__MAX_CONNECTIONS", "0")]);
    let cli = CliArgs::parse_from(["keydash"]);

    match load_from(builder, &cli) {
        Err(LoadError::Invalid { key, .. }) => assert_eq!(key, "database.max_connections"),
        other => panic!("expected invalid max connections, got {other:?}"),
    }
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_port_and_bad_level_are_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid { key: "server.port", .. })
    ));

    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid { key: "logging.level", .. })
    ));
}

#[test]
fn tenant_header_is_normalised_and_validated() {
    let mut raw = RawSettings::default();
    raw.auth.tenant_header = Some(" X-Tenant ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.auth.tenant_header, "x-tenant");

    let mut raw = RawSettings::default();
    raw.auth.tenant_header = Some("bad header".to_string());
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid { key: "auth.tenant_header", .. })
    ));
}

#[test]
fn blank_database_url_is_treated_as_absent() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("   ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.database.url.is_none());
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["keydash"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "keydash",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--database-url",
        "postgres://override",
        "--auth-tenant-header",
        "x-org",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.database.database_url.as_deref(),
                Some("postgres://override")
            );
            assert_eq!(serve.overrides.auth_tenant_header.as_deref(), Some("x-org"));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_migrate_arguments() {
    let args = CliArgs::parse_from(["keydash", "migrate", "--database-url", "postgres://example"]);

    match args.command.expect("migrate command") {
        Command::Migrate(migrate) => {
            assert_eq!(
                migrate.database.database_url.as_deref(),
                Some("postgres://example")
            );
        }
        _ => panic!("wrong command parsed"),
    }
}
