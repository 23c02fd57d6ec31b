//! Integration tests for layered loading into typed targets

use envlayer::{
    load, ConfigLoader, ConfigType, DirSource, EnvVars, Environment, LoadError, LoadRequest,
    MemorySource,
};
use serde::Deserialize;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Deserialize, PartialEq)]
struct AppConfig {
    name: String,
    db: DbConfig,
    #[serde(default)]
    features: Vec<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct DbConfig {
    host: String,
    port: u16,
    password: Option<String>,
}

const BASE_YAML: &str = "\
name: orders
db:
  host: localhost
  port: 5432
features: [audit]
";

fn yaml_request() -> LoadRequest {
    LoadRequest::new("ORDERS_ENV", "dev", "orders", ConfigType::Yaml)
        .secrets_dir_key("ORDERS_SECRETS_DIR")
}

#[test]
fn typed_target_follows_full_precedence_chain() {
    let configs = TempDir::new().expect("configs");
    fs::write(configs.path().join("base.yaml"), BASE_YAML).expect("base");
    fs::write(configs.path().join("prod.yaml"), "db:\n  host: db.internal\n  password: changeme\n")
        .expect("prod");

    let secrets = TempDir::new().expect("secrets");
    fs::create_dir_all(secrets.path().join("db")).expect("mkdir");
    fs::write(secrets.path().join("db/ORDERS_db_password"), "s3cret").expect("secret");

    let vars: EnvVars = [
        ("ORDERS_ENV", "prod".to_string()),
        ("ORDERS_DB_PORT", "6432".to_string()),
        ("ORDERS_DB_PASSWORD", "from-env".to_string()),
        ("ORDERS_SECRETS_DIR", secrets.path().to_string_lossy().into_owned()),
    ]
    .into_iter()
    .collect();

    let loaded = ConfigLoader::new(yaml_request())
        .load_with_env(&DirSource::new(configs.path()), "base", &vars)
        .expect("load");
    let config: AppConfig = loaded.extract().expect("decode");

    assert_eq!(loaded.environment(), Environment::Production);
    assert_eq!(
        config,
        AppConfig {
            name: "orders".to_string(),
            db: DbConfig {
                host: "db.internal".to_string(),
                port: 6432,
                password: Some("s3cret".to_string()),
            },
            features: vec!["audit".to_string()],
        }
    );
}

#[test]
fn secret_values_are_not_trimmed() {
    let secrets = TempDir::new().expect("secrets");
    fs::write(secrets.path().join("ORDERS_db_password"), "line\n").expect("secret");
    let source = MemorySource::new().with_file("base.yaml", BASE_YAML).with_file("dev.yaml", "");
    let vars: EnvVars =
        [("ORDERS_SECRETS_DIR", secrets.path().to_string_lossy().into_owned())]
            .into_iter()
            .collect();

    let loaded =
        ConfigLoader::new(yaml_request()).load_with_env(&source, "base", &vars).expect("load");
    let db: DbConfig = loaded.extract_inner("db").expect("db");
    assert_eq!(db.password.as_deref(), Some("line\n"));
}

#[test]
fn yml_extension_is_distinct_from_yaml() {
    let source = MemorySource::new().with_file("base.yaml", BASE_YAML).with_file("dev.yaml", "");
    let request = LoadRequest::new("ORDERS_ENV", "dev", "orders", ConfigType::Yml);

    let err = ConfigLoader::new(request)
        .load_with_env(&source, "base", &EnvVars::default())
        .unwrap_err();
    match err {
        LoadError::Read { name, .. } => assert_eq!(name, "base.yml"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn decode_error_names_the_missing_field() {
    let source = MemorySource::new()
        .with_file("base.json", r#"{"name":"orders","db":{"host":"h"}}"#)
        .with_file("test.json", "{}");
    let request = LoadRequest::new("ORDERS_ENV", "test", "orders", ConfigType::Json);

    let loaded = ConfigLoader::new(request)
        .load_with_env(&source, "base", &EnvVars::default())
        .expect("load");
    let LoadError::Decode(inner) = loaded.extract::<AppConfig>().unwrap_err() else {
        panic!("expected a decode error");
    };
    assert!(inner.to_string().contains("port"), "{inner}");
}

#[test]
fn load_returns_environment_with_config() {
    let configs = TempDir::new().expect("configs");
    fs::write(configs.path().join("base.toml"), "name = \"orders\"\n[db]\nhost = \"h\"\nport = 1\n")
        .expect("base");
    fs::write(configs.path().join("staging.toml"), "[db]\nport = 2\n").expect("staging");

    // Variable names nothing else sets, so the real process environment is safe to use.
    let request = LoadRequest::new(
        "ENVLAYER_LOADER_TEST_UNSET_ENV",
        "staging",
        "envlayerloadertestunset",
        ConfigType::Toml,
    );
    let loaded =
        load::<AppConfig>(&request, &DirSource::new(configs.path()), "base").expect("load");

    assert!(loaded.environment.is_staging());
    assert_eq!(loaded.config.db.port, 2);
    assert!(loaded.config.features.is_empty());
}
