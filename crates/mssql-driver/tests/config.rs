//! Builder API edge case tests.
//!
//! This driver has no connection-string parser, so these cases exercise the
//! `Config` builder directly instead: defaults, overrides, and the LOGIN7
//! packet it produces.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use mssql_driver::Config;

#[test]
fn defaults_are_unset_credentials_on_localhost() {
    let config = Config::default();
    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 1433);
    assert_eq!(config.user_name, "");
    assert_eq!(config.password, "");
    assert_eq!(config.db_name, "");
    assert_eq!(config.packet_size, 4096);
    assert_eq!(config.connect_timeout, Duration::from_secs(15));
    assert_eq!(config.command_timeout, Duration::from_secs(30));
}

#[test]
fn new_sets_host_user_and_password_only() {
    let config = Config::new("myserver", "sa", "hunter2");
    assert_eq!(config.host, "myserver");
    assert_eq!(config.user_name, "sa");
    assert_eq!(config.password, "hunter2");
    assert_eq!(config.db_name, "");
    assert_eq!(config.port, 1433);
}

#[test]
fn new_accepts_owned_and_borrowed_strings() {
    let owned = Config::new("myserver".to_string(), "sa".to_string(), "hunter2".to_string());
    let borrowed = Config::new("myserver", "sa", "hunter2");
    assert_eq!(owned.host, borrowed.host);
    assert_eq!(owned.user_name, borrowed.user_name);
}

#[test]
fn port_builder_overrides_default() {
    let config = Config::new("myserver", "sa", "hunter2").port(1434);
    assert_eq!(config.port, 1434);
}

#[test]
fn database_builder_sets_initial_catalog() {
    let config = Config::new("myserver", "sa", "hunter2").database("mydb");
    assert_eq!(config.db_name, "mydb");
}

#[test]
fn application_name_builder_sets_app_name() {
    let config = Config::new("myserver", "sa", "hunter2").application_name("my-service");
    assert_eq!(config.app_name, "my-service");
}

#[test]
fn packet_size_builder_overrides_default() {
    let config = Config::new("myserver", "sa", "hunter2").packet_size(8192);
    assert_eq!(config.packet_size, 8192);
}

#[test]
fn timeout_builders_override_defaults() {
    let config = Config::new("myserver", "sa", "hunter2")
        .connect_timeout(Duration::from_secs(30))
        .command_timeout(Duration::from_secs(120));
    assert_eq!(config.connect_timeout, Duration::from_secs(30));
    assert_eq!(config.command_timeout, Duration::from_secs(120));
}

#[test]
fn builders_chain_and_apply_independently() {
    let config = Config::new("azuresql.database.windows.net", "admin@myserver", "P@ssw0rd!")
        .port(1434)
        .database("mydb")
        .application_name("MyApp")
        .packet_size(8192)
        .connect_timeout(Duration::from_secs(30));

    assert_eq!(config.host, "azuresql.database.windows.net");
    assert_eq!(config.user_name, "admin@myserver");
    assert_eq!(config.password, "P@ssw0rd!");
    assert_eq!(config.port, 1434);
    assert_eq!(config.db_name, "mydb");
    assert_eq!(config.app_name, "MyApp");
    assert_eq!(config.packet_size, 8192);
    assert_eq!(config.connect_timeout, Duration::from_secs(30));
}

#[test]
fn repeated_builder_calls_last_wins() {
    let config = Config::new("first", "sa", "pw")
        .database("db1")
        .database("db2")
        .database("db3");
    assert_eq!(config.db_name, "db3");
}

#[test]
fn empty_password_is_allowed_at_the_type_level() {
    // Whether an empty password is acceptable is a server-side policy
    // question, not something `Config` validates.
    let config = Config::new("myserver", "sa", "");
    assert_eq!(config.password, "");
}

#[test]
fn to_login7_round_trips_every_builder_field() {
    let config = Config::new("myserver", "sa", "hunter2")
        .database("mydb")
        .application_name("my-app");
    let login7 = config.to_login7();

    assert_eq!(login7.server_name, "myserver");
    assert_eq!(login7.user_name, "sa");
    assert_eq!(login7.password, "hunter2");
    assert_eq!(login7.db_name, "mydb");
    assert_eq!(login7.app_name, "my-app");
    assert_eq!(login7.tds_version, config.tds_version);
    assert_eq!(login7.packet_size, u32::from(config.packet_size));
}

#[test]
fn clone_is_independent_of_the_original() {
    let original = Config::new("myserver", "sa", "hunter2");
    let mut cloned = original.clone();
    cloned = cloned.database("cloned-db");

    assert_eq!(original.db_name, "");
    assert_eq!(cloned.db_name, "cloned-db");
}
