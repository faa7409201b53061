use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use clap::Parser;
use annodoc::cli::{Cli, Commands, InitArgs};
use predicates::prelude::*;

mod util;

#[test]
fn init_flag_parsing() {
    // Given
    let argv = vec!["annodoc", "init", "conf", "--force", "--log", "trace.log"];

    // When
    let cmd = Cli::parse_from(argv);

    // Then
    assert!(cmd.log.is_some_and(|p| p.ends_with("trace.log")));
    match cmd.command {
        Commands::Init(InitArgs { path, force }) => {
            assert!(force);
            assert!(path.ends_with("conf"));
        }
        _ => panic!("expected Init command"),
    }
}

#[test]
fn init_writes_defaults_once() {
    let tmp = util::make_gopath();

    util::annodoc(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config file"));

    tmp.child("annodoc.toml")
        .assert(predicate::str::contains("[render]").and(predicate::str::contains("text_width = 76")));

    util::annodoc(&tmp)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    util::annodoc(&tmp).args(["init", "--force", "--quiet"]).assert().success().stdout("");
}

#[test]
fn log_file_receives_diagnostics() {
    let tmp = util::make_gopath();

    util::annodoc(&tmp)
        .env("RUST_LOG", "annodoc=info")
        .args(["--log", "run.log", "doc", "example.com/hello"])
        .assert()
        .success();

    tmp.child("run.log").assert(predicate::str::contains("rendered package"));
}
