use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn version_subcommand_prints_version_and_exits_zero() {
    Command::cargo_bin("webrotor")
        .unwrap()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
