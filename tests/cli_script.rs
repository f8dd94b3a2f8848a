use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("invoice_core_cli").unwrap();
    cmd.env("INVOICE_CORE_HOME", home.path())
        .env("INVOICE_CORE_CLI_SCRIPT", "1")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn script_mode_projects_an_invoice() {
    let home = TempDir::new().unwrap();
    let input = "\
scope new
add single \"Dinner out\" 100.00 2025-06-10
add installment Phone 100.00 2025-05-01 3
add recurring Gym 50 2025-01-01
invoice 2025-06
exit
";

    cli(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Created scope"))
        .stdout(contains("Added installment `Phone`"))
        .stdout(contains("=== Invoice 2025-06 ==="))
        .stdout(contains("2/3"))
        .stdout(contains("R$ 33,33"))
        .stdout(contains("R$ 183,33"))
        .stdout(contains("No spending limit set."));

    assert!(home.path().join("config").join("config.json").exists());
    assert!(home.path().join("transactions").is_dir());
}

#[test]
fn state_persists_between_runs() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .write_stdin("scope new\nadd recurring Rent 1500 2025-01-01\nlimit 1000\n")
        .assert()
        .success();

    cli(&home)
        .write_stdin("invoice 2025-03\nlist\n")
        .assert()
        .success()
        .stdout(contains("R$ 1.500,00"))
        .stdout(contains("Over the R$ 1.000,00 limit by R$ 500,00"))
        .stdout(contains("Rent"));
}

#[test]
fn unknown_commands_get_suggestions() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .write_stdin("invoise 2025-06\nexit\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `invoise`"))
        .stdout(contains("Did you mean `invoice`?"));
}

#[test]
fn command_errors_do_not_stop_the_script() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .write_stdin("invoice 2025-06\nscope new\ninvoice 2025-13\nwindow 2025-06\n")
        .assert()
        .success()
        .stdout(contains("No scope selected"))
        .stdout(contains("Invalid month input: 2025-13"))
        .stdout(contains("start_date >= '2022-06-01'"))
        .stdout(contains("0 candidate rows"));
}

#[test]
fn json_invoice_output() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .write_stdin("scope new\nadd single Coffee 7.5 2025-06-02\ninvoice 2025-06 --json\n")
        .assert()
        .success()
        .stdout(contains("\"status\": \"unlimited\""))
        .stdout(contains("\"total\": \"7.50\""))
        .stdout(contains("\"kind\": \"single\"").and(contains("Coffee")));
}
