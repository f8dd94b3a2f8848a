use std::{env, process::Command};

const PREFIX: &str = "INVOICE_CORE_BUILD";

fn main() {
    for watched in ["build.rs", ".git/HEAD", ".git/refs"] {
        println!("cargo:rerun-if-changed={watched}");
    }

    let git_status = command_stdout("git", &["status", "--porcelain"])
        .map(|changes| if changes.is_empty() { "clean" } else { "dirty" })
        .unwrap_or("unknown");

    let stamps = [
        ("HASH", command_stdout("git", &["rev-parse", "--short", "HEAD"])),
        ("STATUS", Some(git_status.to_string())),
        (
            "TIMESTAMP",
            Some(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
        ),
        ("TARGET", env::var("TARGET").ok()),
        ("PROFILE", env::var("PROFILE").ok()),
        ("RUSTC", command_stdout("rustc", &["--version"])),
    ];

    for (key, value) in stamps {
        let value = value
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        println!("cargo:rustc-env={PREFIX}_{key}={value}");
    }
}

/// Trimmed stdout of a successful command.
fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|text| text.trim().to_string())
}
