//! Black-box checks against the compiled `yae` binary, grounded on the
//! teacher's `cli/tests/cli_tool_cmd.rs` (run the binary, assert on
//! stdout/exit status). Each invocation seeds its own in-process `Yae`
//! instance, so these only assert on what a single run prints — not on
//! state persisting across invocations.

use std::process::Command;

fn run_yae(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_yae"))
        .args(args)
        .output()
        .expect("failed to run yae binary")
}

#[test]
fn cli_help_succeeds() {
    let out = run_yae(&["--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("yae"));
    assert!(stdout.contains("admin"));
    assert!(stdout.contains("chat"));
}

#[test]
fn cli_admin_create_user_prints_a_token_once() {
    let out = run_yae(&["admin", "create-user", "ada"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("created user"));
    assert!(stdout.contains("token:"));
}

#[test]
fn cli_admin_list_users_shows_the_seeded_admin() {
    let out = run_yae(&["admin", "list-users"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Admin"));
}

#[test]
fn cli_chat_echoes_the_message() {
    let out = run_yae(&["chat", "hello from the cli"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("you said: hello from the cli"));
}
