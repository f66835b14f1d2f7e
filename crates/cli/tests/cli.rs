use assert_cmd::Command;

#[test]
fn help_lists_subcommands() {
    let output = Command::cargo_bin("bookshelf")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["serve", "migrate", "config"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
}

#[test]
fn unknown_environment_fails_to_load() {
    Command::cargo_bin("bookshelf")
        .unwrap()
        .arg("config")
        .env("BOOKSHELF_ENV", "moon")
        .assert()
        .failure();
}
