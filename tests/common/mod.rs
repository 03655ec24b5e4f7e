//! Shared fixtures for integration tests.
//!
//! Every command runs with an isolated user config, git config and HOME so the
//! developer's own setup never leaks into results.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// `forkspace` with a scrubbed, deterministic environment.
pub fn forkspace_command(home: &Path) -> Command {
    let mut cmd = Command::new(insta_cmd::get_cargo_bin("forkspace"));
    configure_cli_command(&mut cmd, home);
    cmd
}

/// `forkspace <subcommand> <args>` ready for `assert_cmd_snapshot!`.
///
/// Runs from the repository root unless `cwd` is given.
pub fn make_snapshot_cmd(
    repo: &TestRepo,
    subcommand: &str,
    args: &[&str],
    cwd: Option<&Path>,
) -> Command {
    let mut cmd = forkspace_command(&repo.home_path());
    cmd.arg(subcommand)
        .args(args)
        .current_dir(cwd.unwrap_or(repo.root_path()));
    cmd
}

/// Snapshot filters for paths and hashes that change between runs.
///
/// The temp home becomes `[HOME]`, workspace identities `[ID]` and short
/// commit hashes `[SHA]`. Paths under home already print as `~/...`.
pub fn setup_snapshot_settings(repo: &TestRepo) -> insta::Settings {
    let mut settings = insta::Settings::clone_current();
    let home = repo.home_path();
    settings.add_filter(&regex::escape(&home.display().to_string()), "[HOME]");
    settings.add_filter(r"\b[0-9a-f]{32}\b", "[ID]");
    settings.add_filter(r"\b[0-9a-f]{7}\b", "[SHA]");
    settings
}

pub fn configure_cli_command(cmd: &mut Command, home: &Path) {
    for (key, _) in std::env::vars() {
        if key.starts_with("FORKSPACE_") || key == "TMUX" {
            cmd.env_remove(&key);
        }
    }
    cmd.env("FORKSPACE_CONFIG_PATH", home.join("test-config.toml"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("CLICOLOR_FORCE");
    cmd.env("RUST_LOG", "warn");
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home.join(".config"));
    configure_git_env(cmd, home);
}

fn configure_git_env(cmd: &mut Command, home: &Path) {
    cmd.env("GIT_CONFIG_GLOBAL", home.join("test-gitconfig"));
    cmd.env("GIT_CONFIG_SYSTEM", "/dev/null");
    cmd.env("GIT_AUTHOR_NAME", "Test");
    cmd.env("GIT_AUTHOR_EMAIL", "test@example.com");
    cmd.env("GIT_COMMITTER_NAME", "Test");
    cmd.env("GIT_COMMITTER_EMAIL", "test@example.com");
    cmd.env("GIT_AUTHOR_DATE", "2025-01-01T00:00:00Z");
    cmd.env("GIT_COMMITTER_DATE", "2025-01-01T00:00:00Z");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd.env("LC_ALL", "C");
}

/// A repository named `repo` with one commit on `main`.
///
/// ```text
/// home_path()/
/// ├── repo/               # root_path()
/// ├── test-config.toml    # FORKSPACE_CONFIG_PATH target
/// └── test-gitconfig      # GIT_CONFIG_GLOBAL target
/// ```
pub struct TestRepo {
    temp_dir: TempDir,
    root: PathBuf,
}

impl TestRepo {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let home = dunce::canonicalize(temp_dir.path()).unwrap();
        std::fs::write(home.join("test-gitconfig"), "").unwrap();
        let root = home.join("repo");
        std::fs::create_dir_all(&root).unwrap();

        let repo = Self { temp_dir, root };
        repo.git(&["init", "-q", "-b", "main"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.git(&["commit", "-q", "--allow-empty", "-m", "init"]);
        repo
    }

    pub fn home_path(&self) -> PathBuf {
        dunce::canonicalize(self.temp_dir.path()).unwrap()
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    pub fn git(&self, args: &[&str]) -> String {
        let mut cmd = Command::new("git");
        configure_git_env(&mut cmd, &self.home_path());
        let output = cmd.args(args).current_dir(&self.root).output().unwrap();
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    pub fn write_project_config(&self, contents: &str) {
        let dir = self.root.join(".config");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("forkspace.toml"), contents).unwrap();
    }

    pub fn write_user_config(&self, contents: &str) {
        std::fs::write(self.home_path().join("test-config.toml"), contents).unwrap();
    }

    /// `forkspace <args>` run from the repository root.
    pub fn run(&self, args: &[&str]) -> Output {
        let mut cmd = forkspace_command(&self.home_path());
        cmd.args(args).current_dir(&self.root);
        cmd.output().unwrap()
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
