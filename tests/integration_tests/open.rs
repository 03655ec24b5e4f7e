//! `forkspace open` with the session and editor steps switched off.

use forkspace::editor_state::compute_identity;
use insta_cmd::assert_cmd_snapshot;

use crate::common::{TestRepo, make_snapshot_cmd, setup_snapshot_settings};

const NO_SESSION_OR_EDITOR: &[&str] = &["--no-session", "--no-editor"];

fn open_args<'a>(args: &[&'a str]) -> Vec<&'a str> {
    let mut all = args.to_vec();
    all.extend_from_slice(NO_SESSION_OR_EDITOR);
    all
}

#[test]
fn test_open_creates_worktree_and_copies_files() {
    let repo = TestRepo::new();
    repo.write_project_config("copy = [\".env\", \"missing.txt\"]\n");
    std::fs::write(repo.root_path().join(".env"), "SECRET=1\n").unwrap();

    setup_snapshot_settings(&repo).bind(|| {
        assert_cmd_snapshot!(make_snapshot_cmd(&repo, "open", &open_args(&["feature", "--create"]), None), @r"
        success: true
        exit_code: 0
        ----- stdout -----

        ----- stderr -----
        ◎ Creating worktree for feature...
        ✓ Created worktree for feature at ~/repo.feature
        ▲ Not copying missing.txt: not found
        ✓ Copied 1 configured paths
        ");
    });

    let worktree = repo.home_path().join("repo.feature");
    assert_eq!(
        std::fs::read_to_string(worktree.join(".env")).unwrap(),
        "SECRET=1\n"
    );
    let listing = repo.git(&["worktree", "list", "--porcelain"]);
    assert!(listing.contains("branch refs/heads/feature"), "{listing}");
}

#[test]
fn test_open_worktree_path_template() {
    let repo = TestRepo::new();
    repo.write_user_config("worktree-path = \"trees/{{ branch | sanitize }}\"\n");

    let output = make_snapshot_cmd(&repo, "open", &open_args(&["feature/auth", "--create"]), None)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(repo.root_path().join("trees/feature-auth/.git").exists());
}

#[test]
fn test_open_setup_failure_is_deferred() {
    let repo = TestRepo::new();
    repo.write_project_config(
        r#"
[setup]
marker = "touch setup-ran"
fail = "exit 3"
never = "touch never-ran"
"#,
    );

    setup_snapshot_settings(&repo).bind(|| {
        assert_cmd_snapshot!(make_snapshot_cmd(&repo, "open", &open_args(&["feature", "--create"]), None), @r"
        success: false
        exit_code: 3
        ----- stdout -----

        ----- stderr -----
        ◎ Creating worktree for feature...
        ✓ Created worktree for feature at ~/repo.feature
        ◎ Running setup marker
          │ touch setup-ran
        ◎ Running setup fail
          │ exit 3
        ▲ Setup stopped early, continuing with the session
        ✗ Setup command fail failed (exit code 3)
          │ exit 3
        ");
    });

    let worktree = repo.home_path().join("repo.feature");
    assert!(worktree.join("setup-ran").exists());
    assert!(!worktree.join("never-ran").exists());
}

#[test]
fn test_open_skip_setup() {
    let repo = TestRepo::new();
    repo.write_project_config("setup = \"touch setup-ran\"\n");

    setup_snapshot_settings(&repo).bind(|| {
        assert_cmd_snapshot!(make_snapshot_cmd(&repo, "open", &open_args(&["feature", "--create", "--no-setup"]), None), @r"
        success: true
        exit_code: 0
        ----- stdout -----

        ----- stderr -----
        ◎ Creating worktree for feature...
        ✓ Created worktree for feature at ~/repo.feature
        ○ Skipping setup commands (--no-setup)
        ");
    });

    assert!(!repo.home_path().join("repo.feature/setup-ran").exists());
}

#[test]
fn test_open_missing_branch_requires_create() {
    let repo = TestRepo::new();

    setup_snapshot_settings(&repo).bind(|| {
        assert_cmd_snapshot!(make_snapshot_cmd(&repo, "open", &open_args(&["nope"]), None), @r"
        success: false
        exit_code: 1
        ----- stdout -----

        ----- stderr -----
        ✗ Branch nope not found
        ↳ To create it, run forkspace open --create nope
        ");
    });

    assert!(!repo.home_path().join("repo.nope").exists());
}

#[test]
fn test_open_existing_branch_with_create_fails() {
    let repo = TestRepo::new();
    repo.git(&["branch", "feature"]);

    setup_snapshot_settings(&repo).bind(|| {
        assert_cmd_snapshot!(make_snapshot_cmd(&repo, "open", &open_args(&["feature", "--create"]), None), @r"
        success: false
        exit_code: 1
        ----- stdout -----

        ----- stderr -----
        ✗ Branch feature already exists; drop --create to open it
        ");
    });
}

#[test]
fn test_open_reuses_existing_worktree() {
    let repo = TestRepo::new();
    repo.write_project_config("setup = \"touch setup-ran\"\ncopy = [\".env\"]\n");
    std::fs::write(repo.root_path().join(".env"), "SECRET=1\n").unwrap();
    let feature = repo.home_path().join("repo.feature");
    repo.git(&["worktree", "add", "-q", "-b", "feature", feature.to_str().unwrap()]);

    setup_snapshot_settings(&repo).bind(|| {
        assert_cmd_snapshot!(make_snapshot_cmd(&repo, "open", &open_args(&["feature", "--create"]), None), @r"
        success: true
        exit_code: 0
        ----- stdout -----

        ----- stderr -----
        ▲ Branch feature already has a worktree, ignoring --create
        ○ Using worktree ~/repo.feature
        ");
    });

    // Only new worktrees are set up
    assert!(!feature.join("setup-ran").exists());
    assert!(!feature.join(".env").exists());
}

#[test]
#[cfg(unix)]
fn test_open_forks_state_through_symlinked_checkout() {
    let repo = TestRepo::new();
    let home = repo.home_path();
    let link = home.join("link-repo");
    std::os::unix::fs::symlink(repo.root_path(), &link).unwrap();

    let storage = home.join("workspaceStorage");
    let source_dir = storage.join(compute_identity(&link).unwrap());
    std::fs::create_dir_all(&source_dir).unwrap();
    std::fs::write(source_dir.join("marker"), "state").unwrap();
    repo.write_user_config(&format!("editor-storage-dir = \"{}\"\n", storage.display()));

    let mut cmd = make_snapshot_cmd(
        &repo,
        "open",
        &open_args(&["feature", "--create", "--fork-state"]),
        Some(&link),
    );
    cmd.env("PWD", &link);

    setup_snapshot_settings(&repo).bind(|| {
        assert_cmd_snapshot!(cmd, @r"
        success: true
        exit_code: 0
        ----- stdout -----

        ----- stderr -----
        ◎ Creating worktree for feature...
        ✓ Created worktree for feature at ~/repo.feature
        ✓ Forked editor state into ~/repo.feature (0 paths, 0 editors pruned)
        ");
    });

    let target_dir = storage.join(compute_identity(&home.join("repo.feature")).unwrap());
    assert_eq!(
        std::fs::read_to_string(target_dir.join("marker")).unwrap(),
        "state"
    );
}
