//! `forkspace state id` and `forkspace state fork` against a fake storage root.

use std::path::{Path, PathBuf};

use forkspace::editor_state::compute_identity;
use insta_cmd::assert_cmd_snapshot;
use rusqlite::Connection;

use crate::common::{
    TestRepo, forkspace_command, make_snapshot_cmd, setup_snapshot_settings, stderr, stdout,
};

struct Fixture {
    repo: TestRepo,
    source: PathBuf,
    target: PathBuf,
    storage: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let repo = TestRepo::new();
        let home = repo.home_path();
        let source = home.join("src").join("app");
        let target = home.join("src").join("app.feature");
        let storage = home.join("workspaceStorage");
        for dir in [&source, &target, &storage] {
            std::fs::create_dir_all(dir).unwrap();
        }
        Self {
            repo,
            source,
            target,
            storage,
        }
    }

    /// Give `source` editor state with one path-bearing row.
    fn seed_source_state(&self) -> PathBuf {
        let dir = self.storage.join(compute_identity(&self.source).unwrap());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("workspace.json"), r#"{"folder":"file:///old"}"#).unwrap();

        let conn = Connection::open(dir.join("state.vscdb")).unwrap();
        conn.execute(
            "CREATE TABLE ItemTable (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO ItemTable (key, value) VALUES (?1, ?2)",
            (
                "history.entries",
                format!(r#"[{{"path":"{}/src/main.rs"}}]"#, self.source.display()),
            ),
        )
        .unwrap();
        dir
    }

    fn fork_cmd(&self) -> std::process::Command {
        let source = self.source.to_string_lossy();
        let target = self.target.to_string_lossy();
        let storage = self.storage.to_string_lossy();
        make_snapshot_cmd(
            &self.repo,
            "state",
            &["fork", &source, &target, "--storage-dir", &storage],
            None,
        )
    }

    fn fork(&self) -> std::process::Output {
        self.fork_cmd().output().unwrap()
    }
}

fn state_id(home: &Path, folder: &Path) -> std::process::Output {
    let mut cmd = forkspace_command(home);
    cmd.args(["state", "id"]).arg(folder);
    cmd.output().unwrap()
}

#[test]
fn test_state_id_matches_library() {
    let fixture = Fixture::new();
    let output = state_id(&fixture.repo.home_path(), &fixture.source);
    assert!(output.status.success(), "{}", stderr(&output));

    let id = stdout(&output).trim().to_string();
    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_eq!(id, compute_identity(&fixture.source).unwrap());
}

#[test]
fn test_state_id_distinct_folders() {
    let fixture = Fixture::new();
    let home = fixture.repo.home_path();
    let a = stdout(&state_id(&home, &fixture.source));
    let b = stdout(&state_id(&home, &fixture.target));
    assert_ne!(a, b);
}

#[test]
fn test_state_id_missing_folder() {
    let fixture = Fixture::new();
    let missing = fixture.source.join("nope");
    let missing = missing.to_string_lossy();

    setup_snapshot_settings(&fixture.repo).bind(|| {
        assert_cmd_snapshot!(make_snapshot_cmd(&fixture.repo, "state", &["id", &missing], None), @r"
        success: false
        exit_code: 1
        ----- stdout -----

        ----- stderr -----
        ✗ Folder ~/src/app/nope does not exist
        ");
    });
}

#[test]
fn test_state_fork_copies_and_rewrites() {
    let fixture = Fixture::new();
    fixture.seed_source_state();

    setup_snapshot_settings(&fixture.repo).bind(|| {
        assert_cmd_snapshot!(fixture.fork_cmd(), @r#"
        success: true
        exit_code: 0
        ----- stdout -----
        {
          "success": true,
          "skipped": false,
          "source_id": "[ID]",
          "target_id": "[ID]",
          "stats": {
            "paths_rewritten": 1,
            "editors_pruned": 0,
            "terminal_keys_cleared": 0,
            "agent_rows_cleared": 0
          }
        }

        ----- stderr -----
        ✓ Forked editor state into ~/src/app.feature (1 paths, 0 editors pruned)
        "#);
    });

    let target_id = compute_identity(&fixture.target).unwrap();
    let target_dir = fixture.storage.join(&target_id);
    let pointer = std::fs::read_to_string(target_dir.join("workspace.json")).unwrap();
    assert!(pointer.contains("app.feature"), "{pointer}");

    let conn = Connection::open(target_dir.join("state.vscdb")).unwrap();
    let value: String = conn
        .query_row(
            "SELECT value FROM ItemTable WHERE key = 'history.entries'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(value.contains(&format!("{}/src/main.rs", fixture.target.display())));

    let staging = fixture.storage.join(format!("{target_id}.forkspace-tmp"));
    assert!(!staging.exists());
}

#[test]
fn test_state_fork_skips_existing_target() {
    let fixture = Fixture::new();
    fixture.seed_source_state();
    assert!(fixture.fork().status.success());

    setup_snapshot_settings(&fixture.repo).bind(|| {
        assert_cmd_snapshot!(fixture.fork_cmd(), @r#"
        success: true
        exit_code: 0
        ----- stdout -----
        {
          "success": true,
          "skipped": true,
          "source_id": "[ID]",
          "target_id": "[ID]",
          "stats": {
            "paths_rewritten": 0,
            "editors_pruned": 0,
            "terminal_keys_cleared": 0,
            "agent_rows_cleared": 0
          }
        }

        ----- stderr -----
        ○ ~/src/app.feature already has editor state
        "#);
    });
}

#[test]
fn test_state_fork_without_source_state_fails() {
    let fixture = Fixture::new();

    setup_snapshot_settings(&fixture.repo).bind(|| {
        assert_cmd_snapshot!(fixture.fork_cmd(), @r#"
        success: false
        exit_code: 1
        ----- stdout -----
        {
          "success": false,
          "skipped": false,
          "error": "✗ No editor state for ~/src/app (workspace [ID])\n↳ Expected ~/workspaceStorage/[ID]; open the folder in the editor once first",
          "source_id": "[ID]",
          "stats": {
            "paths_rewritten": 0,
            "editors_pruned": 0,
            "terminal_keys_cleared": 0,
            "agent_rows_cleared": 0
          }
        }

        ----- stderr -----
        ✗ Failed to fork editor state
          │ ✗ No editor state for ~/src/app (workspace [ID])
          │ ↳ Expected ~/workspaceStorage/[ID]; open the folder in the editor once first
        "#);
    });
}
