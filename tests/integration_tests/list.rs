use insta_cmd::assert_cmd_snapshot;

use crate::common::{TestRepo, make_snapshot_cmd, setup_snapshot_settings, stderr, stdout};

#[test]
fn test_list_json() {
    let repo = TestRepo::new();
    let feature = repo.home_path().join("repo.feature");
    repo.git(&["worktree", "add", "-q", "-b", "feature", feature.to_str().unwrap()]);

    let output = repo.run(&["list", "--json"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let items: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["branch"], "main");
    assert_eq!(items[0]["current"], true);
    assert_eq!(items[0]["session"], "repo-main");
    assert_eq!(items[1]["branch"], "feature");
    assert_eq!(items[1]["current"], false);
    assert_eq!(items[1]["session_running"], false);
}

#[test]
fn test_list_marks_current_worktree() {
    let repo = TestRepo::new();
    let feature = repo.home_path().join("repo.feature");
    repo.git(&["worktree", "add", "-q", "-b", "feature", feature.to_str().unwrap()]);

    setup_snapshot_settings(&repo).bind(|| {
        assert_cmd_snapshot!(make_snapshot_cmd(&repo, "list", &[], None), @r"
        success: true
        exit_code: 0
        ----- stdout -----
        @ main [SHA] ~/repo
          feature [SHA] ~/repo.feature

        ----- stderr -----
        ");
    });
}

#[test]
fn test_list_from_linked_worktree() {
    let repo = TestRepo::new();
    let feature = repo.home_path().join("repo.feature");
    repo.git(&["worktree", "add", "-q", "-b", "feature", feature.to_str().unwrap()]);

    setup_snapshot_settings(&repo).bind(|| {
        assert_cmd_snapshot!(make_snapshot_cmd(&repo, "list", &[], Some(&feature)), @r"
        success: true
        exit_code: 0
        ----- stdout -----
          main [SHA] ~/repo
        @ feature [SHA] ~/repo.feature

        ----- stderr -----
        ");
    });
}
