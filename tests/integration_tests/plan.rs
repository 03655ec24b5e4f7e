//! `forkspace plan` prints the session plan without touching tmux.

use insta_cmd::assert_cmd_snapshot;

use crate::common::{TestRepo, make_snapshot_cmd, setup_snapshot_settings};

const LAYOUT: &str = r#"
[env]
PORT = 3001

[[windows]]
name = "dev"

[[windows.panes]]
command = "npm run dev"

[[windows.panes]]
command = "npm test"

[[windows]]
name = "logs"
command = "tail -f log/dev.log"
"#;

#[test]
fn test_plan_with_layout() {
    let repo = TestRepo::new();
    repo.write_project_config(LAYOUT);

    setup_snapshot_settings(&repo).bind(|| {
        assert_cmd_snapshot!(
            make_snapshot_cmd(&repo, "plan", &["--session", "app", "--dir", "/src/app"], None),
            @r"
        success: true
        exit_code: 0
        ----- stdout -----
        tmux new-session -d -s app -n dev -e PORT=3001 -c /src/app
        tmux set-environment -t =app PORT 3001
        tmux send-keys -t '=app:dev' 'npm run dev' Enter
        tmux split-window -h -t '=app:dev' -e PORT=3001 -c /src/app
        tmux send-keys -t '=app:dev' 'npm test' Enter
        tmux select-layout -t '=app:dev' tiled
        tmux new-window -t '=app:' -n logs -e PORT=3001 -c /src/app
        tmux send-keys -t '=app:logs' 'tail -f log/dev.log' Enter
        tmux select-window -t '=app:dev'

        ----- stderr -----
        "
        );
    });
}

#[test]
fn test_plan_without_layout_is_single_session() {
    let repo = TestRepo::new();

    setup_snapshot_settings(&repo).bind(|| {
        assert_cmd_snapshot!(
            make_snapshot_cmd(&repo, "plan", &["--session", "app", "--dir", "/src/app"], None),
            @r"
        success: true
        exit_code: 0
        ----- stdout -----
        tmux new-session -d -s app -c /src/app

        ----- stderr -----
        "
        );
    });
}

#[test]
fn test_plan_default_session_name_and_dir() {
    let repo = TestRepo::new();

    setup_snapshot_settings(&repo).bind(|| {
        assert_cmd_snapshot!(make_snapshot_cmd(&repo, "plan", &[], None), @r"
        success: true
        exit_code: 0
        ----- stdout -----
        tmux new-session -d -s repo-main -c [HOME]/repo

        ----- stderr -----
        ");
    });
}

#[test]
fn test_plan_custom_session_template() {
    let repo = TestRepo::new();
    repo.write_user_config("session-name = \"{{ repo }}.{{ branch }}\"\n");

    setup_snapshot_settings(&repo).bind(|| {
        assert_cmd_snapshot!(make_snapshot_cmd(&repo, "plan", &["--dir", "/src/app"], None), @r"
        success: true
        exit_code: 0
        ----- stdout -----
        tmux new-session -d -s repo-main -c /src/app

        ----- stderr -----
        ");
    });
}

#[test]
fn test_plan_rejects_reserved_window_name() {
    let repo = TestRepo::new();
    repo.write_project_config("[[windows]]\nname = \"dev.server\"\n");

    setup_snapshot_settings(&repo).bind(|| {
        assert_cmd_snapshot!(make_snapshot_cmd(&repo, "plan", &[], None), @r"
        success: false
        exit_code: 1
        ----- stdout -----

        ----- stderr -----
        ✗ Invalid window name dev.server
        ↳ Window names cannot contain ':', '.' or '#'
        ");
    });
}

#[test]
fn test_plan_rejects_duplicate_window_name() {
    let repo = TestRepo::new();
    repo.write_project_config("[[windows]]\nname = \"dev\"\n\n[[windows]]\nname = \"dev\"\n");

    setup_snapshot_settings(&repo).bind(|| {
        assert_cmd_snapshot!(make_snapshot_cmd(&repo, "plan", &[], None), @r"
        success: false
        exit_code: 1
        ----- stdout -----

        ----- stderr -----
        ✗ Window dev is declared more than once
        ");
    });
}

#[test]
fn test_plan_outside_repository() {
    let repo = TestRepo::new();
    let home = repo.home_path();

    setup_snapshot_settings(&repo).bind(|| {
        assert_cmd_snapshot!(make_snapshot_cmd(&repo, "plan", &[], Some(&home)), @r"
        success: false
        exit_code: 1
        ----- stdout -----

        ----- stderr -----
        ✗ ~ is not inside a git repository
        ");
    });
}
