//! End-to-end reconcile runs against a real temporary directory.

use pretty_assertions::assert_eq;
use reconcile_core::{
    DesiredState, ErrorKind, ReconcileOptions, ReconcileResult, reconcile,
};
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn state(path: &Path, content: &str) -> DesiredState {
    DesiredState::new(path.to_str().unwrap(), content).unwrap()
}

fn run(path: &Path, content: &str) -> ReconcileResult {
    reconcile(&state(path, content), &ReconcileOptions::default()).unwrap()
}

fn dry(path: &Path, content: &str) -> ReconcileResult {
    reconcile(&state(path, content), &ReconcileOptions::dry_run()).unwrap()
}

fn target(temp: &TempDir) -> PathBuf {
    temp.path().join("a.txt")
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_create_absent_file() {
    let temp = TempDir::new().unwrap();
    let path = target(&temp);

    let result = run(&path, "hello");

    assert_eq!(result.dest, path.to_str().unwrap());
    assert!(result.changed);
    assert_eq!(fs::read(&path).unwrap(), b"hello");
}

#[test]
fn scenario_repeat_is_unchanged() {
    let temp = TempDir::new().unwrap();
    let path = target(&temp);
    run(&path, "hello");

    let result = run(&path, "hello");

    assert!(!result.changed);
    assert_eq!(fs::read(&path).unwrap(), b"hello");
}

#[test]
fn scenario_new_content_overwrites() {
    let temp = TempDir::new().unwrap();
    let path = target(&temp);
    run(&path, "hello");

    let result = run(&path, "world");

    assert!(result.changed);
    assert_eq!(fs::read(&path).unwrap(), b"world");
}

#[test]
fn scenario_dry_run_on_absent_path_creates_nothing() {
    let temp = TempDir::new().unwrap();
    let path = target(&temp);

    let result = dry(&path, "hello");

    assert!(result.changed);
    assert!(fs::symlink_metadata(&path).is_err(), "dry run must not create the entry");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn scenario_dry_run_on_matching_file_is_unchanged() {
    let temp = TempDir::new().unwrap();
    let path = target(&temp);
    fs::write(&path, "world").unwrap();
    let before = fs::metadata(&path).unwrap().modified().unwrap();

    let result = dry(&path, "world");

    assert!(!result.changed);
    assert_eq!(fs::read(&path).unwrap(), b"world");
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
}

// ============================================================================
// Properties on concrete inputs
// ============================================================================

#[test]
fn empty_content_creates_zero_length_file() {
    let temp = TempDir::new().unwrap();
    let path = target(&temp);

    let result = run(&path, "");

    assert!(result.changed);
    let metadata = fs::metadata(&path).unwrap();
    assert!(metadata.is_file());
    assert_eq!(metadata.len(), 0);

    assert!(!run(&path, "").changed);
}

#[rstest]
#[case::trailing_newline("hello\n", "hello")]
#[case::trailing_space("hello ", "hello")]
#[case::crlf("a\r\nb", "a\nb")]
#[case::case("Hello", "hello")]
#[case::shorter("hello world", "hello")]
fn single_byte_differences_force_overwrite(#[case] on_disk: &str, #[case] wanted: &str) {
    let temp = TempDir::new().unwrap();
    let path = target(&temp);
    fs::write(&path, on_disk).unwrap();

    let result = run(&path, wanted);

    assert!(result.changed);
    assert_eq!(fs::read(&path).unwrap(), wanted.as_bytes());
}

#[test]
fn dry_run_matches_real_run_verdict() {
    let temp = TempDir::new().unwrap();
    let path = target(&temp);
    fs::write(&path, "old").unwrap();

    let predicted = dry(&path, "new");
    assert_eq!(fs::read(&path).unwrap(), b"old");
    let actual = run(&path, "new");

    assert_eq!(predicted, actual);
}

#[test]
fn non_utf8_file_is_overwritten() {
    let temp = TempDir::new().unwrap();
    let path = target(&temp);
    fs::write(&path, [0xffu8, 0xfe, 0x00]).unwrap();

    let result = run(&path, "text");

    assert!(result.changed);
    assert_eq!(fs::read(&path).unwrap(), b"text");
}

// ============================================================================
// Diff reporting
// ============================================================================

#[test]
fn diff_is_attached_when_requested() {
    let temp = TempDir::new().unwrap();
    let path = target(&temp);
    fs::write(&path, "one\ntwo\n").unwrap();
    let options = ReconcileOptions::dry_run().with_diff(true);

    let result = reconcile(&state(&path, "one\nthree\n"), &options).unwrap();

    let diff = result.diff.expect("diff requested for a change");
    assert_eq!(diff.before, "one\ntwo\n");
    assert_eq!(diff.after, "one\nthree\n");
    assert!(diff.unified.contains("-two"));
    assert!(diff.unified.contains("+three"));
}

#[test]
fn diff_is_absent_for_noop_and_when_not_requested() {
    let temp = TempDir::new().unwrap();
    let path = target(&temp);
    fs::write(&path, "same").unwrap();

    let with_diff = ReconcileOptions::default().with_diff(true);
    assert_eq!(reconcile(&state(&path, "same"), &with_diff).unwrap().diff, None);
    assert_eq!(run(&path, "other").diff, None);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn directory_target_is_a_read_error() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("subdir");
    fs::create_dir(&dir).unwrap();

    let err = reconcile(&state(&dir, "x"), &ReconcileOptions::default()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ReadError);
    assert_eq!(err.path(), dir.to_str().unwrap());
    assert!(err.to_string().contains("directory"), "message: {}", err);
}

#[test]
fn directory_target_fails_in_dry_run_too() {
    let temp = TempDir::new().unwrap();

    let err = reconcile(&state(temp.path(), "x"), &ReconcileOptions::dry_run()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ReadError);
}

#[test]
fn missing_parent_directory_is_a_creation_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing").join("a.txt");

    let err = reconcile(&state(&path, "x"), &ReconcileOptions::default()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CreationError);
    assert!(!temp.path().join("missing").exists(), "directories are never created");
}

#[test]
fn missing_parent_directory_dry_run_still_predicts_create() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing").join("a.txt");

    let result = dry(&path, "x");

    assert!(result.changed);
}

#[rstest]
#[case::nul_byte("bad\0name")]
#[case::parent_ref("..")]
fn invalid_path_is_a_path_error(#[case] raw: &str) {
    let desired = DesiredState::new(raw, "x").unwrap();

    let err = reconcile(&desired, &ReconcileOptions::default()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PathError);
    assert_eq!(err.path(), raw);
}

#[test]
fn long_file_name_is_created_overwritten_and_locked() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a".repeat(250));

    let created = run(&path, "hello");
    assert!(created.changed);
    assert_eq!(fs::read(&path).unwrap(), b"hello");

    let overwritten = run(&path, "world");
    assert!(overwritten.changed);
    assert_eq!(fs::read(&path).unwrap(), b"world");

    let locked = reconcile(
        &state(&path, "again"),
        &ReconcileOptions::default().with_lock(true),
    )
    .unwrap();
    assert!(locked.changed);
    assert_eq!(fs::read(&path).unwrap(), b"again");
}

#[test]
fn error_report_has_kind_message_and_path() {
    let temp = TempDir::new().unwrap();

    let err = reconcile(&state(temp.path(), "x"), &ReconcileOptions::default()).unwrap_err();
    let report = err.report();

    assert_eq!(report.kind, ErrorKind::ReadError);
    assert_eq!(report.path, temp.path().to_str().unwrap());
    assert!(report.message.contains(temp.path().to_str().unwrap()));
}

#[cfg(unix)]
mod unix_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::os::unix::fs::{PermissionsExt, symlink};

    fn is_root() -> bool {
        match std::process::Command::new("id").arg("-u").output() {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "0",
            Err(_) => false,
        }
    }

    #[test]
    fn parent_is_a_file_is_a_path_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain");
        fs::write(&file, "x").unwrap();

        let err = reconcile(&state(&file.join("child"), "x"), &ReconcileOptions::default())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PathError);
    }

    #[test]
    fn dangling_symlink_is_present_and_unreadable() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("dangling");
        symlink(temp.path().join("nowhere"), &link).unwrap();

        let err = reconcile(&state(&link, "x"), &ReconcileOptions::default()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ReadError);
        assert!(!temp.path().join("nowhere").exists());
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    }

    #[test]
    fn symlinked_file_is_updated_through_the_link() {
        let temp = TempDir::new().unwrap();
        let real = temp.path().join("real.txt");
        fs::write(&real, "old").unwrap();
        let link = temp.path().join("link.txt");
        symlink(&real, &link).unwrap();

        assert!(run(&link, "new").changed);
        assert!(!run(&link, "new").changed);

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read(&real).unwrap(), b"new");
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let temp = TempDir::new().unwrap();
        let path = target(&temp);
        fs::write(&path, "secret").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        let result = reconcile(&state(&path, "x"), &ReconcileOptions::default());

        let _ = fs::set_permissions(&path, fs::Permissions::from_mode(0o644));
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadError);
        assert!(err.to_string().contains("ermission denied"), "message: {}", err);
    }

    #[test]
    fn readonly_directory_overwrite_is_a_write_error() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("ro");
        fs::create_dir(&dir).unwrap();
        let path = dir.join("a.txt");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).unwrap();

        let result = reconcile(&state(&path, "new"), &ReconcileOptions::default());

        let _ = fs::set_permissions(&dir, fs::Permissions::from_mode(0o755));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::WriteError);
        assert_eq!(fs::read(&path).unwrap(), b"old");
    }

    #[test]
    fn readonly_directory_create_is_a_creation_error() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("ro");
        fs::create_dir(&dir).unwrap();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).unwrap();

        let result = reconcile(&state(&dir.join("a.txt"), "new"), &ReconcileOptions::default());

        let _ = fs::set_permissions(&dir, fs::Permissions::from_mode(0o755));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::CreationError);
    }
}
