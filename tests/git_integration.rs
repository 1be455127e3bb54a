//! Integration tests for the git adapter and the engines on top of it.
//!
//! These tests use real git repositories created via tempfile to verify
//! that `GitCli` behaves as the sequencer expects: clean applies, paused
//! conflicting applies, and re-export into the patch repository.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use ply::core::head::HeadTracker;
use ply::core::link::link;
use ply::core::series::PatchSeries;
use ply::core::types::{BranchName, Ordinal};
use ply::engine::{Exporter, Sequencer, SequencerState};
use ply::git::{ApplyOutcome, CheckoutMode, CommitOptions, GitCli, GitError, Vcs};

const LINES: usize = 12;

/// Test fixture that creates a real git repository.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new test repository with an initial commit.
    fn new() -> Self {
        let repo = Self::empty();
        repo.write_lines(&[]);
        run_git(repo.path(), &["add", "file.txt"]);
        run_git(repo.path(), &["commit", "-m", "Initial commit"]);
        repo
    }

    /// Create a repository with no commits.
    fn empty() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        run_git(dir.path(), &["init", "-q"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);
        run_git(dir.path(), &["config", "commit.gpgsign", "false"]);
        Self { dir }
    }

    /// Get the path to the repository.
    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn git(&self) -> GitCli {
        GitCli::open(self.path()).expect("failed to open test repo")
    }

    /// Write `file.txt` with numbered lines, replacing some of them.
    fn write_lines(&self, replace: &[(usize, &str)]) {
        let mut lines: Vec<String> = (1..=LINES).map(|n| format!("line {}", n)).collect();
        for (idx, text) in replace {
            lines[*idx] = text.to_string();
        }
        fs::write(self.path().join("file.txt"), lines.join("\n") + "\n").unwrap();
    }

    fn commit_all(&self, message: &str) {
        run_git(self.path(), &["commit", "-a", "-q", "-m", message]);
    }

    fn read(&self, file: &str) -> String {
        fs::read_to_string(self.path().join(file)).unwrap()
    }

    fn last_subject(&self) -> String {
        git_stdout(self.path(), &["log", "-1", "--format=%s"])
    }

    fn branch_head(&self) -> String {
        git_stdout(self.path(), &["rev-parse", "--abbrev-ref", "HEAD"])
    }
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

/// An upstream tree, a patch repository holding two patches made against
/// its first commit, and the tree linked to the patch repository.
///
/// Patch 1 edits the first line, patch 2 the last.
struct PatchStack {
    upstream: TestRepo,
    patches: TestRepo,
}

impl PatchStack {
    fn new() -> Self {
        let upstream = TestRepo::new();
        let patches = TestRepo::empty();

        run_git(upstream.path(), &["checkout", "-q", "-b", "authoring"]);
        upstream.write_lines(&[(0, "line 1 patched")]);
        upstream.commit_all("Patch first line");
        upstream.write_lines(&[(0, "line 1 patched"), (LINES - 1, "last line patched")]);
        upstream.commit_all("Patch last line");

        let out = patches.path().to_string_lossy().into_owned();
        run_git(
            upstream.path(),
            &["format-patch", "-q", "-2", "--start-number", "1", "-o", &out],
        );
        run_git(patches.path(), &["add", "."]);
        run_git(patches.path(), &["commit", "-q", "-m", "Initial series"]);

        run_git(upstream.path(), &["checkout", "-q", "-"]);
        link(upstream.path(), patches.path()).unwrap();

        Self { upstream, patches }
    }

    fn head(&self) -> HeadTracker {
        HeadTracker::at(self.upstream.path())
    }

    fn patch_repo(&self) -> std::path::PathBuf {
        fs::canonicalize(self.patches.path()).unwrap()
    }
}

mod adapter {
    use super::*;

    #[test]
    fn open_from_subdirectory_binds_to_root() {
        let repo = TestRepo::new();
        let sub = repo.path().join("nested");
        fs::create_dir_all(&sub).unwrap();

        let git = GitCli::open(&sub).unwrap();
        assert_eq!(
            fs::canonicalize(git.workdir()).unwrap(),
            fs::canonicalize(repo.path()).unwrap()
        );
    }

    #[test]
    fn open_outside_repository() {
        let dir = TempDir::new().unwrap();
        let err = GitCli::open(dir.path()).unwrap_err();
        assert!(matches!(err, GitError::NotARepo { .. }));
    }

    #[test]
    fn checkout_modes() {
        let repo = TestRepo::new();
        let git = repo.git();
        let feature = BranchName::new("0001-feature").unwrap();

        git.checkout(&feature, CheckoutMode::Create).unwrap();
        assert_eq!(git.current_branch().unwrap(), Some(feature.clone()));

        // Creating again fails, resetting succeeds.
        assert!(git.checkout(&feature, CheckoutMode::Create).is_err());
        git.checkout(&feature, CheckoutMode::CreateOrReset).unwrap();
        assert_eq!(repo.branch_head(), "0001-feature");
    }

    #[test]
    fn unborn_branch_is_reported() {
        let repo = TestRepo::empty();
        let branch = repo.git().current_branch().unwrap();
        assert!(branch.is_some());
    }

    #[test]
    fn commit_amend_reuses_message() {
        let repo = TestRepo::new();
        let git = repo.git();
        repo.write_lines(&[(3, "changed")]);

        git.commit(
            "",
            &CommitOptions {
                all: true,
                amend: true,
                reuse_message: Some("HEAD".to_string()),
            },
        )
        .unwrap();

        assert_eq!(repo.last_subject(), "Initial commit");
        assert!(repo.read("file.txt").contains("changed"));
        assert_eq!(git_stdout(repo.path(), &["status", "--porcelain"]), "");
    }

    #[test]
    fn format_patch_numbers_from_start() {
        let repo = TestRepo::new();
        repo.write_lines(&[(2, "three")]);
        repo.commit_all("Change line three");

        let files = repo.git().format_patch(1, Ordinal::new(7)).unwrap();
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("0007-"), "unexpected name {}", name);
        assert!(files[0].is_file());
    }

    #[test]
    fn failing_command_is_fatal_not_conflict() {
        let repo = TestRepo::new();
        let missing = repo.path().join("nope.patch");
        let err = repo.git().apply_patch(&missing, true).unwrap_err();
        assert!(matches!(err, GitError::CommandFailed { .. }));
        assert!(!repo.git().apply_in_progress().unwrap());
    }

    #[test]
    fn patch_for_unknown_file_is_fatal_and_aborted() {
        // A patch made in an unrelated repository, editing a file the target
        // never had: git cannot build a merge base, so no markers appear.
        let other = TestRepo::new();
        fs::write(other.path().join("extra.txt"), "one\n").unwrap();
        run_git(other.path(), &["add", "extra.txt"]);
        run_git(other.path(), &["commit", "-q", "-m", "Add extra"]);
        fs::write(other.path().join("extra.txt"), "one\ntwo\n").unwrap();
        other.commit_all("Extend extra");
        let patch = other.git().format_patch(1, Ordinal::FIRST).unwrap().remove(0);

        let repo = TestRepo::new();
        let git = repo.git();
        let before = git_stdout(repo.path(), &["rev-parse", "HEAD"]);

        let err = git.apply_patch(&patch, true).unwrap_err();

        assert!(matches!(err, GitError::CommandFailed { .. }));
        assert!(!git.apply_in_progress().unwrap());
        assert_eq!(git_stdout(repo.path(), &["rev-parse", "HEAD"]), before);
    }
}

mod sequencing {
    use super::*;

    #[test]
    fn clean_series_applies_in_order() {
        let stack = PatchStack::new();
        let git = stack.upstream.git();
        let head = stack.head();
        let repo = stack.patch_repo();

        let mut seq = Sequencer::new(&git, &head, &repo);
        let report = seq
            .initialize(&BranchName::new("patched").unwrap(), CheckoutMode::Create)
            .unwrap();

        assert_eq!(report.applied, vec![Ordinal::new(1), Ordinal::new(2)]);
        assert_eq!(head.read().unwrap(), Ordinal::new(2));
        assert_eq!(seq.state(), SequencerState::Done);

        let content = stack.upstream.read("file.txt");
        assert!(content.starts_with("line 1 patched\n"));
        assert!(content.ends_with("last line patched\n"));
        assert_eq!(stack.upstream.branch_head(), "patched");
    }

    #[test]
    fn conflict_resolve_and_continue() {
        let stack = PatchStack::new();

        // Upstream moves on and touches the same line as patch 1.
        stack.upstream.write_lines(&[(0, "line 1 upstream")]);
        stack.upstream.commit_all("Upstream change");

        let git = stack.upstream.git();
        let head = stack.head();
        let repo = stack.patch_repo();
        let mut seq = Sequencer::new(&git, &head, &repo);

        let report = seq
            .initialize(&BranchName::new("patched").unwrap(), CheckoutMode::Create)
            .unwrap();
        let conflict = report.conflict.expect("patch 1 should conflict");
        assert_eq!(conflict.ordinal, Ordinal::new(1));
        assert_eq!(head.read().unwrap(), Ordinal::ZERO);
        assert!(git.apply_in_progress().unwrap());

        // Maintainer fixes the markers and stages the result.
        stack.upstream.write_lines(&[(0, "line 1 resolved")]);
        git.stage_tracked().unwrap();

        let exporter = Exporter::new(&git, &repo);
        let report = seq.resolve(&exporter).unwrap();

        assert_eq!(report.resolved, Some(Ordinal::new(1)));
        assert_eq!(report.applied, vec![Ordinal::new(2)]);
        assert_eq!(head.read().unwrap(), Ordinal::new(2));
        assert!(!git.apply_in_progress().unwrap());

        let content = stack.upstream.read("file.txt");
        assert!(content.starts_with("line 1 resolved\n"));
        assert!(content.ends_with("last line patched\n"));

        // The patch repository holds the regenerated patch and one new commit.
        let series = PatchSeries::scan(&repo).unwrap();
        assert_eq!(series.len(), 2);
        let regenerated = fs::read_to_string(&series.get(Ordinal::new(1)).unwrap().path).unwrap();
        assert!(regenerated.contains("+line 1 resolved"));
        assert_eq!(stack.patches.last_subject(), "Add or update patch 1");
        assert_eq!(git_stdout(&repo, &["status", "--porcelain"]), "");
    }

    #[test]
    fn apply_without_three_way_fails_without_pausing() {
        let stack = PatchStack::new();
        stack.upstream.write_lines(&[(0, "line 1 upstream")]);
        stack.upstream.commit_all("Upstream change");

        let git = stack.upstream.git();
        let patch = PatchSeries::scan(&stack.patch_repo())
            .unwrap()
            .get(Ordinal::FIRST)
            .unwrap()
            .path
            .clone();
        let err = git.apply_patch(&patch, false).unwrap_err();

        assert!(matches!(err, GitError::CommandFailed { .. }));
        assert!(!git.apply_in_progress().unwrap());
        assert_eq!(stack.upstream.last_subject(), "Upstream change");
    }

    #[test]
    fn apply_while_paused_is_refused() {
        let stack = PatchStack::new();
        stack.upstream.write_lines(&[(0, "line 1 upstream")]);
        stack.upstream.commit_all("Upstream change");

        let git = stack.upstream.git();
        let series = PatchSeries::scan(&stack.patch_repo()).unwrap();
        let first = &series.get(Ordinal::new(1)).unwrap().path;
        let second = &series.get(Ordinal::new(2)).unwrap().path;

        let outcome = git.apply_patch(first, true).unwrap();
        assert!(matches!(outcome, ApplyOutcome::Conflict { .. }));

        let err = git.apply_patch(second, true).unwrap_err();
        assert!(matches!(err, GitError::ApplyInProgress));
        assert!(git.apply_in_progress().unwrap());
    }
}
