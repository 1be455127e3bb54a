//! engine::sequencer
//!
//! Patch Sequencer: applies a patch series in ordinal order, persisting the
//! patch head after every clean application.
//!
//! # States
//!
//! ```text
//!            initialize                clean, more pending
//!   Idle ───────────────▶ Applying(n) ◀──────────────────┐
//!                            │   │                        │
//!                 conflict   │   └────────────────────────┘
//!                            ▼          series exhausted
//!                      Blocked(n) ───────────────────────▶ Done
//!                            │ resolve (export n, head = n)
//!                            └──────────▶ Applying(next after n)
//! ```
//!
//! # Invariants
//!
//! - The head is written after each clean application and never before.
//!   Resuming after a conflict or a crash is exact.
//! - The head never decreases except through [`Sequencer::initialize`].
//! - Application always resumes strictly after the persisted head, so
//!   re-entering with a stale start ordinal never re-applies a patch.
//! - A conflict stops the run immediately and is reported, not raised.
//!   A fatal failure aborts with the head untouched.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::error::PlyError;
use crate::core::head::HeadTracker;
use crate::core::series::PatchSeries;
use crate::core::types::{BranchName, Ordinal};
use crate::git::{ApplyOutcome, CheckoutMode, Vcs};

use super::exporter::Exporter;

/// Where the sequencer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// Nothing started, or the last run aborted on a fatal error.
    Idle,
    /// Applying the given ordinal.
    Applying(Ordinal),
    /// Stopped on a conflict at the given ordinal.
    Blocked(Ordinal),
    /// Every pending patch has been applied.
    Done,
}

/// A patch that stopped the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Ordinal of the conflicting patch.
    pub ordinal: Ordinal,
    /// Its file in the patch repository.
    pub patch: PathBuf,
    /// What the VCS reported.
    pub detail: String,
}

/// Outcome of a sequencing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceReport {
    /// Ordinals applied cleanly in this run, ascending.
    pub applied: Vec<Ordinal>,
    /// The conflict that stopped the run, if any.
    pub conflict: Option<Conflict>,
    /// Persisted head at the end of the run.
    pub head: Ordinal,
    /// Ordinal regenerated by a resolve, if this run followed one.
    pub resolved: Option<Ordinal>,
}

impl SequenceReport {
    /// Whether the run stopped on a conflict.
    pub fn is_blocked(&self) -> bool {
        self.conflict.is_some()
    }
}

/// Drives patch application for one working tree.
pub struct Sequencer<'a> {
    vcs: &'a dyn Vcs,
    head: &'a HeadTracker,
    patch_repo: &'a Path,
    three_way: bool,
    state: SequencerState,
}

impl<'a> Sequencer<'a> {
    /// Create a sequencer. Three-way merge tolerance is on by default.
    pub fn new(vcs: &'a dyn Vcs, head: &'a HeadTracker, patch_repo: &'a Path) -> Self {
        Self {
            vcs,
            head,
            patch_repo,
            three_way: true,
            state: SequencerState::Idle,
        }
    }

    /// Enable or disable three-way merge tolerance.
    pub fn with_three_way(mut self, three_way: bool) -> Self {
        self.three_way = three_way;
        self
    }

    /// Current state.
    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Switch to `branch`, reset the head to zero and apply the whole
    /// series.
    ///
    /// Incompatible checkout options are rejected by
    /// [`CheckoutMode::from_flags`] before this is reached.
    pub fn initialize(
        &mut self,
        branch: &BranchName,
        mode: CheckoutMode,
    ) -> Result<SequenceReport, PlyError> {
        info!(branch = %branch, ?mode, "initializing patch branch");
        self.vcs.checkout(branch, mode)?;
        self.head.reset()?;
        self.state = SequencerState::Applying(Ordinal::FIRST);
        self.apply_from(Ordinal::FIRST)
    }

    /// Apply every patch with ordinal `>= start` that is also above the
    /// persisted head, in ascending order.
    pub fn apply_from(&mut self, start: Ordinal) -> Result<SequenceReport, PlyError> {
        let result = self.run_from(start);
        if result.is_err() {
            self.state = SequencerState::Idle;
        }
        result
    }

    fn run_from(&mut self, start: Ordinal) -> Result<SequenceReport, PlyError> {
        let mut head = self.head.read()?;
        let effective = start.max(head.next());
        if effective != start {
            debug!(requested = %start, effective = %effective, "resuming after persisted head");
        }

        let series = PatchSeries::scan(self.patch_repo)?;
        let mut report = SequenceReport {
            applied: Vec::new(),
            conflict: None,
            head,
            resolved: None,
        };

        for entry in series.from_ordinal(effective) {
            self.state = SequencerState::Applying(entry.ordinal);
            debug!(ordinal = %entry.ordinal, patch = %entry.path.display(), "applying patch");

            match self.vcs.apply_patch(&entry.path, self.three_way)? {
                ApplyOutcome::Clean => {
                    self.head.write(entry.ordinal)?;
                    head = entry.ordinal;
                    report.applied.push(entry.ordinal);
                    report.head = head;
                }
                ApplyOutcome::Conflict { detail } => {
                    warn!(ordinal = %entry.ordinal, "patch conflicted; resolve and run 'ply resolve'");
                    self.state = SequencerState::Blocked(entry.ordinal);
                    report.conflict = Some(Conflict {
                        ordinal: entry.ordinal,
                        patch: entry.path.clone(),
                        detail,
                    });
                    return Ok(report);
                }
            }
        }

        self.state = SequencerState::Done;
        info!(head = %head, applied = report.applied.len(), "patch series applied");
        Ok(report)
    }

    /// Complete a blocked application and continue the series.
    ///
    /// The maintainer has fixed the conflict markers and staged the result.
    /// The blocked ordinal is the first patch above the persisted head. The
    /// paused apply is completed, the resulting commit is re-exported under
    /// that ordinal, the regenerated file is verified to be in the patch
    /// repository, the head advances to it, and application resumes after
    /// it.
    ///
    /// # Errors
    ///
    /// - [`PlyError::NothingToResolve`] if no apply is paused, or no patch
    ///   lies above the head
    /// - [`PlyError::MissingExport`] if the patch was not regenerated
    pub fn resolve(&mut self, exporter: &Exporter<'_>) -> Result<SequenceReport, PlyError> {
        if !self.vcs.apply_in_progress()? {
            return Err(PlyError::NothingToResolve);
        }

        let result = self.resolve_blocked(exporter);
        if result.is_err() {
            self.state = SequencerState::Idle;
        }
        result
    }

    fn resolve_blocked(&mut self, exporter: &Exporter<'_>) -> Result<SequenceReport, PlyError> {
        let this = self.blocked_ordinal()?;
        self.state = SequencerState::Blocked(this);

        self.vcs.resolve_apply()?;
        info!(ordinal = %this, "conflict resolved; regenerating patch");

        let exported = exporter.export(1, this)?;
        self.verify_exported(this, &exported)?;

        self.head.write(this)?;
        let mut report = self.apply_from(this.next())?;
        report.resolved = Some(this);
        Ok(report)
    }

    /// The ordinal the paused apply belongs to: the first patch above the
    /// persisted head. Gaps in the series are skipped.
    fn blocked_ordinal(&self) -> Result<Ordinal, PlyError> {
        if let SequencerState::Blocked(ordinal) = self.state {
            return Ok(ordinal);
        }
        let head = self.head.read()?;
        PatchSeries::scan(self.patch_repo)?
            .next_after(head)
            .ok_or(PlyError::NothingToResolve)
    }

    fn verify_exported(&self, ordinal: Ordinal, exported: &[String]) -> Result<(), PlyError> {
        let series = PatchSeries::scan(self.patch_repo)?;
        match series.get(ordinal) {
            Some(entry) if exported.iter().any(|name| name == entry.file_name()) => Ok(()),
            _ => Err(PlyError::MissingExport { ordinal }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::{FailOn, MockOperation, MockVcs};
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        work: TempDir,
        patches: TempDir,
        vcs: MockVcs,
        head: HeadTracker,
    }

    impl Fixture {
        fn with_patches(names: &[&str]) -> Self {
            let work = TempDir::new().unwrap();
            let patches = TempDir::new().unwrap();
            for name in names {
                fs::write(patches.path().join(name), "patch\n").unwrap();
            }
            let vcs = MockVcs::new(work.path());
            let head = HeadTracker::at(work.path());
            Self {
                work,
                patches,
                vcs,
                head,
            }
        }

        fn sequencer(&self) -> Sequencer<'_> {
            Sequencer::new(&self.vcs, &self.head, self.patches.path())
        }

        fn applied_names(&self) -> Vec<String> {
            self.vcs
                .applied_patches()
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        }
    }

    fn branch(name: &str) -> BranchName {
        BranchName::new(name).unwrap()
    }

    #[test]
    fn initialize_checks_out_resets_and_applies() {
        let fx = Fixture::with_patches(&["0001-a.patch", "0002-b.patch"]);
        fx.head.write(Ordinal::new(7)).unwrap();

        let mut seq = fx.sequencer();
        let report = seq
            .initialize(&branch("0003-new"), CheckoutMode::Create)
            .unwrap();

        assert_eq!(report.applied, vec![Ordinal::new(1), Ordinal::new(2)]);
        assert_eq!(fx.head.read().unwrap(), Ordinal::new(2));
        assert_eq!(seq.state(), SequencerState::Done);
        assert_eq!(
            fx.vcs.operations()[0],
            MockOperation::Checkout {
                branch: branch("0003-new"),
                mode: CheckoutMode::Create,
            }
        );
    }

    #[test]
    fn three_way_flag_is_forwarded() {
        let fx = Fixture::with_patches(&["0001-a.patch"]);
        fx.head.reset().unwrap();
        let mut seq = fx.sequencer().with_three_way(false);
        seq.apply_from(Ordinal::FIRST).unwrap();
        assert!(fx.vcs.operations().iter().any(|op| matches!(
            op,
            MockOperation::Apply {
                three_way: false,
                ..
            }
        )));
    }

    #[test]
    fn conflict_blocks_without_advancing_head() {
        let fx = Fixture::with_patches(&["0001-a.patch", "0002-b.patch", "0003-c.patch"]);
        fx.head.reset().unwrap();
        fx.vcs.conflict_on(Ordinal::new(2));

        let mut seq = fx.sequencer();
        let report = seq.apply_from(Ordinal::FIRST).unwrap();

        assert!(report.is_blocked());
        let conflict = report.conflict.unwrap();
        assert_eq!(conflict.ordinal, Ordinal::new(2));
        assert!(conflict.detail.contains("0002-b.patch"));
        assert_eq!(seq.state(), SequencerState::Blocked(Ordinal::new(2)));
        assert_eq!(fx.head.read().unwrap(), Ordinal::new(1));
        assert_eq!(fx.applied_names(), vec!["0001-a.patch", "0002-b.patch"]);
    }

    #[test]
    fn fatal_error_aborts_and_keeps_head() {
        let fx = Fixture::with_patches(&["0001-a.patch", "0002-b.patch", "0003-c.patch"]);
        fx.head.reset().unwrap();
        fx.vcs.fatal_on(Ordinal::new(2));

        let mut seq = fx.sequencer();
        let err = seq.apply_from(Ordinal::FIRST).unwrap_err();
        assert!(matches!(err, PlyError::Git(_)));
        assert_eq!(seq.state(), SequencerState::Idle);
        assert_eq!(fx.head.read().unwrap(), Ordinal::new(1));

        // Retrying re-attempts the failing patch rather than skipping it.
        let _ = seq.apply_from(Ordinal::FIRST);
        let names = fx.applied_names();
        assert_eq!(names.last().unwrap(), "0002-b.patch");
        assert_eq!(names.iter().filter(|n| *n == "0001-a.patch").count(), 1);
    }

    #[test]
    fn apply_without_head_is_not_linked() {
        let fx = Fixture::with_patches(&["0001-a.patch"]);
        let err = fx.sequencer().apply_from(Ordinal::FIRST).unwrap_err();
        assert!(matches!(err, PlyError::NotLinked { .. }));
        assert!(fx.vcs.applied_patches().is_empty());
    }

    #[test]
    fn resolve_regenerates_and_resumes() {
        let fx = Fixture::with_patches(&["0001-a.patch", "0002-b.patch", "0003-c.patch"]);
        fx.head.reset().unwrap();
        fx.vcs.conflict_on(Ordinal::new(2));
        fx.vcs.set_subject("b");

        let mut seq = fx.sequencer();
        seq.apply_from(Ordinal::FIRST).unwrap();

        let exporter = Exporter::new(&fx.vcs, fx.patches.path());
        let report = seq.resolve(&exporter).unwrap();

        assert_eq!(report.resolved, Some(Ordinal::new(2)));
        assert_eq!(report.applied, vec![Ordinal::new(3)]);
        assert_eq!(fx.head.read().unwrap(), Ordinal::new(3));
        assert_eq!(seq.state(), SequencerState::Done);
        assert_ne!(
            fs::read_to_string(fx.patches.path().join("0002-b.patch")).unwrap(),
            "patch\n"
        );
        assert_eq!(
            fx.applied_names(),
            vec!["0001-a.patch", "0002-b.patch", "0003-c.patch"]
        );
        assert!(!fx.work.path().join("0002-b.patch").exists());
    }

    #[test]
    fn resolve_last_patch_advances_head() {
        let fx = Fixture::with_patches(&["0001-a.patch", "0002-b.patch"]);
        fx.head.reset().unwrap();
        fx.vcs.conflict_on(Ordinal::new(2));
        fx.vcs.set_subject("b");

        let mut seq = fx.sequencer();
        seq.apply_from(Ordinal::FIRST).unwrap();
        let exporter = Exporter::new(&fx.vcs, fx.patches.path());
        let report = seq.resolve(&exporter).unwrap();

        assert!(report.applied.is_empty());
        assert_eq!(report.head, Ordinal::new(2));
        assert_eq!(fx.head.read().unwrap(), Ordinal::new(2));
    }

    #[test]
    fn resolve_in_fresh_sequencer_finds_ordinal_across_gap() {
        let fx = Fixture::with_patches(&["0001-a.patch", "0005-e.patch", "0009-i.patch"]);
        fx.head.reset().unwrap();
        fx.vcs.conflict_on(Ordinal::new(5));
        fx.vcs.set_subject("e");
        fx.sequencer().apply_from(Ordinal::FIRST).unwrap();

        // A later invocation knows only the persisted head.
        let mut seq = fx.sequencer();
        let exporter = Exporter::new(&fx.vcs, fx.patches.path());
        let report = seq.resolve(&exporter).unwrap();

        assert_eq!(report.resolved, Some(Ordinal::new(5)));
        assert_eq!(report.applied, vec![Ordinal::new(9)]);
        assert!(fx.patches.path().join("0005-e.patch").is_file());
        assert!(!fx.patches.path().join("0002-e.patch").exists());
    }

    #[test]
    fn resolve_without_paused_apply() {
        let fx = Fixture::with_patches(&["0001-a.patch"]);
        fx.head.reset().unwrap();
        let exporter = Exporter::new(&fx.vcs, fx.patches.path());
        let err = fx.sequencer().resolve(&exporter).unwrap_err();
        assert!(matches!(err, PlyError::NothingToResolve));
    }

    #[test]
    fn resolve_export_failure_keeps_head() {
        let fx = Fixture::with_patches(&["0001-a.patch", "0002-b.patch", "0003-c.patch"]);
        fx.head.reset().unwrap();
        fx.vcs.conflict_on(Ordinal::new(2));

        let mut seq = fx.sequencer();
        seq.apply_from(Ordinal::FIRST).unwrap();
        fx.vcs.fail_on(FailOn::FormatPatch);

        let exporter = Exporter::new(&fx.vcs, fx.patches.path());
        assert!(seq.resolve(&exporter).is_err());
        assert_eq!(fx.head.read().unwrap(), Ordinal::new(1));
        assert_eq!(seq.state(), SequencerState::Idle);
    }
}
