use std::path::{Path, PathBuf};

use crate::error::CopyError;
use crate::output::{self, CopyOutcome};
use crate::scanner::ScanResult;

/// Upper bound on panes shown for one group.
pub const MAX_PANES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Browsing(usize),
}

/// What a forward step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved(usize),
    /// Already on the last group; nothing changed.
    EndReached,
}

/// Walks the user through the groups of one scan.
///
/// Holds no images: callers reload the current group whenever a step
/// reports that the position changed.
#[derive(Debug)]
pub struct Session {
    scan: ScanResult,
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            scan: ScanResult::default(),
            state: SessionState::Empty,
        }
    }
}

impl Session {
    /// Start over with a fresh scan, positioned on the first group if any.
    pub fn new(scan: ScanResult) -> Self {
        let state = if scan.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Browsing(0)
        };
        Self { scan, state }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn scan(&self) -> &ScanResult {
        &self.scan
    }

    pub fn index(&self) -> Option<usize> {
        match self.state {
            SessionState::Empty => None,
            SessionState::Browsing(i) => Some(i),
        }
    }

    pub fn len(&self) -> usize {
        self.scan.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state == SessionState::Empty
    }

    pub fn current_key(&self) -> Option<&str> {
        self.current_group().map(|(key, _)| key)
    }

    /// Key and the paths to display for the current group, capped at `MAX_PANES`.
    pub fn current_group(&self) -> Option<(&str, &[PathBuf])> {
        let (key, paths) = self.scan.group_at(self.index()?)?;
        Some((key, &paths[..paths.len().min(MAX_PANES)]))
    }

    /// "3 / 12" style counter; "0 / 0" without groups.
    pub fn position_label(&self) -> String {
        match self.state {
            SessionState::Empty => "0 / 0".to_string(),
            SessionState::Browsing(i) => format!("{} / {}", i + 1, self.len()),
        }
    }

    pub fn next(&mut self) -> Step {
        match self.state {
            SessionState::Browsing(i) if i + 1 < self.len() => {
                self.state = SessionState::Browsing(i + 1);
                Step::Moved(i + 1)
            }
            _ => Step::EndReached,
        }
    }

    /// Step back; `None` when already at the first group (or empty).
    pub fn prev(&mut self) -> Option<usize> {
        match self.state {
            SessionState::Browsing(i) if i > 0 => {
                self.state = SessionState::Browsing(i - 1);
                Some(i - 1)
            }
            _ => None,
        }
    }

    /// Copy the chosen file to `output_dir` and move on.
    /// A failed copy leaves the position untouched.
    pub fn pick(&mut self, path: &Path, output_dir: &Path) -> Result<(CopyOutcome, Step), CopyError> {
        let outcome = output::copy_to_output(path, output_dir)?;
        Ok((outcome, self.next()))
    }
}
