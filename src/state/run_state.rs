/// Run phase definitions for tracking one bundling run
///
/// A run moves through these phases in order; only validation and the root
/// fetch can fail the run outright.
use std::fmt;

/// Represents the current phase of a bundling run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// No run has started yet
    Idle,

    // ===== Active Phases =====
    /// User input is being normalized into a base URL
    Validating,

    /// The root document is being fetched
    FetchingRoot,

    /// The root document is being scanned for asset references
    DiscoveringAssets,

    /// Subresource fetches are in flight
    FetchingAssets,

    // ===== Settled Phases =====
    /// Every subresource fetch has settled; the archive can be built
    Ready,

    /// The archive is being assembled and written
    Archiving,

    /// The archive was delivered
    Done,

    /// The run stopped on a terminal error before assets were collected
    Failed,
}

impl RunPhase {
    /// Returns true while fetch work is in progress
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Validating | Self::FetchingRoot | Self::DiscoveringAssets | Self::FetchingAssets
        )
    }

    /// Returns true when the download action is allowed
    ///
    /// `Done` stays downloadable so the same collection can be written again.
    pub fn can_download(&self) -> bool {
        matches!(self, Self::Ready | Self::Done)
    }

    /// Checks whether moving from `self` to `next` is a legal transition
    ///
    /// Starting a new fetch (`Validating`) is allowed from every phase, so a
    /// run abandoned mid-flight never blocks the next one. `Failed` is reachable only from validation and the root fetch;
    /// asset loss during `FetchingAssets` never fails a run, and a failed
    /// archive build returns to `Ready`.
    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        use RunPhase::*;

        match (self, next) {
            (_, Validating) => true,
            (Validating, FetchingRoot) => true,
            (Validating, Failed) => true,
            (FetchingRoot, DiscoveringAssets) => true,
            (FetchingRoot, Failed) => true,
            (DiscoveringAssets, FetchingAssets) => true,
            (FetchingAssets, Ready) => true,
            (Ready, Archiving) => true,
            (Done, Archiving) => true,
            (Archiving, Done) => true,
            (Archiving, Ready) => true,
            _ => false,
        }
    }

    /// Returns the lowercase name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::FetchingRoot => "fetching_root",
            Self::DiscoveringAssets => "discovering_assets",
            Self::FetchingAssets => "fetching_assets",
            Self::Ready => "ready",
            Self::Archiving => "archiving",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Returns all phases in run order
    pub fn all_phases() -> Vec<Self> {
        vec![
            Self::Idle,
            Self::Validating,
            Self::FetchingRoot,
            Self::DiscoveringAssets,
            Self::FetchingAssets,
            Self::Ready,
            Self::Archiving,
            Self::Done,
            Self::Failed,
        ]
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
