//! Whole-second file modification times.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A file modification time, truncated to whole seconds since the Unix epoch.
///
/// Second granularity matches what the sidecar file persists, so a value
/// read back from disk compares equal to a fresh observation of an untouched
/// file. Times before the epoch clamp to zero.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModTime(u64);

impl ModTime {
    /// Creates a modification time from seconds since the Unix epoch.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the number of seconds since the Unix epoch.
    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// Converts a [`SystemTime`], truncating sub-second precision.
    pub fn from_system_time(time: SystemTime) -> Self {
        let secs = time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs)
    }

    /// Converts back to a [`SystemTime`].
    pub fn to_system_time(self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.0)
    }

    /// Reads the modification time of the file at `path`.
    pub fn of(path: &Path) -> io::Result<Self> {
        let modified = std::fs::metadata(path)?.modified()?;
        Ok(Self::from_system_time(modified))
    }

    /// Returns `true` if `self` is strictly later than `other`.
    pub fn is_newer_than(self, other: ModTime) -> bool {
        self.0 > other.0
    }
}

impl fmt::Display for ModTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ModTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModTime({})", self.0)
    }
}
