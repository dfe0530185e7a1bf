//! Where a run persists its dataset.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::DatasetError;

/// Persistence target for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Write back over the input file.
    Override(PathBuf),
    /// Write a new snapshot file, leaving the input untouched.
    Snapshot(PathBuf),
}

impl Destination {
    pub fn path(&self) -> &Path {
        match self {
            Destination::Override(path) | Destination::Snapshot(path) => path,
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, Destination::Override(_))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Override(path) => write!(f, "{} (override)", path.display()),
            Destination::Snapshot(path) => write!(f, "{} (snapshot)", path.display()),
        }
    }
}

/// `./snapshots_{user_id}/tts_{timestamp}_{user_id}.csv`
pub fn default_snapshot_path(user_id: &str, now: DateTime<Utc>) -> PathBuf {
    PathBuf::from(".")
        .join(format!("snapshots_{}", user_id))
        .join(format!("tts_{}_{}.csv", now.format("%Y%m%d%H%M%S"), user_id))
}

/// Pick the destination for a run.
///
/// Override mode writes back to `input`; an explicit `output` that differs from
/// it is rejected. Otherwise a snapshot is written to `output` or to the
/// derived default path, which must not exist yet.
pub fn resolve_destination(
    input: &Path,
    output: Option<&Path>,
    overwrite_input: bool,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<Destination, DatasetError> {
    if overwrite_input {
        if let Some(output) = output {
            if output != input {
                return Err(DatasetError::ConflictingDestination {
                    input: input.to_path_buf(),
                    output: output.to_path_buf(),
                });
            }
            warn!("No need to set an output path when overwriting the input file");
        }
        info!("Input file {} will be overwritten", input.display());
        return Ok(Destination::Override(input.to_path_buf()));
    }

    let path = match output {
        Some(output) => output.to_path_buf(),
        None => {
            let path = default_snapshot_path(user_id, now);
            info!("No output file specified, writing snapshot to {}", path.display());
            path
        }
    };

    if path.exists() {
        return Err(DatasetError::DestinationExists { path });
    }

    Ok(Destination::Snapshot(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 5).unwrap()
    }

    #[test]
    fn test_default_snapshot_path() {
        let path = default_snapshot_path("u42", fixed_now());
        assert_eq!(
            path,
            PathBuf::from("./snapshots_u42/tts_20240517093005_u42.csv")
        );
    }

    #[test]
    fn test_override_mode() {
        let input = Path::new("items.csv");
        let dest = resolve_destination(input, None, true, "u", fixed_now()).unwrap();
        assert_eq!(dest, Destination::Override(input.to_path_buf()));
        assert!(dest.is_override());
    }

    #[test]
    fn test_override_with_same_output_is_allowed() {
        let input = Path::new("items.csv");
        let dest = resolve_destination(input, Some(input), true, "u", fixed_now()).unwrap();
        assert!(dest.is_override());
    }

    #[test]
    fn test_override_with_other_output_conflicts() {
        let err = resolve_destination(
            Path::new("items.csv"),
            Some(Path::new("other.csv")),
            true,
            "u",
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::ConflictingDestination { .. }));
    }

    #[test]
    fn test_explicit_snapshot_path() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.csv");
        let dest = resolve_destination(
            Path::new("items.csv"),
            Some(&output),
            false,
            "u",
            fixed_now(),
        )
        .unwrap();
        assert_eq!(dest, Destination::Snapshot(output));
    }

    #[test]
    fn test_existing_snapshot_is_refused() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.csv");
        std::fs::write(&output, "item_id\n").unwrap();

        let err = resolve_destination(
            Path::new("items.csv"),
            Some(&output),
            false,
            "u",
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::DestinationExists { .. }));
    }
}
