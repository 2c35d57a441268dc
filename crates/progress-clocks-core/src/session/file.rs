//! Session files
//!
//! A session file is one pretty-printed [`SessionSnapshot`]. Writes go
//! through a sibling temporary file and a rename, so an interrupted autosave
//! leaves the previous file intact.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use super::snapshot::SessionSnapshot;
use super::{RestoreReport, Session};
use crate::error::ClockError;

/// Save `session` to `path`, creating the parent directory
pub fn save_session<P: AsRef<Path>>(path: P, session: &Session) -> Result<(), ClockError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = session.save().to_json()?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;

    info!(path = %path.display(), tabs = session.len(), "session saved");
    Ok(())
}

/// Load and restore the session at `path`
pub fn load_session<P: AsRef<Path>>(path: P, now: Instant) -> Result<(Session, RestoreReport), ClockError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let snapshot = SessionSnapshot::from_json(&content)?;
    let (session, report) = Session::restore_with_report(&snapshot, now)?;

    info!(path = %path.display(), tabs = session.len(), "session loaded");
    if report.has_changes() {
        warn!(path = %path.display(), summary = %report.summary(), "session needed repairs");
    }
    Ok((session, report))
}

/// Load the session at `path`, falling back to a fresh default session when
/// the file is missing or corrupt. Other I/O errors are returned.
pub fn load_session_or_default<P: AsRef<Path>>(path: P, now: Instant) -> Result<Session, ClockError> {
    let path = path.as_ref();
    match load_session(path, now) {
        Ok((session, _)) => Ok(session),
        Err(ClockError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no session file, starting fresh");
            Ok(Session::default())
        }
        Err(ClockError::CorruptSession(reason)) => {
            warn!(path = %path.display(), %reason, "corrupt session replaced with a fresh one");
            Ok(Session::default())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_default() {
        let dir = TempDir::new().unwrap();
        let session = load_session_or_default(dir.path().join("none.json"), Instant::now()).unwrap();
        assert_eq!(session.len(), 1);
        assert_eq!(session.tabs()[0].title(), "Danger Clock 1");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_session(dir.path().join("none.json"), Instant::now()),
            Err(ClockError::Io(_))
        ));
    }
}
