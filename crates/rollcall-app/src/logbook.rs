//! Per-day attendance CSV persistence.
//!
//! One file per calendar date under the attendance directory,
//! `Attendance_DD-MM-YYYY.csv`, created with its header exactly once and
//! appended to thereafter.

use crate::attendance::AttendanceEvent;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;

const HEADER: [&str; 4] = ["NAME", "TIME", "ENTRY TIME", "STATUS"];

#[derive(Error, Debug)]
pub enum LogbookError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Append-only writer for the per-day attendance logs.
pub struct Logbook {
    dir: PathBuf,
}

impl Logbook {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the log file covering the event's calendar date.
    pub fn path_for(&self, event: &AttendanceEvent) -> PathBuf {
        self.dir
            .join(format!("Attendance_{}.csv", event.timestamp.format("%d-%m-%Y")))
    }

    /// Append one event to its day's log, creating directory, file and
    /// header on first use.
    pub fn append(&self, event: &AttendanceEvent) -> Result<(), LogbookError> {
        let path = self.path_for(event);
        let fresh = !path.exists();
        if fresh {
            std::fs::create_dir_all(&self.dir)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::Writer::from_writer(file);

        if fresh {
            writer.write_record(HEADER)?;
        }
        writer.write_record([
            event.name.as_str(),
            &event.timestamp.format("%H:%M:%S").to_string(),
            &event.entry_time.format("%H:%M:%S").to_string(),
            &event.status.to_string(),
        ])?;
        writer.flush()?;

        tracing::debug!(
            path = %path.display(),
            name = %event.name,
            status = %event.status,
            "attendance row written"
        );
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::EventStatus;
    use chrono::NaiveDate;

    fn event(name: &str, status: EventStatus, sec: u32) -> AttendanceEvent {
        let entry = NaiveDate::from_ymd_opt(2026, 8, 30)
            .unwrap()
            .and_hms_opt(9, 0, 5)
            .unwrap();
        let ts = NaiveDate::from_ymd_opt(2026, 8, 30)
            .unwrap()
            .and_hms_opt(9, 0, sec)
            .unwrap();
        AttendanceEvent {
            name: name.to_string(),
            timestamp: ts,
            entry_time: entry,
            status,
        }
    }

    #[test]
    fn test_creates_file_with_header_and_row() {
        let dir = tempfile::tempdir().unwrap();
        let logbook = Logbook::new(dir.path().join("Attendance"));

        logbook.append(&event("Asha", EventStatus::Entry, 5)).unwrap();

        let path = logbook.path_for(&event("Asha", EventStatus::Entry, 5));
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "Attendance_30-08-2026.csv"
        );
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec![
            "NAME,TIME,ENTRY TIME,STATUS",
            "Asha,09:00:05,09:00:05,Entry",
        ]);
    }

    #[test]
    fn test_append_does_not_rewrite_header() {
        let dir = tempfile::tempdir().unwrap();
        let logbook = Logbook::new(dir.path());

        logbook.append(&event("Asha", EventStatus::Entry, 5)).unwrap();
        logbook.append(&event("Asha", EventStatus::Exit, 7)).unwrap();

        let contents =
            std::fs::read_to_string(logbook.path_for(&event("Asha", EventStatus::Exit, 7))).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "NAME,TIME,ENTRY TIME,STATUS");
        assert_eq!(lines[1], "Asha,09:00:05,09:00:05,Entry");
        assert_eq!(lines[2], "Asha,09:00:07,09:00:05,Exit");
        // Header appears exactly once.
        assert_eq!(contents.matches("NAME,TIME").count(), 1);
    }

    #[test]
    fn test_interleaved_identities_share_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let logbook = Logbook::new(dir.path());

        logbook.append(&event("Asha", EventStatus::Entry, 1)).unwrap();
        logbook.append(&event("Ben", EventStatus::Entry, 2)).unwrap();
        logbook.append(&event("Asha", EventStatus::Exit, 3)).unwrap();
        logbook.append(&event("Ben", EventStatus::Exit, 4)).unwrap();

        let contents =
            std::fs::read_to_string(logbook.path_for(&event("Asha", EventStatus::Exit, 3))).unwrap();
        assert_eq!(contents.lines().count(), 5);
        assert_eq!(contents.matches("NAME,TIME").count(), 1);
    }

    #[test]
    fn test_unwritable_dir_is_an_error_not_a_panic() {
        let logbook = Logbook::new("/proc/rollcall-definitely-unwritable");
        let err = logbook.append(&event("Asha", EventStatus::Entry, 5));
        assert!(err.is_err());
    }
}
