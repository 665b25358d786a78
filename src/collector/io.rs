//! Per-process I/O statistics sampling from the proc filesystem.

use std::path::Path;

use crate::error::CollectorError;

/// Aggregated I/O counters across all visible processes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoSample {
    /// Bytes read from the storage layer.
    pub read_bytes: u64,
    /// Bytes written to the storage layer.
    pub write_bytes: u64,
    /// Bytes accounted for truncated (cancelled) writes.
    pub cancelled_write_bytes: u64,
    /// Number of processes that contributed to the sample.
    pub processes: usize,
}

/// Walks `proc_path` and sums the `/proc/<pid>/io` counters of every
/// process it can read.
///
/// Processes that vanish mid-walk or whose `io` file is not readable
/// (kernel threads, permission) are skipped; only a failure to enumerate
/// the proc root is an error.
pub fn sample(proc_path: &Path) -> Result<IoSample, CollectorError> {
    let entries = std::fs::read_dir(proc_path).map_err(|e| CollectorError::ProcUnreadable {
        path: proc_path.to_path_buf(),
        source: e,
    })?;

    let mut sample = IoSample::default();

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }

        let Ok(contents) = std::fs::read_to_string(entry.path().join("io")) else {
            continue;
        };

        sample.processes += 1;
        for line in contents.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let Ok(value) = value.trim().parse::<u64>() else {
                continue;
            };
            match key {
                "read_bytes" => sample.read_bytes += value,
                "write_bytes" => sample.write_bytes += value,
                "cancelled_write_bytes" => sample.cancelled_write_bytes += value,
                _ => {}
            }
        }
    }

    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_proc(pids: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (pid, io) in pids {
            let pid_dir = dir.path().join(pid);
            std::fs::create_dir(&pid_dir).unwrap();
            std::fs::write(pid_dir.join("io"), io).unwrap();
        }
        dir
    }

    #[test]
    fn sums_counters_across_processes() {
        let proc_dir = fake_proc(&[
            ("1", "read_bytes: 100\nwrite_bytes: 20\ncancelled_write_bytes: 3\n"),
            ("42", "read_bytes: 900\nwrite_bytes: 80\ncancelled_write_bytes: 7\n"),
        ]);

        let sample = sample(proc_dir.path()).unwrap();
        assert_eq!(sample.read_bytes, 1000);
        assert_eq!(sample.write_bytes, 100);
        assert_eq!(sample.cancelled_write_bytes, 10);
        assert_eq!(sample.processes, 2);
    }

    #[test]
    fn ignores_non_pid_entries_and_unreadable_processes() {
        let proc_dir = fake_proc(&[("7", "read_bytes: 5\nwrite_bytes: 5\n")]);
        std::fs::create_dir(proc_dir.path().join("sys")).unwrap();
        // PID directory without an io file, as for a vanished process.
        std::fs::create_dir(proc_dir.path().join("8")).unwrap();

        let sample = sample(proc_dir.path()).unwrap();
        assert_eq!(sample.processes, 1);
        assert_eq!(sample.read_bytes, 5);
    }

    #[test]
    fn missing_proc_root_is_an_error() {
        let err = sample(Path::new("/nonexistent/proc")).unwrap_err();
        assert!(matches!(err, CollectorError::ProcUnreadable { .. }));
    }
}
