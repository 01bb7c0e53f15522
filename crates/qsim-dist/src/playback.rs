//! File-backed playback tables: one file of newline-separated non-negative
//! integer service times per CPU.
//!
//! Playback dispatch is inherently two-dimensional -- pick a CPU, then a
//! sample from that CPU's table -- so it is modeled as its own type rather
//! than folded into the single-value [`crate::Distribution`] trait.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::{Rng, RngCore};

/// A file could not be read, or contained a line that was not a
/// non-negative integer.
#[derive(Debug)]
pub struct PlaybackLoadError {
    pub path: PathBuf,
    pub source: PlaybackLoadErrorKind,
}

#[derive(Debug)]
pub enum PlaybackLoadErrorKind {
    Io(io::Error),
    InvalidLine(String),
}

impl fmt::Display for PlaybackLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            PlaybackLoadErrorKind::Io(e) => {
                write!(f, "could not read playback file '{}': {e}", self.path.display())
            }
            PlaybackLoadErrorKind::InvalidLine(line) => write!(
                f,
                "playback file '{}' contains a non-integer line: {line:?}",
                self.path.display()
            ),
        }
    }
}

impl std::error::Error for PlaybackLoadError {}

/// One table of service-time samples per CPU, loaded from a set of files.
pub struct PlaybackTable {
    tables: Vec<Vec<f64>>,
}

impl PlaybackTable {
    /// Load one file per CPU, in the given order. Every line must be a
    /// non-negative integer; blank lines are skipped.
    pub fn load_from_files(paths: &[PathBuf]) -> Result<Self, PlaybackLoadError> {
        let mut tables = Vec::with_capacity(paths.len());
        for path in paths {
            tables.push(Self::load_one_file(path)?);
        }
        Ok(PlaybackTable { tables })
    }

    fn load_one_file(path: &Path) -> Result<Vec<f64>, PlaybackLoadError> {
        let contents = fs::read_to_string(path).map_err(|e| PlaybackLoadError {
            path: path.to_path_buf(),
            source: PlaybackLoadErrorKind::Io(e),
        })?;
        let mut samples = Vec::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let n: u64 = line.parse().map_err(|_| PlaybackLoadError {
                path: path.to_path_buf(),
                source: PlaybackLoadErrorKind::InvalidLine(line.to_string()),
            })?;
            samples.push(n as f64);
        }
        Ok(samples)
    }

    pub fn cpu_count(&self) -> usize {
        self.tables.len()
    }

    /// Choose a CPU index uniformly over `[0, K)`, then a sample uniformly
    /// from that CPU's table. Returns `(cpu_index, service_time)`.
    pub fn sample(&self, rng: &mut dyn RngCore) -> (usize, f64) {
        let cpu = rng.random_range(0..self.tables.len());
        let table = &self.tables[cpu];
        let idx = rng.random_range(0..table.len());
        (cpu, table[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    fn write_table(dir: &tempfile::TempDir, name: &str, values: &[u64]) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        for v in values {
            writeln!(f, "{v}").unwrap();
        }
        path
    }

    #[test]
    fn loads_and_samples_from_configured_cpus() {
        let dir = tempfile::tempdir().unwrap();
        let p0 = write_table(&dir, "cpu0.txt", &[10, 20, 30]);
        let p1 = write_table(&dir, "cpu1.txt", &[100]);
        let table = PlaybackTable::load_from_files(&[p0, p1]).unwrap();
        assert_eq!(table.cpu_count(), 2);

        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..50 {
            let (cpu, val) = table.sample(&mut rng);
            assert!(cpu < 2);
            if cpu == 0 {
                assert!([10.0, 20.0, 30.0].contains(&val));
            } else {
                assert_eq!(val, 100.0);
            }
        }
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let missing = PathBuf::from("/nonexistent/path/does-not-exist.txt");
        let err = PlaybackTable::load_from_files(&[missing]).unwrap_err();
        assert!(matches!(err.source, PlaybackLoadErrorKind::Io(_)));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sparse.txt");
        fs::write(&path, "5\n\n7\n\n").unwrap();
        let table = PlaybackTable::load_from_files(&[path]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..20 {
            let (_, v) = table.sample(&mut rng);
            assert!(v == 5.0 || v == 7.0);
        }
    }
}
