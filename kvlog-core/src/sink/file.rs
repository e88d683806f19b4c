//! File sink: one buffered file per level, rotated by size.
//!
//! Layout inside the configured directory:
//!
//! ```text
//! info.log       INFO records
//! warning.log    WARN records
//! error.log      ERROR records
//! info.log.20261018-142501.123   rotated segments
//! ```
//!
//! When `rotate_size` is positive, a file that would grow past it is renamed
//! with a timestamp suffix and a fresh file is opened. When `max_files` is
//! positive, only that many rotated segments are kept per level.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;

use crate::context::Context;
use crate::env::ProcessEnv;
use crate::error::{IoResultExt, LogError, LogResult};
use crate::field::Field;
use crate::handler::Handler;
use crate::level::Level;
use crate::sink::pattern::{Render, DEFAULT_PATTERN};

/// Buffer size used when the configured one is not positive.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

const LEVELS: [Level; 3] = [Level::Info, Level::Warn, Level::Error];

struct LevelFile {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
    /// Set when a rotation left the writer pointing at a renamed segment.
    failed: bool,
}

impl LevelFile {
    fn open(path: PathBuf, buffer_size: usize) -> LogResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_path(&path)?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            writer: BufWriter::with_capacity(buffer_size, file),
            path,
            written,
            failed: false,
        })
    }
}

struct Inner {
    files: Vec<LevelFile>,
    render: Render,
}

/// Writes rendered records into per-level files under a directory.
pub struct FileHandler {
    dir: PathBuf,
    buffer_size: usize,
    rotate_size: u64,
    max_files: usize,
    inner: Mutex<Inner>,
}

impl FileHandler {
    /// Creates `dir` if needed and opens one file per level.
    pub fn new(
        dir: impl AsRef<Path>,
        buffer_size: i64,
        rotate_size: i64,
        max_files: i32,
    ) -> LogResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).with_path(&dir)?;

        let buffer_size = usize::try_from(buffer_size)
            .ok()
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_BUFFER_SIZE);
        let files = LEVELS
            .iter()
            .map(|lv| LevelFile::open(dir.join(format!("{}.log", lv.file_stem())), buffer_size))
            .collect::<LogResult<Vec<_>>>()?;

        Ok(Self {
            dir,
            buffer_size,
            rotate_size: u64::try_from(rotate_size).unwrap_or(0),
            max_files: usize::try_from(max_files).unwrap_or(0),
            inner: Mutex::new(Inner {
                files,
                render: Render::new(DEFAULT_PATTERN, ProcessEnv::from_env()),
            }),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn rotate(&self, file: &mut LevelFile) -> LogResult<()> {
        self.rotate_with(file, |path| LevelFile::open(path, self.buffer_size))
    }

    fn rotate_with(
        &self,
        file: &mut LevelFile,
        open: impl FnOnce(PathBuf) -> LogResult<LevelFile>,
    ) -> LogResult<()> {
        file.writer.flush().with_path(&file.path)?;

        let stamp = Local::now().format("%Y%m%d-%H%M%S%.3f").to_string();
        let mut target = suffixed(&file.path, &stamp);
        let mut n = 1;
        while target.exists() {
            target = suffixed(&file.path, &format!("{}.{}", stamp, n));
            n += 1;
        }
        fs::rename(&file.path, &target).with_path(&file.path)?;

        match open(file.path.clone()) {
            Ok(fresh) => *file = fresh,
            Err(e) => {
                // The old writer is only valid again under its original name.
                if let Err(undo) = fs::rename(&target, &file.path) {
                    tracing::warn!(
                        sink = "file",
                        path = %file.path.display(),
                        error = %undo,
                        "log file left unavailable after failed rotation"
                    );
                    file.failed = true;
                }
                return Err(e);
            }
        }
        self.prune(&file.path)
    }

    /// Removes the oldest rotated segments beyond `max_files`.
    fn prune(&self, active: &Path) -> LogResult<()> {
        if self.max_files == 0 {
            return Ok(());
        }
        let prefix = match active.file_name() {
            Some(name) => format!("{}.", name.to_string_lossy()),
            None => return Ok(()),
        };
        let mut rotated: Vec<PathBuf> = fs::read_dir(&self.dir)
            .with_path(&self.dir)?
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().starts_with(&prefix))
                    .unwrap_or(false)
            })
            .collect();
        if rotated.len() <= self.max_files {
            return Ok(());
        }
        rotated.sort();
        let excess = rotated.len() - self.max_files;
        for path in rotated.into_iter().take(excess) {
            fs::remove_file(&path).with_path(&path)?;
        }
        Ok(())
    }

    fn write_line(&self, file: &mut LevelFile, line: &str, level: Level) -> LogResult<()> {
        if file.failed {
            return Err(LogError::io(
                &file.path,
                io::Error::other("file unavailable after failed rotation"),
            ));
        }
        let len = line.len() as u64 + 1;
        if self.rotate_size > 0 && file.written > 0 && file.written + len > self.rotate_size {
            self.rotate(file)?;
        }
        writeln!(file.writer, "{}", line).with_path(&file.path)?;
        file.written += len;
        if level == Level::Error {
            file.writer.flush().with_path(&file.path)?;
        }
        Ok(())
    }
}

fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

fn level_index(level: Level) -> usize {
    match level {
        Level::Info => 0,
        Level::Warn => 1,
        Level::Error => 2,
    }
}

impl Handler for FileHandler {
    fn name(&self) -> &str {
        "file"
    }

    fn log(&self, ctx: &Context, level: Level, fields: &[Field]) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let inner = &mut *guard;
        let line = inner.render.render(ctx, level, fields);
        let file = &mut inner.files[level_index(level)];
        if let Err(e) = self.write_line(file, &line, level) {
            tracing::warn!(sink = "file", error = %e, "failed to write log record");
        }
    }

    fn set_format(&self, format: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.render.set_pattern(format);
    }

    fn close(&self) -> LogResult<()> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let mut first = None;
        for file in inner.files.iter_mut() {
            if let Err(e) = file.writer.flush() {
                first.get_or_insert_with(|| {
                    LogError::close(self.name(), format!("{}: {}", file.path.display(), e))
                });
            }
        }
        first.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::kv;

    fn rotated_count(dir: &Path, stem: &str) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .flatten()
            .filter(|e| {
                let name = e.file_name().to_string_lossy().to_string();
                name.starts_with(&format!("{}.log.", stem))
            })
            .count()
    }

    #[test]
    fn test_records_split_by_level() {
        let dir = tempfile::tempdir().unwrap();
        let h = FileHandler::new(dir.path(), 0, 0, 0).unwrap();
        h.set_format("%L %M");
        h.log(&Context::background(), Level::Info, &[kv("log", "hello")]);
        h.log(&Context::background(), Level::Error, &[kv("log", "boom")]);
        h.close().unwrap();

        let info = fs::read_to_string(dir.path().join("info.log")).unwrap();
        let error = fs::read_to_string(dir.path().join("error.log")).unwrap();
        let warning = fs::read_to_string(dir.path().join("warning.log")).unwrap();
        assert_eq!(info, "INFO hello\n");
        assert_eq!(error, "ERROR boom\n");
        assert!(warning.is_empty());
    }

    #[test]
    fn test_rotates_and_prunes() {
        let dir = tempfile::tempdir().unwrap();
        let h = FileHandler::new(dir.path(), 16, 20, 2).unwrap();
        h.set_format("%M");
        for i in 0..6 {
            h.log(
                &Context::background(),
                Level::Info,
                &[kv("log", format!("record number {}", i))],
            );
        }
        h.close().unwrap();

        assert_eq!(rotated_count(dir.path(), "info"), 2);
        let active = fs::read_to_string(dir.path().join("info.log")).unwrap();
        assert_eq!(active, "record number 5\n");
    }

    #[test]
    fn test_failed_reopen_keeps_active_file() {
        let dir = tempfile::tempdir().unwrap();
        let h = FileHandler::new(dir.path(), 0, 0, 0).unwrap();
        h.set_format("%M");
        h.log(&Context::background(), Level::Info, &[kv("log", "before")]);
        {
            let mut guard = h.inner.lock().unwrap();
            let file = &mut guard.files[0];
            let err = h
                .rotate_with(file, |path| {
                    Err(LogError::io(path, io::Error::other("no space left")))
                })
                .unwrap_err();
            assert!(matches!(err, LogError::Io { .. }));
            assert!(!file.failed);
        }
        h.log(&Context::background(), Level::Info, &[kv("log", "after")]);
        h.close().unwrap();

        assert_eq!(rotated_count(dir.path(), "info"), 0);
        let active = fs::read_to_string(dir.path().join("info.log")).unwrap();
        assert_eq!(active, "before\nafter\n");
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        let h = FileHandler::new(&nested, 0, 0, 0).unwrap();
        assert!(nested.join("warning.log").exists());
        assert_eq!(h.dir(), nested.as_path());
    }
}
