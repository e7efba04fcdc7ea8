//! # Corpus Store
//! Append-only record of scored articles as JSON Lines.
//!
//! Appends run under an exclusive lock on a sidecar `<corpus>.lock` file:
//! load existing rows, drop rows whose key is already stored, write
//! everything to a temp file, then rename it over the corpus. Either the
//! whole batch lands or the corpus is left untouched.

use std::{
    collections::HashSet,
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use fs4::fs_std::FileExt;

use crate::article::{ArticleKey, ScoredArticle};
use crate::error::{Result, SentimentError};

#[derive(Debug, Clone)]
pub struct CorpusStore {
    path: PathBuf,
}

impl CorpusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        sibling(&self.path, "lock")
    }

    fn tmp_path(&self) -> PathBuf {
        sibling(&self.path, "tmp")
    }

    /// Read the full corpus. A missing file is an empty corpus.
    pub fn load(&self) -> Result<Vec<ScoredArticle>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SentimentError::persistence("open corpus", e)),
        };

        let mut rows = Vec::new();
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| SentimentError::persistence("read corpus", e))?;
            if line.trim().is_empty() {
                continue;
            }
            let row: ScoredArticle = serde_json::from_str(&line).map_err(|e| {
                SentimentError::persistence(&format!("parse corpus line {}", i + 1), e)
            })?;
            rows.push(row);
        }
        Ok(rows)
    }

    /// Identity keys of every stored row.
    pub fn keys(&self) -> Result<HashSet<ArticleKey>> {
        Ok(self.load()?.iter().map(ScoredArticle::key).collect())
    }

    /// Append a batch atomically. Returns the number of rows written; rows
    /// whose key already exists in the corpus are skipped.
    pub fn append(&self, batch: &[ScoredArticle]) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| SentimentError::persistence("create corpus dir", e))?;
        }

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .map_err(|e| SentimentError::persistence("open corpus lock", e))?;
        FileExt::lock_exclusive(&lock)
            .map_err(|e| SentimentError::persistence("lock corpus", e))?;

        let result = self.append_locked(batch);

        if let Err(e) = FileExt::unlock(&lock) {
            tracing::warn!(error = %e, "corpus unlock failed; lock released on close");
        }
        result
    }

    fn append_locked(&self, batch: &[ScoredArticle]) -> Result<usize> {
        let existing = self.load()?;
        let mut seen: HashSet<ArticleKey> = existing.iter().map(ScoredArticle::key).collect();

        let fresh: Vec<&ScoredArticle> = batch.iter().filter(|r| seen.insert(r.key())).collect();
        if fresh.len() < batch.len() {
            tracing::warn!(
                target: "corpus",
                skipped = batch.len() - fresh.len(),
                "rows already present at append time"
            );
        }
        if fresh.is_empty() {
            return Ok(0);
        }

        let tmp = self.tmp_path();
        let write = || -> std::io::Result<()> {
            let file = File::create(&tmp)?;
            let mut w = BufWriter::new(&file);
            for row in existing.iter().chain(fresh.iter().copied()) {
                serde_json::to_writer(&mut w, row)?;
                w.write_all(b"\n")?;
            }
            w.flush()?;
            drop(w);
            file.sync_all()
        };
        if let Err(e) = write() {
            let _ = fs::remove_file(&tmp);
            return Err(SentimentError::persistence("write corpus", e));
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(SentimentError::persistence("replace corpus", e));
        }

        tracing::info!(
            target: "corpus",
            appended = fresh.len(),
            total = existing.len() + fresh.len(),
            "corpus updated"
        );
        Ok(fresh.len())
    }

    /// Latest `n` rows by date, newest first.
    pub fn recent(&self, n: usize) -> Result<Vec<ScoredArticle>> {
        Ok(recent(&self.load()?, n))
    }
}

/// Latest `n` rows by date, newest first; ties keep the later-appended row first.
pub fn recent(corpus: &[ScoredArticle], n: usize) -> Vec<ScoredArticle> {
    let mut rows: Vec<&ScoredArticle> = corpus.iter().rev().collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows.into_iter().take(n).cloned().collect()
}

fn sibling(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}
