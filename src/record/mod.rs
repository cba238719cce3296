//! Finished-game records
//!
//! A game is archived once, after it is finished. Archiving and sample
//! extraction run on a background thread; their failures are logged and
//! never touch the session they came from.

pub mod training;

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::board::{Move, Player};
use crate::config::Difficulty;
use crate::error::StoreError;

pub use training::{samples_from_record, SampleWriter, TrainingSample, TrainingSink};

/// Rules the game was played under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFlags {
    pub double_three: bool,
    pub overline: bool,
}

impl Default for RuleFlags {
    fn default() -> Self {
        Self {
            double_three: true,
            overline: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RecordMeta {
    pub model_version: String,
    pub ai_level: Option<Difficulty>,
    pub ai_color: Option<Player>,
}

/// One line of the archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: String,
    pub size: usize,
    pub rules: RuleFlags,
    pub moves: Vec<Move>,
    pub winner: Option<Player>,
    pub resign: bool,
    pub duration_ms: Option<u64>,
    pub meta: RecordMeta,
}

/// Persistence collaborator
pub trait RecordSink: Send + Sync {
    fn append(&self, record: &GameRecord) -> Result<(), StoreError>;
}

/// Append-only JSON-lines archive
pub struct JsonlArchive {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record back; malformed lines are skipped
    pub fn load(&self) -> Result<Vec<GameRecord>, StoreError> {
        load_records(&self.path)
    }
}

impl RecordSink for JsonlArchive {
    fn append(&self, record: &GameRecord) -> Result<(), StoreError> {
        let line = serde_json::to_string(record)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        append_line(&self.path, &line)
    }
}

/// Keeps records in memory; used by the desktop app when no archive is wanted
/// and by tests
#[derive(Default)]
pub struct MemoryArchive {
    records: Mutex<Vec<GameRecord>>,
}

impl MemoryArchive {
    pub fn records(&self) -> Vec<GameRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RecordSink for MemoryArchive {
    fn append(&self, record: &GameRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}

/// Append one line to a file, creating parent directories as needed
pub(crate) fn append_line(path: &Path, line: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}

/// Load an archive, skipping lines that do not parse. A missing file is empty.
pub fn load_records(path: &Path) -> Result<Vec<GameRecord>, StoreError> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut records = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(err) => warn!(line = number + 1, error = %err, "skipping malformed record"),
        }
    }
    Ok(records)
}

/// Hand a finished game to persistence and training on a background thread
pub fn dispatch(
    record: GameRecord,
    archive: Arc<dyn RecordSink>,
    trainer: Option<Arc<dyn TrainingSink>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        match archive.append(&record) {
            Ok(()) => info!(game_id = %record.game_id, moves = record.moves.len(), "game archived"),
            Err(err) => warn!(game_id = %record.game_id, error = %err, "archiving failed"),
        }

        if let Some(trainer) = trainer {
            match trainer.submit(&record) {
                Ok(samples) => info!(game_id = %record.game_id, samples, "training samples queued"),
                Err(err) => warn!(game_id = %record.game_id, error = %err, "sample extraction failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_record(id: &str) -> GameRecord {
        GameRecord {
            game_id: id.to_string(),
            size: 15,
            rules: RuleFlags::default(),
            moves: vec![
                Move { x: 7, y: 7, player: Player::Black },
                Move { x: 7, y: 8, player: Player::White },
            ],
            winner: Some(Player::Black),
            resign: true,
            duration_ms: Some(1200),
            meta: RecordMeta {
                model_version: "v0-heuristic".to_string(),
                ai_level: Some(Difficulty::Hard),
                ai_color: Some(Player::White),
            },
        }
    }

    #[test]
    fn test_record_wire_format() {
        let json = serde_json::to_value(sample_record("g1")).unwrap();
        assert_eq!(json["moves"][1], serde_json::json!({"x": 7, "y": 8, "p": 2}));
        assert_eq!(json["winner"], 1);
        assert_eq!(json["rules"]["double_three"], true);
        assert_eq!(json["meta"]["ai_level"], "hard");
    }

    #[test]
    fn test_jsonl_archive_appends_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let archive = JsonlArchive::new(dir.path().join("nested/games.jsonl"));
        archive.append(&sample_record("a")).unwrap();
        archive.append(&sample_record("b")).unwrap();

        let loaded = archive.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].game_id, "a");
        assert_eq!(loaded[1], sample_record("b"));
    }

    #[test]
    fn test_load_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.jsonl");
        let good = serde_json::to_string(&sample_record("ok")).unwrap();
        std::fs::write(&path, format!("{good}\nnot json\n\n{{\"game_id\": 3}}\n")).unwrap();

        let loaded = load_records(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].game_id, "ok");
    }

    #[test]
    fn test_missing_archive_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_records(&dir.path().join("absent.jsonl")).unwrap().is_empty());
    }

    struct Failing;

    impl RecordSink for Failing {
        fn append(&self, _record: &GameRecord) -> Result<(), StoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
    }

    #[test]
    fn test_dispatch_swallows_failures() {
        let handle = dispatch(sample_record("x"), Arc::new(Failing), None);
        assert!(handle.join().is_ok());
    }

    #[test]
    fn test_dispatch_reaches_archive() {
        let archive = Arc::new(MemoryArchive::default());
        dispatch(sample_record("m"), archive.clone(), None).join().unwrap();
        assert_eq!(archive.records().len(), 1);
    }
}
