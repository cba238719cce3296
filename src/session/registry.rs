//! Registry of live sessions
//!
//! The map lock is only held to look a session up, insert or remove it. Game
//! operations take the session's own mutex, so different games never wait on
//! each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::JoinHandle;

use chrono::Local;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::agent::build_agent;
use crate::board::Player;
use crate::config::{Difficulty, GameConfig};
use crate::error::SessionError;
use crate::record::{self, JsonlArchive, RecordSink, SampleWriter, TrainingSink};

use super::game::{Opponent, Session, SessionId, Snapshot};

/// Parameters for [`SessionRegistry::create`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewGame {
    /// Falls back to the configured board size
    pub size: Option<usize>,
    pub ai_enabled: bool,
    pub ai_level: Option<Difficulty>,
    pub ai_color: Option<Player>,
}

impl NewGame {
    pub fn hotseat() -> Self {
        Self::default()
    }

    pub fn against_agent(level: Difficulty, color: Player) -> Self {
        Self {
            size: None,
            ai_enabled: true,
            ai_level: Some(level),
            ai_color: Some(color),
        }
    }
}

pub struct SessionRegistry {
    config: GameConfig,
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>,
    archive: Arc<dyn RecordSink>,
    trainer: Option<Arc<dyn TrainingSink>>,
    /// Outstanding archive jobs, joined by [`SessionRegistry::flush`]
    jobs: Mutex<Vec<JoinHandle<()>>>,
}

impl SessionRegistry {
    pub fn new(
        config: GameConfig,
        archive: Arc<dyn RecordSink>,
        trainer: Option<Arc<dyn TrainingSink>>,
    ) -> Self {
        info!(board_size = config.board_size, "creating session registry");
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
            archive,
            trainer,
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// Registry writing to the archive and sample files named in `config`
    pub fn from_config(config: GameConfig) -> Self {
        let archive: Arc<dyn RecordSink> = Arc::new(JsonlArchive::new(config.records_path.clone()));
        let trainer = config.samples_path.clone().map(|path| {
            Arc::new(SampleWriter::new(path, config.board_size)) as Arc<dyn TrainingSink>
        });
        Self::new(config, archive, trainer)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Start a game. If the agent takes Black it opens immediately.
    #[instrument(skip(self))]
    pub fn create(&self, request: NewGame) -> Result<Snapshot, SessionError> {
        let size = request.size.unwrap_or(self.config.board_size);
        let opponent = request.ai_enabled.then(|| {
            let level = request.ai_level.unwrap_or(self.config.default_level);
            Opponent {
                color: request.ai_color.unwrap_or(self.config.default_ai_color),
                level,
                agent: build_agent(level, &self.config),
                ensure_legal: self.config.agent_ensure_legal,
            }
        });

        let (id, session) = {
            let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
            let mut id = new_game_id();
            while sessions.contains_key(&id) {
                id = new_game_id();
            }
            let session = Session::new(id.clone(), size, opponent)?
                .with_model_version(self.config.model_version.clone());
            let session = Arc::new(Mutex::new(session));
            sessions.insert(id.clone(), Arc::clone(&session));
            (id, session)
        };

        // The agent opens outside the map lock
        let mut session = lock(&session);
        session.advance_if_automated_turn(self.config.agent_timeout());
        let snapshot = session.snapshot();
        info!(game_id = %id, size, ai_color = ?snapshot.ai_color, "game created");
        Ok(snapshot)
    }

    pub fn state(&self, id: &str) -> Result<Snapshot, SessionError> {
        let session = self.get(id)?;
        let snapshot = lock(&session).snapshot();
        Ok(snapshot)
    }

    /// Play a human move, then let the agent answer
    #[instrument(skip(self))]
    pub fn play(&self, id: &str, x: i32, y: i32, player: Player) -> Result<Snapshot, SessionError> {
        let session = self.get(id)?;
        let mut session = lock(&session);
        session.apply_move(x, y, player)?;
        session.advance_if_automated_turn(self.config.agent_timeout());
        Ok(session.snapshot())
    }

    /// Let the agent move if it is its turn
    #[instrument(skip(self))]
    pub fn advance(&self, id: &str) -> Result<Snapshot, SessionError> {
        let session = self.get(id)?;
        let mut session = lock(&session);
        session.advance_if_automated_turn(self.config.agent_timeout());
        Ok(session.snapshot())
    }

    /// End a game and hand it to persistence in the background
    #[instrument(skip(self))]
    pub fn finish(
        &self,
        id: &str,
        winner: Option<Player>,
        resign: bool,
    ) -> Result<Snapshot, SessionError> {
        let session = self.get(id)?;
        let (snapshot, record) = {
            let mut session = lock(&session);
            let record = session.finish(winner, resign);
            (session.snapshot(), record)
        };

        if let Some(record) = record {
            let handle = record::dispatch(record, Arc::clone(&self.archive), self.trainer.clone());
            self.jobs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(handle);
        }
        Ok(snapshot)
    }

    /// Drop a session from the registry; returns whether it existed
    pub fn remove(&self, id: &str) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some();
        debug!(game_id = id, removed, "session removed");
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait for every archive job started so far
    pub fn flush(&self) {
        let jobs: Vec<_> = self
            .jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for job in jobs {
            if job.join().is_err() {
                warn!("archive job panicked");
            }
        }
    }

    fn get(&self, id: &str) -> Result<Arc<Mutex<Session>>, SessionError> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| {
                debug!(game_id = id, "session not found");
                SessionError::NotFound { id: id.to_string() }
            })
    }
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `YYYYmmdd-HHMMSS_xxxx`: local time plus four random hex digits
pub fn new_game_id() -> SessionId {
    format!(
        "{}_{:04x}",
        Local::now().format("%Y%m%d-%H%M%S"),
        rand::random::<u16>()
    )
}
