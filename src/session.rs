//! Process-wide mutator session: config, loaded ISA, and PRNG, built
//! once under a one-shot guard and shared read-only (besides the PRNG
//! and output-length bookkeeping, which take an internal lock) for the
//! life of the process.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use crate::config::Config;
use crate::error::Result;
use crate::log;
use crate::prng::Prng;
use crate::schema::{load_isa_config, IsaConfig};

pub struct Session {
    pub config: Config,
    pub isa: IsaConfig,
    prng: Mutex<Prng>,
    last_out_len: Mutex<usize>,
}

static SESSION: OnceLock<Session> = OnceLock::new();

impl Session {
    fn build() -> Result<Self> {
        log::init();

        let config = Config::load_from_env()?;
        let root_dir = std::env::var("PROJECT_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let override_path = std::env::var("AFL_ISA_MAP").ok().map(PathBuf::from);
        let isa = load_isa_config(&root_dir, &config.isa_name, override_path.as_deref())?;

        Ok(Session {
            config,
            isa,
            prng: Mutex::new(Prng::from_time()),
            last_out_len: Mutex::new(0),
        })
    }

    /// Construct the singleton on first call; later calls return the
    /// already-built session unchanged.
    pub fn init() -> Result<&'static Session> {
        if let Some(existing) = SESSION.get() {
            return Ok(existing);
        }
        let session = Session::build()?;
        Ok(SESSION.get_or_init(|| session))
    }

    /// Access the singleton, if [`Session::init`] has already run.
    pub fn get() -> Option<&'static Session> {
        SESSION.get()
    }

    /// Run `f` with exclusive access to the session PRNG.
    pub fn with_prng<R>(&self, f: impl FnOnce(&mut Prng) -> R) -> R {
        let mut guard = self.prng.lock().unwrap();
        f(&mut guard)
    }

    pub fn record_out_len(&self, len: usize) {
        *self.last_out_len.lock().unwrap() = len;
    }

    /// Length written by the most recent `fuzz` call.
    pub fn last_out_len(&self) -> usize {
        *self.last_out_len.lock().unwrap()
    }
}
