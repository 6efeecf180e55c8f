//! Layered engine configuration, loaded the way `tasker-shared::config`
//! layers its own settings: built-in defaults, an optional TOML file, then
//! environment variables, each overriding the last.
//!
//! `tasker-shared::config::ConfigManager`'s own loading code isn't present in
//! this workspace's reference material (only its re-exported settings types
//! are); the layering order and the `config`-crate builder shape below follow
//! the crate's own documented usage rather than one exact teacher file.

use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

/// Which [`b_runloop::RunLoop`] backend `b_engine::Main` wires up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunLoopBackend {
    /// `b_runloop::PlainRunLoop` — no process watching, LIFO queue.
    Plain,
    /// `b_runloop::TokioRunLoop` — the default; `allocate_preferred`'s choice.
    Tokio,
}

impl Default for RunLoopBackend {
    fn default() -> Self {
        Self::Tokio
    }
}

/// Engine-wide settings: which run loop backend to use, where the
/// persistent database lives (a `sqlx::PgPool` connection string, or unset
/// to run with `b_db::InMemoryDatabase` only), and how many vtables
/// `check_all` is allowed to invalidate in one startup pass.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub run_loop_backend: RunLoopBackend,
    pub database_url: Option<String>,
    pub check_all_on_startup: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            run_loop_backend: RunLoopBackend::default(),
            database_url: None,
            check_all_on_startup: false,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from, in increasing precedence: built-in
    /// defaults, an optional `b-engine.toml` in the current directory, and
    /// `B_`-prefixed environment variables (`B_DATABASE_URL`,
    /// `B_RUN_LOOP_BACKEND`, `B_CHECK_ALL_ON_STARTUP`; `B_DATABASE__URL` also
    /// works via the double-underscore separator for nested keys, though
    /// this schema is currently flat).
    pub fn load() -> EngineResult<Self> {
        Self::load_from(config::File::with_name("b-engine").required(false))
    }

    /// As [`Self::load`], but with a caller-supplied file source — used by
    /// tests to point at a fixture TOML file instead of the current
    /// directory's `b-engine.toml`.
    pub fn load_from(file: config::File<config::FileSourceFile, config::FileFormat>) -> EngineResult<Self> {
        let raw = config::Config::builder()
            .set_default("run_loop_backend", "tokio")
            .map_err(EngineError::Config)?
            .set_default("check_all_on_startup", false)
            .map_err(EngineError::Config)?
            .add_source(file)
            .add_source(config::Environment::with_prefix("B").separator("__"))
            .build()
            .map_err(EngineError::Config)?;

        raw.try_deserialize().map_err(EngineError::Config)
    }
}
