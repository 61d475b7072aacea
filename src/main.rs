use std::sync::Arc;

use colored::Colorize;
use cubebeat_bot::{BotController, BotRegistry, BotServices, RoomUser};
use cubebeat_core::{CubeLedger, JsonFileStore, LedgerError, RoleError, RolePolicy};
use cubebeat_search::{MusicSearch, SearchError};
use log::{error, info, warn};
use thiserror::Error;
use tokio::runtime::{self, Runtime};

use crate::{console::ConsoleSession, settings::Settings};

mod console;
mod logging;
mod settings;

pub struct Cubebeat {
    settings: Settings,
    registry: BotRegistry,
    bot: Arc<BotController>,
    session: Arc<ConsoleSession>,
    runtime: Runtime,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("{0} is not set")]
    MissingVariable(&'static str),

    #[error("Could not load the cube ledger: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Could not load VIP grants: {0}")]
    Roles(#[from] RoleError),

    #[error("Could not set up music search: {0}")]
    Search(#[from] SearchError),

    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl Cubebeat {
    fn new() -> Result<Self, StartupError> {
        let settings = Settings::from_env()?;

        info!("Building async runtime...");
        let runtime = runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("cubebeat-async")
            .build()
            .map_err(|e| StartupError::Fatal(e.to_string()))?;

        info!("Loading cube ledger from {}", settings.ledger_path.display());
        let ledger = CubeLedger::open(
            JsonFileStore::new(&settings.ledger_path),
            settings.config.daily_reward,
        )?;

        let roles = RolePolicy::with_store(settings.config.owners.clone(), &settings.vip_path)?;

        let search = MusicSearch::new(
            settings.credentials.clone(),
            settings.config.request_timeout(),
        )?;

        let configured = search.configured();

        if configured.is_empty() {
            warn!("No music platform credentials are set, song requests will find nothing");
        } else {
            let names: Vec<_> = configured.iter().map(|p| p.name()).collect();
            info!("Searching {}", names.join(", "));
        }

        let services = BotServices {
            ledger: Arc::new(ledger),
            search: Arc::new(search),
            roles: Arc::new(roles),
        };

        let session = Arc::new(ConsoleSession::default());
        let bot = BotController::new(
            settings.room_id.clone(),
            settings.config.clone(),
            session.clone(),
            services,
        );

        Ok(Self {
            settings,
            registry: BotRegistry::default(),
            bot,
            session,
            runtime,
        })
    }

    fn run(&self) -> anyhow::Result<()> {
        info!(
            "Joining room {} as {} (token {})",
            self.settings.room_id,
            self.settings.config.bot_username,
            self.settings.token_hint()
        );

        let bot_user = RoomUser::new("bot", self.settings.config.bot_username.clone());

        self.runtime.block_on(async {
            self.registry.start(self.bot.clone()).await?;

            let result = tokio::select! {
                result = console::run(self.bot.clone(), self.session.clone(), bot_user) => result,
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    Ok(())
                }
            };

            self.registry.stop_all().await;
            result
        })
    }
}

impl StartupError {
    fn hint(&self) -> String {
        match self {
            StartupError::MissingVariable(name) => format!("Set {} in the environment. HIGHRISE_ROOM_ID and HIGHRISE_API_TOKEN are both required.", name),
            StartupError::Ledger(_) => "The ledger file exists but could not be read. Check its permissions, or move it away to start with an empty ledger.".to_string(),
            StartupError::Roles(_) => "The VIP grants file could not be read. It should contain a JSON list of usernames.".to_string(),
            StartupError::Search(_) => "The HTTP client could not be created. This usually means TLS is unavailable on this system.".to_string(),
            StartupError::Fatal(_) => "This error is fatal, and should not happen.".to_string(),
        }
    }
}

fn main() {
    let verbosity = logging::Verbosity::from_env();
    let rejected = verbosity.rejected.clone();

    if let Err(e) = logging::init_logger(verbosity) {
        eprintln!("Could not initialize logging: {}", e);
    }

    for part in rejected {
        warn!("Ignoring {:?} in {}", part, logging::LOG_VARIABLE);
    }

    match Cubebeat::new() {
        Ok(cubebeat) => {
            info!("Initialized successfully.");

            if let Err(e) = cubebeat.run() {
                error!("{:#}", e);
            }
        }
        Err(error) => {
            error!("{} Read the error below to troubleshoot the issue.", "Cubebeat failed to start!".bold().red());
            error!("{}", error);
            error!(
                "{}",
                format!("Hint: {}", error.hint())
                    .dimmed()
                    .italic()
            );
            std::process::exit(1);
        }
    }
}
