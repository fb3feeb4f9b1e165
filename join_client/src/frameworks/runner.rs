// Framework bootstrap for the join client binary.

use crate::domain::errors::{BackendError, JoinError};
use crate::domain::flow::JoinState;
use crate::domain::ports::{Clock, JoinPorts};
use crate::frameworks::config::{self, Command};
use crate::interface_adapters::clients::BackendClient;
use crate::interface_adapters::navigation::ConsoleNavigator;
use crate::interface_adapters::storage::FileSessionStorage;
use crate::use_cases::join_flow::JoinFlow;
use crate::use_cases::resolve_identity::ResolveIdentityUseCase;
use crate::use_cases::upgrade_identity::{IdentityUpgradeUseCase, UpgradeReport};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("{}", .0.user_message())]
    Join(#[from] JoinError),
    #[error("join flow ended in state {0}")]
    Incomplete(&'static str),
}

// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    // Logs go to stderr; stdout carries the join summary.
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Wires the HTTP backend, file storage and console navigation together.
pub fn build_ports(client: BackendClient, storage: FileSessionStorage) -> JoinPorts {
    let client = Arc::new(client);
    JoinPorts {
        anonymous_auth: client.clone(),
        account_auth: client.clone(),
        profiles: client.clone(),
        rooms: client.clone(),
        merge: client,
        storage: Arc::new(storage),
        navigator: Arc::new(ConsoleNavigator),
        clock: Arc::new(SystemClock),
    }
}

pub fn upgrade_use_case(ports: &JoinPorts) -> IdentityUpgradeUseCase {
    IdentityUpgradeUseCase {
        accounts: ports.account_auth.clone(),
        profiles: ports.profiles.clone(),
        merge: ports.merge.clone(),
        storage: ports.storage.clone(),
        clock: ports.clock.clone(),
    }
}

// Runs one join attempt to completion and returns the final state.
pub async fn join(
    ports: JoinPorts,
    code: &str,
    display_name: Option<&str>,
) -> Result<JoinState, RunError> {
    let flow = JoinFlow::new(ports);
    flow.start().await;

    match flow.submit(code, display_name).await {
        JoinState::Error { error, .. } => Err(error.into()),
        state @ JoinState::Success(_) => Ok(state),
        state => Err(RunError::Incomplete(state.name())),
    }
}

pub async fn run() -> Result<(), RunError> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let command = config::command().map_err(RunError::Config)?;
    let backend_url = config::backend_url().map_err(|e| RunError::Config(e.to_string()))?;
    let session_file = config::session_file();
    tracing::debug!(
        %backend_url,
        session_file = %session_file.display(),
        "join client configured"
    );

    let client = BackendClient::new(backend_url, config::backend_timeout())?;
    let ports = build_ports(client, FileSessionStorage::new(session_file));

    // A merge deferred by an earlier run is replayed before anything else.
    upgrade_use_case(&ports).retry_pending().await.acknowledge();

    match command {
        Command::Join { code, display_name } => {
            join(ports, &code, display_name.as_deref()).await?;
            Ok(())
        }
        Command::SignUp { email } => {
            let previous = resolver(&ports).execute().await;
            let report = upgrade_use_case(&ports).sign_up(&previous, &email).await?;
            summarize("Signed up", &email, report);
            Ok(())
        }
        Command::SignIn { email } => {
            let previous = resolver(&ports).execute().await;
            let report = upgrade_use_case(&ports).sign_in(&previous, &email).await?;
            summarize("Signed in", &email, report);
            Ok(())
        }
    }
}

fn resolver(ports: &JoinPorts) -> ResolveIdentityUseCase {
    ResolveIdentityUseCase {
        storage: ports.storage.clone(),
        profiles: ports.profiles.clone(),
        clock: ports.clock.clone(),
    }
}

fn summarize(verb: &str, email: &str, report: UpgradeReport) {
    if let Some(name) = report.carried_display_name.as_deref() {
        println!("{verb} as {email}; kept display name \"{name}\"");
    } else {
        println!("{verb} as {email}");
    }
    let merged = report.merge.map(|merge| merge.acknowledge()).unwrap_or(true);
    if !merged {
        println!("Guest activity will be transferred on the next run");
    }
}
