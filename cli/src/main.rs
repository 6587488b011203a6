//! CLI entrypoint for chain-agent
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use chain_agent_application::{
    CapabilityExecutor, ConversationLogger, HandlerTable, ModelAdapter, NoTurnObserver,
    RunTurnUseCase, SessionManager, TurnObserver,
};
use chain_agent_domain::{OutputFormat, SessionId, blockchain_registry};
use chain_agent_infrastructure::{
    ChainToolkit, ConfigLoader, FileConfig, JsonlConversationLogger, ProviderKind, create_backend,
    register_blockchain_handlers,
};
use chain_agent_presentation::{ChatRepl, Cli, ConsoleFormatter, ProgressReporter};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    // Load configuration before logging so logging.dir can take effect
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    let log_dir = cli
        .log_dir
        .clone()
        .or_else(|| config.logging.dir.as_ref().map(PathBuf::from));
    let _guard = init_tracing(cli.verbose, log_dir.as_ref());

    info!("Starting chain-agent");

    let issues = config.validate();
    for issue in issues.iter().filter(|issue| !issue.is_error()) {
        eprintln!("{}", issue);
    }
    let errors: Vec<_> = issues.iter().filter(|issue| issue.is_error()).collect();
    if !errors.is_empty() {
        for issue in &errors {
            eprintln!("{}", issue);
        }
        bail!("Configuration has {} error(s)", errors.len());
    }

    // === Dependency Injection ===
    let mut params = config.agent.to_agent_params();
    if let Some(policy) = cli.no_call_policy {
        params = params.with_no_call_policy(policy.into());
    }

    let kind: ProviderKind = cli
        .provider
        .as_deref()
        .unwrap_or(config.providers.default.as_str())
        .parse()?;
    let backend = create_backend(&config.providers, kind, cli.model.as_deref())?;
    let backend_label = format!("{} ({})", backend.name(), backend.model());
    info!("Using backend {}", backend_label);

    let registry = Arc::new(blockchain_registry()?);
    let toolkit = Arc::new(ChainToolkit::from_config(&config.chain)?);
    let handlers = register_blockchain_handlers(HandlerTable::builder(), toolkit)
        .build(&registry)
        .context("Capability handlers do not match the registry")?;

    let adapter = ModelAdapter::new(backend, registry.clone());
    let executor = CapabilityExecutor::new(registry, Arc::new(handlers));
    let mut turn = RunTurnUseCase::new(adapter, executor);
    if let Some(logger) = conversation_logger(&config, log_dir.as_ref()) {
        turn = turn.with_conversation_logger(logger);
    }

    let manager = Arc::new(SessionManager::new(turn, params)?);
    let session_id = SessionId::new(format!("cli-{}", std::process::id()))?;

    let output = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();
    let formatter = ConsoleFormatter::new().with_color(config.output.color);

    // Chat mode
    if cli.chat {
        let repl = ChatRepl::new(manager, session_id)
            .with_backend_label(backend_label)
            .with_progress(!cli.quiet && config.repl.show_progress)
            .with_output(output)
            .with_formatter(formatter)
            .with_history_file(config.repl.history_file.as_ref().map(PathBuf::from));

        repl.run().await?;
        return Ok(());
    }

    // Single query mode - query is required
    let Some(query) = cli.query else {
        bail!("Query is required. Use --chat for interactive mode.");
    };

    let outcome = if cli.quiet {
        manager
            .handle_turn_observed(&session_id, &query, &NoTurnObserver)
            .await?
    } else {
        let progress = ProgressReporter::new();
        let observer: &dyn TurnObserver = &progress;
        manager
            .handle_turn_observed(&session_id, &query, observer)
            .await?
    };

    println!("{}", formatter.render(&outcome, output));

    Ok(())
}

/// Initialize logging based on verbosity level, optionally mirroring to a
/// daily rolling file.
fn init_tracing(verbose: u8, log_dir: Option<&PathBuf>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "chain-agent.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

fn conversation_logger(
    config: &FileConfig,
    log_dir: Option<&PathBuf>,
) -> Option<Arc<dyn ConversationLogger>> {
    if !config.logging.conversation_log && log_dir.is_none() {
        return None;
    }
    let dir = log_dir.cloned().unwrap_or_else(|| PathBuf::from("."));
    match JsonlConversationLogger::in_dir(&dir) {
        Ok(logger) => {
            info!("Conversation log: {}", logger.path().display());
            Some(Arc::new(logger))
        }
        Err(e) => {
            warn!("Conversation log disabled ({}): {}", dir.display(), e);
            None
        }
    }
}
