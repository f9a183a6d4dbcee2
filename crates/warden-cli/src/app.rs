//! Command execution for the warden binary.

use tracing_subscriber::EnvFilter;

use warden_acl::{
    AccessDecision, Action, Identity, Owned, Principal, PrincipalId, ResourceKind, ResourceRef,
    Role, decide,
};
use warden_api::{AppState, Server};
use warden_auth_jwt::JwtAuthority;

use crate::cli::{CheckArgs, CliArgs, Command};
use crate::config::WardenConfig;
use crate::config_handlers;
use crate::{Error, Result};

/// Initialise tracing-based logging.
///
/// `RUST_LOG` wins when set; otherwise the verbosity flags, then the
/// configured directives.
pub fn init_logging(configured: &str, verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(configured)
    };

    // A subscriber may already be installed (e.g. in tests).
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Run the CLI with the given arguments.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.as_deref();

    match args.command {
        Command::Config(cmd) => {
            init_logging("warn", args.verbose, args.quiet);
            config_handlers::handle_config_command(config_path, cmd.command)
        }
        Command::Check(check) => {
            init_logging("warn", args.verbose, args.quiet);
            let decision = evaluate(&check)?;
            println!("{decision}");
            Ok(())
        }
        Command::Serve { host, port } => {
            let mut config = WardenConfig::load(config_path)?;
            init_logging(&config.logging.level, args.verbose, args.quiet);
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
    }
}

/// Evaluate the decision described by `check`.
pub fn evaluate(check: &CheckArgs) -> Result<AccessDecision> {
    let action: Action = check.action.parse()?;
    let kind: ResourceKind = check.kind.parse()?;

    let principal = match &check.principal {
        Some(id) => {
            let id: PrincipalId = id.parse()?;
            let role: Role = check.role.parse()?;
            Principal::from(Identity::new(id, role))
        }
        None => Principal::Anonymous,
    };

    let resource = match (&check.owner, check.unowned) {
        (Some(owner), _) => Some(ResourceRef::owned_by(owner.parse::<PrincipalId>()?)),
        (None, true) => Some(ResourceRef::unowned()),
        (None, false) => None,
    };

    let decision = decide(
        &principal,
        action,
        kind,
        resource.as_ref().map(|r| r as &dyn Owned),
    );
    log::debug!("{principal} {action} {kind}: {decision}");
    Ok(decision)
}

/// Build application state from configuration, seeding the startup admin.
pub async fn build_state(config: &WardenConfig) -> Result<AppState> {
    let authority = JwtAuthority::new(&config.auth.secret, config.auth.issuer.clone())
        .with_ttl(config.auth.token_ttl())
        .with_refresh_ttl(config.auth.refresh_ttl());
    let state = AppState::new(authority);

    if let Some((email, password)) = config.auth.admin_credentials() {
        let username = email.split('@').next().unwrap_or(email);
        state
            .seed_admin(username, email, password)
            .await
            .map_err(|e| Error::config(format!("could not create admin account: {e}")))?;
    }
    Ok(state)
}

async fn serve(config: WardenConfig) -> Result<()> {
    config.validate_for_serve()?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        auth = config.auth.enabled,
        "Starting warden"
    );
    let state = build_state(&config).await?;
    let server = Server::new(
        &config.server.host,
        config.server.port,
        state,
        config.auth.middleware_config(),
    )?;
    server.run().await?;
    Ok(())
}
