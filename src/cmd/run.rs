//! `callback-relay run`: start the relay server.
//!
//! Resolves settings from flags and the properties file, loads and
//! compiles the routing file, then serves until SIGTERM / Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::RunArgs;
use crate::config::properties::Properties;
use crate::config::rules::load_rules;
use crate::config::{validation, Settings};
use crate::error::RelayError;
use crate::logging;
use crate::relay::forward::Forwarder;
use crate::relay::routing::RuleSet;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), RelayError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let props = Properties::load(args.conf.as_deref()).await?;
    let settings = Settings::resolve(&args, &props)?;

    tracing::info!(path = %settings.router_file.display(), "loading routing file");
    let rules = load_rules(&settings.router_file).await?;

    // Problems are reported but not fatal: a bad rule never matches.
    if let Err(errors) = validation::validate(&rules, Some(&settings.default_target)) {
        for e in &errors {
            tracing::warn!(
                rule = %e.rule,
                field = %e.field,
                message = %e.message,
                "routing file problem"
            );
        }
    }
    if settings.default_target.is_empty() {
        tracing::warn!("no default forward URL, unmatched callbacks will fail");
    }

    let rule_set = RuleSet::compile(rules, settings.default_target.clone());

    let state = Arc::new(AppState {
        rules: rule_set,
        signing_key: settings.signing_key,
        forwarder: Forwarder::new(
            server::build_http_client(),
            args.timeout.map(Duration::from_millis),
        ),
    });
    let rule_count = state.rules.len();

    let router = server::build_router(state, args.max_body);

    let addr: SocketAddr = format!("{}:{}", args.host, settings.port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        rules = rule_count,
        default_target = %settings.default_target,
        forward_timeout_ms = args.timeout,
        "callback-relay started"
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(server::shutdown_signal())
    .await?;

    tracing::info!("callback-relay stopped");
    Ok(())
}
