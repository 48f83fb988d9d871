//! `plans-payments` binary.
//!
//! - `plans-payments` / `plans-payments serve` - run the HTTP server
//! - `plans-payments renew <user_id>...` - renew the plans of the given users

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use plans_payments::adapters::email::{ResendConfig, ResendEmailSender};
use plans_payments::adapters::gateway::development_gateways;
use plans_payments::adapters::http::{app_router, PaymentsAppState};
use plans_payments::adapters::plans::LoggingCompletionListener;
use plans_payments::adapters::postgres::{
    PostgresBillingProfileReader, PostgresOrderRepository, PostgresPaymentRepository,
    PostgresRecurringPlanRepository,
};
use plans_payments::config::{AppConfig, ServerConfig};

fn init_tracing(server: &ServerConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(env_filter);

    if server.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_state(config: &AppConfig) -> Result<PaymentsAppState, Box<dyn Error>> {
    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let gateways = development_gateways(
        &config.payment.variant_list(),
        config.payment.return_urls(),
        config.server.is_production(),
    );

    let email = ResendEmailSender::new(
        ResendConfig::new(
            config.email.resend_api_key.expose_secret().clone(),
            config.email.from_header(),
        )
        .with_base_url(config.email.api_base_url.clone()),
    )?;

    Ok(PaymentsAppState {
        payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
        orders: Arc::new(PostgresOrderRepository::new(pool.clone())),
        recurring: Arc::new(PostgresRecurringPlanRepository::new(pool.clone())),
        billing_profiles: Arc::new(PostgresBillingProfileReader::new(pool)),
        completion: Arc::new(LoggingCompletionListener::new()),
        email: Arc::new(email),
        gateways,
        fee_policy: config.payment.fee_policy(),
        return_order_on_refund: config.payment.return_order_on_refund,
    })
}

async fn serve(config: &AppConfig, state: PaymentsAppState) -> Result<(), Box<dyn Error>> {
    let addr = config.server.socket_addr()?;
    let app = app_router(state, config.server.request_timeout());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}

/// Renew each user in turn; one failing user does not stop the others.
async fn renew(state: &PaymentsAppState, user_ids: &[String]) -> Result<(), Box<dyn Error>> {
    let failures = state.renew_account_handler().handle_all(user_ids).await;
    if failures > 0 {
        return Err(format!("{} of {} renewals failed", failures, user_ids.len()).into());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let state = build_state(&config).await?;

    match args.split_first() {
        None => serve(&config, state).await,
        Some((command, _)) if command == "serve" => serve(&config, state).await,
        Some((command, user_ids)) if command == "renew" && !user_ids.is_empty() => {
            renew(&state, user_ids).await
        }
        Some(_) => Err("usage: plans-payments [serve | renew <user_id>...]".into()),
    }
}
