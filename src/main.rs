use clap::Parser;
use ctp_srci::application::click_to_pay::{CheckoutPayload, ClickToPaySession};
use ctp_srci::application::registry::InitiatorRegistry;
use ctp_srci::application::schemes::descriptor_for;
use ctp_srci::config::{CheckoutConfig, Environment};
use ctp_srci::domain::identity::IdentityLookupRequest;
use ctp_srci::domain::state::CtpState;
use ctp_srci::infrastructure::in_memory::{InMemoryEnvironment, InMemoryScriptLoader};
use ctp_srci::infrastructure::sandbox::{SANDBOX_OTP, SandboxSdk};
use ctp_srci::interfaces::csv::card_reader::CardReader;
use miette::{IntoDiagnostic, Result, miette};
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Runs a Click to Pay checkout against a sandbox card network.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV file with the cards of the shopper's profile
    cards: PathBuf,

    /// Card network to check out with ("mc" or "visa")
    #[arg(long, default_value = "mc")]
    scheme: String,

    /// SDK environment; "test" selects sandbox endpoints. Overrides CTP_ENVIRONMENT.
    #[arg(long)]
    environment: Option<String>,

    /// Shopper email used for the identity lookup
    #[arg(long, conflicts_with = "phone")]
    email: Option<String>,

    /// Shopper mobile phone used for the identity lookup
    #[arg(long)]
    phone: Option<String>,

    /// One-time code the shopper types in
    #[arg(long, default_value = SANDBOX_OTP)]
    otp: String,

    /// The network recognizes the shopper's device, skipping the lookup
    #[arg(long)]
    recognized: bool,

    /// Digital card id to check out with (defaults to the first card)
    #[arg(long)]
    card: Option<String>,

    /// The page already loaded the network SDK
    #[arg(long)]
    preloaded: bool,
}

#[derive(Serialize)]
struct Outcome {
    ctp_state: CtpState,
    payload: Option<CheckoutPayload>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let mut config = CheckoutConfig::from_env().into_diagnostic()?;
    if let Some(environment) = &cli.environment {
        config.environment = Environment::parse(environment);
    }
    config.shopper_identity = match (cli.email, cli.phone) {
        (Some(email), _) => Some(IdentityLookupRequest::email(email)),
        (None, Some(phone)) => Some(IdentityLookupRequest::mobile_phone(phone)),
        (None, None) => None,
    };
    if config.dpa_id.is_empty() {
        config.dpa_id = "sandbox-dpa".to_string();
    }

    let descriptor = descriptor_for(&cli.scheme)
        .ok_or_else(|| miette!("Unsupported scheme '{}'", cli.scheme))?;

    // Sandbox network serving the profile cards
    let file = File::open(&cli.cards).into_diagnostic()?;
    let mut cards = Vec::new();
    for card in CardReader::new(file).cards() {
        match card {
            Ok(card) => cards.push(card),
            Err(e) => tracing::warn!(error = %e, "Skipping card"),
        }
    }
    let mut sdk = SandboxSdk::new().with_cards(cards);
    if let Some(identity) = &config.shopper_identity {
        sdk = sdk.with_consumer(identity.value.clone());
    }
    if cli.recognized {
        sdk = sdk.recognized(vec!["sandbox-device-token".to_string()]);
    }

    let environment = InMemoryEnvironment::new();
    let loader = InMemoryScriptLoader::new(environment.clone());
    if cli.preloaded {
        environment.install(descriptor.global_binding, Arc::new(sdk));
    } else {
        loader.publish_on_load(
            descriptor.sdk_url(config.environment),
            descriptor.global_binding,
            Arc::new(sdk),
        );
    }

    let init_params = config.init_params("sandbox-transaction");
    let shopper_identity = config.shopper_identity.clone();
    let registry = InitiatorRegistry::new(config, Arc::new(environment), Arc::new(loader));
    let initiators = registry.create(&[cli.scheme.as_str()]).into_diagnostic()?;

    let (session, on_submit) = ClickToPaySession::acquire(initiators, init_params, shopper_identity);

    let mut state = session.initialize().await;
    if state == CtpState::ShopperIdentified {
        let otp = session.start_identity_validation().await.into_diagnostic()?;
        tracing::info!(channel = %otp.masked_validation_channel, "One-time code sent");
        state = session
            .finish_identity_validation(&cli.otp)
            .await
            .into_diagnostic()?;
    }

    let payload = if state == CtpState::Ready {
        if let Some(card) = &cli.card {
            session.select_card(card).into_diagnostic()?;
        }
        session.checkout().await.into_diagnostic()?;
        Some(on_submit.await.into_diagnostic()?)
    } else {
        None
    };
    session.release();

    let outcome = Outcome {
        ctp_state: state,
        payload,
    };
    serde_json::to_writer_pretty(io::stdout().lock(), &outcome).into_diagnostic()?;
    println!();

    Ok(())
}
