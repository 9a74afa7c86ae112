use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use ticket_checkout::application::orchestrator::{
    CheckoutOrchestrator, CheckoutOutcome, Collaborators,
};
use ticket_checkout::config::{ApiSettings, CheckoutConfig, GatewaySettings};
use ticket_checkout::domain::charge::PaypalApproval;
use ticket_checkout::infrastructure::http::HttpApiClient;
use ticket_checkout::interfaces::console::{
    ConsoleHostedCheckout, ConsoleNavigator, ConsoleNotifier, PresetWidgets,
};
use ticket_checkout::interfaces::order_reader::OrderReader;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pending order as a JSON file
    order: PathBuf,

    /// Base URL of the ticketing API
    #[arg(long, env = "CHECKOUT_API_HOST", default_value = "http://localhost:5000")]
    api_host: String,

    /// Path prefix for API calls
    #[arg(long, default_value = "v1")]
    api_namespace: String,

    /// Token sent as `Authorization: JWT <token>`
    #[arg(long, env = "CHECKOUT_AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[arg(long, env = "STRIPE_PUBLISHABLE_KEY")]
    stripe_publishable_key: Option<String>,

    #[arg(long, env = "OMISE_LIVE_PUBLIC")]
    omise_live_public: Option<String>,

    #[arg(long, env = "OMISE_TEST_PUBLIC")]
    omise_test_public: Option<String>,

    /// Card token returned by the card widget. Omit to simulate closing it.
    #[arg(long)]
    stripe_token: Option<String>,

    #[arg(long, requires = "paypal_payment_id")]
    paypal_payer_id: Option<String>,

    #[arg(long, requires = "paypal_payer_id")]
    paypal_payment_id: Option<String>,

    /// Make the payment widget report this validation error
    #[arg(long)]
    widget_error: Option<String>,

    /// Print the payment form for the order and exit
    #[arg(long)]
    describe: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut api = ApiSettings::new(cli.api_host)
        .with_namespace(cli.api_namespace)
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(token) = cli.auth_token {
        api = api.with_auth_token(token);
    }
    let config = CheckoutConfig::new(api.clone()).with_gateways(GatewaySettings {
        stripe_publishable_key: cli.stripe_publishable_key,
        omise_live_public: cli.omise_live_public,
        omise_test_public: cli.omise_test_public,
    });

    let file = File::open(&cli.order).into_diagnostic()?;
    let order = OrderReader::new(file).read().into_diagnostic()?;

    let paypal_approval = match (cli.paypal_payer_id, cli.paypal_payment_id) {
        (Some(payer_id), Some(payment_id)) => Some(PaypalApproval {
            payer_id,
            payment_id,
        }),
        _ => None,
    };
    let widgets = Arc::new(PresetWidgets {
        card_token: cli.stripe_token,
        paypal_approval,
        failure: cli.widget_error,
    });

    let orchestrator = CheckoutOrchestrator::new(
        config,
        Collaborators {
            api: Arc::new(HttpApiClient::new(api).into_diagnostic()?),
            notifier: Arc::new(ConsoleNotifier),
            navigator: Arc::new(ConsoleNavigator),
            card_widget: widgets.clone(),
            paypal_widget: widgets,
            hosted_checkout: Arc::new(ConsoleHostedCheckout),
        },
    );

    if cli.describe {
        let form = orchestrator.payment_form(&order).into_diagnostic()?;
        println!("{:#?}", form);
        return Ok(());
    }

    match orchestrator.checkout(&order).await {
        CheckoutOutcome::Succeeded(_) | CheckoutOutcome::Redirected { .. } => Ok(()),
        CheckoutOutcome::Cancelled => {
            println!("cancelled");
            Ok(())
        }
        CheckoutOutcome::AlreadyInFlight => Ok(()),
        CheckoutOutcome::Failed(_) => Err(miette!("checkout of order {} failed", order.identifier)),
    }
}
