//! idgate: command line front end for the identity-verification workflow.

mod form_file;
mod view;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use idgate_client::{HttpGateway, VerifyGateway};
use idgate_form::set_mode;
use idgate_types::{CustomerContext, CustomerGid, PageLocation, SystemClock, VerifyView};
use idgate_utils::{format_duration, init_logging, LogFormat};
use idgate_validation::{sanitize_form, Validator};
use idgate_verification::{
    start_verification, ActionOutcome, FormContext, IdgateConfig, PageServices, PageSession,
    PollPhase, StartOutcome, StartParams, StatusPoller, SubmitOutcome, UserAction,
};

use crate::form_file::FormFile;
use crate::view::TerminalView;

#[derive(Parser)]
#[command(name = "idgate", about = "Identity verification workflow client")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "IDGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Storefront origin the endpoints are resolved against.
    #[arg(long, env = "IDGATE_BASE_URL")]
    base_url: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "IDGATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "IDGATE_LOG_FORMAT")]
    log_format: Option<String>,

    /// Print UI effects as JSON lines.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Fetch and print the customer's verification state.
    State,

    /// Validate a form file and print per-field messages.
    Validate {
        #[arg(long)]
        form: PathBuf,
    },

    /// Submit a form file through a page session.
    Submit {
        #[arg(long)]
        form: PathBuf,

        #[arg(long, env = "IDGATE_CUSTOMER_ID", conflicts_with = "customer_gid")]
        customer_id: Option<String>,

        #[arg(long, env = "IDGATE_CUSTOMER_GID")]
        customer_gid: Option<String>,
    },

    /// Poll the verification status until it settles.
    Poll {
        #[arg(long, env = "IDGATE_CUSTOMER_GID")]
        customer_gid: String,
    },

    /// Start a hosted verification without the full form.
    Start {
        #[arg(long, env = "IDGATE_CUSTOMER_GID")]
        customer_gid: String,

        /// "individual" or "business".
        #[arg(long)]
        mode: Option<String>,

        #[arg(long)]
        return_to: Option<String>,

        #[arg(long)]
        nzbn: Option<String>,

        #[arg(long)]
        business_name: Option<String>,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<IdgateConfig> {
    let mut config = match &cli.config {
        Some(path) => IdgateConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => IdgateConfig::default(),
    };
    if let Some(base_url) = &cli.base_url {
        config.gateway.base_url = base_url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    let view: Arc<dyn VerifyView> = Arc::new(TerminalView::new(cli.json));
    let gateway: Arc<dyn VerifyGateway> = Arc::new(HttpGateway::new(config.gateway.clone())?);
    let started = Instant::now();

    let code = match cli.command {
        Command::State => {
            let state = gateway.fetch_state().await?;
            println!("{}", serde_json::to_string_pretty(&state)?);
            ExitCode::SUCCESS
        }
        Command::Validate { form } => validate(&FormFile::load(&form)?),
        Command::Submit {
            form,
            customer_id,
            customer_gid,
        } => {
            let file = FormFile::load(&form)?;
            let mut customer = file.customer.clone().unwrap_or_default();
            if customer_id.is_some() || customer_gid.is_some() {
                customer = CustomerContext {
                    id: customer_id,
                    gid: customer_gid,
                    ..customer
                };
            }
            submit(file, customer, gateway, view, config).await?
        }
        Command::Poll { customer_gid } => {
            let location = PageLocation::parse(&config.gateway.base_url)?;
            let poller = StatusPoller::new(
                gateway,
                view,
                Some(CustomerGid::new(customer_gid)?),
                location,
                config.restricted_collection_path.clone(),
                config.polling,
            );
            let mut phase = poller.subscribe();
            poller.start();
            let settled = *phase.wait_for(PollPhase::is_terminal).await?;
            tracing::info!(phase = ?settled, elapsed = %format_duration(started.elapsed()), "polling settled");
            if settled == PollPhase::Verified {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Start {
            customer_gid,
            mode,
            return_to,
            nzbn,
            business_name,
        } => {
            let params = StartParams {
                customer_gid: Some(customer_gid),
                mode,
                return_to,
                nzbn,
                business_name,
                ..StartParams::default()
            };
            let outcome = start_verification(
                gateway.as_ref(),
                view.as_ref(),
                &CustomerContext::default(),
                params,
                &config.gateway.base_url,
            )
            .await;
            match outcome {
                StartOutcome::Redirecting { .. } => ExitCode::SUCCESS,
                other => {
                    eprintln!("verification not started: {other:?}");
                    ExitCode::FAILURE
                }
            }
        }
    };

    Ok(code)
}

fn validate(file: &FormFile) -> ExitCode {
    let mut form = file.to_form();
    set_mode(&mut form, file.mode());
    sanitize_form(&mut form);

    let validator = Validator::from_clock(&SystemClock);
    if validator.is_form_valid(&mut form, false) {
        println!("form is valid");
        return ExitCode::SUCCESS;
    }
    for field in form.fields.iter().filter(|f| f.has_error()) {
        println!("{}: {}", field.name, field.error.as_deref().unwrap_or_default());
    }
    ExitCode::FAILURE
}

async fn submit(
    file: FormFile,
    customer: CustomerContext,
    gateway: Arc<dyn VerifyGateway>,
    view: Arc<dyn VerifyView>,
    config: IdgateConfig,
) -> anyhow::Result<ExitCode> {
    let location = PageLocation::parse(&config.gateway.base_url)?;
    let mut services = PageServices::new(gateway, Arc::clone(&view), customer, location, config);
    if let Some(prefill) = file.prefill.clone() {
        services = services.with_prefill(prefill);
    }
    let session = PageSession::new(services);

    let mut context = FormContext::new(file.root_id(), file.to_form(), view).with_mode(file.mode());
    if let Some(return_to) = &file.return_to {
        context = context.with_return_to(return_to.clone());
    }
    session.on_ready(vec![context]).await;

    let outcome = session
        .dispatch(UserAction::Submit {
            root_id: file.root_id().to_string(),
        })
        .await;
    tracing::info!(?outcome, "submit finished");
    Ok(match outcome {
        ActionOutcome::Submitted(SubmitOutcome::Redirecting { .. })
        | ActionOutcome::Submitted(SubmitOutcome::ShortCircuited { .. }) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}
