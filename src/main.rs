use analytics::{sweep, ForecastState, SweepRange};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use configuration::{Config, LogFormat};
use core_types::{CampaignInputs, InputField, OutputMetric};
use session::Session;
use std::path::PathBuf;

mod display;
mod render;
mod session;

/// The main entry point for the media forecast calculator.
fn main() -> anyhow::Result<()> {
    // FORECAST__* overrides may live in a .env file
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config =
        configuration::load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    let _log_guard = configuration::init_tracing(&config.logging)?;
    tracing::debug!(?config, "Configuration loaded.");

    // Execute the appropriate command
    match cli.command {
        Commands::Forecast(args) => handle_forecast(args, &config),
        Commands::Session => handle_session(&config),
        Commands::Sweep(args) => handle_sweep(args, &config),
        Commands::Fields => {
            println!("{}", render::input_fields_table());
            println!("{}", render::output_metrics_table());
            Ok(())
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Projects ad campaign performance (impressions, clicks, orders, revenue,
/// ROAS, CPA) from spend and funnel rates.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to ./forecast.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured log line style.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive every metric once from the defaults and any overrides.
    Forecast(ForecastArgs),
    /// Adjust inputs interactively and watch the metrics respond.
    Session,
    /// Tabulate metrics while one input walks across a range.
    Sweep(SweepArgs),
    /// List every input and output with ranges and impacts.
    Fields,
}

/// One flag per campaign input. Unset flags keep the configured default.
/// Values are used as given, without clamping to the slider range.
#[derive(Args, Debug, Default)]
struct InputOverrides {
    /// Campaign length in days.
    #[arg(long)]
    campaign_duration: Option<f64>,
    /// Total ad budget in USD.
    #[arg(long)]
    total_ad_spend: Option<f64>,
    /// Cost per 1000 impressions in USD.
    #[arg(long)]
    cpm: Option<f64>,
    /// Percent of impressions that click the ad.
    #[arg(long)]
    ad_ctr: Option<f64>,
    /// Percent of VSL visitors that reach the order form.
    #[arg(long)]
    vsl_to_of_ctr: Option<f64>,
    /// Percent of order form visitors that buy.
    #[arg(long)]
    order_form_conversion: Option<f64>,
    /// Average order value in USD.
    #[arg(long)]
    aov: Option<f64>,
}

impl InputOverrides {
    fn get(&self, field: InputField) -> Option<f64> {
        match field {
            InputField::CampaignDuration => self.campaign_duration,
            InputField::TotalAdSpend => self.total_ad_spend,
            InputField::Cpm => self.cpm,
            InputField::AdCtr => self.ad_ctr,
            InputField::VslToOfCtr => self.vsl_to_of_ctr,
            InputField::OrderFormConversion => self.order_form_conversion,
            InputField::Aov => self.aov,
        }
    }

    fn apply_to(&self, mut inputs: CampaignInputs) -> CampaignInputs {
        for field in InputField::ALL {
            if let Some(value) = self.get(field) {
                if !field.range().contains(value) {
                    tracing::warn!(%field, value, "Input is outside the slider range.");
                }
                inputs.set(field, value);
            }
        }
        inputs
    }
}

#[derive(Args)]
struct ForecastArgs {
    #[command(flatten)]
    inputs: InputOverrides,

    /// Print the report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SweepArgs {
    /// The input to vary, e.g. adCtr or order-form-conversion.
    field: InputField,

    /// First value. Defaults to the slider minimum.
    #[arg(long)]
    from: Option<f64>,

    /// Last value. Defaults to the slider maximum.
    #[arg(long)]
    to: Option<f64>,

    /// Increment. Defaults to the slider step.
    #[arg(long)]
    step: Option<f64>,

    /// Metrics to show, comma separated. Defaults to the metrics the input impacts.
    #[arg(long, value_delimiter = ',')]
    metrics: Vec<OutputMetric>,

    #[command(flatten)]
    inputs: InputOverrides,

    /// Print the sweep as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Derives one forecast. When any input differs from the defaults, deltas are
/// shown against the default forecast.
fn handle_forecast(args: ForecastArgs, config: &Config) -> anyhow::Result<()> {
    let defaults = config.default_inputs();
    let inputs = args.inputs.apply_to(defaults);

    let state = if inputs == defaults {
        ForecastState::new(inputs)
    } else {
        ForecastState::new(defaults).apply(inputs)
    };
    let report = state.report();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", render::inputs_table(&report.inputs));
    println!(
        "{}",
        render::results_table(&report, config.display.delta_threshold_pct)
    );
    if !report.non_finite.is_empty() {
        let names: Vec<&str> = report.non_finite.iter().map(|m| m.key()).collect();
        println!("Undefined (division by zero): {}", names.join(", "));
    }
    Ok(())
}

fn handle_session(config: &Config) -> anyhow::Result<()> {
    let mut session = Session::new(config.default_inputs(), config.display.clone());
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    session
        .run(stdin.lock(), &mut stdout)
        .context("Session ended with an I/O error")
}

/// Metrics shown for a sweep when none are requested.
fn default_sweep_metrics(field: InputField) -> Vec<OutputMetric> {
    let impacts = field.impacts();
    if !impacts.is_empty() {
        return impacts.to_vec();
    }
    vec![
        OutputMetric::TotalImpressions,
        OutputMetric::DailyBudget,
        OutputMetric::ClicksToVsl,
        OutputMetric::GrossOrders,
        OutputMetric::GrossRevenue,
        OutputMetric::Roas,
        OutputMetric::Cpa,
    ]
}

fn handle_sweep(args: SweepArgs, config: &Config) -> anyhow::Result<()> {
    let base = args.inputs.apply_to(config.default_inputs());

    let mut range = SweepRange::from_field(args.field);
    if let Some(from) = args.from {
        range.start = from;
    }
    if let Some(to) = args.to {
        range.end = to;
    }
    if let Some(step) = args.step {
        range.step = step;
    }

    let points = sweep(&base, args.field, range)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }

    let metrics = if args.metrics.is_empty() {
        default_sweep_metrics(args.field)
    } else {
        args.metrics
    };
    println!("{}", render::sweep_table(args.field, &points, &metrics));
    Ok(())
}
