use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use itinera_core::{
    check_invariants, settle, BudgetRebalancer, FlightTimes, PlanSession, RealCosts,
    RebalancePolicy, Reconciler, TimeWindowTrimmer,
};
use itinera_services::HttpServices;

mod config;
mod plan_io;
mod state;

use config::{init_config, load_config, Config};

#[derive(Parser, Debug)]
#[command(name = "itinera", version, about = "Trip budget and itinerary reconciliation")]
struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct PlanIo {
    /// Plan JSON, or raw generator output
    #[arg(long)]
    plan: PathBuf,

    /// Where to write the resulting plan (default: stdout)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Distribute lodging, recompute daily costs and normalize the budget (offline)
    Settle {
        #[command(flatten)]
        io: PlanIo,
    },

    /// Report every invariant the plan violates (offline)
    Check {
        #[arg(long)]
        plan: PathBuf,
    },

    /// Price each day's route through the transport service, then settle
    Transport {
        #[command(flatten)]
        io: PlanIo,
    },

    /// Rebalance the budget around real flight and lodging prices
    Rebalance {
        #[command(flatten)]
        io: PlanIo,

        /// Real flight price, e.g. 1,250,000
        #[arg(long)]
        flight: String,

        /// Real accommodation price for the whole stay
        #[arg(long)]
        accommodation: String,
    },

    /// Fit the first and last day around real flight times (HH:MM)
    Trim {
        #[command(flatten)]
        io: PlanIo,

        #[arg(long)]
        arrival: Option<String>,

        #[arg(long)]
        departure: Option<String>,
    },

    /// Configuration file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml into the state directory
    Init,

    /// Print the effective configuration
    Show,
}

type HttpReconciler = Reconciler<HttpServices, HttpServices, HttpServices, HttpServices>;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn reconciler(cfg: &Config) -> Result<HttpReconciler> {
    let services = HttpServices::new(cfg.services.clone())?;
    Ok(Reconciler::new(
        TimeWindowTrimmer::new(services.clone(), services.clone(), cfg.trim),
        BudgetRebalancer::new(services.clone(), RebalancePolicy::default()),
        services,
    ))
}

/// Load and settle the input plan, ready for a session.
fn open_session(io: &PlanIo) -> Result<PlanSession> {
    let plan = plan_io::read_plan(&io.plan)?;
    Ok(PlanSession::new(settle(&plan)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Settle { io } => {
            let plan = plan_io::read_plan(&io.plan)?;
            let settled = settle(&plan);
            info!(
                plan_id = %settled.plan_id,
                total = settled.estimated_budget.total_amount,
                currency = %settled.estimated_budget.currency,
                "plan settled"
            );
            plan_io::write_plan(&settled, io.out.as_deref())?;
        }

        Command::Check { plan } => {
            let plan = plan_io::read_plan(&plan)?;
            let violations = check_invariants(&plan);
            if violations.is_empty() {
                println!("ok: {} ({} days) is settled", plan.plan_id, plan.days.len());
                return Ok(());
            }
            for v in &violations {
                println!("- {v}");
            }
            bail!("{} invariant violation(s)", violations.len());
        }

        Command::Transport { io } => {
            let cfg = load_config()?;
            let reconciler = reconciler(&cfg)?;
            let mut session = open_session(&io)?;
            let snap = session.snapshot();
            let refreshed = reconciler.refresh_transport(&snap).await;
            if !session.commit(snap.revision, refreshed) {
                bail!("transport refresh was superseded");
            }
            plan_io::write_plan(session.current(), io.out.as_deref())?;
        }

        Command::Rebalance { io, flight, accommodation } => {
            let real = RealCosts::parse(&flight, &accommodation).context("invalid real costs")?;
            let cfg = load_config()?;
            let reconciler = reconciler(&cfg)?;
            let mut session = open_session(&io)?;

            let snap = session.snapshot();
            let outcome = reconciler
                .rebalance(&snap, real)
                .await
                .context("rebalance aborted; plan left unchanged")?;
            if !session.commit(snap.revision, outcome.plan.clone()) {
                bail!("rebalance was superseded");
            }
            if outcome.daily_residual != 0 {
                warn!(
                    daily_residual = outcome.daily_residual,
                    "budget total and the sum of daily costs differ"
                );
            }
            plan_io::write_plan(session.current(), io.out.as_deref())?;
        }

        Command::Trim { io, arrival, departure } => {
            let times = FlightTimes::parse(arrival.as_deref(), departure.as_deref())
                .context("invalid flight times")?;
            let cfg = load_config()?;
            let reconciler = reconciler(&cfg)?;
            let mut session = open_session(&io)?;

            let snap = session.snapshot();
            let report = reconciler.apply_flight_times(&snap, times).await?;
            if !session.commit(snap.revision, report.plan.clone()) {
                bail!("trim was superseded");
            }
            for item in &report.evicted {
                info!(time = %item.time, place = %item.place, activity = %item.activity, "evicted");
            }
            if let Some(gap) = report.gap {
                info!(start = %gap.start, end = %gap.end, filled = report.gap_items, "departure-day gap");
            }
            plan_io::write_plan(session.current(), io.out.as_deref())?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => init_config()?,
            ConfigCommand::Show => {
                let cfg = load_config()?;
                println!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}
