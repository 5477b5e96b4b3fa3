use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ignition_cli::{
    message_rows, read_journal, replay_report, status_report, verify, Config, Overrides,
    ValidatedConfig,
};
use ignition_execution::DeploymentPlan;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ignition-journal", about = "Inspect and replay deployment journals.")]
struct Args {
    /// YAML config file. Flags take precedence over its values.
    #[arg(long)]
    config: Option<String>,

    /// Journal file.
    #[arg(long)]
    journal: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List journal messages.
    Inspect {
        #[arg(long)]
        json: bool,
    },
    /// Replay the journal and print the projection with its digest.
    Replay,
    /// Replay twice and check both passes agree.
    Verify,
    /// Print per-module progress.
    Status {
        /// Plan YAML. Without one, modules are derived from the journal.
        #[arg(long)]
        plan: Option<String>,
    },
}

fn init_logging(config: &ValidatedConfig) {
    let builder = tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr);
    if config.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(args: &Args) -> Result<ValidatedConfig> {
    let config = match &args.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read config file {path}"))?;
            serde_yaml::from_str::<Config>(&contents).context("Could not parse config file")?
        }
        None => Config::default(),
    };
    let plan = match &args.command {
        Command::Status { plan } => plan.clone(),
        _ => None,
    };
    let config = config.with_overrides(Overrides {
        journal: args.journal.clone(),
        plan,
        log_level: args.log_level.clone(),
        json_logs: args.json_logs,
    });
    config.validate().context("Invalid config")
}

fn load_plan(config: &ValidatedConfig) -> Result<Option<DeploymentPlan>> {
    let Some(path) = &config.plan else {
        return Ok(None);
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read plan file {}", path.display()))?;
    let plan = serde_yaml::from_str(&contents).context("Could not parse plan file")?;
    Ok(Some(plan))
}

fn main() {
    if let Err(err) = main_result() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn main_result() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_logging(&config);
    info!(config = ?config, "loaded config");

    let messages = read_journal(&config.journal, config.max_message_size)
        .with_context(|| format!("Could not read journal {}", config.journal.display()))?;
    match args.command {
        Command::Inspect { json } => {
            let rows = message_rows(&messages);
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in rows {
                    let future_id = row.future_id.as_deref().unwrap_or("-");
                    match row.network_interaction_id {
                        Some(id) => println!(
                            "{:>6}  {:<48} {future_id} #{id}",
                            row.index, row.message_type.as_str()
                        ),
                        None => println!(
                            "{:>6}  {:<48} {future_id}",
                            row.index,
                            row.message_type.as_str()
                        ),
                    }
                }
            }
        }
        Command::Replay => {
            let report = replay_report(&messages).context("Replay failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Verify => {
            let digest = verify(&messages).context("Verification failed")?;
            println!("ok {} messages, digest {digest}", messages.len());
        }
        Command::Status { .. } => {
            let plan = load_plan(&config)?;
            let summary =
                status_report(&messages, plan.as_ref()).context("Could not project status")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
