//! tv-transformer - plan and execute TV library renames
//!
//! `plan` is interactive and only reads the source tree; `execute` copies the
//! planned files and can be re-run or resumed safely.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use tv_transformer::cli::{Cli, Command, ExecuteArgs, PlanArgs};
use tv_transformer::config::MetadataConfig;
use tv_transformer::services::{
    ConsolePrompter, ExecutorService, LocalFilesystem, LogFormat, Plan, PlannerService,
    create_metadata_provider, init_tracing, partial_plan_path, read_plan, write_plan,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(LogFormat::from_env(), cli.verbose);

    match cli.command {
        Command::Plan(args) => plan(args).await,
        Command::Execute(args) => execute(args).await,
    }
}

async fn plan(args: PlanArgs) -> Result<()> {
    let config = args.planner_config();
    let metadata_config = MetadataConfig::from_env(args.provider);
    let provider = create_metadata_provider(&metadata_config)?;
    let fs = LocalFilesystem;
    let mut prompter = ConsolePrompter::stdio();

    let mut plan = Plan::default();
    let outcome = PlannerService::new(&config, provider.as_ref(), &fs)
        .plan_into(&mut prompter, &mut plan)
        .await;
    if let Err(err) = outcome {
        save_partial_plan(&args, &plan).await;
        return Err(err);
    }

    write_plan(&args.plan_file, &plan.mappings)
        .await
        .context("Failed to save plan")?;

    println!();
    println!("{}", plan.summary());
    for skipped in &plan.skipped {
        println!("  skipped {} ({:?})", skipped.directory.display(), skipped.reason);
    }
    for reject in &plan.rejects {
        println!("  rejected {}", reject.src.display());
    }
    println!("Plan written to {}", args.plan_file.display());
    Ok(())
}

/// Save the mappings confirmed before a fatal error. A failed save is only
/// logged; the planning error is what the caller reports.
async fn save_partial_plan(args: &PlanArgs, plan: &Plan) {
    if plan.mappings.is_empty() {
        return;
    }
    let path = partial_plan_path(&args.plan_file);
    match write_plan(&path, &plan.mappings).await {
        Ok(()) => println!(
            "Planning stopped early; {} confirmed mappings saved to {}",
            plan.mappings.len(),
            path.display()
        ),
        Err(err) => error!(
            path = %path.display(),
            error = %format!("{:#}", err),
            "Failed to save partial plan"
        ),
    }
}

async fn execute(args: ExecuteArgs) -> Result<()> {
    let config = args.executor_config();
    let mappings = read_plan(&config.plan_path).await?;
    info!(count = mappings.len(), skip = config.skip, "Executing plan");

    let fs = LocalFilesystem;
    let report = ExecutorService::new(&fs, config.dry_run)
        .execute(&mappings, config.skip)
        .await?;

    println!("{}", report.summary());
    Ok(())
}
