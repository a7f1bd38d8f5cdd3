use anyhow::Result;
use batch::ExecutionMode;

use crate::Context;
use crate::cli::{OutputFormat, RunArgs, VaultsCommand};
use crate::commands::{load_config, run_batch, select_vaults, show_progress};
use crate::engine::RunCommand;
use crate::paths;
use crate::report;

pub fn run(ctx: &Context, cmd: VaultsCommand) -> Result<()> {
    match cmd {
        VaultsCommand::Run(args) => run_command(ctx, &args),
    }
}

/// Run a shell command in every selected vault
fn run_command(ctx: &Context, args: &RunArgs) -> Result<()> {
    load_config(ctx)?;
    let vaults = select_vaults(&args.targets)?;
    let json = args.targets.output == OutputFormat::Json;

    // Command output would corrupt a JSON report on stdout
    let silent = args.silent || json;
    let op = RunCommand::new(&args.command, silent, !args.no_vault_cwd)?
        .log_to(&paths::custom_commands_log()?)?;

    let mode = execution_mode(args.serial, args.jobs);
    log::debug!("Running '{}' in {} vault(s) ({mode:?})", args.command, vaults.len());

    // Spinner only while command output is hidden
    let progress = silent && show_progress(ctx, args.targets.output);
    let report = run_batch(&op, &vaults, mode, progress, "running")?;

    report::print_run(&report::run_results(&report), args.targets.output)
}

fn execution_mode(serial: bool, jobs: usize) -> ExecutionMode {
    if serial || jobs <= 1 {
        ExecutionMode::Sequential
    } else {
        ExecutionMode::Parallel { jobs }
    }
}
