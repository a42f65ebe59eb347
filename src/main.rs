// ABOUTME: Entry point for the kubectl-setimg CLI application.
// ABOUTME: Parses arguments, resolves the invocation mode, and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use setimg::build_info::BuildInfo;
use setimg::config::Settings;
use setimg::diagnostics::Diagnostics;
use setimg::error::Result;
use setimg::invocation::Invocation;
use setimg::output::Output;
use setimg::prompt::{AutoApprove, Confirm, TerminalConfirm};
use setimg::registry::ProviderRegistry;
use setimg::rollout::UpdateRequest;
use setimg::workload::KubeWorkloads;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if cli.version {
        println!("{}", BuildInfo::current());
        return;
    }

    let mut output = Output::new(cli.output_mode());
    let result = run(cli, &mut output).await;

    if let Err(e) = result {
        output.error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<()> {
    let cwd = env::current_dir()?;
    let settings = Settings::resolve(cli.config.as_deref(), &cwd)?;
    let options = settings.watch.options(cli.timeout);

    let invocation = Invocation::resolve(
        cli.list,
        cli.tags.clone(),
        cli.deployment.as_deref(),
        cli.target.as_deref(),
    )?;

    match invocation {
        Invocation::Tags { image } => {
            let registry = ProviderRegistry::with_defaults();
            commands::show_tags(&registry, &image, output).await
        }
        Invocation::List { deployment } => {
            let runtime = connect(&cli, &settings).await?;
            commands::list_containers(&runtime, &deployment, output).await
        }
        Invocation::Direct {
            deployment,
            container,
            image,
        } => {
            let runtime = connect(&cli, &settings).await?;
            let request = UpdateRequest {
                deployment,
                container,
                image,
                watch: cli.watch,
            };
            // Fully specified on the command line: roll back without asking.
            commands::set_image(
                &runtime,
                &request,
                options,
                &AutoApprove,
                Diagnostics::default(),
                output,
            )
            .await
        }
        Invocation::Interactive {
            deployment,
            container,
        } => {
            output.progress("Missing required information, switching to interactive mode...");
            let runtime = connect(&cli, &settings).await?;
            let registry = ProviderRegistry::with_defaults();
            let mut diag = Diagnostics::default();
            let request = commands::select_update(
                &runtime,
                &registry,
                deployment,
                container,
                cli.watch,
                output,
                &mut diag,
            )
            .await
            .inspect_err(|_| output.diagnostics(&diag))?;

            let confirm: &dyn Confirm = if cli.yes || !settings.rollback.confirm {
                &AutoApprove
            } else {
                &TerminalConfirm
            };
            commands::set_image(&runtime, &request, options, confirm, diag, output).await
        }
    }
}

async fn connect(cli: &Cli, settings: &Settings) -> Result<KubeWorkloads> {
    let namespace = cli.namespace.as_deref().or(settings.namespace.as_deref());
    let context = cli.context.as_deref().or(settings.context.as_deref());
    Ok(KubeWorkloads::connect(namespace, context).await?)
}
