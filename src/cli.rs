// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Positional deployment and container=image arguments plus mode flags.

use clap::Parser;
use setimg::output::OutputMode;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "kubectl-setimg")]
#[command(about = "Update container images in deployments with interactive tag selection")]
#[command(after_help = "Examples:
  kubectl setimg my-app web=nginx:1.21.1          Direct mode
  kubectl setimg                                  Select deployment, container, and image
  kubectl setimg my-app web                       Select image only
  kubectl setimg my-app --list                    List containers
  kubectl setimg my-app web=nginx:1.21.1 --watch  Roll back automatically on failure")]
pub struct Cli {
    /// Deployment to update
    pub deployment: Option<String>,

    /// CONTAINER=IMAGE, or a container name to pick the image interactively
    pub target: Option<String>,

    /// List containers only
    #[arg(short, long)]
    pub list: bool,

    /// Watch the deployment and roll back if pods fail to start
    #[arg(short, long)]
    pub watch: bool,

    /// Timeout for watching deployment readiness (e.g. 5m, 90s)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Print available tags for IMAGE and exit
    #[arg(long, value_name = "IMAGE")]
    pub tags: Option<String>,

    /// Kubernetes namespace
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Kubeconfig context
    #[arg(long)]
    pub context: Option<String>,

    /// Roll back without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Settings file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only print results
    #[arg(short, long)]
    pub quiet: bool,

    /// Print JSON lines
    #[arg(long, conflicts_with = "quiet")]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Show version information
    #[arg(long)]
    pub version: bool,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}
