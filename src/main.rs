mod commands;
mod core;
mod exec;
mod graph;
mod release;

use clap::{Args, Parser, Subcommand};
use core::context::{CredentialPair, DEFAULT_MAX_OUTPUT_BYTES, RegistryCredentials, ReleaseContext, ReleaseSettings};
use core::error::{DeployError, DeployResult, print_error};
use std::path::PathBuf;

/// Release one package of a multi-package tree: build its dependencies
/// locally, check its version, publish it
#[derive(Parser)]
#[command(name = "deploy-rail")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Workspace root holding the packages (defaults to the current directory)
  #[arg(long, global = true, env = "TRAVIS_BUILD_DIR")]
  workspace: Option<PathBuf>,

  /// Explicit path to deploy.toml
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Only log warnings and errors
  #[arg(short, long, global = true)]
  quiet: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build dependencies, gate the version and publish the tagged package
  Release(ReleaseArgs),

  /// Show every command a release would run, without running it
  Plan {
    /// Release tag, `<package>/<version>`
    tag: String,
    /// Output the plan in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Show the package graph in build order and report cycles
  Graph {
    /// Output the graph in JSON format
    #[arg(long)]
    json: bool,
  },
}

#[derive(Args)]
struct ReleaseArgs {
  /// Release tag, `<package>/<version>`
  #[arg(long, env = "TRAVIS_TAG")]
  tag: String,

  /// Library registry user
  #[arg(long, env = "BINTRAY_SNOWPLOW_MAVEN_USER")]
  library_user: String,

  /// Library registry API key
  #[arg(long, env = "BINTRAY_SNOWPLOW_MAVEN_API_KEY", hide_env_values = true)]
  library_key: String,

  /// Generic registry user
  #[arg(long, env = "BINTRAY_SNOWPLOW_GENERIC_USER")]
  generic_user: String,

  /// Generic registry API key
  #[arg(long, env = "BINTRAY_SNOWPLOW_GENERIC_API_KEY", hide_env_values = true)]
  generic_key: String,

  /// Where credentials are written while publishing (defaults to ~/.bintray)
  #[arg(long)]
  credentials_dir: Option<PathBuf>,

  /// Cap on retained output per stream of each command, in bytes
  #[arg(long, default_value_t = DEFAULT_MAX_OUTPUT_BYTES)]
  max_output_bytes: usize,
}

impl ReleaseArgs {
  fn into_settings(self) -> DeployResult<ReleaseSettings> {
    let credentials_dir = match self.credentials_dir {
      Some(dir) => dir,
      None => home::home_dir()
        .map(|home| home.join(".bintray"))
        .ok_or_else(|| DeployError::with_help("Could not determine the home directory", "Pass --credentials-dir"))?,
    };

    Ok(ReleaseSettings {
      tag: self.tag,
      credentials: RegistryCredentials {
        library: CredentialPair::new(self.library_user, self.library_key),
        generic: CredentialPair::new(self.generic_user, self.generic_key),
      },
      credentials_dir,
      max_output_bytes: self.max_output_bytes,
    })
  }
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_logging(quiet: bool) {
  let level = if quiet {
    tracing::Level::WARN
  } else {
    tracing::Level::INFO
  };

  // stdout carries plan/graph output and verbose command output
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.quiet);

  let workspace_root = match cli.workspace {
    Some(dir) => dir,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => handle_error(DeployError::from(e).context("Failed to get current directory")),
    },
  };

  let ctx = match ReleaseContext::load(&workspace_root, cli.config.as_deref()) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Release(args) => args
      .into_settings()
      .and_then(|settings| commands::run_release(&ctx, &settings)),
    Commands::Plan { tag, json } => commands::run_plan(&ctx, &tag, json),
    Commands::Graph { json } => commands::run_graph(&ctx, json),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: DeployError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
