use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mfe_shell::{ConfigError, Navigation, RecordingNavigator, SessionStatus, ShellComposer, ShellConfig, ShellError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Shell(#[from] ShellError),
    #[error("not signed in; run `login` first or pass --session-cookie")]
    NotSignedIn,
    #[error("no bundled remote for capability `{0}`")]
    UnknownRemote(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "mfe-shell", about = "Composable frontend shell")]
struct Cli {
    /// Identity backend base URL (overrides `SHELL_BFF_URL` from the environment).
    #[arg(long)]
    bff_url: Option<String>,

    /// YAML capability table.
    #[arg(long)]
    capabilities: Option<PathBuf>,

    /// Existing backend session cookie value.
    #[arg(long, env = "SHELL_SESSION_COOKIE")]
    session_cookie: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in from the session cookie and print the shell.
    Status,
    /// Open a capability and print the shell.
    Open { capability: String },
    /// Print the identity provider login URL.
    Login,
    /// Clear the backend session.
    Logout,
    /// Print the manifest a bundled remote publishes.
    Manifest { capability: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = ShellConfig::from_env()?;
    if let Some(url) = &cli.bff_url {
        config = config.with_bff_url(url)?;
    }
    if let Some(path) = &cli.capabilities {
        config = config.with_capabilities_file(path)?;
    }

    if let Command::Manifest { capability } = &cli.command {
        return print_manifest(capability);
    }

    let navigator = Arc::new(RecordingNavigator::new());
    let shell = ShellComposer::from_config(&config, remotes::catalog(), navigator.clone(), cli.session_cookie.as_deref())?;

    let result = run(&shell, cli.command).await;
    print_navigations(&navigator);
    result
}

async fn run(shell: &ShellComposer, command: Command) -> Result<(), CliError> {
    match command {
        Command::Status => {
            shell.start().await;
            println!("{}", shell.render());
        }
        Command::Open { capability } => {
            if shell.start().await != SessionStatus::Authenticated {
                println!("{}", shell.render());
                return Err(CliError::NotSignedIn);
            }
            shell.select(&capability).await?;
            println!("{}", shell.render());
        }
        Command::Login => {
            shell.start().await;
            let url = shell.login().await?;
            tracing::info!(%url, "login started");
        }
        Command::Logout => {
            shell.start().await;
            if let Some(url) = shell.logout().await? {
                println!("identity provider logout: {url}");
            }
        }
        Command::Manifest { capability } => print_manifest(&capability)?,
    }
    Ok(())
}

fn print_manifest(capability: &str) -> Result<(), CliError> {
    let manifest = remotes::manifest_for(capability).ok_or_else(|| CliError::UnknownRemote(capability.to_owned()))?;
    let rendered = serde_json::to_string_pretty(&manifest)?;
    println!("{rendered}");
    Ok(())
}

fn print_navigations(navigator: &RecordingNavigator) {
    for navigation in navigator.history() {
        match navigation {
            Navigation::External(url) => println!("redirect: {url}"),
            Navigation::Reload(path) => println!("reload: {path}"),
        }
    }
}
