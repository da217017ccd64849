//! # centerctl CLI Entry Point
//!
//! ## Usage
//!
//! ```bash
//! # Create a regular account on the Information Center
//! centerctl create-account 8020 alice 123456 3
//!
//! # Create a 16 MiB volume on a remote Control Center
//! centerctl create-volume cc.example.com:8010 vol123 16 1 42
//!
//! # Give up on an unresponsive service after two seconds
//! centerctl --timeout-ms 2000 list-volumes 8010 42
//!
//! # Walk through both services end to end
//! centerctl demo --host 10.0.0.5 --settle-secs 10
//! ```
//!
//! ## Endpoint Format
//!
//! - `8010` means `<default host>:8010`; the default host is `localhost`
//!   unless `CENTERCTL_HOST` is set
//! - `host:port` is used as given
//!
//! ## Values Starting With `-`
//!
//! Anything after the subcommand that starts with `-` is taken for an option.
//! Put `--` before the positional arguments to pass a negative id or a
//! password like `-secret`:
//!
//! ```bash
//! centerctl get-volume -- 8010 -5 1
//! ```

use std::process::ExitCode;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use argh::FromArgs;
use centerctl_cli::commands;
use centerctl_cli::demo::{self, DemoConfig};
use centerctl_cli::output::{describe, Printer};
use centerctl_common::endpoint::{CONTROL_CENTER_PORT, DEFAULT_HOST, HOST_ENV_VAR, INFORMATION_CENTER_PORT};
use centerctl_common::CenterError;

#[derive(FromArgs)]
/// centerctl - command-line client for the Control Center and Information Center
struct Cli {
    /// connect/read/write timeout in milliseconds (default: wait indefinitely)
    #[argh(option, long = "timeout-ms")]
    timeout_ms: Option<u64>,

    /// do not echo the request before sending it
    #[argh(switch, short = 'q')]
    quiet: bool,

    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    CreateAccount(CreateAccountArgs),
    DeleteAccount(DeleteAccountArgs),
    ListAccounts(ListAccountsArgs),
    AuthenticateAccount(AuthenticateAccountArgs),
    UpdateAccount(UpdateAccountArgs),
    ReserveVolume(ReserveVolumeArgs),
    CreateVolume(CreateVolumeArgs),
    DeleteVolume(DeleteVolumeArgs),
    GetVolume(GetVolumeArgs),
    ListVolumes(ListVolumesArgs),
    Demo(DemoArgs),
}

// ============================================================================
// Information Center
// ============================================================================

#[derive(FromArgs)]
#[argh(subcommand, name = "create-account")]
/// create an account (account types: 1 super admin, 2 admin, 3 regular)
struct CreateAccountArgs {
    /// information center endpoint, <port> or <host>:<port>
    #[argh(positional)]
    endpoint: String,
    /// name of the new account
    #[argh(positional)]
    account_name: String,
    /// password of the new account
    #[argh(positional)]
    password: String,
    /// account type code
    #[argh(positional)]
    account_type: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "delete-account")]
/// delete an account
struct DeleteAccountArgs {
    /// information center endpoint, <port> or <host>:<port>
    #[argh(positional)]
    endpoint: String,
    /// id of the account to delete
    #[argh(positional)]
    deleting_account_id: String,
    /// id of the account performing the deletion
    #[argh(positional)]
    account_id: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "list-accounts")]
/// list accounts visible to an account
struct ListAccountsArgs {
    /// information center endpoint, <port> or <host>:<port>
    #[argh(positional)]
    endpoint: String,
    /// id of the account performing the listing
    #[argh(positional)]
    account_id: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "authenticate-account")]
/// check an account's credentials
struct AuthenticateAccountArgs {
    /// information center endpoint, <port> or <host>:<port>
    #[argh(positional)]
    endpoint: String,
    /// account name
    #[argh(positional)]
    account_name: String,
    /// password to check
    #[argh(positional)]
    password: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "update-account")]
/// change an account's password: <endpoint> <account-name> [old-password] <new-password> <account-id>
struct UpdateAccountArgs {
    /// endpoint, account name, optional old password, new password, acting account id
    #[argh(positional)]
    args: Vec<String>,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "reserve-volume")]
/// reserve space for a volume (segment size is always 16 MiB)
struct ReserveVolumeArgs {
    /// information center endpoint, <port> or <host>:<port>
    #[argh(positional)]
    endpoint: String,
    /// id of the volume to reserve for
    #[argh(positional)]
    volume_id: String,
    /// volume name
    #[argh(positional)]
    name: String,
    /// volume size in MiB
    #[argh(positional)]
    size_mb: String,
    /// volume type code
    #[argh(positional)]
    volume_type: String,
    /// id of the owning account
    #[argh(positional)]
    account_id: String,
}

// ============================================================================
// Control Center
// ============================================================================

#[derive(FromArgs)]
#[argh(subcommand, name = "create-volume")]
/// create a volume
struct CreateVolumeArgs {
    /// control center endpoint, <port> or <host>:<port>
    #[argh(positional)]
    endpoint: String,
    /// volume name
    #[argh(positional)]
    name: String,
    /// volume size in MiB
    #[argh(positional)]
    size_mb: String,
    /// volume type code
    #[argh(positional)]
    volume_type: String,
    /// id of the owning account
    #[argh(positional)]
    account_id: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "delete-volume")]
/// delete a volume
struct DeleteVolumeArgs {
    /// control center endpoint, <port> or <host>:<port>
    #[argh(positional)]
    endpoint: String,
    /// id of the volume
    #[argh(positional)]
    volume_id: String,
    /// id of the account performing the deletion
    #[argh(positional)]
    account_id: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "get-volume")]
/// show one volume
struct GetVolumeArgs {
    /// control center endpoint, <port> or <host>:<port>
    #[argh(positional)]
    endpoint: String,
    /// id of the volume
    #[argh(positional)]
    volume_id: String,
    /// id of the account asking
    #[argh(positional)]
    account_id: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "list-volumes")]
/// list volumes visible to an account
struct ListVolumesArgs {
    /// control center endpoint, <port> or <host>:<port>
    #[argh(positional)]
    endpoint: String,
    /// id of the account asking
    #[argh(positional)]
    account_id: String,
}

// ============================================================================
// Demo
// ============================================================================

#[derive(FromArgs)]
#[argh(subcommand, name = "demo")]
/// walk through accounts and volumes on both services
struct DemoArgs {
    /// host running both services (default: CENTERCTL_HOST or localhost)
    #[argh(option)]
    host: Option<String>,

    /// information center port
    #[argh(option, long = "info-center-port", default = "INFORMATION_CENTER_PORT")]
    info_center_port: u16,

    /// control center port
    #[argh(option, long = "control-center-port", default = "CONTROL_CENTER_PORT")]
    control_center_port: u16,

    /// seconds to wait after creating and after deleting the volume
    #[argh(option, long = "settle-secs", default = "60")]
    settle_secs: u64,

    /// suffix for account and volume names (default: current Unix time)
    #[argh(option)]
    seed: Option<String>,
}

fn main() -> ExitCode {
    let cli: Cli = argh::from_env();

    init_tracing(matches!(cli.command, Commands::Demo(_)));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", report(&err));
            ExitCode::FAILURE
        }
    }
}

/// The demo narrates its steps at `info`; one-shot commands keep stdout
/// clean and only log (to stderr) when `RUST_LOG` asks for it.
fn init_tracing(demo: bool) {
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if demo => tracing_subscriber::EnvFilter::new("info"),
        Err(_) => return,
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Error line printed before exiting, prefixed with the error's kind.
fn report(err: &anyhow::Error) -> String {
    match err.downcast_ref::<CenterError>() {
        Some(center_err) if err.chain().count() == 1 => describe(center_err),
        Some(center_err) => format!("{}: {:#}", center_err.kind().as_str(), err),
        None => format!("error: {:#}", err),
    }
}

fn run(cli: Cli) -> Result<()> {
    let timeout = commands::timeout_from_ms(cli.timeout_ms)?;
    let mut printer = Printer::stdout(cli.quiet);

    let invocation = match cli.command {
        Commands::Demo(args) => return run_demo(args, timeout, &mut printer),
        Commands::CreateAccount(a) => {
            commands::create_account(&a.endpoint, &a.account_name, &a.password, &a.account_type)?
        }
        Commands::DeleteAccount(a) => {
            commands::delete_account(&a.endpoint, &a.deleting_account_id, &a.account_id)?
        }
        Commands::ListAccounts(a) => commands::list_accounts(&a.endpoint, &a.account_id)?,
        Commands::AuthenticateAccount(a) => {
            commands::authenticate_account(&a.endpoint, &a.account_name, &a.password)?
        }
        Commands::UpdateAccount(a) => commands::update_account(&a.args)?,
        Commands::ReserveVolume(a) => commands::reserve_volume(
            &a.endpoint,
            &a.volume_id,
            &a.name,
            &a.size_mb,
            &a.volume_type,
            &a.account_id,
        )?,
        Commands::CreateVolume(a) => {
            commands::create_volume(&a.endpoint, &a.name, &a.size_mb, &a.volume_type, &a.account_id)?
        }
        Commands::DeleteVolume(a) => commands::delete_volume(&a.endpoint, &a.volume_id, &a.account_id)?,
        Commands::GetVolume(a) => commands::get_volume(&a.endpoint, &a.volume_id, &a.account_id)?,
        Commands::ListVolumes(a) => commands::list_volumes(&a.endpoint, &a.account_id)?,
    };

    invocation
        .run(timeout, &mut printer)
        .with_context(|| format!("{} at {}", invocation.operation.method(), invocation.endpoint))?;
    Ok(())
}

fn run_demo(args: DemoArgs, timeout: Option<Duration>, printer: &mut Printer) -> Result<()> {
    let host = args
        .host
        .or_else(|| std::env::var(HOST_ENV_VAR).ok().filter(|h| !h.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let seed = match args.seed {
        Some(seed) => seed,
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock is before the Unix epoch")?
            .as_secs()
            .to_string(),
    };

    let config = DemoConfig {
        info_center_port: args.info_center_port,
        control_center_port: args.control_center_port,
        settle: Duration::from_secs(args.settle_secs),
        timeout,
        ..DemoConfig::new(host, seed)
    };

    let report = demo::run(&config, printer)?;
    if !report.allowed.is_empty() {
        tracing::warn!(
            "Expected refusals that were allowed: {}",
            report.allowed.join(", ")
        );
    }
    Ok(())
}
