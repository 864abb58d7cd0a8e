//! `cosign`: sign transactions shared through an HTTP relay.
//!
//! # Architecture Overview
//!
//! ```text
//!   signer A                      relay                       signer B
//!  ┌────────┐   POST unsigned   ┌───────┐   GET envelope    ┌────────────┐
//!  │ builds │ ────────────────▶ │  URL  │ ────────────────▶ │ cosign     │
//!  │   tx   │                   │       │ ◀──────────────── │ multisig   │
//!  └────────┘                   └───────┘   POST signed     │ sign <url> │
//!                                                           └────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use alloy::primitives::{hex, Address};
use clap::{Args, Parser, Subcommand};

use cosign_relay::account::{Account, Accounts, HashAlgorithm, SignatureAlgorithm, Signer};
use cosign_relay::config::schema::{DEFAULT_ACCOUNT_NAME, DEFAULT_CONFIG_PATH};
use cosign_relay::config::{load_config, save_config, CosignConfig, ObservabilityConfig};
use cosign_relay::observability::init_logging;
use cosign_relay::relay::{
    IncludeField, OutputFormat, RelayTransport, RelayWorkflow, SignOptions, WorkflowState,
};
use cosign_relay::transaction::{SigningService, StdinPrompt};

#[derive(Parser)]
#[command(name = "cosign")]
#[command(about = "Co-sign transactions exchanged through an HTTP relay", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short = 'f', long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: PathBuf,

    /// Approve signing without prompting (ignored with --from-remote-url)
    #[arg(short, long, global = true)]
    yes: bool,

    /// Output format: text, json or oneliner
    #[arg(short, long, default_value = "text", global = true)]
    output: OutputFormat,

    /// Override the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transaction utilities
    Transactions {
        #[command(subcommand)]
        command: TransactionCommands,
    },
    /// Multisig utilities
    Multisig {
        #[command(subcommand)]
        command: MultisigCommands,
    },
    /// Write a configuration with a freshly generated emulator-account
    Init(InitArgs),
}

#[derive(Subcommand)]
enum TransactionCommands {
    /// Sign a built transaction from a file, or from a relay with --from-remote-url
    Sign(TransactionSignArgs),
}

#[derive(Subcommand)]
enum MultisigCommands {
    /// Fetch, sign and post back the envelope at <url>
    Sign(MultisigSignArgs),
}

#[derive(Args)]
struct SignerArgs {
    /// Name of the account used to sign
    #[arg(long, default_value = DEFAULT_ACCOUNT_NAME)]
    signer: String,

    /// Fields to include in the output: signatures, code, payload
    #[arg(long, value_delimiter = ',')]
    include: Vec<IncludeField>,
}

#[derive(Args)]
struct TransactionSignArgs {
    /// Built transaction file, or relay URL with --from-remote-url
    source: String,

    /// Treat the argument as a relay URL; the signed envelope is posted back
    #[arg(long)]
    from_remote_url: bool,

    #[command(flatten)]
    signer: SignerArgs,
}

#[derive(Args)]
struct MultisigSignArgs {
    /// Relay URL holding the envelope
    url: String,

    #[command(flatten)]
    signer: SignerArgs,
}

#[derive(Args)]
struct InitArgs {
    #[arg(long, default_value = "ECDSA_secp256k1")]
    signature_algorithm: SignatureAlgorithm,

    #[arg(long, default_value = "SHA2_256")]
    hash_algorithm: HashAlgorithm,

    /// Address of the generated account
    #[arg(long)]
    address: Option<Address>,

    /// Overwrite an existing configuration file
    #[arg(long)]
    force: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Per-invocation options for the sign commands.
///
/// `transactions sign --from-remote-url` always prompts since the payload
/// comes from an untrusted relay; `multisig sign` honours `--yes`.
fn sign_options(command: SignCommand, yes: bool) -> SignOptions {
    let options = match command {
        SignCommand::Transaction(args) if args.from_remote_url => {
            SignOptions::relay(args.source, args.signer.signer)
                .with_include(args.signer.include)
                .force_confirmation()
        }
        SignCommand::Transaction(args) => {
            SignOptions::local_file(args.source, args.signer.signer)
                .with_include(args.signer.include)
        }
        SignCommand::Multisig(args) => {
            SignOptions::relay(args.url, args.signer.signer).with_include(args.signer.include)
        }
    };
    options.skip_confirmation(yes)
}

enum SignCommand {
    Transaction(TransactionSignArgs),
    Multisig(MultisigSignArgs),
}

impl SignCommand {
    /// Split off the sign commands; `init` is handed back as is.
    fn from_command(command: Commands) -> Result<Self, InitArgs> {
        match command {
            Commands::Init(args) => Err(args),
            Commands::Transactions {
                command: TransactionCommands::Sign(args),
            } => Ok(SignCommand::Transaction(args)),
            Commands::Multisig {
                command: MultisigCommands::Sign(args),
            } => Ok(SignCommand::Multisig(args)),
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let command = match SignCommand::from_command(cli.command) {
        Ok(command) => command,
        Err(args) => {
            init_logging(&observability(&ObservabilityConfig::default(), &cli.log_level));
            init(&cli.config, args)?;
            return Ok(ExitCode::SUCCESS);
        }
    };
    let options = sign_options(command, cli.yes);

    let config = load_config(&cli.config)?;
    init_logging(&observability(&config.observability, &cli.log_level));

    let accounts = Accounts::from_config(&config)?;
    if accounts.is_empty() {
        tracing::warn!(path = %cli.config.display(), "No accounts configured");
    }
    let transport = RelayTransport::new(&config.relay)?;
    let workflow = RelayWorkflow::new(transport, SigningService::with_gate(StdinPrompt));

    match workflow.run(&accounts, &options).await {
        Ok(outcome) => {
            println!("{}", cli.output.render(&outcome));
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            if let Some(outcome) = &failure.outcome {
                println!("{}", cli.output.render(outcome));
            }
            eprintln!("Error: {}", failure);
            if failure.failed_at == WorkflowState::Posting {
                eprintln!("The signed RLP above was not delivered; send it to the relay manually.");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn observability(base: &ObservabilityConfig, level: &Option<String>) -> ObservabilityConfig {
    let mut config = base.clone();
    if let Some(level) = level {
        config.log_level = level.clone();
    }
    config
}

fn init(path: &Path, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !args.force {
        return Err(format!(
            "{} already exists, use --force to overwrite",
            path.display()
        )
        .into());
    }

    let address = args.address.unwrap_or_else(|| Address::with_last_byte(1));
    let account = Account::generate_default(address, args.signature_algorithm, args.hash_algorithm)?;

    let public_key = match account.key().resolve()? {
        Signer::Local(signer) => hex::encode(signer.public_key()),
        Signer::Remote(_) => String::new(),
    };

    let config = CosignConfig {
        accounts: Accounts::new(vec![account.clone()]).to_config(),
        ..CosignConfig::default()
    };
    save_config(path, &config)?;

    println!("Configuration written to {}", path.display());
    println!("Account\t\t{}", account.name());
    println!("Address\t\t{}", account.address());
    println!("Public key\t0x{}", public_key);
    println!(
        "Algorithms\t{}/{}",
        account.key().signature_algorithm(),
        account.key().hash_algorithm()
    );
    Ok(())
}
