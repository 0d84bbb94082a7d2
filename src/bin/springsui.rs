use clap::{Args, Parser, Subcommand};
use springsui::commands::{self, CommandContext, ValidatorTarget};
use springsui::config::{parse_id, ClientConfig};
use springsui::net::{RpcClient, SigningIdentity};
use springsui::{
    FeeConfigArgs, PlanWriter, PoolStateReader, SubmitReceipt, SuiAddress, TransactionComposer,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "springsui", about = "Spring Sui liquid staking CLI")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Full node JSON-RPC endpoint
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Liquid staking package id
    #[arg(long, global = true)]
    package_id: Option<String>,

    /// Pool object id
    #[arg(long, global = true)]
    pool_id: Option<String>,

    /// Pool LST type
    #[arg(long, global = true)]
    pool_type: Option<String>,

    /// Weight hook object id
    #[arg(long, global = true)]
    weight_hook_id: Option<String>,

    /// Sender address (skips key loading)
    #[arg(long, global = true)]
    sender: Option<String>,

    /// Prompt for the secret key instead of reading SUI_SECRET_KEY
    #[arg(long, global = true)]
    prompt_key: bool,

    /// Append plans to this file instead of printing them
    #[arg(long, global = true)]
    outbox: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Mint LST from SUI split off the gas coin
    Mint {
        /// Amount of SUI in MIST
        #[arg(long)]
        amount: u64,
    },

    /// Redeem LST for SUI
    Redeem {
        /// Amount of LST to redeem
        #[arg(long)]
        amount: u64,
    },

    /// Stake pool SUI with a validator
    IncreaseValidatorStake {
        /// Validator address
        #[arg(long)]
        validator_address: String,
        /// Amount of SUI in MIST
        #[arg(long, allow_negative_numbers = true)]
        amount: i128,
    },

    /// Unstake pool SUI from a validator
    DecreaseValidatorStake {
        /// Validator position in the pool's validator list
        #[arg(
            long,
            conflicts_with = "validator_address",
            required_unless_present = "validator_address"
        )]
        validator_index: Option<usize>,
        /// Validator address
        #[arg(long)]
        validator_address: Option<String>,
        /// Maximum amount of SUI in MIST
        #[arg(long, allow_negative_numbers = true)]
        amount: i128,
    },

    /// Withdraw accrued fees to the sender
    CollectFees,

    /// Update pool fees; omitted fees keep their current value
    UpdateFees {
        /// Mint fee bps
        #[arg(long, allow_negative_numbers = true)]
        mint_fee_bps: Option<i64>,
        /// Redeem fee bps
        #[arg(long, allow_negative_numbers = true)]
        redeem_fee_bps: Option<i64>,
        /// Spread fee bps
        #[arg(long = "spread-fee", allow_negative_numbers = true)]
        spread_fee: Option<i64>,
    },

    /// Print the pool snapshot as JSON
    FetchState,

    /// Create and share the pool's weight hook
    InitializeWeightHook,

    /// Replace the weight hook's validator weights
    SetValidatorAddressesAndWeights {
        /// Validator addresses
        #[arg(short = 'v', long = "validators", num_args = 1.., required = true)]
        validators: Vec<String>,
        /// Weights, one per validator
        #[arg(short = 'w', long = "weights", num_args = 1.., required = true)]
        weights: Vec<u64>,
    },

    /// Rebalance stake according to the weight hook
    Rebalance,
}

fn fatal(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn load_config(global: &GlobalArgs) -> ClientConfig {
    let mut config = ClientConfig::load(global.config.as_deref())
        .unwrap_or_else(|err| fatal(&err.to_string()));
    if let Some(url) = &global.rpc_url {
        config.rpc_url = url.clone();
    }
    let id = |key: &str, raw: &str| {
        parse_id(key, raw).unwrap_or_else(|err| fatal(&err.to_string()))
    };
    if let Some(raw) = &global.package_id {
        config.package_id = Some(id("--package-id", raw));
    }
    if let Some(raw) = &global.pool_id {
        config.pool.id = id("--pool-id", raw);
    }
    if let Some(token_type) = &global.pool_type {
        config.pool.token_type = token_type.clone();
    }
    if let Some(raw) = &global.weight_hook_id {
        config.pool.weight_hook_id = Some(id("--weight-hook-id", raw));
    }
    if let Some(path) = &global.outbox {
        config.outbox = Some(path.clone());
    }
    config
}

fn resolve_sender(global: &GlobalArgs) -> SuiAddress {
    if let Some(raw) = &global.sender {
        return raw
            .parse()
            .unwrap_or_else(|err: springsui::ComposeError| fatal(&err.to_string()));
    }
    let identity = if global.prompt_key {
        SigningIdentity::prompt()
    } else {
        SigningIdentity::from_env()
    };
    identity.map(|identity| identity.address()).unwrap_or_else(|err| {
        fatal(&format!("{err} (use --sender, --prompt-key or SUI_SECRET_KEY)"))
    })
}

fn report(receipt: SubmitReceipt) {
    info!(evt = "submitted", digest = %receipt.digest, destination = %receipt.destination);
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let config = load_config(&cli.global);
    let rpc =
        RpcClient::new(config.rpc_url.clone()).unwrap_or_else(|err| fatal(&err.to_string()));

    if let Commands::FetchState = cli.command {
        let state = PoolStateReader::new(&rpc)
            .fetch_pool_state(&config.pool)
            .unwrap_or_else(|err| fatal(&err.to_string()));
        match serde_json::to_string_pretty(&state) {
            Ok(json) => println!("{json}"),
            Err(err) => fatal(&format!("failed to encode pool state: {err}")),
        }
        return;
    }

    let package = config.package_id().unwrap_or_else(|err| fatal(&err.to_string()));
    let sender = resolve_sender(&cli.global);
    let submitter = PlanWriter::from_outbox(config.outbox.clone());
    let ctx = CommandContext {
        composer: TransactionComposer::new(package),
        pool: config.pool.clone(),
        sender,
        reader: &rpc,
        submitter: &submitter,
    };
    info!(evt = "start", %sender, pool = %ctx.pool.id, rpc = %config.rpc_url);

    let result = match cli.command {
        Commands::Mint { amount } => commands::run_mint(&ctx, amount).map(report),
        Commands::Redeem { amount } => commands::run_redeem(&ctx, amount).map(report),
        Commands::IncreaseValidatorStake {
            validator_address,
            amount,
        } => commands::run_increase_validator_stake(&ctx, &validator_address, amount).map(report),
        Commands::DecreaseValidatorStake {
            validator_index,
            validator_address,
            amount,
        } => {
            let target = match (validator_index, validator_address) {
                (Some(index), _) => ValidatorTarget::Index(index),
                (None, Some(address)) => ValidatorTarget::Address(address),
                (None, None) => {
                    fatal("one of --validator-index or --validator-address is required")
                }
            };
            commands::run_decrease_validator_stake(&ctx, &target, amount).map(report)
        }
        Commands::CollectFees => commands::run_collect_fees(&ctx).map(report),
        Commands::UpdateFees {
            mint_fee_bps,
            redeem_fee_bps,
            spread_fee,
        } => {
            let args = FeeConfigArgs {
                mint_fee_bps,
                redeem_fee_bps,
                spread_fee_bps: spread_fee,
            };
            commands::run_update_fees(&ctx, &args).map(|update| {
                if let Some(update) = update {
                    info!(
                        evt = "fees_updated",
                        mint = update.next.mint_fee_bps,
                        redeem = update.next.redeem_fee_bps,
                        spread = update.next.spread_fee_bps
                    );
                    report(update.receipt);
                }
            })
        }
        Commands::InitializeWeightHook => commands::run_initialize_weight_hook(&ctx).map(report),
        Commands::SetValidatorAddressesAndWeights {
            validators,
            weights,
        } => commands::run_set_weights(&ctx, &validators, &weights).map(report),
        Commands::Rebalance => commands::run_rebalance(&ctx).map(report),
        Commands::FetchState => Ok(()),
    };

    if let Err(err) = result {
        fatal(&err.to_string());
    }
}
