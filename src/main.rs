use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use solmosaic::AppCommand;
use solmosaic::cli::launch::LaunchRequest;
use solmosaic::cli::profile::ProfileOptions;
use solmosaic::core::launch::TokenCreationParams;
use solmosaic::core::log::init_logging;
use solmosaic::core::user::ProfileUpdate;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct LaunchArgs {
    /// Token name
    #[arg(long)]
    name: String,
    /// Token symbol
    #[arg(long)]
    symbol: String,
    #[arg(long, default_value_t = 1_000_000_000)]
    supply: u64,
    #[arg(long, default_value_t = 9)]
    decimals: u8,
    #[arg(long, default_value = "")]
    description: String,
    /// Mint address of an already created token
    #[arg(long)]
    mint: Option<String>,
    /// Initial price in the display currency
    #[arg(long)]
    initial_price: Option<f64>,
    /// Trading fee in percent
    #[arg(long)]
    trading_fee: Option<f64>,
    /// Creator fee in percent
    #[arg(long)]
    creator_fee: Option<f64>,
    /// Share of supply placed in liquidity, in percent
    #[arg(long)]
    liquidity: Option<f64>,
    /// Register the launch with pump.fun instead of printing the plan
    #[arg(long)]
    submit: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Browse NFTs and collections in the catalog
    Explore {
        /// Case-insensitive name search
        #[arg(short, long)]
        query: Option<String>,
        /// Collection id, or "all"
        #[arg(long)]
        collection: Option<String>,
    },
    /// Price a fractional purchase of an NFT
    Fractional {
        /// Catalog NFT id
        nft_id: String,
        /// Number of fragments to split the NFT into (2-100)
        #[arg(short, long, allow_negative_numbers = true)]
        fragments: Option<i64>,
        /// Number of fragments to buy
        #[arg(short, long, allow_negative_numbers = true)]
        quantity: Option<i64>,
    },
    /// Display portfolio valuation, fractional shares and recommendations
    Portfolio {
        /// Only show the portfolio with this id
        id: Option<String>,
    },
    /// Display the connected wallet's profile, activity and holdings
    Profile {
        /// Maximum number of activities to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Only show unread notifications
        #[arg(long)]
        unread_only: bool,
        /// Mark shown notifications as read
        #[arg(long)]
        mark_read: bool,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        twitter: Option<String>,
        #[arg(long)]
        discord: Option<String>,
    },
    /// Plan or register a pump.fun token launch
    Launch(LaunchArgs),
    /// Show the status of a launched token
    LaunchStatus {
        /// Token mint address
        mint: String,
    },
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Explore { query, collection } => AppCommand::Explore { query, collection },
            Commands::Fractional {
                nft_id,
                fragments,
                quantity,
            } => AppCommand::Fractional {
                nft_id,
                fragments,
                quantity,
            },
            Commands::Portfolio { id } => AppCommand::Portfolio { id },
            Commands::Profile {
                limit,
                unread_only,
                mark_read,
                display_name,
                avatar,
                bio,
                twitter,
                discord,
            } => AppCommand::Profile(ProfileOptions {
                activity_limit: limit,
                unread_only,
                mark_read,
                update: ProfileUpdate {
                    display_name,
                    avatar,
                    bio,
                    twitter,
                    discord,
                },
            }),
            Commands::Launch(args) => AppCommand::Launch(LaunchRequest {
                token: TokenCreationParams {
                    name: args.name,
                    symbol: args.symbol,
                    description: args.description,
                    supply: args.supply,
                    decimals: args.decimals,
                    ..Default::default()
                },
                token_mint: args.mint,
                initial_price: args.initial_price,
                trading_fee: args.trading_fee,
                creator_fee: args.creator_fee,
                liquidity_percentage: args.liquidity,
                submit: args.submit,
            }),
            Commands::LaunchStatus { mint } => AppCommand::LaunchStatus { token_mint: mint },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => solmosaic::cli::setup::setup_at_path(path),
            None => solmosaic::cli::setup::setup(),
        },
        Some(cmd) => solmosaic::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
