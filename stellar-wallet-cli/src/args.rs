use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use stellar_wallet::crypto::mnemonic::MnemonicStrength;
use stellar_wallet::{HorizonConfig, MultisigOptions};

#[derive(Parser, Debug)]
#[command(name = "stellar-wallet")]
#[command(about = "Inspect Stellar accounts, generate wallets and send multisig payments", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub network: NetworkArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Endpoint options, falling back to the environment
///
/// Each flag replaces only its own variable: `--network` overrides
/// `STELLAR_NETWORK` and `--horizon-url` overrides `HORIZON_URL`, while
/// `HORIZON_URL`, `FRIENDBOT_URL` and `HORIZON_TIMEOUT_SECS` from the
/// environment still apply.
#[derive(Args, Debug, Default)]
pub struct NetworkArgs {
    /// Network to use (testnet or public), overrides $STELLAR_NETWORK
    #[arg(long, global = true)]
    pub network: Option<String>,

    /// Horizon server URL, overrides $HORIZON_URL
    #[arg(long = "horizon-url", global = true)]
    pub horizon_url: Option<String>,
}

impl NetworkArgs {
    /// Environment configuration with command-line overrides applied
    pub fn config(&self) -> stellar_wallet::Result<HorizonConfig> {
        self.config_with(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration against an arbitrary environment
    pub fn config_with<F>(&self, env: F) -> stellar_wallet::Result<HorizonConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        HorizonConfig::from_vars(|key| match key {
            "STELLAR_NETWORK" => self.network.clone().or_else(|| env(key)),
            "HORIZON_URL" => self.horizon_url.clone().or_else(|| env(key)),
            _ => env(key),
        })
    }
}

/// Secret seed of the paying account
#[derive(Args, Debug)]
pub struct SenderKey {
    /// Sender secret seed (S...)
    #[arg(id = "sender_secret", long = "sender-secret", env = "SENDER_PRIVATE_KEY", hide_env_values = true)]
    pub secret: String,
}

/// Secret seed of the second signer
#[derive(Args, Debug)]
pub struct CoSignerKey {
    /// Second signer secret seed (S...)
    #[arg(id = "co_signer_secret", long = "co-signer-secret", env = "SECOND_SIGNER_PRIVATE_KEY", hide_env_values = true)]
    pub secret: String,
}

/// Weights and thresholds for `multisig-setup`
#[derive(Args, Debug)]
pub struct MultisigArgs {
    /// Weight of the added signer
    #[arg(long, default_value_t = 1)]
    pub signer_weight: u8,

    /// Weight of the account's own key
    #[arg(long, default_value_t = 1)]
    pub master_weight: u8,

    /// Low threshold
    #[arg(long, default_value_t = 1)]
    pub low_threshold: u8,

    /// Medium threshold (payments)
    #[arg(long, default_value_t = 2)]
    pub med_threshold: u8,

    /// High threshold (account options)
    #[arg(long, default_value_t = 2)]
    pub high_threshold: u8,
}

impl MultisigArgs {
    pub fn options(&self) -> MultisigOptions {
        MultisigOptions {
            signer_weight: self.signer_weight,
            master_weight: self.master_weight,
            low_threshold: self.low_threshold,
            med_threshold: self.med_threshold,
            high_threshold: self.high_threshold,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show balances, sequence number, flags, signers and data of an account
    Inspect {
        /// Account to inspect (defaults to $SENDER_PUBLIC_KEY)
        #[arg(short, long)]
        account: Option<String>,
    },

    /// Show only the balances of an account
    Balance {
        /// Account to query (defaults to $SENDER_PUBLIC_KEY)
        #[arg(short, long)]
        account: Option<String>,
    },

    /// Generate a mnemonic and derive a keypair from it
    Generate {
        /// Number of mnemonic words (12 or 24)
        #[arg(short, long, default_value_t = 12)]
        words: usize,

        /// Optional BIP-39 passphrase
        #[arg(short, long)]
        passphrase: Option<String>,

        /// Account index in m/44'/148'/index'
        #[arg(short, long, default_value_t = 0)]
        index: u32,
    },

    /// Derive the keypair of an existing mnemonic
    Derive {
        /// Space separated mnemonic phrase
        #[arg(short, long)]
        mnemonic: String,

        /// Optional BIP-39 passphrase
        #[arg(short, long)]
        passphrase: Option<String>,

        /// Account index in m/44'/148'/index'
        #[arg(short, long, default_value_t = 0)]
        index: u32,
    },

    /// Generate a random keypair without a mnemonic
    Random,

    /// Create and fund a test network account through friendbot
    Fund {
        /// Account to fund (defaults to $SENDER_PUBLIC_KEY)
        #[arg(short, long)]
        account: Option<String>,
    },

    /// Send XLM signed by the sender key
    Pay {
        #[command(flatten)]
        sender: SenderKey,

        /// Destination account (must exist)
        #[arg(short, long)]
        to: String,

        /// Amount of XLM, up to 7 decimal places
        #[arg(long)]
        amount: String,

        /// Print the signed envelope instead of submitting it
        #[arg(long)]
        no_submit: bool,
    },

    /// Add a second signer to the sender account and raise its thresholds
    MultisigSetup {
        #[command(flatten)]
        sender: SenderKey,

        /// Public key of the second signer
        #[arg(long = "co-signer", env = "SECOND_SIGNER_PUBLIC_KEY")]
        co_signer: String,

        #[command(flatten)]
        weights: MultisigArgs,
    },

    /// Send XLM from a two-signer account, signed by both keys
    MultisigPay {
        #[command(flatten)]
        sender: SenderKey,

        #[command(flatten)]
        co_signer: CoSignerKey,

        /// Destination account (must exist)
        #[arg(short, long)]
        to: String,

        /// Amount of XLM, up to 7 decimal places
        #[arg(long)]
        amount: String,
    },

    /// Add the second signer's signature to a base64 envelope and submit it
    Cosign {
        #[command(flatten)]
        co_signer: CoSignerKey,

        /// Base64 transaction envelope (read from stdin when omitted)
        #[arg(short, long)]
        envelope: Option<String>,

        /// Print the co-signed envelope instead of submitting it
        #[arg(long)]
        no_submit: bool,
    },

    /// Serve co-signing over HTTP: POST / with {"transaction": "<base64>"}
    CosignServer {
        #[command(flatten)]
        co_signer: CoSignerKey,

        /// Address to listen on
        #[arg(long, default_value = crate::server::DEFAULT_LISTEN)]
        listen: SocketAddr,
    },

    /// List payments involving an account, oldest first
    Payments {
        /// Account to query (defaults to $SENDER_PUBLIC_KEY)
        #[arg(short, long)]
        account: Option<String>,

        /// Paging token to start after
        #[arg(long)]
        cursor: Option<String>,

        /// Maximum number of records
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },

    /// Follow payments received by an account
    Watch {
        /// Receiving account
        #[arg(short, long, env = "RECEIVER_ADDR")]
        account: String,

        /// File holding the last handled paging token per account
        #[arg(long, default_value = "db/cursors.json")]
        cursor_file: PathBuf,

        /// Seconds between polls
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
}

/// Validate the `--words` value
pub fn strength(words: usize) -> stellar_wallet::Result<MnemonicStrength> {
    MnemonicStrength::from_word_count(words)
}
