use crate::{
    client::{ClockControl, JsonRpcClient, RpcDialect},
    config::{defaults, ConfigError, LedgerkitConfig},
    service::BalanceOverrideService,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledgerkit_common::{
    amount::parse_amount, crypto::Address, error::LedgerError, get_cli_styles,
    utils::format_address,
};
use std::{path::PathBuf, sync::Arc};

#[derive(Parser, Debug)]
#[command(name = "ledgerkit", version)]
#[command(about = "Force balances and allowances on a simulated EVM ledger")]
#[command(styles = get_cli_styles())]
pub struct Cli {
    /// JSON-RPC endpoint of the simulated ledger
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Administrative method namespace of the node
    #[arg(long, value_enum, global = true)]
    pub dialect: Option<RpcDialect>,

    /// JSON token table replacing the built-in registry
    #[arg(long, global = true)]
    pub registry_file: Option<PathBuf>,

    /// JSON file to load the configuration from
    #[arg(long, global = true)]
    pub config_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = defaults::LOG_LEVEL)]
    pub log_level: String,

    /// Advanced: Request timeout in seconds
    #[arg(long, global = true)]
    pub request_timeout_secs: Option<u64>,

    /// Advanced: Connection timeout in seconds
    #[arg(long, global = true)]
    pub connection_timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Force an account's balance of a token
    SetBalance {
        token: String,
        account: Address,
        /// Smallest-unit amount (decimal or 0x hex), or whole units with --units
        amount: String,
        /// Interpret the amount in whole tokens using the token's decimals
        #[arg(long)]
        units: bool,
    },
    /// Read an account's balance of a token
    Balance { token: String, account: Address },
    /// Grant a spender the maximum allowance over a holder's tokens
    Approve {
        token: String,
        holder: Address,
        spender: Address,
    },
    /// Print the storage slot holding an account's token balance
    Slot { token: String, account: Address },
    /// List the registered tokens
    Tokens,
    /// Advance the ledger clock and mine a block
    IncreaseTime { seconds: u64 },
    /// Set the timestamp of the next mined block
    SetNextTimestamp { timestamp: u64 },
}

impl Cli {
    /// Config file (or defaults) with command line flags applied on top
    pub fn to_config(&self) -> Result<LedgerkitConfig, ConfigError> {
        let mut config = match &self.config_file {
            Some(path) => LedgerkitConfig::from_file(path)?,
            None => LedgerkitConfig::default(),
        };

        if let Some(rpc_url) = &self.rpc_url {
            config.rpc_url = rpc_url.clone();
        }
        if let Some(dialect) = self.dialect {
            config.dialect = dialect;
        }
        if let Some(registry_file) = &self.registry_file {
            config.registry_file = Some(registry_file.clone());
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout_secs = secs;
        }
        if let Some(secs) = self.connection_timeout_secs {
            config.connection_timeout_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Whether `err` was caused by the invocation rather than by the ledger
pub fn is_caller_error(err: &anyhow::Error) -> bool {
    if err.downcast_ref::<ConfigError>().is_some() {
        return true;
    }
    matches!(err.downcast_ref::<LedgerError>(), Some(e) if e.is_caller_error())
}

fn short(address: &Address) -> String {
    let full = address.to_hex();
    format_address(&full).unwrap_or(full)
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.to_config().context("Invalid configuration")?;
    let registry = Arc::new(
        config
            .load_registry()
            .context("Failed to load token registry")?,
    );

    // Commands that never touch the ledger
    match &cli.command {
        Command::Tokens => {
            for descriptor in registry.iter() {
                println!("{}", serde_json::to_string(descriptor)?);
            }
            return Ok(());
        }
        Command::Slot { token, account } => {
            let descriptor = registry.lookup(token)?;
            match descriptor.mapping_slot() {
                Some(base) => println!("{}", ledgerkit_common::slot::compute_slot(base, account)),
                None => println!("{} is native and has no storage slot", descriptor.symbol()),
            }
            return Ok(());
        }
        _ => {}
    }

    let client = Arc::new(
        JsonRpcClient::with_config(&config.rpc_url, config.client_config())
            .context("Failed to create JSON-RPC client")?,
    );
    let service = BalanceOverrideService::new(registry, client.clone(), client.clone());

    match cli.command {
        Command::SetBalance {
            token,
            account,
            amount,
            units,
        } => {
            let amount = if units {
                service.set_balance_units(&token, &account, &amount).await?
            } else {
                let amount = parse_amount(&amount)?;
                service.set_balance(&token, &account, &amount).await?;
                amount
            };
            println!("{} {} balance set to {}", short(&account), token, amount);
        }
        Command::Balance { token, account } => {
            let balance = service.balance_of(&token, &account).await?;
            println!("{}", balance);
        }
        Command::Approve {
            token,
            holder,
            spender,
        } => {
            service.approve(&token, &holder, &spender).await?;
            println!("{} approved {} for {}", short(&holder), short(&spender), token);
        }
        Command::IncreaseTime { seconds } => {
            client.increase_time(seconds).await?;
            println!("Advanced clock by {}s", seconds);
        }
        Command::SetNextTimestamp { timestamp } => {
            let timestamp = client.set_next_block_timestamp(timestamp).await?;
            println!("Next block timestamp: {}", timestamp);
        }
        Command::Tokens | Command::Slot { .. } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";

    #[test]
    fn test_parse_set_balance() {
        let cli = Cli::try_parse_from([
            "ledgerkit",
            "set-balance",
            "dai",
            ACCOUNT,
            "1.5",
            "--units",
            "--dialect",
            "anvil",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Command::SetBalance {
                token: "dai".to_string(),
                account: ACCOUNT.parse().unwrap(),
                amount: "1.5".to_string(),
                units: true,
            }
        );
        assert_eq!(cli.dialect, Some(RpcDialect::Anvil));
    }

    #[test]
    fn test_rejects_malformed_account() {
        assert!(Cli::try_parse_from(["ledgerkit", "balance", "eth", "0x1234"]).is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "ledgerkit",
            "--rpc-url",
            "http://localhost:9545",
            "--request-timeout-secs",
            "5",
            "tokens",
        ])
        .unwrap();

        let config = cli.to_config().unwrap();
        assert_eq!(config.rpc_url, "http://localhost:9545");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.connection_timeout_secs, defaults::CONNECTION_TIMEOUT_SECS);
    }

    #[test]
    fn test_invalid_flag_value_fails_validation() {
        let cli =
            Cli::try_parse_from(["ledgerkit", "--request-timeout-secs", "0", "tokens"]).unwrap();
        assert!(matches!(cli.to_config(), Err(ConfigError::InvalidTimeout { .. })));
    }

    #[tokio::test]
    async fn test_invalid_config_is_caller_error() {
        let cli =
            Cli::try_parse_from(["ledgerkit", "--request-timeout-secs", "0", "tokens"]).unwrap();
        let err = run(cli).await.unwrap_err();
        assert!(is_caller_error(&err));
    }

    #[tokio::test]
    async fn test_unknown_token_is_caller_error() {
        let cli = Cli::try_parse_from(["ledgerkit", "slot", "xyz", ACCOUNT]).unwrap();
        let err = run(cli).await.unwrap_err();
        assert!(is_caller_error(&err));
    }

    #[test]
    fn test_transport_failure_is_not_caller_error() {
        let err = anyhow::Error::from(LedgerError::Transport(anyhow::anyhow!("connection refused")));
        assert!(!is_caller_error(&err));
    }

    #[test]
    fn test_short_address() {
        let address: Address = ACCOUNT.parse().unwrap();
        assert_eq!(short(&address), "0x0000...00aa");
    }
}
