//! # Scenario Replay
//!
//! A scenario is a JSON document describing a set of funded accounts and a
//! script of vault calls. Each step may state the value it expects back or
//! the error kind it expects to be rejected with; the replay records what
//! actually happened and counts disagreements.
//!
//! ```json
//! {
//!   "config": { "decimals_offset": 8 },
//!   "accounts": { "alice": 1000 },
//!   "steps": [
//!     { "action": { "approve_assets": { "owner": "alice", "amount": 1000 } } },
//!     { "action": { "deposit": { "caller": "alice", "assets": 1000 } },
//!       "expect": 100000000000 },
//!     { "action": { "redeem": { "caller": "alice", "shares": 1 } },
//!       "expect_error": "zero_assets" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use sats_contracts::{Vault, VaultError, VaultSnapshot};
use sats_protocol::ledger::{Address, MemoryAssetLedger, MemoryShareLedger};
use sats_protocol::{Amount, VaultConfig};

type MemoryVault = Vault<MemoryAssetLedger, MemoryShareLedger>;

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

/// A scripted run against a fresh vault.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Vault parameters. Overrides any config file given on the command line.
    #[serde(default)]
    pub config: Option<VaultConfig>,
    /// Starting asset balance per account.
    #[serde(default)]
    pub accounts: BTreeMap<Address, Amount>,
    /// The calls to replay, in order.
    pub steps: Vec<Step>,
}

/// One scripted call and what it should produce.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub action: Action,
    /// The amount the call should return.
    #[serde(default)]
    pub expect: Option<Amount>,
    /// The error kind the call should be rejected with, e.g. `"zero_shares"`.
    #[serde(default)]
    pub expect_error: Option<String>,
}

/// A vault call or an asset-ledger action. `receiver` and `owner` default
/// to the caller; an asset approval's `spender` defaults to the vault.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum Action {
    Deposit {
        caller: Address,
        assets: Amount,
        #[serde(default)]
        receiver: Option<Address>,
    },
    Mint {
        caller: Address,
        shares: Amount,
        #[serde(default)]
        receiver: Option<Address>,
    },
    Withdraw {
        caller: Address,
        assets: Amount,
        #[serde(default)]
        receiver: Option<Address>,
        #[serde(default)]
        owner: Option<Address>,
    },
    Redeem {
        caller: Address,
        shares: Amount,
        #[serde(default)]
        receiver: Option<Address>,
        #[serde(default)]
        owner: Option<Address>,
    },
    ApproveAssets {
        owner: Address,
        #[serde(default)]
        spender: Option<Address>,
        amount: Amount,
    },
    ApproveShares {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
    /// A plain asset transfer into the vault's account.
    Donate { from: Address, assets: Amount },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Deposit {
                caller,
                assets,
                receiver,
            } => write!(f, "deposit {caller} -> {} {assets}", or(receiver, caller)),
            Action::Mint {
                caller,
                shares,
                receiver,
            } => write!(f, "mint {caller} -> {} {shares}", or(receiver, caller)),
            Action::Withdraw {
                caller,
                assets,
                receiver,
                owner,
            } => write!(
                f,
                "withdraw {caller} ({}) -> {} {assets}",
                or(owner, caller),
                or(receiver, caller)
            ),
            Action::Redeem {
                caller,
                shares,
                receiver,
                owner,
            } => write!(
                f,
                "redeem {caller} ({}) -> {} {shares}",
                or(owner, caller),
                or(receiver, caller)
            ),
            Action::ApproveAssets {
                owner,
                spender,
                amount,
            } => write!(
                f,
                "approve_assets {owner} -> {} {amount}",
                spender.as_deref().unwrap_or("vault")
            ),
            Action::ApproveShares {
                owner,
                spender,
                amount,
            } => write!(f, "approve_shares {owner} -> {spender} {amount}"),
            Action::Donate { from, assets } => write!(f, "donate {from} {assets}"),
        }
    }
}

fn or<'a>(value: &'a Option<Address>, fallback: &'a str) -> &'a str {
    value.as_deref().unwrap_or(fallback)
}

impl Scenario {
    /// Parses a scenario document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid scenario document")
    }

    /// Reads and parses a scenario file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario file: {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("in {}", path.display()))
    }

    /// Replays the scenario against a fresh in-memory vault.
    ///
    /// `fallback` is used when the scenario carries no `config` block.
    pub fn run(&self, fallback: VaultConfig) -> Result<Report> {
        let config = self.config.clone().unwrap_or(fallback);
        let mut vault = Vault::new(config, MemoryAssetLedger::new(), MemoryShareLedger::new())
            .context("failed to create vault")?;

        for (account, balance) in &self.accounts {
            vault
                .asset_ledger_mut()
                .mint(account, *balance)
                .with_context(|| format!("failed to fund account {account}"))?;
        }
        tracing::info!(
            vault = %vault.address(),
            accounts = self.accounts.len(),
            steps = self.steps.len(),
            "replaying scenario"
        );

        let mut steps = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            let result = apply(&mut vault, &step.action);
            let report = StepReport::new(index, step, result);
            if report.matched {
                tracing::debug!(step = index, action = %report.action, "step matched");
            } else {
                tracing::warn!(
                    step = index,
                    action = %report.action,
                    error = report.error.as_deref().unwrap_or("-"),
                    "step did not match its expectation"
                );
            }
            steps.push(report);
        }

        let mismatches = steps.iter().filter(|s| !s.matched).count();
        Ok(Report {
            vault: vault.snapshot().context("failed to snapshot vault")?,
            accounts: account_reports(&vault),
            steps,
            mismatches,
        })
    }
}

/// Executes one action. `Ok(Some(_))` carries the amount a vault call returns.
fn apply(vault: &mut MemoryVault, action: &Action) -> Result<Option<Amount>, VaultError> {
    match action {
        Action::Deposit {
            caller,
            assets,
            receiver,
        } => vault.deposit(caller, *assets, or(receiver, caller)).map(Some),
        Action::Mint {
            caller,
            shares,
            receiver,
        } => vault.mint(caller, *shares, or(receiver, caller)).map(Some),
        Action::Withdraw {
            caller,
            assets,
            receiver,
            owner,
        } => vault
            .withdraw(caller, *assets, or(receiver, caller), or(owner, caller))
            .map(Some),
        Action::Redeem {
            caller,
            shares,
            receiver,
            owner,
        } => vault
            .redeem(caller, *shares, or(receiver, caller), or(owner, caller))
            .map(Some),
        Action::ApproveAssets {
            owner,
            spender,
            amount,
        } => {
            let spender = spender.clone().unwrap_or_else(|| vault.address().to_string());
            vault.asset_ledger_mut().approve(owner, &spender, *amount);
            Ok(None)
        }
        Action::ApproveShares {
            owner,
            spender,
            amount,
        } => vault.approve_shares(owner, spender, *amount).map(|()| None),
        Action::Donate { from, assets } => {
            let to = vault.address().to_string();
            vault.asset_ledger_mut().transfer(from, &to, *assets)?;
            Ok(None)
        }
    }
}

fn account_reports(vault: &MemoryVault) -> Vec<AccountReport> {
    let mut accounts: BTreeMap<Address, AccountReport> = BTreeMap::new();
    for (name, assets) in vault.asset_ledger().holders() {
        if name != vault.address() {
            accounts.entry(name.clone()).or_insert_with(|| AccountReport::new(name)).assets = assets;
        }
    }
    for (name, shares) in vault.share_ledger().holders() {
        accounts.entry(name.clone()).or_insert_with(|| AccountReport::new(name)).shares = shares;
    }
    accounts.into_values().collect()
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// What one step did.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub action: String,
    /// Amount returned by a successful vault call.
    pub value: Option<Amount>,
    /// Error kind of a rejected call.
    pub error: Option<String>,
    /// Error message of a rejected call.
    pub message: Option<String>,
    /// Whether the outcome agrees with the step's expectations.
    pub matched: bool,
}

impl StepReport {
    fn new(index: usize, step: &Step, result: Result<Option<Amount>, VaultError>) -> Self {
        let action = step.action.to_string();
        match result {
            Ok(value) => {
                let matched = step.expect_error.is_none()
                    && step.expect.map_or(true, |expected| value == Some(expected));
                Self {
                    index,
                    action,
                    value,
                    error: None,
                    message: None,
                    matched,
                }
            }
            Err(err) => {
                let kind = err.kind();
                Self {
                    index,
                    action,
                    value: None,
                    error: Some(kind.to_string()),
                    message: Some(err.to_string()),
                    matched: step.expect_error.as_deref() == Some(kind),
                }
            }
        }
    }
}

/// Final balances of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountReport {
    pub name: Address,
    pub assets: Amount,
    pub shares: Amount,
}

impl AccountReport {
    fn new(name: Address) -> Self {
        Self {
            name,
            assets: 0,
            shares: 0,
        }
    }
}

/// Outcome of a scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub vault: VaultSnapshot,
    pub steps: Vec<StepReport>,
    pub accounts: Vec<AccountReport>,
    /// Steps whose outcome disagreed with their expectation.
    pub mismatches: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = &self.vault;
        writeln!(
            f,
            "vault {} ({} / {}, decimals {}, offset {})",
            v.address, v.name, v.symbol, v.decimals, v.decimals_offset
        )?;
        writeln!(f)?;
        for step in &self.steps {
            let mark = if step.matched { " " } else { "!" };
            let outcome = match (&step.value, &step.error) {
                (_, Some(kind)) => format!("rejected: {kind}"),
                (Some(value), None) => format!("ok {value}"),
                (None, None) => "ok".to_string(),
            };
            writeln!(f, "{mark} {:>3}  {:<60} {outcome}", step.index, step.action)?;
        }
        writeln!(f)?;
        writeln!(f, "tracked assets   {}", v.state.tracked_assets)?;
        writeln!(f, "total shares     {}", v.state.total_shares)?;
        writeln!(f, "raw balance      {}", v.raw_asset_balance)?;
        writeln!(f, "price per share  {}", v.price_per_share)?;
        writeln!(f)?;
        for account in &self.accounts {
            writeln!(
                f,
                "{:<16} assets {:>40}  shares {:>40}",
                account.name, account.assets, account.shares
            )?;
        }
        writeln!(f)?;
        write!(f, "mismatches: {}", self.mismatches)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
