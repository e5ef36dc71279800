use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Supported ICON networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Yeouido,
    Sejong,
    Berlin,
}

impl Network {
    /// Network id as used by the ICON JSON-RPC `nid` field.
    pub fn chain_id(&self) -> u32 {
        match self {
            Network::Mainnet => 1,
            Network::Yeouido => 3,
            Network::Berlin => 7,
            Network::Sejong => 83,
        }
    }

    fn tracker_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://tracker.icon.foundation",
            Network::Yeouido => "https://bicon.tracker.solidwallet.io",
            Network::Sejong => "https://sejong.tracker.solidwallet.io",
            Network::Berlin => "https://berlin.tracker.solidwallet.io",
        }
    }

    /// Block explorer link for a transaction hash.
    pub fn tracker_link(&self, hash: &TxHash) -> String {
        format!("{}/transaction/{}", self.tracker_url(), hash)
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Yeouido => write!(f, "yeouido"),
            Network::Sejong => write!(f, "sejong"),
            Network::Berlin => write!(f, "berlin"),
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "yeouido" => Ok(Network::Yeouido),
            "sejong" => Ok(Network::Sejong),
            "berlin" => Ok(Network::Berlin),
            other => Err(format!("unknown network '{other}'")),
        }
    }
}

/// Token units shown in the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Base asset (ICX).
    Icx,
    /// Staked ICX.
    Sicx,
    /// Governance token.
    Baln,
    /// Stablecoin.
    BnUsd,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::Icx => write!(f, "ICX"),
            Unit::Sicx => write!(f, "sICX"),
            Unit::Baln => write!(f, "BALN"),
            Unit::BnUsd => write!(f, "bnUSD"),
        }
    }
}

/// A decimal amount tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    pub amount: Decimal,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(amount: Decimal, unit: Unit) -> Self {
        Self { amount, unit }
    }

    pub fn zero(unit: Unit) -> Self {
        Self::new(Decimal::ZERO, unit)
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", crate::units::format_amount(self.amount), self.unit)
    }
}

/// One of the two linked input fields of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Deposited side.
    Left,
    /// Wallet side.
    Right,
}

impl Field {
    pub fn opposite(self) -> Field {
        match self {
            Field::Left => Field::Right,
            Field::Right => Field::Left,
        }
    }
}

/// Which control produced the latest input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    Text,
    Slider,
}

/// Direction of a collateral adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Deposit,
    Withdraw,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Deposit => write!(f, "deposit"),
            Direction::Withdraw => write!(f, "withdraw"),
        }
    }
}

/// Transaction hash returned by the submission layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Settlement status of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failure,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Success => write!(f, "success"),
            TransactionStatus::Failure => write!(f, "failure"),
        }
    }
}

/// How a submission will be signed.
///
/// Passed explicitly into every submission call instead of being read from
/// wallet-wide state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningContext {
    /// Signing happens on a hardware wallet, so the user has to confirm on the device.
    pub ledger: bool,
}

impl SigningContext {
    pub fn software() -> Self {
        Self { ledger: false }
    }

    pub fn ledger() -> Self {
        Self { ledger: true }
    }
}
