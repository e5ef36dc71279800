use std::str::FromStr;

use rust_decimal::Decimal;

use crate::types::{Network, SigningContext};

/// Padding added on top of the locked amount when it is non-zero.
///
/// Keeps the slider off the exact locked boundary, which on-chain rounding
/// reports as insufficient collateral.
pub const FLOOR_PADDING: Decimal = Decimal::ONE;

/// Slider maximum used when there is nothing to move (zero total balance).
pub const SLIDER_RANGE_MAX_BOTTOM_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Network the interface talks to
    pub network: Network,

    /// Padding added to the locked-collateral floor marker (default: 1)
    pub floor_padding: Decimal,

    /// Slider maximum when the total balance is zero (default: 0.000001)
    pub slider_max_bottom_threshold: Decimal,

    /// Sign submissions on a hardware wallet by default
    pub ledger_signing: bool,

    /// Optional tracing filter override
    pub log_filter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            floor_padding: FLOOR_PADDING,
            slider_max_bottom_threshold: SLIDER_RANGE_MAX_BOTTOM_THRESHOLD,
            ledger_signing: false,
            log_filter: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let floor_padding = std::env::var("COLLATERAL_FLOOR_PADDING")
            .map(|v| Decimal::from_str(v.trim()))
            .unwrap_or(Ok(FLOOR_PADDING))
            .map_err(|_| anyhow::anyhow!("COLLATERAL_FLOOR_PADDING must be a valid decimal"))?;
        if floor_padding.is_sign_negative() {
            anyhow::bail!("COLLATERAL_FLOOR_PADDING must not be negative");
        }

        Ok(Self {
            network: std::env::var("BALANCED_NETWORK")
                .unwrap_or_else(|_| "mainnet".to_string())
                .parse()
                .map_err(|e: String| anyhow::anyhow!("BALANCED_NETWORK: {e}"))?,
            floor_padding,
            slider_max_bottom_threshold: std::env::var("SLIDER_RANGE_MAX_BOTTOM_THRESHOLD")
                .map(|v| Decimal::from_str(v.trim()))
                .unwrap_or(Ok(SLIDER_RANGE_MAX_BOTTOM_THRESHOLD))
                .map_err(|_| {
                    anyhow::anyhow!("SLIDER_RANGE_MAX_BOTTOM_THRESHOLD must be a valid decimal")
                })?,
            ledger_signing: std::env::var("LEDGER_SIGNING")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("LEDGER_SIGNING must be true or false"))?,
            log_filter: std::env::var("LOG_FILTER").ok(),
        })
    }

    /// Signing context used when the caller does not pick one explicitly.
    pub fn signing_context(&self) -> SigningContext {
        SigningContext {
            ledger: self.ledger_signing,
        }
    }
}
