use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use balanced_common::error::AppError;
use balanced_common::units::{from_loop, parse_loop_str};

/// Kinds of executable proposal actions the interface understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Funding,
    BalnAllocation,
    NetworkFeeAllocation,
}

impl ActionType {
    pub const ALL: [ActionType; 3] = [
        ActionType::Funding,
        ActionType::BalnAllocation,
        ActionType::NetworkFeeAllocation,
    ];

    /// Contract method names that carry this action.
    pub fn method_names(&self) -> &'static [&'static str] {
        match self {
            ActionType::Funding => &["daoDisburse"],
            ActionType::BalnAllocation => &["updateBalTokenDistPercentage"],
            ActionType::NetworkFeeAllocation => &["setDividendsCategoryPercentage"],
        }
    }

    /// Human-readable heading.
    pub fn label(&self) -> &'static str {
        match self {
            ActionType::Funding => "Funding",
            ActionType::BalnAllocation => "BALN allocation",
            ActionType::NetworkFeeAllocation => "Network fee allocation",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Funding => write!(f, "funding"),
            ActionType::BalnAllocation => write!(f, "baln_allocation"),
            ActionType::NetworkFeeAllocation => write!(f, "network_fee_allocation"),
        }
    }
}

/// One token amount paid out by a funding proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundingAmount {
    pub token_address: String,
    pub amount: Decimal,
}

/// One line of a ratio proposal, as a percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatioEntry {
    pub name: String,
    pub percent: Decimal,
}

/// A decoded proposal action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ProposalAction {
    Funding {
        recipient: String,
        amounts: Vec<FundingAmount>,
    },
    BalnAllocation(Vec<RatioEntry>),
    NetworkFeeAllocation(Vec<RatioEntry>),
}

impl ProposalAction {
    pub fn action_type(&self) -> ActionType {
        match self {
            ProposalAction::Funding { .. } => ActionType::Funding,
            ProposalAction::BalnAllocation(_) => ActionType::BalnAllocation,
            ProposalAction::NetworkFeeAllocation(_) => ActionType::NetworkFeeAllocation,
        }
    }
}

// Wire shapes as stored in the governance contract.

/// Loop value written either as a string (hex or decimal) or as a JSON number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoopValue {
    Text(String),
    Number(u64),
}

impl LoopValue {
    fn to_loop(&self) -> Result<u128, AppError> {
        match self {
            LoopValue::Text(s) => parse_loop_str(s),
            LoopValue::Number(n) => Ok(u128::from(*n)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFunding {
    #[serde(rename = "_recipient")]
    recipient: String,
    #[serde(rename = "_amounts")]
    amounts: Vec<RawAmount>,
}

#[derive(Debug, Deserialize)]
struct RawAmount {
    #[serde(rename = "_address")]
    address: String,
    amount: LoopValue,
}

#[derive(Debug, Deserialize)]
struct RawBalnAllocation {
    #[serde(rename = "_recipient_list")]
    recipients: Vec<RawRecipient>,
}

#[derive(Debug, Deserialize)]
struct RawRecipient {
    recipient_name: String,
    dist_percent: LoopValue,
}

#[derive(Debug, Deserialize)]
struct RawFeeAllocation {
    #[serde(rename = "_dist_list")]
    categories: Vec<RawCategory>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    category: String,
    dist_percent: LoopValue,
}

/// `dist_percent` is a loop fraction: `10^18` means 100%.
fn loop_to_percent(value: &LoopValue) -> Result<Decimal, AppError> {
    Ok(from_loop(value.to_loop()?)? * Decimal::ONE_HUNDRED)
}

fn payload<T: serde::de::DeserializeOwned>(method: &str, value: &serde_json::Value) -> Result<T, AppError> {
    serde_json::from_value(value.clone())
        .map_err(|e| AppError::Decode(format!("invalid '{method}' action payload: {e}")))
}

/// Maps contract method names to action types and decodes their payloads.
pub struct ActionRegistry {
    methods: HashMap<&'static str, ActionType>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        let methods = ActionType::ALL
            .iter()
            .flat_map(|ty| ty.method_names().iter().map(move |m| (*m, *ty)))
            .collect();
        Self { methods }
    }

    pub fn action_type(&self, method: &str) -> Option<ActionType> {
        self.methods.get(method).copied()
    }

    /// Decode the raw actions JSON of a proposal.
    ///
    /// The first known method in document order wins. Methods the registry does not
    /// know are skipped; `None` means a text-only proposal. A known method with a
    /// malformed payload is an error.
    pub fn decode(&self, raw: &str) -> Result<Option<ProposalAction>, AppError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let actions: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)
            .map_err(|e| AppError::Decode(format!("proposal actions are not a JSON object: {e}")))?;

        for (method, value) in &actions {
            let Some(action_type) = self.action_type(method) else {
                tracing::debug!(method = %method, "Skipping unknown proposal action");
                continue;
            };
            let action = self.decode_payload(action_type, method, value)?;
            tracing::debug!(method = %method, action_type = %action_type, "Decoded proposal action");
            return Ok(Some(action));
        }
        Ok(None)
    }

    fn decode_payload(
        &self,
        action_type: ActionType,
        method: &str,
        value: &serde_json::Value,
    ) -> Result<ProposalAction, AppError> {
        match action_type {
            ActionType::Funding => {
                let raw: RawFunding = payload(method, value)?;
                let amounts = raw
                    .amounts
                    .iter()
                    .map(|a| {
                        Ok(FundingAmount {
                            token_address: a.address.clone(),
                            amount: from_loop(a.amount.to_loop()?)?,
                        })
                    })
                    .collect::<Result<Vec<_>, AppError>>()?;
                Ok(ProposalAction::Funding {
                    recipient: raw.recipient,
                    amounts,
                })
            }
            ActionType::BalnAllocation => {
                let raw: RawBalnAllocation = payload(method, value)?;
                let entries = raw
                    .recipients
                    .iter()
                    .map(|r| {
                        Ok(RatioEntry {
                            name: r.recipient_name.clone(),
                            percent: loop_to_percent(&r.dist_percent)?,
                        })
                    })
                    .collect::<Result<Vec<_>, AppError>>()?;
                Ok(ProposalAction::BalnAllocation(entries))
            }
            ActionType::NetworkFeeAllocation => {
                let raw: RawFeeAllocation = payload(method, value)?;
                let entries = raw
                    .categories
                    .iter()
                    .map(|c| {
                        Ok(RatioEntry {
                            name: c.category.clone(),
                            percent: loop_to_percent(&c.dist_percent)?,
                        })
                    })
                    .collect::<Result<Vec<_>, AppError>>()?;
                Ok(ProposalAction::NetworkFeeAllocation(entries))
            }
        }
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode proposal actions with the default registry.
pub fn decode_actions(raw: &str) -> Result<Option<ProposalAction>, AppError> {
    ActionRegistry::new().decode(raw)
}
