// src/events.rs

use serde::{Deserialize, Serialize};

use crate::types::{amount_str, Address, Amount};

/// Structured record of every committed state change, for external indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveEvent {
    Purchase {
        to: Address,
        #[serde(with = "amount_str")]
        amount_in: Amount,
        #[serde(with = "amount_str")]
        amount_out: Amount,
    },
    Allocate {
        caller: Address,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    IncentivePaid {
        caller: Address,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    Reset {
        #[serde(with = "amount_str")]
        old_total_purchased: Amount,
    },
    ScaleUpdate {
        #[serde(with = "amount_str")]
        old_scale: Amount,
        #[serde(with = "amount_str")]
        new_scale: Amount,
    },
    BufferUpdate {
        old_buffer: u16,
        new_buffer: u16,
    },
    DiscountUpdate {
        old_discount: u16,
        new_discount: u16,
    },
    MintCapUpdate {
        #[serde(with = "amount_str")]
        old_mint_cap: Amount,
        #[serde(with = "amount_str")]
        new_mint_cap: Amount,
    },
    OracleUpdate {
        old_oracle: Address,
        new_oracle: Address,
    },
    CoreUpdate {
        old_core: Address,
        new_core: Address,
    },
    AllocationUpdate {
        old_destinations: Vec<Address>,
        new_destinations: Vec<Address>,
    },
    IncentiveUpdate {
        #[serde(with = "amount_str")]
        old_incentive_amount: Amount,
        #[serde(with = "amount_str")]
        new_incentive_amount: Amount,
    },
    DurationUpdate {
        old_duration: u64,
        new_duration: u64,
    },
    Paused {
        account: Address,
    },
    Unpaused {
        account: Address,
    },
}

impl CurveEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            CurveEvent::Purchase { .. } => "purchase",
            CurveEvent::Allocate { .. } => "allocate",
            CurveEvent::IncentivePaid { .. } => "incentive_paid",
            CurveEvent::Reset { .. } => "reset",
            CurveEvent::ScaleUpdate { .. } => "scale_update",
            CurveEvent::BufferUpdate { .. } => "buffer_update",
            CurveEvent::DiscountUpdate { .. } => "discount_update",
            CurveEvent::MintCapUpdate { .. } => "mint_cap_update",
            CurveEvent::OracleUpdate { .. } => "oracle_update",
            CurveEvent::CoreUpdate { .. } => "core_update",
            CurveEvent::AllocationUpdate { .. } => "allocation_update",
            CurveEvent::IncentiveUpdate { .. } => "incentive_update",
            CurveEvent::DurationUpdate { .. } => "duration_update",
            CurveEvent::Paused { .. } => "paused",
            CurveEvent::Unpaused { .. } => "unpaused",
        }
    }
}
