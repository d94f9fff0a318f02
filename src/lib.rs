// src/lib.rs

// Core pricing and allocation (no wasm, pure Rust).
mod bonding_curve;
mod config;
mod curve;
mod error;
mod events;
mod host;
mod math;
mod splitter;
mod timer;
mod types;
mod wasm;

pub mod testing;

pub use crate::bonding_curve::{BondingCurve, CurveSnapshot};
pub use crate::config::CurveSettings;
pub use crate::curve::{
    buffer_multiplier, discount_multiplier, CurveConfig, CurveState, PurchaseQuote, Regime,
};
pub use crate::error::{CurveError, LedgerError, Result};
pub use crate::events::CurveEvent;
pub use crate::host::{
    AssetLedger, Authorizer, Clock, EventSink, Host, OracleReading, PriceSource, Transfer,
};
pub use crate::math::{mul_div, validate_basis_points, Decimal, GRANULARITY, U256, WAD};
pub use crate::splitter::{check_allocation, Allocation, AllocationTable};
pub use crate::timer::IncentiveTimer;
pub use crate::types::{Address, Amount, Timestamp};
pub use crate::wasm::{SimulatedPurchase, WasmCurve, WasmQuote};
