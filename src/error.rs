// src/error.rs

use thiserror::Error;

use crate::types::{Address, Amount};

/// Rejection raised by the host ledger when a settlement batch cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient reserve balance for {account}: has {available}, needs {required}")]
    InsufficientBalance {
        account: Address,
        available: Amount,
        required: Amount,
    },
    #[error("destination {0} rejected the deposit")]
    Rejected(Address),
    #[error("ledger balance overflow for {0}")]
    Overflow(Address),
}

/// Every way an operation on the curve can fail.
///
/// Errors are terminal for the operation that raised them: nothing is
/// mutated and nothing is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurveError {
    #[error("curve is paused")]
    Paused,
    #[error("oracle reported an invalid price")]
    InvalidOracle,
    #[error("purchase would mint {requested} total, exceeding mint cap {mint_cap}")]
    ExceedsMintCap { requested: Amount, mint_cap: Amount },
    #[error("basis points {value} exceed or match granularity")]
    InvalidBasisPoints { value: u16 },
    #[error("{destinations} destinations but {weights} weights")]
    LengthMismatch { destinations: usize, weights: usize },
    #[error("weights total {total}, expected 10000")]
    WeightsNotFull { total: u32 },
    #[error("not enough PCV held: {held}")]
    InsufficientHeldBalance { held: Amount },
    #[error("caller {caller} is not authorized")]
    NotAuthorized { caller: Address },
    #[error("arithmetic overflow")]
    Overflow,
    #[error("transfer failed: {0}")]
    Transfer(#[from] LedgerError),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = core::result::Result<T, CurveError>;
