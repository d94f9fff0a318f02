// src/bonding_curve.rs

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::CurveSettings;
use crate::curve::{CurveConfig, CurveState, PurchaseQuote, Regime};
use crate::error::{CurveError, Result};
use crate::events::CurveEvent;
use crate::host::{Authorizer, Host, PriceSource, Transfer};
use crate::math::{validate_basis_points, Decimal};
use crate::splitter::AllocationTable;
use crate::timer::IncentiveTimer;
use crate::types::{amount_str, Address, Amount, Timestamp};

/// Serializable view of the whole curve at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurveSnapshot {
    pub address: Address,
    pub core: Address,
    pub oracle: Address,
    pub config: CurveConfig,
    pub state: CurveState,
    pub regime: Regime,
    pub paused: bool,
    pub allocation: AllocationTable,
    pub timer: IncentiveTimer,
    #[serde(with = "amount_str")]
    pub remaining_to_scale: Amount,
}

/// Scale-switching bonding curve that accumulates reserve as PCV and
/// periodically sweeps it to weighted deposits.
///
/// Every operation reads the host once, checks all of its preconditions,
/// settles one transfer batch and only then commits state and emits events.
/// A failed operation leaves the curve untouched.
#[derive(Debug, Clone)]
pub struct BondingCurve {
    address: Address,
    core: Address,
    oracle: Address,
    config: CurveConfig,
    state: CurveState,
    allocation: AllocationTable,
    timer: IncentiveTimer,
    paused: bool,
}

impl BondingCurve {
    /// Builds a curve from validated settings. The incentive window starts at `now`.
    pub fn new(settings: CurveSettings, now: Timestamp) -> Result<Self> {
        settings.validate()?;
        let config = settings.curve_config();
        let allocation = AllocationTable::new(settings.destinations, settings.weights)?;
        Ok(Self {
            address: settings.address,
            core: settings.core,
            oracle: settings.oracle,
            config,
            state: CurveState::default(),
            allocation,
            timer: IncentiveTimer::start(now, settings.incentive_amount, settings.incentive_duration),
            paused: false,
        })
    }

    fn reference_price<H: PriceSource + ?Sized>(&self, host: &H) -> Result<Decimal> {
        let reading = host.read_price(&self.oracle);
        if !reading.valid || reading.price.is_zero() {
            warn!(oracle = %self.oracle, "oracle invalid");
            return Err(CurveError::InvalidOracle);
        }
        Ok(reading.price)
    }

    /// Regime factor applied to the peg value right now (no oracle read).
    pub fn current_multiplier(&self) -> Result<Decimal> {
        self.config.multiplier(self.regime())
    }

    /// Reference price adjusted by the current regime's factor.
    pub fn get_current_price<H: PriceSource + ?Sized>(&self, host: &H) -> Result<Decimal> {
        let reference = self.reference_price(host)?;
        reference.mul(self.current_multiplier()?)
    }

    pub fn quote<H: PriceSource + ?Sized>(
        &self,
        host: &H,
        amount_in: Amount,
    ) -> Result<PurchaseQuote> {
        let reference = self.reference_price(host)?;
        self.config
            .quote(self.state.total_purchased, reference, amount_in)
    }

    pub fn get_amount_out<H: PriceSource + ?Sized>(
        &self,
        host: &H,
        amount_in: Amount,
    ) -> Result<Amount> {
        Ok(self.quote(host, amount_in)?.amount_out)
    }

    /// Sells output for `amount_in` reserve pulled from `caller`, minting to `to`.
    #[instrument(skip(self, host), fields(curve = %self.address))]
    pub fn purchase<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        caller: &Address,
        to: &Address,
        amount_in: Amount,
    ) -> Result<Amount> {
        if self.paused {
            debug!("purchase rejected: paused");
            return Err(CurveError::Paused);
        }

        let quote = self.quote(&*host, amount_in)?;
        let total_purchased = self
            .state
            .total_purchased
            .checked_add(quote.amount_out)
            .ok_or(CurveError::Overflow)?;
        if total_purchased > self.config.mint_cap {
            warn!(
                requested = %total_purchased,
                mint_cap = %self.config.mint_cap,
                "purchase exceeds mint cap"
            );
            return Err(CurveError::ExceedsMintCap {
                requested: total_purchased,
                mint_cap: self.config.mint_cap,
            });
        }
        let reserve_held = self
            .state
            .reserve_held
            .checked_add(amount_in)
            .ok_or(CurveError::Overflow)?;

        host.settle(&[
            Transfer::Reserve {
                from: caller.clone(),
                to: self.address.clone(),
                amount: amount_in,
            },
            Transfer::Mint {
                to: to.clone(),
                amount: quote.amount_out,
            },
        ])?;

        self.state.total_purchased = total_purchased;
        self.state.reserve_held = reserve_held;

        info!(
            amount_out = %quote.amount_out,
            crosses_scale = quote.crosses_scale(),
            at_scale = self.at_scale(),
            "purchase"
        );
        host.emit(CurveEvent::Purchase {
            to: to.clone(),
            amount_in,
            amount_out: quote.amount_out,
        });
        Ok(quote.amount_out)
    }

    /// Restarts the pricing regime. Held reserve is untouched.
    #[instrument(skip(self, host), fields(curve = %self.address))]
    pub fn reset<H: Host + ?Sized>(&mut self, host: &mut H, caller: &Address) -> Result<()> {
        self.require_governor(&*host, caller)?;
        let old_total_purchased = std::mem::take(&mut self.state.total_purchased);
        info!(old_total_purchased = %old_total_purchased, "reset");
        host.emit(CurveEvent::Reset {
            old_total_purchased,
        });
        Ok(())
    }

    /// Sweeps all held reserve to the allocation table. Pays the keeper
    /// incentive if the cooldown has elapsed; the sweep happens either way.
    #[instrument(skip(self, host), fields(curve = %self.address))]
    pub fn allocate<H: Host + ?Sized>(&mut self, host: &mut H, caller: &Address) -> Result<Amount> {
        if self.paused {
            debug!("allocate rejected: paused");
            return Err(CurveError::Paused);
        }

        let now = host.now();
        let amount = self.state.reserve_held;
        let shares = self.allocation.split(amount).map_err(|e| {
            debug!(held = %amount, "nothing to allocate");
            e
        })?;

        let incentivize = self.timer.is_time_ended(now);
        let incentive = self.timer.incentive_amount;

        let mut transfers: Vec<Transfer> = shares
            .into_iter()
            .map(|(destination, share)| Transfer::Reserve {
                from: self.address.clone(),
                to: destination,
                amount: share,
            })
            .collect();
        if incentivize && incentive > 0 {
            transfers.push(Transfer::Mint {
                to: caller.clone(),
                amount: incentive,
            });
        }

        host.settle(&transfers)?;

        self.state.reserve_held -= amount;
        if incentivize {
            self.timer.restart(now);
        }

        info!(amount = %amount, incentivized = incentivize, "allocate");
        host.emit(CurveEvent::Allocate {
            caller: caller.clone(),
            amount,
        });
        if incentivize && incentive > 0 {
            host.emit(CurveEvent::IncentivePaid {
                caller: caller.clone(),
                amount: incentive,
            });
        }
        Ok(amount)
    }

    /// Atomically replaces the allocation table.
    #[instrument(skip(self, host), fields(curve = %self.address))]
    pub fn set_allocation<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        caller: &Address,
        destinations: Vec<Address>,
        weights: Vec<u16>,
    ) -> Result<()> {
        self.require_governor(&*host, caller)?;
        let table = AllocationTable::new(destinations, weights)?;
        let old = std::mem::replace(&mut self.allocation, table);
        debug!(destinations = self.allocation.entries().len(), "allocation updated");
        host.emit(CurveEvent::AllocationUpdate {
            old_destinations: old.destinations(),
            new_destinations: self.allocation.destinations(),
        });
        Ok(())
    }

    fn require_governor<H: Authorizer + ?Sized>(&self, host: &H, caller: &Address) -> Result<()> {
        if host.is_governor(&self.core, caller) {
            Ok(())
        } else {
            warn!(caller = %caller, "caller is not a governor");
            Err(CurveError::NotAuthorized {
                caller: caller.clone(),
            })
        }
    }

    fn require_guardian_or_governor<H: Authorizer + ?Sized>(
        &self,
        host: &H,
        caller: &Address,
    ) -> Result<()> {
        if host.is_guardian_or_governor(&self.core, caller) {
            Ok(())
        } else {
            warn!(caller = %caller, "caller is not a guardian or governor");
            Err(CurveError::NotAuthorized {
                caller: caller.clone(),
            })
        }
    }

    pub fn set_scale<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        caller: &Address,
        scale: Amount,
    ) -> Result<()> {
        self.require_governor(&*host, caller)?;
        let old_scale = std::mem::replace(&mut self.config.scale, scale);
        debug!(old = %old_scale, new = %scale, "scale updated");
        host.emit(CurveEvent::ScaleUpdate {
            old_scale,
            new_scale: scale,
        });
        Ok(())
    }

    pub fn set_buffer<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        caller: &Address,
        buffer_bps: u16,
    ) -> Result<()> {
        self.require_governor(&*host, caller)?;
        let buffer_bps = validate_basis_points(buffer_bps)?;
        let old_buffer = std::mem::replace(&mut self.config.buffer_bps, buffer_bps);
        debug!(old = old_buffer, new = buffer_bps, "buffer updated");
        host.emit(CurveEvent::BufferUpdate {
            old_buffer,
            new_buffer: buffer_bps,
        });
        Ok(())
    }

    pub fn set_discount<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        caller: &Address,
        discount_bps: u16,
    ) -> Result<()> {
        self.require_governor(&*host, caller)?;
        let discount_bps = validate_basis_points(discount_bps)?;
        let old_discount = std::mem::replace(&mut self.config.discount_bps, discount_bps);
        debug!(old = old_discount, new = discount_bps, "discount updated");
        host.emit(CurveEvent::DiscountUpdate {
            old_discount,
            new_discount: discount_bps,
        });
        Ok(())
    }

    pub fn set_mint_cap<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        caller: &Address,
        mint_cap: Amount,
    ) -> Result<()> {
        self.require_governor(&*host, caller)?;
        let old_mint_cap = std::mem::replace(&mut self.config.mint_cap, mint_cap);
        debug!(old = %old_mint_cap, new = %mint_cap, "mint cap updated");
        host.emit(CurveEvent::MintCapUpdate {
            old_mint_cap,
            new_mint_cap: mint_cap,
        });
        Ok(())
    }

    pub fn set_oracle<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        caller: &Address,
        oracle: Address,
    ) -> Result<()> {
        self.require_governor(&*host, caller)?;
        let old_oracle = std::mem::replace(&mut self.oracle, oracle);
        debug!(old = %old_oracle, new = %self.oracle, "oracle updated");
        host.emit(CurveEvent::OracleUpdate {
            old_oracle,
            new_oracle: self.oracle.clone(),
        });
        Ok(())
    }

    /// Points the curve at a different role registry. Authorized against the current one.
    pub fn set_core<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        caller: &Address,
        core: Address,
    ) -> Result<()> {
        self.require_governor(&*host, caller)?;
        let old_core = std::mem::replace(&mut self.core, core);
        debug!(old = %old_core, new = %self.core, "core updated");
        host.emit(CurveEvent::CoreUpdate {
            old_core,
            new_core: self.core.clone(),
        });
        Ok(())
    }

    pub fn set_incentive_amount<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        caller: &Address,
        incentive_amount: Amount,
    ) -> Result<()> {
        self.require_governor(&*host, caller)?;
        let old = std::mem::replace(&mut self.timer.incentive_amount, incentive_amount);
        debug!(old = %old, new = %incentive_amount, "incentive amount updated");
        host.emit(CurveEvent::IncentiveUpdate {
            old_incentive_amount: old,
            new_incentive_amount: incentive_amount,
        });
        Ok(())
    }

    pub fn set_incentive_duration<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        caller: &Address,
        duration: u64,
    ) -> Result<()> {
        self.require_governor(&*host, caller)?;
        let old_duration = std::mem::replace(&mut self.timer.duration, duration);
        debug!(old = old_duration, new = duration, "incentive duration updated");
        host.emit(CurveEvent::DurationUpdate {
            old_duration,
            new_duration: duration,
        });
        Ok(())
    }

    /// Blocks purchase and allocate. No-op if already paused.
    pub fn pause<H: Host + ?Sized>(&mut self, host: &mut H, caller: &Address) -> Result<()> {
        self.require_guardian_or_governor(&*host, caller)?;
        if !self.paused {
            self.paused = true;
            info!(curve = %self.address, account = %caller, "paused");
            host.emit(CurveEvent::Paused {
                account: caller.clone(),
            });
        }
        Ok(())
    }

    pub fn unpause<H: Host + ?Sized>(&mut self, host: &mut H, caller: &Address) -> Result<()> {
        self.require_guardian_or_governor(&*host, caller)?;
        if self.paused {
            self.paused = false;
            info!(curve = %self.address, account = %caller, "unpaused");
            host.emit(CurveEvent::Unpaused {
                account: caller.clone(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }

    #[inline]
    pub fn core(&self) -> &Address {
        &self.core
    }

    #[inline]
    pub fn oracle(&self) -> &Address {
        &self.oracle
    }

    #[inline]
    pub fn config(&self) -> &CurveConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> &CurveState {
        &self.state
    }

    #[inline]
    pub fn scale(&self) -> Amount {
        self.config.scale
    }

    #[inline]
    pub fn buffer(&self) -> u16 {
        self.config.buffer_bps
    }

    #[inline]
    pub fn discount(&self) -> u16 {
        self.config.discount_bps
    }

    #[inline]
    pub fn mint_cap(&self) -> Amount {
        self.config.mint_cap
    }

    #[inline]
    pub fn total_purchased(&self) -> Amount {
        self.state.total_purchased
    }

    /// Reserve held and awaiting allocation.
    #[inline]
    pub fn balance(&self) -> Amount {
        self.state.reserve_held
    }

    #[inline]
    pub fn at_scale(&self) -> bool {
        self.config.at_scale(self.state.total_purchased)
    }

    #[inline]
    pub fn regime(&self) -> Regime {
        self.config.regime(self.state.total_purchased)
    }

    #[inline]
    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn get_allocation(&self) -> (Vec<Address>, Vec<u16>) {
        (self.allocation.destinations(), self.allocation.weights())
    }

    #[inline]
    pub fn incentive_amount(&self) -> Amount {
        self.timer.incentive_amount
    }

    #[inline]
    pub fn incentive_duration(&self) -> u64 {
        self.timer.duration
    }

    #[inline]
    pub fn last_paid_at(&self) -> Timestamp {
        self.timer.last_paid_at
    }

    pub fn is_time_ended(&self, now: Timestamp) -> bool {
        self.timer.is_time_ended(now)
    }

    pub fn remaining_time(&self, now: Timestamp) -> u64 {
        self.timer.remaining_time(now)
    }

    pub fn snapshot(&self) -> CurveSnapshot {
        CurveSnapshot {
            address: self.address.clone(),
            core: self.core.clone(),
            oracle: self.oracle.clone(),
            config: self.config,
            state: self.state,
            regime: self.regime(),
            paused: self.paused,
            allocation: self.allocation.clone(),
            timer: self.timer,
            remaining_to_scale: self.config.scale.saturating_sub(self.state.total_purchased),
        }
    }
}
