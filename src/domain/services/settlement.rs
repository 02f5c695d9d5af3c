//! # Commission & Settlement Engine
//!
//! Pure derivation of the commission split for a paid deal.
//!
//! Given a deal's negotiated amount and cargo volume plus the platform
//! settings, [`settle`] computes the platform commission, employee
//! commission, shipping commission, and trader payout. The function has no
//! side effects; persistence of the resulting transactions is the ledger's
//! job.
//!
//! # Algorithm
//!
//! 1. `percentage = amount * platform_commission_rate / 100`
//! 2. `cbm = total_cbm * cbm_rate` (0 when unset)
//! 3. Method selection: PERCENTAGE → percentage; CBM → cbm; BOTH →
//!    max(percentage, cbm). CBM and BOTH fail without a configured rate.
//! 4. `employee = amount * employee_rate / 100`
//! 5. `shipping = amount * shipping_commission_rate / 100` — tracked,
//!    borne by the buyer side, not deducted from the trader payout.
//! 6. `trader = amount - platform - employee`
//!
//! The postcondition `platform + employee + trader == amount` is checked at
//! currency precision before returning; a violation is a fatal
//! [`SettlementImbalance`](crate::domain::errors::DomainError::SettlementImbalance),
//! never a silent rounding.
//!
//! # Examples
//!
//! ```
//! use deal_desk::domain::services::settlement::{settle_amounts, PlatformSettings};
//! use deal_desk::domain::value_objects::{CommissionMethod, DealId, Money, Volume};
//! use rust_decimal_macros::dec;
//!
//! let settings = PlatformSettings {
//!     tax_rate: dec!(0),
//!     platform_commission_rate: dec!(2.5),
//!     shipping_commission_rate: dec!(0),
//!     cbm_rate: None,
//!     commission_method: CommissionMethod::Percentage,
//! };
//!
//! let split = settle_amounts(
//!     DealId::new_v4(),
//!     Money::from_decimal(dec!(50000.00)).unwrap(),
//!     Volume::ZERO,
//!     dec!(1.0),
//!     &settings,
//! )
//! .unwrap();
//!
//! assert_eq!(split.platform_commission.to_string(), "1250.00");
//! assert_eq!(split.employee_commission.to_string(), "500.00");
//! assert_eq!(split.trader_amount.to_string(), "48250.00");
//! ```

use crate::domain::entities::deal::Deal;
use crate::domain::entities::ledger::FinancialTransaction;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{CommissionMethod, DealId, EmployeeId, Money, TraderId, Volume};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform-wide settlement configuration.
///
/// Supplied read-only by an external settings store. `cbm_rate` may be
/// absent; only the CBM and BOTH methods require it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSettings {
    /// Tax rate in percent, carried for reporting.
    pub tax_rate: Decimal,
    /// Platform commission rate in percent.
    pub platform_commission_rate: Decimal,
    /// Shipping commission rate in percent, borne by the buyer side.
    pub shipping_commission_rate: Decimal,
    /// Commission per CBM of cargo volume, if configured.
    pub cbm_rate: Option<Decimal>,
    /// How the platform commission is derived.
    pub commission_method: CommissionMethod,
}

/// The computed split of a deal's negotiated amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSplit {
    /// The platform's commission.
    pub platform_commission: Money,
    /// The mediating employee's commission.
    pub employee_commission: Money,
    /// The shipping commission, tracked but not deducted from the payout.
    pub shipping_commission: Money,
    /// What the trader receives.
    pub trader_amount: Money,
}

impl fmt::Display for SettlementSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "platform={} employee={} shipping={} trader={}",
            self.platform_commission,
            self.employee_commission,
            self.shipping_commission,
            self.trader_amount
        )
    }
}

/// Computes the settlement split for a deal.
///
/// Convenience wrapper over [`settle_amounts`] that pulls the amount and
/// volume off the aggregate.
///
/// # Errors
///
/// - [`DomainError::Validation`] if the deal has no negotiated amount
/// - Everything [`settle_amounts`] returns
pub fn settle(
    deal: &Deal,
    employee_rate: Decimal,
    settings: &PlatformSettings,
) -> DomainResult<SettlementSplit> {
    let amount = deal
        .negotiated_amount()
        .ok_or_else(|| DomainError::validation("cannot settle a deal without an amount"))?;
    settle_amounts(deal.id(), amount, deal.total_cbm(), employee_rate, settings)
}

/// Computes the settlement split from raw amounts.
///
/// Deterministic and side-effect free.
///
/// # Errors
///
/// - [`DomainError::MissingCbmRate`] if the method needs a CBM rate and
///   none is configured
/// - [`DomainError::SettlementImbalance`] if the split does not reproduce
///   the negotiated amount at currency precision
/// - [`DomainError::Arithmetic`] on range overflow or a commission total
///   exceeding the amount
pub fn settle_amounts(
    deal_id: DealId,
    amount: Money,
    total_cbm: Volume,
    employee_rate: Decimal,
    settings: &PlatformSettings,
) -> DomainResult<SettlementSplit> {
    let percentage_commission = amount.percent(settings.platform_commission_rate)?;
    let cbm_commission = match settings.cbm_rate {
        Some(rate) => Some(total_cbm.times_rate(rate)?),
        None => None,
    };

    let platform_commission = match settings.commission_method {
        CommissionMethod::Percentage => percentage_commission,
        CommissionMethod::Cbm => cbm_commission.ok_or_else(|| missing_rate(settings))?,
        CommissionMethod::Both => {
            let cbm = cbm_commission.ok_or_else(|| missing_rate(settings))?;
            percentage_commission.max(cbm)
        }
    };

    let employee_commission = amount.percent(employee_rate)?;
    let shipping_commission = amount.percent(settings.shipping_commission_rate)?;

    let trader_amount = amount
        .checked_sub(platform_commission)?
        .checked_sub(employee_commission)?;

    let split = SettlementSplit {
        platform_commission,
        employee_commission,
        shipping_commission,
        trader_amount,
    };

    let split_total = platform_commission
        .checked_add(employee_commission)?
        .checked_add(trader_amount)?;
    if split_total != amount {
        return Err(DomainError::SettlementImbalance {
            deal_id,
            split_total: split_total.to_string(),
            expected: amount.to_string(),
        });
    }

    Ok(split)
}

fn missing_rate(settings: &PlatformSettings) -> DomainError {
    DomainError::MissingCbmRate {
        method: settings.commission_method.to_string(),
    }
}

/// Builds the transaction set one settlement event produces.
///
/// Exactly one DEPOSIT, one COMMISSION, one TRADER_PAYOUT, and — only when
/// the employee commission is non-zero — one EMPLOYEE_COMMISSION.
#[must_use]
pub fn build_transactions(
    deal_id: DealId,
    trader_id: TraderId,
    employee_id: EmployeeId,
    amount: Money,
    split: &SettlementSplit,
) -> Vec<FinancialTransaction> {
    let mut transactions = vec![
        FinancialTransaction::deposit(
            deal_id,
            amount,
            split.platform_commission,
            split.employee_commission,
            split.trader_amount,
        ),
        FinancialTransaction::commission(deal_id, split.platform_commission),
    ];
    if split.employee_commission.is_positive() {
        transactions.push(FinancialTransaction::employee_commission(
            deal_id,
            employee_id,
            split.employee_commission,
        ));
    }
    transactions.push(FinancialTransaction::trader_payout(
        deal_id,
        trader_id,
        split.trader_amount,
    ));
    transactions
}
