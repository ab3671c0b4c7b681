use crate::core::member::MemberId;
use crate::core::transaction::Settlement;
use crate::error::ConfirmError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Slack allowed when a payer confirms slightly more than recommended,
/// to absorb rounding of the displayed amount.
const CONFIRM_SLACK: Decimal = dec!(0.01);

/// A recommended payment: `from` should pay `to` the given amount.
///
/// Transfers are never stored. One becomes a real [`Settlement`] only when
/// a member confirms the payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementTransfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Decimal,
}

impl SettlementTransfer {
    pub fn new(from: impl Into<MemberId>, to: impl Into<MemberId>, amount: Decimal) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }

    /// Whether `member` takes part in this transfer on either side.
    pub fn involves(&self, member: &MemberId) -> bool {
        &self.from == member || &self.to == member
    }

    /// Materialize the full recommended amount as a settlement.
    pub fn into_settlement(self, timestamp: DateTime<Utc>) -> Settlement {
        Settlement::new(self.amount, self.from, self.to).with_timestamp(timestamp)
    }

    /// Materialize a payment the debtor reports having made.
    ///
    /// The confirmed amount must be positive and may exceed the
    /// recommendation by at most one cent.
    pub fn confirm(
        &self,
        confirmed: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<Settlement, ConfirmError> {
        if confirmed <= Decimal::ZERO {
            return Err(ConfirmError::NonPositive(confirmed));
        }
        if confirmed > self.amount.saturating_add(CONFIRM_SLACK) {
            return Err(ConfirmError::ExceedsOutstanding {
                confirmed,
                outstanding: self.amount,
            });
        }
        Ok(Settlement::new(confirmed, self.from.clone(), self.to.clone()).with_timestamp(timestamp))
    }
}

impl fmt::Display for SettlementTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}: {}", self.from, self.to, self.amount.round_dp(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_settlement_keeps_direction() {
        let now = Utc::now();
        let s = SettlementTransfer::new("b", "a", dec!(30)).into_settlement(now);
        assert_eq!(s.paid_by().as_str(), "b");
        assert_eq!(s.received_by().as_str(), "a");
        assert_eq!(s.amount(), dec!(30));
        assert_eq!(s.timestamp(), now);
    }

    #[test]
    fn test_confirm_within_slack() {
        let t = SettlementTransfer::new("b", "a", dec!(33.333));
        let s = t.confirm(dec!(33.34), Utc::now()).unwrap();
        assert_eq!(s.amount(), dec!(33.34));
    }

    #[test]
    fn test_confirm_rejects_overpayment() {
        let t = SettlementTransfer::new("b", "a", dec!(30));
        assert_eq!(
            t.confirm(dec!(30.02), Utc::now()),
            Err(ConfirmError::ExceedsOutstanding {
                confirmed: dec!(30.02),
                outstanding: dec!(30),
            })
        );
    }

    #[test]
    fn test_confirm_rejects_non_positive() {
        let t = SettlementTransfer::new("b", "a", dec!(30));
        assert!(matches!(
            t.confirm(Decimal::ZERO, Utc::now()),
            Err(ConfirmError::NonPositive(_))
        ));
    }

    #[test]
    fn test_display() {
        let t = SettlementTransfer::new("b", "a", dec!(33.3333));
        assert_eq!(t.to_string(), "b → a: 33.33");
    }
}
