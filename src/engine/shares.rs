use crate::core::member::MemberId;
use crate::core::share_spec::{AnnotatedShare, ShareSpec, ShareValue};
use crate::core::transaction::Expense;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Owed share of each participant in one expense.
pub type Shares = BTreeMap<MemberId, Decimal>;

/// Interprets an expense's participant encoding as per-member shares.
///
/// Whenever any participant information can be used, the shares are
/// non-negative and sum to the expense amount (up to decimal precision).
/// An empty result means no one but the payer is charged.
pub struct ShareResolver;

impl ShareResolver {
    /// Resolve the shares of a single expense.
    ///
    /// # Algorithm
    ///
    /// Non-positive amounts resolve to nothing. Otherwise the encodings are
    /// tried in a fixed order and the first that yields shares wins:
    ///
    /// 1. Explicit map. Values are weights (`true` weighs 1); with a positive
    ///    total they are rescaled to the amount. Failing that, the amount is
    ///    split equally among `true` flags.
    /// 2. Participant list, split equally.
    /// 3. Annotated list. Explicit amounts are rescaled like weights;
    ///    without any, the amount is split equally among included entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use split_ledger::prelude::*;
    /// use rust_decimal_macros::dec;
    ///
    /// let expense = Expense::new(
    ///     dec!(100),
    ///     "a",
    ///     ShareSpec::from_amounts([("a", dec!(1)), ("b", dec!(3))]),
    /// );
    /// let shares = ShareResolver::resolve(&expense);
    /// assert_eq!(shares[&MemberId::new("a")], dec!(25));
    /// assert_eq!(shares[&MemberId::new("b")], dec!(75));
    /// ```
    pub fn resolve(expense: &Expense) -> Shares {
        Self::resolve_spec(expense.amount(), expense.shares())
    }

    /// Resolve an amount against a participant encoding.
    pub fn resolve_spec(amount: Decimal, spec: &ShareSpec) -> Shares {
        if amount <= Decimal::ZERO {
            return Shares::new();
        }

        if let Some(shares) = spec
            .explicit
            .as_ref()
            .and_then(|map| Self::from_explicit(amount, map))
        {
            return shares;
        }

        if let Some(shares) = spec
            .participants
            .as_ref()
            .and_then(|ids| equal_split(amount, ids.iter()))
        {
            return shares;
        }

        if let Some(entries) = &spec.annotated {
            return Self::from_annotated(amount, entries);
        }

        Shares::new()
    }

    fn from_explicit(amount: Decimal, map: &BTreeMap<MemberId, ShareValue>) -> Option<Shares> {
        let weights: Vec<(&MemberId, Decimal)> = map
            .iter()
            .filter_map(|(id, v)| v.weight().map(|w| (id, w)))
            .collect();

        if let Some(shares) = rescale(amount, weights) {
            return Some(shares);
        }

        equal_split(
            amount,
            map.iter().filter(|(_, v)| v.is_true_flag()).map(|(id, _)| id),
        )
    }

    fn from_annotated(amount: Decimal, entries: &[AnnotatedShare]) -> Shares {
        // Any declared amount selects the weighted path, even one that is
        // later dropped for being negative.
        if entries.iter().any(|e| e.amount.is_some()) {
            let explicit = entries
                .iter()
                .filter_map(|e| e.amount.map(|a| (&e.member_id, a)))
                .filter(|(_, a)| *a >= Decimal::ZERO);
            return rescale(amount, explicit).unwrap_or_default();
        }

        equal_split(
            amount,
            entries
                .iter()
                .filter(|e| e.is_included())
                .map(|e| &e.member_id),
        )
        .unwrap_or_default()
    }
}

/// Scale weights so they sum to `amount`.
///
/// `None` unless the weights have a positive total and every scaled share
/// is representable.
fn rescale<'a, I>(amount: Decimal, weights: I) -> Option<Shares>
where
    I: IntoIterator<Item = (&'a MemberId, Decimal)>,
{
    let mut merged = Shares::new();
    let mut total = Decimal::ZERO;
    for (id, w) in weights {
        let entry = merged.entry(id.clone()).or_insert(Decimal::ZERO);
        *entry = entry.checked_add(w)?;
        total = total.checked_add(w)?;
    }

    if total <= Decimal::ZERO {
        return None;
    }

    // A tiny total can push `amount / total` past `Decimal::MAX`; scaling
    // each weight's fraction of the total stays in range.
    let scale = amount.checked_div(total);
    let mut shares = Shares::new();
    for (id, w) in merged {
        let share = scale
            .and_then(|scale| w.checked_mul(scale))
            .or_else(|| w.checked_div(total).and_then(|ratio| ratio.checked_mul(amount)));
        let share = match share {
            Some(share) => share,
            None => {
                log::debug!("weight {} of {} cannot be scaled to {}", w, id, amount);
                return None;
            }
        };
        shares.insert(id, share);
    }
    Some(shares)
}

/// Split `amount` equally among distinct ids. `None` for an empty list.
fn equal_split<'a, I>(amount: Decimal, ids: I) -> Option<Shares>
where
    I: IntoIterator<Item = &'a MemberId>,
{
    let mut shares: Shares = ids.into_iter().map(|id| (id.clone(), Decimal::ZERO)).collect();
    if shares.is_empty() {
        return None;
    }

    let share = amount / Decimal::from(shares.len());
    for s in shares.values_mut() {
        *s = share;
    }
    Some(shares)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::share_spec::InclusionFlag;
    use rust_decimal_macros::dec;

    fn id(s: &str) -> MemberId {
        MemberId::new(s)
    }

    fn ids(list: &[&str]) -> Vec<MemberId> {
        list.iter().map(|s| id(s)).collect()
    }

    fn total(shares: &Shares) -> Decimal {
        shares.values().sum()
    }

    #[test]
    fn test_equal_split_participant_list() {
        let spec = ShareSpec::participants(ids(&["a", "b", "c"]));
        let shares = ShareResolver::resolve_spec(dec!(90), &spec);
        assert_eq!(shares.len(), 3);
        assert_eq!(shares[&id("a")], dec!(30));
        assert_eq!(shares[&id("b")], dec!(30));
        assert_eq!(shares[&id("c")], dec!(30));
    }

    #[test]
    fn test_duplicate_participants_counted_once() {
        let spec = ShareSpec::participants(ids(&["a", "a", "b"]));
        let shares = ShareResolver::resolve_spec(dec!(10), &spec);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[&id("a")], dec!(5));
    }

    #[test]
    fn test_proportional_rescaling() {
        let spec = ShareSpec::from_amounts([("a", dec!(1)), ("b", dec!(3))]);
        let shares = ShareResolver::resolve_spec(dec!(100), &spec);
        assert_eq!(shares[&id("a")], dec!(25));
        assert_eq!(shares[&id("b")], dec!(75));
    }

    #[test]
    fn test_exact_amounts_pass_through() {
        let spec = ShareSpec::from_amounts([("a", dec!(40)), ("b", dec!(60))]);
        let shares = ShareResolver::resolve_spec(dec!(100), &spec);
        assert_eq!(shares[&id("a")], dec!(40));
        assert_eq!(shares[&id("b")], dec!(60));
    }

    #[test]
    fn test_boolean_flag_split() {
        let spec = ShareSpec::from_flags([("a", true), ("b", true), ("c", false)]);
        let shares = ShareResolver::resolve_spec(dec!(50), &spec);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[&id("a")], dec!(25));
        assert_eq!(shares[&id("b")], dec!(25));
        assert!(!shares.contains_key(&id("c")));
    }

    #[test]
    fn test_mixed_flags_and_weights() {
        let mut map = BTreeMap::new();
        map.insert(id("a"), ShareValue::Flag(true));
        map.insert(id("b"), ShareValue::Amount(dec!(3)));
        map.insert(id("c"), ShareValue::Unusable);
        let shares = ShareResolver::resolve_spec(dec!(40), &ShareSpec::explicit(map));
        assert_eq!(shares[&id("a")], dec!(10));
        assert_eq!(shares[&id("b")], dec!(30));
        assert!(!shares.contains_key(&id("c")));
    }

    #[test]
    fn test_negative_weight_is_dropped() {
        let mut map = BTreeMap::new();
        map.insert(id("a"), ShareValue::Flag(true));
        map.insert(id("b"), ShareValue::Amount(dec!(-5)));
        let shares = ShareResolver::resolve_spec(dec!(12), &ShareSpec::explicit(map));
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[&id("a")], dec!(12));
    }

    #[test]
    fn test_zero_weights_fall_through_to_participant_list() {
        let spec = ShareSpec::from_amounts([("a", Decimal::ZERO), ("b", Decimal::ZERO)])
            .with_participants(ids(&["c", "d"]));
        let shares = ShareResolver::resolve_spec(dec!(20), &spec);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[&id("c")], dec!(10));
        assert_eq!(shares[&id("d")], dec!(10));
    }

    #[test]
    fn test_explicit_map_wins_over_list() {
        let spec = ShareSpec::from_flags([("a", true)]).with_participants(ids(&["b", "c"]));
        let shares = ShareResolver::resolve_spec(dec!(20), &spec);
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[&id("a")], dec!(20));
    }

    #[test]
    fn test_empty_list_falls_through_to_annotated() {
        let spec = ShareSpec::participants(vec![])
            .with_annotated(vec![AnnotatedShare::new("a"), AnnotatedShare::new("b")]);
        let shares = ShareResolver::resolve_spec(dec!(8), &spec);
        assert_eq!(shares[&id("a")], dec!(4));
        assert_eq!(shares[&id("b")], dec!(4));
    }

    #[test]
    fn test_annotated_explicit_amounts_rescale() {
        let spec = ShareSpec::annotated(vec![
            AnnotatedShare::new("a").with_amount(dec!(2)),
            AnnotatedShare::new("b").with_amount(dec!(2)),
            AnnotatedShare::new("c"),
        ]);
        let shares = ShareResolver::resolve_spec(dec!(30), &spec);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[&id("a")], dec!(15));
        assert_eq!(shares[&id("b")], dec!(15));
    }

    #[test]
    fn test_annotated_zero_amounts_resolve_empty() {
        let spec = ShareSpec::annotated(vec![AnnotatedShare::new("a").with_amount(Decimal::ZERO)]);
        assert!(ShareResolver::resolve_spec(dec!(30), &spec).is_empty());
    }

    #[test]
    fn test_annotated_negative_amount_resolves_empty() {
        let spec = ShareSpec::annotated(vec![
            AnnotatedShare::new("a").with_amount(dec!(-5)),
            AnnotatedShare::new("b"),
        ]);
        assert!(ShareResolver::resolve_spec(dec!(30), &spec).is_empty());
    }

    #[test]
    fn test_tiny_weight_takes_whole_amount() {
        let spec = ShareSpec::from_amounts([("b", dec!(0.000000000000000000000000001))]);
        let shares = ShareResolver::resolve_spec(dec!(100), &spec);
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[&id("b")], dec!(100));
    }

    #[test]
    fn test_overflowing_weights_fall_through() {
        let spec = ShareSpec::from_amounts([("a", Decimal::MAX), ("b", Decimal::MAX)])
            .with_participants(ids(&["a", "c"]));
        let shares = ShareResolver::resolve_spec(dec!(10), &spec);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[&id("c")], dec!(5));
    }

    #[test]
    fn test_annotated_inclusion() {
        let spec = ShareSpec::annotated(vec![
            AnnotatedShare::new("a").with_included(InclusionFlag::Bool(true)),
            AnnotatedShare::new("b").with_included(InclusionFlag::Number(Decimal::ZERO)),
            AnnotatedShare::new("c").with_included(InclusionFlag::Text("true".into())),
            AnnotatedShare::new("d").with_included(InclusionFlag::Text("no".into())),
            AnnotatedShare::new("e"),
        ]);
        let shares = ShareResolver::resolve_spec(dec!(60), &spec);
        assert_eq!(shares.len(), 3);
        for member in ["a", "c", "e"] {
            assert_eq!(shares[&id(member)], dec!(20));
        }
    }

    #[test]
    fn test_no_participant_information() {
        assert!(ShareResolver::resolve_spec(dec!(20), &ShareSpec::none()).is_empty());
        let spec = ShareSpec::from_flags([("a", false)]);
        assert!(ShareResolver::resolve_spec(dec!(20), &spec).is_empty());
    }

    #[test]
    fn test_non_positive_amount() {
        let spec = ShareSpec::participants(ids(&["a", "b"]));
        assert!(ShareResolver::resolve_spec(Decimal::ZERO, &spec).is_empty());
        assert!(ShareResolver::resolve_spec(dec!(-5), &spec).is_empty());
    }

    #[test]
    fn test_uneven_split_sums_to_amount() {
        let spec = ShareSpec::participants(ids(&["a", "b", "c"]));
        let shares = ShareResolver::resolve_spec(dec!(100), &spec);
        assert!((total(&shares) - dec!(100)).abs() < dec!(0.000001));

        let spec =
            ShareSpec::from_amounts([("a", dec!(33.33)), ("b", dec!(33.33)), ("c", dec!(33.33))]);
        let shares = ShareResolver::resolve_spec(dec!(100), &spec);
        assert!((total(&shares) - dec!(100)).abs() < dec!(0.000001));
    }
}
