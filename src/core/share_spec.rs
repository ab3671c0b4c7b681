use crate::core::member::MemberId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One value of an explicit share map.
///
/// Stored documents mix numbers, numeric strings and inclusion flags in the
/// same map. Numeric strings are parsed at the decoding boundary, so by the
/// time a value reaches the resolver it is one of these three cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShareValue {
    Flag(bool),
    Amount(Decimal),
    /// A value that could not be read as a number or a flag.
    Unusable,
}

impl ShareValue {
    /// Relative weight of this entry, if it carries one.
    ///
    /// `true` weighs 1. `false`, unusable values and negative amounts
    /// carry no weight.
    pub fn weight(&self) -> Option<Decimal> {
        match self {
            ShareValue::Amount(amount) if *amount >= Decimal::ZERO => Some(*amount),
            ShareValue::Flag(true) => Some(Decimal::ONE),
            _ => None,
        }
    }

    pub fn is_true_flag(&self) -> bool {
        matches!(self, ShareValue::Flag(true))
    }
}

/// Raw `included` marker of an annotated share entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InclusionFlag {
    Bool(bool),
    Number(Decimal),
    Text(String),
}

impl InclusionFlag {
    pub fn is_included(&self) -> bool {
        match self {
            InclusionFlag::Bool(b) => *b,
            InclusionFlag::Number(n) => !n.is_zero(),
            InclusionFlag::Text(s) => s.eq_ignore_ascii_case("true") || s == "1",
        }
    }
}

/// An entry of an annotated participant list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedShare {
    pub member_id: MemberId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// `None` when the field is absent or of an unrecognized type;
    /// both count as included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included: Option<InclusionFlag>,
}

impl AnnotatedShare {
    pub fn new(member_id: impl Into<MemberId>) -> Self {
        Self {
            member_id: member_id.into(),
            amount: None,
            included: None,
        }
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_included(mut self, included: InclusionFlag) -> Self {
        self.included = Some(included);
        self
    }

    pub fn is_included(&self) -> bool {
        self.included.as_ref().map_or(true, InclusionFlag::is_included)
    }
}

/// Who took part in an expense, and how much.
///
/// Three encodings have been written over time and all of them must still
/// be read. A single stored record may carry more than one of them; the
/// share resolver tries them in a fixed order (explicit map, participant
/// list, annotated list) and the first one that yields shares wins.
///
/// # Examples
///
/// ```
/// use split_ledger::core::share_spec::ShareSpec;
/// use split_ledger::core::member::MemberId;
///
/// let spec = ShareSpec::participants(vec![MemberId::new("a"), MemberId::new("b")]);
/// assert!(!spec.is_empty());
/// assert!(ShareSpec::none().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareSpec {
    /// Member id → amount or inclusion flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit: Option<BTreeMap<MemberId, ShareValue>>,
    /// Plain list of member ids, equal split.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<MemberId>>,
    /// List of `{ member_id, amount?, included? }` records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotated: Option<Vec<AnnotatedShare>>,
}

impl ShareSpec {
    /// No participant information at all.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn explicit(map: BTreeMap<MemberId, ShareValue>) -> Self {
        Self {
            explicit: Some(map),
            ..Self::default()
        }
    }

    pub fn participants(ids: Vec<MemberId>) -> Self {
        Self {
            participants: Some(ids),
            ..Self::default()
        }
    }

    pub fn annotated(entries: Vec<AnnotatedShare>) -> Self {
        Self {
            annotated: Some(entries),
            ..Self::default()
        }
    }

    /// Explicit map built from `(member, amount)` pairs.
    pub fn from_amounts<I, M>(amounts: I) -> Self
    where
        I: IntoIterator<Item = (M, Decimal)>,
        M: Into<MemberId>,
    {
        Self::explicit(
            amounts
                .into_iter()
                .map(|(m, a)| (m.into(), ShareValue::Amount(a)))
                .collect(),
        )
    }

    /// Explicit map built from `(member, included)` flags.
    pub fn from_flags<I, M>(flags: I) -> Self
    where
        I: IntoIterator<Item = (M, bool)>,
        M: Into<MemberId>,
    {
        Self::explicit(
            flags
                .into_iter()
                .map(|(m, f)| (m.into(), ShareValue::Flag(f)))
                .collect(),
        )
    }

    pub fn with_participants(mut self, ids: Vec<MemberId>) -> Self {
        self.participants = Some(ids);
        self
    }

    pub fn with_annotated(mut self, entries: Vec<AnnotatedShare>) -> Self {
        self.annotated = Some(entries);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.explicit.is_none() && self.participants.is_none() && self.annotated.is_none()
    }
}
