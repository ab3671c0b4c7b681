//! Decoding of loosely typed stored documents.
//!
//! The document store hands back maps whose field types drifted over the
//! app's lifetime: amounts stored as numbers or strings, three different
//! participant encodings, timestamps as epoch milliseconds or structured
//! values. Everything is read here, once, into the typed model; the engine
//! never inspects runtime shapes.
//!
//! Decoding is lenient. Only a document that is not an object, or a
//! transaction with no payer, fails. Everything else degrades to a value the
//! engine treats as a no-op.

use crate::core::member::{Member, MemberId};
use crate::core::share_spec::{AnnotatedShare, InclusionFlag, ShareSpec, ShareValue};
use crate::core::transaction::{Expense, Settlement, Transaction, TransactionLog};
use crate::error::DecodeError;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, DecodeError> {
    value
        .as_object()
        .ok_or_else(|| DecodeError::NotAnObject(type_name(value)))
}

/// Parse a decimal from its textual form, accepting scientific notation.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Read a number or numeric string.
fn number(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

fn required_str<'a>(
    doc: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, DecodeError> {
    match doc.get(field) {
        None | Some(Value::Null) => Err(DecodeError::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(DecodeError::NotAString { field }),
    }
}

fn optional_str(doc: &Map<String, Value>, field: &str) -> Option<String> {
    doc.get(field).and_then(Value::as_str).map(str::to_owned)
}

/// Read a member document: `{ "id", "name", "email" }`.
pub fn decode_member(value: &Value) -> Result<Member, DecodeError> {
    let doc = as_object(value)?;
    let id = required_str(doc, "id")?;
    Ok(Member::new(
        id,
        optional_str(doc, "name").unwrap_or_default(),
        optional_str(doc, "email").unwrap_or_default(),
    ))
}

/// Read a list of member documents, skipping unreadable ones.
pub fn decode_members(values: &[Value]) -> Vec<Member> {
    values
        .iter()
        .filter_map(|v| match decode_member(v) {
            Ok(m) => Some(m),
            Err(e) => {
                log::warn!("skipping member document: {}", e);
                None
            }
        })
        .collect()
}

fn share_value(value: &Value) -> ShareValue {
    match value {
        Value::Bool(b) => ShareValue::Flag(*b),
        other => number(other).map_or(ShareValue::Unusable, ShareValue::Amount),
    }
}

fn explicit_map(value: &Value) -> Option<BTreeMap<MemberId, ShareValue>> {
    let map = value.as_object()?;
    Some(
        map.iter()
            .map(|(id, v)| (MemberId::new(id.as_str()), share_value(v)))
            .collect(),
    )
}

fn participant_list(value: &Value) -> Option<Vec<MemberId>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(MemberId::new)
            .collect(),
    )
}

fn inclusion_flag(value: &Value) -> Option<InclusionFlag> {
    match value {
        Value::Bool(b) => Some(InclusionFlag::Bool(*b)),
        Value::Number(_) => number(value).map(InclusionFlag::Number),
        Value::String(s) => Some(InclusionFlag::Text(s.clone())),
        _ => None,
    }
}

fn annotated_list(value: &Value) -> Option<Vec<AnnotatedShare>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|entry| {
                let id = entry
                    .get("userId")
                    .or_else(|| entry.get("memberId"))
                    .and_then(Value::as_str)?;
                Some(AnnotatedShare {
                    member_id: MemberId::new(id),
                    amount: entry.get("amount").and_then(number),
                    included: entry.get("included").and_then(inclusion_flag),
                })
            })
            .collect(),
    )
}

/// Collect every participant encoding present on an expense document.
fn share_spec(doc: &Map<String, Value>) -> ShareSpec {
    ShareSpec {
        explicit: doc.get("splits").and_then(explicit_map),
        participants: doc.get("splitBetween").and_then(participant_list),
        annotated: doc.get("splitWith").and_then(annotated_list),
    }
}

fn timestamp(value: Option<&Value>) -> DateTime<Utc> {
    let parsed = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok(),
        Some(Value::Object(o)) => {
            let secs = o
                .get("seconds")
                .or_else(|| o.get("_seconds"))
                .and_then(Value::as_i64);
            let nanos = o
                .get("nanoseconds")
                .or_else(|| o.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            secs.and_then(|s| Utc.timestamp_opt(s, nanos as u32).single())
        }
        _ => None,
    };
    parsed.unwrap_or_default()
}

fn document_id(doc: &Map<String, Value>) -> Uuid {
    match doc.get("id").and_then(Value::as_str) {
        Some(raw) => {
            Uuid::parse_str(raw)
                .unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_OID, raw.as_bytes()))
        }
        None => Uuid::new_v4(),
    }
}

/// Read a transaction document.
///
/// `type == "settle"` selects a settlement; any other or missing type is an
/// expense. Missing or unreadable amounts decode as zero, which the engine
/// ignores.
pub fn decode_transaction(value: &Value) -> Result<Transaction, DecodeError> {
    let doc = as_object(value)?;
    let amount = doc.get("amount").and_then(number).unwrap_or(Decimal::ZERO);
    let paid_by = required_str(doc, "paidBy")?;
    let id = document_id(doc);
    let ts = timestamp(doc.get("timestamp"));

    if doc.get("type").and_then(Value::as_str) == Some("settle") {
        let received_by = required_str(doc, "receivedBy")?;
        return Ok(Settlement::new(amount, paid_by, received_by)
            .with_id(id)
            .with_timestamp(ts)
            .into());
    }

    let mut expense = Expense::new(amount, paid_by, share_spec(doc))
        .with_id(id)
        .with_timestamp(ts);
    if let Some(title) = optional_str(doc, "title") {
        expense = expense.with_title(title);
    }
    if let Some(split_type) = optional_str(doc, "splitType") {
        expense = expense.with_split_type(split_type);
    }
    Ok(expense.into())
}

/// Read a whole transaction log, skipping documents that cannot be read.
pub fn decode_log(values: &[Value]) -> TransactionLog {
    values
        .iter()
        .filter_map(|v| match decode_transaction(v) {
            Ok(t) => Some(t),
            Err(e) => {
                log::warn!("skipping transaction document: {}", e);
                None
            }
        })
        .collect()
}
