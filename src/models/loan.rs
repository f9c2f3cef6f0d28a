//! Loan model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::NameRef;

/// Loan lifecycle state, stored and serialized as its numeric code.
///
/// The only transition is `Active -> Returned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "i16", into = "i16")]
#[repr(i16)]
pub enum LoanStatus {
    Returned = 0,
    Active = 1,
}

impl TryFrom<i16> for LoanStatus {
    type Error = String;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(LoanStatus::Returned),
            1 => Ok(LoanStatus::Active),
            other => Err(format!("invalid loan status {} (expected 0 or 1)", other)),
        }
    }
}

impl From<LoanStatus> for i16 {
    fn from(s: LoanStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoanStatus::Returned => "RETURNED",
            LoanStatus::Active => "ACTIVE",
        };
        write!(f, "{}", label)
    }
}

/// Loan model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: i32,
    pub user_id: i32,
    pub item_id: i32,
    pub qty: i32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// 1 = active, 0 = returned
    #[schema(value_type = i16)]
    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
}

/// Loan with the display names of its user and item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    #[serde(flatten)]
    pub loan: Loan,
    pub user: NameRef,
    pub item: NameRef,
}

/// Joined row as returned by the loans listing query
#[derive(Debug, FromRow)]
pub struct LoanDetailsRow {
    #[sqlx(flatten)]
    pub loan: Loan,
    pub user_name: String,
    pub item_name: String,
}

impl From<LoanDetailsRow> for LoanDetails {
    fn from(row: LoanDetailsRow) -> Self {
        Self {
            loan: row.loan,
            user: NameRef { name: row.user_name },
            item: NameRef { name: row.item_name },
        }
    }
}

/// Validated loan creation input, handed to the loans service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLoan {
    pub user_id: i32,
    pub item_id: i32,
    pub qty: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Row to insert; status is always `Active` on creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    pub user_id: i32,
    pub item_id: i32,
    pub qty: i32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Parse a loan date given either as `YYYY-MM-DD` or as an RFC 3339 timestamp.
///
/// Timestamps are reduced to their UTC calendar date.
pub fn parse_loan_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

/// Serde helper for optional loan dates, see [`parse_loan_date`].
pub fn deserialize_loan_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => parse_loan_date(&s).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid date `{}`: expected YYYY-MM-DD or an ISO 8601 timestamp",
                s
            ))
        }),
    }
}
