//! Loan management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::loan::{deserialize_loan_date, CreateLoan, Loan, LoanDetails, LoanStatus},
};

use super::extract::ValidatedJson;

/// Create loan request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoanRequest {
    #[validate(required(message = "userId is required"))]
    pub user_id: Option<i32>,
    #[validate(required(message = "itemId is required"))]
    pub item_id: Option<i32>,
    /// Number of units borrowed, at least 1
    #[validate(required(message = "qty is required"))]
    pub qty: Option<i32>,
    /// `YYYY-MM-DD` or ISO 8601 timestamp
    #[serde(default, deserialize_with = "deserialize_loan_date")]
    #[schema(value_type = String, format = Date)]
    #[validate(required(message = "startDate is required"))]
    pub start_date: Option<NaiveDate>,
    /// `YYYY-MM-DD` or ISO 8601 timestamp, not before `startDate`
    #[serde(default, deserialize_with = "deserialize_loan_date")]
    #[schema(value_type = String, format = Date)]
    #[validate(required(message = "endDate is required"))]
    pub end_date: Option<NaiveDate>,
}

impl CreateLoanRequest {
    /// Convert a validated request into the service input
    fn into_create_loan(self) -> AppResult<CreateLoan> {
        match (self.user_id, self.item_id, self.qty, self.start_date, self.end_date) {
            (Some(user_id), Some(item_id), Some(qty), Some(start_date), Some(end_date)) => {
                Ok(CreateLoan {
                    user_id,
                    item_id,
                    qty,
                    start_date,
                    end_date,
                })
            }
            _ => Err(AppError::Validation("All loan fields are required".to_string())),
        }
    }
}

/// Update loan status request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLoanRequest {
    /// 1 = active, 0 = returned
    #[validate(
        required(message = "status is required"),
        range(min = 0, max = 1, message = "status must be 0 or 1")
    )]
    pub status: Option<i16>,
}

/// List all loans, most recent first
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    responses(
        (status = 200, description = "All loans with user and item names", body = Vec<LoanDetails>)
    )
)]
pub async fn list_loans(State(state): State<crate::AppState>) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.list_loans().await?;
    Ok(Json(loans))
}

/// Get a loan by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan details", body = LoanDetails),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.get_loan(loan_id).await?;
    Ok(Json(loan))
}

/// Create a new loan
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (
            status = 400,
            description = "Missing field, bad date range, quantity below 1 or unknown user/item"
        )
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    ValidatedJson(request): ValidatedJson<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let loan = state.services.loans.create_loan(request.into_create_loan()?).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Update a loan's status
#[utoipa::path(
    put,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    request_body = UpdateLoanRequest,
    responses(
        (status = 200, description = "Loan updated", body = Loan),
        (status = 400, description = "Missing or invalid status"),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Returned loans cannot be reactivated")
    )
)]
pub async fn update_loan(
    State(state): State<crate::AppState>,
    Path(loan_id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateLoanRequest>,
) -> AppResult<Json<Loan>> {
    let status = request
        .status
        .ok_or_else(|| AppError::Validation("status is required".to_string()))
        .and_then(|s| LoanStatus::try_from(s).map_err(AppError::Validation))?;

    let loan = state.services.loans.update_status(loan_id, status).await?;
    Ok(Json(loan))
}

/// Mark a loan as returned
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan returned", body = Loan),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.mark_returned(loan_id).await?;
    Ok(Json(loan))
}
