// /api/customers - customer records inside the active tenant database

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::database::models::Customer;
use crate::database::{self, DatabaseError};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub age: Option<i16>,
    #[serde(default)]
    pub gender: Option<i16>,
    pub mobile: String,
    pub email: String,
    pub address1: String,
    #[serde(default)]
    pub address2: Option<String>,
}

impl CustomerRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.first_name.trim().is_empty()
            || self.last_name.trim().is_empty()
            || self.mobile.trim().is_empty()
            || self.email.trim().is_empty()
            || self.address1.trim().is_empty()
        {
            return Err(ApiError::bad_request(
                "firstName, lastName, mobile, email and address1 are required",
            ));
        }
        Ok(())
    }
}

const CUSTOMER_COLUMNS: &str = "id, first_name, last_name, date_of_birth, age, gender, \
                                mobile, email, address1, address2, created_at, updated_at";

pub async fn customers_get() -> Result<Json<Vec<Customer>>, ApiError> {
    let pool = database::active_pool().await?;
    let customers = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id"
    ))
    .fetch_all(&pool)
    .await
    .map_err(DatabaseError::from)?;
    Ok(Json(customers))
}

pub async fn customer_get(Path(id): Path<i64>) -> Result<Json<Customer>, ApiError> {
    let pool = database::active_pool().await?;
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await
    .map_err(DatabaseError::from)?
    .ok_or_else(|| ApiError::not_found("Customer not found"))?;
    Ok(Json(customer))
}

pub async fn customers_post(
    Json(payload): Json<CustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    payload.validate()?;
    let pool = database::active_pool().await?;

    let email_taken =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM customers WHERE email = $1)")
            .bind(&payload.email)
            .fetch_one(&pool)
            .await
            .map_err(DatabaseError::from)?;
    if email_taken {
        return Err(ApiError::duplicate("Email already registered", "email"));
    }

    let mobile_taken =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM customers WHERE mobile = $1)")
            .bind(&payload.mobile)
            .fetch_one(&pool)
            .await
            .map_err(DatabaseError::from)?;
    if mobile_taken {
        return Err(ApiError::duplicate("Mobile already registered", "mobile"));
    }

    let customer = sqlx::query_as::<_, Customer>(&format!(
        r#"
        INSERT INTO customers
            (first_name, last_name, date_of_birth, age, gender, mobile, email, address1, address2)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {CUSTOMER_COLUMNS}
        "#
    ))
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(payload.date_of_birth)
    .bind(payload.age)
    .bind(payload.gender)
    .bind(&payload.mobile)
    .bind(&payload.email)
    .bind(&payload.address1)
    .bind(&payload.address2)
    .fetch_one(&pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn customer_put(
    Path(id): Path<i64>,
    Json(payload): Json<CustomerRequest>,
) -> Result<Json<Customer>, ApiError> {
    payload.validate()?;
    let pool = database::active_pool().await?;

    let customer = sqlx::query_as::<_, Customer>(&format!(
        r#"
        UPDATE customers
        SET first_name = $2, last_name = $3, date_of_birth = $4, age = $5, gender = $6,
            mobile = $7, email = $8, address1 = $9, address2 = $10, updated_at = now()
        WHERE id = $1
        RETURNING {CUSTOMER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(payload.date_of_birth)
    .bind(payload.age)
    .bind(payload.gender)
    .bind(&payload.mobile)
    .bind(&payload.email)
    .bind(&payload.address1)
    .bind(&payload.address2)
    .fetch_optional(&pool)
    .await
    .map_err(DatabaseError::from)?
    .ok_or_else(|| ApiError::not_found("Customer not found"))?;

    Ok(Json(customer))
}

pub async fn customer_delete(Path(id): Path<i64>) -> Result<StatusCode, ApiError> {
    let pool = database::active_pool().await?;
    let result = sqlx::query("DELETE FROM customers WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(DatabaseError::from)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Customer not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
