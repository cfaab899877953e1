//! Enrollment Recorder: converts verified course payments (or free-course
//! requests) into `Purchase` rows.
//!
//! The unique index on (`userId`, `courseId`) is the authoritative
//! idempotency guard; this module maps constraint conflicts to an
//! "already enrolled" outcome instead of surfacing them as errors.

use cartella_types::create_id;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    SqlErr,
};

use crate::entity::{course, purchase};
use crate::error::ApiError;
use crate::mail::{self, EmailMessage, templates};
use crate::state::AppState;

/// Sentinel payment id for zero-cost enrollments.
pub const FREE_PAYMENT_ID: &str = "FREE";

#[derive(Debug, Clone)]
pub enum EnrollOutcome {
    Enrolled(purchase::Model),
    AlreadyEnrolled,
}

/// Inserts the enrollment row. Safe to call from concurrent verifiers: the
/// pre-check keeps the common path quiet and the unique index settles the
/// race.
pub async fn record_purchase<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    course_id: &str,
    payment_id: &str,
    amount: Decimal,
) -> Result<EnrollOutcome, ApiError> {
    let existing = purchase::Entity::find()
        .filter(purchase::Column::UserId.eq(user_id))
        .filter(purchase::Column::CourseId.eq(course_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(EnrollOutcome::AlreadyEnrolled);
    }

    let model = purchase::ActiveModel {
        id: Set(create_id()),
        user_id: Set(user_id.to_string()),
        course_id: Set(course_id.to_string()),
        payment_id: Set(payment_id.to_string()),
        amount: Set(amount),
        created_at: Set(Utc::now().naive_utc()),
    };

    match model.insert(db).await {
        Ok(purchase) => {
            tracing::info!(
                user_id = %user_id,
                course_id = %course_id,
                payment_id = %payment_id,
                "Enrollment recorded"
            );
            Ok(EnrollOutcome::Enrolled(purchase))
        }
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            tracing::info!(
                user_id = %user_id,
                course_id = %course_id,
                "Enrollment already exists, skipping (idempotent)"
            );
            Ok(EnrollOutcome::AlreadyEnrolled)
        }
        Err(err) => Err(err.into()),
    }
}

/// Free-course path: bypasses the payment pipeline entirely. The course
/// must carry the `free` flag; duplicate attempts surface as an explicit
/// "already enrolled" error rather than silently succeeding twice.
pub async fn enroll_free(
    state: &AppState,
    user_id: &str,
    course_id: &str,
) -> Result<purchase::Model, ApiError> {
    let course = course::Entity::find_by_id(course_id.to_string())
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Course {} not found", course_id)))?;

    if !course.is_active {
        return Err(ApiError::bad_request("Course is not available"));
    }
    if !course.free {
        return Err(ApiError::bad_request("Course is not free"));
    }

    match record_purchase(&state.db, user_id, course_id, FREE_PAYMENT_ID, Decimal::ZERO).await? {
        EnrollOutcome::Enrolled(purchase) => {
            notify_enrollment(state, user_id, &course.name).await;
            Ok(purchase)
        }
        EnrollOutcome::AlreadyEnrolled => Err(ApiError::already_processed(
            "Already enrolled in this course",
        )),
    }
}

/// Whether the user owns the course; gates content access.
pub async fn has_purchased(
    state: &AppState,
    user_id: &str,
    course_id: &str,
) -> Result<bool, ApiError> {
    let existing = purchase::Entity::find()
        .filter(purchase::Column::UserId.eq(user_id))
        .filter(purchase::Column::CourseId.eq(course_id))
        .one(&state.db)
        .await?;
    Ok(existing.is_some())
}

async fn notify_enrollment(state: &AppState, user_id: &str, course_name: &str) {
    let Some(mail_client) = state.mail_client.clone() else {
        return;
    };

    use crate::entity::user;
    let recipient = match user::Entity::find_by_id(user_id.to_string())
        .one(&state.db)
        .await
    {
        Ok(Some(u)) => u.email,
        _ => return,
    };

    let (html, text) = templates::enrollment_confirmation(course_name);
    mail::send_in_background(
        mail_client,
        EmailMessage {
            to: recipient,
            subject: format!("You're enrolled: {}", course_name),
            body_html: Some(html),
            body_text: Some(text),
        },
    );
}
