use crate::dtos::{
    CompleteHabitRequest, CreateHabitRequest, HabitEnvelope, HabitResponse, ReportEntry,
};
use crate::models::{today_string, Habit};
use crate::services::weekly_report;
use crate::startup::AppState;
use crate::utils::JsonBody;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Local;
use service_core::error::AppError;

/// Create a habit. A request without a JSON body is treated as `{}`.
pub async fn create_habit(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateHabitRequest>,
) -> Result<impl IntoResponse, AppError> {
    let habit = Habit::new(request.name, request.daily_goal);

    state.store.insert(&habit).await.map_err(|e| {
        tracing::error!(habit_id = %habit.id, "Failed to create habit: {}", e);
        e
    })?;

    metrics::counter!("habits_created_total").increment(1);
    tracing::info!(
        habit_id = %habit.id,
        name = habit.name.as_deref().unwrap_or(""),
        "Habit created"
    );

    Ok((
        StatusCode::CREATED,
        Json(HabitEnvelope::new("Habit added successfully", habit)),
    ))
}

/// Append a completion date (today unless the body names one).
///
/// A request without a JSON body is treated as `{}`.
pub async fn complete_habit(
    State(state): State<AppState>,
    Path(habit_id): Path<String>,
    JsonBody(request): JsonBody<CompleteHabitRequest>,
) -> Result<impl IntoResponse, AppError> {
    let date = request
        .explicit_date()
        .map(str::to_string)
        .unwrap_or_else(today_string);

    let habit = state
        .store
        .append_completion(&habit_id, &date)
        .await
        .map_err(|e| {
            tracing::error!(habit_id = %habit_id, "Failed to mark habit complete: {}", e);
            e
        })?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Habit not found")))?;

    metrics::counter!("habit_completions_total").increment(1);
    tracing::info!(habit_id = %habit_id, date = %date, "Habit marked as complete");

    Ok((
        StatusCode::OK,
        Json(HabitEnvelope::new("Habit marked as complete", habit)),
    ))
}

pub async fn list_habits(
    State(state): State<AppState>,
) -> Result<Json<Vec<HabitResponse>>, AppError> {
    let habits = state.store.list().await.map_err(|e| {
        tracing::error!("Failed to list habits: {}", e);
        e
    })?;

    Ok(Json(habits.into_iter().map(HabitResponse::from).collect()))
}

pub async fn habit_report(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReportEntry>>, AppError> {
    let habits = state.store.list().await.map_err(|e| {
        tracing::error!("Failed to load habits for weekly report: {}", e);
        e
    })?;

    Ok(Json(weekly_report(&habits, Local::now().date_naive())))
}
