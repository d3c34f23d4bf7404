use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/today", get(handlers::get_today))
        .route(
            "/api/blood-sugar",
            get(handlers::list_blood_sugar).post(handlers::add_blood_sugar),
        )
        .route("/api/carbs", get(handlers::get_carbs).post(handlers::add_carbs))
        .route(
            "/api/medication",
            get(handlers::list_medication).post(handlers::add_medication),
        )
        .route("/api/water", get(handlers::get_water).post(handlers::add_water))
        .route("/api/activity", get(handlers::get_activity).post(handlers::add_activity))
        .route("/api/bmi", post(handlers::calculate_bmi))
        .route("/api/poll", get(handlers::get_poll))
        .route("/api/poll/vote", post(handlers::vote_poll))
        .route("/api/poll/reset", post(handlers::reset_poll))
        .with_state(state)
}
