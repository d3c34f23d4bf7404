use crate::bmi::{self, Bmi};
use crate::errors::{AppError, TrackerError, ValidationError};
use crate::history::{AppendOutcome, HistoryLog};
use crate::models::{
    ActivityRequest, Appended, BloodSugarReading, BloodSugarRequest, BmiRequest, CarbRequest,
    DayView, MedicationRequest, ResetRequest, TodayResponse, VoteRequest, WaterRequest, WaterView,
};
use crate::poll::{Poll, PollTally};
use crate::state::AppState;
use crate::stats::{
    activity_view, blood_sugar_readings, build_today, carb_view, medication_list, today,
    water_view,
};
use crate::storage::persist_store;
use crate::store::MemoryStore;
use crate::trackers::{
    ActivityEntry, BloodSugarEntry, CarbEntry, MedicationEntry, WaterEntry,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Local;
use tracing::{error, info};

pub async fn get_today(State(state): State<AppState>) -> Json<TodayResponse> {
    let mut store = state.store.lock().await;
    Json(build_today(&mut *store))
}

pub async fn list_blood_sugar(State(state): State<AppState>) -> Json<Vec<BloodSugarReading>> {
    let mut store = state.store.lock().await;
    Json(blood_sugar_readings(&mut *store))
}

pub async fn add_blood_sugar(
    State(state): State<AppState>,
    payload: Result<Json<BloodSugarRequest>, JsonRejection>,
) -> Result<Json<Appended<Vec<BloodSugarReading>>>, AppError> {
    let Json(payload) = payload?;
    let reading = required(payload.reading, "reading")?;
    let time = required(payload.time, "time")?;
    let entry = BloodSugarEntry::new(reading, &time, Local::now());

    let response = commit(&state, move |store| {
        let outcome = HistoryLog::new(&mut *store).append(entry)?;
        Ok(appended(outcome, blood_sugar_readings(store)))
    })
    .await?;
    Ok(Json(response))
}

pub async fn get_carbs(State(state): State<AppState>) -> Json<DayView<CarbEntry>> {
    let mut store = state.store.lock().await;
    Json(carb_view(&mut *store, today()))
}

pub async fn add_carbs(
    State(state): State<AppState>,
    payload: Result<Json<CarbRequest>, JsonRejection>,
) -> Result<Json<Appended<DayView<CarbEntry>>>, AppError> {
    let Json(payload) = payload?;
    let amount = required(payload.amount, "amount")?;
    let entry = CarbEntry::new(amount, payload.food.as_deref(), Local::now());

    let response = commit(&state, move |store| {
        let outcome = HistoryLog::new(&mut *store).append(entry)?;
        Ok(appended(outcome, carb_view(store, today())))
    })
    .await?;
    Ok(Json(response))
}

pub async fn list_medication(State(state): State<AppState>) -> Json<Vec<MedicationEntry>> {
    let mut store = state.store.lock().await;
    Json(medication_list(&mut *store))
}

pub async fn add_medication(
    State(state): State<AppState>,
    payload: Result<Json<MedicationRequest>, JsonRejection>,
) -> Result<Json<Appended<Vec<MedicationEntry>>>, AppError> {
    let Json(payload) = payload?;
    let name = required(payload.name, "name")?;
    let time = required(payload.time, "time")?;
    let entry = MedicationEntry::new(&name, &time, payload.dose.as_deref(), Local::now());

    let response = commit(&state, move |store| {
        let outcome = HistoryLog::new(&mut *store).append(entry)?;
        Ok(appended(outcome, medication_list(store)))
    })
    .await?;
    Ok(Json(response))
}

pub async fn get_water(State(state): State<AppState>) -> Json<WaterView> {
    let mut store = state.store.lock().await;
    Json(water_view(&mut *store, today()))
}

pub async fn add_water(
    State(state): State<AppState>,
    payload: Result<Json<WaterRequest>, JsonRejection>,
) -> Result<Json<Appended<WaterView>>, AppError> {
    let Json(payload) = payload?;
    let amount = required(payload.amount, "amount")?;
    let entry = WaterEntry::new(amount, Local::now());

    let response = commit(&state, move |store| {
        let outcome = HistoryLog::new(&mut *store).append(entry)?;
        Ok(appended(outcome, water_view(store, today())))
    })
    .await?;
    Ok(Json(response))
}

pub async fn get_activity(State(state): State<AppState>) -> Json<DayView<ActivityEntry>> {
    let mut store = state.store.lock().await;
    Json(activity_view(&mut *store, today()))
}

pub async fn add_activity(
    State(state): State<AppState>,
    payload: Result<Json<ActivityRequest>, JsonRejection>,
) -> Result<Json<Appended<DayView<ActivityEntry>>>, AppError> {
    let Json(payload) = payload?;
    let kind = required(payload.kind, "type")?;
    let duration = required(payload.duration, "duration")?;
    let entry = ActivityEntry::new(&kind, duration, Local::now());

    let response = commit(&state, move |store| {
        let outcome = HistoryLog::new(&mut *store).append(entry)?;
        Ok(appended(outcome, activity_view(store, today())))
    })
    .await?;
    Ok(Json(response))
}

pub async fn calculate_bmi(
    payload: Result<Json<BmiRequest>, JsonRejection>,
) -> Result<Json<Bmi>, AppError> {
    let Json(payload) = payload?;
    let height = required(payload.height_cm, "height_cm")?;
    let weight = required(payload.weight_kg, "weight_kg")?;
    Ok(Json(bmi::calculate(height, weight)?))
}

pub async fn get_poll(State(state): State<AppState>) -> Json<PollTally> {
    let mut store = state.store.lock().await;
    Json(Poll::new(&mut *store).tally())
}

pub async fn vote_poll(
    State(state): State<AppState>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<PollTally>, AppError> {
    let Json(payload) = payload?;
    let option = required(payload.option, "option")?;
    let tally = commit(&state, move |store| Poll::new(store).vote(option)).await?;
    Ok(Json(tally))
}

pub async fn reset_poll(
    State(state): State<AppState>,
    payload: Result<Json<ResetRequest>, JsonRejection>,
) -> Result<Json<PollTally>, AppError> {
    let Json(payload) = payload?;
    let tally = commit(&state, move |store| Poll::new(store).reset(payload.confirm)).await?;
    info!("poll reset");
    Ok(Json(tally))
}

async fn commit<T: Send>(
    state: &AppState,
    op: impl FnOnce(&mut MemoryStore) -> Result<T, TrackerError> + Send,
) -> Result<T, AppError> {
    let mut store = state.store.lock().await;
    let mut next = store.clone();
    let value = op(&mut next)?;

    if let Err(err) = persist_store(&state.data_path, &next).await {
        error!("failed to persist store: {}", err.message);
        return Err(err);
    }
    *store = next;
    Ok(value)
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::Missing { field })
}

fn appended<V>(outcome: AppendOutcome, current: V) -> Appended<V> {
    Appended {
        retained: outcome.retained,
        evicted: outcome.evicted,
        current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KeyValueStore;
    use crate::trackers::WATER_KEY;
    use axum::http::StatusCode;

    fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        HistoryLog::new(&mut store)
            .append(WaterEntry::new(300.0, Local::now()))
            .unwrap();
        store
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_store() {
        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("missing").join("state.json");
        let state = AppState::new(data_path.clone(), seeded_store());
        let before = state.store.lock().await.clone();

        let err = add_water(
            State(state.clone()),
            Ok(Json(WaterRequest {
                amount: Some(250.0),
            })),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        let after = state.store.lock().await;
        assert_eq!(*after, before);
        assert_eq!(after.get(WATER_KEY), before.get(WATER_KEY));
        assert!(!data_path.exists());
    }

    #[tokio::test]
    async fn successful_write_swaps_in_new_store() {
        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("state.json");
        let state = AppState::new(data_path.clone(), seeded_store());

        let Json(response) = add_water(
            State(state.clone()),
            Ok(Json(WaterRequest {
                amount: Some(250.0),
            })),
        )
        .await
        .unwrap();

        assert_eq!(response.current.total, 550.0);
        assert!(data_path.exists());
        let mut store = state.store.lock().await;
        assert_eq!(water_view(&mut *store, today()).total, 550.0);
    }

    #[tokio::test]
    async fn vote_option_must_be_present_and_in_range() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(dir.path().join("state.json"), MemoryStore::new());

        for option in [None, Some(-1), Some(9)] {
            let err = vote_poll(State(state.clone()), Ok(Json(VoteRequest { option })))
                .await
                .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
        assert_eq!(Poll::new(&mut *state.store.lock().await).tally().total, 0);
    }
}
