use crate::history::{Entry, HistoryLog};
use crate::models::{BloodSugarReading, DayView, TodayResponse, WaterView};
use crate::store::KeyValueStore;
use crate::trackers::{
    water_percentage, ActivityEntry, BloodSugarEntry, CarbEntry, MedicationEntry, WaterEntry,
    RECENT_LIMIT, WATER_GOAL_ML,
};
use chrono::{Local, NaiveDate};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn blood_sugar_readings<S: KeyValueStore>(store: S) -> Vec<BloodSugarReading> {
    HistoryLog::<BloodSugarEntry, _>::new(store)
        .list()
        .into_iter()
        .map(BloodSugarReading::from)
        .collect()
}

pub fn medication_list<S: KeyValueStore>(store: S) -> Vec<MedicationEntry> {
    HistoryLog::<MedicationEntry, _>::new(store).list()
}

pub fn day_view<E: Entry, S: KeyValueStore>(
    log: &HistoryLog<E, S>,
    day: NaiveDate,
    field: impl Fn(&E) -> f64,
) -> DayView<E> {
    DayView {
        date: day.to_string(),
        total: log.daily_total(day, field),
        recent: log.recent_on(day, RECENT_LIMIT),
    }
}

pub fn carb_view<S: KeyValueStore>(store: S, day: NaiveDate) -> DayView<CarbEntry> {
    day_view(&HistoryLog::new(store), day, |entry: &CarbEntry| entry.amount)
}

pub fn activity_view<S: KeyValueStore>(store: S, day: NaiveDate) -> DayView<ActivityEntry> {
    day_view(&HistoryLog::new(store), day, |entry: &ActivityEntry| {
        entry.duration
    })
}

pub fn water_view<S: KeyValueStore>(store: S, day: NaiveDate) -> WaterView {
    let view = day_view(&HistoryLog::new(store), day, |entry: &WaterEntry| entry.amount);
    WaterView {
        percentage: water_percentage(view.total),
        goal: WATER_GOAL_ML,
        date: view.date,
        total: view.total,
        recent: view.recent,
    }
}

pub fn build_today<S: KeyValueStore>(store: &mut S) -> TodayResponse {
    build_today_at(today(), store)
}

pub fn build_today_at<S: KeyValueStore>(day: NaiveDate, store: &mut S) -> TodayResponse {
    let latest_blood_sugar = blood_sugar_readings(&mut *store).into_iter().next();
    let carbs = carb_view(&mut *store, day);
    let water = water_view(&mut *store, day);
    let activity = activity_view(&mut *store, day);

    TodayResponse {
        date: day.to_string(),
        latest_blood_sugar,
        carbs_total: carbs.total,
        water_total: water.total,
        water_percentage: water.percentage,
        activity_minutes: activity.total,
        medications: medication_list(&mut *store),
    }
}
