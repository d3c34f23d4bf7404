use crate::errors::{TrackerError, ValidationError};
use crate::store::KeyValueStore;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::{borrow::Cow, marker::PhantomData};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOrdering {
    Insertion,
    NewestRecordedFirst,
    OccurredAscending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogPolicy {
    pub key: &'static str,
    pub ordering: LogOrdering,
    pub capacity: Option<usize>,
}

pub trait Entry: Serialize + DeserializeOwned + Clone {
    const POLICY: LogPolicy;

    fn validate(&self) -> Result<(), ValidationError>;

    fn recorded_at(&self) -> DateTime<Utc>;

    fn occurred_at(&self) -> Cow<'_, str>;

    fn day(&self) -> Option<NaiveDate>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    pub len: usize,
    pub evicted: usize,
    pub retained: bool,
}

pub struct HistoryLog<E, S> {
    store: S,
    _entry: PhantomData<fn() -> E>,
}

impl<E: Entry, S: KeyValueStore> HistoryLog<E, S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            _entry: PhantomData,
        }
    }

    pub fn try_list(&self) -> Result<Vec<E>, TrackerError> {
        let key = E::POLICY.key;
        match self.store.get(key) {
            None => Ok(Vec::new()),
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|source| TrackerError::Decode { key, source })
            }
        }
    }

    pub fn list(&self) -> Vec<E> {
        self.try_list().unwrap_or_else(|err| {
            warn!("{err}; treating log as empty");
            Vec::new()
        })
    }

    pub fn append(&mut self, entry: E) -> Result<AppendOutcome, TrackerError> {
        entry.validate()?;
        let policy = E::POLICY;

        let mut indexed: Vec<(usize, E)> = self.list().into_iter().enumerate().collect();
        let appended = indexed.len();
        indexed.push((appended, entry));

        match policy.ordering {
            LogOrdering::Insertion => {}
            LogOrdering::NewestRecordedFirst => {
                indexed.sort_by(|(_, a), (_, b)| b.recorded_at().cmp(&a.recorded_at()))
            }
            LogOrdering::OccurredAscending => {
                indexed.sort_by(|(_, a), (_, b)| a.occurred_at().cmp(&b.occurred_at()))
            }
        }

        let mut evicted = 0;
        if let Some(capacity) = policy.capacity {
            if indexed.len() > capacity {
                evicted = indexed.len() - capacity;
                match policy.ordering {
                    // Unordered logs keep the most recently appended entries.
                    LogOrdering::Insertion => {
                        indexed.drain(..evicted);
                    }
                    _ => indexed.truncate(capacity),
                }
            }
        }

        let retained = indexed.iter().any(|(index, _)| *index == appended);
        let entries: Vec<E> = indexed.into_iter().map(|(_, entry)| entry).collect();
        self.write(&entries)?;

        if !retained {
            debug!(key = policy.key, "appended entry fell outside the capacity bound");
        }

        Ok(AppendOutcome {
            len: entries.len(),
            evicted,
            retained,
        })
    }

    pub fn entries_on(&self, day: NaiveDate) -> Vec<E> {
        self.list()
            .into_iter()
            .filter(|entry| entry.day() == Some(day))
            .collect()
    }

    pub fn recent_on(&self, day: NaiveDate, limit: usize) -> Vec<E> {
        let mut entries = self.entries_on(day);
        let start = entries.len().saturating_sub(limit);
        let mut recent = entries.split_off(start);
        recent.reverse();
        recent
    }

    pub fn daily_total(&self, day: NaiveDate, field: impl Fn(&E) -> f64) -> f64 {
        self.entries_on(day).iter().map(field).sum()
    }

    pub fn reset(&mut self) {
        self.store.remove(E::POLICY.key);
    }

    fn write(&mut self, entries: &[E]) -> Result<(), TrackerError> {
        let key = E::POLICY.key;
        let payload =
            serde_json::to_string(entries).map_err(|source| TrackerError::Encode { key, source })?;
        self.store.set(key, payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        value: f64,
        day: NaiveDate,
        at: DateTime<Utc>,
    }

    impl Entry for Sample {
        const POLICY: LogPolicy = LogPolicy {
            key: "test_samples",
            ordering: LogOrdering::Insertion,
            capacity: Some(3),
        };

        fn validate(&self) -> Result<(), ValidationError> {
            if self.value > 0.0 {
                Ok(())
            } else {
                Err(ValidationError::NotPositive { field: "value" })
            }
        }

        fn recorded_at(&self) -> DateTime<Utc> {
            self.at
        }

        fn occurred_at(&self) -> Cow<'_, str> {
            Cow::Owned(self.day.to_string())
        }

        fn day(&self) -> Option<NaiveDate> {
            Some(self.day)
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn sample(value: f64, d: u32) -> Sample {
        Sample {
            value,
            day: day(d),
            at: Utc.with_ymd_and_hms(2026, 3, d, 12, 0, 0).unwrap() + Duration::seconds(value as i64),
        }
    }

    #[test]
    fn absent_key_is_an_empty_log() {
        let mut store = MemoryStore::new();
        let log = HistoryLog::<Sample, _>::new(&mut store);
        assert!(log.list().is_empty());
        assert_eq!(log.daily_total(day(1), |s| s.value), 0.0);
    }

    #[test]
    fn invalid_entry_leaves_log_untouched() {
        let mut store = MemoryStore::new();
        let mut log = HistoryLog::<Sample, _>::new(&mut store);
        log.append(sample(1.0, 1)).unwrap();

        let err = log.append(sample(0.0, 1)).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Validation(ValidationError::NotPositive { field: "value" })
        ));
        assert_eq!(log.list(), vec![sample(1.0, 1)]);
    }

    #[test]
    fn unordered_bounded_log_keeps_latest_appends() {
        let mut store = MemoryStore::new();
        let mut log = HistoryLog::<Sample, _>::new(&mut store);
        for value in 1..=5 {
            let outcome = log.append(sample(value as f64, 1)).unwrap();
            assert!(outcome.len <= 3);
            assert!(outcome.retained);
        }

        let values: Vec<f64> = log.list().iter().map(|s| s.value).collect();
        assert_eq!(values, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn corrupt_value_reads_as_empty_and_try_list_reports_it() {
        let mut store = MemoryStore::new();
        store.set("test_samples", "{not json".into());

        let mut log = HistoryLog::<Sample, _>::new(&mut store);
        assert!(log.list().is_empty());
        assert!(matches!(
            log.try_list(),
            Err(TrackerError::Decode { key: "test_samples", .. })
        ));

        log.append(sample(2.0, 1)).unwrap();
        assert_eq!(log.try_list().unwrap(), vec![sample(2.0, 1)]);
    }

    #[test]
    fn day_views_filter_and_reverse() {
        let mut store = MemoryStore::new();
        let mut log = HistoryLog::<Sample, _>::new(&mut store);
        log.append(sample(1.0, 1)).unwrap();
        log.append(sample(2.0, 2)).unwrap();
        log.append(sample(3.0, 2)).unwrap();

        assert_eq!(log.entries_on(day(2)).len(), 2);
        assert_eq!(log.daily_total(day(2), |s| s.value), 5.0);
        assert_eq!(log.daily_total(day(9), |s| s.value), 0.0);

        let recent: Vec<f64> = log.recent_on(day(2), 1).iter().map(|s| s.value).collect();
        assert_eq!(recent, vec![3.0]);
    }

    #[test]
    fn reset_empties_the_log() {
        let mut store = MemoryStore::new();
        let mut log = HistoryLog::<Sample, _>::new(&mut store);
        log.append(sample(1.0, 1)).unwrap();
        log.reset();

        assert!(log.list().is_empty());
        assert_eq!(log.daily_total(day(1), |s| s.value), 0.0);
        assert_eq!(store.get("test_samples"), None);
    }
}
