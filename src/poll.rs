use crate::errors::{TrackerError, ValidationError};
use crate::store::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const POLL_KEY: &str = "diabetes_poll_votes";
pub const POLL_OPTIONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PollVotes {
    pub votes: [u64; POLL_OPTIONS],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollTally {
    pub votes: Vec<u64>,
    pub percentages: Vec<u32>,
    pub total: u64,
}

impl From<PollVotes> for PollTally {
    fn from(data: PollVotes) -> Self {
        let total: u64 = data.votes.iter().sum();
        let percentages = data
            .votes
            .iter()
            .map(|&votes| {
                if total == 0 {
                    0
                } else {
                    (votes as f64 / total as f64 * 100.0).round() as u32
                }
            })
            .collect();

        Self {
            votes: data.votes.to_vec(),
            percentages,
            total,
        }
    }
}

pub struct Poll<S> {
    store: S,
}

impl<S: KeyValueStore> Poll<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn tally(&self) -> PollTally {
        self.load().into()
    }

    pub fn vote(&mut self, option: i64) -> Result<PollTally, TrackerError> {
        let mut data = self.load();
        let slot = usize::try_from(option)
            .ok()
            .and_then(|index| data.votes.get_mut(index))
            .ok_or(ValidationError::UnknownOption(option))?;
        *slot = slot.saturating_add(1);
        self.save(&data)?;
        Ok(data.into())
    }

    pub fn reset(&mut self, confirmed: bool) -> Result<PollTally, TrackerError> {
        if !confirmed {
            return Err(ValidationError::Unconfirmed.into());
        }
        let data = PollVotes::default();
        self.save(&data)?;
        Ok(data.into())
    }

    fn load(&self) -> PollVotes {
        let Some(raw) = self.store.get(POLL_KEY) else {
            return PollVotes::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!("stored poll votes are not readable: {err}; starting from zero");
            PollVotes::default()
        })
    }

    fn save(&mut self, data: &PollVotes) -> Result<(), TrackerError> {
        let payload = serde_json::to_string(data).map_err(|source| TrackerError::Encode {
            key: POLL_KEY,
            source,
        })?;
        self.store.set(POLL_KEY, payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn empty_poll_has_zero_percentages() {
        let store = MemoryStore::new();
        let tally = Poll::new(store).tally();
        assert_eq!(tally.total, 0);
        assert_eq!(tally.percentages, vec![0, 0, 0, 0]);
    }

    #[test]
    fn votes_round_to_whole_percentages() {
        let mut store = MemoryStore::new();
        let mut poll = Poll::new(&mut store);
        poll.vote(0).unwrap();
        poll.vote(1).unwrap();
        let tally = poll.vote(1).unwrap();

        assert_eq!(tally.votes, vec![1, 2, 0, 0]);
        assert_eq!(tally.percentages, vec![33, 67, 0, 0]);
        assert_eq!(tally.total, 3);
        assert_eq!(
            store.get(POLL_KEY).as_deref(),
            Some(r#"{"votes":[1,2,0,0]}"#)
        );
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut store = MemoryStore::new();
        let mut poll = Poll::new(&mut store);
        let err = poll.vote(POLL_OPTIONS as i64).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Validation(ValidationError::UnknownOption(4))
        ));
        let err = poll.vote(-1).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Validation(ValidationError::UnknownOption(-1))
        ));
        assert_eq!(poll.tally().total, 0);
    }

    #[test]
    fn reset_needs_confirmation() {
        let mut store = MemoryStore::new();
        let mut poll = Poll::new(&mut store);
        poll.vote(2).unwrap();

        assert!(poll.reset(false).is_err());
        assert_eq!(poll.tally().total, 1);

        let tally = poll.reset(true).unwrap();
        assert_eq!(tally.votes, vec![0, 0, 0, 0]);
    }

    #[test]
    fn legacy_shape_reads_as_zero() {
        let mut store = MemoryStore::new();
        store.set(POLL_KEY, r#"{"votes":[1,2]}"#.into());
        assert_eq!(Poll::new(&mut store).tally().total, 0);
    }
}
