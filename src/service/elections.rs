use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    error::Result,
    model::{
        db::{
            candidate::CandidateSnapshot,
            election::{Election, NewElection},
        },
        mongodb::Id,
    },
};

use super::{
    schedule::{has_conflict, Window},
    store::{CandidateStore, ElectionDetails, ElectionRepository},
    Rejection,
};

/// What to do with candidate IDs that do not resolve to a candidate when
/// creating or editing an election.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidatePolicy {
    /// Leave them off the ballot without complaint.
    #[default]
    Drop,
    /// Fail the whole request with [`Rejection::UnknownCandidate`].
    Reject,
}

/// A newly scheduled election.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled {
    pub id: Id,
    pub candidates: Vec<CandidateSnapshot>,
}

/// Creates, edits and deletes elections, keeping their windows disjoint.
///
/// The conflict check and the following write are not atomic: two concurrent
/// creates with overlapping windows can both succeed. Closing that gap needs
/// a store that can enforce the constraint itself.
pub struct ElectionService<'a> {
    elections: &'a dyn ElectionRepository,
    candidates: &'a dyn CandidateStore,
    policy: CandidatePolicy,
}

impl<'a> ElectionService<'a> {
    pub fn new(
        elections: &'a dyn ElectionRepository,
        candidates: &'a dyn CandidateStore,
        policy: CandidatePolicy,
    ) -> Self {
        Self {
            elections,
            candidates,
            policy,
        }
    }

    /// Schedule a new election with an empty ledger.
    pub async fn create(
        &self,
        name: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        candidate_ids: &[String],
    ) -> Result<Scheduled> {
        let window = Window::new(start, end)?;
        self.check_conflicts(&window, None).await?;
        let candidates = self.resolve_candidates(candidate_ids).await?;

        let election = NewElection::new(ElectionDetails {
            name,
            window,
            candidates: candidates.clone(),
        });
        let id = self.elections.insert(election).await?;
        info!(
            "Created election {id} ({} to {}) with {} candidates",
            window.start(),
            window.end(),
            candidates.len()
        );
        Ok(Scheduled { id, candidates })
    }

    /// Replace an election's name, window and ballot. Votes already cast are kept.
    pub async fn edit(
        &self,
        election_id: Id,
        name: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        candidate_ids: &[String],
    ) -> Result<Vec<CandidateSnapshot>> {
        let window = Window::new(start, end)?;
        self.check_conflicts(&window, Some(election_id)).await?;
        let candidates = self.resolve_candidates(candidate_ids).await?;

        let details = ElectionDetails {
            name,
            window,
            candidates: candidates.clone(),
        };
        if !self.elections.update(election_id, details).await? {
            return Err(Rejection::ElectionNotFound.into());
        }
        info!("Updated election {election_id}");
        Ok(candidates)
    }

    /// Permanently remove an election and its ledger.
    pub async fn delete(&self, election_id: Id) -> Result<()> {
        if !self.elections.delete(election_id).await? {
            return Err(Rejection::ElectionNotFound.into());
        }
        info!("Deleted election {election_id}");
        Ok(())
    }

    pub async fn get(&self, election_id: Id) -> Result<Election> {
        self.elections
            .get(election_id)
            .await?
            .ok_or_else(|| Rejection::ElectionNotFound.into())
    }

    /// Elections open for voting at `now`.
    pub async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Election>> {
        self.elections.find_active(now).await
    }

    pub async fn list_all(&self) -> Result<Vec<Election>> {
        self.elections.list().await
    }

    async fn check_conflicts(&self, window: &Window, exclude: Option<Id>) -> Result<()> {
        let nearby = self.elections.find_overlapping(window, exclude).await?;
        if has_conflict(window, &nearby, exclude) {
            debug!("Rejected window {window:?}: overlaps an existing election");
            return Err(Rejection::ScheduleConflict.into());
        }
        Ok(())
    }

    /// Look up each ID and snapshot the candidate, preserving order.
    async fn resolve_candidates(&self, candidate_ids: &[String]) -> Result<Vec<CandidateSnapshot>> {
        let mut snapshots = Vec::with_capacity(candidate_ids.len());
        for raw in candidate_ids {
            let candidate = match raw.parse::<Id>() {
                Ok(id) => self.candidates.get(&id).await?,
                Err(_) => None,
            };
            match (candidate, self.policy) {
                (Some(candidate), _) => snapshots.push(candidate.snapshot()),
                (None, CandidatePolicy::Drop) => debug!("Dropping unknown candidate {raw}"),
                (None, CandidatePolicy::Reject) => {
                    return Err(Rejection::UnknownCandidate(raw.clone()).into())
                }
            }
        }
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};

    use crate::{
        error::Error,
        model::db::candidate::NewCandidate,
        service::{memory::MemoryStore, Window},
    };

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, day, 0, 0, 0).unwrap()
    }

    async fn add_candidate(store: &MemoryStore, candidate: NewCandidate) -> String {
        CandidateStore::insert(store, candidate)
            .await
            .unwrap()
            .unwrap()
            .to_string()
    }

    fn assert_rejected<T: std::fmt::Debug>(result: Result<T>, expected: Rejection) {
        match result {
            Err(Error::Rejected(rejection)) => assert_eq!(rejection, expected),
            other => panic!("expected {expected:?}, got {other:?}"),
        }
    }

    #[rocket::async_test]
    async fn create_resolves_candidates_in_order() {
        let store = MemoryStore::new();
        let c1 = add_candidate(&store, NewCandidate::example()).await;
        let c2 = add_candidate(&store, NewCandidate::example2()).await;
        let service = ElectionService::new(&store, &store, CandidatePolicy::Drop);

        let scheduled = service
            .create("E1".into(), at(12), at(20), &[c2.clone(), c1.clone()])
            .await
            .unwrap();
        let names: Vec<_> = scheduled.candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Sana Tariq", "Imran Malik"]);

        let stored = service.get(scheduled.id).await.unwrap();
        assert_eq!(stored.name, "E1");
        assert_eq!(stored.candidates, scheduled.candidates);
        assert!(stored.votes.is_empty());
    }

    #[rocket::async_test]
    async fn create_rejects_bad_windows() {
        let store = MemoryStore::new();
        let service = ElectionService::new(&store, &store, CandidatePolicy::Drop);
        assert_rejected(
            service.create("E".into(), at(20), at(12), &[]).await,
            Rejection::InvalidSchedule,
        );
        assert_rejected(
            service.create("E".into(), at(12), at(12), &[]).await,
            Rejection::InvalidSchedule,
        );
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn shared_boundary_is_a_conflict() {
        let store = MemoryStore::new();
        let c1 = add_candidate(&store, NewCandidate::example()).await;
        let service = ElectionService::new(&store, &store, CandidatePolicy::Drop);

        service
            .create("E1".into(), at(12), at(20), &[c1])
            .await
            .unwrap();
        assert_rejected(
            service.create("E2".into(), at(20), at(25), &[]).await,
            Rejection::ScheduleConflict,
        );
        // Less than a millisecond later still touches once stored.
        assert_rejected(
            service
                .create("E2".into(), at(20) + Duration::microseconds(500), at(25), &[])
                .await,
            Rejection::ScheduleConflict,
        );
        // A millisecond later is fine.
        service
            .create("E2".into(), at(20) + Duration::milliseconds(1), at(25), &[])
            .await
            .unwrap();
    }

    #[rocket::async_test]
    async fn created_elections_never_overlap() {
        let store = MemoryStore::new();
        let service = ElectionService::new(&store, &store, CandidatePolicy::Drop);
        for (start, end) in [(1, 5), (3, 8), (6, 9), (9, 12), (10, 11), (13, 20), (2, 28)] {
            let _ = service.create("E".into(), at(start), at(end), &[]).await;
        }
        let elections = service.list_all().await.unwrap();
        assert_eq!(elections.len(), 4); // [1,5], [6,9], [10,11] and [13,20].
        let windows: Vec<Window> = elections.iter().filter_map(|e| e.window()).collect();
        for (i, a) in windows.iter().enumerate() {
            for b in &windows[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
    }

    #[rocket::async_test]
    async fn unknown_candidates_follow_policy() {
        let store = MemoryStore::new();
        let c1 = add_candidate(&store, NewCandidate::example()).await;
        let missing = Id::new().to_string();
        let ids = [c1, missing.clone(), "garbage".to_string()];

        let lenient = ElectionService::new(&store, &store, CandidatePolicy::Drop);
        let scheduled = lenient
            .create("E1".into(), at(1), at(2), &ids)
            .await
            .unwrap();
        assert_eq!(scheduled.candidates.len(), 1);

        let strict = ElectionService::new(&store, &store, CandidatePolicy::Reject);
        assert_rejected(
            strict.create("E2".into(), at(3), at(4), &ids).await,
            Rejection::UnknownCandidate(missing),
        );
        assert_eq!(strict.list_all().await.unwrap().len(), 1);
    }

    #[rocket::async_test]
    async fn edit_excludes_itself_and_keeps_votes() {
        let store = MemoryStore::new();
        let c1 = add_candidate(&store, NewCandidate::example()).await;
        let c2 = add_candidate(&store, NewCandidate::example2()).await;
        let service = ElectionService::new(&store, &store, CandidatePolicy::Drop);

        let first = service
            .create("E1".into(), at(10), at(15), &[c1.clone()])
            .await
            .unwrap();
        service
            .create("E2".into(), at(20), at(25), &[])
            .await
            .unwrap();
        let voter = "35202-1234567-1".parse().unwrap();
        store
            .record_vote(first.id, &voter, c1.parse().unwrap())
            .await
            .unwrap();

        // Overlapping its own old window is fine.
        let candidates = service
            .edit(first.id, "E1 (moved)".into(), at(11), at(16), &[c1, c2])
            .await
            .unwrap();
        assert_eq!(candidates.len(), 2);
        let edited = service.get(first.id).await.unwrap();
        assert_eq!(edited.name, "E1 (moved)");
        assert_eq!(edited.start_time, at(11));
        assert!(edited.votes.has_voted(&voter));

        // Touching the other election is not.
        assert_rejected(
            service
                .edit(first.id, "E1".into(), at(11), at(20), &[])
                .await,
            Rejection::ScheduleConflict,
        );
        assert_rejected(
            service
                .edit(first.id, "E1".into(), at(16), at(11), &[])
                .await,
            Rejection::InvalidSchedule,
        );
    }

    #[rocket::async_test]
    async fn edit_and_delete_missing() {
        let store = MemoryStore::new();
        let service = ElectionService::new(&store, &store, CandidatePolicy::Drop);
        assert_rejected(
            service.edit(Id::new(), "E".into(), at(1), at(2), &[]).await,
            Rejection::ElectionNotFound,
        );
        assert_rejected(service.delete(Id::new()).await, Rejection::ElectionNotFound);

        let scheduled = service
            .create("E".into(), at(1), at(2), &[])
            .await
            .unwrap();
        service.delete(scheduled.id).await.unwrap();
        assert_rejected(service.get(scheduled.id).await, Rejection::ElectionNotFound);
        assert_rejected(service.delete(scheduled.id).await, Rejection::ElectionNotFound);
    }

    #[rocket::async_test]
    async fn active_listing() {
        let store = MemoryStore::new();
        let service = ElectionService::new(&store, &store, CandidatePolicy::Drop);
        let early = service.create("Early".into(), at(1), at(5), &[]).await.unwrap();
        service.create("Late".into(), at(10), at(15), &[]).await.unwrap();

        let active = service.list_active(at(5)).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, early.id);
        assert!(service.list_active(at(7)).await.unwrap().is_empty());
        assert_eq!(service.list_all().await.unwrap().len(), 2);
    }
}
