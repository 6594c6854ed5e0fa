//! # Moderator Re-election Scheduler
//!
//! One recurring tokio task per community. A newly created community gets its
//! first election `initial_delay` after scheduling, then one every `period`.
//! Jobs resumed at start-up wait a full `period` before their first run, so a
//! restart does not trigger an early election. Last-run times are not
//! persisted, so a restart still pushes the next election out by up to one
//! period. A failed election is logged and the job keeps its schedule.

use std::sync::Arc;
use std::time::Duration;

use cf_contract::Gateway;
use cf_core::error::Result;
use dashmap::DashMap;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct ElectionScheduler {
    gateway: Gateway,
    initial_delay: Duration,
    period: Duration,
    jobs: Arc<DashMap<String, JoinHandle<()>>>,
}

impl ElectionScheduler {
    pub fn new(gateway: Gateway, initial_delay: Duration, period: Duration) -> Self {
        Self {
            gateway,
            initial_delay,
            period,
            jobs: Arc::new(DashMap::new()),
        }
    }

    /// Starts (or restarts) the election job for `community_id`.
    pub fn schedule(&self, community_id: &str) {
        self.spawn_job(community_id, self.initial_delay);
    }

    fn spawn_job(&self, community_id: &str, first_run: Duration) {
        let gateway = self.gateway.clone();
        let id = community_id.to_string();
        let period = self.period;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(first_run).await;
            loop {
                match gateway.select_moderator(&id).await {
                    Ok(moderators) => log::info!("re-elected moderators of {}: {:?}", id, moderators),
                    Err(err) => log::warn!("moderator election for {} failed: {}", id, err),
                }
                tokio::time::sleep(period).await;
            }
        });

        if let Some(previous) = self.jobs.insert(community_id.to_string(), handle) {
            previous.abort();
        }
        log::debug!("scheduled moderator election for {}", community_id);
    }

    /// Resumes jobs for every community in the name index, first run one
    /// `period` out. Returns how many.
    pub async fn schedule_all(&self) -> Result<usize> {
        let communities = self.gateway.list_communities().await?;
        for community in &communities {
            self.spawn_job(&community.id, self.period);
        }
        log::info!("scheduled moderator elections for {} communities", communities.len());
        Ok(communities.len())
    }

    pub fn cancel(&self, community_id: &str) -> bool {
        match self.jobs.remove(community_id) {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_scheduled(&self, community_id: &str) -> bool {
        self.jobs.contains_key(community_id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn shutdown(&self) {
        self.jobs.retain(|_, handle| {
            handle.abort();
            false
        });
    }
}
