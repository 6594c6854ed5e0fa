//! Periodic moderator re-election from post scores.

use std::collections::BTreeMap;

use cf_core::error::Result;
use cf_core::traits::StateStub;

use crate::fanout::gather;
use crate::store::Store;
use crate::SmartContract;

pub const MAX_MODERATORS: usize = 100;

/// One seat per ten members, rounded up, between 1 and [`MAX_MODERATORS`].
pub fn moderator_seats(members: usize) -> usize {
    members.div_ceil(10).clamp(1, MAX_MODERATORS)
}

/// Ranks authors by summed score, highest first. Ties go to the smaller ID.
fn rank(tally: BTreeMap<String, i64>) -> Vec<String> {
    let mut ranked: Vec<(String, i64)> = tally.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().map(|(author, _)| author).collect()
}

impl SmartContract {
    /// Replaces `Community.moderators` with the top post authors and returns
    /// the new list. A community without posts keeps its moderators.
    pub async fn select_moderator(&self, stub: &dyn StateStub, community_id: &str) -> Result<Vec<String>> {
        let store = Store::new(stub);
        let mut community = store.community(community_id).await?;

        let posts = gather(community.posts.iter().map(|id| store.post(id))).await?;
        let mut tally: BTreeMap<String, i64> = BTreeMap::new();
        for post in &posts {
            *tally.entry(post.author.clone()).or_default() += post.state.score;
        }

        if tally.is_empty() {
            log::info!("no posts in {}; moderators unchanged", community_id);
            return Ok(community.moderators);
        }

        let mut elected = rank(tally);
        elected.truncate(moderator_seats(community.users.len()));
        community.moderators = elected.clone();
        store.put_community(&community).await?;
        log::info!("elected {} moderator(s) for {}: {:?}", elected.len(), community_id, elected);
        Ok(elected)
    }
}
