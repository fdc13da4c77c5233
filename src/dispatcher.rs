use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::{
    error::{DeliveryError, DispatchError},
    poll::QuizPoll,
    sender::{Destination, PollSender},
    store::QuizStore,
};

/// Picks a question and broadcasts it as a quiz poll to every destination.
pub struct QuizDispatcher {
    store: Arc<RwLock<QuizStore>>,
    destinations: Vec<Destination>,
}

/// Outcome of one dispatch. Failed destinations never fail the dispatch itself.
#[derive(Debug)]
pub struct DispatchReport {
    pub category: String,
    pub poll: QuizPoll,
    pub delivered: Vec<Destination>,
    pub failed: Vec<DeliveryError>,
}

impl QuizDispatcher {
    /// Channels are served before groups.
    pub fn new(
        store: Arc<RwLock<QuizStore>>,
        channels: Vec<Destination>,
        groups: Vec<Destination>,
    ) -> Self {
        let mut destinations = channels;
        destinations.extend(groups);
        Self {
            store,
            destinations,
        }
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    #[instrument(level = "info", skip(self, sender))]
    pub async fn dispatch<S: PollSender>(
        &self,
        sender: &S,
        category: Option<&str>,
    ) -> Result<DispatchReport, DispatchError> {
        let selected = {
            let store = self.store.read().await;
            store.random_question(category)?
        };
        let poll = QuizPoll::build(&selected)?;
        info!("Dispatching '{}' from '{}'", poll.title(), selected.category());

        let payload = &poll;
        let results = join_all(
            self.destinations
                .iter()
                .map(|to| async move { (to, sender.send_quiz_poll(to, payload).await) }),
        )
        .await;

        let mut delivered = Vec::new();
        let mut failed = Vec::new();
        for (to, result) in results {
            match result {
                Ok(()) => {
                    info!("Quiz sent to {}", to);
                    delivered.push(to.clone());
                }
                Err(e) => {
                    error!("Error sending quiz to {}: {}", to, e.reason);
                    failed.push(e);
                }
            }
        }

        Ok(DispatchReport {
            category: selected.category().to_owned(),
            poll,
            delivered,
            failed,
        })
    }
}
