use std::sync::{Arc, Mutex};

use tempfile::{tempdir, TempDir};
use tokio::sync::RwLock;

use techquizbot::{
    dispatcher::QuizDispatcher,
    error::{DeliveryError, DispatchError, StoreError},
    poll::QuizPoll,
    sender::{Destination, PollSender},
    store::QuizStore,
};

/// Records every poll it is asked to send and fails for the listed handles.
#[derive(Default)]
struct FakeSender {
    sent: Mutex<Vec<(String, QuizPoll)>>,
    failing: Vec<String>,
}

impl FakeSender {
    fn failing(handles: &[&str]) -> Self {
        Self {
            sent: Mutex::default(),
            failing: handles.iter().map(|h| h.to_string()).collect(),
        }
    }

    fn sent_to(&self) -> Vec<String> {
        let sent = self.sent.lock().unwrap();
        sent.iter().map(|(to, _)| to.clone()).collect()
    }
}

impl PollSender for FakeSender {
    async fn send_quiz_poll(&self, to: &Destination, poll: &QuizPoll) -> Result<(), DeliveryError> {
        if self.failing.iter().any(|h| h == to.handle()) {
            return Err(DeliveryError {
                recipient: to.to_string(),
                reason: "Forbidden: bot is not a member of the channel chat".to_owned(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.handle().to_owned(), poll.clone()));
        Ok(())
    }
}

fn flutter_store() -> (TempDir, Arc<RwLock<QuizStore>>) {
    let dir = tempdir().expect("tempdir");
    let mut store = QuizStore::load(dir.path().join("quizzes.json")).expect("load");
    store
        .add_question(
            "flutter",
            "What is the primary programming language used in Flutter?",
            ["Java", "Kotlin", "Dart", "Swift"].map(String::from).to_vec(),
            "Dart",
            Some("Dart is developed by Google.".into()),
        )
        .unwrap();
    (dir, Arc::new(RwLock::new(store)))
}

fn destinations() -> (Vec<Destination>, Vec<Destination>) {
    let channels = ["@flutter_learning_free", "@Linux_learning_free", "@python_learning_free"]
        .iter()
        .filter_map(|c| Destination::channel(c))
        .collect();
    let groups = ["techwithdilanchat"]
        .iter()
        .filter_map(|g| Destination::group(g))
        .collect();
    (channels, groups)
}

#[tokio::test]
async fn poll_reaches_every_destination_with_quiz_payload() {
    let (_dir, store) = flutter_store();
    let (channels, groups) = destinations();
    let dispatcher = QuizDispatcher::new(store, channels, groups);
    let sender = FakeSender::default();

    let report = dispatcher.dispatch(&sender, Some("flutter")).await.unwrap();

    assert_eq!(report.category, "flutter");
    assert_eq!(report.delivered.len(), 4);
    assert!(report.failed.is_empty());
    assert_eq!(
        sender.sent_to(),
        vec![
            "@flutter_learning_free",
            "@Linux_learning_free",
            "@python_learning_free",
            "@techwithdilanchat"
        ]
    );

    let sent = sender.sent.lock().unwrap();
    let poll = &sent[0].1;
    assert_eq!(
        poll.title(),
        "[Flutter] What is the primary programming language used in Flutter?"
    );
    assert_eq!(poll.correct_index(), 2);
    assert_eq!(poll.explanation(), "Dart is developed by Google.");
}

#[tokio::test]
async fn one_failing_destination_does_not_stop_the_others() {
    let (_dir, store) = flutter_store();
    let (channels, groups) = destinations();
    let dispatcher = QuizDispatcher::new(store, channels, groups);
    let sender = FakeSender::failing(&["@Linux_learning_free"]);

    let report = dispatcher.dispatch(&sender, Some("flutter")).await.unwrap();

    assert_eq!(
        sender.sent_to(),
        vec![
            "@flutter_learning_free",
            "@python_learning_free",
            "@techwithdilanchat"
        ]
    );
    assert_eq!(report.delivered.len(), 3);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].recipient, "channel @Linux_learning_free");
}

#[tokio::test]
async fn all_destinations_failing_is_still_a_completed_dispatch() {
    let (_dir, store) = flutter_store();
    let (channels, groups) = destinations();
    let handles: Vec<String> = channels
        .iter()
        .chain(groups.iter())
        .map(|d| d.handle().to_owned())
        .collect();
    let handles: Vec<&str> = handles.iter().map(String::as_str).collect();
    let dispatcher = QuizDispatcher::new(store, channels, groups);
    let sender = FakeSender::failing(&handles);

    let report = dispatcher.dispatch(&sender, Some("flutter")).await.unwrap();
    assert!(report.delivered.is_empty());
    assert_eq!(report.failed.len(), 4);
}

#[tokio::test]
async fn empty_store_aborts_before_sending() {
    let dir = tempdir().expect("tempdir");
    let store = QuizStore::load(dir.path().join("quizzes.json")).unwrap();
    let (channels, groups) = destinations();
    let dispatcher = QuizDispatcher::new(Arc::new(RwLock::new(store)), channels, groups);
    let sender = FakeSender::default();

    let err = dispatcher.dispatch(&sender, Some("python")).await.unwrap_err();
    assert!(matches!(err, DispatchError::Store(StoreError::EmptyStore(_))));
    assert!(sender.sent_to().is_empty());
}

#[tokio::test]
async fn question_added_while_running_is_dispatched() {
    let dir = tempdir().expect("tempdir");
    let store = Arc::new(RwLock::new(
        QuizStore::load(dir.path().join("quizzes.json")).unwrap(),
    ));
    let (channels, groups) = destinations();
    let dispatcher = QuizDispatcher::new(store.clone(), channels, groups);
    let sender = FakeSender::default();

    store.write().await.add_category("rust").unwrap();
    store
        .write()
        .await
        .add_question(
            "rust",
            "Which keyword declares an immutable binding?",
            ["let", "var", "mut"].map(String::from).to_vec(),
            "let",
            None,
        )
        .unwrap();

    let report = dispatcher.dispatch(&sender, Some("rust")).await.unwrap();
    assert_eq!(report.category, "rust");
    assert_eq!(report.poll.title(), "[Rust] Which keyword declares an immutable binding?");
    assert_eq!(report.poll.correct_index(), 0);
}
