use std::collections::VecDeque;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use async_trait::async_trait;

use altwatch_lib::correlation::{ConfidenceThresholds, ConfidenceTier, CorrelationScanner};
use altwatch_lib::db::Database;
use altwatch_lib::feed::{FeedError, OnlineCharacter, SnapshotFeed};
use altwatch_lib::presence::{PresencePoller, TASK_NAME};
use altwatch_lib::scheduler::{Scheduler, TaskState};

/// Serves scripted rosters in order, then keeps repeating the last one.
#[derive(Clone, Default)]
struct ScriptedFeed {
    script: Arc<Mutex<VecDeque<Option<Vec<&'static str>>>>>,
    last: Arc<Mutex<Vec<&'static str>>>,
    served: Arc<AtomicUsize>,
}

impl ScriptedFeed {
    fn new(script: Vec<Option<Vec<&'static str>>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            ..Self::default()
        }
    }

    fn served(&self) -> usize {
        self.served.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotFeed for ScriptedFeed {
    async fn fetch_online(&self) -> Result<Vec<OnlineCharacter>, FeedError> {
        self.served.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        let names = match next {
            Some(Some(names)) => {
                *self.last.lock().unwrap() = names.clone();
                names
            }
            Some(None) => return Err(FeedError::Status(502)),
            None => self.last.lock().unwrap().clone(),
        };
        Ok(names
            .into_iter()
            .map(|name| OnlineCharacter::new(name, 120, "Paladin", "SE"))
            .collect())
    }
}

async fn wait_for_polls(feed: &ScriptedFeed, polls: usize) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while feed.served() < polls {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("poller stalled");
}

#[tokio::test]
async fn tracked_sessions_feed_the_scan_and_close_on_stop() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("data").join("altwatch.sqlite3")).unwrap();

    let feed = ScriptedFeed::new(vec![
        Some(vec!["Alpha", "Beta"]),
        None,
        Some(vec!["Alpha", "Beta"]),
        Some(vec!["Beta", "Gamma"]),
    ]);

    let mut scheduler = Scheduler::new();
    scheduler
        .register(Box::new(PresencePoller::new(
            feed.clone(),
            db.clone(),
            Duration::from_millis(20),
        )))
        .unwrap();
    scheduler.start().unwrap();

    wait_for_polls(&feed, 7).await;
    assert_eq!(db.count_open_sessions().await.unwrap(), 2);

    scheduler.stop().await.unwrap();
    assert_eq!(
        scheduler.task_states(),
        vec![(TASK_NAME.to_string(), TaskState::Stopped)]
    );
    assert_eq!(db.count_open_sessions().await.unwrap(), 0);

    let alpha = db.list_sessions_by_name("Alpha").await.unwrap();
    let beta = db.list_sessions_by_name("Beta").await.unwrap();
    let gamma = db.list_sessions_by_name("Gamma").await.unwrap();
    assert_eq!(alpha.len(), 1, "the outage must not split Alpha's stay");
    assert_eq!(beta.len(), 1);
    assert_eq!(gamma.len(), 1);

    // Alpha left on the same poll that saw Gamma arrive.
    assert_eq!(alpha[0].logout_at, Some(gamma[0].login_at));
    // Everyone still online was closed at the same shutdown instant.
    assert_eq!(beta[0].logout_at, gamma[0].logout_at);

    let scanner = CorrelationScanner::new(db.clone(), ConfidenceThresholds::default());
    let matches = scanner.scan("Alpha", 60, 20).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].actor_name, "Gamma");
    assert_eq!(matches[0].adjacent_count, 1);

    assert!(scanner
        .scan_classified("Alpha", 60, 20)
        .await
        .unwrap()
        .is_empty());

    let lenient = CorrelationScanner::new(db, ConfidenceThresholds::new(1, 2, 3, 4).unwrap());
    let report = lenient.report("Gamma", 60, 20).await.unwrap();
    assert_eq!(report.bucket(ConfidenceTier::Low)[0].actor_name, "Alpha");
    assert_eq!(report.len(), 1);
}
