use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use quiz_core::time::fixed_clock;
use services::StatisticsStore;
use storage::repository::Storage;

struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new(name: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "{name}-{}-{nanos}.sqlite3",
            std::process::id()
        ));
        Self { path }
    }

    fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path.display())
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

async fn open_stats(db: &TempDb) -> StatisticsStore {
    let storage = Storage::sqlite(&db.url()).await.unwrap();
    StatisticsStore::new(fixed_clock(), storage.values)
}

#[tokio::test]
async fn statistics_survive_reconnect() {
    let db = TempDb::new("quiz-stats");

    {
        let stats = open_stats(&db).await;
        stats.store(5, 10).await;
        assert_eq!(stats.games_count().await, 1);
    }

    let reopened = open_stats(&db).await;
    assert_eq!(reopened.games_count().await, 1);
    let best = reopened.best_game().await;
    assert_eq!((best.correct(), best.total()), (5, 10));
    assert!((reopened.total_accuracy().await - 50.0).abs() < f64::EPSILON);

    reopened.store(7, 10).await;
    drop(reopened);

    let again = open_stats(&db).await;
    let snapshot = again.snapshot().await;
    assert_eq!(snapshot.games_count, 2);
    assert_eq!(snapshot.best_game.correct(), 7);
    assert_eq!(snapshot.total_correct, 12);
    assert_eq!(snapshot.total_questions, 20);
}
