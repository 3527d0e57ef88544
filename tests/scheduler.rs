use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

use notion_habitica_sync::backend::{
    BackendError, CreateTodoArgs, SourceBackend, SourceTask, TaskStatus, TrackerBackend, TrackerTask,
};
use notion_habitica_sync::backup::BackupWriter;
use notion_habitica_sync::scheduler::{self, CronSchedule};
use notion_habitica_sync::sync::{SyncOptions, SyncService};

/// Counts cycles through the one fetch every cycle makes.
#[derive(Default)]
struct CountingNotion {
    fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl SourceBackend for CountingNotion {
    async fn fetch_tasks(&self) -> Result<Vec<SourceTask>, BackendError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(vec![SourceTask {
            id: "n1".to_string(),
            name: "Buy milk".to_string(),
            priority: None,
            status: TaskStatus::ToDo,
        }])
    }

    async fn mark_done(&self, _remote_id: &str) -> Result<(), BackendError> {
        Ok(())
    }
}

#[derive(Default)]
struct EmptyHabitica {
    creates: Arc<AtomicUsize>,
}

#[async_trait]
impl TrackerBackend for EmptyHabitica {
    async fn fetch_open_tasks(&self) -> Result<Vec<TrackerTask>, BackendError> {
        Ok(Vec::new())
    }

    async fn fetch_completed_tasks(&self) -> Result<Vec<TrackerTask>, BackendError> {
        Ok(Vec::new())
    }

    async fn create_task(&self, _args: CreateTodoArgs) -> Result<(), BackendError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rename_task(&self, _remote_id: &str, _text: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn score_task(&self, _remote_id: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn delete_task(&self, _remote_id: &str) -> Result<(), BackendError> {
        Ok(())
    }
}

struct Counters {
    fetches: Arc<AtomicUsize>,
    creates: Arc<AtomicUsize>,
}

fn service() -> (SyncService, Counters) {
    let notion = CountingNotion::default();
    let habitica = EmptyHabitica::default();
    let counters = Counters {
        fetches: notion.fetches.clone(),
        creates: habitica.creates.clone(),
    };
    let service = SyncService::new(
        Arc::new(notion),
        Arc::new(habitica),
        BackupWriter::disabled(),
        SyncOptions::default(),
    );
    (service, counters)
}

/// Let spawned tasks run without moving the paused clock.
async fn settle() {
    for _ in 0..200 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_startup_cycle_then_timer_cycle() {
    let (service, counters) = service();
    let schedule = CronSchedule::parse("*/30 * * * * *").unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let handle = tokio::spawn(scheduler::run(service, schedule, true, async move {
        let _ = stopped.await;
    }));

    settle().await;
    assert_eq!(counters.fetches.load(Ordering::SeqCst), 1, "startup cycle runs before any timer");
    assert_eq!(counters.creates.load(Ordering::SeqCst), 1);

    // The next occurrence is at most 30 seconds away
    for _ in 0..60 {
        if counters.fetches.load(Ordering::SeqCst) >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        settle().await;
    }
    assert!(counters.fetches.load(Ordering::SeqCst) >= 2, "timer fired a second cycle");
    assert!(counters.creates.load(Ordering::SeqCst) >= 2);

    stop.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_no_startup_cycle_when_disabled() {
    let (service, counters) = service();
    let schedule = CronSchedule::parse("0 0 1 1 *").unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let handle = tokio::spawn(scheduler::run(service, schedule, false, async move {
        let _ = stopped.await;
    }));

    settle().await;
    assert_eq!(counters.fetches.load(Ordering::SeqCst), 0);

    stop.send(()).unwrap();
    handle.await.unwrap().unwrap();
    assert_eq!(counters.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_the_loop() {
    let (service, counters) = service();
    let schedule = CronSchedule::parse("*/30 * * * * *").unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let handle = tokio::spawn(scheduler::run(service, schedule, false, async move {
        let _ = stopped.await;
    }));

    settle().await;
    stop.send(()).unwrap();
    handle.await.unwrap().unwrap();

    // No timer is left to fire once the loop has returned
    tokio::time::sleep(Duration::from_secs(120)).await;
    settle().await;
    assert_eq!(counters.fetches.load(Ordering::SeqCst), 0);
}
