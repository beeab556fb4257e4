mod harness;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use instance_sync::adapter::outbound::memory::MemoryInstanceStore;
use instance_sync::domain::{Phase, TaskId};
use instance_sync::error::Error;
use instance_sync::infrastructure::config::settings::Config;
use instance_sync::infrastructure::runtime::run_with;
use instance_sync::port::outbound::store::InstanceStore;
use instance_sync::port::outbound::stream::RawMessage;
use instance_sync::testkit::envelope;
use instance_sync::testkit::stream::channel_stream;

use harness::temp_db::TempDb;

const CONFIG: &str = r#"
[bus]
brokers = ["ws://127.0.0.1:9/stream"]
consumer_group = "sync-test"
topic = "containers"
"#;

fn message(payload: String) -> RawMessage {
    RawMessage::new("containers", payload.into_bytes())
}

#[tokio::test]
async fn consumes_until_stream_closes() {
    let config = Config::parse_toml(CONFIG).unwrap();
    let store = Arc::new(MemoryInstanceStore::new());
    let (stream, handle) = channel_stream(16);
    let (_tx, rx) = watch::channel(false);

    handle.send(message(envelope::container("c1", "t1", "Starting"))).await;
    handle.send(message("{broken".into())).await;
    handle.send(message(envelope::container("c1", "t1", "Healthy"))).await;
    handle.send(message(envelope::container("c2", "t2", "Stopped"))).await;
    handle.close().await;

    let result = run_with(&config, stream, Arc::clone(&store), rx).await;

    assert!(matches!(result, Err(Error::Connection(_))));
    assert_eq!(
        handle.subscription(),
        Some(("containers".to_string(), "sync-test".to_string()))
    );
    let records = store.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].phase, Phase::Healthy);
    assert_eq!(records[1].phase, Phase::Dead);
}

#[tokio::test]
async fn shutdown_signal_ends_run_cleanly() {
    let config = Config::parse_toml(CONFIG).unwrap();
    let db = TempDb::create("runtime-shutdown");
    let store = db.store();
    let (stream, handle) = channel_stream(16);
    let (tx, rx) = watch::channel(false);

    let runner = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { run_with(&config, stream, store, rx).await })
    };

    handle.send(message(envelope::container("c1", "t1", "Starting"))).await;
    for _ in 0..50 {
        if !store.find_by_task(&TaskId::new("t1")).await.unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tx.send(true).unwrap();

    let result = runner.await.unwrap();
    assert!(result.is_ok());
    assert_eq!(handle.subscribe_count(), 1);
    let records = store.find_by_task(&TaskId::new("t1")).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].phase, Phase::Running);
}
