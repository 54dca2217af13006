//! Integration tests for the storage engine's concurrency machinery.
//!
//! These run on a current-thread runtime on purpose: the write pump only
//! runs at await points, which makes enqueue/drain interleavings
//! deterministic (two saves with no await between them are both buffered
//! before the pump sees either).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use savevault_backend::{FileOperations, MemoryFileOperations};
use savevault_cipher::{PassthroughCipher, XorCipher};
use savevault_engine::prelude::*;

fn must<T, E: std::fmt::Debug>(r: Result<T, E>) -> T {
    match r {
        Ok(v) => v,
        Err(e) => panic!("unexpected Err: {e:?}"),
    }
}

fn must_some<T>(option: Option<T>, message: &str) -> T {
    match option {
        Some(v) => v,
        None => panic!("must_some: {message}"),
    }
}

fn test_config(ops: Arc<MemoryFileOperations>) -> FileStorageConfig {
    FileStorageConfig {
        base_dir: PathBuf::from("save"),
        root_folder: "TestRoot".to_string(),
        encryption_key: "test-key".to_string(),
        cipher: Arc::new(PassthroughCipher),
        file_operations: ops,
        force_synchronous: false,
        error_logging: LoggingLevel::Warning,
        write_timeout: Duration::from_secs(5),
    }
}

fn key_path(key: &str) -> PathBuf {
    PathBuf::from("save/TestRoot").join(key)
}

async fn drain(_storage: &FileStorage) {
    // Let the pump run; the memory backend completes writes immediately.
    tokio::time::sleep(Duration::from_millis(20)).await;
}

mod read_your_writes {
    use super::*;

    #[tokio::test]
    async fn test_buffered_save_is_visible_before_flush() {
        let ops = Arc::new(MemoryFileOperations::new());
        let storage = must(FileStorage::initialize(test_config(Arc::clone(&ops))));

        assert!(storage.save("x.sav", &5u32).is_success());
        let loaded = storage.load_async::<u32>("x.sav").await;

        assert_eq!(loaded.read(), Some(5));
        // Served from the queue, not the backend.
        assert_eq!(ops.read_count(&key_path("x.sav")), 0);
    }

    #[tokio::test]
    async fn test_buffered_save_lands_durably() {
        let ops = Arc::new(MemoryFileOperations::new());
        let storage = must(FileStorage::initialize(test_config(Arc::clone(&ops))));

        assert!(storage.save("x.sav", &5u32).is_success());
        drain(&storage).await;

        assert_eq!(ops.write_count(&key_path("x.sav")), 1);
        assert_eq!(ops.file_text(&key_path("x.sav")).as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn test_reload_after_flush_hits_backend() {
        let ops = Arc::new(MemoryFileOperations::new());
        let storage = must(FileStorage::initialize(test_config(Arc::clone(&ops))));

        assert!(storage.save("x.sav", &5u32).is_success());
        drain(&storage).await;

        let loaded = storage.load_async::<u32>("x.sav").await;
        assert_eq!(loaded.read(), Some(5));
        assert_eq!(ops.read_count(&key_path("x.sav")), 1);
    }
}

mod single_flight {
    use super::*;

    #[tokio::test]
    async fn test_concurrent_loads_share_one_backend_read() {
        let ops = Arc::new(
            MemoryFileOperations::new().with_read_delay(Duration::from_millis(10)),
        );
        must(ops.write_all_bytes(&key_path("x.sav"), b"7"));

        let storage = must(FileStorage::initialize(test_config(Arc::clone(&ops))));

        let (a, b, c) = tokio::join!(
            storage.load_async::<u32>("x.sav"),
            storage.load_async::<u32>("x.sav"),
            storage.load_async::<u32>("x.sav")
        );

        assert_eq!(a.read(), Some(7));
        assert_eq!(b.read(), Some(7));
        assert_eq!(c.read(), Some(7));
        assert_eq!(ops.read_count(&key_path("x.sav")), 1);
    }

    #[tokio::test]
    async fn test_pending_read_is_force_completed_by_write() {
        let ops = Arc::new(
            MemoryFileOperations::new().with_read_delay(Duration::from_secs(30)),
        );
        must(ops.write_all_bytes(&key_path("x.sav"), b"1"));

        let storage = must(FileStorage::initialize(test_config(Arc::clone(&ops))));

        let (loaded, ()) = tokio::join!(storage.load_async::<u32>("x.sav"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(storage.save("x.sav", &9u32).is_success());
        });

        // The reader saw the written payload without waiting out the slow
        // backend read.
        assert_eq!(loaded.read(), Some(9));
    }
}

mod coalescing {
    use super::*;

    #[tokio::test]
    async fn test_two_saves_one_backend_write_last_wins() {
        let ops = Arc::new(MemoryFileOperations::new());
        let storage = must(FileStorage::initialize(test_config(Arc::clone(&ops))));

        assert!(storage.save("x.sav", &1u32).is_success());
        assert!(storage.save("x.sav", &2u32).is_success());
        drain(&storage).await;

        assert_eq!(ops.write_count(&key_path("x.sav")), 1);
        assert_eq!(ops.file_text(&key_path("x.sav")).as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_distinct_keys_flush_in_order() {
        let ops = Arc::new(MemoryFileOperations::new());
        let storage = must(FileStorage::initialize(test_config(Arc::clone(&ops))));

        assert!(storage.save("a.sav", &1u32).is_success());
        assert!(storage.save("b.sav", &2u32).is_success());
        assert!(storage.save("a.sav", &3u32).is_success());
        drain(&storage).await;

        assert_eq!(ops.write_count(&key_path("a.sav")), 1);
        assert_eq!(ops.write_count(&key_path("b.sav")), 1);
        assert_eq!(ops.file_text(&key_path("a.sav")).as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_reenqueue_while_active_serves_newest_to_reads() {
        let ops = Arc::new(
            MemoryFileOperations::new().with_write_delay(Duration::from_millis(50)),
        );
        let storage = must(FileStorage::initialize(test_config(Arc::clone(&ops))));

        assert!(storage.save("x.sav", &1u32).is_success());
        // Let the pump take payload 1 as the active write.
        tokio::task::yield_now().await;
        assert!(storage.save("x.sav", &2u32).is_success());

        let loaded = storage.load_async::<u32>("x.sav").await;
        assert_eq!(loaded.read(), Some(2));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(ops.file_text(&key_path("x.sav")).as_deref(), Some("2"));
    }
}

mod shutdown {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_drains_every_buffered_write() {
        let ops = Arc::new(MemoryFileOperations::new());
        ops.pause_async_writes();
        let storage = must(FileStorage::initialize(test_config(Arc::clone(&ops))));

        assert!(storage.save("a.sav", &1u32).is_success());
        assert!(storage.save("b.sav", &2u32).is_success());
        assert!(storage.save("c.sav", &3u32).is_success());
        assert!(storage.save("b.sav", &4u32).is_success());

        storage.shutdown(ShutdownArgs::default());

        assert_eq!(ops.file_text(&key_path("a.sav")).as_deref(), Some("1"));
        assert_eq!(ops.file_text(&key_path("b.sav")).as_deref(), Some("4"));
        assert_eq!(ops.file_text(&key_path("c.sav")).as_deref(), Some("3"));
        assert_eq!(ops.write_count(&key_path("b.sav")), 1);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_in_flight_write_and_rewrites_it() {
        let ops = Arc::new(
            MemoryFileOperations::new().with_write_delay(Duration::from_secs(30)),
        );
        let storage = must(FileStorage::initialize(test_config(Arc::clone(&ops))));

        assert!(storage.save("x.sav", &5u32).is_success());
        // The pump takes the buffer and blocks inside the slow backend.
        tokio::task::yield_now().await;

        storage.shutdown_async(ShutdownArgs::synchronous()).await;

        assert_eq!(ops.file_text(&key_path("x.sav")).as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn test_shutdown_completes_pending_reads() {
        let ops = Arc::new(
            MemoryFileOperations::new().with_read_delay(Duration::from_secs(30)),
        );
        must(ops.write_all_bytes(&key_path("x.sav"), b"7"));
        let storage = must(FileStorage::initialize(test_config(Arc::clone(&ops))));

        let (loaded, ()) = tokio::join!(storage.load_async::<u32>("x.sav"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            storage.shutdown(ShutdownArgs::default());
        });

        // Resolved by the shutdown's final synchronous read.
        assert_eq!(loaded.read(), Some(7));
    }
}

mod timeouts {
    use super::*;

    fn short_timeout_config(ops: Arc<MemoryFileOperations>) -> FileStorageConfig {
        FileStorageConfig {
            write_timeout: Duration::from_millis(50),
            ..test_config(ops)
        }
    }

    #[tokio::test]
    async fn test_timed_out_write_parks_and_pump_resumes() {
        let ops = Arc::new(MemoryFileOperations::new());
        ops.pause_async_writes();
        let storage = must(FileStorage::initialize(short_timeout_config(Arc::clone(&ops))));

        assert!(storage.save("x.sav", &1u32).is_success());
        tokio::time::sleep(Duration::from_millis(150)).await;

        // The write never landed but the payload is still served from
        // memory.
        assert_eq!(ops.write_count(&key_path("x.sav")), 0);
        let loaded = storage.load_async::<u32>("x.sav").await;
        assert_eq!(loaded.read(), Some(1));

        // The pump is not wedged: an unrelated key still flushes once the
        // backend recovers.
        ops.resume_async_writes();
        assert!(storage.save("y.sav", &2u32).is_success());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ops.file_text(&key_path("y.sav")).as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_parked_payload_is_persisted_by_shutdown() {
        let ops = Arc::new(MemoryFileOperations::new());
        ops.pause_async_writes();
        let storage = must(FileStorage::initialize(short_timeout_config(Arc::clone(&ops))));

        assert!(storage.save("x.sav", &1u32).is_success());
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(ops.write_count(&key_path("x.sav")), 0);

        storage.shutdown(ShutdownArgs::default());
        assert_eq!(ops.file_text(&key_path("x.sav")).as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_newer_save_supersedes_parked_payload() {
        let ops = Arc::new(MemoryFileOperations::new());
        ops.pause_async_writes();
        let storage = must(FileStorage::initialize(short_timeout_config(Arc::clone(&ops))));

        assert!(storage.save("x.sav", &1u32).is_success());
        tokio::time::sleep(Duration::from_millis(150)).await;

        ops.resume_async_writes();
        assert!(storage.save("x.sav", &2u32).is_success());
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(ops.file_text(&key_path("x.sav")).as_deref(), Some("2"));

        storage.shutdown(ShutdownArgs::default());
        // The parked payload 1 was superseded; 2 is not overwritten back.
        assert_eq!(ops.file_text(&key_path("x.sav")).as_deref(), Some("2"));
    }
}

mod synchronous_mode {
    use super::*;

    #[tokio::test]
    async fn test_saves_bypass_the_queue() {
        let ops = Arc::new(MemoryFileOperations::new());
        let config = FileStorageConfig {
            force_synchronous: true,
            ..test_config(Arc::clone(&ops))
        };
        let storage = must(FileStorage::initialize(config));

        assert!(storage.save("x.sav", &5u32).is_success());
        // No pump involved; the write already landed.
        assert_eq!(ops.write_count(&key_path("x.sav")), 1);

        let loaded = storage.load_async::<u32>("x.sav").await;
        assert_eq!(loaded.read(), Some(5));
    }
}

mod encryption {
    use super::*;

    #[tokio::test]
    async fn test_disk_holds_ciphertext_and_engine_round_trips() {
        let ops = Arc::new(MemoryFileOperations::new());
        let config = FileStorageConfig {
            cipher: Arc::new(XorCipher),
            ..test_config(Arc::clone(&ops))
        };
        let storage = must(FileStorage::initialize(config));

        assert!(storage.save("x.sav", &1234u32).is_success());
        drain(&storage).await;

        let on_disk = must_some(ops.file(&key_path("x.sav")), "file should exist");
        assert_ne!(on_disk, b"1234".to_vec());

        storage.shutdown(ShutdownArgs::default());

        // A fresh engine over the same backend decrypts what the first
        // one wrote.
        let config = FileStorageConfig {
            cipher: Arc::new(XorCipher),
            ..test_config(Arc::clone(&ops))
        };
        let restarted = must(FileStorage::initialize(config));
        let loaded = restarted.load_async::<u32>("x.sav").await;
        assert_eq!(loaded.read(), Some(1234));
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_invalid_not_error() {
        let ops = Arc::new(MemoryFileOperations::new());
        let storage = must(FileStorage::initialize(test_config(ops)));

        let loaded = storage.load_async::<u32>("missing.sav").await;
        assert!(!loaded.is_valid());
        assert!(loaded.error().is_none());
        assert_eq!(loaded.read_or_default(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_payload_carries_error() {
        let ops = Arc::new(MemoryFileOperations::new());
        must(ops.write_all_bytes(&key_path("x.sav"), b"not json"));
        let storage = must(FileStorage::initialize(test_config(ops)));

        let loaded = storage.load_async::<u32>("x.sav").await;
        assert!(!loaded.is_valid());
        assert!(loaded.error().is_some());
    }

    #[tokio::test]
    async fn test_delete_discards_pending_write() {
        let ops = Arc::new(MemoryFileOperations::new());
        let storage = must(FileStorage::initialize(test_config(Arc::clone(&ops))));

        assert!(storage.save("x.sav", &5u32).is_success());
        storage.delete("x.sav");
        drain(&storage).await;

        assert!(!ops.contains(&key_path("x.sav")));
        let loaded = storage.load_async::<u32>("x.sav").await;
        assert!(!loaded.is_valid());
    }
}
