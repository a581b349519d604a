//! Coordinator Module Tests
//!
//! Covers the per-job completion barrier under concurrent result reports,
//! result intake for unknown jobs, the bounded dispatch retry, and the full
//! job pipeline against real worker and coordinator servers on local ports.

#[cfg(test)]
mod tests {
    use crate::admission::policy::SchedulerPolicy;
    use crate::config::Settings;
    use crate::coordinator::handlers::{handle_report_result, handle_run_job};
    use crate::coordinator::job::{JobContext, JobId};
    use crate::coordinator::protocol::{ENDPOINT_REPORT_RESULT, ENDPOINT_RUN_JOB};
    use crate::coordinator::service::CoordinatorService;
    use crate::scoring::vocabulary::Vocabulary;
    use crate::worker::handlers::{handle_aggregate, handle_submit_task};
    use crate::worker::protocol::{ENDPOINT_AGGREGATE, ENDPOINT_SUBMIT_TASK};
    use crate::worker::service::WorkerService;

    use axum::routing::post;
    use axum::{Extension, Router};
    use std::future::IntoFuture;
    use std::net::SocketAddr;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    // ============================================================
    // COMPLETION BARRIER
    // ============================================================

    #[tokio::test]
    async fn test_barrier_zero_tasks_completes_immediately() {
        let (context, done) = JobContext::new(0);

        let results = done.await.unwrap();
        assert!(results.is_empty());
        assert_eq!(context.completed(), 0);
    }

    #[tokio::test]
    async fn test_barrier_releases_after_last_report() {
        let (context, done) = JobContext::new(3);

        assert!(context.record("r1".to_string()).is_some());
        assert!(context.record("r2".to_string()).is_some());

        // Two of three reported: the barrier must still be closed.
        assert_eq!(context.completed(), 2);

        assert_eq!(context.record("r3".to_string()), Some((3, 3)));

        let results = done.await.unwrap();
        assert_eq!(results, vec!["r1", "r2", "r3"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_barrier_survives_concurrent_report_storm() {
        let (context, done) = JobContext::new(50);

        let mut handles = Vec::new();
        for i in 0..50 {
            let context = context.clone();
            handles.push(tokio::spawn(async move {
                context.record(format!("result_{}", i));
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // No missed wakeup: the waiter is released with all 50 results.
        let results = done.await.unwrap();
        assert_eq!(results.len(), 50);
        assert_eq!(context.completed(), 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_barrier_never_counts_past_total() {
        let (context, done) = JobContext::new(50);

        let mut handles = Vec::new();
        for i in 0..60 {
            let context = context.clone();
            handles.push(tokio::spawn(async move {
                context.record(format!("result_{}", i))
            }));
        }

        let mut accepted = 0;
        let mut dropped = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Some(_) => accepted += 1,
                None => dropped += 1,
            }
        }

        assert_eq!(accepted, 50);
        assert_eq!(dropped, 10);
        assert_eq!(context.completed(), 50);
        assert_eq!(done.await.unwrap().len(), 50);
    }

    // ============================================================
    // RESULT INTAKE
    // ============================================================

    #[tokio::test]
    async fn test_report_for_unknown_job_is_refused() {
        let dir = test_dir();
        let settings = cluster_settings(
            &dir,
            "127.0.0.1:1".parse().unwrap(),
            vec!["127.0.0.1:2".parse().unwrap()],
            SchedulerPolicy::Random,
        );
        let service = CoordinatorService::new(&settings);

        assert!(!service.report_result(&JobId::new(), "orphan.txt".to_string()));

        std::fs::remove_dir_all(&dir).ok();
    }

    // ============================================================
    // DISPATCH
    // ============================================================

    #[tokio::test]
    async fn test_dispatch_gives_up_when_no_worker_is_reachable() {
        let dir = test_dir();
        // Port 1 refuses connections, so every dispatch attempt fails at the
        // transport and the retry budget must eventually surface an error.
        let settings = cluster_settings(
            &dir,
            "127.0.0.1:1".parse().unwrap(),
            vec!["127.0.0.1:1".parse().unwrap()],
            SchedulerPolicy::Random,
        );
        let service = CoordinatorService::new(&settings);

        let result = service.run_job(vec!["doc.txt".to_string()]).await;

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("No worker accepted"));

        std::fs::remove_dir_all(&dir).ok();
    }

    // ============================================================
    // END-TO-END PIPELINE
    // ============================================================

    fn test_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("coordinator_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cluster_settings(
        dir: &Path,
        coordinator_addr: SocketAddr,
        workers: Vec<SocketAddr>,
        policy: SchedulerPolicy,
    ) -> Settings {
        let load_probabilities = vec![0.0; workers.len()];
        Settings {
            coordinator_addr,
            workers,
            sort_node_index: 0,
            scheduler_policy: policy,
            load_probabilities,
            load_delay_ms: 0,
            max_concurrent_tasks: 16,
            input_path: dir.join("input"),
            intermediate_path: dir.join("intermediate"),
            output_path: dir.join("output"),
            vocab_positive: dir.join("positive.txt"),
            vocab_negative: dir.join("negative.txt"),
        }
    }

    /// Boots one worker and one coordinator on ephemeral ports and returns
    /// the shared coordinator service handle.
    async fn start_cluster(dir: &Path) -> Arc<CoordinatorService> {
        let coordinator_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let coordinator_addr = coordinator_listener.local_addr().unwrap();
        let worker_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let worker_addr = worker_listener.local_addr().unwrap();

        let settings = cluster_settings(
            dir,
            coordinator_addr,
            vec![worker_addr],
            SchedulerPolicy::Random,
        );

        std::fs::write(&settings.vocab_positive, "good\n").unwrap();
        std::fs::write(&settings.vocab_negative, "bad\n").unwrap();
        let vocab =
            Arc::new(Vocabulary::load(&settings.vocab_positive, &settings.vocab_negative).unwrap());

        let worker_service = WorkerService::new(&settings, 0, vocab).unwrap();
        let worker_app = Router::new()
            .route(ENDPOINT_SUBMIT_TASK, post(handle_submit_task))
            .route(ENDPOINT_AGGREGATE, post(handle_aggregate))
            .layer(Extension(worker_service));
        tokio::spawn(axum::serve(worker_listener, worker_app).into_future());

        let coordinator_service = CoordinatorService::new(&settings);
        let coordinator_app = Router::new()
            .route(ENDPOINT_RUN_JOB, post(handle_run_job))
            .route(ENDPOINT_REPORT_RESULT, post(handle_report_result))
            .layer(Extension(coordinator_service.clone()));
        tokio::spawn(axum::serve(coordinator_listener, coordinator_app).into_future());

        coordinator_service
    }

    fn write_document(dir: &Path, name: &str, content: &str) -> String {
        let input_dir = dir.join("input");
        std::fs::create_dir_all(&input_dir).unwrap();
        let path = input_dir.join(name);
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_job_runs_end_to_end_on_a_single_worker() {
        let dir = test_dir();
        let coordinator = start_cluster(&dir).await;

        let documents = vec![
            write_document(&dir, "praise.txt", "good good good"),
            write_document(&dir, "rant.txt", "bad bad"),
            write_document(&dir, "plain.txt", "nothing to see here"),
        ];

        let summary = coordinator.run_job(documents.clone()).await.unwrap();

        assert_eq!(summary.completed, 3);
        assert!(!summary.output_location.is_empty());

        let output = std::fs::read_to_string(&summary.output_location).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);

        // Ranked descending: praise (1.0), plain (0.0), rant (-1.0).
        assert!(lines[0].starts_with(&documents[0]));
        assert!(lines[0].ends_with("1.000000"));
        assert!(lines[1].starts_with(&documents[2]));
        assert!(lines[1].ends_with("0.000000"));
        assert!(lines[2].starts_with(&documents[1]));
        assert!(lines[2].ends_with("-1.000000"));

        // Trailing timing line appended by the coordinator.
        assert!(lines[3].starts_with("Total Time Taken: "));
        assert!(lines[3].ends_with(" ms."));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_jobs_do_not_share_counters() {
        let dir = test_dir();
        let coordinator = start_cluster(&dir).await;

        let first = vec![
            write_document(&dir, "a.txt", "good"),
            write_document(&dir, "b.txt", "bad"),
        ];
        let second = vec![
            write_document(&dir, "c.txt", "good bad"),
            write_document(&dir, "d.txt", "good good"),
            write_document(&dir, "e.txt", "bad bad bad"),
        ];

        let (first, second) = tokio::join!(
            coordinator.run_job(first),
            coordinator.run_job(second)
        );

        let first = first.unwrap();
        let second = second.unwrap();

        assert_eq!(first.completed, 2);
        assert_eq!(second.completed, 3);

        let first_output = std::fs::read_to_string(&first.output_location).unwrap();
        let second_output = std::fs::read_to_string(&second.output_location).unwrap();
        assert_eq!(first_output.lines().count(), 3);
        assert_eq!(second_output.lines().count(), 4);

        std::fs::remove_dir_all(&dir).ok();
    }
}
