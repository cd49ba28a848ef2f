//! Retry queue behaviour shared by both backends

use std::sync::Arc;

use roi_quiz_core::RetryContact;
use roi_quiz_persistence::{FileRetryQueue, InMemoryRetryQueue, PendingLead, RetryQueue};
use uuid::Uuid;

fn lead(n: usize) -> PendingLead {
    PendingLead::new(
        Uuid::new_v4(),
        RetryContact {
            first_name: format!("Lead{}", n),
            email: format!("lead{}@example.com", n),
            state: "Queensland (QLD)".to_string(),
            ..Default::default()
        },
    )
}

async fn exercise_fifo(queue: &dyn RetryQueue) {
    let leads: Vec<PendingLead> = (0..4).map(lead).collect();
    for l in &leads {
        assert!(queue.enqueue(l.clone()).await.unwrap());
    }
    // Replaying the same submission does not duplicate it
    assert!(!queue.enqueue(leads[0].clone()).await.unwrap());

    let pending = queue.pending().await.unwrap();
    let emails: Vec<_> = pending.iter().map(|l| l.contact.email.as_str()).collect();
    assert_eq!(
        emails,
        vec![
            "lead0@example.com",
            "lead1@example.com",
            "lead2@example.com",
            "lead3@example.com"
        ]
    );

    assert!(queue.remove(leads[0].id).await.unwrap());
    assert_eq!(queue.record_failure(leads[1].id, "timeout").await.unwrap(), Some(2));
    assert_eq!(queue.len().await.unwrap(), 3);

    let head = &queue.pending().await.unwrap()[0];
    assert_eq!(head.id, leads[1].id);
    assert_eq!(head.attempts, 2);
}

#[tokio::test]
async fn test_memory_queue_fifo() {
    exercise_fifo(&InMemoryRetryQueue::new()).await;
}

#[tokio::test]
async fn test_file_queue_fifo() {
    let dir = tempfile::tempdir().unwrap();
    exercise_fifo(&FileRetryQueue::new(dir.path().join("pending.json"))).await;
}

#[tokio::test]
async fn test_file_queue_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pending.json");

    let queue = FileRetryQueue::new(&path);
    let first = lead(1);
    queue.enqueue(first.clone()).await.unwrap();
    queue.enqueue(lead(2)).await.unwrap();
    drop(queue);

    let reopened = FileRetryQueue::new(&path);
    assert!(reopened.is_durable());
    let pending = reopened.pending().await.unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0], first);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_enqueues_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let queue = Arc::new(FileRetryQueue::new(dir.path().join("pending.json")));

    let handles: Vec<_> = (0..16)
        .map(|n| {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.enqueue(lead(n)).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().unwrap());
    }

    assert_eq!(queue.len().await.unwrap(), 16);
}
