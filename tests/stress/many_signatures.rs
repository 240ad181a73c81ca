//! Stress test: many messages signed and verified, sequentially and from
//! parallel tasks sharing one key store.

use std::sync::Arc;

use serde_json::json;

use agentic_wallet::{KeyStore, Message, SignatureEnvelope};

#[tokio::test]
async fn stress_1000_sequential_sign_verify() {
    let store = Arc::new(KeyStore::new());
    let verkey = store.create_key(None).await;
    let envelope = SignatureEnvelope::new(store);

    for i in 0..1000 {
        let message = Message::from_value(json!({
            "@type": "T",
            "@id": format!("m-{i}"),
            "content": {"seq": i, "text": format!("operation {i}")},
        }))
        .unwrap();

        let signed = envelope
            .sign(&message, "content", verkey.as_str())
            .await
            .expect("signing should succeed");
        let opened = envelope
            .verify(&signed, "content")
            .await
            .expect("verification should succeed");
        assert_eq!(opened, message, "message {i} should round-trip");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_parallel_signers_share_store() {
    let store = Arc::new(KeyStore::new());
    let mut verkeys = Vec::new();
    for _ in 0..8 {
        verkeys.push(store.create_key(None).await);
    }
    let envelope = Arc::new(SignatureEnvelope::new(store.clone()));
    assert_eq!(store.verkeys().await.len(), 8);

    let mut handles = Vec::new();
    for (task, verkey) in verkeys.into_iter().enumerate() {
        let envelope = envelope.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..100 {
                let message = Message::from_value(json!({
                    "@type": "T",
                    "@id": format!("{task}-{i}"),
                    "content": [task, i],
                }))
                .unwrap();
                let signed = envelope
                    .sign(&message, "content", verkey.as_str())
                    .await
                    .expect("signing should succeed");
                let opened = envelope
                    .verify(&signed, "content")
                    .await
                    .expect("verification should succeed");
                assert_eq!(opened, message);
            }
        }));
    }
    for handle in handles {
        handle.await.expect("task should not panic");
    }
}
