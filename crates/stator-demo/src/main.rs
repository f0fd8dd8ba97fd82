//! Order-processing wiring example for the Stator engine.
//!
//! Builds an in-memory repository, wires an order machine whose payment
//! hook flakes on the first call, and walks the order through its
//! lifecycle: retried processing, finalization, and a rejected
//! re-processing attempt.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use stator_core::fsm::hooks::UnknownStateResolver;
use stator_core::fsm::machine::StateMachine;
use stator_core::fsm::options::{TransitionOptions, fixed_backoff};
use stator_core::repository::entity::EntityRepository;
use stator_infra::memory::InMemoryEntityRepository;
use stator_types::callback::CallbackResult;
use stator_types::metadata::Metadata;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,stator_core=debug")),
        )
        .with_target(false)
        .init();

    let repo = Arc::new(InMemoryEntityRepository::new());

    // Unknown-state handler parks the order in "error" for manual review.
    let resolver: UnknownStateResolver = Arc::new(|current, condition, _args| {
        tracing::warn!(current, condition, "unknown state detected, parking order in 'error'");
        "error".to_string()
    });

    let order_id = format!("order-{}", Uuid::now_v7());
    let machine = StateMachine::new(&order_id, "created", Arc::clone(&repo), Some(resolver));

    machine.add_transition("created", "processing", "process").await;
    machine.add_transition("processing", "done", "final").await;
    machine.add_transition("error", "created", "reset").await;

    // Payment gateway flakes on the first call and succeeds on the second.
    let gateway_calls = Arc::new(AtomicU32::new(0));
    let calls = Arc::clone(&gateway_calls);
    machine
        .register_before("process", move |_, _, _, args| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return CallbackResult::failure("payment gateway timeout");
            }
            CallbackResult::success().with_metadata(Metadata::from([
                ("gateway".to_string(), json!("acme-pay")),
                ("charged".to_string(), args["amount"].clone()),
            ]))
        })
        .await;

    machine
        .register_after("final", |_, _, _, _| {
            CallbackResult::success()
                .with_metadata(Metadata::from([("receipt_sent".to_string(), json!(true))]))
        })
        .await;

    let cancel = CancellationToken::new();

    machine
        .transition(
            &cancel,
            "process",
            json!({
                "order_id": order_id,
                "amount": 234.65,
                "customer": "john doe",
            }),
            TransitionOptions::new()
                .with_max_retries(2)
                .with_backoff(fixed_backoff(Duration::from_millis(200))),
        )
        .await?;
    tracing::info!(state = %machine.current().await, "order processed after retry");

    machine
        .transition(&cancel, "final", json!({}), TransitionOptions::default())
        .await?;
    tracing::info!(state = %machine.current().await, "order finalized");

    // No edge leaves "done" on "process": a configuration error, rejected
    // without touching the committed state.
    if let Err(err) = machine
        .transition(&cancel, "process", json!({}), TransitionOptions::default())
        .await
    {
        tracing::info!(error = %err, "re-processing a finished order is rejected");
    }

    let record = repo.load(&order_id).await?;
    println!("final state: {}", record.state);
    println!("metadata: {}", serde_json::to_string_pretty(&record.metadata)?);

    Ok(())
}
