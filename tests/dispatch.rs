use std::time::Duration;

use async_trait::async_trait;
use canopy_store::module::{Action, ActionFuture, HandlerError, ModuleDef};
use canopy_store::store::{Store, StoreError};
use futures_util::FutureExt;
use serde_json::{json, Value};

mod common;
use common::*;

/// Action that records a label through a commit, optionally after
/// suspending first.
#[derive(Debug, Clone)]
struct RecordLabel {
    label: &'static str,
    delay: Option<Duration>,
}

#[async_trait]
impl Action for RecordLabel {
    async fn run(&self, store: Store, _args: Vec<Value>) -> Result<(), HandlerError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        store.commit("record", &[json!(self.label)])?;
        Ok(())
    }
}

fn record_options() -> ModuleDef {
    ModuleDef::new()
        .with_state(json!({"log": []}))
        .with_mutation("record", |state: &mut Value, args: &[Value]| {
            let label = args
                .first()
                .cloned()
                .ok_or_else(|| HandlerError::message("record needs a label"))?;
            state["log"]
                .as_array_mut()
                .ok_or_else(|| HandlerError::message("root log is not an array"))?
                .push(label);
            Ok(())
        })
}

#[tokio::test]
async fn action_observes_its_commit_immediately() {
    let options = counter_options().with_action(
        "inc_async",
        |store: Store, args: Vec<Value>| -> ActionFuture {
            async move {
                store.commit("inc", &args)?;
                // Synchronous read-after-write consistency for mutations.
                assert_eq!(store.snapshot()["count"], json!(2));
                Ok(())
            }
            .boxed()
        },
    );
    let store = Store::new(options).unwrap();

    store
        .dispatch("inc_async", vec![json!(2)])
        .unwrap()
        .join()
        .await
        .unwrap();
    assert_eq!(store.snapshot()["count"], json!(2));
}

#[tokio::test]
async fn same_name_actions_from_two_modules_both_run_once() {
    let options = record_options()
        .with_action(
            "ping",
            RecordLabel {
                label: "root",
                delay: None,
            },
        )
        .with_module(
            "a",
            ModuleDef::new().with_action(
                "ping",
                RecordLabel {
                    label: "a",
                    delay: None,
                },
            ),
        );
    let store = Store::new(options).unwrap();

    let handle = store.dispatch("ping", vec![]).unwrap();
    assert_eq!(handle.len(), 2);
    handle.join().await.unwrap();

    let snapshot = store.snapshot();
    let mut log: Vec<&str> = snapshot["log"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    log.sort_unstable();
    assert_eq!(log, vec!["a", "root"]);
}

#[tokio::test]
async fn dispatch_of_undeclared_name_fails() {
    let store = Store::new(record_options()).unwrap();
    let err = store.dispatch("missing", vec![]).unwrap_err();
    assert!(matches!(err, StoreError::UnknownAction(name) if name == "missing"));
}

#[tokio::test]
async fn dispatch_returns_before_suspended_handlers_commit() {
    let options = record_options().with_action(
        "slow_record",
        RecordLabel {
            label: "late",
            delay: Some(Duration::from_millis(50)),
        },
    );
    let store = Store::new(options).unwrap();

    let handle = store.dispatch("slow_record", vec![]).unwrap();
    // The handler is suspended; nothing has been committed yet.
    assert_eq!(store.snapshot()["log"], json!([]));

    handle.join().await.unwrap();
    assert_eq!(store.snapshot()["log"], json!(["late"]));
}

#[tokio::test]
async fn dropping_the_handle_detaches_but_does_not_cancel() {
    let options = record_options().with_action(
        "detached",
        RecordLabel {
            label: "survived",
            delay: Some(Duration::from_millis(10)),
        },
    );
    let store = Store::new(options).unwrap();

    drop(store.dispatch("detached", vec![]).unwrap());

    for _ in 0..200 {
        if store.snapshot()["log"] == json!(["survived"]) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("detached action never committed");
}

#[tokio::test]
async fn failing_action_surfaces_through_join() {
    let options = record_options().with_action(
        "explode",
        |_store: Store, _args: Vec<Value>| -> ActionFuture {
            async move { Err(HandlerError::message("boom")) }.boxed()
        },
    );
    let store = Store::new(options).unwrap();

    let err = store
        .dispatch("explode", vec![])
        .unwrap()
        .join()
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Action { name, .. } if name == "explode"));
}

#[tokio::test]
async fn action_can_dispatch_further_actions() {
    let options = record_options()
        .with_action(
            "leaf",
            RecordLabel {
                label: "leaf",
                delay: None,
            },
        )
        .with_action(
            "composite",
            |store: Store, _args: Vec<Value>| -> ActionFuture {
                async move {
                    store.dispatch("leaf", vec![])?.join().await?;
                    store.commit("record", &[json!("composite")])?;
                    Ok(())
                }
                .boxed()
            },
        );
    let store = Store::new(options).unwrap();

    store
        .dispatch("composite", vec![])
        .unwrap()
        .join()
        .await
        .unwrap();
    assert_eq!(store.snapshot()["log"], json!(["leaf", "composite"]));
}
