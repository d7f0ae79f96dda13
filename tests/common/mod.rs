use canopy_store::module::{HandlerError, ModuleDef};
use canopy_store::store::Store;
use serde_json::{json, Value};

/// Root options matching the canonical counter scenario: a root counter
/// with an `inc` mutation plus one nested module with a getter.
#[allow(dead_code)]
pub fn counter_options() -> ModuleDef {
    ModuleDef::new()
        .with_state(json!({"count": 0}))
        .with_mutation("inc", |state: &mut Value, args: &[Value]| {
            let n = args.first().and_then(Value::as_i64).unwrap_or(1);
            state["count"] = json!(state["count"].as_i64().unwrap_or(0) + n);
            Ok(())
        })
        .with_module(
            "a",
            ModuleDef::new()
                .with_state(json!({"x": 1}))
                .with_getter("getX", |slice: &Value| Ok(slice["x"].clone())),
        )
}

/// Mutation handler that appends `label` to the root `log` array. Used to
/// observe handler invocation order.
#[allow(dead_code)]
pub fn mark(
    label: &'static str,
) -> impl Fn(&mut Value, &[Value]) -> Result<(), HandlerError> + Send + Sync {
    move |state: &mut Value, _args: &[Value]| {
        state["log"]
            .as_array_mut()
            .ok_or_else(|| HandlerError::message("root log is not an array"))?
            .push(json!(label));
        Ok(())
    }
}

#[allow(dead_code)]
pub fn assert_log(store: &Store, expected: &[&str]) {
    let snapshot = store.snapshot();
    let log: Vec<&str> = snapshot["log"]
        .as_array()
        .expect("root log is an array")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(log, expected, "unexpected handler order");
}
