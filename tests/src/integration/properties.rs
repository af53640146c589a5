//! # Core Store Properties
//!
//! Commit and dispatch semantics, namespacing, getters and strict mode.

#[cfg(test)]
mod tests {
    use crate::fixtures::{count, counter, dev_store, errors, strict_store};
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use statehouse_core::{RawModule, Request, StoreError};
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::Arc;

    // =========================================================================
    // COMMIT
    // =========================================================================

    #[test]
    fn test_commit_increment_by_payload() {
        let store = dev_store(counter());
        store.commit(("increment", json!(5)));
        assert_eq!(count(&store), json!(5));
    }

    #[test]
    fn test_object_style_commit_resolves_type_field() {
        let store = dev_store(counter());
        store.commit(Request::object(json!({"type": "increment"})));
        assert_eq!(count(&store), json!(1));

        store.commit(Request::object(json!({"payload": 3})));
        assert_eq!(count(&store), json!(1));
        assert_eq!(errors(&store), vec![StoreError::MissingType]);
    }

    #[test]
    fn test_same_type_handlers_run_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (first, second) = (order.clone(), order.clone());
        let store = dev_store(
            RawModule::new()
                .mutation("add", move |_, _| first.lock().push("root"))
                .module(
                    "plain",
                    RawModule::new().mutation("add", move |_, _| second.lock().push("plain")),
                ),
        );

        store.commit("add");
        assert_eq!(*order.lock(), vec!["root", "plain"]);
    }

    #[test]
    fn test_unknown_mutation_is_a_reported_no_op() {
        let store = dev_store(counter());
        store.commit("nope");
        assert_eq!(count(&store), json!(0));
        assert_eq!(errors(&store), vec![StoreError::UnknownMutation("nope".into())]);
    }

    #[test]
    fn test_mutation_panic_reaches_caller_and_closes_window() {
        let store = dev_store(counter().mutation("boom", |_, _| panic!("boom")));

        let outcome = catch_unwind(AssertUnwindSafe(|| store.commit("boom")));
        assert!(outcome.is_err());
        assert!(!store.is_committing());

        store.commit("increment");
        assert_eq!(count(&store), json!(1));
    }

    // =========================================================================
    // NAMESPACES AND GETTERS
    // =========================================================================

    #[test]
    fn test_namespaced_getter_doubles_module_state() {
        let store = dev_store(
            RawModule::new().module(
                "a",
                RawModule::new()
                    .namespaced(true)
                    .state(json!({"value": 3}))
                    .getter("double", |ctx| json!(ctx.state["value"].as_i64().unwrap_or(0) * 2)),
            ),
        );
        assert_eq!(store.getter("a/double"), Some(json!(6)));
        assert_eq!(store.getters().keys().collect::<Vec<_>>(), vec!["a/double"]);
    }

    #[test]
    fn test_local_commit_stays_in_own_namespace() {
        let store = dev_store(
            RawModule::new()
                .module(
                    "cart",
                    RawModule::new()
                        .namespaced(true)
                        .state(json!({"items": 0}))
                        .mutation("add", |state, _| {
                            state["items"] = json!(state["items"].as_i64().unwrap_or(0) + 1)
                        }),
                )
                .module("other", RawModule::new().namespaced(true).state(json!({}))),
        );

        store.commit("cart/add");
        assert_eq!(store.state()["cart"]["items"], json!(1));

        let other = store.module_context("other/").unwrap();
        other.commit("add");
        assert_eq!(store.state()["cart"]["items"], json!(1));
        assert_eq!(
            errors(&store),
            vec![StoreError::UnknownLocalMutation {
                local: "add".into(),
                global: "other/add".into(),
            }]
        );
    }

    #[test]
    fn test_getters_follow_commits() {
        let store = dev_store(
            counter().getter("tripled", |ctx| json!(ctx.state["count"].as_i64().unwrap_or(0) * 3)),
        );
        assert_eq!(store.getter("tripled"), Some(json!(0)));
        store.commit(("increment", json!(2)));
        assert_eq!(store.getter("tripled"), Some(json!(6)));
        assert_eq!(store.getter("missing"), None);
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    #[tokio::test]
    async fn test_dispatch_resolves_plain_return_value() {
        let store = dev_store(RawModule::new().action("answer", |_, _| json!(42)));
        assert_eq!(store.dispatch("answer").await.unwrap(), json!(42));
    }

    #[tokio::test]
    async fn test_async_action_commits_loaded_value() {
        async fn load() -> Value {
            tokio::task::yield_now().await;
            json!("X")
        }

        let store = dev_store(
            RawModule::new()
                .state(json!({"item": null}))
                .mutation("set", |state, payload| state["item"] = payload.clone())
                .async_action("fetch_item", |ctx, _| async move {
                    ctx.commit(("set", load().await));
                    Ok(json!("done"))
                }),
        );

        assert_eq!(store.dispatch("fetch_item").await.unwrap(), json!("done"));
        assert_eq!(store.state()["item"], json!("X"));
    }

    #[tokio::test]
    async fn test_unknown_action_resolves_null() {
        let store = dev_store(RawModule::new());
        assert_eq!(store.dispatch("nope").await.unwrap(), Value::Null);
        assert_eq!(errors(&store), vec![StoreError::UnknownAction("nope".into())]);
    }

    #[tokio::test]
    async fn test_failing_action_rejects_dispatch() {
        let store = dev_store(RawModule::new().async_action("fail", |_, _| async {
            Err::<Value, _>(anyhow::anyhow!("backend down"))
        }));
        let err = store.dispatch("fail").await.unwrap_err();
        assert_eq!(err.to_string(), "backend down");
    }

    // =========================================================================
    // STRICT MODE
    // =========================================================================

    #[test]
    fn test_strict_mode_warns_once_per_outside_write() {
        let store = strict_store(counter());
        store.commit("increment");
        assert!(errors(&store).is_empty());

        store.view().mutate(|state| state["count"] = json!(100));
        assert_eq!(errors(&store), vec![StoreError::StrictModeViolation]);
    }

    #[test]
    fn test_replace_state_is_not_a_violation() {
        let store = strict_store(counter());
        store.replace_state(json!({"count": 7}));
        assert_eq!(count(&store), json!(7));
        assert!(errors(&store).is_empty());
    }
}
