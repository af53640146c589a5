//! # Subscriptions and Watchers
//!
//! Ordering, de-duplication and isolation of mutation and action
//! subscribers, plus `watch`.

#[cfg(test)]
mod tests {
    use crate::fixtures::{counter, dev_store, errors};
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use statehouse_core::{
        Action, ActionSubscriber, Getters, Mutation, MutationSubscriber, RawModule, StoreError,
        SubscribeOptions, WatchOptions,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_same_subscriber_registers_once() {
        let store = dev_store(counter());
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let subscriber: Arc<MutationSubscriber> = Arc::new(move |_: &Mutation, _: &Value| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let first = store.subscribe(subscriber.clone());
        let second = store.subscribe(subscriber);
        store.commit("increment");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        first.unsubscribe();
        second.unsubscribe();
        store.commit("increment");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscribers_see_commits_in_order() {
        let store = dev_store(counter());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (tail, head) = (seen.clone(), seen.clone());

        let _tail = store.subscribe(Arc::new(move |m: &Mutation, state: &Value| {
            tail.lock().push(format!("tail:{}:{}", m.kind, state["count"]));
        }));
        let _head = store.subscribe_with(
            Arc::new(move |m: &Mutation, _: &Value| head.lock().push(format!("head:{}", m.kind))),
            SubscribeOptions { prepend: true },
        );

        store.commit(("increment", json!(2)));
        store.commit(("increment", json!(3)));
        assert_eq!(
            *seen.lock(),
            vec!["head:increment", "tail:increment:2", "head:increment", "tail:increment:5"]
        );
    }

    #[test]
    fn test_panicking_subscriber_is_isolated() {
        let store = dev_store(counter());
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();

        let _bad = store.subscribe(Arc::new(|_: &Mutation, _: &Value| panic!("subscriber bug")));
        let _good = store.subscribe(Arc::new(move |_: &Mutation, _: &Value| {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        store.commit("increment");
        assert_eq!(store.state()["count"], json!(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            errors(&store).as_slice(),
            [StoreError::SubscriberPanicked { phase, .. }] if phase == "mutation"
        ));
    }

    #[tokio::test]
    async fn test_action_hooks_bracket_the_handler() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let handler_events = events.clone();
        let store = dev_store(RawModule::new().async_action("load", move |_, payload| {
            let events = handler_events.clone();
            async move {
                events.lock().push("handler".to_string());
                tokio::task::yield_now().await;
                Ok(payload)
            }
        }));

        let (before, after) = (events.clone(), events.clone());
        let _hooks = store.subscribe_action(Arc::new(
            ActionSubscriber::new()
                .before(move |a: &Action, _: &Value| before.lock().push(format!("before:{}", a.kind)))
                .after(move |a: &Action, _: &Value| after.lock().push(format!("after:{}", a.payload))),
        ));

        let pending = store.dispatch(("load", json!(7)));
        assert_eq!(*events.lock(), vec!["before:load"]);

        assert_eq!(pending.await.unwrap(), json!(7));
        assert_eq!(*events.lock(), vec!["before:load", "handler", "after:7"]);
    }

    #[tokio::test]
    async fn test_error_hook_sees_rejection() {
        let store = dev_store(RawModule::new().async_action("fail", |_, _| async {
            Err::<Value, _>(anyhow::anyhow!("nope"))
        }));
        let seen = Arc::new(Mutex::new(None));
        let s = seen.clone();
        let _hook = store.subscribe_action(Arc::new(ActionSubscriber::new().error(
            move |a: &Action, _: &Value, err: &anyhow::Error| {
                *s.lock() = Some(format!("{}: {}", a.kind, err));
            },
        )));

        assert!(store.dispatch("fail").await.is_err());
        assert_eq!(seen.lock().as_deref(), Some("fail: nope"));
    }

    #[test]
    fn test_stores_with_own_engines_do_not_share_watchers() {
        let watched = dev_store(counter());
        let other = dev_store(counter());
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let _handle = watched.watch(
            |state: &Value, _: &Getters| state["count"].clone(),
            move |_: &Value, _: &Value| {
                h.fetch_add(1, Ordering::SeqCst);
            },
            WatchOptions::deep_sync(),
        );

        other.commit("increment");
        other.hot_update(RawModule::new());
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        watched.commit("increment");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fire_and_forget_dispatch_lands() {
        let store = dev_store(
            counter().async_action("bump_later", |ctx, _| async move {
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                ctx.commit("increment");
                Ok(Value::Null)
            }),
        );

        let _ = store.dispatch("bump_later");
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        assert_eq!(store.state()["count"], json!(1));
    }

    #[test]
    fn test_watch_fires_until_unwatched() {
        let store = dev_store(counter());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();

        let handle = store.watch(
            |state: &Value, _: &Getters| state["count"].clone(),
            move |new: &Value, old: &Value| s.lock().push((new.clone(), old.clone())),
            WatchOptions::default(),
        );
        store.commit("increment");
        assert_eq!(*seen.lock(), vec![(json!(1), json!(0))]);

        handle.unwatch();
        store.commit("increment");
        assert_eq!(seen.lock().len(), 1);
    }
}
