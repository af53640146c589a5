//! # Dynamic Modules and Hot Update
//!
//! Runtime registration, unregistration and definition swaps.

#[cfg(test)]
mod tests {
    use crate::fixtures::{count, counter, dev_store, errors, settable};
    use serde_json::json;
    use statehouse_core::{RawModule, RegisterOptions, StoreError};

    #[test]
    fn test_register_commit_unregister() {
        let store = dev_store(counter());

        store.register_module("b", settable(1));
        store.commit(("b/set_n", json!(9)));
        assert_eq!(store.state()["b"]["n"], json!(9));

        store.unregister_module("b");
        assert!(!store.has_module("b"));
        store.commit(("b/set_n", json!(10)));
        assert!(store.state().get("b").is_none());
        assert_eq!(errors(&store), vec![StoreError::UnknownMutation("b/set_n".into())]);
    }

    #[test]
    fn test_unregister_removes_state_key() {
        let store = dev_store(counter());
        store.register_module(["cart"], settable(0));
        assert!(store.has_module(["cart"]));

        store.unregister_module(["cart"]);
        assert!(!store.has_module(["cart"]));
        assert!(store.state().get("cart").is_none());
        assert_eq!(count(&store), json!(0));
    }

    #[test]
    fn test_nested_registration_grafts_under_parent() {
        let store = dev_store(counter());
        store.register_module("a", settable(1));
        store.register_module(["a", "b"], settable(2));

        assert_eq!(store.state()["a"]["b"]["n"], json!(2));
        store.commit(("a/b/set_n", json!(3)));
        assert_eq!(store.state()["a"]["b"]["n"], json!(3));
    }

    #[test]
    fn test_register_under_missing_parent_is_reported() {
        let store = dev_store(counter());
        store.register_module(["ghost", "child"], settable(1));

        assert!(!store.has_module(["ghost", "child"]));
        assert!(matches!(errors(&store).as_slice(), [StoreError::ModuleNotFound(_)]));
    }

    #[test]
    fn test_static_modules_cannot_be_unregistered() {
        let store = dev_store(counter().module("fixed", settable(0)));
        store.unregister_module("fixed");

        assert!(store.has_module("fixed"));
        assert_eq!(errors(&store), vec![StoreError::StaticModule("fixed".into())]);
    }

    #[test]
    fn test_preserve_state_adopts_existing_tree() {
        let store = dev_store(counter());
        store.replace_state(json!({"count": 0, "saved": {"n": 5}}));

        store.register_module_with(
            "saved",
            settable(1),
            RegisterOptions {
                preserve_state: true,
            },
        );
        assert_eq!(store.state()["saved"]["n"], json!(5));
        store.commit(("saved/set_n", json!(6)));
        assert_eq!(store.state()["saved"]["n"], json!(6));
    }

    #[test]
    fn test_registered_getters_join_the_view() {
        let store = dev_store(counter());
        store.register_module(
            "c",
            settable(4).getter("double", |ctx| json!(ctx.state["n"].as_i64().unwrap_or(0) * 2)),
        );
        assert_eq!(store.getter("c/double"), Some(json!(8)));

        store.unregister_module("c");
        assert_eq!(store.getter("c/double"), None);
    }

    #[test]
    fn test_hot_update_swaps_handlers_and_keeps_state() {
        let store = dev_store(counter());
        store.commit("increment");

        store.hot_update(RawModule::new().mutation("increment", |state, _| {
            state["count"] = json!(state["count"].as_i64().unwrap_or(0) + 10)
        }));
        assert_eq!(count(&store), json!(1));

        store.commit("increment");
        assert_eq!(count(&store), json!(11));
    }

    #[test]
    fn test_hot_update_reports_added_modules() {
        let store = dev_store(counter());
        store.hot_update(RawModule::new().module("fresh", settable(0)));

        assert!(!store.has_module("fresh"));
        assert_eq!(
            errors(&store),
            vec![StoreError::HotUpdateAddedModule("fresh".into())]
        );
    }
}
