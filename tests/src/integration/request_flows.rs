//! # Request/Response Flow Tests
//!
//! End-to-end coverage of the request protocol over the bus: happy path,
//! structural no-handler failures, timeout with retry, handler replacement
//! under hot reload, and independence of concurrent in-flight requests.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use serde_json::{json, Value};

    use shell_bus::{RequestOptions, TenantBus};
    use shell_types::{HandlerFailure, RequestError, TenantCell, TenantId};

    fn shell() -> (Arc<TenantBus>, Arc<TenantCell>) {
        let cell = Arc::new(TenantCell::new());
        let bus = Arc::new(TenantBus::new(cell.clone()));
        (bus, cell)
    }

    fn fast_options() -> RequestOptions {
        RequestOptions::default()
            .timeout(Duration::from_millis(50))
            .retries(2)
            .retry_delay(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_happy_path_within_default_timeout() {
        let (bus, _cell) = shell();
        let _reg = bus.handle_request("svc:get", |_| async { Ok(json!({"v": 1})) });

        let value = bus
            .request("svc:get", json!({}), bus.options())
            .await
            .expect("response");
        assert_eq!(value, json!({"v": 1}));
    }

    #[tokio::test]
    async fn test_handler_sees_request_payload() {
        let (bus, _cell) = shell();
        let _reg = bus.handle_request("svc:echo", |payload: Value| async move {
            Ok(json!({ "echoed": payload }))
        });

        let value = bus
            .request("svc:echo", json!({"n": 7}), bus.options())
            .await
            .unwrap();
        assert_eq!(value["echoed"]["n"], 7);
    }

    #[tokio::test]
    async fn test_missing_handler_rejects_immediately() {
        let (bus, _cell) = shell();

        let started = Instant::now();
        let err = bus
            .request("svc:missing", json!({}), bus.options())
            .await
            .expect_err("no handler");

        assert!(err.is_no_handler());
        // No timer is started for a structural failure.
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_timeout_after_all_retries() {
        let (bus, _cell) = shell();
        let _reg = bus.handle_request("svc:slow", |_| async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Value::Null)
        });

        let started = Instant::now();
        let err = bus
            .request("svc:slow", json!({}), fast_options())
            .await
            .expect_err("timeout");

        let RequestError::Timeout { attempts, .. } = err else {
            panic!("expected timeout, got {err:?}");
        };
        // Three attempts of 50 ms with two 10 ms pauses in between.
        assert_eq!(attempts, 3);
        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_handler_failure_carries_cause() {
        let (bus, _cell) = shell();
        let _reg = bus.handle_request("wallet:sign", |_| async {
            Err(HandlerFailure::new("ledger locked").with_data(json!({"code": 423})))
        });

        let err = bus
            .request("wallet:sign", json!({}), bus.options())
            .await
            .expect_err("handler failure");
        let RequestError::Handler { source, .. } = err else {
            panic!("expected handler error");
        };
        assert_eq!(source.message, "ledger locked");
        assert_eq!(source.data.unwrap()["code"], 423);
    }

    #[tokio::test]
    async fn test_second_registration_shadows_first() {
        let (bus, _cell) = shell();
        let first = bus.handle_request("svc:get", |_| async { Ok(json!("first")) });
        let _second = bus.handle_request("svc:get", |_| async { Ok(json!("second")) });

        let value = bus
            .request("svc:get", json!({}), bus.options())
            .await
            .unwrap();
        assert_eq!(value, json!("second"));

        // The evicted handler's guard must not remove its replacement.
        first.unregister();
        let value = bus
            .request("svc:get", json!({}), bus.options())
            .await
            .unwrap();
        assert_eq!(value, json!("second"));
        assert_eq!(bus.stats().handlers_replaced.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_tenant_scoped_request_prefers_scoped_handler() {
        let (bus, cell) = shell();
        let _bare = bus.handle_request("billing:plan", |_| async { Ok(json!("shared")) });

        cell.set(TenantId::new("acme").unwrap());
        let _scoped = bus.handle_request("billing:plan", |_| async { Ok(json!("acme")) });

        let value = bus
            .request("billing:plan", json!({}), bus.options())
            .await
            .unwrap();
        assert_eq!(value, json!("acme"));
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_independent() {
        let (bus, _cell) = shell();
        let _slow = bus.handle_request("svc:slow", |_| async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Value::Null)
        });
        let _fast = bus.handle_request("svc:fast", |_| async { Ok(json!("ok")) });

        let slow_bus = bus.clone();
        let slow = tokio::spawn(async move {
            slow_bus
                .request(
                    "svc:slow",
                    json!({}),
                    RequestOptions::default().timeout(Duration::from_millis(80)),
                )
                .await
        });

        // The fast request resolves while the slow one is still pending.
        let value = bus
            .request("svc:fast", json!({}), bus.options())
            .await
            .unwrap();
        assert_eq!(value, json!("ok"));

        let err = slow.await.unwrap().expect_err("slow request times out");
        assert!(matches!(err, RequestError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_request_counters_track_outcomes() {
        let (bus, _cell) = shell();
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let _reg = bus.handle_request("svc:get", move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
            async { Ok(Value::Null) }
        });

        let _ = bus.request("svc:get", json!({}), bus.options()).await;
        let _ = bus.request("svc:missing", json!({}), bus.options()).await;

        assert_eq!(calls.load(Ordering::Relaxed), 1);
        let stats = bus.stats();
        assert_eq!(stats.requests_started.load(Ordering::Relaxed), 2);
        assert_eq!(stats.requests_completed.load(Ordering::Relaxed), 1);
        assert_eq!(stats.requests_failed.load(Ordering::Relaxed), 1);
    }
}
