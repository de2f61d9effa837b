//! # HTTP Flow
//!
//! The runtime router in front of a real service.

#[cfg(test)]
mod tests {
    use crate::fixtures::Harness;
    use aggregator_runtime::{create_router, AppState};
    use ag_02_vote_validation::VoteRequest;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use tower::ServiceExt;

    const TASK: u64 = 7;

    fn router(harness: &Harness) -> Router {
        create_router(AppState {
            api: harness.service.clone(),
        })
    }

    async fn post(router: Router, vote: &VoteRequest) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/aggregator")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(vote).unwrap()))
            .unwrap();
        send(router, request).await
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        send(router, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_vote_round_over_http() {
        let harness = Harness::new(4);

        let (status, _) = get(router(&harness), "/api/task/7").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = post(router(&harness), &harness.operator(0).perform(TASK, "100-0xabc")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decided"], serde_json::Value::Null);

        let (status, body) = get(router(&harness), "/api/task/7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "100-0xabc");
        assert_eq!(body["address"], harness.operator(0).address.as_str());

        let mut last = serde_json::Value::Null;
        for i in 1..4 {
            let (status, body) = post(router(&harness), &harness.operator(i).attest(TASK, true)).await;
            assert_eq!(status, StatusCode::OK);
            last = body;
        }
        assert_eq!(last["status"], "success");
        assert_eq!(last["decided"], "approved");
        assert_eq!(harness.queue_len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_performer_is_bad_request() {
        let harness = Harness::new(2);
        post(router(&harness), &harness.operator(0).perform(TASK, "100-0xabc")).await;

        let (status, body) = post(router(&harness), &harness.operator(1).perform(TASK, "200-0xdef")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Performer already submitted for task 7");
    }

    #[tokio::test]
    async fn test_settled_task_is_not_found() {
        let harness = Harness::new(4);
        post(router(&harness), &harness.operator(0).perform(TASK, "100-0xabc")).await;
        for i in 1..4 {
            post(router(&harness), &harness.operator(i).attest(TASK, true)).await;
        }
        harness.drain().await;

        let (status, body) = get(router(&harness), "/api/task/7").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "performer data not found");
    }
}
