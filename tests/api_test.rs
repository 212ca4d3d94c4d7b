//! Integration tests for the transcription API

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    use crate::test_utils::{body_to_string, sse_body, test_app};

    /// Tests the UI document is served on GET
    #[tokio::test]
    async fn it_serves_the_ui_page() {
        let app = test_app("http://localhost:0");

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get("content-type")
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let body = body_to_string(response.into_body()).await;
        assert!(body.contains("字幕转文稿"));
    }

    /// Tests unsupported methods are rejected with a fixed body
    #[tokio::test]
    async fn it_rejects_unsupported_methods() {
        let app = test_app("http://localhost:0");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .method("DELETE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let body = body_to_string(response.into_body()).await;
        assert_eq!(body, "Method not allowed");
    }

    /// Tests empty subtitle text is rejected before any backend call
    #[tokio::test]
    async fn it_rejects_empty_subtitle_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let app = test_app(&server.url());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .method("POST")
                    .header("content-type", "text/plain")
                    .body(Body::from("  \n "))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        mock.assert_async().await;
    }

    /// Tests a single-round response is streamed back without the end
    /// marker or a trailing newline
    #[tokio::test]
    async fn it_streams_a_single_round_transcript() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(sse_body(&["这个视频讲的是猫。", "<end/>"]))
            .expect(1)
            .create_async()
            .await;

        let app = test_app(&server.url());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .method("POST")
                    .header("content-type", "text/plain")
                    .body(Body::from("嗯这个视频讲的是猫"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/stream; charset=utf-8"
        );

        let body = body_to_string(response.into_body()).await;
        assert_eq!(body, "这个视频讲的是猫。");
        mock.assert_async().await;
    }

    /// Tests the /api path the UI posts to behaves like the root path
    #[tokio::test]
    async fn it_accepts_submissions_on_the_api_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(sse_body(&["文稿<end/>"]))
            .expect(1)
            .create_async()
            .await;

        let app = test_app(&server.url());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api")
                    .method("POST")
                    .header("content-type", "text/plain")
                    .body(Body::from("字幕"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_string(response.into_body()).await;
        assert_eq!(body, "文稿");
        mock.assert_async().await;
    }

    /// Tests round exhaustion delimits each round with a newline and
    /// stops after exactly max_rounds backend calls
    #[tokio::test]
    async fn it_stops_at_the_round_budget() {
        let mut server = mockito::Server::new_async().await;
        // No end marker in any round; test_app sets max_rounds = 3
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(sse_body(&["第一部分内容"]))
            .expect(3)
            .create_async()
            .await;

        let app = test_app(&server.url());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .method("POST")
                    .header("content-type", "text/plain")
                    .body(Body::from("字幕"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_string(response.into_body()).await;
        assert_eq!(body, "第一部分内容\n".repeat(3));
        mock.assert_async().await;
    }

    /// Tests a backend failure surfaces as an inline diagnostic on the
    /// already-committed 200 stream
    #[tokio::test]
    async fn it_streams_an_error_fragment_on_backend_failure() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("backend exploded")
            .expect(1)
            .create_async()
            .await;

        let app = test_app(&server.url());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .method("POST")
                    .header("content-type", "text/plain")
                    .body(Body::from("字幕"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_string(response.into_body()).await;
        assert!(body.starts_with("\nError: "), "got: {}", body);
        mock.assert_async().await;
    }
}
