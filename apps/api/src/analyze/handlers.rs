//! Axum route handler for `POST /api/analyze`.
//!
//! One linear pass per request: walk the multipart fields, validate, extract
//! the resume text, build the prompt, make a single model call, relay its
//! JSON. Two failure exits before the model (bad input, bad PDF), one after
//! (generation failure). Nothing is persisted or retried.

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use tracing::info;

use crate::analyze::extract::extract_resume_text;
use crate::analyze::models::AnalysisResult;
use crate::analyze::prompts::{build_analysis_prompt, ANALYSIS_SYSTEM};
use crate::analyze::MAX_RESUME_BYTES;
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let mut resume: Option<Bytes> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart request: {e}")))?
    {
        match field.name() {
            Some("resume") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read resume upload: {e}")))?;
                if data.len() > MAX_RESUME_BYTES {
                    return Err(AppError::Validation(
                        "Resume PDF exceeds the 5MB upload limit".to_string(),
                    ));
                }
                resume = Some(data);
            }
            Some("job_description") => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read job description: {e}"))
                })?;
                job_description = Some(text);
            }
            _ => {} // unknown fields are ignored
        }
    }

    let resume = resume.ok_or_else(|| AppError::Validation("Resume PDF is required".to_string()))?;
    let job_description = job_description
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Job Description is required".to_string()))?;

    info!("Analyzing resume upload ({} bytes)", resume.len());

    let resume_text = extract_resume_text(resume).await?;

    let prompt = build_analysis_prompt(&resume_text, &job_description);
    let analysis: AnalysisResult = state
        .llm
        .call_json(&prompt, ANALYSIS_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Analysis generation failed: {e}")))?;

    Ok(Json(analysis))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::llm_client::LlmClient;
    use crate::routes::build_router;
    use crate::state::AppState;

    const BOUNDARY: &str = "test-boundary-7f29a";

    fn test_router_with_base(base_url: &str) -> axum::Router {
        let config = Config {
            gemini_api_key: "test-key".to_string(),
            gemini_base_url: base_url.to_string(),
            static_dir: "static".to_string(),
            port: 0,
            rust_log: "info".to_string(),
        };
        let llm = LlmClient::new(config.gemini_api_key.clone(), config.gemini_base_url.clone());
        build_router(AppState { llm, config })
    }

    fn test_router() -> axum::Router {
        // unroutable: these tests must never reach a model call
        test_router_with_base("http://127.0.0.1:1")
    }

    /// Serves a Gemini-shaped reply whose single candidate text is `reply_text`,
    /// on an ephemeral local port. Returns the base URL to point the client at.
    async fn spawn_model_stub(reply_text: &'static str) -> String {
        let app = axum::Router::new().fallback(move || async move {
            axum::Json(serde_json::json!({
                "candidates": [{
                    "content": {"parts": [{"text": reply_text}], "role": "model"},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {
                    "promptTokenCount": 64,
                    "candidatesTokenCount": 32,
                    "totalTokenCount": 96
                }
            }))
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Builds a one-page PDF with `text` in Helvetica, computing xref offsets
    /// as it goes. Enough for pdf-extract to recover the text.
    fn minimal_pdf(text: &str) -> Vec<u8> {
        let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
             /Resources << /Font << /F1 5 0 R >> >> >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
        }
        let xref_offset = pdf.len();
        pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
        for offset in offsets {
            pdf.push_str(&format!("{offset:010} 00000 n \n"));
        }
        pdf.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF",
            objects.len() + 1
        ));
        pdf.into_bytes()
    }

    fn text_part(name: &str, value: &str) -> Vec<u8> {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
        .into_bytes()
    }

    fn file_part(name: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
        let mut part = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .into_bytes();
        part.extend_from_slice(bytes);
        part.extend_from_slice(b"\r\n");
        part
    }

    fn form_request(parts: Vec<Vec<u8>>) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(&part);
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_message(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        json["message"].as_str().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn test_missing_resume_is_400() {
        let request = form_request(vec![text_part("job_description", "Senior Rust Engineer")]);
        let response = test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_message(response).await, "Resume PDF is required");
    }

    #[tokio::test]
    async fn test_missing_job_description_is_400() {
        let request = form_request(vec![file_part("resume", "resume.pdf", b"%PDF-fake")]);
        let response = test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_message(response).await, "Job Description is required");
    }

    #[tokio::test]
    async fn test_whitespace_job_description_is_400() {
        let request = form_request(vec![
            file_part("resume", "resume.pdf", b"%PDF-fake"),
            text_part("job_description", "   \n  "),
        ]);
        let response = test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_message(response).await, "Job Description is required");
    }

    #[tokio::test]
    async fn test_oversized_resume_is_rejected_before_extraction() {
        let oversized = vec![0u8; crate::analyze::MAX_RESUME_BYTES + 1];
        let request = form_request(vec![
            file_part("resume", "resume.pdf", &oversized),
            text_part("job_description", "Senior Rust Engineer"),
        ]);
        let response = test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_message(response).await.contains("5MB"));
    }

    #[tokio::test]
    async fn test_unparsable_pdf_is_400_with_parse_message() {
        let request = form_request(vec![
            file_part("resume", "resume.pdf", b"definitely not a pdf"),
            text_part("job_description", "Senior Rust Engineer"),
        ]);
        let response = test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_message(response)
            .await
            .contains("Failed to parse PDF file"));
    }

    #[tokio::test]
    async fn test_unknown_fields_are_ignored_not_rejected() {
        // extra field plus missing resume: the error is about the resume
        let request = form_request(vec![
            text_part("tracking_id", "abc-123"),
            text_part("job_description", "Senior Rust Engineer"),
        ]);
        let response = test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_message(response).await, "Resume PDF is required");
    }

    const MODEL_REPLY: &str = r#"{
        "match_score": "85%",
        "matching_strengths": ["5 years of Rust", "Distributed systems background"],
        "missing_skills": ["Kubernetes"],
        "improvement_suggestions": ["Quantify the migration project's impact"],
        "cold_email": "Subject: Senior Rust Engineer role\n\nHi, I noticed your posting..."
    }"#;

    #[tokio::test]
    async fn test_valid_pdf_and_model_reply_echo_as_200() {
        let base_url = spawn_model_stub(MODEL_REPLY).await;
        let request = form_request(vec![
            file_part(
                "resume",
                "resume.pdf",
                &minimal_pdf("Jane Doe, Senior Rust Engineer, five years of Rust"),
            ),
            text_part("job_description", "Senior Rust Engineer"),
        ]);
        let response = test_router_with_base(&base_url)
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let expected: serde_json::Value = serde_json::from_str(MODEL_REPLY).unwrap();
        assert_eq!(body, expected);
    }

    #[tokio::test]
    async fn test_non_json_model_reply_is_500_generation_failure() {
        let base_url = spawn_model_stub("Sorry, I cannot produce an analysis here.").await;
        let request = form_request(vec![
            file_part(
                "resume",
                "resume.pdf",
                &minimal_pdf("Jane Doe, Senior Rust Engineer, five years of Rust"),
            ),
            text_part("job_description", "Senior Rust Engineer"),
        ]);
        let response = test_router_with_base(&base_url)
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_message(response).await, "Failed to generate analysis");
    }
}
