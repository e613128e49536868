//! End-to-end analysis over local checkouts
//!
//! Repositories are written into temp directories and scanned by
//! `LocalSource`; the generator is a `MockLLMClient` and retries sleep
//! through a `RecordingDelay`, so no test touches the network or the clock.

use pipeforge::analysis::{
    AnalysisError, AnalysisRequest, AnalysisService, Provenance, RecordingDelay, RetryPolicy,
    ServiceError,
};
use pipeforge::llm::{LLMClient, MockLLMClient, MockResponse};
use pipeforge::repository::LocalSource;
use pipeforge::stack::BuildSystemId;
use pipeforge::ShellDialect;
use serde_json::json;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn flask_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("requirements.txt"), "flask==3.0.0\npytest==8.0.0\n").unwrap();
    fs::write(
        root.join("README.md"),
        "# todo-api\n\nA Flask service.\n\n## Running\n\n```bash\npip install -r requirements.txt\npython app.py\n```\n",
    )
    .unwrap();
    fs::write(root.join("app.py"), "from flask import Flask\napp = Flask(__name__)\n").unwrap();
    fs::create_dir(root.join("tests")).unwrap();
    fs::write(root.join("tests/test_app.py"), "def test_ok():\n    assert True\n").unwrap();
    dir
}

fn service_for(dir: &TempDir) -> AnalysisService {
    let source = LocalSource::new(dir.path()).unwrap();
    AnalysisService::new(Arc::new(source))
}

fn with_mock(
    service: AnalysisService,
    client: &Arc<MockLLMClient>,
    delay: &Arc<RecordingDelay>,
) -> AnalysisService {
    let client: Arc<dyn LLMClient> = client.clone();
    service.with_client(client).with_delay(delay.clone())
}

#[tokio::test]
async fn test_offline_local_repository() {
    let dir = flask_repo();
    let report = service_for(&dir)
        .analyze(&AnalysisRequest::new("", ""))
        .await
        .unwrap();

    assert_eq!(report.provenance, Provenance::Heuristic);
    assert_eq!(report.analysis.build_system, BuildSystemId::Pip);
    assert!(report.analysis.readme_based);
    assert_eq!(report.analysis.run_commands, vec!["python app.py"]);
    assert_eq!(report.analysis.test_commands, vec!["python -m pytest"]);
    assert!(report.jenkinsfile.contains("pip install -r requirements.txt"));
    assert!(report.jenkinsfile.contains("sh '"));
}

#[tokio::test]
async fn test_generator_report_used() {
    let dir = flask_repo();
    let client = Arc::new(MockLLMClient::new());
    let delay = Arc::new(RecordingDelay::new());
    client.add_response(MockResponse::text(
        json!({
            "analysis": {
                "project_type": "Flask API",
                "build_system": "pip",
                "test_framework": "pytest",
                "install_commands": ["pip install -r requirements.txt"],
                "build_commands": [],
                "test_commands": ["pytest -q"],
                "run_commands": ["python app.py"],
                "complexity": "simple"
            },
            "explanation": "Flask service with pytest tests.",
            "recommendations": ["Pin the Python version"]
        })
        .to_string(),
    ));

    let service = with_mock(service_for(&dir), &client, &delay);
    let report = service.analyze(&AnalysisRequest::new("", "")).await.unwrap();

    assert_eq!(report.provenance, Provenance::Generator);
    assert_eq!(report.analysis.project_type.as_str(), "Flask API");
    assert_eq!(report.analysis.test_commands, vec!["pytest -q"]);
    assert_eq!(report.explanation, "Flask service with pytest tests.");
    assert!(report.jenkinsfile.contains("pytest -q"));
    assert!(delay.recorded().is_empty());

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, "gemini-2.5-flash");
    let prompt = calls[0].request.user_text();
    assert!(prompt.contains("requirements.txt"));
    assert!(prompt.contains("python app.py"));
}

#[tokio::test]
async fn test_rate_limited_generator_falls_back() {
    let dir = flask_repo();
    let client = Arc::new(MockLLMClient::new());
    let delay = Arc::new(RecordingDelay::new());
    client.add_responses([
        MockResponse::rate_limited(),
        MockResponse::rate_limited(),
        MockResponse::rate_limited(),
    ]);

    let service = with_mock(service_for(&dir), &client, &delay);
    let report = service.analyze(&AnalysisRequest::new("", "")).await.unwrap();

    assert_eq!(report.provenance, Provenance::Heuristic);
    assert_eq!(client.call_count(), 3);
    assert_eq!(
        delay.recorded(),
        vec![Duration::from_secs(33), Duration::from_secs(66)]
    );
    assert!(report.jenkinsfile.contains("python app.py"));
}

#[tokio::test]
async fn test_custom_policy_limits_attempts() {
    let dir = flask_repo();
    let client = Arc::new(MockLLMClient::new());
    let delay = Arc::new(RecordingDelay::new());
    client.add_responses([MockResponse::rate_limited(), MockResponse::rate_limited()]);

    let policy = RetryPolicy {
        max_attempts: 2,
        base_delay: Duration::from_secs(1),
        max_total_backoff: Duration::from_secs(10),
    };
    let service = with_mock(service_for(&dir), &client, &delay).with_policy(policy);
    let report = service.analyze(&AnalysisRequest::new("", "")).await.unwrap();

    assert_eq!(report.provenance, Provenance::Heuristic);
    assert_eq!(client.call_count(), 2);
    assert_eq!(delay.recorded(), vec![Duration::from_secs(1)]);
}

#[tokio::test]
async fn test_unknown_model_switches_to_fallback() {
    let dir = flask_repo();
    let client = Arc::new(MockLLMClient::new());
    let delay = Arc::new(RecordingDelay::new());
    client.add_responses([
        MockResponse::model_not_found("gemini-2.5-pro"),
        MockResponse::text(r#"{"analysis": {"project_type": "Flask API"}}"#),
    ]);

    let service = with_mock(service_for(&dir), &client, &delay);
    let request = AnalysisRequest::new("", "").with_model("gemini-2.5-pro");
    let report = service.analyze(&request).await.unwrap();

    assert_eq!(report.provenance, Provenance::Generator);
    assert_eq!(
        client.models_called(),
        vec!["gemini-2.5-pro", "gemini-2.5-flash"]
    );
}

#[tokio::test]
async fn test_windows_dialect() {
    let dir = flask_repo();
    let request = AnalysisRequest::new("", "").with_shell("windows");
    let report = service_for(&dir).analyze(&request).await.unwrap();

    assert_eq!(report.analysis.shell_environment, ShellDialect::Windows);
    assert!(report.jenkinsfile.contains("bat \""));
    assert!(!report.jenkinsfile.contains("sh '"));
}

#[tokio::test]
async fn test_unsupported_dialect_rejected_before_fetch() {
    let dir = flask_repo();
    let request = AnalysisRequest::new("", "").with_shell("fish");
    let err = service_for(&dir).analyze(&request).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Analysis(AnalysisError::UnsupportedDialect(ref tag)) if tag == "fish"
    ));
}

#[tokio::test]
async fn test_placeholder_response_enhanced_from_readme() {
    let dir = flask_repo();
    let client = Arc::new(MockLLMClient::new());
    let delay = Arc::new(RecordingDelay::new());
    client.add_response(MockResponse::text(
        json!({
            "analysis": {
                "project_type": "Node.js",
                "install_commands": ["npm install"],
                "build_commands": ["echo \"Build completed\""]
            },
            "explanation": "Template"
        })
        .to_string(),
    ));

    let service = with_mock(service_for(&dir), &client, &delay);
    let report = service.analyze(&AnalysisRequest::new("", "")).await.unwrap();

    assert_eq!(report.provenance, Provenance::Enhanced);
    assert_eq!(
        report.analysis.install_commands,
        vec!["pip install -r requirements.txt"]
    );
    assert!(report.analysis.readme_based);
    assert!(report.explanation.starts_with("Generated pipeline based on README instructions"));
    assert!(!report.jenkinsfile.contains("Build completed"));
}
