//! Pipeline Integration Tests
//!
//! Stage ordering, context threading, abort behaviour and auxiliary file
//! isolation, driven by a scripted completion client.

mod support;

use std::sync::Arc;

use stepgen::core::pipeline::AUXILIARY_SYSTEM_MESSAGE;
use stepgen::core::render_context;
use stepgen::{
    Artifact, ArtifactKind, CompletionError, GenerateError, GenerationContext,
    GenerationPipeline, PipelineStage, RunState,
};
use support::{primary_replies, settings_in, write_prompts, ScriptedClient, HTML, SCRIPT, STYLE, TESTS};
use tempfile::TempDir;

fn full_script() -> Vec<Result<String, CompletionError>> {
    let mut replies = primary_replies();
    replies.push(Ok("```javascript\nmodule.exports = { presets: ['@babel/preset-env'] };\n```".to_string()));
    replies.push(Ok("module.exports = { testEnvironment: 'jsdom' };".to_string()));
    replies.push(Ok("```json\n{\"name\": \"calculator\", \"devDependencies\": {\"jest\": \"^29\"}}\n```".to_string()));
    replies
}

#[tokio::test]
async fn test_full_run_writes_every_file() {
    let temp = TempDir::new().unwrap();
    write_prompts(&temp.path().join("prompts"));
    let settings = settings_in(temp.path());

    let client = Arc::new(ScriptedClient::new(full_script()));
    let pipeline = GenerationPipeline::new(&settings, client.clone());

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.state, RunState::Done);
    assert!(!report.is_partial());
    assert_eq!(report.artifacts.len(), 4);
    assert_eq!(report.auxiliary_files.len(), 3);

    let out = temp.path().join("generated");
    assert_eq!(std::fs::read_to_string(out.join("index.html")).unwrap(), HTML);
    assert_eq!(std::fs::read_to_string(out.join("app.js")).unwrap(), SCRIPT);
    assert_eq!(std::fs::read_to_string(out.join("style.css")).unwrap(), STYLE);
    assert_eq!(
        std::fs::read_to_string(out.join("tests/calculator.test.js")).unwrap(),
        TESTS
    );

    assert_eq!(
        std::fs::read_to_string(temp.path().join("babel.config.js")).unwrap(),
        "module.exports = { presets: ['@babel/preset-env'] };"
    );
    assert!(temp.path().join("jest.config.js").exists());
    let package = std::fs::read_to_string(temp.path().join("package.json")).unwrap();
    assert!(package.starts_with('{'));
}

#[tokio::test]
async fn test_each_stage_sees_only_earlier_artifacts() {
    let temp = TempDir::new().unwrap();
    write_prompts(&temp.path().join("prompts"));
    let settings = settings_in(temp.path());

    let client = Arc::new(ScriptedClient::new(full_script()));
    GenerationPipeline::new(&settings, client.clone())
        .run()
        .await
        .unwrap();

    let requests = client.requests();
    assert_eq!(requests.len(), 7);

    let artifacts = [HTML, SCRIPT, STYLE, TESTS];
    let prompts = ["UI PROMPT", "LOGIC PROMPT", "STYLE PROMPT", "TESTS PROMPT"];

    for (k, request) in requests.iter().take(4).enumerate() {
        assert!(request.user_message.contains(prompts[k]), "call {} prompt", k);
        for (j, artifact) in artifacts.iter().enumerate() {
            assert_eq!(
                request.user_message.contains(*artifact),
                j < k,
                "call {} visibility of artifact {}",
                k,
                j
            );
        }
        assert_eq!(request.system_message, PipelineStage::all()[k].system_message());
        assert_eq!(request.model, "test-model");
    }

    // Auxiliary requests carry no code context
    for request in &requests[4..] {
        assert_eq!(request.system_message, AUXILIARY_SYSTEM_MESSAGE);
        assert!(!request.user_message.contains(HTML));
        assert!(!request.user_message.contains(SCRIPT));
    }
}

#[tokio::test]
async fn test_tests_stage_context_is_ordered_and_verbatim() {
    let temp = TempDir::new().unwrap();
    write_prompts(&temp.path().join("prompts"));
    let settings = settings_in(temp.path());

    let client = Arc::new(ScriptedClient::new(full_script()));
    GenerationPipeline::new(&settings, client.clone())
        .run()
        .await
        .unwrap();

    let mut expected = GenerationContext::new();
    expected.push(Artifact::new(ArtifactKind::Html, HTML.to_string()));
    expected.push(Artifact::new(ArtifactKind::Script, SCRIPT.to_string()));
    expected.push(Artifact::new(ArtifactKind::Style, STYLE.to_string()));

    let tests_request = &client.requests()[3];
    assert!(tests_request.user_message.contains(&render_context(&expected)));

    let html_at = tests_request.user_message.find(HTML).unwrap();
    let script_at = tests_request.user_message.find(SCRIPT).unwrap();
    let style_at = tests_request.user_message.find(STYLE).unwrap();
    assert!(html_at < script_at && script_at < style_at);
}

#[tokio::test]
async fn test_html_failure_aborts_run() {
    let temp = TempDir::new().unwrap();
    write_prompts(&temp.path().join("prompts"));
    let settings = settings_in(temp.path());

    let client = Arc::new(ScriptedClient::new(vec![Err(CompletionError::Transport(
        "connection refused".to_string(),
    ))]));
    let result = GenerationPipeline::new(&settings, client.clone()).run().await;

    let err = result.unwrap_err();
    assert_eq!(err.stage(), Some("HTML"));
    assert_eq!(client.requests().len(), 1);

    let out = temp.path().join("generated");
    for kind in ArtifactKind::ORDER {
        assert!(!out.join(kind.relative_path()).exists(), "{} written", kind);
    }
    assert!(!temp.path().join("package.json").exists());
}

#[tokio::test]
async fn test_script_failure_keeps_html_only() {
    let temp = TempDir::new().unwrap();
    write_prompts(&temp.path().join("prompts"));
    let settings = settings_in(temp.path());

    let mut replies = primary_replies();
    replies.truncate(1);
    replies.push(Err(CompletionError::RateLimit("HTTP 429".to_string())));

    let client = Arc::new(ScriptedClient::new(replies));
    let err = GenerationPipeline::new(&settings, client.clone())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GenerateError::StageFailed {
            cause: CompletionError::RateLimit(_),
            ..
        }
    ));
    assert_eq!(err.stage(), Some("JavaScript"));

    let out = temp.path().join("generated");
    assert!(out.join("index.html").exists());
    assert!(!out.join("app.js").exists());
    assert!(!out.join("style.css").exists());
    assert_eq!(client.requests().len(), 2);
}

#[tokio::test]
async fn test_auxiliary_failure_is_isolated() {
    let temp = TempDir::new().unwrap();
    write_prompts(&temp.path().join("prompts"));
    let settings = settings_in(temp.path());

    let mut replies = primary_replies();
    replies.push(Ok("module.exports = {};".to_string()));
    replies.push(Err(CompletionError::Transport("HTTP 502".to_string())));
    replies.push(Ok("{\"name\": \"calculator\"}".to_string()));

    let client = Arc::new(ScriptedClient::new(replies));
    let report = GenerationPipeline::new(&settings, client.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(report.state, RunState::Done);
    assert!(report.is_partial());
    assert_eq!(report.auxiliary_failures.len(), 1);
    assert_eq!(report.auxiliary_failures[0].file, "jest.config.js");

    assert!(temp.path().join("babel.config.js").exists());
    assert!(!temp.path().join("jest.config.js").exists());
    assert!(temp.path().join("package.json").exists());

    let out = temp.path().join("generated");
    for kind in ArtifactKind::ORDER {
        assert!(out.join(kind.relative_path()).exists());
    }
    assert_eq!(client.requests().len(), 7);
}

#[tokio::test]
async fn test_invalid_package_json_not_written() {
    let temp = TempDir::new().unwrap();
    write_prompts(&temp.path().join("prompts"));
    let settings = settings_in(temp.path());

    let mut replies = primary_replies();
    replies.push(Ok("module.exports = {};".to_string()));
    replies.push(Ok("module.exports = {};".to_string()));
    replies.push(Ok("Sure! Here's a package.json with jest.".to_string()));

    let client = Arc::new(ScriptedClient::new(replies));
    let report = GenerationPipeline::new(&settings, client)
        .run()
        .await
        .unwrap();

    assert_eq!(report.auxiliary_failures.len(), 1);
    assert_eq!(report.auxiliary_failures[0].file, "package.json");
    assert!(report.auxiliary_failures[0].error.contains("not valid JSON"));
    assert!(!temp.path().join("package.json").exists());
    assert_eq!(report.written_paths().len(), 6);
}

#[tokio::test]
async fn test_missing_prompt_stops_before_any_call() {
    let temp = TempDir::new().unwrap();
    let settings = settings_in(temp.path());

    let client = Arc::new(ScriptedClient::new(full_script()));
    let err = GenerationPipeline::new(&settings, client.clone())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some("HTML"));
    assert!(matches!(err.root(), GenerateError::PromptNotFound { name, .. } if name == "ui"));
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn test_missing_styling_prompt_names_css_stage() {
    let temp = TempDir::new().unwrap();
    let prompts = temp.path().join("prompts");
    write_prompts(&prompts);
    std::fs::remove_file(prompts.join("styling.prompt")).unwrap();
    let settings = settings_in(temp.path());

    let client = Arc::new(ScriptedClient::new(full_script()));
    let err = GenerationPipeline::new(&settings, client.clone())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some("CSS"));
    assert!(err.to_string().contains("styling.prompt"));
    assert!(matches!(err.root(), GenerateError::PromptNotFound { name, .. } if name == "styling"));
    assert_eq!(client.requests().len(), 2);

    let out = temp.path().join("generated");
    assert!(out.join("app.js").exists());
    assert!(!out.join("style.css").exists());
}

#[tokio::test]
async fn test_write_failure_names_stage_and_keeps_no_partial() {
    let temp = TempDir::new().unwrap();
    write_prompts(&temp.path().join("prompts"));
    let settings = settings_in(temp.path());
    // Occupy the script path with a directory so the write cannot land
    std::fs::create_dir_all(temp.path().join("generated/app.js/occupied")).unwrap();

    let client = Arc::new(ScriptedClient::new(full_script()));
    let err = GenerationPipeline::new(&settings, client.clone())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some("JavaScript"));
    assert!(matches!(err.root(), GenerateError::WriteFailed { .. }));
    assert_eq!(client.requests().len(), 2);

    let out = temp.path().join("generated");
    assert!(out.join("index.html").exists());
    assert!(!out.join("app.js.partial").exists());
    assert!(!out.join("style.css").exists());
}

#[tokio::test]
async fn test_report_digests_match_files() {
    let temp = TempDir::new().unwrap();
    write_prompts(&temp.path().join("prompts"));
    let settings = settings_in(temp.path());

    let client = Arc::new(ScriptedClient::new(full_script()));
    let report = GenerationPipeline::new(&settings, client).run().await.unwrap();

    for written in &report.artifacts {
        let content = std::fs::read_to_string(&written.path).unwrap();
        let artifact = Artifact::new(written.kind, content);
        assert_eq!(artifact.digest(), written.sha256);
        assert_eq!(artifact.size_bytes, written.size_bytes);
    }
}
