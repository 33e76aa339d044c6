//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use stepgen::config::Settings;
use stepgen::{CompletionClient, CompletionError, CompletionRequest};

/// Client that replays a fixed script of replies and records every request
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.seen.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Transport("script exhausted".to_string())))
    }
}

pub const HTML: &str = "<div id=\"display\"></div>\n<button class=\"digit\">1</button>";
pub const SCRIPT: &str = "const display = document.getElementById('display');";
pub const STYLE: &str = "#display { font-size: 2rem; }";
pub const TESTS: &str = "test('adds', () => { expect(add(1, 2)).toBe(3); });";

/// Model replies for the four primary stages, wrapped the way models do
pub fn primary_replies() -> Vec<Result<String, CompletionError>> {
    vec![
        Ok(format!("```html\n{}\n```", HTML)),
        Ok(format!("Here you go:\n```javascript\n{}\n```", SCRIPT)),
        Ok(format!("```css\n{}\n```", STYLE)),
        Ok(TESTS.to_string()),
    ]
}

/// Write the four prompt files
pub fn write_prompts(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("calculator-ui.prompt"), "UI PROMPT: a basic calculator\n").unwrap();
    std::fs::write(dir.join("business-logic.prompt"), "LOGIC PROMPT: four operations").unwrap();
    std::fs::write(dir.join("styling.prompt"), "STYLE PROMPT: dark theme").unwrap();
    std::fs::write(dir.join("tests.prompt"), "TESTS PROMPT: use jest").unwrap();
}

/// Settings rooted in a temporary directory
pub fn settings_in(root: &Path) -> Settings {
    Settings {
        model: "test-model".to_string(),
        api_key: Some("test-key".to_string()),
        prompts_dir: root.join("prompts"),
        output_dir: root.join("generated"),
        auxiliary_dir: root.to_path_buf(),
        ..Default::default()
    }
}
