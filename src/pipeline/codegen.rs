//! Turns a project brief into site files using the LLM.

use crate::api::GeminiClient;
use crate::error::{AppError, Result};
use crate::models::{Attachment, GeneratedFiles};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Local;
use tracing::{error, info, warn};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Decodes every attachment into a text block appended to the prompt.
///
/// Attachments that are not base64 data URIs holding UTF-8 text are listed by
/// name only.
pub fn decode_attachments(attachments: &[Attachment]) -> String {
    let mut out = String::new();
    for att in attachments {
        info!("Decoding attachment: {}", att.name);
        match decode_data_uri(&att.url) {
            Ok(text) => out.push_str(&format!(
                "\n\n--- Attachment: {} ---\n{}\n--- End Attachment ---",
                att.name, text
            )),
            Err(e) => {
                warn!("Could not decode attachment {}: {}", att.name, e);
                out.push_str(&format!(
                    "\n\n--- Attachment: {} (could not be decoded) ---",
                    att.name
                ));
            },
        }
    }
    out
}

fn decode_data_uri(url: &str) -> Result<String> {
    let (_, encoded) = url
        .split_once(',')
        .ok_or_else(|| AppError::Llm("attachment URL is not a data URI".to_string()))?;
    let bytes = STANDARD.decode(encoded.trim())?;
    String::from_utf8(bytes).map_err(|e| AppError::Llm(format!("attachment is not UTF-8: {}", e)))
}

/// Instruction prompt asking for a JSON object of `filename -> content`.
pub fn build_prompt(brief: &str, attachment_text: &str) -> String {
    format!(
        r#"
You are an expert web developer. Your task is to generate the complete code for a single-page web application based on a user's brief.
You must generate all necessary HTML, CSS, and JavaScript.
- The HTML file MUST be named 'index.html'.
- Place CSS inside <style> tags in the HTML head.
- Place JavaScript inside <script> tags at the end of the HTML body.
- If the brief mentions attached files (like CSV or JSON), assume their content is provided and use it directly.
- Ensure the generated code is clean, efficient, and directly addresses all requirements in the brief.

Respond ONLY with a valid JSON object where keys are filenames (e.g., "index.html") and values are the complete string content of the files.
Do not include ```json markdown delimiters or any other explanatory text in your response.

Example response format:
{{
  "index.html": "<!DOCTYPE html><html>...</html>"
}}

Here is the user's request:
Brief: {brief}
{attachment_text}
"#
    )
}

/// Parses the model's answer, tolerating a surrounding markdown code fence.
pub fn parse_generated_files(raw: &str) -> Result<GeneratedFiles> {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    let value: serde_json::Value = serde_json::from_str(text.trim())?;
    let object = value
        .as_object()
        .ok_or_else(|| AppError::Llm("expected a JSON object of files".to_string()))?;

    let mut files = GeneratedFiles::new();
    for (path, content) in object {
        let content = content.as_str().ok_or_else(|| {
            AppError::Llm(format!("content of '{}' is not a string", path))
        })?;
        files.insert(path.as_str(), content);
    }
    if files.is_empty() {
        return Err(AppError::Llm("model returned no files".to_string()));
    }
    Ok(files)
}

/// Page committed in place of the app when generation fails.
pub fn fallback_files(err: &AppError) -> GeneratedFiles {
    let mut files = GeneratedFiles::new();
    files.insert(
        "index.html",
        format!(
            "<h1>Error</h1><p>Could not generate the application code. Gemini API error: {}</p>",
            err
        ),
    );
    files
}

#[derive(Clone)]
pub struct CodeGenerator {
    gemini: GeminiClient,
}

impl CodeGenerator {
    pub fn new(gemini: GeminiClient) -> Self {
        Self { gemini }
    }

    /// Always yields something to commit: the generated app, or an error page.
    pub async fn generate(
        &self,
        brief: &str,
        attachments: Option<&[Attachment]>,
        round: i64,
    ) -> GeneratedFiles {
        info!(
            "Generating code from brief using {} (Round {})...",
            self.gemini.model(),
            round
        );
        info!("Brief: {}...", crate::api::truncate(brief, 80));

        let attachment_text = attachments.map(decode_attachments).unwrap_or_default();
        let prompt = build_prompt(brief, &attachment_text);

        match self.try_generate(&prompt).await {
            Ok(files) => {
                info!("Gemini response received and parsed ({} files).", files.len());
                files
            },
            Err(e) => {
                error!("ERROR during Gemini call or JSON parsing: {}", e);
                fallback_files(&e)
            },
        }
    }

    async fn try_generate(&self, prompt: &str) -> Result<GeneratedFiles> {
        info!(
            "The Gemini model creation started at: {}",
            Local::now().format(TIME_FORMAT)
        );
        let result = self.gemini.generate_content(prompt).await;
        info!(
            "The Gemini model creation ended at: {}",
            Local::now().format(TIME_FORMAT)
        );
        parse_generated_files(&result?)
    }
}
