use crate::formatter::{DocumentInfo, GENERATOR_NAME};
use crate::model::{DocBundle, DocumentationEntry};

/// Markdown reference: one `##` section per entry, in entry order.
pub struct MarkdownFormatter<'a> {
    info: &'a DocumentInfo,
}

impl<'a> MarkdownFormatter<'a> {
    pub fn new(info: &'a DocumentInfo) -> Self {
        Self { info }
    }

    pub fn format(&self, entries: &[DocumentationEntry]) -> String {
        let mut lines = vec![
            format!("# {}", self.info.title),
            String::new(),
            format!("Generated automatically by **{}**.", GENERATOR_NAME),
            String::new(),
        ];

        for entry in entries {
            lines.push(format!("## {} {}", entry.methods_label(), heading_path(&entry.uri)));
            lines.push(String::new());
            lines.push(format!("- **Controller:** `{}`", entry.handler_label()));
            if !entry.name.is_empty() {
                lines.push(format!("- **Name:** `{}`", entry.name));
            }
            lines.push(String::new());

            if entry.description.trim().is_empty() {
                lines.push("_No description available._".to_string());
            } else {
                lines.push(entry.description.clone());
            }
            lines.push(String::new());

            if let Some(bundle) = &entry.advanced {
                push_bundle(&mut lines, bundle);
            }
        }

        format!("{}\n", lines.join("\n").trim_end())
    }
}

fn push_bundle(lines: &mut Vec<String>, bundle: &DocBundle) {
    if !bundle.summary.is_empty() {
        lines.push(format!("**Summary:** {}", bundle.summary));
        lines.push(String::new());
    }

    if !bundle.parameters.is_empty() {
        lines.push("### Parameters".to_string());
        lines.push(String::new());
        lines.push("| Name | In | Type | Required | Description |".to_string());
        lines.push("| --- | --- | --- | --- | --- |".to_string());
        for param in &bundle.parameters {
            lines.push(format!(
                "| `{}` | {} | {} | {} | {} |",
                param.name,
                param.location,
                param.param_type,
                if param.required { "yes" } else { "no" },
                table_cell(&param.description)
            ));
        }
        lines.push(String::new());
    }

    push_example(lines, "Request Example", &bundle.request_example);
    push_example(lines, "Response Example", &bundle.response_example);

    if !bundle.error_responses.is_empty() {
        lines.push("### Error Responses".to_string());
        lines.push(String::new());
        for error in &bundle.error_responses {
            let mut line = format!("- `{}` {}", error.status_code, error.message);
            if !error.description.is_empty() {
                line.push_str(&format!(": {}", error.description));
            }
            lines.push(line);
        }
        lines.push(String::new());
    }

    if !bundle.tags.is_empty() {
        lines.push(format!("**Tags:** {}", bundle.tags.join(", ")));
        lines.push(String::new());
    }
}

fn push_example(lines: &mut Vec<String>, heading: &str, example: &serde_json::Value) {
    if example.is_null() {
        return;
    }
    let Ok(pretty) = serde_json::to_string_pretty(example) else {
        return;
    };

    lines.push(format!("### {}", heading));
    lines.push(String::new());
    lines.push("```json".to_string());
    lines.push(pretty);
    lines.push("```".to_string());
    lines.push(String::new());
}

fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Uri with a leading slash, as a request line shows it (`api/users` -> `/api/users`).
fn heading_path(uri: &str) -> String {
    if uri.starts_with('/') {
        uri.to_string()
    } else {
        format!("/{}", uri)
    }
}
