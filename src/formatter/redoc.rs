use crate::formatter::DocumentInfo;

const REDOC_SCRIPT: &str = "https://cdn.redoc.ly/redoc/latest/bundles/redoc.standalone.js";

/// Static HTML page that renders an embedded OpenAPI document with ReDoc.
pub struct ReDocFormatter<'a> {
    info: &'a DocumentInfo,
}

impl<'a> ReDocFormatter<'a> {
    pub fn new(info: &'a DocumentInfo) -> Self {
        Self { info }
    }

    /// Wraps `openapi_json`, which must be a serialized OpenAPI document.
    pub fn format(&self, openapi_json: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>
        body {{ margin: 0; padding: 0; }}
    </style>
</head>
<body>
    <div id="redoc-container"></div>
    <script src="{script}"></script>
    <script>
        const spec = {spec};
        Redoc.init(spec, {{ scrollYOffset: 0, hideDownloadButton: false }}, document.getElementById('redoc-container'));
    </script>
</body>
</html>
"#,
            title = escape_html(&self.info.title),
            script = REDOC_SCRIPT,
            spec = escape_script(openapi_json),
        )
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Keeps embedded JSON from closing the surrounding `<script>` element.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}
