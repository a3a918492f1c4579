//! Conversation export to a standalone HTML page.
//!
//! Every element is realized through [`HtmlMount`]; the page loads Plotly and
//! MathJax so chart containers and formula spans render the way they do live.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use shaman_core::Sender;
use shaman_markdown::{html_escape, HtmlMount};

use crate::conversation::{Conversation, MessageElement};

const PLOTLY_SRC: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";
const MATHJAX_SRC: &str = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js";

pub struct ConversationExporter {
    title: String,
}

impl ConversationExporter {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }

    pub async fn export_html(&self, conversation: &Conversation, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let html = self.render(conversation);
        tokio::fs::write(path, &html)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(messages = conversation.messages().len(), path = %path.display(), "Exported conversation");
        Ok(path.to_path_buf())
    }

    pub fn render(&self, conversation: &Conversation) -> String {
        let messages = conversation.messages().iter().map(render_message).collect::<String>();

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<script src="{plotly}"></script>
<script>window.MathJax = {{ tex: {{ inlineMath: [['$', '$']] }} }};</script>
<script async src="{mathjax}"></script>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 800px; margin: 2rem auto; padding: 0 1rem; }}
.message {{ margin-bottom: 1rem; border-radius: 8px; padding: 0.75rem 1rem; }}
.user {{ background: #e5e7eb; }}
.ai {{ background: #f3f4f6; border-left: 3px solid #3b82f6; }}
.message img {{ max-width: 100%; border-radius: 4px; }}
.svg-container svg {{ max-width: 100%; height: auto; }}
</style>
</head>
<body>
<h1>{title}</h1>
{messages}
<script>
document.querySelectorAll('.plot-container').forEach(function (el) {{
  var spec = JSON.parse(el.dataset.plot);
  Plotly.newPlot(el, spec.data, spec.layout, spec.config);
}});
</script>
</body>
</html>"#,
            title = html_escape(&self.title),
            plotly = PLOTLY_SRC,
            mathjax = MATHJAX_SRC,
            messages = messages,
        )
    }
}

fn render_message(message: &MessageElement) -> String {
    let class = match message.sender {
        Sender::User => "user",
        Sender::Assistant => "ai",
    };
    let image = message
        .image
        .as_ref()
        .map(|img| format!(r#"<img src="{}" alt="attachment">"#, html_escape(&img.data_uri())))
        .unwrap_or_default();

    format!(
        r#"<div class="message {class}">{image}{body}</div>
"#,
        body = message.mount(HtmlMount::new()),
    )
}
