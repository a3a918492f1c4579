//! Mounting Adapters
//!
//! Realize a [`RenderedReply`] on a concrete surface: HTML for the browser
//! client, plain text for the terminal.

use serde_json::json;

use crate::ir::{ChartSpec, FormulaText, Region, RenderedReply, RunKind, VectorGraphic};

/// A surface a rendered reply can be mounted onto.
pub trait Mount {
    type Output;

    /// Drop whatever the message element showed before.
    fn clear(&mut self);

    fn mount_chart(&mut self, chart: &ChartSpec);

    fn mount_graphic(&mut self, graphic: &VectorGraphic);

    fn mount_text(&mut self, text: &FormulaText);

    fn finish(self) -> Self::Output;
}

/// Mount every region of `reply` onto `target`, chart first, then the
/// vector graphic, then the text.
pub fn mount_reply<M: Mount>(mut target: M, reply: &RenderedReply) -> M::Output {
    let mut regions: Vec<&Region> = reply.regions.iter().collect();
    regions.sort_by_key(|r| r.order());

    target.clear();
    for region in regions {
        match region {
            Region::Chart(chart) => target.mount_chart(chart),
            Region::Graphic(graphic) => target.mount_graphic(graphic),
            Region::Text(text) => target.mount_text(text),
        }
    }
    target.finish()
}

/// Browser markup for one message element.
///
/// Charts are emitted as an empty `div.plot-container` whose `data-plot`
/// attribute carries `{data, layout, config}` for the plotting library.
/// Vector graphics are injected raw. Text runs are always escaped.
#[derive(Debug, Default)]
pub struct HtmlMount {
    html: String,
}

impl HtmlMount {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mount for HtmlMount {
    type Output = String;

    fn clear(&mut self) {
        self.html.clear();
    }

    fn mount_chart(&mut self, chart: &ChartSpec) {
        let plot = json!({
            "data": chart.data,
            "layout": chart.layout,
            "config": chart.config,
        });
        self.html.push_str(&format!(
            r#"<div class="plot-container" data-plot="{}"></div>"#,
            html_escape(&plot.to_string())
        ));
    }

    fn mount_graphic(&mut self, graphic: &VectorGraphic) {
        self.html.push_str(r#"<div class="svg-container">"#);
        self.html.push_str(&graphic.markup);
        self.html.push_str("</div>");
    }

    fn mount_text(&mut self, text: &FormulaText) {
        self.html.push_str(r#"<div class="message-text" style="line-height: 1.6">"#);
        for run in &text.runs {
            match run.kind {
                RunKind::Plain => self.html.push_str("<span>"),
                RunKind::Formula => self.html.push_str(r#"<span class="formula">"#),
            }
            self.html.push_str(&html_escape(&run.text));
            self.html.push_str("</span>");
        }
        self.html.push_str("</div>");
    }

    fn finish(self) -> String {
        self.html
    }
}

/// Terminal rendering: charts are summarized, graphics printed as markup,
/// text printed verbatim with formulas left in `$...$` form.
#[derive(Debug, Default)]
pub struct PlainTextMount {
    blocks: Vec<String>,
}

impl PlainTextMount {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mount for PlainTextMount {
    type Output = String;

    fn clear(&mut self) {
        self.blocks.clear();
    }

    fn mount_chart(&mut self, chart: &ChartSpec) {
        let title = chart
            .layout
            .get("title")
            .and_then(|t| t.as_str().or_else(|| t.get("text").and_then(|x| x.as_str())));
        let traces = chart.data.len();
        let plural = if traces == 1 { "" } else { "s" };
        match title {
            Some(title) => self.blocks.push(format!("[chart: {title}, {traces} trace{plural}]")),
            None => self.blocks.push(format!("[chart: {traces} trace{plural}]")),
        }
    }

    fn mount_graphic(&mut self, graphic: &VectorGraphic) {
        self.blocks.push(format!("[svg]\n{}", graphic.markup.trim()));
    }

    fn mount_text(&mut self, text: &FormulaText) {
        self.blocks.push(text.to_source());
    }

    fn finish(self) -> String {
        self.blocks.join("\n")
    }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
