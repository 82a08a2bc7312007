//! Chart document model
//!
//! A [`ChartDocument`] is the figure JSON understood by the Plotly.js runtime,
//! plus an HTML renderer producing a self-contained fragment. The runtime itself
//! is never embedded; the consuming page loads it once.

use serde::Serialize;

use crate::error::Result;

/// One data layer of a figure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Pie(PieTrace),
    Bar(BarTrace),
    Scatter(ScatterTrace),
}

/// Ring or pie slices
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieTrace {
    pub labels: Vec<String>,
    pub values: Vec<i64>,
    pub hole: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

/// Vertical bars over a category axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarTrace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

/// Line (and marker) series over a category axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<i64>,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub color: String,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub size: u32,
}

/// Free-floating text placed in paper coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub xref: String,
    pub yref: String,
    pub showarrow: bool,
    pub font: Font,
}

impl Annotation {
    /// Text centered in the plotting area
    pub fn centered(text: impl Into<String>, font_size: u32) -> Self {
        Self {
            text: text.into(),
            x: 0.5,
            y: 0.5,
            xref: "paper".to_string(),
            yref: "paper".to_string(),
            showarrow: false,
            font: Font { size: font_size },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<AxisTitle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoryorder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoryarray: Option<Vec<String>>,
}

impl Axis {
    pub fn titled(text: impl Into<String>) -> Self {
        Self {
            title: Some(AxisTitle { text: text.into() }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub orientation: String,
    pub x: f64,
    pub y: f64,
    pub xanchor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis2: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_bgcolor: Option<String>,
}

/// Renderable figure: traces plus layout
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartDocument {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl ChartDocument {
    /// Number of traces
    pub fn trace_count(&self) -> usize {
        self.data.len()
    }

    /// Render as an HTML fragment with a fresh div id
    pub fn render(&self) -> Result<String> {
        let div_id = uuid::Uuid::new_v4().to_string();
        self.render_with_id(&div_id)
    }

    /// Render as an HTML fragment bound to `div_id`
    ///
    /// Output is a `<div>` and a `<script>` calling `Plotly.newPlot`; it assumes
    /// the Plotly.js runtime is already present on the page.
    pub fn render_with_id(&self, div_id: &str) -> Result<String> {
        let data = script_safe(serde_json::to_string(&self.data)?);
        let layout = script_safe(serde_json::to_string(&self.layout)?);

        Ok(format!(
            r#"<div><div id="{div_id}" class="plotly-graph-div" style="height:100%; width:100%;"></div><script type="text/javascript">window.PLOTLYENV=window.PLOTLYENV || {{}};if (document.getElementById("{div_id}")) {{Plotly.newPlot("{div_id}", {data}, {layout}, {{"responsive": true}});}}</script></div>"#
        ))
    }
}

/// Keep serialized JSON from closing the surrounding script element
fn script_safe(json: String) -> String {
    json.replace("</", "<\\/")
}
