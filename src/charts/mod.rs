//! Aggregation and chart building
//!
//! Pure functions from headcount rows to renderable [`ChartDocument`]s. Nothing
//! here performs I/O.
//!
//! - **Aggregation**: session filter, group-and-sum, session totals (`aggregation.rs`)
//! - **Figure model**: Plotly-compatible traces and layout, HTML fragment rendering (`figure.rs`)
//! - **Builders**: donut-by-category and dual-axis trend charts (`builder.rs`)

pub mod aggregation;
mod builder;
mod figure;

pub use aggregation::SessionCategoryTotal;
pub use builder::{
    donut_chart, format_thousands, palette_color, trend_chart, DonutStyle, TrendStyle, BLUYL,
    JET, PURD, TOTAL_BAR_COLOR,
};
pub use figure::{
    Annotation, Axis, AxisTitle, BarTrace, ChartDocument, Font, Layout, Legend, Line, Marker,
    PieTrace, ScatterTrace, Trace,
};
