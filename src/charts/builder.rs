//! Donut and trend chart builders

use super::aggregation::{filter_session, grand_total, group_sum, session_totals, sorted_sessions};
use super::figure::{
    Annotation, Axis, BarTrace, ChartDocument, Layout, Legend, Line, Marker, PieTrace,
    ScatterTrace, Trace,
};
use crate::types::{GroupField, HeadcountRecord};

// =============================================================================
// Palettes
// =============================================================================

/// Sequential purple-red
pub const PURD: &[&str] = &[
    "rgb(247,244,249)",
    "rgb(231,225,239)",
    "rgb(212,185,218)",
    "rgb(201,148,199)",
    "rgb(223,101,176)",
    "rgb(231,41,138)",
    "rgb(206,18,86)",
    "rgb(152,0,67)",
    "rgb(103,0,31)",
];

/// Sequential blue-yellow
pub const BLUYL: &[&str] = &[
    "rgb(247, 254, 174)",
    "rgb(183, 230, 165)",
    "rgb(124, 203, 162)",
    "rgb(70, 174, 160)",
    "rgb(4, 130, 153)",
    "rgb(4, 82, 117)",
];

/// Jet, used for staff trend lines
pub const JET: &[&str] = &[
    "rgb(0,0,131)",
    "rgb(0,60,170)",
    "rgb(5,255,255)",
    "rgb(255,255,0)",
    "rgb(250,0,0)",
    "rgb(128,0,0)",
];

/// Fill of the total bars behind trend lines
pub const TOTAL_BAR_COLOR: &str = "rgb(231, 225, 239)";

/// Color for the highlighted category at `index`, wrapping around the palette
pub fn palette_color(palette: &[&str], index: usize) -> String {
    palette[index % palette.len()].to_string()
}

// =============================================================================
// Styles
// =============================================================================

/// Presentation knobs for [`donut_chart`]
#[derive(Debug, Clone, Copy)]
pub struct DonutStyle {
    pub palette: &'static [&'static str],
    /// Render the total as `1,500` rather than `1500`
    pub thousands_separator: bool,
}

impl DonutStyle {
    pub const STAFF: DonutStyle = DonutStyle {
        palette: PURD,
        thousands_separator: false,
    };

    pub const STUDENT: DonutStyle = DonutStyle {
        palette: BLUYL,
        thousands_separator: true,
    };
}

impl Default for DonutStyle {
    fn default() -> Self {
        Self::STAFF
    }
}

/// Axis titles for [`trend_chart`]
#[derive(Debug, Clone)]
pub struct TrendStyle {
    pub x_title: String,
    pub total_title: String,
    pub series_title: String,
    pub total_name: String,
    /// Line colors, indexed by position in the highlighted list
    pub line_palette: &'static [&'static str],
}

impl TrendStyle {
    pub fn staff() -> Self {
        Self {
            x_title: "Academic Session".to_string(),
            total_title: "Total Staff Count".to_string(),
            series_title: "Position Count".to_string(),
            total_name: "Total Staff".to_string(),
            line_palette: JET,
        }
    }

    pub fn student() -> Self {
        Self {
            x_title: "Academic Session".to_string(),
            total_title: "Total Students".to_string(),
            series_title: "Number of Students".to_string(),
            total_name: "Total Students".to_string(),
            line_palette: BLUYL,
        }
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Ring chart of one session's rows, grouped by `field`, with the total in the middle
///
/// An empty selection yields zero slices and a total of `0`.
pub fn donut_chart(
    records: &[HeadcountRecord],
    session: &str,
    field: GroupField,
    style: DonutStyle,
) -> ChartDocument {
    let groups = group_sum(filter_session(records, session), field);
    let total = grand_total(filter_session(records, session));

    let (labels, values): (Vec<String>, Vec<i64>) = groups.into_iter().unzip();
    let colors = (0..labels.len())
        .map(|i| palette_color(style.palette, i))
        .collect();

    let label = if style.thousands_separator {
        format_thousands(total)
    } else {
        total.to_string()
    };

    ChartDocument {
        data: vec![Trace::Pie(PieTrace {
            labels,
            values,
            hole: 0.7,
            marker: Some(Marker {
                colors: Some(colors),
                ..Default::default()
            }),
        })],
        layout: Layout {
            annotations: vec![Annotation::centered(label, 25)],
            ..Default::default()
        },
    }
}

/// Dual-axis trend: total bars per session with one line per highlighted category
///
/// Sessions on the shared axis are sorted. Bars use `y`, lines use `y2` overlaid on
/// the right. Line colors follow the position in `highlighted` within the style's
/// line palette.
pub fn trend_chart(
    records: &[HeadcountRecord],
    field: GroupField,
    highlighted: &[String],
    style: &TrendStyle,
) -> ChartDocument {
    let sessions = sorted_sessions(records);
    let (bar_x, bar_y): (Vec<String>, Vec<i64>) = session_totals(records).into_iter().unzip();

    let mut data = vec![Trace::Bar(BarTrace {
        name: style.total_name.clone(),
        x: bar_x,
        y: bar_y,
        yaxis: Some("y".to_string()),
        marker: Some(Marker {
            color: Some(TOTAL_BAR_COLOR.to_string()),
            ..Default::default()
        }),
    })];

    for (index, category) in highlighted.iter().enumerate() {
        let selected: Vec<HeadcountRecord> = records
            .iter()
            .filter(|r| field.value(r) == category.as_str())
            .cloned()
            .collect();
        let (x, y): (Vec<String>, Vec<i64>) = session_totals(&selected).into_iter().unzip();
        let color = palette_color(style.line_palette, index);

        data.push(Trace::Scatter(ScatterTrace {
            name: category.clone(),
            x,
            y,
            mode: "lines+markers".to_string(),
            yaxis: Some("y2".to_string()),
            line: Some(Line {
                color: color.clone(),
                width: 2,
            }),
            marker: Some(Marker {
                color: Some(color),
                size: Some(6),
                ..Default::default()
            }),
        }));
    }

    ChartDocument {
        data,
        layout: Layout {
            xaxis: Some(Axis {
                axis_type: Some("category".to_string()),
                categoryorder: Some("array".to_string()),
                categoryarray: Some(sessions),
                ..Axis::titled(style.x_title.clone())
            }),
            yaxis: Some(Axis {
                side: Some("left".to_string()),
                showgrid: Some(false),
                ..Axis::titled(style.total_title.clone())
            }),
            yaxis2: Some(Axis {
                side: Some("right".to_string()),
                overlaying: Some("y".to_string()),
                showgrid: Some(false),
                ..Axis::titled(style.series_title.clone())
            }),
            legend: Some(Legend {
                orientation: "v".to_string(),
                x: 1.06,
                y: 0.0,
                xanchor: "left".to_string(),
            }),
            barmode: Some("overlay".to_string()),
            plot_bgcolor: Some("rgba(0,0,0,0)".to_string()),
            ..Default::default()
        },
    }
}

/// `1234567` -> `1,234,567`
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pie(doc: &ChartDocument) -> &PieTrace {
        match &doc.data[0] {
            Trace::Pie(p) => p,
            other => panic!("expected pie, got {other:?}"),
        }
    }

    fn students() -> Vec<HeadcountRecord> {
        vec![
            HeadcountRecord::new("2023/2024", "UG", "Technology", 100),
            HeadcountRecord::new("2023/2024", "PG", "Technology", 50),
            HeadcountRecord::new("2022/2023", "UG", "Technology", 90),
        ]
    }

    #[test]
    fn test_donut_empty_records() {
        let doc = donut_chart(&[], "2023/2024", GroupField::Category, DonutStyle::STUDENT);
        assert!(pie(&doc).labels.is_empty());
        assert!(pie(&doc).values.is_empty());
        assert_eq!(doc.layout.annotations[0].text, "0");
    }

    #[test]
    fn test_donut_filters_session() {
        let records = students();
        let doc = donut_chart(&records, "2023/2024", GroupField::Category, DonutStyle::STAFF);
        let pie = pie(&doc);

        // Slices in key order
        assert_eq!(pie.labels, vec!["PG", "UG"]);
        assert_eq!(pie.values, vec![50, 100]);
        assert_eq!(pie.hole, 0.7);
        assert_eq!(doc.layout.annotations[0].text, "150");
        assert_eq!(doc.layout.annotations[0].x, 0.5);
        assert_eq!(doc.layout.annotations[0].font.size, 25);
    }

    #[test]
    fn test_donut_does_not_mutate_input() {
        let records = students();
        let before = records.clone();
        let _ = donut_chart(&records, "2023/2024", GroupField::Category, DonutStyle::STAFF);
        assert_eq!(records, before);
    }

    #[test]
    fn test_donut_student_total_uses_separator() {
        let records = vec![HeadcountRecord::new("2023/2024", "UG", "Science", 12_500)];
        let doc = donut_chart(&records, "2023/2024", GroupField::Category, DonutStyle::STUDENT);
        assert_eq!(doc.layout.annotations[0].text, "12,500");
    }

    #[test]
    fn test_trend_axis_sorted_regardless_of_input_order() {
        let records = vec![
            HeadcountRecord::new("2023/2024", "Professor", "Technology", 10),
            HeadcountRecord::new("2021/2022", "Lecturer 1", "Technology", 4),
            HeadcountRecord::new("2022/2023", "Professor", "Science", 8),
            HeadcountRecord::new("2023/2024", "Lecturer 1", "Science", 6),
        ];
        let highlighted = vec!["Lecturer 1".to_string(), "Professor".to_string()];
        let doc = trend_chart(&records, GroupField::Category, &highlighted, &TrendStyle::staff());

        let xaxis = doc.layout.xaxis.as_ref().unwrap();
        assert_eq!(
            xaxis.categoryarray.as_deref().unwrap(),
            &["2021/2022", "2022/2023", "2023/2024"]
        );

        match &doc.data[0] {
            Trace::Bar(bar) => {
                assert_eq!(bar.x, vec!["2021/2022", "2022/2023", "2023/2024"]);
                assert_eq!(bar.y, vec![4, 8, 16]);
            }
            other => panic!("expected bar, got {other:?}"),
        }
        assert_eq!(doc.layout.barmode.as_deref(), Some("overlay"));
        assert_eq!(
            doc.layout.yaxis2.as_ref().unwrap().overlaying.as_deref(),
            Some("y")
        );
    }

    #[test]
    fn test_trend_lines_follow_highlight_order() {
        let records = vec![
            HeadcountRecord::new("2023/2024", "Professor", "Technology", 10),
            HeadcountRecord::new("2022/2023", "Professor", "Science", 8),
            HeadcountRecord::new("2023/2024", "Lecturer 1", "Science", 6),
            HeadcountRecord::new("2023/2024", "Technologist", "Science", 99),
        ];
        let highlighted = vec!["Professor".to_string(), "Lecturer 1".to_string()];
        let doc = trend_chart(&records, GroupField::Category, &highlighted, &TrendStyle::staff());

        assert_eq!(doc.trace_count(), 3);
        let lines: Vec<&ScatterTrace> = doc
            .data
            .iter()
            .filter_map(|t| match t {
                Trace::Scatter(s) => Some(s),
                _ => None,
            })
            .collect();

        assert_eq!(lines[0].name, "Professor");
        assert_eq!(lines[0].x, vec!["2022/2023", "2023/2024"]);
        assert_eq!(lines[0].y, vec![8, 10]);
        assert_eq!(lines[0].line.as_ref().unwrap().color, JET[0]);
        assert_eq!(lines[0].yaxis.as_deref(), Some("y2"));

        assert_eq!(lines[1].name, "Lecturer 1");
        assert_eq!(lines[1].x, vec!["2023/2024"]);
        assert_eq!(lines[1].line.as_ref().unwrap().color, JET[1]);
    }

    #[test]
    fn test_student_trend_lines_use_bluyl() {
        let highlighted = vec!["PG".to_string(), "UG".to_string()];
        let doc = trend_chart(&students(), GroupField::Category, &highlighted, &TrendStyle::student());

        let colors: Vec<&str> = doc
            .data
            .iter()
            .filter_map(|t| match t {
                Trace::Scatter(s) => Some(s.line.as_ref().unwrap().color.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec![BLUYL[0], BLUYL[1]]);
    }

    #[test]
    fn test_trend_empty_highlight_still_has_bars() {
        let doc = trend_chart(&students(), GroupField::Category, &[], &TrendStyle::student());
        assert_eq!(doc.trace_count(), 1);
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(palette_color(JET, 0), JET[0]);
        assert_eq!(palette_color(JET, JET.len() + 1), JET[1]);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(150), "150");
        assert_eq!(format_thousands(1_500), "1,500");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
        assert_eq!(format_thousands(-4_200), "-4,200");
    }
}
