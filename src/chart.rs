//! Chart specifications for the browser front end.
//!
//! Figures follow the plotly.js JSON layout (`data` + `layout`) so the page
//! can hand them straight to `Plotly.newPlot`.

use serde::{Deserialize, Serialize};

use crate::matrix::{FrameDecomposedProfile, PhaseScoreOutcome};
use crate::orf::{OrfCounts, SummarizedPhaseScores};
use crate::project::ProjectReadLengths;

/// Frame 0, 1 and 2 bar colours
pub const FRAME_COLORS: [&str; 3] = ["#fc8d62", "#66c2a5", "#8da0cb"];

const FIGURE_WIDTH: u32 = 1000;
const SUBPLOT_HEIGHT: u32 = 200;
const MIN_HEIGHT: u32 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlotType {
    /// One bar trace per reading frame
    #[default]
    Bar,
    /// A single coverage line
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Values {
    Int(Vec<i64>),
    Text(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Bar {
        name: String,
        x: Values,
        y: Vec<Option<f64>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        marker: Option<Marker>,
        xaxis: String,
        yaxis: String,
    },
    Scatter {
        name: String,
        x: Vec<i64>,
        y: Vec<f64>,
        mode: String,
        xaxis: String,
        yaxis: String,
    },
    Heatmap {
        x: Vec<String>,
        y: Vec<String>,
        z: Vec<Vec<Option<f64>>>,
        colorscale: String,
    },
    Violin {
        name: String,
        y: Vec<f64>,
        #[serde(rename = "box")]
        box_visible: BoxVisible,
        meanline: BoxVisible,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxVisible {
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub family: String,
    pub size: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub rows: usize,
    pub columns: usize,
    pub pattern: String,
}

/// Subplot title
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub xref: String,
    pub yref: String,
    pub x: f64,
    pub y: f64,
    pub xanchor: String,
    pub yanchor: String,
    pub showarrow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub height: u32,
    pub width: u32,
    pub showlegend: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<Grid>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    pub font: Font,
}

impl Layout {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            height: MIN_HEIGHT,
            width: FIGURE_WIDTH,
            showlegend: true,
            barmode: None,
            grid: None,
            annotations: Vec::new(),
            font: Font {
                family: "Arial".to_string(),
                size: 28,
                color: "#000000".to_string(),
            },
        }
    }

    /// One subplot per title, `per_row` to a row; height grows with the sample count.
    fn subplots(title: &str, titles: &[String], per_row: usize) -> Self {
        let per_row = per_row.max(1);
        let rows = titles.len().div_ceil(per_row).max(1);
        let mut layout = Self::new(title);
        layout.height = (SUBPLOT_HEIGHT * titles.len() as u32).max(MIN_HEIGHT);
        layout.showlegend = false;
        layout.grid = Some(Grid {
            rows,
            columns: per_row,
            pattern: "independent".to_string(),
        });
        layout.annotations = titles
            .iter()
            .enumerate()
            .map(|(cell, text)| Annotation {
                text: text.clone(),
                xref: format!("{} domain", axis_id("x", cell)),
                yref: format!("{} domain", axis_id("y", cell)),
                x: 0.5,
                y: 1.0,
                xanchor: "center".to_string(),
                yanchor: "bottom".to_string(),
                showarrow: false,
            })
            .collect();
        layout
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

/// plotly axis name of a subplot cell, counted row-major from 0: `x`, `x2`, `x3`, ...
fn axis_id(prefix: &str, cell: usize) -> String {
    if cell == 0 {
        prefix.to_string()
    } else {
        format!("{}{}", prefix, cell + 1)
    }
}

/// Metagene coverage, one subplot per sample that has the selected fragment length.
pub fn metagene_figure(profile: &FrameDecomposedProfile, plot_type: PlotType, samples_per_row: usize) -> Figure {
    let titles: Vec<String> = profile.samples.iter().map(|s| s.sample.clone()).collect();
    let mut layout = Layout::subplots("Metagene distribution", &titles, samples_per_row);
    // height follows the whole project, including samples without this length
    layout.height = (SUBPLOT_HEIGHT * profile.sample_ids.len() as u32).max(MIN_HEIGHT);

    let mut data = Vec::new();
    for (cell, sample) in profile.samples.iter().enumerate() {
        let (xaxis, yaxis) = (axis_id("x", cell), axis_id("y", cell));
        match plot_type {
            PlotType::Bar => {
                for (frame, series) in sample.frames.iter().enumerate() {
                    data.push(Trace::Bar {
                        name: format!("Frame {}", frame),
                        x: Values::Int(series.positions.clone()),
                        y: series.counts.iter().map(|c| Some(*c)).collect(),
                        marker: Some(Marker {
                            color: FRAME_COLORS[frame].to_string(),
                        }),
                        xaxis: xaxis.clone(),
                        yaxis: yaxis.clone(),
                    });
                }
            }
            PlotType::Line => data.push(Trace::Scatter {
                name: sample.sample.clone(),
                x: sample.coverage.positions.clone(),
                y: sample.coverage.counts.clone(),
                mode: "lines".to_string(),
                xaxis,
                yaxis,
            }),
        }
    }

    Figure { data, layout }
}

/// Read length histogram, one subplot per sample; samples without a summary get an empty subplot.
pub fn read_length_figure(project: &ProjectReadLengths, samples_per_row: usize) -> Figure {
    let titles: Vec<String> = project.sample_ids().to_vec();
    let layout = Layout::subplots("Read length distribution", &titles, samples_per_row);

    let data = project
        .iter()
        .enumerate()
        .map(|(cell, (sample, entry))| {
            let (x, y): (Vec<i64>, Vec<Option<f64>>) = match entry.loaded() {
                Some(dist) => (
                    dist.keys().map(|l| *l as i64).collect(),
                    dist.values().map(|c| Some(*c as f64)).collect(),
                ),
                None => (Vec::new(), Vec::new()),
            };
            Trace::Bar {
                name: sample.to_string(),
                x: Values::Int(x),
                y,
                marker: None,
                xaxis: axis_id("x", cell),
                yaxis: axis_id("y", cell),
            }
        })
        .collect();

    Figure { data, layout }
}

/// Samples × fragment length heatmap; `None` when there is nothing to draw.
pub fn phase_score_heatmap(outcome: &PhaseScoreOutcome) -> Option<Figure> {
    let matrix = outcome.matrix()?;
    let mut layout = Layout::new("Phase score");
    layout.height = (40 * matrix.samples.len() as u32 + 200).max(MIN_HEIGHT);
    layout.font.size = 14;

    Some(Figure {
        data: vec![Trace::Heatmap {
            x: matrix.fragment_lengths.iter().map(|l| l.to_string()).collect(),
            y: matrix.samples.clone(),
            z: matrix.values.clone(),
            colorscale: "Viridis".to_string(),
        }],
        layout,
    })
}

/// Stacked bars of translating ORFs per category
pub fn orf_counts_figure(orfs: &OrfCounts) -> Figure {
    let mut layout = Layout::new("Actively translating ORFs");
    layout.barmode = Some("stack".to_string());
    layout.font.size = 14;

    let data = orfs
        .categories
        .iter()
        .zip(&orfs.counts)
        .map(|(category, counts)| Trace::Bar {
            name: category.clone(),
            x: Values::Text(orfs.samples.clone()),
            y: counts.iter().map(|c| c.map(|c| c as f64)).collect(),
            marker: None,
            xaxis: "x".to_string(),
            yaxis: "y".to_string(),
        })
        .collect();

    Figure { data, layout }
}

/// One violin of per-ORF phase scores per sample
pub fn phase_score_violin(scores: &SummarizedPhaseScores) -> Figure {
    let mut layout = Layout::new("Distribution of phase scores");
    layout.showlegend = false;
    layout.font.size = 14;

    let data = scores
        .samples
        .iter()
        .zip(&scores.scores)
        .map(|(sample, values)| Trace::Violin {
            name: sample.clone(),
            y: values.clone(),
            box_visible: BoxVisible { visible: true },
            meanline: BoxVisible { visible: true },
        })
        .collect();

    Figure { data, layout }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{PhaseScoreMatrix, SampleFrames};
    use crate::profile::PositionSeries;
    use crate::project::SampleEntry;

    fn sample_frames(name: &str) -> SampleFrames {
        let coverage = PositionSeries::from_profile(vec![1.0, 2.0, 3.0, 4.0], 1).unwrap();
        SampleFrames {
            sample: name.to_string(),
            phase_score: Some(0.9),
            frames: coverage.split_frames(),
            coverage,
        }
    }

    #[test]
    fn test_axis_ids() {
        assert_eq!(axis_id("x", 0), "x");
        assert_eq!(axis_id("y", 1), "y2");
        assert_eq!(axis_id("x", 9), "x10");
    }

    #[test]
    fn test_metagene_bar_figure() {
        let profile = FrameDecomposedProfile {
            fragment_length: 28,
            sample_ids: vec!["A".into(), "B".into(), "C".into()],
            samples: vec![sample_frames("A"), sample_frames("C")],
        };
        let figure = metagene_figure(&profile, PlotType::Bar, 1);

        assert_eq!(figure.data.len(), 6);
        assert_eq!(figure.layout.height, 600);
        assert_eq!(figure.layout.annotations.len(), 2);
        assert_eq!(figure.layout.annotations[1].text, "C");
        match &figure.data[3] {
            Trace::Bar { name, x, marker, xaxis, .. } => {
                assert_eq!(name, "Frame 0");
                assert_eq!(x, &Values::Int(vec![0]));
                assert_eq!(marker.as_ref().unwrap().color, FRAME_COLORS[0]);
                assert_eq!(xaxis, "x2");
            }
            other => panic!("unexpected trace {:?}", other),
        }
    }

    #[test]
    fn test_metagene_line_figure() {
        let profile = FrameDecomposedProfile {
            fragment_length: 28,
            sample_ids: vec!["A".into()],
            samples: vec![sample_frames("A")],
        };
        let figure = metagene_figure(&profile, PlotType::Line, 2);
        assert_eq!(figure.data.len(), 1);
        assert_eq!(figure.layout.grid.as_ref().unwrap().columns, 2);
        assert_eq!(figure.layout.grid.as_ref().unwrap().rows, 1);
        match &figure.data[0] {
            Trace::Scatter { x, mode, .. } => {
                assert_eq!(x, &vec![-1, 0, 1, 2]);
                assert_eq!(mode, "lines");
            }
            other => panic!("unexpected trace {:?}", other),
        }
    }

    #[test]
    fn test_read_length_figure_keeps_placeholders() {
        let mut project = ProjectReadLengths::default();
        project.insert("A", SampleEntry::Missing);
        project.insert("B", SampleEntry::Loaded([(28, 5), (29, 9)].into_iter().collect()));
        let figure = read_length_figure(&project, 1);

        assert_eq!(figure.data.len(), 2);
        match &figure.data[1] {
            Trace::Bar { x, y, .. } => {
                assert_eq!(x, &Values::Int(vec![28, 29]));
                assert_eq!(y, &vec![Some(5.0), Some(9.0)]);
            }
            other => panic!("unexpected trace {:?}", other),
        }
        let json = serde_json::to_value(&figure).unwrap();
        assert_eq!(json["data"][0]["type"], "bar");
        assert_eq!(json["data"][0]["x"], serde_json::json!([]));
    }

    #[test]
    fn test_heatmap_absent_without_data() {
        assert!(phase_score_heatmap(&PhaseScoreOutcome::NoData).is_none());

        let outcome = PhaseScoreOutcome::Matrix(PhaseScoreMatrix {
            samples: vec!["B".into(), "A".into()],
            fragment_lengths: vec![28, 29],
            values: vec![vec![None, Some(0.2)], vec![Some(0.1), None]],
        });
        let figure = phase_score_heatmap(&outcome).unwrap();
        let json = serde_json::to_value(&figure).unwrap();
        assert_eq!(json["data"][0]["type"], "heatmap");
        assert_eq!(json["data"][0]["x"], serde_json::json!(["28", "29"]));
        assert_eq!(json["data"][0]["z"][0][0], serde_json::Value::Null);
    }

    #[test]
    fn test_orf_counts_stacked() {
        let orfs = OrfCounts {
            samples: vec!["S1".into()],
            categories: vec!["annotated".into(), "uORF".into()],
            counts: vec![vec![Some(10)], vec![None]],
        };
        let figure = orf_counts_figure(&orfs);
        assert_eq!(figure.layout.barmode.as_deref(), Some("stack"));
        assert_eq!(figure.data.len(), 2);
    }

    #[test]
    fn test_violin_box_key() {
        let scores = SummarizedPhaseScores {
            samples: vec!["S1".into()],
            scores: vec![vec![0.2, 0.8]],
            orf_count: 2,
        };
        let json = serde_json::to_value(phase_score_violin(&scores)).unwrap();
        assert_eq!(json["data"][0]["type"], "violin");
        assert_eq!(json["data"][0]["box"]["visible"], true);
    }
}
