//! State outreach report decks.
//!
//! The dashboard posts pre-aggregated statistics for one state. This module
//! turns them into a [`DeckPlan`]: the ordered slides with their text, metric
//! values and chart geometry. Drawing the deck is left to a
//! [`ReportRenderer`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::cell::CellValue;

/// Total width of the ownership breakdown bar.
pub const OWNERSHIP_BAR_WIDTH: u32 = 640;
/// Usable height of the weekly chart bars.
pub const WEEKLY_BAR_HEIGHT: u32 = 200;
/// Segments and bars never shrink below this.
pub const MIN_BAR_SIZE: u32 = 4;
/// Ownership segments narrower than this carry no caption.
pub const SEGMENT_LABEL_MIN_WIDTH: u32 = 40;
/// Deals listed on the pipeline table slide.
pub const MAX_PIPELINE_ROWS: usize = 12;

pub const PIPELINE_COLUMNS: [&str; 6] =
    ["Facility", "Status", "NDA", "EBITDA", "Asking Price", "Priority"];

// ============================================================================
// Input
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub state_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub generated_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: OutreachSummary,
    #[serde(deserialize_with = "null_as_default")]
    pub pipeline: PipelineSummary,
    #[serde(deserialize_with = "null_as_default")]
    pub weekly_data: Vec<WeeklyBucket>,
    #[serde(deserialize_with = "null_as_default")]
    pub ownership_counts: IndexMap<String, u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub medium_counts: IndexMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutreachSummary {
    #[serde(deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub mom_n_pop: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub contacted: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_msgs: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub mnp_contacted: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub mnp_responded: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub mnp_not_responded: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub mnp_assisted_meeting: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub mnp_in_pipeline: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineSummary {
    #[serde(deserialize_with = "null_as_default")]
    pub total_deals: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub nda_signed: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub nda_sent: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub loi_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub loi_deals: Vec<DealDetail>,
    #[serde(deserialize_with = "null_as_default")]
    pub ebitda_deals: Vec<DealDetail>,
    #[serde(deserialize_with = "null_as_default")]
    pub details: Vec<DealDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DealDetail {
    pub name: CellValue,
    pub status: CellValue,
    pub nda_status: CellValue,
    pub ebitda: CellValue,
    pub asking_price: CellValue,
    pub priority: CellValue,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeeklyBucket {
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub scheduled: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub not_scheduled: u64,
}

/// Reads an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Plan
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckPlan {
    pub title: String,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Slide {
    Title {
        heading: String,
        state_name: String,
        subtitle: String,
        branding: String,
    },
    Overview {
        title: String,
        metrics: Vec<MetricCard>,
        funnel_heading: String,
        funnel: Vec<FunnelStep>,
        progress: String,
        loi_details: Option<String>,
        ebitda_details: Option<String>,
        ownership: Vec<BarSegment>,
    },
    WeeklyChart {
        title: String,
        bars: Vec<WeeklyBar>,
        channels: Option<String>,
    },
    PipelineTable {
        title: String,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
        overflow_note: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStep {
    pub label: String,
    pub value: u64,
    pub percent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSegment {
    pub label: String,
    pub count: u64,
    pub width: u32,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyBar {
    pub label: String,
    pub count: u64,
    pub height: u32,
    pub scheduled_height: u32,
    pub caption: String,
}

fn ratio(part: u64, whole: u64) -> f64 {
    part as f64 / whole as f64
}

fn scaled(part: u64, whole: u64, span: u32) -> u32 {
    (ratio(part, whole) * f64::from(span)).round() as u32
}

fn text_or(value: &CellValue, placeholder: &str) -> String {
    if value.is_blank() {
        placeholder.to_string()
    } else {
        value.display_text()
    }
}

impl DeckPlan {
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}

/// Lay out the deck. Title and overview slides are always present; the
/// weekly chart needs at least one week of data and the pipeline table at
/// least one deal.
pub fn plan_deck(req: &ReportRequest) -> DeckPlan {
    let mut slides = vec![title_slide(req), overview_slide(req)];
    if !req.weekly_data.is_empty() {
        slides.push(weekly_chart_slide(req));
    }
    if req.pipeline.total_deals > 0 {
        slides.push(pipeline_slide(req));
    }
    DeckPlan {
        title: format!(
            "State Outreach Report — {} ({})",
            req.state_name, req.generated_date
        ),
        slides,
    }
}

fn title_slide(req: &ReportRequest) -> Slide {
    Slide::Title {
        heading: "State Outreach Report".to_string(),
        state_name: req.state_name.clone(),
        subtitle: format!(
            "{}  •  {} Companies Tracked  •  {} Messages Sent",
            req.generated_date, req.summary.total, req.summary.total_msgs
        ),
        branding: "Behavioral Health Outreach Hub".to_string(),
    }
}

fn overview_slide(req: &ReportRequest) -> Slide {
    let s = &req.summary;
    let p = &req.pipeline;

    let metrics = [
        ("Total Companies", s.total),
        ("Mom 'n Pops", s.mom_n_pop),
        ("Contacted", s.contacted),
        ("Messages Sent", s.total_msgs),
    ]
    .into_iter()
    .map(|(label, value)| MetricCard {
        label: label.to_string(),
        value,
    })
    .collect();

    let base = s.mom_n_pop.max(1);
    let funnel = [
        ("Not Responded", s.mnp_not_responded),
        ("Responded", s.mnp_responded),
        ("Meetings", s.mnp_assisted_meeting),
        ("In Pipeline", s.mnp_in_pipeline),
    ]
    .into_iter()
    .map(|(label, value)| FunnelStep {
        label: label.to_string(),
        value,
        percent: format!("{:.1}%", ratio(value, base) * 100.0),
    })
    .collect();

    let progress = format!(
        "Pipeline Deals: {}  |  NDAs Signed: {}  |  NDAs Sent: {}  |  LOIs: {}",
        p.total_deals, p.nda_signed, p.nda_sent, p.loi_count
    );

    let loi_details = (!p.loi_deals.is_empty()).then(|| {
        let lines: Vec<String> = p
            .loi_deals
            .iter()
            .map(|d| {
                if d.asking_price.is_blank() {
                    d.name.display_text()
                } else {
                    format!("{} ({})", d.name.display_text(), d.asking_price.display_text())
                }
            })
            .collect();
        format!("LOI Details: {}", lines.join("  |  "))
    });

    let ebitda_details = (!p.ebitda_deals.is_empty()).then(|| {
        let lines: Vec<String> = p
            .ebitda_deals
            .iter()
            .map(|d| format!("{}: {}", d.name.display_text(), d.ebitda.display_text()))
            .collect();
        format!("EBITDA: {}", lines.join("  |  "))
    });

    let total = s.total.max(1);
    let ownership = req
        .ownership_counts
        .iter()
        .map(|(label, &count)| {
            let width = scaled(count, total, OWNERSHIP_BAR_WIDTH).max(MIN_BAR_SIZE);
            BarSegment {
                label: label.clone(),
                count,
                width,
                caption: (width > SEGMENT_LABEL_MIN_WIDTH).then(|| format!("{label} ({count})")),
            }
        })
        .collect();

    Slide::Overview {
        title: "Executive Overview".to_string(),
        metrics,
        funnel_heading: format!("Outreach Funnel — Mom 'n Pop ({} companies)", s.mom_n_pop),
        funnel,
        progress,
        loi_details,
        ebitda_details,
        ownership,
    }
}

fn weekly_chart_slide(req: &ReportRequest) -> Slide {
    let max = req
        .weekly_data
        .iter()
        .map(|w| w.count)
        .max()
        .unwrap_or(0)
        .max(1);

    let bars = req
        .weekly_data
        .iter()
        .map(|w| {
            let height = scaled(w.count, max, WEEKLY_BAR_HEIGHT).max(MIN_BAR_SIZE);
            let scheduled_height = if w.count > 0 {
                scaled(w.scheduled, w.count, height).min(height)
            } else {
                0
            };
            let caption = if w.scheduled > 0 {
                format!("{}/{}", w.scheduled, w.count)
            } else {
                w.count.to_string()
            };
            WeeklyBar {
                label: w.label.clone(),
                count: w.count,
                height,
                scheduled_height,
                caption,
            }
        })
        .collect();

    let channels = (!req.medium_counts.is_empty()).then(|| {
        let parts: Vec<String> = req
            .medium_counts
            .iter()
            .map(|(medium, count)| format!("{medium} ({count})"))
            .collect();
        format!("By Channel: {}", parts.join("  •  "))
    });

    Slide::WeeklyChart {
        title: format!("Weekly Outreach Activity — {}", req.state_name),
        bars,
        channels,
    }
}

fn pipeline_slide(req: &ReportRequest) -> Slide {
    let details = &req.pipeline.details;
    let rows = details
        .iter()
        .take(MAX_PIPELINE_ROWS)
        .map(|d| {
            vec![
                text_or(&d.name, "-"),
                text_or(&d.status, "-"),
                text_or(&d.nda_status, "-"),
                text_or(&d.ebitda, "TBD"),
                text_or(&d.asking_price, "TBD"),
                text_or(&d.priority, "-"),
            ]
        })
        .collect();
    let overflow_note = (details.len() > MAX_PIPELINE_ROWS).then(|| {
        format!(
            "+ {} additional deals not shown",
            details.len() - MAX_PIPELINE_ROWS
        )
    });

    Slide::PipelineTable {
        title: format!("Pipeline Details — {}", req.state_name),
        columns: PIPELINE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
        overflow_note,
    }
}

// ============================================================================
// Rendering
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDeck {
    pub url: String,
    pub slide_count: usize,
}

/// Port for whatever draws the deck (a slides API, a PDF writer, ...).
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    async fn render(&self, plan: &DeckPlan) -> Result<RenderedDeck>;
}

/// Writes each deck plan as a JSON document into a directory.
pub struct JsonDeckRenderer {
    output_dir: PathBuf,
}

impl JsonDeckRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeckDocument<'a> {
    id: Uuid,
    generated_at: chrono::DateTime<chrono::Utc>,
    deck: &'a DeckPlan,
}

#[async_trait]
impl ReportRenderer for JsonDeckRenderer {
    async fn render(&self, plan: &DeckPlan) -> Result<RenderedDeck> {
        let id = Uuid::new_v4();
        let doc = DeckDocument {
            id,
            generated_at: chrono::Utc::now(),
            deck: plan,
        };
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("failed to create {}", self.output_dir.display()))?;
        let path = self.output_dir.join(format!("{id}.json"));
        tokio::fs::write(&path, serde_json::to_vec_pretty(&doc)?)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), slides = plan.slide_count(), "deck written");
        Ok(RenderedDeck {
            url: format!("file://{}", path.display()),
            slide_count: plan.slide_count(),
        })
    }
}
