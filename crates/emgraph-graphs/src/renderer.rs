//! Graph rendering trait implementation backed by plotters.

use crate::{chart::ConsumptionChart, traits::GraphRenderer, utils::GraphUtils};
use async_trait::async_trait;
use emgraph_common::Result;
use emgraph_config::{ChartConfig, StylingConfig};
use plotters::{
    coord::Shift,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use std::path::Path;
use tracing::{debug, info, instrument};

const FONT_FAMILY: &str = "sans-serif";
const CHART_MARGIN: u32 = 20;
const X_LABEL_AREA: u32 = 120;
const Y_LABEL_AREA: u32 = 80;
const ANNOTATION_INSET: i32 = 10;

/// Parse a `#rrggbb` string. Anything else is black.
pub fn parse_color(color_str: &str) -> RGBColor {
    if let Some(hex) = color_str.strip_prefix('#') {
        if hex.len() == 6 && hex.is_ascii() {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return RGBColor(r, g, b);
            }
        }
    }
    RGBColor(0, 0, 0)
}

/// Resolved colors and bar geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    /// Figure background.
    pub background: RGBColor,
    /// Bar fill.
    pub bar: RGBColor,
    /// Bar outline.
    pub bar_outline: RGBColor,
    /// Grid lines.
    pub grid: RGBColor,
    /// All text.
    pub text: RGBColor,
    /// Fraction of a slot covered by its bar.
    pub bar_width_ratio: f64,
    /// Whether to draw grid lines.
    pub enable_grid: bool,
}

impl ChartStyle {
    /// Resolve the styling section.
    pub fn from_config(styling: &StylingConfig) -> Self {
        Self {
            background: parse_color(&styling.colors.background),
            bar: parse_color(&styling.colors.bar),
            bar_outline: parse_color(&styling.colors.bar_outline),
            grid: parse_color(&styling.colors.grid),
            text: parse_color(&styling.colors.text),
            bar_width_ratio: styling.bar_width_ratio.clamp(0.05, 1.0),
            enable_grid: styling.enable_grid,
        }
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::from_config(&StylingConfig::default())
    }
}

/// Renders the consumption chart as a PNG bar chart.
#[derive(Debug, Clone)]
pub struct BarChartRenderer {
    width: u32,
    height: u32,
    style: ChartStyle,
}

impl BarChartRenderer {
    /// Creates a renderer producing `width`×`height` images.
    pub const fn new(width: u32, height: u32, style: ChartStyle) -> Self {
        Self {
            width,
            height,
            style,
        }
    }

    /// Renderer described by the chart section.
    pub fn from_config(chart: &ChartConfig) -> Self {
        Self::new(chart.width, chart.height, ChartStyle::from_config(&chart.styling))
    }

    /// Output size in pixels.
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixels left empty on each side of a bar so it covers
    /// `bar_width_ratio` of its slot.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn bar_margin(&self, bars: usize) -> u32 {
        let plot_width = self
            .width
            .saturating_sub(Y_LABEL_AREA + 2 * CHART_MARGIN);
        let slot = f64::from(plot_width) / bars.max(1) as f64;
        (slot * (1.0 - self.style.bar_width_ratio) / 2.0).floor() as u32
    }

    fn draw(&self, chart: &ConsumptionChart, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&self.style.background)?;

        let style = &self.style;
        let bar_count = u32::try_from(chart.bars.len()).unwrap_or(u32::MAX).max(1);
        let labels = chart.labels();

        let mut ctx = ChartBuilder::on(&root)
            .caption(
                &chart.title,
                (FONT_FAMILY, 24).into_font().color(&style.text),
            )
            .margin(CHART_MARGIN)
            .x_label_area_size(X_LABEL_AREA)
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d((0u32..bar_count).into_segmented(), chart.y_range())?;

        let x_formatter = |value: &SegmentValue<u32>| match value {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => labels
                .get(*i as usize)
                .map_or_else(String::new, |label| (*label).to_string()),
            SegmentValue::Last => String::new(),
        };

        let mut mesh = ctx.configure_mesh();
        mesh.x_labels(GraphUtils::label_count(chart.bars.len()))
            .x_label_formatter(&x_formatter)
            .x_label_style(
                (FONT_FAMILY, 12)
                    .into_font()
                    .transform(FontTransform::Rotate90)
                    .color(&style.text),
            )
            .y_label_style((FONT_FAMILY, 14).into_font().color(&style.text))
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .axis_desc_style((FONT_FAMILY, 16).into_font().color(&style.text))
            .axis_style(style.text)
            .bold_line_style(style.grid.mix(0.6))
            .light_line_style(TRANSPARENT);
        if !style.enable_grid {
            mesh.disable_mesh();
        }
        mesh.draw()?;

        // One rectangle per slot, filled then outlined, inset by the bar margin.
        let margin = self.bar_margin(chart.bars.len());
        for (i, bar) in (0u32..).zip(&chart.bars) {
            let corners = [
                (SegmentValue::Exact(i), 0.0),
                (SegmentValue::Exact(i + 1), bar.value),
            ];
            let mut fill = Rectangle::new(corners.clone(), style.bar.filled());
            fill.set_margin(0, 0, margin, margin);
            let mut outline = Rectangle::new(corners, style.bar_outline.stroke_width(1));
            outline.set_margin(0, 0, margin, margin);

            ctx.draw_series([fill, outline])?;
        }

        let plot = ctx.plotting_area().strip_coord_spec();
        self.draw_annotations(&plot, chart)?;

        root.present()?;
        Ok(())
    }

    fn draw_annotations<DB: DrawingBackend>(
        &self,
        plot: &DrawingArea<DB, Shift>,
        chart: &ConsumptionChart,
    ) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let font = (FONT_FAMILY, 16).into_font().color(&self.style.text);
        let (width, _) = plot.dim_in_pixel();
        let right = i32::try_from(width).unwrap_or(i32::MAX) - ANNOTATION_INSET;

        plot.draw(&Text::new(
            chart.night_annotation(),
            (ANNOTATION_INSET, ANNOTATION_INSET),
            font.pos(Pos::new(HPos::Left, VPos::Top)),
        ))?;
        plot.draw(&Text::new(
            chart.total_annotation(),
            (right, ANNOTATION_INSET),
            font.pos(Pos::new(HPos::Right, VPos::Top)),
        ))?;
        Ok(())
    }
}

impl Default for BarChartRenderer {
    fn default() -> Self {
        Self::from_config(&ChartConfig::default())
    }
}

#[async_trait]
impl GraphRenderer for BarChartRenderer {
    #[instrument(skip(self, chart), fields(path = %path.display(), bars = chart.bars.len()))]
    async fn render_to_file(&self, chart: &ConsumptionChart, path: &Path) -> Result<()> {
        debug!(width = self.width, height = self.height, "Drawing bar chart");
        self.draw(chart, path)?;
        info!("Successfully rendered consumption chart to {}", path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "bar_chart"
    }
}
