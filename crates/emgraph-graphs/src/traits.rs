//! Seams between the pipeline and its collaborators.

use crate::chart::ConsumptionChart;
use async_trait::async_trait;
use emgraph_common::{Cursor, DevicePage, Result};
use std::path::Path;

/// Source of paginated device records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetches the page starting at `cursor`.
    async fn fetch_page(&self, cursor: Cursor) -> Result<DevicePage>;
}

/// Trait for graph renderers that turn a chart model into an image file.
#[async_trait]
pub trait GraphRenderer: Send + Sync {
    /// Renders `chart` to `path`, replacing any existing file.
    async fn render_to_file(&self, chart: &ConsumptionChart, path: &Path) -> Result<()>;

    /// Gets the name of this renderer.
    fn name(&self) -> &'static str;
}

/// Presents a rendered chart to the user.
pub trait ChartViewer: Send + Sync {
    /// Shows the image at `path`.
    fn show(&self, path: &Path) -> Result<()>;
}
