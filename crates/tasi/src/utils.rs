use crate::collector::{ScrapeOutcome, ScrapeReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeStats {
    pub links: usize,
    pub scraped: usize,
    pub skipped: usize,
    pub columns: usize,
}

impl ScrapeStats {
    pub fn from_report(report: &ScrapeReport) -> ScrapeStats {
        let (scraped, columns) = match &report.outcome {
            ScrapeOutcome::Table(table) => (table.len(), table.columns().len()),
            ScrapeOutcome::NoData(_) => (0, 0),
        };
        ScrapeStats {
            links: report.links_found,
            scraped,
            skipped: report.warnings.len(),
            columns,
        }
    }
}

impl std::fmt::Display for ScrapeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nStatistics:")?;
        writeln!(f, "  Member links:     {}", self.links)?;
        writeln!(f, "  Records scraped:  {}", self.scraped)?;
        writeln!(f, "  Skipped:          {}", self.skipped)?;
        writeln!(f, "  Columns:          {}", self.columns)
    }
}
