//! Export functionality for the synthetic dataset
//!
//! JSON for other tools, plain text for the console summary, and the card
//! strings the dashboard shares with the summary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use crate::error::StatsError;
use crate::population::Resident;
use crate::stats::{age_histogram, area_breakdown, PopulationStats};

/// Metadata about the generated dataset
#[derive(Serialize)]
pub struct DatasetMetadata {
    pub seed: u64,
    pub generated_at: String,
    pub resident_count: usize,
    pub parallel: bool,
}

/// Complete export structure
#[derive(Serialize)]
pub struct DatasetExport<'a> {
    pub metadata: DatasetMetadata,
    /// `None` for an empty dataset
    pub stats: Option<PopulationStats>,
    pub residents: &'a [Resident],
}

/// Write the dataset, its headline stats and some provenance to `path`.
pub fn export_json(
    residents: &[Resident],
    seed: u64,
    parallel: bool,
    path: &Path,
) -> std::io::Result<()> {
    let export = DatasetExport {
        metadata: DatasetMetadata {
            seed,
            generated_at: Utc::now().to_rfc3339(),
            resident_count: residents.len(),
            parallel,
        },
        stats: PopulationStats::compute(residents).ok(),
        residents,
    };

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &export)?;

    tracing::info!(path = %path.display(), residents = residents.len(), "exported dataset");
    Ok(())
}

fn or_na<T>(value: Result<T, StatsError>, show: impl Fn(T) -> String) -> String {
    value.map(show).unwrap_or_else(|_| "n/a".to_string())
}

/// Label/value pairs for the four stat cards. Averages of an empty dataset
/// show as "n/a".
pub fn stat_cards(residents: &[Resident]) -> [(&'static str, String); 4] {
    let stats = PopulationStats::compute(residents);
    [
        ("Total Residents", residents.len().to_string()),
        ("Average Age", or_na(stats, |s| s.average_age.to_string())),
        ("Home Ownership", or_na(stats, |s| format!("{}%", s.home_ownership_rate))),
        ("Avg Household Size", or_na(stats, |s| s.average_household_size.to_string())),
    ]
}

/// Body lines of a sample-resident card (the name is the card title).
pub fn resident_card_lines(resident: &Resident) -> [String; 4] {
    [
        format!("Age {} • {}", resident.age, resident.occupation),
        format!("{} ({})", resident.address, resident.fsa),
        format!(
            "{} person household • {}",
            resident.household_size,
            resident.tenure_label()
        ),
        format!("Interests: {}", resident.interests.join(", ")),
    ]
}

/// Plain-text version of the dashboard for `--summary`.
pub fn write_summary<W: Write>(
    writer: &mut W,
    residents: &[Resident],
    sample_size: usize,
) -> std::io::Result<()> {
    writeln!(writer, "Beaches Digital Twin")?;
    writeln!(writer, "Toronto East End • FSA M4E & M4L")?;
    writeln!(writer)?;

    for (label, value) in stat_cards(residents) {
        writeln!(writer, "{:<20} {}", label, value)?;
    }

    writeln!(writer)?;
    writeln!(writer, "Demographics")?;
    let histogram = age_histogram(residents);
    let widest = histogram.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);
    for (bucket, count) in &histogram {
        let bar = "#".repeat(count * 40 / widest);
        writeln!(writer, "  {:<6} {:>4} {}", bucket.label(), count, bar)?;
    }

    writeln!(writer)?;
    writeln!(writer, "By area")?;
    for (fsa, stats) in area_breakdown(residents) {
        match stats {
            Ok(s) => writeln!(
                writer,
                "  {}  {:>4} residents, {:>3}% owners, average age {}",
                fsa, s.total_residents, s.home_ownership_rate, s.average_age
            )?,
            Err(e) => writeln!(writer, "  {}  {}", fsa, e)?,
        }
    }

    writeln!(writer)?;
    writeln!(writer, "Sample Residents")?;
    for resident in residents.iter().take(sample_size) {
        writeln!(writer, "  {}", resident.full_name())?;
        for line in resident_card_lines(resident) {
            writeln!(writer, "    {}", line)?;
        }
    }

    Ok(())
}
