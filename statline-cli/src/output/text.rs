//! Text output formatting with colors.

use statline_core::SeasonPhase;
use statline_extract::{EntityOutcome, EntityReport, RunReport, SeasonReport};

use super::json::{ResetOutput, SourceInfoOutput, SourceStatusOutput};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Width of the entity column.
const ENTITY_WIDTH: usize = 14;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ------------------------------------------------------------------------
    // Extraction runs
    // ------------------------------------------------------------------------

    /// Formats a run report.
    pub fn format_run_report(&self, report: &RunReport) -> String {
        let mut lines = Vec::new();

        let mut summary = format!(
            "{} seasons, {} records",
            report.seasons.len(),
            self.format_number(report.records_written())
        );
        let recovered = report.recovered_count();
        if recovered > 0 {
            summary.push_str(&format!(", {}", self.yellow(&format!("{recovered} recovered"))));
        }
        lines.push(format!(
            "{} {} {}",
            self.bold(report.source.display_name()),
            summary,
            self.dim(&format!("({})", self.format_duration(report.duration_ms)))
        ));

        for season in &report.seasons {
            lines.push(self.format_season_report(season));
        }

        lines.join("\n")
    }

    /// Formats one season of a run.
    pub fn format_season_report(&self, season: &SeasonReport) -> String {
        let mut lines = vec![format!(
            "  {}  {} extracted, {} skipped, {} recovered",
            self.cyan(&season.season),
            season.extracted_count(),
            season.skipped_count(),
            season.recovered_count()
        )];
        for entity in &season.entities {
            lines.push(format!("    {}", self.format_entity_report(entity)));
        }
        lines.join("\n")
    }

    /// Formats one entity outcome.
    pub fn format_entity_report(&self, entity: &EntityReport) -> String {
        let name = format!("{:<width$}", entity.entity, width = ENTITY_WIDTH);
        match &entity.outcome {
            EntityOutcome::Extracted {
                count,
                duration_ms,
                dropped,
            } => {
                let mut line = format!(
                    "{name} {} {} records",
                    self.green("✓"),
                    self.format_number(*count)
                );
                if *dropped > 0 {
                    line.push_str(&format!(", {}", self.yellow(&format!("{dropped} dropped"))));
                }
                line.push_str(&format!(
                    " {}",
                    self.dim(&format!("({})", self.format_duration(*duration_ms)))
                ));
                line
            }
            EntityOutcome::Skipped => format!("{name} {}", self.dim("− fresh")),
            EntityOutcome::Recovered { kind, error, .. } => {
                format!("{name} {} {}", self.yellow(&format!("! {kind}")), self.dim(error))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    /// Formats the recorded state of a source.
    pub fn format_status(&self, status: &SourceStatusOutput) -> String {
        let mut lines = vec![format!(
            "{} {}",
            self.bold(&status.display_name),
            self.dim(&format!("({})", status.manifest_path))
        )];

        if status.seasons.is_empty() {
            lines.push(format!("  {}", self.dim("Nothing extracted yet")));
            return lines.join("\n");
        }

        lines.push(format!(
            "  Last run: {}",
            status.last_run.format("%Y-%m-%d %H:%M UTC")
        ));

        for season in &status.seasons {
            let phase = match season.phase {
                SeasonPhase::Current => self.green("current"),
                SeasonPhase::Historical => self.dim("historical"),
            };
            lines.push(format!("  {} {phase}", self.cyan(&season.season)));

            for entity in &season.entities {
                let name = format!("{:<width$}", entity.entity, width = ENTITY_WIDTH);
                let state = if entity.extracted {
                    let age = entity
                        .age_minutes
                        .map_or_else(|| "age unknown".to_string(), format_age);
                    format!(
                        "{} {} records, {}",
                        self.green("✓"),
                        self.format_number(entity.count),
                        age
                    )
                } else {
                    self.red("✗ not extracted")
                };
                let stale = if entity.stale {
                    format!(" {}", self.yellow("stale"))
                } else {
                    String::new()
                };
                lines.push(format!("    {name} {state}{stale}"));
            }
        }

        lines.join("\n")
    }

    // ------------------------------------------------------------------------
    // Sources
    // ------------------------------------------------------------------------

    /// Formats the source list header.
    pub fn format_sources_header(&self) -> String {
        self.bold(&format!(
            "{:<8} {:<8} {:<8} {}",
            "Source", "Protocol", "Token", "Entities"
        ))
    }

    /// Formats one source line, with its base URL and seasons below.
    pub fn format_source_info(&self, source: &SourceInfoOutput) -> String {
        let token = match (source.requires_token, source.token_configured) {
            (_, true) => self.green(&format!("{:<8}", "set")),
            (true, false) => self.red(&format!("{:<8}", "missing")),
            (false, false) => self.dim(&format!("{:<8}", "none")),
        };
        let entities: Vec<String> = source
            .entities
            .iter()
            .map(|e| match &e.parent {
                Some(parent) => format!("{} ({parent}→)", e.name),
                None => e.name.clone(),
            })
            .collect();

        let seasons = match (source.seasons.first(), source.seasons.last()) {
            (Some(first), Some(last)) if first != last => format!("{first}..{last}"),
            (Some(only), _) => only.clone(),
            _ => "-".to_string(),
        };

        [
            format!(
                "{:<8} {:<8} {token} {}",
                source.source,
                source.protocol,
                entities.join(", ")
            ),
            format!("         {}", self.dim(&source.base_url)),
            format!("         {}", self.dim(&format!("seasons {seasons}"))),
        ]
        .join("\n")
    }

    // ------------------------------------------------------------------------
    // Reset
    // ------------------------------------------------------------------------

    /// Formats the result of a reset.
    pub fn format_reset(&self, reset: &ResetOutput) -> String {
        if reset.deleted {
            format!(
                "{} {}: removed {}",
                self.green("✓"),
                reset.source,
                reset.manifest_path
            )
        } else {
            format!(
                "{} {}: no manifest at {}",
                self.dim("−"),
                reset.source,
                reset.manifest_path
            )
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Formats a count with thousands separators.
    pub fn format_number(&self, n: u64) -> String {
        let digits = n.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        out
    }

    /// Formats milliseconds as `850ms`, `4.2s` or `3m 05s`.
    pub fn format_duration(&self, ms: u64) -> String {
        if ms < 1_000 {
            format!("{ms}ms")
        } else if ms < 60_000 {
            format!("{}.{}s", ms / 1_000, (ms % 1_000) / 100)
        } else {
            let secs = ms / 1_000;
            format!("{}m {:02}s", secs / 60, secs % 60)
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// Formats an age in minutes as `12m ago`, `5h ago` or `3d ago`.
fn format_age(minutes: i64) -> String {
    match minutes {
        m if m < 1 => "just now".to_string(),
        m if m < 60 => format!("{m}m ago"),
        m if m < 60 * 48 => format!("{}h ago", m / 60),
        m => format!("{}d ago", m / (60 * 24)),
    }
}
