//! Run report and end-of-run summary.

use std::fmt;

use console::style;

use crate::models::{DocumentCategory, Year};

/// A recoverable problem met during the crawl.
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlIssue {
    YearDiscoveryFailed { reason: String },
    ActivationFailed { year: Year, reason: String },
    NoLinks { year: Year },
    MissingLink { year: Year, category: DocumentCategory },
    DownloadFailed {
        year: Year,
        category: DocumentCategory,
        url: String,
        reason: String,
    },
}

impl fmt::Display for CrawlIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::YearDiscoveryFailed { reason } => {
                write!(f, "year tabs could not be read ({})", reason)
            }
            Self::ActivationFailed { year, reason } => {
                write!(f, "{}: tab activation failed ({})", year, reason)
            }
            Self::NoLinks { year } => write!(f, "{}: no document links found", year),
            Self::MissingLink { year, category } => {
                write!(f, "{}: link not found for {}", year, category)
            }
            Self::DownloadFailed {
                year,
                category,
                url,
                reason,
            } => write!(f, "{}: {} from {} failed ({})", year, category, url, reason),
        }
    }
}

/// Counts and issues collected over one crawl.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlReport {
    /// Years in the order they were visited.
    pub years_found: Vec<Year>,
    pub years_processed: usize,
    pub years_skipped: usize,
    pub downloaded: usize,
    pub already_present: usize,
    pub failed: usize,
    pub issues: Vec<CrawlIssue>,
}

impl CrawlReport {
    pub fn record(&mut self, issue: CrawlIssue) {
        self.issues.push(issue);
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Print the summary to stdout.
    pub fn print_summary(&self) {
        println!("\n{}", style("ENEM Crawl Summary").bold());
        println!("{}", "-".repeat(40));

        println!("{:<20} {}", "Years Found:", self.years_found.len());
        println!("{:<20} {}", "Years Processed:", self.years_processed);
        println!("{:<20} {}", "Years Skipped:", self.years_skipped);
        println!();
        println!(
            "{:<20} {}",
            "Downloaded:",
            style(self.downloaded).green()
        );
        println!("{:<20} {}", "Already Present:", self.already_present);
        let failed = if self.failed > 0 {
            style(self.failed).red().to_string()
        } else {
            self.failed.to_string()
        };
        println!("{:<20} {}", "Failed:", failed);

        if self.has_issues() {
            println!("\n{} Issues:", style("!").yellow());
            for issue in &self.issues {
                println!("  {} {}", style("✗").red(), issue);
            }
        } else {
            println!("\n{} Completed without issues", style("✓").green());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_display() {
        let issue = CrawlIssue::MissingLink {
            year: Year(2024),
            category: DocumentCategory::RegularD2Key,
        };
        assert_eq!(
            issue.to_string(),
            "2024: link not found for regular_d2_gabarito_azul"
        );
    }

    #[test]
    fn test_report_issues() {
        let mut report = CrawlReport::default();
        assert!(!report.has_issues());
        report.record(CrawlIssue::NoLinks { year: Year(2001) });
        assert!(report.has_issues());
        assert_eq!(report.issues[0].to_string(), "2001: no document links found");

        report.record(CrawlIssue::YearDiscoveryFailed {
            reason: "snapshot failed".to_string(),
        });
        assert_eq!(
            report.issues[1].to_string(),
            "year tabs could not be read (snapshot failed)"
        );
    }
}
