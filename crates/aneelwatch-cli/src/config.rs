//! Command-line and environment configuration.

use std::path::PathBuf;

use aneelwatch_core::{PORTAL_ORIGIN, RelevancePolicy};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::pipeline::RunPlan;

#[derive(Debug, Parser)]
#[command(name = "aneelwatch", version, about = "Watch the ANEEL document library for new legislative acts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the portal, save the results file, and send the summary email.
    Run(RunArgs),
    /// Parse a saved results page offline and print its records.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Search term; repeat the flag or comma-separate for several.
    #[arg(long = "term", env = "ANEEL_TERMS", value_delimiter = ',', default_value = "resolução normativa")]
    pub terms: Vec<String>,

    /// Act date (DD/MM/YYYY or YYYY-MM-DD). Defaults to today.
    #[arg(long, env = "ANEEL_DATE", value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// End of a date range; switches the filter to "between".
    #[arg(long, env = "ANEEL_DATE_TO", value_parser = parse_date)]
    pub date_to: Option<NaiveDate>,

    #[arg(long, env = "ANEEL_BASE_URL", default_value = PORTAL_ORIGIN)]
    pub base_url: String,

    /// Results file, overwritten on every run.
    #[arg(long, env = "ANEEL_OUTPUT", default_value = "resultados_aneel.json")]
    pub output: PathBuf,

    /// Save every fetched page here for inspection.
    #[arg(long, env = "ANEEL_DUMP_DIR")]
    pub dump_dir: Option<PathBuf>,

    /// Results pages to walk per term; stops early on an empty page.
    #[arg(long, env = "ANEEL_MAX_PAGES", default_value_t = 1)]
    pub max_pages: u32,

    /// Send a "no documents" email when nothing is found.
    #[arg(long, env = "ANEEL_NOTIFY_EMPTY", default_value_t = true, action = ArgAction::Set)]
    pub notify_empty: bool,

    /// Keywords that mark a document as high relevance in the email.
    #[arg(long, env = "ANEEL_HIGH_KEYWORDS", value_delimiter = ',')]
    pub high_keywords: Vec<String>,

    /// Keywords that mark a document as medium relevance in the email.
    #[arg(long, env = "ANEEL_MEDIUM_KEYWORDS", value_delimiter = ',')]
    pub medium_keywords: Vec<String>,
}

impl RunArgs {
    pub fn plan(&self, today: NaiveDate) -> RunPlan {
        let terms = self
            .terms
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        RunPlan {
            terms,
            date_from: self.date.unwrap_or(today),
            date_to: self.date_to,
            max_pages: self.max_pages.max(1),
        }
    }

    pub fn relevance_policy(&self) -> RelevancePolicy {
        RelevancePolicy::new(self.high_keywords.clone(), self.medium_keywords.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Card,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Saved HTML page.
    pub file: PathBuf,

    /// Term to record as provenance.
    #[arg(long, default_value = "")]
    pub term: String,

    /// Search date to record as provenance. Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Origin for resolving relative links.
    #[arg(long, default_value = PORTAL_ORIGIN)]
    pub origin: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

/// Accept `DD/MM/YYYY` (portal style) or `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| format!("invalid date {s:?}; expected DD/MM/YYYY or YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_both_date_styles() {
        assert_eq!(parse_date("05/03/2024"), Ok(date(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05"), Ok(date(2024, 3, 5)));
        assert!(parse_date("03-05-2024").is_err());
    }

    #[test]
    fn run_defaults() {
        let cli = Cli::try_parse_from(["aneelwatch", "run"]).unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.terms, vec!["resolução normativa"]);
        assert_eq!(args.base_url, "https://biblioteca.aneel.gov.br");
        assert!(args.notify_empty);
        assert_eq!(args.max_pages, 1);

        let plan = args.plan(date(2024, 3, 5));
        assert_eq!(plan.date_from, date(2024, 3, 5));
        assert_eq!(plan.date_to, None);
        assert!(args.relevance_policy().is_empty());
    }

    #[test]
    fn run_flags() {
        let cli = Cli::try_parse_from([
            "aneelwatch",
            "run",
            "--term",
            "despacho, portaria",
            "--term",
            "  ",
            "--date",
            "01/02/2024",
            "--date-to",
            "2024-02-29",
            "--notify-empty",
            "false",
            "--high-keywords",
            "tarifa",
            "--max-pages",
            "0",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(!args.notify_empty);
        let plan = args.plan(date(2030, 1, 1));
        assert_eq!(plan.terms, vec!["despacho", "portaria"]);
        assert_eq!(plan.date_from, date(2024, 2, 1));
        assert_eq!(plan.date_to, Some(date(2024, 2, 29)));
        assert_eq!(plan.max_pages, 1);
        assert!(!args.relevance_policy().is_empty());
    }

    #[test]
    fn extract_args() {
        let cli = Cli::try_parse_from(["aneelwatch", "extract", "page.html", "--format", "card"]).unwrap();
        let Command::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.file, PathBuf::from("page.html"));
        assert_eq!(args.format, OutputFormat::Card);
    }
}
