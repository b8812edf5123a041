use std::path::PathBuf;

use clap::{ArgAction, Parser};
use jobwatch_core::{Direction, JobForm};

use crate::config::Overrides;
use crate::logging::LogDestination;

/// Submit a landing-page job and follow it until it finishes.
#[derive(Debug, Parser)]
#[command(name = "jobwatch", version, about)]
pub struct Cli {
    /// Business name (2-100 characters).
    #[arg(long)]
    pub business_name: String,

    /// Kind of business, e.g. "dental clinic".
    #[arg(long)]
    pub business_type: String,

    /// City the page targets.
    #[arg(long)]
    pub target_city: String,

    #[arg(long, default_value = "ar-SA")]
    pub locale: String,

    /// Text direction of the generated page: rtl or ltr.
    #[arg(long, default_value = "rtl", value_parser = parse_direction)]
    pub direction: Direction,

    /// Session access token for the pipeline backend.
    #[arg(long, env = "JOBWATCH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, env = "JOBWATCH_API_URL")]
    pub api_url: Option<String>,

    #[arg(long, env = "JOBWATCH_STORE_URL")]
    pub store_url: Option<String>,

    #[arg(long, env = "JOBWATCH_STORE_KEY", hide_env_values = true)]
    pub store_key: Option<String>,

    /// Seconds between record-store checks once live updates are lost.
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Record-store checks before giving up; 0 means no limit.
    #[arg(long)]
    pub max_poll_attempts: Option<u32>,

    /// RON settings file [default: ./jobwatch.ron if present].
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the finished page structure here instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

fn parse_direction(raw: &str) -> Result<Direction, String> {
    raw.parse().map_err(|err: jobwatch_core::FormError| err.to_string())
}

impl Cli {
    pub fn form(&self) -> JobForm {
        JobForm {
            locale: self.locale.clone(),
            direction: self.direction,
            ..JobForm::new(
                self.business_name.clone(),
                self.business_type.clone(),
                self.target_city.clone(),
            )
        }
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_base_url: self.api_url.clone(),
            record_store_url: self.store_url.clone(),
            record_store_key: self.store_key.clone(),
            poll_interval_secs: self.poll_interval,
            max_poll_attempts: self.max_poll_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let base = [
            "jobwatch",
            "--business-name",
            "Noor Dental",
            "--business-type",
            "dental clinic",
            "--target-city",
            "Dammam",
        ];
        Cli::try_parse_from(base.iter().chain(args.iter()))
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn form_uses_defaults() {
        let cli = parse(&[]).expect("parse");
        assert_eq!(
            cli.form(),
            JobForm::new("Noor Dental", "dental clinic", "Dammam")
        );
    }

    #[test]
    fn direction_is_case_insensitive() {
        let cli = parse(&["--direction", "LTR", "--locale", "en-US"]).expect("parse");
        let form = cli.form();
        assert_eq!(form.direction, Direction::Ltr);
        assert_eq!(form.locale, "en-US");
    }

    #[test]
    fn unknown_direction_is_rejected() {
        assert!(parse(&["--direction", "up"]).is_err());
    }

    #[test]
    fn verbosity_counts_flags() {
        let cli = parse(&["-vv"]).expect("parse");
        assert_eq!(cli.verbose, 2);
    }
}
