use crate::utils::constants::API_KEY_ENV;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "bd-weather-collector")]
#[command(about = "Collect daily weather and air quality for the districts of Bangladesh")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Date in YYYY-MM-DD [default: today in Asia/Dhaka]")]
    pub date: Option<String>,

    #[arg(long, env = API_KEY_ENV, hide_env_values = true, help = "OpenWeatherMap API key")]
    pub api_key: Option<String>,

    #[arg(long, help = "Re-resolve and re-geocode the district list")]
    pub rebuild_geocode: bool,

    #[arg(long, help = "Collect only the first N districts (N > 0)")]
    pub limit: Option<i64>,

    #[arg(long, help = "Keep one row per (date, district), latest wins")]
    pub dedupe: bool,

    #[arg(long, help = "Settings file [default: collector.toml if present]")]
    pub config: Option<PathBuf>,

    #[arg(short, long, conflicts_with = "quiet", help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, help = "Only log warnings and hide progress bars")]
    pub quiet: bool,

    #[arg(long, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// District cap; zero or negative means no cap.
    pub fn district_limit(&self) -> Option<usize> {
        self.limit
            .filter(|n| *n > 0)
            .and_then(|n| usize::try_from(n).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "bd-weather-collector",
            "--date",
            "2024-06-01",
            "--api-key",
            "abc",
            "--limit",
            "5",
            "--dedupe",
            "--rebuild-geocode",
        ])
        .unwrap();

        assert_eq!(cli.date.as_deref(), Some("2024-06-01"));
        assert_eq!(cli.api_key.as_deref(), Some("abc"));
        assert_eq!(cli.district_limit(), Some(5));
        assert!(cli.dedupe);
        assert!(cli.rebuild_geocode);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_non_positive_limit_is_ignored() {
        let cli = Cli::try_parse_from(["bd-weather-collector", "--limit=-3"]).unwrap();
        assert_eq!(cli.district_limit(), None);

        let cli = Cli::try_parse_from(["bd-weather-collector", "--limit", "0"]).unwrap();
        assert_eq!(cli.district_limit(), None);
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["bd-weather-collector", "-v", "-q"]).is_err());
    }
}
