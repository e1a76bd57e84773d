pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use args::{CliConfig, Command};

#[cfg(feature = "cli")]
mod args {
    use super::toml_config::TomlConfig;
    use crate::core::ergast::{SeasonRaceQuery, SeasonRange};
    use crate::core::pipeline::Query;
    use crate::utils::error::Result;
    use clap::{Parser, Subcommand};

    #[derive(Debug, Clone, Parser)]
    #[command(name = "ergast-etl")]
    #[command(about = "Fetch F1 standings and race results and export them as CSV/JSON")]
    pub struct CliConfig {
        /// Path to TOML configuration file
        #[arg(short, long)]
        pub config: Option<String>,

        #[arg(long, help = "Override the API base URL")]
        pub base_url: Option<String>,

        #[arg(long)]
        pub output_path: Option<String>,

        #[arg(long, value_delimiter = ',', help = "Output formats: csv, json")]
        pub format: Vec<String>,

        #[arg(long, help = "Years fetched together by the champions command")]
        pub concurrent_requests: Option<usize>,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub json_logs: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Driver standings for one season
        Standings {
            #[arg(long)]
            year: i32,
            #[arg(long)]
            position: Option<u32>,
        },
        /// Standings across an inclusive range of seasons
        Champions {
            #[arg(long)]
            from: i32,
            #[arg(long)]
            to: i32,
            #[arg(long)]
            position: Option<u32>,
        },
        /// Race results for one season
        Races {
            #[arg(long)]
            year: i32,
            #[arg(long)]
            position: Option<u32>,
        },
    }

    impl CliConfig {
        /// TOML file (or defaults) with command line overrides applied.
        pub fn resolve(&self) -> Result<TomlConfig> {
            let mut config = match &self.config {
                Some(path) => TomlConfig::from_file(path)?,
                None => TomlConfig::default(),
            };

            if let Some(base_url) = &self.base_url {
                config.source.base_url = base_url.clone();
            }
            if let Some(output_path) = &self.output_path {
                config.load.output_path = output_path.clone();
            }
            if !self.format.is_empty() {
                config.load.output_formats = self.format.clone();
            }
            if let Some(concurrent) = self.concurrent_requests {
                config.extract.concurrent_requests = Some(concurrent);
            }

            Ok(config)
        }

        pub fn query(&self) -> Query {
            match self.command {
                Command::Standings { year, position } => Query::Standings { year, position },
                Command::Champions { from, to, position } => Query::Champions(SeasonRange {
                    from_year: from,
                    to_year: to,
                    position,
                }),
                Command::Races { year, position } => {
                    Query::Races(SeasonRaceQuery { year, position })
                }
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_champions_command() {
            let cli = CliConfig::parse_from([
                "ergast-etl",
                "--format",
                "csv,json",
                "champions",
                "--from",
                "2010",
                "--to",
                "2013",
                "--position",
                "1",
            ]);

            let config = cli.resolve().unwrap();
            assert_eq!(config.load.output_formats, vec!["csv", "json"]);
            assert_eq!(
                cli.query(),
                Query::Champions(SeasonRange::new(2010, 2013).with_position(1))
            );
        }

        #[test]
        fn test_overrides_apply() {
            let cli = CliConfig::parse_from([
                "ergast-etl",
                "--base-url",
                "http://localhost:9000/f1",
                "--output-path",
                "/tmp/out",
                "races",
                "--year",
                "2021",
            ]);

            let config = cli.resolve().unwrap();
            assert_eq!(config.source.base_url, "http://localhost:9000/f1");
            assert_eq!(config.load.output_path, "/tmp/out");
            assert_eq!(cli.query(), Query::Races(SeasonRaceQuery::new(2021)));
        }
    }
}
