use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "tray-sizer")]
#[command(about = "Selects the smallest catalog cable tray that safely carries a sector's cables")]
pub struct CliConfig {
    #[arg(long, default_value = "tray-sizer.toml", help = "Engine configuration file")]
    pub config: String,

    #[arg(long, help = "Sector description file (TOML)")]
    pub sector: String,

    #[arg(long, help = "Catalog CSV file, overrides [catalog] in the configuration")]
    pub catalog: Option<String>,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let config = CliConfig::parse_from([
            "tray-sizer",
            "--sector",
            "sectors/pump-room.toml",
            "--catalog",
            "trays.csv",
            "--format",
            "json",
        ]);
        assert_eq!(config.config, "tray-sizer.toml");
        assert_eq!(config.sector, "sectors/pump-room.toml");
        assert_eq!(config.catalog.as_deref(), Some("trays.csv"));
        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.verbose);
    }
}
