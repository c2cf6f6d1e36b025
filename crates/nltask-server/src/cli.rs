use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "nltask",
    version,
    about = "Capture tasks from free text over a small HTTP API"
)]
pub struct Cli {
    /// Configuration file (defaults to nltask.toml in the working directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// JSON file holding the tasks
    #[arg(long, value_name = "FILE")]
    pub data_file: Option<PathBuf>,

    /// IANA timezone used to resolve dates, e.g. Europe/Berlin
    #[arg(long, value_name = "TZ")]
    pub timezone: Option<String>,
}

/// Flags that override configuration values when given
#[derive(Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            bind: self.bind.clone(),
            data_file: self.data_file.clone(),
            timezone: self.timezone.clone(),
        }
    }
}
