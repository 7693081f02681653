use clap::Parser;

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "kuclub-api")]
#[command(about = "KU Club backend API - projects, organizations and campuses behind a bearer token")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Bind address (overrides HOST)")]
    pub host: Option<String>,

    #[arg(long, short, help = "Listen port (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Validate configuration, print a summary and exit")]
    pub check_config: bool,
}

impl Cli {
    /// Command-line flags win over the environment.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
