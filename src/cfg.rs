use config::{Config, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::args::Args;
use crate::error::{Error, Result};
use crate::transform::Column;

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// How the consent flow hands back the authorization code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    /// Print the URL and read the pasted code from stdin.
    Interactive,
    /// Receive the code on a loopback HTTP listener.
    Redirect,
}

impl AuthFlow {
    fn parse(s: &str) -> Result<Self> {
        match s {
            "interactive" => Ok(AuthFlow::Interactive),
            "redirect" => Ok(AuthFlow::Redirect),
            other => Err(Error::Config(format!("invalid auth_flow: {other}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Cfg {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    /// Rows to scan, without the sheet prefix; row 1 is the header.
    pub read_range: String,
    pub credentials_path: PathBuf,
    pub token_path: PathBuf,
    pub scope: String,
    pub auth_flow: AuthFlow,
    pub column: Option<String>,
}

impl Cfg {
    pub fn load(args: Args) -> Result<Self> {
        let mut cfg = Cfg::default();

        if Path::new(&args.config).exists() {
            info!("Loading configuration from: {}", args.config);
            let config = Config::builder()
                .add_source(File::with_name(&args.config).required(false))
                .build()
                .map_err(|e| Error::Config(format!("{}: {e}", args.config)))?;
            cfg.merge(&config)?;
        } else {
            debug!("Config file {} not found, using defaults", args.config);
        }

        if let Some(spreadsheet_id) = args.spreadsheet_id {
            debug!("Overriding spreadsheet_id from command line");
            cfg.spreadsheet_id = spreadsheet_id;
        }
        if let Some(sheet_name) = args.sheet_name {
            debug!("Overriding sheet_name from command line");
            cfg.sheet_name = sheet_name;
        }
        if let Some(credentials) = args.credentials {
            cfg.credentials_path = credentials.into();
        }
        if let Some(token) = args.token {
            cfg.token_path = token.into();
        }
        if let Some(column) = args.column {
            cfg.column = Some(column);
        }

        debug!("Final configuration: {:?}", cfg);
        Ok(cfg)
    }

    fn merge(&mut self, config: &Config) -> Result<()> {
        if let Ok(spreadsheet_id) = config.get_string("spreadsheet_id") {
            self.spreadsheet_id = spreadsheet_id;
        }
        if let Ok(sheet_name) = config.get_string("sheet_name") {
            self.sheet_name = sheet_name;
        }
        if let Ok(read_range) = config.get_string("read_range") {
            self.read_range = read_range;
        }
        if let Ok(path) = config.get_string("credentials_path") {
            self.credentials_path = path.into();
        }
        if let Ok(path) = config.get_string("token_path") {
            self.token_path = path.into();
        }
        if let Ok(scope) = config.get_string("scope") {
            self.scope = scope;
        }
        if let Ok(flow) = config.get_string("auth_flow") {
            self.auth_flow = AuthFlow::parse(&flow)?;
        }
        if let Ok(column) = config.get_string("column") {
            self.column = Some(column);
        }
        Ok(())
    }

    /// Checks the settings and resolves the target column.
    pub fn validate(&self) -> Result<Column> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(Error::Config("spreadsheet_id cannot be empty".into()));
        }
        if self.sheet_name.is_empty() {
            return Err(Error::Config("sheet_name cannot be empty".into()));
        }
        if self.read_range.is_empty() {
            return Err(Error::Config("read_range cannot be empty".into()));
        }

        let column = self.column.as_deref().unwrap_or_default().parse::<Column>()?;
        info!("Configuration validation passed, column {}", column);
        Ok(column)
    }

    /// `Sheet!A2:E`
    pub fn sheet_read_range(&self) -> String {
        format!("{}!{}", self.sheet_name, self.read_range)
    }
}

impl Default for Cfg {
    fn default() -> Self {
        Self {
            spreadsheet_id: "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms".to_string(),
            sheet_name: "Class Data".to_string(),
            read_range: "A2:E".to_string(),
            credentials_path: PathBuf::from("credentials.json"),
            token_path: PathBuf::from("token.json"),
            scope: SHEETS_SCOPE.to_string(),
            auth_flow: AuthFlow::Interactive,
            column: None,
        }
    }
}
