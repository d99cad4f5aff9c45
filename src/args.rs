use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "cell_bump")]
#[command(about = "Increment today's counter in a Google Sheets row")]
#[command(version)]
pub struct Args {
    /// Column to update (B or C)
    #[arg(short = 'c', long, value_name = "COLUMN")]
    pub column: Option<String>,

    /// Google Sheets spreadsheet ID
    #[arg(long, value_name = "SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Sheet (tab) name holding the dated rows
    #[arg(long, value_name = "NAME")]
    pub sheet_name: Option<String>,

    /// Path to the OAuth client secret file
    #[arg(long, value_name = "PATH")]
    pub credentials: Option<String>,

    /// Path to the cached OAuth token
    #[arg(long, value_name = "PATH")]
    pub token: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Path to config file
    #[arg(long, default_value = "config/config.toml")]
    pub config: String,
}
