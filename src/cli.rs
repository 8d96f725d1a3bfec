use std::path::PathBuf;

use clap::Parser;

/// Explore the Shikimori anime catalog from the terminal
#[derive(Parser, Debug, Default)]
#[command(name = "anivault", version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Catalog host, e.g. https://shikimori.one
    #[arg(long)]
    pub host: Option<String>,

    /// Catalog ordering (popularity, ranked, name, ...)
    #[arg(long)]
    pub order: Option<String>,

    /// Delay between the bottom of the grid coming into view and the next fetch
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Allow a new page request while another one is still in flight
    #[arg(long)]
    pub no_guard: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub show_config: bool,
}
