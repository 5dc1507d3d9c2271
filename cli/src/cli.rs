use std::path::PathBuf;

/// Headless catchment map sessions
#[derive(clap::Parser, Debug)]
#[command(name = "catchment", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Engine config file (JSON); defaults apply when omitted
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Catchment dataset: a GeoJSON file path or an http(s) URL
    #[arg(short, long, global = true, default_value = "geojson/catchments_primary_fixed.geojson")]
    pub dataset: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Select a school, run enrichment and print the resulting overlay
    Show(ShowArgs),

    /// List the catchment identifiers in the dataset
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// School identifier or page URL, e.g. "lindfield_ps" or "https://host/lindfield_ps"
    pub target: Option<String>,

    /// Search a destination and plan a journey to it
    #[arg(short, long)]
    pub search: Option<String>,

    /// Which search result to use as the destination
    #[arg(long, default_value_t = 0, requires = "search")]
    pub pick: usize,

    /// Switch to the satellite style once the selection is shown
    #[arg(long)]
    pub toggle_style: bool,

    /// Mapbox access token (geocoding and directions)
    #[arg(long, env = "MAPBOX_ACCESS_TOKEN", hide_env_values = true)]
    pub mapbox_token: String,

    /// Realty listings API token
    #[arg(long, env = "LISTINGS_API_TOKEN", hide_env_values = true)]
    pub listings_token: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only list catchments whose id or name contains this text
    pub filter: Option<String>,
}
