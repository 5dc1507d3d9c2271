use anyhow::Result;
use catchment::{source_for, CatchmentRegistry};

use crate::cli::{Cli, ListArgs};
use super::load_config;

pub async fn run(cli: &Cli, args: &ListArgs) -> Result<()> {
    let config = load_config(cli)?;
    let source = source_for(&cli.dataset);
    let registry = CatchmentRegistry::open(source.as_ref(), config.dataset).await?;

    let filter = args.filter.as_deref().map(str::to_lowercase);
    for id in registry.index().ids() {
        let Some(entry) = registry.index().get(id) else { continue };
        if let Some(filter) = &filter {
            if !id.contains(filter.as_str()) && !entry.name.to_lowercase().contains(filter.as_str()) {
                continue;
            }
        }
        println!("{id}\t{}\t{}", entry.name, entry.suburb.as_deref().unwrap_or("-"));
    }
    Ok(())
}
