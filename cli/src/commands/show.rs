use std::sync::Arc;

use anyhow::{bail, Result};
use catchment::{
    source_for, Engine, HeadlessMap, JourneyOutcome, MapboxClient, MemoryAddressBar, Notice, RealtyListings,
    Services,
};
use tracing::info;

use crate::cli::{Cli, ShowArgs};
use super::load_config;

pub async fn run(cli: &Cli, args: &ShowArgs) -> Result<()> {
    let config = load_config(cli)?;
    let source = source_for(&cli.dataset);

    let mapbox = Arc::new(MapboxClient::new(args.mapbox_token.as_str()));
    let services = Services {
        geocoder: mapbox.clone(),
        directions: mapbox,
        listings: Arc::new(RealtyListings::new(args.listings_token.as_str())),
    };
    let surface = HeadlessMap::from_view(&config.view);
    let mut engine = Engine::start(config, source.as_ref(), services, surface, Box::new(MemoryAddressBar::new())).await?;

    let selection = engine.select_from_location(args.target.as_deref())?;
    println!("{} ({}, {})", selection.school_name(), selection.coordinates().x(), selection.coordinates().y());
    report(&engine.settle().await);

    if args.toggle_style && engine.toggle_style() {
        // A headless surface has no style to wait for.
        engine.style_loaded();
        report(&engine.settle().await);
    }

    if let Some(text) = &args.search {
        let candidates = engine.search_destination(text).await?;
        for (index, place) in candidates.iter().enumerate() {
            println!("[{index}] {}", place.name);
        }
        let Some(destination) = engine.choose_destination(args.pick) else {
            bail!("No destination candidate #{} for {text:?}", args.pick);
        };
        info!(destination = %destination.name, "planning journey");
        engine.plan_journey()?;
        report(&engine.settle().await);
    }

    println!("{}", serde_json::to_string_pretty(&engine.surface().to_json())?);
    if let Some(url) = engine.shareable_url() {
        println!("{url}");
    }
    engine.shutdown();
    Ok(())
}

fn report(notices: &[Notice]) {
    for notice in notices {
        match notice {
            Notice::PointsOfInterestShown { count, .. } => println!("{count} points of interest"),
            Notice::PropertiesShown { count, .. } => println!("{count} properties"),
            Notice::Journey(JourneyOutcome::Planned(summary)) => println!("{summary}"),
            Notice::Journey(JourneyOutcome::NoRouteFound) => println!("No route found"),
            Notice::Journey(JourneyOutcome::Failed(err)) => eprintln!("{err}"),
            Notice::QueryFailed { message, .. } => eprintln!("{message}"),
            Notice::Discarded { .. } => {}
        }
    }
}
