//! Runs the detector on a synthetic observation with one injected burst.
//!
//! Usage: `exod-synthetic [config.yaml|config.json]`

use std::env;

use anyhow::{Context, Result};
use exod::synthetic::burst_scenario;
use exod::{
    Detector, DetectorConfig, Extent, FocalPlaneGeometry, HeaderKeywords, ProgressCallback,
};
use glam::DVec2;

fn main() -> Result<()> {
    common::log_setup::setup_logging("info")?;

    let config = match env::args().nth(1) {
        Some(path) => DetectorConfig::from_file(&path)
            .with_context(|| format!("failed to load configuration from {path}"))?,
        None => DetectorConfig::default()
            .with_box_size(3)
            .with_detection_level(5.0),
    };
    tracing::info!(?config, "configuration");

    let observation = burst_scenario().build()?;
    let detector = Detector::from_config(config)?.with_progress(ProgressCallback::new(|p| {
        tracing::debug!(stage = %p.stage, current = p.current, total = p.total, "progress");
    }));
    let mut run = detector.run(&observation)?;
    run.locate_sources(&demo_geometry()?)?;

    tracing::info!(
        sources = run.source_count(),
        threshold = run.threshold().lower_limit,
        "run finished"
    );
    for source in run.sources() {
        let sky = source.placement.map(|p| p.sky);
        tracing::info!(
            id = source.id,
            sensor = source.sensor,
            x = source.center.x,
            y = source.center.y,
            radius = source.radius,
            ra = ?sky.map(|s| s.ra),
            dec = ?sky.map(|s| s.dec),
            "variable source"
        );
        if let Some(curve) = run.light_curve(&observation, source.id) {
            tracing::info!(
                id = source.id,
                median_rate = curve.median_rate,
                extremum = ?curve.extremum,
                "light curve"
            );
        }
    }

    Ok(())
}

/// Header of a plausible pointing, centred on a 648 x 648 sky-pixel grid.
fn demo_geometry() -> Result<FocalPlaneGeometry> {
    let header: HeaderKeywords = [
        ("PA_PNT", 20.0),
        ("TDMIN6", 3000.0),
        ("TDMAX6", 48000.0),
        ("TDMIN7", 3000.0),
        ("TDMAX7", 48000.0),
        ("TLMIN6", 0.0),
        ("TLMAX6", 51840.0),
        ("TLMIN7", 0.0),
        ("TLMAX7", 51840.0),
        ("REFXCRPX", 25920.5),
        ("REFYCRPX", 25920.5),
        ("REFXCDLT", -1.388_889e-5),
        ("REFYCDLT", 1.388_889e-5),
        ("REFXCRVL", 83.633),
        ("REFYCRVL", 22.014),
    ]
    .into_iter()
    .collect();
    let extent = Extent::new(DVec2::new(4000.0, 4000.0), DVec2::new(47000.0, 47000.0))?;
    Ok(FocalPlaneGeometry::from_header(&header, extent)?)
}
