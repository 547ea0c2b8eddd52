//! Pipeline-Kernel CLI.
//!
//! Liest eine PCF-Datei, bereinigt das Netz (koinzidente Punkte zusammenführen,
//! Krümmungen nachführen) und schreibt es wieder aus.
//!
//! Aufruf: `pipeline-kernel <eingabe.pcf> [ausgabe.pcf]`

use anyhow::{bail, Result};
use pipeline_kernel::editors::recalculate_curvatures;
use pipeline_kernel::{load_pcf_file, save_pcf_file, KernelOptions};
use std::path::PathBuf;

fn main() -> Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Pipeline-Kernel v{} startet...", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next().map(PathBuf::from) else {
        bail!("Aufruf: pipeline-kernel <eingabe.pcf> [ausgabe.pcf]");
    };
    let output = args.next().map(PathBuf::from).unwrap_or_else(|| input.clone());

    let options = KernelOptions::load_from_file(&KernelOptions::config_path());

    let mut pipeline = load_pcf_file(&input, options.pcf_unit_factor)?;
    pipeline.merge_coincident_points(options.coincidence_decimals);
    let normalized = recalculate_curvatures(&mut pipeline);
    pipeline.commit();
    log::info!(
        "{} Strukturen, {} Punkte, {} Krümmungen nachgeführt",
        pipeline.structure_count(),
        pipeline.point_count(),
        normalized
    );

    save_pcf_file(&pipeline, &output, options.pcf_unit_factor)
}
