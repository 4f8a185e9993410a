//! Check configuration and capabilities.

use rigpad_common::config::AppConfig;

pub fn run() -> anyhow::Result<()> {
    println!("Rigpad environment check");
    println!();

    let config = AppConfig::load();
    println!("Configuration:");
    println!("  Remote port: {}", config.remote.port);
    println!("  Camera index: {}", config.tracker.camera_index);
    println!("  Tick interval: {} ms", config.tick_interval_ms);
    println!("  Log level: {}", config.logging.level);
    match config.validate() {
        Ok(()) => println!("  Status: valid"),
        Err(issue) => println!("  Status: INVALID ({issue})"),
    }

    println!();
    println!("Landmark sources:");
    println!("  synthetic: available (built-in)");
    println!("  camera: external collaborator, not bundled");

    Ok(())
}
