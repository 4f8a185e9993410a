//! Validate a group-config JSON file.

use std::path::PathBuf;

use rigpad_rig_model::GroupConfig;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating group config at: {}", path.display());

    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let config =
        GroupConfig::from_json(&content).map_err(|e| anyhow::anyhow!("Invalid JSON: {e}"))?;

    println!("  Group: {}", config.group_name);
    println!("  Mappings: {}", config.mappings.len());

    let group = config.clone().into_group();
    println!("  Limit: {:.3}", group.limit());
    for mapping in &group.mappings {
        println!(
            "    {:?} anchor ({:.2}, {:.2}) radius {:.2} -> {:?}",
            mapping.target,
            mapping.anchor_x,
            mapping.anchor_y,
            mapping.radius,
            rigpad_processing_core::blend::resolved_blend_mode(mapping),
        );
    }

    let issues = config.validate();
    if issues.is_empty() {
        println!("\nConfig is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!("\n{} issue(s) found.", issues.len());
    }

    Ok(())
}
