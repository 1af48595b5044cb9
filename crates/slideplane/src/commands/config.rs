use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_or_default();
            config.set(&key, &value)?;
            let path = config.save()?;
            println!(
                "{} {key} = {value} ({})",
                "Saved".green().bold(),
                path.display()
            );
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();
    let gestures = config.gesture_config();
    let mode = match config.mode() {
        crate::navigation::Mode::Presentation => "presentation",
        crate::navigation::Mode::Editor => "editor",
    };

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "  (not created yet, showing defaults)".dimmed());
    }
    println!();
    println!("{}", "defaults".cyan().bold());
    println!("  mode: {mode}");
    println!(
        "  double_click_free_roam: {}",
        config.double_click_free_roam()
    );
    println!("  animation_seconds: {}", config.animation_seconds());
    println!("{}", "free_roam".cyan().bold());
    println!("  edge_threshold: {}", gestures.edge_threshold);
    println!("  tick_rate: {}", gestures.tick_rate);
    println!("  wheel_divisor: {}", gestures.wheel_divisor);
    println!("  double_click_interval: {}", gestures.double_click_interval);
    Ok(())
}
