use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::deck::Deck;
use crate::focus::Focus;
use crate::resolver::{self, Resolved};
use crate::slide::SlideRegistry;

/// Run the check command: load the deck and resolve every focus.
pub fn run(file: &Path) -> Result<()> {
    let deck = Deck::load(file).with_context(|| format!("Invalid deck {}", file.display()))?;

    println!(
        "{} {} ({} slide(s), {} focus stop(s))",
        "Deck".bold(),
        deck.title.as_deref().unwrap_or("untitled"),
        deck.registry.len(),
        deck.focuses.len()
    );

    let mut failed = 0;
    for (index, line) in report(&deck.focuses, &deck.registry).into_iter().enumerate() {
        match line {
            Ok(text) => println!("  {:>3}. {text}", index + 1),
            Err(e) => {
                println!("  {:>3}. {}", index + 1, e.red());
                failed += 1;
            }
        }
    }

    println!();
    if failed > 0 {
        anyhow::bail!("{failed} focus stop(s) failed to resolve");
    }
    println!("{}", "All focus stops resolve.".green().bold());
    Ok(())
}

/// One line per focus: what it targets and the camera it resolves to.
fn report(focuses: &[Focus], registry: &SlideRegistry) -> Vec<Result<String, String>> {
    focuses
        .iter()
        .map(|focus| {
            resolver::resolve_focus(focus, registry)
                .map(|resolved| describe(focus, &resolved))
                .map_err(|e| format!("{}: {e}", focus.describe()))
        })
        .collect()
}

fn describe(focus: &Focus, resolved: &Resolved) -> String {
    let camera = resolved.camera;
    let mut line = format!(
        "{} -> offset ({:.3}, {:.3}) scale {:.4}",
        focus.describe(),
        camera.offset.dx,
        camera.offset.dy,
        camera.scale
    );
    if let Some(first) = resolved.hint.lines().find(|l| !l.trim().is_empty()) {
        line.push_str(&format!("  \"{first}\""));
    }
    line
}
