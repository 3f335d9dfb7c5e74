use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use memodrill_lib::deck::{parse_card_list, DeckBuilder, FOCUS_PRESETS};

use crate::app::App;
use crate::render::terminal::card_label;
use crate::OutputFormat;

pub fn run(
    app: &App,
    focus: Option<&str>,
    size: Option<usize>,
    seed: Option<u64>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let focus_cards = match focus {
        Some(list) => parse_card_list(list).context("Invalid --focus list")?,
        None => Vec::new(),
    };
    let target_size = size.unwrap_or(app.config.focused_deck_size);

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let deck = DeckBuilder::new().build_deck(&focus_cards, target_size, &mut rng)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&deck)?);
        }
        OutputFormat::Plain => {
            for row in deck.chunks(13) {
                let labels: Vec<String> = row.iter().map(|c| {
                    // Pad on the plain label; escape codes would throw off {:>4}
                    let pad = 4usize.saturating_sub(c.to_string().chars().count());
                    format!("{}{}", " ".repeat(pad), card_label(*c, use_color))
                }).collect();
                println!("{}", labels.join(""));
            }
            if focus_cards.is_empty() {
                println!("\n{} cards (standard deck)", deck.len());
            } else {
                let focus_labels: Vec<String> = focus_cards.iter().map(|c| card_label(*c, use_color)).collect();
                println!("\n{} cards, focus: {}", deck.len(), focus_labels.join(" "));
            }
            if focus.is_none() {
                let presets: Vec<String> = FOCUS_PRESETS.iter().map(|c| c.to_string()).collect();
                println!("Focus presets: {}", presets.join(" "));
            }
        }
    }

    Ok(())
}
