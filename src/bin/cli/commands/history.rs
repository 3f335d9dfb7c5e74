use anyhow::Result;

use memodrill_lib::training::format_clock;

use crate::app::App;
use crate::render::terminal::{format_ms, format_speed, rule};
use crate::OutputFormat;

pub fn run(app: &App, limit: Option<usize>, format: &OutputFormat) -> Result<()> {
    let mut sessions = app.sessions()?;
    if let Some(limit) = limit {
        sessions.truncate(limit);
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
        OutputFormat::Plain => {
            if sessions.is_empty() {
                println!("No sessions recorded yet.");
                return Ok(());
            }

            let id_width = sessions.iter().map(|s| s.id.len()).max().unwrap_or(2).clamp(2, 36);
            let widths = [id_width, 16, 8, 8, 6, 9, 10];

            println!("{:<id_w$} {:<16} {:<8} {:>8} {:>6} {:>9} {:>10}",
                "Id", "Started", "Type", "Duration", "Cards", "Average", "Speed",
                id_w = id_width);
            println!("{}", rule(&widths));

            for session in &sessions {
                println!("{:<id_w$} {:<16} {:<8} {:>8} {:>6} {:>9} {:>10}",
                    session.id,
                    session.start_time.format("%Y-%m-%d %H:%M").to_string(),
                    session.session_type,
                    format_clock(session.duration_sec),
                    session.card_count,
                    format_ms(session.average_viewing_time_ms),
                    format_speed(session.cards_per_minute()),
                    id_w = id_width);
            }

            println!("\n{} sessions in {}", sessions.len(), app.data_dir.display());
        }
    }

    Ok(())
}
