use anyhow::Result;

use memodrill_lib::analysis::DashboardAggregator;
use memodrill_lib::training::format_clock;

use crate::app::App;
use crate::render::terminal::{bar, format_ms, format_speed, heading, paint, Color};
use crate::OutputFormat;

const CHART_WIDTH: usize = 30;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let sessions = app.sessions()?;
    let aggregator = DashboardAggregator::new();

    let stats = aggregator.aggregate(&sessions);
    let trend = aggregator.trend(&sessions, app.config.trend_window);
    let recent = aggregator.recent(&sessions, app.config.recent_sessions);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "stats": stats,
                "trend": trend,
                "recentSessions": recent,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", heading("Dashboard", use_color));
            println!("  Sessions     {}", stats.total_sessions);
            println!("  Cards        {}", stats.total_cards);
            println!("  Average      {}", format_ms(stats.average_time_ms));
            match aggregator.best_session(&sessions) {
                Some(best) => println!("  Best speed   {:.1}/min ({})",
                    stats.best_speed_cards_per_min,
                    best.start_time.format("%Y-%m-%d %H:%M")),
                None => println!("  Best speed   {:.1}/min", stats.best_speed_cards_per_min),
            }

            if trend.is_empty() {
                println!("\nNo sessions recorded yet. Run `memodrill-cli train` to start.");
                return Ok(());
            }

            println!("\n{}", heading("Progress", use_color));
            let max = trend.iter().map(|p| p.average_viewing_time_ms).fold(0.0, f64::max);
            for point in &trend {
                println!("  {:<11} {:>7} {:>10} {}",
                    point.label,
                    format_ms(point.average_viewing_time_ms),
                    format_speed(point.cards_per_min),
                    paint(&bar(point.average_viewing_time_ms, max, CHART_WIDTH), Color::CYAN, use_color));
            }

            println!("\n{}", heading("Recent sessions", use_color));
            for session in recent {
                println!("  {}  {:<8} {:>3} cards  {}  {}",
                    session.start_time.format("%Y-%m-%d %H:%M"),
                    session.session_type,
                    session.card_count,
                    format_clock(session.duration_sec),
                    format_ms(session.average_viewing_time_ms));
            }
        }
    }

    Ok(())
}
