use anyhow::Result;

use memodrill_lib::analysis::{DashboardAggregator, PerformanceAnalyzer, RecommendationEngine, SessionAnalysis};
use memodrill_lib::training::{format_clock, SessionSummary};

use crate::app::App;
use crate::render::terminal::{bar, card_label, format_ms, format_speed, heading, paint, Color};
use crate::OutputFormat;

const CHART_WIDTH: usize = 30;

pub fn run(app: &App, session_id: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let summary = app.find_session(session_id)?;
    let analysis = PerformanceAnalyzer::new().analyze(&summary);
    let recommendations = RecommendationEngine::new().recommend(&summary, &analysis.problem_cards);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "session": summary,
                "cardsPerMinute": summary.cards_per_minute(),
                "analysis": analysis,
                "recommendations": recommendations,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            print_report(app, &summary, &analysis, use_color);

            println!("\n{}", heading("Recommendations", use_color));
            for (i, rec) in recommendations.iter().enumerate() {
                println!("  {}. {}", i + 1, paint(&rec.title, Color::CYAN, use_color));
                println!("     {}", rec.description);
            }

            let sessions = app.sessions()?;
            let recent = DashboardAggregator::new().recent(&sessions, app.config.recent_sessions);
            if recent.len() > 1 {
                println!("\n{}", heading("Recent sessions", use_color));
                for session in recent {
                    let marker = if session.id == summary.id { "* " } else { "  " };
                    println!("{}{}  {}  {} cards",
                        marker,
                        session.id,
                        session.start_time.format("%Y-%m-%d %H:%M"),
                        session.card_count);
                }
                println!("{}", paint("Use --session <id> to analyse another session.", Color::DIM, use_color));
            }
        }
    }

    Ok(())
}

/// Overview, slowest-card chart and problem areas. Shared with `train`.
pub fn print_report(app: &App, summary: &SessionSummary, analysis: &SessionAnalysis, use_color: bool) {
    println!("{}", heading(&format!("Session {}", summary.id), use_color));
    println!("  Started    {}", summary.start_time.format("%Y-%m-%d %H:%M:%S"));
    println!("  Type       {}", summary.session_type);
    println!("  Duration   {}", format_clock(summary.duration_sec));
    println!("  Cards      {}", summary.card_count);
    println!("  Average    {}", format_ms(summary.average_viewing_time_ms));
    println!("  Speed      {}", format_speed(summary.cards_per_minute()));

    let slowest = analysis.slowest(app.config.chart_cards);
    if !slowest.is_empty() {
        println!("\n{}", heading("Slowest cards", use_color));
        let max = slowest[0].average_time_ms;
        for aggregate in slowest {
            let pad = 4usize.saturating_sub(aggregate.card.to_string().chars().count());
            println!("  {}{} {:>7} {}",
                " ".repeat(pad),
                card_label(aggregate.card, use_color),
                format_ms(aggregate.average_time_ms),
                paint(&bar(aggregate.average_time_ms, max, CHART_WIDTH), Color::GRAY, use_color));
        }
    }

    println!("\n{}", heading("Problem areas", use_color));
    if analysis.problem_cards.is_empty() {
        println!("  {}", paint("No problem cards identified.", Color::GREEN, use_color));
        return;
    }
    for aggregate in analysis.problem_cards.iter().take(app.config.problem_cards_shown) {
        let slowdown = aggregate.slowdown(summary.average_viewing_time_ms);
        println!("  {} {}  {} avg, {} slower than average ({:.0}%)",
            paint("\u{25b2}", Color::YELLOW, use_color),
            aggregate.card.name(),
            format_ms(aggregate.average_time_ms),
            format_ms(slowdown.extra_ms),
            slowdown.percent_slower);
    }
}
