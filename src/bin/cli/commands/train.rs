use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use memodrill_lib::analysis::{PerformanceAnalyzer, RecommendationEngine};
use memodrill_lib::deck::{parse_card_list, Card, Dealer};
use memodrill_lib::training::{
    format_clock, CardObservation, SessionListener, SessionRecorder, SessionStatus,
    SessionSummarizer, SessionSummary, SessionType, SystemClock, TokioScheduler,
};
use memodrill_lib::DrillError;

use crate::app::App;
use crate::commands::analyze::print_report;
use crate::render::terminal::{card_label, format_ms, format_speed, heading, paint, Color};
use crate::OutputFormat;

/// Elapsed time is echoed this often so the terminal isn't flooded
const ELAPSED_ECHO_SECS: u64 = 30;

pub fn run(app: &mut App, focus: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let focus_cards = match focus {
        Some(list) => parse_card_list(list).context("Invalid --focus list")?,
        None => Vec::new(),
    };
    let session_type = if focus_cards.is_empty() {
        SessionType::Standard
    } else {
        SessionType::Focused
    };
    let dealer = app.config.dealer(focus_cards)?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start timer runtime")?;
    let saved = runtime.block_on(drill(app, dealer, session_type, use_color))?;

    let Some(summary) = saved else {
        println!("Session discarded.");
        return Ok(());
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Plain => {
            let analysis = PerformanceAnalyzer::new().analyze(&summary);
            println!();
            print_report(app, &summary, &analysis, use_color);

            let recommendations = RecommendationEngine::new().recommend(&summary, &analysis.problem_cards);
            println!("\n{}", heading("Recommendations", use_color));
            for rec in &recommendations {
                println!("  - {}: {}", paint(&rec.title, Color::CYAN, use_color), rec.description);
            }
        }
    }

    Ok(())
}

/// Run the interactive loop until the session is saved (Some) or abandoned (None)
async fn drill(
    app: &mut App,
    dealer: Dealer,
    session_type: SessionType,
    use_color: bool,
) -> Result<Option<SessionSummary>> {
    let (scheduler, mut fired) = TokioScheduler::new();
    let mut recorder = SessionRecorder::new(
        app.config.timing(),
        dealer,
        Box::new(SystemClock),
        Box::new(scheduler),
    )
    .with_listener(Box::new(TerminalListener { use_color }));
    let summarizer = SessionSummarizer::new();

    print_controls(&recorder, session_type, use_color);
    recorder.start()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(timer) = fired.recv() => {
                recorder.handle_timer(timer)?;
            }
            _ = tokio::signal::ctrl_c() => {
                return Ok(None);
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    // stdin closed
                    return Ok(None);
                };

                match line.trim() {
                    "" => on_enter(&mut recorder),
                    "p" => toggle_pause(&mut recorder),
                    "r" => {
                        recorder.reset();
                        println!("Session reset. Press Enter to start again.");
                    }
                    "i" => print_live_stats(&recorder, app.config.recent_cards, use_color),
                    "s" => match summarizer.close(&mut recorder, session_type) {
                        Ok(summary) => {
                            app.save_session(summary.clone())?;
                            println!("{}", paint("Session saved.", Color::GREEN, use_color));
                            return Ok(Some(summary));
                        }
                        Err(DrillError::EmptySession) => {
                            println!("No cards viewed yet, nothing to save.");
                        }
                        Err(e) => println!("{}", e),
                    },
                    "q" => return Ok(None),
                    other => println!("Unknown command '{}'", other),
                }
            }
        }
    }
}

fn on_enter(recorder: &mut SessionRecorder) {
    let result = match recorder.status() {
        SessionStatus::Idle | SessionStatus::Closed => recorder.start(),
        SessionStatus::Paused => recorder.resume(),
        SessionStatus::Active => recorder.acknowledge().map(|_| ()),
    };
    // Enter pressed between cards is not an error worth stopping for
    if let Err(e) = result {
        log::debug!("Ignored Enter: {}", e);
    }
}

fn toggle_pause(recorder: &mut SessionRecorder) {
    let result = match recorder.status() {
        SessionStatus::Active => recorder.pause().map(|_| println!("Paused. Press p or Enter to resume.")),
        SessionStatus::Paused => recorder.resume().map(|_| println!("Resumed.")),
        _ => Ok(()),
    };
    if let Err(e) = result {
        println!("{}", e);
    }
}

fn print_controls(recorder: &SessionRecorder, session_type: SessionType, use_color: bool) {
    let dealer = recorder.dealer();
    if dealer.is_focused() {
        let focus: Vec<String> = dealer.focus_cards().iter().map(|c| card_label(*c, use_color)).collect();
        println!("{} session, focus: {}", session_type, focus.join(" "));
    } else {
        println!("{} session", session_type);
    }
    println!("{}", paint("Enter = viewed   p = pause/resume   r = reset   i = stats   s = save   q = quit", Color::DIM, use_color));
}

fn print_live_stats(recorder: &SessionRecorder, recent: usize, use_color: bool) {
    let Some(stats) = recorder.live_stats(recent) else {
        println!("No cards viewed yet.");
        return;
    };
    println!("{} cards  avg {}  {}  {}",
        stats.cards_viewed,
        format_ms(stats.average_viewing_time_ms),
        format_speed(stats.cards_per_minute),
        format_clock(stats.elapsed_sec));
    let recent: Vec<String> = stats
        .recent
        .iter()
        .map(|o| format!("{} {}", card_label(o.card, use_color), format_ms(o.viewing_time_ms)))
        .collect();
    println!("  recent: {}", recent.join(", "));
}

/// Echoes session events to the terminal
struct TerminalListener {
    use_color: bool,
}

impl SessionListener for TerminalListener {
    fn on_card_presented(&mut self, card: Card) {
        println!("\n    {}    {}", card_label(card, self.use_color), paint(&card.name(), Color::GRAY, self.use_color));
    }

    fn on_observation_recorded(&mut self, observation: &CardObservation) {
        println!("    {}", paint(&format_ms(observation.viewing_time_ms), Color::DIM, self.use_color));
    }

    fn on_elapsed(&mut self, elapsed_sec: u64) {
        if elapsed_sec > 0 && elapsed_sec % ELAPSED_ECHO_SECS == 0 {
            println!("{}", paint(&format!("[{}]", format_clock(elapsed_sec)), Color::GRAY, self.use_color));
        }
    }
}
