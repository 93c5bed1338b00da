use std::io::{self, BufRead, Write};

use anyhow::Result;

use flashdeck_lib::study::{AnswerOutcome, StudySession, StudyState};

use crate::app::App;
use crate::render::terminal::{self, format_accuracy, Color};

const PROGRESS_WIDTH: usize = 30;

enum Key {
    Flip,
    Correct,
    Incorrect,
    Restart,
    Quit,
    Other,
}

fn read_key(label: &str) -> Result<Key> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(Key::Quit);
    }

    Ok(match line.trim().to_lowercase().as_str() {
        "" | "f" => Key::Flip,
        "y" | "c" => Key::Correct,
        "n" | "i" => Key::Incorrect,
        "r" => Key::Restart,
        "q" => Key::Quit,
        _ => Key::Other,
    })
}

pub fn run(app: &mut App, deck_name: &str, use_color: bool) -> Result<()> {
    let deck = app.find_deck(deck_name)?;
    let mut session = StudySession::new(&deck)?;
    app.flashdeck.flashcards.select_deck(Some(deck.id))?;

    println!("Studying \"{}\" ({} cards)", deck.name, session.len());

    loop {
        match session.state() {
            StudyState::Active { flipped, .. } => {
                let (position, total) = session.position().unwrap_or((0, session.len()));
                println!();
                println!(
                    "Card {} of {}  {}",
                    position,
                    total,
                    terminal::paint(
                        &terminal::progress_bar(session.progress_percent(), PROGRESS_WIDTH),
                        Color::GRAY,
                        use_color
                    )
                );
                if let Some(card) = session.current_card() {
                    println!("{}", terminal::render_card(card, flipped, use_color));
                }

                let label = if flipped {
                    "[y] correct  [n] incorrect  [q] quit: "
                } else {
                    "[Enter] flip  [q] quit: "
                };

                match read_key(label)? {
                    Key::Quit => break,
                    Key::Flip => session.flip(),
                    Key::Correct | Key::Incorrect if !flipped => {
                        println!("Flip the card before answering");
                    }
                    Key::Correct => {
                        report(&mut session, true, app, use_color);
                    }
                    Key::Incorrect => {
                        report(&mut session, false, app, use_color);
                    }
                    Key::Restart => session.restart(),
                    _ => {}
                }
            }
            StudyState::Complete => {
                let summary = session.summary();
                println!();
                println!("{}", terminal::paint("Session complete!", Color::BOLD, use_color));
                println!(
                    "  {}  {}  accuracy {}",
                    terminal::paint(&format!("{} correct", summary.correct), Color::GREEN, use_color),
                    terminal::paint(&format!("{} incorrect", summary.incorrect), Color::RED, use_color),
                    format_accuracy(summary.accuracy)
                );

                match read_key("[r] study again  [q] quit: ")? {
                    Key::Restart => session.restart(),
                    Key::Quit => break,
                    _ => {}
                }
            }
        }
    }

    app.flashdeck.flashcards.select_deck(None)?;
    Ok(())
}

fn report(session: &mut StudySession, correct: bool, app: &mut App, use_color: bool) {
    let outcome = session.answer(correct, &mut app.flashdeck.flashcards);
    if outcome == AnswerOutcome::Recorded {
        let (text, color) = if correct {
            ("Correct", Color::GREEN)
        } else {
            ("Incorrect", Color::RED)
        };
        println!("{}", terminal::paint(text, color, use_color));
    }
}
