use flashdeck_lib::flashcards::Flashcard;

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

const CARD_WIDTH: usize = 60;

/// Wrap `text` in `color` when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Boxed card face: the front, or the back once flipped
pub fn render_card(card: &Flashcard, flipped: bool, use_color: bool) -> String {
    let (label, text) = if flipped {
        ("Answer", card.back.as_str())
    } else {
        ("Question", card.front.as_str())
    };

    let border = format!("+{}+", "-".repeat(CARD_WIDTH + 2));
    let mut lines = vec![border.clone()];
    lines.push(boxed_line(&paint(label, Color::DIM, use_color), label.chars().count()));
    lines.push(boxed_line("", 0));
    for line in wrap_lines(text, CARD_WIDTH) {
        let width = line.chars().count();
        lines.push(boxed_line(&line, width));
    }
    lines.push(border);
    lines.join("\n")
}

fn boxed_line(content: &str, visible_width: usize) -> String {
    let padding = CARD_WIDTH.saturating_sub(visible_width);
    format!("| {}{} |", content, " ".repeat(padding))
}

/// `[#####-----] 50%`
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!(
        "[{}{}] {:.0}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        percent
    )
}

/// Accuracy as a whole percentage, or a dash before any answers
pub fn format_accuracy(accuracy: Option<f64>) -> String {
    match accuracy {
        Some(value) => format!("{:.0}%", value),
        None => "-".to_string(),
    }
}

/// Word-wrapping for terminal output. Words wider than `max_width` are
/// split across lines.
pub fn wrap_lines(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut lines = Vec::new();

    for line in text.lines() {
        if line.chars().count() <= max_width {
            lines.push(line.to_string());
            continue;
        }

        let mut current_line = String::new();
        for word in line.split_whitespace().flat_map(|w| split_long_word(w, max_width)) {
            if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_line.chars().count() + 1 + word.chars().count() <= max_width {
                current_line.push(' ');
                current_line.push_str(&word);
            } else {
                lines.push(std::mem::take(&mut current_line));
                current_line = word.to_string();
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() && !text.is_empty() {
        lines.push(text.to_string());
    }

    lines
}

fn split_long_word(word: &str, max_width: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(max_width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
