pub mod charting;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use molequiz::{
    clock::TimeSource,
    content::{AnswerOption, DisplayMode, Question},
    report::ReportOutcome,
    session::FeedbackKind,
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const HOLE_HEIGHT: u16 = 5;
const IMAGE_GLYPH: &str = "▣";

pub fn render_start<C: TimeSource>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let config = app.engine.config();
    let (_, total) = app.engine.progress();

    let lines = vec![
        Line::from(Span::styled(
            "molequiz",
            Style::default().patch(bold_style).fg(Color::Magenta),
        )),
        Line::default(),
        Line::from(Span::styled(format!("bank: {}", app.bank_name), bold_style)),
        Line::from(format!(
            "{total} questions · {} holes · {}s on the clock",
            config.option_slots, config.session_duration_secs
        )),
        Line::default(),
        Line::from(Span::styled(
            "hit the mole carrying the right answer; faster hits score more",
            italic_style,
        )),
        Line::default(),
        Line::from(Span::styled("(enter) start / (esc)ape", italic_style)),
    ];

    let height = lines.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

pub fn render_game<C: TimeSource>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let engine = &app.engine;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),           // score / clock / progress
            Constraint::Length(1),           // padding
            Constraint::Min(2),              // prompt
            Constraint::Length(1),           // point popups
            Constraint::Length(HOLE_HEIGHT), // board
            Constraint::Length(1),           // feedback
            Constraint::Length(1),           // legend
        ])
        .split(area);

    let (current, total) = engine.progress();
    let clock_style = if engine.time_remaining() <= 10 {
        Style::default().patch(bold_style).fg(Color::Red)
    } else {
        bold_style
    };
    Paragraph::new(Line::from(vec![
        Span::styled(format!("score {}", engine.score()), bold_style),
        Span::raw("   "),
        Span::styled(format!("{}s left", engine.time_remaining()), clock_style),
        Span::raw("   "),
        Span::styled(format!("question {current}/{total}"), dim_style),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let Some(view) = engine.round_view() else {
        Paragraph::new(Span::styled("get ready…", italic_style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
        return;
    };

    Paragraph::new(prompt_lines(view.question()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    let holes = hole_areas(chunks[4], view.slots().len());
    let popup_row = hole_areas(chunks[3], view.slots().len());
    let border_style = match engine.feedback() {
        FeedbackKind::Correct => Style::default().fg(Color::Green),
        FeedbackKind::Wrong => Style::default().fg(Color::Red),
        FeedbackKind::None => dim_style,
    };
    let mode = view.question().display_mode;

    for (idx, (hole, answer)) in holes.iter().zip(view.visible()).enumerate() {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ", idx + 1));
        let inner = block.inner(*hole);
        block.render(*hole, buf);

        let content = match answer {
            Some(answer) => Span::styled(
                fit_to_width(hole_label(mode, answer), inner.width as usize),
                bold_style,
            ),
            None => Span::styled("·", dim_style),
        };
        // vertically centre the single line inside the hole
        let middle = Rect {
            y: inner.y + inner.height / 2,
            height: inner.height.min(1),
            ..inner
        };
        Paragraph::new(content)
            .alignment(Alignment::Center)
            .render(middle, buf);
    }

    for popup in engine.popups() {
        if let Some(cell) = popup_row.get(popup.slot) {
            Paragraph::new(Span::styled(
                format!("+{}", popup.points),
                Style::default().patch(bold_style).fg(Color::Yellow),
            ))
            .alignment(Alignment::Center)
            .render(*cell, buf);
        }
    }

    let skipped = app.status.borrow().skipped;
    let feedback = match engine.feedback() {
        FeedbackKind::Correct => Span::styled(
            "correct!",
            Style::default().patch(bold_style).fg(Color::Green),
        ),
        FeedbackKind::Wrong => {
            Span::styled("nope", Style::default().patch(bold_style).fg(Color::Red))
        }
        FeedbackKind::None if skipped > 0 => Span::styled(
            format!("skipped {skipped} malformed question(s)"),
            dim_style,
        ),
        FeedbackKind::None => Span::raw(""),
    };
    Paragraph::new(feedback)
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

    Paragraph::new(Span::styled(
        "(1-9) hit / (r)estart / (h)ome / (esc)ape",
        italic_style,
    ))
    .render(chunks[6], buf);
}

pub fn render_results<C: TimeSource>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let Some(report) = app.engine.report() else {
        return;
    };
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // headline
            Constraint::Length(1), // padding
            Constraint::Min(1),    // chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // reaction times
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let headline = match report.outcome() {
        ReportOutcome::Perfect => Span::styled(
            "perfect round!",
            Style::default().patch(bold_style).fg(Color::Green),
        ),
        ReportOutcome::Completed => Span::styled(
            "all questions answered",
            Style::default().patch(bold_style).fg(Color::Cyan),
        ),
        ReportOutcome::TimeUp => Span::styled(
            "time's up",
            Style::default().patch(bold_style).fg(Color::Yellow),
        ),
    };
    Paragraph::new(headline)
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let mut points: Vec<(f64, f64)> = vec![(0.0, 0.0)];
    points.extend(report.score_timeline.iter().copied().map(<(f64, f64)>::from));
    let (overall_duration, highest_score) =
        charting::compute_chart_params(&points, report.time_used_secs as f64);

    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&points)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, overall_duration])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(overall_duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("score")
                .bounds([0.0, highest_score])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(highest_score), bold_style),
                ]),
        )
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} pts   {}/{} correct   {}% acc   {}s of {}s",
            report.final_score,
            report.correct_answers,
            report.total_questions,
            report.accuracy_percent,
            report.time_used_secs,
            report.session_duration_secs
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    if let Some(mean) = report.mean_reaction_secs {
        Paragraph::new(Span::styled(
            format!(
                "{mean:.2}s avg reaction   {:.2} sd",
                report.reaction_std_dev_secs.unwrap_or(0.0)
            ),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
    }

    Paragraph::new(Span::styled(
        "(enter) play again / (h)ome / (esc)ape",
        italic_style,
    ))
    .render(chunks[6], buf);
}

fn prompt_lines(question: &Question) -> Vec<Line<'_>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();
    if let Some(text) = question.prompt_text.as_deref() {
        lines.push(Line::from(Span::styled(text, bold_style)));
    }
    if let Some(image) = &question.prompt_image_ref {
        // an image-only prompt still needs something on screen
        if question.display_mode != DisplayMode::TextOnly || lines.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("{IMAGE_GLYPH} {image}"),
                Style::default().add_modifier(Modifier::DIM),
            )));
        }
    }
    lines
}

/// What a hole shows for `answer`; images stand in as a glyph.
fn hole_label(mode: DisplayMode, answer: &AnswerOption) -> String {
    let has_image = answer.display_image_ref.is_some();
    match mode {
        DisplayMode::TextOnly => answer.label().to_string(),
        DisplayMode::ImageOnly if has_image => IMAGE_GLYPH.to_string(),
        DisplayMode::ImageOnly => answer.label().to_string(),
        DisplayMode::TextAndImage if has_image => format!("{IMAGE_GLYPH} {}", answer.label()),
        DisplayMode::TextAndImage => answer.label().to_string(),
    }
}

/// Cuts `label` to `width` columns, ending in an ellipsis when shortened.
fn fit_to_width(label: String, width: usize) -> String {
    if label.width() <= width {
        return label;
    }
    let mut fitted = String::new();
    for c in label.chars() {
        let candidate = format!("{fitted}{c}…");
        if candidate.width() > width {
            break;
        }
        fitted.push(c);
    }
    if width > 0 {
        fitted.push('…');
    }
    fitted
}

fn hole_areas(area: Rect, count: usize) -> Vec<Rect> {
    let count = count.max(1) as u32;
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, count); count as usize])
        .split(area)
        .to_vec()
}
