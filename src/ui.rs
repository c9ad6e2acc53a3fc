use colored::*;
use jiff::civil::Date;

use crate::{
    models::task::{Priority, Task},
    services::{
        metrics::{DayStats, Dashboard, MonthStats},
        views::LabelSummary,
    },
};

/// Width of progress and chart bars.
const BAR_WIDTH: usize = 20;

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Get the appropriate status glyph for a task
pub fn get_status_glyph(task: &Task) -> ColoredString {
    if task.completed {
        "✓".dimmed()
    } else if task.is_live_template() {
        "↻".cyan()
    } else {
        "○".normal()
    }
}

fn priority_flag(priority: Priority) -> ColoredString {
    match priority {
        Priority::P1 => "P1".red(),
        Priority::P2 => "P2".yellow(),
        Priority::P3 => "P3".blue(),
        Priority::P4 => "".normal(),
    }
}

/// Labels plus the date when it differs from the section being shown
pub fn get_task_context(task: &Task, show_date: bool) -> Option<String> {
    let mut parts = vec![];
    if show_date {
        parts.push(format_date_header(task.date));
    }
    if !task.labels.is_empty() {
        let labels: Vec<String> = task.labels.iter().map(|l| format!("@{l}")).collect();
        parts.push(labels.join(" "));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("  ·  "))
    }
}

/// Render a single task line with short id, glyph, title, and right-aligned context
pub fn render_task_line(task: &Task, show_date: bool) {
    let terminal_width = get_terminal_width();

    let id_str = task.id.simple().to_string()[..8].to_string();
    let glyph = get_status_glyph(task);
    let star = if task.is_favorite { " ★" } else { "" };
    let flag = priority_flag(task.priority);

    let left_plain = format!("  {}  ○  {}{}", id_str, task.title, star);
    let left_section = format!("  {}  {}  {}{}", id_str.dimmed(), glyph, task.title, star.yellow());
    let styled_left = if task.completed {
        left_section.dimmed()
    } else {
        left_section.bold()
    };

    let right_section = match (get_task_context(task, show_date), task.priority.is_set()) {
        (Some(ctx), true) => format!("{}  {}", ctx, flag),
        (Some(ctx), false) => ctx,
        (None, true) => flag.to_string(),
        (None, false) => String::new(),
    };

    if right_section.is_empty() {
        println!("{}", styled_left);
        return;
    }

    let total_content = left_plain.chars().count() + console_width(&right_section);
    if total_content + 4 < terminal_width {
        let padding = terminal_width - total_content - 2;
        println!("{}{}{}", styled_left, " ".repeat(padding), right_section.dimmed());
    } else {
        // Not enough space for right alignment, just print normally
        println!("{}", styled_left);
    }
}

/// Visible width, ignoring ANSI escape sequences
fn console_width(text: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in text.chars() {
        match (in_escape, c) {
            (false, '\u{1b}') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, _) => width += 1,
        }
    }
    width
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize) {
    let task_word = if count == 1 { "task" } else { "tasks" };
    println!("\n  {} ({} {})\n", title.cyan().bold(), count, task_word);
}

/// Render a section header (e.g., "Tomorrow")
pub fn render_section_header(title: &str) {
    println!("\n  ─── {} ───\n", title.bold());
}

pub fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!(
        "{}{}",
        "█".repeat(filled).green(),
        "░".repeat(BAR_WIDTH - filled).dimmed()
    )
}

pub fn render_progress(percent: u8) {
    println!("  {} {:>3}%", progress_bar(percent), percent);
}

fn count_bar(value: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "▇".repeat(value * BAR_WIDTH / max)
}

/// Chart bar padded to `BAR_WIDTH` before styling, so escape codes do not
/// eat into the padding.
fn chart_bar(value: usize, max: usize) -> String {
    format!("{:<width$}", count_bar(value, max), width = BAR_WIDTH)
}

pub fn render_label_summaries(summaries: &[LabelSummary]) {
    if summaries.is_empty() {
        println!("No labels");
        return;
    }
    println!("{} ({})\n", "LABELS".cyan(), summaries.len());
    for summary in summaries {
        println!(
            "{} {}  {}",
            "•".green(),
            summary.name.bold(),
            format!("{} open", summary.open_tasks).dimmed()
        );
    }
}

fn render_weekly(weekly: &[DayStats]) {
    let max = weekly.iter().map(|d| d.total).max().unwrap_or(0);
    for day in weekly {
        println!(
            "  {}  {} {}/{}",
            day.day_name,
            chart_bar(day.completed, max).green(),
            day.completed,
            day.total
        );
    }
}

fn render_monthly(monthly: &[MonthStats]) {
    let max = monthly.iter().map(|m| m.completed).max().unwrap_or(0);
    for month in monthly {
        println!(
            "  {}  {} {}",
            month.name,
            chart_bar(month.completed, max).blue(),
            month.completed
        );
    }
}

pub fn render_dashboard(dashboard: &Dashboard) {
    println!("\n  {}\n", "PROGRESS DASHBOARD".cyan().bold());
    println!("  Completed  {}", dashboard.total_completed.to_string().bold());
    println!("  Streak     {} days", dashboard.streak.to_string().bold());
    print!("  Today    ");
    render_progress(dashboard.today_progress);

    render_section_header("Last 7 days");
    render_weekly(&dashboard.weekly);

    render_section_header("This year");
    render_monthly(&dashboard.monthly);
    println!();
}

/// Format a date as a human-readable header (e.g., "Tomorrow", "Monday, Feb 17")
pub fn format_date_header(date: Date) -> String {
    let today = jiff::Zoned::now().date();

    if date == today {
        "Today".to_string()
    } else if today.tomorrow().is_ok_and(|tomorrow| tomorrow == date) {
        "Tomorrow".to_string()
    } else if today.yesterday().is_ok_and(|yesterday| yesterday == date) {
        "Yesterday".to_string()
    } else {
        // Format as "Monday, Feb 17"
        date.strftime("%A, %b %d").to_string()
    }
}
