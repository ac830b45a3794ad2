use colored::*;

use crate::models::{
    slot::{DAY_NAMES, DAYS_PER_WEEK, FIRST_PLANNING_HOUR, LAST_PLANNING_HOUR, Slot},
    store::Store,
    task::{Category, Task, TaskStatus},
};
use crate::scheduler;

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Terminal color for a task category (the hex palette of the original
/// theme, mapped to the nearest ANSI color)
pub fn category_color(category: Category) -> Color {
    match category {
        Category::Study => Color::Magenta,
        Category::Exercise => Color::Green,
        Category::Research => Color::BrightMagenta,
        Category::Creation => Color::Yellow,
        Category::Other => Color::White,
    }
}

/// Get the appropriate status glyph for a task
pub fn get_status_glyph(task: &Task) -> ColoredString {
    match task.status {
        TaskStatus::Completed => "✓".green(),
        TaskStatus::Skipped => "−".dimmed(),
        TaskStatus::Pending => "○".normal(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else if max == 0 {
        String::new()
    } else {
        let cut: String = text.chars().take(max - 1).collect();
        format!("{}…", cut)
    }
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize, noun: &str) {
    let word = if count == 1 {
        noun.to_string()
    } else {
        format!("{}s", noun)
    };
    println!("\n  {} ({} {})\n", title.cyan().bold(), count, word);
}

/// Render a section header (e.g., a day of the week)
pub fn render_section_header(title: &str) {
    println!("\n  ─── {} ───\n", title.bold());
}

/// Render a single task line with glyph, title, placement progress and
/// right-aligned objective context
pub fn render_task_line(task: &Task, store: &Store) {
    let terminal_width = get_terminal_width();

    let glyph = get_status_glyph(task);
    let placement = format!(
        "{}/{}",
        task.scheduled_slots.len(),
        task.repeat_count
    );
    let recurring_mark = if task.is_recurring { " ↻" } else { "" };

    let left_section = format!(
        "  {}  {}  {}{}",
        glyph, task.title, placement, recurring_mark
    );

    let objective = store
        .get_objective(task.objective_id)
        .map(|o| o.title.clone())
        .unwrap_or_default();
    let right_section = format!(
        "{} · {} · {}m",
        objective,
        task.category.name(),
        task.duration_minutes
    );

    let left_visible_len = format!(
        "  {}  {}  {}{}",
        " ", task.title, placement, recurring_mark
    )
    .chars()
    .count();
    let right_visible_len = right_section.chars().count();

    if left_visible_len + right_visible_len + 4 < terminal_width {
        let padding = terminal_width - left_visible_len - right_visible_len - 2;
        println!("{}{}{}", left_section, " ".repeat(padding), right_section.dimmed());
    } else {
        println!("{}", left_section);
    }
}

/// Render the weekly grid: days across, planning hours down. Blocked slots
/// are hatched, occupants colored by category, completed sessions checked.
pub fn render_grid(store: &Store) {
    let terminal_width = get_terminal_width();
    let cell_width = ((terminal_width.saturating_sub(5)) / DAYS_PER_WEEK as usize).clamp(5, 14);

    // Header row with day abbreviations
    let mut header = String::from("     ");
    for name in DAY_NAMES {
        header.push_str(&format!("{:<width$}", &name[..3], width = cell_width));
    }
    println!("\n{}", header.bold());

    for hour in FIRST_PLANNING_HOUR..=LAST_PLANNING_HOUR {
        print!("{} ", format!("{:>3}h", hour).dimmed());
        for day in 0..DAYS_PER_WEEK {
            let slot = Slot { day, hour };
            let cell = render_grid_cell(store, slot, cell_width - 1);
            print!("{} ", cell);
        }
        println!();
    }
    println!();
}

fn render_grid_cell(store: &Store, slot: Slot, width: usize) -> ColoredString {
    if let Some(task) = scheduler::occupant(&store.tasks, slot) {
        let completed = task.completed_slots.contains(&slot);
        let label = if completed {
            format!("✓{}", truncate(&task.title, width.saturating_sub(1)))
        } else {
            truncate(&task.title, width)
        };
        let padded = format!("{:<width$}", label, width = width);
        let colored = padded.color(category_color(task.category));
        if completed { colored.dimmed() } else { colored }
    } else if scheduler::is_blocked(&store.schedule, slot) {
        "▒".repeat(width).dimmed()
    } else {
        format!("·{}", " ".repeat(width.saturating_sub(1))).dimmed()
    }
}

/// Render one day of the agenda: sessions sorted by hour, with per-slot
/// completion marks and subtask detail
pub fn render_agenda_day(store: &Store, day: u8) {
    render_section_header(DAY_NAMES[day as usize]);

    let mut items: Vec<(&Task, Slot)> = store
        .tasks
        .iter()
        .flat_map(|t| {
            t.scheduled_slots
                .iter()
                .filter(|s| s.day == day)
                .map(move |s| (t, *s))
        })
        .collect();
    items.sort_by_key(|(_, slot)| slot.hour);

    if items.is_empty() {
        println!("  {}", "Nothing planned. Enjoy the free time!".dimmed());
        return;
    }

    for (task, slot) in items {
        let completed = task.completed_slots.contains(&slot);
        let glyph = if completed { "✓".green() } else { "○".normal() };
        let objective = store
            .get_objective(task.objective_id)
            .map(|o| o.title.clone())
            .unwrap_or_default();
        let title = if completed {
            task.title.dimmed().strikethrough()
        } else {
            task.title.bold()
        };

        println!(
            "  {}  {}  {}  {}",
            format!("{:>2}h", slot.hour).dimmed(),
            glyph,
            title,
            format!(
                "{} · {} · {} min",
                objective,
                task.category.name(),
                task.duration_minutes
            )
            .dimmed()
        );

        for subtask in &task.subtasks {
            let mark = if subtask.completed_in_slots.contains(&slot) {
                "✓".green()
            } else {
                "·".dimmed()
            };
            println!("         {} {}", mark, subtask.title.dimmed());
        }
    }
}

/// Render the dashboard: overall progress, per-objective progress bars and
/// planned minutes per category
pub fn render_stats(store: &Store) {
    let total_slots: usize = store.tasks.iter().map(|t| t.scheduled_slots.len()).sum();
    let completed_slots: usize = store.tasks.iter().map(|t| t.completed_slots.len()).sum();
    let progress = percent(completed_slots, total_slots);
    let minutes_done: u32 = store
        .tasks
        .iter()
        .map(|t| t.duration_minutes * t.completed_slots.len() as u32)
        .sum();

    render_view_header("Dashboard", total_slots, "session");
    println!(
        "  {}   {}   {}",
        format!("{}% done", progress).bold(),
        format!("{:.1}h worked", f64::from(minutes_done) / 60.0),
        format!("{} sessions planned", total_slots),
    );

    if !store.objectives.is_empty() {
        render_section_header("Objectives");
        for objective in &store.objectives {
            let tasks: Vec<_> = store
                .tasks
                .iter()
                .filter(|t| t.objective_id == objective.id)
                .collect();
            let planned: usize = tasks.iter().map(|t| t.scheduled_slots.len()).sum();
            let done: usize = tasks.iter().map(|t| t.completed_slots.len()).sum();
            let objective_progress = percent(done, planned);

            println!(
                "  {:<28} {} {:>3}%  {}",
                truncate(&objective.title, 28),
                progress_bar(objective_progress, 20).cyan(),
                objective_progress,
                format!("{} sessions", planned).dimmed()
            );
        }
    }

    let mut any_category = false;
    for category in Category::ALL {
        let minutes: u32 = store
            .tasks
            .iter()
            .filter(|t| t.category == category)
            .map(|t| t.duration_minutes * t.scheduled_slots.len() as u32)
            .sum();
        if minutes == 0 {
            continue;
        }
        if !any_category {
            render_section_header("Planned time by category");
            any_category = true;
        }
        println!(
            "  {:<12} {}",
            category.name().color(category_color(category)),
            format!("{}m", minutes)
        );
    }
    println!();
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as u32
    }
}

fn progress_bar(percent: u32, width: usize) -> String {
    let filled = (percent as usize * width) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounds_and_handles_empty() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn test_progress_bar_width_is_stable() {
        assert_eq!(progress_bar(0, 10).chars().count(), 10);
        assert_eq!(progress_bar(50, 10).chars().count(), 10);
        assert_eq!(progress_bar(100, 10).chars().count(), 10);
    }

    #[test]
    fn test_truncate_is_char_aware() {
        assert_eq!(truncate("Étude", 10), "Étude");
        assert_eq!(truncate("Grammar drills", 8), "Grammar…");
    }
}
