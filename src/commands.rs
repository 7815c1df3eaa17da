use std::io::{self, Write};

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::error::{Error, Result};
use crate::models::{Day, PaletteColor, Task, TaskDraft};
use crate::planner::Planner;
use crate::schedule::{agenda_for, week_overview};
use crate::storage::JsonStorage;

/// Colour names accepted on the command line, in palette order.
pub const COLOR_NAMES: [&str; PaletteColor::ALL.len()] = {
    let mut names = [""; PaletteColor::ALL.len()];
    let mut i = 0;
    while i < names.len() {
        names[i] = PaletteColor::ALL[i].name();
        i += 1;
    }
    names
};

fn table_color(task: &Task) -> Color {
    if task.completed {
        return Color::Grey;
    }
    match PaletteColor::resolve(task.color.as_deref()) {
        PaletteColor::Indigo => Color::Blue,
        PaletteColor::Emerald => Color::Green,
        PaletteColor::Amber => Color::Yellow,
        PaletteColor::Rose => Color::Red,
        PaletteColor::Sky => Color::Cyan,
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}] {:.0}%", "#".repeat(filled), "-".repeat(width - filled), percent)
}

/// Looks up a task by id prefix. `Ok(None)` means nothing matched, which is
/// reported but not treated as a failure.
fn lookup(planner: &Planner, id: &str, silent: bool) -> Result<Option<String>> {
    match planner.resolve_id(id) {
        Ok(full) => Ok(Some(full)),
        Err(Error::TaskNotFound(_)) => {
            if !silent { eprintln!("Task {} not found.", id); }
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Shows the block happening now, its progress and the next block today.
pub fn cmd_now(planner: &Planner) {
    let now = planner.now();
    let view = planner.view();

    println!("{}, {}  {}", view.today, now.format("%Y-%m-%d"), now.format("%H:%M:%S"));
    println!();
    match view.active {
        Some(t) => {
            println!("Now:  {} ({} - {}){}", t.name, t.start_time, t.end_time, if t.completed { " [done]" } else { "" });
            if let Some(note) = &t.note {
                println!("      {}", note);
            }
            println!("      {}  ends at {}", progress_bar(view.progress_percent, 30), t.end_time);
        }
        None => println!("Now:  Free time. Relax and recharge."),
    }
    match view.next {
        Some(t) => println!("Next: {} (starts at {})", t.name, t.start_time),
        None => println!("Next: No more tasks scheduled for today."),
    }

    for w in &view.warnings {
        eprintln!("warning: {}", w);
    }
    for q in planner.unreadable() {
        eprintln!("warning: stored record skipped ({})", q.reason);
    }
}

/// Adds a new block. `day` defaults to today.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    planner: &mut Planner,
    name: String,
    day: Option<String>,
    start: String,
    end: String,
    note: Option<String>,
    color: Option<String>,
    silent: bool,
) -> Result<()> {
    let day = match day {
        Some(d) => d.parse()?,
        None => Day::of(&planner.now()),
    };
    let draft = TaskDraft {
        day,
        start_time: start.parse()?,
        end_time: end.parse()?,
        name,
        note,
        color,
    };
    let task = planner.add(draft)?;
    if !silent { println!("Task added (id = {}) on {} {}-{}", short_id(&task.id), task.day, task.start_time, task.end_time); }
    Ok(())
}

/// Flips the completed flag of a block.
pub fn cmd_toggle(planner: &mut Planner, id: &str, silent: bool) -> Result<()> {
    let Some(full) = lookup(planner, id, silent)? else { return Ok(()) };
    if let Some(done) = planner.toggle(&full)? {
        if !silent { println!("Task {} marked as {}.", short_id(&full), if done { "done" } else { "not done" }); }
    }
    Ok(())
}

/// Removes a block.
pub fn cmd_remove(planner: &mut Planner, id: &str, silent: bool) -> Result<()> {
    let Some(full) = lookup(planner, id, silent)? else { return Ok(()) };
    if planner.delete(&full)? {
        if !silent { println!("Task {} removed.", short_id(&full)); }
    }
    Ok(())
}

/// Edits a block's details. Fields left as `None` keep their current value.
#[allow(clippy::too_many_arguments)]
pub fn cmd_edit(
    planner: &mut Planner,
    id: &str,
    name: Option<String>,
    day: Option<String>,
    start: Option<String>,
    end: Option<String>,
    note: Option<String>,
    color: Option<String>,
    silent: bool,
) -> Result<()> {
    let Some(full) = lookup(planner, id, silent)? else { return Ok(()) };
    let mut draft = match planner.store().get(&full) {
        Some(t) => TaskDraft::from(t),
        None => return Err(Error::TaskNotFound(full)),
    };
    if let Some(n) = name { draft.name = n; }
    if let Some(d) = day { draft.day = d.parse()?; }
    if let Some(s) = start { draft.start_time = s.parse()?; }
    if let Some(e) = end { draft.end_time = e.parse()?; }
    if let Some(n) = note { draft.note = Some(n); }
    if let Some(c) = color { draft.color = Some(c); }
    planner.update(&full, draft)?;
    if !silent { println!("Task {} updated.", short_id(&full)); }
    Ok(())
}

/// Lists one day's schedule in start order. Defaults to today.
pub fn cmd_list(planner: &Planner, day: Option<String>) -> Result<()> {
    let now = planner.now();
    let today = Day::of(&now);
    let day = match day {
        Some(d) => d.parse()?,
        None => today,
    };
    let agenda = agenda_for(planner.tasks(), day);
    if agenda.is_empty() {
        println!("No tasks scheduled for {}.", day);
        return Ok(());
    }

    let view = planner.view();
    let active_id = view.active.filter(|_| day == today).map(|t| t.id.as_str());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Start").add_attribute(Attribute::Bold),
            Cell::new("End").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Note").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for t in agenda {
        let status = if Some(t.id.as_str()) == active_id {
            format!("Now {:.0}%", view.progress_percent)
        } else if t.completed {
            "Done".to_string()
        } else if !t.is_well_formed() {
            "Invalid".to_string()
        } else {
            "Pending".to_string()
        };
        let status_color = if t.completed { Color::Green } else { Color::Yellow };

        table.add_row(vec![
            Cell::new(short_id(&t.id)),
            Cell::new(t.start_time),
            Cell::new(t.end_time),
            Cell::new(&t.name).fg(table_color(t)),
            Cell::new(t.note.clone().unwrap_or_default()),
            Cell::new(status).fg(status_color),
        ]);
    }

    println!("{}'s Schedule", day);
    println!("{table}");
    Ok(())
}

/// Prints the whole week, Monday first.
pub fn cmd_week(planner: &Planner) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Day").add_attribute(Attribute::Bold),
            Cell::new("Blocks").add_attribute(Attribute::Bold),
            Cell::new("Done").add_attribute(Attribute::Bold),
        ]);

    let today = Day::of(&planner.now());
    for (day, agenda) in week_overview(planner.tasks()) {
        let blocks = if agenda.is_empty() {
            "-".to_string()
        } else {
            agenda
                .iter()
                .map(|t| format!("{}-{} {}{}", t.start_time, t.end_time, t.name, if t.completed { " ✓" } else { "" }))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let done = agenda.iter().filter(|t| t.completed).count();
        let mut day_cell = Cell::new(day);
        if day == today {
            day_cell = day_cell.add_attribute(Attribute::Bold).fg(Color::Cyan);
        }
        table.add_row(vec![day_cell, Cell::new(blocks), Cell::new(format!("{}/{}", done, agenda.len()))]);
    }

    println!("{table}");
}

/// Deletes the schedule and the reset record.
pub fn cmd_wipe(storage: &JsonStorage, force: bool) -> Result<()> {
    if !force {
        print!("Are you sure you want to delete the whole schedule? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }

    storage.delete_database()?;
    println!("Schedule deleted.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_names_follow_the_palette() {
        assert_eq!(COLOR_NAMES, ["indigo", "emerald", "amber", "rose", "sky"]);
        for (name, color) in COLOR_NAMES.iter().zip(PaletteColor::ALL) {
            assert_eq!(PaletteColor::resolve(Some(name)), color);
        }
    }

    #[test]
    fn progress_bar_rounds_and_clamps() {
        assert_eq!(progress_bar(0.0, 10), "[----------] 0%");
        assert_eq!(progress_bar(50.0, 10), "[#####-----] 50%");
        assert_eq!(progress_bar(100.0, 4), "[####] 100%");
    }

    #[test]
    fn short_id_handles_short_ids() {
        assert_eq!(short_id("1"), "1");
        assert_eq!(short_id("0123456789abcdef"), "01234567");
    }
}
