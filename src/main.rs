use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::*;

use crate::{
    models::{
        slot::{DAY_NAMES, Slot, parse_day},
        store::Store,
    },
    scheduler::{Assignment, Completion, SubtaskToggle, Unassignment},
    services::{
        constraints::{block_slot, open_slot},
        notes::{
            AddNoteParameters, LinkNoteParameters, add_note, create_note_category, delete_note,
            link_note,
        },
        objectives::{
            CreateObjectiveParameters, DeleteObjectiveParameters, create_objective,
            delete_objective,
        },
        planning::{
            CheckSubtaskParameters, CompleteSlotParameters, PlanTaskParameters, check_subtask,
            clear_slot, complete_slot, plan_task,
        },
        reset::{start_new_week, wipe_all},
        tasks::{
            AddSubtaskParameters, AddTaskParameters, DeleteTaskParameters, EditTaskParameters,
            add_subtask, add_task, delete_task, edit_task,
        },
    },
    storage::{Storage, json::JsonFileStorage},
};

mod models;
mod scheduler;
mod services;
mod storage;
mod ui;

#[derive(Parser)]
#[command(
    name = "otter",
    about = "A weekly planner for your terminal: objectives, constraints, and an hour grid"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage objectives
    #[command(subcommand)]
    Objective(ObjectiveCommands),

    /// Manage weekly availability constraints
    #[command(subcommand)]
    Constraint(ConstraintCommands),

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Place a task occurrence into a slot
    Plan {
        /// Task title (or part of it)
        task: String,

        /// Day, as an index (0 = Monday) or a name
        day: String,

        /// Hour of day (0-23)
        hour: u8,
    },

    /// Remove whatever occupies a slot
    Clear {
        /// Day, as an index (0 = Monday) or a name
        day: String,

        /// Hour of day (0-23)
        hour: u8,
    },

    /// Toggle completion of a scheduled session
    Done {
        /// Task title (or part of it)
        task: String,

        /// Day, as an index (0 = Monday) or a name
        day: String,

        /// Hour of day (0-23)
        hour: u8,
    },

    /// Toggle a subtask within a scheduled session
    Step {
        /// Task title (or part of it)
        task: String,

        /// Subtask title (or part of it)
        subtask: String,

        /// Day, as an index (0 = Monday) or a name
        day: String,

        /// Hour of day (0-23)
        hour: u8,
    },

    /// Show the weekly grid
    Grid,

    /// Show the agenda for a day (default: today)
    Agenda {
        /// Day, as an index (0 = Monday) or a name
        day: Option<String>,
    },

    /// Show overall progress and per-objective stats
    Stats,

    /// Start a new week: reset recurring tasks, retire finished one-offs
    Reset,

    /// Erase all data
    Wipe {
        /// Confirm erasing everything
        #[arg(long)]
        force: bool,
    },

    /// Manage notes
    #[command(subcommand)]
    Note(NoteCommands),
}

#[derive(Subcommand)]
enum ObjectiveCommands {
    /// Create a new objective
    New {
        title: String,

        /// Monthly horizon instead of weekly
        #[arg(long)]
        month: bool,

        /// Add a description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete an objective and its tasks
    Delete { slug: String },
    /// List all objectives
    List,
}

#[derive(Subcommand)]
enum ConstraintCommands {
    /// Mark a slot as unavailable
    Block { day: String, hour: u8 },
    /// Make a blocked slot available again
    Open { day: String, hour: u8 },
    /// List blocked slots
    List,
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Add a new task
    Add {
        /// Task title
        title: String,

        /// Objective the task belongs to (slug or part of the title)
        #[arg(short, long)]
        objective: String,

        /// Category: study, exercise, research, creation or other
        #[arg(short, long)]
        category: Option<String>,

        /// Length of one session in minutes
        #[arg(short, long, default_value_t = 30)]
        duration: u32,

        /// How many sessions per week
        #[arg(short, long, default_value_t = 1)]
        repeat: u32,

        /// One-off task: retired once completed instead of resetting weekly
        #[arg(long)]
        once: bool,
    },
    /// Edit a task's title, category, duration, repeat count or recurrence
    Edit {
        /// Task title (or part of it)
        task: String,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New category: study, exercise, research, creation or other
        #[arg(short, long)]
        category: Option<String>,

        /// New session length in minutes
        #[arg(short, long)]
        duration: Option<u32>,

        /// New number of sessions per week; lowering it below the number of
        /// placed sessions unplans the newest ones
        #[arg(short, long)]
        repeat: Option<u32>,

        /// Make the task one-off
        #[arg(long, conflicts_with = "weekly")]
        once: bool,

        /// Make the task repeat weekly
        #[arg(long)]
        weekly: bool,
    },
    /// Delete a task
    Delete { title: String },
    /// List all tasks
    List,
    /// Add a subtask to a task
    Step { task: String, title: String },
}

#[derive(Subcommand)]
enum NoteCommands {
    /// Add a note
    Add {
        title: String,

        /// Note content
        #[arg(short = 'm', long)]
        content: Option<String>,

        /// Note category name
        #[arg(long)]
        category: Option<String>,

        /// Add tags (can be used multiple times)
        #[arg(short, long, action = clap::ArgAction::Append)]
        tag: Vec<String>,
    },
    /// List notes
    List,
    /// Delete a note
    Delete { title: String },
    /// Link a note to a task
    Link { note: String, task: String },
    /// Manage note categories
    #[command(subcommand)]
    Category(NoteCategoryCommands),
}

#[derive(Subcommand)]
enum NoteCategoryCommands {
    /// Create a note category
    New { name: String },
    /// List note categories
    List,
}

fn parse_slot_or_exit(day: &str, hour: u8) -> Slot {
    let Some(day_index) = parse_day(day) else {
        eprintln!(
            "Error: Unknown day '{}'. Use 0-6 or a day name (Monday = 0).",
            day
        );
        std::process::exit(1);
    };
    let Some(slot) = Slot::new(day_index, hour) else {
        eprintln!("Error: Hour {} is out of range (0-23).", hour);
        std::process::exit(1);
    };
    slot
}

fn today_index() -> u8 {
    // jiff weekday: Monday = 1 .. Sunday = 7; the grid wants Monday = 0
    (jiff::Zoned::now().date().weekday().to_monday_one_offset() - 1) as u8
}

fn main() {
    let cli = Cli::parse();

    // Initialize storage
    let storage_path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("otter")
        .join("store.json");

    // Create parent directory if it doesn't exist
    if let Some(parent) = storage_path.parent() {
        std::fs::create_dir_all(parent).unwrap_or_else(|e| {
            eprintln!("Error: Failed to create data directory: {}", e);
            std::process::exit(1);
        });
    }

    let storage = JsonFileStorage::new(storage_path);

    let mut store = match storage.load() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: Failed to load store: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Objective(command)) => run_objective(command, &mut store, &storage),
        Some(Commands::Constraint(command)) => run_constraint(command, &mut store, &storage),
        Some(Commands::Task(command)) => run_task(command, &mut store, &storage),
        Some(Commands::Note(command)) => run_note(command, &mut store, &storage),

        Some(Commands::Plan { task, day, hour }) => {
            let slot = parse_slot_or_exit(&day, hour);
            match plan_task(&mut store, &storage, PlanTaskParameters { task, slot }) {
                Ok((Assignment::Placed { filled }, title)) => {
                    println!(
                        "{} Placed '{}' on {} at {}h.",
                        "✓".green(),
                        title,
                        slot.day_name(),
                        slot.hour
                    );
                    if filled {
                        println!("  {}", "All occurrences placed.".dimmed());
                    }
                }
                Ok((Assignment::SlotBlocked, _)) => {
                    println!("Slot {} at {}h is blocked. Nothing placed.", slot.day_name(), slot.hour);
                }
                Ok((Assignment::SlotOccupied, _)) => {
                    println!(
                        "Slot {} at {}h is already taken. Clear it first.",
                        slot.day_name(),
                        slot.hour
                    );
                }
                Ok((Assignment::RepeatExhausted, title)) => {
                    println!("'{}' already has all its occurrences placed.", title);
                }
                Ok((Assignment::UnknownTask, _)) => unreachable!("task resolved before assign"),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Some(Commands::Clear { day, hour }) => {
            let slot = parse_slot_or_exit(&day, hour);
            match clear_slot(&mut store, &storage, slot) {
                Ok(Unassignment::Cleared { task_id }) => {
                    let title = store
                        .get_task(task_id)
                        .map(|t| t.title.clone())
                        .unwrap_or_default();
                    println!(
                        "{} Cleared '{}' from {} at {}h.",
                        "✓".green(),
                        title,
                        slot.day_name(),
                        slot.hour
                    );
                }
                Ok(Unassignment::Empty) => {
                    println!("Slot {} at {}h is already empty.", slot.day_name(), slot.hour);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Some(Commands::Done { task, day, hour }) => {
            let slot = parse_slot_or_exit(&day, hour);
            match complete_slot(&mut store, &storage, CompleteSlotParameters { task, slot }) {
                Ok((Completion::Checked { task_completed }, title)) => {
                    if task_completed {
                        println!("{} Session done. '{}' is complete! 🎉", "✓".green(), title);
                    } else {
                        println!("{} Session done. Keep going!", "✓".green());
                    }
                }
                Ok((Completion::Unchecked, title)) => {
                    println!("Session of '{}' unchecked.", title);
                }
                Ok((Completion::NotScheduled, title)) => {
                    println!(
                        "'{}' is not scheduled on {} at {}h.",
                        title,
                        slot.day_name(),
                        slot.hour
                    );
                }
                Ok((Completion::UnknownTask, _)) => unreachable!("task resolved before toggle"),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Some(Commands::Step {
            task,
            subtask,
            day,
            hour,
        }) => {
            let slot = parse_slot_or_exit(&day, hour);
            let parameters = CheckSubtaskParameters {
                task,
                subtask,
                slot,
            };
            match check_subtask(&mut store, &storage, parameters) {
                Ok((SubtaskToggle::Checked, title)) => {
                    println!("{} Subtask '{}' checked.", "✓".green(), title);
                }
                Ok((SubtaskToggle::Unchecked, title)) => {
                    println!("Subtask '{}' unchecked.", title);
                }
                Ok((SubtaskToggle::NotScheduled, _)) => {
                    println!(
                        "The task is not scheduled on {} at {}h.",
                        slot.day_name(),
                        slot.hour
                    );
                }
                Ok((SubtaskToggle::UnknownSubtask | SubtaskToggle::UnknownTask, _)) => {
                    unreachable!("task and subtask resolved before toggle")
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Some(Commands::Grid) => ui::render_grid(&store),

        Some(Commands::Agenda { day }) => {
            let day_index = match day {
                Some(input) => {
                    let Some(index) = parse_day(&input) else {
                        eprintln!(
                            "Error: Unknown day '{}'. Use 0-6 or a day name (Monday = 0).",
                            input
                        );
                        std::process::exit(1);
                    };
                    index
                }
                None => today_index(),
            };
            ui::render_agenda_day(&store, day_index);
        }

        Some(Commands::Stats) => ui::render_stats(&store),

        Some(Commands::Reset) => match start_new_week(&mut store, &storage) {
            Ok(summary) => {
                println!("{} New week started.", "✓".green());
                println!(
                    "  {} recurring task(s) reset, {} one-off task(s) retired.",
                    summary.recurring_reset, summary.retired
                );
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },

        Some(Commands::Wipe { force }) => {
            if !force {
                eprintln!("This erases ALL data (objectives, tasks, planning, notes).");
                eprintln!("Run again with --force to confirm.");
                std::process::exit(1);
            }
            match wipe_all(&mut store, &storage) {
                Ok(()) => println!("All data erased."),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        None => {
            ui::render_grid(&store);
            ui::render_stats(&store);
        }
    }
}

fn run_objective(command: ObjectiveCommands, store: &mut Store, storage: &impl Storage) {
    match command {
        ObjectiveCommands::New {
            title,
            month,
            description,
        } => {
            let parameters = CreateObjectiveParameters {
                title,
                monthly: month,
                description,
            };
            match create_objective(store, storage, parameters) {
                Ok(objective) => println!(
                    "{} Objective '{}' created (slug: {}).",
                    "✓".green(),
                    objective.title,
                    objective.slug.cyan()
                ),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ObjectiveCommands::Delete { slug } => {
            match delete_objective(store, storage, DeleteObjectiveParameters { slug }) {
                Ok(objective) => println!(
                    "{} Objective '{}' deleted, along with its tasks.",
                    "✓".green(),
                    objective.title
                ),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ObjectiveCommands::List => {
            ui::render_view_header("Objectives", store.objectives.len(), "objective");
            for objective in &store.objectives {
                let task_count = store
                    .tasks
                    .iter()
                    .filter(|t| t.objective_id == objective.id)
                    .count();
                println!(
                    "  {}  {}  {}",
                    objective.slug.cyan(),
                    objective.title.bold(),
                    format!("({}, {} tasks)", objective.kind.label(), task_count).dimmed()
                );
            }
            println!();
        }
    }
}

fn run_constraint(command: ConstraintCommands, store: &mut Store, storage: &impl Storage) {
    match command {
        ConstraintCommands::Block { day, hour } => {
            let slot = parse_slot_or_exit(&day, hour);
            match block_slot(store, storage, slot) {
                Ok(()) => println!(
                    "{} Blocked {} at {}h.",
                    "✓".green(),
                    slot.day_name(),
                    slot.hour
                ),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ConstraintCommands::Open { day, hour } => {
            let slot = parse_slot_or_exit(&day, hour);
            match open_slot(store, storage, slot) {
                Ok(true) => println!(
                    "{} Opened {} at {}h.",
                    "✓".green(),
                    slot.day_name(),
                    slot.hour
                ),
                Ok(false) => println!("{} at {}h was already open.", slot.day_name(), slot.hour),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ConstraintCommands::List => {
            let mut blocked: Vec<_> = store
                .schedule
                .iter()
                .filter(|s| s.is_blocked)
                .map(|s| s.slot())
                .collect();
            blocked.sort();

            ui::render_view_header("Blocked slots", blocked.len(), "slot");
            for slot in blocked {
                println!("  {} at {}h", DAY_NAMES[slot.day as usize], slot.hour);
            }
            println!();
        }
    }
}

fn run_task(command: TaskCommands, store: &mut Store, storage: &impl Storage) {
    match command {
        TaskCommands::Add {
            title,
            objective,
            category,
            duration,
            repeat,
            once,
        } => {
            let parameters = AddTaskParameters {
                title,
                objective,
                category,
                duration_minutes: duration,
                repeat_count: repeat,
                one_off: once,
            };
            match add_task(store, storage, parameters) {
                Ok(task) => println!(
                    "{} Task '{}' added ({} session(s)/week, {} min each).",
                    "✓".green(),
                    task.title,
                    task.repeat_count,
                    task.duration_minutes
                ),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        TaskCommands::Edit {
            task,
            title,
            category,
            duration,
            repeat,
            once,
            weekly,
        } => {
            let recurring = if once {
                Some(false)
            } else if weekly {
                Some(true)
            } else {
                None
            };
            let parameters = EditTaskParameters {
                task,
                title,
                category,
                duration_minutes: duration,
                repeat_count: repeat,
                recurring,
            };
            match edit_task(store, storage, parameters) {
                Ok((task, dropped)) => {
                    println!("{} Task '{}' updated.", "✓".green(), task.title);
                    if dropped > 0 {
                        println!(
                            "  {}",
                            format!("{} session(s) unplanned to fit the new repeat count.", dropped)
                                .dimmed()
                        );
                    }
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        TaskCommands::Delete { title } => {
            match delete_task(store, storage, DeleteTaskParameters { fuzzy_name: title }) {
                Ok(task) => println!("{} Task '{}' deleted.", "✓".green(), task.title),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        TaskCommands::List => {
            ui::render_view_header("Tasks", store.tasks.len(), "task");
            for task in &store.tasks {
                ui::render_task_line(task, store);
            }
            println!();
        }
        TaskCommands::Step { task, title } => {
            match add_subtask(store, storage, AddSubtaskParameters { task, title }) {
                Ok(subtask) => println!("{} Subtask '{}' added.", "✓".green(), subtask.title),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn run_note(command: NoteCommands, store: &mut Store, storage: &impl Storage) {
    match command {
        NoteCommands::Add {
            title,
            content,
            category,
            tag,
        } => {
            let parameters = AddNoteParameters {
                title,
                content: content.unwrap_or_default(),
                category,
                tags: tag,
            };
            match add_note(store, storage, parameters) {
                Ok(note) => println!("{} Note '{}' added.", "✓".green(), note.title),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        NoteCommands::List => {
            ui::render_view_header("Notes", store.notes.len(), "note");
            for note in &store.notes {
                let category = note
                    .category_id
                    .and_then(|id| store.get_note_category(id))
                    .map(|c| c.name.clone());
                let mut context = Vec::new();
                if let Some(category) = category {
                    context.push(category);
                }
                for task_id in &note.linked_task_ids {
                    if let Some(task) = store.get_task(*task_id) {
                        context.push(format!("→ {}", task.title));
                    }
                }
                if !note.tags.is_empty() {
                    context.push(format!("#{}", note.tags.join(" #")));
                }
                println!(
                    "  {}  {}",
                    note.title.bold(),
                    context.join(" · ").dimmed()
                );
            }
            println!();
        }
        NoteCommands::Delete { title } => match delete_note(store, storage, &title) {
            Ok(note) => println!("{} Note '{}' deleted.", "✓".green(), note.title),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        NoteCommands::Link { note, task } => {
            match link_note(store, storage, LinkNoteParameters { note, task }) {
                Ok((note, task_title)) => println!(
                    "{} Note '{}' linked to '{}'.",
                    "✓".green(),
                    note.title,
                    task_title
                ),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        NoteCommands::Category(command) => match command {
            NoteCategoryCommands::New { name } => {
                match create_note_category(store, storage, name) {
                    Ok(category) => {
                        println!("{} Note category '{}' created.", "✓".green(), category.name)
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            NoteCategoryCommands::List => {
                // "category" does not pluralize with a plain "s"
                println!(
                    "\n  {} ({})\n",
                    "Note categories".cyan().bold(),
                    store.note_categories.len()
                );
                for category in &store.note_categories {
                    let note_count = store
                        .notes
                        .iter()
                        .filter(|n| n.category_id == Some(category.id))
                        .count();
                    println!(
                        "  {}  {}",
                        category.name.bold(),
                        format!("({} notes)", note_count).dimmed()
                    );
                }
                println!();
            }
        },
    }
}
