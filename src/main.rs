use hydratrack::{
    goal::CUP_PRESETS_ML, logging, tasks::autosave::autosave_task,
    tasks::reminder::reminder_task, FileStorage, Notice, SharedStore, Snapshot, StateStore,
    SystemClock, TrackerConfig, UndoOutcome,
};
use tokio::{
    select,
    sync::{mpsc, watch},
};
use tracing::{info, warn};

const HISTORY_ROWS: usize = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = TrackerConfig::load_default();
    let storage = FileStorage::open_default()?;
    let _log_guard = logging::init(&config.log_filter, Some(&storage.dir().join("logs")));

    info!(data_dir = %storage.dir().display(), "HydraTrack starting");

    let mut store = StateStore::new(storage, SystemClock, &config);
    let mut notices = store.notices();
    store.restore();
    let store = store.into_shared();

    let (stop, stopped) = watch::channel(false);
    let (reminder_tx, mut reminders) = mpsc::channel(4);

    let mut tasks = vec![tokio::spawn(autosave_task(
        store.clone(),
        config.autosave_interval(),
        stopped.clone(),
    ))];
    if config.reminders_enabled {
        tasks.push(tokio::spawn(reminder_task(
            store.clone(),
            config.reminder_interval(),
            reminder_tx.clone(),
            stopped.clone(),
        )));
    }

    print_status(&store.lock().await.snapshot());
    print_help();

    let mut input = spawn_input_reader();
    loop {
        select! {
            line = input.recv() => {
                let Some(line) = line else { break };
                if !handle_command(&store, line.trim()).await {
                    break;
                }
            },
            Ok(notice) = notices.recv() => show_notice(&notice),
            Some(reminder) = reminders.recv() => println!("💧 {}", reminder.message()),
            _ = tokio::signal::ctrl_c() => break,
        };
    }

    // Last save before the process goes away
    let _ = stop.send(true);
    for task in tasks {
        if let Err(e) = task.await {
            warn!(error = %e, "Background task ended abnormally");
        }
    }
    if let Err(e) = store.lock().await.save() {
        warn!(error = %e, "Unable to save before exit");
        eprintln!("⚠️ Unable to save before exit: {e}");
    }

    info!("HydraTrack stopped");
    Ok(())
}

/// Reads stdin on its own thread so a pending read never holds up shutdown.
fn spawn_input_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(8);

    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    rx
}

/// Returns false when the user asked to quit.
async fn handle_command(store: &SharedStore, line: &str) -> bool {
    let (command, arg) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(c, a)| (c, a.trim()));
    let mut store = store.lock().await;

    match command {
        "" => {}
        "drink" | "d" => {
            let drink = store.add_drink().value;
            println!(
                "+{}ml added! Total: {}ml",
                drink.event.amount_ml, drink.event.total_after_ml
            );
            print_status(&store.snapshot());
        }
        "undo" | "u" => match store.undo_last_drink().value {
            UndoOutcome::Undone(event) => {
                println!("Undid {}ml drink", event.amount_ml);
                print_status(&store.snapshot());
            }
            UndoOutcome::NothingToUndo => println!("No drinks to undo"),
        },
        "weight" | "w" => {
            let Ok(weight_kg) = arg.parse::<f64>() else {
                println!("Usage: weight <kg>");
                return true;
            };
            match store.set_weight(weight_kg) {
                Ok(applied) => {
                    let litres = f64::from(applied.value.goal_ml) / 1000.0;
                    println!("Goal set! Drink {litres:.1}L daily");
                    print_status(&store.snapshot());
                }
                Err(e) => println!("{e}"),
            }
        }
        "cup" | "c" => {
            let Ok(size_ml) = arg.parse::<u32>() else {
                println!("Usage: cup <ml>  (presets: {CUP_PRESETS_ML:?})");
                return true;
            };
            match store.set_cup_size(size_ml) {
                Ok(applied) => println!("Cup size set to {}ml", applied.value),
                Err(e) => println!("{e}"),
            }
        }
        "reset" => {
            let _ = store.reset_today();
            println!("Today's progress reset!");
            print_status(&store.snapshot());
        }
        "clear" => {
            if arg != "yes" {
                println!("This deletes your weight, history and preferences. Type `clear yes` to confirm.");
                return true;
            }
            let _ = store.clear_all();
            println!("All data cleared");
        }
        "status" | "s" => {
            print_status(&store.snapshot());
            #[allow(clippy::cast_precision_loss)]
            let kb = store.storage_usage_bytes() as f64 / 1024.0;
            println!("Storage used: {kb:.2} KB");
        }
        "history" | "h" => {
            let rows = store.recent_history(HISTORY_ROWS);
            if rows.is_empty() {
                println!("No drinking history yet. Start with `drink`!");
            }
            for row in &rows {
                println!(
                    "{}  +{}ml  {}ml  {:.0}%",
                    row.event.time, row.event.amount_ml, row.event.total_after_ml, row.percent
                );
            }
            println!("Total lifetime: {}ml", store.state().lifetime_total_ml);
        }
        "help" | "?" => print_help(),
        "quit" | "q" | "exit" => return false,
        other => println!("Unknown command `{other}`, try `help`"),
    }

    true
}

fn show_notice(notice: &Notice) {
    match notice {
        Notice::NewDay { date } => println!("🎉 Welcome to a new day ({date})! Stay hydrated!"),
        Notice::WelcomeBack => println!("👋 Welcome back! Your data was loaded."),
        Notice::GoalReached { goal_ml, .. } => {
            println!("🎉 CONGRATULATIONS! You reached your daily goal of {goal_ml}ml!");
        }
        Notice::SaveFailed { reason } => {
            println!("⚠️ Couldn't save ({reason}). Your change is kept for this session.");
        }
        Notice::LoadFailed { reason } => {
            println!("❌ Could not load saved data ({reason}), starting fresh");
        }
    }
}

fn print_status(snapshot: &Snapshot) {
    if snapshot.daily_goal_ml == 0 {
        println!(
            "{}ml today. Set your weight with `weight <kg>` to get a daily goal.",
            snapshot.current_intake_ml
        );
        return;
    }

    println!(
        "{}ml / {}ml ({:.0}%), {}ml to go. Cup: {}ml",
        snapshot.current_intake_ml,
        snapshot.daily_goal_ml,
        snapshot.percentage,
        snapshot.remaining_ml,
        snapshot.cup_size_ml
    );
}

fn print_help() {
    println!(
        "Commands: drink, undo, weight <kg>, cup <ml>, reset, clear, status, history, help, quit"
    );
}
