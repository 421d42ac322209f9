use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use creature_waves::collection::{
    available_creatures, catalog_entries, catalog_size, discovered_count, CatalogFilter, Lineage,
    Region,
};
use creature_waves::errors::ActionResult;
use creature_waves::{
    ActiveCombatant, EventBus, FileStorage, Game, GameConfig, HttpCatalog, Pacing, Phase,
    TurnRng,
};

#[derive(Parser, Debug)]
#[command(name = "creature-waves")]
#[command(about = "Battle endless waves of creatures from the public catalog")]
struct Args {
    /// RON configuration file
    #[arg(long, default_value = "creature-waves.ron")]
    config: PathBuf,

    /// Directory the session is saved in
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Resolve battles without pauses
    #[arg(long)]
    no_delay: bool,

    /// Seed the RNG for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Discard the saved session before starting
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing_core::Level::DEBUG
        } else {
            tracing_core::Level::WARN
        })
        .with_target(false)
        .init();

    let config = match GameConfig::load(&args.config) {
        Ok(config) => apply_overrides(config, &args),
        Err(err) => {
            error!("{}", err);
            return;
        }
    };

    let catalog = match HttpCatalog::new(config.catalog_url.clone(), config.request_timeout()) {
        Ok(catalog) => catalog,
        Err(err) => {
            error!("Failed to set up the catalog client: {}", err);
            return;
        }
    };
    let storage = FileStorage::new(config.resolved_save_dir());
    let rng = match config.seed {
        Some(seed) => TurnRng::from_seed(seed),
        None => TurnRng::new_random(),
    };
    info!("Saving to {}", config.resolved_save_dir().display());

    let mut game = Game::open(Arc::new(catalog), Arc::new(storage), rng, config).await;
    if args.reset {
        game.reset_run().await;
    }
    report(game.resume().await);

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut filter = CatalogFilter::All;
    loop {
        render(&game, filter);
        let Some(line) = prompt(&mut input).await else {
            break;
        };
        match line.as_str() {
            "q" | "quit" => break,
            "" => continue,
            choice => {
                if !dispatch(&mut game, choice, &mut filter).await {
                    println!("Unknown choice '{}'", choice);
                }
            }
        }
    }
}

fn apply_overrides(mut config: GameConfig, args: &Args) -> GameConfig {
    if let Some(dir) = &args.save_dir {
        config.save_dir = Some(dir.clone());
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.no_delay {
        config.pacing = Pacing::instant();
    }
    config
}

async fn prompt(input: &mut Lines<BufReader<Stdin>>) -> Option<String> {
    print!("> ");
    let _ = std::io::stdout().flush();
    match input.next_line().await {
        Ok(Some(line)) => Some(line.trim().to_lowercase()),
        Ok(None) => None,
        Err(err) => {
            error!("Failed to read input: {}", err);
            None
        }
    }
}

fn report<T: Reported>(result: ActionResult<T>) {
    match result {
        Ok(value) => value.print(),
        Err(err) => println!("! {}", err),
    }
}

trait Reported {
    fn print(&self);
}

impl Reported for () {
    fn print(&self) {}
}

impl Reported for EventBus {
    fn print(&self) {
        for line in self.formatted() {
            println!("  {}", line);
        }
    }
}

/// 1-based menu number to an index.
fn menu_index(choice: &str) -> Option<usize> {
    choice.parse::<usize>().ok()?.checked_sub(1)
}

fn describe(combatant: &ActiveCombatant) -> String {
    format!(
        "{} Lv{}  HP {}/{}",
        combatant.name(),
        combatant.level,
        combatant.current_hp,
        combatant.max_hp
    )
}

fn render(game: &Game, filter: CatalogFilter) {
    let state = game.state();
    println!();
    match state.phase {
        Phase::Home => {
            println!("=== Creature Waves ===");
            println!(
                "Wave {}  Items {}  Discovered {}/{}",
                state.wave,
                state.items,
                discovered_count(&state.captured, state.chosen_starter),
                catalog_size()
            );
            println!("1) Start  2) Start fresh  3) Catalog  q) Quit");
        }
        Phase::SelectActive => {
            println!("Choose your creature:");
            for (i, id) in available_creatures(&state.captured).iter().enumerate() {
                let region = Region::of(*id).map(|r| r.to_string()).unwrap_or_default();
                println!("{}) #{} {}", i + 1, id, region);
            }
            println!("b) Back");
        }
        Phase::SelectLineage => {
            println!("Choose a lineage:");
            for (i, lineage) in Lineage::all().iter().enumerate() {
                println!("{}) {}", i + 1, lineage);
            }
            println!("b) Back");
        }
        Phase::SelectStarter => {
            println!("Choose a {} starter:", state.lineage);
            for (i, id) in state.lineage.starters().iter().enumerate() {
                println!("{}) #{}", i + 1, id);
            }
            println!("b) Back");
        }
        Phase::Battle => {
            println!("--- Wave {} ---", state.wave);
            if let Some(opponent) = &state.opponent {
                println!("Foe: {}", describe(opponent));
            }
            if let Some(active) = &state.active {
                println!("You: {}", describe(active));
                let moves = if active.learned_moves.is_empty() {
                    vec!["tackle".to_string()]
                } else {
                    active.learned_moves.iter().map(|m| m.name.clone()).collect()
                };
                for (i, name) in moves.iter().enumerate() {
                    println!("{}) {}", i + 1, name);
                }
            }
            println!("s) Surrender");
        }
        Phase::Victory => {
            println!("Victory!");
            if let Some(active) = &state.active {
                println!(
                    "{}  EXP {}/{}",
                    describe(active),
                    active.experience,
                    active.experience_to_next
                );
            }
            if let Some(evolved) = &state.pending_evolution {
                println!("e) Evolve into {}  k) Keep current form", evolved.name);
            }
            println!("c) Next wave  h) Home");
        }
        Phase::Defeat => {
            println!("Defeated at wave {}. Items left: {}", state.wave, state.items);
            if let Some(defeated) = &state.last_defeated {
                println!("c) Capture {}", defeated.name());
            }
            println!("h) Home  r) Reset run");
        }
        Phase::Capture => {
            if let Some(defeated) = &state.last_defeated {
                println!("Capture {} (Lv{}) for one item?", defeated.name(), defeated.level);
            }
            println!("y) Capture  n) Skip");
        }
        Phase::CatalogBrowse => {
            let entries = catalog_entries(&state.captured, state.chosen_starter, filter);
            println!("Catalog ({:?}): {} entries", filter, entries.len());
            for entry in entries.iter().filter(|e| e.is_discovered()) {
                let mark = if entry.is_captured { "captured" } else { "starter" };
                println!("  #{} {} ({})", entry.id, entry.region, mark);
            }
            println!("a) All  d) Discovered  u) Undiscovered  <region>  b) Back");
        }
    }
}

/// Returns false when the input means nothing in the current phase.
async fn dispatch(game: &mut Game, choice: &str, filter: &mut CatalogFilter) -> bool {
    let index = menu_index(choice);
    match (game.state().phase, choice) {
        (Phase::Home, "1") => report(game.start_run().await),
        (Phase::Home, "2") => report(game.start_fresh_run().await),
        (Phase::Home, "3") => report(game.open_catalog().await),

        (Phase::SelectActive | Phase::SelectLineage | Phase::SelectStarter, "b") => {
            report(game.back().await)
        }
        (Phase::SelectActive, _) => {
            let available = available_creatures(&game.state().captured);
            match index.and_then(|i| available.get(i).copied()) {
                Some(id) => report(game.choose_active_creature(id).await),
                None => return false,
            }
        }
        (Phase::SelectLineage, _) => match index {
            Some(i) => report(game.choose_lineage(i).await),
            None => return false,
        },
        (Phase::SelectStarter, _) => {
            let starters = game.state().lineage.starters();
            match index.and_then(|i| starters.get(i).copied()) {
                Some(id) => report(game.choose_starting_creature(id).await),
                None => return false,
            }
        }

        (Phase::Battle, "s") => report(game.surrender().await),
        (Phase::Battle, _) => match index {
            Some(i) => report(game.choose_move(i).await),
            None => return false,
        },

        (Phase::Victory, "e") => report(game.confirm_evolution().await),
        (Phase::Victory, "k") => report(game.skip_evolution().await),
        (Phase::Victory, "c") => report(game.continue_wave().await),

        (Phase::Defeat, "c") => report(game.open_capture().await),
        (Phase::Defeat, "r") => game.reset_run().await,
        (Phase::Victory | Phase::Defeat, "h") => report(game.return_home().await),

        (Phase::Capture, "y") => report(game.attempt_capture().await),
        (Phase::Capture, "n") => report(game.skip_capture().await),

        (Phase::CatalogBrowse, "b") => report(game.close_catalog().await),
        (Phase::CatalogBrowse, "a") => *filter = CatalogFilter::All,
        (Phase::CatalogBrowse, "d") => *filter = CatalogFilter::Discovered,
        (Phase::CatalogBrowse, "u") => *filter = CatalogFilter::Undiscovered,
        (Phase::CatalogBrowse, region) => match region.parse::<Region>() {
            Ok(region) => *filter = CatalogFilter::Region(region),
            Err(_) => return false,
        },

        _ => return false,
    }
    true
}
