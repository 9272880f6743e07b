//! Worm Artillery headless runner
//!
//! Plays a CPU-vs-CPU match to completion, logging the match as it goes,
//! then prints the match record and optionally appends it to a stats file.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::error::Error;
    use std::path::PathBuf;

    use clap::Parser;
    use log::LevelFilter;

    use worm_artillery::advice;
    use worm_artillery::consts::*;
    use worm_artillery::sim::{GameEvent, MatchState, Outcome, Theme, TickInput, TurnPhase, tick};
    use worm_artillery::terrain_config::TerrainConfig;
    use worm_artillery::{MatchLog, MatchRecorder, Settings};

    #[derive(Parser, Debug)]
    #[command(author, version, about, long_about = None)]
    pub struct Args {
        /// Match seed; overrides the settings file
        #[arg(long)]
        seed: Option<u64>,

        /// Terrain theme key (greenHills, volcanicPeaks, frozenValleys, alienFloaters, desert, moonscape)
        #[arg(long)]
        theme: Option<String>,

        /// Terrain exchange JSON to play on instead of generated terrain
        #[arg(long)]
        terrain: Option<PathBuf>,

        /// Settings JSON file
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Write the starting terrain as exchange JSON
        #[arg(long)]
        export_terrain: Option<PathBuf>,

        /// Give up after this many ticks
        #[arg(long, default_value_t = 200_000)]
        max_ticks: u64,

        /// Match log JSON to append the result to
        #[arg(long)]
        stats: Option<PathBuf>,

        /// Log level (off, error, warn, info, debug, trace)
        #[arg(long, default_value = "info")]
        log_level: String,
    }

    fn level_filter(level: &str) -> LevelFilter {
        match level.to_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        }
    }

    fn describe(state: &MatchState, event: &GameEvent) {
        match event {
            GameEvent::InputOpened { team, .. } => {
                if let Some(analysis) = advice::analyze(&state.snapshot()) {
                    for s in &analysis.suggestions {
                        log::debug!("[{}] {s}", TEAM_NAMES[*team]);
                    }
                }
            }
            GameEvent::Fired { worm, weapon, .. } => {
                let name = state.worms.get(*worm as usize).map_or("?", |w| w.name.as_str());
                log::info!("{name} fires {}", weapon.spec().name);
            }
            GameEvent::WormDamaged { id, damage } => {
                if let Some(w) = state.worms.get(*id as usize) {
                    log::info!("{} takes {damage} ({} hp left)", w.name, w.hp);
                }
            }
            GameEvent::TurnTimedOut { team } => log::info!("{} timed out", TEAM_NAMES[*team]),
            _ => log::trace!("{event:?}"),
        }
    }

    pub fn run(args: Args) -> Result<(), Box<dyn Error>> {
        let mut settings = match &args.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(seed) = args.seed {
            settings.seed = seed;
        }
        if let Some(key) = &args.theme {
            settings.theme = Theme::from_key(key).ok_or_else(|| format!("unknown theme '{key}'"))?;
        }
        settings.autoplay = true;

        let mut state = MatchState::new(settings);
        if let Some(path) = &args.terrain {
            let config = TerrainConfig::from_json(&std::fs::read_to_string(path)?)?;
            state.load_terrain(&config)?;
        }
        state.start();

        if let Some(path) = &args.export_terrain {
            let json = TerrainConfig::from_field(&state.terrain, state.theme).to_json()?;
            std::fs::write(path, json)?;
            log::info!("Wrote terrain to {}", path.display());
        }

        let input = TickInput::default();
        for _ in 0..args.max_ticks {
            tick(&mut state, &input, SIM_DT);
            for event in state.drain_events() {
                describe(&state, &event);
            }
            if state.phase == TurnPhase::GameOver {
                break;
            }
        }

        match state.outcome {
            Some(Outcome::Winner(team)) => println!("{} wins after {} turns", TEAM_NAMES[team], state.turn),
            Some(Outcome::Draw) => println!("Draw after {} turns", state.turn),
            None => {
                log::warn!("No result after {} ticks", args.max_ticks);
                return Ok(());
            }
        }

        let Some(record) = state.take_match_record() else {
            return Ok(());
        };
        println!("{}", serde_json::to_string_pretty(&record)?);

        if let Some(path) = &args.stats {
            let mut history = MatchLog::load(path)?;
            history.record(&record);
            history.save(path)?;
            log::info!(
                "Stats: {} wins, {} losses, {:.0}% win rate, streak {}",
                history.wins(),
                history.losses(),
                history.win_rate() * 100.0,
                history.current_streak()
            );
        }
        Ok(())
    }

    pub fn main() {
        let args = Args::parse();
        env_logger::Builder::new()
            .filter_level(level_filter(&args.log_level))
            .parse_default_env()
            .init();
        log::info!("Worm Artillery (headless) starting...");

        if let Err(e) = run(args) {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::main();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host page; there is no standalone wasm entry point
}
