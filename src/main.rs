/// Entry point and game loop.

mod config;
mod domain;
mod fx;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};

use config::GameConfig;
use domain::entity::{Direction, FrameInput};
use sim::game::Game;
use sim::pacer::TickPacer;
use sim::save::{self, FileScoreStore, ScoreStore};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sprite::Avatar;

fn main() {
    let (config, config_err) = GameConfig::load();

    let log_path = save::save_dir().join(&config.general.log_file);
    if let Err(e) = logging::init(&log_path) {
        eprintln!("Logging disabled: {e}");
    }
    if let Some(e) = config_err {
        warn!(error = %e, "config.toml ignored, using defaults");
    }
    info!(tick_ms = config.speed.tick_rate_ms, "starting");

    let store = FileScoreStore::in_save_dir(&config.general.score_file);
    info!(path = %store.path().display(), "high score file");
    let mut game = Game::new(&config, store, StdRng::from_entropy());

    let avatar_path = GameConfig::find_data_file(&config.general.avatar);
    let mut renderer = Renderer::new(Avatar::load(avatar_path.as_deref()));

    if let Err(e) = renderer.init() {
        error!(error = %e, "terminal init failed");
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut game, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!(error = %e, "game loop aborted");
        eprintln!("Game error: {e}");
    }

    let scores = game.scores();
    info!(score = scores.current(), high = scores.high(), "exiting");
    println!();
    println!("Thanks for playing Maze Chase!");
    println!("Final Score: {}  (High: {})", scores.current(), scores.high());
}

fn game_loop<S: ScoreStore>(
    game: &mut Game<S, StdRng>,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);
    let mut pacer = TickPacer::new(tick_rate, Instant::now());

    // Input between ticks accumulates here; the latest direction wins.
    let mut pending_move: Option<Direction> = None;
    let mut pending_restart = false;

    loop {
        kb.drain_events();
        gp.update();

        if kb.quit_pressed() || gp.quit_pressed() {
            break;
        }

        if kb.perf_toggle_pressed() {
            let enabled = !game.particles().performance_mode();
            game.set_performance_mode(enabled);
        }

        if let Some(dir) = gp.direction().or(kb.direction()) {
            pending_move = Some(dir);
        }
        if kb.restart_pressed() || gp.restart_pressed() {
            pending_restart = true;
        }

        let now = Instant::now();
        if pacer.poll(now) {
            let input = FrameInput {
                movement: pending_move.take(),
                restart: std::mem::take(&mut pending_restart),
            };
            game.tick(input, now);
        }

        renderer.render(&game.frame())?;
        std::thread::sleep(pacer.idle_time(Instant::now()));
    }

    Ok(())
}
