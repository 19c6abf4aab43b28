//! Terminal merge-fall runner (default binary).
//!
//! Uses crossterm for keyboard and mouse input and the framebuffer renderer
//! from `merge_fall::term`. Logging goes through `env_logger` and stays off
//! unless `RUST_LOG` is set.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use log::info;

use merge_fall::core::{Game, GameSnapshot};
use merge_fall::frontend::TermFrontend;
use merge_fall::input::{handle_key_event, should_quit, SwipeTracker};
use merge_fall::settings::{parse_args, Settings, USAGE};
use merge_fall::term::{FrameBuffer, GameView, TerminalRenderer, ViewEffects, Viewport};

/// Input poll interval, roughly one frame at 60 FPS
const FRAME_MS: u64 = 16;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args)?;
    if cli.help {
        println!("{}", USAGE);
        return Ok(());
    }
    let settings = Settings::from_env(&cli)?;
    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }
    info!("settings: {:?}", settings);

    let game = Game::new(settings.game.clone())?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, game, &settings);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer, mut game: Game, settings: &Settings) -> Result<()> {
    let mut frontend = TermFrontend::new();
    let mut swipe = SwipeTracker::new(settings.swipe_cells);

    let mut fb = FrameBuffer::new(0, 0);
    let mut snap = GameSnapshot::default();
    let mut effects = ViewEffects::default();

    let started = Instant::now();
    let mut last_ms: u64 = 0;

    loop {
        // Advance simulation and animations by whole elapsed milliseconds.
        let now_ms = started.elapsed().as_millis() as u64;
        let elapsed = (now_ms - last_ms).min(u32::MAX as u64) as u32;
        last_ms = now_ms;

        game.update(elapsed);
        frontend.advance(elapsed, &mut game);
        frontend.sync(&mut game);

        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        let view = GameView::fitting(game.width(), game.height(), viewport);
        game.snapshot_into(&mut snap);
        frontend.effects_into(&mut effects);
        view.render_into(&snap, &effects, viewport, &mut fb);
        term.draw_swap(&mut fb)?;

        if !event::poll(Duration::from_millis(FRAME_MS))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if should_quit(key) {
                    info!("quit at score {}", game.score());
                    return Ok(());
                }
                if let Some(action) = handle_key_event(key) {
                    game.apply_action(action);
                }
            }
            Event::Mouse(mouse) => {
                if let Some(action) = swipe.handle_mouse_event(mouse) {
                    game.apply_action(action);
                }
            }
            Event::Resize(..) => term.invalidate(),
            _ => {}
        }
    }
}
