//! Water Quest entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element};

    use water_quest::audio::AudioManager;
    use water_quest::sim::{
        Difficulty, EndSummary, GameLoop, Grid, RoundState, TickInput, format_delta,
        tick,
    };
    use water_quest::consts::{
        CONFETTI_COLORS, CONFETTI_MS, CONFETTI_PIECES, FLOATING_SCORE_MS, MILESTONE_BANNER_MS,
    };
    use water_quest::{GameError, GameSink, Result, Settings, SoundEffect, dispatch};

    /// Longest frame we simulate in one go (tab switches, debugger pauses)
    const MAX_FRAME_MS: f64 = 250.0;

    /// DOM + Web Audio implementation of the presentation hooks
    struct DomSink {
        document: Document,
        audio: AudioManager,
        reduced_motion: bool,
    }

    impl DomSink {
        fn element(&self, id: &str) -> Result<Element> {
            self.document
                .get_element_by_id(id)
                .ok_or_else(|| GameError::Sink(format!("missing #{id}")))
        }

        fn set_text(&self, id: &str, text: &str) -> Result<()> {
            self.element(id)?.set_text_content(Some(text));
            Ok(())
        }

        fn grid_cells(&self) -> Vec<Element> {
            let Ok(list) = self.document.query_selector_all(".grid-cell") else {
                return Vec::new();
            };
            (0..list.length())
                .filter_map(|i| list.item(i))
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .collect()
        }

        fn div(&self, class: &str, style: &str) -> Result<Element> {
            let el = self
                .document
                .create_element("div")
                .map_err(|_| GameError::Sink("create_element failed".into()))?;
            el.set_class_name(class);
            if !style.is_empty() {
                let _ = el.set_attribute("style", style);
            }
            Ok(el)
        }

        /// Overlay element removed again after `ms`
        fn transient(&self, class: &str, text: &str, style: &str, ms: i32) -> Result<()> {
            let el = self.div(class, style)?;
            el.set_text_content(Some(text));
            self.show_for(el, ms)
        }

        /// One burst of falling pieces with random position, color and speed
        fn confetti(&self) -> Result<()> {
            let container = self.div("confetti-container", "")?;
            for _ in 0..CONFETTI_PIECES {
                let pick = (js_sys::Math::random() * CONFETTI_COLORS.len() as f64) as usize;
                let color = CONFETTI_COLORS[pick.min(CONFETTI_COLORS.len() - 1)];
                let style = format!(
                    "left:{:.1}%;background-color:{};animation:confettiFall {:.2}s linear forwards",
                    js_sys::Math::random() * 100.0,
                    color,
                    1.0 + js_sys::Math::random() * 2.0
                );
                let piece = self.div("confetti", &style)?;
                let _ = container.append_child(&piece);
            }
            self.show_for(container, CONFETTI_MS)
        }

        fn show_for(&self, el: Element, ms: i32) -> Result<()> {
            let body = self
                .document
                .body()
                .ok_or_else(|| GameError::Sink("no body".into()))?;
            let _ = body.append_child(&el);

            let closure = Closure::once(move || el.remove());
            let _ = web_sys::window()
                .ok_or_else(|| GameError::Sink("no window".into()))?
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    closure.as_ref().unchecked_ref(),
                    ms,
                );
            closure.forget();
            Ok(())
        }
    }

    impl GameSink for DomSink {
        fn render(&mut self, state: &RoundState, grid: &Grid) -> Result<()> {
            self.set_text("score", &state.score.to_string())?;
            self.set_text("people-served", &state.people_served().to_string())?;
            self.set_text("combo", &state.combo.to_string())?;
            self.set_text("timer", &state.time_remaining_secs.to_string())?;

            for (slot, cell) in self.grid_cells().iter().enumerate() {
                let wanted = grid.item_at(slot).map(|item| item.id.0.to_string());
                let current = cell
                    .first_element_child()
                    .and_then(|child| child.get_attribute("data-item-id"));
                if wanted == current {
                    continue;
                }
                match grid.item_at(slot) {
                    Some(item) => cell.set_inner_html(&format!(
                        r#"<div class="game-element {}" data-item-id="{}"><div class="water-gallon"><div class="water-wave"></div><div class="gallon-handle"></div><div class="gallon-cap"></div></div></div>"#,
                        item.kind.as_str(),
                        item.id.0
                    )),
                    None => cell.set_inner_html(""),
                }
            }
            Ok(())
        }

        fn play_sound(&mut self, effect: SoundEffect) -> Result<()> {
            self.audio.play(effect)
        }

        fn show_floating_score(&mut self, slot: usize, delta: i32) -> Result<()> {
            if self.reduced_motion {
                return Ok(());
            }
            let cells = self.grid_cells();
            let cell = cells
                .get(slot)
                .ok_or_else(|| GameError::Sink(format!("no grid cell {slot}")))?;
            let rect = cell.get_bounding_client_rect();
            let color = if delta > 0 { "#4FCB53" } else { "#F5402C" };
            let style = format!(
                "left:{}px;top:{}px;color:{}",
                rect.left() + rect.width() / 2.0,
                rect.top() + rect.height() / 2.0,
                color
            );
            self.transient("points-popup", &format_delta(delta), &style, FLOATING_SCORE_MS)
        }

        fn show_milestone_banner(&mut self, message: &str) -> Result<()> {
            self.transient("milestone-message", message, "", MILESTONE_BANNER_MS)
        }

        fn show_end_summary(&mut self, summary: &EndSummary) -> Result<()> {
            self.set_text("final-score", &summary.score.to_string())?;
            self.set_text("final-people-served", &summary.people_served.to_string())?;

            if let Some(stats) = self.document.query_selector(".final-stats").ok().flatten() {
                let rows = [
                    ("Final Score:", summary.score.to_string()),
                    ("People Served:", summary.people_served.to_string()),
                    ("Max Combo:", format!("×{}", summary.max_combo)),
                    ("Accuracy:", format!("{}%", summary.accuracy)),
                    ("Clean Water Collected:", summary.clean.to_string()),
                    ("Storms Hit:", summary.storms.to_string()),
                ];
                let body: String = rows
                    .iter()
                    .map(|(label, value)| {
                        format!(
                            r#"<div class="stat-item"><span class="stat-label">{label}</span><span class="stat-value">{value}</span></div>"#
                        )
                    })
                    .collect();
                stats.set_inner_html(&format!(r#"<div class="game-stats show">{body}</div>"#));
            }

            if !self.reduced_motion {
                for _ in 0..summary.celebration().bursts() {
                    self.confetti()?;
                }
            }

            show_screen(&self.document, "end");
            Ok(())
        }
    }

    /// Game instance holding all state
    struct Game {
        game: GameLoop,
        input: TickInput,
        sink: DomSink,
        difficulty: Difficulty,
        last_time: f64,
        /// Sub-millisecond remainder carried between frames
        accumulator: f64,
    }

    impl Game {
        /// Run one frame: input, timers, then presentation
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time).clamp(0.0, MAX_FRAME_MS)
            } else {
                0.0
            };
            self.last_time = time;

            self.accumulator += dt;
            let whole_ms = self.accumulator.floor();
            self.accumulator -= whole_ms;

            if let Err(e) = tick(&mut self.game, &self.input, whole_ms as u64) {
                log::error!("Tick failed: {}", e);
            }
            self.input.clear();

            let events = self.game.take_events();
            dispatch(&events, self.game.state(), self.game.grid(), &mut self.sink);
        }

        fn start(&mut self) {
            self.sink.audio.resume();
            self.input.start = Some(self.difficulty);
            show_screen(&self.sink.document, "game");
        }
    }

    fn show_screen(document: &Document, name: &str) {
        for screen in ["start", "game", "end"] {
            if let Some(el) = document.get_element_by_id(&format!("{screen}-screen")) {
                let classes = el.class_list();
                let _ = if screen == name {
                    classes.add_1("active")
                } else {
                    classes.remove_1("active")
                };
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Water Quest starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let settings = Settings::default();
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game {
            game: GameLoop::with_settings(seed, &settings),
            input: TickInput::default(),
            sink: DomSink {
                document: document.clone(),
                audio: AudioManager::new(&settings),
                reduced_motion: settings.reduced_motion,
            },
            difficulty: Difficulty::default(),
            last_time: 0.0,
            accumulator: 0.0,
        }));

        log::info!("Game initialized with seed: {}", seed);

        setup_difficulty_buttons(&document, game.clone());
        setup_buttons(&document, game.clone());
        setup_grid(&document, game.clone());

        request_animation_frame(game);

        log::info!("Water Quest running!");
    }

    fn on_click(el: &Element, handler: impl FnMut(web_sys::MouseEvent) + 'static) {
        let closure = Closure::<dyn FnMut(_)>::new(handler);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_difficulty_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        let Ok(buttons) = document.query_selector_all(".difficulty-btn") else {
            return;
        };
        for i in 0..buttons.length() {
            let Some(btn) = buttons.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let game = game.clone();
            let this = btn.clone();
            on_click(&btn, move |_| {
                let Some(name) = this.get_attribute("data-difficulty") else {
                    return;
                };
                let difficulty = match name.parse::<Difficulty>() {
                    Ok(d) => d,
                    Err(e) => {
                        log::warn!("{}", e);
                        return;
                    }
                };
                let mut g = game.borrow_mut();
                g.difficulty = difficulty;

                let document = &g.sink.document;
                if let Ok(all) = document.query_selector_all(".difficulty-btn") {
                    for j in 0..all.length() {
                        if let Some(el) = all.item(j).and_then(|n| n.dyn_into::<Element>().ok()) {
                            let _ = el.class_list().remove_1("selected");
                        }
                    }
                }
                let _ = this.class_list().add_1("selected");

                if let Some(info) = document.query_selector(".difficulty-info").ok().flatten() {
                    let lines: String = difficulty
                        .config()
                        .describe()
                        .iter()
                        .map(|line| format!("<p>{line}</p>"))
                        .collect();
                    info.set_inner_html(&lines);
                }
                log::info!("Difficulty: {}", difficulty);
            });
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        for id in ["start-button", "play-again"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                on_click(&btn, move |_| game.borrow_mut().start());
            }
        }

        if let Some(btn) = document.get_element_by_id("reset-button") {
            on_click(&btn, move |_| {
                let mut g = game.borrow_mut();
                g.input.reset = true;
                show_screen(&g.sink.document, "start");
            });
        }
    }

    fn setup_grid(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(grid) = document.query_selector(".game-grid").ok().flatten() else {
            log::warn!("No .game-grid element; clicks disabled");
            return;
        };
        on_click(&grid, move |event| {
            let Some(target) = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
            else {
                return;
            };
            let Some(item) = target.closest("[data-item-id]").ok().flatten() else {
                return;
            };
            let id = item
                .get_attribute("data-item-id")
                .and_then(|raw| raw.parse::<u64>().ok());
            if let Some(id) = id {
                game.borrow_mut()
                    .input
                    .claims
                    .push(water_quest::sim::ItemId(id));
            }
        });
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            log::error!("no window; stopping frame loop");
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().update(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{SystemTime, UNIX_EPOCH};

    use water_quest::sim::{Difficulty, EndSummary, GameEvent, GameLoop, OutcomeKind, TickInput, tick};
    use water_quest::{GameError, LogSink, Result, Settings, dispatch};

    /// Simulated frame length
    const FRAME_MS: u64 = 50;
    /// How long the autoplayer takes to react to a new item
    const REACTION_MS: u64 = 350;

    fn load_settings() -> Result<Settings> {
        match std::env::var("WATER_QUEST_SETTINGS") {
            Ok(path) => {
                let json = std::fs::read_to_string(&path)
                    .map_err(|e| GameError::InvalidConfig(format!("{path}: {e}")))?;
                let settings = Settings::from_json(&json)?;
                log::info!("Loaded settings from {}", path);
                Ok(settings)
            }
            Err(_) => Ok(Settings::default()),
        }
    }

    /// Headless autoplay round: grabs clean water, fumbles the odd hazard
    pub fn run() -> Result<EndSummary> {
        let mut args = std::env::args().skip(1);
        let difficulty = match args.next() {
            Some(name) => name.parse::<Difficulty>()?,
            None => Difficulty::default(),
        };
        let seed = args
            .next()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or_else(|| {
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or_default()
            });
        let settings = load_settings()?;

        log::info!("Autoplaying {} round with seed {}", difficulty, seed);
        for line in difficulty.config().describe() {
            log::info!("  {}", line);
        }

        let mut game = GameLoop::with_settings(seed, &settings);
        let mut sink = LogSink::new();
        let mut input = TickInput {
            start: Some(difficulty),
            ..Default::default()
        };

        loop {
            tick(&mut game, &input, FRAME_MS)?;
            input.clear();

            let events = game.take_events();
            dispatch(&events, game.state(), game.grid(), &mut sink);
            for event in events {
                if let GameEvent::RoundEnded { summary } = event {
                    return Ok(summary);
                }
            }

            let now = game.now_ms();
            input.claims = game
                .grid()
                .items()
                .filter(|item| now >= item.created_at_ms + REACTION_MS)
                .filter(|item| item.kind == OutcomeKind::Clean || item.id.0 % 7 == 0)
                .map(|item| item.id)
                .collect();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Water Quest (native) starting...");
    log::info!("Native mode runs a headless autoplay round - run with `trunk serve` for the web version");

    match native::run() {
        Ok(summary) => {
            println!("{}", summary.share_text());
            match serde_json::to_string_pretty(&summary) {
                Ok(json) => println!("{json}"),
                Err(e) => log::warn!("Could not serialize summary: {}", e),
            }
        }
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
