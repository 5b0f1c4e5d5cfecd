//! Shuffle Recall entry point
//!
//! Handles platform-specific initialization and wires input to the session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::{Rc, Weak};
    use std::time::Duration;

    use glam::UVec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement, MouseEvent};

    use shuffle_recall::platform::{MessageSink, Timer, TokenHandle, TokenSurface, Viewport};
    use shuffle_recall::sim::{GameSession, TickTicket, TokenId};
    use shuffle_recall::{Settings, parse_token_count, token_count_prompt};

    type Game = GameSession<WebPlatform>;

    /// Footprint assumed until a button has been rendered
    const DEFAULT_FOOTPRINT: u32 = 60;

    /// A `<button>` in `#buttonContainer`
    struct WebToken {
        button: HtmlButtonElement,
        label: String,
        hidden_label: String,
        // Dropped with the token so the listener dies with the button
        _on_click: Closure<dyn FnMut(MouseEvent)>,
    }

    impl TokenHandle for WebToken {
        fn set_position(&mut self, pos: UVec2) {
            let style = self.button.style();
            let _ = style.set_property("position", "absolute");
            let _ = style.set_property("left", &format!("{}px", pos.x));
            let _ = style.set_property("top", &format!("{}px", pos.y));
        }

        fn hide_label(&mut self) {
            self.button.set_text_content(Some(&self.hidden_label));
        }

        fn show_label(&mut self) {
            self.button.set_text_content(Some(&self.label));
        }

        fn destroy(self) {
            self.button.remove();
        }
    }

    /// DOM surface, `#message` sink and `setTimeout` timer
    struct WebPlatform {
        game: Weak<RefCell<Game>>,
        document: Document,
        container: Element,
        message: Element,
        hidden_label: String,
        timeouts: HashMap<TickTicket, i32>,
    }

    impl TokenSurface for WebPlatform {
        type Handle = WebToken;

        fn create_token(&mut self, id: TokenId, label: &str, color: &str) -> WebToken {
            let button: HtmlButtonElement = self
                .document
                .create_element("button")
                .expect("Failed to create button")
                .dyn_into()
                .expect("not a button");
            button.set_text_content(Some(label));
            let _ = button.style().set_property("background-color", color);

            let game = self.game.clone();
            let on_click = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                if let Some(game) = game.upgrade() {
                    game.borrow_mut().select(id);
                }
            });
            let _ = button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
            let _ = self.container.append_child(&button);

            WebToken {
                button,
                label: label.to_string(),
                hidden_label: self.hidden_label.clone(),
                _on_click: on_click,
            }
        }

        fn footprint(&self) -> u32 {
            self.container
                .first_element_child()
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                .map(|el| el.offset_width().max(0) as u32)
                .filter(|w| *w > 0)
                .unwrap_or(DEFAULT_FOOTPRINT)
        }

        fn viewport(&self) -> Viewport {
            let Some(window) = web_sys::window() else {
                return Viewport::new(0, 0);
            };
            let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as u32;
            Viewport::new(dim(window.inner_width()), dim(window.inner_height()))
        }
    }

    impl MessageSink for WebPlatform {
        fn notify(&mut self, text: &str) {
            self.message.set_text_content(Some(text));
        }

        fn clear_notification(&mut self) {
            self.message.set_text_content(Some(""));
        }
    }

    impl Timer for WebPlatform {
        fn schedule(&mut self, delay: Duration, ticket: TickTicket) {
            let game = self.game.clone();
            let callback = Closure::once_into_js(move || {
                if let Some(game) = game.upgrade() {
                    let mut g = game.borrow_mut();
                    g.platform_mut().timeouts.remove(&ticket);
                    // Failures are already logged and shown by the session
                    let _ = g.on_tick(ticket);
                }
            });

            let Some(window) = web_sys::window() else {
                return;
            };
            match window.set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                delay.as_millis().min(i32::MAX as u128) as i32,
            ) {
                Ok(handle) => {
                    self.timeouts.insert(ticket, handle);
                }
                Err(e) => log::error!("setTimeout failed: {:?}", e),
            }
        }

        fn cancel(&mut self, ticket: TickTicket) {
            if let Some(handle) = self.timeouts.remove(&ticket) {
                if let Some(window) = web_sys::window() {
                    window.clear_timeout_with_handle(handle);
                }
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Shuffle Recall starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");
        let container = document
            .get_element_by_id("buttonContainer")
            .expect("no #buttonContainer");
        let message = document.get_element_by_id("message").expect("no #message");

        let settings = Settings::load();
        // Write back so the stored copy lists every field, defaults included
        settings.save();
        let hidden_label = settings.hidden_label.clone();
        let seed = js_sys::Date::now() as u64;

        let game: Rc<RefCell<Game>> = Rc::new_cyclic(|weak| {
            let platform = WebPlatform {
                game: weak.clone(),
                document: document.clone(),
                container,
                message,
                hidden_label,
                timeouts: HashMap::new(),
            };
            RefCell::new(GameSession::new(platform, settings, seed))
        });

        log::info!("Game initialized with seed: {}", seed);

        setup_go_button(&document, game);

        log::info!("Shuffle Recall running!");
    }

    fn setup_go_button(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(btn) = document.get_element_by_id("goButton") else {
            log::error!("no #goButton, nothing to start runs with");
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let input = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id("numButtons"))
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|el| el.value())
                .unwrap_or_default();

            let mut g = game.borrow_mut();
            let (min, max) = (g.settings().min_tokens, g.settings().max_tokens);
            let parsed = parse_token_count(&input, g.settings());
            match parsed {
                Ok(count) => {
                    if let Err(e) = g.start_run(count) {
                        log::error!("Could not start run: {}", e);
                    }
                }
                Err(e) => {
                    drop(g);
                    log::info!("Rejected token count: {}", e);
                    if let Some(window) = web_sys::window() {
                        let _ = window.alert_with_message(&token_count_prompt(min, max));
                    }
                }
            }
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::io::{self, BufRead, Write};
    use std::time::{SystemTime, UNIX_EPOCH};

    use shuffle_recall::platform::{HeadlessPlatform, Viewport};
    use shuffle_recall::sim::{
        GameSession, Identified, Positionable, TickOutcome, TokenId, Verdict,
    };
    use shuffle_recall::{ExhaustionPolicy, GameError, Settings, parse_token_count, token_count_prompt};

    /// Button size of the default stylesheet
    const FOOTPRINT: u32 = 60;
    const VIEWPORT: Viewport = Viewport::new(800, 600);

    pub fn run() -> Result<(), GameError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut settings = Settings::load();

        if let Some(policy) = args.get(2) {
            match ExhaustionPolicy::from_str(policy) {
                Some(policy) => settings.placement.exhaustion = policy,
                None => log::warn!("Unknown exhaustion policy '{}', keeping {}", policy, settings.placement.exhaustion.as_str()),
            }
        }

        let count = match parse_token_count(args.first().map(String::as_str).unwrap_or(""), &settings) {
            Ok(count) => count,
            Err(e) => {
                eprintln!("usage: shuffle-recall <count> [seed] [gridpack|fail]");
                eprintln!("{}", token_count_prompt(settings.min_tokens, settings.max_tokens));
                return Err(e);
            }
        };

        let seed = args
            .get(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| {
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or(0)
            });

        let platform = HeadlessPlatform::new(FOOTPRINT, VIEWPORT);
        let mut game = GameSession::new(platform, settings, seed);
        log::info!("Game initialized with seed: {}", seed);

        game.start_run(count)?;
        println!("Remember the order:");
        for token in game.tokens() {
            println!("  {} {}", token.label(), token.color());
        }

        while let Some(ticket) = game.platform_mut().clock_mut().fire_next() {
            let elapsed = game.platform().clock().now();
            match game.on_tick(ticket)? {
                TickOutcome::Relocated { round, .. } => {
                    println!("[{:>5.1}s] shuffle {}", elapsed.as_secs_f32(), round + 1);
                    for token in game.tokens() {
                        let pos = token.position();
                        println!("    {} {} at ({}, {})", token.label(), token.color(), pos.x, pos.y);
                    }
                }
                TickOutcome::Obscured => {
                    println!("[{:>5.1}s] labels hidden", elapsed.as_secs_f32());
                }
                TickOutcome::Stale => {}
            }
        }

        // Present the hidden tokens by reading position, top-left first
        let mut board: Vec<(TokenId, String, glam::UVec2)> = game
            .tokens()
            .iter()
            .map(|t| (t.id(), t.color().to_string(), t.position()))
            .collect();
        board.sort_by_key(|(_, _, pos)| (pos.y, pos.x));

        println!("Hidden tokens:");
        for (i, (_, color, pos)) in board.iter().enumerate() {
            println!("  {} {} at ({}, {})", (b'a' + i as u8) as char, color, pos.x, pos.y);
        }
        print!("Pick them in the original order (e.g. 'c a b'): ");
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;

        for pick in line.split_whitespace() {
            let index = pick
                .chars()
                .next()
                .filter(|_| pick.len() == 1)
                .and_then(|c| (c as u32).checked_sub('a' as u32))
                .map(|i| i as usize);
            let Some((id, _, _)) = index.and_then(|i| board.get(i)) else {
                println!("  no token '{}', skipped", pick);
                continue;
            };
            match game.select(*id) {
                Verdict::Accepted { id, .. } => println!("  {} revealed", id),
                Verdict::Success | Verdict::Failed { .. } | Verdict::Ignored => break,
            }
        }

        match game.platform().message() {
            Some(message) => println!("{}", message),
            None => println!("Incomplete: {:?}", game.judge_phase()),
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Shuffle Recall (native) starting...");

    if let Err(e) = native::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
