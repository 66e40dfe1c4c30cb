//! Browser host: keyboard in, ratzilla frame out, `localStorage` for saves.

pub mod app;
pub mod input;

#[cfg(target_arch = "wasm32")]
mod console;
#[cfg(target_arch = "wasm32")]
mod render;

#[cfg(target_arch = "wasm32")]
pub use wasm::run;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::{cell::RefCell, io, rc::Rc};

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use ratzilla::event::KeyCode;
    use ratzilla::ratatui::Terminal;
    use ratzilla::{DomBackend, WebRenderer};

    use crate::config::EngineConfig;
    use crate::economy::logic::RngRoll;
    use crate::economy::save::LocalStorage;

    use super::app::App;
    use super::input::command_for_key;
    use super::{console, render};

    /// Wall-clock milliseconds since the epoch.
    fn wall_now() -> f64 {
        js_sys::Date::now()
    }

    /// Monotonic milliseconds, falling back to wall time without `performance`.
    fn mono_now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map_or_else(wall_now, |p| p.now())
    }

    fn seed() -> u64 {
        (js_sys::Math::random() * u64::MAX as f64) as u64
    }

    pub fn run() -> io::Result<()> {
        console_error_panic_hook::set_once();
        console::init();

        let roll = RngRoll(ChaCha8Rng::seed_from_u64(seed()));
        let app = Rc::new(RefCell::new(App::new(
            LocalStorage,
            EngineConfig::default(),
            roll,
            wall_now(),
        )));

        let backend = DomBackend::new()?;
        let terminal = Terminal::new(backend)?;

        terminal.on_key_event({
            let app = app.clone();
            move |key_event| {
                if let KeyCode::Char(c) = key_event.code {
                    if let Some(command) = command_for_key(c) {
                        app.borrow_mut().handle(command, mono_now(), wall_now());
                    }
                }
            }
        });

        terminal.draw_web(move |f| {
            let size = f.area();
            let mut app = app.borrow_mut();
            app.frame(mono_now(), wall_now());
            render::render(&*app, f, size);
        });

        Ok(())
    }
}
