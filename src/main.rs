#[cfg(target_arch = "wasm32")]
fn main() -> std::io::Result<()> {
    careful_tires::frontend::run()
}

#[cfg(not(target_arch = "wasm32"))]
use careful_tires::economy::simulator::{simulate, SimulationSettings};
#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

/// Native builds have no terminal UI; they run the balance simulator instead.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Parser)]
#[command(name = "careful-tires")]
#[command(about = "Headless balance simulator for the Careful Tires economy")]
struct Args {
    /// Simulated play time in seconds
    #[arg(long, default_value_t = SimulationSettings::default().duration_secs)]
    duration: u32,

    /// Milliseconds between two clicks (below 260 every click is rushed)
    #[arg(long, default_value_t = SimulationSettings::default().click_interval_ms)]
    click_interval: f64,

    /// Seed for the tip rolls
    #[arg(long, default_value_t = SimulationSettings::default().seed)]
    seed: u64,
}

#[cfg(not(target_arch = "wasm32"))]
impl Args {
    fn settings(&self) -> SimulationSettings {
        SimulationSettings {
            duration_secs: self.duration,
            click_interval_ms: self.click_interval,
            seed: self.seed,
            ..SimulationSettings::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let settings = args.settings();
    log::info!("simulating {settings:?}");
    print!("{}", simulate(&settings).render());
}
