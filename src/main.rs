mod app;
mod config;
mod energy;
mod harmony;
mod motion;
mod playlist;
mod progress;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
