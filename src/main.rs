mod catalog;
mod config;
mod logging;
mod mpris;
mod player;
mod runtime;
mod view;

fn main() -> anyhow::Result<()> {
    let _log_guard = logging::init()?;
    runtime::run()
}
