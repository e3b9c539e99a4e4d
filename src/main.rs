use anyhow::{Context, Result};
use env_logger::Env;
use log::{error, info};
use std::env;
use std::io;

// Use library instead of local modules
use hotel_desk::{DeskConfig, FrontDesk, TabularStore, VERSION};

fn main() -> Result<()> {
    // First positional argument: workbook path
    let config = DeskConfig::resolve(env::args().nth(1))?;

    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.as_str()))
        .init();
    match &config.loaded_from {
        Some(path) => info!("Config read from {:?}", path),
        None => info!("No config file found, using defaults"),
    }
    info!("hotel-desk {} using {:?}", VERSION, config.workbook_path);

    draw_banner();

    let mut store = TabularStore::open(&config.workbook_path)
        .with_context(|| format!("Cannot start without {:?}", config.workbook_path))?;
    let mut rooms = store.load()?;

    {
        let stdin = io::stdin();
        let mut desk = FrontDesk::new(
            &mut store,
            &mut rooms,
            stdin.lock(),
            io::stdout(),
            config.currency.clone(),
        )?;
        desk.run()?;
    }

    if let Err(e) = store.close() {
        error!("Closing workbook failed: {:#}", e);
    }

    println!("\nGoodbye.");
    Ok(())
}

fn draw_banner() {
    println!(" _________________________________________________");
    println!("|                                                 |");
    println!("|                  Hotel Desk                     |");
    println!("|_________________________________________________|");
    println!();
}
