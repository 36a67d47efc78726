mod config;
mod launcher;
mod logger;
mod parse_args;

use std::time::Duration;

use anyhow::Context;
use config::Config;
use parse_args::{parse_args, AppArgs};
use sargon_board::{Game, GameState};
use vice_monitor::{MemoryRange, Monitor, MonitorClient, TcpTransport, TextMonitor};

fn main() {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error parsing arguments: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logger::init(args.verbosity, args.log_file.as_deref()) {
        eprintln!("Failed to set up logging: {}", e);
        std::process::exit(1);
    }
    if let Some(path) = &args.log_file {
        eprintln!("Logging to: {}", path);
    }

    if let Err(e) = run(args) {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(args: &AppArgs) -> anyhow::Result<Config> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(host) = &args.host {
        config.monitor.host = host.clone();
    }
    if let Some(port) = args.port {
        config.monitor.port = port;
    }
    if let Some(port) = args.text_port {
        config.monitor.text_port = port;
    }
    if let Some(colour) = args.colour {
        config.game.colour = colour;
    }
    if let Some(level) = args.level {
        config.game.level = level;
    }
    Ok(config)
}

fn wait_for_computer<M: Monitor>(game: &mut Game<M>, config: &Config) -> anyhow::Result<()> {
    println!("waiting for computer");
    let polls = game
        .poll_until_human_turn(config.game.poll_attempts, config.game.poll_interval())
        .context("waiting for the computer's move")?;
    log::debug!("computer moved after {} poll(s)", polls);
    Ok(())
}

fn print_board<M: Monitor>(game: &mut Game<M>) -> anyhow::Result<()> {
    let board = game.board().context("reading the board")?;
    let move_number = game.move_number()?;
    println!("{}", board);
    println!("move {}", move_number);
    Ok(())
}

fn run(args: AppArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let monitor = &config.monitor;

    if args.launch {
        let child = launcher::launch(&config.emulator, monitor)?;
        log::info!("xvic started, pid {}", child.id());
        launcher::wait_until_ready(
            &monitor.binary_addr(),
            config.emulator.ready_attempts,
            Duration::from_millis(config.emulator.ready_interval_ms),
        )?;
    }

    let text = TextMonitor::new(monitor.text_addr()).with_timeouts(
        Duration::from_millis(monitor.connect_timeout_ms),
        Duration::from_millis(monitor.io_timeout_ms),
    );
    let reply = text.sound_effects(false).context("turning sound effects off")?;
    log::info!("{}", reply.trim_end());
    if args.warp {
        text.set_warp(true).context("turning warp on")?;
    }

    let transport = TcpTransport::new(monitor.binary_addr())
        .with_connect_timeout(Duration::from_millis(monitor.connect_timeout_ms))
        .with_io_timeout(Some(Duration::from_millis(monitor.io_timeout_ms)));
    let mut game =
        Game::new(MonitorClient::new(transport), config.layout).with_settle(config.game.settle());

    game.shift_screen(config.game.shift_right, config.game.shift_down)?;
    if args.launch && config.game.startup_delay_ms > 0 {
        log::info!("waiting for Sargon II to load");
        std::thread::sleep(Duration::from_millis(config.game.startup_delay_ms));
    }
    game.start(config.game.colour, config.game.level)?;
    println!(
        "playing {} at level {}",
        config.game.colour, config.game.level
    );

    for mv in &args.moves {
        if game.state() == GameState::AwaitingComputerMove {
            wait_for_computer(&mut game, &config)?;
        }
        let parsed = game.submit_move(mv)?;
        println!("played {}", parsed);
        wait_for_computer(&mut game, &config)?;
        if args.dump {
            print_board(&mut game)?;
        }
    }
    if args.moves.is_empty() && args.dump {
        print_board(&mut game)?;
    }

    if let Some(path) = &args.save_mem {
        let reply = text
            .save_memory(path, MemoryRange::new(0, 0xffff)?)
            .with_context(|| format!("saving memory to {}", path.display()))?;
        log::info!("{}", reply.trim_end());
    }

    if args.quit {
        game.quit();
        let mut client = game.into_monitor();
        client.quit().context("quitting the emulator")?;
        println!("emulator quit");
    }
    Ok(())
}
