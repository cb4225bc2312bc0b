use std::fs::File;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use beltane_bus::{ConsoleGate, Exchange, MemoryStore, TextPool, Transport};
use beltane_console::{Config, Console};

fn init_logging(verbose: bool) {
    use simplelog::*;

    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("beltane")
        .join("console.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = File::create(&log_path)
        .unwrap_or_else(|_| File::create("/tmp/beltane-console.log").expect("Cannot create log file"));

    WriteLogger::init(log_level, simplelog::Config::default(), log_file)
        .expect("Failed to initialize logger");

    log::info!("beltane console starting (log level: {log_level:?})");
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    init_logging(verbose);

    let config = Config::load();
    let pool = TextPool::new();
    let gate = ConsoleGate::new();
    let (transport, ends) = Transport::new(config.queue_capacity());

    // The engine pump stands in for the audio callback: it drains the
    // inbound queues once per buffer period and owns the live values.
    let mut exchange = Exchange::new(ends, MemoryStore::new(), gate.clone());
    let period = config.buffer_period();
    let running = Arc::new(AtomicBool::new(true));
    let pump_running = Arc::clone(&running);
    let pump = std::thread::spawn(move || {
        while pump_running.load(Ordering::Relaxed) {
            exchange.mediate();
            std::thread::sleep(period);
        }
    });

    let mut console = Console::new(pool, transport, gate, config.command_timeout());

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut input = String::new();
    loop {
        write!(stdout, "beltane> ")?;
        stdout.flush()?;
        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break; // end of input
        }
        let line = input.trim();
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }
        for reply in console.run_line(line) {
            writeln!(stdout, "{reply}")?;
        }
    }

    running.store(false, Ordering::Relaxed);
    let _ = pump.join();
    log::info!("beltane console stopped");
    Ok(())
}
