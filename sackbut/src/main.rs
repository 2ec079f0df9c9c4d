//! sackbut: controller entry point.

use std::path::PathBuf;

use env_logger::Env;

use sackbut::app::{list_ports, run};
use sackbut::config::Config;

struct Args {
    config:     Option<PathBuf>,
    debug:      bool,
    list_ports: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args { config: None, debug: false, list_ports: false };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config"     => {
                let path = it.next().ok_or("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--debug"      => args.debug = true,
            "--list-ports" => args.list_ports = true,
            "-h" | "--help" => {
                println!("usage: sackbut [--config PATH] [--debug] [--list-ports]");
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(args)
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = match parse_args() {
        Ok(a)  => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("usage: sackbut [--config PATH] [--debug] [--list-ports]");
            std::process::exit(1);
        }
    };

    let cfg = Config::load(args.config.as_deref());

    if args.list_ports {
        if let Err(e) = list_ports(&cfg) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Sackbut: Breath & Slide MIDI Controller             ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  Opening simulator panel…");
    println!();

    if let Err(e) = run(&cfg, args.debug) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
