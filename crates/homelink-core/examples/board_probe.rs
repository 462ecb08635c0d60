//! Board Communication Probe
//!
//! A standalone tool to watch a HomeLink board over its serial link.
//! Opens the port, starts the background poller, and prints each snapshot
//! as it arrives.
//!
//! Usage:
//!   cargo run --example board_probe -- [OPTIONS]
//!
//! Options:
//!   --port PORT       Serial port (default: /dev/ttyUSB0)
//!   --baud RATE       Baud rate (default: 9600)
//!   --board KIND      Board kind: air | curtain (default: air)
//!   --interval MS     Poll interval in ms (default: 1000)
//!   --set VALUE       Send one set-command before watching

use std::sync::Arc;
use std::time::Duration;

use homelink_core::poller::DEFAULT_POLL_INTERVAL;
use homelink_core::prelude::*;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut port_name = "/dev/ttyUSB0".to_string();
    let mut baud_rate = 9600u32;
    let mut board = "air".to_string();
    let mut interval_ms = DEFAULT_POLL_INTERVAL.as_millis() as u64;
    let mut set_value: Option<f64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                i += 1;
                if i < args.len() {
                    port_name = args[i].clone();
                }
            }
            "--baud" | "-b" => {
                i += 1;
                if i < args.len() {
                    baud_rate = args[i].parse().unwrap_or(9600);
                }
            }
            "--board" => {
                i += 1;
                if i < args.len() {
                    board = args[i].clone();
                }
            }
            "--interval" => {
                i += 1;
                if i < args.len() {
                    interval_ms = args[i].parse().unwrap_or(1000);
                }
            }
            "--set" => {
                i += 1;
                if i < args.len() {
                    set_value = args[i].parse().ok();
                }
            }
            other => {
                eprintln!("unknown option: {other}");
                std::process::exit(2);
            }
        }
        i += 1;
    }

    let session = Arc::new(Session::new(SessionConfig::new(port_name.clone(), baud_rate)));
    if let Err(e) = session.open() {
        eprintln!("failed to open {port_name}: {e}");
        std::process::exit(1);
    }
    println!("connected to {port_name} at {baud_rate} baud");

    let interval = Duration::from_millis(interval_ms);
    match board.as_str() {
        "air" => {
            let ac = AirConditioner::new(Arc::clone(&session));
            if let Some(value) = set_value {
                match ac.set_desired_temperature(value) {
                    Ok(()) => println!("setpoint commanded: {value:.1} C"),
                    Err(e) => eprintln!("set failed: {e}"),
                }
            }
            let mut updates = ac.subscribe();
            let poller = ac.spawn_poller(interval);
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let r = *updates.borrow_and_update();
                        println!(
                            "ambient {:5.1} C | setpoint {:5.1} C | fan {:3} ({:.1} rps)",
                            r.ambient_temperature,
                            r.desired_temperature,
                            r.fan_speed,
                            ac.fan_speed_rps(),
                        );
                    }
                }
            }
            poller.shutdown().await;
        }
        "curtain" => {
            let curtain = Curtain::new(Arc::clone(&session));
            if let Some(value) = set_value {
                match curtain.set_curtain_status(value) {
                    Ok(()) => println!("curtain commanded: {value:.1} %"),
                    Err(e) => eprintln!("set failed: {e}"),
                }
            }
            let mut updates = curtain.subscribe();
            let poller = curtain.spawn_poller(interval);
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let r = *updates.borrow_and_update();
                        println!(
                            "curtain {:5.1} % | outdoor {:5.1} C | pressure {:6.1} hPa | light {:5.1} lux",
                            r.curtain_status,
                            r.outdoor_temperature,
                            r.outdoor_pressure,
                            r.light_intensity,
                        );
                    }
                }
            }
            poller.shutdown().await;
        }
        other => {
            eprintln!("unknown board kind: {other} (expected air | curtain)");
            std::process::exit(2);
        }
    }

    let _ = session.close();
    println!("disconnected");
}
