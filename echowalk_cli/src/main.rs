#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod error_fmt;
mod logging;
mod replay;
mod voice;

use clap::Parser;
use eyre::WrapErr;
use std::path::Path;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    color_eyre::install()?;
    let cfg = load_config(&cli.config)?;
    logging::init_tracing(cli.json, &cli.log_level, &cfg.logging)?;

    match cli.cmd {
        Commands::Replay {
            scenario,
            realtime,
            speech_ms_per_char,
            tail_ms,
            say,
        } => {
            let opts = replay::ReplayOpts {
                scenario: &scenario,
                realtime,
                speech_ms_per_char,
                tail_ms,
                say: &say,
                json: cli.json,
            };
            replay::run(&cfg, &opts)?;
        }
        Commands::CheckConfig => check_config(&cli.config, &cfg, cli.json),
    }
    Ok(())
}

fn load_config(path: &Path) -> eyre::Result<echowalk_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = echowalk_config::load_toml(&text)
        .wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

fn check_config(path: &Path, cfg: &echowalk_config::Config, json: bool) {
    let a = &cfg.alerts;
    let t = &cfg.tracker;
    if json {
        println!(
            "{}",
            serde_json::json!({
                "config": path.display().to_string(),
                "alerts": {
                    "proximity_warnings_enabled": a.proximity_warnings_enabled,
                    "cooldown_ms": a.cooldown_ms,
                    "proximity_threshold_m": a.proximity_threshold_m,
                    "min_distance_m": a.min_distance_m,
                    "large_obstacle_max_m": a.large_obstacle_max_m,
                    "large_obstacle_area_m2": a.large_obstacle_area_m2,
                },
                "tracker": {
                    "tick_ms": t.tick_ms,
                    "wake_ms": t.wake_ms,
                    "decay": t.decay,
                    "displacement_gain": t.displacement_gain,
                    "human_score": t.human_score,
                    "object_score": t.object_score,
                    "human_confirm_ms": t.human_confirm_ms,
                },
                "speech": { "grace_ms": cfg.speech.grace_ms },
                "display": { "wireframe": cfg.display.wireframe },
            })
        );
        return;
    }
    println!("config OK: {}", path.display());
    println!(
        "[alerts] enabled={} cooldown_ms={} proximity_threshold_m={} min_distance_m={} large_obstacle_max_m={} large_obstacle_area_m2={}",
        a.proximity_warnings_enabled,
        a.cooldown_ms,
        a.proximity_threshold_m,
        a.min_distance_m,
        a.large_obstacle_max_m,
        a.large_obstacle_area_m2
    );
    println!(
        "[tracker] tick_ms={} wake_ms={} decay={} displacement_gain={} human_score={} object_score={} human_confirm_ms={}",
        t.tick_ms,
        t.wake_ms,
        t.decay,
        t.displacement_gain,
        t.human_score,
        t.object_score,
        t.human_confirm_ms
    );
    println!("[speech] grace_ms={}", cfg.speech.grace_ms);
    println!("[display] wireframe={}", cfg.display.wireframe);
}
