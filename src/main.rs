// stimgen-words - query a track's duration and print the target word count

use std::path::PathBuf;
use std::process::ExitCode;

use stimgen_core::{
    calculate_target_words, load_config, CalculationInput, DurationLookup, HttpDurationService,
    TrackRef,
};
use tracing::{error, info};

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}

fn usage() -> ExitCode {
    eprintln!("usage: stimgen-words <track-path> [voice-speed] [entry-delay-ms]");
    eprintln!("  config: stimgen.json in the working directory (optional)");
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let track_path = match args.first() {
        Some(path) => path.clone(),
        None => return usage(),
    };
    let voice_speed: f64 = match args.get(1).map(|v| v.parse()) {
        Some(Ok(v)) => v,
        Some(Err(_)) => return usage(),
        None => 1.0,
    };
    let speech_entry_ms: u64 = match args.get(2).map(|v| v.parse()) {
        Some(Ok(v)) => v,
        Some(Err(_)) => return usage(),
        None => 0,
    };

    let config = load_config(&PathBuf::from("stimgen.json"));
    info!(backend = %config.backend_url, "looking up track duration");

    let service = HttpDurationService::new(config.backend_url.clone());
    let mut track = TrackRef::new(track_path);
    track.voice_speed = voice_speed;
    track.speech_entry_ms = speech_entry_ms;
    track.wpm = Some(config.base_wpm);
    track.safety_factor = Some(config.safety_factor);

    let fetched = match service.fetch_duration(&track) {
        Ok(fetched) => fetched,
        Err(err) => {
            error!("{}: {}", err.title(), err);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "duration: {} ({} ms)",
        fetched.duration_formatted, fetched.duration_ms
    );

    // A backend-provided target is authoritative; otherwise compute locally.
    let result = match fetched.target_words {
        Some(words) => {
            println!("target words (backend): {}", words);
            return ExitCode::SUCCESS;
        }
        None => calculate_target_words(&CalculationInput {
            duration_ms: fetched.duration_ms,
            voice_speed,
            speech_entry_ms,
            base_wpm: config.base_wpm,
            safety_factor: config.safety_factor,
        }),
    };

    match result {
        Ok(result) => {
            println!("target words: {}", result.target_words);
            println!("{}", result.summary());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}: {}", err.title(), err);
            ExitCode::FAILURE
        }
    }
}
