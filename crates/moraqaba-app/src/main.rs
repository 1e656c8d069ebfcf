#![forbid(unsafe_code)]

//! Moraqaba binary entry point.

use std::sync::Arc;

use moraqaba_app::app::AppModel;
use moraqaba_app::cli::{self, Command, Opts, ScreenModeOpt};
use moraqaba_app::gemini::{GeminiClient, GeminiConfig, Unavailable};
use moraqaba_app::{camera, logging};
use moraqaba_core::PredictionSource;
use moraqaba_runtime::{Program, ProgramConfig};

fn main() {
    let opts = match Opts::parse() {
        Ok(Command::Run(opts)) => opts,
        Ok(Command::Help) => {
            print!("{}", cli::HELP_TEXT);
            return;
        }
        Ok(Command::Version) => {
            println!("moraqaba {}", cli::VERSION);
            return;
        }
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    if let Err(e) = logging::init(&opts.log_file) {
        eprintln!("Logging disabled: {e}");
    }

    let source: Arc<dyn PredictionSource> = match GeminiClient::new(GeminiConfig {
        endpoint: opts.endpoint.clone(),
        model: opts.model.clone(),
        timeout: opts.timeout,
        api_key: opts.api_key.clone(),
    }) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::warn!(error = %e, "text generation client unavailable");
            Arc::new(Unavailable(e))
        }
    };

    let model = AppModel::new(camera::build_camera(opts.camera), source)
        .with_exit_after(opts.exit_after_ms);

    let config = match opts.screen_mode {
        ScreenModeOpt::Alt => ProgramConfig::fullscreen(),
        ScreenModeOpt::Inline => ProgramConfig::inline(opts.ui_height),
    };

    match Program::with_config(model, config) {
        Ok(program) => {
            if let Err(e) = program.run() {
                eprintln!("Runtime error: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            std::process::exit(1);
        }
    }
}
