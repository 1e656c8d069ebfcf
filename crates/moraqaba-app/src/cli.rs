#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Parses args manually. Every option can also come from a `MORAQABA_*`
//! environment variable; explicit flags win over the environment, which wins
//! over the defaults.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::camera::CameraChoice;
use crate::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
Moraqaba AI - Suivi de présence et avis citoyens

USAGE:
    moraqaba [OPTIONS]

OPTIONS:
    --screen-mode=MODE   Screen mode: 'alt' (default) or 'inline'
    --ui-height=N        UI height in rows for inline mode (default: 30)
    --camera=SOURCE      Camera: 'probe' (default), 'grant' or 'deny'
    --model=NAME         Text-generation model (default: gemini-3-flash-preview)
    --endpoint=URL       Text-generation service base URL
    --timeout-ms=N       Prediction request timeout (default: 15000)
    --log-file=PATH      Log destination (default: moraqaba.log)
    --exit-after-ms=N    Quit after N milliseconds (0 = never)
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS:
    Tab / Shift-Tab      Next / previous field or tab
    1-9                  Jump to a sidebar tab
    Home                 Back to the dashboard
    Enter                Activate
    Ctrl+L               Déconnexion
    Ctrl+C / Ctrl+Q      Quit

ENVIRONMENT VARIABLES:
    MORAQABA_SCREEN_MODE     Override --screen-mode
    MORAQABA_UI_HEIGHT       Override --ui-height
    MORAQABA_CAMERA          Override --camera
    MORAQABA_MODEL           Override --model
    MORAQABA_ENDPOINT        Override --endpoint
    MORAQABA_TIMEOUT_MS      Override --timeout-ms
    MORAQABA_LOG_FILE        Override --log-file
    MORAQABA_EXIT_AFTER_MS   Override --exit-after-ms
    MORAQABA_LOG             Log filter (default: info)
    GEMINI_API_KEY, API_KEY  Credential for the text-generation service";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenModeOpt {
    Alt,
    Inline,
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    pub screen_mode: ScreenModeOpt,
    pub ui_height: u16,
    pub camera: CameraChoice,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub log_file: PathBuf,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
    pub api_key: Option<String>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            screen_mode: ScreenModeOpt::Alt,
            ui_height: 30,
            camera: CameraChoice::Probe,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_millis(15_000),
            log_file: PathBuf::from("moraqaba.log"),
            exit_after_ms: 0,
            api_key: None,
        }
    }
}

/// What the binary should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    UnknownArgument(String),
    InvalidValue {
        option: &'static str,
        value: String,
    },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::UnknownArgument(arg) => write!(f, "Unknown argument: {arg}"),
            CliError::InvalidValue { option, value } => {
                write!(f, "Invalid {option} value: {value}")
            }
        }
    }
}

impl std::error::Error for CliError {}

fn invalid(option: &'static str, value: &str) -> CliError {
    CliError::InvalidValue {
        option,
        value: value.to_string(),
    }
}

/// Apply one `option=value` pair, shared by flags and env vars.
fn apply(opts: &mut Opts, option: &'static str, value: &str) -> Result<(), CliError> {
    match option {
        "--screen-mode" => {
            opts.screen_mode = match value {
                "alt" => ScreenModeOpt::Alt,
                "inline" => ScreenModeOpt::Inline,
                _ => return Err(invalid(option, value)),
            };
        }
        "--ui-height" => opts.ui_height = value.parse().map_err(|_| invalid(option, value))?,
        "--camera" => opts.camera = value.parse().map_err(|_| invalid(option, value))?,
        "--model" if !value.is_empty() => opts.model = value.to_string(),
        "--endpoint" if !value.is_empty() => {
            opts.endpoint = value.trim_end_matches('/').to_string();
        }
        "--timeout-ms" => {
            let ms: u64 = value.parse().map_err(|_| invalid(option, value))?;
            opts.timeout = Duration::from_millis(ms);
        }
        "--log-file" if !value.is_empty() => opts.log_file = PathBuf::from(value),
        "--exit-after-ms" => {
            opts.exit_after_ms = value.parse().map_err(|_| invalid(option, value))?;
        }
        _ => return Err(invalid(option, value)),
    }
    Ok(())
}

const OPTIONS: &[(&str, &str)] = &[
    ("--screen-mode", "MORAQABA_SCREEN_MODE"),
    ("--ui-height", "MORAQABA_UI_HEIGHT"),
    ("--camera", "MORAQABA_CAMERA"),
    ("--model", "MORAQABA_MODEL"),
    ("--endpoint", "MORAQABA_ENDPOINT"),
    ("--timeout-ms", "MORAQABA_TIMEOUT_MS"),
    ("--log-file", "MORAQABA_LOG_FILE"),
    ("--exit-after-ms", "MORAQABA_EXIT_AFTER_MS"),
];

impl Opts {
    /// Parse the process arguments and environment.
    pub fn parse() -> Result<Command, CliError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::parse_from(&args, |name| std::env::var(name).ok())
    }

    /// Parse `args` (without the program name) with `env` as the variable
    /// lookup.
    pub fn parse_from(
        args: &[String],
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Command, CliError> {
        let mut opts = Self::default();

        for (option, var) in OPTIONS {
            if let Some(value) = env(var) {
                apply(&mut opts, option, &value)?;
            }
        }
        opts.api_key = env("GEMINI_API_KEY")
            .or_else(|| env("API_KEY"))
            .filter(|k| !k.trim().is_empty());

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                other => {
                    let Some((name, value)) = other.split_once('=') else {
                        return Err(CliError::UnknownArgument(other.to_string()));
                    };
                    let Some((option, _)) = OPTIONS.iter().find(|(o, _)| *o == name) else {
                        return Err(CliError::UnknownArgument(other.to_string()));
                    };
                    apply(&mut opts, option, value)?;
                }
            }
        }

        Ok(Command::Run(opts))
    }
}
