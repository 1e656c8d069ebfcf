#![forbid(unsafe_code)]

//! Absenteeism prediction.
//!
//! A prediction is one call to an external text-generation service with a
//! fixed prompt. Failure is not surfaced: [`FallbackPolicy`] replaces it with
//! a fixed sentence that renders exactly like a generated one. The
//! [`PredictionOrigin`] is kept for logs and tests only.

use std::fmt;

use tracing::{info, warn};

/// Fixed request sent to the text-generation service.
pub const PREDICTION_PROMPT: &str = "Génère une analyse courte (2 phrases) prédictive sur \
l'absentéisme médical au Maroc pour la semaine prochaine en te basant sur des données fictives \
de pics saisonniers.";

/// Sentence shown when the service call fails.
pub const FALLBACK_PREDICTION: &str =
    "L'IA prévoit un taux de présence stable de 92% pour la semaine prochaine.";

/// Sentence shown when the service answers with no text.
pub const EMPTY_RESPONSE_TEXT: &str = "Prédiction non disponible.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionError {
    /// No credential was provided to the client.
    MissingCredential,
    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    Transport(String),
    /// Service answered with a non-success status.
    Status { code: u16, body: String },
    /// Response could not be decoded.
    Decode(String),
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionError::MissingCredential => write!(f, "no API credential configured"),
            PredictionError::Transport(msg) => write!(f, "transport error: {msg}"),
            PredictionError::Status { code, body } => {
                write!(f, "service returned status {code}: {body}")
            }
            PredictionError::Decode(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for PredictionError {}

/// External text-generation service.
pub trait PredictionSource: Send + Sync {
    /// Send `prompt` and return the generated text.
    fn generate(&self, prompt: &str) -> Result<String, PredictionError>;
}

impl<T: PredictionSource + ?Sized> PredictionSource for std::sync::Arc<T> {
    fn generate(&self, prompt: &str) -> Result<String, PredictionError> {
        (**self).generate(prompt)
    }
}

/// What to show when the service fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackPolicy {
    UseFixedFallback(String),
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        FallbackPolicy::UseFixedFallback(FALLBACK_PREDICTION.to_string())
    }
}

impl FallbackPolicy {
    /// Text that replaces a failed call.
    pub fn resolve(&self, error: &PredictionError) -> String {
        match self {
            FallbackPolicy::UseFixedFallback(text) => {
                warn!(error = %error, "prediction failed, using fixed fallback");
                text.clone()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionOrigin {
    Generated,
    Empty,
    Fallback,
}

impl PredictionOrigin {
    pub const fn name(self) -> &'static str {
        match self {
            PredictionOrigin::Generated => "generated",
            PredictionOrigin::Empty => "empty",
            PredictionOrigin::Fallback => "fallback",
        }
    }
}

/// Text to display plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub text: String,
    pub origin: PredictionOrigin,
}

/// One-shot fetcher: one call per [`PredictionFetcher::fetch`], no caching,
/// no retry.
pub struct PredictionFetcher<S: PredictionSource> {
    source: S,
    policy: FallbackPolicy,
}

impl<S: PredictionSource> PredictionFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            policy: FallbackPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    pub fn fetch(&self) -> Prediction {
        let prediction = match self.source.generate(PREDICTION_PROMPT) {
            Ok(text) if text.is_empty() => Prediction {
                text: EMPTY_RESPONSE_TEXT.to_string(),
                origin: PredictionOrigin::Empty,
            },
            Ok(text) => Prediction {
                text,
                origin: PredictionOrigin::Generated,
            },
            Err(e) => Prediction {
                text: self.policy.resolve(&e),
                origin: PredictionOrigin::Fallback,
            },
        };
        info!(origin = prediction.origin.name(), "prediction fetched");
        prediction
    }
}

impl<S: PredictionSource> fmt::Debug for PredictionFetcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionFetcher")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<Vec<Result<String, PredictionError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, PredictionError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl PredictionSource for Scripted {
        fn generate(&self, prompt: &str) -> Result<String, PredictionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies.lock().unwrap().remove(0)
        }
    }

    #[test]
    fn generated_text_is_verbatim() {
        let text = "  Hausse de 3% attendue mardi.\n Renforcer Fès. ";
        let fetcher = PredictionFetcher::new(Scripted::new(vec![Ok(text.to_string())]));
        let p = fetcher.fetch();
        assert_eq!(p.text, text);
        assert_eq!(p.origin, PredictionOrigin::Generated);
    }

    #[test]
    fn any_error_uses_fallback() {
        let errors = vec![
            Err(PredictionError::MissingCredential),
            Err(PredictionError::Transport("reset".into())),
            Err(PredictionError::Status {
                code: 503,
                body: String::new(),
            }),
            Err(PredictionError::Decode("eof".into())),
        ];
        let fetcher = PredictionFetcher::new(Scripted::new(errors));
        for _ in 0..4 {
            let p = fetcher.fetch();
            assert_eq!(p.text, FALLBACK_PREDICTION);
            assert_eq!(p.origin, PredictionOrigin::Fallback);
        }
    }

    #[test]
    fn empty_reply_shows_unavailable() {
        let fetcher = PredictionFetcher::new(Scripted::new(vec![Ok(String::new())]));
        assert_eq!(fetcher.fetch().text, EMPTY_RESPONSE_TEXT);
    }

    #[test]
    fn custom_policy_is_applied() {
        let fetcher = PredictionFetcher::new(Scripted::new(vec![Err(
            PredictionError::MissingCredential,
        )]))
        .with_policy(FallbackPolicy::UseFixedFallback("stable".into()));
        assert_eq!(fetcher.fetch().text, "stable");
    }

    #[test]
    fn every_fetch_calls_the_source_with_fixed_prompt() {
        let source = std::sync::Arc::new(Scripted::new(vec![
            Ok("a".into()),
            Ok("b".into()),
        ]));
        let fetcher = PredictionFetcher::new(std::sync::Arc::clone(&source));
        assert_eq!(fetcher.fetch().text, "a");
        assert_eq!(fetcher.fetch().text, "b");
        let prompts = source.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts.iter().all(|p| p == PREDICTION_PROMPT));
    }

    #[test]
    fn default_policy_is_fixed_sentence() {
        assert_eq!(
            FallbackPolicy::default(),
            FallbackPolicy::UseFixedFallback(FALLBACK_PREDICTION.to_string())
        );
    }
}
