//! Text-to-speech playback over a platform speech engine.
//!
//! The engine itself is an injected capability: hosts without speech support
//! pass `None` and the player reports [`SpeechPlayer::supported`] as `false`,
//! turning every call into a no-op.

/// A voice offered by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP 47 language tag, e.g. `en-US`.
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }

    fn lang_contains(&self, needle: &str) -> bool {
        self.lang.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Playback parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOptions {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// Exact voice name, or a language fragment such as `en`.
    pub voice_hint: Option<String>,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice_hint: None,
        }
    }
}

/// One request to speak.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub voice: Option<Voice>,
}

/// A platform speech synthesizer.
pub trait SpeechEngine: Send + Sync {
    /// Voices currently available. May be empty until the platform has
    /// finished loading them.
    fn voices(&self) -> Vec<Voice>;

    fn speak(&self, utterance: Utterance);

    fn cancel(&self);

    fn is_speaking(&self) -> bool;
}

/// Speak/stop/toggle controller with voice selection.
pub struct SpeechPlayer {
    engine: Option<Box<dyn SpeechEngine>>,
    options: SpeechOptions,
    voices: Vec<Voice>,
    selected: Option<Voice>,
}

impl SpeechPlayer {
    pub fn new(engine: Option<Box<dyn SpeechEngine>>, options: SpeechOptions) -> Self {
        if engine.is_none() {
            log::debug!("Speech synthesis not available");
        }

        let mut player = Self {
            engine,
            options,
            voices: Vec::new(),
            selected: None,
        };
        player.refresh_voices();
        player
    }

    /// Whether a speech engine is present.
    pub fn supported(&self) -> bool {
        self.engine.is_some()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn selected_voice(&self) -> Option<&Voice> {
        self.selected.as_ref()
    }

    /// Reloads the engine's voice list. The first time voices are available
    /// a voice is chosen from the hint: exact name, then language fragment,
    /// then any English voice, then the first voice.
    pub fn refresh_voices(&mut self) {
        let Some(engine) = &self.engine else {
            return;
        };

        let voices = engine.voices();
        if voices.is_empty() {
            return;
        }

        if self.selected.is_none() {
            let hint = self.options.voice_hint.as_deref();
            let chosen = hint
                .and_then(|h| find_voice(&voices, h))
                .or_else(|| voices.iter().find(|v| v.lang.to_lowercase().starts_with("en")))
                .or_else(|| voices.first())
                .cloned();

            if let Some(voice) = &chosen {
                log::debug!("Selected voice '{}' ({})", voice.name, voice.lang);
            }
            self.selected = chosen;
        }

        self.voices = voices;
    }

    /// Selects a voice by exact name or language fragment.
    ///
    /// Returns `false` and keeps the current voice when nothing matches.
    pub fn set_voice(&mut self, name_or_lang: &str) -> bool {
        match find_voice(&self.voices, name_or_lang) {
            Some(voice) => {
                self.selected = Some(voice.clone());
                true
            }
            None => false,
        }
    }

    /// Speaks `text`, interrupting anything already playing. Blank text is
    /// ignored.
    pub fn speak(&self, text: &str) {
        let Some(engine) = &self.engine else {
            return;
        };
        if text.trim().is_empty() {
            return;
        }

        if engine.is_speaking() {
            engine.cancel();
        }

        engine.speak(Utterance {
            text: text.to_string(),
            rate: self.options.rate,
            pitch: self.options.pitch,
            volume: self.options.volume,
            voice: self.selected.clone(),
        });
    }

    pub fn stop(&self) {
        if let Some(engine) = &self.engine {
            engine.cancel();
        }
    }

    /// Stops playback if speaking, otherwise speaks `text`.
    pub fn toggle(&self, text: &str) {
        if self.is_speaking() {
            self.stop();
        } else {
            self.speak(text);
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.engine.as_ref().map_or(false, |e| e.is_speaking())
    }
}

fn find_voice<'a>(voices: &'a [Voice], name_or_lang: &str) -> Option<&'a Voice> {
    voices
        .iter()
        .find(|v| v.name == name_or_lang)
        .or_else(|| voices.iter().find(|v| v.lang_contains(name_or_lang)))
}
