mod settings;

pub use settings::{
    JobSettings, RecognizerSettings, ServerSettings, Settings, TranscodeSettings,
};
