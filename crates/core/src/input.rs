//! Input source trait — the speech/text acquisition seam.
//!
//! The assistant core depends only on this two-method contract, not on how
//! transcription happens. A voice front-end blocks in `text()` until a
//! finished utterance is transcribed; a console front-end blocks on stdin.

/// A blocking source of user input.
pub trait InputSource: Send {
    /// Block until the next complete input is available.
    /// Returns `None` when the source is exhausted (end of input).
    fn text(&mut self) -> Option<String>;

    /// Release the source's resources (microphone, transcription workers).
    /// Called exactly once, after the final `text()` call.
    fn shutdown(&mut self);
}
