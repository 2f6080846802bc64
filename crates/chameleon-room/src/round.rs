//! A single round's outcome.

use chameleon_protocol::PlayerId;

use crate::Category;

/// The immutable result of starting a round: who the chameleon is, the
/// board everyone sees, and the secret word everyone but the chameleon
/// sees.
///
/// Fields are private; `Round` values handed out by the engine are
/// clones, so holding one never aliases room state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    category: String,
    secret_word: String,
    entries: Vec<String>,
    chameleon: PlayerId,
}

impl Round {
    /// Draws a secret word from `category` and records its full board.
    pub fn new(chameleon: PlayerId, category: &Category) -> Self {
        Self {
            category: category.name().to_owned(),
            secret_word: category.random_entry(),
            entries: category.entries(),
            chameleon,
        }
    }

    /// Name of the category the board came from.
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn secret_word(&self) -> &str {
        &self.secret_word
    }

    /// The full board, shown to every player including the chameleon.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn chameleon(&self) -> &PlayerId {
        &self.chameleon
    }

    pub fn is_chameleon(&self, player: &PlayerId) -> bool {
        self.chameleon == *player
    }
}
