use crate::models::Flashcard;

/// An ordered set of flashcards with a cursor.
///
/// Navigation is bounds-checked: `previous` does nothing on the first card
/// and `next` does nothing on the last. Moving to another card hides the
/// answer and hint again; toggling them never moves the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashcardDeck {
    cards: Vec<Flashcard>,
    index: usize,
    show_answer: bool,
    show_hint: bool,
}

impl FlashcardDeck {
    pub fn new(cards: Vec<Flashcard>) -> Self {
        Self {
            cards,
            index: 0,
            show_answer: false,
            show_hint: false,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Flashcard> {
        self.cards.get(self.index)
    }

    pub fn is_answer_shown(&self) -> bool {
        self.show_answer
    }

    pub fn is_hint_shown(&self) -> bool {
        self.show_hint
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.cards.len()
    }

    /// Move forward one card. Returns `false` (and changes nothing) at the end.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        self.hide();
        true
    }

    /// Move back one card. Returns `false` (and changes nothing) at the start.
    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        self.hide();
        true
    }

    pub fn toggle_answer(&mut self) {
        self.show_answer = !self.show_answer;
    }

    pub fn toggle_hint(&mut self) {
        self.show_hint = !self.show_hint;
    }

    /// "2 / 5" style position, or "0 / 0" for an empty deck.
    pub fn position_label(&self) -> String {
        if self.cards.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.index + 1, self.cards.len())
        }
    }

    fn hide(&mut self) {
        self.show_answer = false;
        self.show_hint = false;
    }
}
