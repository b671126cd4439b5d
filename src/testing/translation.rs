use crate::translation::{Fault, TranslationState, Translator};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Translator that holds translations until the test completes them.
#[derive(Debug, Clone, Default)]
pub struct MockTranslator(pub Arc<Mutex<VecDeque<TranslationState>>>);

impl MockTranslator {
    #[must_use]
    pub fn pending(&self) -> usize {
        self.0.lock().len()
    }

    /// Completes the oldest translation with an identity mapping.
    #[must_use]
    pub fn complete_next(&self) -> Option<TranslationState> {
        let mut state = self.0.lock().pop_front()?;
        let vaddr = state.vaddr();
        state.complete(vaddr);
        Some(state)
    }

    #[must_use]
    pub fn fault_next(&self, fault: Fault) -> Option<TranslationState> {
        let mut state = self.0.lock().pop_front()?;
        state.fail(fault);
        Some(state)
    }
}

impl Translator for MockTranslator {
    fn begin_translate_timing(&mut self, state: TranslationState) {
        self.0.lock().push_back(state);
    }
}
