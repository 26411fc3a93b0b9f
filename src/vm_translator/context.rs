// Translation context shared by every emitter
//
// Counters only ever grow. Every generated label embeds one of them, so two
// label definitions in one output stream can never collide.

use log::debug;

#[derive(Debug, Default, Clone)]
pub struct TranslationContext {
    unit_name: String,
    comparison_counter: usize,
    call_counter: usize,
}

impl TranslationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to a new input unit; statics are namespaced by this name
    pub fn set_unit_name(&mut self, name: &str) {
        debug!("Unit boundary: '{}' -> '{}'", self.unit_name, name);
        self.unit_name = name.to_string();
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    /// Assembler symbol backing `static <index>` in the current unit
    pub fn static_symbol(&self, index: u16) -> String {
        format!("{}.{}", self.unit_name, index)
    }

    /// Allocate the id for a fresh comparison label block
    pub fn next_comparison_id(&mut self) -> usize {
        self.comparison_counter += 1;
        self.comparison_counter
    }

    /// Allocate the id for a fresh return-address label
    pub fn next_call_id(&mut self) -> usize {
        self.call_counter += 1;
        self.call_counter
    }

    pub fn comparison_count(&self) -> usize {
        self.comparison_counter
    }

    pub fn call_count(&self) -> usize {
        self.call_counter
    }
}
