use parsegen::Case;

/// What to do with `<prose>` values, which describe input in free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProsePolicy {
    /// Fail compilation when any rule contains prose, referenced or not.
    Reject,
    /// Treat prose as a terminal that matches without consuming input.
    AlwaysMatch,
}

/// Knobs for a single compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Comparison used for quoted strings without a `%s` or `%i` prefix.
    pub char_val_case: Case,
    pub prose: ProsePolicy,
    /// Supply the RFC 5234 core rules (DIGIT, ALPHA, ...) when a grammar
    /// references them without defining them.
    pub core_rules: bool,
    pub reject_left_recursion: bool,
    /// Largest numeric range that may be expanded. `None` is unlimited.
    pub max_range_len: Option<u32>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            char_val_case: Case::Insensitive,
            prose: ProsePolicy::Reject,
            core_rules: true,
            reject_left_recursion: true,
            max_range_len: None,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn char_val_case(mut self, case: Case) -> Self {
        self.char_val_case = case;
        self
    }

    pub fn prose(mut self, prose: ProsePolicy) -> Self {
        self.prose = prose;
        self
    }

    pub fn core_rules(mut self, enabled: bool) -> Self {
        self.core_rules = enabled;
        self
    }

    pub fn reject_left_recursion(mut self, enabled: bool) -> Self {
        self.reject_left_recursion = enabled;
        self
    }

    pub fn max_range_len(mut self, limit: Option<u32>) -> Self {
        self.max_range_len = limit;
        self
    }
}
