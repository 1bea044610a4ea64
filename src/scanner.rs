//! Character scanner for the list micro-syntax
//!
//! Both the source-list parser and the variable substitution engine walk text
//! one character at a time through an explicit state machine. Exactly one
//! [`ScanState`] is active at any point; [`ScanMachine::enter`] checks each
//! transition against the allowed set.
//!
//! ```text
//! Default ──"──▶ InString ──{──▶ InVarBrace
//!    │  ▲  ◀──"───┘  ▲              │
//!    │  │            └──────}───────┘
//!    ├──(──▶ InParen ──)──▶ Default
//!    └──$──▶ InVarBare ──delimiter──▶ Default
//! ```

use serde::{Deserialize, Serialize};

/// Scanner states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanState {
    #[default]
    Default,
    InString,
    InParen,
    InVarBrace,
    InVarBare,
}

impl ScanState {
    /// Whether `self -> next` is a legal transition
    pub fn can_enter(self, next: ScanState) -> bool {
        use ScanState::*;
        matches!(
            (self, next),
            (Default, InString)
                | (Default, InParen)
                | (Default, InVarBare)
                | (InString, Default)
                | (InString, InVarBrace)
                | (InVarBrace, InString)
                | (InParen, Default)
                | (InVarBare, Default)
        )
    }
}

/// Holds the single active scanner state
#[derive(Debug, Clone, Default)]
pub struct ScanMachine {
    state: ScanState,
}

impl ScanMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Move to `next`. Illegal transitions are a scanner bug.
    pub fn enter(&mut self, next: ScanState) {
        debug_assert!(
            self.state.can_enter(next),
            "illegal scanner transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }
}

/// Parse a bracketed list of source expressions.
///
/// Each element is either a quoted literal or a parenthesized group, returned
/// verbatim. Text outside elements (commas, whitespace) is skipped, and an
/// element left open at the closing bracket is discarded. Returns `None` when
/// the text is not wrapped in `[` ... `]`.
pub fn parse_source_list(text: &str) -> Option<Vec<String>> {
    use ScanState::*;

    let body = text.trim().strip_prefix('[')?.strip_suffix(']')?;

    let mut machine = ScanMachine::new();
    let mut elements = Vec::new();
    let mut current = String::new();

    for c in body.chars() {
        match (machine.state(), c) {
            (Default, '"') => {
                machine.enter(InString);
                current.push(c);
            }
            (Default, '(') => {
                machine.enter(InParen);
                current.push(c);
            }
            (Default, _) => {}
            (InString, '"') | (InParen, ')') => {
                current.push(c);
                elements.push(std::mem::take(&mut current));
                machine.enter(Default);
            }
            (InString, _) | (InParen, _) => current.push(c),
            (InVarBrace, _) | (InVarBare, _) => {}
        }
    }

    Some(elements)
}
