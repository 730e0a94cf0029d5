#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum Error {
    #[error("Error parsing grammar description, line: {line}, cause: {cause}.")]
    ParseRuleError { line: usize, cause: ParseRuleError },
    #[error("Grammar description contains no rules.")]
    EmptyGrammar,
    #[error("Grammar does not contain the non-terminal: {0}.")]
    NonTerminalNotFound(String),
}

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum ParseRuleError {
    #[error("expected 4 `:` separated fields, found {0}")]
    FieldCount(usize),
    #[error("empty rule id")]
    EmptyRuleId,
    #[error("rule `{0}` is declared more than once")]
    DuplicateRule(String),
    #[error("empty alternative in productions")]
    EmptyProduction,
    #[error("`epsilon` must be the only symbol of its alternative")]
    EpsilonNotAlone,
    #[error("reserved symbol `{0}` used inside a production")]
    ReservedSymbol(String),
    #[error("expected terminal, found non-terminal: {0}")]
    TokenTypeMisMatch(String),
}

impl Error {
    pub(crate) fn parse_rule_error(line: usize, cause: ParseRuleError) -> Self {
        Self::ParseRuleError { line, cause }
    }
}
