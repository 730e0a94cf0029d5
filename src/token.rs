use std::fmt::{Debug, Display};

#[derive(PartialEq, Eq, Clone, Hash, Copy, PartialOrd, Ord)]
pub struct Terminal<'a> {
    ident: &'a str,
}

impl Debug for Terminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!(r#"t{:?}"#, self.ident))
    }
}

impl Display for Terminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.ident)
    }
}

impl<'a> From<&'a str> for Terminal<'a> {
    fn from(ident: &'a str) -> Self {
        Terminal { ident }
    }
}

impl<'a> Terminal<'a> {
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        self.ident
    }

    /// 是否是空串标记 [`EPSILON`].
    #[must_use]
    pub fn is_epsilon(&self) -> bool {
        self.ident == EPSILON.ident
    }

    /// 是否是输入结束标记 [`EOF`].
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.ident == EOF.ident
    }
}

#[derive(PartialEq, Eq, Clone, Hash, Copy, PartialOrd, Ord)]
pub struct NonTerminal<'a> {
    ident: &'a str,
}

impl Debug for NonTerminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!(r#"nt{:?}"#, self.ident))
    }
}

impl Display for NonTerminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.ident)
    }
}

/// 空串, 在文法描述中写作 `epsilon`.
pub const EPSILON: Terminal<'static> = Terminal { ident: "epsilon" };
/// 输入结束标记, 同时也是分析栈的栈底.
pub const EOF: Terminal<'static> = Terminal { ident: "$" };

impl<'a> From<&'a str> for NonTerminal<'a> {
    fn from(ident: &'a str) -> Self {
        Self { ident }
    }
}

impl<'a> NonTerminal<'a> {
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        self.ident
    }
}

/// 文法符号, 类别在加载文法时一次性确定, 之后不再按名字查表判断.
#[derive(Clone, Copy, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub enum Token<'a> {
    Terminal(Terminal<'a>),
    NonTerminal(NonTerminal<'a>),
}

impl Debug for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminal(arg0) => f.pad(&format!("{:?}", arg0)),
            Self::NonTerminal(arg0) => f.pad(&format!("{:?}", arg0)),
        }
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminal(arg0) => f.pad(&format!("{}", arg0)),
            Self::NonTerminal(arg0) => f.pad(&format!("{}", arg0)),
        }
    }
}

impl<'a> Token<'a> {
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        match self {
            Self::Terminal(t) => t.as_str(),
            Self::NonTerminal(nt) => nt.as_str(),
        }
    }

    #[must_use]
    pub fn is_term(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    #[must_use]
    pub fn as_term(&self) -> Option<Terminal<'a>> {
        match self {
            Self::Terminal(t) => Some(*t),
            Self::NonTerminal(_) => None,
        }
    }

    #[must_use]
    pub fn as_non_term(&self) -> Option<NonTerminal<'a>> {
        match self {
            Self::NonTerminal(nt) => Some(*nt),
            Self::Terminal(_) => None,
        }
    }
}

impl<'a> From<Terminal<'a>> for Token<'a> {
    fn from(value: Terminal<'a>) -> Self {
        Self::Terminal(value)
    }
}

impl<'a> From<NonTerminal<'a>> for Token<'a> {
    fn from(value: NonTerminal<'a>) -> Self {
        Self::NonTerminal(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reserved_terminals() {
        assert!(Terminal::from("epsilon").is_epsilon());
        assert!(Terminal::from("$").is_eof());
        assert!(!Terminal::from("id").is_eof());
        assert_eq!(format!("{:?}", Token::from(NonTerminal::from("E"))), r#"nt"E""#);
        assert_eq!(Token::from(EOF).to_string(), "$");
    }

    #[test]
    fn token_category() {
        let tok = Token::from(Terminal::from("+"));
        assert_eq!(tok.as_term(), Some(Terminal::from("+")));
        assert_eq!(tok.as_non_term(), None);
        assert!(!Token::from(NonTerminal::from("+")).is_term());
        // 同名不同类的符号不相等.
        assert!(tok != Token::from(NonTerminal::from("+")));
    }
}
