use bumpalo::Bump;
use std::{
    collections::{BTreeSet, HashSet},
    fmt::{Debug, Display},
};

use crate::{NonTerminal, Terminal, Token, error::Error, token::EPSILON};

#[derive(Clone, Hash, PartialOrd, Ord)]
pub struct Production<'a> {
    // 产生式左侧的非终结符.
    head: NonTerminal<'a>,
    // 产生式右侧的符号序列, 空产生式为 `[EPSILON]`.
    tail: Vec<Token<'a>>,
}

impl Debug for Production<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Production")
            .field(&format_args!(
                "{:?} -> {}",
                self.head,
                self.tail
                    .iter()
                    .map(|t| format!("{:?} ", t))
                    .collect::<String>()
                    .trim_end()
            ))
            .finish()
    }
}

impl Display for Production<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!("{} -> {}", self.head, self.tail_str()))
    }
}

impl PartialEq for Production<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head && self.tail == other.tail
    }
}

impl Eq for Production<'_> {}

impl<'a> Production<'a> {
    #[must_use]
    pub fn new(head: NonTerminal<'a>, tail: Vec<Token<'a>>) -> Self {
        Self { head, tail }
    }

    #[must_use]
    pub fn head(&self) -> NonTerminal<'a> {
        self.head
    }

    #[must_use]
    pub fn tail(&self) -> &[Token<'a>] {
        &self.tail
    }

    pub fn tail_without_eps(&self) -> impl DoubleEndedIterator<Item = &Token<'a>> {
        self.tail
            .iter()
            .filter(|tok| !matches!(tok, Token::Terminal(t) if t.is_epsilon()))
    }

    /// 产生式尾部以空格分隔的文本形式, 空产生式输出 `epsilon`.
    #[must_use]
    pub fn tail_str(&self) -> String {
        self.tail
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// 产生式尾部的 tokens 数量, [`EPSILON`] 不算长度.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tail_without_eps().count()
    }

    /// 是否是空产生式 `A -> epsilon`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct Grammar<'a> {
    /// 按声明顺序排列的全部产生式.
    prods: Vec<&'a Production<'a>>,
    /// 按声明顺序排列的非终结符, 第一个即为起始符.
    non_terms: Vec<NonTerminal<'a>>,
    /// 产生式中出现过的终结符, 不含 [`EPSILON`].
    terms: BTreeSet<Terminal<'a>>,
    start: NonTerminal<'a>,
}

impl PartialEq for Grammar<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.prods == other.prods && self.start == other.start && self.non_terms == other.non_terms
    }
}

impl Eq for Grammar<'_> {}

impl<'a> Grammar<'a> {
    /// 由产生式构造文法, 产生式会被分配到 `bump` 中.
    ///
    /// 非终结符的顺序为其作为产生式头部第一次出现的顺序.
    /// # Errors
    /// - [`Error::EmptyGrammar`] 没有任何产生式.
    /// - [`Error::NonTerminalNotFound`] 起始符或者产生式尾部的非终结符没有对应的产生式.
    pub fn new(
        start: NonTerminal<'a>,
        prods: impl IntoIterator<Item = Production<'a>>,
        bump: &'a Bump,
    ) -> Result<Self, Error> {
        let prods: Vec<&'a Production<'a>> =
            prods.into_iter().map(|p| &*bump.alloc(p)).collect();
        if prods.is_empty() {
            Err(Error::EmptyGrammar)?
        }
        let mut seen = HashSet::new();
        let non_terms: Vec<_> = prods
            .iter()
            .map(|p| p.head())
            .filter(|nt| seen.insert(*nt))
            .collect();
        if !seen.contains(&start) {
            Err(Error::NonTerminalNotFound(start.as_str().to_string()))?
        }
        let mut terms = BTreeSet::new();
        for tok in prods.iter().flat_map(|p| p.tail_without_eps()) {
            match tok {
                Token::Terminal(t) => {
                    terms.insert(*t);
                }
                Token::NonTerminal(nt) if !seen.contains(nt) => {
                    Err(Error::NonTerminalNotFound(nt.as_str().to_string()))?
                }
                Token::NonTerminal(_) => {}
            }
        }
        Ok(Self {
            prods,
            non_terms,
            terms,
            start,
        })
    }

    /// 按声明顺序遍历产生式.
    pub fn prods(&self) -> &[&'a Production<'a>] {
        &self.prods
    }

    /// 获取以某个非终结符为头部的所有产生式, 保持声明顺序, 结果可能为空.
    pub fn prods_of(&self, nt: NonTerminal<'a>) -> impl Iterator<Item = &'a Production<'a>> + '_ {
        self.prods.iter().copied().filter(move |p| p.head == nt)
    }

    #[must_use]
    pub fn non_terms(&self) -> &[NonTerminal<'a>] {
        &self.non_terms
    }

    #[must_use]
    pub fn terms(&self) -> &BTreeSet<Terminal<'a>> {
        &self.terms
    }

    #[must_use]
    pub fn symbol_start(&self) -> NonTerminal<'a> {
        self.start
    }
}

/// 空产生式的尾部.
#[must_use]
pub fn epsilon_tail<'a>() -> Vec<Token<'a>> {
    vec![EPSILON.into()]
}
