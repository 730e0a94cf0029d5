//! 预先计算好的 FIRST / FOLLOW 集.

use std::collections::{BTreeSet, HashMap};

use crate::{NonTerminal, Terminal, token::EPSILON};

/// 非终结符到终结符集合的映射.
///
/// FIRST 集中可以含有 [`EPSILON`], FOLLOW 集中可以含有 [`crate::token::EOF`], 这里不做校验.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalSets<'a> {
    sets: HashMap<NonTerminal<'a>, BTreeSet<Terminal<'a>>>,
}

pub type FirstSets<'a> = TerminalSets<'a>;
pub type FollowSets<'a> = TerminalSets<'a>;

impl<'a> TerminalSets<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 向某个非终结符的集合中加入终结符.
    pub fn extend(&mut self, nt: NonTerminal<'a>, terms: impl IntoIterator<Item = Terminal<'a>>) {
        self.sets.entry(nt).or_default().extend(terms);
    }

    /// 获取某个非终结符的集合, 没有记录时视为空集.
    pub fn of(&self, nt: NonTerminal<'a>) -> impl Iterator<Item = Terminal<'a>> + '_ {
        self.sets.get(&nt).into_iter().flatten().copied()
    }

    #[must_use]
    pub fn contains(&self, nt: NonTerminal<'a>, term: Terminal<'_>) -> bool {
        self.sets
            .get(&nt)
            .is_some_and(|s| s.iter().any(|t| t.as_str() == term.as_str()))
    }

    /// 非终结符是否可以推导出空串.
    #[must_use]
    pub fn is_nullable(&self, nt: NonTerminal<'a>) -> bool {
        self.contains(nt, EPSILON)
    }

    /// 所有集合中出现的终结符, 不含 [`EPSILON`].
    pub fn terms(&self) -> impl Iterator<Item = Terminal<'a>> + '_ {
        self.sets
            .values()
            .flatten()
            .copied()
            .filter(|t| !t.is_epsilon())
    }
}

impl<'a, I> FromIterator<(NonTerminal<'a>, I)> for TerminalSets<'a>
where
    I: IntoIterator<Item = Terminal<'a>>,
{
    fn from_iter<T: IntoIterator<Item = (NonTerminal<'a>, I)>>(iter: T) -> Self {
        let mut sets = Self::new();
        for (nt, terms) in iter {
            sets.extend(nt, terms);
        }
        sets
    }
}
