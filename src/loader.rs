//! 文本格式的文法描述和输入串的读取.
//!
//! 文法描述每行一个非终结符, 由 `:` 分成四个字段:
//! ```text
//! E' : + T E' | epsilon : + epsilon : $
//! ```
//! 依次为产生式头部, 以 `|` 分隔的候选式, FIRST 集, FOLLOW 集. 第一行的头部为起始符.

use std::collections::HashSet;

use bumpalo::Bump;

use crate::{
    Grammar, NonTerminal, Production, Terminal, Token,
    error::{Error, ParseRuleError},
    sets::{FirstSets, FollowSets},
    token::{EOF, EPSILON},
};

/// 读取出来的文法以及对应的 FIRST / FOLLOW 集.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedGrammar<'a> {
    pub grammar: Grammar<'a>,
    pub first: FirstSets<'a>,
    pub follow: FollowSets<'a>,
}

struct Rule<'a> {
    line: usize,
    head: &'a str,
    alternatives: &'a str,
    first: &'a str,
    follow: &'a str,
}

/// 解析文法描述.
/// # Errors
/// - [`Error::ParseRuleError`] 某一行格式错误, 行号从 0 开始.
/// - [`Error::EmptyGrammar`] 没有任何规则.
pub fn parse_grammar<'a>(s: &'a str, bump: &'a Bump) -> Result<LoadedGrammar<'a>, Error> {
    let mut rules = Vec::new();
    let mut non_terminals = HashSet::new();
    // 先找出所有的非终结符.
    for (line_num, line) in s
        .lines()
        .enumerate()
        .filter(|(_, s)| s.chars().any(|c| !c.is_whitespace()))
    {
        let fields: Vec<&str> = line.split(':').collect();
        let [head, alternatives, first, follow] = fields[..] else {
            return Err(Error::parse_rule_error(
                line_num,
                ParseRuleError::FieldCount(fields.len()),
            ));
        };
        let head = head.trim();
        if head.is_empty() {
            Err(Error::parse_rule_error(line_num, ParseRuleError::EmptyRuleId))?
        }
        if head == EPSILON.as_str() || head == EOF.as_str() {
            Err(Error::parse_rule_error(
                line_num,
                ParseRuleError::ReservedSymbol(head.to_string()),
            ))?
        }
        if !non_terminals.insert(head) {
            Err(Error::parse_rule_error(
                line_num,
                ParseRuleError::DuplicateRule(head.to_string()),
            ))?
        }
        rules.push(Rule {
            line: line_num,
            head,
            alternatives,
            first,
            follow,
        });
    }
    let start = NonTerminal::from(rules.first().ok_or(Error::EmptyGrammar)?.head);

    let mut prods = Vec::new();
    let mut first = FirstSets::new();
    let mut follow = FollowSets::new();
    for rule in &rules {
        let head = NonTerminal::from(rule.head);
        for alternative in rule.alternatives.split('|') {
            let tail = parse_alternative(alternative, &non_terminals)
                .map_err(|cause| Error::parse_rule_error(rule.line, cause))?;
            prods.push(Production::new(head, tail));
        }
        first.extend(head, parse_terminals(rule.first, &non_terminals, rule.line)?);
        follow.extend(head, parse_terminals(rule.follow, &non_terminals, rule.line)?);
    }
    let grammar = Grammar::new(start, prods, bump)?;
    Ok(LoadedGrammar {
        grammar,
        first,
        follow,
    })
}

fn parse_alternative<'a>(
    alternative: &'a str,
    non_terminals: &HashSet<&str>,
) -> Result<Vec<Token<'a>>, ParseRuleError> {
    let tail: Vec<Token<'a>> = alternative
        .split_ascii_whitespace()
        .map(|s| {
            if non_terminals.contains(s) {
                Ok(NonTerminal::from(s).into())
            } else if s == EOF.as_str() {
                Err(ParseRuleError::ReservedSymbol(s.to_string()))
            } else {
                Ok(Terminal::from(s).into())
            }
        })
        .collect::<Result<_, _>>()?;
    if tail.is_empty() {
        Err(ParseRuleError::EmptyProduction)?
    }
    if tail.len() > 1 && tail.contains(&EPSILON.into()) {
        Err(ParseRuleError::EpsilonNotAlone)?
    }
    Ok(tail)
}

fn parse_terminals<'a>(
    field: &'a str,
    non_terminals: &HashSet<&str>,
    line: usize,
) -> Result<Vec<Terminal<'a>>, Error> {
    field
        .split_ascii_whitespace()
        .map(|s| {
            if non_terminals.contains(s) {
                Err(Error::parse_rule_error(
                    line,
                    ParseRuleError::TokenTypeMisMatch(s.to_string()),
                ))
            } else {
                Ok(Terminal::from(s))
            }
        })
        .collect()
}

/// 读取输入串, 只使用第一行, 以空白分隔. 末尾的 `$` 由分析器补上.
#[must_use]
pub fn parse_tokens(s: &str) -> Vec<Terminal<'_>> {
    s.lines()
        .next()
        .unwrap_or_default()
        .split_ascii_whitespace()
        .map(Terminal::from)
        .collect()
}
