//! 表驱动的预测分析.
//!
//! ```text
//! 栈初始为 [$, S], 令 a 为输入的第一个符号;
//! while (栈非空) {
//!     弹出栈顶 X;
//!     if (X 是非终结符) {
//!         if (M[X, a] 为空) 出错;
//!         else 将 M[X, a] 的右部逆序压栈 (空产生式什么都不压);
//!     } else if (X == a) {
//!         if (X == $) 接受;
//!         令 a 为下一个输入符号;
//!     } else 出错;
//! }
//! ```

use std::fmt::Display;

use tracing::{debug, info};

use crate::{Table, Terminal, Token, token::EOF};

/// 分析结果.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Accepted => "yes",
            Self::Rejected => "no",
        })
    }
}

impl Verdict {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// 使用预测分析表判断输入串能否由起始符推导出来.
///
/// 输入末尾没有 [`EOF`] 时会自动补上. 只有栈底的 `$` 与输入的最后一个 `$` 相遇时才接受,
/// 输入中间出现的 `$` 会导致拒绝.
pub fn parse<'t>(table: &Table<'_>, tokens: impl IntoIterator<Item = Terminal<'t>>) -> Verdict {
    let mut input: Vec<Terminal<'t>> = tokens.into_iter().collect();
    if input.last().is_none_or(|t| !t.is_eof()) {
        input.push(EOF);
    }
    let mut stack: Vec<Token> = vec![EOF.into(), table.symbol_start().into()];
    let mut cursor = 0;

    while let Some(top) = stack.pop() {
        // 只有匹配普通终结符时才前进, 最后一个输入一定是 EOF, 所以不会越界.
        let la = input[cursor];
        debug!("stack: {stack:?}, top: {top}, lookahead: {la}, cursor: {cursor}");
        match top {
            Token::NonTerminal(nt) => match table.get(nt, la) {
                None => {
                    info!("rejected: M[{nt}, {la}] is empty");
                    return Verdict::Rejected;
                }
                Some(prod) if prod.is_empty() => {
                    debug!("apply {prod}");
                }
                Some(prod) => {
                    debug!("apply {prod}");
                    stack.extend(prod.tail_without_eps().rev().copied());
                }
            },
            Token::Terminal(t) if t.is_eof() => {
                return if la.is_eof() && cursor + 1 == input.len() {
                    info!("accepted");
                    Verdict::Accepted
                } else {
                    info!("rejected: input remains at {cursor} after the stack is exhausted");
                    Verdict::Rejected
                };
            }
            Token::Terminal(t) => {
                if la.is_eof() {
                    info!("rejected: expected {t}, input ended");
                    return Verdict::Rejected;
                }
                if t.as_str() != la.as_str() {
                    info!("rejected: expected {t}, found {la} at {cursor}");
                    return Verdict::Rejected;
                }
                cursor += 1;
            }
        }
    }
    // 栈底的 EOF 一定会在上面返回.
    Verdict::Rejected
}
