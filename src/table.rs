use std::{
    collections::{BTreeSet, HashMap},
    fmt::Display,
};

use tracing::{debug, info, warn};

use crate::{
    Grammar, NonTerminal, Production, Terminal, Token,
    sets::{FirstSets, FollowSets},
    token::EOF,
};

/// 文法不是 LL(1) 时写出的固定文本.
pub const INVALID_LL1: &str = "invalid LL(1) grammar";

/// 文法不是 LL(1) 文法: 某个表项需要两个或者多个不同的产生式.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict<'a> {
    pub non_term: NonTerminal<'a>,
    pub term: Terminal<'a>,
    /// 竞争同一个表项的产生式, 按照发现顺序排列.
    pub prods: Vec<&'a Production<'a>>,
}

impl Display for Conflict<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prods = self
            .prods
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "{INVALID_LL1}: M[{}, {}] = {{ {prods} }}",
            self.non_term, self.term
        )
    }
}

/// LL(1) 预测分析表, 每个表项最多只有一个产生式, 空表项表示出错.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<'a> {
    /// `cells[非终结符下标][终结符下标]`.
    cells: Vec<Vec<Option<&'a Production<'a>>>>,
    /// 表中的非终结符 (按声明顺序), 下标即为表中的行.
    non_terms: Vec<NonTerminal<'a>>,
    /// 表中的终结符, 下标即为表中的列, [`EOF`] 总在最后一列.
    terms: Vec<Terminal<'a>>,
    term_idxes: HashMap<&'a str, usize>,
    non_term_idxes: HashMap<&'a str, usize>,
    start: NonTerminal<'a>,
}

/// 查找 `nt` 的候选式中能够以 `term` 开头的产生式 (`term` 可以是 [`crate::EPSILON`]).
///
/// 从左到右扫描每个候选式:
/// - 符号就是 `term`, 或者是 FIRST 集包含 `term` 的非终结符: 匹配.
/// - 终结符, 或者 FIRST 集不含空串的非终结符: 不匹配.
/// - 否则这个非终结符可以为空, 继续看下一个符号.
///
/// 结果按声明顺序排列, 结果的数量多于一个说明文法不是 LL(1) 的.
pub fn matching_prods<'a>(
    grammar: &Grammar<'a>,
    first: &FirstSets<'a>,
    nt: NonTerminal<'a>,
    term: Terminal<'_>,
) -> Vec<&'a Production<'a>> {
    grammar
        .prods_of(nt)
        .filter(|prod| {
            for tok in prod.tail() {
                match tok {
                    Token::Terminal(t) => return t.as_str() == term.as_str(),
                    Token::NonTerminal(sub) => {
                        if first.contains(*sub, term) {
                            return true;
                        }
                        if !first.is_nullable(*sub) {
                            return false;
                        }
                    }
                }
            }
            false
        })
        .collect()
}

impl<'a> Table<'a> {
    /// 根据文法以及 FIRST / FOLLOW 集构造预测分析表.
    ///
    /// 终结符集合为产生式中出现的终结符, FIRST / FOLLOW 集中出现的终结符 (除去空串) 以及 [`EOF`] 的并集.
    /// # Errors
    /// 某个表项需要填入两个不同的产生式时返回 [`Conflict`], 此时不会给出任何部分结果.
    pub fn build(
        grammar: &Grammar<'a>,
        first: &FirstSets<'a>,
        follow: &FollowSets<'a>,
    ) -> Result<Self, Conflict<'a>> {
        let non_terms = grammar.non_terms().to_vec();
        let mut term_set: BTreeSet<Terminal<'a>> = grammar.terms().clone();
        term_set.extend(first.terms());
        term_set.extend(follow.terms());
        term_set.remove(&EOF);
        // 这里要求 EOF 一定在最后一列.
        let terms: Vec<_> = term_set.into_iter().chain([EOF]).collect();
        let term_idxes = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();
        let non_term_idxes = non_terms
            .iter()
            .enumerate()
            .map(|(i, nt)| (nt.as_str(), i))
            .collect();
        let mut table = Self {
            cells: vec![vec![None; terms.len()]; non_terms.len()],
            non_terms,
            terms,
            term_idxes,
            non_term_idxes,
            start: grammar.symbol_start(),
        };

        for &nt in grammar.non_terms() {
            for a in first.of(nt) {
                let prods = matching_prods(grammar, first, nt, a);
                if prods.len() > 1 {
                    let conflict = Conflict {
                        non_term: nt,
                        term: a,
                        prods,
                    };
                    warn!("{conflict}");
                    return Err(conflict);
                }
                let Some(&prod) = prods.first() else {
                    if a.is_epsilon() {
                        warn!("{nt} is nullable but no production of {nt} derives epsilon");
                    } else {
                        warn!("{a} in FIRST({nt}) but no production of {nt} starts with it");
                    }
                    continue;
                };
                if prod.tail().first() == Some(&Token::NonTerminal(nt)) {
                    warn!("{prod} is left recursive, parsing with M[{nt}, {a}] will not terminate");
                }
                if a.is_epsilon() {
                    for b in follow.of(nt).filter(|b| !b.is_epsilon()) {
                        table.update(nt, b, prod)?;
                    }
                } else {
                    table.update(nt, a, prod)?;
                }
            }
        }
        info!(
            "LL(1) table built: {} non-terminals x {} terminals",
            table.rows(),
            table.cols()
        );
        Ok(table)
    }

    /// 放入新的表项内容, 已有不同产生式时返回冲突.
    fn update(
        &mut self,
        nt: NonTerminal<'a>,
        term: Terminal<'a>,
        prod: &'a Production<'a>,
    ) -> Result<(), Conflict<'a>> {
        // 构造时已经登记了所有的非终结符和终结符.
        let row = self.non_term_idxes[nt.as_str()];
        let col = self.term_idxes[term.as_str()];
        match self.cells[row][col] {
            Some(old) if old != prod => {
                let conflict = Conflict {
                    non_term: nt,
                    term,
                    prods: vec![old, prod],
                };
                warn!("{conflict}");
                Err(conflict)
            }
            _ => {
                debug!("M[{nt}, {term}] = {prod}");
                self.cells[row][col] = Some(prod);
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.non_terms.len()
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn symbol_start(&self) -> NonTerminal<'a> {
        self.start
    }

    #[must_use]
    pub fn terms(&self) -> &[Terminal<'a>] {
        &self.terms
    }

    #[must_use]
    pub fn non_terms(&self) -> &[NonTerminal<'a>] {
        &self.non_terms
    }

    /// 查询表项 `M[nt, term]`.
    /// # Returns
    /// 表中没有这个非终结符或者终结符, 或者表项为空, 都返回 [`None`].
    #[must_use]
    pub fn get(&self, nt: NonTerminal<'_>, term: Terminal<'_>) -> Option<&'a Production<'a>> {
        let row = *self.non_term_idxes.get(nt.as_str())?;
        let col = *self.term_idxes.get(term.as_str())?;
        self.cells[row][col]
    }

    /// 按行优先的顺序遍历所有表项, 包括空表项.
    pub fn cells(
        &self,
    ) -> impl Iterator<Item = (NonTerminal<'a>, Terminal<'a>, Option<&'a Production<'a>>)> + '_ {
        let terms = &self.terms;
        self.non_terms.iter().zip(&self.cells).flat_map(move |(&nt, row)| {
            terms
                .iter()
                .zip(row)
                .map(move |(&term, &cell)| (nt, term, cell))
        })
    }

    /// 每个非空表项输出一行 `A : a : X Y Z`.
    ///
    /// `all_cells` 为真时空表项也会输出, 右侧为空, 可以和 `epsilon` 区分.
    #[must_use]
    pub fn to_text(&self, all_cells: bool) -> String {
        self.cells()
            .filter(|(_, _, cell)| all_cells || cell.is_some())
            .map(|(nt, term, cell)| {
                let tail = cell.map(|p| p.tail_str()).unwrap_or_default();
                format!("{nt} : {term} : {tail}\n")
            })
            .collect()
    }

    /// 使用 markdown 形式输出表格.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let header_line = "| |".to_string()
            + &self
                .terms
                .iter()
                .map(|t| format!(" `{}` |", t.as_str()))
                .collect::<String>();
        let sep_line: String =
            String::from("| - |") + &std::iter::repeat_n(" - |", self.terms.len()).collect::<String>();
        let mut data_lines = String::new();
        for (nt, row) in self.non_terms.iter().zip(&self.cells) {
            let line = format!("| `{nt}` |")
                + &row
                    .iter()
                    .map(|cell| match cell {
                        Some(prod) => format!(" {prod} |"),
                        None => "  |".to_string(),
                    })
                    .collect::<String>();
            data_lines += &line;
            data_lines += "\n";
        }
        format!("{header_line}\n{sep_line}\n{}", data_lines.trim_end())
    }
}

#[cfg(test)]
mod test {
    use bumpalo::Bump;

    use super::{INVALID_LL1, Table, matching_prods};
    use crate::{
        NonTerminal, Terminal, Token,
        loader::parse_grammar,
        token::{EOF, EPSILON},
    };
    use pretty_assertions::assert_eq;

    const EXPR: &str = "
E : T E' : id : $
E' : + T E' | epsilon : + epsilon : $
T : id : id : + $
";

    #[test]
    fn expr_table() {
        let bump = Bump::new();
        let loaded = parse_grammar(EXPR, &bump).unwrap();
        let table = Table::build(&loaded.grammar, &loaded.first, &loaded.follow).unwrap();
        assert_eq!(
            table.terms(),
            &[Terminal::from("+"), Terminal::from("id"), EOF]
        );
        assert_eq!(
            table.to_text(false),
            "E : id : T E'
E' : + : + T E'
E' : $ : epsilon
T : id : id
"
        );
        assert_eq!(
            table.to_text(true),
            concat!(
                "E : + : \n",
                "E : id : T E'\n",
                "E : $ : \n",
                "E' : + : + T E'\n",
                "E' : id : \n",
                "E' : $ : epsilon\n",
                "T : + : \n",
                "T : id : id\n",
                "T : $ : \n",
            )
        );
        assert!(table.get("E".into(), "+".into()).is_none());
        assert!(table.get("E".into(), "unknown".into()).is_none());
        assert!(table.get("X".into(), "id".into()).is_none());
    }

    #[test]
    fn markdown_table() {
        let bump = Bump::new();
        let loaded = parse_grammar(EXPR, &bump).unwrap();
        let table = Table::build(&loaded.grammar, &loaded.first, &loaded.follow).unwrap();
        assert_eq!(
            table.to_markdown(),
            r#"
| | `+` | `id` | `$` |
| - | - | - | - |
| `E` |  | E -> T E' |  |
| `E'` | E' -> + T E' |  | E' -> epsilon |
| `T` |  | T -> id |  |
"#
            .trim()
        );
    }

    #[test]
    fn matching_skips_nullable_prefix() {
        let bump = Bump::new();
        let loaded = parse_grammar(
            "S : A b | c : a b c : $
A : a | epsilon : a epsilon : b",
            &bump,
        )
        .unwrap();
        let s = NonTerminal::from("S");
        let found = |t: &str| {
            matching_prods(&loaded.grammar, &loaded.first, s, t.into())
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(found("a"), vec!["S -> A b"]);
        // A 可以为空, 看下一个符号 b.
        assert_eq!(found("b"), vec!["S -> A b"]);
        assert_eq!(found("c"), vec!["S -> c"]);
        assert_eq!(found("d"), Vec::<String>::new());
        let a = matching_prods(&loaded.grammar, &loaded.first, "A".into(), EPSILON);
        assert_eq!(a.len(), 1);
        assert!(a[0].is_empty());
    }

    #[test]
    fn conflict_same_prefix() {
        let bump = Bump::new();
        let loaded = parse_grammar("S : a | a b : a : $", &bump).unwrap();
        let conflict = Table::build(&loaded.grammar, &loaded.first, &loaded.follow).unwrap_err();
        assert_eq!(conflict.non_term, "S".into());
        assert_eq!(conflict.term, "a".into());
        assert_eq!(conflict.prods.len(), 2);
        assert!(conflict.to_string().starts_with(INVALID_LL1));
    }

    #[test]
    fn conflict_first_follow_overlap() {
        // A -> a | epsilon, 且 a 在 FOLLOW(A) 中.
        let bump = Bump::new();
        let loaded = parse_grammar(
            "S : A a : a : $
A : a | epsilon : a epsilon : a",
            &bump,
        )
        .unwrap();
        let conflict = Table::build(&loaded.grammar, &loaded.first, &loaded.follow).unwrap_err();
        assert_eq!(conflict.non_term, "A".into());
        assert_eq!(conflict.term, "a".into());
    }

    #[test]
    fn tolerate_inconsistent_first() {
        // FIRST(S) 中的 x 没有对应的产生式, 表项留空.
        let bump = Bump::new();
        let loaded = parse_grammar("S : a : a x : $", &bump).unwrap();
        let table = Table::build(&loaded.grammar, &loaded.first, &loaded.follow).unwrap();
        assert!(table.get("S".into(), "x".into()).is_none());
        assert_eq!(table.to_text(false), "S : a : a\n");
    }

    #[test]
    fn conflict_multiple_epsilon_prods() {
        // S -> A 和 S -> epsilon 都能推导出空串.
        let bump = Bump::new();
        let loaded = parse_grammar(
            "S : A | epsilon : a epsilon : $
A : a | epsilon : a epsilon : $",
            &bump,
        )
        .unwrap();
        let conflict = Table::build(&loaded.grammar, &loaded.first, &loaded.follow).unwrap_err();
        assert_eq!(conflict.non_term, "S".into());
        assert_eq!(conflict.term, EPSILON);
        let prods: Vec<_> = conflict.prods.iter().map(|p| p.to_string()).collect();
        assert_eq!(prods, vec!["S -> A", "S -> epsilon"]);
    }

    #[test]
    fn tolerate_nullable_without_epsilon_prod() {
        // FIRST(S) 含 epsilon, 但没有能推导出空串的产生式, FOLLOW 列留空.
        let bump = Bump::new();
        let loaded = parse_grammar("S : a : a epsilon : $", &bump).unwrap();
        let table = Table::build(&loaded.grammar, &loaded.first, &loaded.follow).unwrap();
        assert!(table.get("S".into(), EOF).is_none());
        assert_eq!(table.to_text(false), "S : a : a\n");
    }

    #[test]
    fn left_recursive_prod_is_kept() {
        // 与文法不一致的 FIRST 集会选中左递归产生式, 构造本身不会失败.
        let bump = Bump::new();
        let loaded = parse_grammar("A : A a : a : $", &bump).unwrap();
        let table = Table::build(&loaded.grammar, &loaded.first, &loaded.follow).unwrap();
        let prod = table.get("A".into(), "a".into()).unwrap();
        assert_eq!(prod.tail().first(), Some(&Token::from(NonTerminal::from("A"))));
    }

    #[test]
    fn deterministic() {
        let bump = Bump::new();
        let loaded = parse_grammar(EXPR, &bump).unwrap();
        let a = Table::build(&loaded.grammar, &loaded.first, &loaded.follow).unwrap();
        let b = Table::build(&loaded.grammar, &loaded.first, &loaded.follow).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_text(true), b.to_text(true));
    }

    #[test]
    fn nullable_rows_follow_epsilon() {
        let bump = Bump::new();
        let loaded = parse_grammar(
            "S : A B c : a b c : $
A : a | epsilon : a epsilon : b c
B : b | epsilon : b epsilon : c",
            &bump,
        )
        .unwrap();
        let table = Table::build(&loaded.grammar, &loaded.first, &loaded.follow).unwrap();
        // 每个表项都至多一个产生式 (Option), 并且可空非终结符的 FOLLOW 列都是空产生式.
        assert_eq!(table.cells().count(), table.rows() * table.cols());
        for &nt in loaded.grammar.non_terms() {
            if loaded.first.is_nullable(nt) {
                for b in loaded.follow.of(nt) {
                    let prod = table.get(nt, b).unwrap();
                    assert!(prod.is_empty(), "M[{nt}, {b}] = {prod}");
                }
            }
        }
        assert_eq!(table.get("S".into(), "c".into()).unwrap().to_string(), "S -> A B c");
    }
}
