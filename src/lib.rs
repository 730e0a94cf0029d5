pub mod error;
pub mod grammar;
pub mod loader;
pub mod parser;
pub mod sets;
pub mod table;
pub mod token;

pub use grammar::{Grammar, Production};
pub use parser::{Verdict, parse};
pub use sets::{FirstSets, FollowSets};
pub use table::{Conflict, Table};
pub use token::{EOF, EPSILON, NonTerminal, Terminal, Token};
