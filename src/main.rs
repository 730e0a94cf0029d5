use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use bumpalo::Bump;
use clap::Parser;
use ll1_predict::{
    Table,
    loader::{parse_grammar, parse_tokens},
    parse,
    table::INVALID_LL1,
};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{Layer, fmt, layer::SubscriberExt, registry, util::SubscriberInitExt};

/// 根据带有 FIRST / FOLLOW 集的文法构造 LL(1) 预测分析表, 并判断输入串是否属于该文法.
#[derive(clap::Parser)]
#[clap(version, about)]
struct AppArgs {
    /// 文法描述文件, 每行 `A : 候选式 | ... : FIRST : FOLLOW`.
    #[clap(short, long)]
    grammar: PathBuf,
    /// 输入串文件, 一行以空格分隔的终结符.
    #[clap(short, long)]
    input: Option<PathBuf>,
    #[clap(long, default_value = "ll1_table.txt")]
    table_out: PathBuf,
    #[clap(long, default_value = "verdict.txt")]
    verdict_out: PathBuf,
    /// 空表项也输出一行, 右侧为空.
    #[clap(long)]
    all_cells: bool,
    /// 在标准输出打印 markdown 格式的分析表.
    #[clap(long)]
    markdown: bool,
    /// 日志详细程度, 可以重复.
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(thiserror::Error, Debug)]
enum AppError {
    #[error("{path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Grammar(#[from] ll1_predict::error::Error),
}

fn read(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &str) -> Result<(), AppError> {
    fs::write(path, contents).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn main() -> ExitCode {
    let args = AppArgs::parse();

    let level = match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let layer = fmt::layer()
        .without_time()
        .with_writer(io::stderr)
        .with_filter(level);
    registry().with(layer).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &AppArgs) -> Result<(), AppError> {
    let bump = Bump::new();
    let text = read(&args.grammar)?;
    let loaded = parse_grammar(&text, &bump)?;
    let table = match Table::build(&loaded.grammar, &loaded.first, &loaded.follow) {
        Ok(table) => table,
        Err(conflict) => {
            info!("no parsing performed, {conflict}");
            return write(&args.table_out, INVALID_LL1);
        }
    };
    write(&args.table_out, &table.to_text(args.all_cells))?;
    info!("table written to {}", args.table_out.display());
    if args.markdown {
        println!("{}", table.to_markdown());
    }

    if let Some(input) = &args.input {
        let tokens = read(input)?;
        let verdict = parse(&table, parse_tokens(&tokens));
        write(&args.verdict_out, &verdict.to_string())?;
        info!(
            "input {} accepted, verdict written to {}",
            if verdict.is_accepted() { "is" } else { "is not" },
            args.verdict_out.display()
        );
    }
    Ok(())
}
