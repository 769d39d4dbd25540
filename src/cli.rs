use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::StoreBuilder;
use crate::consts::DEFAULT_SCRATCH_FILE;
use crate::entry::{DocBlock, Entry, Section, SrcLang};
use crate::metrics::{self, MetricsSnapshot};
use crate::nav::EntryTree;
use crate::store::{hex_dump, Store, StoreStats};

#[derive(Parser, Debug)]
#[command(
    name = "entrydb",
    version,
    about = "Out-of-core entry store: scratch-file benchmark and block dumps",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Построить синтетический лес записей, записать, перечитать, освободить.
    Bench {
        /// Scratch‑файл; по умолчанию entrydb.scratch во временном каталоге.
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long, default_value_t = 10_000)]
        nodes: usize,
        #[arg(long, default_value_t = 8)]
        fanout: usize,
        #[arg(long)]
        block_size: Option<u64>,
        /// Оставить scratch‑файл после завершения.
        #[arg(long, default_value_t = false)]
        keep: bool,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Hex‑дамп диапазона [from, to) scratch‑файла (только чтение).
    Dump {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value_t = 0)]
        from: u64,
        #[arg(long, default_value_t = 1024)]
        to: u64,
    },
}

#[derive(Debug, Serialize)]
struct BenchReport {
    nodes: usize,
    fanout: usize,
    commit_ms: f64,
    reload_ms: f64,
    reclaim_ms: f64,
    store: StoreStats,
    metrics: MetricsSnapshot,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Bench {
            path,
            nodes,
            fanout,
            block_size,
            keep,
            json,
        } => {
            let path = path.unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_SCRATCH_FILE));
            let report = bench(&path, nodes, fanout, block_size, keep)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Cmd::Dump { path, from, to } => {
            print!("{}", dump_file(&path, from, to)?);
        }
    }
    Ok(())
}

/// Лес из `n` записей: у узла i родитель (i-1)/fanout, порядок детей — по возрастанию i.
pub fn synthetic_forest(n: usize, fanout: usize) -> Result<Entry> {
    if n == 0 || fanout == 0 {
        return Err(anyhow!("bench: nodes and fanout must be > 0"));
    }
    let mut entries: Vec<Entry> = (0..n).map(synthetic_entry).collect();
    for i in (1..n).rev() {
        let mut e = entries
            .pop()
            .ok_or_else(|| anyhow!("bench: forest underflow at {}", i))?;
        // дети e (индексы > i) уже присоединены, в обратном порядке
        e.children.reverse();
        entries[(i - 1) / fanout].children.push(e);
    }
    let mut root = entries
        .pop()
        .ok_or_else(|| anyhow!("bench: empty forest"))?;
    root.children.reverse();
    Ok(root)
}

fn synthetic_entry(i: usize) -> Entry {
    let section = match i % 4 {
        0 => Section::Class,
        1 => Section::Function,
        2 => Section::Variable,
        _ => Section::Typedef,
    };
    let mut e = Entry::new(section, format!("sym{}", i));
    e.type_name = if section == Section::Function { "void".into() } else { String::new() };
    e.lang = SrcLang::Cpp;
    // разный размер документации, чтобы часть записей занимала несколько блоков
    e.doc = DocBlock::new(
        format!("Documentation for sym{}. ", i).repeat(1 + i % 40),
        "bench.h",
        i as i32,
    );
    e.start_line = i as i32 + 1;
    e
}

fn bench(
    path: &Path,
    nodes: usize,
    fanout: usize,
    block_size: Option<u64>,
    keep: bool,
) -> Result<BenchReport> {
    let mut b = StoreBuilder::new().remove_on_close(!keep);
    if let Some(bs) = block_size {
        b = b.block_size(bs);
    }
    let mut store = Store::open_with_config(path, b.build())?;
    metrics::reset();

    let forest = synthetic_forest(nodes, fanout)?;
    let t0 = Instant::now();
    let mut tree = EntryTree::new();
    let root = tree.commit_subtree(None, forest, &mut store)?;
    let commit_ms = t0.elapsed().as_secs_f64() * 1e3;

    let t1 = Instant::now();
    let ids: Vec<_> = tree.walk(root).collect();
    for &id in &ids {
        tree.load(id, &mut store)?;
        let expect = tree.node(id).map(|n| n.name().to_string()).unwrap_or_default();
        let got = tree.entry(id).map(|e| e.name.as_str()).unwrap_or("");
        if got != expect {
            return Err(anyhow!(
                "bench: node {} reloaded as '{}', expected '{}'",
                id,
                got,
                expect
            ));
        }
        tree.release(id)?;
    }
    let reload_ms = t1.elapsed().as_secs_f64() * 1e3;

    let t2 = Instant::now();
    for &id in &ids {
        tree.reclaim(id, &mut store)?;
    }
    let reclaim_ms = t2.elapsed().as_secs_f64() * 1e3;

    let report = BenchReport {
        nodes: ids.len(),
        fanout,
        commit_ms,
        reload_ms,
        reclaim_ms,
        store: store.stats(),
        metrics: metrics::snapshot(),
    };
    store.close()?;
    Ok(report)
}

fn print_report(r: &BenchReport) {
    println!("Bench: nodes={} fanout={}", r.nodes, r.fanout);
    println!("  commit   = {:.2} ms", r.commit_ms);
    println!("  reload   = {:.2} ms", r.reload_ms);
    println!("  reclaim  = {:.2} ms", r.reclaim_ms);
    println!("  block_size     = {}", r.store.block_size);
    println!("  total_blocks   = {}", r.store.total_blocks);
    println!("  blocks_written = {}", r.store.blocks_written);
    println!("  blocks_read    = {}", r.store.blocks_read);
    println!("  free_blocks    = {}", r.store.free_blocks);
    println!("  reused_blocks  = {}", r.store.reused_blocks);
    println!("  reload_ratio   = {:.2}", r.metrics.reload_ratio());
}

/// Дамп сырого файла без открытия Store (Store::open усекает файл).
fn dump_file(path: &Path, from: u64, to: u64) -> Result<String> {
    if to < from {
        return Err(anyhow!("dump range is inverted: {}..{}", from, to));
    }
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    f.seek(SeekFrom::Start(from))
        .with_context(|| format!("seek {} to {}", path.display(), from))?;
    let mut buf = Vec::new();
    f.take(to - from)
        .read_to_end(&mut buf)
        .with_context(|| format!("read {}..{} of {}", from, to, path.display()))?;
    Ok(hex_dump(from, &buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_forest_shape() {
        let root = synthetic_forest(10, 3).unwrap();
        assert_eq!(root.count_nodes(), 10);
        let names: Vec<_> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["sym1", "sym2", "sym3"]);
        assert_eq!(root.children[0].children[0].name, "sym4");
        assert_eq!(root.children[1].children[2].name, "sym9");
        assert!(root.children[2].children.is_empty());
        assert!(synthetic_forest(0, 3).is_err());
    }
}
