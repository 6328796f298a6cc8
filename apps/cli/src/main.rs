//! AI Storage Pilot 命令行入口

mod commands;
mod config;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ai-storage",
    version,
    about = "AI 存储助手：扫描、规划并安全清理本地存储"
)]
struct Cli {
    /// 配置文件路径（默认 ~/.config/ai-storage-pilot/config.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 扫描目录：统计、大文件、重复与开发工件
    Scan {
        /// 覆盖配置中的扫描路径
        paths: Vec<PathBuf>,
        /// 输出完整 JSON 结果
        #[arg(long)]
        json: bool,
    },
    /// 生成清理计划，不触碰任何文件
    Plan {
        paths: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// 执行清理计划；缺省演练，--execute 才真正落盘
    Apply {
        paths: Vec<PathBuf>,
        /// 真正执行（默认只演练并记录）
        #[arg(long)]
        execute: bool,
        /// 跳过交互批准，整批放行
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// 查看审计日志
    Log {
        /// 只显示最近 N 条
        #[arg(long, default_value_t = 20)]
        tail: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    ai_storage_common::init_logging(cli.verbose);
    let config = config::AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Scan { paths, json } => commands::scan::run(&config, &paths, json).await,
        Command::Plan { paths, json } => commands::plan::run(&config, &paths, json).await,
        Command::Apply {
            paths,
            execute,
            yes,
        } => commands::apply::run(&config, &paths, execute, yes).await,
        Command::Log { tail } => commands::log::run(&config, tail),
    }
}
