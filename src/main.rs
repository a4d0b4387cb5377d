// ==========================================
// 易腐库存处置系统 - 命令行入口
// ==========================================
// 命令: donate / sweep / candidates / history / audit
// 输出: 结构化 JSON 响应（stdout），日志走 stderr
// ==========================================

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, SubsecRound};
use clap::{Parser, Subcommand};
use serde::Serialize;

use perishable_disposition::api::CommandResponse;
use perishable_disposition::app::{get_default_db_path, AppState};
use perishable_disposition::logging;

#[derive(Parser)]
#[command(
    name = "perishable-disposition",
    version,
    about = "易腐库存处置系统 - 捐赠分配与过期清理"
)]
struct Cli {
    /// 数据库文件路径
    #[arg(long, global = true)]
    db: Option<String>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 从批次捐赠指定数量
    Donate {
        #[arg(long)]
        batch: i64,
        #[arg(long)]
        recipient: i64,
        #[arg(long)]
        quantity: i64,
    },
    /// 报废所有已过期的可处置批次
    Sweep {
        /// 参考日期（YYYY-MM-DD，默认今天）
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// 列出即将过期的捐赠候选
    Candidates {
        /// 时间窗口（天，默认读取配置）
        #[arg(long)]
        horizon_days: Option<u32>,
        /// 参考日期（YYYY-MM-DD，默认今天）
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// 查看批次处置历史
    History {
        #[arg(long)]
        batch: i64,
    },
    /// 检查批次与处置日志的一致性
    Audit,
}

fn print_response<T: Serialize>(resp: &CommandResponse<T>) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(resp)?);
    Ok(resp.is_ok())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let db_path = cli.db.unwrap_or_else(get_default_db_path);
    tracing::info!(version = perishable_disposition::VERSION, db = %db_path, "启动");

    let state = AppState::new(db_path.clone())
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    let api = state.disposition_api.clone();

    let ok = match cli.command {
        Commands::Donate {
            batch,
            recipient,
            quantity,
        } => print_response(&api.donate(batch, recipient, quantity).await)?,
        Commands::Sweep { date } => {
            let now = Local::now().naive_local().trunc_subsecs(0);
            let reference_date = date.unwrap_or(now.date());
            print_response(&api.sweep_expired_at(reference_date, now).await)?
        }
        Commands::Candidates { horizon_days, date } => match date {
            Some(d) => print_response(&api.list_candidates_as_of(d, horizon_days).await)?,
            None => print_response(&api.list_candidates(horizon_days).await)?,
        },
        Commands::History { batch } => print_response(&api.batch_history(batch))?,
        Commands::Audit => print_response(&api.audit())?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
