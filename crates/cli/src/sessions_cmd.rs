use agentlog_local_db::LocalDb;
use anyhow::Result;

use crate::output::{format_time, one_line, parse_tool};

const SUMMARY_WIDTH: usize = 60;

pub fn run_sessions(db: &LocalDb, tool: Option<&str>) -> Result<()> {
    let tool = tool.map(parse_tool).transpose()?;
    let sessions = db.list_sessions(tool)?;

    if sessions.is_empty() {
        println!("No sessions imported yet. Run `agentlog import` first.");
        return Ok(());
    }

    for s in &sessions {
        println!(
            "{:<38} {:<7} {:<16} {:>4} msg  {:<20} {}",
            s.id,
            s.tool.as_str(),
            format_time(s.started_at.as_deref()),
            s.message_count,
            one_line(s.project.as_deref().unwrap_or("-"), 20),
            one_line(s.summary.as_deref().unwrap_or(""), SUMMARY_WIDTH),
        );
    }
    println!();
    println!("{} session(s)", sessions.len());
    Ok(())
}
