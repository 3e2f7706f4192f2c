use agentlog_core::{mask_opt, Message, Session};
use agentlog_local_db::LocalDb;
use anyhow::{bail, Result};

use crate::output::format_time;

/// Print a session. Secrets are masked in the summary and in every message
/// unless `raw` is set.
pub fn run_show(db: &LocalDb, id: &str, json: bool, raw: bool) -> Result<()> {
    let Some(mut session) = db.get_session(id)? else {
        bail!("Session not found: {id}");
    };
    let mut messages = db.list_messages(id)?;
    let tags = messages
        .iter()
        .map(|m| db.message_tags(id, &m.id))
        .collect::<Result<Vec<_>>>()?;

    if !raw {
        session.summary = mask_opt(session.summary.as_deref());
        messages = messages.iter().map(Message::masked).collect();
    }

    if json {
        let doc = serde_json::json!({
            "session": session,
            "messages": messages,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print_text(&session, &messages, &tags);
    }
    Ok(())
}

fn print_text(session: &Session, messages: &[Message], tags: &[Vec<String>]) {
    println!("Session {} ({})", session.id, session.tool);
    match (&session.project, &session.project_path) {
        (Some(project), Some(path)) => println!("Project: {project} ({path})"),
        (Some(project), None) => println!("Project: {project}"),
        (None, Some(path)) => println!("Project: {path}"),
        (None, None) => {}
    }
    println!(
        "Time:    {} → {}",
        format_time(session.started_at.as_deref()),
        format_time(session.ended_at.as_deref())
    );
    if let Some(summary) = &session.summary {
        println!("Summary: {summary}");
    }
    println!("Messages: {}", session.message_count);

    for (msg, msg_tags) in messages.iter().zip(tags) {
        println!();
        println!("── {} · {}", msg.kind, format_time(msg.timestamp.as_deref()));
        if !msg_tags.is_empty() {
            println!("  ★ {}", msg_tags.join(", "));
        }
        if let Some(thinking) = &msg.thinking {
            for line in thinking.lines() {
                println!("  > {line}");
            }
        }
        if let Some(content) = &msg.content {
            println!("{content}");
        }
    }
}
