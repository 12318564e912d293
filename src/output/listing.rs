//! Plain-text tables for tasks and crawled URLs

use crate::storage::{PageRecord, Task};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats tasks as one row per task
pub fn format_tasks(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks found.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:>6}  {:<9}  {:>5}  {:<19}  {}\n",
        "ID", "STATE", "DEPTH", "CREATED", "URL"
    ));

    for task in tasks {
        out.push_str(&format!(
            "{:>6}  {:<9}  {:>5}  {:<19}  {}\n",
            task.id,
            task.state,
            task.max_depth,
            task.created_at.format(TIMESTAMP_FORMAT),
            task.url
        ));
    }

    out
}

/// Formats every field of one task
pub fn format_task(task: &Task) -> String {
    let mut out = String::new();
    out.push_str(&format!("Task {}\n", task.id));
    out.push_str(&format!("  URL:       {}\n", task.url));
    out.push_str(&format!("  State:     {}\n", task.state));
    out.push_str(&format!("  Max depth: {}\n", task.max_depth));
    out.push_str(&format!("  Domains:   {}\n", join_or_any(&task.domains)));
    out.push_str(&format!("  Blacklist: {}\n", join_or_none(&task.blacklist)));
    out.push_str(&format!(
        "  Created:   {}\n",
        task.created_at.format(TIMESTAMP_FORMAT)
    ));
    out
}

/// Formats crawled URL records as one row per record
pub fn format_urls(records: &[PageRecord]) -> String {
    if records.is_empty() {
        return "No crawled URLs found.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:>6}  {:>6}  {:>6}  {:>9}  {:>5}  {}\n",
        "ID", "TASK", "STATUS", "SIZE", "LINKS", "URL"
    ));

    for record in records {
        let id = record.id.map(|id| id.to_string()).unwrap_or_default();
        let task = record.task_id.map(|id| id.to_string()).unwrap_or_default();
        let size = record
            .content_size
            .map(|size| size.to_string())
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!(
            "{:>6}  {:>6}  {:>6}  {:>9}  {:>5}  {}\n",
            id,
            task,
            record.status_code,
            size,
            record.links.len(),
            record.url
        ));

        if let Some(title) = record.content_title.as_deref().filter(|t| !t.is_empty()) {
            out.push_str(&format!("{:>47}{}\n", "", title));
        }
    }

    out
}

fn join_or_any(values: &[String]) -> String {
    if values.is_empty() {
        "(any)".to_string()
    } else {
        values.join(", ")
    }
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "(none)".to_string()
    } else {
        values.join(", ")
    }
}
