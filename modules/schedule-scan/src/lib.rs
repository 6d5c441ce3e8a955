//! Scheduled-job table extraction: crontab lines into seven-field rows.

use anyhow::{bail, Context, Result};
use regex::Regex;
use scriptmap_core::catalog::SCRIPT_EXTENSIONS;
use scriptmap_core::relations::ScheduleRow;
use scriptmap_core::AuditContext;

const COMMENT_MARKER: char = '#';

/// Read the current user's job table via crontab(1).
pub fn read_crontab() -> Result<String> {
    let out = std::process::Command::new("crontab")
        .arg("-l")
        .output()
        .context("failed to run crontab -l")?;
    if !out.status.success() {
        bail!("crontab -l exited with status {}", out.status);
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

fn script_token(extensions: &[&str]) -> Regex {
    Regex::new(&format!(r"(\w{{2,}}\.(?:{}))\b", extensions.join("|"))).expect("built-in rule")
}

/// Parse line-oriented job-table entries attributed to the current host.
/// Comment lines, shell directives (variable assignments) and @-style
/// entries are excluded before field extraction. The command capture stops
/// at the first comment-marker token; trailing tokens equal to the current
/// host name are dropped. A line whose command carries no script-like token
/// yields no row.
pub fn parse_crontab(ctx: &AuditContext, content: &str) -> Vec<ScheduleRow> {
    let token = script_token(SCRIPT_EXTENSIONS);
    let mut rows = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
            continue;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields[0].contains('=') || fields[0].starts_with('@') {
            continue;
        }
        if fields.len() < 6 {
            continue;
        }
        let (sched, command) = fields.split_at(5);
        let mut free_text: Vec<&str> = command
            .iter()
            .take_while(|tok| !tok.starts_with(COMMENT_MARKER))
            .copied()
            .collect();
        while free_text.last() == Some(&ctx.host.as_str()) {
            free_text.pop();
        }
        let command_text = free_text.join(" ");
        let Some(cap) = token.captures(&command_text) else { continue };
        rows.push(ScheduleRow {
            host: ctx.host.clone(),
            script: cap[1].to_string(),
            minute: two_digit(sched[0]),
            hour: two_digit(sched[1]),
            day_of_month: sched[2].to_string(),
            month: sched[3].to_string(),
            day_of_week: sched[4].to_string(),
        });
    }
    rows
}

/// Two-digit convention for minute/hour where the source carries a plain
/// single digit; stars, ranges and step fields pass through unchanged.
fn two_digit(field: &str) -> String {
    if field.len() == 1 && field.chars().all(|c| c.is_ascii_digit()) {
        format!("0{field}")
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> AuditContext {
        AuditContext::new("hostA", "/srv")
    }

    #[test]
    fn parses_standard_entry_with_padding() {
        let rows = parse_crontab(&ctx(), "5 2 * * 1 /srv/jobs/nightly.sh --full\n");
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.script, "nightly.sh");
        assert_eq!(r.minute, "05");
        assert_eq!(r.hour, "02");
        assert_eq!(r.day_of_month, "*");
        assert_eq!(r.month, "*");
        assert_eq!(r.day_of_week, "1");
    }

    #[test]
    fn comments_and_directives_are_excluded() {
        let table = "# every night\nSHELL=/bin/sh\nMAILTO=ops@example.com\n@reboot /srv/boot.sh\n15 04 * * * /srv/jobs/rotate.sh\n";
        let rows = parse_crontab(&ctx(), table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].script, "rotate.sh");
    }

    #[test]
    fn trailing_comment_is_excluded_from_capture() {
        let rows = parse_crontab(&ctx(), "0 6 * * * /bin/true # was report.sh\n");
        assert!(rows.is_empty());
    }

    #[test]
    fn trailing_host_token_is_dropped() {
        let rows = parse_crontab(&ctx(), "30 23 1 * * run_all.sh hostA\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].script, "run_all.sh");
        assert_eq!(rows[0].day_of_month, "1");
    }

    #[test]
    fn line_without_script_token_yields_no_row() {
        let rows = parse_crontab(&ctx(), "0 0 * * * /usr/bin/find /tmp -delete\n");
        assert!(rows.is_empty());
    }

    #[test]
    fn ranges_and_steps_pass_through() {
        let rows = parse_crontab(&ctx(), "*/10 8-18 * * 1-5 poll.sh\n");
        assert_eq!(rows[0].minute, "*/10");
        assert_eq!(rows[0].hour, "8-18");
        assert_eq!(rows[0].day_of_week, "1-5");
    }
}
