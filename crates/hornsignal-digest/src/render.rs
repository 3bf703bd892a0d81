//! JSON, HTML, and plain-text rendering of a built `Digest`. No template
//! engine: HTML is composed with `format!` and an inline `<style>` block,
//! matching a single standalone document suitable for email.

use crate::types::Digest;

pub fn render_json(digest: &Digest) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(digest)?)
}

fn fmt_pct(pct: Option<i64>) -> String {
    match pct {
        Some(p) if p > 0 => format!("+{p}%"),
        Some(p) => format!("{p}%"),
        None => "—".to_string(),
    }
}

/// Muted institutional color per severity tier, used as the HTML left-border
/// accent on high-severity event cards.
fn severity_color(severity: i32) -> &'static str {
    match severity {
        5 => "#7a1f1f",
        4 => "#9c5b1f",
        3 => "#8a7a1f",
        _ => "#3d5a73",
    }
}

pub fn render_html(digest: &Digest) -> String {
    let mut topline_rows = String::new();
    for t in &digest.topline.types {
        topline_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            t.event_type,
            t.this_week,
            t.last_week,
            fmt_pct(t.percent_change)
        ));
    }

    let mut high_severity_cards = String::new();
    for e in &digest.high_severity {
        let regions = e.regions.join(", ");
        let actors = e.actors.join(", ");
        let bundled_note = if e.bundled_count > 1 {
            format!(" ({} reports)", e.bundled_count)
        } else {
            String::new()
        };
        high_severity_cards.push_str(&format!(
            r#"<div class="event" style="border-left-color:{color}">
  <h3>{country} — {subtype}{bundled_note}</h3>
  <p>{summary}</p>
  <p class="meta">Severity {severity} · {verification} · Regions: {regions} · Actors: {actors}</p>
  {rationale}
</div>
"#,
            color = severity_color(e.severity),
            country = e.country,
            subtype = e.event_subtype,
            bundled_note = bundled_note,
            summary = e.summary,
            severity = e.severity,
            verification = e.verification_status,
            regions = regions,
            actors = actors,
            rationale = if e.rationale.is_empty() { String::new() } else { format!("<p class=\"rationale\">{}</p>", e.rationale) },
        ));
    }

    let mut region_rows = String::new();
    for r in &digest.hot_regions {
        region_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.1}</td><td>{}</td></tr>\n",
            r.region,
            r.count,
            r.average_severity,
            fmt_pct(r.percent_change)
        ));
    }

    let mut actor_rows = String::new();
    for a in &digest.actor_spikes {
        actor_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            a.actor,
            a.this_week,
            a.last_week,
            fmt_pct(a.percent_change)
        ));
    }

    let baseline_note = if digest.baseline_weak {
        r#"<p class="baseline-note">Last week's event count was too low for a reliable week-over-week comparison; raw counts only.</p>"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  body {{ font-family: -apple-system, Helvetica, Arial, sans-serif; color: #1c1c1c; max-width: 680px; margin: 0 auto; }}
  h1 {{ font-size: 20px; }}
  h2 {{ font-size: 16px; border-bottom: 1px solid #ccc; padding-bottom: 4px; }}
  table {{ width: 100%; border-collapse: collapse; margin-bottom: 16px; }}
  td, th {{ padding: 4px 8px; text-align: left; border-bottom: 1px solid #eee; font-size: 13px; }}
  .event {{ border-left: 4px solid #3d5a73; padding: 8px 12px; margin-bottom: 10px; background: #f7f7f7; }}
  .meta {{ font-size: 12px; color: #555; }}
  .rationale {{ font-size: 12px; color: #333; font-style: italic; }}
  .baseline-note {{ font-size: 12px; color: #7a1f1f; }}
</style>
</head>
<body>
<h1>Horn Risk Delta — {label}</h1>
{baseline_note}
<h2>Topline</h2>
<p>{this_total} events this week vs {last_total} last week.</p>
<table>
<tr><th>Type</th><th>This week</th><th>Last week</th><th>WoW</th></tr>
{topline_rows}
</table>
<h2>High-severity events</h2>
{high_severity_cards}
<h2>Hot regions</h2>
<table>
<tr><th>Region</th><th>Count</th><th>Avg severity</th><th>WoW</th></tr>
{region_rows}
</table>
<h2>Actor spikes</h2>
<table>
<tr><th>Actor</th><th>This week</th><th>Last week</th><th>WoW</th></tr>
{actor_rows}
</table>
</body>
</html>
"#,
        label = digest.label,
        baseline_note = baseline_note,
        this_total = digest.topline.this_week_total,
        last_total = digest.topline.last_week_total,
        topline_rows = topline_rows,
        high_severity_cards = high_severity_cards,
        region_rows = region_rows,
        actor_rows = actor_rows,
    )
}

pub fn render_text(digest: &Digest) -> String {
    let mut out = String::new();
    out.push_str(&format!("HORN RISK DELTA — {}\n", digest.label));
    if digest.baseline_weak {
        out.push_str("(baseline too small for WoW comparison; raw counts only)\n");
    }
    out.push_str(&format!(
        "\nTOPLINE: {} this week vs {} last week\n",
        digest.topline.this_week_total, digest.topline.last_week_total
    ));
    for t in &digest.topline.types {
        out.push_str(&format!(
            "  {:<15} {:>4} ({:>4} last week, {})\n",
            t.event_type.to_string(),
            t.this_week,
            t.last_week,
            fmt_pct(t.percent_change)
        ));
    }

    out.push_str("\nHIGH-SEVERITY EVENTS\n");
    for e in &digest.high_severity {
        out.push_str(&format!(
            "  [{}] {} — {} ({}) · regions: {}\n",
            e.severity,
            e.country,
            e.event_subtype,
            e.verification_status,
            e.regions.join(", ")
        ));
        out.push_str(&format!("    {}\n", e.summary));
    }

    out.push_str("\nHOT REGIONS\n");
    for r in &digest.hot_regions {
        out.push_str(&format!(
            "  {:<30} {:>4} (avg sev {:.1}, {})\n",
            r.region,
            r.count,
            r.average_severity,
            fmt_pct(r.percent_change)
        ));
    }

    out.push_str("\nACTOR SPIKES\n");
    for a in &digest.actor_spikes {
        out.push_str(&format!("  {:<30} {:>4} -> {:>4} ({})\n", a.actor, a.last_week, a.this_week, fmt_pct(a.percent_change)));
    }

    out
}

/// Subject line for the SMTP send: "Horn Risk Delta — Week {N} | {count}
/// events[, {k} high-severity]".
pub fn subject_line(digest: &Digest, week_number: u32) -> String {
    let high = digest.high_severity_count();
    if high > 0 {
        format!(
            "Horn Risk Delta — Week {week_number} | {count} events, {high} high-severity",
            count = digest.topline.this_week_total
        )
    } else {
        format!("Horn Risk Delta — Week {week_number} | {count} events", count = digest.topline.this_week_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HighSeverityEvent, HotRegion, Topline};
    use hornsignal_common::EventType;

    fn sample_digest() -> Digest {
        Digest {
            label: "2026-07-13 to 2026-07-20".into(),
            baseline_weak: false,
            topline: Topline {
                this_week_total: 12,
                last_week_total: 8,
                types: vec![],
            },
            high_severity: vec![HighSeverityEvent {
                summary: "Airstrike reported near El Fasher".into(),
                country: "Sudan".into(),
                regions: vec!["North Darfur (El Fasher)".into()],
                event_type: EventType::Security,
                event_subtype: "airstrike".into(),
                severity: 5,
                verification_status: "reported".into(),
                rationale: "Three outlets confirm the strike.".into(),
                actors: vec!["Rapid Support Forces".into()],
                source_count: 3,
                bundled_count: 2,
            }],
            hot_regions: vec![HotRegion {
                region: "North Darfur".into(),
                count: 5,
                average_severity: 4.2,
                percent_change: Some(25),
            }],
            actor_spikes: vec![],
        }
    }

    #[test]
    fn json_render_round_trips_through_serde() {
        let digest = sample_digest();
        let json = render_json(&digest).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["label"], "2026-07-13 to 2026-07-20");
    }

    #[test]
    fn html_render_includes_subject_relevant_content() {
        let digest = sample_digest();
        let html = render_html(&digest);
        assert!(html.contains("El Fasher"));
        assert!(html.contains("<style>"));
    }

    #[test]
    fn subject_line_includes_high_severity_count_when_present() {
        let digest = sample_digest();
        let subject = subject_line(&digest, 29);
        assert_eq!(subject, "Horn Risk Delta — Week 29 | 12 events, 1 high-severity");
    }
}
