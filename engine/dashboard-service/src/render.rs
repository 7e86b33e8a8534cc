//! Server-rendered HTML pages

use crate::error::{DashboardError, LOGIN_PATH};
use league_analytics::{SeasonReport, TeamSeasonStats};
use std::fmt::Write;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;background:#f6f4fb;color:#222}\
table{border-collapse:collapse;width:100%;background:#fff}\
th,td{padding:.4rem .6rem;border-bottom:1px solid #ddd;text-align:left}\
th{background:#5f01d1;color:#fff}img{height:24px;vertical-align:middle;margin-right:.4rem}\
.over{color:#1a7f37}.under{color:#cf222e}.panel{background:#fff;padding:1.5rem;border-radius:8px}\
a.button{display:inline-block;padding:.6rem 1.2rem;background:#5f01d1;color:#fff;border-radius:6px;text-decoration:none}";

/// Minimal HTML escaping for text and attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title><style>{STYLE}</style></head>\n<body>\n{body}\n</body>\n</html>",
        escape_html(title)
    )
}

pub fn login_page() -> String {
    page(
        "Fantasy Wrapped",
        &format!(
            "<div class=\"panel\"><h1>Fantasy Wrapped</h1>\
             <p>Sign in with Yahoo to see your league's season in review.</p>\
             <a class=\"button\" href=\"{LOGIN_PATH}\">Sign in with Yahoo</a></div>"
        ),
    )
}

pub fn error_page(err: &DashboardError) -> String {
    page(
        "Fantasy Wrapped - Error",
        &format!(
            "<div class=\"panel\"><h1>Something went wrong</h1><p><strong>{}</strong></p><p>{}</p>\
             <p><a href=\"/\">Try again</a> or <a href=\"/logout\">sign out</a></p></div>",
            err.code(),
            escape_html(&err.to_string())
        ),
    )
}

fn format_std_dev(std_dev: Option<f64>) -> String {
    std_dev.map_or_else(|| "n/a".to_string(), |sd| format!("{sd:.2}"))
}

fn team_row(stats: &TeamSeasonStats) -> String {
    let class = match stats.over_under_performer {
        league_analytics::Performance::Over => "over",
        league_analytics::Performance::Under => "under",
    };
    format!(
        "<tr><td>{rank}</td><td><img src=\"{logo}\" alt=\"\">{team}</td><td>{record}</td>\
         <td>{avg:.2}</td><td>{mean:.2}</td><td>{median:.2}</td><td>{sd}</td><td>{max:.2}</td><td>{min:.2}</td>\
         <td>{bbq} ({bbq_avg:.2})</td><td>{nemesis} ({nemesis_avg:.2})</td>\
         <td class=\"{class}\">{label} {pct:.2}%</td></tr>",
        rank = escape_html(&stats.rank),
        logo = escape_html(&stats.logo_url),
        team = escape_html(&stats.team),
        record = escape_html(&stats.record),
        avg = stats.avg_points,
        mean = stats.mean,
        median = stats.median,
        sd = format_std_dev(stats.std_dev),
        max = stats.max,
        min = stats.min,
        bbq = escape_html(&stats.bbq_chicken),
        bbq_avg = stats.bbq_chicken_avg_points,
        nemesis = escape_html(&stats.nemesis),
        nemesis_avg = stats.nemesis_avg_points,
        label = stats.over_under_performer,
        pct = stats.percentage_improvement,
    )
}

/// Season table, ordered by standings rank
pub fn dashboard_page(report: &SeasonReport) -> String {
    let mut teams: Vec<&TeamSeasonStats> = report.teams.values().collect();
    teams.sort_by(|a, b| a.rank_position.cmp(&b.rank_position).then_with(|| a.team.cmp(&b.team)));

    let mut body = format!(
        "<h1>Fantasy Wrapped</h1><p>League {} &middot; {} weeks completed &middot; <a href=\"/logout\">Sign out</a></p>",
        escape_html(&report.league_key),
        report.weeks_completed
    );
    body.push_str(
        "<table><thead><tr><th>Rank</th><th>Team</th><th>Record</th><th>Avg</th><th>Mean</th>\
         <th>Median</th><th>Std Dev</th><th>Max</th><th>Min</th><th>BBQ Chicken</th><th>Nemesis</th>\
         <th>Over/Under</th></tr></thead><tbody>",
    );
    for stats in teams {
        body.push_str(&team_row(stats));
    }
    body.push_str("</tbody></table>");

    if !report.omitted.is_empty() {
        let names: Vec<String> = report.omitted.iter().map(|n| escape_html(n)).collect();
        let _ = write!(body, "<p>Not enough games to report: {}</p>", names.join(", "));
    }

    page("Fantasy Wrapped", &body)
}
