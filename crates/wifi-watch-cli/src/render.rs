//! Presentation of a [`ViewState`] for terminals and browsers.
//!
//! Everything here is display-only: absent fields become placeholders such
//! as "Hidden SSID" or "-" at render time and are never written back into the
//! pipeline.

use chrono::{DateTime, Local, Utc};
use colored::{ColoredString, Colorize};
use tabled::{settings::Style, Table, Tabled};

use wifi_watch_scan::{NetworkRecord, RiskCategory, ViewState, HIDDEN_SSID_PLACEHOLDER};

/// Shown when a network has no name.
pub const HIDDEN_NAME: &str = HIDDEN_SSID_PLACEHOLDER;

/// Shown for an absent signal or address.
pub const ABSENT: &str = "-";

/// Shown for an absent security descriptor.
pub const UNKNOWN_SECURITY: &str = "Unknown";

/// Shown when an idle view has no networks.
pub const NO_NETWORKS: &str = "No networks found.";

/// Risk tiers in legend order.
pub const LEGEND_ORDER: [RiskCategory; 3] =
    [RiskCategory::Safe, RiskCategory::Moderate, RiskCategory::High];

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARK_FLOOR_DBM: i32 = -100;
const SPARK_CEIL_DBM: i32 = -30;

// ---------------------------------------------------------------------------
// Field labels
// ---------------------------------------------------------------------------

/// Network name, or the hidden-network placeholder.
pub fn name_label(record: &NetworkRecord) -> &str {
    record.display_name.as_deref().unwrap_or(HIDDEN_NAME)
}

/// Hardware address, or `-` when absent.
pub fn address_label(record: &NetworkRecord) -> &str {
    record.hw_address.as_deref().unwrap_or(ABSENT)
}

/// Signal in dBm, or `-` when absent.
pub fn signal_label(signal: Option<i32>) -> String {
    signal.map_or_else(|| ABSENT.to_string(), |dbm| format!("{dbm} dBm"))
}

/// Security descriptor as reported, or `Unknown`.
pub fn security_label(record: &NetworkRecord) -> &str {
    record
        .security_descriptor
        .as_deref()
        .unwrap_or(UNKNOWN_SECURITY)
}

/// Risk tier name, colored by severity.
pub fn risk_badge(risk: RiskCategory) -> ColoredString {
    let label = risk.to_string();
    match risk {
        RiskCategory::Safe => label.green(),
        RiskCategory::Moderate => label.yellow(),
        RiskCategory::High => label.red().bold(),
        RiskCategory::Unknown => label.dimmed(),
    }
}

/// Signal history as a one-line sparkline, oldest sample first.
pub fn sparkline(samples: &[i32]) -> String {
    let span = (SPARK_CEIL_DBM - SPARK_FLOOR_DBM) as usize;
    let top = SPARK_LEVELS.len() - 1;
    samples
        .iter()
        .map(|&dbm| {
            let offset = (dbm.clamp(SPARK_FLOOR_DBM, SPARK_CEIL_DBM) - SPARK_FLOOR_DBM) as usize;
            SPARK_LEVELS[offset * top / span]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// View-level summaries
// ---------------------------------------------------------------------------

/// One-word status of the view: `Loading…`, `Error` or `Updated HH:MM:SS`.
///
/// The timestamp is rendered in local time, or as `-` before the first
/// successful cycle.
pub fn status_line(view: &ViewState) -> String {
    status_line_in(view, |t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
}

fn status_line_in(view: &ViewState, clock: impl Fn(DateTime<Utc>) -> String) -> String {
    if view.loading {
        "Loading…".to_string()
    } else if view.is_error() {
        "Error".to_string()
    } else if let Some(at) = view.last_updated {
        format!("Updated {}", clock(at))
    } else {
        format!("Updated {ABSENT}")
    }
}

/// Same as [`status_line`] but with the timestamp in UTC.
pub fn status_line_utc(view: &ViewState) -> String {
    status_line_in(view, |t| t.format("%H:%M:%S").to_string())
}

/// The risk legend, one tier per entry.
pub fn risk_legend() -> String {
    LEGEND_ORDER
        .iter()
        .map(|r| r.legend())
        .collect::<Vec<_>>()
        .join("  |  ")
}

/// Line describing the connected network, if any.
pub fn connected_summary(view: &ViewState) -> Option<String> {
    view.connected_network().map(|n| {
        format!(
            "Connected to {} ({}, {})",
            name_label(n),
            signal_label(n.signal_strength),
            n.risk_category
        )
    })
}

// ---------------------------------------------------------------------------
// Terminal table
// ---------------------------------------------------------------------------

/// A network as one table row.
#[derive(Tabled)]
pub struct NetworkRow {
    #[tabled(rename = "")]
    pub connected: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Signal")]
    pub signal: String,
    #[tabled(rename = "Security")]
    pub security: String,
    #[tabled(rename = "Risk")]
    pub risk: String,
    #[tabled(rename = "History")]
    pub history: String,
}

impl From<&NetworkRecord> for NetworkRow {
    fn from(n: &NetworkRecord) -> Self {
        Self {
            connected: if n.is_connected_network {
                "*".green().bold().to_string()
            } else {
                String::new()
            },
            name: name_label(n).to_string(),
            address: address_label(n).to_string(),
            signal: signal_label(n.signal_strength),
            security: security_label(n).to_string(),
            risk: risk_badge(n.risk_category).to_string(),
            history: sparkline(n.history.as_slice()),
        }
    }
}

/// The network table, or [`NO_NETWORKS`] when an idle view is empty.
///
/// Returns an empty string while the first cycle is still loading.
pub fn network_table(view: &ViewState) -> String {
    if view.networks.is_empty() {
        return if view.loading {
            String::new()
        } else {
            NO_NETWORKS.to_string()
        };
    }
    let rows: Vec<NetworkRow> = view.networks.iter().map(NetworkRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// The full terminal rendering: header, status, table and legend.
pub fn render_view(view: &ViewState) -> String {
    let mut out = String::new();

    let status = status_line(view);
    let status = if view.is_error() {
        status.red().bold()
    } else if view.loading {
        status.yellow()
    } else {
        status.green()
    };
    out.push_str(&format!("{}  {}\n", "Wi-Fi Networks".bold().cyan(), status));
    out.push_str(&format!("{}\n", "=".repeat(50)));

    if let Some(error) = &view.error {
        out.push_str(&format!("{} {}\n", "[ERROR]".red().bold(), error));
    }
    if let Some(connected) = connected_summary(view) {
        out.push_str(&format!("{}\n", connected));
    }

    let table = network_table(view);
    if !table.is_empty() {
        out.push_str(&table);
        out.push('\n');
    }

    out.push_str(&format!("{} {}\n", "Legend:".dimmed(), risk_legend()));
    out
}

// ---------------------------------------------------------------------------
// HTML page
// ---------------------------------------------------------------------------

/// Escape text for inclusion in HTML element content or attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn risk_class(risk: RiskCategory) -> &'static str {
    match risk {
        RiskCategory::Safe => "safe",
        RiskCategory::Moderate => "moderate",
        RiskCategory::High => "high",
        RiskCategory::Unknown => "unknown",
    }
}

fn html_row(n: &NetworkRecord) -> String {
    let history = n
        .history
        .as_slice()
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "<tr{connected}><td>{name}</td><td>{address}</td><td>{signal}</td>\
         <td>{security}</td><td class=\"{class}\">{risk}</td>\
         <td title=\"{history}\">{spark}</td></tr>",
        connected = if n.is_connected_network {
            " class=\"connected\""
        } else {
            ""
        },
        name = escape_html(name_label(n)),
        address = escape_html(address_label(n)),
        signal = escape_html(&signal_label(n.signal_strength)),
        security = escape_html(security_label(n)),
        class = risk_class(n.risk_category),
        risk = n.risk_category,
        history = history,
        spark = sparkline(n.history.as_slice()),
    )
}

/// A self-contained status page. It reloads itself whenever the
/// `/ws/view` socket reports a completed cycle.
pub fn render_html(view: &ViewState) -> String {
    let body = if view.networks.is_empty() {
        if view.loading {
            String::new()
        } else {
            format!("<p>{NO_NETWORKS}</p>")
        }
    } else {
        let rows: String = view.networks.iter().map(html_row).collect();
        format!(
            "<table><thead><tr><th>Name</th><th>Address</th><th>Signal</th>\
             <th>Security</th><th>Risk</th><th>History</th></tr></thead>\
             <tbody>{rows}</tbody></table>"
        )
    };

    let error = view
        .error
        .as_deref()
        .map(|e| format!("<p class=\"error\">{}</p>", escape_html(e)))
        .unwrap_or_default();
    let connected = connected_summary(view)
        .map(|c| format!("<p>{}</p>", escape_html(&c)))
        .unwrap_or_default();
    let legend: String = LEGEND_ORDER
        .iter()
        .map(|r| format!("<span class=\"{}\">{}</span>", risk_class(*r), r.legend()))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>wifi-watch</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 2em; }}
table {{ border-collapse: collapse; }}
th, td {{ padding: 4px 10px; border-bottom: 1px solid #ddd; text-align: left; }}
tr.connected {{ font-weight: bold; }}
.safe {{ color: #2e7d32; }} .moderate {{ color: #f9a825; }}
.high {{ color: #c62828; font-weight: bold; }} .unknown {{ color: #777; }}
.error {{ color: #c62828; }}
</style></head>
<body>
<h1>Wi-Fi Networks</h1>
<p><span id="status">{status}</span> <button id="scan">Scan now</button></p>
{error}{connected}{body}
<p>{legend}</p>
<script>
document.getElementById("scan").onclick = () =>
  fetch("/api/v1/scan", {{ method: "POST" }}).then(() => {{
    document.getElementById("status").textContent = "Loading…";
  }});
const ws = new WebSocket(`ws://${{location.host}}/ws/view`);
ws.onmessage = (ev) => {{
  const view = JSON.parse(ev.data);
  if (!view.loading && (view.cycle > {cycle} || {loading})) location.reload();
}};
</script>
</body></html>
"#,
        status = escape_html(&status_line(view)),
        cycle = view.cycle,
        loading = view.loading,
    )
}
