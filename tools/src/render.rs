//! Server-side HTML rendering.
//!
//! RULES:
//!   - Rendering reads the precomputed dashboard and never recomputes it.
//!   - The selected rule arrives as an argument; rendering holds no state.
//!   - Every dynamic string is escaped.

use crate::charts::{self, Series};
use fraudscope_core::{
    aggregate::{Aggregates, Capability},
    format,
    glossary::{self, GLOSSARY},
    insights::count_labels,
    pipeline::Dashboard,
    recommendations::{catalog, RecommendationCard, RuleKey},
};
use std::fmt::Write as _;

pub const TITLE: &str = "Fraud Detection Dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Trends,
    Predictors,
    Recommendations,
    Methodology,
    Glossary,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Trends,
        Tab::Predictors,
        Tab::Recommendations,
        Tab::Methodology,
        Tab::Glossary,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Tab::Trends => "trends",
            Tab::Predictors => "predictors",
            Tab::Recommendations => "recs",
            Tab::Methodology => "assumptions",
            Tab::Glossary => "glossary",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Trends => "Fraud Trends",
            Tab::Predictors => "Fraud Predictors",
            Tab::Recommendations => "Recommendations",
            Tab::Methodology => "Assumptions",
            Tab::Glossary => "Glossary",
        }
    }

    /// Unknown or missing slugs fall back to the trends tab.
    pub fn from_slug(slug: Option<&str>) -> Tab {
        slug.and_then(|s| Tab::ALL.into_iter().find(|t| t.slug() == s))
            .unwrap_or_default()
    }
}

/// Everything one page render needs.
pub struct PageContext<'a> {
    pub dashboard: &'a Dashboard,
    pub selected: Option<RuleKey>,
    pub tab: Tab,
    pub field: Option<&'a str>,
    pub logo_src: &'a str,
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn page(ctx: &PageContext<'_>) -> String {
    let mut out = String::with_capacity(64 * 1024);
    let _ = write!(
        out,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{TITLE}</title><style>{STYLE}</style></head><body><main>"
    );
    header(&mut out, ctx.logo_src);
    kpis(&mut out, ctx.dashboard);
    tabs(&mut out, ctx.tab);

    out.push_str("<section class=\"tab-body\">");
    match ctx.tab {
        Tab::Trends => trends(&mut out, ctx.dashboard),
        Tab::Predictors => predictors(&mut out, &ctx.dashboard.aggregates),
        Tab::Recommendations => recommendations(&mut out, &catalog(ctx.selected)),
        Tab::Methodology => methodology(&mut out),
        Tab::Glossary => glossary_tab(&mut out, ctx.field),
    }
    out.push_str("</section></main></body></html>");
    out
}

// ── Header & KPIs ────────────────────────────────────────────────────────────

fn header(out: &mut String, logo_src: &str) {
    let _ = write!(
        out,
        "<header><img class=\"logo\" src=\"{}\" alt=\"logo\">\
         <div class=\"titles\"><h1>{TITLE}</h1>\
         <div class=\"mute\">• Fraud-focused monitoring &amp; recommendations •</div></div>\
         <div class=\"spacer\"></div></header>",
        escape(logo_src)
    );
}

fn kpis(out: &mut String, dash: &Dashboard) {
    let k = &dash.aggregates.kpis;
    let risk = if dash.aggregates.has(Capability::RiskScore) {
        format!("{:.2}", k.avg_risk_score)
    } else {
        "—".to_string()
    };
    out.push_str("<div class=\"kpis\">");
    kpi_card(out, "Chargeback Rate", &format::pct(k.chargeback_rate), "All deliveries");
    kpi_card(
        out,
        "Fraud Rate",
        &format::pct(k.fraud_rate),
        "Fraudulent chargebacks / deliveries",
    );
    kpi_card(
        out,
        "Total Chargeback Cost ($)",
        &format::money(k.chargeback_cost),
        "Sum of chargeback costs",
    );
    kpi_card(out, "Avg Order Value ($)", &format::money_cents(k.avg_order_value), "Order average");
    kpi_card(out, "Avg Risk Score", &risk, "Order creation");
    kpi_card(out, "Deliveries", &format::count(k.deliveries), "Distinct delivery ids");
    let _ = write!(
        out,
        "</div><div class=\"date-note\">{}</div>",
        escape(&dash.date_range_note())
    );
}

fn kpi_card(out: &mut String, title: &str, value: &str, sub: &str) {
    let _ = write!(
        out,
        "<div class=\"card kpi\"><div class=\"kpi-title\">{}</div>\
         <div class=\"kpi-value\">{}</div><div class=\"mute small\">{}</div></div>",
        escape(title),
        escape(value),
        escape(sub)
    );
}

fn tabs(out: &mut String, active: Tab) {
    out.push_str("<nav class=\"tabs\">");
    for tab in Tab::ALL {
        let class = if tab == active { "tab active" } else { "tab" };
        let _ = write!(
            out,
            "<a class=\"{class}\" href=\"/?tab={}\">{}</a>",
            tab.slug(),
            tab.title()
        );
    }
    out.push_str("</nav>");
}

// ── Shared pieces ────────────────────────────────────────────────────────────

fn section_title(out: &mut String, text: &str) {
    let _ = write!(out, "<h2>{}</h2>", escape(text));
}

fn bullets(out: &mut String, items: &[String]) {
    out.push_str("<ul class=\"bullets\">");
    for item in items {
        let _ = write!(out, "<li>{}</li>", escape(item));
    }
    out.push_str("</ul>");
}

/// Chart-side link to a recommendation. Posting it selects the rule.
fn bubble(out: &mut String, label: &str, key: RuleKey) {
    let _ = write!(
        out,
        "<form class=\"bubble\" method=\"post\" action=\"/select/{key}\">\
         <button type=\"submit\">{}</button></form>",
        escape(label)
    );
}

fn bubbles(out: &mut String, items: &[(&str, RuleKey)]) {
    out.push_str("<div class=\"bubbles\">");
    for (label, key) in items {
        bubble(out, label, *key);
    }
    out.push_str("</div>");
}

fn pct_tick(v: f64) -> String {
    format::pct(v)
}

fn money_tick(v: f64) -> String {
    format::money(v)
}

fn plain_tick(v: f64) -> String {
    format!("{v:.2}")
}

// ── Trends tab ───────────────────────────────────────────────────────────────

/// Stand-in for a panel whose source columns are missing.
fn unavailable(out: &mut String, missing: &str) {
    let _ = write!(
        out,
        "<p class=\"mute unavailable\">Not available for this dataset (needs {}).</p>",
        escape(missing)
    );
}

fn trends(out: &mut String, dash: &Dashboard) {
    let aggs = &dash.aggregates;
    let ins = &dash.insights;
    let dates: Vec<String> = aggs.daily.iter().map(|d| d.date.to_string()).collect();
    let dated = aggs.has(Capability::DailySeries);

    section_title(out, "Temporal Fraud Heatmap (Day-of-Week × Hour)");
    if aggs.has(Capability::TemporalMatrix) {
        out.push_str(&charts::heatmap("Fraud rate by weekday and hour", &aggs.temporal));
        bullets(out, &ins.temporal);
    } else {
        unavailable(out, "CREATED_AT");
    }
    bubbles(out, &[("See: Temporal Guardrails", RuleKey::Temporal)]);

    section_title(out, "Daily Chargeback & Fraud Rates");
    if dated {
        out.push_str(&charts::line_chart(
            "Daily chargeback and fraud rates",
            &dates,
            &[
                Series {
                    name: "chargeback_rate",
                    values: aggs.daily.iter().map(|d| Some(d.chargeback_rate)).collect(),
                },
                Series {
                    name: "fraud_rate",
                    values: aggs.daily.iter().map(|d| Some(d.fraud_rate)).collect(),
                },
            ],
            pct_tick,
        ));
        bullets(out, &ins.rate_trends);
    } else {
        unavailable(out, "CREATED_AT");
    }

    section_title(out, "Chargeback Cost Over Time ($)");
    if dated && aggs.has(Capability::ChargebackCost) {
        out.push_str(&charts::line_chart(
            "Daily chargeback cost",
            &dates,
            &[Series {
                name: "chargeback_cost",
                values: aggs.daily.iter().map(|d| Some(d.chargeback_cost)).collect(),
            }],
            money_tick,
        ));
        bullets(out, &ins.chargeback_cost);
    } else {
        unavailable(out, "CREATED_AT and CHARGEBACK_COST");
    }

    section_title(out, "Average Risk Score & Order Value Over Time");
    if dated && (aggs.has(Capability::RiskScore) || aggs.has(Capability::GovBuckets)) {
        out.push_str(&charts::line_chart(
            "Daily average risk score and order value",
            &dates,
            &[
                Series {
                    name: "avg_risk_score",
                    values: aggs.daily.iter().map(|d| d.avg_risk_score).collect(),
                },
                Series {
                    name: "avg_order_value",
                    values: aggs.daily.iter().map(|d| d.avg_order_value).collect(),
                },
            ],
            plain_tick,
        ));
        bullets(out, &ins.risk_and_value);
    } else {
        unavailable(out, "CREATED_AT and a risk score or GOV");
    }
    bubbles(out, &[("See: Sift Thresholds", RuleKey::Sift)]);

    section_title(out, "Fraud Rate by Platform");
    if aggs.has(Capability::PlatformSegments) {
        let labels: Vec<String> = aggs
            .platforms
            .iter()
            .map(|r| r.key.clone().unwrap_or_else(|| "unknown".into()))
            .collect();
        let rates: Vec<f64> = aggs.platforms.iter().map(|r| r.fraud_rate).collect();
        out.push_str(&charts::bar_chart("Fraud rate by platform", &labels, &rates, pct_tick));
        bullets(out, &ins.platforms);
    } else {
        unavailable(out, "PLATFORM");
    }
    bubbles(out, &[("See: Platform Guardrails", RuleKey::Platform)]);

    section_title(out, "Fraud Rate vs Unique Addresses (lifetime)");
    if aggs.has(Capability::AddressSegments) {
        out.push_str(&charts::line_chart(
            "Fraud rate by lifetime unique addresses",
            &count_labels(&aggs.addresses),
            &[Series {
                name: "fraud_rate",
                values: aggs.addresses.iter().map(|r| Some(r.fraud_rate)).collect(),
            }],
            pct_tick,
        ));
        bullets(out, &ins.addresses);
    } else {
        unavailable(out, "CX_UNIQUE_ADDRESSES");
    }
    bubbles(out, &[("See: Address Velocity Controls", RuleKey::AddressVelocity)]);

    section_title(out, "Fraud Rate vs Failed Charges (1D)");
    if aggs.has(Capability::FailedChargeSegments) {
        out.push_str(&charts::line_chart(
            "Fraud rate by failed charges in the prior day",
            &count_labels(&aggs.failed_charges),
            &[Series {
                name: "fraud_rate",
                values: aggs.failed_charges.iter().map(|r| Some(r.fraud_rate)).collect(),
            }],
            pct_tick,
        ));
        bullets(out, &ins.failed_charges);
    } else {
        unavailable(out, "FAIL_CHARGES_1D");
    }
    bubbles(out, &[("See: Failed Payments Step-up", RuleKey::FailedPayments)]);

    section_title(out, "Fraud Rate by Order Value Bucket");
    if aggs.has(Capability::GovBuckets) {
        let labels: Vec<String> = aggs.gov_buckets.iter().map(|r| r.key.label()).collect();
        let rates: Vec<f64> = aggs.gov_buckets.iter().map(|r| r.fraud_rate).collect();
        out.push_str(&charts::bar_chart(
            "Fraud rate by order value bucket",
            &labels,
            &rates,
            pct_tick,
        ));
        bullets(out, &ins.gov_buckets);
    } else {
        unavailable(out, "GOV");
    }
    bubbles(out, &[("See: High-Value (GOV) Scrutiny", RuleKey::Gov)]);
}

// ── Predictors tab ───────────────────────────────────────────────────────────

fn predictors(out: &mut String, aggs: &Aggregates) {
    if !aggs.has(Capability::Predictors) {
        section_title(out, "Fraud Predictors");
        unavailable(out, "IS_FRAUDULENT_CHARGEBACK");
        return;
    }
    section_title(
        out,
        &format!(
            "Top {} Predictors (Higher |Correlation| ⇒ Stronger Signal)",
            aggs.predictors.len()
        ),
    );
    let names: Vec<String> = aggs.predictors.iter().map(|p| p.column.clone()).collect();
    let values: Vec<f64> = aggs.predictors.iter().map(|p| p.correlation).collect();
    out.push_str(&charts::signed_hbar_chart(
        "Correlation with fraud flag",
        &names,
        &values,
    ));
    bullets(
        out,
        &[
            "Signals are univariate; treat as directional, not causal.".to_string(),
            "Use for rules/threshold ideas, then validate with multivariate models or experiments."
                .to_string(),
        ],
    );
    bubbles(
        out,
        &[
            ("See: Failed Payments Step-up", RuleKey::FailedPayments),
            ("See: Address Velocity Controls", RuleKey::AddressVelocity),
            ("See: High-Value (GOV) Scrutiny", RuleKey::Gov),
            ("See: Platform Guardrails", RuleKey::Platform),
            ("See: Sift Thresholds", RuleKey::Sift),
        ],
    );
}

// ── Recommendations tab ──────────────────────────────────────────────────────

fn recommendations(out: &mut String, cards: &[RecommendationCard]) {
    section_title(out, "Fraud Mitigation Recommendations");
    out.push_str("<div class=\"rec-grid\">");
    for card in cards {
        rec_card(out, card);
    }
    out.push_str("</div>");
}

fn rec_card(out: &mut String, card: &RecommendationCard) {
    let rule = card.rule;
    let class = if card.highlighted { "card rec highlight" } else { "card rec" };
    let _ = write!(
        out,
        "<article class=\"{class}\" id=\"rec-{}\"><h3>{}</h3>",
        rule.key,
        escape(rule.title)
    );
    out.push_str("<div class=\"tags\">");
    for tag in rule.tags {
        let _ = write!(out, "<span class=\"badge\">{}</span>", escape(tag));
    }
    let _ = write!(
        out,
        "</div><p><b>Trigger:</b> {}</p><p><b>Significance:</b> {}</p><p><b>Why:</b> {}</p>",
        escape(rule.trigger),
        escape(rule.significance),
        escape(rule.rationale)
    );
    list_block(out, "Actions", rule.actions);
    list_block(out, "KPIs", rule.kpis);
    out.push_str("</article>");
}

fn list_block(out: &mut String, title: &str, items: &[&str]) {
    let _ = write!(out, "<div class=\"list-title\">{}</div><ul>", escape(title));
    for item in items {
        let _ = write!(out, "<li>{}</li>", escape(item));
    }
    out.push_str("</ul>");
}

// ── Methodology tab ──────────────────────────────────────────────────────────

const METHODOLOGY: &[(&str, &[&str])] = &[
    (
        "Time & Preprocessing",
        &[
            "Trends are aggregated by calendar date of CREATED_AT.",
            "Order value in dollars = GOV (cents) / 100.",
            "Boolean fields are coerced to 0/1 with a tolerant parse.",
            "The heatmap uses day of week (Mon–Sun) × hour (0–23) on fraud rate.",
        ],
    ),
    (
        "Rates & Ratios",
        &[
            "Daily chargeback rate = chargebacks on the day / deliveries on the day.",
            "Daily fraud rate = fraudulent deliveries on the day / deliveries on the day.",
            "Consumer chargeback rate = CCR_CHARGEBACK_DELIVERIES / CCR_PAST_DELIVERIES.",
        ],
    ),
    (
        "Binning & Grouping",
        &[
            "Order value risk bands are deciles of the observed order values.",
            "Repeated decile boundaries merge, so fewer than ten bands can appear.",
            "Rows missing a grouping field form their own 'unknown' group.",
        ],
    ),
    (
        "Interpretation Notes",
        &[
            "The heatmap shows when risk is elevated; apply guardrails in those windows.",
            "Correlations are univariate direction signals; confirm with tests or cohorts before policy.",
            "Divide-by-zero gives 0.0; invalid numerics are ignored by aggregations.",
        ],
    ),
];

fn methodology(out: &mut String) {
    section_title(out, "Calculations & Assumptions");
    out.push_str("<div class=\"info-grid\">");
    for (title, lines) in METHODOLOGY {
        let _ = write!(out, "<div class=\"card info\"><h3>{}</h3><ul>", escape(title));
        for line in *lines {
            let _ = write!(out, "<li>{}</li>", escape(line));
        }
        out.push_str("</ul></div>");
    }
    out.push_str("</div>");
}

// ── Glossary tab ─────────────────────────────────────────────────────────────

fn glossary_tab(out: &mut String, field: Option<&str>) {
    section_title(out, "Field Definitions");
    let chosen = field
        .or_else(|| GLOSSARY.first().map(|e| e.field))
        .unwrap_or_default();

    out.push_str(
        "<form class=\"glossary-pick\" method=\"get\" action=\"/\">\
         <input type=\"hidden\" name=\"tab\" value=\"glossary\">\
         <label class=\"mute small\">Choose a field: <select name=\"field\" onchange=\"this.form.submit()\">",
    );
    for entry in GLOSSARY {
        let selected = if entry.field == chosen { " selected" } else { "" };
        let _ = write!(
            out,
            "<option value=\"{0}\"{selected}>{0}</option>",
            escape(entry.field)
        );
    }
    out.push_str("</select></label><noscript><button type=\"submit\">Show</button></noscript></form>");

    let definition = glossary::lookup(chosen).map_or("—", |e| e.definition);
    let _ = write!(
        out,
        "<div class=\"card definition\"><div class=\"bar\"></div>\
         <div class=\"field\">{}</div><div>{}</div></div>",
        escape(chosen),
        escape(definition)
    );

    out.push_str("<table class=\"glossary\"><thead><tr><th>Field</th><th>Definition</th></tr></thead><tbody>");
    for entry in GLOSSARY {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape(entry.field),
            escape(entry.definition)
        );
    }
    out.push_str("</tbody></table><div class=\"mute small center\">Source: provided dataset and business definitions.</div>");
}

const STYLE: &str = "\
body{margin:0;background:#F8F9FB;color:#1F2937;font-family:system-ui,-apple-system,Segoe UI,Roboto,sans-serif}\
main{max-width:1200px;margin:0 auto;padding:16px}\
header{display:grid;grid-template-columns:48px 1fr 48px;align-items:center;column-gap:10px}\
.logo{height:28px}.titles{text-align:center}h1{margin:0;font-size:24px;color:#101418}\
.mute{color:#6B7280}.small{font-size:12px}.center{text-align:center}\
.card{background:#FFF;border:1px solid #E5E7EB;border-radius:12px;padding:12px 14px;box-shadow:0 2px 10px rgba(16,20,24,.04)}\
.kpis{display:grid;grid-template-columns:repeat(auto-fit,minmax(180px,1fr));gap:12px;margin:14px 0 6px}\
.kpi-title{font-size:13px;color:#6B7280}.kpi-value{font-size:24px;font-weight:700;color:#101418}\
.date-note{color:#6B7280;font-size:12px;text-align:center;margin-bottom:12px}\
.tabs{display:flex;gap:4px;border-bottom:1px solid #E5E7EB}\
.tab{padding:10px 16px;font-weight:600;border:1px solid #E5E7EB;background:#FFF;color:#1F2937;text-decoration:none}\
.tab.active{border-color:#EB1700;border-bottom:2px solid #EB1700;background:#FFF6F3;color:#C51400;font-weight:700}\
h2{color:#101418;font-size:16px;margin:18px 0 6px}.chart{width:100%;height:auto;background:#FFF}\
.bullets{color:#6B7280;margin-top:6px}.bubbles{display:flex;flex-wrap:wrap;gap:6px;margin:4px 0 12px}\
.bubble{margin:0}.bubble button{border:1px solid #EB1700;background:#FFF6F3;color:#C51400;border-radius:999px;padding:4px 12px;cursor:pointer}\
.rec-grid{display:grid;grid-template-columns:repeat(auto-fit,minmax(320px,1fr));gap:12px}\
.rec.highlight{background:#FFEDE7;border-color:#EB1700}.badge{display:inline-block;margin:0 4px 4px 0;padding:2px 8px;border-radius:999px;background:#F1F5F9;font-size:12px}\
.list-title{font-weight:700;margin-top:6px}\
.info-grid{display:grid;grid-template-columns:repeat(auto-fit,minmax(420px,1fr));gap:12px}\
.glossary-pick{max-width:520px;margin:0 auto 10px}.definition{max-width:800px;margin:0 auto 12px}\
.definition .bar{height:4px;background:#EB1700;border-radius:8px 8px 0 0;margin-bottom:10px}.definition .field{font-weight:700;font-size:16px}\
table.glossary{width:100%;border-collapse:collapse;background:#FFF}table.glossary th{background:#FFF6F3;text-align:left}\
table.glossary td,table.glossary th{border:1px solid #E5E7EB;padding:6px 8px}";
