use chrono::NaiveDate;
use regent_models::MemoryWindow;
use regent_store::DailyInputBundle;

use crate::agent::AgentKind;

/// Placeholder for the model name in the output contract. The agent
/// overwrites the field with the resolved provider's name after the call,
/// so the prompt never needs to know which provider will answer.
pub const MODEL_PLACEHOLDER: &str = "{{model}}";

/// Build the full analysis prompt for one agent kind and date: today's
/// documents, the serialized memory window, and the output contract.
pub fn build_prompt(
    kind: AgentKind,
    date: NaiveDate,
    bundle: &DailyInputBundle,
    memory: Option<&MemoryWindow>,
) -> String {
    let role = role_section(kind);
    let memory = memory_section(memory);
    let data = data_section(kind, date, bundle);
    let task = task_section(kind);
    let contract = output_contract(kind, date);
    format!("{role}\n\n{memory}\n{data}\n{task}\n\n{contract}")
}

fn role_section(kind: AgentKind) -> String {
    let role = match kind {
        AgentKind::Macro => {
            "You are the MACRO analyst in a gold market intelligence system.\n\
             Your role: analyze economic events, rates, inflation, and Fed policy."
        }
        AgentKind::Market => {
            "You are the MARKET analyst in a gold market intelligence system.\n\
             Your role: analyze price action, technical indicators, and the volatility regime."
        }
        AgentKind::Narrative => {
            "You are the NARRATIVE analyst in a gold market intelligence system.\n\
             Your role: analyze news headlines and social sentiment for catalysts and narrative shifts."
        }
    };
    role.to_string()
}

fn memory_section(memory: Option<&MemoryWindow>) -> String {
    match memory {
        None => "=== HISTORICAL CONTEXT ===\n\n\
                 This is your FIRST analysis. You have NO historical context yet.\n\
                 Your output today will become the foundation for tomorrow's memory.\n"
            .to_string(),
        Some(window) => {
            let long = serde_json::to_string_pretty(&window.long_context).unwrap_or_default();
            let medium = serde_json::to_string_pretty(&window.medium_context).unwrap_or_default();
            let recent = serde_json::to_string_pretty(&window.recent_context).unwrap_or_default();
            format!(
                "=== HISTORICAL CONTEXT (CHRONOLOGICAL: OLD -> NEW) ===\n\n\
                 LONG-TERM MEMORY:\n{long}\n\n\
                 MEDIUM-TERM MEMORY:\n{medium}\n\n\
                 RECENT MEMORY:\n{recent}\n"
            )
        }
    }
}

fn data_section(kind: AgentKind, date: NaiveDate, bundle: &DailyInputBundle) -> String {
    let mut section = format!("=== TODAY'S NEW DATA ({date}) ===\n");
    let documents: &[(&str, &str)] = match kind {
        AgentKind::Macro => &[
            ("ECONOMIC CALENDAR", "calendar.txt"),
            ("FUNDAMENTALS", "fundamentals.txt"),
            ("MONTHLY BASELINE", "monthly_fundamentals.txt"),
        ],
        AgentKind::Market => &[
            ("TECHNICAL INDICATORS", "technicals.txt"),
            ("ADVANCED CALCULATIONS", "calculos.txt"),
        ],
        AgentKind::Narrative => &[
            ("NEWS HEADLINES", "news.txt"),
            ("FORUM SENTIMENT", "forums.txt"),
        ],
    };
    for (label, file) in documents {
        let content = bundle.get(file).unwrap_or("[NO DATA]");
        section.push_str(&format!("\n{label}:\n{content}\n"));
    }
    section
}

fn task_section(kind: AgentKind) -> String {
    let task = match kind {
        AgentKind::Macro => {
            "=== YOUR TASK ===\n\n\
             Analyze Fed policy, rates, and inflation. Calculate the real rate (T10Y - CPI YoY)\n\
             and assess its direction. Compare against your past analysis: reference specific\n\
             dates from memory and acknowledge prior calls that proved wrong.\n\n\
             Regime: RISK_ON (dovish Fed, falling real rates) / RISK_OFF (hawkish Fed,\n\
             rising real rates) / NEUTRAL."
        }
        AgentKind::Market => {
            "=== YOUR TASK ===\n\n\
             Assess trend vs mean-reversion, momentum (RSI, MACD, ADX), volatility state,\n\
             and cross-asset signals (DXY, SPX, VIX). Reference specific dates from memory\n\
             and flag regime shifts against your prior assessments.\n\n\
             Regime: BREAKOUT / BREAKDOWN / CONSOLIDATION / RISK_ON / RISK_OFF."
        }
        AgentKind::Narrative => {
            "=== YOUR TASK ===\n\n\
             Identify the dominant narrative, catalysts for the next 24-48 hours, and whether\n\
             sentiment is building or fading. Extreme one-sided sentiment is a contrarian\n\
             signal. Compare today's narrative against your memory of prior days.\n\n\
             Regime: RISK_ON / RISK_OFF / NEUTRAL."
        }
    };
    task.to_string()
}

fn output_contract(kind: AgentKind, date: NaiveDate) -> String {
    format!(
        r#"=== OUTPUT FORMAT (STRICT JSON) ===

Return ONLY valid JSON (no markdown fences, no explanation):

{{
  "metadata": {{
    "agent": "{agent}",
    "date": "{date}",
    "timestamp": "<ISO8601 timestamp>",
    "model": "{MODEL_PLACEHOLDER}"
  }},
  "data_snapshot": {{ "<key>": "<evidence extracted for today>" }},
  "analysis": {{
    "regime": "<one regime label>",
    "trend": "<descriptive trend label>",
    "key_drivers": ["<driver>", "..."],
    "reasoning": "<2-3 sentence explanation>",
    "confidence": 0.85,
    "risk_factors": ["<what could invalidate this>"]
  }},
  "memory_references": {{
    "compared_to": ["YYYY-MM-DD: what you assessed then"],
    "corrections": ["acknowledge prior calls that proved wrong"]
  }}
}}

All strings must use double quotes. Confidence is a number between 0.0 and 1.0."#,
        agent = kind.name(),
    )
}
