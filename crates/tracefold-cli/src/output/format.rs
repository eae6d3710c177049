use serde::Serialize;

use tracefold_core::model::{
    AbsorptionResult, ContextDocument, KnowledgeDelta, Provenance, TraceEvent,
};

use super::OutputFormat;

fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn provenance(p: Provenance) -> &'static str {
    match p {
        Provenance::Observed => "observed",
        Provenance::Inferred => "inferred",
    }
}

pub fn format_events(events: &[TraceEvent], fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => pretty(events),
        OutputFormat::Text => format_events_text(events),
    }
}

fn format_events_text(events: &[TraceEvent]) -> String {
    if events.is_empty() {
        return "No events.".to_string();
    }

    let mut out = String::new();
    for event in events {
        let ids = event.fact_store_ids();
        if ids.is_empty() {
            out.push_str(&format!("\u{25c6} {}\n", event.kind));
        } else {
            out.push_str(&format!("\u{25c6} {}  [{}]\n", event.kind, ids.join(", ")));
        }
    }
    out
}

pub fn format_context(ctx: &ContextDocument, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => pretty(ctx),
        OutputFormat::Text => format_context_text(ctx),
    }
}

fn format_context_text(ctx: &ContextDocument) -> String {
    let mut out = String::new();

    out.push_str(&format!("Context: {}\n", ctx.id));
    out.push_str(&format!(
        "Date:    {}\n",
        ctx.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "Schema:  {}{}\n",
        ctx.schema.id,
        ctx.schema
            .name
            .as_ref()
            .map(|n| format!(" ({n})"))
            .unwrap_or_default()
    ));
    if let Some(goal) = &ctx.goal {
        out.push_str(&format!("Goal:    {} [{}]\n", goal.description, goal.goal_type));
    }

    out.push_str(&format!("\nFacts ({}):\n", ctx.facts.len()));
    for fact in &ctx.facts {
        out.push_str(&format!(
            "  {:<10} {:<28} {}\n",
            fact.label,
            fact.fact_type,
            provenance(fact.provenance)
        ));
    }
    out
}

pub fn format_absorption(result: &AbsorptionResult, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => pretty(result),
        OutputFormat::Text => {
            let mut out = format!("Absorbed {} fact(s)\n\n", result.absorbed_count);
            out.push_str(&format_context_text(&result.next));
            out
        }
    }
}

pub fn format_delta(delta: &KnowledgeDelta, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => pretty(delta),
        OutputFormat::Text => format_delta_text(delta),
    }
}

fn format_delta_text(delta: &KnowledgeDelta) -> String {
    if delta.is_empty() {
        return "No new knowledge (score 0.00)".to_string();
    }

    let mut out = format!("Score: {:.2}\n", delta.score);
    let d = &delta.details;
    for (label, count, ids) in [
        ("New relations", delta.new_relations, &d.new_relation_ids),
        ("New properties", delta.new_properties, &d.new_property_ids),
        ("Upgrades", delta.modality_upgrades, &d.upgraded_relation_ids),
    ] {
        if count > 0 {
            out.push_str(&format!("{label}: {count} ({})\n", ids.join(", ")));
        }
    }
    out
}
