use sqlx::PgPool;

use crate::family::{FamilyTree, KinshipEdge};
use crate::id::PersonId;

/// Load a whole `FamilyTree` into Postgres using COPY FROM STDIN (text format).
///
/// Persons go first so kinship edges can reference them. History and
/// generation counters carry no foreign keys.
pub async fn load_tree(pool: &PgPool, tree: &FamilyTree) -> Result<(), sqlx::Error> {
    let mut buf = String::new();
    for p in tree.persons() {
        buf.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            p.id.0,
            escape(&p.name),
            escape(&p.surname),
            p.gender.as_str(),
            p.birth_year,
            opt_i32(p.death_year),
            opt_id(p.father),
            opt_id(p.mother),
            opt_id(p.spouse),
            p.is_noble,
            p.is_monarch,
            opt_i32(p.reign_start_year),
            opt_i32(p.reign_end_year),
            escape(&json_list(&p.titles)),
            escape(&json_list(&p.traits)),
            p.is_placeholder_ancestor,
        ));
    }
    copy_in(pool, include_str!("../../sql/copy_persons.sql"), &buf).await?;

    let mut buf = String::new();
    for edge in tree.graph().edges() {
        let (kind, person, related) = match edge {
            KinshipEdge::Parent { child, parent } => ("parent", child, parent),
            KinshipEdge::Spouse { a, b } => ("spouse", a, b),
        };
        buf.push_str(&format!("{kind}\t{}\t{}\n", person.0, related.0));
    }
    copy_in(pool, include_str!("../../sql/copy_kinship_edges.sql"), &buf).await?;

    let mut buf = String::new();
    for (seq, e) in tree.history().entries().iter().enumerate() {
        buf.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\n",
            seq,
            opt_i32(e.year),
            escape(e.kind.as_str()),
            escape(&e.text),
            opt_id(e.person1),
            opt_id(e.person2),
        ));
    }
    copy_in(pool, include_str!("../../sql/copy_history_entries.sql"), &buf).await?;

    let mut buf = String::new();
    for g in tree.history().all_generations() {
        buf.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            g.generation,
            opt_i32(g.start_year),
            g.births,
            g.deaths,
            g.marriages,
            g.successions,
            g.pruned,
        ));
    }
    copy_in(pool, include_str!("../../sql/copy_generation_stats.sql"), &buf).await?;

    tracing::info!(
        persons = tree.population(),
        history = tree.history().len(),
        "tree loaded into postgres"
    );
    Ok(())
}

/// Execute a COPY FROM STDIN with the given text-format payload.
async fn copy_in(pool: &PgPool, statement: &str, data: &str) -> Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;
    let mut copy = conn.copy_in_raw(statement).await?;
    copy.send(data.as_bytes()).await?;
    copy.finish().await?;
    Ok(())
}

/// Escape a string for Postgres COPY text format.
/// Backslash must be escaped first, then the special whitespace characters.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// `\N` is NULL in COPY text format.
fn opt_i32(v: Option<i32>) -> String {
    v.map_or_else(|| "\\N".to_string(), |n| n.to_string())
}

fn opt_id(v: Option<PersonId>) -> String {
    v.map_or_else(|| "\\N".to_string(), |id| id.0.to_string())
}

/// JSON array text for a JSONB column. A list of strings always serializes.
fn json_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}
