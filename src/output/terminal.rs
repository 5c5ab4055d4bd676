// Colored terminal tables for works, proportions and entity statistics.
//
// main.rs delegates all display here; nothing in this module computes
// anything the exporters don't also see.

use std::collections::BTreeMap;

use colored::Colorize;

use super::truncate_chars;
use crate::analysis::{CoverageRow, ProportionRow};
use crate::entities::AnnotatedWork;
use crate::openalex::record::TextField;

/// Show the first `limit` works with their entity annotations.
pub fn display_works(works: &[AnnotatedWork], limit: usize) {
    if works.is_empty() {
        println!("No works matched the query.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Works ({} fetched) ===", works.len()).bold()
    );
    println!();

    for (i, annotated) in works.iter().take(limit).enumerate() {
        let work = &annotated.work;
        let title = work.title.as_deref().unwrap_or("(untitled)");
        println!(
            "  {:>4}. {}  {}",
            i + 1,
            display_year(work.year).dimmed(),
            truncate_chars(title, 90),
        );

        for (field, entities) in &annotated.entities {
            match entities {
                Some(list) => println!(
                    "        {:<10} {}",
                    format!("{field}:").dimmed(),
                    list.join(", ").cyan()
                ),
                None => println!("        {:<10} {}", format!("{field}:").dimmed(), "-".dimmed()),
            }
        }
    }

    if works.len() > limit {
        println!("  {}", format!("... and {} more", works.len() - limit).dimmed());
    }
    println!();
}

/// Filtered vs baseline counts per group, with the ratio.
pub fn display_proportions(rows: &[ProportionRow], group_by: &str) {
    if rows.is_empty() {
        println!("No groups returned for baseline query.");
        return;
    }

    println!("\n{}", format!("=== Proportions by {group_by} ===").bold());
    println!();
    println!(
        "  {:<24} {:>10} {:>12} {:>10}",
        "Key".dimmed(),
        "Count".dimmed(),
        "Baseline".dimmed(),
        "Share".dimmed(),
    );
    println!("  {}", "-".repeat(60).dimmed());

    for row in rows {
        let key = row.key_display_name.as_deref().unwrap_or(&row.key);
        println!(
            "  {:<24} {:>10} {:>12} {:>10}",
            truncate_chars(key, 24),
            row.count,
            row.count_total,
            colorize_share(row.proportion),
        );
    }

    let count: u64 = rows.iter().map(|r| r.count).sum();
    let total: u64 = rows.iter().map(|r| r.count_total).sum();
    println!();
    if total > 0 {
        println!(
            "  Overall: {count} of {total} ({:.3}%)",
            count as f64 / total as f64 * 100.0
        );
    }
}

/// Top entities per bucket.
pub fn display_frequencies(table: &BTreeMap<i32, Vec<(String, u64)>>, field: TextField, bucket: &str) {
    if table.is_empty() {
        println!("No entities found in {field}.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Entities in {field} by {bucket} ===").bold()
    );
    for (key, ranked) in table {
        let entries: Vec<String> = ranked
            .iter()
            .map(|(entity, count)| format!("{} ({count})", entity.cyan()))
            .collect();
        println!("  {:>6}  {}", display_year(*key).bold(), entries.join(", "));
    }
    println!();
}

/// Overall most frequent entities.
pub fn display_top_entities(ranked: &[(String, u64)], field: TextField) {
    if ranked.is_empty() {
        return;
    }
    println!("\n{}", format!("=== Top entities in {field} ===").bold());
    for (i, (entity, count)) in ranked.iter().enumerate() {
        println!("  {:>4}. {:<40} {:>6}", i + 1, entity, count);
    }
    println!();
}

/// Works mentioning each gazetteer term.
pub fn display_gazetteer(ranked: &[(String, u64)], field: TextField, works: usize) {
    if ranked.is_empty() {
        println!("No gazetteer terms found in {field} across {works} works.");
        return;
    }
    println!(
        "\n{}",
        format!("=== Gazetteer matches in {field} ({works} works) ===").bold()
    );
    for (i, (term, count)) in ranked.iter().enumerate() {
        let share = *count as f64 / works.max(1) as f64 * 100.0;
        println!("  {:>4}. {:<40} {:>6} {:>7.1}%", i + 1, term, count, share);
    }
    println!();
}

/// Per-year abstract coverage.
pub fn display_coverage(rows: &[CoverageRow]) {
    if rows.is_empty() {
        println!("No works to measure.");
        return;
    }

    println!("\n{}", "=== Abstract coverage ===".bold());
    println!();
    println!(
        "  {:>6} {:>8} {:>8} {:>9}",
        "Year".dimmed(),
        "Works".dimmed(),
        "Missing".dimmed(),
        "Missing%".dimmed(),
    );
    println!("  {}", "-".repeat(34).dimmed());

    for row in rows {
        let pct = format!("{:.1}", row.pct_missing);
        let pct = if row.pct_missing >= 50.0 {
            pct.red()
        } else if row.pct_missing >= 20.0 {
            pct.yellow()
        } else {
            pct.green()
        };
        println!(
            "  {:>6} {:>8} {:>8} {:>9}",
            display_year(row.year),
            row.total,
            row.missing,
            pct
        );
    }
    println!();
}

/// TF-IDF ranked keywords.
pub fn display_keywords(ranked: &[(String, f32)], field: TextField) {
    if ranked.is_empty() {
        println!("No keywords extracted from {field}.");
        return;
    }
    println!("\n{}", format!("=== Keywords in {field} ===").bold());
    for (i, (word, score)) in ranked.iter().enumerate() {
        println!("  {:>4}. {:<30} {:.4}", i + 1, word, score);
    }
    println!();
}

fn display_year(year: i32) -> String {
    if year == crate::openalex::record::Work::UNKNOWN_YEAR {
        "????".to_string()
    } else {
        year.to_string()
    }
}

fn colorize_share(proportion: f64) -> colored::ColoredString {
    if proportion.is_nan() {
        return "n/a".dimmed();
    }
    let text = format!("{:.4}", proportion);
    if proportion >= 0.01 {
        text.green().bold()
    } else if proportion > 0.0 {
        text.normal()
    } else {
        text.dimmed()
    }
}
