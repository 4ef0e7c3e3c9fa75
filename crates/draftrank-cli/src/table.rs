//! Plain-text tables for the pick order and card lists.

use std::io::{self, Write};

use draftrank_evaluator::pick_order::{PickRow, RatingSnapshot};
use draftrank_session::view::{self, CardView, PickOrderView, RatingClass};

const NAME_WIDTH: usize = 32;

fn class_marker(class: Option<RatingClass>) -> &'static str {
    match class {
        Some(RatingClass::High) => "+",
        Some(RatingClass::Medium) => " ",
        Some(RatingClass::Low) => "-",
        None => "?",
    }
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() <= NAME_WIDTH {
        return name.to_owned();
    }
    let mut short = name.chars().take(NAME_WIDTH - 1).collect::<String>();
    short.push('…');
    short
}

fn write_pick_row<W>(out: &mut W, rank: usize, row: &PickRow) -> io::Result<()>
where
    W: Write,
{
    let ratings = &row.ratings;
    let owned = if row.owned > 0 {
        format!("x{}", row.owned)
    } else {
        String::new()
    };
    writeln!(
        out,
        "  {rank:>3} {marker}{name:<NAME_WIDTH$} {rarity:<8} {color:<5} {rating:>6.1} {baseline:>8.1} {synergy:>7} {owned:>4}",
        marker = class_marker(Some(RatingClass::from_rating(ratings.rating))),
        name = truncate_name(&row.name),
        rarity = row.rarity.label(),
        color = row.color_identity.as_str(),
        rating = ratings.rating,
        baseline = ratings.baseline_rating,
        synergy = view::format_synergy(ratings.synergy),
    )
}

pub(crate) fn write_snapshot<W>(out: &mut W, snapshot: &RatingSnapshot) -> io::Result<()>
where
    W: Write,
{
    writeln!(
        out,
        "  {:>3} {:<width$} {:<8} {:<5} {:>6} {:>8} {:>7} {:>4}",
        "#",
        "Card",
        "Rarity",
        "Color",
        "Rating",
        "Baseline",
        "Synergy",
        "Own",
        width = NAME_WIDTH + 1,
    )?;
    writeln!(out, "  {}", "-".repeat(NAME_WIDTH + 48))?;
    if snapshot.rows.is_empty() {
        writeln!(out, "  (no cards match the current filters)")?;
    }
    for (i, row) in snapshot.rows.iter().enumerate() {
        write_pick_row(out, i + 1, row)?;
    }
    if snapshot.matched > snapshot.rows.len() {
        writeln!(
            out,
            "  ... {} more match the current filters",
            snapshot.matched - snapshot.rows.len()
        )?;
    }
    if let Some(reason) = snapshot.current_source.fallback_reason() {
        writeln!(out, "  note: neutral ratings in use ({reason})")?;
    }
    Ok(())
}

pub(crate) fn write_pick_order<W>(out: &mut W, pick_order: &PickOrderView) -> io::Result<()>
where
    W: Write,
{
    match pick_order {
        PickOrderView::Pending => writeln!(out, "  Loading..."),
        PickOrderView::Ready(snapshot) => write_snapshot(out, snapshot),
        PickOrderView::Degraded { message } => writeln!(out, "  {message}"),
    }
}

pub(crate) fn write_cards<W>(out: &mut W, cards: &[CardView], empty: &str) -> io::Result<()>
where
    W: Write,
{
    if cards.is_empty() {
        return writeln!(out, "  {empty}");
    }
    for card in cards {
        let (rating, synergy) = card.ratings.map_or_else(
            || ("N/A".to_owned(), String::new()),
            |r| (format!("{:.1}", r.rating), view::format_synergy(r.synergy)),
        );
        let count = if card.count > 0 {
            format!("x{}", card.count)
        } else {
            String::new()
        };
        writeln!(
            out,
            "  {marker}{name:<NAME_WIDTH$} {rarity:<8} {color:<5} {rating:>6} {synergy:>7} {count:>4}",
            marker = class_marker(card.rating_class()),
            name = truncate_name(&card.name),
            rarity = card.rarity.label(),
            color = card.color_identity.as_str(),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use draftrank_catalogue::{CardRatings, Rarity};
    use draftrank_evaluator::scoring_adapter::{FallbackReason, ScoreSource};

    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = vec![];
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn row(name: &str, rating: f64, baseline: f64, owned: u32) -> PickRow {
        PickRow {
            index: 0,
            name: name.to_owned(),
            rarity: Rarity::Special,
            color_identity: "UB".into(),
            owned,
            ratings: CardRatings::new(rating, baseline),
        }
    }

    #[test]
    fn test_snapshot_rows() {
        let snapshot = RatingSnapshot {
            seq: 1,
            rows: vec![row("Cosmic Lord", 75.3, 70.0, 2), row("Bog Wraith", 40.0, 45.0, 0)],
            matched: 5,
            baseline_source: ScoreSource::Model {
                output: "scores".to_owned(),
            },
            current_source: ScoreSource::Model {
                output: "scores".to_owned(),
            },
        };
        let text = render(|out| write_snapshot(out, &snapshot));
        let lines = text.lines().collect::<Vec<_>>();
        assert!(lines[2].contains("+Cosmic Lord"));
        assert!(lines[2].contains("Special"));
        assert!(lines[2].contains("+5.3"));
        assert!(lines[2].ends_with("x2"));
        assert!(lines[3].contains("-Bog Wraith"));
        assert!(lines[3].contains("-5.0"));
        assert!(lines[4].contains("3 more"));
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_fallback_note() {
        let source = ScoreSource::Fallback(FallbackReason::ModelUnavailable);
        let snapshot = RatingSnapshot {
            seq: 1,
            rows: vec![],
            matched: 0,
            baseline_source: source.clone(),
            current_source: source,
        };
        let text = render(|out| write_snapshot(out, &snapshot));
        assert!(text.contains("no cards match"));
        assert!(text.contains("neutral ratings in use (no scoring model is loaded)"));
    }

    #[test]
    fn test_degraded_message_replaces_table() {
        let view = PickOrderView::Degraded {
            message: "Error updating pick order: boom".to_owned(),
        };
        let text = render(|out| write_pick_order(out, &view));
        assert_eq!(text, "  Error updating pick order: boom\n");
    }

    #[test]
    fn test_long_names_are_truncated() {
        let name = "A".repeat(40);
        let short = truncate_name(&name);
        assert_eq!(short.chars().count(), NAME_WIDTH);
        assert!(short.ends_with('…'));
    }

    #[test]
    fn test_unrated_card() {
        let card = CardView {
            name: "Bog Wraith".to_owned(),
            rarity: Rarity::Uncommon,
            color_identity: "B".into(),
            count: 0,
            ratings: None,
        };
        let text = render(|out| write_cards(out, &[card], "empty"));
        assert!(text.starts_with("  ?Bog Wraith"));
        assert!(text.contains("N/A"));
        assert_eq!(render(|out| write_cards(out, &[], "No cards found")), "  No cards found\n");
    }
}
