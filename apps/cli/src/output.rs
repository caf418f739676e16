//! Output formatting for the terminal.
//!
//! Everything writes to a caller-supplied `Write` so commands can be tested
//! against a buffer.

use std::io::{self, Write};

use hissa_core::{Amount, Bill, DistributionPolicy, Item, ParticipantId, Session};

/// Per-participant bill summary printed after every change.
///
/// ```text
/// Service charge: 10%
///   Alice          16,500 so'm  (15,000 +1,500)
///   Bob             5,500 so'm  (5,000 +500)
///   Carol               0 so'm
/// Not charged to anyone: Water
/// TOTAL            22,000 so'm  (20,000 +2,000)
/// ```
pub fn write_bill(
    out: &mut impl Write,
    bill: &Bill,
    session: &Session,
    currency: &str,
) -> io::Result<()> {
    writeln!(out, "Service charge: {}%", bill.service_rate)?;

    let width = session
        .participants()
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("TOTAL".len());

    for participant in session.participants() {
        let Some(person) = bill.participant(&participant.id) else {
            continue;
        };

        if person.is_empty() {
            writeln!(
                out,
                "  {:<width$}  {:>12} {}",
                person.name,
                Amount::zero(),
                currency
            )?;
        } else {
            writeln!(
                out,
                "  {:<width$}  {:>12} {}  ({} {})",
                person.name,
                person.final_due,
                currency,
                person.subtotal,
                person.service_share.signed()
            )?;
        }
    }

    let orphaned: Vec<&str> = bill
        .orphaned_items
        .iter()
        .filter_map(|id| session.item(id))
        .map(|item| item.name.as_str())
        .collect();
    if !orphaned.is_empty() {
        writeln!(out, "Not charged to anyone: {}", orphaned.join(", "))?;
    }

    writeln!(
        out,
        "{:<w$}  {:>12} {}  ({} {})",
        "TOTAL",
        bill.overall_grand_total,
        currency,
        bill.overall_subtotal,
        bill.overall_service_amount.signed(),
        w = width + 2
    )
}

/// Participants with their ids.
pub fn write_participants(out: &mut impl Write, session: &Session) -> io::Result<()> {
    if session.participants().is_empty() {
        return writeln!(out, "No participants");
    }

    for participant in session.participants() {
        writeln!(out, "{}  {}", participant.id, participant.name)?;
    }
    Ok(())
}

/// Items with price, quantity, policy and allocation.
pub fn write_items(out: &mut impl Write, session: &Session, currency: &str) -> io::Result<()> {
    if session.items().is_empty() {
        return writeln!(out, "No items");
    }

    for item in session.items() {
        writeln!(
            out,
            "{}  {}  {} × {} = {} {}  [{}]",
            item.id,
            item.name,
            Amount::new(item.unit_price),
            item.quantity,
            item.total_cost(),
            currency,
            item.policy
        )?;

        if let Some(detail) = allocation_summary(item, session) {
            writeln!(out, "    {}", detail)?;
        }
    }
    Ok(())
}

/// `Alice, Carol` or `Alice ×3, Bob ×1`; removed participants show by id.
fn allocation_summary(item: &Item, session: &Session) -> Option<String> {
    let name = |id: &ParticipantId| {
        session
            .participant(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("{} (removed)", id))
    };

    let parts: Vec<String> = match item.policy {
        DistributionPolicy::EqualAmongAll => return None,
        DistributionPolicy::EqualAmongSelected => {
            item.allocation.positive().map(|(id, _)| name(id)).collect()
        }
        DistributionPolicy::ByUnitCount => item
            .allocation
            .positive()
            .map(|(id, units)| format!("{} ×{}", name(id), units))
            .collect(),
    };

    Some(parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hissa_core::{compute_bill, ItemDraft};

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_bill_summary() {
        let mut session = Session::new();
        let alice = session.add_participant("Alice").unwrap().id.clone();
        session.add_participant("Bob").unwrap();
        session.add_participant("Carol").unwrap();
        session
            .upsert_item(
                ItemDraft::new("Beer", "5000", "3", DistributionPolicy::ByUnitCount)
                    .assign(alice, 3.0),
                None,
            )
            .unwrap();
        let bill = compute_bill(&session);

        let text = render(|out| write_bill(out, &bill, &session, "so'm"));

        assert!(text.starts_with("Service charge: 10%\n"));
        let alice_row = format!("  Alice  {:>12} so'm  (15,000 +1,500)\n", "16,500");
        assert!(text.contains(&alice_row));
        assert!(text.contains(&format!("  Carol  {:>12} so'm\n", "0")));
        assert!(text.contains("TOTAL"));
        assert!(text.ends_with("16,500 so'm  (15,000 +1,500)\n"));
    }

    #[test]
    fn test_bill_summary_with_discount() {
        let mut session = Session::new();
        session.add_participant("Alice").unwrap();
        session.set_service_charge_rate(-10.0).unwrap();
        session
            .upsert_item(
                ItemDraft::new("Osh", "20000", "1", DistributionPolicy::EqualAmongAll),
                None,
            )
            .unwrap();
        let bill = compute_bill(&session);

        let text = render(|out| write_bill(out, &bill, &session, "so'm"));

        assert!(text.contains("(20,000 -2,000)\n"));
        assert!(!text.contains("+ -"));
        assert!(!text.contains("+-"));
    }

    #[test]
    fn test_orphaned_items_named() {
        let mut session = Session::new();
        session
            .upsert_item(
                ItemDraft::new("Water", "2000", "1", DistributionPolicy::EqualAmongAll),
                None,
            )
            .unwrap();
        let bill = compute_bill(&session);

        let text = render(|out| write_bill(out, &bill, &session, "so'm"));
        assert!(text.contains("Not charged to anyone: Water\n"));
    }

    #[test]
    fn test_item_list_shows_allocation() {
        let mut session = Session::new();
        let alice = session.add_participant("Alice").unwrap().id.clone();
        let bob = session.add_participant("Bob").unwrap().id.clone();
        session
            .upsert_item(
                ItemDraft::new("Pizza", "30000", "1", DistributionPolicy::EqualAmongSelected)
                    .select(alice)
                    .select(bob.clone()),
                None,
            )
            .unwrap();
        session.remove_participant(&bob).unwrap();

        let text = render(|out| write_items(out, &session, "so'm"));

        assert!(text.contains("Pizza  30,000 × 1 = 30,000 so'm  [selected]"));
        assert!(text.contains("Alice"));
        assert!(text.contains(&format!("{} (removed)", bob)));
    }

    #[test]
    fn test_empty_lists() {
        let session = Session::new();
        assert_eq!(
            render(|out| write_participants(out, &session)),
            "No participants\n"
        );
        assert_eq!(
            render(|out| write_items(out, &session, "so'm")),
            "No items\n"
        );
    }
}
