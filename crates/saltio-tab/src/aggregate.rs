// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure aggregate functions over a tab's item list.
//!
//! `total_due` is the single authoritative fold — preview, close, and the
//! till's pending checks all go through it, so the paid/unpaid and
//! adjustment rules are applied identically everywhere.

use std::collections::HashMap;

use saltio_core::error::SaltioError;
use saltio_core::types::{ItemKind, OrderItem, Tab, TimeAdjustment};

/// Amount still owed: the sum of unpaid items' subtotals.
pub fn total_due(tab: &Tab) -> f64 {
    tab.items
        .iter()
        .filter(|item| !item.paid)
        .map(|item| item.subtotal)
        .sum()
}

/// Whether an item's billed time is protected from removal.
///
/// The originally contracted `timeBase` item must survive; operator-added
/// extras and overrides (marked as such in the description) may be
/// corrected by deletion.
pub fn is_protected(item: &OrderItem) -> bool {
    if item.kind != ItemKind::TimeBase {
        return false;
    }
    let description = item.description.to_ascii_lowercase();
    !(description.contains("extra") || description.contains("override"))
}

/// The effective quantity an adjustment yields for an item: the override
/// clamped to `[0, original_quantity]`.
fn effective_quantity(item: &OrderItem, adjustment: &TimeAdjustment) -> f64 {
    adjustment.new_quantity.clamp(0.0, item.quantity)
}

/// Computes the total due after applying time-adjustment overrides,
/// without mutating the tab.
///
/// Each override replaces a matching `additionalTime` item's quantity for
/// the purpose of the total and requires a non-empty reason whenever it
/// differs from the original. Adjustments keyed by sessions with no
/// matching `additionalTime` item are ignored.
pub fn preview_close(
    tab: &Tab,
    adjustments: &HashMap<String, TimeAdjustment>,
) -> Result<f64, SaltioError> {
    let mut total = 0.0;
    for item in &tab.items {
        if item.paid {
            continue;
        }
        match adjustment_for(item, adjustments) {
            Some(adjustment) => {
                let quantity = effective_quantity(item, adjustment);
                if (quantity - item.quantity).abs() > f64::EPSILON
                    && adjustment.reason.trim().is_empty()
                {
                    return Err(SaltioError::Validation(format!(
                        "a reason is required to adjust billed time for session {}",
                        item.session_id.as_deref().unwrap_or("?")
                    )));
                }
                total += quantity * item.unit_price;
            }
            None => total += item.subtotal,
        }
    }
    Ok(total)
}

/// Commits adjustments into the item rows: quantities and subtotals are
/// rewritten. Called only at close, after `preview_close` validated them.
pub fn commit_adjustments(tab: &mut Tab, adjustments: &HashMap<String, TimeAdjustment>) {
    for item in &mut tab.items {
        let Some(adjustment) = adjustment_for(item, adjustments) else {
            continue;
        };
        let quantity = effective_quantity(item, adjustment);
        item.quantity = quantity;
        item.subtotal = quantity * item.unit_price;
    }
}

fn adjustment_for<'a>(
    item: &OrderItem,
    adjustments: &'a HashMap<String, TimeAdjustment>,
) -> Option<&'a TimeAdjustment> {
    if item.kind != ItemKind::AdditionalTime {
        return None;
    }
    item.session_id
        .as_deref()
        .and_then(|session_id| adjustments.get(session_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use saltio_core::types::TabStatus;

    fn item(kind: ItemKind, quantity: f64, unit_price: f64, session_id: Option<&str>) -> OrderItem {
        OrderItem {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            description: "item".into(),
            quantity,
            unit_price,
            subtotal: quantity * unit_price,
            paid: false,
            session_id: session_id.map(str::to_string),
        }
    }

    fn tab_with(items: Vec<OrderItem>) -> Tab {
        Tab {
            id: "tab1".into(),
            company_id: "co1".into(),
            till_id: "t1".into(),
            session_ids: vec!["s1".into()],
            status: TabStatus::Open,
            items,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn total_due_excludes_paid_items() {
        let mut paid = item(ItemKind::Consumable, 2.0, 5.0, None);
        paid.paid = true;
        let tab = tab_with(vec![
            item(ItemKind::TimeBase, 1.0, 40.0, Some("s1")),
            item(ItemKind::Consumable, 3.0, 4.0, None),
            paid,
        ]);
        assert_eq!(total_due(&tab), 52.0);
    }

    #[test]
    fn time_base_items_are_protected() {
        let base = item(ItemKind::TimeBase, 1.0, 40.0, Some("s1"));
        assert!(is_protected(&base));

        let mut extra = item(ItemKind::TimeBase, 0.5, 40.0, Some("s1"));
        extra.description = "Extra half hour (override)".into();
        assert!(!is_protected(&extra));

        let additional = item(ItemKind::AdditionalTime, 0.5, 40.0, Some("s1"));
        assert!(!is_protected(&additional));
    }

    #[test]
    fn preview_applies_adjustment_with_reason() {
        let tab = tab_with(vec![
            item(ItemKind::TimeBase, 1.0, 40.0, Some("s1")),
            item(ItemKind::AdditionalTime, 0.5, 40.0, Some("s1")),
        ]);
        let adjustments = HashMap::from([(
            "s1".to_string(),
            TimeAdjustment {
                new_quantity: 0.25,
                reason: "customer left early".into(),
            },
        )]);

        // 40 base + 0.25 * 40 adjusted.
        assert_eq!(preview_close(&tab, &adjustments).unwrap(), 50.0);
        // The tab itself is untouched.
        assert_eq!(total_due(&tab), 60.0);
    }

    #[test]
    fn preview_requires_reason_when_quantity_changes() {
        let tab = tab_with(vec![item(ItemKind::AdditionalTime, 0.5, 40.0, Some("s1"))]);
        let adjustments = HashMap::from([(
            "s1".to_string(),
            TimeAdjustment {
                new_quantity: 0.25,
                reason: "  ".into(),
            },
        )]);
        assert!(matches!(
            preview_close(&tab, &adjustments),
            Err(SaltioError::Validation(_))
        ));
    }

    #[test]
    fn preview_allows_blank_reason_when_unchanged() {
        let tab = tab_with(vec![item(ItemKind::AdditionalTime, 0.5, 40.0, Some("s1"))]);
        let adjustments = HashMap::from([(
            "s1".to_string(),
            TimeAdjustment {
                new_quantity: 0.5,
                reason: String::new(),
            },
        )]);
        assert_eq!(preview_close(&tab, &adjustments).unwrap(), 20.0);
    }

    #[test]
    fn adjustment_clamps_to_original_quantity() {
        let tab = tab_with(vec![item(ItemKind::AdditionalTime, 0.5, 40.0, Some("s1"))]);
        let adjustments = HashMap::from([(
            "s1".to_string(),
            TimeAdjustment {
                new_quantity: 2.0,
                reason: "typo".into(),
            },
        )]);
        // Clamped back to the original 0.5 -> unchanged total.
        assert_eq!(preview_close(&tab, &adjustments).unwrap(), 20.0);
    }

    #[test]
    fn adjustment_for_unknown_session_is_ignored() {
        let tab = tab_with(vec![item(ItemKind::AdditionalTime, 0.5, 40.0, Some("s1"))]);
        let adjustments = HashMap::from([(
            "other".to_string(),
            TimeAdjustment {
                new_quantity: 0.0,
                reason: "n/a".into(),
            },
        )]);
        assert_eq!(preview_close(&tab, &adjustments).unwrap(), 20.0);
    }

    #[test]
    fn adjustments_never_touch_time_base_items() {
        let tab = tab_with(vec![item(ItemKind::TimeBase, 1.0, 40.0, Some("s1"))]);
        let adjustments = HashMap::from([(
            "s1".to_string(),
            TimeAdjustment {
                new_quantity: 0.0,
                reason: "should not apply".into(),
            },
        )]);
        assert_eq!(preview_close(&tab, &adjustments).unwrap(), 40.0);
    }

    #[test]
    fn commit_rewrites_quantities_and_subtotals() {
        let mut tab = tab_with(vec![
            item(ItemKind::TimeBase, 1.0, 40.0, Some("s1")),
            item(ItemKind::AdditionalTime, 0.5, 40.0, Some("s1")),
        ]);
        let adjustments = HashMap::from([(
            "s1".to_string(),
            TimeAdjustment {
                new_quantity: 0.25,
                reason: "left early".into(),
            },
        )]);

        commit_adjustments(&mut tab, &adjustments);
        assert_eq!(tab.items[1].quantity, 0.25);
        assert_eq!(tab.items[1].subtotal, 10.0);
        // timeBase untouched.
        assert_eq!(tab.items[0].subtotal, 40.0);
    }
}
