//! Optimistic list overlay for the pantry and ingredient editors.
//!
//! A submitted entry is shown immediately as an unconfirmed overlay record;
//! once the in-flight mutation settles back to idle the authoritative list
//! has been refetched and the whole overlay is discarded. Clearing is
//! last-mutation-wins, not per-record acknowledgment.

use rand::Rng;

/// Three-phase status of a list mutation, as observed by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Loading,
}

/// Display ordering for a merged list. Pantry items sort by name; recipe
/// ingredients keep insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    ByName,
    Insertion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    pub id: i64,
    pub name: String,
    pub amount: Option<String>,
    pub optimistic: bool,
}

impl DisplayItem {
    pub fn confirmed(id: i64, name: impl Into<String>, amount: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            amount,
            optimistic: false,
        }
    }
}

#[derive(Debug)]
pub struct OptimisticList {
    order: ListOrder,
    overlay: Vec<DisplayItem>,
    authoritative: Vec<DisplayItem>,
}

impl OptimisticList {
    pub fn new(order: ListOrder) -> Self {
        Self {
            order,
            overlay: Vec::new(),
            authoritative: Vec::new(),
        }
    }

    pub fn with_authoritative(order: ListOrder, items: Vec<DisplayItem>) -> Self {
        let mut list = Self::new(order);
        list.set_authoritative(items);
        list
    }

    /// Replaces the authoritative list after a refetch.
    pub fn set_authoritative(&mut self, items: Vec<DisplayItem>) {
        self.authoritative = items;
    }

    /// Appends an unconfirmed entry and returns its locally generated id.
    /// The id is drawn far above any plausible row id so it cannot collide
    /// with a server-assigned one within the overlay's lifetime.
    pub fn add_optimistic(&mut self, name: impl Into<String>, amount: Option<String>) -> i64 {
        let id = self.local_id();
        self.overlay.push(DisplayItem {
            id,
            name: name.into(),
            amount,
            optimistic: true,
        });
        id
    }

    fn local_id(&self) -> i64 {
        let mut rng = rand::thread_rng();
        loop {
            let candidate = rng.gen_range(1_000_000_000_000i64..i64::MAX);
            if !self.overlay.iter().any(|item| item.id == candidate) {
                return candidate;
            }
        }
    }

    /// Overlay and authoritative entries combined in display order.
    pub fn merged(&self) -> Vec<DisplayItem> {
        match self.order {
            ListOrder::ByName => {
                let mut merged: Vec<DisplayItem> = self
                    .overlay
                    .iter()
                    .chain(self.authoritative.iter())
                    .cloned()
                    .collect();
                merged.sort_by(|a, b| a.name.cmp(&b.name));
                merged
            }
            ListOrder::Insertion => self
                .authoritative
                .iter()
                .chain(self.overlay.iter())
                .cloned()
                .collect(),
        }
    }

    /// Called whenever the mutation's submission state changes. On the
    /// transition back to idle the authoritative list is current again and
    /// the overlay has served its purpose.
    pub fn on_submission_state(&mut self, state: SubmissionState) {
        if state == SubmissionState::Idle {
            self.overlay.clear();
        }
    }

    pub fn pending(&self) -> usize {
        self.overlay.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[DisplayItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn added_entry_appears_immediately() {
        let mut list = OptimisticList::new(ListOrder::ByName);
        list.add_optimistic("Milk", None);

        let merged = list.merged();
        assert_eq!(names(&merged), vec!["Milk"]);
        assert!(merged[0].optimistic);
    }

    #[test]
    fn merged_sorts_by_name_across_overlay_and_authoritative() {
        let mut list = OptimisticList::with_authoritative(
            ListOrder::ByName,
            vec![
                DisplayItem::confirmed(1, "Cheese", None),
                DisplayItem::confirmed(2, "Yogurt", None),
            ],
        );
        list.add_optimistic("Eggs", None);

        assert_eq!(names(&list.merged()), vec!["Cheese", "Eggs", "Yogurt"]);
    }

    #[test]
    fn insertion_order_appends_overlay_after_authoritative() {
        let mut list = OptimisticList::with_authoritative(
            ListOrder::Insertion,
            vec![
                DisplayItem::confirmed(1, "Spaghetti", Some("200g".into())),
                DisplayItem::confirmed(2, "Ground beef", Some("300g".into())),
            ],
        );
        list.add_optimistic("Garlic", Some("2 cloves".into()));

        assert_eq!(
            names(&list.merged()),
            vec!["Spaghetti", "Ground beef", "Garlic"]
        );
    }

    #[test]
    fn idle_clears_overlay_and_authoritative_wins() {
        let mut list = OptimisticList::new(ListOrder::ByName);
        list.add_optimistic("Milk", None);
        assert_eq!(list.pending(), 1);

        // Refetch completed: server list now contains the confirmed record.
        list.set_authoritative(vec![DisplayItem::confirmed(7, "Milk", None)]);
        list.on_submission_state(SubmissionState::Idle);

        let merged = list.merged();
        assert_eq!(names(&merged), vec!["Milk"]);
        assert!(!merged[0].optimistic);
        assert_eq!(merged[0].id, 7);
    }

    #[test]
    fn submitting_and_loading_do_not_clear() {
        let mut list = OptimisticList::new(ListOrder::ByName);
        list.add_optimistic("Milk", None);

        list.on_submission_state(SubmissionState::Submitting);
        assert_eq!(list.pending(), 1);
        list.on_submission_state(SubmissionState::Loading);
        assert_eq!(list.pending(), 1);
        list.on_submission_state(SubmissionState::Idle);
        assert_eq!(list.pending(), 0);
    }

    #[test]
    fn rapid_double_submission_clears_both_entries_together() {
        // Last-mutation-wins policy: the first mutation's idle transition
        // discards every pending entry, including one whose own request has
        // not settled yet. The second entry reappears with the next refetch.
        let mut list = OptimisticList::new(ListOrder::ByName);
        list.add_optimistic("Milk", None);
        list.add_optimistic("Eggs", None);

        list.set_authoritative(vec![DisplayItem::confirmed(7, "Milk", None)]);
        list.on_submission_state(SubmissionState::Idle);

        assert_eq!(names(&list.merged()), vec!["Milk"]);
    }

    #[test]
    fn local_ids_are_unique_within_overlay() {
        let mut list = OptimisticList::new(ListOrder::Insertion);
        let mut ids: Vec<i64> = (0..50)
            .map(|i| list.add_optimistic(format!("item-{i}"), None))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 50);
        assert!(ids.iter().all(|&id| id >= 1_000_000_000_000));
    }
}
