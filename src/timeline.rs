use chrono::NaiveDate;

const POSITION_MIN: f64 = 15.0;
const POSITION_SPAN: f64 = 80.0;
const MIN_SEPARATION: f64 = 10.0;
const END_PADDING: f64 = 0.2;

const ZOOM_MIN: f64 = 50.0;
const ZOOM_MAX: f64 = 200.0;
const ZOOM_STEP: f64 = 10.0;
const WHEEL_ZOOM_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Vision,
    Bhag,
    Milestone,
    Journal,
}

impl ItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Vision => "vision",
            ItemKind::Bhag => "bhag",
            ItemKind::Milestone => "milestone",
            ItemKind::Journal => "journal",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimelineItem {
    pub id: String,
    pub kind: ItemKind,
    pub content: String,
    pub target_date: NaiveDate,
    pub completed: bool,
}

impl TimelineItem {
    /// Render key. Ids are only unique within one record kind, so the kind is
    /// part of the key.
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind.label(), self.id)
    }
}

#[derive(Debug, Clone)]
pub struct PlacedItem {
    pub item: TimelineItem,
    /// Percent of the track width. Nominally within [15, 95]; the separation
    /// pass may push clustered items past 95.
    pub position: f64,
}

/// Map dated items onto the track, sorted ascending by date. The domain runs
/// from `min(today, earliest)` to 20% past the latest item; a second pass
/// spaces adjacent markers at least `MIN_SEPARATION` apart, without
/// renormalizing afterward.
pub fn project(items: Vec<TimelineItem>, today: NaiveDate) -> Vec<PlacedItem> {
    if items.is_empty() {
        return Vec::new();
    }

    let mut items = items;
    items.sort_by_key(|item| item.target_date);

    let earliest = items[0].target_date;
    let latest = items[items.len() - 1].target_date;

    if earliest == latest {
        return items
            .into_iter()
            .map(|item| PlacedItem {
                item,
                position: 50.0,
            })
            .collect();
    }

    let start = today.min(earliest);
    let raw_span = (latest - start).num_days() as f64;
    let padded_span = raw_span * (1.0 + END_PADDING);

    let mut placed: Vec<PlacedItem> = items
        .into_iter()
        .map(|item| {
            let offset = (item.target_date - start).num_days() as f64;
            PlacedItem {
                item,
                position: POSITION_MIN + (offset / padded_span) * POSITION_SPAN,
            }
        })
        .collect();

    for i in 1..placed.len() {
        let floor = placed[i - 1].position + MIN_SEPARATION;
        if placed[i].position < floor {
            placed[i].position = floor;
        }
    }

    placed
}

/// Visual scale and offset for one timeline surface; zooming re-maps rendered
/// coordinates, never item positions.
#[derive(Debug, Clone)]
pub struct ZoomPan {
    zoom: f64,
    pan: f64,
    drag_anchor: Option<f64>,
}

impl Default for ZoomPan {
    fn default() -> Self {
        ZoomPan {
            zoom: 100.0,
            pan: 0.0,
            drag_anchor: None,
        }
    }
}

impl ZoomPan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> f64 {
        self.pan
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Consumes the event (returns true) only when the zoom modifier is held.
    pub fn on_wheel(&mut self, delta_y: f64, modifier_held: bool) -> bool {
        if !modifier_held {
            return false;
        }
        self.zoom = (self.zoom - delta_y * WHEEL_ZOOM_FACTOR).clamp(ZOOM_MIN, ZOOM_MAX);
        true
    }

    pub fn drag_start(&mut self, pointer_x: f64) {
        self.drag_anchor = Some(pointer_x);
    }

    // No-op unless a drag is active.
    pub fn drag_move(&mut self, pointer_x: f64) {
        if let Some(last) = self.drag_anchor {
            self.pan += pointer_x - last;
            self.drag_anchor = Some(pointer_x);
        }
    }

    pub fn drag_end(&mut self) {
        self.drag_anchor = None;
    }

    pub fn reset(&mut self) {
        self.zoom = 100.0;
        self.pan = 0.0;
        self.drag_anchor = None;
    }

    pub fn to_column(&self, position: f64, width: u16) -> i64 {
        let scaled = position / 100.0 * width as f64 * (self.zoom / 100.0);
        (scaled + self.pan).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(id: &str, target: NaiveDate) -> TimelineItem {
        TimelineItem {
            id: id.to_string(),
            kind: ItemKind::Milestone,
            content: format!("milestone {}", id),
            target_date: target,
            completed: false,
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let placed = project(Vec::new(), date(2026, 3, 1));
        assert!(placed.is_empty());
    }

    #[test]
    fn single_item_is_centered_regardless_of_date() {
        for target in [date(2020, 1, 1), date(2026, 3, 1), date(2040, 12, 31)] {
            let placed = project(vec![item("a", target)], date(2026, 3, 1));
            assert_eq!(placed.len(), 1);
            assert_eq!(placed[0].position, 50.0);
        }
    }

    #[test]
    fn identical_dates_all_centered() {
        let shared = date(2027, 6, 15);
        let placed = project(
            vec![item("a", shared), item("b", shared), item("c", shared)],
            date(2026, 3, 1),
        );
        assert_eq!(placed.len(), 3);
        for p in &placed {
            assert_eq!(p.position, 50.0);
        }
    }

    #[test]
    fn well_separated_dates_are_strictly_increasing() {
        let today = date(2026, 1, 1);
        let items = vec![
            item("a", date(2026, 2, 1)),
            item("b", date(2026, 8, 1)),
            item("c", date(2027, 3, 1)),
            item("d", date(2027, 11, 1)),
        ];
        let placed = project(items, today);
        for pair in placed.windows(2) {
            assert!(pair[0].position < pair[1].position);
        }
    }

    #[test]
    fn output_is_sorted_by_date() {
        let today = date(2026, 1, 1);
        let items = vec![
            item("late", date(2027, 1, 1)),
            item("early", date(2026, 2, 1)),
            item("mid", date(2026, 7, 1)),
        ];
        let placed = project(items, today);
        let ids: Vec<&str> = placed.iter().map(|p| p.item.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "mid", "late"]);
    }

    #[test]
    fn domain_floors_at_today_for_future_items() {
        // Both items in the future: the domain starts at today, so the
        // earliest item does not land at the left edge.
        let today = date(2026, 1, 1);
        let placed = project(
            vec![item("a", date(2026, 7, 1)), item("b", date(2027, 1, 1))],
            today,
        );
        assert!(placed[0].position > 15.0);

        // An item exactly on today maps to the left edge.
        let placed = project(
            vec![item("a", today), item("b", date(2027, 1, 1))],
            today,
        );
        assert_eq!(placed[0].position, 15.0);
    }

    #[test]
    fn end_padding_keeps_latest_off_the_right_edge() {
        let today = date(2026, 1, 1);
        let placed = project(
            vec![item("a", today), item("b", date(2027, 1, 1))],
            today,
        );
        let last = placed.last().unwrap().position;
        assert!(last < 95.0);
        // 15 + (1/1.2) * 80 = 81.67
        assert!((last - 81.666).abs() < 0.01);
    }

    #[test]
    fn clustered_items_get_minimum_separation() {
        // Two items one day apart inside a multi-year span: raw positions
        // differ by well under 10, the pass pushes them exactly 10 apart.
        let today = date(2026, 1, 1);
        let placed = project(
            vec![
                item("a", date(2026, 6, 1)),
                item("b", date(2026, 6, 2)),
                item("c", date(2030, 1, 1)),
            ],
            today,
        );
        let gap = placed[1].position - placed[0].position;
        assert!((gap - 10.0).abs() < 1e-9);
    }

    #[test]
    fn separation_pass_does_not_renormalize() {
        // Many items clustered near the end: later ones overflow past 95
        // instead of being squeezed back in.
        let today = date(2026, 1, 1);
        let cluster = date(2027, 1, 1);
        let mut items: Vec<TimelineItem> = (0..8)
            .map(|i| {
                item(
                    &format!("c{}", i),
                    cluster + chrono::Duration::days(i),
                )
            })
            .collect();
        items.push(item("anchor", today));
        let placed = project(items, today);
        assert!(placed.last().unwrap().position > 95.0);
    }

    #[test]
    fn zoom_clamps_at_both_ends() {
        let mut zp = ZoomPan::new();
        for _ in 0..50 {
            zp.zoom_in();
        }
        assert_eq!(zp.zoom(), 200.0);
        for _ in 0..50 {
            zp.zoom_out();
        }
        assert_eq!(zp.zoom(), 50.0);
    }

    #[test]
    fn wheel_without_modifier_is_not_consumed() {
        let mut zp = ZoomPan::new();
        assert!(!zp.on_wheel(-40.0, false));
        assert_eq!(zp.zoom(), 100.0);
        assert!(zp.on_wheel(-40.0, true));
        assert_eq!(zp.zoom(), 120.0);
    }

    #[test]
    fn drag_pans_and_releases() {
        let mut zp = ZoomPan::new();
        zp.drag_move(30.0);
        assert_eq!(zp.pan(), 0.0);

        zp.drag_start(10.0);
        zp.drag_move(25.0);
        zp.drag_move(20.0);
        assert_eq!(zp.pan(), 10.0);
        zp.drag_end();
        zp.drag_move(100.0);
        assert_eq!(zp.pan(), 10.0);
    }

    #[test]
    fn pan_is_unclamped() {
        let mut zp = ZoomPan::new();
        zp.drag_start(0.0);
        zp.drag_move(-5000.0);
        assert_eq!(zp.pan(), -5000.0);
    }
}
