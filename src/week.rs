use crate::dates::CalendarDate;

pub const DAYS_IN_WEEK: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: CalendarDate,
    pub day_name: &'static str,
    pub day_number: u32,
    pub is_selected: bool,
    pub is_today: bool,
}

/// Emitted when the user commits to a day. The app turns this into a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSelected(pub CalendarDate);

/// The Sunday-aligned week strip. `selected` drives data fetching, `nav_center`
/// drives which week is on screen; browsing moves only the latter.
#[derive(Debug, Clone)]
pub struct WeekView {
    selected: CalendarDate,
    nav_center: CalendarDate,
    cursor: usize,
}

impl WeekView {
    pub fn new(selected: CalendarDate) -> Self {
        Self {
            selected,
            nav_center: selected,
            cursor: selected.weekday_from_sunday() as usize,
        }
    }

    pub fn selected(&self) -> CalendarDate {
        self.selected
    }

    pub fn nav_center(&self) -> CalendarDate {
        self.nav_center
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn week(&self) -> [CalendarDate; DAYS_IN_WEEK] {
        compute_week(self.nav_center)
    }

    pub fn cells(&self, today: CalendarDate) -> [DayCell; DAYS_IN_WEEK] {
        render(&self.week(), self.selected, today)
    }

    /// Shifts the displayed week without touching the selection.
    pub fn navigate(&mut self, offset_days: i64) {
        self.nav_center = self.nav_center.add_days(offset_days);
    }

    pub fn select_day(&mut self, date: CalendarDate) -> DateSelected {
        self.selected = date;
        self.nav_center = date;
        self.cursor = date.weekday_from_sunday() as usize;
        DateSelected(date)
    }

    /// Moves the keyboard cursor within the displayed week, stopping at the edges.
    pub fn move_cursor(&mut self, delta: isize) {
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, DAYS_IN_WEEK as isize - 1) as usize;
    }

    pub fn cursor_date(&self) -> CalendarDate {
        self.week()[self.cursor]
    }
}

/// The 7 days starting from the Sunday on or before `center`.
pub fn compute_week(center: CalendarDate) -> [CalendarDate; DAYS_IN_WEEK] {
    let start = center.add_days(-(center.weekday_from_sunday() as i64));
    std::array::from_fn(|i| start.add_days(i as i64))
}

pub fn render(
    week: &[CalendarDate; DAYS_IN_WEEK],
    selected: CalendarDate,
    today: CalendarDate,
) -> [DayCell; DAYS_IN_WEEK] {
    std::array::from_fn(|i| {
        let date = week[i];
        DayCell {
            date,
            day_name: date.day_name(),
            day_number: date.day(),
            is_selected: date == selected,
            is_today: date == today,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::from_ymd(y, m, d).unwrap()
    }

    fn assert_sunday_run(week: &[CalendarDate; DAYS_IN_WEEK]) {
        assert_eq!(week[0].weekday_from_sunday(), 0);
        for pair in week.windows(2) {
            assert_eq!(pair[0].add_days(1), pair[1]);
        }
    }

    #[test]
    fn test_week_starts_on_sunday() {
        let week = compute_week(date(2024, 3, 13));
        assert_eq!(week[0], date(2024, 3, 10));
        assert_eq!(week[6], date(2024, 3, 16));
        assert_sunday_run(&week);
    }

    #[test]
    fn test_week_crosses_year_boundary() {
        let week = compute_week(date(2024, 1, 1));
        assert_eq!(week[0], date(2023, 12, 31));
        assert_eq!(week[1], date(2024, 1, 1));
        assert_sunday_run(&week);
    }

    #[test]
    fn test_week_for_every_day_of_a_leap_year() {
        let mut day = date(2024, 1, 1);
        while day.year() == 2024 {
            let week = compute_week(day);
            assert_sunday_run(&week);
            assert!(week.contains(&day));
            day = day.add_days(1);
        }
    }

    #[test]
    fn test_sunday_center_is_week_start() {
        let sunday = date(2024, 9, 1);
        assert_eq!(compute_week(sunday)[0], sunday);
    }

    #[test]
    fn test_render_marks_today_and_selected() {
        let week = compute_week(date(2024, 3, 13));
        let cells = render(&week, date(2024, 3, 11), date(2024, 3, 14));

        assert_eq!(cells.iter().filter(|c| c.is_today).count(), 1);
        assert_eq!(cells.iter().filter(|c| c.is_selected).count(), 1);
        assert!(cells[4].is_today);
        assert!(cells[1].is_selected);
        assert_eq!(cells[0].day_name, "Sun");
        assert_eq!(cells[0].day_number, 10);
    }

    #[test]
    fn test_render_without_today_or_selection_in_range() {
        let week = compute_week(date(2024, 3, 13));
        let cells = render(&week, date(2024, 5, 1), date(2024, 6, 1));
        assert!(cells.iter().all(|c| !c.is_today && !c.is_selected));
    }

    #[test]
    fn test_navigate_round_trip_keeps_selection() {
        let selected = date(2024, 2, 27);
        let mut view = WeekView::new(selected);

        view.navigate(7);
        assert_eq!(view.nav_center(), date(2024, 3, 5));
        assert_eq!(view.selected(), selected);
        assert!(view.cells(selected).iter().all(|c| !c.is_selected));

        view.navigate(-7);
        assert_eq!(view.nav_center(), selected);
        assert_eq!(view.selected(), selected);
    }

    #[test]
    fn test_select_day_recenters() {
        let mut view = WeekView::new(date(2024, 2, 27));
        view.navigate(14);
        let event = view.select_day(date(2024, 3, 15));

        assert_eq!(event, DateSelected(date(2024, 3, 15)));
        assert_eq!(view.selected(), date(2024, 3, 15));
        assert_eq!(view.nav_center(), date(2024, 3, 15));
        assert_eq!(view.cursor(), 5);
    }

    #[test]
    fn test_cursor_stays_within_week() {
        let mut view = WeekView::new(date(2024, 3, 10));
        assert_eq!(view.cursor(), 0);
        view.move_cursor(-3);
        assert_eq!(view.cursor(), 0);
        view.move_cursor(10);
        assert_eq!(view.cursor(), 6);
        assert_eq!(view.cursor_date(), date(2024, 3, 16));

        view.navigate(-7);
        assert_eq!(view.cursor_date(), date(2024, 3, 9));
    }
}
