use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use poi_atlas::{Poi, PoiStore, Visitor};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

const TOP_K: usize = 10;
const PAGE_STEP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Pois,
    Visitors,
    Statistics,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Pois => Page::Visitors,
            Page::Visitors => Page::Statistics,
            Page::Statistics => Page::Pois,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Pois => Page::Statistics,
            Page::Visitors => Page::Pois,
            Page::Statistics => Page::Visitors,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Pois => "Points of Interest",
            Page::Visitors => "Visitors",
            Page::Statistics => "Statistics",
        }
    }
}

/// Read-only browser over a store snapshot
pub struct App<'s> {
    pub store: &'s PoiStore,
    pub pois: Vec<&'s Poi>,
    pub visitors: Vec<&'s Visitor>,
    pub poi_state: TableState,
    pub visitor_state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
}

impl<'s> App<'s> {
    pub fn new(store: &'s PoiStore) -> Self {
        let pois: Vec<&Poi> = store.pois().collect();
        let visitors: Vec<&Visitor> = store.visitors().collect();

        let mut poi_state = TableState::default();
        if !pois.is_empty() {
            poi_state.select(Some(0));
        }
        let mut visitor_state = TableState::default();
        if !visitors.is_empty() {
            visitor_state.select(Some(0));
        }

        Self {
            store,
            pois,
            visitors,
            poi_state,
            visitor_state,
            current_page: Page::Pois,
            show_detail: false,
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn selected_poi(&self) -> Option<&'s Poi> {
        self.poi_state.selected().and_then(|i| self.pois.get(i).copied())
    }

    pub fn selected_visitor(&self) -> Option<&'s Visitor> {
        self.visitor_state.selected().and_then(|i| self.visitors.get(i).copied())
    }

    /// Table state and row count of the page being shown, if it has a table
    fn active_table(&mut self) -> Option<(&mut TableState, usize)> {
        match self.current_page {
            Page::Pois => Some((&mut self.poi_state, self.pois.len())),
            Page::Visitors => Some((&mut self.visitor_state, self.visitors.len())),
            Page::Statistics => None,
        }
    }

    pub fn next(&mut self) {
        if let Some((state, len)) = self.active_table() {
            if len == 0 {
                return;
            }
            let i = match state.selected() {
                Some(i) if i >= len - 1 => 0,
                Some(i) => i + 1,
                None => 0,
            };
            state.select(Some(i));
        }
    }

    pub fn previous(&mut self) {
        if let Some((state, len)) = self.active_table() {
            if len == 0 {
                return;
            }
            let i = match state.selected() {
                Some(0) | None => len - 1,
                Some(i) => i - 1,
            };
            state.select(Some(i));
        }
    }

    pub fn page_down(&mut self) {
        if let Some((state, len)) = self.active_table() {
            if len == 0 {
                return;
            }
            let i = state.selected().map_or(0, |i| (i + PAGE_STEP).min(len - 1));
            state.select(Some(i));
        }
    }

    pub fn page_up(&mut self) {
        if let Some((state, len)) = self.active_table() {
            if len == 0 {
                return;
            }
            let i = state.selected().map_or(0, |i| i.saturating_sub(PAGE_STEP));
            state.select(Some(i));
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let with_detail = app.show_detail && app.current_page != Page::Statistics;
    let (content, detail) = if with_detail {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);
        (split[0], Some(split[1]))
    } else {
        (chunks[1], None)
    };

    match app.current_page {
        Page::Pois => render_poi_table(f, content, app),
        Page::Visitors => render_visitor_table(f, content, app),
        Page::Statistics => render_statistics(f, content, app),
    }

    if let Some(area) = detail {
        match app.current_page {
            Page::Pois => render_poi_detail(f, area, app),
            _ => render_visitor_detail(f, area, app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn header_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

fn label(text: &str) -> Span<'static> {
    Span::styled(
        format!("  {}: ", text),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )
}

fn bordered(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title)
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in [Page::Pois, Page::Visitors, Page::Statistics].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Types: {}", app.store.schema().count()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("POIs: {}", app.pois.len()),
        Style::default().fg(Color::Green),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("Visitors: {}", app.visitors.len()),
        Style::default().fg(Color::Magenta),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(bordered("", Color::Cyan));
    f.render_widget(header, area);
}

fn render_poi_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header = Row::new(
        ["ID", "Name", "Type", "X", "Y", "Attributes"]
            .iter()
            .map(|h| Cell::from(*h).style(header_style())),
    )
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let store = app.store;
    let rows = app.pois.iter().map(|poi| {
        let set = store
            .poi_attributes(poi)
            .iter()
            .filter(|(_, value)| !value.is_unset())
            .count();
        let declared = poi.attributes.len();
        Row::new(vec![
            Cell::from(poi.id.to_string()),
            Cell::from(truncate(&poi.name, 30)),
            Cell::from(truncate(&poi.type_name, 18)).style(Style::default().fg(Color::Cyan)),
            Cell::from(poi.x.to_string()),
            Cell::from(poi.y.to_string()),
            Cell::from(format!("{}/{} set", set, declared)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(32),
            Constraint::Length(20),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(bordered(" Points of Interest ", Color::White))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.poi_state);
}

fn render_visitor_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header = Row::new(
        ["ID", "Name", "Nationality", "Visits", "Distinct POIs"]
            .iter()
            .map(|h| Cell::from(*h).style(header_style())),
    )
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows = app.visitors.iter().map(|visitor| {
        Row::new(vec![
            Cell::from(visitor.id.to_string()),
            Cell::from(truncate(&visitor.name, 30)),
            Cell::from(truncate(&visitor.nationality, 18)),
            Cell::from(visitor.visits.len().to_string()),
            Cell::from(visitor.distinct_pois().len().to_string()).style(Style::default().fg(Color::Green)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(32),
            Constraint::Length(20),
            Constraint::Length(8),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(bordered(" Visitors ", Color::White))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.visitor_state);
}

fn render_statistics(f: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let stats = app.store.statistics();

    let mut left = vec![Line::from(""), Line::from(Span::styled("  Top visitors", header_style()))];
    for (rank, entry) in stats.top_k_visitors(TOP_K).iter().enumerate() {
        left.push(Line::from(format!(
            "  {:>2}. {} (ID: {}) - {} POIs",
            rank + 1,
            entry.visitor.name,
            entry.visitor.id,
            entry.distinct_pois
        )));
    }
    left.push(Line::from(""));
    left.push(Line::from(Span::styled("  Top POIs", header_style())));
    for (rank, entry) in stats.top_k_pois(TOP_K).iter().enumerate() {
        left.push(Line::from(format!(
            "  {:>2}. {} (ID: {}) - {} visitors",
            rank + 1,
            entry.poi.name,
            entry.poi.id,
            entry.distinct_visitors
        )));
    }
    f.render_widget(Paragraph::new(left).block(bordered(" Rankings ", Color::White)), columns[0]);

    let mut right = vec![Line::from(""), Line::from(Span::styled("  POIs by type", header_style()))];
    for (type_name, count) in app.store.count_by_type() {
        right.push(Line::from(format!("  {}: {}", type_name, count)));
    }
    right.push(Line::from(""));
    right.push(Line::from(Span::styled("  Closest pair", header_style())));
    match app.store.spatial().closest_pair() {
        Some(pair) => right.push(Line::from(format!(
            "  {} (ID: {}) ↔ {} (ID: {}) - {:.6}",
            pair.first.name, pair.first.id, pair.second.name, pair.second.id, pair.distance
        ))),
        None => right.push(Line::from("  Not enough POIs to find a pair.")),
    }
    f.render_widget(Paragraph::new(right).block(bordered(" Map ", Color::White)), columns[1]);
}

fn render_poi_detail(f: &mut Frame, area: Rect, app: &App) {
    let Some(poi) = app.selected_poi() else {
        f.render_widget(Paragraph::new("No POI selected").block(bordered(" POI Details ", Color::Yellow)), area);
        return;
    };

    let mut content = vec![
        Line::from(""),
        Line::from(vec![label("Name"), Span::raw(poi.name.clone())]),
        Line::from(vec![label("Type"), Span::raw(poi.type_name.clone())]),
        Line::from(vec![label("Position"), Span::raw(format!("({}, {})", poi.x, poi.y))]),
        Line::from(""),
        Line::from(Span::styled(
            "  ATTRIBUTES",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(""),
    ];
    for (name, value) in app.store.poi_attributes(poi) {
        content.push(Line::from(vec![label(name), Span::raw(value.to_string())]));
    }

    let visitors = app
        .store
        .statistics()
        .poi_popularity()
        .into_iter()
        .find(|p| p.poi_id == poi.id)
        .map_or(0, |p| p.visitors);
    content.push(Line::from(""));
    content.push(Line::from(vec![label("Distinct visitors"), Span::raw(visitors.to_string())]));

    f.render_widget(Paragraph::new(content).block(bordered(" POI Details ", Color::Yellow)), area);
}

fn render_visitor_detail(f: &mut Frame, area: Rect, app: &App) {
    let Some(visitor) = app.selected_visitor() else {
        f.render_widget(
            Paragraph::new("No visitor selected").block(bordered(" Visitor Details ", Color::Yellow)),
            area,
        );
        return;
    };

    let mut content = vec![
        Line::from(""),
        Line::from(vec![label("Name"), Span::raw(visitor.name.clone())]),
        Line::from(vec![label("Nationality"), Span::raw(visitor.nationality.clone())]),
        Line::from(""),
        Line::from(Span::styled(
            "  VISITS",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(""),
    ];
    for visit in &visitor.visits {
        let poi_name = app.store.poi(visit.poi_id).map_or("UNKNOWN", |p| p.name.as_str());
        let rating = visit.rating.map_or_else(|| "-".to_string(), |r| r.to_string());
        content.push(Line::from(format!(
            "  {}  {} (ID: {})  rating {}",
            visit.date_string(),
            truncate(poi_name, 24),
            visit.poi_id,
            rating
        )));
    }

    f.render_widget(Paragraph::new(content).block(bordered(" Visitor Details ", Color::Yellow)), area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let position = match app.current_page {
        Page::Pois => Some((app.poi_state.selected(), app.pois.len())),
        Page::Visitors => Some((app.visitor_state.selected(), app.visitors.len())),
        Page::Statistics => None,
    };

    let mut status_spans = vec![];
    if let Some((selected, total)) = position {
        status_spans.push(Span::styled(
            format!(" Row: {}/{} ", selected.map_or(0, |i| i + 1), total),
            Style::default().fg(Color::Cyan),
        ));
        status_spans.push(Span::raw(" | "));
    }

    for (key, action, color) in [
        ("Enter", " Details | ", Color::Yellow),
        ("Tab", " Page | ", Color::Yellow),
        ("↑/↓", " Nav | ", Color::Yellow),
        ("PgUp/PgDn", " Fast | ", Color::Yellow),
        ("q", " Quit", Color::Red),
    ] {
        status_spans.push(Span::styled(key, Style::default().fg(color)));
        status_spans.push(Span::raw(action));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(bordered("", Color::White));
    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> PoiStore {
        let mut store = PoiStore::new();
        store.add_type("museum").unwrap();
        for i in 0..3 {
            store.add_poi(&format!("Museum {}", i), "museum", i, i).unwrap();
        }
        store.add_visitor("Ana", "PT");
        store
    }

    #[test]
    fn test_page_cycle() {
        assert_eq!(Page::Pois.next().next().next(), Page::Pois);
        assert_eq!(Page::Pois.previous(), Page::Statistics);
    }

    #[test]
    fn test_selection_wraps() {
        let store = sample_store();
        let mut app = App::new(&store);

        app.previous();
        assert_eq!(app.poi_state.selected(), Some(2));
        app.next();
        assert_eq!(app.poi_state.selected(), Some(0));
        app.page_down();
        assert_eq!(app.poi_state.selected(), Some(2));
        app.page_up();
        assert_eq!(app.poi_state.selected(), Some(0));
        assert_eq!(app.selected_poi().map(|p| p.name.as_str()), Some("Museum 0"));
    }

    #[test]
    fn test_navigation_follows_page() {
        let store = sample_store();
        let mut app = App::new(&store);
        app.next_page();
        app.next();

        assert_eq!(app.current_page, Page::Visitors);
        assert_eq!(app.visitor_state.selected(), Some(0));
        assert_eq!(app.poi_state.selected(), Some(0));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Musée du Louvre", 8), "Musée...");
    }
}
