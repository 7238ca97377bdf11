use crate::app::{App, Screen};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Line, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use ygodraft_core::{type_breakdown, DeckSection};

pub fn draw(frame: &mut Frame, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(8),
        ])
        .split(frame.area());

    draw_header(frame, root[0], app);
    match app.screen {
        Screen::SetPick => draw_set_pick(frame, root[1], app),
        Screen::Drafting => draw_drafting(frame, root[1], app),
        Screen::Discard => draw_discard(frame, root[1], app),
        Screen::Complete => draw_complete(frame, root[1], app),
    }
    draw_events(frame, root[2], app);

    if app.show_help {
        draw_help(frame);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let headline = match app.screen {
        Screen::SetPick => format!(
            "Select packs: {}/{} chosen",
            app.pack_total(),
            app.rules().pack_max
        ),
        Screen::Drafting => match app.session.as_ref() {
            Some(session) => format!(
                "Pack {}/{} | picks left {} | discard stages {}/{}",
                session.total_packs(),
                session.rules().pack_max,
                session.picks_left(),
                session.discard_stages_done(),
                session.rules().discard_stages
            ),
            None => "Drafting".to_string(),
        },
        Screen::Discard => match app
            .session
            .as_ref()
            .and_then(|session| session.discard_stage())
        {
            Some(stage) => format!(
                "Discard stage | kept {}/{} | side {}/{}",
                stage.kept_total(),
                stage.deck_target,
                stage.kept(DeckSection::Side),
                stage.side_target
            ),
            None => "Discard stage".to_string(),
        },
        Screen::Complete => "Draft complete".to_string(),
    };
    let lines = vec![
        Line::from(headline),
        Line::from(format!("Status: {}", app.status_line)),
    ];
    let block = Block::default().borders(Borders::ALL).title("ygodraft");
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), area);
}

fn draw_set_pick(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .catalogue
        .iter()
        .map(|set| {
            let count = app.selected_count(&set.name);
            let marker = if count > 0 {
                format!("{count:>2}x")
            } else {
                "   ".to_string()
            };
            ListItem::new(format!(
                "{marker} {} [{}] {} cards, {}",
                set.name, set.code, set.card_count, set.release_date
            ))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Card sets"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.set_cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_drafting(frame: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let Some(session) = app.session.as_ref() else {
        return;
    };

    let items: Vec<ListItem> = session
        .pack()
        .iter()
        .enumerate()
        .map(|(index, card)| {
            let mark = if session.is_picked(index) { "*" } else { " " };
            let capped = if session.copies_of(&card.name) >= session.rules().copy_limit {
                " [capped]"
            } else {
                ""
            };
            ListItem::new(format!(
                "{mark} [{}] {} ({}){capped}",
                card.rarity,
                card.name,
                card.card_type.name()
            ))
        })
        .collect();
    let set_name = session
        .active_set()
        .map(|set| set.name.clone())
        .unwrap_or_else(|| "-".to_string());
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Pack ({set_name})")),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.pack_cursor));
    frame.render_stateful_widget(list, columns[0], &mut state);

    let deck = session.deck();
    let mut lines = Vec::new();
    for (label, cards) in [
        ("Main", &deck.main),
        ("Extra", &deck.extra),
        ("Side", &deck.side),
    ] {
        let breakdown = type_breakdown(cards);
        lines.push(Line::from(format!(
            "{label}: {} (M{} S{} T{})",
            cards.len(),
            breakdown.monsters,
            breakdown.spells,
            breakdown.traps
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "Pending picks: {}",
        session.selections().len()
    )));
    for card in session.selections() {
        lines.push(Line::from(format!("  {}", card.name)));
    }
    let block = Block::default().borders(Borders::ALL).title("Deck");
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), columns[1]);
}

fn draw_discard(frame: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(20),
            Constraint::Percentage(40),
        ])
        .split(area);

    let Some(stage) = app
        .session
        .as_ref()
        .and_then(|session| session.discard_stage())
    else {
        return;
    };

    for (column, section) in [
        (columns[0], DeckSection::Main),
        (columns[1], DeckSection::Extra),
        (columns[2], DeckSection::Side),
    ] {
        let focused = app.discard_focus == section;
        let items: Vec<ListItem> = stage
            .entries(section)
            .iter()
            .map(|entry| {
                let mark = if entry.marked { "x" } else { " " };
                ListItem::new(format!("{mark} {}", entry.card.name))
            })
            .collect();
        let title = format!(
            "{}{} ({} kept)",
            section.label(),
            if focused { " *" } else { "" },
            stage.kept(section)
        );
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if focused {
            state.select(Some(app.discard_cursor));
        }
        frame.render_stateful_widget(list, column, &mut state);
    }
}

fn draw_complete(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let deck = session.deck();
    let lines = vec![
        Line::from(format!("Main deck:  {}", deck.main.len())),
        Line::from(format!("Extra deck: {}", deck.extra.len())),
        Line::from(format!("Side deck:  {}", deck.side.len())),
        Line::from(""),
        Line::from("e exports the deck file, q quits"),
    ];
    let block = Block::default().borders(Borders::ALL).title("Result");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_events(frame: &mut Frame, area: Rect, app: &App) {
    let capacity = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .event_log
        .iter()
        .rev()
        .take(capacity)
        .rev()
        .map(|entry| Line::from(entry.clone()))
        .collect();
    let block = Block::default().borders(Borders::ALL).title("Events");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_help(frame: &mut Frame) {
    let area = centered_rect(frame.area(), 56, 14);
    let lines = vec![
        Line::from("Keys"),
        Line::from(""),
        Line::from("up/down  move cursor      tab   switch section"),
        Line::from("space    add/toggle       a/d   add/remove pack"),
        Line::from("r        randomize packs  s     start draft"),
        Line::from("n        next pack        c/esc clear picks"),
        Line::from("x        add associated   m     move main<->side"),
        Line::from("enter    accept stage     e     export deck"),
        Line::from("?        toggle help      q     quit"),
    ];
    let block = Block::default().borders(Borders::ALL).title("Help");
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
