use super::app::{App, ViewMode};
use crate::render::color::cell_color;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
};

/// Width of a hot-page bar, enough for a `0x0000001000` label
const BAR_WIDTH: u16 = 12;
const BAR_GAP: u16 = 1;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header (single line, no border)
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Footer (single line, no border)
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    match app.view_mode {
        ViewMode::Heatmap => render_heatmap(frame, app, chunks[1]),
        ViewMode::HotPages => render_hot_pages(frame, app, chunks[1]),
    }
    render_footer(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([
        Constraint::Min(40),
        Constraint::Length(21), // "[Heatmap] [Hot pages]"
    ])
    .split(area);

    let status = Line::from(vec![
        Span::styled(
            "pageheat",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(" VIEW ", Style::default().bg(Color::Blue).fg(Color::White)),
        Span::raw(format!(
            " {} │ {} accesses │ {} pages",
            app.file_name, app.total_accesses, app.distinct_pages
        )),
    ]);
    frame.render_widget(Paragraph::new(status), chunks[0]);

    let active_style = Style::default().bg(Color::Cyan).fg(Color::Black);
    let inactive_style = Style::default().fg(Color::DarkGray);
    let style_for = |mode| {
        if app.view_mode == mode {
            active_style
        } else {
            inactive_style
        }
    };

    let mut tabs = vec![Span::styled("[Heatmap]", style_for(ViewMode::Heatmap))];
    if app.has_bar_chart() {
        tabs.push(Span::raw(" "));
        tabs.push(Span::styled("[Hot pages]", style_for(ViewMode::HotPages)));
    }
    frame.render_widget(Paragraph::new(Line::from(tabs)), chunks[1]);
}

/// Draw the grid with half-block characters, two grid rows per terminal row
fn render_heatmap(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" {} · {} ", app.heatmap_title[0], app.heatmap_title[1]))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let side = (inner.width as usize).min(inner.height as usize * 2);
    if side == 0 {
        return;
    }
    let side = side.min(256);
    let cells = app.grid.downsample(side, side);
    let max = cells.iter().copied().max().unwrap_or(0);

    let lines: Vec<Line> = (0..side.div_ceil(2))
        .map(|text_row| {
            let top = text_row * 2;
            let bottom = top + 1;
            let spans: Vec<Span> = (0..side)
                .map(|col| {
                    let upper = rgb(cell_color(cells[top * side + col], max));
                    let lower = if bottom < side {
                        rgb(cell_color(cells[bottom * side + col], max))
                    } else {
                        Color::Reset
                    };
                    Span::styled("▀", Style::default().fg(upper).bg(lower))
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let legend = format!(" max {} accesses/cell ", max);
    let grid_area = Rect {
        width: side as u16,
        ..inner
    };
    frame.render_widget(Paragraph::new(lines), grid_area);

    if inner.width as usize > side + legend.len() {
        let legend_area = Rect {
            x: inner.x + side as u16 + 1,
            width: inner.width - side as u16 - 1,
            height: 1,
            ..inner
        };
        frame.render_widget(
            Paragraph::new(legend).style(Style::default().fg(Color::DarkGray)),
            legend_area,
        );
    }
}

fn render_hot_pages(frame: &mut Frame, app: &App, area: Rect) {
    let title = app
        .bar_title
        .as_ref()
        .map(|t| format!(" {} · {} ", t[0], t[1]))
        .unwrap_or_default();
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.hot_pages.is_empty() {
        let paragraph = Paragraph::new(" No data available")
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible = (block.inner(area).width / (BAR_WIDTH + BAR_GAP)).max(1) as usize;
    let bars: Vec<Bar> = app
        .hot_pages
        .iter()
        .skip(app.bar_offset)
        .take(visible)
        .map(|page| {
            Bar::default()
                .value(page.count)
                .text_value(page.count.to_string())
                .label(Line::from(page.label()))
                .style(Style::default().fg(Color::Blue))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(BAR_WIDTH)
        .bar_gap(BAR_GAP)
        .value_style(Style::default().fg(Color::White).bg(Color::Blue))
        .label_style(Style::default().fg(Color::Gray));
    frame.render_widget(chart, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" q ", Style::default().bg(Color::DarkGray)),
        Span::raw(" quit "),
    ];

    if app.has_bar_chart() {
        spans.push(Span::styled(" Tab ", Style::default().bg(Color::DarkGray)));
        spans.push(Span::raw(" view "));
    }
    if app.view_mode == ViewMode::HotPages {
        spans.push(Span::styled(" h/l ", Style::default().bg(Color::DarkGray)));
        spans.push(Span::raw(" scroll "));
        spans.push(Span::styled(" g/G ", Style::default().bg(Color::DarkGray)));
        spans.push(Span::raw(" first/last "));
        spans.push(Span::raw(format!(
            " {}/{}",
            app.bar_offset + 1,
            app.hot_pages.len()
        )));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}
