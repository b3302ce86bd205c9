//! Terminal dashboard for the synthetic population using ratatui
//!
//! Stat cards, an age chart, sample residents and a question box. Questions
//! run on a worker thread; the draw loop only polls for the answer, so the
//! UI never waits on the network.

use std::error::Error;
use std::io::{self, stdout};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{BarChart, Block, Borders, Paragraph, Wrap},
};

use crate::ask::{fallback_message, AskClient, AskError};
use crate::config::TwinParams;
use crate::export::{resident_card_lines, stat_cards};
use crate::population::Resident;
use crate::stats::{age_histogram, area_breakdown};

pub const EXAMPLE_QUERIES: [&str; 5] = [
    "What's the average age of residents?",
    "How many people have children?",
    "What are the most common occupations?",
    "Which neighborhood (M4E vs M4L) has more homeowners?",
    "What percentage of residents are interested in cycling?",
];

pub const INITIAL_RESPONSE: &str = "Ask me anything about Toronto Beaches residents...";
const ANALYZING: &str = "Analyzing data...";

const ACCENT: Color = Color::Rgb(30, 64, 175);
const SAND: Color = Color::Rgb(253, 230, 138);

/// Dashboard state
struct Dashboard {
    residents: Arc<[Resident]>,
    seed: u64,
    sample_size: usize,
    client: AskClient,
    query: String,
    response: String,
    /// Answer channel of the question in flight, if any
    pending: Option<Receiver<Result<String, AskError>>>,
    answered_at: Option<DateTime<Local>>,
    /// Example currently in the query box, if it came from Tab or a digit
    current_example: Option<usize>,
}

impl Dashboard {
    fn new(residents: Arc<[Resident]>, seed: u64, sample_size: usize, client: AskClient) -> Self {
        Dashboard {
            residents,
            seed,
            sample_size,
            client,
            query: String::new(),
            response: INITIAL_RESPONSE.to_string(),
            pending: None,
            answered_at: None,
            current_example: None,
        }
    }

    fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Send the current query. Ignored while another question is in flight
    /// or when the query is blank.
    fn submit(&mut self) {
        if self.is_loading() || self.query.trim().is_empty() {
            return;
        }
        self.response = ANALYZING.to_string();
        self.pending = Some(
            self.client
                .spawn_question(Arc::clone(&self.residents), self.query.clone()),
        );
    }

    /// Pick up a finished answer without blocking.
    fn poll_answer(&mut self) {
        let Some(rx) = &self.pending else {
            return;
        };

        let finished = match rx.try_recv() {
            Ok(Ok(answer)) => Some(answer),
            Ok(Err(e)) => Some(fallback_message(&e)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                Some("Error: the question worker stopped without answering.".to_string())
            }
        };

        if let Some(text) = finished {
            self.response = text;
            self.pending = None;
            self.answered_at = Some(Local::now());
        }
    }

    fn select_example(&mut self, index: usize) {
        self.current_example = Some(index);
        self.query = EXAMPLE_QUERIES[index].to_string();
    }

    /// Tab moves forward, Shift-Tab back. The first Tab picks the first
    /// example, the first Shift-Tab the last.
    fn cycle_example(&mut self, step: isize) {
        let count = EXAMPLE_QUERIES.len() as isize;
        let index = match self.current_example {
            Some(current) => (current as isize + step).rem_euclid(count),
            None if step < 0 => count - 1,
            None => 0,
        };
        self.select_example(index as usize);
    }

    /// Apply one key press. Returns `true` when the dashboard should close.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }

        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.query.clear();
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Tab => self.cycle_example(1),
            KeyCode::BackTab => self.cycle_example(-1),
            KeyCode::Backspace => {
                self.query.pop();
            }
            // Digits pick an example only on an empty query so numbers can still be typed.
            KeyCode::Char(d @ '1'..='5') if self.query.is_empty() => {
                self.select_example(d as usize - '1' as usize);
            }
            KeyCode::Char(c) => self.query.push(c),
            _ => {}
        }
        false
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from(Span::styled(
                "Beaches Digital Twin",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "SYNTHETIC POPULATION DATA",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                "Toronto East End • FSA M4E & M4L",
                Style::default().fg(Color::LightBlue).add_modifier(Modifier::ITALIC),
            )),
        ];
        Paragraph::new(lines).alignment(Alignment::Center).render(area, buf);
    }

    fn render_stat_cards(&self, area: Rect, buf: &mut Buffer) {
        let cards = stat_cards(&self.residents);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);

        for ((label, value), column) in cards.iter().zip(columns.iter()) {
            let block = Block::default()
                .title(format!(" {} ", label.to_uppercase()))
                .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
                .border_style(Style::default().fg(ACCENT));
            Paragraph::new(Line::from(Span::styled(
                value.as_str(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )))
            .block(block)
            .alignment(Alignment::Center)
            .render(*column, buf);
        }
    }

    fn render_chart(&self, area: Rect, buf: &mut Buffer) {
        let histogram = age_histogram(&self.residents);
        let data: Vec<(&str, u64)> = histogram
            .iter()
            .map(|(bucket, count)| (bucket.label(), *count as u64))
            .collect();

        BarChart::default()
            .block(
                Block::default()
                    .title(" Demographics ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(SAND)),
            )
            .data(data.as_slice())
            .bar_width(7)
            .bar_gap(2)
            .bar_style(Style::default().fg(ACCENT))
            .value_style(Style::default().fg(Color::White).bg(ACCENT))
            .render(area, buf);
    }

    fn render_areas(&self, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = area_breakdown(&self.residents)
            .into_iter()
            .map(|(fsa, stats)| match stats {
                Ok(s) => Line::from(format!(
                    "{}  {} residents • {}% owners • avg age {}",
                    fsa, s.total_residents, s.home_ownership_rate, s.average_age
                )),
                Err(_) => Line::from(format!("{}  no residents", fsa)),
            })
            .collect();

        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" By Area ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(SAND)),
            )
            .render(area, buf);
    }

    fn render_samples(&self, area: Rect, buf: &mut Buffer) {
        let mut lines = Vec::new();
        for resident in self.residents.iter().take(self.sample_size) {
            lines.push(Line::from(Span::styled(
                resident.full_name(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )));
            for text in resident_card_lines(resident) {
                lines.push(Line::from(Span::styled(
                    format!("  {}", text),
                    Style::default().fg(Color::Gray),
                )));
            }
            lines.push(Line::default());
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Sample Residents ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(SAND)),
            )
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }

    fn render_query(&self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Example queries
                Constraint::Length(3), // Input box
                Constraint::Min(3),    // Response
            ])
            .split(area);

        let examples = EXAMPLE_QUERIES
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{} {}", i + 1, q))
            .collect::<Vec<_>>()
            .join(" | ");
        let examples = format!("Tab or 1-5 for examples: {}", examples);
        Paragraph::new(examples)
            .style(Style::default().fg(Color::DarkGray))
            .render(chunks[0], buf);

        let title = if self.is_loading() {
            " Analyzing... "
        } else {
            " Ask Questions About the Data (Enter) "
        };
        Paragraph::new(format!("{}_", self.query))
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(if self.is_loading() {
                        SAND
                    } else {
                        ACCENT
                    })),
            )
            .render(chunks[1], buf);

        let mut response_style = Style::default().fg(Color::White);
        if self.is_loading() {
            response_style = response_style.add_modifier(Modifier::SLOW_BLINK);
        }
        let response_title = match self.answered_at {
            Some(at) => format!(" Response ({}) ", at.format("%H:%M:%S")),
            None => " Response ".to_string(),
        };
        Paragraph::new(self.response.as_str())
            .style(response_style)
            .block(
                Block::default()
                    .title(response_title)
                    .borders(Borders::LEFT)
                    .border_style(Style::default().fg(Color::LightBlue)),
            )
            .wrap(Wrap { trim: false })
            .render(chunks[2], buf);
    }

    fn draw(&self, f: &mut Frame) {
        let size = f.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Header
                Constraint::Length(3),  // Stat cards
                Constraint::Min(12),    // Chart + residents
                Constraint::Length(12), // Questions
                Constraint::Length(1),  // Status bar
            ])
            .split(size);

        let buf = f.buffer_mut();
        self.render_header(main_chunks[0], buf);
        self.render_stat_cards(main_chunks[1], buf);

        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(main_chunks[2]);
        self.render_chart(content[0], buf);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(3)])
            .split(content[1]);
        self.render_areas(right[0], buf);
        self.render_samples(right[1], buf);

        self.render_query(main_chunks[3], buf);

        let status = format!(
            " Enter: ask | Tab/Shift-Tab: examples | Ctrl-U: clear | Esc: quit | seed {} | {} residents",
            self.seed,
            self.residents.len()
        );
        Paragraph::new(status)
            .style(Style::default().bg(Color::DarkGray).fg(Color::White))
            .render(main_chunks[4], buf);
    }
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, dashboard: &mut Dashboard) -> io::Result<()> {
    loop {
        dashboard.poll_answer();
        terminal.draw(|f| dashboard.draw(f))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if dashboard.handle_key(key) {
                    return Ok(());
                }
            }
        }
    }
}

/// Open the dashboard on the current terminal until the user quits.
pub fn run_dashboard(
    residents: Vec<Resident>,
    seed: u64,
    params: &TwinParams,
) -> Result<(), Box<dyn Error>> {
    let client = AskClient::new(params.ask.clone())?;
    let mut dashboard = Dashboard::new(residents.into(), seed, params.sample_size, client);

    // Setup terminal
    terminal::enable_raw_mode()?;
    let result = open_and_run(&mut dashboard);

    // Cleanup runs every step even if setup or the loop failed
    let cleanup = [
        terminal::disable_raw_mode(),
        execute!(stdout(), LeaveAlternateScreen, cursor::Show),
    ];

    Ok(first_error(result, cleanup)?)
}

/// The loop's own error wins; otherwise the first failed cleanup step.
fn first_error(
    result: io::Result<()>,
    cleanup: impl IntoIterator<Item = io::Result<()>>,
) -> io::Result<()> {
    result?;
    cleanup.into_iter().collect()
}

fn open_and_run(dashboard: &mut Dashboard) -> io::Result<()> {
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    event_loop(&mut terminal, dashboard)
}
