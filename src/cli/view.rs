use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Dataset as ChartDataset, GraphType, Padding, Paragraph,
    },
    Frame,
};

use super::load_with_settings;
use crate::error::{ForensicError, Result};
use crate::fmt::compact_amount;
use crate::models::Dataset;
use crate::reports::{build_company_report, CompanyReport, TrendPoint};
use crate::tui::{
    run_view, tone_style, wrap_text, View, ViewAction, CARD_LABEL_STYLE, FOOTER_STYLE,
    HEADER_STYLE, SELECTED_STYLE,
};

const F_STYLE: Style = Style::new().fg(Color::Rgb(99, 110, 250));
const C_STYLE: Style = Style::new().fg(Color::Rgb(239, 85, 59));
const O_STYLE: Style = Style::new().fg(Color::Rgb(0, 204, 150));
const CFO_STYLE: Style = Style::new().fg(Color::Rgb(99, 110, 250));
const NET_INCOME_STYLE: Style = Style::new().fg(Color::Rgb(239, 85, 59));
const BOLD: Style = Style::new().add_modifier(Modifier::BOLD);

const COMPANY_LIST_WIDTH: u16 = 26;

#[derive(Debug, Clone, PartialEq)]
enum Screen {
    /// No file loaded yet, or the user asked to open another one.
    Prompt,
    Company,
}

pub struct Dashboard {
    dataset: Option<Dataset>,
    companies: Vec<String>,
    selection: usize,
    report: Option<CompanyReport>,
    screen: Screen,
    input: String,
    status: Option<String>,
    sheet: Option<String>,
}

impl Dashboard {
    pub fn new(sheet: Option<String>) -> Self {
        Self {
            dataset: None,
            companies: Vec::new(),
            selection: 0,
            report: None,
            screen: Screen::Prompt,
            input: String::new(),
            status: None,
            sheet,
        }
    }

    /// Swap in a freshly loaded dataset. An empty dataset is rejected and the
    /// previous one, if any, stays on screen.
    pub fn set_dataset(&mut self, dataset: Dataset) -> Result<()> {
        if dataset.is_empty() {
            return Err(ForensicError::EmptyDataset(
                dataset.source.display().to_string(),
            ));
        }
        self.companies = dataset.companies().into_iter().map(str::to_string).collect();
        self.dataset = Some(dataset);
        self.screen = Screen::Company;
        self.status = None;
        self.select(0)
    }

    pub fn select_company(&mut self, name: &str) -> Result<()> {
        let idx = self
            .companies
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ForensicError::UnknownCompany(name.to_string()))?;
        self.select(idx)
    }

    fn select(&mut self, idx: usize) -> Result<()> {
        let Some(dataset) = &self.dataset else {
            return Ok(());
        };
        let Some(name) = self.companies.get(idx) else {
            return Ok(());
        };
        self.report = Some(build_company_report(dataset, name)?);
        self.selection = idx;
        tracing::debug!(company = %name, "selected company");
        Ok(())
    }

    fn move_selection(&mut self, delta: isize) {
        if self.companies.is_empty() {
            return;
        }
        let max = self.companies.len() as isize - 1;
        let next = (self.selection as isize + delta).clamp(0, max) as usize;
        if next != self.selection {
            if let Err(e) = self.select(next) {
                self.status = Some(e.to_string());
            }
        }
    }

    fn open_input(&mut self) {
        let path = self.input.trim().to_string();
        if path.is_empty() {
            return;
        }
        let loaded = load_with_settings(&path, self.sheet.as_deref())
            .and_then(|ds| self.set_dataset(ds));
        match loaded {
            Ok(()) => self.input.clear(),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "failed to open file");
                self.status = Some(format!("Could not load {path}: {e}"));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    fn title(&self) -> String {
        match &self.dataset {
            Some(ds) => {
                let name = ds
                    .source
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                format!(" Forensic Financial Health Dashboard \u{2014} {name}")
            }
            None => " Forensic Financial Health Dashboard".to_string(),
        }
    }

    fn draw_prompt(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                " Piotroski F-Score \u{2022} Montier C-Score \u{2022} Ohlson O-Score",
                FOOTER_STYLE,
            )),
            Line::from(""),
            Line::from(" Please open an Excel (.xlsx) or CSV file to begin."),
            Line::from(""),
            Line::from(vec![
                Span::styled(" Path: ", BOLD),
                Span::raw(self.input.clone()),
                Span::styled("\u{2588}", FOOTER_STYLE),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_company_list(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(" Select Company ", BOLD))
            .borders(Borders::RIGHT)
            .border_style(FOOTER_STYLE);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let height = inner.height.max(1) as usize;
        let offset = self.selection.saturating_sub(height - 1);
        let lines: Vec<Line> = self
            .companies
            .iter()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(i, name)| {
                if i == self.selection {
                    Line::from(Span::styled(format!("\u{25b8} {name}"), SELECTED_STYLE))
                } else {
                    Line::from(format!("  {name}"))
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn draw_report(&self, frame: &mut Frame, area: Rect, report: &CompanyReport) {
        let note_width = area.width.saturating_sub(6) as usize;
        let (note, note_lines) = if report.accrual.interpretation.is_empty() {
            (String::new(), 0)
        } else {
            wrap_text(
                &format!("\u{25b8} {}", report.accrual.interpretation),
                note_width,
            )
        };
        let accrual_height = 5 + note_lines;

        let [cards_area, banner_area, accrual_area, charts_area] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(accrual_height),
            Constraint::Fill(1),
        ])
        .spacing(1)
        .areas(area);

        // Score cards
        let card_areas = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(cards_area);
        for (card, card_area) in report.scorecards.iter().zip(card_areas.iter()) {
            let block = Block::default()
                .title(Span::styled(format!(" {} ", card.title), CARD_LABEL_STYLE))
                .borders(Borders::ALL)
                .border_style(FOOTER_STYLE);
            let lines = vec![
                Line::from(Span::styled(format!(" {}", card.value), BOLD)),
                Line::from(Span::styled(format!(" \u{25b8} {}", card.label), CARD_LABEL_STYLE)),
            ];
            frame.render_widget(Paragraph::new(lines).block(block), *card_area);
        }

        // Verdict banner
        let banner = Paragraph::new(vec![
            Line::from(""),
            Line::from(format!("Overall Interpretation: {}", report.verdict.label)),
        ])
        .alignment(Alignment::Center)
        .style(tone_style(report.verdict.tone));
        frame.render_widget(banner, banner_area);

        // Accrual panel
        let accrual = &report.accrual;
        let mut lines = vec![
            Line::from(Span::styled(format!("Accrual Zone: {}", accrual.zone), BOLD)),
            Line::from(vec![
                Span::styled("Cash-Flow Accrual Ratio: ", BOLD),
                Span::raw(accrual.cf_accrual_ratio.clone()),
            ]),
            Line::from(vec![
                Span::styled("Balance-Sheet Accrual Ratio: ", BOLD),
                Span::raw(accrual.bs_accrual_ratio.clone()),
            ]),
        ];
        lines.extend(note.lines().map(|l| Line::from(l.to_string())));
        let panel = Paragraph::new(lines)
            .style(tone_style(accrual.tone).remove_modifier(Modifier::BOLD))
            .block(
                Block::default()
                    .title(Span::styled(" Earnings Quality (Accrual Analysis) ", BOLD))
                    .padding(Padding::new(2, 2, 1, 0)),
            );
        frame.render_widget(panel, accrual_area);

        let [line_area, bar_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(charts_area);
        draw_score_trend(frame, line_area, report);
        draw_cash_flow(frame, bar_area, report);
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Axis bounds covering every value, padded so single points are visible.
pub(crate) fn value_bounds(values: impl Iterator<Item = f64>, floor: [f64; 2]) -> [f64; 2] {
    let (lo, hi) = values.fold((floor[0], floor[1]), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if (hi - lo).abs() < f64::EPSILON {
        [lo - 1.0, hi + 1.0]
    } else {
        [lo, hi]
    }
}

/// Labels for the year axis. Axis labels are spaced evenly, so long series
/// only show their endpoints.
pub(crate) fn year_labels(first: i32, last: i32) -> Vec<String> {
    let (first, last) = (i64::from(first), i64::from(last));
    let span = last - first;
    if span <= 0 {
        return vec![(first - 1).to_string(), first.to_string(), (first + 1).to_string()];
    }
    if span <= 6 {
        (first..=last).map(|y| y.to_string()).collect()
    } else {
        vec![first.to_string(), last.to_string()]
    }
}

fn draw_score_trend(frame: &mut Frame, area: Rect, report: &CompanyReport) {
    let f: Vec<(f64, f64)> = report.trend.iter().map(|p| (p.year as f64, p.f_score)).collect();
    let c: Vec<(f64, f64)> = report.trend.iter().map(|p| (p.year as f64, p.c_score)).collect();
    let o: Vec<(f64, f64)> = report.trend.iter().map(|p| (p.year as f64, p.o_score)).collect();

    let graph = if report.trend.len() > 1 {
        GraphType::Line
    } else {
        GraphType::Scatter
    };
    let datasets = vec![
        ChartDataset::default()
            .name("F_Score")
            .marker(Marker::Braille)
            .graph_type(graph)
            .style(F_STYLE)
            .data(&f),
        ChartDataset::default()
            .name("C_Score")
            .marker(Marker::Braille)
            .graph_type(graph)
            .style(C_STYLE)
            .data(&c),
        ChartDataset::default()
            .name("O_Score")
            .marker(Marker::Braille)
            .graph_type(graph)
            .style(O_STYLE)
            .data(&o),
    ];

    let x_bounds = if report.first_year == report.latest_year {
        [report.first_year as f64 - 1.0, report.first_year as f64 + 1.0]
    } else {
        [report.first_year as f64, report.latest_year as f64]
    };
    let y_bounds = value_bounds(
        report
            .trend
            .iter()
            .flat_map(|p| [p.f_score, p.c_score, p.o_score]),
        [0.0, 9.0],
    );

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(Span::styled(" Forensic Scores Trend Over Time ", BOLD))
                .borders(Borders::NONE),
        )
        .x_axis(
            Axis::default()
                .title("Year")
                .style(FOOTER_STYLE)
                .bounds(x_bounds)
                .labels(year_labels(report.first_year, report.latest_year)),
        )
        .y_axis(
            Axis::default()
                .style(FOOTER_STYLE)
                .bounds(y_bounds)
                .labels(vec![
                    format!("{:.0}", y_bounds[0]),
                    format!("{:.0}", (y_bounds[0] + y_bounds[1]) / 2.0),
                    format!("{:.0}", y_bounds[1]),
                ]),
        );
    frame.render_widget(chart, area);
}

/// X offsets, relative to the year, of the vertical strokes making up one
/// bar. CFO sits left of the year and Net_Income right of it.
fn bar_strokes(side: f64, cells_per_year: f64) -> Vec<f64> {
    let strokes = (BAR_SPAN * cells_per_year).floor().clamp(1.0, 12.0) as usize;
    (0..strokes)
        .map(|i| {
            let t = if strokes == 1 { 0.5 } else { i as f64 / (strokes - 1) as f64 };
            side * (BAR_INSET + t * (BAR_SPAN - BAR_INSET))
        })
        .collect()
}

fn bar_points(
    report: &CompanyReport,
    side: f64,
    cells_per_year: f64,
    value: impl Fn(&TrendPoint) -> f64,
) -> Vec<(f64, f64)> {
    let strokes = bar_strokes(side, cells_per_year);
    let mut points = Vec::with_capacity(strokes.len() * report.trend.len());
    for p in &report.trend {
        let (x, y) = (f64::from(p.year), value(p));
        points.extend(strokes.iter().map(|dx| (x + dx, y)));
    }
    points
}

const BAR_INSET: f64 = 0.05;
const BAR_SPAN: f64 = 0.4;

/// Grouped CFO / Net_Income bars drawn from zero, so negative values hang
/// below the baseline.
fn draw_cash_flow(frame: &mut Frame, area: Rect, report: &CompanyReport) {
    let title = Line::from(vec![
        Span::styled(" Cash Flow vs Net Income  ", BOLD),
        Span::styled("\u{25a0} CFO ", CFO_STYLE),
        Span::styled("\u{25a0} Net_Income ", NET_INCOME_STYLE),
    ]);

    let first = f64::from(report.first_year);
    let last = f64::from(report.latest_year);
    let x_bounds = [first - 0.5, last + 0.5];
    let cells_per_year = f64::from(area.width) / (x_bounds[1] - x_bounds[0]);

    let cfo = bar_points(report, -1.0, cells_per_year, |p| p.cfo);
    let net_income = bar_points(report, 1.0, cells_per_year, |p| p.net_income);
    let baseline = [(x_bounds[0], 0.0), (x_bounds[1], 0.0)];

    let y_bounds = value_bounds(
        report.trend.iter().flat_map(|p| [p.cfo, p.net_income]),
        [0.0, 0.0],
    );

    let datasets = vec![
        ChartDataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(FOOTER_STYLE)
            .data(&baseline),
        ChartDataset::default()
            .name("CFO")
            .marker(Marker::Block)
            .graph_type(GraphType::Bar)
            .style(CFO_STYLE)
            .data(&cfo),
        ChartDataset::default()
            .name("Net_Income")
            .marker(Marker::Block)
            .graph_type(GraphType::Bar)
            .style(NET_INCOME_STYLE)
            .data(&net_income),
    ];

    let chart = Chart::new(datasets)
        .block(Block::default().title(title).borders(Borders::NONE))
        .legend_position(None)
        .x_axis(
            Axis::default()
                .style(FOOTER_STYLE)
                .bounds(x_bounds)
                .labels(year_labels(report.first_year, report.latest_year)),
        )
        .y_axis(
            Axis::default()
                .style(FOOTER_STYLE)
                .bounds(y_bounds)
                .labels(vec![
                    compact_amount(y_bounds[0]),
                    compact_amount((y_bounds[0] + y_bounds[1]) / 2.0),
                    compact_amount(y_bounds[1]),
                ]),
        );
    frame.render_widget(chart, area);
}

impl View for Dashboard {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [header_area, sep_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(Paragraph::new(self.title()).style(HEADER_STYLE), header_area);
        frame.render_widget(
            Paragraph::new("\u{2501}".repeat(area.width as usize)).style(FOOTER_STYLE),
            sep_area,
        );

        let hints = match self.screen {
            Screen::Prompt => {
                self.draw_prompt(frame, body_area);
                if self.dataset.is_some() {
                    " Enter=open  Esc=back"
                } else {
                    " Enter=open  Esc=quit"
                }
            }
            Screen::Company => {
                let [list_area, main_area] = Layout::horizontal([
                    Constraint::Length(COMPANY_LIST_WIDTH),
                    Constraint::Fill(1),
                ])
                .spacing(1)
                .areas(body_area);
                self.draw_company_list(frame, list_area);
                if let Some(report) = &self.report {
                    self.draw_report(frame, main_area, report);
                }
                " \u{2191}/\u{2193}=company  o=open file  q/Esc=quit"
            }
        };

        match &self.status {
            Some(msg) => frame.render_widget(
                Paragraph::new(format!(" {msg}")).style(Style::default().fg(Color::Yellow)),
                footer_area,
            ),
            None => frame.render_widget(Paragraph::new(hints).style(FOOTER_STYLE), footer_area),
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        match self.screen {
            Screen::Prompt => match code {
                KeyCode::Esc => {
                    if self.dataset.is_some() {
                        self.screen = Screen::Company;
                        self.status = None;
                        ViewAction::Continue
                    } else {
                        ViewAction::Close
                    }
                }
                KeyCode::Enter => {
                    self.open_input();
                    ViewAction::Continue
                }
                KeyCode::Backspace => {
                    self.input.pop();
                    ViewAction::Continue
                }
                KeyCode::Char(c) => {
                    self.input.push(c);
                    ViewAction::Continue
                }
                _ => ViewAction::Continue,
            },
            Screen::Company => {
                self.status = None;
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => ViewAction::Close,
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.move_selection(-1);
                        ViewAction::Continue
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        self.move_selection(1);
                        ViewAction::Continue
                    }
                    KeyCode::Home => {
                        self.move_selection(-(self.companies.len() as isize));
                        ViewAction::Continue
                    }
                    KeyCode::End => {
                        self.move_selection(self.companies.len() as isize);
                        ViewAction::Continue
                    }
                    KeyCode::Char('o') => {
                        self.screen = Screen::Prompt;
                        ViewAction::Continue
                    }
                    _ => ViewAction::Continue,
                }
            }
        }
    }
}

pub fn run(file: Option<&str>, company: Option<&str>, sheet: Option<&str>) -> Result<()> {
    let mut dashboard = Dashboard::new(sheet.map(str::to_string));
    if let Some(file) = file {
        let dataset = load_with_settings(file, sheet)?;
        dashboard.set_dataset(dataset)?;
        if let Some(name) = company {
            dashboard.select_company(name)?;
        }
    } else {
        tracing::debug!("no file given, starting at prompt");
    }
    run_view(&mut dashboard)
}
