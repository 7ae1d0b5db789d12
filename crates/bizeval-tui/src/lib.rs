// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use bizeval_app::{
    AppCommand, AppEvent, AppState, EvaluationRequest, EvaluationResult, FinancialView, FormField,
    GENERIC_FAILURE_MESSAGE, METRIC_MAX, MetricGauge, RequestId, ResultView, RiskView,
    SuggestionCategory, SuggestionStatus, WorkflowState, format_number,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const SCROLL_STEP: u16 = 5;
const RADAR_SCALE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    pub max_suggestions: usize,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self { max_suggestions: 8 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    Suggestions {
        category: SuggestionCategory,
        result: std::result::Result<Vec<String>, String>,
    },
    Evaluation {
        request_id: RequestId,
        result: std::result::Result<EvaluationResult, String>,
        completed_at: OffsetDateTime,
    },
}

/// Backend seam for the terminal UI. The `spawn_*` defaults run the work
/// inline and post the outcome; runtimes backed by a network override them to
/// run on worker threads.
pub trait AppRuntime {
    fn fetch_suggestions(&mut self, category: SuggestionCategory) -> Result<Vec<String>>;
    fn evaluate(&mut self, request: &EvaluationRequest) -> Result<EvaluationResult>;

    fn spawn_suggestion_fetch(
        &mut self,
        category: SuggestionCategory,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self
            .fetch_suggestions(category)
            .map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::Suggestions { category, result })
            .map_err(|_| anyhow::anyhow!("suggestion event channel closed"))?;
        Ok(())
    }

    fn spawn_evaluation(
        &mut self,
        request_id: RequestId,
        request: &EvaluationRequest,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self.evaluate(request).map_err(|error| {
            log::warn!("evaluation {request_id} failed: {error:#}");
            GENERIC_FAILURE_MESSAGE.to_owned()
        });
        tx.send(InternalEvent::Evaluation {
            request_id,
            result,
            completed_at: OffsetDateTime::now_utc(),
        })
        .map_err(|_| anyhow::anyhow!("evaluation event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ViewData {
    options: UiOptions,
    status_token: u64,
    result_scroll: u16,
}

impl ViewData {
    fn new(options: UiOptions) -> Self {
        Self {
            options,
            status_token: 0,
            result_scroll: 0,
        }
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(options);
    let (internal_tx, internal_rx) = mpsc::channel();

    start_suggestion_fetches(runtime, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn start_suggestion_fetches<R: AppRuntime>(runtime: &mut R, internal_tx: &Sender<InternalEvent>) {
    for category in SuggestionCategory::ALL {
        if let Err(error) = runtime.spawn_suggestion_fetch(category, internal_tx.clone()) {
            log::warn!("could not start {} fetch: {error:#}", category.as_str());
        }
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Suggestions { category, result } => {
                let command = match result {
                    Ok(items) => AppCommand::SuggestionsLoaded { category, items },
                    Err(error) => AppCommand::SuggestionsFailed { category, error },
                };
                dispatch(state, view_data, tx, command);
            }
            InternalEvent::Evaluation {
                request_id,
                result,
                completed_at,
            } => {
                dispatch(
                    state,
                    view_data,
                    tx,
                    AppCommand::EvaluationResolved {
                        request_id,
                        outcome: result,
                        completed_at,
                    },
                );
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

/// Dispatches `command` and reacts to the view-level side of its events.
fn dispatch(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) -> Vec<AppEvent> {
    let events = state.dispatch(command);
    for event in &events {
        match event {
            AppEvent::StatusUpdated(_) => {
                view_data.status_token = view_data.status_token.saturating_add(1);
                schedule_status_clear(internal_tx, view_data.status_token);
            }
            AppEvent::EvaluationStarted { .. } | AppEvent::EvaluationSucceeded(_) => {
                view_data.result_scroll = 0;
            }
            _ => {}
        }
    }
    events
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    let command = match key.code {
        KeyCode::Char('c') if control => return true,
        KeyCode::Esc => {
            if !state.typeahead(state.focus).is_open() {
                return true;
            }
            AppCommand::ClosePanel
        }
        KeyCode::Char('r') if control => AppCommand::Retry,
        KeyCode::Char('u') if control => AppCommand::ClearField,
        KeyCode::Char(' ') if control => AppCommand::OpenPanel,
        KeyCode::Char(_) if control => return false,
        KeyCode::Char(ch) => AppCommand::InsertChar(ch),
        KeyCode::Backspace => AppCommand::Backspace,
        KeyCode::Tab => AppCommand::FocusNext,
        KeyCode::BackTab => AppCommand::FocusPrev,
        KeyCode::Down => AppCommand::HighlightNext,
        KeyCode::Up => AppCommand::HighlightPrev,
        KeyCode::Enter => {
            let typeahead = state.typeahead(state.focus);
            if typeahead.is_open() && typeahead.highlighted().is_some() {
                AppCommand::AcceptHighlight
            } else {
                AppCommand::Submit
            }
        }
        KeyCode::PageDown => {
            view_data.result_scroll = view_data.result_scroll.saturating_add(SCROLL_STEP);
            return false;
        }
        KeyCode::PageUp => {
            view_data.result_scroll = view_data.result_scroll.saturating_sub(SCROLL_STEP);
            return false;
        }
        _ => return false,
    };

    let events = dispatch(state, view_data, internal_tx, command);
    for event in events {
        if let AppEvent::EvaluationStarted {
            request_id,
            request,
            ..
        } = event
            && let Err(error) = runtime.spawn_evaluation(request_id, &request, internal_tx.clone())
        {
            log::warn!("could not start evaluation {request_id}: {error:#}");
            dispatch(
                state,
                view_data,
                internal_tx,
                AppCommand::EvaluationResolved {
                    request_id,
                    outcome: Err(String::new()),
                    completed_at: OffsetDateTime::now_utc(),
                },
            );
        }
    }
    false
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let inputs = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[0]);
    for (field, area) in FormField::ALL.into_iter().zip(inputs.iter()) {
        render_input(frame, *area, state, field);
    }

    render_results(frame, layout[1], state, view_data);

    let status = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    let focus_index = FormField::ALL
        .iter()
        .position(|field| *field == state.focus)
        .unwrap_or(0);
    if let Some(area) = inputs.get(focus_index) {
        render_suggestions(frame, *area, state, view_data);
    }
}

fn render_input(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, field: FormField) {
    let focused = state.focus == field;
    let text = state.field(field).text.as_str();
    let line = if text.is_empty() {
        Line::from(Span::styled(
            field.placeholder(),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(text.to_owned())
    };

    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let input = Paragraph::new(line).block(
        Block::default()
            .title(field.label())
            .borders(Borders::ALL)
            .border_style(border),
    );
    frame.render_widget(input, area);

    if focused {
        let width = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
        let max_x = area.x + area.width.saturating_sub(2);
        frame.set_cursor_position((area.x.saturating_add(1 + width).min(max_x), area.y + 1));
    }
}

fn render_suggestions(
    frame: &mut ratatui::Frame<'_>,
    anchor: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let control = state.typeahead(state.focus);
    if !control.is_open() {
        return;
    }

    let rows = suggestion_window(
        control.rendered_suggestions(),
        control.highlighted(),
        view_data.options.max_suggestions,
    );
    if rows.is_empty() {
        return;
    }

    let full = frame.area();
    let top = anchor.y + anchor.height;
    let available = full.height.saturating_sub(top);
    let wanted = u16::try_from(rows.len()).unwrap_or(u16::MAX).saturating_add(2);
    let area = Rect::new(anchor.x, top, anchor.width, wanted.min(available));
    if area.height < 3 {
        return;
    }

    let items = rows
        .into_iter()
        .map(|(label, highlighted)| {
            let style = if highlighted {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(label, style)))
        })
        .collect::<Vec<_>>();

    frame.render_widget(Clear, area);
    let title = format!("{} of {}", control.filtered_len(), control.items().len());
    frame.render_widget(
        List::new(items).block(Block::default().title(title).borders(Borders::ALL)),
        area,
    );
}

/// Visible slice of the suggestion list, scrolled so the highlight stays in
/// view.
fn suggestion_window(
    rows: Vec<(String, bool)>,
    highlighted: Option<usize>,
    limit: usize,
) -> Vec<(String, bool)> {
    let limit = limit.max(1);
    let start = highlighted
        .map(|index| (index + 1).saturating_sub(limit))
        .unwrap_or(0);
    rows.into_iter().skip(start).take(limit).collect()
}

fn render_results(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    match state.workflow.state() {
        WorkflowState::Idle => {
            let hint = Paragraph::new(
                "Type a business idea and a location, pick from the suggestions with up/down, \
then press enter to evaluate.",
            )
            .wrap(Wrap { trim: true })
            .block(Block::default().title("evaluation").borders(Borders::ALL));
            frame.render_widget(hint, area);
        }
        WorkflowState::Loading { request, .. } => {
            let loading = Paragraph::new(format!(
                "Evaluating {:?} in {:?}...",
                request.business_idea, request.location
            ))
            .block(Block::default().title("evaluation").borders(Borders::ALL));
            frame.render_widget(loading, area);
        }
        WorkflowState::Failure { message, .. } => {
            let failure = Paragraph::new(vec![
                Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from("ctrl+r retry | enter submit again"),
            ])
            .wrap(Wrap { trim: true })
            .block(Block::default().title("error").borders(Borders::ALL));
            frame.render_widget(failure, area);
        }
        WorkflowState::Success {
            result,
            completed_at,
            ..
        } => {
            let view = ResultView::from_result(result);
            render_result_view(frame, area, &view, *completed_at, view_data.result_scroll);
        }
    }
}

fn render_result_view(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    view: &ResultView,
    completed_at: OffsetDateTime,
    scroll: u16,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(35),
            Constraint::Percentage(25),
        ])
        .split(area);
    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    let title = format!("assessment ({})", format_completed_at(completed_at));
    let assessment = Paragraph::new(assessment_lines(view))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(assessment, rows[0]);

    render_financials(frame, charts[0], view);
    render_risks(frame, charts[1], view);

    // Without strategies the gauges take the whole footer.
    match view.mitigation.as_deref() {
        Some(strategies) => {
            let footer = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(rows[2]);
            render_mitigation(frame, footer[0], strategies);
            render_metrics(frame, footer[1], view);
        }
        None => render_metrics(frame, rows[2], view),
    }
}

fn assessment_lines(view: &ResultView) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::raw("Rating: "),
            Span::styled(
                view.assessment.rating.clone(),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(view.assessment.explanation.clone()),
    ];
    for notice in &view.assessment.corrections {
        lines.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Cyan),
        )));
    }
    if let Some(competitors) = &view.competitors {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Nearby Competitors",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.extend(
            competitors
                .iter()
                .map(|competitor| Line::from(format!("  {competitor}"))),
        );
    }
    lines
}

fn render_financials(frame: &mut ratatui::Frame<'_>, area: Rect, view: &ResultView) {
    let block = Block::default()
        .title("financial projections")
        .borders(Borders::ALL);
    let FinancialView::Series(series) = &view.financial else {
        frame.render_widget(
            Paragraph::new(bizeval_app::NO_FINANCIALS).block(block),
            area,
        );
        return;
    };

    let bars = series
        .iter()
        .map(|bar| {
            Bar::default()
                .label(Line::from(bar.label))
                .value(bar_height(bar.value))
                .text_value(format_number(bar.value))
        })
        .collect::<Vec<_>>();
    let chart = BarChart::default()
        .block(block)
        .bar_width(9)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn render_risks(frame: &mut ratatui::Frame<'_>, area: Rect, view: &ResultView) {
    let RiskView::Radar(series) = &view.risks else {
        let block = Block::default().title("risk assessment").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(bizeval_app::NO_RISKS).block(block), area);
        return;
    };

    let title = format!(
        "risk assessment (0 - {})",
        format_number(series.domain[1])
    );
    let bars = series
        .points
        .iter()
        .map(|point| {
            Bar::default()
                .label(Line::from(point.label.clone()))
                .value(radar_value(series.ratio(point.score)))
                .text_value(format_number(point.score))
        })
        .collect::<Vec<_>>();
    let chart = BarChart::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(RADAR_SCALE as u64)
        .bar_style(Style::default().fg(Color::Red))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn render_mitigation(frame: &mut ratatui::Frame<'_>, area: Rect, strategies: &[String]) {
    let block = Block::default()
        .title("mitigation strategies")
        .borders(Borders::ALL);
    let items = strategies
        .iter()
        .enumerate()
        .map(|(index, line)| ListItem::new(format!("{}. {line}", index + 1)))
        .collect::<Vec<_>>();
    frame.render_widget(List::new(items).block(block), area);
}

fn render_metrics(frame: &mut ratatui::Frame<'_>, area: Rect, view: &ResultView) {
    let gauges = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    for (gauge, area) in [view.metrics.trend, view.metrics.economic]
        .into_iter()
        .zip(gauges.iter())
    {
        frame.render_widget(metric_gauge(gauge), *area);
    }
}

fn metric_gauge(gauge: MetricGauge) -> Gauge<'static> {
    Gauge::default()
        .block(Block::default().title(gauge.label).borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(gauge.ratio())
        .label(format!("{} / {}", gauge.display(), format_number(METRIC_MAX)))
}

/// Bars cannot go below zero; the printed value keeps the sign.
fn bar_height(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

fn radar_value(ratio: f64) -> u64 {
    (ratio * RADAR_SCALE).round() as u64
}

fn format_completed_at(completed_at: OffsetDateTime) -> String {
    completed_at
        .format(format_description!("[hour]:[minute]:[second] UTC"))
        .unwrap_or_default()
}

fn status_text(state: &AppState) -> String {
    let default = format!(
        "{} | ideas {} | locations {} | tab field | up/down pick | enter submit | ctrl+r retry | esc quit",
        state.workflow.state().label(),
        suggestion_label(state.suggestion_status(SuggestionCategory::BusinessIdeas)),
        suggestion_label(state.suggestion_status(SuggestionCategory::Locations)),
    );
    match &state.status_line {
        Some(status) => format!("{status} | {default}"),
        None => default,
    }
}

fn suggestion_label(status: SuggestionStatus) -> String {
    match status {
        SuggestionStatus::Pending => "...".to_owned(),
        SuggestionStatus::Ready(count) => count.to_string(),
        SuggestionStatus::Unavailable => "n/a".to_owned(),
    }
}
