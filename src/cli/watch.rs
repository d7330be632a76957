//! Watch command implementation - Interactive TUI dashboard.

// Chart coordinates are f64
#![allow(clippy::cast_precision_loss)]

use super::{CatalogArgs, CliError, EngineArgs, pick_seed, print_config};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use knapsack_evo::ga::{Evolution, EvolutionConfig, Phase};
use knapsack_evo::{Catalog, LimitStrategy};
use log::LevelFilter;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Row, Table},
};
use std::io::{Stdout, stdout};
use std::time::{Duration, Instant};

/// Execute the watch command.
///
/// # Errors
///
/// Returns an error if the catalog or configuration is invalid, or the TUI fails.
pub(crate) fn execute(
    catalog_args: &CatalogArgs,
    engine_args: &EngineArgs,
    speed: u64,
) -> Result<(), CliError> {
    let catalog = catalog_args.load()?;
    let (mut config, strategy) = engine_args.resolve()?;
    config.seed = Some(pick_seed(config.seed));

    if engine_args.print_config() {
        return print_config(&config);
    }

    let app = App::new(&catalog, config, strategy, speed)?;
    run_tui(app)
}

/// App state for the TUI.
struct App<'a> {
    catalog: &'a Catalog,
    config: EvolutionConfig,
    strategy: LimitStrategy,
    engine: Evolution<'a, Catalog>,
    paused: bool,
    speed_ms: u64,
    last_step: Instant,
}

impl<'a> App<'a> {
    fn new(
        catalog: &'a Catalog,
        config: EvolutionConfig,
        strategy: LimitStrategy,
        speed_ms: u64,
    ) -> Result<Self, CliError> {
        let mut engine = catalog.evolution(config, strategy)?;
        // Show generation 0 right away
        engine.step(&mut ());
        Ok(Self {
            catalog,
            config,
            strategy,
            engine,
            paused: true, // Start paused
            speed_ms,
            last_step: Instant::now(),
        })
    }

    fn step_forward(&mut self) {
        if !self.engine.is_finished() {
            self.engine.step(&mut ());
            self.last_step = Instant::now();
        }
    }

    fn restart(&mut self, config: EvolutionConfig) -> Result<(), CliError> {
        let mut engine = self.catalog.evolution(config, self.strategy)?;
        engine.step(&mut ());
        self.config = config;
        self.engine = engine;
        self.paused = true;
        self.last_step = Instant::now();
        Ok(())
    }

    fn reseed(&mut self) -> Result<(), CliError> {
        let seed = self.engine.seed().wrapping_add(1);
        self.restart(EvolutionConfig { seed: Some(seed), ..self.config })
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    fn increase_speed(&mut self) {
        self.speed_ms = self.speed_ms.saturating_sub(50).max(10);
    }

    fn decrease_speed(&mut self) {
        self.speed_ms = (self.speed_ms + 50).min(2000);
    }

    fn should_auto_step(&self) -> bool {
        !self.paused
            && !self.engine.is_finished()
            && self.last_step.elapsed() >= Duration::from_millis(self.speed_ms)
    }
}

/// Silences the `log` facade until dropped.
///
/// Log lines go to stderr and would draw over the alternate screen.
struct MuteLogs {
    previous: LevelFilter,
}

impl MuteLogs {
    fn new() -> Self {
        let previous = log::max_level();
        log::set_max_level(LevelFilter::Off);
        Self { previous }
    }
}

impl Drop for MuteLogs {
    fn drop(&mut self) {
        log::set_max_level(self.previous);
    }
}

fn run_tui(mut app: App<'_>) -> Result<(), CliError> {
    let _mute = MuteLogs::new();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| CliError::new(e.to_string()))?;

    let result = event_loop(&mut terminal, &mut app);

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<'_>,
) -> Result<(), CliError> {
    loop {
        terminal.draw(|f| ui(f, app)).map_err(|e| CliError::new(e.to_string()))?;

        if app.should_auto_step() {
            app.step_forward();
        }

        if event::poll(Duration::from_millis(20)).map_err(|e| CliError::new(e.to_string()))?
            && let Event::Key(key) = event::read().map_err(|e| CliError::new(e.to_string()))?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char(' ') => app.toggle_pause(),
                KeyCode::Right | KeyCode::Char('l') => {
                    app.paused = true;
                    app.step_forward();
                }
                KeyCode::Char('+' | '=') => app.increase_speed(),
                KeyCode::Char('-') => app.decrease_speed(),
                KeyCode::Char('r') => app.restart(app.config)?,
                KeyCode::Char('n') => app.reseed()?,
                _ => {}
            }
        }
    }

    Ok(())
}

fn ui(f: &mut Frame, app: &App<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    render_chart(f, main_chunks[0], app);

    let side_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(10)])
        .split(main_chunks[1]);

    render_items(f, side_chunks[0], app);
    render_stats(f, side_chunks[1], app);

    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App<'_>) {
    let engine = &app.engine;

    let status = if engine.phase() == Phase::Terminal {
        if engine.best_fitness() >= engine.fitness_limit() {
            "LIMIT REACHED"
        } else {
            "BUDGET SPENT"
        }
    } else if app.paused {
        "PAUSED"
    } else {
        "RUNNING"
    };

    let title = format!(
        " Knapsack Evolution | Gen {}/{} | Best {}/{} | {} | Speed: {}ms ",
        engine.generation(),
        app.config.generation_limit.saturating_sub(1),
        engine.best_fitness(),
        engine.fitness_limit(),
        status,
        app.speed_ms
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn render_chart(f: &mut Frame, area: Rect, app: &App<'_>) {
    let history = app.engine.history();
    let best: Vec<(f64, f64)> = history
        .iter()
        .map(|s| (s.generation as f64, s.best_fitness as f64))
        .collect();
    let mean: Vec<(f64, f64)> = history
        .iter()
        .map(|s| (s.generation as f64, s.mean_fitness))
        .collect();

    let x_max = app.config.generation_limit.saturating_sub(1).max(1) as f64;
    let y_max = app.engine.fitness_limit().max(app.engine.best_fitness()).max(1) as f64;

    let datasets = vec![
        Dataset::default()
            .name("best")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&best),
        Dataset::default()
            .name("mean")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&mean),
    ];

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(" Fitness "))
        .x_axis(
            Axis::default()
                .title("Generation")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(vec!["0".to_string(), format!("{x_max:.0}")]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(vec!["0".to_string(), format!("{y_max:.0}")]),
        );

    f.render_widget(chart, area);
}

fn render_items(f: &mut Frame, area: Rect, app: &App<'_>) {
    let best = app.engine.best();

    let rows: Vec<Row> = app
        .catalog
        .items()
        .map(|item| {
            let packed = best.and_then(|g| g.gene(item.index)).unwrap_or(false);
            let style = if packed {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Row::new(vec![
                (item.index + 1).to_string(),
                item.value.to_string(),
                item.weight.to_string(),
                if packed { "yes" } else { "-" }.to_string(),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(6),
        ],
    )
    .header(
        Row::new(vec!["Item", "Value", "Weight", "Packed"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title(" Best Packing "));

    f.render_widget(table, area);
}

fn render_stats(f: &mut Frame, area: Rect, app: &App<'_>) {
    let engine = &app.engine;
    let packing = engine.best().map(|g| app.catalog.pack(g));
    let stats = engine.history().last().copied().unwrap_or_default();

    let mut lines = vec![Line::from(vec![
        Span::styled("Best ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(engine.best().map(ToString::to_string).unwrap_or_default()),
    ])];
    if let Some(p) = packing {
        lines.push(Line::from(format!(
            "  Value: {}  Weight: {}/{}",
            p.value,
            p.weight,
            app.catalog.capacity()
        )));
    }
    lines.push(Line::from(format!(
        "  Mean: {:.1}  Std: {:.1}  Worst: {}",
        stats.mean_fitness, stats.fitness_std, stats.worst_fitness
    )));
    lines.push(Line::from(format!("  Diversity: {:.2}", stats.diversity)));
    lines.push(Line::from(format!(
        "  Population: {}  Elite: {}",
        app.config.population_size, app.config.elite_count
    )));
    lines.push(Line::from(format!("  Seed: {}", engine.seed())));

    let stats_widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Generation "));

    f.render_widget(stats_widget, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App<'_>) {
    let controls = if app.engine.is_finished() {
        " [q] Quit  [r] Restart  [n] New seed "
    } else {
        " [q] Quit  [Space] Pause  [→] Step  [+/-] Speed  [r] Restart  [n] New seed "
    };

    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}
