// src/display/terminal.rs
//! Terminal-based display implementation

use super::canvas::TextCanvas;
use crate::{
    chart::{SignalChart, CHART_LABEL},
    error::Result,
    filter::{FilterKey, VisibilityFilter},
    gnss::GnssState,
    heading::heading_text,
    monitor::read_state,
    prefs::JsonPreferenceStore,
    skyplot::{SkyColor, SkyPlotRenderer, ViewportGeometry},
};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType, DisableLineWrap, EnableLineWrap},
};
use log::warn;
use std::{
    io::{self, Write},
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
    time::Duration,
};
use tokio::time::sleep;

const PLOT_COLS: usize = 41;
const PLOT_ROWS: usize = 21;
const BAR_WIDTH: usize = 30;

pub struct TerminalDisplay {
    renderer: SkyPlotRenderer,
    prefs_path: Option<PathBuf>,
}

impl TerminalDisplay {
    pub fn new(prefs_path: Option<PathBuf>) -> Self {
        Self {
            renderer: SkyPlotRenderer::new(),
            prefs_path,
        }
    }

    /// Start the terminal display loop
    pub async fn run(&self, state: Arc<RwLock<GnssState>>, running: Arc<AtomicBool>) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Hide, DisableLineWrap)?;

        let running_clone = Arc::clone(&running);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                running_clone.store(false, Ordering::Relaxed);
            }
        });

        while running.load(Ordering::Relaxed) {
            queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;

            let snapshot = read_state(&state);
            let filter = self.current_filter();
            self.render_display(&mut stdout, &snapshot, &filter)?;

            stdout.flush()?;
            sleep(Duration::from_secs(1)).await;
        }

        execute!(stdout, Show, EnableLineWrap)?;
        println!("\nShutting down...");
        Ok(())
    }

    /// Filter toggles are re-read every frame so `filter --set` applies live
    fn current_filter(&self) -> VisibilityFilter {
        let Some(path) = &self.prefs_path else {
            return VisibilityFilter::default();
        };
        match JsonPreferenceStore::open(path) {
            Ok(store) => VisibilityFilter::load(&store),
            Err(e) => {
                warn!("Using default filter: {}", e);
                VisibilityFilter::default()
            }
        }
    }

    fn render_display(
        &self,
        out: &mut impl Write,
        state: &GnssState,
        filter: &VisibilityFilter,
    ) -> Result<()> {
        section(out, Color::Green, &"=".repeat(60))?;
        section(out, Color::Green, "GNSS Sky View")?;
        section(out, Color::Green, &"=".repeat(60))?;

        let timestamp_str = match state.timestamp {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            None => "No data received".to_string(),
        };
        let source_str = state.source.as_deref().unwrap_or("Unknown");
        queue!(out, Print(format!("Last Update: {} ({})\n\n", timestamp_str, source_str)))?;

        section(out, Color::Yellow, "POSITION:")?;
        for line in state.location_text().lines() {
            queue!(out, Print(format!("  {}\n", line)))?;
        }
        queue!(out, Print(format!("  Fix: {}\n", state.fix_description())))?;
        if let Some(heading) = state.heading {
            queue!(out, Print(format!("  {}\n", heading_text(heading))))?;
        }
        queue!(out, Print("\n"))?;

        self.render_sky_plot(out, state, filter)?;
        render_signal_chart(out, state)?;

        section(out, Color::Magenta, "SATELLITES:")?;
        match &state.status {
            Some(status) => {
                for line in status.summary().lines() {
                    queue!(out, Print(format!("  {}\n", line)))?;
                }
            }
            None => queue!(out, Print("  No satellite data\n"))?,
        }

        queue!(out, Print("\n"))?;
        section(out, Color::Green, "Press Ctrl+C to exit")?;
        Ok(())
    }

    fn render_sky_plot(
        &self,
        out: &mut impl Write,
        state: &GnssState,
        filter: &VisibilityFilter,
    ) -> Result<()> {
        section(out, Color::Cyan, "SKY PLOT:")?;

        let mut canvas = TextCanvas::new(PLOT_COLS, PLOT_ROWS);
        let (width, height) = canvas.pixel_size();
        let viewport = ViewportGeometry::new(width, height)?;
        canvas.draw(&self.renderer.render(state.observations(), filter, &viewport));

        for row in canvas.rows() {
            queue!(out, Print("  "))?;
            for cell in row {
                match cell.color {
                    Some(color) => queue!(
                        out,
                        SetForegroundColor(terminal_color(color)),
                        Print(cell.ch),
                        ResetColor
                    )?,
                    None => queue!(out, Print(cell.ch))?,
                }
            }
            queue!(out, Print("\n"))?;
        }

        let hidden: Vec<_> = FilterKey::ALL
            .iter()
            .filter(|key| !filter.get(**key))
            .map(|key| key.label())
            .collect();
        if !hidden.is_empty() {
            queue!(out, Print(format!("  Hidden: {}\n", hidden.join(", "))))?;
        }
        queue!(out, Print("\n"))?;
        Ok(())
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new(None)
    }
}

fn section(out: &mut impl Write, color: Color, title: &str) -> Result<()> {
    queue!(out, SetForegroundColor(color), Print(title), Print("\n"), ResetColor)?;
    Ok(())
}

fn render_signal_chart(out: &mut impl Write, state: &GnssState) -> Result<()> {
    section(out, Color::Blue, &format!("{}:", CHART_LABEL.to_uppercase()))?;

    let chart = SignalChart::from_observations(state.observations().unwrap_or_default());
    if chart.is_empty() {
        queue!(out, Print("  No signal data\n\n"))?;
        return Ok(());
    }

    for (bar, height) in chart.bars().iter().zip(chart.scaled_heights(BAR_WIDTH as f32)) {
        queue!(
            out,
            Print(format!(
                "  {:>3} {:>4} {:<width$} {:.0} dB-Hz\n",
                bar.index,
                bar.satellite_id,
                "#".repeat(height.round() as usize),
                bar.cn0_db_hz,
                width = BAR_WIDTH
            ))
        )?;
    }
    queue!(out, Print("\n"))?;
    Ok(())
}

fn terminal_color(color: SkyColor) -> Color {
    match color {
        SkyColor::Blue => Color::Blue,
        SkyColor::Red => Color::Red,
        SkyColor::Yellow => Color::Yellow,
        SkyColor::Green => Color::Green,
        SkyColor::Gray => Color::DarkGrey,
    }
}
