use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use console::{Term, style};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::constants::progress::{SPINNER_FRAMES, TICK_INTERVAL};
use crate::utils::string::{counted, pluralize};

const ANALYSIS_TEMPLATE: &str = "{msg} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {per_sec}";
const DISCOVERY_TEMPLATE: &str = "{spinner:.cyan} {msg}";

/// Terminal feedback for a run: a spinner while descriptors are discovered,
/// then a bar advanced once per analysed project
pub struct ProgressReporter {
    term: Term,
    spinner_position: AtomicUsize,
    multi_progress: MultiProgress,
    current_bar: Option<ProgressBar>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
            spinner_position: AtomicUsize::new(0),
            multi_progress: MultiProgress::new(),
            current_bar: None,
        }
    }

    fn attach(&self, bar: ProgressBar, style: ProgressStyle, message: &str) -> ProgressBar {
        let bar = self.multi_progress.add(bar);
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(TICK_INTERVAL);
        bar
    }

    fn analysis_bar(&self, projects: u64) -> ProgressBar {
        let style = ProgressStyle::default_bar()
            .template(ANALYSIS_TEMPLATE)
            .expect("Analysis template should be valid")
            .progress_chars("█▉▊▋▌▍▎▏ ");
        self.attach(ProgressBar::new(projects), style, "Analyzing projects")
    }

    fn discovery_spinner(&self) -> ProgressBar {
        let style = ProgressStyle::default_spinner()
            .template(DISCOVERY_TEMPLATE)
            .expect("Discovery template should be valid")
            .tick_strings(SPINNER_FRAMES);
        self.attach(
            ProgressBar::new_spinner(),
            style,
            "Scanning for depsweep.toml files...",
        )
    }

    fn next_frame(&self) -> &'static str {
        let pos = self.spinner_position.fetch_add(1, Ordering::Relaxed) % SPINNER_FRAMES.len();
        SPINNER_FRAMES[pos]
    }

    pub fn start_discovery(&mut self) {
        let _ = self.term.clear_line();
        eprintln!("{} Discovering projects...", style("🔍").cyan());
        self.current_bar = Some(self.discovery_spinner());
    }

    pub fn checking_descriptor(&self, path: &Path) {
        if let Some(bar) = &self.current_bar {
            bar.set_message(format!("Reading {}...", path.display()));
        } else {
            let _ = self.term.clear_line();
            eprint!(
                "\r{} Reading {}... ",
                style(self.next_frame()).cyan(),
                style(path.display()).dim()
            );
        }
    }

    pub fn finish_discovery(&mut self, count: usize) {
        if let Some(bar) = self.current_bar.take() {
            bar.finish_and_clear();
        }
        let _ = self.term.clear_line();
        if count == 0 {
            eprintln!("\r{} No depsweep.toml found", style("✗").red());
        } else {
            eprintln!(
                "\r{} Found {} to analyze",
                style("✓").green(),
                style(counted(count, "project")).yellow().bold()
            );
        }
    }

    pub fn start_analysis(&mut self, total_projects: usize) -> ProgressBar {
        let bar = self.analysis_bar(total_projects as u64);
        self.current_bar = Some(bar.clone());
        bar
    }

    /// Safe to call from worker threads
    pub fn project_analyzed(&self, name: &str) {
        if let Some(bar) = &self.current_bar {
            bar.set_message(format!("Analyzed {name}"));
            bar.inc(1);
        }
    }

    pub fn finish_analysis(&mut self) {
        if let Some(bar) = self.current_bar.take() {
            bar.finish_and_clear();
        }
    }

    pub fn report_outcome(&self, violations: usize) {
        if violations == 0 {
            eprintln!(
                "{} No dependency problems found! {}",
                style("✓").green().bold(),
                style("🧹").dim()
            );
        } else {
            eprintln!(
                "{} Found {} dependency {}",
                style("⚠").yellow().bold(),
                style(violations).red().bold(),
                pluralize("problem", violations)
            );
        }
    }
}
