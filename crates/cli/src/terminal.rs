use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use pdfrag_llm::{BackendStatus, QueryOutcome, QueryResult, SourceRef};
use pdfrag_service::IndexReport;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const USER_PROMPT: Color = Color::Green;
    const ANSWER: Color = Color::Cyan;
    const SOURCE: Color = Color::Yellow;
    const OK: Color = Color::DarkGreen;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
}

const SOURCE_PREVIEW_CHARS: usize = 200;

/// Terminal I/O for the question loop and the one-shot commands.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    pub fn print_banner(&self, model: &str, embedding_model: &str, pdf_dir: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("pdfrag"),
            ResetColor,
            Print(" - Ask questions about your PDFs\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!("Model: {} | Embeddings: {} | PDFs: {}\n", model, embedding_model, pdf_dir)),
            Print("Type 'exit', 'quit' or 'q' to end.\n"),
            Print("---\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Read a question. Returns `None` on an exit command or end of input.
    pub fn read_input(&self) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::USER_PROMPT),
            Print("question> "),
            ResetColor,
        )?;
        stdout.flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let trimmed = input.trim();
        if is_exit_command(trimmed) {
            return Ok(None);
        }
        Ok(Some(trimmed.to_string()))
    }

    pub fn print_answer(&self, result: &QueryResult) -> Result<()> {
        let mut stdout = io::stdout();
        let color = match result.outcome {
            QueryOutcome::Answered => Colors::ANSWER,
            QueryOutcome::NoRelevantContext => Colors::DIM,
        };
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::HEADER),
            Print("Answer:\n"),
            SetForegroundColor(color),
            Print(format!("{}\n", result.answer)),
            ResetColor,
        )?;

        if !result.sources.is_empty() {
            execute!(
                stdout,
                Print("\n"),
                SetForegroundColor(Colors::HEADER),
                Print("Sources:\n"),
                ResetColor,
            )?;
            for (i, source) in result.sources.iter().enumerate() {
                execute!(
                    stdout,
                    SetForegroundColor(Colors::SOURCE),
                    Print(format!("{}\n", source_heading(i + 1, source))),
                    SetForegroundColor(Colors::DIM),
                    Print(format!("   {}\n", preview(&source.text, SOURCE_PREVIEW_CHARS))),
                    ResetColor,
                )?;
            }
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_report(&self, report: &IndexReport) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::OK),
            Print(format!(
                "Indexed {} documents into {} chunks (chunk size {}, overlap {}) in {:.1}s\n",
                report.documents,
                report.chunks,
                report.chunk_size,
                report.chunk_overlap,
                report.elapsed_ms as f64 / 1000.0
            )),
            SetForegroundColor(Colors::DIM),
            Print(format!("Index stored in {}\n", report.storage_dir.display())),
            ResetColor,
        )?;
        for skipped in &report.skipped {
            execute!(
                stdout,
                SetForegroundColor(Colors::ERROR),
                Print(format!("Skipped {}: {}\n", skipped.file, skipped.reason)),
                ResetColor,
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_status(&self, status: &BackendStatus) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, SetForegroundColor(Colors::HEADER), Print("== Ollama Status ==\n"), ResetColor)?;

        if !status.running {
            execute!(
                stdout,
                SetForegroundColor(Colors::ERROR),
                Print("Ollama is not running. Please start Ollama.\n"),
                ResetColor,
                Print(format!("   Expected at: {}\n", status.base_url)),
            )?;
            stdout.flush()?;
            return Ok(());
        }

        execute!(
            stdout,
            SetForegroundColor(Colors::OK),
            Print(format!(
                "Ollama is running (version {})\n",
                status.version.as_deref().unwrap_or("unknown")
            )),
            ResetColor,
            Print("\nRequired models:\n"),
        )?;
        for (model, available) in &status.required_models {
            if *available {
                let details = status
                    .model_details
                    .get(model)
                    .map(|d| d.label())
                    .filter(|label| !label.is_empty())
                    .map(|label| format!(" ({label})"))
                    .unwrap_or_default();
                execute!(
                    stdout,
                    SetForegroundColor(Colors::OK),
                    Print(format!("  {} is available{}\n", model, details)),
                    ResetColor,
                )?;
            } else {
                execute!(
                    stdout,
                    SetForegroundColor(Colors::ERROR),
                    Print(format!("  {} is not available. Pull with: ollama pull {}\n", model, model)),
                    ResetColor,
                )?;
            }
        }

        execute!(stdout, Print(format!("\nAll available models ({}):\n", status.available_models.len())))?;
        for model in &status.available_models {
            execute!(stdout, SetForegroundColor(Colors::DIM), Print(format!("  - {}\n", model)), ResetColor)?;
        }

        let missing = status.missing_models();
        if missing.is_empty() {
            execute!(stdout, Print("\nAll required models are available!\n"))?;
        } else {
            execute!(stdout, Print("\nTo pull missing models:\n"))?;
            for model in missing {
                execute!(stdout, Print(format!("  ollama pull {}\n", model)))?;
            }
        }
        stdout.flush()?;
        Ok(())
    }

    /// Show a spinner while a blocking step runs. Returns a handle to stop it.
    pub fn start_spinner(&self, message: &str) -> Result<SpinnerHandle> {
        let mut stdout = io::stdout();
        execute!(stdout, SetForegroundColor(Colors::DIM), Print(format!("{} ", message)), ResetColor)?;
        stdout.flush()?;

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = std::thread::spawn(move || {
            let frames = ['|', '/', '-', '\\'];
            let mut i = 0;
            while running_clone.load(Ordering::SeqCst) {
                let mut stdout = io::stdout();
                execute!(
                    stdout,
                    SetForegroundColor(Colors::DIM),
                    Print(format!("\r{} ", frames[i % frames.len()])),
                    ResetColor,
                )
                .ok();
                stdout.flush().ok();
                i += 1;
                std::thread::sleep(std::time::Duration::from_millis(100));
            }
            let mut stdout = io::stdout();
            execute!(stdout, Print("\r  \r")).ok();
            stdout.flush().ok();
        });

        Ok(SpinnerHandle {
            running,
            thread: Some(handle),
        })
    }

    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// Handle to a running spinner. Drop or call stop() to terminate it.
pub struct SpinnerHandle {
    running: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl SpinnerHandle {
    /// Stop the spinner and wait for the line to be cleared.
    pub fn stop(mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            thread.join().ok();
        }
    }
}

impl Drop for SpinnerHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

pub fn is_exit_command(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "exit" | "quit" | "q")
}

fn source_heading(n: usize, source: &SourceRef) -> String {
    format!("{}. {} (page {}, score {:.2})", n, source.source, source.page, source.score)
}

/// First `max_chars` characters on a single line, with an ellipsis when cut.
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
