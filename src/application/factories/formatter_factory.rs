use crate::adapters::outbound::formatters::{JsonFormatter, TextFormatter};
use crate::application::dto::OutputFormat;
use crate::ports::outbound::ReportFormatter;

/// Factory for creating report formatters
///
/// Lives in the application layer because it picks infrastructure adapters
/// based on what the caller asked for.
pub struct FormatterFactory;

impl FormatterFactory {
    /// Creates a formatter for the given output format
    ///
    /// # Examples
    /// ```
    /// use depscan::application::dto::OutputFormat;
    /// use depscan::application::factories::FormatterFactory;
    ///
    /// let formatter = FormatterFactory::create(OutputFormat::Json);
    /// ```
    pub fn create(format: OutputFormat) -> Box<dyn ReportFormatter> {
        match format {
            OutputFormat::Json => Box::new(JsonFormatter::new()),
            OutputFormat::Text => Box::new(TextFormatter::new()),
        }
    }

    /// Progress line shown before formatting
    ///
    /// # Examples
    /// ```
    /// use depscan::application::dto::OutputFormat;
    /// use depscan::application::factories::FormatterFactory;
    ///
    /// let message = FormatterFactory::progress_message(OutputFormat::Text);
    /// assert_eq!(message, "📝 Generating text report...");
    /// ```
    pub fn progress_message(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Json => "📝 Generating JSON report...",
            OutputFormat::Text => "📝 Generating text report...",
        }
    }
}
