/// ProgressReporter port for user feedback during a scan
///
/// Messages go to the user, not to the log; implementations write them to
/// stderr so stdout stays reserved for the report.
pub trait ProgressReporter: Send + Sync {
    /// Reports a progress message
    fn report(&self, message: &str);

    /// Reports how many of `total` items are done
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    /// Starts an indeterminate activity indicator, such as while waiting on
    /// vulnerability sources
    fn begin_activity(&self, message: &str);

    /// Reports a warning or error message
    fn report_error(&self, message: &str);

    /// Reports completion and stops any running indicator
    fn report_completion(&self, message: &str);
}
