/// Settings threaded through one generation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Log every naming and dispatch decision at `debug` level.
    pub trace: bool,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}
