use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub steps: usize,
    pub expanded_nodes: usize,
    pub opened_nodes: usize,
    pub path_length: usize,
    pub time_us: usize,
}

impl Stats {
    pub fn print(&self, algorithm: &str) {
        info!(
            "{algorithm}: Steps {:?} Time(microseconds) {:?} Expanded nodes: {:?} Opened nodes: {:?} Path length: {:?}",
            self.steps, self.time_us, self.expanded_nodes, self.opened_nodes, self.path_length
        );
    }
}
