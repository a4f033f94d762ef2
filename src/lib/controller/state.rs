use super::error::Termination;
use crate::{ftl::ProtocolError, metrics::Snapshot, page::Page};

/// Refresh loop states. Data produced by one state is carried into the next.
#[derive(Debug)]
pub enum State {
    Idle,
    Connected,
    Collecting,
    Composing(Snapshot),
    Rendering(Vec<Page>),
    Waiting,
    Failed(ProtocolError),
    Terminated(Termination),
}

impl State {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Connected => "Connected",
            Self::Collecting => "Collecting",
            Self::Composing(_) => "Composing",
            Self::Rendering(_) => "Rendering",
            Self::Waiting => "Waiting",
            Self::Failed(_) => "Failed",
            Self::Terminated(_) => "Terminated",
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated(_))
    }
}
