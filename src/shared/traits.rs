use crate::features::process::ProcessSnapshot;
use crate::features::scheduled_task::TaskSnapshot;
use crate::features::service::ServiceSnapshot;
use crate::features::system_metrics::SystemSnapshot;
use crate::shared::error::QueryError;
use crate::shared::snapshot::{Snapshot, SnapshotKind};

/// Gathers one snapshot of machine state.
///
/// `query` is a plain blocking call. Collectors run it off the async
/// workers and never call it concurrently with itself.
pub trait SystemQuery: Send + 'static {
    fn kind(&self) -> SnapshotKind;

    fn query(&mut self) -> Result<Snapshot, QueryError>;

    /// Checks that the data source is usable at all (tools present, platform supported).
    fn health_check(&self) -> Result<(), QueryError> {
        Ok(())
    }
}

impl<Q: SystemQuery + ?Sized> SystemQuery for Box<Q> {
    fn kind(&self) -> SnapshotKind {
        (**self).kind()
    }

    fn query(&mut self) -> Result<Snapshot, QueryError> {
        (**self).query()
    }

    fn health_check(&self) -> Result<(), QueryError> {
        (**self).health_check()
    }
}

/// Display side of the viewer. Every method runs on the presenter's own
/// context and must return promptly.
pub trait Presenter {
    fn show_system(&mut self, snapshot: &SystemSnapshot);
    fn show_processes(&mut self, snapshot: &ProcessSnapshot);
    fn show_services(&mut self, snapshot: &ServiceSnapshot);
    fn show_tasks(&mut self, snapshot: &TaskSnapshot);
    fn show_no_data(&mut self, kind: SnapshotKind, error: &QueryError);

    fn show_snapshot(&mut self, snapshot: &Snapshot) {
        match snapshot {
            Snapshot::System(s) => self.show_system(s),
            Snapshot::Processes(s) => self.show_processes(s),
            Snapshot::Services(s) => self.show_services(s),
            Snapshot::Tasks(s) => self.show_tasks(s),
        }
    }
}

pub trait Validatable {
    fn validate(&self) -> Result<(), String>;
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
